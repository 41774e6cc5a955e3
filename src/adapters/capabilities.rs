use std::fmt;

/// One operation of the adapter boundary contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    Chat,
    Streaming,
    Embeddings,
    Rerank,
    Tokenize,
    Detokenize,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Chat => write!(f, "chat"),
            Capability::Streaming => write!(f, "streaming"),
            Capability::Embeddings => write!(f, "embeddings"),
            Capability::Rerank => write!(f, "rerank"),
            Capability::Tokenize => write!(f, "tokenize"),
            Capability::Detokenize => write!(f, "detokenize"),
        }
    }
}

/// Capability descriptor computed once per adapter instance.
///
/// `chat` and `streaming` are mandatory for every adapter and are not
/// represented as flags; the optional operations default to unsupported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub embeddings: bool,
    pub rerank: bool,
    pub tokenize: bool,
    pub detokenize: bool,
}

impl Capabilities {
    pub fn text_only() -> Self {
        Self::default()
    }

    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Chat | Capability::Streaming => true,
            Capability::Embeddings => self.embeddings,
            Capability::Rerank => self.rerank,
            Capability::Tokenize => self.tokenize,
            Capability::Detokenize => self.detokenize,
        }
    }
}
