use thiserror::Error;

use crate::adapters::capabilities::Capability;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("adapter '{adapter}' does not support {capability}")]
    CapabilityUnsupported {
        adapter: String,
        capability: Capability,
    },

    #[error("no model '{0}' is configured")]
    ModelNotFound(String),

    #[error("model '{model}' references unregistered adapter '{adapter}'")]
    AdapterNotRegistered { model: String, adapter: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("no result produced: the stream ended before any chunk arrived")]
    NoResultProduced,

    #[error("invalid configuration: {0}")]
    Config(String),
}
