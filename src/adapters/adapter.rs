use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;

use super::capabilities::{Capabilities, Capability};
use crate::errors::{Error, Result};
use crate::models::chat::{ChatCompletion, ChatCompletionRequest};
use crate::models::embeddings::{EmbeddingsRequest, EmbeddingsResponse};
use crate::models::rerank::{RerankRequest, RerankResponse};
use crate::models::streaming::ChatCompletionChunk;

pub type ChunkStream = BoxStream<'static, Result<ChatCompletionChunk>>;

/// Cooperative cancellation hook handed out together with a chunk stream.
/// Invoking it must abort the underlying transport and cause the stream to
/// end promptly rather than error.
pub trait StreamCanceller: Send {
    fn cancel(&mut self);
}

impl<F: FnMut() + Send> StreamCanceller for F {
    fn cancel(&mut self) {
        self()
    }
}

/// A live streaming generation: the chunk sequence in arrival order plus
/// the transport-level cancel operation.
pub struct StreamHandle {
    chunks: ChunkStream,
    canceller: Box<dyn StreamCanceller>,
}

impl StreamHandle {
    pub fn new(chunks: ChunkStream, canceller: Box<dyn StreamCanceller>) -> Self {
        Self { chunks, canceller }
    }

    pub async fn next(&mut self) -> Option<Result<ChatCompletionChunk>> {
        self.chunks.next().await
    }

    pub fn cancel(&mut self) {
        self.canceller.cancel();
    }

    /// Splits the handle into its stream and canceller halves so the two
    /// can live behind separate locks.
    pub(crate) fn into_parts(self) -> (ChunkStream, Box<dyn StreamCanceller>) {
        (self.chunks, self.canceller)
    }
}

/// The backend boundary contract.
///
/// `generate_text` and `stream_text` are mandatory; the remaining
/// operations are opt-in and must be declared through `capabilities()`.
/// Default bodies reject with `CapabilityUnsupported` so a text-only
/// adapter implements exactly the two mandatory methods.
#[async_trait]
pub trait Adapter: Send + Sync {
    fn name(&self) -> String;

    fn capabilities(&self) -> Capabilities {
        Capabilities::text_only()
    }

    /// Fail-fast hook for missing credentials or configuration, invoked
    /// once at registration.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    async fn generate_text(&self, request: ChatCompletionRequest) -> Result<ChatCompletion>;

    async fn stream_text(&self, request: ChatCompletionRequest) -> Result<StreamHandle>;

    async fn embeddings(&self, _request: EmbeddingsRequest) -> Result<EmbeddingsResponse> {
        Err(self.unsupported(Capability::Embeddings))
    }

    async fn rerank(&self, _request: RerankRequest) -> Result<RerankResponse> {
        Err(self.unsupported(Capability::Rerank))
    }

    async fn tokenize(&self, _model: &str, _text: &str) -> Result<Vec<u32>> {
        Err(self.unsupported(Capability::Tokenize))
    }

    async fn detokenize(&self, _model: &str, _tokens: &[u32]) -> Result<String> {
        Err(self.unsupported(Capability::Detokenize))
    }

    fn unsupported(&self, capability: Capability) -> Error {
        Error::CapabilityUnsupported {
            adapter: self.name(),
            capability,
        }
    }
}
