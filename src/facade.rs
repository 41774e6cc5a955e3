use std::sync::Arc;

use tracing::debug;

use crate::adapters::adapter::Adapter;
use crate::adapters::capabilities::Capability;
use crate::adapters::registry::AdapterRegistry;
use crate::aggregator::session::AggregatorSession;
use crate::config::models::Config;
use crate::errors::{Error, Result};
use crate::models::chat::{ChatCompletion, ChatCompletionRequest};
use crate::models::embeddings::{EmbeddingsRequest, EmbeddingsResponse};
use crate::models::rerank::{RerankRequest, RerankResponse};

/// Outcome of a chat request: a live aggregation session for streaming
/// requests, or the adapter's one-shot completion.
pub enum ChatCompletionResponse {
    Stream(AggregatorSession),
    NonStream(ChatCompletion),
}

impl std::fmt::Debug for ChatCompletionResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatCompletionResponse::Stream(_) => f.debug_tuple("Stream").finish(),
            ChatCompletionResponse::NonStream(c) => f.debug_tuple("NonStream").field(c).finish(),
        }
    }
}

/// Entry point for generation requests. Resolves the request's model key
/// against the configured models, checks the owning adapter's capability
/// descriptor, and dispatches streaming vs one-shot generation.
pub struct GenerationFacade {
    registry: AdapterRegistry,
    config: Config,
}

impl GenerationFacade {
    pub fn new(registry: AdapterRegistry, config: Config) -> Self {
        Self { registry, config }
    }

    fn resolve(&self, model_key: &str) -> Result<(Arc<dyn Adapter>, String)> {
        let model = self
            .config
            .models
            .iter()
            .find(|m| m.key == model_key)
            .ok_or_else(|| Error::ModelNotFound(model_key.to_string()))?;
        let adapter =
            self.registry
                .get(&model.adapter)
                .ok_or_else(|| Error::AdapterNotRegistered {
                    model: model.key.clone(),
                    adapter: model.adapter.clone(),
                })?;
        Ok((adapter, model.r#type.clone()))
    }

    fn require(adapter: &Arc<dyn Adapter>, capability: Capability) -> Result<()> {
        if adapter.capabilities().supports(capability) {
            Ok(())
        } else {
            Err(Error::CapabilityUnsupported {
                adapter: adapter.name(),
                capability,
            })
        }
    }

    pub async fn chat_completions(
        &self,
        mut request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        let (adapter, model_type) = self.resolve(&request.model)?;
        request.model = model_type;

        if request.stream.unwrap_or(false) {
            Self::require(&adapter, Capability::Streaming)?;
            debug!(adapter = %adapter.name(), model = %request.model, "starting streaming session");
            let handle = adapter.stream_text(request.clone()).await?;
            Ok(ChatCompletionResponse::Stream(AggregatorSession::new(
                request, handle,
            )))
        } else {
            Self::require(&adapter, Capability::Chat)?;
            adapter
                .generate_text(request)
                .await
                .map(ChatCompletionResponse::NonStream)
        }
    }

    /// Stateless pass-through; embeddings never go through the aggregator.
    pub async fn embeddings(&self, mut request: EmbeddingsRequest) -> Result<EmbeddingsResponse> {
        let (adapter, model_type) = self.resolve(&request.model)?;
        request.model = model_type;
        Self::require(&adapter, Capability::Embeddings)?;
        adapter.embeddings(request).await
    }

    /// Stateless pass-through; reranking never goes through the aggregator.
    pub async fn rerank(&self, mut request: RerankRequest) -> Result<RerankResponse> {
        let (adapter, model_type) = self.resolve(&request.model)?;
        request.model = model_type;
        Self::require(&adapter, Capability::Rerank)?;
        adapter.rerank(request).await
    }

    pub async fn tokenize(&self, model_key: &str, text: &str) -> Result<Vec<u32>> {
        let (adapter, model_type) = self.resolve(model_key)?;
        Self::require(&adapter, Capability::Tokenize)?;
        adapter.tokenize(&model_type, text).await
    }

    pub async fn detokenize(&self, model_key: &str, tokens: &[u32]) -> Result<String> {
        let (adapter, model_type) = self.resolve(model_key)?;
        Self::require(&adapter, Capability::Detokenize)?;
        adapter.detokenize(&model_type, tokens).await
    }
}
