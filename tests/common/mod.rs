#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use genhub::adapters::{Adapter, Capabilities, StreamHandle};
use genhub::config::models::{AdapterConfig, Config, ModelConfig};
use genhub::errors::{Error, Result};
use genhub::models::chat::{
    AssistantMessage, ChatCompletion, ChatCompletionChoice, ChatCompletionRequest,
};
use genhub::models::embeddings::{Embedding, Embeddings, EmbeddingsRequest, EmbeddingsResponse};
use genhub::models::rerank::{RerankRequest, RerankResponse, RerankResult};
use genhub::models::streaming::{
    ChatCompletionChunk, ChoiceDelta, ChunkChoice, FunctionDelta, ToolCallDelta,
};
use genhub::models::usage::{EmbeddingUsage, Usage};

/// Adapter that replays a scripted chunk sequence over a real channel, so
/// cancellation aborts a live producer task the way a transport abort would.
pub struct ScriptedAdapter {
    name: String,
    capabilities: Capabilities,
    script: Mutex<Option<Vec<Result<ChatCompletionChunk>>>>,
    hold_open: bool,
    fail_validation: bool,
    pub seen_model: Arc<Mutex<Option<String>>>,
}

impl ScriptedAdapter {
    pub fn new(name: &str, script: Vec<Result<ChatCompletionChunk>>) -> Self {
        Self {
            name: name.to_string(),
            capabilities: Capabilities::text_only(),
            script: Mutex::new(Some(script)),
            hold_open: false,
            fail_validation: false,
            seen_model: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Keeps the transport open after the script runs dry; only `cancel()`
    /// ends the stream.
    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    pub fn failing_validation(mut self) -> Self {
        self.fail_validation = true;
        self
    }
}

#[async_trait]
impl Adapter for ScriptedAdapter {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn validate(&self) -> Result<()> {
        if self.fail_validation {
            Err(Error::Config("api_key is not set".to_string()))
        } else {
            Ok(())
        }
    }

    async fn generate_text(&self, request: ChatCompletionRequest) -> Result<ChatCompletion> {
        *self.seen_model.lock().unwrap() = Some(request.model.clone());
        Ok(ChatCompletion {
            id: "chatcmpl-scripted".to_string(),
            object: "chat.completion".to_string(),
            created: 1,
            model: request.model,
            choices: vec![ChatCompletionChoice {
                index: 0,
                message: AssistantMessage {
                    role: "assistant".to_string(),
                    content: "one-shot".to_string(),
                    reasoning_content: None,
                    tool_calls: None,
                },
                finish_reason: Some("stop".to_string()),
            }],
            usage: Usage {
                prompt_tokens: 1,
                completion_tokens: 1,
                total_tokens: 2,
            },
        })
    }

    async fn stream_text(&self, request: ChatCompletionRequest) -> Result<StreamHandle> {
        *self.seen_model.lock().unwrap() = Some(request.model.clone());
        let script = self.script.lock().unwrap().take().unwrap_or_default();
        let hold_open = self.hold_open;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let producer = tokio::spawn(async move {
            for item in script {
                if tx.send(item).is_err() {
                    return;
                }
                tokio::task::yield_now().await;
            }
            if hold_open {
                futures::future::pending::<()>().await;
            }
        });

        let chunks = Box::pin(async_stream::stream! {
            while let Some(item) = rx.recv().await {
                yield item;
            }
        });
        Ok(StreamHandle::new(
            chunks,
            Box::new(move || producer.abort()),
        ))
    }

    async fn embeddings(&self, request: EmbeddingsRequest) -> Result<EmbeddingsResponse> {
        Ok(EmbeddingsResponse {
            object: "list".to_string(),
            data: vec![Embeddings {
                object: "embedding".to_string(),
                embedding: Embedding::Float(vec![0.1, 0.2, 0.3]),
                index: 0,
            }],
            model: request.model,
            usage: EmbeddingUsage {
                prompt_tokens: Some(3),
                total_tokens: Some(3),
            },
        })
    }

    async fn rerank(&self, request: RerankRequest) -> Result<RerankResponse> {
        let results = (0..request.documents.len())
            .map(|index| RerankResult {
                index,
                relevance_score: 1.0 - index as f64 * 0.1,
                document: None,
            })
            .collect();
        Ok(RerankResponse {
            model: request.model,
            results,
            usage: EmbeddingUsage {
                prompt_tokens: Some(1),
                total_tokens: Some(1),
            },
        })
    }
}

pub fn content_chunk(index: u32, content: &str, finish_reason: Option<&str>) -> ChatCompletionChunk {
    ChatCompletionChunk {
        id: "chunk".to_string(),
        choices: vec![ChunkChoice {
            index,
            delta: ChoiceDelta {
                content: Some(content.to_string()),
                ..ChoiceDelta::default()
            },
            finish_reason: finish_reason.map(str::to_string),
        }],
        usage: None,
    }
}

pub fn tool_chunk(
    tool_index: u32,
    id: Option<&str>,
    name: Option<&str>,
    arguments: Option<&str>,
) -> ChatCompletionChunk {
    ChatCompletionChunk {
        id: "chunk".to_string(),
        choices: vec![ChunkChoice {
            index: 0,
            delta: ChoiceDelta {
                tool_calls: Some(vec![ToolCallDelta {
                    index: tool_index,
                    id: id.map(str::to_string),
                    r#type: id.map(|_| "function".to_string()),
                    function: Some(FunctionDelta {
                        name: name.map(str::to_string),
                        arguments: arguments.map(str::to_string),
                    }),
                }]),
                ..ChoiceDelta::default()
            },
            finish_reason: None,
        }],
        usage: None,
    }
}

pub fn chat_request(model: &str, stream: bool) -> ChatCompletionRequest {
    use genhub::models::chat::{ChatCompletionMessage, ChatMessageContent};
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![ChatCompletionMessage {
            role: "user".to_string(),
            content: Some(ChatMessageContent::String("Say hello".to_string())),
            name: None,
        }],
        stream: Some(stream),
        ..ChatCompletionRequest::default()
    }
}

/// One adapter keyed "scripted", one model keyed "demo-chat" routed to it.
pub fn demo_config() -> Config {
    Config {
        adapters: vec![AdapterConfig {
            key: "scripted".to_string(),
            r#type: "scripted".to_string(),
            api_key: "test_key".to_string(),
            params: Default::default(),
        }],
        models: vec![ModelConfig {
            key: "demo-chat".to_string(),
            r#type: "demo-model-v1".to_string(),
            adapter: "scripted".to_string(),
            params: Default::default(),
        }],
    }
}
