use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_stream::stream;
use chrono::Utc;
use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use super::estimator;
use crate::adapters::adapter::{ChunkStream, StreamCanceller, StreamHandle};
use crate::errors::{Error, Result};
use crate::models::chat::{
    AssistantMessage, ChatCompletion, ChatCompletionChoice, ChatCompletionRequest,
};
use crate::models::streaming::{ChatCompletionChunk, ChunkChoice, ToolCallDelta};
use crate::models::tool::{ChatMessageToolCall, FunctionCall};
use crate::models::usage::Usage;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Init,
    Streaming,
    Completed,
    Cancelled,
    Errored,
}

/// Per-(choice, tool-call index) accumulation slot. Arguments grow by pure
/// append; id and type freeze on first non-empty value; the function name
/// arrives whole and overwrites.
#[derive(Default)]
struct ToolCallSlot {
    id: String,
    r#type: String,
    name: String,
    arguments: String,
}

impl ToolCallSlot {
    fn merge(&mut self, fragment: &ToolCallDelta) {
        if self.id.is_empty() {
            if let Some(id) = &fragment.id {
                if !id.is_empty() {
                    self.id = id.clone();
                }
            }
        }
        if self.r#type.is_empty() {
            if let Some(r#type) = &fragment.r#type {
                if !r#type.is_empty() {
                    self.r#type = r#type.clone();
                }
            }
        }
        if let Some(function) = &fragment.function {
            if let Some(name) = &function.name {
                self.name = name.clone();
            }
            if let Some(arguments) = &function.arguments {
                self.arguments.push_str(arguments);
            }
        }
    }

    /// Slots missing an id or a name are noise from partial or aborted
    /// fragments and never reach the final result.
    fn is_complete(&self) -> bool {
        !self.id.is_empty() && !self.name.is_empty()
    }

    fn freeze(self) -> ChatMessageToolCall {
        ChatMessageToolCall {
            id: self.id,
            r#type: if self.r#type.is_empty() {
                "function".to_string()
            } else {
                self.r#type
            },
            function: FunctionCall {
                name: self.name,
                arguments: self.arguments,
            },
        }
    }
}

#[derive(Default)]
struct ChoiceAccumulator {
    role: String,
    content: String,
    reasoning_content: String,
    finish_reason: Option<String>,
    tool_calls: Vec<ToolCallSlot>,
}

impl ChoiceAccumulator {
    fn fold(&mut self, choice: &ChunkChoice) {
        if self.role.is_empty() {
            if let Some(role) = &choice.delta.role {
                self.role = role.clone();
            }
        }
        if let Some(content) = &choice.delta.content {
            self.content.push_str(content);
        }
        if let Some(reasoning) = &choice.delta.reasoning_content {
            self.reasoning_content.push_str(reasoning);
        }
        if choice.finish_reason.is_some() {
            self.finish_reason = choice.finish_reason.clone();
        }
        for fragment in choice.delta.tool_calls.iter().flatten() {
            let index = fragment.index as usize;
            if self.tool_calls.len() <= index {
                self.tool_calls.resize_with(index + 1, ToolCallSlot::default);
            }
            self.tool_calls[index].merge(fragment);
        }
    }

    fn freeze(self, index: u32) -> ChatCompletionChoice {
        let tool_calls: Vec<ChatMessageToolCall> = self
            .tool_calls
            .into_iter()
            .filter(ToolCallSlot::is_complete)
            .map(ToolCallSlot::freeze)
            .collect();

        ChatCompletionChoice {
            index,
            message: AssistantMessage {
                role: if self.role.is_empty() {
                    "assistant".to_string()
                } else {
                    self.role
                },
                content: self.content,
                reasoning_content: if self.reasoning_content.is_empty() {
                    None
                } else {
                    Some(self.reasoning_content)
                },
                tool_calls: if tool_calls.is_empty() {
                    None
                } else {
                    Some(tool_calls)
                },
            },
            finish_reason: self.finish_reason,
        }
    }
}

struct SessionInner {
    request: ChatCompletionRequest,
    chunks: Option<ChunkStream>,
    state: SessionState,
    choices: Vec<ChoiceAccumulator>,
    usage: Option<Usage>,
    chunks_seen: bool,
    error: Option<String>,
    finished: Option<ChatCompletion>,
}

impl SessionInner {
    fn fold(&mut self, chunk: &ChatCompletionChunk) {
        self.chunks_seen = true;
        for chunk_choice in &chunk.choices {
            let index = chunk_choice.index as usize;
            if self.choices.len() <= index {
                self.choices
                    .resize_with(index + 1, ChoiceAccumulator::default);
            }
            self.choices[index].fold(chunk_choice);
        }
        if let Some(usage) = &chunk.usage {
            // Most recently observed usage is authoritative.
            self.usage = Some(usage.clone());
        }
    }

    fn record_error(&mut self, err: &Error) {
        warn!(error = %err, "stream transport error");
        self.error = Some(err.to_string());
        self.state = SessionState::Errored;
    }

    fn finalize(&mut self, cancelled: bool) -> Result<ChatCompletion> {
        if let Some(done) = &self.finished {
            return Ok(done.clone());
        }
        if !self.chunks_seen && self.error.is_some() {
            return Err(Error::NoResultProduced);
        }
        if self.error.is_some() {
            warn!("stream terminated early; materializing partial completion");
        }

        // Release the transport; nothing more will be pulled.
        self.chunks = None;

        let choices: Vec<ChatCompletionChoice> = std::mem::take(&mut self.choices)
            .into_iter()
            .enumerate()
            .map(|(index, accumulator)| accumulator.freeze(index as u32))
            .collect();

        let usage = match self.usage.take() {
            Some(usage) => usage,
            None => estimator::estimate_usage(&self.request, &choices),
        };

        let model = if self.request.model.is_empty() {
            "unknown".to_string()
        } else {
            self.request.model.clone()
        };

        let completion = ChatCompletion {
            id: format!("chatcmpl-{}", Uuid::new_v4()),
            object: "chat.completion".to_string(),
            created: Utc::now().timestamp(),
            model,
            choices,
            usage,
        };

        self.state = if cancelled {
            SessionState::Cancelled
        } else if self.error.is_some() {
            SessionState::Errored
        } else {
            SessionState::Completed
        };
        self.finished = Some(completion.clone());
        Ok(completion)
    }
}

/// One streaming generation session: forwards chunks live while folding
/// every chunk into an aggregate, then freezes a single `chat.completion`
/// result on demand.
///
/// The session is the only consumer of the adapter's stream. `events()`
/// performs the fold as a side effect before yielding each chunk, so live
/// forwarding and aggregation can never diverge.
pub struct AggregatorSession {
    inner: Arc<Mutex<SessionInner>>,
    cancelled: Arc<AtomicBool>,
    canceller: Arc<StdMutex<Option<Box<dyn StreamCanceller>>>>,
}

impl AggregatorSession {
    pub fn new(request: ChatCompletionRequest, handle: StreamHandle) -> Self {
        let (chunks, canceller) = handle.into_parts();
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                request,
                chunks: Some(chunks),
                state: SessionState::Init,
                choices: Vec::new(),
                usage: None,
                chunks_seen: false,
                error: None,
                finished: None,
            })),
            cancelled: Arc::new(AtomicBool::new(false)),
            canceller: Arc::new(StdMutex::new(Some(canceller))),
        }
    }

    /// The live forwarding sequence. Each chunk is folded into session
    /// state and then yielded, atomically with respect to the next chunk.
    /// A transport error is forwarded as the terminal item.
    pub fn events(&self) -> BoxStream<'static, Result<ChatCompletionChunk>> {
        let inner = Arc::clone(&self.inner);
        let cancelled = Arc::clone(&self.cancelled);
        Box::pin(stream! {
            loop {
                let mut guard = inner.lock().await;
                if guard.finished.is_some() || guard.state == SessionState::Errored {
                    break;
                }
                if cancelled.load(Ordering::SeqCst) {
                    guard.state = SessionState::Cancelled;
                    break;
                }
                guard.state = SessionState::Streaming;
                let next = match guard.chunks.as_mut() {
                    Some(chunks) => chunks.next().await,
                    None => None,
                };
                match next {
                    Some(Ok(chunk)) => {
                        guard.fold(&chunk);
                        drop(guard);
                        yield Ok(chunk);
                    }
                    Some(Err(err)) => {
                        guard.record_error(&err);
                        drop(guard);
                        yield Err(err);
                        break;
                    }
                    None => {
                        let _ = guard.finalize(cancelled.load(Ordering::SeqCst));
                        break;
                    }
                }
            }
        })
    }

    /// Materializes the frozen completion, draining any chunks the live
    /// consumer never pulled. Idempotent: every call observes the same
    /// snapshot, and concurrent callers await a single in-flight drain.
    pub async fn final_chat_completion(&self) -> Result<ChatCompletion> {
        let mut guard = self.inner.lock().await;
        if let Some(done) = &guard.finished {
            return Ok(done.clone());
        }
        while guard.state != SessionState::Errored && !self.cancelled.load(Ordering::SeqCst) {
            guard.state = SessionState::Streaming;
            let next = match guard.chunks.as_mut() {
                Some(chunks) => chunks.next().await,
                None => None,
            };
            match next {
                Some(Ok(chunk)) => guard.fold(&chunk),
                Some(Err(err)) => {
                    guard.record_error(&err);
                    break;
                }
                None => break,
            }
        }
        guard.finalize(self.cancelled.load(Ordering::SeqCst))
    }

    /// Cooperative cancellation: aborts the adapter's transport and stops
    /// further chunk delivery. A later `final_chat_completion()` still
    /// returns a best-effort result from whatever was accumulated.
    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Ok(mut slot) = self.canceller.lock() {
            if let Some(mut canceller) = slot.take() {
                canceller.cancel();
            }
        }
    }

    pub async fn state(&self) -> SessionState {
        let guard = self.inner.lock().await;
        match guard.state {
            SessionState::Completed | SessionState::Errored => guard.state,
            state => {
                if self.cancelled.load(Ordering::SeqCst) {
                    SessionState::Cancelled
                } else {
                    state
                }
            }
        }
    }
}
