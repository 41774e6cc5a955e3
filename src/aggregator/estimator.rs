use tiktoken_rs::CoreBPE;
use tracing::warn;

use crate::models::chat::{ChatCompletionChoice, ChatCompletionRequest};
use crate::models::usage::Usage;

/// Fallback usage accounting for sessions whose transport never reported
/// usage. Prompt tokens count each request message as "role: content";
/// completion tokens count each choice's content plus the name and
/// arguments of every surviving tool call.
///
/// The tokenizer is acquired fresh per call and dropped on return; it is
/// never cached across sessions.
pub fn estimate_usage(request: &ChatCompletionRequest, choices: &[ChatCompletionChoice]) -> Usage {
    let bpe = match tiktoken_rs::cl100k_base() {
        Ok(bpe) => bpe,
        Err(err) => {
            warn!(error = %err, "tokenizer unavailable; reporting zero usage");
            return Usage::default();
        }
    };

    let prompt_tokens: u32 = request
        .messages
        .iter()
        .map(|message| count_tokens(&bpe, &format!("{}: {}", message.role, message.content_text())))
        .sum();

    let completion_tokens: u32 = choices
        .iter()
        .map(|choice| {
            let mut tokens = count_tokens(&bpe, &choice.message.content);
            for call in choice.message.tool_calls.iter().flatten() {
                tokens += count_tokens(&bpe, &call.function.name);
                tokens += count_tokens(&bpe, &call.function.arguments);
            }
            tokens
        })
        .sum();

    Usage {
        prompt_tokens,
        completion_tokens,
        total_tokens: prompt_tokens + completion_tokens,
    }
}

fn count_tokens(bpe: &CoreBPE, text: &str) -> u32 {
    bpe.encode_with_special_tokens(text).len() as u32
}
