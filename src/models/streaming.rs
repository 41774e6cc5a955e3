use serde::{Deserialize, Serialize};

use super::usage::Usage;

/// One increment of a streaming generation response.
///
/// Consumed once: the aggregator folds it into session state and forwards
/// it to the live consumer in the same step.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub id: String,
    pub choices: Vec<ChunkChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct ChunkChoice {
    #[serde(default)]
    pub index: u32,
    pub delta: ChoiceDelta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct ChoiceDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallDelta>>,
}

/// One fragment of a tool call. Keyed by `index`, not `id`: the id may
/// arrive on a later fragment than the first one for that slot.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct ToolCallDelta {
    pub index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<FunctionDelta>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct FunctionDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}
