use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub adapters: Vec<AdapterConfig>,
    #[serde(default)]
    pub models: Vec<ModelConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AdapterConfig {
    pub key: String,
    pub r#type: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(flatten)]
    pub params: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModelConfig {
    pub key: String,
    pub r#type: String, // Actual model name, e.g. "gpt-4o"
    pub adapter: String, // Key of the AdapterConfig entry
    #[serde(flatten)]
    pub params: HashMap<String, String>,
}
