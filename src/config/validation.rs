use std::collections::HashSet;

use super::models::Config;

/// Validates the logical consistency of a Config.
/// Returns Ok(()) if valid, or Err(Vec<String>) with a list of error messages if invalid.
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let mut adapter_keys: HashSet<&String> = HashSet::new();
    for adapter in &config.adapters {
        if adapter.key.is_empty() {
            errors.push("Adapter with empty key.".to_string());
        }
        if !adapter_keys.insert(&adapter.key) {
            errors.push(format!("Duplicate adapter key '{}'.", adapter.key));
        }
    }

    let mut model_keys: HashSet<&String> = HashSet::new();
    for model in &config.models {
        if model.key.is_empty() {
            errors.push("Model with empty key.".to_string());
        }
        if !model_keys.insert(&model.key) {
            errors.push(format!("Duplicate model key '{}'.", model.key));
        }
        if !adapter_keys.contains(&model.adapter) {
            errors.push(format!(
                "Model '{}' references non-existent adapter '{}'.",
                model.key, model.adapter
            ));
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
