use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::adapter::Adapter;

/// Keyed set of registered adapters. Registration runs the adapter's
/// `validate()` hook and refuses misconfigured backends up front.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn Adapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: impl Into<String>, adapter: Arc<dyn Adapter>) -> Result<()> {
        let key = key.into();
        adapter
            .validate()
            .map_err(|e| anyhow::anyhow!("adapter '{}' failed validation: {}", key, e))?;
        debug!(adapter = %key, "registered adapter");
        self.adapters.insert(key, adapter);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn Adapter>> {
        self.adapters.get(key).cloned()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.adapters.keys()
    }
}
