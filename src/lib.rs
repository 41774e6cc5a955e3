pub mod adapters;
pub mod aggregator;
pub mod config;
pub mod errors;
pub mod facade;
pub mod models;

pub use adapters::{Adapter, AdapterRegistry, Capabilities, Capability, StreamHandle};
pub use aggregator::{AggregatorSession, SessionState};
pub use errors::{Error, Result};
pub use facade::{ChatCompletionResponse, GenerationFacade};

// Re-exported for downstream adapter implementations.
pub use async_trait;
pub use futures;
pub use serde;
pub use serde_json;
