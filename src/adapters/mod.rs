pub mod adapter;
pub mod capabilities;
pub mod registry;

pub use adapter::{Adapter, ChunkStream, StreamCanceller, StreamHandle};
pub use capabilities::{Capabilities, Capability};
pub use registry::AdapterRegistry;
