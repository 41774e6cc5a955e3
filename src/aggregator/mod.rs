pub mod estimator;
pub mod session;

pub use session::{AggregatorSession, SessionState};
