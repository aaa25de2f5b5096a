//! Logging setup.

mod tracing;

pub use self::tracing::{TracingConfig, TracingInitError};
