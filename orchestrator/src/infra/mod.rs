//! Infrastructure layer: concrete implementations of application port traits
//! and process-level bootstrap (configuration, tracing).
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.

pub mod config;
pub mod memory;
pub mod sleeper;
pub mod telemetry;

pub use memory::InMemoryCloud;
pub use sleeper::TokioSleeper;
