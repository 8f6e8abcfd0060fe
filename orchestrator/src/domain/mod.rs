//! Domain layer: pure types, classification, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::application`,
//! `tokio`, `std::fs`, or `std::net`. All functions are synchronous and take
//! data in, returning data out.

pub mod config;
pub mod error;
pub mod outcome;
pub mod topology;

pub use config::{OrchestratorConfig, RetryPolicy};
pub use error::{ConfigError, GatewayError, ResourceKind, TopologyError};
pub use outcome::{ProvisioningOutcome, ProvisioningStep};
pub use topology::{Topology, base_url};
