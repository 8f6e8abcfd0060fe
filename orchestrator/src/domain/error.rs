//! Typed domain error enums.
//!
//! Provider and registrar ports report opaque `anyhow` errors; the gateway
//! classifies them into [`GatewayError`] so callers can tell a rejected
//! request apart from a resource that does not exist.

use std::fmt;

use thiserror::Error;

/// Boxed provider failure carried as the source of a remote error.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

// ── Gateway errors ────────────────────────────────────────────────────────────

/// Kind of cloud resource a lookup targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    BlockDevice,
    LoadBalancer,
    ScalingGroup,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BlockDevice => "block device",
            Self::LoadBalancer => "load balancer",
            Self::ScalingGroup => "auto scaling group",
        })
    }
}

/// Failures surfaced by the cloud resource gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The provider rejected or failed the request (auth, throttling,
    /// validation, transport).
    #[error("{operation} failed")]
    RemoteService {
        operation: &'static str,
        #[source]
        source: BoxedSource,
    },

    /// The looked-up resource does not exist.
    #[error("{kind} '{name}' not found")]
    NotFound { kind: ResourceKind, name: String },
}

impl GatewayError {
    /// Wrap an opaque provider error as a remote-service failure.
    pub fn remote(operation: &'static str, source: anyhow::Error) -> Self {
        Self::RemoteService {
            operation,
            source: source.into(),
        }
    }

    pub fn not_found(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ── Topology errors ───────────────────────────────────────────────────────────

/// Failures while resolving the base URLs of an instance and its peer.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("private address of instance {instance_id} was never assigned")]
    UnresolvedAddress { instance_id: String },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to orchestrator configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must not be empty")]
    Missing { key: &'static str },

    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: &'static str,
        value: String,
        valid: String,
    },
}
