//! Domain types and validators for orchestrator configuration.
//!
//! Pure functions only: no I/O, no async, no environment access. Loading
//! lives in `crate::infra::config`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_PROTOCOLS: &[&str] = &["http", "https"];

/// Attempts made to read a freshly launched instance's private address.
pub const DEFAULT_ADDRESS_POLL_ATTEMPTS: u32 = 20;
/// Seconds between two address reads.
pub const DEFAULT_ADDRESS_POLL_DELAY_SECS: u64 = 5;

// ── Retry policy ─────────────────────────────────────────────────────────────

/// Fixed-delay bounded retry schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Always at least 1.
    pub max_attempts: u32,
    /// Pause between two consecutive attempts. No pause follows the last.
    pub delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Worst-case time spent sleeping before giving up.
    #[must_use]
    pub fn max_wait(&self) -> Duration {
        self.delay * self.max_attempts.saturating_sub(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_ADDRESS_POLL_ATTEMPTS,
            Duration::from_secs(DEFAULT_ADDRESS_POLL_DELAY_SECS),
        )
    }
}

// ── Config schema ────────────────────────────────────────────────────────────

/// Orchestrator settings, read from `AEM_ORCHESTRATOR_*` variables or a
/// YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Protocol AEM instances are addressed with: `http` or `https` (default).
    #[serde(default = "default_protocol")]
    pub aem_protocol: String,

    /// Port author-dispatchers listen on.
    #[serde(default = "default_port")]
    pub dispatcher_port: u16,

    /// Port the author load balancer listens on.
    #[serde(default = "default_port")]
    pub author_port: u16,

    /// Name of the load balancer fronting the author instances.
    pub author_elb_name: String,

    /// Attempts made to read a new instance's private address.
    #[serde(default = "default_poll_attempts")]
    pub address_poll_attempts: u32,

    /// Seconds between address reads.
    #[serde(default = "default_poll_delay_secs")]
    pub address_poll_delay_secs: u64,

    /// Stamped as the `StackPrefix` tag on provisioned instances when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_prefix: Option<String>,
}

fn default_protocol() -> String {
    "https".to_string()
}

fn default_port() -> u16 {
    443
}

fn default_poll_attempts() -> u32 {
    DEFAULT_ADDRESS_POLL_ATTEMPTS
}

fn default_poll_delay_secs() -> u64 {
    DEFAULT_ADDRESS_POLL_DELAY_SECS
}

impl OrchestratorConfig {
    /// Config with defaults for everything but the author load balancer.
    #[must_use]
    pub fn new(author_elb_name: impl Into<String>) -> Self {
        Self {
            aem_protocol: default_protocol(),
            dispatcher_port: default_port(),
            author_port: default_port(),
            author_elb_name: author_elb_name.into(),
            address_poll_attempts: default_poll_attempts(),
            address_poll_delay_secs: default_poll_delay_secs(),
            stack_prefix: None,
        }
    }

    /// Validates every field.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.author_elb_name.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "author_elb_name",
            });
        }
        if !VALID_PROTOCOLS.contains(&self.aem_protocol.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "aem_protocol",
                value: self.aem_protocol.clone(),
                valid: VALID_PROTOCOLS.join(", "),
            });
        }
        for (key, port) in [
            ("dispatcher_port", self.dispatcher_port),
            ("author_port", self.author_port),
        ] {
            if port == 0 {
                return Err(ConfigError::InvalidValue {
                    key,
                    value: port.to_string(),
                    valid: "1-65535".to_string(),
                });
            }
        }
        if self.address_poll_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "address_poll_attempts",
                value: "0".to_string(),
                valid: "at least 1".to_string(),
            });
        }
        if self
            .stack_prefix
            .as_deref()
            .is_some_and(|p| p.trim().is_empty())
        {
            return Err(ConfigError::Missing {
                key: "stack_prefix",
            });
        }
        Ok(())
    }

    /// Schedule used while waiting for a private address.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.address_poll_attempts,
            Duration::from_secs(self.address_poll_delay_secs),
        )
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
