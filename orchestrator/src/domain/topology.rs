//! Base URLs an author-dispatcher and its peer are addressed at.

use serde::{Deserialize, Serialize};

/// Addresses resolved for one provisioning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// Base URL of the instance being provisioned.
    pub instance_base_url: String,
    /// Base URL of the load-balanced peer the flush agent is created on.
    pub peer_base_url: String,
    /// Host identity stamped on the instance as routing metadata.
    pub upstream_host: String,
}

/// `"{protocol}://{host}:{port}"`
#[must_use]
pub fn base_url(protocol: &str, host: &str, port: u16) -> String {
    format!("{protocol}://{host}:{port}")
}
