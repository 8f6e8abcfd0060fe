use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tag key to tag value; keys are unique per resource
pub type TagMap = BTreeMap<String, String>;

/// AEM run mode a flush agent is registered under
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Author,
    Publish,
}

impl RunMode {
    /// Value used by the AEM administrative API.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Publish => "publish",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown run mode '{0}': expected 'author' or 'publish'")]
pub struct UnknownRunMode(pub String);

impl FromStr for RunMode {
    type Err = UnknownRunMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "author" => Ok(Self::Author),
            "publish" => Ok(Self::Publish),
            _ => Err(UnknownRunMode(s.to_string())),
        }
    }
}

/// Request to create (or overwrite) a flush agent on an AEM instance.
///
/// The agent lives on `source_base_url` and flushes to `target_base_url`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlushAgentRequest {
    pub owner_instance_id: String,
    pub source_base_url: String,
    pub target_base_url: String,
    pub run_mode: RunMode,
}

/// One reservation returned by an instance describe call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Reservation {
    pub reservation_id: String,
    pub instances: Vec<InstanceDescriptor>,
}

/// Provider view of a compute instance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceDescriptor {
    pub instance_id: String,
    /// Populated asynchronously by the provider after launch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ip_address: Option<String>,
}

impl InstanceDescriptor {
    /// The private address, treating an empty string as not yet assigned.
    #[must_use]
    pub fn resolved_private_ip(&self) -> Option<&str> {
        self.private_ip_address
            .as_deref()
            .filter(|ip| !ip.trim().is_empty())
    }
}

/// A single tag as reported by a tag describe call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagDescription {
    pub resource_id: String,
    pub key: String,
    pub value: String,
}

/// Block device attached to an instance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockDeviceMapping {
    /// e.g. `/dev/sda1`
    pub device_name: String,
    /// Absent for non-EBS (instance store) devices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadBalancerDescription {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_name: Option<String>,
}

/// Provider view of an auto scaling group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutoScalingGroup {
    pub name: String,
    pub desired_capacity: u32,
    /// Member instance ids; order carries no meaning.
    #[serde(default)]
    pub instance_ids: Vec<String>,
}

/// A volume snapshot accepted by the provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    pub snapshot_id: String,
    pub volume_id: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
}
