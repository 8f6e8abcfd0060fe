//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! Cloud ports mirror the provider's own request/response shapes; they
//! report failures as opaque `anyhow` errors and never retry. This file
//! imports only from `crate::domain` and `aem_common`, never from
//! `crate::infra`.

use std::time::Duration;

use aem_common::{
    AutoScalingGroup, BlockDeviceMapping, FlushAgentRequest, LoadBalancerDescription, Reservation,
    Snapshot, TagDescription, TagMap,
};
use anyhow::Result;

use crate::domain::{Topology, TopologyError};

// ── Provider operation names ─────────────────────────────────────────────────

/// Provider API operation names, used in error reports and call accounting.
pub mod operations {
    pub const DESCRIBE_INSTANCES: &str = "DescribeInstances";
    pub const TERMINATE_INSTANCES: &str = "TerminateInstances";
    pub const DESCRIBE_TAGS: &str = "DescribeTags";
    pub const CREATE_TAGS: &str = "CreateTags";
    pub const DESCRIBE_INSTANCE_ATTRIBUTE: &str = "DescribeInstanceAttribute";
    pub const CREATE_SNAPSHOT: &str = "CreateSnapshot";
    pub const DESCRIBE_LOAD_BALANCERS: &str = "DescribeLoadBalancers";
    pub const DESCRIBE_AUTO_SCALING_GROUPS: &str = "DescribeAutoScalingGroups";
    pub const SET_DESIRED_CAPACITY: &str = "SetDesiredCapacity";
}

// ── Cloud Port Traits ─────────────────────────────────────────────────────────

/// Compute instance, tag, block device, and snapshot operations.
#[allow(async_fn_in_trait)]
pub trait ComputeApi {
    /// Describe the given instances. Unknown ids yield no reservation.
    async fn describe_instances(&self, instance_ids: &[&str]) -> Result<Vec<Reservation>>;
    /// Request termination of the given instances.
    async fn terminate_instances(&self, instance_ids: &[&str]) -> Result<()>;
    /// List every tag on a resource.
    async fn describe_tags(&self, resource_id: &str) -> Result<Vec<TagDescription>>;
    /// Add or overwrite tags on the given resources. Other tags are kept.
    async fn create_tags(&self, resource_ids: &[&str], tags: &TagMap) -> Result<()>;
    /// Read the `blockDeviceMapping` attribute of an instance.
    async fn describe_block_device_mappings(
        &self,
        instance_id: &str,
    ) -> Result<Vec<BlockDeviceMapping>>;
    /// Start a snapshot of a volume.
    async fn create_snapshot(&self, volume_id: &str, description: &str) -> Result<Snapshot>;
}

/// Classic load balancer operations.
#[allow(async_fn_in_trait)]
pub trait LoadBalancerApi {
    /// Describe the named load balancers. Unknown names yield no description.
    async fn describe_load_balancers(
        &self,
        names: &[&str],
    ) -> Result<Vec<LoadBalancerDescription>>;
}

/// Auto scaling group operations.
#[allow(async_fn_in_trait)]
pub trait AutoScalingApi {
    /// Describe the named groups. Unknown names yield no group.
    async fn describe_auto_scaling_groups(&self, names: &[&str]) -> Result<Vec<AutoScalingGroup>>;
    /// Set a group's desired capacity. Membership converges later.
    async fn set_desired_capacity(&self, group_name: &str, desired_capacity: u32) -> Result<()>;
}

/// Composite trait: any type implementing all three cloud APIs is a `CloudProvider`.
pub trait CloudProvider: ComputeApi + LoadBalancerApi + AutoScalingApi {}

/// Blanket implementation: any type implementing all three sub-traits is a `CloudProvider`.
impl<T> CloudProvider for T where T: ComputeApi + LoadBalancerApi + AutoScalingApi {}

// ── Clock Port ────────────────────────────────────────────────────────────────

/// Suspends the caller between poll attempts, so tests can run retry
/// schedules without wall-clock delay.
#[allow(async_fn_in_trait)]
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

impl<T: Sleeper> Sleeper for &T {
    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await;
    }
}

// ── Provisioning collaborator ports ───────────────────────────────────────────

/// Maps an instance to the base URLs it and its peer are addressed at.
#[allow(async_fn_in_trait)]
pub trait TopologyResolver {
    /// Resolve the addresses used to provision `instance_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::UnresolvedAddress`] when the instance never
    /// reported an address, or another variant for any lookup failure.
    async fn resolve(&self, instance_id: &str) -> Result<Topology, TopologyError>;
}

impl<T: TopologyResolver> TopologyResolver for &T {
    async fn resolve(&self, instance_id: &str) -> Result<Topology, TopologyError> {
        (**self).resolve(instance_id).await
    }
}

/// Creates (or overwrites) flush agents through the AEM administrative API.
///
/// Creation is expected to be idempotent for a given run mode and owner
/// instance; this is not verified locally.
#[allow(async_fn_in_trait)]
pub trait FlushAgentRegistrar {
    /// # Errors
    ///
    /// Returns an error if the AEM API rejects the request.
    async fn create_flush_agent(&self, request: &FlushAgentRequest) -> Result<()>;
}

impl<T: FlushAgentRegistrar> FlushAgentRegistrar for &T {
    async fn create_flush_agent(&self, request: &FlushAgentRequest) -> Result<()> {
        (**self).create_flush_agent(request).await
    }
}

// ── Action Port ───────────────────────────────────────────────────────────────

/// An orchestration step run once per instance event.
///
/// Returns `true` only when every step succeeded; failures are logged and
/// never cross this boundary as errors.
#[allow(async_fn_in_trait)]
pub trait Action {
    async fn execute(&self, instance_id: &str) -> bool;
}
