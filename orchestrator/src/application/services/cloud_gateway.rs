//! Cloud resource gateway: the single point of contact with the provider's
//! compute, load balancing, auto scaling, and storage APIs.
//!
//! Every operation is one remote call with no local retry, except
//! [`CloudResourceGateway::resolve_private_address`], which polls while a
//! freshly launched instance has not yet been assigned an address.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use aem_common::{AutoScalingGroup, TagMap};

use crate::application::ports::{CloudProvider, Sleeper, operations};
use crate::application::services::retry::{PollResult, Probe, poll_until};
use crate::domain::{GatewayError, ResourceKind, RetryPolicy};

/// Wraps a [`CloudProvider`] with typed errors and the address polling
/// policy.
pub struct CloudResourceGateway<P, S> {
    provider: P,
    sleeper: S,
    address_policy: RetryPolicy,
}

impl<P: CloudProvider, S: Sleeper> CloudResourceGateway<P, S> {
    pub fn new(provider: P, sleeper: S, address_policy: RetryPolicy) -> Self {
        Self {
            provider,
            sleeper,
            address_policy,
        }
    }

    /// The underlying provider client.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn address_policy(&self) -> RetryPolicy {
        self.address_policy
    }

    // ── Instances ────────────────────────────────────────────────────────────

    /// Private IP address of an instance.
    ///
    /// Returns `None` at once if the provider has no reservation for the
    /// instance. Otherwise the instance is described again, up to the policy
    /// bound, while its address is still unassigned; `None` is returned if
    /// it never appears.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::RemoteService`] if a describe call fails.
    pub async fn resolve_private_address(
        &self,
        instance_id: &str,
    ) -> Result<Option<String>, GatewayError> {
        let provider = &self.provider;
        let result = poll_until(self.address_policy, &self.sleeper, |attempt| async move {
            let reservations = provider
                .describe_instances(&[instance_id])
                .await
                .map_err(|e| GatewayError::remote(operations::DESCRIBE_INSTANCES, e))?;
            let Some(instance) = reservations
                .iter()
                .flat_map(|r| &r.instances)
                .find(|i| i.instance_id == instance_id)
            else {
                tracing::debug!(instance_id, attempt, "no reservation for instance");
                return Ok(Probe::Abandon);
            };
            Ok::<_, GatewayError>(match instance.resolved_private_ip() {
                Some(ip) => Probe::Ready(ip.to_string()),
                None => Probe::Pending,
            })
        })
        .await?;

        match &result {
            PollResult::Ready { attempts, .. } => {
                tracing::debug!(instance_id, attempts, "private address resolved");
            }
            PollResult::Abandoned { .. } => {}
            PollResult::Exhausted { attempts } => tracing::warn!(
                instance_id,
                attempts,
                waited = ?self.address_policy.max_wait(),
                "private address still unassigned, giving up"
            ),
        }
        Ok(result.into_value())
    }

    /// Terminate an instance. Not retried.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::RemoteService`] if the provider rejects it.
    pub async fn terminate_instance(&self, instance_id: &str) -> Result<(), GatewayError> {
        tracing::info!(instance_id, "terminating instance");
        self.provider
            .terminate_instances(&[instance_id])
            .await
            .map_err(|e| GatewayError::remote(operations::TERMINATE_INSTANCES, e))
    }

    // ── Tags ─────────────────────────────────────────────────────────────────

    /// Every tag on an instance.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::RemoteService`] if the describe call fails.
    pub async fn get_tags(&self, instance_id: &str) -> Result<TagMap, GatewayError> {
        let tags = self
            .provider
            .describe_tags(instance_id)
            .await
            .map_err(|e| GatewayError::remote(operations::DESCRIBE_TAGS, e))?;
        Ok(tags.into_iter().map(|t| (t.key, t.value)).collect())
    }

    /// Add tags to an instance. Existing tags with other keys are kept by
    /// the provider; an empty map makes no call.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::RemoteService`] if the provider rejects it.
    pub async fn add_tags(&self, instance_id: &str, tags: &TagMap) -> Result<(), GatewayError> {
        if tags.is_empty() {
            return Ok(());
        }
        tracing::debug!(instance_id, keys = ?tags.keys().collect::<Vec<_>>(), "adding tags");
        self.provider
            .create_tags(&[instance_id], tags)
            .await
            .map_err(|e| GatewayError::remote(operations::CREATE_TAGS, e))
    }

    // ── Auto scaling groups ──────────────────────────────────────────────────

    /// Instance ids currently in a group. Order carries no meaning.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] for an unknown group, or
    /// [`GatewayError::RemoteService`] if the describe call fails.
    pub async fn list_group_members(&self, group_name: &str) -> Result<Vec<String>, GatewayError> {
        Ok(self.describe_group(group_name).await?.instance_ids)
    }

    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] for an unknown group, or
    /// [`GatewayError::RemoteService`] if the describe call fails.
    pub async fn get_desired_capacity(&self, group_name: &str) -> Result<u32, GatewayError> {
        Ok(self.describe_group(group_name).await?.desired_capacity)
    }

    /// Set a group's desired capacity. Membership follows eventually.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::RemoteService`] if the provider rejects it.
    pub async fn set_desired_capacity(
        &self,
        group_name: &str,
        desired_capacity: u32,
    ) -> Result<(), GatewayError> {
        tracing::info!(group = group_name, desired_capacity, "setting desired capacity");
        self.provider
            .set_desired_capacity(group_name, desired_capacity)
            .await
            .map_err(|e| GatewayError::remote(operations::SET_DESIRED_CAPACITY, e))
    }

    async fn describe_group(&self, group_name: &str) -> Result<AutoScalingGroup, GatewayError> {
        self.provider
            .describe_auto_scaling_groups(&[group_name])
            .await
            .map_err(|e| GatewayError::remote(operations::DESCRIBE_AUTO_SCALING_GROUPS, e))?
            .into_iter()
            .find(|g| g.name == group_name)
            .ok_or_else(|| GatewayError::not_found(ResourceKind::ScalingGroup, group_name))
    }

    // ── Volumes and snapshots ────────────────────────────────────────────────

    /// Volume attached to an instance under `device_name`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if no EBS mapping matches the
    /// device, or [`GatewayError::RemoteService`] if the describe call fails.
    pub async fn resolve_volume_id(
        &self,
        instance_id: &str,
        device_name: &str,
    ) -> Result<String, GatewayError> {
        self.provider
            .describe_block_device_mappings(instance_id)
            .await
            .map_err(|e| GatewayError::remote(operations::DESCRIBE_INSTANCE_ATTRIBUTE, e))?
            .into_iter()
            .find(|m| m.device_name == device_name)
            .and_then(|m| m.volume_id)
            .ok_or_else(|| {
                GatewayError::not_found(
                    ResourceKind::BlockDevice,
                    format!("{instance_id}:{device_name}"),
                )
            })
    }

    /// Start a snapshot of a volume and return its id. Not retried.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::RemoteService`] if the provider rejects it.
    pub async fn create_snapshot(
        &self,
        volume_id: &str,
        description: &str,
    ) -> Result<String, GatewayError> {
        let snapshot = self
            .provider
            .create_snapshot(volume_id, description)
            .await
            .map_err(|e| GatewayError::remote(operations::CREATE_SNAPSHOT, e))?;
        tracing::info!(volume_id, snapshot_id = %snapshot.snapshot_id, "snapshot started");
        Ok(snapshot.snapshot_id)
    }

    /// Snapshot the volume an instance has attached under `device_name`.
    ///
    /// # Errors
    ///
    /// Fails as [`Self::resolve_volume_id`] or [`Self::create_snapshot`] do.
    pub async fn snapshot_device(
        &self,
        instance_id: &str,
        device_name: &str,
        description: &str,
    ) -> Result<String, GatewayError> {
        let volume_id = self.resolve_volume_id(instance_id, device_name).await?;
        self.create_snapshot(&volume_id, description).await
    }

    // ── Load balancers ───────────────────────────────────────────────────────

    /// DNS name of a load balancer.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if the balancer does not exist or
    /// has no DNS name, or [`GatewayError::RemoteService`] if the describe
    /// call fails.
    pub async fn resolve_load_balancer_address(&self, elb_name: &str) -> Result<String, GatewayError> {
        self.provider
            .describe_load_balancers(&[elb_name])
            .await
            .map_err(|e| GatewayError::remote(operations::DESCRIBE_LOAD_BALANCERS, e))?
            .into_iter()
            .filter(|lb| lb.name == elb_name)
            .find_map(|lb| lb.dns_name.filter(|dns| !dns.is_empty()))
            .ok_or_else(|| GatewayError::not_found(ResourceKind::LoadBalancer, elb_name))
    }
}
