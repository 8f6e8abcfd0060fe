//! In-process implementation of the cloud provider ports.
//!
//! `InMemoryCloud` keeps instances, load balancers, and auto scaling groups
//! in a shared table and answers the same request shapes a real provider
//! would. It backs dry runs and tests: launches can be simulated with an
//! address that only appears after a number of describe calls, failures can
//! be injected per operation, and every call is counted.
//!
//! Clones share state.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use aem_common::{
    AutoScalingGroup, BlockDeviceMapping, InstanceDescriptor, LoadBalancerDescription,
    Reservation, Snapshot, TagDescription, TagMap,
};
use anyhow::Result;
use chrono::Utc;

use crate::application::ports::{AutoScalingApi, ComputeApi, LoadBalancerApi, operations};

#[derive(Debug, Default)]
struct SimInstance {
    private_ip: Option<String>,
    /// Describe calls needed before `private_ip` becomes visible.
    address_visible_after: u32,
    describes: u32,
    tags: TagMap,
    devices: Vec<BlockDeviceMapping>,
    terminated: bool,
}

#[derive(Debug, Default)]
struct CloudState {
    instances: BTreeMap<String, SimInstance>,
    load_balancers: BTreeMap<String, Option<String>>,
    groups: BTreeMap<String, AutoScalingGroup>,
    snapshots: Vec<Snapshot>,
    calls: BTreeMap<&'static str, u32>,
    failures: BTreeMap<&'static str, String>,
}

impl CloudState {
    /// Count the call and fail it if a failure was injected for `operation`.
    fn record(&mut self, operation: &'static str) -> Result<()> {
        *self.calls.entry(operation).or_default() += 1;
        if let Some(message) = self.failures.get(operation) {
            anyhow::bail!("{operation}: {message}");
        }
        Ok(())
    }

    fn instance_mut(&mut self, instance_id: &str) -> Result<&mut SimInstance> {
        self.instances
            .get_mut(instance_id)
            .ok_or_else(|| anyhow::anyhow!("InvalidInstanceID.NotFound: {instance_id}"))
    }
}

/// Process-local cloud provider.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCloud {
    state: Arc<Mutex<CloudState>>,
}

impl InMemoryCloud {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, CloudState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Setup ────────────────────────────────────────────────────────────────

    /// Add a running instance, optionally with its private address.
    pub fn add_instance(&self, instance_id: &str, private_ip: Option<&str>) -> &Self {
        self.add_pending_instance(instance_id, private_ip.unwrap_or_default(), 0)
    }

    /// Add a launching instance whose address shows from the
    /// `visible_from`-th describe call onward (1-based; 0 means at once).
    pub fn add_pending_instance(&self, instance_id: &str, private_ip: &str, visible_from: u32) -> &Self {
        let instance = SimInstance {
            private_ip: Some(private_ip.to_string()).filter(|ip| !ip.is_empty()),
            address_visible_after: visible_from.saturating_sub(1),
            ..SimInstance::default()
        };
        self.state().instances.insert(instance_id.to_string(), instance);
        self
    }

    /// Attach an EBS volume to an instance under `device_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the instance does not exist.
    pub fn attach_volume(&self, instance_id: &str, device_name: &str, volume_id: &str) -> Result<()> {
        self.state().instance_mut(instance_id)?.devices.push(BlockDeviceMapping {
            device_name: device_name.to_string(),
            volume_id: Some(volume_id.to_string()),
        });
        Ok(())
    }

    pub fn add_load_balancer(&self, name: &str, dns_name: Option<&str>) -> &Self {
        self.state()
            .load_balancers
            .insert(name.to_string(), dns_name.map(str::to_string));
        self
    }

    pub fn add_group(&self, name: &str, desired_capacity: u32, instance_ids: &[&str]) -> &Self {
        self.state().groups.insert(
            name.to_string(),
            AutoScalingGroup {
                name: name.to_string(),
                desired_capacity,
                instance_ids: instance_ids.iter().map(|id| (*id).to_string()).collect(),
            },
        );
        self
    }

    /// Make every later call to `operation` fail with `message`.
    pub fn fail_operation(&self, operation: &'static str, message: &str) -> &Self {
        self.state().failures.insert(operation, message.to_string());
        self
    }

    // ── Inspection ───────────────────────────────────────────────────────────

    /// Calls made to `operation` so far, failed ones included.
    #[must_use]
    pub fn calls(&self, operation: &str) -> u32 {
        self.state().calls.get(operation).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn tags(&self, instance_id: &str) -> TagMap {
        self.state()
            .instances
            .get(instance_id)
            .map(|i| i.tags.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_terminated(&self, instance_id: &str) -> bool {
        self.state()
            .instances
            .get(instance_id)
            .is_some_and(|i| i.terminated)
    }

    #[must_use]
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.state().snapshots.clone()
    }
}

impl ComputeApi for InMemoryCloud {
    async fn describe_instances(&self, instance_ids: &[&str]) -> Result<Vec<Reservation>> {
        let mut state = self.state();
        state.record(operations::DESCRIBE_INSTANCES)?;
        let mut reservations = Vec::new();
        for id in instance_ids {
            let Some(instance) = state.instances.get_mut(*id) else {
                continue;
            };
            let visible = instance.describes >= instance.address_visible_after;
            instance.describes += 1;
            reservations.push(Reservation {
                reservation_id: format!("r-{}", id.trim_start_matches("i-")),
                instances: vec![InstanceDescriptor {
                    instance_id: (*id).to_string(),
                    private_ip_address: instance.private_ip.clone().filter(|_| visible),
                }],
            });
        }
        Ok(reservations)
    }

    async fn terminate_instances(&self, instance_ids: &[&str]) -> Result<()> {
        let mut state = self.state();
        state.record(operations::TERMINATE_INSTANCES)?;
        for id in instance_ids {
            state.instance_mut(id)?.terminated = true;
            for group in state.groups.values_mut() {
                group.instance_ids.retain(|member| member != id);
            }
        }
        Ok(())
    }

    async fn describe_tags(&self, resource_id: &str) -> Result<Vec<TagDescription>> {
        let mut state = self.state();
        state.record(operations::DESCRIBE_TAGS)?;
        Ok(state
            .instances
            .get(resource_id)
            .map(|i| {
                i.tags
                    .iter()
                    .map(|(key, value)| TagDescription {
                        resource_id: resource_id.to_string(),
                        key: key.clone(),
                        value: value.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create_tags(&self, resource_ids: &[&str], tags: &TagMap) -> Result<()> {
        let mut state = self.state();
        state.record(operations::CREATE_TAGS)?;
        for id in resource_ids {
            let instance = state.instance_mut(id)?;
            instance
                .tags
                .extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Ok(())
    }

    async fn describe_block_device_mappings(
        &self,
        instance_id: &str,
    ) -> Result<Vec<BlockDeviceMapping>> {
        let mut state = self.state();
        state.record(operations::DESCRIBE_INSTANCE_ATTRIBUTE)?;
        Ok(state.instance_mut(instance_id)?.devices.clone())
    }

    async fn create_snapshot(&self, volume_id: &str, description: &str) -> Result<Snapshot> {
        let mut state = self.state();
        state.record(operations::CREATE_SNAPSHOT)?;
        let attached = state
            .instances
            .values()
            .flat_map(|i| &i.devices)
            .any(|d| d.volume_id.as_deref() == Some(volume_id));
        anyhow::ensure!(attached, "InvalidVolume.NotFound: {volume_id}");
        let snapshot = Snapshot {
            snapshot_id: format!("snap-{:017x}", state.snapshots.len() + 1),
            volume_id: volume_id.to_string(),
            description: description.to_string(),
            start_time: Utc::now(),
        };
        state.snapshots.push(snapshot.clone());
        Ok(snapshot)
    }
}

impl LoadBalancerApi for InMemoryCloud {
    async fn describe_load_balancers(
        &self,
        names: &[&str],
    ) -> Result<Vec<LoadBalancerDescription>> {
        let mut state = self.state();
        state.record(operations::DESCRIBE_LOAD_BALANCERS)?;
        Ok(names
            .iter()
            .filter_map(|name| {
                state.load_balancers.get(*name).map(|dns| LoadBalancerDescription {
                    name: (*name).to_string(),
                    dns_name: dns.clone(),
                })
            })
            .collect())
    }
}

impl AutoScalingApi for InMemoryCloud {
    async fn describe_auto_scaling_groups(&self, names: &[&str]) -> Result<Vec<AutoScalingGroup>> {
        let mut state = self.state();
        state.record(operations::DESCRIBE_AUTO_SCALING_GROUPS)?;
        Ok(names
            .iter()
            .filter_map(|name| state.groups.get(*name).cloned())
            .collect())
    }

    async fn set_desired_capacity(&self, group_name: &str, desired_capacity: u32) -> Result<()> {
        let mut state = self.state();
        state.record(operations::SET_DESIRED_CAPACITY)?;
        let group = state
            .groups
            .get_mut(group_name)
            .ok_or_else(|| anyhow::anyhow!("AutoScalingGroup name not found: {group_name}"))?;
        group.desired_capacity = desired_capacity;
        Ok(())
    }
}
