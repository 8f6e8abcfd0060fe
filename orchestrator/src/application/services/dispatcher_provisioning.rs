//! Application service: author-dispatcher provisioning use-case.
//!
//! Runs once per scale-up event for a new author-dispatcher:
//!
//! 1. resolve the instance's own base URL and its author peer,
//! 2. create an author flush agent on the peer that flushes this instance,
//! 3. tag the instance with its upstream author host,
//! 4. report completion.
//!
//! Every step is terminal on failure and nothing is rolled back: a tagging
//! failure can leave a flush agent behind for an untagged instance. Re-running
//! is safe because the registrar overwrites an existing agent for the same
//! run mode and instance.
//!
//! Imports only from `crate::domain` and `crate::application`.

use std::sync::Arc;

use aem_common::{FlushAgentRequest, RunMode, TagMap, tag_names, tag_pair};

use crate::application::ports::{
    Action, CloudProvider, FlushAgentRegistrar, Sleeper, TopologyResolver,
};
use crate::application::services::cloud_gateway::CloudResourceGateway;
use crate::domain::{ProvisioningOutcome, ProvisioningStep, Topology, TopologyError};

/// Provisions newly launched author-dispatchers.
pub struct DispatcherProvisioningWorkflow<T, R, P, S> {
    topology: T,
    registrar: R,
    gateway: Arc<CloudResourceGateway<P, S>>,
    stack_prefix: Option<String>,
}

impl<T, R, P, S> DispatcherProvisioningWorkflow<T, R, P, S>
where
    T: TopologyResolver,
    R: FlushAgentRegistrar,
    P: CloudProvider,
    S: Sleeper,
{
    pub fn new(topology: T, registrar: R, gateway: Arc<CloudResourceGateway<P, S>>) -> Self {
        Self {
            topology,
            registrar,
            gateway,
            stack_prefix: None,
        }
    }

    /// Also stamp `StackPrefix` on every provisioned instance.
    #[must_use]
    pub fn with_stack_prefix(mut self, stack_prefix: Option<String>) -> Self {
        self.stack_prefix = stack_prefix;
        self
    }

    /// Run the provisioning steps for one instance.
    pub async fn run(&self, instance_id: &str) -> ProvisioningOutcome {
        tracing::info!(instance_id, "provisioning author-dispatcher");

        let topology = match self.resolve_topology(instance_id).await {
            Ok(topology) => topology,
            Err(TopologyError::UnresolvedAddress { .. }) => {
                tracing::error!(
                    instance_id,
                    step = %ProvisioningStep::ResolveTopology,
                    "instance never reported a private address"
                );
                return ProvisioningOutcome::UnresolvedAddress;
            }
            Err(e) => {
                tracing::error!(
                    instance_id,
                    step = %ProvisioningStep::ResolveTopology,
                    error = %format!("{:#}", anyhow::Error::from(e)),
                    "failed to resolve topology"
                );
                return ProvisioningOutcome::TopologyFailed;
            }
        };

        let request = FlushAgentRequest {
            owner_instance_id: instance_id.to_string(),
            source_base_url: topology.peer_base_url.clone(),
            target_base_url: topology.instance_base_url.clone(),
            run_mode: RunMode::Author,
        };
        tracing::debug!(
            instance_id,
            source = %request.source_base_url,
            target = %request.target_base_url,
            "creating flush agent"
        );
        if let Err(e) = self.registrar.create_flush_agent(&request).await {
            tracing::error!(
                instance_id,
                run_mode = %request.run_mode,
                step = %ProvisioningStep::RegisterFlushAgent,
                error = %format!("{e:#}"),
                "failed to create flush agent"
            );
            return ProvisioningOutcome::RegistrationFailed;
        }

        let tags = self.routing_tags(&topology);
        if let Err(e) = self.gateway.add_tags(instance_id, &tags).await {
            tracing::error!(
                instance_id,
                step = %ProvisioningStep::TagInstance,
                error = %format!("{:#}", anyhow::Error::from(e)),
                "flush agent created but tagging failed; agent left in place"
            );
            return ProvisioningOutcome::TaggingFailed;
        }

        tracing::info!(
            instance_id,
            upstream_host = %topology.upstream_host,
            "author-dispatcher provisioned"
        );
        ProvisioningOutcome::Provisioned
    }

    async fn resolve_topology(&self, instance_id: &str) -> Result<Topology, TopologyError> {
        if instance_id.trim().is_empty() {
            return Err(anyhow::anyhow!("instance id is empty").into());
        }
        self.topology.resolve(instance_id).await
    }

    fn routing_tags(&self, topology: &Topology) -> TagMap {
        let mut tags = TagMap::from([tag_pair(
            tag_names::AUTHOR_HOST,
            topology.upstream_host.as_str(),
        )]);
        if let Some(prefix) = &self.stack_prefix {
            tags.insert(tag_names::STACK_PREFIX.to_string(), prefix.clone());
        }
        tags
    }
}

impl<T, R, P, S> Action for DispatcherProvisioningWorkflow<T, R, P, S>
where
    T: TopologyResolver,
    R: FlushAgentRegistrar,
    P: CloudProvider,
    S: Sleeper,
{
    async fn execute(&self, instance_id: &str) -> bool {
        self.run(instance_id).await.is_success()
    }
}
