//! Composition root: wires the gateway, topology resolver, and provisioning
//! workflow from one validated configuration.
//!
//! The cloud provider and flush agent registrar are supplied by the caller;
//! the orchestrator owns no provider SDK or AEM client of its own.

use std::sync::Arc;

use crate::application::ports::{Action, CloudProvider, FlushAgentRegistrar, Sleeper};
use crate::application::services::cloud_gateway::CloudResourceGateway;
use crate::application::services::dispatcher_provisioning::DispatcherProvisioningWorkflow;
use crate::application::services::topology::GatewayTopologyResolver;
use crate::domain::{ConfigError, OrchestratorConfig};
use crate::infra::TokioSleeper;

/// Provisioning workflow as assembled by [`Orchestrator`].
pub type DispatcherWorkflow<P, R, S> =
    DispatcherProvisioningWorkflow<GatewayTopologyResolver<P, S>, R, P, S>;

/// Process-wide orchestrator context.
pub struct Orchestrator<P, R, S = TokioSleeper> {
    gateway: Arc<CloudResourceGateway<P, S>>,
    dispatcher: DispatcherWorkflow<P, R, S>,
}

impl<P: CloudProvider, R: FlushAgentRegistrar> Orchestrator<P, R, TokioSleeper> {
    /// Build an orchestrator that waits on the tokio timer between retries.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(config: &OrchestratorConfig, provider: P, registrar: R) -> Result<Self, ConfigError> {
        Self::with_sleeper(config, provider, registrar, TokioSleeper)
    }
}

impl<P: CloudProvider, R: FlushAgentRegistrar, S: Sleeper> Orchestrator<P, R, S> {
    /// Build an orchestrator with a caller-supplied retry sleeper.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn with_sleeper(
        config: &OrchestratorConfig,
        provider: P,
        registrar: R,
        sleeper: S,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let gateway = Arc::new(CloudResourceGateway::new(
            provider,
            sleeper,
            config.retry_policy(),
        ));
        let topology = GatewayTopologyResolver::new(Arc::clone(&gateway), config);
        let dispatcher = DispatcherProvisioningWorkflow::new(topology, registrar, Arc::clone(&gateway))
            .with_stack_prefix(config.stack_prefix.clone());

        tracing::debug!(
            author_elb = %config.author_elb_name,
            protocol = %config.aem_protocol,
            "orchestrator assembled"
        );
        Ok(Self {
            gateway,
            dispatcher,
        })
    }

    /// Shared cloud gateway, for callers that need provider operations
    /// outside the provisioning workflow.
    #[must_use]
    pub fn gateway(&self) -> &CloudResourceGateway<P, S> {
        &self.gateway
    }

    #[must_use]
    pub fn dispatcher_workflow(&self) -> &DispatcherWorkflow<P, R, S> {
        &self.dispatcher
    }

    /// Provision a newly launched author-dispatcher; `true` on full success.
    pub async fn scale_up_author_dispatcher(&self, instance_id: &str) -> bool {
        self.dispatcher.execute(instance_id).await
    }
}
