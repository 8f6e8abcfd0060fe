//! Gateway-backed topology resolution for author-dispatchers.
//!
//! An author-dispatcher is addressed at its own private IP; its peer is the
//! author load balancer, whose DNS name is also the upstream host the
//! dispatcher routes to.

use std::sync::Arc;

use crate::application::ports::{CloudProvider, Sleeper, TopologyResolver};
use crate::application::services::cloud_gateway::CloudResourceGateway;
use crate::domain::{OrchestratorConfig, Topology, TopologyError, base_url};

/// Resolves topology by asking the cloud gateway for addresses.
pub struct GatewayTopologyResolver<P, S> {
    gateway: Arc<CloudResourceGateway<P, S>>,
    protocol: String,
    dispatcher_port: u16,
    author_port: u16,
    author_elb_name: String,
}

impl<P: CloudProvider, S: Sleeper> GatewayTopologyResolver<P, S> {
    pub fn new(gateway: Arc<CloudResourceGateway<P, S>>, config: &OrchestratorConfig) -> Self {
        Self {
            gateway,
            protocol: config.aem_protocol.clone(),
            dispatcher_port: config.dispatcher_port,
            author_port: config.author_port,
            author_elb_name: config.author_elb_name.clone(),
        }
    }
}

impl<P: CloudProvider, S: Sleeper> TopologyResolver for GatewayTopologyResolver<P, S> {
    async fn resolve(&self, instance_id: &str) -> Result<Topology, TopologyError> {
        let private_ip = self
            .gateway
            .resolve_private_address(instance_id)
            .await?
            .ok_or_else(|| TopologyError::UnresolvedAddress {
                instance_id: instance_id.to_string(),
            })?;
        let elb_dns = self
            .gateway
            .resolve_load_balancer_address(&self.author_elb_name)
            .await?;

        Ok(Topology {
            instance_base_url: base_url(&self.protocol, &private_ip, self.dispatcher_port),
            peer_base_url: base_url(&self.protocol, &elb_dns, self.author_port),
            upstream_host: elb_dns,
        })
    }
}
