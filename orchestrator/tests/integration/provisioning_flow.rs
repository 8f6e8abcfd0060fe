//! End-to-end scale-up of an author-dispatcher through `Orchestrator`.

#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use aem_common::{FlushAgentRequest, RunMode, tag_names};
use aem_orchestrator::app::Orchestrator;
use aem_orchestrator::application::ports::{FlushAgentRegistrar, operations};
use aem_orchestrator::domain::{GatewayError, OrchestratorConfig, ProvisioningOutcome};
use aem_orchestrator::infra::InMemoryCloud;
use aem_orchestrator::infra::telemetry::init_tracing;

use crate::mocks::RecordingSleeper;

const DISPATCHER: &str = "i-0a1b2c3d4e5f60718";
const ELB: &str = "author-elb";
const ELB_DNS: &str = "internal-author-elb-1234.ap-southeast-2.elb.amazonaws.com";

#[derive(Default)]
struct Registrar {
    requests: Mutex<Vec<FlushAgentRequest>>,
    fail: bool,
}

impl FlushAgentRegistrar for Registrar {
    async fn create_flush_agent(&self, request: &FlushAgentRequest) -> anyhow::Result<()> {
        self.requests.lock().expect("lock").push(request.clone());
        anyhow::ensure!(!self.fail, "connection refused");
        Ok(())
    }
}

fn config() -> OrchestratorConfig {
    let mut config = OrchestratorConfig::new(ELB);
    config.author_port = 4502;
    config.dispatcher_port = 80;
    config.aem_protocol = "http".to_string();
    config.stack_prefix = Some("prod".to_string());
    config
}

fn cloud() -> InMemoryCloud {
    let _ = init_tracing("debug");
    let cloud = InMemoryCloud::new();
    cloud
        .add_pending_instance(DISPATCHER, "10.0.12.34", 3)
        .add_load_balancer(ELB, Some(ELB_DNS))
        .add_group("author-dispatcher", 2, &[DISPATCHER]);
    cloud
}

#[tokio::test]
async fn scale_up_provisions_new_dispatcher() {
    let cloud = cloud();
    let registrar = Registrar::default();
    let sleeper = RecordingSleeper::default();
    let orchestrator = Orchestrator::with_sleeper(&config(), cloud.clone(), &registrar, &sleeper)
        .expect("valid config");

    let outcome = orchestrator.dispatcher_workflow().run(DISPATCHER).await;
    assert_eq!(outcome, ProvisioningOutcome::Provisioned);

    let requests = registrar.requests.lock().expect("lock").clone();
    assert_eq!(
        requests,
        vec![FlushAgentRequest {
            owner_instance_id: DISPATCHER.to_string(),
            source_base_url: format!("http://{ELB_DNS}:4502"),
            target_base_url: "http://10.0.12.34:80".to_string(),
            run_mode: RunMode::Author,
        }]
    );

    let tags = cloud.tags(DISPATCHER);
    assert_eq!(tags.get(tag_names::AUTHOR_HOST).map(String::as_str), Some(ELB_DNS));
    assert_eq!(tags.get(tag_names::STACK_PREFIX).map(String::as_str), Some("prod"));

    // Address appeared on the third describe: two waits of the default delay.
    assert_eq!(sleeper.count(), 2);
    assert_eq!(sleeper.delays(), vec![Duration::from_secs(5); 2]);
}

#[tokio::test]
async fn failed_registration_leaves_instance_untagged() {
    let cloud = cloud();
    let registrar = Registrar {
        fail: true,
        ..Registrar::default()
    };
    let orchestrator = Orchestrator::with_sleeper(&config(), cloud.clone(), &registrar, RecordingSleeper::default())
        .expect("valid config");

    assert!(!orchestrator.scale_up_author_dispatcher(DISPATCHER).await);
    assert_eq!(registrar.requests.lock().expect("lock").len(), 1);
    assert_eq!(cloud.calls(operations::CREATE_TAGS), 0);
    assert!(cloud.tags(DISPATCHER).is_empty());
}

#[tokio::test]
async fn missing_author_elb_fails_before_registration() {
    let cloud = InMemoryCloud::new();
    cloud.add_instance(DISPATCHER, Some("10.0.12.34"));
    let registrar = Registrar::default();
    let orchestrator = Orchestrator::with_sleeper(&config(), cloud.clone(), &registrar, RecordingSleeper::default())
        .expect("valid config");

    let outcome = orchestrator.dispatcher_workflow().run(DISPATCHER).await;
    assert_eq!(outcome, ProvisioningOutcome::TopologyFailed);
    assert!(registrar.requests.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn gateway_operations_share_provider_state() {
    let cloud = cloud();
    cloud
        .attach_volume(DISPATCHER, "/dev/sdb", "vol-0f00ba4")
        .expect("attach");
    let orchestrator = Orchestrator::with_sleeper(
        &config(),
        cloud.clone(),
        Registrar::default(),
        RecordingSleeper::default(),
    )
    .expect("valid config");
    let gateway = orchestrator.gateway();

    gateway
        .set_desired_capacity("author-dispatcher", 3)
        .await
        .expect("set capacity");
    assert_eq!(
        gateway.get_desired_capacity("author-dispatcher").await.expect("capacity"),
        3
    );

    let snapshot_id = gateway
        .snapshot_device(DISPATCHER, "/dev/sdb", "nightly backup")
        .await
        .expect("snapshot");
    assert_eq!(cloud.snapshots()[0].snapshot_id, snapshot_id);
    assert_eq!(cloud.snapshots()[0].volume_id, "vol-0f00ba4");

    gateway.terminate_instance(DISPATCHER).await.expect("terminate");
    assert!(cloud.is_terminated(DISPATCHER));
    assert!(
        gateway
            .list_group_members("author-dispatcher")
            .await
            .expect("members")
            .is_empty()
    );

    let err = gateway
        .get_desired_capacity("publish-dispatcher")
        .await
        .expect_err("unknown group");
    assert!(matches!(err, GatewayError::NotFound { .. }));
}

#[tokio::test]
async fn non_ec2_instance_ids_are_provisioned() {
    let cloud = cloud();
    cloud.add_instance("dispatcher-7", Some("10.0.0.7"));
    let registrar = Registrar::default();
    let orchestrator =
        Orchestrator::with_sleeper(&config(), cloud.clone(), &registrar, RecordingSleeper::default())
            .expect("valid config");

    assert!(orchestrator.scale_up_author_dispatcher("dispatcher-7").await);
    assert_eq!(
        cloud.tags("dispatcher-7").get(tag_names::AUTHOR_HOST).map(String::as_str),
        Some(ELB_DNS)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_scale_ups_share_one_orchestrator() {
    let cloud = cloud();
    cloud
        .add_instance("i-0000000a", Some("10.0.20.10"))
        .add_instance("i-0000000b", Some("10.0.20.11"));
    let orchestrator = Arc::new(
        Orchestrator::with_sleeper(
            &config(),
            cloud.clone(),
            Registrar::default(),
            RecordingSleeper::default(),
        )
        .expect("valid config"),
    );

    let handles: Vec<_> = ["i-0000000a", "i-0000000b"]
        .into_iter()
        .map(|id| {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move { orchestrator.scale_up_author_dispatcher(id).await })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.expect("task panicked"));
    }

    for id in ["i-0000000a", "i-0000000b"] {
        assert_eq!(
            cloud.tags(id).get(tag_names::AUTHOR_HOST).map(String::as_str),
            Some(ELB_DNS),
            "{id} not tagged"
        );
    }
    assert_eq!(cloud.calls(operations::CREATE_TAGS), 2);
}
