//! Property-based tests for gateway and addressing invariants.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use std::time::Duration;

use proptest::prelude::*;

use aem_common::TagMap;
use aem_orchestrator::application::services::cloud_gateway::CloudResourceGateway;
use aem_orchestrator::domain::{RetryPolicy, base_url};
use aem_orchestrator::infra::InMemoryCloud;

use crate::mocks::RecordingSleeper;

const INSTANCE: &str = "i-0123456789abcdef0";

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime")
}

fn gateway(cloud: &InMemoryCloud) -> CloudResourceGateway<InMemoryCloud, RecordingSleeper> {
    CloudResourceGateway::new(cloud.clone(), RecordingSleeper::default(), RetryPolicy::default())
}

fn tag_map() -> impl Strategy<Value = TagMap> {
    prop::collection::btree_map("[A-Za-z][A-Za-z0-9:_-]{0,15}", "[ -~]{0,24}", 0..6)
}

// ============================================================================
// add_tags() / get_tags()
// ============================================================================

proptest! {
    /// Tags read back after a successful add always include what was added.
    #[test]
    fn prop_tags_read_back_as_superset(existing in tag_map(), added in tag_map()) {
        let cloud = InMemoryCloud::new();
        cloud.add_instance(INSTANCE, Some("10.0.0.1"));
        let gateway = gateway(&cloud);

        let read = runtime().block_on(async {
            gateway.add_tags(INSTANCE, &existing).await.expect("seed tags");
            gateway.add_tags(INSTANCE, &added).await.expect("add tags");
            gateway.get_tags(INSTANCE).await.expect("get tags")
        });

        for (key, value) in &added {
            prop_assert_eq!(read.get(key), Some(value));
        }
        prop_assert!(read.len() >= added.len());
    }
}

// ============================================================================
// set_desired_capacity() / get_desired_capacity()
// ============================================================================

proptest! {
    /// Desired capacity reads back as the value last set.
    #[test]
    fn prop_desired_capacity_reads_back(initial in 0u32..50, target in 0u32..50) {
        let cloud = InMemoryCloud::new();
        cloud.add_group("dispatchers", initial, &[]);
        let gateway = gateway(&cloud);

        let read = runtime().block_on(async {
            gateway.set_desired_capacity("dispatchers", target).await.expect("set");
            gateway.get_desired_capacity("dispatchers").await.expect("get")
        });
        prop_assert_eq!(read, target);
    }
}

// ============================================================================
// Address polling
// ============================================================================

proptest! {
    /// An address that appears within the attempt budget is always found,
    /// and the gateway sleeps exactly once per failed attempt.
    #[test]
    fn prop_address_found_within_budget(visible_from in 1u32..=20) {
        let cloud = InMemoryCloud::new();
        cloud.add_pending_instance(INSTANCE, "10.0.0.9", visible_from);
        let sleeper = RecordingSleeper::default();
        let gateway = CloudResourceGateway::new(
            cloud.clone(),
            &sleeper,
            RetryPolicy::new(20, Duration::from_secs(5)),
        );

        let address = runtime()
            .block_on(gateway.resolve_private_address(INSTANCE))
            .expect("resolve");
        prop_assert_eq!(address.as_deref(), Some("10.0.0.9"));
        prop_assert_eq!(sleeper.count(), (visible_from - 1) as usize);
        prop_assert!(sleeper.delays().iter().all(|d| *d == Duration::from_secs(5)));
    }
}

// ============================================================================
// base_url()
// ============================================================================

proptest! {
    /// Base URLs always take the form `{protocol}://{host}:{port}`.
    #[test]
    fn prop_base_url_shape(
        protocol in prop_oneof![Just("http"), Just("https")],
        host in "[a-z0-9]([a-z0-9.-]{0,30}[a-z0-9])?",
        port in 1u16..,
    ) {
        let url = base_url(protocol, &host, port);
        prop_assert_eq!(url, format!("{protocol}://{host}:{port}"));
    }
}
