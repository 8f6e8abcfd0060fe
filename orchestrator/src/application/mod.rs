//! Application layer: port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain` and `aem_common`, never on
//! `crate::infra`.

pub mod ports;
pub mod services;

pub use ports::{
    Action, AutoScalingApi, CloudProvider, ComputeApi, FlushAgentRegistrar, LoadBalancerApi,
    Sleeper, TopologyResolver,
};
