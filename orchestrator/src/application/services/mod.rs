//! Application services: use-case orchestration.
//!
//! Each service module composes domain logic with port trait calls.
//! Services import only from `crate::domain` and `crate::application`,
//! never from `crate::infra`.

pub mod cloud_gateway;
pub mod dispatcher_provisioning;
pub mod retry;
pub mod topology;
