//! AEM orchestrator library: cloud resource gateway and author-dispatcher
//! provisioning.

#![cfg_attr(test, allow(clippy::expect_used))]

pub mod app;
pub mod application;
pub mod domain;
pub mod infra;
