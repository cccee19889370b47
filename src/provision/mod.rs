// src/provision/mod.rs

//! Cluster provisioning layer.
//!
//! - [`template`] renders `.j2` launch-spec templates.
//! - [`launch`] materializes the concrete cluster config for a task.
//! - [`auth`] injects SSH credentials into a rendered config.
//! - [`yamlfmt`] is the ordered YAML round-trip used for config files.
//! - [`readiness`] polls cluster status until all workers have joined.

pub mod auth;
pub mod launch;
pub mod readiness;
pub mod template;
pub mod yamlfmt;

pub use launch::{materialize_setup_script, write_cluster_config};
pub use readiness::{READY_POLL_INTERVAL, RayStatusProbe, StatusProbe, wait_until_ready};
