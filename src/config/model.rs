// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::types::CloudProvider;

/// A task spec exactly as deserialized from YAML, before validation.
///
/// Use [`crate::config::load_and_validate`] to obtain a [`LaunchTask`];
/// this type exists so deserialization failures and semantic failures stay
/// distinguishable.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawLaunchTask {
    pub name: String,

    pub cloud: CloudProvider,

    #[serde(default = "default_num_nodes")]
    pub num_nodes: u32,

    /// Shell commands run once on each node after it boots.
    #[serde(default)]
    pub setup: Option<String>,

    /// Local directory synced to the cluster's working directory.
    #[serde(default)]
    pub workdir: Option<PathBuf>,

    #[serde(default)]
    pub docker_image: Option<String>,

    /// Name of the container commands run in. Requires `docker_image`.
    #[serde(default)]
    pub container_name: Option<String>,

    /// Remote path -> local path mounts.
    #[serde(default)]
    pub file_mounts: BTreeMap<String, String>,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub zones: Vec<String>,
}

fn default_num_nodes() -> u32 {
    1
}

/// A validated task spec.
#[derive(Debug, Clone)]
pub struct LaunchTask {
    pub name: String,
    pub cloud: CloudProvider,
    pub num_nodes: u32,
    pub setup: Option<String>,
    pub workdir: Option<PathBuf>,
    pub docker_image: Option<String>,
    pub container_name: Option<String>,
    pub file_mounts: BTreeMap<String, String>,
    pub region: Option<String>,
    pub zones: Vec<String>,
}

impl LaunchTask {
    /// Construct without re-running validation. Only `validate` should call
    /// this.
    pub(crate) fn new_unchecked(raw: RawLaunchTask) -> Self {
        LaunchTask {
            name: raw.name,
            cloud: raw.cloud,
            num_nodes: raw.num_nodes,
            setup: raw.setup,
            workdir: raw.workdir,
            docker_image: raw.docker_image,
            container_name: raw.container_name,
            file_mounts: raw.file_mounts,
            region: raw.region,
            zones: raw.zones,
        }
    }
}
