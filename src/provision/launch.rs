// src/provision/launch.rs

//! Cluster launch-spec materialization.
//!
//! Turns a validated [`LaunchTask`] into the concrete, authenticated cluster
//! config file the provisioning tool consumes.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::config::LaunchTask;
use crate::errors::Result;
use crate::provision::auth::inject_auth;
use crate::provision::template::fill_template;
use crate::provision::yamlfmt::{dump_yaml, load_yaml};
use crate::types::CloudProvider;

/// Write the concrete cluster config for `task` and return its path.
///
/// Renders the `.j2` template with the task's variables, then — unless
/// `dryrun` — loads the rendered YAML, injects SSH credentials, and dumps it
/// back. The dump step drops any comments the template carried.
pub fn write_cluster_config(
    run_id: &str,
    task: &LaunchTask,
    template_path: &Path,
    dryrun: bool,
) -> Result<PathBuf> {
    let (region, zones) = resolve_region_zones(task);

    let setup_sh_path = match task.setup.as_deref() {
        Some(setup) => Some(materialize_setup_script(setup)?),
        None => None,
    };

    let mut vars = BTreeMap::new();
    vars.insert("run_id".to_string(), run_id.to_string());
    vars.insert("cloud".to_string(), task.cloud.to_string());
    vars.insert("num_nodes".to_string(), task.num_nodes.to_string());
    vars.insert("region".to_string(), region);
    vars.insert("zones".to_string(), zones.join(","));
    vars.insert(
        "setup_sh_path".to_string(),
        setup_sh_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
    );
    vars.insert(
        "workdir".to_string(),
        task.workdir
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
    );
    vars.insert(
        "docker_image".to_string(),
        task.docker_image.clone().unwrap_or_default(),
    );
    vars.insert(
        "container_name".to_string(),
        task.container_name.clone().unwrap_or_default(),
    );
    vars.insert(
        "file_mounts".to_string(),
        render_file_mounts(&task.file_mounts),
    );

    let yaml_path = fill_template(template_path, &vars, None)?;
    if dryrun {
        return Ok(yaml_path);
    }

    let mut config = load_yaml(&yaml_path)?;
    inject_auth(task.cloud, &mut config)?;
    dump_yaml(&yaml_path, &config)?;

    Ok(yaml_path)
}

/// Region/zone selection: the task's own pair wins, otherwise the provider
/// default region with its default zones. Only AWS accepts a multi-zone
/// list; other providers take the first zone.
fn resolve_region_zones(task: &LaunchTask) -> (String, Vec<String>) {
    let region = task
        .region
        .clone()
        .unwrap_or_else(|| task.cloud.default_region().to_string());

    let mut zones = if task.zones.is_empty() {
        default_zones(task.cloud, &region)
    } else {
        task.zones.clone()
    };

    if task.cloud != CloudProvider::Aws {
        zones.truncate(1);
    }

    (region, zones)
}

fn default_zones(cloud: CloudProvider, region: &str) -> Vec<String> {
    match cloud {
        CloudProvider::Aws => vec![format!("{region}a"), format!("{region}b")],
        CloudProvider::Gcp => vec![format!("{region}-a")],
        CloudProvider::Azure => vec!["1".to_string()],
    }
}

/// Write the setup commands to a stable, content-addressed script path:
/// `<tempdir>/skyrig_setup_<checksum>.sh`.
///
/// The checksum is over the full script body, so re-running an unchanged
/// setup step resolves to the same path (and the remote side can skip it),
/// while any edit produces a fresh path. A random temp name here would
/// re-trigger setup on every run.
pub fn materialize_setup_script(setup: &str) -> Result<PathBuf> {
    let body = format!("#!/bin/bash\nset -e\n{setup}\n");
    let checksum = blake3::hash(body.as_bytes()).to_hex();

    let path = std::env::temp_dir().join(format!("skyrig_setup_{checksum}.sh"));
    fs::write(&path, &body).with_context(|| format!("writing setup script to {path:?}"))?;

    debug!(path = %path.display(), "materialized setup script");
    Ok(path)
}

/// Render file mounts as a YAML flow mapping, e.g. `{"/remote": "/local"}`.
fn render_file_mounts(mounts: &BTreeMap<String, String>) -> String {
    let entries: Vec<String> = mounts
        .iter()
        .map(|(remote, local)| format!("{remote:?}: {local:?}"))
        .collect();
    format!("{{{}}}", entries.join(", "))
}
