// tests/launch_config.rs

//! Launch-spec materialization tests: template rendering, setup-script
//! content addressing, ordered YAML dumping, and auth injection.

mod common;
use crate::common::init_tracing;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tempfile::tempdir;

use skyrig::config::LaunchTask;
use skyrig::errors::SkyrigError;
use skyrig::provision::auth::{PRIVATE_SSH_KEY_PATH, PUBLIC_SSH_KEY_PATH, inject_auth};
use skyrig::provision::template::{fill_template, render};
use skyrig::provision::yamlfmt::{dump_yaml, load_yaml};
use skyrig::provision::{materialize_setup_script, write_cluster_config};
use skyrig::types::{CloudProvider, new_run_id};

fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// -- Template rendering --

#[test]
fn render_substitutes_spaced_and_tight_placeholders() {
    let out = render(
        "name: {{ name }}\ncount: {{count}}\n",
        &vars(&[("name", "train"), ("count", "3")]),
    )
    .unwrap();
    assert_eq!(out, "name: train\ncount: 3\n");
}

#[test]
fn render_rejects_unresolved_placeholders() {
    let err = render("name: {{ missing }}\n", &vars(&[])).unwrap_err();
    assert!(matches!(err, SkyrigError::TemplateError(_)), "got {err:?}");
}

#[test]
fn fill_template_strips_the_j2_suffix() {
    let dir = tempdir().unwrap();
    let template = dir.path().join("cluster.yml.j2");
    fs::write(&template, "cluster_name: {{ run_id }}\n").unwrap();

    let out = fill_template(&template, &vars(&[("run_id", "skyrig-test")]), None).unwrap();

    assert_eq!(out, dir.path().join("cluster.yml"));
    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "cluster_name: skyrig-test\n"
    );
}

#[test]
fn fill_template_honours_an_explicit_output_path() {
    let dir = tempdir().unwrap();
    let template = dir.path().join("cluster.yml.j2");
    let explicit = dir.path().join("rendered.yml");
    fs::write(&template, "x: {{ x }}\n").unwrap();

    let out = fill_template(&template, &vars(&[("x", "1")]), Some(&explicit)).unwrap();

    assert_eq!(out, explicit);
    assert_eq!(fs::read_to_string(&explicit).unwrap(), "x: 1\n");
}

#[test]
fn fill_template_requires_the_j2_suffix() {
    let dir = tempdir().unwrap();
    let template = dir.path().join("cluster.yml");
    fs::write(&template, "x: 1\n").unwrap();

    let err = fill_template(&template, &vars(&[]), None).unwrap_err();
    assert!(matches!(err, SkyrigError::TemplateError(_)), "got {err:?}");
}

// -- Setup script materialization --

#[test]
fn setup_script_path_is_stable_for_identical_bodies() {
    init_tracing();
    let first = materialize_setup_script("pip install -r requirements.txt").unwrap();
    let second = materialize_setup_script("pip install -r requirements.txt").unwrap();

    assert_eq!(first, second);
    let content = fs::read_to_string(&first).unwrap();
    assert!(content.starts_with("#!/bin/bash\n"));
    assert!(content.contains("pip install -r requirements.txt"));
}

#[test]
fn setup_script_path_changes_with_the_body() {
    let first = materialize_setup_script("echo one").unwrap();
    let second = materialize_setup_script("echo two").unwrap();
    assert_ne!(first, second);
}

// -- YAML round-trip --

#[test]
fn dump_yaml_preserves_key_order_and_spaces_blocks() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.yml");

    let value: serde_yaml::Value = serde_yaml::from_str(
        "cluster_name: demo\nmax_workers: 2\nauth:\n  ssh_user: ubuntu\nprovider:\n  type: aws\n",
    )
    .unwrap();
    dump_yaml(&path, &value).unwrap();

    let dumped = fs::read_to_string(&path).unwrap();
    assert_eq!(
        dumped,
        "cluster_name: demo\n\nmax_workers: 2\n\nauth:\n  ssh_user: ubuntu\n\nprovider:\n  type: aws\n"
    );

    // And it still loads back to the same document.
    let reloaded = load_yaml(&path).unwrap();
    assert_eq!(reloaded, value);
}

// -- Auth injection --

#[test]
fn inject_auth_fills_user_and_key() {
    let mut config: serde_yaml::Value =
        serde_yaml::from_str("cluster_name: demo\n").unwrap();

    inject_auth(CloudProvider::Aws, &mut config).unwrap();

    let auth = &config["auth"];
    assert_eq!(auth["ssh_user"], "ubuntu");
    assert_eq!(auth["ssh_private_key"], PRIVATE_SSH_KEY_PATH);
}

#[test]
fn inject_auth_overwrites_stale_values() {
    let mut config: serde_yaml::Value =
        serde_yaml::from_str("auth:\n  ssh_user: leftover\n").unwrap();

    inject_auth(CloudProvider::Gcp, &mut config).unwrap();

    assert_eq!(config["auth"]["ssh_user"], "gcpuser");
}

#[test]
fn inject_auth_adds_the_public_key_on_azure() {
    let mut config: serde_yaml::Value =
        serde_yaml::from_str("cluster_name: demo\n").unwrap();

    inject_auth(CloudProvider::Azure, &mut config).unwrap();

    assert_eq!(config["auth"]["ssh_user"], "azureuser");
    assert_eq!(config["auth"]["ssh_public_key"], PUBLIC_SSH_KEY_PATH);
}

// -- write_cluster_config --

fn demo_task(cloud: CloudProvider) -> LaunchTask {
    LaunchTask {
        name: "train".to_string(),
        cloud,
        num_nodes: 3,
        setup: None,
        workdir: None,
        docker_image: None,
        container_name: None,
        file_mounts: BTreeMap::from([("/remote/data".to_string(), "./data".to_string())]),
        region: None,
        zones: Vec::new(),
    }
}

fn demo_template(dir: &Path) -> std::path::PathBuf {
    let template = dir.join("cluster.yml.j2");
    fs::write(
        &template,
        "cluster_name: {{ run_id }}\n\
         max_workers: {{ num_nodes }}\n\
         provider:\n\
         \x20 type: {{ cloud }}\n\
         \x20 region: {{ region }}\n\
         \x20 availability_zone: {{ zones }}\n\
         file_mounts: {{ file_mounts }}\n\
         setup_script: \"{{ setup_sh_path }}\"\n",
    )
    .unwrap();
    template
}

#[test]
fn write_cluster_config_renders_defaults_and_injects_auth() {
    init_tracing();
    let dir = tempdir().unwrap();
    let template = demo_template(dir.path());
    let mut task = demo_task(CloudProvider::Aws);
    task.setup = Some("pip install -r training/requirements.txt".to_string());

    let path = write_cluster_config("skyrig-test-run", &task, &template, false).unwrap();

    let config = load_yaml(&path).unwrap();
    assert_eq!(config["cluster_name"], "skyrig-test-run");
    assert_eq!(config["provider"]["region"], "us-west-2");
    // AWS keeps its multi-zone list.
    assert_eq!(config["provider"]["availability_zone"], "us-west-2a,us-west-2b");
    assert_eq!(config["file_mounts"]["/remote/data"], "./data");
    assert_eq!(config["auth"]["ssh_user"], "ubuntu");

    let setup_script = config["setup_script"].as_str().unwrap();
    assert!(setup_script.contains("skyrig_setup_"), "got {setup_script}");
}

#[test]
fn write_cluster_config_truncates_zones_off_aws() {
    let dir = tempdir().unwrap();
    let template = demo_template(dir.path());
    let mut task = demo_task(CloudProvider::Gcp);
    task.region = Some("europe-west4".to_string());
    task.zones = vec!["europe-west4-a".to_string(), "europe-west4-b".to_string()];

    let path = write_cluster_config("skyrig-test-run", &task, &template, false).unwrap();

    let config = load_yaml(&path).unwrap();
    assert_eq!(config["provider"]["availability_zone"], "europe-west4-a");
}

#[test]
fn dryrun_skips_auth_injection() {
    let dir = tempdir().unwrap();
    let template = demo_template(dir.path());

    let path = write_cluster_config("skyrig-test-run", &demo_task(CloudProvider::Aws), &template, true)
        .unwrap();

    let config = load_yaml(&path).unwrap();
    assert!(config.get("auth").is_none());
}

// -- Run identifiers --

#[test]
fn run_ids_are_tagged_and_sortable() {
    let first = new_run_id();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let second = new_run_id();

    assert!(first.starts_with("skyrig-"));
    assert!(second.starts_with("skyrig-"));
    assert!(first < second, "{first} !< {second}");
}
