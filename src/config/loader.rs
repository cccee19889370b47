// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{LaunchTask, RawLaunchTask};
use crate::errors::Result;

/// Load a task spec from a given path and return the raw `RawLaunchTask`.
///
/// This only performs YAML deserialization; it does **not** perform semantic
/// validation (node counts, region/zone pairing, etc.). Use
/// [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawLaunchTask> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let raw: RawLaunchTask = serde_yaml::from_str(&contents)?;

    Ok(raw)
}

/// Load a task spec from path and run validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads YAML.
/// - Applies defaults (handled by `serde` + default functions).
/// - Checks cross-field rules:
///   - a usable name and node count,
///   - region and zones set together or not at all,
///   - container naming only alongside a docker image.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<LaunchTask> {
    let raw = load_from_path(&path)?;
    let task = LaunchTask::try_from(raw)?;
    Ok(task)
}
