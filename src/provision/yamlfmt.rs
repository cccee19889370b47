// src/provision/yamlfmt.rs

//! Ordered YAML round-trip for cluster configs.
//!
//! Cluster configs are hand-inspected files, so dumping preserves the
//! declared key order (`serde_yaml::Mapping` keeps insertion order) and
//! separates top-level blocks with a blank line.

use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::errors::Result;

/// Load a YAML document from `path`.
pub fn load_yaml(path: &Path) -> Result<serde_yaml::Value> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading YAML file {path:?}"))?;
    let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
    Ok(value)
}

/// Write `config` to `path`, blank-line-separating top-level blocks.
pub fn dump_yaml(path: &Path, config: &serde_yaml::Value) -> Result<()> {
    let rendered = serde_yaml::to_string(config)?;
    fs::write(path, space_top_level_blocks(&rendered))
        .with_context(|| format!("writing YAML file {path:?}"))?;
    Ok(())
}

/// Insert a blank line before every top-level key after the first.
fn space_top_level_blocks(rendered: &str) -> String {
    let mut out = String::with_capacity(rendered.len());
    let mut seen_top_level = false;

    for line in rendered.lines() {
        let is_top_level = !line.is_empty()
            && !line.starts_with(' ')
            && !line.starts_with('-')
            && !line.starts_with('#');

        if is_top_level && seen_top_level {
            out.push('\n');
        }
        if is_top_level {
            seen_top_level = true;
        }

        out.push_str(line);
        out.push('\n');
    }

    out
}
