// src/provision/template.rs

//! Launch-spec template rendering.
//!
//! Templates are ordinary config files with `{{ key }}` placeholders and a
//! `.j2` suffix. Rendering is plain substitution; there are no conditionals
//! or loops, and every placeholder must resolve.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

use crate::errors::{Result, SkyrigError};

/// Create a file from a `.j2` template and return its path.
///
/// When `output_path` is `None`, the output path is the template path with
/// the `.j2` suffix stripped. Re-rendering overwrites the previous output.
pub fn fill_template(
    template_path: &Path,
    vars: &BTreeMap<String, String>,
    output_path: Option<&Path>,
) -> Result<PathBuf> {
    let template_str = template_path.to_string_lossy();
    let stem = template_str.strip_suffix(".j2").ok_or_else(|| {
        SkyrigError::TemplateError(format!("template path must end in .j2: {template_str}"))
    })?;

    let output_path = match output_path {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(stem),
    };

    let template = fs::read_to_string(template_path)
        .with_context(|| format!("reading template {template_path:?}"))?;

    let content = render(&template, vars)?;

    fs::write(&output_path, content)
        .with_context(|| format!("writing rendered template to {output_path:?}"))?;

    info!(path = %output_path.display(), "created or updated file");
    Ok(output_path)
}

/// Substitute `{{ key }}` placeholders (inner spaces optional) in
/// `template`. A placeholder with no matching variable is a
/// [`SkyrigError::TemplateError`].
pub fn render(template: &str, vars: &BTreeMap<String, String>) -> Result<String> {
    let mut content = template.to_string();
    for (key, value) in vars {
        let spaced = format!("{{{{ {key} }}}}");
        let tight = format!("{{{{{key}}}}}");
        content = content.replace(&spaced, value).replace(&tight, value);
    }

    if let Some(start) = content.find("{{") {
        let placeholder: String = content[start..].chars().take(40).collect();
        return Err(SkyrigError::TemplateError(format!(
            "unresolved placeholder near `{}`",
            placeholder.trim()
        )));
    }

    Ok(content)
}
