use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::errors::SkyrigError;

/// Identifier correlating one provisioning run with its generated files and
/// logs. Timestamp-based so that lexicographic order is chronological order.
pub type RunId = String;

/// Prefix applied to every run identifier.
pub const RUN_ID_TAG: &str = "skyrig";

/// Generate a fresh run identifier, e.g. `skyrig-2026-08-06-14-03-22-120394`.
pub fn new_run_id() -> RunId {
    format!(
        "{}-{}",
        RUN_ID_TAG,
        chrono::Local::now().format("%Y-%m-%d-%H-%M-%S-%6f")
    )
}

/// The cloud providers a cluster can be launched on.
///
/// This is a closed set: adding a provider means extending this enum and
/// every exhaustive match on it. Unrecognised provider strings are rejected
/// at the parse boundary with [`SkyrigError::UnsupportedCloud`] instead of
/// surfacing later as a stringly-typed failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    Aws,
    Gcp,
    Azure,
}

impl CloudProvider {
    /// Region used when the task spec does not pin one.
    pub fn default_region(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "us-west-2",
            CloudProvider::Gcp => "us-west1",
            CloudProvider::Azure => "westus2",
        }
    }

    /// Login user baked into the provider's default machine images.
    pub fn default_ssh_user(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "ubuntu",
            CloudProvider::Gcp => "gcpuser",
            CloudProvider::Azure => "azureuser",
        }
    }

    /// Literal token identifying worker-node entries in the provisioner's
    /// status report. `None` means the provider has no distributed-cluster
    /// support and readiness polling must be rejected up front.
    pub fn worker_label(&self) -> Option<&'static str> {
        match self {
            CloudProvider::Aws => Some("ray.worker.default"),
            CloudProvider::Gcp => Some("ray_worker_default"),
            CloudProvider::Azure => None,
        }
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CloudProvider::Aws => "aws",
            CloudProvider::Gcp => "gcp",
            CloudProvider::Azure => "azure",
        };
        f.write_str(name)
    }
}

impl FromStr for CloudProvider {
    type Err = SkyrigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aws" => Ok(CloudProvider::Aws),
            "gcp" => Ok(CloudProvider::Gcp),
            "azure" => Ok(CloudProvider::Azure),
            other => Err(SkyrigError::UnsupportedCloud(format!(
                "{other} (expected one of \"aws\", \"gcp\", \"azure\")"
            ))),
        }
    }
}
