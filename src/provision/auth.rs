// src/provision/auth.rs

//! SSH credential injection into rendered cluster configs.

use serde_yaml::{Mapping, Value};

use crate::errors::{Result, SkyrigError};
use crate::types::CloudProvider;

/// Private key every provisioned cluster is reachable with.
pub const PRIVATE_SSH_KEY_PATH: &str = "~/.ssh/skyrig-key";

/// Public half of [`PRIVATE_SSH_KEY_PATH`]; some providers need it at VM
/// creation time.
pub const PUBLIC_SSH_KEY_PATH: &str = "~/.ssh/skyrig-key.pub";

/// Fill the `auth` block of a cluster config with the provider's login user
/// and key material. Existing values are overwritten so a re-render cannot
/// keep stale credentials.
pub fn inject_auth(cloud: CloudProvider, config: &mut Value) -> Result<()> {
    let root = config.as_mapping_mut().ok_or_else(|| {
        SkyrigError::ConfigError("cluster config root must be a mapping".to_string())
    })?;

    let auth = root
        .entry(Value::from("auth"))
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    let auth = auth
        .as_mapping_mut()
        .ok_or_else(|| SkyrigError::ConfigError("`auth` must be a mapping".to_string()))?;

    match cloud {
        CloudProvider::Aws | CloudProvider::Gcp => {
            set(auth, "ssh_user", cloud.default_ssh_user());
            set(auth, "ssh_private_key", PRIVATE_SSH_KEY_PATH);
        }
        CloudProvider::Azure => {
            set(auth, "ssh_user", cloud.default_ssh_user());
            set(auth, "ssh_private_key", PRIVATE_SSH_KEY_PATH);
            // Azure resolves the key pair at VM creation, not at login.
            set(auth, "ssh_public_key", PUBLIC_SSH_KEY_PATH);
        }
    }

    Ok(())
}

fn set(map: &mut Mapping, key: &str, value: &str) {
    map.insert(Value::from(key), Value::from(value));
}
