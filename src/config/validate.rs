// src/config/validate.rs

use crate::config::model::{LaunchTask, RawLaunchTask};
use crate::errors::{Result, SkyrigError};

impl TryFrom<RawLaunchTask> for LaunchTask {
    type Error = SkyrigError;

    fn try_from(raw: RawLaunchTask) -> std::result::Result<Self, Self::Error> {
        validate_raw_task(&raw)?;
        Ok(LaunchTask::new_unchecked(raw))
    }
}

fn validate_raw_task(raw: &RawLaunchTask) -> Result<()> {
    if raw.name.trim().is_empty() {
        return Err(SkyrigError::ConfigError(
            "task `name` must not be empty".to_string(),
        ));
    }

    if raw.num_nodes == 0 {
        return Err(SkyrigError::ConfigError(
            "`num_nodes` must be >= 1 (got 0)".to_string(),
        ));
    }

    // Region and zones come as a pair: zone names are meaningless without
    // the region that contains them, and a bare region leaves zone selection
    // undefined.
    if raw.region.is_some() != !raw.zones.is_empty() {
        return Err(SkyrigError::ConfigError(format!(
            "task '{}': set either both or neither of `region` and `zones`",
            raw.name
        )));
    }

    if raw.container_name.is_some() && raw.docker_image.is_none() {
        return Err(SkyrigError::ConfigError(format!(
            "task '{}': `container_name` requires `docker_image`",
            raw.name
        )));
    }

    Ok(())
}
