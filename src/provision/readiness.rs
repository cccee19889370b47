// src/provision/readiness.rs

//! Cluster readiness polling.
//!
//! After a launch, worker nodes join the cluster asynchronously. The poller
//! repeatedly asks the provisioning tool for a status report and returns
//! once the report shows every expected worker. There is deliberately no
//! upper bound on the wait; callers bound it with the cancellation token.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::errors::{Result, SkyrigError};
use crate::exec::remote::run_argv;
use crate::types::CloudProvider;

/// Interval between status queries while waiting for workers to join.
pub const READY_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Source of cluster status reports.
///
/// Production code uses [`RayStatusProbe`]; tests can provide their own
/// implementation that doesn't shell out.
pub trait StatusProbe: Send {
    /// Return the provisioner's textual status report for the cluster
    /// described by `config_path`.
    ///
    /// A query that cannot be answered (transport or authorization failure)
    /// must return an error; "not ready yet" is expressed by the report's
    /// content, not by failing.
    fn query(
        &mut self,
        config_path: &Path,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>>;
}

/// Real probe: runs `ray exec <config> 'ray status'` through a shell.
pub struct RayStatusProbe;

impl StatusProbe for RayStatusProbe {
    fn query(
        &mut self,
        config_path: &Path,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>> {
        let config: PathBuf = config_path.to_path_buf();

        Box::pin(async move {
            let shell_cmd = format!("ray exec {} 'ray status'", config.display());
            let args = vec!["-c".to_string(), shell_cmd.clone()];
            let result = run_argv("sh", &args, &shell_cmd).await?;
            Ok(result.stdout)
        })
    }
}

/// Block until the cluster behind `config_path` reports every expected
/// worker (`num_nodes - 1` of them), sleeping `poll_interval` between
/// queries.
///
/// - `num_nodes <= 1`: a single-node cluster has no workers to wait for;
///   returns immediately without querying.
/// - A provider without a worker label cannot host a distributed cluster;
///   that is reported before the first query.
/// - A failing status query propagates immediately — a transport failure is
///   not "not ready yet".
/// - `cancel` is checked around every sleep; a fired token yields
///   [`SkyrigError::Cancelled`].
pub async fn wait_until_ready<P>(
    probe: &mut P,
    config_path: &Path,
    cloud: CloudProvider,
    num_nodes: u32,
    poll_interval: Duration,
    cancel: &CancellationToken,
) -> Result<()>
where
    P: StatusProbe + ?Sized,
{
    if num_nodes <= 1 {
        debug!("single-node cluster; no workers to wait for");
        return Ok(());
    }

    let worker_label = cloud.worker_label().ok_or_else(|| {
        SkyrigError::UnsupportedCloud(format!("no distributed-cluster support for {cloud}"))
    })?;

    let expected_workers = num_nodes - 1;
    let needle = format!("{expected_workers} {worker_label}");

    info!(
        config = %config_path.display(),
        expected_workers,
        "waiting for cluster to be ready"
    );

    let mut attempts = 0u32;
    loop {
        attempts += 1;
        let output = probe.query(config_path).await?;

        // A deliberately simple substring check: the report schema is
        // provider-controlled and not machine-parseable.
        if output.contains(&needle) {
            info!(expected_workers, attempts, "cluster is ready");
            return Ok(());
        }

        debug!(attempts, "workers not ready yet");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SkyrigError::Cancelled),
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }
}
