// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod provision;
pub mod types;

use std::io;
use std::path::Path;
use std::process::Stdio;

use anyhow::Result;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::{CliArgs, CliCommand};
use crate::config::load_and_validate;
use crate::errors::SkyrigError;
use crate::exec::{RemoteTarget, StreamSession, default_log_path, run_on_target};
use crate::provision::{
    READY_POLL_INTERVAL, RayStatusProbe, wait_until_ready, write_cluster_config,
};
use crate::types::new_run_id;

/// Marker in the launch output from which console echo begins. Everything
/// before it is bootstrap noise; it still lands in the log file.
const LAUNCH_STREAM_MARKER: &str = "Shared connection to ";

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - task spec loading
/// - cluster config materialization
/// - the launch step with captured/streamed output
/// - readiness polling with Ctrl-C cancellation
/// - one-shot remote execution
pub async fn run(args: CliArgs) -> Result<()> {
    match args.command {
        CliCommand::Up {
            task,
            template,
            dryrun,
            no_stream,
        } => {
            up(&task, &template, dryrun, !no_stream).await?;
        }
        CliCommand::Exec {
            address,
            user,
            key,
            container,
            command,
        } => {
            let target = RemoteTarget {
                address,
                user,
                private_key: key,
                container,
            };
            let result = run_on_target(&target, &command).await?;
            print!("{}", result.stdout);
        }
    }

    Ok(())
}

async fn up(
    task_path: &Path,
    template: &Path,
    dryrun: bool,
    stream_output: bool,
) -> crate::errors::Result<()> {
    let task = load_and_validate(task_path)?;
    let run_id = new_run_id();
    info!(run_id = %run_id, task = %task.name, "materializing cluster config");

    let config_path = write_cluster_config(&run_id, &task, template, dryrun)?;
    if dryrun {
        info!(config = %config_path.display(), "dry run; skipping launch");
        return Ok(());
    }

    // Ctrl-C → cancel the readiness wait instead of leaving the process
    // blocked on a cluster that never converges.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            cancel.cancel();
        });
    }

    launch_cluster(&run_id, &config_path, stream_output).await?;

    let mut probe = RayStatusProbe;
    wait_until_ready(
        &mut probe,
        &config_path,
        task.cloud,
        task.num_nodes,
        READY_POLL_INTERVAL,
        &cancel,
    )
    .await?;

    info!(config = %config_path.display(), "cluster is up");
    Ok(())
}

/// Launch the cluster with the provisioning tool, teeing its output into
/// the run's log file and echoing from the connection marker onward.
async fn launch_cluster(
    run_id: &str,
    config_path: &Path,
    stream_output: bool,
) -> crate::errors::Result<()> {
    let shell_cmd = format!("ray up -y {}", config_path.display());
    info!(command = %shell_cmd, "launching cluster");

    let mut child = Command::new("sh")
        .arg("-c")
        .arg(&shell_cmd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let session = StreamSession::new(
        default_log_path(run_id),
        stream_output,
        LAUNCH_STREAM_MARKER,
    );
    let (_stdout, stderr) = session.capture(&mut child, &mut io::stdout()).await?;

    let status = child.wait().await?;
    if !status.success() {
        return Err(SkyrigError::RemoteExecution {
            exit_code: status.code().unwrap_or(-1),
            command: shell_cmd,
            stderr,
        });
    }

    info!(log = %session.log_path().display(), "launch complete");
    Ok(())
}
