// src/exec/remote.rs

//! Single-shot remote command execution over SSH.

use std::path::PathBuf;

use tokio::process::Command;
use tracing::{error, info};

use crate::errors::{Result, SkyrigError};

/// Where a command runs. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct RemoteTarget {
    /// Network address of the host.
    pub address: String,
    /// Login user on the host.
    pub user: String,
    /// Private key used for the SSH connection.
    pub private_key: PathBuf,
    /// If set, commands are rewritten to run inside this container on the
    /// host rather than on the bare machine.
    pub container: Option<String>,
}

impl RemoteTarget {
    /// The `user@address` form SSH expects.
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.address)
    }
}

/// Captured output of one finished command.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Rewrite `command` so it executes inside `container` on the remote host.
///
/// Backslashes are escaped before double quotes; the reverse order would
/// escape the freshly inserted backslashes a second time.
pub fn wrap_in_container(container: &str, command: &str) -> String {
    let escaped = command.replace('\\', "\\\\").replace('"', "\\\"");
    format!("docker exec {container} /bin/bash -c \"{escaped}\"")
}

/// Build the argument vector passed to the `ssh` binary for `target`.
///
/// Host-key checking is disabled by policy: freshly provisioned nodes always
/// present unknown keys, and a fingerprint prompt would wedge a
/// non-interactive run. This is a deliberate security trade-off.
pub fn build_ssh_args(target: &RemoteTarget, command: &str) -> Vec<String> {
    let command = match &target.container {
        Some(container) => wrap_in_container(container, command),
        None => command.to_string(),
    };
    vec![
        "-i".to_string(),
        target.private_key.display().to_string(),
        "-o".to_string(),
        "StrictHostKeyChecking=no".to_string(),
        target.destination(),
        command,
    ]
}

/// Render an argument vector for diagnostics, eliding the `-i <key>` pair so
/// credential paths never end up in error messages.
pub fn sanitized_command_line(program: &str, args: &[String]) -> String {
    let mut parts = vec![program.to_string()];
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "-i" {
            iter.next();
            continue;
        }
        parts.push(arg.clone());
    }
    parts.join(" ")
}

/// Run `program` with `args`, blocking until it exits, and classify the
/// outcome.
///
/// Non-empty stdout is logged at info level. On nonzero exit the collected
/// stderr is logged at error level before the error is returned, so the
/// operator sees the failure reason and not just an exit code. The returned
/// error carries `display_command`, not the raw argv.
pub async fn run_argv(
    program: &str,
    args: &[String],
    display_command: &str,
) -> Result<ExecutionResult> {
    let output = Command::new(program).args(args).output().await.map_err(|err| {
        SkyrigError::RemoteExecution {
            exit_code: -1,
            command: display_command.to_string(),
            stderr: format!("failed to start process: {err}"),
        }
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !stdout.is_empty() {
        info!(command = %display_command, "{}", stdout.trim_end());
    }

    let exit_code = output.status.code().unwrap_or(-1);
    if !output.status.success() {
        if !stderr.is_empty() {
            error!(command = %display_command, "{}", stderr.trim_end());
        }
        return Err(SkyrigError::RemoteExecution {
            exit_code,
            command: display_command.to_string(),
            stderr,
        });
    }

    Ok(ExecutionResult {
        stdout,
        stderr,
        exit_code,
    })
}

/// Run `command` on `target` over SSH, blocking until it terminates.
///
/// There is no streaming variant of this single-shot path; callers that need
/// live output spawn the child themselves and hand it to
/// [`crate::exec::StreamSession`].
pub async fn run_on_target(target: &RemoteTarget, command: &str) -> Result<ExecutionResult> {
    let args = build_ssh_args(target, command);
    let display = sanitized_command_line("ssh", &args);

    info!(
        destination = %target.destination(),
        container = target.container.as_deref().unwrap_or("-"),
        "running remote command"
    );

    run_argv("ssh", &args, &display).await
}
