// src/cli.rs

//! Command-line surface.
//!
//! Only the two operations the core needs are exposed:
//! - `up`: materialize a cluster config, launch it, wait for readiness.
//! - `exec`: run one command on a remote host over SSH.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "skyrig", version, about = "Provision clusters and run commands on them")]
pub struct CliArgs {
    /// Log verbosity; overrides the `SKYRIG_LOG` environment variable.
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Write the cluster config for a task spec, launch the cluster, and
    /// block until it is ready.
    Up {
        /// Path to the YAML task spec.
        #[arg(long)]
        task: PathBuf,

        /// Cluster config template (must end in `.j2`).
        #[arg(long, default_value = "config/cluster.yml.j2")]
        template: PathBuf,

        /// Render the cluster config and stop; no launch, no auth injection.
        #[arg(long)]
        dryrun: bool,

        /// Do not echo launch output to the console. Output is still
        /// recorded in the run's log file.
        #[arg(long)]
        no_stream: bool,
    },

    /// Run a single command on a remote host over SSH.
    Exec {
        /// Host address to connect to.
        #[arg(long)]
        address: String,

        /// Login user on the remote host.
        #[arg(long, default_value = "ubuntu")]
        user: String,

        /// Private key for the SSH connection.
        #[arg(long)]
        key: PathBuf,

        /// Run the command inside this container on the remote host.
        #[arg(long)]
        container: Option<String>,

        /// The shell command to run.
        command: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}
