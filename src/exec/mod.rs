// src/exec/mod.rs

//! Remote execution and output capture layer.
//!
//! - [`remote`] runs a single command on a target host over SSH and returns
//!   its collected output once the command terminates.
//! - [`capture`] drains a locally spawned child's stdout/stderr into a log
//!   file, with optional marker-gated echo to a console sink.
//!
//! The two are deliberately separate: the single-shot remote path has no
//! streaming variant, and the capture path works on any child process the
//! caller manages directly.

pub mod capture;
pub mod remote;

pub use capture::{LOGS_DIRECTORY, StreamSession, default_log_path};
pub use remote::{ExecutionResult, RemoteTarget, run_on_target};
