// src/exec/capture.rs

//! Child process output capture.
//!
//! [`StreamSession`] drains a child's stdout and stderr concurrently, so
//! that neither pipe can fill up and block the child while the other is
//! being read to exhaustion. Every line is teed into a durable log file;
//! once a marker string has been observed, lines are additionally echoed to
//! a caller-supplied console sink.
//!
//! Per-channel line order is preserved exactly. The interleaving *between*
//! the two channels reflects only the order lines became readable, which is
//! inherently racy with respect to the child's true write order; it is good
//! enough for humans and must not be relied on for anything else.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::errors::{Result, SkyrigError};

/// Default directory capture logs are written under, relative to the
/// invocation directory.
pub const LOGS_DIRECTORY: &str = "./skyrig_logs";

/// Log path for a run: `<LOGS_DIRECTORY>/<run_id>.log`.
pub fn default_log_path(run_id: &str) -> PathBuf {
    Path::new(LOGS_DIRECTORY).join(format!("{run_id}.log"))
}

/// Which channel a captured line arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Stdout,
    Stderr,
}

/// One capture session over a child's stdout/stderr.
///
/// The session owns the log file handle for the duration of [`capture`] and
/// releases it on every exit path, including I/O failures. The log receives
/// every line from both channels unconditionally; the console sink receives
/// lines only while echo is active and `stream_output` is set.
///
/// [`capture`]: StreamSession::capture
#[derive(Debug, Clone)]
pub struct StreamSession {
    log_path: PathBuf,
    stream_output: bool,
    start_marker: String,
}

impl StreamSession {
    /// `start_marker` gates the console echo: echo turns on (and stays on)
    /// the first time any line from either channel contains it. An empty
    /// marker means echo is active from the first line.
    pub fn new(
        log_path: impl Into<PathBuf>,
        stream_output: bool,
        start_marker: impl Into<String>,
    ) -> Self {
        StreamSession {
            log_path: log_path.into(),
            stream_output,
            start_marker: start_marker.into(),
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Drain both output channels of `child` until each reports
    /// end-of-stream, returning the accumulated (stdout, stderr) text.
    ///
    /// The child must have been spawned with both channels piped. Log-file
    /// open/write failures are fatal for the session and surface as
    /// [`SkyrigError::StreamIo`]; nothing is retried and partial buffers are
    /// dropped with the error.
    pub async fn capture<W>(&self, child: &mut Child, console: &mut W) -> Result<(String, String)>
    where
        W: Write,
    {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SkyrigError::Other(anyhow::anyhow!("child stdout is not piped")))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| SkyrigError::Other(anyhow::anyhow!("child stderr is not piped")))?;

        if let Some(parent) = self.log_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(SkyrigError::StreamIo)?;
            }
        }
        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(SkyrigError::StreamIo)?;

        // One reader task per channel, one synchronized sink.
        let (tx, mut rx) = mpsc::channel::<(Channel, String)>(64);
        spawn_line_reader(Channel::Stdout, stdout, tx.clone());
        spawn_line_reader(Channel::Stderr, stderr, tx);

        let mut stdout_buf = String::new();
        let mut stderr_buf = String::new();
        let mut echo_active = self.start_marker.is_empty();

        // `rx` yields None once both readers hit end-of-stream.
        while let Some((channel, line)) = rx.recv().await {
            if !echo_active && line.contains(&self.start_marker) {
                echo_active = true;
            }

            match channel {
                Channel::Stdout => stdout_buf.push_str(&line),
                Channel::Stderr => stderr_buf.push_str(&line),
            }

            log.write_all(line.as_bytes()).map_err(SkyrigError::StreamIo)?;
            // Flush per line: durability over throughput.
            log.flush().map_err(SkyrigError::StreamIo)?;

            if self.stream_output && echo_active {
                // Echo is best-effort; a broken console must not abort the
                // capture or the log.
                let _ = console.write_all(line.as_bytes());
                let _ = console.flush();
            }
        }

        Ok((stdout_buf, stderr_buf))
    }
}

/// Read `reader` line by line (delimiter kept) and forward each line to the
/// sink. An empty read is that channel's end-of-stream.
fn spawn_line_reader<R>(channel: Channel, reader: R, tx: mpsc::Sender<(Channel, String)>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf).into_owned();
                    if tx.send((channel, line)).await.is_err() {
                        // Receiver gone: the capture loop bailed out early.
                        break;
                    }
                }
                Err(err) => {
                    warn!(?channel, error = %err, "error reading child output");
                    break;
                }
            }
        }
        debug!(?channel, "channel drained");
    });
}
