// src/exec/backend.rs

//! Pluggable process backend abstraction.
//!
//! The task runner talks to a `ProcessBackend` instead of spawning
//! `tokio::process::Command`s itself. This keeps the retry and status logic
//! testable with a fake backend that never touches the OS.
//!
//! - [`ShellBackend`] is the production implementation: `sh -c <command>`
//!   with stdout/stderr redirected into the attempt's log sink.
//! - Tests provide their own backend with scripted exit codes and run times.

use std::future::Future;
use std::pin::Pin;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::debug;

use crate::exec::sink::LogSink;

/// How a spawned process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    /// Non-zero exit; `-1` when the process was terminated by a signal.
    Failed(i32),
}

/// Future resolving once the spawned process has exited.
pub type ExitFuture = Pin<Box<dyn Future<Output = Result<ExitOutcome>> + Send>>;

/// A process that has been started but not yet awaited.
pub struct SpawnedProcess {
    pub pid: Option<u32>,
    pub exit: ExitFuture,
}

impl SpawnedProcess {
    pub fn new(pid: Option<u32>, exit: ExitFuture) -> Self {
        Self { pid, exit }
    }
}

/// Trait abstracting how a node's command is started.
///
/// `spawn` must not block: it starts the process and hands back its pid plus
/// a future for its exit. The sink is owned by the backend from here on and
/// must be released when the process ends (or immediately if spawning fails).
pub trait ProcessBackend: Send + Sync {
    fn spawn(&self, node: &str, command: &str, sink: LogSink) -> Result<SpawnedProcess>;
}

/// Runs commands through `sh -c`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellBackend;

impl ProcessBackend for ShellBackend {
    fn spawn(&self, node: &str, command: &str, sink: LogSink) -> Result<SpawnedProcess> {
        let (stdout, stderr) = sink.into_stdio()?;

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .stdin(std::process::Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning process for node '{node}'"))?;

        let pid = child.id();
        debug!(node = %node, ?pid, "spawned shell process");

        let node = node.to_string();
        let exit: ExitFuture = Box::pin(async move {
            let status = child
                .wait()
                .await
                .with_context(|| format!("waiting for process of node '{node}'"))?;

            Ok::<_, anyhow::Error>(if status.success() {
                ExitOutcome::Success
            } else {
                ExitOutcome::Failed(status.code().unwrap_or(-1))
            })
        });

        Ok(SpawnedProcess::new(pid, exit))
    }
}
