// src/exec/sink.rs

//! Per-attempt log sinks.
//!
//! Every attempt acquires a fresh [`LogSink`] from a [`SinkProvider`]. The
//! sink is an owned value: it is either moved into the child process as its
//! stdout/stderr, or dropped, so it is released on every exit path.

use std::fmt::Debug;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing::trace;

/// Writable destination for one attempt's stdout and stderr.
#[derive(Debug)]
pub struct LogSink {
    file: Option<File>,
    path: Option<PathBuf>,
}

impl LogSink {
    pub fn file(file: File, path: PathBuf) -> Self {
        Self {
            file: Some(file),
            path: Some(path),
        }
    }

    /// A sink that discards everything.
    pub fn null() -> Self {
        Self {
            file: None,
            path: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Turn the sink into `(stdout, stderr)` handles for a child process.
    pub fn into_stdio(mut self) -> Result<(Stdio, Stdio)> {
        match self.file.take() {
            Some(file) => {
                let stderr = file
                    .try_clone()
                    .with_context(|| format!("duplicating log handle {:?}", self.path))?;
                Ok((Stdio::from(file), Stdio::from(stderr)))
            }
            None => Ok((Stdio::null(), Stdio::null())),
        }
    }
}

impl Drop for LogSink {
    fn drop(&mut self) {
        trace!(path = ?self.path, "log sink released");
    }
}

/// Source of per-attempt log sinks.
pub trait SinkProvider: Send + Sync + Debug {
    /// Acquire a new sink for `attempt` (1-based) of `node`.
    fn acquire(&self, node: &str, attempt: u32) -> Result<LogSink>;
}

/// Writes each attempt to `<root>/<dag>/<run-timestamp>/<node>_<attempt>.log`.
#[derive(Debug, Clone)]
pub struct FileSinkProvider {
    run_dir: PathBuf,
}

impl FileSinkProvider {
    pub fn new(root: impl AsRef<Path>, dag_name: &str, started_at: DateTime<Local>) -> Self {
        let stamp = started_at.format("%Y-%m-%d_%H-%M-%S").to_string();
        Self {
            run_dir: root.as_ref().join(dag_name).join(stamp),
        }
    }

    /// Directory holding this run's log files.
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn log_path(&self, node: &str, attempt: u32) -> PathBuf {
        self.run_dir.join(format!("{node}_{attempt}.log"))
    }
}

impl SinkProvider for FileSinkProvider {
    fn acquire(&self, node: &str, attempt: u32) -> Result<LogSink> {
        fs::create_dir_all(&self.run_dir)
            .with_context(|| format!("creating log directory {:?}", self.run_dir))?;

        let path = self.log_path(node, attempt);
        let file =
            File::create(&path).with_context(|| format!("creating log file {:?}", path))?;

        trace!(?path, "log sink acquired");
        Ok(LogSink::file(file, path))
    }
}

/// Discards all command output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSinkProvider;

impl SinkProvider for NullSinkProvider {
    fn acquire(&self, _node: &str, _attempt: u32) -> Result<LogSink> {
        Ok(LogSink::null())
    }
}
