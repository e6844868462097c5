// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the commands defined in
//! the nodes and turning their exit codes into terminal statuses.
//!
//! - [`runner`] holds the `TaskRunner` retry loop.
//! - [`backend`] provides the `ProcessBackend` trait and the `sh -c`
//!   implementation used in production, which tests replace with a fake.
//! - [`retry`] defines the retry policy and the injectable `Sleeper`.
//! - [`sink`] acquires per-attempt log sinks.

pub mod backend;
pub mod retry;
pub mod runner;
pub mod sink;

pub use backend::{ExitFuture, ExitOutcome, ProcessBackend, ShellBackend, SpawnedProcess};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use runner::{RunOutcome, TaskRunner};
pub use sink::{FileSinkProvider, LogSink, NullSinkProvider, SinkProvider};
