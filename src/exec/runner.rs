// src/exec/runner.rs

//! Runs one node's command with retries.

use std::fmt;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::dag::Node;
use crate::engine::events::StatusReporter;
use crate::exec::backend::{ExitOutcome, ProcessBackend, ShellBackend};
use crate::exec::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::exec::sink::SinkProvider;
use crate::types::{NodeStatus, TerminalStatus};

/// Result of running a node: its terminal status and how many attempts were
/// started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub status: TerminalStatus,
    pub attempts: u32,
}

/// Executes a node's command through a [`ProcessBackend`], retrying
/// according to the node's [`RetryPolicy`].
///
/// Cheap to clone; every worker gets its own copy.
#[derive(Clone)]
pub struct TaskRunner {
    backend: Arc<dyn ProcessBackend>,
    sinks: Arc<dyn SinkProvider>,
    sleeper: Arc<dyn Sleeper>,
}

impl fmt::Debug for TaskRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRunner")
            .field("sinks", &self.sinks)
            .finish_non_exhaustive()
    }
}

impl TaskRunner {
    pub fn new(
        backend: Arc<dyn ProcessBackend>,
        sinks: Arc<dyn SinkProvider>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            backend,
            sinks,
            sleeper,
        }
    }

    /// Production runner: `sh -c` processes and real sleeps.
    pub fn shell(sinks: Arc<dyn SinkProvider>) -> Self {
        Self::new(Arc::new(ShellBackend), sinks, Arc::new(TokioSleeper))
    }

    /// Run `node` until it succeeds or its attempts are exhausted.
    ///
    /// Updates `node.status` / `node.pid` along the way and emits a
    /// `Running` event per attempt. The terminal event is left to the
    /// caller.
    ///
    /// - Failing to acquire a log sink fails the node at once; that is an
    ///   infrastructure problem, not something a retry would fix.
    /// - Non-zero exits and spawn/wait errors are retried after
    ///   `policy.delay` while attempts remain.
    pub async fn run(&self, node: &mut Node, reporter: &StatusReporter) -> RunOutcome {
        let policy = RetryPolicy::for_node(node);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let sink = match self.sinks.acquire(&node.name, attempt) {
                Ok(sink) => sink,
                Err(err) => {
                    error!(
                        node = %node.name,
                        attempt,
                        error = %err,
                        "could not acquire log sink; failing node without retry"
                    );
                    node.status = NodeStatus::Failed;
                    return RunOutcome {
                        status: TerminalStatus::Failed,
                        attempts: attempt,
                    };
                }
            };

            node.status = NodeStatus::Running;

            let succeeded = match self.backend.spawn(&node.name, &node.command, sink) {
                Ok(process) => {
                    node.pid = process.pid;
                    reporter
                        .node_status(
                            &node.name,
                            NodeStatus::Running,
                            attempt,
                            policy.max_attempts,
                            process.pid,
                        )
                        .await;
                    info!(
                        node = %node.name,
                        attempt,
                        max_attempts = policy.max_attempts,
                        pid = ?process.pid,
                        cmd = %node.command,
                        "node process started"
                    );

                    let exit = process.exit.await;
                    node.pid = None;

                    match exit {
                        Ok(ExitOutcome::Success) => true,
                        Ok(ExitOutcome::Failed(code)) => {
                            warn!(node = %node.name, attempt, exit_code = code, "node process failed");
                            false
                        }
                        Err(err) => {
                            warn!(node = %node.name, attempt, error = %err, "waiting for node process failed");
                            false
                        }
                    }
                }
                Err(err) => {
                    reporter
                        .node_status(
                            &node.name,
                            NodeStatus::Running,
                            attempt,
                            policy.max_attempts,
                            None,
                        )
                        .await;
                    warn!(node = %node.name, attempt, error = %err, "could not spawn node process");
                    false
                }
            };

            if succeeded {
                info!(node = %node.name, attempt, "node succeeded");
                node.status = NodeStatus::Success;
                return RunOutcome {
                    status: TerminalStatus::Success,
                    attempts: attempt,
                };
            }

            if !policy.should_retry(attempt) {
                warn!(node = %node.name, attempts = attempt, "node failed; no attempts left");
                node.status = NodeStatus::Failed;
                return RunOutcome {
                    status: TerminalStatus::Failed,
                    attempts: attempt,
                };
            }

            info!(
                node = %node.name,
                attempt,
                delay_secs = policy.delay.as_secs_f64(),
                "retrying node after delay"
            );
            self.sleeper.sleep(policy.delay).await;
        }
    }
}
