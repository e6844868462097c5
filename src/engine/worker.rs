// src/engine/worker.rs

//! The per-node worker: wait for parents, apply the parent rule, run,
//! signal children.

use tracing::{debug, info, warn};

use crate::dag::Node;
use crate::engine::context::{FailureFlag, NodeWiring};
use crate::engine::events::StatusReporter;
use crate::engine::gate::{GateDecision, ParentGate};
use crate::exec::{RunOutcome, TaskRunner};
use crate::types::{NodeStatus, TerminalStatus};

/// Owns one node for the duration of a run.
///
/// Only this worker writes the node's `status` and `pid`; the node is
/// handed back to the engine when [`NodeWorker::run`] returns.
#[derive(Debug)]
pub struct NodeWorker {
    node: Node,
    wiring: NodeWiring,
    runner: TaskRunner,
    reporter: StatusReporter,
    failures: FailureFlag,
}

impl NodeWorker {
    pub fn new(
        node: Node,
        wiring: NodeWiring,
        runner: TaskRunner,
        reporter: StatusReporter,
        failures: FailureFlag,
    ) -> Self {
        Self {
            node,
            wiring,
            runner,
            reporter,
            failures,
        }
    }

    pub async fn run(mut self) -> Node {
        let max_attempts = self.node.max_attempts();

        self.node.status = NodeStatus::Pending;
        self.reporter
            .node_status(&self.node.name, NodeStatus::Pending, 0, max_attempts, None)
            .await;

        let decision = self.await_parents().await;

        let outcome = match decision {
            GateDecision::Skip => {
                self.node.status = NodeStatus::Skipped;
                RunOutcome {
                    status: TerminalStatus::Skipped,
                    attempts: 0,
                }
            }
            GateDecision::Run => self.runner.run(&mut self.node, &self.reporter).await,
        };

        if outcome.status == TerminalStatus::Failed {
            self.failures.mark();
        }

        for (child, tx) in self.wiring.outbound.drain(..) {
            if tx.send(outcome.status).is_err() {
                debug!(node = %self.node.name, %child, "child no longer listening for signal");
            }
        }

        info!(
            node = %self.node.name,
            status = %outcome.status,
            attempts = outcome.attempts,
            "node finished"
        );
        self.reporter
            .node_status(
                &self.node.name,
                outcome.status.into(),
                outcome.attempts,
                max_attempts,
                None,
            )
            .await;

        self.node
    }

    /// Receive every parent signal and evaluate the parent rule.
    ///
    /// Every inbound edge is drained, even once the node has decided to
    /// skip, so all upstream work is observed before anything is sent
    /// downstream.
    async fn await_parents(&mut self) -> GateDecision {
        let mut gate = ParentGate::new(self.node.parent_rule);

        for (parent, rx) in self.wiring.inbound.drain(..) {
            let signal = match rx.await {
                Ok(signal) => signal,
                Err(_) => {
                    warn!(
                        node = %self.node.name,
                        %parent,
                        "parent worker exited without signalling; treating as failed"
                    );
                    TerminalStatus::Failed
                }
            };

            debug!(node = %self.node.name, %parent, %signal, "received parent signal");

            if gate.observe(signal) {
                info!(
                    node = %self.node.name,
                    %parent,
                    %signal,
                    rule = ?self.node.parent_rule,
                    "parent rule not met; node will be skipped"
                );
                if gate.skipped_by_failure() {
                    self.failures.mark();
                }
            }
        }

        gate.decision()
    }
}
