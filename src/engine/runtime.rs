// src/engine/runtime.rs

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::dag::{Graph, Node, NodeName};
use crate::engine::context::ExecutionContext;
use crate::engine::events::{StatusEvent, StatusReporter};
use crate::engine::worker::NodeWorker;
use crate::exec::TaskRunner;
use crate::types::NodeStatus;

/// Final snapshot of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub graph: Graph,
    pub had_failures: bool,
}

impl RunReport {
    pub fn status_of(&self, node: &str) -> Option<NodeStatus> {
        self.graph.node(node).map(|n| n.status)
    }

    /// Names of the nodes that ended in `status`, ordered by name.
    pub fn nodes_with_status(&self, status: NodeStatus) -> Vec<&str> {
        self.graph
            .nodes()
            .filter(|n| n.status == status)
            .map(|n| n.name.as_str())
            .collect()
    }
}

/// Executes graphs: one Tokio task per node, wired together by per-edge
/// signal channels.
///
/// The engine itself holds no per-run state, so a single instance can run
/// several graphs concurrently.
#[derive(Debug, Clone)]
pub struct Engine {
    runner: TaskRunner,
    reporter: StatusReporter,
}

impl Engine {
    pub fn new(runner: TaskRunner) -> Self {
        Self {
            runner,
            reporter: StatusReporter::disabled(),
        }
    }

    pub fn with_reporter(mut self, reporter: StatusReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Run every node of `graph` and wait until all of them are terminal.
    ///
    /// - A failed node never aborts the run; only its dependents are
    ///   affected, according to their parent rule.
    /// - `had_failures` in the report is set when any node ended `Failed`.
    pub async fn execute(&self, mut graph: Graph) -> RunReport {
        graph.reset_statuses();

        info!(
            dag = %graph.name(),
            nodes = graph.len(),
            edges = graph.edge_count(),
            "DAG run starting"
        );
        self.reporter
            .emit(StatusEvent::DagStarted {
                name: graph.name().to_string(),
            })
            .await;

        let mut ctx = ExecutionContext::new(&graph);
        let failures = ctx.failures();

        let mut handles: Vec<(NodeName, JoinHandle<Node>)> = Vec::with_capacity(graph.len());
        for node in graph.nodes() {
            let wiring = ctx.take_wiring(&graph, &node.name);
            let worker = NodeWorker::new(
                node.clone(),
                wiring,
                self.runner.clone(),
                self.reporter.clone(),
                failures.clone(),
            );
            handles.push((node.name.clone(), tokio::spawn(worker.run())));
        }
        debug_assert_eq!(ctx.unclaimed_edges(), 0);

        for (name, handle) in handles {
            match handle.await {
                Ok(node) => graph.add_node(node),
                Err(err) => {
                    error!(dag = %graph.name(), node = %name, error = %err, "node worker panicked");
                    failures.mark();
                    let mut max_attempts = 1;
                    if let Some(node) = graph.node_mut(&name) {
                        node.status = NodeStatus::Failed;
                        node.pid = None;
                        max_attempts = node.max_attempts();
                    }
                    self.reporter
                        .node_status(&name, NodeStatus::Failed, 0, max_attempts, None)
                        .await;
                }
            }
        }

        debug_assert!(graph.nodes().all(|n| n.status.is_terminal()));

        let had_failures = failures.is_set();
        info!(dag = %graph.name(), had_failures, "DAG run completed");
        self.reporter
            .emit(StatusEvent::DagCompleted {
                name: graph.name().to_string(),
                had_failures,
            })
            .await;

        RunReport {
            graph,
            had_failures,
        }
    }
}
