// src/engine/context.rs

//! Per-execution state: the edge signal table and the shared failure flag.
//!
//! One `ExecutionContext` is created for every `Engine::execute` call, so
//! several DAG runs can be in flight at once without sharing anything.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::oneshot;

use crate::dag::{Graph, NodeName};
use crate::types::TerminalStatus;

/// Identifies the dependency edge `parent -> child`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub parent: NodeName,
    pub child: NodeName,
}

impl EdgeKey {
    pub fn new(parent: impl Into<NodeName>, child: impl Into<NodeName>) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
        }
    }
}

/// "Did any node fail during this run", written by many workers.
#[derive(Debug, Clone, Default)]
pub struct FailureFlag(Arc<AtomicBool>);

impl FailureFlag {
    pub fn mark(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The channels one node's worker needs: a receiver per parent edge and a
/// sender per child edge.
#[derive(Debug, Default)]
pub struct NodeWiring {
    pub inbound: Vec<(NodeName, oneshot::Receiver<TerminalStatus>)>,
    pub outbound: Vec<(NodeName, oneshot::Sender<TerminalStatus>)>,
}

/// Edge signal table for a single run.
///
/// Every edge gets a one-shot channel: its single buffered slot means the
/// parent's send never waits, whether or not the child ever reads it.
#[derive(Debug)]
pub struct ExecutionContext {
    senders: HashMap<EdgeKey, oneshot::Sender<TerminalStatus>>,
    receivers: HashMap<EdgeKey, oneshot::Receiver<TerminalStatus>>,
    failures: FailureFlag,
}

impl ExecutionContext {
    /// Allocate one signal channel per edge of `graph`.
    pub fn new(graph: &Graph) -> Self {
        let mut senders = HashMap::with_capacity(graph.edge_count());
        let mut receivers = HashMap::with_capacity(graph.edge_count());

        for (parent, child) in graph.edges() {
            let (tx, rx) = oneshot::channel();
            let key = EdgeKey::new(parent, child);
            senders.insert(key.clone(), tx);
            receivers.insert(key, rx);
        }

        Self {
            senders,
            receivers,
            failures: FailureFlag::default(),
        }
    }

    /// Number of edges whose channels have not been handed out yet.
    pub fn unclaimed_edges(&self) -> usize {
        self.senders.len().max(self.receivers.len())
    }

    pub fn failures(&self) -> FailureFlag {
        self.failures.clone()
    }

    /// Hand over `node`'s channel ends. Each end can be claimed only once.
    pub fn take_wiring(&mut self, graph: &Graph, node: &str) -> NodeWiring {
        let inbound = graph
            .parents_of(node)
            .iter()
            .filter_map(|parent| {
                self.receivers
                    .remove(&EdgeKey::new(parent.as_str(), node))
                    .map(|rx| (parent.clone(), rx))
            })
            .collect();

        let outbound = graph
            .children_of(node)
            .iter()
            .filter_map(|child| {
                self.senders
                    .remove(&EdgeKey::new(node, child.as_str()))
                    .map(|tx| (child.clone(), tx))
            })
            .collect();

        NodeWiring { inbound, outbound }
    }
}
