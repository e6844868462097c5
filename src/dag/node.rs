// src/dag/node.rs

//! Node (task) metadata plus its per-run status.

use std::time::Duration;

use serde::Serialize;

use crate::config::model::TaskConfig;
use crate::types::{NodeStatus, ParentRule};

/// Canonical node name type used throughout the crate.
pub type NodeName = String;

/// Delay applied between attempts when a node has `retries > 0` but no
/// explicit `retry_delay`.
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

/// A single command in the DAG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub name: NodeName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub command: String,
    pub parent_rule: ParentRule,
    /// Extra attempts beyond the first.
    pub retries: u32,
    /// Seconds to wait between attempts.
    pub retry_delay: u64,
    pub status: NodeStatus,
    /// Process id of the most recent attempt's subprocess, if one was spawned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
}

impl Node {
    /// A `Pending` node with default rule and no retries.
    pub fn new(name: impl Into<NodeName>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            command: command.into(),
            parent_rule: ParentRule::default(),
            retries: 0,
            retry_delay: 0,
            status: NodeStatus::Pending,
            pid: None,
        }
    }

    pub fn from_config(name: NodeName, cfg: &TaskConfig) -> Self {
        Self {
            name,
            description: cfg.desc.clone(),
            command: cfg.cmd.clone(),
            parent_rule: cfg.parent_rule,
            retries: cfg.retries,
            retry_delay: cfg.effective_retry_delay(),
            status: NodeStatus::Pending,
            pid: None,
        }
    }

    /// Total attempts this node may make: the first one plus `retries`.
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1).max(1)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay)
    }

    pub(crate) fn reset(&mut self) {
        self.status = NodeStatus::Pending;
        self.pid = None;
    }
}
