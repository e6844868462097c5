use std::fmt;

use serde::{Deserialize, Serialize};

/// Policy deciding when a node may run, based on the terminal statuses of
/// its parents.
///
/// - `AllSuccess`: every parent must end `Success`; the first `Failed` or
///   `Skipped` parent skips this node (default).
/// - `AllComplete`: every parent must reach *some* terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentRule {
    #[default]
    AllSuccess,
    AllComplete,
}

/// Lifecycle status of a node within a single DAG run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    #[default]
    Pending,
    Running,
    Success,
    Failed,
    Skipped,
}

impl NodeStatus {
    /// `Success`, `Failed` and `Skipped` never transition again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            NodeStatus::Success | NodeStatus::Failed | NodeStatus::Skipped
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeStatus::Pending => "pending",
            NodeStatus::Running => "running",
            NodeStatus::Success => "success",
            NodeStatus::Failed => "failed",
            NodeStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The subset of [`NodeStatus`] a node can finish in.
///
/// This is what travels over dependency edges, so a parent can never signal
/// a non-terminal state to its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalStatus {
    Success,
    Failed,
    Skipped,
}

impl From<TerminalStatus> for NodeStatus {
    fn from(status: TerminalStatus) -> Self {
        match status {
            TerminalStatus::Success => NodeStatus::Success,
            TerminalStatus::Failed => NodeStatus::Failed,
            TerminalStatus::Skipped => NodeStatus::Skipped,
        }
    }
}

impl fmt::Display for TerminalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(NodeStatus::from(*self).as_str())
    }
}
