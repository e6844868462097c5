// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::dag::node::DEFAULT_RETRY_DELAY_SECS;
use crate::types::ParentRule;

/// Top-level DAG file as read from TOML, before validation.
///
/// ```toml
/// name = "etl"
/// schedule = "0 */2 * * *"
/// edges = ["[extract, transform] >> load"]
///
/// [task.extract]
/// cmd = "./extract.sh"
/// retries = 2
///
/// [dependencies]
/// report = ["load"]
/// ```
///
/// Top-level keys must come before the first table, as usual in TOML.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawDagFile {
    /// DAG name; when omitted the loader falls back to the file stem.
    #[serde(default)]
    pub name: Option<String>,

    /// Cron expression consumed by an external scheduler.
    #[serde(default)]
    pub schedule: Option<String>,

    /// All nodes from `[task.<name>]`.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,

    /// `child = ["parent", ...]` table.
    #[serde(default)]
    pub dependencies: BTreeMap<String, Vec<String>>,

    /// Edge lines in `parent >> child` / `[p1, p2] >> child` form.
    #[serde(default)]
    pub edges: Vec<String>,
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// Shell command line, run through `sh -c`.
    pub cmd: String,

    /// Free-text description.
    #[serde(default)]
    pub desc: Option<String>,

    #[serde(default)]
    pub parent_rule: ParentRule,

    /// Extra attempts after the first failure.
    #[serde(default)]
    pub retries: u32,

    /// Seconds between attempts. See [`TaskConfig::effective_retry_delay`].
    #[serde(default)]
    pub retry_delay: Option<u64>,
}

impl TaskConfig {
    /// Explicit `retry_delay`, or [`DEFAULT_RETRY_DELAY_SECS`] when the task
    /// retries but left the delay unset.
    pub fn effective_retry_delay(&self) -> u64 {
        match self.retry_delay {
            Some(delay) => delay,
            None if self.retries > 0 => DEFAULT_RETRY_DELAY_SECS,
            None => 0,
        }
    }
}

/// A DAG file that passed validation (see `config::validate`).
///
/// Node names are well formed, every task has a command and every
/// dependency refers to a declared task. Self-references and cycles are
/// left to the graph builder.
#[derive(Debug, Clone)]
pub struct DagFile {
    pub name: String,
    pub schedule: Option<String>,
    pub task: BTreeMap<String, TaskConfig>,
    /// Merged dependency table: child -> parents, in declaration order.
    pub dependencies: BTreeMap<String, Vec<String>>,
}

impl DagFile {
    pub(crate) fn new_unchecked(
        name: String,
        schedule: Option<String>,
        task: BTreeMap<String, TaskConfig>,
        dependencies: BTreeMap<String, Vec<String>>,
    ) -> Self {
        Self {
            name,
            schedule,
            task,
            dependencies,
        }
    }

    /// Every `(child, parent)` pair, children in name order.
    pub fn dependency_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.dependencies.iter().flat_map(|(child, parents)| {
            parents
                .iter()
                .map(move |parent| (child.as_str(), parent.as_str()))
        })
    }
}
