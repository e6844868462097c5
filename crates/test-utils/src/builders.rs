use std::collections::BTreeMap;

use shelldag::config::{DagFile, RawDagFile, TaskConfig, validate_dag_file};
use shelldag::dag::{Graph, Node};
use shelldag::types::ParentRule;

/// Builder for `Node` to simplify test setup.
pub struct NodeBuilder {
    node: Node,
}

impl NodeBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            node: Node::new(name, format!("echo {name}")),
        }
    }

    pub fn cmd(mut self, cmd: &str) -> Self {
        self.node.command = cmd.to_string();
        self
    }

    pub fn rule(mut self, rule: ParentRule) -> Self {
        self.node.parent_rule = rule;
        self
    }

    pub fn all_complete(self) -> Self {
        self.rule(ParentRule::AllComplete)
    }

    pub fn retries(mut self, retries: u32, delay_secs: u64) -> Self {
        self.node.retries = retries;
        self.node.retry_delay = delay_secs;
        self
    }

    pub fn build(self) -> Node {
        self.node
    }
}

/// Builder for an in-memory `Graph`.
///
/// Edges are added in declaration order after all nodes, and must be valid.
pub struct GraphBuilder {
    name: String,
    nodes: Vec<Node>,
    edges: Vec<(String, String)>,
}

impl GraphBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Shorthand for a default node running `echo <name>`.
    pub fn nodes(mut self, names: &[&str]) -> Self {
        for name in names {
            self.nodes.push(NodeBuilder::new(name).build());
        }
        self
    }

    /// `child` runs after `parent`.
    pub fn edge(mut self, child: &str, parent: &str) -> Self {
        self.edges.push((child.to_string(), parent.to_string()));
        self
    }

    pub fn build(self) -> Graph {
        let mut graph = Graph::new(self.name);
        for node in self.nodes {
            graph.add_node(node);
        }
        for (child, parent) in self.edges {
            graph
                .add_dependency(&child, &parent)
                .expect("GraphBuilder edges must be valid");
        }
        graph
    }
}

/// Builder for `DagFile` to simplify config-level test setup.
pub struct DagFileBuilder {
    raw: RawDagFile,
}

impl DagFileBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            raw: RawDagFile {
                name: Some(name.to_string()),
                schedule: None,
                task: BTreeMap::new(),
                dependencies: BTreeMap::new(),
                edges: Vec::new(),
            },
        }
    }

    pub fn with_task(mut self, name: &str, cmd: &str) -> Self {
        self.raw.task.insert(name.to_string(), task(cmd));
        self
    }

    pub fn with_dependency(mut self, child: &str, parent: &str) -> Self {
        self.raw
            .dependencies
            .entry(child.to_string())
            .or_default()
            .push(parent.to_string());
        self
    }

    pub fn with_edge_line(mut self, line: &str) -> Self {
        self.raw.edges.push(line.to_string());
        self
    }

    pub fn build(self) -> DagFile {
        validate_dag_file(self.raw, "test").expect("Failed to build valid DAG file from builder")
    }
}

/// Plain `TaskConfig` with defaults for everything but the command.
pub fn task(cmd: &str) -> TaskConfig {
    TaskConfig {
        cmd: cmd.to_string(),
        desc: None,
        parent_rule: ParentRule::default(),
        retries: 0,
        retry_delay: None,
    }
}
