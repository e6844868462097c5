// src/dag/builder.rs

//! Edge insertion with self-reference, unknown-node and cycle rejection.

use tracing::debug;

use crate::config::model::DagFile;
use crate::dag::graph::Graph;
use crate::dag::node::Node;
use crate::errors::{Result, ShelldagError};

impl Graph {
    /// Record that `child` depends on `parent`.
    ///
    /// Fails without touching the graph when:
    /// - `child == parent` ([`ShelldagError::SelfReference`])
    /// - either name is not a node ([`ShelldagError::UnknownNode`])
    /// - `parent` is already reachable from `child`, i.e. the new edge would
    ///   close a loop ([`ShelldagError::Cycle`])
    ///
    /// Adding an edge that already exists is a no-op. Each call scans the
    /// graph once (O(V+E)); edges are only added during construction.
    pub fn add_dependency(&mut self, child: &str, parent: &str) -> Result<()> {
        if child == parent {
            return Err(ShelldagError::SelfReference {
                node: child.to_string(),
            });
        }

        for name in [child, parent] {
            if !self.has_node(name) {
                return Err(ShelldagError::UnknownNode(name.to_string()));
            }
        }

        if self.reachable(child).contains(parent) {
            return Err(ShelldagError::Cycle {
                child: child.to_string(),
                parent: parent.to_string(),
            });
        }

        self.parents
            .entry(child.to_string())
            .or_default()
            .insert(parent.to_string());
        self.children
            .entry(parent.to_string())
            .or_default()
            .insert(child.to_string());

        debug!(dag = %self.name(), %child, %parent, "added dependency edge");
        Ok(())
    }

    /// Build a graph from a validated [`DagFile`].
    ///
    /// All nodes are inserted first, then every dependency edge (the
    /// `[dependencies]` table followed by the `edges` lines). The first
    /// construction error aborts the build.
    pub fn from_dag_file(file: &DagFile) -> Result<Self> {
        let mut graph = Graph::new(file.name.clone()).with_schedule(file.schedule.clone());

        for (name, task) in file.task.iter() {
            graph.add_node(Node::from_config(name.clone(), task));
        }

        for (child, parent) in file.dependency_pairs() {
            graph.add_dependency(child, parent)?;
        }

        debug!(
            dag = %graph.name(),
            nodes = graph.len(),
            edges = graph.edge_count(),
            "graph constructed"
        );

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(names: &[&str]) -> Graph {
        let mut g = Graph::new("test");
        for name in names {
            g.add_node(Node::new(*name, "true"));
        }
        g
    }

    #[test]
    fn self_reference_is_rejected() {
        let mut g = graph_with(&["a"]);
        let err = g.add_dependency("a", "a").unwrap_err();
        assert!(matches!(err, ShelldagError::SelfReference { ref node } if node == "a"));
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn two_node_cycle_is_rejected() {
        let mut g = graph_with(&["a", "b"]);
        g.add_dependency("b", "a").unwrap();

        let err = g.add_dependency("a", "b").unwrap_err();
        assert!(matches!(err, ShelldagError::Cycle { .. }));
        assert_eq!(g.edge_count(), 1);
        assert!(g.parents_of("a").is_empty());
    }

    #[test]
    fn long_cycle_is_rejected_and_graph_unchanged() {
        let names = ["n0", "n1", "n2", "n3", "n4", "n5"];
        let mut g = graph_with(&names);
        for pair in names.windows(2) {
            g.add_dependency(pair[1], pair[0]).unwrap();
        }

        let before = g.edges().map(|(p, c)| (p.to_string(), c.to_string())).collect::<Vec<_>>();
        let err = g.add_dependency("n0", "n5").unwrap_err();
        assert!(matches!(err, ShelldagError::Cycle { ref child, ref parent } if child == "n0" && parent == "n5"));

        let after = g.edges().map(|(p, c)| (p.to_string(), c.to_string())).collect::<Vec<_>>();
        assert_eq!(before, after);
    }

    #[test]
    fn unknown_endpoint_is_rejected() {
        let mut g = graph_with(&["a"]);
        let err = g.add_dependency("a", "ghost").unwrap_err();
        assert!(matches!(err, ShelldagError::UnknownNode(ref n) if n == "ghost"));
        assert!(g.parents.is_empty());
        assert!(g.children.is_empty());
    }

    #[test]
    fn duplicate_edge_is_idempotent() {
        let mut g = graph_with(&["a", "b"]);
        g.add_dependency("b", "a").unwrap();
        g.add_dependency("b", "a").unwrap();
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn shortcut_edges_in_a_chain_are_allowed() {
        let mut g = graph_with(&["a", "b", "c"]);
        g.add_dependency("b", "a").unwrap();
        g.add_dependency("c", "b").unwrap();
        g.add_dependency("c", "a").unwrap();
        assert_eq!(g.edge_count(), 3);
    }
}
