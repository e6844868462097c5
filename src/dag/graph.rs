// src/dag/graph.rs

use std::collections::{BTreeMap, BTreeSet};

use petgraph::dot::{Config, Dot};
use petgraph::graphmap::DiGraphMap;
use serde::Serialize;

use crate::dag::node::{Node, NodeName};

static NO_EDGES: BTreeSet<NodeName> = BTreeSet::new();

/// In-memory DAG keyed by node name.
///
/// `parents` and `children` are kept as exact inverses of each other. Edges
/// only enter through [`Graph::add_dependency`](crate::dag::builder), which
/// rejects self-references, unknown nodes and cycles, so a `Graph` is always
/// acyclic.
///
/// The structure serializes as-is, which doubles as the read-only snapshot
/// handed back after a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Graph {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule: Option<String>,
    nodes: BTreeMap<NodeName, Node>,
    pub(crate) parents: BTreeMap<NodeName, BTreeSet<NodeName>>,
    pub(crate) children: BTreeMap<NodeName, BTreeSet<NodeName>>,
}

impl Graph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_schedule(mut self, schedule: Option<String>) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cron expression for an external scheduler; never interpreted here.
    pub fn schedule(&self) -> Option<&str> {
        self.schedule.as_deref()
    }

    /// Insert a node, replacing any node with the same name.
    ///
    /// Edges touching the name are left alone, so re-adding a node keeps its
    /// position in the DAG.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.name.clone(), node);
    }

    pub fn has_node(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    pub(crate) fn node_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.nodes.get_mut(name)
    }

    /// All nodes, ordered by name.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Immediate parents of a node (the nodes it depends on).
    pub fn parents_of(&self, name: &str) -> &BTreeSet<NodeName> {
        self.parents.get(name).unwrap_or(&NO_EDGES)
    }

    /// Immediate children of a node (the nodes depending on it).
    pub fn children_of(&self, name: &str) -> &BTreeSet<NodeName> {
        self.children.get(name).unwrap_or(&NO_EDGES)
    }

    /// Every edge as a `(parent, child)` pair.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.children.iter().flat_map(|(parent, children)| {
            children
                .iter()
                .map(move |child| (parent.as_str(), child.as_str()))
        })
    }

    pub fn edge_count(&self) -> usize {
        self.children.values().map(BTreeSet::len).sum()
    }

    /// Nodes without parents, i.e. the ones that can start immediately.
    pub fn leaves(&self) -> Vec<&str> {
        self.nodes
            .keys()
            .filter(|name| self.parents_of(name).is_empty())
            .map(|s| s.as_str())
            .collect()
    }

    /// Every node reachable from `from` by following `children` edges.
    ///
    /// `from` itself is not part of the result (it cannot be, the graph is
    /// acyclic). Unknown names yield an empty set.
    pub fn reachable(&self, from: &str) -> BTreeSet<&str> {
        let mut visited: BTreeSet<&str> = BTreeSet::new();
        if !self.has_node(from) {
            return visited;
        }

        let mut stack: Vec<&str> = self.children_of(from).iter().map(|s| s.as_str()).collect();

        while let Some(name) = stack.pop() {
            if !visited.insert(name) {
                continue;
            }
            stack.extend(self.children_of(name).iter().map(|s| s.as_str()));
        }

        visited
    }

    /// Put every node back to `Pending` and forget its pid.
    pub fn reset_statuses(&mut self) {
        for node in self.nodes.values_mut() {
            node.reset();
        }
    }

    /// Graphviz rendering of the DAG (edges point from parent to child).
    pub fn to_dot(&self) -> String {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for name in self.node_names() {
            graph.add_node(name);
        }
        for (parent, child) in self.edges() {
            graph.add_edge(parent, child, ());
        }

        format!("{:?}", Dot::with_config(&graph, &[Config::EdgeNoLabel]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Graph {
        let mut g = Graph::new("diamond");
        for name in ["a", "b", "c", "d"] {
            g.add_node(Node::new(name, format!("echo {name}")));
        }
        g.add_dependency("b", "a").unwrap();
        g.add_dependency("c", "a").unwrap();
        g.add_dependency("d", "b").unwrap();
        g.add_dependency("d", "c").unwrap();
        g
    }

    #[test]
    fn leaves_are_nodes_without_parents() {
        let mut g = diamond();
        g.add_node(Node::new("lonely", "true"));
        assert_eq!(g.leaves(), vec!["a", "lonely"]);
    }

    #[test]
    fn reachable_follows_children_transitively() {
        let g = diamond();
        let from_a: Vec<_> = g.reachable("a").into_iter().collect();
        assert_eq!(from_a, vec!["b", "c", "d"]);
        assert!(g.reachable("d").is_empty());
        assert!(g.reachable("missing").is_empty());
    }

    #[test]
    fn indices_are_inverse() {
        let g = diamond();
        for (parent, child) in g.edges() {
            assert!(g.parents_of(child).contains(parent));
            assert!(g.children_of(parent).contains(child));
        }
        assert_eq!(g.edge_count(), 4);
    }

    #[test]
    fn upserting_a_node_keeps_its_edges() {
        let mut g = diamond();
        g.add_node(Node::new("b", "echo replaced"));
        assert_eq!(g.len(), 4);
        assert_eq!(g.node("b").unwrap().command, "echo replaced");
        assert!(g.parents_of("b").contains("a"));
    }

    #[test]
    fn dot_output_mentions_every_edge() {
        let dot = diamond().to_dot();
        assert!(dot.starts_with("digraph"));
        assert_eq!(dot.matches("->").count(), 4);
    }
}
