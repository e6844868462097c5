// src/dag/layers.rs

//! Topological layering of a graph.
//!
//! Layer 0 holds the leaves (nodes without parents); every later layer holds
//! the nodes whose parents all sit in earlier layers. Nodes in one layer are
//! independent of each other and could run side by side.

use std::collections::BTreeMap;

use crate::dag::graph::Graph;
use crate::dag::node::NodeName;

impl Graph {
    /// Split the graph into dependency layers, each sorted by name.
    pub fn layers(&self) -> Vec<Vec<NodeName>> {
        let mut remaining_parents: BTreeMap<&str, usize> = self
            .node_names()
            .map(|name| (name, self.parents_of(name).len()))
            .collect();

        let mut layers = Vec::new();
        let mut current: Vec<&str> = self.leaves();

        while !current.is_empty() {
            let mut next = Vec::new();

            for name in &current {
                for child in self.children_of(name) {
                    if let Some(count) = remaining_parents.get_mut(child.as_str()) {
                        *count -= 1;
                        if *count == 0 {
                            next.push(child.as_str());
                        }
                    }
                }
            }

            layers.push(current.iter().map(|s| s.to_string()).collect());
            next.sort_unstable();
            current = next;
        }

        layers
    }

    /// Layer index of every node, as computed by [`Graph::layers`].
    pub fn layer_index(&self) -> BTreeMap<NodeName, usize> {
        self.layers()
            .into_iter()
            .enumerate()
            .flat_map(|(idx, layer)| layer.into_iter().map(move |name| (name, idx)))
            .collect()
    }
}
