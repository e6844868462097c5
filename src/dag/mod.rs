// src/dag/mod.rs

//! DAG representation and construction.
//!
//! - [`graph`] holds the nodes plus the `parents` / `children` indices.
//! - [`builder`] adds edges with self-reference and cycle rejection, and
//!   builds a graph from a validated DAG file.
//! - [`layers`] computes the topological layering of a graph.
//! - [`node`] defines the node (task) type.

pub mod builder;
pub mod graph;
pub mod layers;
pub mod node;

pub use graph::Graph;
pub use node::{DEFAULT_RETRY_DELAY_SECS, Node, NodeName};
