// src/config/mod.rs

//! DAG file loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Parse `parent >> child` edge lines (`edges.rs`).
//! - Load a DAG file from disk (`loader.rs`).
//! - Validate names and dependency references (`validate.rs`).

pub mod edges;
pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{DEFAULT_DAG_FILE, load_and_validate, load_from_path, load_graph};
pub use model::{DagFile, RawDagFile, TaskConfig};
pub use validate::validate_dag_file;
