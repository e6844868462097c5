// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{DagFile, RawDagFile};
use crate::config::validate::validate_dag_file;
use crate::dag::Graph;
use crate::errors::Result;

/// Default DAG file looked up in the current working directory.
pub const DEFAULT_DAG_FILE: &str = "dag.toml";

/// Read a DAG file and return the raw [`RawDagFile`].
///
/// This only performs TOML deserialization; use [`load_and_validate`] for the
/// semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawDagFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    let raw: RawDagFile = toml::from_str(&contents)?;
    Ok(raw)
}

/// Read and validate a DAG file.
///
/// The DAG name falls back to the file stem when the file does not set one.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<DagFile> {
    let path = path.as_ref();
    let raw = load_from_path(path)?;
    let fallback = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dag");
    validate_dag_file(raw, fallback)
}

/// Read, validate and build the graph in one go.
///
/// Self-references and cycles surface here, from the graph builder.
pub fn load_graph(path: impl AsRef<Path>) -> Result<Graph> {
    let file = load_and_validate(path)?;
    Graph::from_dag_file(&file)
}
