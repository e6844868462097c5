// src/config/validate.rs

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::edges::parse_edge_line;
use crate::config::model::{DagFile, RawDagFile};
use crate::errors::{Result, ShelldagError};

/// Node names end up in log file paths, so keep them path-safe.
static NODE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("node name regex is valid"));

/// Validate a raw file and produce a [`DagFile`].
///
/// `fallback_name` is used when the file has no `name` key.
pub fn validate_dag_file(raw: RawDagFile, fallback_name: &str) -> Result<DagFile> {
    ensure_has_tasks(&raw)?;
    validate_tasks(&raw)?;
    let dependencies = merge_dependencies(&raw)?;
    validate_dependency_names(&raw, &dependencies)?;

    let name = match raw.name {
        Some(name) if !name.trim().is_empty() => name,
        _ => fallback_name.to_string(),
    };
    validate_dag_name(&name)?;

    Ok(DagFile::new_unchecked(name, raw.schedule, raw.task, dependencies))
}

fn ensure_has_tasks(raw: &RawDagFile) -> Result<()> {
    if raw.task.is_empty() {
        return Err(ShelldagError::ConfigError(
            "DAG file must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

/// The DAG name becomes a directory under the log root, so it must be a
/// single plain path segment.
fn validate_dag_name(name: &str) -> Result<()> {
    if !NODE_NAME.is_match(name) || name == "." || name == ".." {
        return Err(ShelldagError::ConfigError(format!(
            "DAG name '{name}' may only contain letters, digits, '_', '-' and '.', \
             and cannot be '.' or '..'"
        )));
    }
    Ok(())
}

fn validate_tasks(raw: &RawDagFile) -> Result<()> {
    for (name, task) in raw.task.iter() {
        if !NODE_NAME.is_match(name) {
            return Err(ShelldagError::ConfigError(format!(
                "task name '{name}' may only contain letters, digits, '_', '-' and '.'"
            )));
        }
        if task.cmd.trim().is_empty() {
            return Err(ShelldagError::ConfigError(format!(
                "task '{name}' has an empty `cmd`"
            )));
        }
    }
    Ok(())
}

/// Fold `[dependencies]` and the `edges` lines into one child -> parents map.
fn merge_dependencies(raw: &RawDagFile) -> Result<BTreeMap<String, Vec<String>>> {
    let mut merged = raw.dependencies.clone();

    for line in raw.edges.iter() {
        let edge = parse_edge_line(line)?;
        let parents = merged.entry(edge.child).or_default();
        for parent in edge.parents {
            if !parents.contains(&parent) {
                parents.push(parent);
            }
        }
    }

    Ok(merged)
}

fn validate_dependency_names(
    raw: &RawDagFile,
    dependencies: &BTreeMap<String, Vec<String>>,
) -> Result<()> {
    for (child, parents) in dependencies.iter() {
        if !raw.task.contains_key(child) {
            return Err(ShelldagError::ConfigError(format!(
                "dependencies declared for unknown task '{child}'"
            )));
        }
        for parent in parents {
            if !raw.task.contains_key(parent) {
                return Err(ShelldagError::ConfigError(format!(
                    "task '{child}' has unknown dependency '{parent}'"
                )));
            }
        }
    }
    Ok(())
}
