// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShelldagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Node not found: {0}")]
    UnknownNode(String),

    #[error("Self-referential dependency: node '{node}' cannot depend on itself")]
    SelfReference { node: String },

    #[error("Circular dependency: '{child}' -> '{parent}' would close a cycle")]
    Cycle { child: String, parent: String },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ShelldagError>;
