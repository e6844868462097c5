// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::config::DEFAULT_DAG_FILE;

/// Command-line arguments for `shelldag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "shelldag",
    version,
    about = "Run shell commands arranged in a dependency graph.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the DAG file (TOML).
    #[arg(value_name = "PATH", default_value = DEFAULT_DAG_FILE)]
    pub dag: String,

    /// Directory receiving one log file per node attempt.
    #[arg(long, value_name = "DIR", default_value = ".shelldag")]
    pub log_dir: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SHELLDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the layers and the graph, but don't execute
    /// any commands.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the final graph snapshot as JSON.
    #[arg(long)]
    pub json: bool,

    /// Don't print status lines while running.
    #[arg(long, short)]
    pub quiet: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = CliArgs::try_parse_from(["shelldag"]).unwrap();
        assert_eq!(args.dag, "dag.toml");
        assert_eq!(args.log_dir, ".shelldag");
        assert!(!args.dry_run && !args.json && !args.quiet);
    }

    #[test]
    fn flags() {
        let args = CliArgs::try_parse_from([
            "shelldag",
            "etl.toml",
            "--dry-run",
            "--log-level",
            "debug",
            "-q",
        ])
        .unwrap();
        assert_eq!(args.dag, "etl.toml");
        assert!(args.dry_run);
        assert!(args.quiet);
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    }
}
