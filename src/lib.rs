// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod report;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::load_graph;
use crate::dag::Graph;
use crate::engine::{Engine, StatusReporter, status_channel};
use crate::exec::{FileSinkProvider, TaskRunner};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - DAG file loading and graph construction
/// - the per-attempt log directory
/// - the engine with the `sh -c` backend
/// - the console reporter (unless `--quiet`)
pub async fn run(args: CliArgs) -> Result<()> {
    let dag_path = PathBuf::from(&args.dag);
    let graph = load_graph(&dag_path)?;

    if args.dry_run {
        print_dry_run(&graph);
        return Ok(());
    }

    let sinks = FileSinkProvider::new(&args.log_dir, graph.name(), chrono::Local::now());
    info!(dir = %sinks.run_dir().display(), "writing node logs");

    let (reporter, console) = if args.quiet {
        (StatusReporter::disabled(), None)
    } else {
        let (tx, rx) = status_channel(256);
        (
            StatusReporter::new(tx),
            Some(report::spawn_console_reporter(rx)),
        )
    };

    let engine = Engine::new(TaskRunner::shell(Arc::new(sinks))).with_reporter(reporter);
    let report = engine.execute(graph).await;

    // Dropping the engine closes the status channel and lets the console
    // task drain and exit.
    drop(engine);
    if let Some(console) = console {
        console.await.context("console reporter task failed")?;
    }

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("serializing run report")?;
        println!("{json}");
    }

    if report.had_failures {
        let failed = report.nodes_with_status(types::NodeStatus::Failed);
        bail!("DAG '{}' finished with failed nodes: {}", report.graph.name(), failed.join(", "));
    }

    Ok(())
}

/// Dry-run output: layers, commands and the Graphviz rendering.
fn print_dry_run(graph: &Graph) {
    println!("shelldag dry-run: {}", graph.name());
    if let Some(schedule) = graph.schedule() {
        println!("  schedule = {schedule}");
    }
    println!();

    for (index, layer) in graph.layers().iter().enumerate() {
        println!("layer {index}:");
        for name in layer {
            let Some(node) = graph.node(name) else {
                continue;
            };
            println!("  - {name}");
            println!("      cmd: {}", node.command);
            if let Some(desc) = &node.description {
                println!("      desc: {desc}");
            }
            let parents = graph.parents_of(name);
            if !parents.is_empty() {
                println!("      after: {parents:?} ({:?})", node.parent_rule);
            }
            if node.retries > 0 {
                println!("      retries: {} (delay {}s)", node.retries, node.retry_delay);
            }
        }
    }

    println!();
    println!("{}", graph.to_dot());

    debug!("dry-run complete (no execution)");
}
