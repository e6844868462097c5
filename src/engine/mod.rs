// src/engine/mod.rs

//! Execution engine for shelldag.
//!
//! This module ties together:
//! - the per-run edge signal table ([`context`])
//! - the parent-rule evaluation ([`gate`])
//! - the per-node worker ([`worker`]) that waits on parents, runs the
//!   node through the task runner and signals its children
//! - the [`Engine`] that fans out workers and joins them ([`runtime`])
//! - the status events consumed by reporters ([`events`])

pub mod context;
pub mod events;
pub mod gate;
pub mod runtime;
pub mod worker;

pub use context::{EdgeKey, ExecutionContext, FailureFlag};
pub use events::{StatusEvent, StatusReceiver, StatusReporter, StatusSender, status_channel};
pub use gate::{GateDecision, ParentGate};
pub use runtime::{Engine, RunReport};
