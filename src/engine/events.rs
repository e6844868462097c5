// src/engine/events.rs

//! Status events emitted during a DAG run.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::trace;

use crate::dag::NodeName;
use crate::types::NodeStatus;

/// Sender for status events.
pub type StatusSender = mpsc::Sender<StatusEvent>;

/// Receiver for status events.
pub type StatusReceiver = mpsc::Receiver<StatusEvent>;

/// Create a new bounded status channel.
///
/// Sizing is up to the consumer: the engine waits for buffer space, so a
/// consumer that stops reading without dropping the receiver stalls the run.
pub fn status_channel(capacity: usize) -> (StatusSender, StatusReceiver) {
    mpsc::channel(capacity)
}

/// Events emitted by the engine, in order:
/// `DagStarted`, then `NodeStatusChanged` for every transition, then
/// `DagCompleted` once every node is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StatusEvent {
    DagStarted {
        name: String,
    },

    NodeStatusChanged {
        name: NodeName,
        status: NodeStatus,
        /// 1-based attempt; `0` before the first attempt or for skipped nodes.
        attempt: u32,
        max_attempts: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        pid: Option<u32>,
    },

    DagCompleted {
        name: String,
        had_failures: bool,
    },
}

/// Emits [`StatusEvent`]s to an optional consumer.
///
/// Reporting never fails a run: a missing or closed receiver just drops
/// the event.
#[derive(Debug, Clone, Default)]
pub struct StatusReporter {
    tx: Option<StatusSender>,
}

impl StatusReporter {
    pub fn new(tx: StatusSender) -> Self {
        Self { tx: Some(tx) }
    }

    /// Reporter that drops every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub async fn emit(&self, event: StatusEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        if let Err(err) = tx.send(event).await {
            trace!(event = ?err.0, "status receiver closed; dropping event");
        }
    }

    pub async fn node_status(
        &self,
        name: &str,
        status: NodeStatus,
        attempt: u32,
        max_attempts: u32,
        pid: Option<u32>,
    ) {
        self.emit(StatusEvent::NodeStatusChanged {
            name: name.to_string(),
            status,
            attempt,
            max_attempts,
            pid,
        })
        .await;
    }
}
