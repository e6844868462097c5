// src/report.rs

//! Console rendering of status events.

use tokio::task::JoinHandle;

use crate::engine::{StatusEvent, StatusReceiver};
use crate::types::NodeStatus;

/// Render a single event as a human-readable line.
pub fn render_event(event: &StatusEvent) -> String {
    match event {
        StatusEvent::DagStarted { name } => format!("DAG {name} started"),
        StatusEvent::NodeStatusChanged {
            name,
            status,
            attempt,
            max_attempts,
            pid,
        } => {
            let marker = match status {
                NodeStatus::Pending => "[ ]",
                NodeStatus::Running => "[>]",
                NodeStatus::Success => "[✓]",
                NodeStatus::Failed => "[X]",
                NodeStatus::Skipped => "[-]",
            };
            let mut details = Vec::new();
            if *attempt > 0 {
                details.push(format!("attempt {attempt}/{max_attempts}"));
            }
            if let Some(pid) = pid {
                details.push(format!("pid {pid}"));
            }
            if details.is_empty() {
                format!("{marker} {name} {status}")
            } else {
                format!("{marker} {name} {status} ({})", details.join(", "))
            }
        }
        StatusEvent::DagCompleted { name, had_failures } => {
            if *had_failures {
                format!("DAG {name} completed with failures")
            } else {
                format!("DAG {name} completed successfully")
            }
        }
    }
}

/// Print every event on stdout until the channel closes.
pub fn spawn_console_reporter(mut rx: StatusReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            println!("{}", render_event(&event));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_running_attempt_with_pid() {
        let line = render_event(&StatusEvent::NodeStatusChanged {
            name: "load".into(),
            status: NodeStatus::Running,
            attempt: 2,
            max_attempts: 3,
            pid: Some(99),
        });
        assert_eq!(line, "[>] load running (attempt 2/3, pid 99)");
    }

    #[test]
    fn pending_has_no_details() {
        let line = render_event(&StatusEvent::NodeStatusChanged {
            name: "load".into(),
            status: NodeStatus::Pending,
            attempt: 0,
            max_attempts: 1,
            pid: None,
        });
        assert_eq!(line, "[ ] load pending");
    }

    #[test]
    fn renders_completion() {
        let line = render_event(&StatusEvent::DagCompleted {
            name: "etl".into(),
            had_failures: true,
        });
        assert_eq!(line, "DAG etl completed with failures");
    }
}
