use std::collections::BTreeSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::anyhow;
use shelldag::exec::{LogSink, SinkProvider, Sleeper};

/// Records requested delays and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, delay: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        self.delays.lock().unwrap().push(delay);
        Box::pin(async {})
    }
}

/// Sink provider that refuses sinks for the listed nodes and hands out null
/// sinks for everything else.
#[derive(Debug, Default)]
pub struct FailingSinkProvider {
    failing: BTreeSet<String>,
    requests: Mutex<Vec<(String, u32)>>,
}

impl FailingSinkProvider {
    pub fn for_nodes(nodes: &[&str]) -> Self {
        Self {
            failing: nodes.iter().map(|n| n.to_string()).collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every `(node, attempt)` pair a sink was requested for.
    pub fn requests(&self) -> Vec<(String, u32)> {
        self.requests.lock().unwrap().clone()
    }
}

impl SinkProvider for FailingSinkProvider {
    fn acquire(&self, node: &str, attempt: u32) -> anyhow::Result<LogSink> {
        self.requests
            .lock()
            .unwrap()
            .push((node.to_string(), attempt));
        if self.failing.contains(node) {
            return Err(anyhow!("log storage unavailable for '{node}'"));
        }
        Ok(LogSink::null())
    }
}
