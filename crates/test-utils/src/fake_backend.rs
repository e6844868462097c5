use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use shelldag::exec::{ExitFuture, ExitOutcome, LogSink, ProcessBackend, SpawnedProcess};
use tokio::time::Instant;

/// What a node's fake process does on each attempt.
#[derive(Debug, Clone)]
struct Script {
    /// Outcome per attempt; the last entry repeats for later attempts.
    outcomes: Vec<ExitOutcome>,
    duration: Duration,
    spawn_error: bool,
    panics: bool,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            outcomes: vec![ExitOutcome::Success],
            duration: Duration::ZERO,
            spawn_error: false,
            panics: false,
        }
    }
}

/// One started (or attempted) process.
#[derive(Debug, Clone)]
pub struct SpawnRecord {
    pub node: String,
    pub attempt: u32,
    pub pid: Option<u32>,
    pub started: Instant,
    pub finished: Option<Instant>,
}

#[derive(Default)]
struct State {
    scripts: Mutex<HashMap<String, Script>>,
    default_duration: Mutex<Duration>,
    attempts: Mutex<HashMap<String, u32>>,
    records: Mutex<Vec<SpawnRecord>>,
    next_pid: AtomicU32,
    running: AtomicUsize,
    max_running: AtomicUsize,
}

/// A fake process backend that:
/// - never touches the OS
/// - exits each attempt with a scripted outcome after a scripted delay
/// - records every spawn so tests can inspect order, attempts and overlap.
///
/// Nodes without a script succeed immediately.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    state: Arc<State>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn edit(&self, node: &str, f: impl FnOnce(&mut Script)) {
        let mut scripts = self.state.scripts.lock().unwrap();
        let script = scripts.entry(node.to_string()).or_insert_with(|| Script {
            duration: *self.state.default_duration.lock().unwrap(),
            ..Script::default()
        });
        f(script);
    }

    /// Every attempt of `node` exits with `code`.
    pub fn fail(self, node: &str, code: i32) -> Self {
        self.edit(node, |s| s.outcomes = vec![ExitOutcome::Failed(code)]);
        self
    }

    /// `node` fails its first `failures` attempts, then succeeds.
    pub fn fail_times(self, node: &str, failures: u32) -> Self {
        self.edit(node, |s| {
            s.outcomes = (0..failures)
                .map(|_| ExitOutcome::Failed(1))
                .chain(std::iter::once(ExitOutcome::Success))
                .collect();
        });
        self
    }

    /// `node` cannot be spawned at all.
    pub fn spawn_error(self, node: &str) -> Self {
        self.edit(node, |s| s.spawn_error = true);
        self
    }

    /// Spawning `node` panics, taking its worker task down with it.
    pub fn panic(self, node: &str) -> Self {
        self.edit(node, |s| s.panics = true);
        self
    }

    /// Each attempt of `node` runs for `duration` before exiting.
    pub fn duration(self, node: &str, duration: Duration) -> Self {
        self.edit(node, |s| s.duration = duration);
        self
    }

    /// Run time for nodes configured after this call and unscripted nodes.
    pub fn default_duration(self, duration: Duration) -> Self {
        *self.state.default_duration.lock().unwrap() = duration;
        self
    }

    /// Number of spawn attempts made for `node`.
    pub fn attempts(&self, node: &str) -> u32 {
        self.state
            .attempts
            .lock()
            .unwrap()
            .get(node)
            .copied()
            .unwrap_or(0)
    }

    /// Nodes in the order their attempts were spawned.
    pub fn started(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.node).collect()
    }

    pub fn records(&self) -> Vec<SpawnRecord> {
        self.state.records.lock().unwrap().clone()
    }

    /// Highest number of fake processes alive at the same time.
    pub fn max_concurrency(&self) -> usize {
        self.state.max_running.load(Ordering::SeqCst)
    }
}

impl ProcessBackend for ScriptedBackend {
    fn spawn(&self, node: &str, _command: &str, sink: LogSink) -> anyhow::Result<SpawnedProcess> {
        let script = {
            let scripts = self.state.scripts.lock().unwrap();
            scripts.get(node).cloned().unwrap_or_else(|| Script {
                duration: *self.state.default_duration.lock().unwrap(),
                ..Script::default()
            })
        };

        // Must run with no lock held.
        if script.panics {
            panic!("scripted panic while spawning '{node}'");
        }

        let attempt = {
            let mut attempts = self.state.attempts.lock().unwrap();
            let counter = attempts.entry(node.to_string()).or_insert(0);
            *counter += 1;
            *counter
        };

        let index = (attempt as usize - 1).min(script.outcomes.len().saturating_sub(1));
        let outcome = script
            .outcomes
            .get(index)
            .copied()
            .unwrap_or(ExitOutcome::Success);

        let started = Instant::now();
        if script.spawn_error {
            self.state.records.lock().unwrap().push(SpawnRecord {
                node: node.to_string(),
                attempt,
                pid: None,
                started,
                finished: Some(started),
            });
            return Err(anyhow!("scripted spawn failure for '{node}'"));
        }

        let pid = 10_000 + self.state.next_pid.fetch_add(1, Ordering::SeqCst);
        let record_index = {
            let mut records = self.state.records.lock().unwrap();
            records.push(SpawnRecord {
                node: node.to_string(),
                attempt,
                pid: Some(pid),
                started,
                finished: None,
            });
            records.len() - 1
        };

        let now_running = self.state.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_running.fetch_max(now_running, Ordering::SeqCst);

        let state = Arc::clone(&self.state);
        let exit: ExitFuture = Box::pin(async move {
            let _sink = sink;
            tokio::time::sleep(script.duration).await;
            state.running.fetch_sub(1, Ordering::SeqCst);
            state.records.lock().unwrap()[record_index].finished = Some(Instant::now());
            Ok::<_, anyhow::Error>(outcome)
        });

        Ok(SpawnedProcess::new(Some(pid), exit))
    }
}
