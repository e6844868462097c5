pub mod builders;
pub mod doubles;
pub mod fake_backend;

use std::sync::{Arc, Once};

use shelldag::dag::Graph;
use shelldag::engine::{Engine, RunReport, StatusEvent, StatusReporter, status_channel};
use shelldag::exec::{NullSinkProvider, TaskRunner};
use tracing_subscriber::{EnvFilter, fmt};

use crate::doubles::RecordingSleeper;
use crate::fake_backend::ScriptedBackend;

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Runner wired to a scripted backend, a recording sleeper and no log files.
pub fn fake_runner(backend: &Arc<ScriptedBackend>, sleeper: &Arc<RecordingSleeper>) -> TaskRunner {
    TaskRunner::new(
        backend.clone(),
        Arc::new(NullSinkProvider),
        sleeper.clone(),
    )
}

/// Execute `graph` and collect every status event emitted along the way.
pub async fn execute_with_events(runner: TaskRunner, graph: Graph) -> (RunReport, Vec<StatusEvent>) {
    let (tx, mut rx) = status_channel(64);
    let collector = tokio::spawn(async move {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    });

    let engine = Engine::new(runner).with_reporter(StatusReporter::new(tx));
    let report = engine.execute(graph).await;
    drop(engine);

    let events = collector.await.expect("event collector panicked");
    (report, events)
}
