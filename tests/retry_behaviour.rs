// tests/retry_behaviour.rs

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use shelldag::engine::{Engine, StatusReporter};
use shelldag::exec::TaskRunner;
use shelldag::types::{NodeStatus, TerminalStatus};
use shelldag_test_utils::builders::{GraphBuilder, NodeBuilder};
use shelldag_test_utils::doubles::{FailingSinkProvider, RecordingSleeper};
use shelldag_test_utils::fake_backend::ScriptedBackend;
use shelldag_test_utils::{fake_runner, init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn always_failing_node_uses_every_attempt() -> TestResult {
    with_timeout(async {
        init_tracing();

        let backend = ScriptedBackend::new().fail("flaky", 1).arc();
        let sleeper = Arc::new(RecordingSleeper::new());
        let runner = fake_runner(&backend, &sleeper);

        let mut node = NodeBuilder::new("flaky").retries(3, 2).build();
        let outcome = runner.run(&mut node, &StatusReporter::disabled()).await;

        assert_eq!(outcome.status, TerminalStatus::Failed);
        assert_eq!(outcome.attempts, 4);
        assert_eq!(backend.attempts("flaky"), 4);
        assert_eq!(sleeper.delays(), vec![Duration::from_secs(2); 3]);
        assert_eq!(node.status, NodeStatus::Failed);
        assert_eq!(node.pid, None);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn node_stops_retrying_once_it_succeeds() -> TestResult {
    with_timeout(async {
        init_tracing();

        let backend = ScriptedBackend::new().fail_times("flaky", 2).arc();
        let sleeper = Arc::new(RecordingSleeper::new());
        let runner = fake_runner(&backend, &sleeper);

        let mut node = NodeBuilder::new("flaky").retries(5, 1).build();
        let outcome = runner.run(&mut node, &StatusReporter::disabled()).await;

        assert_eq!(outcome.status, TerminalStatus::Success);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(sleeper.delays().len(), 2);
        assert_eq!(node.status, NodeStatus::Success);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn zero_retries_means_a_single_attempt() -> TestResult {
    with_timeout(async {
        init_tracing();

        let backend = ScriptedBackend::new().fail("once", 7).arc();
        let sleeper = Arc::new(RecordingSleeper::new());
        let runner = fake_runner(&backend, &sleeper);

        let mut node = NodeBuilder::new("once").build();
        let outcome = runner.run(&mut node, &StatusReporter::disabled()).await;

        assert_eq!(outcome.status, TerminalStatus::Failed);
        assert_eq!(outcome.attempts, 1);
        assert!(sleeper.delays().is_empty());

        Ok(())
    })
    .await
}

#[tokio::test]
async fn spawn_errors_are_retried_like_failures() -> TestResult {
    with_timeout(async {
        init_tracing();

        let backend = ScriptedBackend::new().spawn_error("ghost").arc();
        let sleeper = Arc::new(RecordingSleeper::new());
        let runner = fake_runner(&backend, &sleeper);

        let mut node = NodeBuilder::new("ghost").retries(2, 0).build();
        let outcome = runner.run(&mut node, &StatusReporter::disabled()).await;

        assert_eq!(outcome.status, TerminalStatus::Failed);
        assert_eq!(outcome.attempts, 3);
        assert!(backend.records().iter().all(|r| r.pid.is_none()));
        assert_eq!(sleeper.delays(), vec![Duration::ZERO; 2]);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn sink_failure_fails_node_without_retry() -> TestResult {
    with_timeout(async {
        init_tracing();

        let backend = ScriptedBackend::new().arc();
        let sleeper = Arc::new(RecordingSleeper::new());
        let sinks = Arc::new(FailingSinkProvider::for_nodes(&["logless"]));
        let runner = TaskRunner::new(backend.clone(), sinks.clone(), sleeper.clone());

        let graph = GraphBuilder::new("sinks")
            .node(NodeBuilder::new("logless").retries(3, 1).build())
            .node(NodeBuilder::new("report").all_complete().build())
            .node(NodeBuilder::new("strict").build())
            .edge("report", "logless")
            .edge("strict", "logless")
            .build();

        let report = Engine::new(runner).execute(graph).await;

        assert_eq!(report.status_of("logless"), Some(NodeStatus::Failed));
        assert_eq!(report.status_of("report"), Some(NodeStatus::Success));
        assert_eq!(report.status_of("strict"), Some(NodeStatus::Skipped));
        assert!(report.had_failures);

        assert_eq!(backend.attempts("logless"), 0);
        assert!(sleeper.delays().is_empty());
        let logless_requests: Vec<_> = sinks
            .requests()
            .into_iter()
            .filter(|(node, _)| node == "logless")
            .collect();
        assert_eq!(logless_requests, vec![("logless".to_string(), 1)]);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn retries_inside_a_graph_are_reflected_in_the_report() -> TestResult {
    with_timeout(async {
        init_tracing();

        let backend = ScriptedBackend::new().fail_times("extract", 1).arc();
        let sleeper = Arc::new(RecordingSleeper::new());

        let graph = GraphBuilder::new("etl")
            .node(NodeBuilder::new("extract").retries(1, 4).build())
            .nodes(&["load"])
            .edge("load", "extract")
            .build();

        let report = Engine::new(fake_runner(&backend, &sleeper))
            .execute(graph)
            .await;

        assert!(!report.had_failures);
        assert_eq!(backend.started(), vec!["extract", "extract", "load"]);
        assert_eq!(sleeper.delays(), vec![Duration::from_secs(4)]);

        Ok(())
    })
    .await
}
