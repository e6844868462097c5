// tests/property_dag.rs

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use proptest::prelude::*;
use shelldag::dag::{Graph, Node};
use shelldag::engine::Engine;
use shelldag::errors::ShelldagError;
use shelldag::types::{NodeStatus, ParentRule};
use shelldag_test_utils::doubles::RecordingSleeper;
use shelldag_test_utils::fake_backend::ScriptedBackend;
use shelldag_test_utils::fake_runner;

#[derive(Debug, Clone)]
struct DagShape {
    /// `parents[i]` only ever names nodes `< i`, so the shape is acyclic.
    parents: Vec<BTreeSet<usize>>,
    all_complete: Vec<bool>,
}

fn name(i: usize) -> String {
    format!("task_{i}")
}

// Strategy to generate a valid DAG shape.
// We ensure acyclicity by only allowing task N to depend on tasks 0..N-1.
fn dag_shape_strategy(max_tasks: usize) -> impl Strategy<Value = DagShape> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        (
            proptest::collection::vec(
                proptest::collection::vec(any::<usize>(), 0..4),
                num_tasks,
            ),
            proptest::collection::vec(any::<bool>(), num_tasks),
        )
            .prop_map(|(raw_deps, all_complete)| {
                let parents = raw_deps
                    .into_iter()
                    .enumerate()
                    .map(|(i, deps)| {
                        if i == 0 {
                            BTreeSet::new()
                        } else {
                            deps.into_iter().map(|d| d % i).collect()
                        }
                    })
                    .collect();
                DagShape {
                    parents,
                    all_complete,
                }
            })
    })
}

fn build_graph(shape: &DagShape) -> Graph {
    let mut graph = Graph::new("prop");
    for (i, rule) in shape.all_complete.iter().enumerate() {
        let mut node = Node::new(name(i), "true");
        if *rule {
            node.parent_rule = ParentRule::AllComplete;
        }
        graph.add_node(node);
    }
    for (i, parents) in shape.parents.iter().enumerate() {
        for p in parents {
            graph
                .add_dependency(&name(i), &name(*p))
                .expect("forward edges never close a cycle");
        }
    }
    graph
}

/// Expected terminal status of every node, derived from the rules alone.
fn expected_statuses(shape: &DagShape, failing: &BTreeSet<usize>) -> Vec<NodeStatus> {
    let mut expected: Vec<NodeStatus> = Vec::with_capacity(shape.parents.len());
    for (i, parents) in shape.parents.iter().enumerate() {
        let parents_ok = parents.iter().all(|p| expected[*p] == NodeStatus::Success);
        let status = if !shape.all_complete[i] && !parents_ok {
            NodeStatus::Skipped
        } else if failing.contains(&i) {
            NodeStatus::Failed
        } else {
            NodeStatus::Success
        };
        expected.push(status);
    }
    expected
}

proptest! {
    #[test]
    fn layers_cover_every_node_once_and_respect_parents(shape in dag_shape_strategy(12)) {
        let graph = build_graph(&shape);
        let layers = graph.layers();

        let flat: Vec<&String> = layers.iter().flatten().collect();
        prop_assert_eq!(flat.len(), graph.len());
        let unique: BTreeSet<&String> = flat.iter().copied().collect();
        prop_assert_eq!(unique.len(), graph.len());

        let index = graph.layer_index();
        for node in graph.node_names() {
            let own = index[node];
            for parent in graph.parents_of(node) {
                prop_assert!(own > index[parent.as_str()], "{} must sit below {}", node, parent);
            }
        }
    }

    #[test]
    fn closing_any_loop_is_rejected_and_leaves_graph_unchanged(len in 1usize..10) {
        let mut graph = Graph::new("chain");
        for i in 0..len {
            graph.add_node(Node::new(name(i), "true"));
        }
        for i in 1..len {
            graph.add_dependency(&name(i), &name(i - 1)).unwrap();
        }
        let edges_before: Vec<(String, String)> = graph
            .edges()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect();

        // Making the head depend on the tail closes a loop of length `len`
        // (a self-loop when len == 1).
        let err = graph.add_dependency(&name(0), &name(len - 1)).unwrap_err();
        if len == 1 {
            prop_assert!(matches!(err, ShelldagError::SelfReference { .. }), "got {:?}", err);
        } else {
            prop_assert!(matches!(err, ShelldagError::Cycle { .. }), "got {:?}", err);
        }

        let edges_after: Vec<(String, String)> = graph
            .edges()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect();
        prop_assert_eq!(edges_before, edges_after);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn execution_terminates_and_follows_parent_rules(
        shape in dag_shape_strategy(10),
        failing in proptest::collection::btree_set(0usize..10, 0..4),
    ) {
        let failing: BTreeSet<usize> = failing.into_iter().filter(|i| *i < shape.parents.len()).collect();
        let graph = build_graph(&shape);

        let mut backend = ScriptedBackend::new();
        for i in &failing {
            backend = backend.fail(&name(*i), 1);
        }
        let backend = backend.arc();
        let sleeper = Arc::new(RecordingSleeper::new());

        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        let report = rt.block_on(async {
            tokio::time::timeout(
                std::time::Duration::from_secs(5),
                Engine::new(fake_runner(&backend, &sleeper)).execute(graph),
            )
            .await
        });
        prop_assert!(report.is_ok(), "execution did not terminate");
        let report = report.unwrap();

        let expected = expected_statuses(&shape, &failing);
        let actual: BTreeMap<String, NodeStatus> = report
            .graph
            .nodes()
            .map(|n| (n.name.clone(), n.status))
            .collect();

        for (i, want) in expected.iter().enumerate() {
            prop_assert_eq!(actual[&name(i)], *want, "node {}", name(i));
            let spawned = backend.attempts(&name(i));
            prop_assert_eq!(spawned, u32::from(*want != NodeStatus::Skipped));
        }
        prop_assert_eq!(
            report.had_failures,
            expected.contains(&NodeStatus::Failed)
        );
    }
}
