mod common;

use std::collections::BTreeSet;
use std::time::Duration;

use codeinsight_core::control::{
    DispatcherConfig,
    GetNeighborsArgs,
    GetNodeArgs,
    GetRelationshipsArgs,
    SearchCodeArgs,
    ToolDispatcher,
    ToolError,
    ToolOutput,
};
use codeinsight_core::embed::Embedder;
use codeinsight_core::query::{Depth, PARAM_TOP_K, QueryBuilder};
use codeinsight_core::store::{GraphStore, QueryKind};
use codeinsight_store::{NeighborView, NodeLookup};
use serde_json::{Map, Value, json};

use common::{FakeEmbedder, MemoryGraph, StalledStore, chain_graph};

fn dispatcher<S: GraphStore>(store: S) -> ToolDispatcher<S, FakeEmbedder> {
    ToolDispatcher::new(store, FakeEmbedder::new())
}

fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

async fn neighbors<S: GraphStore, E: Embedder>(
    dispatcher: &ToolDispatcher<S, E>,
    node_name: &str,
    depth: i64,
) -> Vec<NeighborView> {
    dispatcher
        .get_neighbors(GetNeighborsArgs {
            node_name: node_name.to_string(),
            depth: Some(depth),
        })
        .await
        .unwrap_or_else(|err| panic!("neighbors of {node_name} at depth {depth}: {err}"))
}

fn names(views: &[NeighborView]) -> BTreeSet<String> {
    views.iter().map(|view| view.name.clone()).collect()
}

fn indexed_graph() -> MemoryGraph {
    MemoryGraph::new()
        .with_node("InvoiceService", &["Class"])
        .with_node("InvoiceRecord", &["Record"])
        .with_node("Logger", &["Class"])
        .with_node("Money", &["Type"])
        .with_code("InvoiceService", "class InvoiceService {}", "src/InvoiceService.cs")
        .with_code("InvoiceRecord", "record InvoiceRecord(Money Total);", "src/InvoiceRecord.cs")
        .with_code("Logger", "class Logger {}", "src/Logger.cs")
        .with_embedding("InvoiceService", [0.9, 0.1, 0.0])
        .with_embedding("InvoiceRecord", [0.7, 0.7, 0.0])
        .with_embedding("Logger", [0.0, 0.0, 1.0])
}

#[tokio::test]
async fn search_rejects_non_positive_top_k_before_any_call() {
    for top_k in [0, -1, -100] {
        let store = MemoryGraph::new();
        let embedder = FakeEmbedder::new();
        let dispatcher = ToolDispatcher::new(store, embedder);

        let err = dispatcher
            .search_code(SearchCodeArgs {
                question: "who writes invoices?".to_string(),
                top_k: Some(top_k),
            })
            .await
            .expect_err("non-positive top_k must be rejected");

        assert!(matches!(err, ToolError::InvalidArgument(_)), "top_k {top_k}: {err}");
        assert_eq!(dispatcher.embedder().calls(), 0);
        assert_eq!(dispatcher.store().calls(), 0);
    }
}

#[tokio::test]
async fn search_returns_available_hits_in_descending_score() {
    let dispatcher = dispatcher(indexed_graph());

    let hits = dispatcher
        .search_code(SearchCodeArgs {
            question: "invoice handling".to_string(),
            top_k: Some(5),
        })
        .await
        .expect("search should succeed");

    assert_eq!(hits.len(), 3);
    assert!(hits.windows(2).all(|pair| pair[0].score >= pair[1].score));
    assert_eq!(hits[0].name, "InvoiceService");
    assert_eq!(hits[0].file_path.as_deref(), Some("src/InvoiceService.cs"));
    assert_eq!(hits[2].name, "Logger");
}

#[tokio::test]
async fn search_defaults_top_k_to_five() {
    let dispatcher = dispatcher(indexed_graph());

    let output = dispatcher
        .dispatch("search_code", &args(json!({"question": "invoice handling"})))
        .await
        .expect("search should succeed");

    assert!(matches!(output, ToolOutput::SearchHits(ref hits) if hits.len() == 3));
    let query = dispatcher.store().last_query().expect("store should be queried");
    assert_eq!(query.param(PARAM_TOP_K), Some(&json!(5)));
}

#[tokio::test]
async fn search_on_empty_index_is_empty_not_error() {
    let dispatcher = dispatcher(chain_graph());

    let hits = dispatcher
        .search_code(SearchCodeArgs {
            question: "anything".to_string(),
            top_k: None,
        })
        .await
        .expect("search should succeed");

    assert!(hits.is_empty());
}

#[tokio::test]
async fn embedding_failure_skips_backend() {
    let dispatcher = ToolDispatcher::new(indexed_graph(), FakeEmbedder::failing());

    let err = dispatcher
        .search_code(SearchCodeArgs {
            question: "invoice handling".to_string(),
            top_k: Some(2),
        })
        .await
        .expect_err("embedder failure must surface");

    assert!(matches!(err, ToolError::EmbeddingFailure(_)));
    assert_eq!(err.kind(), "embedding_failure");
    assert_eq!(dispatcher.store().calls(), 0);
}

#[tokio::test]
async fn top_k_above_maximum_is_invalid() {
    let dispatcher = dispatcher(indexed_graph())
        .with_config(DispatcherConfig::new().with_max_top_k(10));

    let err = dispatcher
        .search_code(SearchCodeArgs {
            question: "invoice handling".to_string(),
            top_k: Some(11),
        })
        .await
        .expect_err("top_k above the maximum must be rejected");

    assert!(matches!(err, ToolError::InvalidArgument(_)));
    assert_eq!(dispatcher.embedder().calls(), 0);
}

#[tokio::test]
async fn get_node_returns_properties_without_embedding() {
    let dispatcher = dispatcher(indexed_graph());

    let lookup = dispatcher
        .get_node(GetNodeArgs {
            node_name: "InvoiceRecord".to_string(),
        })
        .await
        .expect("lookup should succeed");

    let properties = lookup.properties().expect("node should exist");
    assert_eq!(properties.get("filePath"), Some(&json!("src/InvoiceRecord.cs")));
    assert_eq!(properties.get("labels"), Some(&json!(["Record"])));
    assert!(!properties.contains_key("embedding"));
}

#[tokio::test]
async fn missing_node_is_not_found_and_distinct_from_backend_errors() {
    let healthy = dispatcher(chain_graph());
    let lookup = healthy
        .get_node(GetNodeArgs {
            node_name: "Missing".to_string(),
        })
        .await
        .expect("a missing node is not an error");
    assert_eq!(
        lookup,
        NodeLookup::NotFound {
            node_name: "Missing".to_string()
        }
    );

    let broken = dispatcher(MemoryGraph::failing("connection refused"));
    let err = broken
        .get_node(GetNodeArgs {
            node_name: "Missing".to_string(),
        })
        .await
        .expect_err("backend failures are errors");
    assert!(matches!(err, ToolError::Backend(_)));
}

#[tokio::test]
async fn dispatched_not_found_serializes_with_status() {
    let dispatcher = dispatcher(chain_graph());

    let output = dispatcher
        .dispatch("get_node", &args(json!({"node_name": "Missing"})))
        .await
        .expect("lookup should succeed");

    assert_eq!(
        serde_json::to_value(&output).expect("output should serialize"),
        json!({"status": "not_found", "node_name": "Missing"})
    );
}

#[tokio::test]
async fn relationships_only_include_outgoing_edges() {
    let dispatcher = dispatcher(chain_graph());

    let from_foo = dispatcher
        .get_relationships(GetRelationshipsArgs {
            node_name: "Foo".to_string(),
        })
        .await
        .expect("relationships should load");
    assert_eq!(from_foo.len(), 1);
    assert_eq!(from_foo[0].relationship_type, "CALLS");
    assert_eq!(from_foo[0].target_name, "Bar");
    assert_eq!(from_foo[0].target_labels, ["Class"]);

    let from_bar = dispatcher
        .get_relationships(GetRelationshipsArgs {
            node_name: "Bar".to_string(),
        })
        .await
        .expect("relationships should load");
    assert!(from_bar.iter().all(|view| view.target_name != "Foo"));
    assert_eq!(from_bar.len(), 1);
    assert_eq!(from_bar[0].relationship_type, "INHERITS");
}

#[tokio::test]
async fn relationships_of_leaf_or_unknown_node_are_empty() {
    let dispatcher = dispatcher(chain_graph());

    for node_name in ["Baz", "Unknown"] {
        let views = dispatcher
            .get_relationships(GetRelationshipsArgs {
                node_name: node_name.to_string(),
            })
            .await
            .expect("relationships should load");
        assert!(views.is_empty(), "{node_name} should have no outgoing edges");
    }
}

#[tokio::test]
async fn parallel_edges_are_reported_separately() {
    let graph = chain_graph().with_edge("Foo", "DEPENDS_ON", "Bar");
    let dispatcher = dispatcher(graph);

    let views = dispatcher
        .get_relationships(GetRelationshipsArgs {
            node_name: "Foo".to_string(),
        })
        .await
        .expect("relationships should load");

    let kinds: Vec<_> = views.iter().map(|view| view.relationship_type.as_str()).collect();
    assert_eq!(kinds, ["CALLS", "DEPENDS_ON"]);
}

#[tokio::test]
async fn chain_neighbors_grow_with_depth() {
    let dispatcher = dispatcher(chain_graph());

    let one = neighbors(&dispatcher, "Foo", 1).await;
    assert_eq!(
        one,
        [NeighborView {
            name: "Bar".to_string(),
            labels: vec!["Class".to_string()],
            relationship_types: vec!["CALLS".to_string()],
        }]
    );

    let two = neighbors(&dispatcher, "Foo", 2).await;
    assert_eq!(names(&two), BTreeSet::from(["Bar".to_string(), "Baz".to_string()]));
    let baz = two
        .iter()
        .find(|view| view.name == "Baz")
        .expect("Baz is two hops away");
    let kinds: BTreeSet<_> = baz.relationship_types.iter().map(String::as_str).collect();
    assert_eq!(kinds, BTreeSet::from(["CALLS", "INHERITS"]));
    assert_eq!(baz.relationship_types.len(), 2);
}

#[tokio::test]
async fn neighbors_ignore_edge_direction() {
    let dispatcher = dispatcher(chain_graph());

    let from_baz = neighbors(&dispatcher, "Baz", 1).await;
    assert_eq!(names(&from_baz), BTreeSet::from(["Bar".to_string()]));
    assert_eq!(from_baz[0].relationship_types, ["INHERITS"]);
}

#[tokio::test]
async fn neighbors_are_unique_and_exclude_origin() {
    // Two routes from Foo to Qux plus a cycle back to Foo.
    let graph = MemoryGraph::new()
        .with_node("Foo", &["Class"])
        .with_node("Bar", &["Class"])
        .with_node("Baz", &["Class"])
        .with_node("Qux", &["Type"])
        .with_edge("Foo", "CALLS", "Bar")
        .with_edge("Foo", "CALLS", "Baz")
        .with_edge("Bar", "DEPENDS_ON", "Qux")
        .with_edge("Baz", "DEPENDS_ON", "Qux")
        .with_edge("Qux", "HAS_ISSUE", "Foo");
    let dispatcher = dispatcher(graph);

    for depth in 1..=4 {
        let views = neighbors(&dispatcher, "Foo", depth).await;
        assert!(views.iter().all(|view| view.name != "Foo"), "depth {depth}");
        assert_eq!(names(&views).len(), views.len(), "duplicates at depth {depth}");
    }

    let direct = neighbors(&dispatcher, "Foo", 1).await;
    let qux = direct
        .iter()
        .find(|view| view.name == "Qux")
        .expect("Qux is adjacent through HAS_ISSUE");
    assert_eq!(qux.relationship_types, ["HAS_ISSUE"]);
}

#[tokio::test]
async fn neighbor_sets_are_monotonic_in_depth() {
    let graph = MemoryGraph::new()
        .with_node("A", &["Class"])
        .with_node("B", &["Class"])
        .with_node("C", &["Class"])
        .with_node("D", &["Record"])
        .with_node("E", &["Type"])
        .with_node("F", &["Type"])
        .with_edge("A", "CALLS", "B")
        .with_edge("C", "CALLS", "B")
        .with_edge("C", "DEPENDS_ON", "D")
        .with_edge("D", "INHERITS", "E")
        .with_edge("E", "HAS_ISSUE", "F")
        .with_edge("F", "CALLS", "A");
    let dispatcher = dispatcher(graph);

    let mut previous = BTreeSet::new();
    for depth in 1..=5 {
        let current = names(&neighbors(&dispatcher, "A", depth).await);
        assert!(current.is_superset(&previous), "depth {depth} lost neighbors");
        previous = current;
    }
    assert_eq!(previous.len(), 5);
}

#[tokio::test]
async fn depth_outside_bounds_is_invalid_without_backend_call() {
    let dispatcher = dispatcher(chain_graph()).with_config(DispatcherConfig::new().with_max_depth(3));

    for depth in [0, -1, 4, 1_000] {
        let err = dispatcher
            .get_neighbors(GetNeighborsArgs {
                node_name: "Foo".to_string(),
                depth: Some(depth),
            })
            .await
            .expect_err("depth out of range must be rejected");
        assert!(matches!(err, ToolError::InvalidArgument(_)), "depth {depth}: {err}");
    }
    assert_eq!(dispatcher.store().calls(), 0);

    let at_max = neighbors(&dispatcher, "Foo", 3).await;
    assert_eq!(names(&at_max).len(), 2);
}

#[tokio::test]
async fn dispatch_defaults_depth_to_one() {
    let dispatcher = dispatcher(chain_graph());

    let output = dispatcher
        .dispatch("get_neighbors", &args(json!({"node_name": "Foo"})))
        .await
        .expect("neighbors should load");

    let ToolOutput::Neighbors(views) = output else {
        panic!("expected neighbors output");
    };
    assert_eq!(names(&views), BTreeSet::from(["Bar".to_string()]));
}

#[tokio::test]
async fn dispatch_validates_before_touching_the_backend() {
    let dispatcher = dispatcher(chain_graph());

    let unknown = dispatcher
        .dispatch("drop_graph", &args(json!({})))
        .await
        .expect_err("unknown tools are rejected");
    assert!(matches!(unknown, ToolError::UnknownTool(ref name) if name == "drop_graph"));

    let missing = dispatcher
        .dispatch("get_relationships", &args(json!({})))
        .await
        .expect_err("missing arguments are rejected");
    assert!(matches!(missing, ToolError::InvalidArgument(_)));

    let mistyped = dispatcher
        .dispatch("get_neighbors", &args(json!({"node_name": "Foo", "depth": "deep"})))
        .await
        .expect_err("mistyped arguments are rejected");
    assert!(matches!(mistyped, ToolError::InvalidArgument(_)));

    assert_eq!(dispatcher.store().calls(), 0);
    assert_eq!(dispatcher.embedder().calls(), 0);
}

#[tokio::test]
async fn stalled_backend_times_out() {
    let dispatcher = ToolDispatcher::new(StalledStore, FakeEmbedder::new()).with_config(
        DispatcherConfig::new().with_timeout(Some(Duration::from_millis(20))),
    );

    let err = dispatcher
        .get_relationships(GetRelationshipsArgs {
            node_name: "Foo".to_string(),
        })
        .await
        .expect_err("stalled query must time out");
    assert!(matches!(err, ToolError::Timeout(_)));

    let err = dispatcher
        .dispatch_with_deadline(
            "get_node",
            &args(json!({"node_name": "Foo"})),
            Some(Duration::from_millis(5)),
        )
        .await
        .expect_err("caller deadline applies");
    assert!(matches!(err, ToolError::Timeout(limit) if limit == Duration::from_millis(5)));
}

#[test]
fn neighbor_query_depth_matches_request() {
    let depth = Depth::new(2, 5).expect("valid depth");
    let query = QueryBuilder::new().neighbor_paths("Foo", depth);
    assert_eq!(query.kind, QueryKind::NeighborPaths { depth: 2 });
}
