//! End-to-end pipeline tests: registry, graph wiring, and ordered runs

use std::sync::Arc;

use serde_json::{json, Value};

use op_engine::{CallbackOperation, EngineError, Graph, OperationRegistry};
use op_library::register_builtins;

fn builtin_registry() -> OperationRegistry {
    let mut registry = OperationRegistry::new();
    register_builtins(&mut registry);
    registry
}

/// scale(2 * 3) -> shift(+1) -> square(^2), all from the built-in catalog
fn chain_graph(registry: &OperationRegistry) -> Graph {
    let mut graph = Graph::new();
    graph
        .add_node(
            "multiply",
            registry.operation("multiply").unwrap(),
            vec![
                ("data".to_string(), json!(2.0)),
                ("scale".to_string(), json!(3.0)),
            ],
            vec!["data".to_string()],
            Some("scale".to_string()),
        )
        .unwrap();
    graph
        .add_node(
            "offset",
            registry.operation("offset").unwrap(),
            vec![
                ("data".to_string(), Value::Null),
                ("amount".to_string(), json!(1.0)),
            ],
            vec!["data".to_string()],
            Some("shift".to_string()),
        )
        .unwrap();
    graph
        .add_node(
            "power",
            registry.operation("power").unwrap(),
            vec![
                ("data".to_string(), Value::Null),
                ("exponent".to_string(), json!(2.0)),
            ],
            vec!["data".to_string()],
            Some("square".to_string()),
        )
        .unwrap();
    graph.bind("scale", "data", "shift", "data").unwrap();
    graph.bind("shift", "data", "square", "data").unwrap();
    graph
}

#[test]
fn square_then_add_one_runs_in_order() {
    let mut graph = Graph::new();
    let square = Arc::new(CallbackOperation::new(|args| {
        let x = args
            .get("x")
            .and_then(Value::as_f64)
            .ok_or_else(|| EngineError::failed("missing numeric input 'x'"))?;
        Ok(json!({ "result": x * x }))
    }));
    let add_one = Arc::new(CallbackOperation::new(|args| {
        let v = args
            .get("v")
            .and_then(Value::as_f64)
            .ok_or_else(|| EngineError::failed("missing numeric input 'v'"))?;
        Ok(json!({ "result": v + 1.0 }))
    }));

    graph
        .add_node(
            "square",
            square,
            vec![("x".to_string(), json!(3.0))],
            vec!["result".to_string()],
            Some("square".to_string()),
        )
        .unwrap();
    graph
        .add_node(
            "add-one",
            add_one,
            vec![("v".to_string(), Value::Null)],
            vec!["result".to_string()],
            Some("add-one".to_string()),
        )
        .unwrap();
    graph.bind("square", "result", "add-one", "v").unwrap();

    let results = graph.run().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].node, "square");
    assert_eq!(results[0].outputs["result"], json!(9.0));
    assert_eq!(results[1].node, "add-one");
    assert_eq!(results[1].outputs["result"], json!(10.0));
}

#[test]
fn library_chain_depths_and_values() {
    let registry = builtin_registry();
    let mut graph = chain_graph(&registry);

    let results = graph.run().unwrap();

    assert_eq!(graph.node("scale").unwrap().depth(), Some(0));
    assert_eq!(graph.node("shift").unwrap().depth(), Some(1));
    assert_eq!(graph.node("square").unwrap().depth(), Some(2));

    assert_eq!(results[0].node, "scale");
    assert_eq!(results[0].outputs["data"], json!(6.0));
    assert_eq!(results[1].node, "shift");
    assert_eq!(results[1].outputs["data"], json!(7.0));
    assert_eq!(results[2].node, "square");
    assert_eq!(results[2].outputs["data"], json!(49.0));
}

#[test]
fn consumer_waits_for_both_roots() {
    let registry = builtin_registry();
    let mut graph = Graph::new();

    graph
        .add_node(
            "upper",
            registry.operation("upper").unwrap(),
            vec![("text".to_string(), json!("fast"))],
            vec!["text".to_string()],
            Some("a".to_string()),
        )
        .unwrap();
    graph
        .add_node(
            "upper",
            registry.operation("upper").unwrap(),
            vec![("text".to_string(), json!("lane"))],
            vec!["text".to_string()],
            Some("d".to_string()),
        )
        .unwrap();
    graph
        .add_node(
            "concat",
            registry.operation("concat").unwrap(),
            vec![
                ("left".to_string(), Value::Null),
                ("right".to_string(), Value::Null),
                ("separator".to_string(), json!("-")),
            ],
            vec!["text".to_string(), "length".to_string()],
            Some("joined".to_string()),
        )
        .unwrap();
    graph.bind("a", "text", "joined", "left").unwrap();
    graph.bind("d", "text", "joined", "right").unwrap();

    let results = graph.run().unwrap();
    assert_eq!(results.len(), 3);
    // Both roots execute before the consumer, whatever their mutual order
    assert!(results[..2].iter().any(|r| r.node == "a"));
    assert!(results[..2].iter().any(|r| r.node == "d"));
    assert_eq!(results[2].node, "joined");
    assert_eq!(results[2].outputs["text"], "FAST-LANE");
    assert_eq!(results[2].outputs["length"], 9);
}

#[test]
fn rebinding_starts_with_fresh_transit() {
    let registry = builtin_registry();
    let mut graph = chain_graph(&registry);

    graph.run().unwrap();
    let old = graph
        .node("shift")
        .unwrap()
        .param("data")
        .unwrap()
        .link_id()
        .unwrap()
        .to_string();
    assert_eq!(graph.link(&old).unwrap().transit, json!(6.0));

    graph.unbind(&old).unwrap();
    let fresh = graph.bind("scale", "data", "shift", "data").unwrap();

    // The new link carries no history from the old one
    assert_ne!(fresh, old);
    assert_eq!(graph.link(&fresh).unwrap().transit, Value::Null);
    assert_eq!(graph.param_value("shift", "data").unwrap(), Value::Null);
}

#[test]
fn pure_graph_runs_identically_twice() {
    let registry = builtin_registry();
    let mut graph = chain_graph(&registry);

    let first = graph.run().unwrap();
    let second = graph.run().unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.node, b.node);
        assert_eq!(a.outputs, b.outputs);
    }
}

#[test]
fn operation_failure_aborts_run() {
    let registry = builtin_registry();
    let mut graph = Graph::new();

    // multiply with no data literal and no link: the operation raises
    graph
        .add_node(
            "multiply",
            registry.operation("multiply").unwrap(),
            vec![("data".to_string(), Value::Null)],
            vec!["data".to_string()],
            None,
        )
        .unwrap();

    let err = graph.run().unwrap_err();
    assert!(matches!(err, EngineError::OperationFailed(_)));
    assert!(err.to_string().contains("'data'"));
}
