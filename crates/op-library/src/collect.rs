//! Operations over arrays of values

use std::collections::HashMap;

use serde_json::{json, Value};

use op_engine::{OpCategory, OperationDescriptor, ParamSpec, Result, ValueKind};

/// Join an array of strings into one, skipping empties
///
/// Accepts a single string as a one-element array for convenience.
/// Returns named outputs: the joined `merged` string and the `count` of
/// inputs merged.
pub fn merge(args: HashMap<String, Value>) -> Result<Value> {
    let values: Vec<String> = match args.get("inputs") {
        Some(Value::Array(arr)) => arr
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .filter(|s| !s.trim().is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => vec![],
    };

    let separator = args
        .get("separator")
        .and_then(Value::as_str)
        .unwrap_or("\n");

    let merged = values.join(separator);
    let count = values.len();
    Ok(json!({ "merged": merged, "count": count }))
}

pub fn merge_descriptor() -> OperationDescriptor {
    OperationDescriptor {
        op_id: "merge".to_string(),
        category: OpCategory::Collection,
        description: "Joins an array of strings into one".to_string(),
        params: vec![
            ParamSpec::marker("inputs", ValueKind::Array),
            ParamSpec::with_default("separator", json!("\n")),
        ],
        outputs: vec!["merged".to_string(), "count".to_string()],
    }
}
