//! String operations

use std::collections::HashMap;

use serde_json::{json, Value};

use op_engine::{EngineError, OpCategory, OperationDescriptor, ParamSpec, Result, ValueKind};

fn string_arg<'a>(args: &'a HashMap<String, Value>, name: &str) -> Result<&'a str> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| EngineError::failed(format!("missing string input '{}'", name)))
}

/// Join `left` and `right` with a separator
///
/// Returns named outputs: the joined `text` and its `length` in
/// characters.
pub fn concat(args: HashMap<String, Value>) -> Result<Value> {
    let left = string_arg(&args, "left")?;
    let right = string_arg(&args, "right")?;
    let separator = args
        .get("separator")
        .and_then(Value::as_str)
        .unwrap_or(" ");

    let text = format!("{}{}{}", left, separator, right);
    let length = text.chars().count();
    Ok(json!({ "text": text, "length": length }))
}

pub fn concat_descriptor() -> OperationDescriptor {
    OperationDescriptor {
        op_id: "concat".to_string(),
        category: OpCategory::Text,
        description: "Joins two strings with a separator".to_string(),
        params: vec![
            ParamSpec::marker("left", ValueKind::String),
            ParamSpec::marker("right", ValueKind::String),
            ParamSpec::with_default("separator", json!(" ")),
        ],
        outputs: vec!["text".to_string(), "length".to_string()],
    }
}

/// Uppercase `text`
pub fn upper(args: HashMap<String, Value>) -> Result<Value> {
    let text = string_arg(&args, "text")?;
    Ok(json!(text.to_uppercase()))
}

pub fn upper_descriptor() -> OperationDescriptor {
    OperationDescriptor {
        op_id: "upper".to_string(),
        category: OpCategory::Text,
        description: "Uppercases a string input".to_string(),
        params: vec![ParamSpec::marker("text", ValueKind::String)],
        outputs: vec!["text".to_string()],
    }
}
