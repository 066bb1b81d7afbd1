//! Scalar math operations
//!
//! Each operation takes a numeric `data` input that normally arrives via
//! a link (declared with a kind marker) plus editable tuning parameters
//! with concrete defaults. All return a single value, published under the
//! `data` output.

use std::collections::HashMap;

use serde_json::{json, Value};

use op_engine::{EngineError, OpCategory, OperationDescriptor, ParamSpec, Result, ValueKind};

fn number_arg(args: &HashMap<String, Value>, name: &str) -> Result<f64> {
    args.get(name)
        .and_then(Value::as_f64)
        .ok_or_else(|| EngineError::failed(format!("missing numeric input '{}'", name)))
}

fn number_arg_or(args: &HashMap<String, Value>, name: &str, default: f64) -> f64 {
    args.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Multiply `data` by `scale`
pub fn multiply(args: HashMap<String, Value>) -> Result<Value> {
    let data = number_arg(&args, "data")?;
    let scale = number_arg_or(&args, "scale", 1.0);
    Ok(json!(data * scale))
}

pub fn multiply_descriptor() -> OperationDescriptor {
    OperationDescriptor {
        op_id: "multiply".to_string(),
        category: OpCategory::Math,
        description: "Multiplies a numeric input by a scale factor".to_string(),
        params: vec![
            ParamSpec::marker("data", ValueKind::Number),
            ParamSpec::with_default("scale", json!(1.0)),
        ],
        outputs: vec!["data".to_string()],
    }
}

/// Raise `data` to `exponent`
pub fn power(args: HashMap<String, Value>) -> Result<Value> {
    let data = number_arg(&args, "data")?;
    let exponent = number_arg_or(&args, "exponent", 2.0);
    Ok(json!(data.powf(exponent)))
}

pub fn power_descriptor() -> OperationDescriptor {
    OperationDescriptor {
        op_id: "power".to_string(),
        category: OpCategory::Math,
        description: "Raises a numeric input to an exponent".to_string(),
        params: vec![
            ParamSpec::marker("data", ValueKind::Number),
            ParamSpec::with_default("exponent", json!(2.0)),
        ],
        outputs: vec!["data".to_string()],
    }
}

/// Add `amount` to `data`
pub fn offset(args: HashMap<String, Value>) -> Result<Value> {
    let data = number_arg(&args, "data")?;
    let amount = number_arg_or(&args, "amount", 0.0);
    Ok(json!(data + amount))
}

pub fn offset_descriptor() -> OperationDescriptor {
    OperationDescriptor {
        op_id: "offset".to_string(),
        category: OpCategory::Math,
        description: "Adds a constant offset to a numeric input".to_string(),
        params: vec![
            ParamSpec::marker("data", ValueKind::Number),
            ParamSpec::with_default("amount", json!(0.0)),
        ],
        outputs: vec!["data".to_string()],
    }
}
