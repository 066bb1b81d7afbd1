//! Operation trait and output normalization
//!
//! An operation is a callable supplied by an external library. The engine
//! invokes it with its resolved input values keyed by parameter name and
//! receives back either a single value or a JSON object keyed by output
//! name. Execution is synchronous; a run is a single sequential walk.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::Result;

/// A callable operation wired into the graph
///
/// Implementations must not hold references into the graph; they see only
/// their resolved argument values.
pub trait Operation: Send + Sync {
    /// Invoke the operation with arguments bound by parameter name
    ///
    /// Returns a single value or a JSON object of named outputs. Errors
    /// propagate unmodified through the run loop — there is no per-node
    /// recovery.
    fn invoke(&self, args: HashMap<String, Value>) -> Result<Value>;
}

/// Callback-based operation
///
/// Wraps a closure as an [`Operation`], for callers that register plain
/// functions rather than dedicated types.
pub struct CallbackOperation {
    callback: Box<dyn Fn(HashMap<String, Value>) -> Result<Value> + Send + Sync>,
}

impl CallbackOperation {
    pub fn new(
        callback: impl Fn(HashMap<String, Value>) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }
}

impl Operation for CallbackOperation {
    fn invoke(&self, args: HashMap<String, Value>) -> Result<Value> {
        (self.callback)(args)
    }
}

/// Normalize a raw operation result to a name-keyed output mapping
///
/// A JSON object passes through keyed as-is. Any other value is wrapped
/// under the first declared output name (the single implicit key); with no
/// declared outputs the value is dropped.
pub fn normalize_outputs(raw: Value, output_names: &[String]) -> HashMap<String, Value> {
    match raw {
        Value::Object(map) => map.into_iter().collect(),
        other => {
            let mut outputs = HashMap::new();
            if let Some(first) = output_names.first() {
                outputs.insert(first.clone(), other);
            }
            outputs
        }
    }
}
