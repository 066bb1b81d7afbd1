//! Operation registry with author-supplied descriptors
//!
//! The registry is the external-facing catalog of callable operations.
//! Instead of reflecting over a callable's signature at runtime, the
//! operation author supplies an explicit [`OperationDescriptor`]; the
//! registry derives the presentation metadata (required/optional flags,
//! defaults, enabled state) from it at registration time.
//!
//! The registry never executes operations itself — it only hands out the
//! stored callable and metadata.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::operation::{CallbackOperation, Operation};
use crate::types::ValueKind;

/// Category of an operation, for grouping in an external palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpCategory {
    /// Source operations producing values from configuration
    Input,
    /// Numeric operations
    Math,
    /// String operations
    Text,
    /// Operations over arrays of values
    Collection,
    /// Everything else
    Utility,
}

/// Author-side declaration of a parameter's default
#[derive(Debug, Clone)]
pub enum ParamDefault {
    /// No default: the parameter must always be supplied
    Required,
    /// A concrete, usable default value
    Value(Value),
    /// A kind marker standing in for "must arrive via a link"
    ///
    /// The parameter is presented as disabled with its default cleared —
    /// the marker is a placeholder, not a usable value.
    Marker(ValueKind),
}

/// Author-side declaration of one parameter
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub default: ParamDefault,
}

impl ParamSpec {
    /// A parameter with no default
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: ParamDefault::Required,
        }
    }

    /// A parameter with a concrete default value
    pub fn with_default(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            default: ParamDefault::Value(value),
        }
    }

    /// A link-fed parameter declared with a kind marker
    pub fn marker(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            default: ParamDefault::Marker(kind),
        }
    }
}

/// Complete author-supplied description of an operation
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    /// Unique operation identifier (e.g. "multiply")
    pub op_id: String,
    /// Category for palette grouping
    pub category: OpCategory,
    /// Free-text description
    pub description: String,
    /// Ordered parameter declarations
    pub params: Vec<ParamSpec>,
    /// Ordered output names
    pub outputs: Vec<String>,
}

/// Derived per-parameter presentation metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamMetadata {
    pub name: String,
    /// Declared with no default at all
    pub required: bool,
    /// Concrete default value, if one exists
    pub default: Option<Value>,
    /// False when the declared default was a kind marker: the value must
    /// be supplied via a link, not edited in place
    pub enabled: bool,
}

/// The stored metadata bundle handed to an external presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetadata {
    pub op_id: String,
    pub category: OpCategory,
    pub description: String,
    pub params: Vec<ParamMetadata>,
    pub outputs: Vec<String>,
}

/// A registration entry combining metadata with an optional callable
struct RegistryEntry {
    metadata: OperationMetadata,
    op: Option<Arc<dyn Operation>>,
}

/// Catalog of callable operations keyed by operation id
///
/// Re-registering an id overwrites the previous entry. An invalid
/// descriptor is skipped with a warning rather than failing the batch.
#[derive(Default)]
pub struct OperationRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl OperationRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation with its descriptor
    ///
    /// Returns `false` (after a warning) when the descriptor is invalid:
    /// empty id, duplicate parameter names, or duplicate output names.
    pub fn register(&mut self, descriptor: OperationDescriptor, op: Arc<dyn Operation>) -> bool {
        self.insert(descriptor, Some(op))
    }

    /// Register a plain function or closure as an operation
    pub fn register_callback(
        &mut self,
        descriptor: OperationDescriptor,
        callback: impl Fn(HashMap<String, Value>) -> Result<Value> + Send + Sync + 'static,
    ) -> bool {
        self.register(descriptor, Arc::new(CallbackOperation::new(callback)))
    }

    /// Register metadata only, with no callable
    ///
    /// Used for palette listings of operations executed elsewhere.
    pub fn register_metadata(&mut self, descriptor: OperationDescriptor) -> bool {
        self.insert(descriptor, None)
    }

    fn insert(&mut self, descriptor: OperationDescriptor, op: Option<Arc<dyn Operation>>) -> bool {
        if let Some(reason) = validate_descriptor(&descriptor) {
            log::warn!(
                "skipping registration of operation '{}': {}",
                descriptor.op_id,
                reason
            );
            return false;
        }
        let metadata = derive_metadata(descriptor);
        self.entries
            .insert(metadata.op_id.clone(), RegistryEntry { metadata, op });
        true
    }

    /// Get the stored metadata bundle for an operation id
    pub fn metadata(&self, op_id: &str) -> Option<&OperationMetadata> {
        self.entries.get(op_id).map(|e| &e.metadata)
    }

    /// Get the stored callable for an operation id
    pub fn operation(&self, op_id: &str) -> Option<Arc<dyn Operation>> {
        self.entries.get(op_id).and_then(|e| e.op.clone())
    }

    /// All registered metadata bundles
    pub fn all_metadata(&self) -> Vec<&OperationMetadata> {
        self.entries.values().map(|e| &e.metadata).collect()
    }

    /// Metadata grouped by category
    pub fn metadata_by_category(&self) -> HashMap<OpCategory, Vec<&OperationMetadata>> {
        let mut grouped: HashMap<OpCategory, Vec<&OperationMetadata>> = HashMap::new();
        for entry in self.entries.values() {
            grouped
                .entry(entry.metadata.category)
                .or_default()
                .push(&entry.metadata);
        }
        grouped
    }

    /// Check if an operation id is registered
    pub fn contains(&self, op_id: &str) -> bool {
        self.entries.contains_key(op_id)
    }

    /// List all registered operation ids
    pub fn op_ids(&self) -> Vec<&str> {
        self.entries.keys().map(|s| s.as_str()).collect()
    }

    /// Merge another registry into this one
    ///
    /// Entries from `other` override entries sharing the same id.
    pub fn merge(&mut self, other: OperationRegistry) {
        self.entries.extend(other.entries);
    }
}

fn validate_descriptor(descriptor: &OperationDescriptor) -> Option<String> {
    if descriptor.op_id.is_empty() {
        return Some("empty operation id".to_string());
    }
    let mut seen = std::collections::HashSet::new();
    for param in &descriptor.params {
        if !seen.insert(param.name.as_str()) {
            return Some(format!("duplicate parameter name '{}'", param.name));
        }
    }
    let mut seen = std::collections::HashSet::new();
    for output in &descriptor.outputs {
        if !seen.insert(output.as_str()) {
            return Some(format!("duplicate output name '{}'", output));
        }
    }
    None
}

fn derive_metadata(descriptor: OperationDescriptor) -> OperationMetadata {
    let params = descriptor
        .params
        .into_iter()
        .map(|spec| match spec.default {
            ParamDefault::Required => ParamMetadata {
                name: spec.name,
                required: true,
                default: None,
                enabled: true,
            },
            ParamDefault::Value(v) => ParamMetadata {
                name: spec.name,
                required: false,
                default: Some(v),
                enabled: true,
            },
            ParamDefault::Marker(_) => ParamMetadata {
                name: spec.name,
                required: false,
                default: None,
                enabled: false,
            },
        })
        .collect();

    OperationMetadata {
        op_id: descriptor.op_id,
        category: descriptor.category,
        description: descriptor.description,
        params,
        outputs: descriptor.outputs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_descriptor(op_id: &str) -> OperationDescriptor {
        OperationDescriptor {
            op_id: op_id.to_string(),
            category: OpCategory::Math,
            description: format!("Test op {}", op_id),
            params: vec![
                ParamSpec::marker("data", ValueKind::Number),
                ParamSpec::with_default("scale", json!(1.0)),
                ParamSpec::required("mode"),
            ],
            outputs: vec!["data".to_string()],
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = OperationRegistry::new();
        assert!(registry.register_callback(test_descriptor("mul"), |_| Ok(json!(0))));

        assert!(registry.contains("mul"));
        assert!(!registry.contains("unknown"));
        assert!(registry.operation("mul").is_some());
        assert_eq!(registry.metadata("mul").unwrap().outputs, vec!["data"]);
    }

    #[test]
    fn test_marker_param_disabled_with_default_cleared() {
        let mut registry = OperationRegistry::new();
        registry.register_metadata(test_descriptor("mul"));

        let meta = registry.metadata("mul").unwrap();
        let data = &meta.params[0];
        assert!(!data.enabled);
        assert!(data.default.is_none());
        assert!(!data.required);
    }

    #[test]
    fn test_concrete_default_enabled() {
        let mut registry = OperationRegistry::new();
        registry.register_metadata(test_descriptor("mul"));

        let meta = registry.metadata("mul").unwrap();
        let scale = &meta.params[1];
        assert!(scale.enabled);
        assert_eq!(scale.default, Some(json!(1.0)));
        assert!(!scale.required);

        let mode = &meta.params[2];
        assert!(mode.enabled);
        assert!(mode.required);
        assert!(mode.default.is_none());
    }

    #[test]
    fn test_invalid_descriptor_skipped() {
        let mut registry = OperationRegistry::new();

        let mut bad_id = test_descriptor("");
        bad_id.op_id = String::new();
        assert!(!registry.register_metadata(bad_id));

        let mut dup_params = test_descriptor("dup");
        dup_params.params.push(ParamSpec::required("data"));
        assert!(!registry.register_metadata(dup_params));
        assert!(!registry.contains("dup"));

        let mut dup_outputs = test_descriptor("dup-out");
        dup_outputs.outputs.push("data".to_string());
        assert!(!registry.register_metadata(dup_outputs));
    }

    #[test]
    fn test_reregister_overwrites() {
        let mut registry = OperationRegistry::new();
        registry.register_metadata(test_descriptor("mul"));

        let mut updated = test_descriptor("mul");
        updated.description = "Updated".to_string();
        registry.register_metadata(updated);

        assert_eq!(registry.all_metadata().len(), 1);
        assert_eq!(registry.metadata("mul").unwrap().description, "Updated");
    }

    #[test]
    fn test_metadata_only_has_no_operation() {
        let mut registry = OperationRegistry::new();
        registry.register_metadata(test_descriptor("mul"));
        assert!(registry.operation("mul").is_none());
    }

    #[test]
    fn test_metadata_by_category_and_merge() {
        let mut registry = OperationRegistry::new();
        registry.register_metadata(test_descriptor("mul"));

        let mut other = OperationRegistry::new();
        let mut text_op = test_descriptor("upper");
        text_op.category = OpCategory::Text;
        other.register_metadata(text_op);

        registry.merge(other);
        let grouped = registry.metadata_by_category();
        assert_eq!(grouped[&OpCategory::Math].len(), 1);
        assert_eq!(grouped[&OpCategory::Text].len(), 1);
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let mut registry = OperationRegistry::new();
        registry.register_metadata(test_descriptor("mul"));

        let json = serde_json::to_string(registry.metadata("mul").unwrap()).unwrap();
        assert!(json.contains("opId"));
    }
}
