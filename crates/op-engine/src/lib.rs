//! op-engine - Dataflow graph execution for operation networks
//!
//! This crate provides a small synchronous engine for wiring registered
//! operations into a directed acyclic network and executing it in
//! dependency order. It supports:
//!
//! - Nodes with named, ordered input/output ports
//! - Links carrying values between ports, with a cached transit value
//! - Topological depth assignment (longest producer chain wins)
//! - An operation registry with author-supplied descriptors
//! - Advisory validation of port kinds and unset inputs
//!
//! # Example
//!
//! ```ignore
//! use op_engine::{CallbackOperation, Graph};
//! use std::sync::Arc;
//!
//! let mut graph = Graph::new();
//! let square = Arc::new(CallbackOperation::new(|args| {
//!     let x = args["x"].as_f64().unwrap_or(0.0);
//!     Ok(serde_json::json!({ "result": x * x }))
//! }));
//! graph.add_node("square", square, vec![("x".into(), 3.0.into())],
//!     vec!["result".into()], None)?;
//! let results = graph.run()?;
//! ```

pub mod error;
pub mod graph;
pub mod operation;
pub mod registry;
pub mod types;
pub mod validation;

// Re-export key types
pub use error::{EngineError, Result};
pub use graph::{Graph, NodeRun};
pub use operation::{normalize_outputs, CallbackOperation, Operation};
pub use registry::{
    OpCategory, OperationDescriptor, OperationMetadata, OperationRegistry, ParamDefault,
    ParamMetadata, ParamSpec,
};
pub use types::{Link, LinkId, Node, Port, PortRef, PortSlot, ValueKind};
pub use validation::{validate, ValidationIssue};
