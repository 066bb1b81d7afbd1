//! Core types for operation networks
//!
//! These types define the structure of the network: nodes wrapping an
//! operation, the named ports on each node, and the links carrying values
//! between ports. The graph owns all nodes and links; ports refer to their
//! attached link by id and links refer to their endpoints by node/port
//! name, so there are no ownership cycles.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EngineError, Result};
use crate::operation::Operation;

/// Unique identifier for a link
pub type LinkId = String;

/// The advisory value kind of a port
///
/// Kind checking is metadata for callers (UI, validation); the engine
/// never enforces it at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Accepts any value
    Any,
    /// Text string
    String,
    /// Numeric value
    Number,
    /// Boolean value
    Boolean,
    /// JSON array
    Array,
    /// JSON object
    Object,
    /// Opaque binary payload (base64 encoded)
    Binary,
}

impl ValueKind {
    /// Check if this kind can connect to another kind
    pub fn is_compatible_with(&self, other: &ValueKind) -> bool {
        if matches!(self, ValueKind::Any) || matches!(other, ValueKind::Any) {
            return true;
        }
        self == other
    }
}

/// The slot of a port: unset, a literal value, or an attached link
///
/// The enum is the tagged union from the data model — a slot can never be
/// a literal and a link reference at the same time.
#[derive(Debug, Clone)]
pub enum PortSlot {
    /// No value yet (fresh port, or detached by unbind)
    Empty,
    /// A literal value held in place
    Literal(Value),
    /// Attached to a link; the effective value lives in the link's transit
    Linked(LinkId),
}

/// A named input or output slot on a node
#[derive(Debug, Clone)]
pub struct Port {
    /// Name, unique among the owning node's ports of the same direction
    pub name: String,
    /// Advisory set of accepted value kinds
    pub accepts: Vec<ValueKind>,
    /// Current slot contents
    pub slot: PortSlot,
}

impl Port {
    /// Create an unset port accepting any kind
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accepts: vec![ValueKind::Any],
            slot: PortSlot::Empty,
        }
    }

    /// Create a port holding a literal value
    ///
    /// `Value::Null` means unset, matching the "literal or unset" contract
    /// of node addition.
    pub fn with_literal(name: impl Into<String>, value: Value) -> Self {
        let slot = if value.is_null() {
            PortSlot::Empty
        } else {
            PortSlot::Literal(value)
        };
        Self {
            name: name.into(),
            accepts: vec![ValueKind::Any],
            slot,
        }
    }

    /// The id of the attached link, if any
    pub fn link_id(&self) -> Option<&str> {
        match &self.slot {
            PortSlot::Linked(id) => Some(id),
            _ => None,
        }
    }

    /// Whether this port is attached to a link
    pub fn is_linked(&self) -> bool {
        matches!(self.slot, PortSlot::Linked(_))
    }
}

/// A node/port endpoint of a link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortRef {
    /// Node name
    pub node: String,
    /// Port name on that node
    pub port: String,
}

impl PortRef {
    pub fn new(node: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            port: port.into(),
        }
    }
}

/// A directed connection from one node's output port to another node's
/// input port
#[derive(Debug, Clone)]
pub struct Link {
    /// Unique identifier
    pub id: LinkId,
    /// Source output port
    pub source: PortRef,
    /// Destination input port
    pub destination: PortRef,
    /// Cached last value passed through; starts as `Null`
    pub transit: Value,
}

/// An operation instance in the graph
///
/// Wraps a reference to a callable operation plus its ordered input and
/// output ports. Port ordering matches the operation signature and is
/// significant for positional output correspondence.
pub struct Node {
    name: String,
    op_id: String,
    op: Arc<dyn Operation>,
    params: Vec<Port>,
    outputs: Vec<Port>,
    depth: Option<usize>,
}

impl Node {
    pub(crate) fn new(
        name: String,
        op_id: String,
        op: Arc<dyn Operation>,
        params: Vec<Port>,
        outputs: Vec<Port>,
    ) -> Self {
        Self {
            name,
            op_id,
            op,
            params,
            outputs,
            depth: None,
        }
    }

    /// Node name, unique within its graph
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier of the wrapped operation
    pub fn op_id(&self) -> &str {
        &self.op_id
    }

    /// The wrapped operation
    pub fn operation(&self) -> Arc<dyn Operation> {
        Arc::clone(&self.op)
    }

    /// Ordered input ports
    pub fn params(&self) -> &[Port] {
        &self.params
    }

    /// Ordered output ports
    pub fn outputs(&self) -> &[Port] {
        &self.outputs
    }

    /// Computed dependency depth; `None` until depths are assigned
    pub fn depth(&self) -> Option<usize> {
        self.depth
    }

    pub(crate) fn set_depth(&mut self, depth: Option<usize>) {
        self.depth = depth;
    }

    /// Look up an input port by name
    pub fn param(&self, name: &str) -> Result<&Port> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| EngineError::PortNotFound {
                node: self.name.clone(),
                port: name.to_string(),
            })
    }

    /// Look up an output port by name
    pub fn output(&self, name: &str) -> Result<&Port> {
        self.outputs
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| EngineError::PortNotFound {
                node: self.name.clone(),
                port: name.to_string(),
            })
    }

    pub(crate) fn param_mut(&mut self, name: &str) -> Result<&mut Port> {
        let node = self.name.clone();
        self.params
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or(EngineError::PortNotFound {
                node,
                port: name.to_string(),
            })
    }

    pub(crate) fn output_mut(&mut self, name: &str) -> Result<&mut Port> {
        let node = self.name.clone();
        self.outputs
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or(EngineError::PortNotFound {
                node,
                port: name.to_string(),
            })
    }

    /// Current param values keyed by name, with linked slots unresolved
    ///
    /// Mostly useful for display; execution resolves values through the
    /// graph so that linked slots read their link's transit.
    pub fn literal_params(&self) -> HashMap<String, Value> {
        self.params
            .iter()
            .map(|p| {
                let value = match &p.slot {
                    PortSlot::Literal(v) => v.clone(),
                    _ => Value::Null,
                };
                (p.name.clone(), value)
            })
            .collect()
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("op_id", &self.op_id)
            .field("params", &self.params)
            .field("outputs", &self.outputs)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}
