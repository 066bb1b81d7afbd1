//! Graph lifecycle, depth assignment, and ordered execution
//!
//! The [`Graph`] is the sole owner of the node and link collections.
//! Lifecycle operations keep the back-references consistent: binding flips
//! both endpoint slots to the new link, unbinding resets them to unset,
//! and node removal detaches every touching link first.
//!
//! Execution is synchronous and single-threaded: `run()` recomputes every
//! node's depth from scratch via topological layering, then walks the
//! nodes in ascending depth order. Equal-depth nodes are mutually
//! independent and keep insertion order.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::{EngineError, Result};
use crate::operation::{normalize_outputs, Operation};
use crate::types::{Link, LinkId, Node, Port, PortRef, PortSlot, ValueKind};

/// The result of executing one node during a run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRun {
    /// Node name
    pub node: String,
    /// Name-keyed outputs the operation produced
    pub outputs: HashMap<String, Value>,
}

/// An operation network: owned nodes and links plus lifecycle and
/// execution operations
#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    links: Vec<Link>,
    name_counter: u64,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// All nodes, in insertion order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All links, in creation order
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Look up a node by name
    pub fn node(&self, name: &str) -> Result<&Node> {
        self.nodes
            .iter()
            .find(|n| n.name() == name)
            .ok_or_else(|| EngineError::NodeNotFound(name.to_string()))
    }

    /// Look up a link by id
    pub fn link(&self, id: &str) -> Result<&Link> {
        self.links
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| EngineError::LinkNotFound(id.to_string()))
    }

    fn node_index(&self, name: &str) -> Result<usize> {
        self.nodes
            .iter()
            .position(|n| n.name() == name)
            .ok_or_else(|| EngineError::NodeNotFound(name.to_string()))
    }

    fn link_index(&self, id: &str) -> Result<usize> {
        self.links
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| EngineError::LinkNotFound(id.to_string()))
    }

    // -----------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------

    /// Add a node wrapping `op` to the graph
    ///
    /// Builds one input port per `params` entry (`Value::Null` means unset,
    /// ready for later linking) and one output port per name in `outputs`.
    /// With `name` omitted, a name is synthesized from `op_id` plus a
    /// monotonic counter, skipping past collisions. An explicit name that
    /// collides fails with `DuplicateNodeName`.
    ///
    /// Returns the assigned node name.
    pub fn add_node(
        &mut self,
        op_id: impl Into<String>,
        op: Arc<dyn Operation>,
        params: Vec<(String, Value)>,
        outputs: Vec<String>,
        name: Option<String>,
    ) -> Result<String> {
        let op_id = op_id.into();
        let name = match name {
            Some(n) => {
                if self.node_index(&n).is_ok() {
                    return Err(EngineError::DuplicateNodeName(n));
                }
                n
            }
            None => self.synthesize_name(&op_id),
        };

        let params = params
            .into_iter()
            .map(|(n, v)| Port::with_literal(n, v))
            .collect();
        let outputs = outputs.into_iter().map(Port::new).collect();

        log::debug!("adding node '{}' (op '{}')", name, op_id);
        self.nodes
            .push(Node::new(name.clone(), op_id, op, params, outputs));
        Ok(name)
    }

    fn synthesize_name(&mut self, op_id: &str) -> String {
        loop {
            let candidate = format!("{}-{}", op_id, self.name_counter);
            self.name_counter += 1;
            if self.node_index(&candidate).is_err() {
                return candidate;
            }
        }
    }

    /// Remove a node, detaching every link touching any of its ports first
    pub fn remove_node(&mut self, name: &str) -> Result<()> {
        let idx = self.node_index(name)?;

        let attached: Vec<LinkId> = self
            .links
            .iter()
            .filter(|l| l.source.node == name || l.destination.node == name)
            .map(|l| l.id.clone())
            .collect();
        for id in &attached {
            self.unbind(id)?;
        }

        log::debug!("removing node '{}' ({} links detached)", name, attached.len());
        self.nodes.remove(idx);
        Ok(())
    }

    /// Connect `source`'s output port to `dest`'s input port
    ///
    /// Fails if either node or port is missing, if either port already has
    /// a link attached, or if the edge would close a cycle. On success both
    /// slots reference the new link and its transit value starts as `Null`.
    pub fn bind(
        &mut self,
        source: &str,
        output: &str,
        dest: &str,
        param: &str,
    ) -> Result<LinkId> {
        let src_idx = self.node_index(source)?;
        let dst_idx = self.node_index(dest)?;

        if self.nodes[src_idx].output(output)?.is_linked() {
            return Err(EngineError::PortOccupied {
                node: source.to_string(),
                port: output.to_string(),
            });
        }
        if self.nodes[dst_idx].param(param)?.is_linked() {
            return Err(EngineError::PortOccupied {
                node: dest.to_string(),
                port: param.to_string(),
            });
        }
        if self.reaches(dest, source) {
            return Err(EngineError::CycleDetected);
        }

        let id = uuid::Uuid::new_v4().to_string();
        self.links.push(Link {
            id: id.clone(),
            source: PortRef::new(source, output),
            destination: PortRef::new(dest, param),
            transit: Value::Null,
        });
        self.nodes[src_idx].output_mut(output)?.slot = PortSlot::Linked(id.clone());
        self.nodes[dst_idx].param_mut(param)?.slot = PortSlot::Linked(id.clone());

        log::debug!("bound {}.{} -> {}.{}", source, output, dest, param);
        Ok(id)
    }

    /// Detach a link and remove it from the graph
    ///
    /// Both endpoint slots reset to unset — the literal a port held before
    /// binding is not restored, so callers must re-supply one to make the
    /// port usable again.
    pub fn unbind(&mut self, link_id: &str) -> Result<()> {
        let idx = self.link_index(link_id)?;
        let link = self.links.remove(idx);

        if let Ok(i) = self.node_index(&link.source.node) {
            if let Ok(p) = self.nodes[i].output_mut(&link.source.port) {
                p.slot = PortSlot::Empty;
            }
        }
        if let Ok(i) = self.node_index(&link.destination.node) {
            if let Ok(p) = self.nodes[i].param_mut(&link.destination.port) {
                p.slot = PortSlot::Empty;
            }
        }

        log::debug!("unbound link '{}'", link_id);
        Ok(())
    }

    /// Whether `to` is reachable from `from` along links (including
    /// `from == to`)
    fn reaches(&self, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }
        let mut stack = vec![from];
        let mut seen = HashSet::new();
        while let Some(name) = stack.pop() {
            if !seen.insert(name) {
                continue;
            }
            for link in &self.links {
                if link.source.node == name {
                    if link.destination.node == to {
                        return true;
                    }
                    stack.push(link.destination.node.as_str());
                }
            }
        }
        false
    }

    // -----------------------------------------------------------------
    // Port values
    // -----------------------------------------------------------------

    /// Effective value of an input port: the link's transit if attached,
    /// otherwise the literal (`Null` when unset)
    pub fn param_value(&self, node: &str, port: &str) -> Result<Value> {
        let slot = self.node(node)?.param(port)?.slot.clone();
        self.slot_value(&slot)
    }

    /// Effective value of an output port
    pub fn output_value(&self, node: &str, port: &str) -> Result<Value> {
        let slot = self.node(node)?.output(port)?.slot.clone();
        self.slot_value(&slot)
    }

    /// Set an input port's value: writes the link's transit if attached,
    /// otherwise overwrites the literal in place
    pub fn set_param(&mut self, node: &str, port: &str, value: Value) -> Result<()> {
        let idx = self.node_index(node)?;
        let link = self.nodes[idx].param(port)?.link_id().map(str::to_string);
        match link {
            Some(id) => {
                let li = self.link_index(&id)?;
                self.links[li].transit = value;
            }
            None => {
                self.nodes[idx].param_mut(port)?.slot = PortSlot::Literal(value);
            }
        }
        Ok(())
    }

    /// Set an output port's value, propagating through an attached link
    pub fn set_output(&mut self, node: &str, port: &str, value: Value) -> Result<()> {
        let idx = self.node_index(node)?;
        let link = self.nodes[idx].output(port)?.link_id().map(str::to_string);
        match link {
            Some(id) => {
                let li = self.link_index(&id)?;
                self.links[li].transit = value;
            }
            None => {
                self.nodes[idx].output_mut(port)?.slot = PortSlot::Literal(value);
            }
        }
        Ok(())
    }

    fn slot_value(&self, slot: &PortSlot) -> Result<Value> {
        match slot {
            PortSlot::Empty => Ok(Value::Null),
            PortSlot::Literal(v) => Ok(v.clone()),
            PortSlot::Linked(id) => Ok(self.link(id)?.transit.clone()),
        }
    }

    /// Replace the advisory accepted kinds on a port (input or output)
    pub fn set_accepts(&mut self, node: &str, port: &str, kinds: Vec<ValueKind>) -> Result<()> {
        let idx = self.node_index(node)?;
        let is_param = self.nodes[idx].param(port).is_ok();
        if is_param {
            self.nodes[idx].param_mut(port)?.accepts = kinds;
        } else {
            self.nodes[idx].output_mut(port)?.accepts = kinds;
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Depth assignment and execution
    // -----------------------------------------------------------------

    /// Recompute every node's dependency depth from scratch
    ///
    /// A root node (no linked input port) sits at depth 0; every consumer's
    /// depth is the longest producer chain reaching it plus one, computed
    /// by Kahn layering so producers always schedule strictly before their
    /// consumers. Fails with `CycleDetected` if the layering cannot cover
    /// all nodes.
    pub fn assign_depths(&mut self) -> Result<()> {
        let n = self.nodes.len();
        let mut index: HashMap<String, usize> = HashMap::with_capacity(n);
        for (i, node) in self.nodes.iter().enumerate() {
            index.insert(node.name().to_string(), i);
        }

        let mut edges: Vec<(usize, usize)> = Vec::with_capacity(self.links.len());
        let mut indegree = vec![0usize; n];
        for link in &self.links {
            let s = *index
                .get(&link.source.node)
                .ok_or_else(|| EngineError::NodeNotFound(link.source.node.clone()))?;
            let d = *index
                .get(&link.destination.node)
                .ok_or_else(|| EngineError::NodeNotFound(link.destination.node.clone()))?;
            edges.push((s, d));
            indegree[d] += 1;
        }

        let mut depth = vec![0usize; n];
        let mut queue: VecDeque<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
        let mut visited = 0;
        while let Some(i) = queue.pop_front() {
            visited += 1;
            for &(s, d) in &edges {
                if s == i {
                    depth[d] = depth[d].max(depth[i] + 1);
                    indegree[d] -= 1;
                    if indegree[d] == 0 {
                        queue.push_back(d);
                    }
                }
            }
        }
        if visited < n {
            return Err(EngineError::CycleDetected);
        }

        for (i, node) in self.nodes.iter_mut().enumerate() {
            node.set_depth(Some(depth[i]));
        }
        Ok(())
    }

    /// Execute one node: resolve its input values, invoke the operation,
    /// and republish the normalized outputs to its output ports
    fn execute_node(&mut self, idx: usize) -> Result<HashMap<String, Value>> {
        let name = self.nodes[idx].name().to_string();

        let mut args = HashMap::new();
        for port in self.nodes[idx].params() {
            let value = self.slot_value(&port.slot)?;
            args.insert(port.name.clone(), value);
        }

        log::debug!(
            "executing node '{}' (op '{}')",
            name,
            self.nodes[idx].op_id()
        );
        let raw = self.nodes[idx].operation().invoke(args)?;

        let output_names: Vec<String> = self.nodes[idx]
            .outputs()
            .iter()
            .map(|p| p.name.clone())
            .collect();
        let outputs = normalize_outputs(raw, &output_names);

        for port_name in &output_names {
            let value = outputs.get(port_name).cloned().unwrap_or(Value::Null);
            self.set_output(&name, port_name, value)?;
        }
        Ok(outputs)
    }

    /// Execute the whole graph once, in ascending depth order
    ///
    /// Depths are recomputed from scratch first. An operation error aborts
    /// the remainder of the run with no partial-result recovery. Returns
    /// one [`NodeRun`] per node in execution order.
    pub fn run(&mut self) -> Result<Vec<NodeRun>> {
        self.assign_depths()?;

        let mut order: Vec<usize> = (0..self.nodes.len()).collect();
        order.sort_by_key(|&i| self.nodes[i].depth().unwrap_or(0));

        log::debug!("running graph: {} nodes, {} links", self.nodes.len(), self.links.len());
        let mut results = Vec::with_capacity(order.len());
        for i in order {
            let outputs = self.execute_node(i)?;
            results.push(NodeRun {
                node: self.nodes[i].name().to_string(),
                outputs,
            });
        }
        Ok(results)
    }
}
