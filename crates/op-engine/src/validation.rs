//! Advisory graph validation
//!
//! The engine never enforces value kinds at execution time; this pass
//! lets callers check a wired graph before running it. All issues are
//! collected, not just the first.

use crate::graph::Graph;
use crate::types::PortSlot;

/// Advisory issue found in a wired graph
#[derive(Debug, Clone)]
pub enum ValidationIssue {
    /// A link connects ports whose accepted kinds share nothing compatible
    IncompatibleLinkKinds {
        link_id: String,
        source: String,
        destination: String,
    },
    /// An input port is neither linked nor holding a literal
    UnsetInput { node: String, port: String },
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IncompatibleLinkKinds {
                link_id,
                source,
                destination,
            } => {
                write!(
                    f,
                    "link '{}' connects incompatible kinds: {} -> {}",
                    link_id, source, destination
                )
            }
            Self::UnsetInput { node, port } => {
                write!(f, "input '{}' on node '{}' has no value and no link", port, node)
            }
        }
    }
}

impl std::error::Error for ValidationIssue {}

/// Validate a wired graph
///
/// Returns all advisory issues found.
pub fn validate(graph: &Graph) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    check_link_kinds(graph, &mut issues);
    check_unset_inputs(graph, &mut issues);

    issues
}

/// Check that each link's endpoint ports share at least one compatible kind
fn check_link_kinds(graph: &Graph, issues: &mut Vec<ValidationIssue>) {
    for link in graph.links() {
        let source = graph
            .node(&link.source.node)
            .and_then(|n| n.output(&link.source.port));
        let dest = graph
            .node(&link.destination.node)
            .and_then(|n| n.param(&link.destination.port));
        let (Ok(source), Ok(dest)) = (source, dest) else {
            continue;
        };

        let compatible = source.accepts.iter().any(|s| {
            dest.accepts.iter().any(|d| s.is_compatible_with(d))
        });
        if !compatible {
            issues.push(ValidationIssue::IncompatibleLinkKinds {
                link_id: link.id.clone(),
                source: format!("{}.{}", link.source.node, link.source.port),
                destination: format!("{}.{}", link.destination.node, link.destination.port),
            });
        }
    }
}

/// Check that every input port holds a literal or a link
fn check_unset_inputs(graph: &Graph, issues: &mut Vec<ValidationIssue>) {
    for node in graph.nodes() {
        for port in node.params() {
            if matches!(port.slot, PortSlot::Empty) {
                issues.push(ValidationIssue::UnsetInput {
                    node: node.name().to_string(),
                    port: port.name.clone(),
                });
            }
        }
    }
}
