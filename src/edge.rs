use crate::{NodeId, PortRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub Ulid);

impl EdgeId {
    pub fn new() -> Self {
        Self(crate::id_generator::next_ulid())
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// Carries a value from an output to an input
    #[default]
    Data,
    /// Ordering only; the target waits for the source to finish
    Control,
}

/// Directed connection from one node's output port to another node's input
/// port (data flows FROM source TO target)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Edge {
    pub id: EdgeId,
    pub source_node_id: NodeId,
    pub source_output_name: String,
    pub target_node_id: NodeId,
    pub target_input_name: String,
    #[serde(default)]
    pub edge_type: EdgeType,
    #[serde(default)]
    pub is_disabled: bool,
}

impl Edge {
    /// Create a new data edge between two ports
    pub fn new(
        source_node_id: NodeId,
        source_output_name: impl Into<String>,
        target_node_id: NodeId,
        target_input_name: impl Into<String>,
    ) -> Self {
        Self {
            id: EdgeId::new(),
            source_node_id,
            source_output_name: source_output_name.into(),
            target_node_id,
            target_input_name: target_input_name.into(),
            edge_type: EdgeType::Data,
            is_disabled: false,
        }
    }

    /// Build an edge from an (output, input) pair of port references
    pub fn between(source: &PortRef, target: &PortRef) -> Self {
        Self::new(source.node_id, source.name.clone(), target.node_id, target.name.clone())
    }

    pub fn with_edge_type(mut self, edge_type: EdgeType) -> Self {
        self.edge_type = edge_type;
        self
    }

    /// Check if this edge involves a given node
    pub fn involves(&self, node_id: NodeId) -> bool {
        self.source_node_id == node_id || self.target_node_id == node_id
    }

    /// Check if this edge starts from a given node
    pub fn starts_from(&self, node_id: NodeId) -> bool {
        self.source_node_id == node_id
    }

    /// Check if this edge ends at a given node
    pub fn ends_at(&self, node_id: NodeId) -> bool {
        self.target_node_id == node_id
    }

    pub fn source_ref(&self) -> PortRef {
        PortRef::output(self.source_node_id, self.source_output_name.clone())
    }

    pub fn target_ref(&self) -> PortRef {
        PortRef::input(self.target_node_id, self.target_input_name.clone())
    }

    /// Same endpoints (ignores id, type and disabled flag)
    pub fn same_endpoints(&self, other: &Edge) -> bool {
        self.source_node_id == other.source_node_id
            && self.source_output_name == other.source_output_name
            && self.target_node_id == other.target_node_id
            && self.target_input_name == other.target_input_name
    }
}
