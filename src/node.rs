use crate::{GraphError, Position, Rectangle, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use ulid::Ulid;

/// Unique identifier of a node (sortable, timestamp-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub Ulid);

impl NodeId {
    pub fn new() -> Self {
        Self(crate::id_generator::next_ulid())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role of a node in the workflow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    #[default]
    Program,
    Start,
    End,
}

/// Data type carried by a port, as named by the program registry.
///
/// `any` is a wildcard that matches every other type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataType(String);

impl DataType {
    pub const ANY: &'static str = "any";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn any() -> Self {
        Self(Self::ANY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_any(&self) -> bool {
        self.0.eq_ignore_ascii_case(Self::ANY)
    }

    /// Exact match, or either side is the wildcard
    pub fn is_compatible_with(&self, target: &DataType) -> bool {
        self.is_any() || target.is_any() || self == target
    }
}

impl From<&str> for DataType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PortDirection {
    Input,
    Output,
}

impl PortDirection {
    pub fn opposite(self) -> Self {
        match self {
            PortDirection::Input => PortDirection::Output,
            PortDirection::Output => PortDirection::Input,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            PortDirection::Input => "in",
            PortDirection::Output => "out",
        }
    }
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortDirection::Input => f.write_str("input"),
            PortDirection::Output => f.write_str("output"),
        }
    }
}

/// Declaration of a single input or output port
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Port {
    pub name: String,
    pub data_type: DataType,
    /// Whether the program cannot run without this input
    #[serde(default)]
    pub required: bool,
}

impl Port {
    /// Create a new required port
    pub fn required(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            required: true,
        }
    }

    /// Create a new optional port
    pub fn optional(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            required: false,
        }
    }
}

/// Address of a port: owning node, direction and name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortRef {
    pub node_id: NodeId,
    pub direction: PortDirection,
    pub name: String,
}

impl PortRef {
    pub fn input(node_id: NodeId, name: impl Into<String>) -> Self {
        Self {
            node_id,
            direction: PortDirection::Input,
            name: name.into(),
        }
    }

    pub fn output(node_id: NodeId, name: impl Into<String>) -> Self {
        Self {
            node_id,
            direction: PortDirection::Output,
            name: name.into(),
        }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.node_id, self.direction.tag(), self.name)
    }
}

/// Derived, render-facing view of a port on a placed node
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPoint {
    pub id: String,
    pub node_id: NodeId,
    pub direction: PortDirection,
    pub name: String,
    pub data_type: DataType,
    pub required: bool,
    /// Offset from the node's top-left corner
    pub offset: Position,
}

impl ConnectionPoint {
    pub fn port_ref(&self) -> PortRef {
        PortRef {
            node_id: self.node_id,
            direction: self.direction,
            name: self.name.clone(),
        }
    }
}

/// One instantiated program in the workflow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Unique identifier, stable across saves
    pub id: NodeId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Catalog entry this node was created from
    pub program_id: String,

    #[serde(default)]
    pub node_type: NodeType,

    /// Top-left corner in canvas space
    pub position: Position,

    pub size: Size,

    #[serde(default)]
    pub inputs: Vec<Port>,

    #[serde(default)]
    pub outputs: Vec<Port>,

    #[serde(default)]
    pub is_disabled: bool,
}

impl Node {
    /// Create a new program node with no ports
    pub fn new(
        name: impl Into<String>,
        program_id: impl Into<String>,
        position: Position,
        size: Size,
    ) -> Self {
        Self::with_id(NodeId::new(), name, program_id, position, size)
    }

    /// Create a new node with a specific ID (useful for testing)
    pub fn with_id(
        id: NodeId,
        name: impl Into<String>,
        program_id: impl Into<String>,
        position: Position,
        size: Size,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            program_id: program_id.into(),
            node_type: NodeType::Program,
            position,
            size,
            inputs: Vec::new(),
            outputs: Vec::new(),
            is_disabled: false,
        }
    }

    pub fn with_input(mut self, port: Port) -> Self {
        self.inputs.push(port);
        self
    }

    pub fn with_output(mut self, port: Port) -> Self {
        self.outputs.push(port);
        self
    }

    pub fn with_node_type(mut self, node_type: NodeType) -> Self {
        self.node_type = node_type;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the node's display name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.is_disabled = disabled;
    }

    /// Node rectangle in canvas space
    pub fn bounds(&self) -> Rectangle {
        Rectangle::from_origin_size(self.position, self.size)
    }

    pub fn ports(&self, direction: PortDirection) -> &[Port] {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }

    pub fn port(&self, direction: PortDirection, name: &str) -> Option<&Port> {
        self.ports(direction).iter().find(|p| p.name == name)
    }

    pub fn port_ref(&self, direction: PortDirection, name: impl Into<String>) -> PortRef {
        PortRef {
            node_id: self.id,
            direction,
            name: name.into(),
        }
    }

    /// Ordered connection points: inputs first, then outputs
    pub fn connection_points(&self) -> Vec<ConnectionPoint> {
        [PortDirection::Input, PortDirection::Output]
            .into_iter()
            .flat_map(|direction| {
                let ports = self.ports(direction);
                ports
                    .iter()
                    .enumerate()
                    .map(move |(index, port)| self.point_for(direction, index, ports.len(), port))
            })
            .collect()
    }

    pub fn connection_point(&self, direction: PortDirection, name: &str) -> Option<ConnectionPoint> {
        let ports = self.ports(direction);
        ports
            .iter()
            .position(|p| p.name == name)
            .map(|index| self.point_for(direction, index, ports.len(), &ports[index]))
    }

    fn point_for(&self, direction: PortDirection, index: usize, count: usize, port: &Port) -> ConnectionPoint {
        ConnectionPoint {
            id: format!("{}:{}:{}", self.id, direction.tag(), port.name),
            node_id: self.id,
            direction,
            name: port.name.clone(),
            data_type: port.data_type.clone(),
            required: port.required,
            offset: port_offset(self.size, direction, index, count),
        }
    }

    /// Check the per-node invariants: finite non-negative geometry and
    /// unique port names per direction
    pub(crate) fn check_invariants(&self) -> Result<(), GraphError> {
        if !self.position.is_finite() || !self.position.is_non_negative() {
            return Err(GraphError::InvalidGeometry {
                node_id: self.id,
                reason: format!("position ({}, {}) must be finite and non-negative", self.position.x, self.position.y),
            });
        }
        if !self.size.is_valid() {
            return Err(GraphError::InvalidGeometry {
                node_id: self.id,
                reason: format!("size {}x{} must be finite and non-negative", self.size.width, self.size.height),
            });
        }

        for direction in [PortDirection::Input, PortDirection::Output] {
            let mut seen = HashSet::new();
            for port in self.ports(direction) {
                if !seen.insert(port.name.as_str()) {
                    return Err(GraphError::DuplicatePort {
                        node_id: self.id,
                        direction,
                        name: port.name.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Inputs on the left edge, outputs on the right, evenly spaced vertically
fn port_offset(size: Size, direction: PortDirection, index: usize, count: usize) -> Position {
    let x = match direction {
        PortDirection::Input => 0.0,
        PortDirection::Output => size.width,
    };
    let y = size.height * (index + 1) as f32 / (count + 1) as f32;
    Position::new(x, y)
}
