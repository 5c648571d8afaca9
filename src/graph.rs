use crate::{
    Edge, EdgeId, EventType, GraphError, GraphEvent, Node, NodeId, NodeTemplate, PortDirection, PortRef,
    Position, Size,
};
use std::collections::HashMap;

/// Partial update applied by [`GraphStore::update_node`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    pub name: Option<String>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
    pub position: Option<Position>,
    pub size: Option<Size>,
    pub is_disabled: Option<bool>,
}

impl NodeUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.is_disabled = Some(disabled);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply_to(&self, node: &mut Node) {
        if let Some(name) = &self.name {
            node.set_name(name.clone());
        }
        if let Some(description) = &self.description {
            node.set_description(description.clone());
        }
        if let Some(position) = self.position {
            node.set_position(position);
        }
        if let Some(size) = self.size {
            node.set_size(size);
        }
        if let Some(disabled) = self.is_disabled {
            node.set_disabled(disabled);
        }
    }
}

/// A connection that passed every check, normalised to output -> input
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPlan {
    pub source: PortRef,
    pub target: PortRef,
    /// Edge currently on the target input that the new edge will replace
    pub replaces: Option<EdgeId>,
}

/// Result of a successful [`GraphStore::add_edge`]
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectOutcome {
    pub edge_id: EdgeId,
    pub replaced: Option<Edge>,
}

/// Canonical node and edge collections for one designer session.
///
/// Nodes and edges only refer to each other by id. Every mutation either
/// applies completely (including cascades) or returns a [`GraphError`] and
/// leaves the store untouched.
#[derive(Debug, Clone)]
pub struct GraphStore {
    /// All nodes indexed by ID
    nodes: HashMap<NodeId, Node>,

    /// All edges indexed by ID
    edges: HashMap<EdgeId, Edge>,

    /// Occupied input ports -> the single edge feeding each
    inputs: HashMap<(NodeId, String), EdgeId>,

    /// Whether connecting to an occupied input evicts the existing edge
    replace_on_connect: bool,

    /// Bumped once per committed mutation
    revision: u64,

    /// Change log, drained by the session
    events: Vec<GraphEvent>,
}

impl GraphStore {
    /// Create a new empty graph (replace-on-connect enabled)
    pub fn new() -> Self {
        Self::with_replace_on_connect(true)
    }

    pub fn with_replace_on_connect(replace_on_connect: bool) -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            inputs: HashMap::new(),
            replace_on_connect,
            revision: 0,
            events: Vec::new(),
        }
    }

    pub fn replace_on_connect(&self) -> bool {
        self.replace_on_connect
    }

    pub fn set_replace_on_connect(&mut self, enabled: bool) {
        self.replace_on_connect = enabled;
    }

    // ========== Node Operations ==========

    /// Add a fully built node
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        node.check_invariants()?;

        let id = node.id;
        let program_id = node.program_id.clone();
        self.nodes.insert(id, node);
        self.commit(EventType::NodeAdded { id, program_id });

        Ok(id)
    }

    /// Instantiate a catalog template at a drop position
    pub fn add_node_from_template(
        &mut self,
        template: &NodeTemplate,
        position: Position,
    ) -> Result<NodeId, GraphError> {
        self.add_node(template.instantiate(position))
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> &HashMap<NodeId, Node> {
        &self.nodes
    }

    /// Node ids in ascending order
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<_> = self.nodes.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Apply a partial update to a node
    pub fn update_node(&mut self, id: NodeId, update: NodeUpdate) -> Result<(), GraphError> {
        let current = self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))?;

        let mut updated = current.clone();
        update.apply_to(&mut updated);
        updated.check_invariants()?;

        if updated == *current {
            return Ok(());
        }

        self.nodes.insert(id, updated);
        self.commit(EventType::NodeUpdated { id });

        Ok(())
    }

    /// Move several nodes at once. Every target is validated before any
    /// position is written.
    pub fn move_nodes(&mut self, moves: &[(NodeId, Position)]) -> Result<(), GraphError> {
        for (id, position) in moves {
            if !self.nodes.contains_key(id) {
                return Err(GraphError::NodeNotFound(*id));
            }
            if !position.is_finite() || !position.is_non_negative() {
                return Err(GraphError::InvalidGeometry {
                    node_id: *id,
                    reason: format!("position ({}, {}) must be finite and non-negative", position.x, position.y),
                });
            }
        }

        let mut moved = Vec::with_capacity(moves.len());
        for (id, position) in moves {
            if let Some(node) = self.nodes.get_mut(id) {
                if node.position != *position {
                    node.set_position(*position);
                    moved.push(*id);
                }
            }
        }

        if !moved.is_empty() {
            self.commit(EventType::NodesMoved { ids: moved });
        }

        Ok(())
    }

    /// Delete a node and every edge touching it
    pub fn remove_node(&mut self, id: NodeId) -> Result<(Node, Vec<Edge>), GraphError> {
        if !self.nodes.contains_key(&id) {
            return Err(GraphError::NodeNotFound(id));
        }

        // Remove all edges involving this node
        let mut doomed: Vec<EdgeId> = self
            .edges
            .values()
            .filter(|edge| edge.involves(id))
            .map(|edge| edge.id)
            .collect();
        doomed.sort();

        let cascaded: Vec<Edge> = doomed.iter().filter_map(|edge_id| self.detach_edge(*edge_id)).collect();

        let node = self.nodes.remove(&id).ok_or(GraphError::NodeNotFound(id))?;
        self.commit(EventType::NodeRemoved {
            id,
            cascaded_edges: doomed,
        });

        Ok((node, cascaded))
    }

    // ========== Edge Operations ==========

    /// Check whether two ports can be connected, without mutating anything.
    ///
    /// The ports may be given in either order; the plan is normalised to
    /// output -> input.
    pub fn check_connection(&self, a: &PortRef, b: &PortRef) -> Result<ConnectionPlan, GraphError> {
        let node_a = self.nodes.get(&a.node_id).ok_or(GraphError::NodeNotFound(a.node_id))?;
        let node_b = self.nodes.get(&b.node_id).ok_or(GraphError::NodeNotFound(b.node_id))?;

        let port_a = node_a.port(a.direction, &a.name).ok_or_else(|| port_not_found(a))?;
        let port_b = node_b.port(b.direction, &b.name).ok_or_else(|| port_not_found(b))?;

        if a.node_id == b.node_id {
            return Err(GraphError::SelfConnection(a.node_id));
        }
        if a.direction == b.direction {
            return Err(GraphError::SameDirection(a.direction));
        }

        let (source, source_port, target, target_port) = match a.direction {
            PortDirection::Output => (a, port_a, b, port_b),
            PortDirection::Input => (b, port_b, a, port_a),
        };

        let occupant = self.inputs.get(&(target.node_id, target.name.clone())).copied();

        if let Some(edge) = occupant.and_then(|edge_id| self.edges.get(&edge_id)) {
            if edge.source_node_id == source.node_id && edge.source_output_name == source.name {
                return Err(GraphError::AlreadyConnected {
                    source_node: source.node_id,
                    output: source.name.clone(),
                    target_node: target.node_id,
                    input: target.name.clone(),
                });
            }
        }

        if !source_port.data_type.is_compatible_with(&target_port.data_type) {
            return Err(GraphError::IncompatibleTypes {
                source_type: source_port.data_type.clone(),
                target_type: target_port.data_type.clone(),
            });
        }

        if let Some(edge_id) = occupant {
            if !self.replace_on_connect {
                return Err(GraphError::InputOccupied {
                    node_id: target.node_id,
                    input: target.name.clone(),
                    edge_id,
                });
            }
        }

        Ok(ConnectionPlan {
            source: source.clone(),
            target: target.clone(),
            replaces: occupant,
        })
    }

    /// Connect two ports. When replace-on-connect is on, an edge already on
    /// the target input is removed in the same step.
    pub fn add_edge(&mut self, a: &PortRef, b: &PortRef) -> Result<ConnectOutcome, GraphError> {
        let plan = self.check_connection(a, b)?;

        let replaced = plan.replaces.and_then(|edge_id| self.detach_edge(edge_id));

        let edge = Edge::between(&plan.source, &plan.target);
        let edge_id = edge.id;
        self.attach_edge(edge);

        if let Some(old) = &replaced {
            self.events.push(GraphEvent::new(EventType::EdgeRemoved { id: old.id }));
        }
        self.commit(EventType::EdgeAdded {
            id: edge_id,
            source: plan.source,
            target: plan.target,
            replaced: replaced.as_ref().map(|e| e.id),
        });

        Ok(ConnectOutcome { edge_id, replaced })
    }

    /// Get an edge by ID
    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Get all edges
    pub fn edges(&self) -> &HashMap<EdgeId, Edge> {
        &self.edges
    }

    /// Delete an edge
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<Edge, GraphError> {
        let edge = self.detach_edge(id).ok_or(GraphError::EdgeNotFound(id))?;
        self.commit(EventType::EdgeRemoved { id });
        Ok(edge)
    }

    pub fn set_edge_disabled(&mut self, id: EdgeId, disabled: bool) -> Result<(), GraphError> {
        let edge = self.edges.get_mut(&id).ok_or(GraphError::EdgeNotFound(id))?;
        if edge.is_disabled != disabled {
            edge.is_disabled = disabled;
            self.commit(EventType::EdgeUpdated { id });
        }
        Ok(())
    }

    /// Get all edges starting from a node
    pub fn outgoing_edges(&self, from: NodeId) -> Vec<&Edge> {
        self.edges.values().filter(|e| e.starts_from(from)).collect()
    }

    /// Get all edges ending at a node
    pub fn incoming_edges(&self, to: NodeId) -> Vec<&Edge> {
        self.edges.values().filter(|e| e.ends_at(to)).collect()
    }

    /// The edge feeding a given input, if any
    pub fn edge_at_input(&self, node_id: NodeId, input: &str) -> Option<&Edge> {
        self.inputs
            .get(&(node_id, input.to_string()))
            .and_then(|id| self.edges.get(id))
    }

    /// Derived `isConnected` flag of a port
    pub fn is_port_connected(&self, port: &PortRef) -> bool {
        match port.direction {
            PortDirection::Input => self.inputs.contains_key(&(port.node_id, port.name.clone())),
            PortDirection::Output => self
                .edges
                .values()
                .any(|e| e.source_node_id == port.node_id && e.source_output_name == port.name),
        }
    }

    // ========== Internal edge bookkeeping ==========

    fn attach_edge(&mut self, edge: Edge) {
        self.inputs
            .insert((edge.target_node_id, edge.target_input_name.clone()), edge.id);
        self.edges.insert(edge.id, edge);
    }

    fn detach_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(&id)?;
        let key = (edge.target_node_id, edge.target_input_name.clone());
        if self.inputs.get(&key) == Some(&id) {
            self.inputs.remove(&key);
        }
        Some(edge)
    }

    /// Insert an edge loaded from a snapshot, enforcing referential integrity
    /// but not type compatibility (mismatches are reported by the validator).
    pub(crate) fn insert_loaded_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        if self.edges.contains_key(&edge.id) {
            return Err(GraphError::DuplicateEdge(edge.id));
        }
        for node_id in [edge.source_node_id, edge.target_node_id] {
            if !self.nodes.contains_key(&node_id) {
                return Err(GraphError::DanglingEdge {
                    edge_id: edge.id,
                    node_id,
                });
            }
        }
        if edge.source_node_id == edge.target_node_id {
            return Err(GraphError::SelfConnection(edge.source_node_id));
        }
        for port in [edge.source_ref(), edge.target_ref()] {
            let exists = self
                .nodes
                .get(&port.node_id)
                .and_then(|node| node.port(port.direction, &port.name))
                .is_some();
            if !exists {
                return Err(port_not_found(&port));
            }
        }
        if let Some(existing) = self.edge_at_input(edge.target_node_id, &edge.target_input_name) {
            return Err(GraphError::InputOccupied {
                node_id: edge.target_node_id,
                input: edge.target_input_name.clone(),
                edge_id: existing.id,
            });
        }

        self.attach_edge(edge);
        Ok(())
    }

    /// Take over the contents of `other`, keeping this store's revision
    /// counter moving forward
    pub(crate) fn replace_with(&mut self, other: GraphStore) {
        let revision = self.revision.max(other.revision);
        *self = other;
        self.revision = revision + 1;
    }

    // ========== Event Logging ==========

    fn commit(&mut self, event: EventType) {
        self.revision += 1;
        self.events.push(GraphEvent::new(event));
    }

    pub(crate) fn log_event(&mut self, event: EventType) {
        self.events.push(GraphEvent::new(event));
    }

    /// Get all events
    pub fn events(&self) -> &[GraphEvent] {
        &self.events
    }

    /// Take the pending events, leaving the log empty
    pub fn drain_events(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.events)
    }

    /// Clear event log
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    // ========== Utility Methods ==========

    /// Monotonic counter of committed mutations
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Count nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Count edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

fn port_not_found(port: &PortRef) -> GraphError {
    GraphError::PortNotFound {
        node_id: port.node_id,
        direction: port.direction,
        name: port.name.clone(),
    }
}
