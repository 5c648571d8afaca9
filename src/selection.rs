use crate::{EdgeId, GraphStore, NodeId, Position, Rectangle};
use std::collections::HashSet;

/// Selected nodes and edges. Flat, order-independent sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    nodes: HashSet<NodeId>,
    edges: HashSet<EdgeId>,
    /// Canvas-space displacement of the active selection drag
    drag_offset: Option<Position>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a node. Without `additive` it replaces the selection; with it
    /// the node is toggled.
    pub fn select_node(&mut self, id: NodeId, additive: bool) {
        if additive {
            if !self.nodes.remove(&id) {
                self.nodes.insert(id);
            }
        } else {
            self.clear();
            self.nodes.insert(id);
        }
    }

    pub fn select_edge(&mut self, id: EdgeId, additive: bool) {
        if additive {
            if !self.edges.remove(&id) {
                self.edges.insert(id);
            }
        } else {
            self.clear();
            self.edges.insert(id);
        }
    }

    /// Select every node whose bounds intersect `rect` (canvas space)
    pub fn select_nodes_in(&mut self, rect: &Rectangle, graph: &GraphStore, additive: bool) {
        if !additive {
            self.clear();
        }
        self.nodes.extend(
            graph
                .nodes()
                .values()
                .filter(|node| node.bounds().intersects(rect))
                .map(|node| node.id),
        );
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.drag_offset = None;
    }

    /// Drop ids that no longer exist in the graph
    pub fn retain_existing(&mut self, graph: &GraphStore) {
        self.nodes.retain(|id| graph.get_node(*id).is_some());
        self.edges.retain(|id| graph.get_edge(*id).is_some());
    }

    pub fn is_node_selected(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    pub fn is_edge_selected(&self, id: EdgeId) -> bool {
        self.edges.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<_> = self.nodes.iter().copied().collect();
        ids.sort();
        ids
    }

    pub fn edge_ids(&self) -> Vec<EdgeId> {
        let mut ids: Vec<_> = self.edges.iter().copied().collect();
        ids.sort();
        ids
    }

    pub fn drag_offset(&self) -> Option<Position> {
        self.drag_offset
    }

    pub fn set_drag_offset(&mut self, offset: Position) {
        self.drag_offset = Some(offset);
    }

    pub fn clear_drag_offset(&mut self) {
        self.drag_offset = None;
    }
}
