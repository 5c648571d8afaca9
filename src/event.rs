use crate::{EdgeId, NodeId, PortRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A graph event with timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEvent {
    pub timestamp: DateTime<Utc>,
    pub event: EventType,
}

impl GraphEvent {
    /// Create a new event with the current timestamp
    pub fn new(event: EventType) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }

    /// Create a new event with a specific timestamp
    pub fn with_timestamp(timestamp: DateTime<Utc>, event: EventType) -> Self {
        Self { timestamp, event }
    }
}

/// Committed changes to the graph store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventType {
    NodeAdded {
        id: NodeId,
        program_id: String,
    },

    NodeUpdated {
        id: NodeId,
    },

    NodesMoved {
        ids: Vec<NodeId>,
    },

    NodeRemoved {
        id: NodeId,
        /// Edges deleted along with the node
        cascaded_edges: Vec<EdgeId>,
    },

    EdgeAdded {
        id: EdgeId,
        source: PortRef,
        target: PortRef,
        /// Edge evicted from the target input, if any
        replaced: Option<EdgeId>,
    },

    EdgeUpdated {
        id: EdgeId,
    },

    EdgeRemoved {
        id: EdgeId,
    },

    SnapshotImported {
        nodes: usize,
        edges: usize,
    },
}
