use crate::{GraphStore, NodeId};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-node run status as reported by the execution monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NodeRunStatus {
    Queued,
    Running,
    Succeeded,
    Failed { message: String },
    Skipped,
}

impl NodeRunStatus {
    /// The node will not change status again in this run
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            NodeRunStatus::Succeeded | NodeRunStatus::Failed { .. } | NodeRunStatus::Skipped
        )
    }
}

/// One message from the monitor channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatusUpdate {
    pub node_id: NodeId,
    #[serde(flatten)]
    pub status: NodeRunStatus,
}

/// Latest run status per node, used to drive highlight state.
///
/// The channel that produces the updates owns ordering and reconnection;
/// this only keeps the most recent status it was given.
#[derive(Debug, Clone, Default)]
pub struct ExecutionOverlay {
    statuses: HashMap<NodeId, NodeRunStatus>,
}

impl ExecutionOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a status. Updates for nodes not in the graph are ignored;
    /// returns whether the update was applied.
    pub fn apply(&mut self, graph: &GraphStore, node_id: NodeId, status: NodeRunStatus) -> bool {
        if graph.get_node(node_id).is_none() {
            debug!("Ignoring run status for unknown node {}", node_id);
            return false;
        }
        self.statuses.insert(node_id, status);
        true
    }

    pub fn status(&self, node_id: NodeId) -> Option<&NodeRunStatus> {
        self.statuses.get(&node_id)
    }

    pub fn clear(&mut self) {
        self.statuses.clear();
    }

    /// Forget nodes that were deleted
    pub fn retain_existing(&mut self, graph: &GraphStore) {
        self.statuses.retain(|id, _| graph.get_node(*id).is_some());
    }

    pub fn failed_nodes(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .statuses
            .iter()
            .filter(|(_, status)| matches!(status, NodeRunStatus::Failed { .. }))
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}
