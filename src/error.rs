use crate::{DataType, EdgeId, NodeId, PortDirection, WorkflowId};
use thiserror::Error;

/// Rejections raised at the graph store boundary.
///
/// Whenever one of these is returned the store is left exactly as it was
/// before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),

    #[error("A node with id {0} already exists in this graph")]
    DuplicateNode(NodeId),

    #[error("An edge with id {0} already exists in this graph")]
    DuplicateEdge(EdgeId),

    #[error("Node {node_id} declares the {direction} port '{name}' more than once")]
    DuplicatePort {
        node_id: NodeId,
        direction: PortDirection,
        name: String,
    },

    #[error("Node {node_id} has no {direction} port named '{name}'")]
    PortNotFound {
        node_id: NodeId,
        direction: PortDirection,
        name: String,
    },

    #[error("Cannot connect node {0} to itself")]
    SelfConnection(NodeId),

    #[error("Cannot connect two {0} ports")]
    SameDirection(PortDirection),

    #[error("Output '{output}' of {source_node} is already connected to input '{input}' of {target_node}")]
    AlreadyConnected {
        source_node: NodeId,
        output: String,
        target_node: NodeId,
        input: String,
    },

    #[error("Incompatible data types: output produces '{source_type}', input expects '{target_type}'")]
    IncompatibleTypes {
        source_type: DataType,
        target_type: DataType,
    },

    #[error("Input '{input}' of node {node_id} is already fed by edge {edge_id}")]
    InputOccupied {
        node_id: NodeId,
        input: String,
        edge_id: EdgeId,
    },

    #[error("Invalid geometry for node {node_id}: {reason}")]
    InvalidGeometry { node_id: NodeId, reason: String },

    #[error("Edge {edge_id} references missing node {node_id}")]
    DanglingEdge { edge_id: EdgeId, node_id: NodeId },
}

/// Failures surfaced by a [`DesignerSession`](crate::DesignerSession).
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("A save is already in progress")]
    SaveInProgress,

    #[error("A load is in progress; saving now would overwrite the stored workflow")]
    LoadInProgress,

    #[error("Result belongs to a superseded designer session and was discarded")]
    StaleResult,

    #[error("The designer session has been closed")]
    Closed,

    #[error("The node template catalog is not available")]
    CatalogUnavailable,

    #[error("Unknown node template: {0}")]
    TemplateNotFound(String),

    #[error("Failed to load workflow {workflow_id}")]
    Load {
        workflow_id: WorkflowId,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to save workflow {workflow_id}")]
    Save {
        workflow_id: WorkflowId,
        #[source]
        source: anyhow::Error,
    },
}
