// Workflow Designer - Core Library

pub mod config;
pub mod edge;
pub mod error;
pub mod event;
pub mod execution;
pub mod geometry;
pub mod graph;
mod id_generator;
pub mod interaction;
pub mod node;
pub mod persistence;
pub mod selection;
pub mod serialization;
pub mod session;
pub mod template;
pub mod validation;
pub mod viewport;

// Re-export main types for convenience
pub use config::DesignerConfig;
pub use edge::{Edge, EdgeId, EdgeType};
pub use error::{GraphError, SessionError};
pub use event::{EventType, GraphEvent};
pub use execution::{ExecutionOverlay, NodeRunStatus, NodeStatusUpdate};
pub use geometry::{
    bounding_box_of, connection_point_world_position, edge_path, edge_path_with, EdgePathCache,
    EdgeStyle, PathSpec, Position, Rectangle, Size,
};
pub use graph::{ConnectOutcome, ConnectionPlan, GraphStore, NodeUpdate};
pub use interaction::{
    hit_test, port_position, Command, ConnectionDrag, HoverPort, InputEvent, InteractionState,
    Marquee, Modifiers, PointerTarget, SelectionDrag, Tool, Transition, TransitionContext,
};
pub use node::{ConnectionPoint, DataType, Node, NodeId, NodeType, Port, PortDirection, PortRef};
pub use persistence::{FileStore, MemoryStore, PersistenceAdapter, WorkflowId};
pub use selection::SelectionState;
pub use serialization::{GraphSnapshot, SNAPSHOT_VERSION};
pub use session::{
    ConnectionPreview, DesignerSession, LoadTicket, RenderEdge, RenderNode, RenderPort, SaveTicket,
};
pub use template::{Catalog, CatalogState, NodeTemplate, StaticCatalog, TemplateCatalog};
pub use validation::{
    ValidatedGraph, ValidationIssue, ValidationIssueType, ValidationResult, ValidationSeverity,
    Validator,
};
pub use viewport::{CanvasState, GridSettings};
