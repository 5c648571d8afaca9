//! Designer session: the thin adapter a host UI drives.
//!
//! A session owns one workflow's graph together with its viewport,
//! selection, gesture state and the latest validation result. Pointer input
//! goes in as screen coordinates; render-ready snapshots come out. All
//! methods are synchronous except the optional adapter drivers at the end.

use crate::{
    edge_path_with, hit_test, CanvasState, Catalog, CatalogState, Command, ConnectOutcome,
    ConnectionPoint, DesignerConfig, EdgeId, EdgePathCache, EdgeType, ExecutionOverlay,
    GraphError, GraphEvent, GraphSnapshot, GraphStore, HoverPort, InputEvent, InteractionState, Modifiers,
    Node, NodeId, NodeRunStatus, NodeStatusUpdate, NodeTemplate, NodeType, NodeUpdate,
    PathSpec, PersistenceAdapter, PointerTarget, PortDirection, PortRef, Position, Rectangle,
    SelectionState, SessionError, Size, TemplateCatalog, Tool, Transition, TransitionContext,
    ValidationResult, ValidationSeverity, Validator, WorkflowId,
};
use anyhow::Result;
use log::{debug, info, warn};
use std::mem;

/// Proof that a load was started in the current session generation
#[derive(Debug)]
pub struct LoadTicket {
    generation: u64,
    workflow_id: WorkflowId,
}

impl LoadTicket {
    pub fn workflow_id(&self) -> &WorkflowId {
        &self.workflow_id
    }
}

/// An outstanding save: the snapshot to write and the change events
/// committed since the previous save
#[derive(Debug)]
pub struct SaveTicket {
    generation: u64,
    workflow_id: WorkflowId,
    revision: u64,
    snapshot: GraphSnapshot,
    history: Vec<GraphEvent>,
}

impl SaveTicket {
    pub fn workflow_id(&self) -> &WorkflowId {
        &self.workflow_id
    }

    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.snapshot
    }

    pub fn history(&self) -> &[GraphEvent] {
        &self.history
    }
}

/// A port as the render layer draws it
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPort {
    pub point: ConnectionPoint,
    /// Canvas-space position, drag preview applied
    pub position: Position,
    pub is_connected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderNode {
    pub id: NodeId,
    pub name: String,
    pub node_type: NodeType,
    pub position: Position,
    pub size: Size,
    pub is_disabled: bool,
    pub is_selected: bool,
    /// Shown at a preview position that is not committed yet
    pub is_dragging: bool,
    pub severity: Option<ValidationSeverity>,
    pub run_status: Option<NodeRunStatus>,
    pub ports: Vec<RenderPort>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderEdge {
    pub id: EdgeId,
    pub edge_type: EdgeType,
    pub path: PathSpec,
    pub is_selected: bool,
    pub is_disabled: bool,
    /// Touches a selected node
    pub is_highlighted: bool,
}

/// Uncommitted edge following the pointer during a connection drag
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPreview {
    pub origin: PortRef,
    pub path: PathSpec,
    pub hover: Option<HoverPort>,
}

pub struct DesignerSession {
    workflow_id: WorkflowId,
    config: DesignerConfig,
    graph: GraphStore,
    canvas: CanvasState,
    selection: SelectionState,
    interaction: InteractionState,
    tool: Tool,
    catalog: CatalogState,
    execution: ExecutionOverlay,
    validation: ValidationResult,
    dirty: bool,
    path_cache: EdgePathCache,
    /// Committed change events not yet handed to a save
    history: Vec<GraphEvent>,
    generation: u64,
    closed: bool,
    save_in_flight: bool,
    load_in_flight: bool,
    saved_revision: u64,
}

impl DesignerSession {
    /// Start a session; fails when the configuration does not validate
    pub fn new(workflow_id: impl Into<WorkflowId>, config: DesignerConfig) -> Result<Self> {
        config.validate()?;
        let graph = GraphStore::with_replace_on_connect(config.replace_on_connect);
        let validation = Validator::validate(&graph);
        Ok(Self {
            workflow_id: workflow_id.into(),
            canvas: CanvasState::new(&config),
            tool: config.default_tool,
            path_cache: EdgePathCache::new(config.edge_style),
            saved_revision: graph.revision(),
            graph,
            selection: SelectionState::new(),
            interaction: InteractionState::Idle,
            catalog: CatalogState::Pending,
            execution: ExecutionOverlay::new(),
            validation,
            dirty: false,
            history: Vec::new(),
            generation: 0,
            closed: false,
            save_in_flight: false,
            load_in_flight: false,
            config,
        })
    }

    // ========== Accessors ==========

    pub fn workflow_id(&self) -> &WorkflowId {
        &self.workflow_id
    }

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    pub fn canvas(&self) -> &CanvasState {
        &self.canvas
    }

    /// Direct viewport control (fit-to-content, toolbar zoom buttons)
    pub fn canvas_mut(&mut self) -> &mut CanvasState {
        &mut self.canvas
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switching tools abandons any gesture in progress
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
        self.cancel_gesture();
    }

    pub fn catalog(&self) -> &CatalogState {
        &self.catalog
    }

    pub fn execution(&self) -> &ExecutionOverlay {
        &self.execution
    }

    // ========== Pointer and keyboard input ==========

    pub fn pointer_down(&mut self, screen: Position, modifiers: Modifiers) {
        let canvas = self.canvas.to_canvas(screen);
        let target = self.target_at(canvas);
        self.dispatch(InputEvent::PointerDown {
            screen,
            canvas,
            target,
            modifiers,
        });
    }

    pub fn pointer_move(&mut self, screen: Position) {
        let canvas = self.canvas.to_canvas(screen);
        let target = self.target_at(canvas);
        self.dispatch(InputEvent::PointerMove { screen, canvas, target });
    }

    pub fn pointer_up(&mut self, screen: Position) {
        let canvas = self.canvas.to_canvas(screen);
        let target = self.target_at(canvas);
        self.dispatch(InputEvent::PointerUp { screen, canvas, target });
    }

    pub fn pointer_leave(&mut self) {
        self.dispatch(InputEvent::PointerLeave);
    }

    pub fn escape(&mut self) {
        self.dispatch(InputEvent::Escape);
    }

    pub fn wheel(&mut self, screen: Position, delta: f32) {
        self.dispatch(InputEvent::Wheel { screen, delta });
    }

    /// What is under a screen point
    pub fn target_at_screen(&self, screen: Position) -> PointerTarget {
        self.target_at(self.canvas.to_canvas(screen))
    }

    fn target_at(&self, canvas: Position) -> PointerTarget {
        // Hit radii are configured in screen pixels
        let zoom = self.canvas.zoom();
        hit_test(
            &self.graph,
            canvas,
            self.config.port_hit_radius / zoom,
            self.config.edge_hit_tolerance / zoom,
            &self.config.edge_style,
        )
    }

    fn dispatch(&mut self, event: InputEvent) {
        let state = mem::take(&mut self.interaction);
        let ctx = TransitionContext {
            graph: &self.graph,
            selection: &self.selection,
            tool: self.tool,
        };
        let Transition { state, commands } = state.transition(&event, &ctx);
        self.interaction = state;

        for command in commands {
            self.apply(command);
        }

        match &self.interaction {
            InteractionState::DraggingSelection(drag) => self.selection.set_drag_offset(drag.offset()),
            _ => self.selection.clear_drag_offset(),
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::PanBy(delta) => self.canvas.pan_by(delta),
            Command::ZoomAt { screen, delta } => self.canvas.zoom_at(screen, delta),
            Command::SelectNode { id, additive } => self.selection.select_node(id, additive),
            Command::SelectEdge { id, additive } => self.selection.select_edge(id, additive),
            Command::ClearSelection => self.selection.clear(),
            Command::SelectInRect { rect, additive } => {
                self.selection.select_nodes_in(&rect, &self.graph, additive)
            }
            Command::MoveNodes(moves) => {
                let placed = self.place_group(moves);
                let revision = self.graph.revision();
                match self.graph.move_nodes(&placed) {
                    Ok(()) if self.graph.revision() != revision => self.mark_committed(),
                    Ok(()) => {}
                    Err(err) => warn!("Dropped node move: {}", err),
                }
            }
            Command::Connect { from, to } => {
                if let Err(err) = self.connect(&from, &to) {
                    debug!("Connection gesture rejected: {}", err);
                }
            }
        }
    }

    fn cancel_gesture(&mut self) {
        if !self.interaction.is_idle() {
            debug!("Gesture '{}' abandoned", self.interaction.name());
        }
        self.interaction = InteractionState::Idle;
        self.selection.clear_drag_offset();
    }

    /// Grid snap, then keep the node on the non-negative quadrant
    fn place(&self, position: Position) -> Position {
        self.canvas.snap(position).clamped_non_negative()
    }

    /// Drop placement for a dragged group. The lead (first) node snaps to
    /// the grid and every node gets the same shift, so the relative layout
    /// survives. Nodes deleted mid-drag are skipped.
    fn place_group(&self, moves: Vec<(NodeId, Position)>) -> Vec<(NodeId, Position)> {
        let moves: Vec<_> = moves
            .into_iter()
            .filter(|(id, _)| self.graph.get_node(*id).is_some())
            .collect();
        let Some(&(_, lead)) = moves.first() else {
            return moves;
        };

        let mut shift = self.canvas.snap(lead) - lead;
        let (min_x, min_y) = moves.iter().fold((f32::INFINITY, f32::INFINITY), |(x, y), (_, p)| {
            (x.min(p.x + shift.x), y.min(p.y + shift.y))
        });
        if min_x < 0.0 {
            shift.x -= min_x;
        }
        if min_y < 0.0 {
            shift.y -= min_y;
        }

        moves.into_iter().map(|(id, p)| (id, p + shift)).collect()
    }

    /// Bookkeeping after any successful graph mutation
    fn mark_committed(&mut self) {
        self.dirty = true;
        self.history.extend(self.graph.drain_events());
        self.selection.retain_existing(&self.graph);
        self.execution.retain_existing(&self.graph);
        let graph = &self.graph;
        self.path_cache.retain(|id| graph.get_edge(*id).is_some());
    }

    // ========== Editing ==========

    /// Drop a catalog template at a screen position
    pub fn add_node_from_template(&mut self, template_id: &str, screen: Position) -> Result<NodeId, SessionError> {
        let catalog = self.catalog.catalog().ok_or(SessionError::CatalogUnavailable)?;
        let template = catalog
            .get(template_id)
            .ok_or_else(|| SessionError::TemplateNotFound(template_id.to_string()))?
            .clone();

        let position = self.place(self.canvas.to_canvas(screen));
        let id = self.graph.add_node_from_template(&template, position)?;
        self.mark_committed();
        self.selection.select_node(id, false);
        Ok(id)
    }

    /// Add a fully built node (does not need the catalog)
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, SessionError> {
        let id = self.graph.add_node(node)?;
        self.mark_committed();
        Ok(id)
    }

    pub fn connect(&mut self, a: &PortRef, b: &PortRef) -> Result<ConnectOutcome, SessionError> {
        let outcome = self.graph.add_edge(a, b)?;
        if let Some(replaced) = &outcome.replaced {
            debug!("Edge {} replaced by {}", replaced.id, outcome.edge_id);
        }
        self.mark_committed();
        Ok(outcome)
    }

    pub fn delete_node(&mut self, id: NodeId) -> Result<(), SessionError> {
        self.graph.remove_node(id)?;
        self.mark_committed();
        Ok(())
    }

    pub fn delete_edge(&mut self, id: EdgeId) -> Result<(), SessionError> {
        self.graph.remove_edge(id)?;
        self.mark_committed();
        Ok(())
    }

    /// Delete every selected edge and node (node deletes cascade). Returns
    /// the number of removed nodes and edges.
    pub fn delete_selection(&mut self) -> (usize, usize) {
        let edge_count = self.graph.edge_count();
        let mut removed_nodes = 0;

        for id in self.selection.edge_ids() {
            // Already gone when an earlier delete cascaded
            let _ = self.graph.remove_edge(id);
        }
        for id in self.selection.node_ids() {
            if self.graph.remove_node(id).is_ok() {
                removed_nodes += 1;
            }
        }

        let removed_edges = edge_count - self.graph.edge_count();
        self.selection.clear();
        if removed_nodes + removed_edges > 0 {
            self.mark_committed();
        }
        (removed_nodes, removed_edges)
    }

    pub fn rename_node(&mut self, id: NodeId, name: impl Into<String>) -> Result<(), SessionError> {
        self.update_node(id, NodeUpdate::new().name(name))
    }

    /// Flip a node's disabled flag; returns the new value
    pub fn toggle_node_disabled(&mut self, id: NodeId) -> Result<bool, SessionError> {
        let disabled = !self
            .graph
            .get_node(id)
            .ok_or(GraphError::NodeNotFound(id))?
            .is_disabled;
        self.update_node(id, NodeUpdate::new().disabled(disabled))?;
        Ok(disabled)
    }

    pub fn update_node(&mut self, id: NodeId, update: NodeUpdate) -> Result<(), SessionError> {
        let revision = self.graph.revision();
        self.graph.update_node(id, update)?;
        if self.graph.revision() != revision {
            self.mark_committed();
        }
        Ok(())
    }

    pub fn set_edge_disabled(&mut self, id: EdgeId, disabled: bool) -> Result<(), SessionError> {
        let revision = self.graph.revision();
        self.graph.set_edge_disabled(id, disabled)?;
        if self.graph.revision() != revision {
            self.mark_committed();
        }
        Ok(())
    }

    // ========== Validation ==========

    /// A committed change happened since the last `revalidate`
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Re-run the validator. The host decides when (idle callback, timer).
    pub fn revalidate(&mut self) -> &ValidationResult {
        self.validation = Validator::validate(&self.graph);
        self.dirty = false;
        &self.validation
    }

    /// Latest validation result; may be stale while `is_dirty`
    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    // ========== Catalog ==========

    /// Fetch the template catalog once; later calls reuse it
    pub async fn load_catalog(&mut self, source: &dyn TemplateCatalog) -> &CatalogState {
        if self.catalog.is_ready() {
            return &self.catalog;
        }
        let result = source.fetch_templates().await;
        self.install_catalog(result)
    }

    pub fn install_catalog(&mut self, result: Result<Vec<NodeTemplate>>) -> &CatalogState {
        self.catalog = match result {
            Ok(templates) => {
                let catalog = Catalog::from_templates(templates);
                info!("Node catalog loaded with {} templates", catalog.len());
                CatalogState::Ready(catalog)
            }
            Err(err) => {
                warn!("Node catalog unavailable, adding nodes is disabled: {:#}", err);
                CatalogState::Unavailable(format!("{:#}", err))
            }
        };
        &self.catalog
    }

    // ========== Persistence ==========

    pub fn begin_load(&mut self) -> Result<LoadTicket, SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        if self.save_in_flight {
            return Err(SessionError::SaveInProgress);
        }
        self.generation += 1;
        self.load_in_flight = true;
        Ok(LoadTicket {
            generation: self.generation,
            workflow_id: self.workflow_id.clone(),
        })
    }

    /// Apply a load result. A failed load leaves an empty graph behind and
    /// reports the error; a result from a superseded ticket is discarded.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<GraphSnapshot>) -> Result<(), SessionError> {
        if self.closed || ticket.generation != self.generation {
            warn!("Discarding stale load of workflow {}", ticket.workflow_id);
            return Err(SessionError::StaleResult);
        }
        self.load_in_flight = false;

        let replace = self.config.replace_on_connect;
        let loaded = result.and_then(|snapshot| snapshot.into_store(replace).map_err(anyhow::Error::from));

        match loaded {
            Ok(graph) => {
                info!(
                    "Loaded workflow {} ({} nodes, {} edges)",
                    ticket.workflow_id,
                    graph.node_count(),
                    graph.edge_count()
                );
                self.reset_with(graph);
                Ok(())
            }
            Err(source) => {
                warn!("Failed to load workflow {}: {:#}", ticket.workflow_id, source);
                self.reset_with(GraphStore::with_replace_on_connect(replace));
                Err(SessionError::Load {
                    workflow_id: ticket.workflow_id,
                    source,
                })
            }
        }
    }

    fn reset_with(&mut self, graph: GraphStore) {
        self.graph.replace_with(graph);
        self.graph.clear_events();
        self.saved_revision = self.graph.revision();
        self.history.clear();
        self.cancel_gesture();
        self.selection.clear();
        self.execution.clear();
        self.path_cache.clear();
        self.canvas.reset();
        self.validation = Validator::validate(&self.graph);
        self.dirty = false;
    }

    /// Start a save. Only one save may be outstanding at a time, and none
    /// while a load is pending.
    pub fn begin_save(&mut self) -> Result<SaveTicket, SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        if self.save_in_flight {
            return Err(SessionError::SaveInProgress);
        }
        if self.load_in_flight {
            return Err(SessionError::LoadInProgress);
        }
        self.save_in_flight = true;
        Ok(SaveTicket {
            generation: self.generation,
            workflow_id: self.workflow_id.clone(),
            revision: self.graph.revision(),
            snapshot: self.graph.export_snapshot(),
            history: mem::take(&mut self.history),
        })
    }

    /// Settle a save. The graph is never touched; on failure the change
    /// events go back into the queue for the next attempt.
    pub fn finish_save(&mut self, ticket: SaveTicket, result: Result<()>) -> Result<(), SessionError> {
        if self.closed || ticket.generation != self.generation {
            warn!("Discarding stale save result for workflow {}", ticket.workflow_id);
            return Err(SessionError::StaleResult);
        }
        self.save_in_flight = false;

        match result {
            Ok(()) => {
                self.saved_revision = ticket.revision;
                info!("Saved workflow {} at revision {}", ticket.workflow_id, ticket.revision);
                Ok(())
            }
            Err(source) => {
                warn!("Failed to save workflow {}: {:#}", ticket.workflow_id, source);
                let mut history = ticket.history;
                history.append(&mut self.history);
                self.history = history;
                Err(SessionError::Save {
                    workflow_id: ticket.workflow_id,
                    source,
                })
            }
        }
    }

    /// Change events not yet recorded by a save
    pub fn pending_history(&self) -> &[GraphEvent] {
        &self.history
    }

    pub fn is_saving(&self) -> bool {
        self.save_in_flight
    }

    /// Committed changes exist that no successful save has covered
    pub fn has_unsaved_changes(&self) -> bool {
        self.graph.revision() != self.saved_revision
    }

    pub async fn load_with(&mut self, adapter: &dyn PersistenceAdapter) -> Result<(), SessionError> {
        let ticket = self.begin_load()?;
        let result = adapter.load_workflow(&ticket.workflow_id).await;
        self.finish_load(ticket, result)
    }

    /// Save the snapshot, then append the change history. History that
    /// fails to append stays queued for the next save.
    pub async fn save_with(&mut self, adapter: &dyn PersistenceAdapter) -> Result<(), SessionError> {
        let ticket = self.begin_save()?;
        let result = adapter.save_workflow(&ticket.workflow_id, &ticket.snapshot).await;

        let mut unrecorded = Vec::new();
        if result.is_ok() {
            if let Err(err) = adapter.append_history(&ticket.workflow_id, &ticket.history).await {
                warn!("Change history for {} not recorded yet: {:#}", ticket.workflow_id, err);
                unrecorded = ticket.history.clone();
            }
        }

        self.finish_save(ticket, result)?;
        if !unrecorded.is_empty() {
            unrecorded.append(&mut self.history);
            self.history = unrecorded;
        }
        Ok(())
    }

    /// End the session; in-flight load/save results will be discarded
    pub fn close(&mut self) {
        self.closed = true;
        self.generation += 1;
        self.save_in_flight = false;
        self.load_in_flight = false;
        self.cancel_gesture();
    }

    pub fn is_loading(&self) -> bool {
        self.load_in_flight
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // ========== Execution status ==========

    /// Returns false for node ids not in the graph
    pub fn apply_execution_status(&mut self, node_id: NodeId, status: NodeRunStatus) -> bool {
        self.execution.apply(&self.graph, node_id, status)
    }

    pub fn apply_status_update(&mut self, update: NodeStatusUpdate) -> bool {
        self.apply_execution_status(update.node_id, update.status)
    }

    pub fn clear_execution_status(&mut self) {
        self.execution.clear();
    }

    // ========== Render output ==========

    /// Node position including any uncommitted drag
    pub fn node_position(&self, id: NodeId) -> Option<Position> {
        self.interaction
            .preview_position(id)
            .or_else(|| self.graph.get_node(id).map(|node| node.position))
    }

    fn port_position(&self, port: &PortRef) -> Option<Position> {
        let node = self.graph.get_node(port.node_id)?;
        let point = node.connection_point(port.direction, &port.name)?;
        Some(self.node_position(node.id)? + point.offset)
    }

    pub fn render_nodes(&self) -> Vec<RenderNode> {
        let severities = self.validation.nodes_with_issues();

        self.graph
            .node_ids()
            .into_iter()
            .filter_map(|id| self.graph.get_node(id))
            .map(|node| {
                let preview = self.interaction.preview_position(node.id);
                let position = preview.unwrap_or(node.position);
                let ports = node
                    .connection_points()
                    .into_iter()
                    .map(|point| RenderPort {
                        position: position + point.offset,
                        is_connected: self.graph.is_port_connected(&point.port_ref()),
                        point,
                    })
                    .collect();

                RenderNode {
                    id: node.id,
                    name: node.name.clone(),
                    node_type: node.node_type,
                    position,
                    size: node.size,
                    is_disabled: node.is_disabled,
                    is_selected: self.selection.is_node_selected(node.id),
                    is_dragging: preview.is_some(),
                    severity: severities.get(&node.id).copied(),
                    run_status: self.execution.status(node.id).cloned(),
                    ports,
                }
            })
            .collect()
    }

    /// Edge paths for the current frame; unchanged edges come from the cache
    pub fn render_edges(&mut self) -> Vec<RenderEdge> {
        let mut edges: Vec<_> = self.graph.edges().values().cloned().collect();
        edges.sort_by_key(|e| e.id);

        let mut rendered = Vec::with_capacity(edges.len());
        for edge in edges {
            let (Some(source), Some(target)) = (
                self.port_position(&edge.source_ref()),
                self.port_position(&edge.target_ref()),
            ) else {
                continue;
            };

            rendered.push(RenderEdge {
                id: edge.id,
                edge_type: edge.edge_type,
                path: self.path_cache.get_or_compute(edge.id, source, target),
                is_selected: self.selection.is_edge_selected(edge.id),
                is_disabled: edge.is_disabled,
                is_highlighted: self.selection.is_node_selected(edge.source_node_id)
                    || self.selection.is_node_selected(edge.target_node_id),
            });
        }
        rendered
    }

    pub fn connection_preview(&self) -> Option<ConnectionPreview> {
        let InteractionState::DraggingConnection(drag) = &self.interaction else {
            return None;
        };

        let anchor = self.port_position(&drag.origin)?;
        let free_end = match &drag.hover {
            Some(hover) if hover.compatible => self.port_position(&hover.port).unwrap_or(drag.pointer),
            _ => drag.pointer,
        };

        let style = &self.config.edge_style;
        let path = match drag.origin.direction {
            PortDirection::Output => edge_path_with(style, anchor, free_end),
            PortDirection::Input => edge_path_with(style, free_end, anchor),
        };

        Some(ConnectionPreview {
            origin: drag.origin.clone(),
            path,
            hover: drag.hover.clone(),
        })
    }

    /// Canvas-space marquee while box-selecting
    pub fn marquee_rect(&self) -> Option<Rectangle> {
        match &self.interaction {
            InteractionState::MarqueeSelecting(marquee) => Some(marquee.rect()),
            _ => None,
        }
    }
}
