//! Pointer and keyboard gesture handling.
//!
//! [`InteractionState`] is a tagged union with a pure
//! [`transition`](InteractionState::transition) function: it reads the graph
//! and selection, and answers with the next state plus the [`Command`]s the
//! caller should apply. Nothing here mutates the graph, so a cancelled
//! gesture leaves no trace by construction.

use crate::{
    edge_path_with, EdgeId, EdgeStyle, GraphStore, NodeId, PortRef, Position, Rectangle,
    SelectionState,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Active canvas tool; decides what a drag on empty canvas does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    Select,
    Pan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        alt: false,
        ctrl: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }
}

/// What is under the pointer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    Canvas,
    Node(NodeId),
    Edge(EdgeId),
    Port(PortRef),
}

/// Raw input, already hit-tested. `screen` is in viewport pixels, `canvas`
/// in model coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        screen: Position,
        canvas: Position,
        target: PointerTarget,
        modifiers: Modifiers,
    },
    PointerMove {
        screen: Position,
        canvas: Position,
        target: PointerTarget,
    },
    PointerUp {
        screen: Position,
        canvas: Position,
        target: PointerTarget,
    },
    /// Pointer left the canvas mid-gesture
    PointerLeave,
    Escape,
    Wheel {
        screen: Position,
        delta: f32,
    },
}

/// Nodes being moved together, each keeping its offset to the anchor
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionDrag {
    /// The pressed node; grid snapping follows it
    pub lead: NodeId,
    pub anchor: Position,
    pub current: Position,
    /// Committed positions at drag start
    pub origins: BTreeMap<NodeId, Position>,
}

impl SelectionDrag {
    /// Pointer displacement, limited so no dragged node leaves the
    /// non-negative quadrant. One offset for the whole group keeps the
    /// relative layout intact.
    pub fn offset(&self) -> Position {
        let raw = self.current - self.anchor;
        let (min_x, min_y) = self
            .origins
            .values()
            .fold((f32::INFINITY, f32::INFINITY), |(x, y), p| (x.min(p.x), y.min(p.y)));
        Position::new(raw.x.max(-min_x), raw.y.max(-min_y))
    }

    pub fn preview_position(&self, id: NodeId) -> Option<Position> {
        self.origins.get(&id).map(|origin| *origin + self.offset())
    }

    /// Target positions, lead node first
    fn moves(&self) -> Vec<(NodeId, Position)> {
        let offset = self.offset();
        let mut moves: Vec<_> = self
            .origins
            .iter()
            .map(|(id, origin)| (*id, *origin + offset))
            .collect();
        moves.sort_by_key(|(id, _)| *id != self.lead);
        moves
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverPort {
    pub port: PortRef,
    /// Dropping here would create an edge
    pub compatible: bool,
}

/// In-progress connection from a port to wherever the pointer is
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionDrag {
    pub origin: PortRef,
    pub pointer: Position,
    pub hover: Option<HoverPort>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marquee {
    pub start: Position,
    pub current: Position,
    pub additive: bool,
}

impl Marquee {
    pub fn rect(&self) -> Rectangle {
        Rectangle::from_corners(self.start, self.current)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    PanningCanvas {
        last_screen: Position,
    },
    DraggingSelection(SelectionDrag),
    DraggingConnection(ConnectionDrag),
    MarqueeSelecting(Marquee),
}

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    PanBy(Position),
    ZoomAt { screen: Position, delta: f32 },
    SelectNode { id: NodeId, additive: bool },
    SelectEdge { id: EdgeId, additive: bool },
    ClearSelection,
    SelectInRect { rect: Rectangle, additive: bool },
    /// Commit a selection drag; positions are unsnapped
    MoveNodes(Vec<(NodeId, Position)>),
    Connect { from: PortRef, to: PortRef },
}

/// Read-only view a transition may consult
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    pub graph: &'a GraphStore,
    pub selection: &'a SelectionState,
    pub tool: Tool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: InteractionState,
    pub commands: Vec<Command>,
}

impl Transition {
    fn to(state: InteractionState) -> Self {
        Self {
            state,
            commands: Vec::new(),
        }
    }

    fn with(state: InteractionState, commands: Vec<Command>) -> Self {
        Self { state, commands }
    }
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::PanningCanvas { .. } => "panning",
            InteractionState::DraggingSelection(_) => "dragging-selection",
            InteractionState::DraggingConnection(_) => "dragging-connection",
            InteractionState::MarqueeSelecting(_) => "marquee",
        }
    }

    /// Uncommitted position of a node being dragged
    pub fn preview_position(&self, id: NodeId) -> Option<Position> {
        match self {
            InteractionState::DraggingSelection(drag) => drag.preview_position(id),
            _ => None,
        }
    }

    pub fn transition(self, event: &InputEvent, ctx: &TransitionContext<'_>) -> Transition {
        match event {
            InputEvent::Wheel { screen, delta } => Transition::with(
                self,
                vec![Command::ZoomAt {
                    screen: *screen,
                    delta: *delta,
                }],
            ),

            InputEvent::Escape | InputEvent::PointerLeave => {
                if !self.is_idle() {
                    debug!("Gesture '{}' cancelled", self.name());
                }
                Transition::to(InteractionState::Idle)
            }

            InputEvent::PointerDown {
                screen,
                canvas,
                target,
                modifiers,
            } => match self {
                InteractionState::Idle => Self::press(*screen, *canvas, target, *modifiers, ctx),
                // A second button mid-gesture is ignored
                other => Transition::to(other),
            },

            InputEvent::PointerMove {
                screen,
                canvas,
                target,
            } => self.drag(*screen, *canvas, target, ctx),

            InputEvent::PointerUp {
                screen,
                canvas,
                target,
            } => self.release(*screen, *canvas, target, ctx),
        }
    }

    fn press(
        screen: Position,
        canvas: Position,
        target: &PointerTarget,
        modifiers: Modifiers,
        ctx: &TransitionContext<'_>,
    ) -> Transition {
        match target {
            PointerTarget::Port(port) => Transition::to(InteractionState::DraggingConnection(ConnectionDrag {
                origin: port.clone(),
                pointer: canvas,
                hover: None,
            })),

            PointerTarget::Node(id) => {
                let id = *id;
                let selected = ctx.selection.is_node_selected(id);

                if modifiers.shift && selected {
                    return Transition::with(
                        InteractionState::Idle,
                        vec![Command::SelectNode { id, additive: true }],
                    );
                }

                let mut commands = Vec::new();
                let dragged: Vec<NodeId> = if selected {
                    ctx.selection.node_ids()
                } else if modifiers.shift {
                    commands.push(Command::SelectNode { id, additive: true });
                    let mut ids = ctx.selection.node_ids();
                    ids.push(id);
                    ids
                } else {
                    commands.push(Command::SelectNode { id, additive: false });
                    vec![id]
                };

                let origins = dragged
                    .into_iter()
                    .filter_map(|id| ctx.graph.get_node(id).map(|node| (id, node.position)))
                    .collect();

                Transition::with(
                    InteractionState::DraggingSelection(SelectionDrag {
                        lead: id,
                        anchor: canvas,
                        current: canvas,
                        origins,
                    }),
                    commands,
                )
            }

            PointerTarget::Edge(id) => Transition::with(
                InteractionState::Idle,
                vec![Command::SelectEdge {
                    id: *id,
                    additive: modifiers.shift,
                }],
            ),

            PointerTarget::Canvas => {
                let marquee = match ctx.tool {
                    Tool::Select => !modifiers.alt,
                    Tool::Pan => modifiers.shift,
                };

                if marquee {
                    let additive = modifiers.ctrl || (ctx.tool == Tool::Select && modifiers.shift);
                    Transition::to(InteractionState::MarqueeSelecting(Marquee {
                        start: canvas,
                        current: canvas,
                        additive,
                    }))
                } else {
                    Transition::to(InteractionState::PanningCanvas { last_screen: screen })
                }
            }
        }
    }

    fn drag(
        self,
        screen: Position,
        canvas: Position,
        target: &PointerTarget,
        ctx: &TransitionContext<'_>,
    ) -> Transition {
        match self {
            InteractionState::Idle => Transition::to(InteractionState::Idle),

            InteractionState::PanningCanvas { last_screen } => Transition::with(
                InteractionState::PanningCanvas { last_screen: screen },
                vec![Command::PanBy(screen - last_screen)],
            ),

            InteractionState::DraggingSelection(mut drag) => {
                drag.current = canvas;
                Transition::to(InteractionState::DraggingSelection(drag))
            }

            InteractionState::DraggingConnection(mut drag) => {
                drag.pointer = canvas;
                drag.hover = match target {
                    PointerTarget::Port(port) if *port != drag.origin => Some(HoverPort {
                        port: port.clone(),
                        compatible: ctx.graph.check_connection(&drag.origin, port).is_ok(),
                    }),
                    _ => None,
                };
                Transition::to(InteractionState::DraggingConnection(drag))
            }

            InteractionState::MarqueeSelecting(mut marquee) => {
                marquee.current = canvas;
                Transition::to(InteractionState::MarqueeSelecting(marquee))
            }
        }
    }

    fn release(
        self,
        screen: Position,
        canvas: Position,
        target: &PointerTarget,
        ctx: &TransitionContext<'_>,
    ) -> Transition {
        let commands = match self {
            InteractionState::Idle => Vec::new(),

            InteractionState::PanningCanvas { last_screen } => {
                let delta = screen - last_screen;
                if delta == Position::ORIGIN {
                    Vec::new()
                } else {
                    vec![Command::PanBy(delta)]
                }
            }

            InteractionState::DraggingSelection(mut drag) => {
                drag.current = canvas;
                if drag.offset() == Position::ORIGIN || drag.origins.is_empty() {
                    Vec::new()
                } else {
                    vec![Command::MoveNodes(drag.moves())]
                }
            }

            InteractionState::DraggingConnection(drag) => match target {
                PointerTarget::Port(port) => match ctx.graph.check_connection(&drag.origin, port) {
                    Ok(_) => vec![Command::Connect {
                        from: drag.origin,
                        to: port.clone(),
                    }],
                    Err(reason) => {
                        debug!("Connection from {} to {} dropped: {}", drag.origin, port, reason);
                        Vec::new()
                    }
                },
                _ => {
                    debug!("Connection from {} released over no port", drag.origin);
                    Vec::new()
                }
            },

            InteractionState::MarqueeSelecting(mut marquee) => {
                marquee.current = canvas;
                let rect = marquee.rect();
                if rect.width == 0.0 && rect.height == 0.0 {
                    // Plain click on empty canvas
                    if marquee.additive {
                        Vec::new()
                    } else {
                        vec![Command::ClearSelection]
                    }
                } else {
                    vec![Command::SelectInRect {
                        rect,
                        additive: marquee.additive,
                    }]
                }
            }
        };

        Transition::with(InteractionState::Idle, commands)
    }
}

/// Resolve a canvas point to what is under it.
///
/// Ports win over node bodies, node bodies over edges. Among overlapping
/// nodes the later-created (higher id) one is on top. `port_radius` and
/// `edge_tolerance` are in canvas units.
pub fn hit_test(
    graph: &GraphStore,
    point: Position,
    port_radius: f32,
    edge_tolerance: f32,
    style: &EdgeStyle,
) -> PointerTarget {
    let mut nodes: Vec<_> = graph.nodes().values().collect();
    nodes.sort_by(|a, b| b.id.cmp(&a.id));

    for node in &nodes {
        for point_on_node in node.connection_points() {
            let at = node.position + point_on_node.offset;
            if at.distance_to(point) <= port_radius {
                return PointerTarget::Port(point_on_node.port_ref());
            }
        }
    }

    if let Some(node) = nodes.iter().find(|node| node.bounds().contains_point(point)) {
        return PointerTarget::Node(node.id);
    }

    let mut best: Option<(f32, EdgeId)> = None;
    for edge in graph.edges().values() {
        let (Some(source), Some(target)) = (
            port_position(graph, &edge.source_ref()),
            port_position(graph, &edge.target_ref()),
        ) else {
            continue;
        };

        let distance = edge_path_with(style, source, target).distance_to(point);
        if distance > edge_tolerance {
            continue;
        }
        let closer = match best {
            None => true,
            Some((d, id)) => distance < d || (distance == d && edge.id > id),
        };
        if closer {
            best = Some((distance, edge.id));
        }
    }

    match best {
        Some((_, id)) => PointerTarget::Edge(id),
        None => PointerTarget::Canvas,
    }
}

/// Committed canvas position of a port
pub fn port_position(graph: &GraphStore, port: &PortRef) -> Option<Position> {
    let node = graph.get_node(port.node_id)?;
    let point = node.connection_point(port.direction, &port.name)?;
    Some(node.position + point.offset)
}
