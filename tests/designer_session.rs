#[path = "fixtures/sample_graphs.rs"]
mod sample_graphs;

use anyhow::{anyhow, Result};
use assert_matches::assert_matches;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use sample_graphs::*;
use std::sync::atomic::{AtomicBool, Ordering};
use workflow_designer::{
    DesignerConfig, DesignerSession, GraphEvent, GraphSnapshot, MemoryStore, Modifiers,
    PersistenceAdapter, PointerTarget, PortRef, Position, SessionError, StaticCatalog, Tool,
    ValidationIssueType, WorkflowId,
};

/// Adapter whose saves always fail
struct ReadOnlyStore;

#[async_trait]
impl PersistenceAdapter for ReadOnlyStore {
    async fn load_workflow(&self, _id: &WorkflowId) -> Result<GraphSnapshot> {
        Ok(GraphSnapshot::empty())
    }

    async fn save_workflow(&self, _id: &WorkflowId, _snapshot: &GraphSnapshot) -> Result<()> {
        Err(anyhow!("store is read-only"))
    }
}

/// Memory store whose history log can be switched off
struct FlakyHistoryStore {
    inner: MemoryStore,
    history_down: AtomicBool,
}

#[async_trait]
impl PersistenceAdapter for FlakyHistoryStore {
    async fn load_workflow(&self, id: &WorkflowId) -> Result<GraphSnapshot> {
        self.inner.load_workflow(id).await
    }

    async fn save_workflow(&self, id: &WorkflowId, snapshot: &GraphSnapshot) -> Result<()> {
        self.inner.save_workflow(id, snapshot).await
    }

    async fn append_history(&self, id: &WorkflowId, events: &[GraphEvent]) -> Result<()> {
        if self.history_down.load(Ordering::SeqCst) {
            return Err(anyhow!("history log offline"));
        }
        self.inner.append_history(id, events).await
    }
}

// A is 120x60 at the origin: out0 at (120, 20), out1 at (120, 40).
// B is 120x60 at (300, 0): in0 at (300, 30).

#[test]
fn test_drag_preview_is_not_committed_until_release() {
    let (mut session, a, _) = two_node_session();
    session.revalidate();

    session.pointer_down(Position::new(10.0, 10.0), Modifiers::NONE);
    session.pointer_move(Position::new(60.0, 60.0));

    // Mid-gesture: store unchanged, preview moved, no validation pending
    assert_eq!(session.graph().get_node(a).unwrap().position, Position::new(0.0, 0.0));
    assert_eq!(session.node_position(a), Some(Position::new(50.0, 50.0)));
    assert_eq!(session.selection().drag_offset(), Some(Position::new(50.0, 50.0)));
    assert!(!session.is_dirty());

    let preview = session.render_nodes().into_iter().find(|n| n.id == a).unwrap();
    assert!(preview.is_dragging);
    assert_eq!(preview.position, Position::new(50.0, 50.0));

    session.pointer_up(Position::new(60.0, 60.0));
    assert_eq!(session.graph().get_node(a).unwrap().position, Position::new(50.0, 50.0));
    assert_eq!(session.selection().drag_offset(), None);
    assert!(session.is_dirty());
}

#[test]
fn test_escape_discards_drag() {
    let (mut session, a, _) = two_node_session();
    let before = session.graph().export_snapshot();

    session.pointer_down(Position::new(10.0, 10.0), Modifiers::NONE);
    session.pointer_move(Position::new(200.0, 200.0));
    session.escape();

    assert!(session.interaction().is_idle());
    assert_eq!(session.graph().export_snapshot(), before);
    assert_eq!(session.node_position(a), Some(Position::ORIGIN));
}

#[test]
fn test_pointer_leave_discards_connection() {
    let (mut session, _, _) = two_node_session();

    session.pointer_down(Position::new(120.0, 20.0), Modifiers::NONE);
    session.pointer_move(Position::new(250.0, 100.0));
    assert!(session.connection_preview().is_some());

    session.pointer_leave();
    assert!(session.connection_preview().is_none());
    assert_eq!(session.graph().edge_count(), 0);
}

#[test]
fn test_connection_gesture_creates_edge() {
    let (mut session, a, b) = two_node_session();

    session.pointer_down(Position::new(120.0, 20.0), Modifiers::NONE);
    session.pointer_move(Position::new(302.0, 31.0));

    let preview = session.connection_preview().unwrap();
    assert_eq!(preview.origin, PortRef::output(a, "out0"));
    assert!(preview.hover.as_ref().unwrap().compatible);
    // Snapped onto the hovered port
    assert_eq!(preview.path.end, Position::new(300.0, 30.0));

    session.pointer_up(Position::new(302.0, 31.0));
    assert_eq!(session.graph().edge_count(), 1);
    assert!(session.graph().is_port_connected(&PortRef::input(b, "in0")));

    let result = session.revalidate();
    assert_eq!(result.errors.len(), 0);
    assert_eq!(result.warnings.len(), 0);
}

#[test]
fn test_incompatible_drop_is_silent() {
    let (mut session, _, _) = two_node_session();
    session.add_node(number_sink(300.0, 200.0)).unwrap();
    let before = session.graph().export_snapshot();

    // number sink's input sits at (300, 230)
    session.pointer_down(Position::new(120.0, 20.0), Modifiers::NONE);
    session.pointer_move(Position::new(300.0, 230.0));
    assert!(!session.connection_preview().unwrap().hover.unwrap().compatible);
    session.pointer_up(Position::new(300.0, 230.0));

    assert!(session.interaction().is_idle());
    assert_eq!(session.graph().export_snapshot(), before);
}

#[test]
fn test_drop_on_empty_canvas_cancels_connection() {
    let (mut session, _, _) = two_node_session();

    session.pointer_down(Position::new(120.0, 20.0), Modifiers::NONE);
    session.pointer_up(Position::new(600.0, 600.0));
    assert_eq!(session.graph().edge_count(), 0);
}

#[test]
fn test_delete_node_scenario() {
    let (mut session, a, b) = two_node_session();
    session
        .connect(&PortRef::output(a, "out0"), &PortRef::input(b, "in0"))
        .unwrap();
    assert_eq!(session.revalidate().warnings.len(), 0);

    session.delete_node(a).unwrap();
    assert_eq!(session.graph().edge_count(), 0);
    assert!(!session.graph().is_port_connected(&PortRef::input(b, "in0")));

    let result = session.revalidate();
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].issue_type, ValidationIssueType::RequiredInputUnconnected);
    assert_eq!(result.issues_for(b).len(), 1);
}

#[test]
fn test_marquee_then_group_drag() {
    let (mut session, a, b) = two_node_session();

    session.pointer_down(Position::new(5.0, 100.0), Modifiers::NONE);
    session.pointer_move(Position::new(350.0, 10.0));
    assert!(session.marquee_rect().is_some());
    session.pointer_up(Position::new(350.0, 10.0));

    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(session.selection().node_ids(), expected);

    // Dragging B moves A too, offsets preserved
    session.pointer_down(Position::new(310.0, 10.0), Modifiers::NONE);
    session.pointer_up(Position::new(330.0, 40.0));
    assert_eq!(session.graph().get_node(a).unwrap().position, Position::new(20.0, 30.0));
    assert_eq!(session.graph().get_node(b).unwrap().position, Position::new(320.0, 30.0));
}

#[test]
fn test_shift_click_toggles_selection() {
    let (mut session, a, b) = two_node_session();

    session.pointer_down(Position::new(10.0, 10.0), Modifiers::NONE);
    session.pointer_up(Position::new(10.0, 10.0));
    session.pointer_down(Position::new(310.0, 10.0), Modifiers::shift());
    session.pointer_up(Position::new(310.0, 10.0));
    assert!(session.selection().is_node_selected(a));
    assert!(session.selection().is_node_selected(b));

    session.pointer_down(Position::new(10.0, 10.0), Modifiers::shift());
    session.pointer_up(Position::new(10.0, 10.0));
    assert!(!session.selection().is_node_selected(a));
    assert!(session.selection().is_node_selected(b));

    // Plain click on empty canvas clears
    session.pointer_down(Position::new(700.0, 700.0), Modifiers::NONE);
    session.pointer_up(Position::new(700.0, 700.0));
    assert!(session.selection().is_empty());
}

#[test]
fn test_click_edge_then_delete() {
    let (mut session, a, b) = two_node_session();
    let edge = session
        .connect(&PortRef::output(a, "out0"), &PortRef::input(b, "in0"))
        .unwrap()
        .edge_id;

    assert_eq!(session.target_at_screen(Position::new(130.0, 20.0)), PointerTarget::Edge(edge));
    session.pointer_down(Position::new(130.0, 20.0), Modifiers::NONE);
    session.pointer_up(Position::new(130.0, 20.0));
    assert!(session.selection().is_edge_selected(edge));

    assert_eq!(session.delete_selection(), (0, 1));
    assert_eq!(session.graph().edge_count(), 0);
    assert_eq!(session.graph().node_count(), 2);
}

#[test]
fn test_pan_tool_drags_viewport() {
    let (mut session, _, _) = two_node_session();
    session.revalidate();
    session.set_tool(Tool::Pan);

    session.pointer_down(Position::new(600.0, 600.0), Modifiers::NONE);
    session.pointer_move(Position::new(630.0, 610.0));
    session.pointer_up(Position::new(650.0, 620.0));

    assert_eq!(session.canvas().pan(), Position::new(50.0, 20.0));
    assert!(!session.is_dirty());
}

#[test]
fn test_hit_testing_follows_viewport() {
    let (mut session, a, _) = two_node_session();
    session.canvas_mut().set_zoom(2.0);
    session.canvas_mut().pan_by(Position::new(100.0, 0.0));

    // Canvas (10, 10) is at screen (120, 20)
    assert_eq!(session.target_at_screen(Position::new(120.0, 20.0)), PointerTarget::Node(a));
    // Canvas (120, 20) is A.out0, at screen (340, 40)
    assert_eq!(
        session.target_at_screen(Position::new(340.0, 40.0)),
        PointerTarget::Port(PortRef::output(a, "out0"))
    );
}

#[test]
fn test_render_edges_follow_preview() {
    let (mut session, a, b) = two_node_session();
    session
        .connect(&PortRef::output(a, "out0"), &PortRef::input(b, "in0"))
        .unwrap();

    let committed = session.render_edges()[0].path;
    assert_eq!(committed.start, Position::new(120.0, 20.0));

    session.pointer_down(Position::new(10.0, 10.0), Modifiers::NONE);
    session.pointer_move(Position::new(10.0, 110.0));
    let dragged = session.render_edges()[0].path;
    assert_eq!(dragged.start, Position::new(120.0, 120.0));
    assert!(session.render_edges()[0].is_highlighted);

    session.escape();
    assert_eq!(session.render_edges()[0].path, committed);
}

#[tokio::test]
async fn test_save_and_reload_through_adapter() {
    let store = MemoryStore::new();
    let (mut session, a, b) = two_node_session();
    session
        .connect(&PortRef::output(a, "out0"), &PortRef::input(b, "in0"))
        .unwrap();
    assert!(session.has_unsaved_changes());

    session.save_with(&store).await.unwrap();
    assert!(!session.has_unsaved_changes());
    assert_eq!(store.history(session.workflow_id()).await.len(), 3);

    let mut reopened = DesignerSession::new("fixture", DesignerConfig::default()).unwrap();
    reopened.load_with(&store).await.unwrap();
    assert_eq!(reopened.graph().export_snapshot(), session.graph().export_snapshot());
    assert!(!reopened.has_unsaved_changes());
    assert!(reopened.validation().is_valid());
}

#[tokio::test]
async fn test_failed_save_leaves_graph_untouched() {
    let (mut session, _, _) = two_node_session();
    let before = session.graph().export_snapshot();

    let err = session.save_with(&ReadOnlyStore).await.unwrap_err();
    assert_matches!(err, SessionError::Save { .. });
    assert_eq!(session.graph().export_snapshot(), before);
    assert!(session.has_unsaved_changes());
    assert!(!session.is_saving());
}

#[tokio::test]
async fn test_failed_load_shows_empty_graph() {
    let store = MemoryStore::new();
    let (mut session, _, _) = two_node_session();

    let err = session.load_with(&store).await.unwrap_err();
    assert_matches!(err, SessionError::Load { .. });
    assert!(session.graph().is_empty());
}

#[test]
fn test_late_load_after_close_is_discarded() {
    let (mut session, _, _) = two_node_session();
    let before = session.graph().export_snapshot();

    let ticket = session.begin_load().unwrap();
    session.close();
    assert_matches!(
        session.finish_load(ticket, Ok(GraphSnapshot::empty())),
        Err(SessionError::StaleResult)
    );
    assert_eq!(session.graph().export_snapshot(), before);
}

#[tokio::test]
async fn test_catalog_failure_keeps_editing() {
    let (mut session, a, b) = two_node_session();
    session.install_catalog(Err(anyhow!("registry unreachable")));

    assert_matches!(
        session.add_node_from_template("upper", Position::ORIGIN),
        Err(SessionError::CatalogUnavailable)
    );
    assert!(session
        .connect(&PortRef::output(a, "out0"), &PortRef::input(b, "in0"))
        .is_ok());

    // A later successful fetch enables template drops
    session.load_catalog(&StaticCatalog::new(templates())).await;
    let id = session.add_node_from_template("upper", Position::new(0.0, 200.0)).unwrap();
    assert_eq!(session.graph().get_node(id).unwrap().program_id, "prog-upper");
}

#[test]
fn test_group_drag_past_origin_keeps_layout() {
    let (mut session, a, b) = two_node_session();
    session.pointer_down(Position::new(5.0, 100.0), Modifiers::NONE);
    session.pointer_up(Position::new(350.0, 10.0));

    // Drag A 100 left and 40 down; the group cannot cross x = 0
    session.pointer_down(Position::new(10.0, 10.0), Modifiers::NONE);
    session.pointer_move(Position::new(-90.0, 50.0));
    assert_eq!(session.node_position(a), Some(Position::new(0.0, 40.0)));
    assert_eq!(session.node_position(b), Some(Position::new(300.0, 40.0)));

    session.pointer_up(Position::new(-90.0, 50.0));
    assert_eq!(session.graph().get_node(a).unwrap().position, Position::new(0.0, 40.0));
    assert_eq!(session.graph().get_node(b).unwrap().position, Position::new(300.0, 40.0));
}

#[test]
fn test_group_drag_snaps_as_a_unit() {
    let mut config = DesignerConfig::default();
    config.grid.snap = true;
    let mut session = DesignerSession::new("snap", config).unwrap();
    let a = session.add_node(producer(0.0, 0.0)).unwrap();
    let b = session.add_node(consumer(300.0, 0.0)).unwrap();

    session.pointer_down(Position::new(5.0, 100.0), Modifiers::NONE);
    session.pointer_up(Position::new(350.0, 10.0));

    // B leads: (320, 30) snaps to (300, 50), A follows with the same shift
    session.pointer_down(Position::new(310.0, 10.0), Modifiers::NONE);
    session.pointer_up(Position::new(330.0, 40.0));
    assert_eq!(session.graph().get_node(b).unwrap().position, Position::new(300.0, 50.0));
    assert_eq!(session.graph().get_node(a).unwrap().position, Position::new(0.0, 50.0));
}

#[test]
fn test_node_deleted_mid_drag_does_not_cancel_move() {
    let (mut session, a, b) = two_node_session();
    session.pointer_down(Position::new(5.0, 100.0), Modifiers::NONE);
    session.pointer_up(Position::new(350.0, 10.0));

    session.pointer_down(Position::new(10.0, 10.0), Modifiers::NONE);
    session.pointer_move(Position::new(60.0, 60.0));
    session.delete_node(b).unwrap();
    session.pointer_up(Position::new(60.0, 60.0));

    assert_eq!(session.graph().get_node(a).unwrap().position, Position::new(50.0, 50.0));
    assert_eq!(session.graph().node_count(), 1);
}

#[tokio::test]
async fn test_save_during_load_cannot_overwrite_workflow() {
    let mut stored = GraphSnapshot::empty();
    stored.nodes.push(producer(0.0, 0.0));
    let store = MemoryStore::new().with_workflow("wf", stored);

    let mut session = DesignerSession::new("wf", DesignerConfig::default()).unwrap();
    let ticket = session.begin_load().unwrap();
    assert_matches!(session.save_with(&store).await, Err(SessionError::LoadInProgress));

    let id = WorkflowId::from("wf");
    assert_eq!(store.get(&id).await.unwrap().nodes.len(), 1);

    let loaded = store.load_workflow(&id).await;
    session.finish_load(ticket, loaded).unwrap();
    assert_eq!(session.graph().node_count(), 1);
}

#[tokio::test]
async fn test_unrecorded_history_is_kept_for_next_save() {
    let store = FlakyHistoryStore {
        inner: MemoryStore::new(),
        history_down: AtomicBool::new(true),
    };
    let (mut session, _, _) = two_node_session();

    session.save_with(&store).await.unwrap();
    assert!(!session.has_unsaved_changes());
    assert_eq!(session.pending_history().len(), 2);

    store.history_down.store(false, Ordering::SeqCst);
    session.add_node(relay("R", 0.0, 200.0)).unwrap();
    session.save_with(&store).await.unwrap();

    assert!(session.pending_history().is_empty());
    assert_eq!(store.inner.history(session.workflow_id()).await.len(), 3);
}
