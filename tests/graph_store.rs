#[path = "fixtures/sample_graphs.rs"]
mod sample_graphs;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use sample_graphs::*;
use workflow_designer::{
    EventType, GraphError, GraphStore, NodeUpdate, PortRef, Position, ValidatedGraph,
    ValidationIssueType,
};

#[test]
fn test_connect_two_nodes_scenario() {
    let (mut graph, a, b) = two_node_graph();

    graph
        .add_edge(&PortRef::output(a, "out0"), &PortRef::input(b, "in0"))
        .unwrap();

    assert_eq!(graph.edge_count(), 1);
    let result = graph.validate();
    assert_eq!(result.errors.len(), 0);
    assert!(result.is_valid());
}

#[test]
fn test_delete_source_node_scenario() {
    let (mut graph, a, b) = connected_graph();
    let input = PortRef::input(b, "in0");
    assert!(graph.is_port_connected(&input));

    let (_, cascaded) = graph.remove_node(a).unwrap();
    assert_eq!(cascaded.len(), 1);
    assert_eq!(graph.edge_count(), 0);
    assert!(!graph.is_port_connected(&input));

    let result = graph.validate();
    assert_eq!(result.errors.len(), 0);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].issue_type, ValidationIssueType::RequiredInputUnconnected);
}

#[test]
fn test_type_mismatch_scenario() {
    let (mut graph, a, _) = two_node_graph();
    let n = graph.add_node(number_sink(300.0, 200.0)).unwrap();
    let before = graph.export_snapshot();

    let err = graph
        .add_edge(&PortRef::output(a, "out0"), &PortRef::input(n, "value"))
        .unwrap_err();
    assert_matches!(err, GraphError::IncompatibleTypes { .. });
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(graph.export_snapshot(), before);
}

#[test]
fn test_connect_accepts_reverse_direction() {
    let (mut graph, a, b) = two_node_graph();

    let outcome = graph
        .add_edge(&PortRef::input(b, "in0"), &PortRef::output(a, "out1"))
        .unwrap();
    let edge = graph.get_edge(outcome.edge_id).unwrap();
    assert_eq!(edge.source_node_id, a);
    assert_eq!(edge.source_output_name, "out1");
    assert_eq!(edge.target_node_id, b);
}

#[test]
fn test_replace_on_connect() {
    let (mut graph, a, b) = connected_graph();
    let first = graph.edge_at_input(b, "in0").unwrap().id;

    let outcome = graph
        .add_edge(&PortRef::output(a, "out1"), &PortRef::input(b, "in0"))
        .unwrap();

    assert_eq!(outcome.replaced.map(|e| e.id), Some(first));
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.incoming_edges(b).len(), 1);
    assert_eq!(graph.edge_at_input(b, "in0").unwrap().source_output_name, "out1");

    let last = graph.events().last().unwrap();
    assert_matches!(
        &last.event,
        EventType::EdgeAdded { replaced: Some(id), .. } if *id == first
    );
}

#[test]
fn test_occupied_input_rejected_without_replace() {
    let (mut graph, a, b) = connected_graph();
    graph.set_replace_on_connect(false);
    let before = graph.export_snapshot();

    let err = graph
        .add_edge(&PortRef::output(a, "out1"), &PortRef::input(b, "in0"))
        .unwrap_err();
    assert_matches!(err, GraphError::InputOccupied { .. });
    assert_eq!(graph.export_snapshot(), before);
}

#[test]
fn test_fan_out_allowed() {
    let (mut graph, a, _) = connected_graph();
    let c = graph.add_node(consumer(300.0, 200.0)).unwrap();

    graph
        .add_edge(&PortRef::output(a, "out0"), &PortRef::input(c, "in0"))
        .unwrap();
    assert_eq!(graph.outgoing_edges(a).len(), 2);
}

#[test]
fn test_update_node_validates_geometry() {
    let (mut graph, a, _) = two_node_graph();
    let before = graph.export_snapshot();

    let err = graph
        .update_node(a, NodeUpdate::new().name("renamed").position(Position::new(-5.0, 0.0)))
        .unwrap_err();
    assert_matches!(err, GraphError::InvalidGeometry { .. });
    assert_eq!(graph.export_snapshot(), before);

    graph.update_node(a, NodeUpdate::new().name("renamed")).unwrap();
    assert_eq!(graph.get_node(a).unwrap().name, "renamed");
}

#[test]
fn test_move_nodes_is_atomic() {
    let (mut graph, a, b) = two_node_graph();
    let before = graph.export_snapshot();

    let err = graph
        .move_nodes(&[
            (a, Position::new(10.0, 10.0)),
            (b, Position::new(f32::NAN, 0.0)),
        ])
        .unwrap_err();
    assert_matches!(err, GraphError::InvalidGeometry { .. });
    assert_eq!(graph.export_snapshot(), before);

    graph
        .move_nodes(&[(a, Position::new(10.0, 10.0)), (b, Position::new(400.0, 10.0))])
        .unwrap();
    assert_eq!(graph.get_node(b).unwrap().position, Position::new(400.0, 10.0));
}

#[test]
fn test_cycle_through_relays_is_warning() {
    let (mut graph, ids) = relay_chain(3);
    graph
        .add_edge(&PortRef::output(ids[2], "out"), &PortRef::input(ids[0], "in"))
        .unwrap();

    let result = graph.validate();
    assert!(result.is_valid());
    assert_eq!(result.count_of(ValidationIssueType::Cycle), 1);
}

#[test]
fn test_snapshot_import_is_order_independent() {
    let (graph, _, _) = connected_graph();
    let snapshot = graph.export_snapshot();

    let mut reversed = snapshot.clone();
    reversed.nodes.reverse();
    reversed.edges.reverse();

    let mut restored = GraphStore::new();
    restored.import_snapshot(reversed).unwrap();
    assert_eq!(restored.export_snapshot(), snapshot);
}
