// Helper functions to build test graphs and sessions
#![allow(dead_code)]

use workflow_designer::{
    DataType, DesignerConfig, DesignerSession, GraphStore, Node, NodeId, NodeTemplate, NodeType,
    Port, PortRef, Position, Size,
};

pub const NODE_SIZE: Size = Size {
    width: 120.0,
    height: 60.0,
};

/// Node A: two string outputs, no inputs
pub fn producer(x: f32, y: f32) -> Node {
    Node::new("A", "producer", Position::new(x, y), NODE_SIZE)
        .with_output(Port::optional("out0", DataType::new("string")))
        .with_output(Port::optional("out1", DataType::new("string")))
}

/// Node B: one required string input
pub fn consumer(x: f32, y: f32) -> Node {
    Node::new("B", "consumer", Position::new(x, y), NODE_SIZE)
        .with_input(Port::required("in0", DataType::new("string")))
}

/// A node taking a single number
pub fn number_sink(x: f32, y: f32) -> Node {
    Node::new("N", "number-sink", Position::new(x, y), NODE_SIZE)
        .with_input(Port::required("value", DataType::new("number")))
}

/// Pass-through node with wildcard ports
pub fn relay(name: &str, x: f32, y: f32) -> Node {
    Node::new(name, "relay", Position::new(x, y), NODE_SIZE)
        .with_input(Port::optional("in", DataType::any()))
        .with_output(Port::optional("out", DataType::any()))
}

/// Empty graph + A at (0,0) + B at (300,0), not connected
pub fn two_node_graph() -> (GraphStore, NodeId, NodeId) {
    let mut graph = GraphStore::new();
    let a = graph.add_node(producer(0.0, 0.0)).unwrap();
    let b = graph.add_node(consumer(300.0, 0.0)).unwrap();
    (graph, a, b)
}

/// A.out0 -> B.in0
pub fn connected_graph() -> (GraphStore, NodeId, NodeId) {
    let (mut graph, a, b) = two_node_graph();
    graph
        .add_edge(&PortRef::output(a, "out0"), &PortRef::input(b, "in0"))
        .unwrap();
    (graph, a, b)
}

/// Linear chain of `len` relays, each wired to the next
pub fn relay_chain(len: usize) -> (GraphStore, Vec<NodeId>) {
    let mut graph = GraphStore::new();
    let ids: Vec<NodeId> = (0..len)
        .map(|i| {
            graph
                .add_node(relay(&format!("R{i}"), i as f32 * 200.0, 0.0))
                .unwrap()
        })
        .collect();
    for pair in ids.windows(2) {
        graph
            .add_edge(&PortRef::output(pair[0], "out"), &PortRef::input(pair[1], "in"))
            .unwrap();
    }
    (graph, ids)
}

/// Session holding the two-node graph, added through the session API
pub fn two_node_session() -> (DesignerSession, NodeId, NodeId) {
    let mut session = DesignerSession::new("fixture", DesignerConfig::default()).unwrap();
    let a = session.add_node(producer(0.0, 0.0)).unwrap();
    let b = session.add_node(consumer(300.0, 0.0)).unwrap();
    (session, a, b)
}

pub fn templates() -> Vec<NodeTemplate> {
    vec![
        NodeTemplate {
            id: "start".to_string(),
            name: "Start".to_string(),
            category: "flow".to_string(),
            input_ports: vec![],
            output_ports: vec![Port::optional("go", DataType::any())],
            default_size: Size::new(80.0, 40.0),
            icon: None,
            backing_program_id: "builtin-start".to_string(),
            node_type: NodeType::Start,
        },
        NodeTemplate {
            id: "upper".to_string(),
            name: "Uppercase".to_string(),
            category: "text".to_string(),
            input_ports: vec![Port::required("text", DataType::new("string"))],
            output_ports: vec![Port::optional("text", DataType::new("string"))],
            default_size: NODE_SIZE,
            icon: Some("type".to_string()),
            backing_program_id: "prog-upper".to_string(),
            node_type: NodeType::Program,
        },
    ]
}
