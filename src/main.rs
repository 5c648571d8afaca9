use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;
use workflow_designer::{
    DataType, DesignerConfig, DesignerSession, GraphSnapshot, Modifiers, Node, Port, PortRef,
    Position, Size, ValidationResult, Validator,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match std::env::args().nth(1) {
        Some(path) => check_snapshot(PathBuf::from(path)),
        None => run_scenario(),
    }
}

/// Validate a saved workflow snapshot and print the findings
fn check_snapshot(path: PathBuf) -> Result<()> {
    let snapshot = GraphSnapshot::load(&path)?;
    info!("Checking {}", path.display());

    println!("Workflow snapshot: {}", path.display());
    println!("  └─ Nodes: {}", snapshot.nodes.len());
    println!("  └─ Edges: {}", snapshot.edges.len());

    let result = Validator::validate_snapshot(&snapshot);
    print_validation(&result);

    match snapshot.into_store(true) {
        Ok(_) => println!("\n✓ Snapshot imports cleanly"),
        Err(err) => println!("\n✗ Snapshot would be rejected on import: {err}"),
    }

    if !result.is_valid() {
        std::process::exit(1);
    }
    Ok(())
}

fn run_scenario() -> Result<()> {
    println!("Workflow Designer - Core Demo");
    println!("=============================\n");

    let mut session = DesignerSession::new("demo", DesignerConfig::default())?;

    let a = session.add_node(
        Node::new("Read CSV", "csv-reader", Position::new(0.0, 0.0), Size::new(160.0, 80.0))
            .with_output(Port::optional("rows", DataType::new("string")))
            .with_output(Port::optional("header", DataType::new("string"))),
    )?;
    let b = session.add_node(
        Node::new("Summarise", "summariser", Position::new(300.0, 0.0), Size::new(160.0, 80.0))
            .with_input(Port::required("text", DataType::new("string"))),
    )?;
    println!("✓ Added nodes A and B");

    session.connect(&PortRef::output(a, "rows"), &PortRef::input(b, "text"))?;
    println!("✓ Connected A.rows -> B.text");
    print_validation(session.revalidate());

    // Drag A by (50, 50); the store keeps the old position until release
    session.pointer_down(Position::new(20.0, 20.0), Modifiers::NONE);
    session.pointer_move(Position::new(70.0, 70.0));
    let committed = session.graph().get_node(a).context("node A vanished")?.position;
    println!(
        "\n✓ Mid-drag: preview {:?}, committed {:?}",
        session.node_position(a),
        committed
    );
    session.pointer_up(Position::new(70.0, 70.0));
    println!("✓ Released at {:?}", session.graph().get_node(a).map(|n| n.position));

    for edge in session.render_edges() {
        println!("  └─ edge {} path: {}", edge.id, edge.path);
    }

    session.delete_node(a)?;
    println!("\n✓ Deleted A (edges left: {})", session.graph().edge_count());
    print_validation(session.revalidate());

    println!("\n📊 Graph revision: {}", session.graph().revision());
    println!("   Unsaved changes: {}\n", session.has_unsaved_changes());
    Ok(())
}

fn print_validation(result: &ValidationResult) {
    println!(
        "  Validation: {} error(s), {} warning(s)",
        result.errors.len(),
        result.warnings.len()
    );
    for issue in result.issues() {
        println!("    [{:?}] {}", issue.severity, issue.message);
    }
}
