// Saves a small workflow to a file store, reloads it in a fresh session and
// prints what came back.
//
//     cargo run --example designer_walkthrough

use anyhow::Result;
use tempfile::TempDir;
use workflow_designer::{
    DataType, DesignerConfig, DesignerSession, FileStore, NodeTemplate, NodeType, Port, PortRef,
    Position, Size, StaticCatalog,
};

fn catalog() -> StaticCatalog {
    let text = DataType::new("string");
    StaticCatalog::new(vec![
        NodeTemplate {
            id: "fetch".to_string(),
            name: "Fetch page".to_string(),
            category: "io".to_string(),
            input_ports: vec![],
            output_ports: vec![Port::optional("body", text.clone())],
            default_size: Size::new(160.0, 80.0),
            icon: Some("globe".to_string()),
            backing_program_id: "http-get".to_string(),
            node_type: NodeType::Start,
        },
        NodeTemplate {
            id: "summarise".to_string(),
            name: "Summarise".to_string(),
            category: "text".to_string(),
            input_ports: vec![Port::required("text", text.clone())],
            output_ports: vec![Port::optional("summary", text)],
            default_size: Size::new(160.0, 80.0),
            icon: None,
            backing_program_id: "summariser".to_string(),
            node_type: NodeType::Program,
        },
    ])
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    let temp_dir = TempDir::new()?;
    let store = FileStore::create(temp_dir.path()).await?;

    let mut session = DesignerSession::new("walkthrough", DesignerConfig::default())?;
    session.load_catalog(&catalog()).await;

    let fetch = session.add_node_from_template("fetch", Position::new(40.0, 40.0))?;
    let summarise = session.add_node_from_template("summarise", Position::new(360.0, 40.0))?;
    session.connect(&PortRef::output(fetch, "body"), &PortRef::input(summarise, "text"))?;

    let result = session.revalidate();
    println!("Before save: {} error(s), {} warning(s)", result.errors.len(), result.warnings.len());

    session.save_with(&store).await?;
    println!("Saved to {}", store.workflow_path(session.workflow_id())?.display());

    let history = store.load_history(session.workflow_id()).await?;
    println!("History entries: {}", history.len());

    let mut reopened = DesignerSession::new("walkthrough", DesignerConfig::default())?;
    reopened.load_with(&store).await?;
    println!(
        "Reloaded: {} nodes, {} edges",
        reopened.graph().node_count(),
        reopened.graph().edge_count()
    );

    for edge in reopened.render_edges() {
        println!("  {}", edge.path.to_svg());
    }

    Ok(())
}
