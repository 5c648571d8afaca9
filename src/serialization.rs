use crate::{Edge, EventType, GraphError, GraphStore, Node};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Persisted form of a workflow graph: plain node and edge lists, no
/// selection, viewport or validation state.
///
/// Both lists are sorted by id, so exporting the same graph always yields
/// the same snapshot regardless of insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    pub fn empty() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Capture the current contents of a store
    pub fn from_store(graph: &GraphStore) -> Self {
        let mut nodes: Vec<Node> = graph.nodes().values().cloned().collect();
        nodes.sort_by_key(|n| n.id);
        let mut edges: Vec<Edge> = graph.edges().values().cloned().collect();
        edges.sort_by_key(|e| e.id);

        Self {
            version: SNAPSHOT_VERSION,
            nodes,
            edges,
        }
    }

    /// Build a store from this snapshot. Structural problems (duplicate ids,
    /// dangling edges, unknown ports, two edges on one input) reject the
    /// whole snapshot.
    pub fn into_store(self, replace_on_connect: bool) -> Result<GraphStore, GraphError> {
        let mut graph = GraphStore::with_replace_on_connect(replace_on_connect);
        let (node_count, edge_count) = (self.nodes.len(), self.edges.len());

        for node in self.nodes {
            graph.add_node(node)?;
        }
        for edge in self.edges {
            graph.insert_loaded_edge(edge)?;
        }

        // Per-node add events are noise for an import
        graph.clear_events();
        graph.log_event(EventType::SnapshotImported {
            nodes: node_count,
            edges: edge_count,
        });

        Ok(graph)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize graph snapshot")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(json).context("Failed to parse graph snapshot")?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    /// Save snapshot to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create snapshot file: {}", path.display()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .with_context(|| format!("Failed to write snapshot to: {}", path.display()))?;
        Ok(())
    }

    /// Load snapshot from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open snapshot file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let snapshot: Self = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse snapshot from: {}", path.display()))?;
        snapshot
            .check_version()
            .with_context(|| format!("Unsupported snapshot: {}", path.display()))?;
        Ok(snapshot)
    }

    fn check_version(&self) -> Result<()> {
        if self.version > SNAPSHOT_VERSION {
            bail!(
                "Snapshot version {} is newer than supported version {}",
                self.version,
                SNAPSHOT_VERSION
            );
        }
        Ok(())
    }
}

impl Default for GraphSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl GraphStore {
    pub fn export_snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::from_store(self)
    }

    /// Replace the whole graph with a snapshot. All-or-nothing: on error the
    /// store is unchanged.
    pub fn import_snapshot(&mut self, snapshot: GraphSnapshot) -> Result<(), GraphError> {
        let imported = snapshot.into_store(self.replace_on_connect())?;
        self.replace_with(imported);
        Ok(())
    }
}
