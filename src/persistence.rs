//! Workflow persistence collaborators.
//!
//! The designer only produces and consumes [`GraphSnapshot`]s; where they
//! live is up to a [`PersistenceAdapter`].

use crate::{GraphEvent, GraphSnapshot};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Identifier of a stored workflow
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowId(String);

impl WorkflowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkflowId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for WorkflowId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Load/save endpoint for workflows
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    async fn load_workflow(&self, id: &WorkflowId) -> Result<GraphSnapshot>;

    async fn save_workflow(&self, id: &WorkflowId, snapshot: &GraphSnapshot) -> Result<()>;

    /// Record committed graph changes. Adapters without a history ignore them.
    async fn append_history(&self, _id: &WorkflowId, _events: &[GraphEvent]) -> Result<()> {
        Ok(())
    }
}

/// Directory-backed store:
///
/// ```text
/// <root>/workflows/<id>.json   latest snapshot
/// <root>/history/<id>.jsonl    one GraphEvent per line
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    root_dir: PathBuf,
}

impl FileStore {
    /// Create the directory layout (idempotent)
    pub async fn create(path: &Path) -> Result<Self> {
        let store = Self {
            root_dir: path.to_path_buf(),
        };
        for dir in [store.workflows_dir(), store.history_dir()] {
            fs::create_dir_all(&dir)
                .await
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(store)
    }

    /// Open an existing store
    pub async fn open(path: &Path) -> Result<Self> {
        let store = Self {
            root_dir: path.to_path_buf(),
        };
        let workflows = store.workflows_dir();
        if !fs::try_exists(&workflows).await.unwrap_or(false) {
            return Err(anyhow!(
                "Not a workflow store (missing {}): {}",
                workflows.display(),
                path.display()
            ));
        }
        Ok(store)
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn workflows_dir(&self) -> PathBuf {
        self.root_dir.join("workflows")
    }

    pub fn history_dir(&self) -> PathBuf {
        self.root_dir.join("history")
    }

    /// Path of a workflow's snapshot file
    pub fn workflow_path(&self, id: &WorkflowId) -> Result<PathBuf> {
        Ok(self.workflows_dir().join(format!("{}.json", checked_file_stem(id)?)))
    }

    pub fn history_path(&self, id: &WorkflowId) -> Result<PathBuf> {
        Ok(self.history_dir().join(format!("{}.jsonl", checked_file_stem(id)?)))
    }

    /// Load all recorded events of a workflow (empty when none were recorded)
    pub async fn load_history(&self, id: &WorkflowId) -> Result<Vec<GraphEvent>> {
        let path = self.history_path(id)?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read history: {}", path.display()))?;

        let mut events = Vec::new();
        for (line_num, line) in content.lines().enumerate() {
            // Skip empty lines
            if line.trim().is_empty() {
                continue;
            }
            let event: GraphEvent = serde_json::from_str(line).with_context(|| {
                format!("Failed to parse event on line {} from: {}", line_num + 1, path.display())
            })?;
            events.push(event);
        }

        Ok(events)
    }
}

/// Workflow ids become file names; refuse anything that could escape the
/// store directory
fn checked_file_stem(id: &WorkflowId) -> Result<&str> {
    let stem = id.as_str();
    if stem.is_empty()
        || stem == "."
        || stem == ".."
        || stem.contains(['/', '\\', '\0'])
    {
        bail!("Invalid workflow id for file storage: {:?}", stem);
    }
    Ok(stem)
}

#[async_trait]
impl PersistenceAdapter for FileStore {
    async fn load_workflow(&self, id: &WorkflowId) -> Result<GraphSnapshot> {
        let path = self.workflow_path(id)?;
        let json = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read workflow: {}", path.display()))?;
        GraphSnapshot::from_json(&json).with_context(|| format!("Failed to load workflow: {}", path.display()))
    }

    async fn save_workflow(&self, id: &WorkflowId, snapshot: &GraphSnapshot) -> Result<()> {
        let path = self.workflow_path(id)?;
        let json = snapshot.to_json()?;

        // Write then rename so a failed save never truncates the last good copy
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write workflow: {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Failed to replace workflow: {}", path.display()))?;

        debug!("Wrote {} nodes, {} edges to {}", snapshot.nodes.len(), snapshot.edges.len(), path.display());
        Ok(())
    }

    async fn append_history(&self, id: &WorkflowId, events: &[GraphEvent]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        let path = self.history_path(id)?;

        let mut buffer = String::new();
        for event in events {
            let json = serde_json::to_string(event)
                .with_context(|| format!("Failed to serialize event: {}", path.display()))?;
            buffer.push_str(&json);
            buffer.push('\n');
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("Failed to open history: {}", path.display()))?;
        file.write_all(buffer.as_bytes())
            .await
            .with_context(|| format!("Failed to write history: {}", path.display()))?;
        file.flush()
            .await
            .with_context(|| format!("Failed to flush history: {}", path.display()))?;

        Ok(())
    }
}

/// In-process store, handy for tests and previews
#[derive(Debug, Default)]
pub struct MemoryStore {
    workflows: Mutex<HashMap<WorkflowId, GraphSnapshot>>,
    history: Mutex<HashMap<WorkflowId, Vec<GraphEvent>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a workflow
    pub fn with_workflow(mut self, id: impl Into<WorkflowId>, snapshot: GraphSnapshot) -> Self {
        self.workflows.get_mut().insert(id.into(), snapshot);
        self
    }

    pub async fn get(&self, id: &WorkflowId) -> Option<GraphSnapshot> {
        self.workflows.lock().await.get(id).cloned()
    }

    pub async fn history(&self, id: &WorkflowId) -> Vec<GraphEvent> {
        self.history.lock().await.get(id).cloned().unwrap_or_default()
    }

    pub async fn len(&self) -> usize {
        self.workflows.lock().await.len()
    }
}

#[async_trait]
impl PersistenceAdapter for MemoryStore {
    async fn load_workflow(&self, id: &WorkflowId) -> Result<GraphSnapshot> {
        self.workflows
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("Workflow not found: {}", id))
    }

    async fn save_workflow(&self, id: &WorkflowId, snapshot: &GraphSnapshot) -> Result<()> {
        self.workflows.lock().await.insert(id.clone(), snapshot.clone());
        Ok(())
    }

    async fn append_history(&self, id: &WorkflowId, events: &[GraphEvent]) -> Result<()> {
        self.history
            .lock()
            .await
            .entry(id.clone())
            .or_default()
            .extend_from_slice(events);
        Ok(())
    }
}
