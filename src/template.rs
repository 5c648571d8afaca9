//! Node template catalog as consumed from the program registry.

use crate::{Node, NodeType, Port, Position, Size};
use anyhow::Result;
use async_trait::async_trait;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One instantiable node kind
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub input_ports: Vec<Port>,
    #[serde(default)]
    pub output_ports: Vec<Port>,
    pub default_size: Size,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub backing_program_id: String,
    #[serde(default)]
    pub node_type: NodeType,
}

impl NodeTemplate {
    /// Create a fresh node for this template at `position`
    pub fn instantiate(&self, position: Position) -> Node {
        let mut node = Node::new(
            self.name.clone(),
            self.backing_program_id.clone(),
            position,
            self.default_size,
        )
        .with_node_type(self.node_type);
        node.inputs = self.input_ports.clone();
        node.outputs = self.output_ports.clone();
        node
    }
}

/// Read-only catalog, fetched once per designer session
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    templates: Vec<NodeTemplate>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog; later templates with an already seen id are dropped
    pub fn from_templates(templates: Vec<NodeTemplate>) -> Self {
        let mut catalog = Self::default();
        for template in templates {
            if catalog.index.contains_key(&template.id) {
                warn!("Duplicate node template id '{}' ignored", template.id);
                continue;
            }
            catalog.index.insert(template.id.clone(), catalog.templates.len());
            catalog.templates.push(template);
        }
        catalog
    }

    pub fn get(&self, id: &str) -> Option<&NodeTemplate> {
        self.index.get(id).map(|&i| &self.templates[i])
    }

    pub fn templates(&self) -> &[NodeTemplate] {
        &self.templates
    }

    /// Templates grouped by category, in catalog order within each group
    pub fn by_category(&self) -> BTreeMap<&str, Vec<&NodeTemplate>> {
        let mut groups: BTreeMap<&str, Vec<&NodeTemplate>> = BTreeMap::new();
        for template in &self.templates {
            groups.entry(template.category.as_str()).or_default().push(template);
        }
        groups
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Source of node templates (the backend program registry)
#[async_trait]
pub trait TemplateCatalog: Send + Sync {
    async fn fetch_templates(&self) -> Result<Vec<NodeTemplate>>;
}

/// Fixed in-process catalog
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    templates: Vec<NodeTemplate>,
}

impl StaticCatalog {
    pub fn new(templates: Vec<NodeTemplate>) -> Self {
        Self { templates }
    }
}

#[async_trait]
impl TemplateCatalog for StaticCatalog {
    async fn fetch_templates(&self) -> Result<Vec<NodeTemplate>> {
        Ok(self.templates.clone())
    }
}

/// Availability of the catalog within a session
#[derive(Debug, Clone, Default)]
pub enum CatalogState {
    #[default]
    Pending,
    Ready(Catalog),
    /// Fetch failed; existing nodes stay editable, adding nodes is disabled
    Unavailable(String),
}

impl CatalogState {
    pub fn catalog(&self) -> Option<&Catalog> {
        match self {
            CatalogState::Ready(catalog) => Some(catalog),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, CatalogState::Ready(_))
    }
}
