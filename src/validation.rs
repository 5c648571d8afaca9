use crate::{Edge, EdgeId, GraphSnapshot, GraphStore, Node, NodeId, NodeType, PortDirection};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Validation severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ValidationSeverity {
    Warning, // Yellow - workflow runs, but probably not as intended
    Error,   // Red - workflow is broken
}

/// Types of validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationIssueType {
    DanglingEdge,
    UnknownPort,
    TypeMismatch,
    InputOverloaded,
    MultipleStartNodes,
    RequiredInputUnconnected,
    DisabledNodeConnected,
    Cycle,
}

/// Validation issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    pub issue_type: ValidationIssueType,
    pub message: String,
    pub affected_nodes: Vec<NodeId>,
    pub affected_edges: Vec<EdgeId>,
}

impl ValidationIssue {
    fn error(issue_type: ValidationIssueType, message: String) -> Self {
        Self {
            severity: ValidationSeverity::Error,
            issue_type,
            message,
            affected_nodes: Vec::new(),
            affected_edges: Vec::new(),
        }
    }

    fn warning(issue_type: ValidationIssueType, message: String) -> Self {
        Self {
            severity: ValidationSeverity::Warning,
            ..Self::error(issue_type, message)
        }
    }

    fn nodes(mut self, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        self.affected_nodes.extend(nodes);
        self
    }

    fn edges(mut self, edges: impl IntoIterator<Item = EdgeId>) -> Self {
        self.affected_edges.extend(edges);
        self
    }
}

/// Complete validation result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Create a new empty validation result
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an issue
    pub fn add_issue(&mut self, issue: ValidationIssue) {
        match issue.severity {
            ValidationSeverity::Error => self.errors.push(issue),
            ValidationSeverity::Warning => self.warnings.push(issue),
        }
    }

    /// Check if validation passed (no errors)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// All issues, errors first
    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().chain(self.warnings.iter())
    }

    /// Issues that mention a node
    pub fn issues_for(&self, node_id: NodeId) -> Vec<&ValidationIssue> {
        self.issues()
            .filter(|issue| issue.affected_nodes.contains(&node_id))
            .collect()
    }

    /// Highest severity per affected node
    pub fn nodes_with_issues(&self) -> HashMap<NodeId, ValidationSeverity> {
        let mut nodes = HashMap::new();

        for issue in self.issues() {
            for node_id in &issue.affected_nodes {
                nodes
                    .entry(*node_id)
                    .and_modify(|severity| {
                        // Keep the highest severity
                        if issue.severity > *severity {
                            *severity = issue.severity;
                        }
                    })
                    .or_insert(issue.severity);
            }
        }

        nodes
    }

    pub fn count_of(&self, issue_type: ValidationIssueType) -> usize {
        self.issues().filter(|i| i.issue_type == issue_type).count()
    }
}

/// Read-only view the checks run against; built from a live store or from a
/// raw snapshot that failed to import
struct GraphView<'a> {
    nodes: BTreeMap<NodeId, &'a Node>,
    edges: Vec<&'a Edge>,
}

impl<'a> GraphView<'a> {
    fn new(nodes: impl Iterator<Item = &'a Node>, edges: impl Iterator<Item = &'a Edge>) -> Self {
        let nodes = nodes.map(|n| (n.id, n)).collect();
        let mut edges: Vec<&Edge> = edges.collect();
        edges.sort_by_key(|e| e.id);
        Self { nodes, edges }
    }

    fn outgoing(&self, node_id: NodeId) -> impl Iterator<Item = &'a Edge> + '_ {
        self.edges.iter().copied().filter(move |e| e.starts_from(node_id))
    }
}

/// Validator for workflow graphs. Never mutates what it inspects.
pub struct Validator;

impl Validator {
    /// Run all validations on a graph store
    pub fn validate(graph: &GraphStore) -> ValidationResult {
        let view = GraphView::new(graph.nodes().values(), graph.edges().values());
        Self::run(&view)
    }

    /// Run all validations on a snapshot, including ones the store would
    /// refuse to import
    pub fn validate_snapshot(snapshot: &GraphSnapshot) -> ValidationResult {
        let view = GraphView::new(snapshot.nodes.iter(), snapshot.edges.iter());
        Self::run(&view)
    }

    fn run(view: &GraphView<'_>) -> ValidationResult {
        let mut result = ValidationResult::new();

        Self::check_edges(view, &mut result);
        Self::check_input_fan_in(view, &mut result);
        Self::check_start_nodes(view, &mut result);
        Self::check_required_inputs(view, &mut result);
        Self::check_disabled_nodes(view, &mut result);

        if let Some(cycle_nodes) = Self::detect_cycles(view) {
            result.add_issue(
                ValidationIssue::warning(
                    ValidationIssueType::Cycle,
                    format!(
                        "Cycle detected in workflow involving {} nodes. This may cause infinite loops.",
                        cycle_nodes.len()
                    ),
                )
                .nodes(cycle_nodes),
            );
        }

        result
    }

    /// Endpoint existence, port existence and type compatibility per edge
    fn check_edges(view: &GraphView<'_>, result: &mut ValidationResult) {
        for edge in &view.edges {
            let source = view.nodes.get(&edge.source_node_id);
            let target = view.nodes.get(&edge.target_node_id);

            let (source, target) = match (source, target) {
                (Some(s), Some(t)) => (*s, *t),
                (s, t) => {
                    let missing: Vec<String> = [
                        (s.is_none(), edge.source_node_id),
                        (t.is_none(), edge.target_node_id),
                    ]
                    .iter()
                    .filter(|(gone, _)| *gone)
                    .map(|(_, id)| id.to_string())
                    .collect();
                    let present = s.or(t).map(|n| n.id);
                    result.add_issue(
                        ValidationIssue::error(
                            ValidationIssueType::DanglingEdge,
                            format!("Edge {} references missing node(s): {}", edge.id, missing.join(", ")),
                        )
                        .nodes(present)
                        .edges([edge.id]),
                    );
                    continue;
                }
            };

            let output = source.port(PortDirection::Output, &edge.source_output_name);
            let input = target.port(PortDirection::Input, &edge.target_input_name);

            let (output, input) = match (output, input) {
                (Some(o), Some(i)) => (o, i),
                (o, _) => {
                    let (node, name) = if o.is_none() {
                        (source, &edge.source_output_name)
                    } else {
                        (target, &edge.target_input_name)
                    };
                    result.add_issue(
                        ValidationIssue::error(
                            ValidationIssueType::UnknownPort,
                            format!("Edge {} uses port '{}' which node '{}' does not have", edge.id, name, node.name),
                        )
                        .nodes([node.id])
                        .edges([edge.id]),
                    );
                    continue;
                }
            };

            if !output.data_type.is_compatible_with(&input.data_type) {
                result.add_issue(
                    ValidationIssue::error(
                        ValidationIssueType::TypeMismatch,
                        format!(
                            "Edge {} connects '{}' ({}) to '{}' ({})",
                            edge.id, output.name, output.data_type, input.name, input.data_type
                        ),
                    )
                    .nodes([source.id, target.id])
                    .edges([edge.id]),
                );
            }
        }
    }

    fn check_input_fan_in(view: &GraphView<'_>, result: &mut ValidationResult) {
        let mut per_input: BTreeMap<(NodeId, &str), Vec<EdgeId>> = BTreeMap::new();
        for edge in &view.edges {
            if view.nodes.contains_key(&edge.target_node_id) {
                per_input
                    .entry((edge.target_node_id, edge.target_input_name.as_str()))
                    .or_default()
                    .push(edge.id);
            }
        }

        for ((node_id, input), edges) in per_input {
            if edges.len() > 1 {
                result.add_issue(
                    ValidationIssue::error(
                        ValidationIssueType::InputOverloaded,
                        format!("Input '{}' receives {} edges; only one is allowed", input, edges.len()),
                    )
                    .nodes([node_id])
                    .edges(edges),
                );
            }
        }
    }

    fn check_start_nodes(view: &GraphView<'_>, result: &mut ValidationResult) {
        let starts: Vec<NodeId> = view
            .nodes
            .values()
            .filter(|n| n.node_type == NodeType::Start)
            .map(|n| n.id)
            .collect();

        if starts.len() > 1 {
            result.add_issue(
                ValidationIssue::error(
                    ValidationIssueType::MultipleStartNodes,
                    format!("Workflow has {} start nodes; execution needs exactly one entry point", starts.len()),
                )
                .nodes(starts),
            );
        }
    }

    fn check_required_inputs(view: &GraphView<'_>, result: &mut ValidationResult) {
        let connected: HashSet<(NodeId, &str)> = view
            .edges
            .iter()
            .map(|e| (e.target_node_id, e.target_input_name.as_str()))
            .collect();

        for node in view.nodes.values() {
            let missing: Vec<&str> = node
                .inputs
                .iter()
                .filter(|port| port.required && !connected.contains(&(node.id, port.name.as_str())))
                .map(|port| port.name.as_str())
                .collect();

            if !missing.is_empty() {
                result.add_issue(
                    ValidationIssue::warning(
                        ValidationIssueType::RequiredInputUnconnected,
                        format!("Node '{}' has unconnected required input(s): {}", node.name, missing.join(", ")),
                    )
                    .nodes([node.id]),
                );
            }
        }
    }

    fn check_disabled_nodes(view: &GraphView<'_>, result: &mut ValidationResult) {
        for node in view.nodes.values().filter(|n| n.is_disabled) {
            let active: Vec<EdgeId> = view
                .edges
                .iter()
                .filter(|e| !e.is_disabled && e.involves(node.id))
                .map(|e| e.id)
                .collect();

            if !active.is_empty() {
                result.add_issue(
                    ValidationIssue::warning(
                        ValidationIssueType::DisabledNodeConnected,
                        format!(
                            "Disabled node '{}' still has {} active edge(s); they will never carry data",
                            node.name,
                            active.len()
                        ),
                    )
                    .nodes([node.id])
                    .edges(active),
                );
            }
        }
    }

    /// Detect cycles over enabled edges using DFS
    fn detect_cycles(view: &GraphView<'_>) -> Option<Vec<NodeId>> {
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        let mut cycle_nodes = Vec::new();

        for node_id in view.nodes.keys() {
            if !visited.contains(node_id)
                && Self::dfs_detect_cycle(view, *node_id, &mut visited, &mut rec_stack, &mut cycle_nodes)
            {
                cycle_nodes.sort();
                cycle_nodes.dedup();
                return Some(cycle_nodes);
            }
        }

        None
    }

    /// DFS helper for cycle detection
    fn dfs_detect_cycle(
        view: &GraphView<'_>,
        node_id: NodeId,
        visited: &mut HashSet<NodeId>,
        rec_stack: &mut HashSet<NodeId>,
        cycle_nodes: &mut Vec<NodeId>,
    ) -> bool {
        visited.insert(node_id);
        rec_stack.insert(node_id);

        for edge in view.outgoing(node_id).filter(|e| !e.is_disabled) {
            let target = edge.target_node_id;
            if !view.nodes.contains_key(&target) {
                continue;
            }

            if !visited.contains(&target) {
                if Self::dfs_detect_cycle(view, target, visited, rec_stack, cycle_nodes) {
                    cycle_nodes.push(node_id);
                    return true;
                }
            } else if rec_stack.contains(&target) {
                cycle_nodes.push(node_id);
                cycle_nodes.push(target);
                return true;
            }
        }

        rec_stack.remove(&node_id);
        false
    }
}

/// Extension trait for GraphStore to add validation
pub trait ValidatedGraph {
    /// Validate the graph
    fn validate(&self) -> ValidationResult;

    /// Get nodes with validation issues
    fn nodes_with_issues(&self, result: &ValidationResult) -> HashMap<NodeId, ValidationSeverity>;
}

impl ValidatedGraph for GraphStore {
    fn validate(&self) -> ValidationResult {
        Validator::validate(self)
    }

    fn nodes_with_issues(&self, result: &ValidationResult) -> HashMap<NodeId, ValidationSeverity> {
        result
            .nodes_with_issues()
            .into_iter()
            .filter(|(id, _)| self.get_node(*id).is_some())
            .collect()
    }
}
