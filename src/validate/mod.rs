//! Semantic checks on ER diagrams.
//!
//! Structural problems (bad JSON, unknown node kinds) are caught when a file
//! is parsed. This module looks at a well-typed diagram and reports what the
//! converter would silently skip or get wrong:
//! - duplicate ids and edges pointing nowhere
//! - attributes without a parent, or with a cyclic parent chain
//! - relationships missing a side or naming unknown entities
//! - weak entities that no identifying relationship reaches

use crate::model::{AttributeFlag, AttributeNode, Diagram, EntityNode, ErDiagram, ErEdge, ErNode};
use ahash::{AHashMap, AHashSet};
use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::Serialize;
use std::fmt;

/// `<relationship>-><entity>;<first>-><second>`
static RELATIONSHIP_EDGE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.+->.+;.+->.+$").unwrap());

/// Issue severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

/// Node or edge an issue refers to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge: Option<String>,
}

impl Location {
    pub fn node(id: impl Into<String>) -> Self {
        Self {
            node: Some(id.into()),
            edge: None,
        }
    }

    pub fn edge(id: impl Into<String>) -> Self {
        Self {
            node: None,
            edge: Some(id.into()),
        }
    }
}

/// A problem found in a diagram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ValidationIssue {
    pub code: &'static str,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl ValidationIssue {
    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: Severity::Error,
            message: message.into(),
            location: None,
        }
    }

    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: Severity::Warning,
            message: message.into(),
            location: None,
        }
    }

    pub fn info(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: Severity::Info,
            message: message.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.severity, self.code)?;
        if let Some(ref loc) = self.location {
            if let Some(ref node) = loc.node {
                write!(f, " node={}", node)?;
            }
            if let Some(ref edge) = loc.edge {
                write!(f, " edge={}", edge)?;
            }
        }
        write!(f, ": {}", self.message)
    }
}

/// Validation result for one diagram
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ValidationSummary {
    pub diagram: String,
    pub issues: Vec<ValidationIssue>,
    pub summary: SummaryStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct SummaryStats {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    pub nodes: usize,
    pub edges: usize,
}

impl ValidationSummary {
    pub fn new(diagram: impl Into<String>, issues: Vec<ValidationIssue>, nodes: usize, edges: usize) -> Self {
        let count = |severity| issues.iter().filter(|i| i.severity == severity).count();
        let summary = SummaryStats {
            errors: count(Severity::Error),
            warnings: count(Severity::Warning),
            info: count(Severity::Info),
            nodes,
            edges,
        };
        Self {
            diagram: diagram.into(),
            issues,
            summary,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.summary.warnings > 0
    }

    /// Whether the diagram should be rejected; `strict` promotes warnings
    pub fn is_failure(&self, strict: bool) -> bool {
        self.has_errors() || (strict && self.has_warnings())
    }
}

/// Validate a diagram of either kind
pub fn validate_diagram(diagram: &Diagram) -> ValidationSummary {
    match diagram {
        Diagram::Er(er) => ValidationSummary::new(
            &er.name,
            validate_er(er),
            er.data.nodes.len(),
            er.data.edges.len(),
        ),
        // Relational diagrams are converter output; nothing to check
        Diagram::Relational(rel) => {
            ValidationSummary::new(&rel.name, Vec::new(), rel.data.nodes.len(), rel.data.edges.len())
        }
    }
}

/// All semantic issues of an ER diagram, in a stable order
pub fn validate_er(diagram: &ErDiagram) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let graph = &diagram.data;

    let mut seen: AHashSet<&str> = AHashSet::new();
    let mut reported: AHashSet<&str> = AHashSet::new();
    for node in &graph.nodes {
        let id = node.id();
        if !seen.insert(id) && reported.insert(id) {
            issues.push(
                ValidationIssue::error(
                    "DUPLICATE_NODE_ID",
                    format!("node id '{}' is used more than once", id),
                )
                .with_location(Location::node(id)),
            );
        }
    }
    let node_ids = seen;

    let entities: AHashMap<&str, &EntityNode> = graph
        .nodes
        .iter()
        .filter_map(|n| match n {
            ErNode::Entity(e) => Some((e.id(), e)),
            _ => None,
        })
        .collect();
    let attributes: AHashMap<&str, &AttributeNode> = graph
        .nodes
        .iter()
        .filter_map(|n| match n {
            ErNode::Attribute(a) => Some((a.id(), a)),
            _ => None,
        })
        .collect();

    check_attributes(graph.nodes.iter(), &node_ids, &attributes, &mut issues);
    check_entities(diagram, &entities, &mut issues);
    check_relationships(diagram, &entities, &mut issues);
    check_edges(diagram, &node_ids, &mut issues);

    issues
}

fn check_attributes<'a>(
    nodes: impl Iterator<Item = &'a ErNode>,
    node_ids: &AHashSet<&str>,
    attributes: &AHashMap<&str, &'a AttributeNode>,
    issues: &mut Vec<ValidationIssue>,
) {
    let mut with_children: AHashSet<&str> = AHashSet::new();
    for attribute in attributes.values() {
        if let Some(parent) = attribute.parent_id() {
            with_children.insert(parent);
        }
    }

    for node in nodes {
        let ErNode::Attribute(attribute) = node else {
            continue;
        };
        let id = attribute.id();

        match attribute.parent_id() {
            None => issues.push(
                ValidationIssue::warning(
                    "ORPHAN_ATTRIBUTE",
                    format!("attribute '{}' has no parent", attribute.label()),
                )
                .with_location(Location::node(id)),
            ),
            Some(parent) if !node_ids.contains(parent) => issues.push(
                ValidationIssue::warning(
                    "DANGLING_ATTRIBUTE_PARENT",
                    format!(
                        "attribute '{}' names parent '{}', which is not a node",
                        attribute.label(),
                        parent
                    ),
                )
                .with_location(Location::node(id)),
            ),
            Some(_) => {}
        }

        if on_parent_cycle(attributes, id) {
            issues.push(
                ValidationIssue::error(
                    "ATTRIBUTE_CYCLE",
                    format!("attribute '{}' is its own ancestor", attribute.label()),
                )
                .with_location(Location::node(id)),
            );
        }

        if attribute.flags().contains(AttributeFlag::Composite) && !with_children.contains(id) {
            issues.push(
                ValidationIssue::warning(
                    "EMPTY_COMPOSITE",
                    format!("composite attribute '{}' has no parts", attribute.label()),
                )
                .with_location(Location::node(id)),
            );
        }
    }
}

/// Whether following parents from `start` leads back to it
fn on_parent_cycle(attributes: &AHashMap<&str, &AttributeNode>, start: &str) -> bool {
    let mut visited: AHashSet<&str> = AHashSet::new();
    let mut current = attributes.get(start).and_then(|a| a.parent_id());
    while let Some(id) = current {
        if id == start {
            return true;
        }
        if !visited.insert(id) {
            return false;
        }
        current = attributes.get(id).and_then(|a| a.parent_id());
    }
    false
}

fn check_entities(
    diagram: &ErDiagram,
    entities: &AHashMap<&str, &EntityNode>,
    issues: &mut Vec<ValidationIssue>,
) {
    let mut identified: AHashSet<&str> = AHashSet::new();
    for node in &diagram.data.nodes {
        let ErNode::Relationship(rel) = node else {
            continue;
        };
        if !rel.data.is_identifying {
            continue;
        }
        if let Some((source, target)) = rel.sides() {
            identified.insert(source.id.as_str());
            identified.insert(target.id.as_str());
        }
    }

    for node in &diagram.data.nodes {
        let ErNode::Entity(entity) = node else {
            continue;
        };
        let id = entity.id();

        if let Some(parent) = entity.parent_id() {
            if !entities.contains_key(parent) {
                issues.push(
                    ValidationIssue::warning(
                        "MISSING_SUPERTYPE",
                        format!(
                            "entity '{}' names supertype '{}', which is not an entity",
                            entity.label(),
                            parent
                        ),
                    )
                    .with_location(Location::node(id)),
                );
            }
        }

        if entity.is_weak() && !identified.contains(id) {
            issues.push(
                ValidationIssue::warning(
                    "WEAK_WITHOUT_IDENTIFYING",
                    format!(
                        "weak entity '{}' has no identifying relationship and keeps its own key",
                        entity.label()
                    ),
                )
                .with_location(Location::node(id)),
            );
        }
    }
}

fn check_relationships(
    diagram: &ErDiagram,
    entities: &AHashMap<&str, &EntityNode>,
    issues: &mut Vec<ValidationIssue>,
) {
    for node in &diagram.data.nodes {
        let ErNode::Relationship(rel) = node else {
            continue;
        };
        let id = rel.id();

        let Some((source, target)) = rel.sides() else {
            issues.push(
                ValidationIssue::warning(
                    "MISSING_ENTITY_DETAILS",
                    format!("relationship '{}' is missing a side and will be skipped", rel.label()),
                )
                .with_location(Location::node(id)),
            );
            continue;
        };

        if source.is_disabled() || target.is_disabled() {
            issues.push(
                ValidationIssue::info(
                    "DISABLED_RELATIONSHIP",
                    format!("relationship '{}' has an exact maximum of 0 and is skipped", rel.label()),
                )
                .with_location(Location::node(id)),
            );
        }

        for details in [source, target] {
            if !entities.contains_key(details.id.as_str()) {
                issues.push(
                    ValidationIssue::warning(
                        "UNKNOWN_RELATIONSHIP_ENTITY",
                        format!(
                            "relationship '{}' refers to '{}', which is not an entity",
                            rel.label(),
                            details.id
                        ),
                    )
                    .with_location(Location::node(id)),
                );
            }
        }
    }
}

fn check_edges(diagram: &ErDiagram, node_ids: &AHashSet<&str>, issues: &mut Vec<ValidationIssue>) {
    for edge in &diagram.data.edges {
        let id = edge.id();

        if matches!(edge, ErEdge::Relationship(_) | ErEdge::SelfRelationship(_))
            && !RELATIONSHIP_EDGE_ID_RE.is_match(id)
        {
            issues.push(
                ValidationIssue::warning(
                    "MALFORMED_EDGE_ID",
                    format!("relationship edge id '{}' is not '<a>-><b>;<c>-><d>'", id),
                )
                .with_location(Location::edge(id)),
            );
        }

        let (source, target) = edge.endpoints();
        for endpoint in [source, target] {
            if !node_ids.contains(endpoint) {
                issues.push(
                    ValidationIssue::warning(
                        "DANGLING_EDGE",
                        format!("edge endpoint '{}' is not a node", endpoint),
                    )
                    .with_location(Location::edge(id)),
                );
            }
        }
    }
}
