//! ER to relational transformation.
//!
//! The conversion runs a fixed sequence of passes over one shared working
//! state:
//! - entities become tables with a primary key (subtypes inherit theirs)
//! - relationships add foreign keys or associative tables
//! - weak entities drop their placeholder key once identified
//! - attributes become columns or satellite tables
//!
//! Every pass skips elements it cannot resolve and keeps going; nothing in
//! here returns an error.

mod attribute;
mod entity;
mod keys;
mod placement;
mod relationship;
mod util;
mod weak;

pub use keys::KeyGen;
pub use placement::{placement, Cardinality, Placement};
pub use util::{
    ancestor_unique_groups, is_any_ancestor_derived, is_any_ancestor_optional, AttributeAncestors,
};

use crate::model::{
    AttributeNode, Diagram, DiagramType, EntityNode, ErDiagram, LabelNode, RelationalDiagram,
    RelationalEdge, RelationalGraph, RelationalNode, RelationshipNode, TableNode,
};
use crate::model::{DiagramEnvelope, ErNode};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::Serialize;

/// Knobs for a single conversion
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    /// Fixed `updatedAtTimestamp` for the output (defaults to now)
    pub updated_at: Option<i64>,
}

/// Counters collected while converting one diagram
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct TransformStats {
    /// Tables in the output graph
    pub tables: usize,
    /// Tables created from entities
    pub entity_tables: usize,
    /// Tables created for M:N relationships
    pub associative_tables: usize,
    /// Tables created for multivalued attributes
    pub satellite_tables: usize,
    /// Foreign-key edges in the output graph
    pub edges: usize,
    /// Columns across all tables
    pub columns: usize,
    /// Relationships left out (incomplete, disabled or unresolvable)
    pub skipped_relationships: usize,
    /// Attributes left out (derived, orphaned or unresolvable)
    pub skipped_attributes: usize,
}

impl TransformStats {
    pub fn merge(&mut self, other: &TransformStats) {
        self.tables += other.tables;
        self.entity_tables += other.entity_tables;
        self.associative_tables += other.associative_tables;
        self.satellite_tables += other.satellite_tables;
        self.edges += other.edges;
        self.columns += other.columns;
        self.skipped_relationships += other.skipped_relationships;
        self.skipped_attributes += other.skipped_attributes;
    }
}

/// ER nodes partitioned by kind, in input order
#[derive(Debug, Default)]
pub struct ErNodeSets<'a> {
    pub labels: Vec<&'a LabelNode>,
    pub entities: IndexMap<&'a str, &'a EntityNode>,
    pub relationships: IndexMap<&'a str, &'a RelationshipNode>,
    pub attributes: IndexMap<&'a str, &'a AttributeNode>,
}

impl<'a> ErNodeSets<'a> {
    /// Later nodes win when ids repeat within a kind
    pub fn classify(nodes: &'a [ErNode]) -> Self {
        let mut sets = Self::default();
        for node in nodes {
            match node {
                ErNode::Label(n) => sets.labels.push(n),
                ErNode::Entity(n) => {
                    sets.entities.insert(n.id(), n);
                }
                ErNode::Relationship(n) => {
                    sets.relationships.insert(n.id(), n);
                }
                ErNode::Attribute(n) => {
                    sets.attributes.insert(n.id(), n);
                }
            }
        }
        sets
    }
}

/// Working state of one conversion, threaded through every pass
pub(crate) struct Context<'a> {
    pub er: &'a ErNodeSets<'a>,
    pub tables: IndexMap<String, TableNode>,
    pub edges: IndexMap<String, RelationalEdge>,
    pub keys: KeyGen,
    pub stats: TransformStats,
}

impl<'a> Context<'a> {
    fn new(er: &'a ErNodeSets<'a>, keys: KeyGen) -> Self {
        Self {
            er,
            tables: IndexMap::new(),
            edges: IndexMap::new(),
            keys,
            stats: TransformStats::default(),
        }
    }

    pub fn add_edge(&mut self, edge: RelationalEdge) {
        self.edges.insert(edge.id.clone(), edge);
    }
}

/// Convert a diagram to its relational form; relational input is returned as is
pub fn to_relational(diagram: Diagram) -> Diagram {
    to_relational_with(diagram, &TransformOptions::default())
}

pub fn to_relational_with(diagram: Diagram, options: &TransformOptions) -> Diagram {
    match diagram {
        Diagram::Relational(relational) => Diagram::Relational(relational),
        Diagram::Er(er) => Diagram::Relational(transform_er(&er, options)),
    }
}

pub fn transform_er(er: &ErDiagram, options: &TransformOptions) -> RelationalDiagram {
    transform_er_with_stats(er, options).0
}

/// Run every pass over `er` and assemble the output diagram
pub fn transform_er_with_stats(
    er: &ErDiagram,
    options: &TransformOptions,
) -> (RelationalDiagram, TransformStats) {
    let sets = ErNodeSets::classify(&er.data.nodes);
    let mut ctx = Context::new(&sets, KeyGen::for_diagram(&er.name, er.id));

    // Order matters: each pass reads keys written by the previous one
    entity::handle_entities(&mut ctx);
    relationship::handle_relationships(&mut ctx);
    weak::cleanup_weak_keys(&mut ctx);
    attribute::handle_attributes(&mut ctx);

    let Context {
        tables,
        edges,
        mut stats,
        ..
    } = ctx;

    stats.tables = tables.len();
    stats.edges = edges.len();
    stats.columns = tables.values().map(|t| t.data.columns.len()).sum();

    let mut nodes: Vec<RelationalNode> = sets
        .labels
        .iter()
        .map(|label| RelationalNode::Label((*label).clone()))
        .collect();
    nodes.extend(tables.into_values().map(RelationalNode::Table));

    log::debug!(
        "converted '{}': {} tables, {} edges, {} relationships and {} attributes skipped",
        er.name,
        stats.tables,
        stats.edges,
        stats.skipped_relationships,
        stats.skipped_attributes
    );

    let diagram = DiagramEnvelope {
        diagram_type: DiagramType::Relational,
        id: 0,
        name: format!("{}_Relational", er.name),
        folder: er.folder.clone(),
        updated_at_timestamp: Some(
            options
                .updated_at
                .unwrap_or_else(|| chrono::Utc::now().timestamp()),
        ),
        data: RelationalGraph {
            nodes,
            edges: edges.into_values().collect(),
            viewport: er.data.viewport.unwrap_or_default(),
        },
    };

    (diagram, stats)
}
