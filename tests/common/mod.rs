//! Builders for ER diagrams used across the integration tests.

#![allow(dead_code)]

use erd_relational::model::{
    AttributeData, AttributeFlag, AttributeFlags, AttributeNode, DiagramEnvelope, DiagramType,
    EntityData, EntityDetails, EntityKind, EntityNode, ErDiagram, ErEdge, ErGraph, ErNode,
    ExactConstraints, MaxCardinality, MinCardinality, NodeFrame, RelationalDiagram,
    RelationshipData, RelationshipNode, TableColumn, TableNode,
};
use erd_relational::transform::{transform_er_with_stats, TransformOptions, TransformStats};

pub fn entity(id: &str, label: &str) -> ErNode {
    entity_of_kind(id, label, EntityKind::Regular, None)
}

pub fn weak_entity(id: &str, label: &str) -> ErNode {
    entity_of_kind(id, label, EntityKind::Weak, None)
}

pub fn subtype(id: &str, label: &str, parent: &str) -> ErNode {
    entity_of_kind(id, label, EntityKind::Regular, Some(parent))
}

pub fn entity_of_kind(id: &str, label: &str, kind: EntityKind, parent: Option<&str>) -> ErNode {
    ErNode::Entity(EntityNode {
        frame: NodeFrame::new(id),
        data: EntityData {
            label: label.to_string(),
            is_connectable: Some(true),
            is_selected: Some(false),
            kind,
            parent_id: parent.map(str::to_string),
        },
        supertype_definition: None,
        total_specialization: None,
    })
}

pub fn attribute(id: &str, label: &str, parent: &str, flags: &[AttributeFlag]) -> ErNode {
    let types = flags
        .iter()
        .fold(AttributeFlags::default(), |acc, &flag| acc.with(flag));
    ErNode::Attribute(AttributeNode {
        frame: NodeFrame::new(id),
        parent_id: Some(parent.to_string()),
        data: AttributeData {
            label: label.to_string(),
            is_connectable: Some(true),
            is_selected: Some(false),
            types,
        },
    })
}

pub fn side(entity: &str, min: MinCardinality, max: MaxCardinality) -> EntityDetails {
    EntityDetails {
        id: entity.to_string(),
        exact_constraints: None,
        min_cardinality: Some(min),
        max_cardinality: Some(max),
    }
}

pub fn one(entity: &str) -> EntityDetails {
    side(entity, MinCardinality::Mandatory, MaxCardinality::One)
}

pub fn many(entity: &str) -> EntityDetails {
    side(entity, MinCardinality::Mandatory, MaxCardinality::Many)
}

pub fn optional_one(entity: &str) -> EntityDetails {
    side(entity, MinCardinality::Optional, MaxCardinality::One)
}

/// Side with an exact maximum of zero
pub fn disabled(entity: &str) -> EntityDetails {
    EntityDetails {
        exact_constraints: Some(ExactConstraints {
            role: String::new(),
            min: Some(0),
            max: Some(0),
        }),
        ..one(entity)
    }
}

pub fn relationship_node(
    id: &str,
    label: &str,
    source: Option<EntityDetails>,
    target: Option<EntityDetails>,
) -> RelationshipNode {
    let self_referencing = matches!((&source, &target), (Some(s), Some(t)) if s.id == t.id);
    RelationshipNode {
        frame: NodeFrame::new(id),
        data: RelationshipData {
            label: label.to_string(),
            is_connectable: Some(true),
            is_selected: Some(false),
            is_identifying: false,
            is_self_referencing: self_referencing,
            source_entity_details: source,
            target_entity_details: target,
        },
    }
}

pub fn relationship(id: &str, label: &str, source: EntityDetails, target: EntityDetails) -> ErNode {
    ErNode::Relationship(relationship_node(id, label, Some(source), Some(target)))
}

pub fn identifying(id: &str, label: &str, source: EntityDetails, target: EntityDetails) -> ErNode {
    let mut node = relationship_node(id, label, Some(source), Some(target));
    node.data.is_identifying = true;
    ErNode::Relationship(node)
}

pub fn diagram(name: &str, nodes: Vec<ErNode>) -> ErDiagram {
    diagram_with_edges(name, nodes, Vec::new())
}

pub fn diagram_with_edges(name: &str, nodes: Vec<ErNode>, edges: Vec<ErEdge>) -> ErDiagram {
    DiagramEnvelope {
        diagram_type: DiagramType::Er,
        id: 1,
        name: name.to_string(),
        folder: None,
        updated_at_timestamp: Some(1_700_000_000),
        data: ErGraph {
            nodes,
            edges,
            viewport: None,
        },
    }
}

pub fn fixed_options() -> TransformOptions {
    TransformOptions {
        updated_at: Some(1_700_000_100),
    }
}

pub fn convert(er: &ErDiagram) -> RelationalDiagram {
    convert_with_stats(er).0
}

pub fn convert_with_stats(er: &ErDiagram) -> (RelationalDiagram, TransformStats) {
    transform_er_with_stats(er, &fixed_options())
}

pub fn table<'a>(diagram: &'a RelationalDiagram, id: &str) -> &'a TableNode {
    diagram
        .data
        .table(id)
        .unwrap_or_else(|| panic!("table {} missing", id))
}

pub fn column<'a>(table: &'a TableNode, name: &str) -> &'a TableColumn {
    table
        .columns()
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("column {} missing from {}", name, table.label()))
}

pub fn column_names(table: &TableNode) -> Vec<&str> {
    table.columns().iter().map(|c| c.name.as_str()).collect()
}

pub fn foreign_keys(table: &TableNode) -> Vec<&TableColumn> {
    table.columns().iter().filter(|c| c.is_foreign_key).collect()
}

pub fn primary_keys(table: &TableNode) -> Vec<&TableColumn> {
    table.primary_keys().collect()
}
