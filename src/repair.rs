//! Pre-conversion repair of editor output.
//!
//! Diagrams saved by the editor do not always carry the links the converter
//! reads. Two fixes are applied in place:
//! - attribute parents are taken from `Attribute` edges
//! - relationship sides are pointed at the real entities named by the
//!   relationship's edges, and those edges are re-keyed to match

use crate::model::{ErDiagram, ErEdge, ErNode, RelationshipEdgeData};
use ahash::AHashMap;
use serde::Serialize;

/// What a repair pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    /// Attributes whose `parentId` was set from an edge
    pub attributes_reparented: usize,
    /// Relationships whose entity details were rewritten
    pub relationships_reconciled: usize,
}

impl RepairReport {
    pub fn is_empty(&self) -> bool {
        self.attributes_reparented == 0 && self.relationships_reconciled == 0
    }
}

/// Apply both repairs to `diagram`
pub fn repair(diagram: &mut ErDiagram) -> RepairReport {
    let report = RepairReport {
        attributes_reparented: repair_attribute_parents(diagram),
        relationships_reconciled: reconcile_relationships(diagram),
    };
    if !report.is_empty() {
        log::debug!(
            "repaired '{}': {} attribute parent(s), {} relationship(s)",
            diagram.name,
            report.attributes_reparented,
            report.relationships_reconciled
        );
    }
    report
}

/// Set each attribute's parent from the `Attribute` edges pointing at it.
/// When several edges target the same attribute the last one wins.
pub fn repair_attribute_parents(diagram: &mut ErDiagram) -> usize {
    let parents: AHashMap<String, String> = diagram
        .data
        .edges
        .iter()
        .filter_map(|edge| match edge {
            ErEdge::Attribute(e) => Some((e.target.clone(), e.source.clone())),
            _ => None,
        })
        .collect();

    let mut changed = 0;
    for node in diagram.data.nodes.iter_mut() {
        let ErNode::Attribute(attribute) = node else {
            continue;
        };
        let Some(parent) = parents.get(&attribute.frame.id) else {
            continue;
        };
        if attribute.parent_id.as_deref() != Some(parent.as_str()) {
            attribute.parent_id = Some(parent.clone());
            changed += 1;
        }
    }
    changed
}

#[derive(Debug, Default)]
struct RealEndpoints {
    source: Option<String>,
    target: Option<String>,
}

impl RealEndpoints {
    fn both(&self) -> Option<(&str, &str)> {
        Some((self.source.as_deref()?, self.target.as_deref()?))
    }
}

/// Entity pair segment of a relationship edge id (`<rel>-><entity>;<pair>`)
fn endpoint_segment(edge_id: &str) -> Option<&str> {
    edge_id.split(';').nth(1)
}

fn relationship_edge_parts(edge: &ErEdge) -> Option<(&str, &str, &str)> {
    match edge {
        ErEdge::Relationship(e) => Some((&e.id, &e.source, &e.target)),
        ErEdge::SelfRelationship(e) => Some((&e.id, &e.source, &e.target)),
        _ => None,
    }
}

/// Point every relationship's sides at the entities its edges reach
pub fn reconcile_relationships(diagram: &mut ErDiagram) -> usize {
    let mut endpoints: AHashMap<String, RealEndpoints> = diagram
        .data
        .nodes
        .iter()
        .filter_map(|node| match node {
            ErNode::Relationship(r) => Some((r.frame.id.clone(), RealEndpoints::default())),
            _ => None,
        })
        .collect();

    for edge in &diagram.data.edges {
        let Some((id, relationship, entity)) = relationship_edge_parts(edge) else {
            continue;
        };
        let Some(entry) = endpoints.get_mut(relationship) else {
            continue;
        };
        let Some((from, to)) = endpoint_segment(id).and_then(|s| s.split_once("->")) else {
            log::debug!("relationship edge {} has no entity segment", id);
            continue;
        };
        // A self-referencing pair matches on both ends
        if from == entity {
            entry.source = Some(entity.to_string());
        }
        if to == entity {
            entry.target = Some(entity.to_string());
        }
    }

    let mut reconciled = 0;
    for node in diagram.data.nodes.iter_mut() {
        let ErNode::Relationship(relationship) = node else {
            continue;
        };
        let Some((source, target)) = endpoints
            .get(&relationship.frame.id)
            .and_then(RealEndpoints::both)
        else {
            continue;
        };
        let data = &mut relationship.data;
        if let (Some(source_details), Some(target_details)) = (
            data.source_entity_details.as_mut(),
            data.target_entity_details.as_mut(),
        ) {
            source_details.id = source.to_string();
            target_details.id = target.to_string();
            reconciled += 1;
        }
    }

    for edge in diagram.data.edges.iter_mut() {
        let (id, relationship, entity, data) = match edge {
            ErEdge::Relationship(e) => (&mut e.id, &e.source, &e.target, &mut e.data),
            ErEdge::SelfRelationship(e) => (&mut e.id, &e.source, &e.target, &mut e.data),
            _ => continue,
        };
        let Some((source, target)) = endpoints.get(relationship).and_then(RealEndpoints::both)
        else {
            continue;
        };
        *id = format!("{}->{};{}->{}", relationship, entity, source, target);
        if let Some(RelationshipEdgeData { id: data_id, .. }) = data.as_mut() {
            *data_id = format!("{}->{}", relationship, entity);
        }
    }

    reconciled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_segment() {
        assert_eq!(endpoint_segment("r->a;a->b"), Some("a->b"));
        assert_eq!(endpoint_segment("r->a"), None);
    }

    #[test]
    fn test_real_endpoints_need_both_sides() {
        let mut ends = RealEndpoints::default();
        ends.source = Some("a".to_string());
        assert!(ends.both().is_none());
        ends.target = Some("b".to_string());
        assert_eq!(ends.both(), Some(("a", "b")));
    }
}
