//! Where a relationship's foreign key lives.
//!
//! Both the relationship pass and the attribute pass ask this module, so an
//! attribute written on a relationship always lands on the same table as the
//! relationship's own key.

use crate::model::{EntityDetails, EntityKind, EntityNode, RelationshipNode};
use indexmap::IndexMap;
use std::fmt;

/// Cardinality class of a relationship, from the two max bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    ManyToMany,
    OneToMany,
    ManyToOne,
    OneToOne,
}

impl Cardinality {
    pub fn of(source: &EntityDetails, target: &EntityDetails) -> Self {
        match (source.is_many(), target.is_many()) {
            (true, true) => Cardinality::ManyToMany,
            (false, true) => Cardinality::OneToMany,
            (true, false) => Cardinality::ManyToOne,
            (false, false) => Cardinality::OneToOne,
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::ManyToMany => write!(f, "M:N"),
            Cardinality::OneToMany => write!(f, "1:N"),
            Cardinality::ManyToOne => write!(f, "N:1"),
            Cardinality::OneToOne => write!(f, "1:1"),
        }
    }
}

/// Resolved placement of one relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement<'r> {
    /// M:N: a new table keyed by the relationship id
    Associative {
        source: &'r EntityDetails,
        target: &'r EntityDetails,
    },
    /// The `many` side's table gets a foreign key to the `one` side
    ForeignKey {
        one: &'r EntityDetails,
        many: &'r EntityDetails,
        one_to_one: bool,
    },
}

impl<'r> Placement<'r> {
    /// Table that carries the relationship (and its attributes)
    pub fn owner_table_id<'a>(&self, relationship: &'a RelationshipNode) -> &'a str
    where
        'r: 'a,
    {
        match *self {
            Placement::Associative { .. } => relationship.id(),
            Placement::ForeignKey { many, .. } => &many.id,
        }
    }
}

/// Both sides of `relationship` when it takes part in the conversion.
///
/// Relationships missing a side, or with an exact maximum of zero on either
/// side, are placeholders and yield `None`.
pub fn active_sides(relationship: &RelationshipNode) -> Option<(&EntityDetails, &EntityDetails)> {
    let (source, target) = relationship.sides()?;
    if source.is_disabled() || target.is_disabled() {
        return None;
    }
    Some((source, target))
}

pub fn placement<'r>(
    entities: &IndexMap<&str, &EntityNode>,
    relationship: &'r RelationshipNode,
) -> Option<Placement<'r>> {
    let (source, target) = active_sides(relationship)?;

    let placed = match Cardinality::of(source, target) {
        Cardinality::ManyToMany => Placement::Associative { source, target },
        Cardinality::OneToMany => Placement::ForeignKey {
            one: source,
            many: target,
            one_to_one: false,
        },
        Cardinality::ManyToOne => Placement::ForeignKey {
            one: target,
            many: source,
            one_to_one: false,
        },
        Cardinality::OneToOne => {
            let (one, many) = one_to_one_sides(entities, relationship, source, target);
            Placement::ForeignKey {
                one,
                many,
                one_to_one: true,
            }
        }
    };
    Some(placed)
}

/// (referenced, referencing) for a 1:1 relationship.
///
/// An identifying relationship puts the key on its weak side. Otherwise the
/// optional side takes it, and the target when neither side is optional.
fn one_to_one_sides<'r>(
    entities: &IndexMap<&str, &EntityNode>,
    relationship: &RelationshipNode,
    source: &'r EntityDetails,
    target: &'r EntityDetails,
) -> (&'r EntityDetails, &'r EntityDetails) {
    if relationship.data.is_identifying {
        let is_weak = |details: &EntityDetails| {
            entities
                .get(details.id.as_str())
                .map(|e| e.kind() == EntityKind::Weak)
                .unwrap_or(false)
        };
        if is_weak(source) {
            return (target, source);
        }
        if is_weak(target) {
            return (source, target);
        }
    }

    if target.is_optional() {
        (source, target)
    } else if source.is_optional() {
        (target, source)
    } else {
        // both mandatory: key goes on the target
        (source, target)
    }
}
