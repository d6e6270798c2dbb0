//! Attributes to columns and satellite tables.
//!
//! Runs in three passes:
//! 1. number unique attributes and composite attributes (both 1-based)
//! 2. index each composite's direct children
//! 3. place every non-derived attribute, either as a column on its owner
//!    table or, when multivalued, as a satellite table referencing the owner

use super::placement::placement;
use super::util::{
    ancestor_unique_groups, foreign_key_column, foreign_key_props, fragments_numbered, has_flag,
    is_any_ancestor_derived, is_any_ancestor_optional, primary_keys, relational_edge,
    table_from_frame, AttributeAncestors, AttributeIndex,
};
use super::Context;
use crate::model::{AttributeFlag, AttributeNode, SqlType, TableColumn};
use ahash::AHashMap;

/// Group numbering shared by the three passes
#[derive(Debug, Default)]
struct Groups<'a> {
    unique: AHashMap<&'a str, u32>,
    composite: AHashMap<&'a str, u32>,
    children: AHashMap<u32, Vec<&'a str>>,
}

impl<'a> Groups<'a> {
    fn build(attributes: &AttributeIndex<'a>) -> Self {
        let mut groups = Groups::default();
        let mut next_unique = 1;
        let mut next_composite = 1;

        for (&id, attribute) in attributes.iter() {
            if has_flag(attribute, AttributeFlag::Unique) {
                groups.unique.insert(id, next_unique);
                next_unique += 1;
            }
            if has_flag(attribute, AttributeFlag::Composite) {
                groups.composite.insert(id, next_composite);
                next_composite += 1;
            }
        }

        for (&id, attribute) in attributes.iter() {
            let Some(parent) = attribute.parent_id() else {
                continue;
            };
            if let Some(&group) = groups.composite.get(parent) {
                groups.children.entry(group).or_default().push(id);
            }
        }

        groups
    }

    fn children_of(&self, id: &str) -> &[&'a str] {
        self.composite
            .get(id)
            .and_then(|group| self.children.get(group))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Owner table of an attribute and the name prefix of its composite path
struct Owner {
    table_id: String,
    prefix: String,
}

pub(super) fn handle_attributes(ctx: &mut Context<'_>) {
    let er = ctx.er;
    let attributes = &er.attributes;
    let groups = Groups::build(attributes);

    for (&id, attribute) in attributes.iter() {
        if has_flag(attribute, AttributeFlag::Derived) || is_any_ancestor_derived(attributes, id) {
            log::debug!("attribute {} is derived, skipped", id);
            ctx.stats.skipped_attributes += 1;
            continue;
        }
        match multivalued_scope(attributes, attribute) {
            MultivaluedScope::Outside => {}
            // Emitted with the satellite table of its parent
            MultivaluedScope::SatelliteColumn => continue,
            MultivaluedScope::Nested => {
                log::debug!("attribute {} nested below a multivalued attribute, skipped", id);
                ctx.stats.skipped_attributes += 1;
                continue;
            }
        }

        let Some(owner) = resolve_owner(ctx, attribute) else {
            ctx.stats.skipped_attributes += 1;
            continue;
        };
        let column_name = format!("{}{}", owner.prefix, attribute.label()).to_lowercase();

        if has_flag(attribute, AttributeFlag::Multivalued) {
            let children: &[&str] = if has_flag(attribute, AttributeFlag::Composite) {
                groups.children_of(id)
            } else {
                &[]
            };
            if !satellite_table(ctx, attribute, &owner.table_id, &column_name, children) {
                ctx.stats.skipped_attributes += 1;
            }
        } else if has_flag(attribute, AttributeFlag::Composite) {
            // Children are placed on their own
            continue;
        } else {
            simple_column(ctx, attribute, &owner.table_id, column_name, &groups);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MultivaluedScope {
    /// No multivalued ancestor
    Outside,
    /// Direct child of a multivalued composite
    SatelliteColumn,
    /// Anywhere else below a multivalued attribute
    Nested,
}

fn multivalued_scope(attributes: &AttributeIndex<'_>, attribute: &AttributeNode) -> MultivaluedScope {
    let mut ancestors = AttributeAncestors::of(attributes, attribute.id());
    if let Some(parent) = ancestors.next() {
        if has_flag(parent, AttributeFlag::Multivalued) {
            return if has_flag(parent, AttributeFlag::Composite) {
                MultivaluedScope::SatelliteColumn
            } else {
                MultivaluedScope::Nested
            };
        }
    }
    if ancestors.any(|a| has_flag(a, AttributeFlag::Multivalued)) {
        MultivaluedScope::Nested
    } else {
        MultivaluedScope::Outside
    }
}

/// Walk up to the owning entity or relationship and find its table
fn resolve_owner(ctx: &Context<'_>, attribute: &AttributeNode) -> Option<Owner> {
    let er = ctx.er;
    let attributes = &er.attributes;

    let mut prefix = String::new();
    let mut owner_id = attribute.parent_id();
    for ancestor in AttributeAncestors::of(attributes, attribute.id()) {
        prefix = format!("{}_{}", ancestor.label(), prefix);
        owner_id = ancestor.parent_id();
    }

    let Some(owner_id) = owner_id else {
        log::debug!("attribute {} has no owner, skipped", attribute.id());
        return None;
    };

    let table_id = if er.entities.contains_key(owner_id) {
        owner_id
    } else if let Some(relationship) = er.relationships.get(owner_id) {
        let Some(placed) = placement(&er.entities, relationship) else {
            log::debug!(
                "attribute {} belongs to inactive relationship {}, skipped",
                attribute.id(),
                owner_id
            );
            return None;
        };
        placed.owner_table_id(relationship)
    } else {
        log::debug!(
            "attribute {}: owner {} is neither entity nor relationship, skipped",
            attribute.id(),
            owner_id
        );
        return None;
    };

    if !ctx.tables.contains_key(table_id) {
        log::debug!("attribute {}: owner table {} not found", attribute.id(), table_id);
        return None;
    }

    Some(Owner {
        table_id: table_id.to_string(),
        prefix,
    })
}

/// Satellite table for a multivalued attribute, keyed by the owner reference
/// plus either the composite children or a single value column.
///
/// The reference column is named after the owner table's label, not the
/// attribute, so every satellite of one owner shares the same key name.
/// A composite with no non-derived children has nothing to store and yields
/// no table.
fn satellite_table(
    ctx: &mut Context<'_>,
    attribute: &AttributeNode,
    owner_id: &str,
    column_name: &str,
    children: &[&str],
) -> bool {
    let er = ctx.er;
    let value_children: Vec<&AttributeNode> = children
        .iter()
        .filter_map(|child| er.attributes.get(*child).copied())
        .filter(|child| !has_flag(child, AttributeFlag::Derived))
        .collect();
    let composite = has_flag(attribute, AttributeFlag::Composite);
    if composite && value_children.is_empty() {
        log::debug!(
            "attribute {}: composite without stored children, no satellite table",
            attribute.id()
        );
        return false;
    }

    let Some(owner) = ctx.tables.get(owner_id) else {
        return false;
    };
    let owner_label = owner.label().to_string();
    let owner_key: Vec<TableColumn> = primary_keys(owner.columns()).into_iter().cloned().collect();
    if owner_key.is_empty() {
        log::debug!(
            "attribute {}: owner {} has no primary key, no satellite table",
            attribute.id(),
            owner_id
        );
        return false;
    }

    let mut table = table_from_frame(
        attribute.id(),
        &format!("{}_{}", owner_label, attribute.label()),
        &attribute.frame,
    );

    let props = foreign_key_props(
        &mut ctx.keys,
        owner_id,
        fragments_numbered(&owner_key, &owner_label),
    );
    let mut reference = foreign_key_column(&mut ctx.keys, &owner_label, SqlType::Int, props.clone(), false);
    reference.is_primary_key = true;
    table.push_column(reference);

    if composite {
        for child in value_children {
            let column =
                TableColumn::new(child.id(), child.label().to_lowercase(), SqlType::None).primary();
            table.push_column(column);
        }
    } else {
        let value = TableColumn::new(ctx.keys.next_uuid(), column_name, SqlType::None).primary();
        table.push_column(value);
    }

    ctx.tables.insert(attribute.id().to_string(), table);
    ctx.stats.satellite_tables += 1;
    ctx.add_edge(relational_edge(owner_id, attribute.id(), &props));
    true
}

fn simple_column(
    ctx: &mut Context<'_>,
    attribute: &AttributeNode,
    owner_id: &str,
    column_name: String,
    groups: &Groups<'_>,
) {
    let er = ctx.er;
    let attributes = &er.attributes;
    let id = attribute.id();

    let mut column = TableColumn::new(id, column_name, SqlType::None);
    column.is_optional =
        has_flag(attribute, AttributeFlag::Optional) || is_any_ancestor_optional(attributes, id);
    column.is_unique = has_flag(attribute, AttributeFlag::Unique);
    column.group_numbers = ancestor_unique_groups(attributes, &groups.unique, id);

    let Some(table) = ctx.tables.get_mut(owner_id) else {
        return;
    };
    // A unique attribute of an identified weak table is its discriminator
    if column.is_unique && table.primary_keys().any(|c| c.is_foreign_key) {
        column.is_primary_key = true;
    }
    table.push_column(column);
}
