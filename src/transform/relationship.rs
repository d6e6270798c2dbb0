//! Relationships to foreign keys and associative tables.

use super::placement::{placement, Placement};
use super::util::{
    foreign_key_column, foreign_key_props, fragments_named, fragments_numbered, referenced_key,
    relational_edge, table_from_frame,
};
use super::Context;
use crate::model::{EntityDetails, RelationshipNode, SqlType, TableColumn};

pub(super) fn handle_relationships(ctx: &mut Context<'_>) {
    let er = ctx.er;

    // identifying keys must exist before anything references a weak entity
    let (identifying, regular): (Vec<&RelationshipNode>, Vec<&RelationshipNode>) = er
        .relationships
        .values()
        .copied()
        .partition(|r| r.data.is_identifying);

    for relationship in identifying.into_iter().chain(regular) {
        let Some(placed) = placement(&er.entities, relationship) else {
            log::debug!(
                "relationship {} ({}) is incomplete or disabled, skipped",
                relationship.id(),
                relationship.label()
            );
            ctx.stats.skipped_relationships += 1;
            continue;
        };

        let applied = match placed {
            Placement::Associative { source, target } => {
                many_to_many(ctx, relationship, source, target)
            }
            Placement::ForeignKey {
                one,
                many,
                one_to_one,
            } => one_to_many(ctx, relationship, one, many, one_to_one),
        };

        if !applied {
            ctx.stats.skipped_relationships += 1;
        }
    }
}

/// Key columns of the table behind `details`, empty when it cannot be resolved
fn side_key(ctx: &Context<'_>, details: &EntityDetails) -> Vec<TableColumn> {
    let (Some(entity), Some(table)) = (
        ctx.er.entities.get(details.id.as_str()),
        ctx.tables.get(details.id.as_str()),
    ) else {
        return Vec::new();
    };
    referenced_key(table, entity.kind())
}

fn side_label(ctx: &Context<'_>, details: &EntityDetails) -> String {
    ctx.er
        .entities
        .get(details.id.as_str())
        .map(|e| e.label().to_string())
        .unwrap_or_else(|| details.id.clone())
}

/// Associative table keyed by one foreign key per side
fn many_to_many(
    ctx: &mut Context<'_>,
    relationship: &RelationshipNode,
    source: &EntityDetails,
    target: &EntityDetails,
) -> bool {
    let source_key = side_key(ctx, source);
    let target_key = side_key(ctx, target);
    if source_key.is_empty() || target_key.is_empty() {
        log::debug!(
            "relationship {}: a side has no primary key, no associative table",
            relationship.id()
        );
        return false;
    }

    let (source_label, target_label) = if relationship.data.is_self_referencing {
        (
            format!("{}(1)", side_label(ctx, source)),
            format!("{}(2)", side_label(ctx, target)),
        )
    } else {
        (side_label(ctx, source), side_label(ctx, target))
    };

    let mut table = table_from_frame(relationship.id(), relationship.label(), &relationship.frame);

    let mut edges = Vec::with_capacity(2);
    for (details, key, label) in [
        (source, &source_key, &source_label),
        (target, &target_key, &target_label),
    ] {
        let props = foreign_key_props(&mut ctx.keys, &details.id, fragments_numbered(key, label));
        let mut column = foreign_key_column(&mut ctx.keys, label, SqlType::Int, props.clone(), false);
        column.is_primary_key = true;
        table.push_column(column);
        edges.push(relational_edge(&details.id, relationship.id(), &props));
    }

    ctx.tables.insert(relationship.id().to_string(), table);
    ctx.stats.associative_tables += 1;
    for edge in edges {
        ctx.add_edge(edge);
    }
    true
}

/// One foreign-key column on the `many` table referencing the `one` table
fn one_to_many(
    ctx: &mut Context<'_>,
    relationship: &RelationshipNode,
    one: &EntityDetails,
    many: &EntityDetails,
    one_to_one: bool,
) -> bool {
    let key = side_key(ctx, one);
    if key.is_empty() {
        log::debug!(
            "relationship {}: referenced table {} has no primary key",
            relationship.id(),
            one.id
        );
        return false;
    }
    if !ctx.tables.contains_key(many.id.as_str()) {
        log::debug!(
            "relationship {}: referencing table {} not found",
            relationship.id(),
            many.id
        );
        return false;
    }

    let label = relationship.label();
    let props = foreign_key_props(&mut ctx.keys, &one.id, fragments_named(&key, label));
    let mut column = foreign_key_column(&mut ctx.keys, label, SqlType::Int, props.clone(), false);
    // Identifying relationships make the key part of the weak side's identity
    column.is_primary_key = relationship.data.is_identifying;
    column.is_unique = one_to_one;

    if let Some(table) = ctx.tables.get_mut(many.id.as_str()) {
        table.push_column(column);
    }
    ctx.add_edge(relational_edge(&one.id, &many.id, &props));
    true
}
