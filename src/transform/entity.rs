//! Entities to tables.

use super::util::{
    base_table_from_entity, foreign_key_props, fk_simple_column, primary_key_column,
    relational_edge,
};
use super::Context;

/// One table per entity, then subtype keys turned into references to their supertype
pub(super) fn handle_entities(ctx: &mut Context<'_>) {
    let er = ctx.er;
    let entities = &er.entities;

    for (&id, entity) in entities.iter() {
        let mut table = base_table_from_entity(entity);
        // Subtypes borrow the supertype's key name; the key is linked below
        let key_owner = entity
            .parent_id()
            .and_then(|parent| entities.get(parent))
            .map(|parent| parent.label())
            .unwrap_or_else(|| entity.label());
        table.push_column(primary_key_column(&mut ctx.keys, &format!("{}_id", key_owner)));
        ctx.tables.insert(id.to_string(), table);
        ctx.stats.entity_tables += 1;
    }

    for (&id, entity) in entities.iter() {
        let Some(parent_id) = entity.parent_id() else {
            continue;
        };
        if parent_id == id {
            log::debug!("entity {} names itself as supertype, not linked", id);
            continue;
        }
        let Some(parent) = entities.get(parent_id) else {
            log::debug!("supertype {} of entity {} not found", parent_id, id);
            continue;
        };
        let Some(parent_key) = ctx
            .tables
            .get(parent_id)
            .and_then(|t| t.primary_keys().next().cloned())
        else {
            continue;
        };

        let props = foreign_key_props(
            &mut ctx.keys,
            parent_id,
            vec![fk_simple_column(&parent_key, &format!("fk_{}", parent.label()))],
        );

        let Some(table) = ctx.tables.get_mut(id) else {
            continue;
        };
        let Some(key) = table.data.columns.iter_mut().find(|c| c.is_primary_key) else {
            continue;
        };
        // The subtype's primary key doubles as its foreign key
        key.is_foreign_key = true;
        key.foreign_key_props = Some(props.clone());

        let edge = relational_edge(parent_id, id, &props);
        ctx.add_edge(edge);
    }
}
