//! Placeholder key removal for identified weak entities.

use super::Context;

/// Drop primary-only columns from weak tables that gained an identifying key
pub(super) fn cleanup_weak_keys(ctx: &mut Context<'_>) {
    let er = ctx.er;

    for (&id, entity) in er.entities.iter() {
        if !entity.is_weak() {
            continue;
        }
        let Some(table) = ctx.tables.get_mut(id) else {
            continue;
        };
        if !table.data.columns.iter().any(|c| c.is_identifying_key()) {
            log::debug!("weak entity {} has no identifying key yet, placeholder kept", id);
            continue;
        }

        let before = table.data.columns.len();
        table
            .data
            .columns
            .retain(|c| !(c.is_primary_key && !c.is_foreign_key));
        table.reindex();
        log::debug!(
            "weak entity {}: removed {} placeholder key column(s)",
            id,
            before - table.data.columns.len()
        );
    }
}
