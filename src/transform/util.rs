//! Table, column and edge constructors plus attribute ancestry queries.

use super::KeyGen;
use crate::model::{
    AttributeFlag, AttributeNode, EntityKind, EntityNode, EdgeMarker, ForeignKeyProps, NodeFrame,
    RelationalEdge, RelationalEdgeData, RelationalEdgeKind, SimpleColumn, SqlType, TableColumn,
    TableData, TableNode,
};
use ahash::{AHashMap, AHashSet};
use indexmap::IndexMap;

/// Attributes by id, in input order
pub type AttributeIndex<'a> = IndexMap<&'a str, &'a AttributeNode>;

/// Empty table carrying the geometry of the node it was derived from
pub fn table_from_frame(id: &str, label: &str, frame: &NodeFrame) -> TableNode {
    TableNode {
        frame: NodeFrame {
            id: id.to_string(),
            position: frame.position,
            measured: frame.measured,
            dragging: Some(false),
            selected: Some(false),
        },
        data: TableData {
            label: label.to_string(),
            is_connectable: true,
            is_selected: false,
            is_fact_table: None,
            columns: Vec::new(),
        },
    }
}

pub fn base_table_from_entity(entity: &EntityNode) -> TableNode {
    table_from_frame(entity.id(), entity.label(), &entity.frame)
}

/// Synthetic `INT` primary key; the name is kept as given
pub fn primary_key_column(keys: &mut KeyGen, name: &str) -> TableColumn {
    let mut column = TableColumn::new(keys.next_uuid(), name, SqlType::Int).primary();
    column.is_unique = true;
    column
}

/// Synthetic foreign-key column; the name is lowercased
pub fn foreign_key_column(
    keys: &mut KeyGen,
    name: &str,
    sql_type: SqlType,
    props: ForeignKeyProps,
    optional: bool,
) -> TableColumn {
    let mut column = TableColumn::new(
        format!("fk_{}", keys.next_uuid()),
        name.to_lowercase(),
        sql_type,
    );
    column.is_foreign_key = true;
    column.is_optional = optional;
    column.foreign_key_props = Some(props);
    column
}

pub fn primary_keys(columns: &[TableColumn]) -> Vec<&TableColumn> {
    columns.iter().filter(|c| c.is_primary_key).collect()
}

/// Key columns another table must reference to point at `table`.
///
/// A weak entity's table is referenced through its identifying key once it
/// has one, so a placeholder that cleanup will remove is never referenced.
pub fn referenced_key(table: &TableNode, kind: EntityKind) -> Vec<TableColumn> {
    let pks: Vec<TableColumn> = table.primary_keys().cloned().collect();
    if kind != EntityKind::Weak {
        return pks;
    }
    let identifying: Vec<TableColumn> = pks
        .iter()
        .filter(|c| c.is_identifying_key())
        .cloned()
        .collect();
    if identifying.is_empty() {
        pks
    } else {
        identifying
    }
}

pub fn fk_simple_column(column: &TableColumn, name: &str) -> SimpleColumn {
    SimpleColumn {
        id: format!("fk_{}", column.id),
        name: name.to_string(),
        sql_type: column.sql_type,
    }
}

/// Every referenced fragment under the same name
pub fn fragments_named(key: &[TableColumn], name: &str) -> Vec<SimpleColumn> {
    key.iter().map(|pk| fk_simple_column(pk, name)).collect()
}

/// Referenced fragments named `<name>_<n>` when there is more than one
pub fn fragments_numbered(key: &[TableColumn], name: &str) -> Vec<SimpleColumn> {
    if key.len() == 1 {
        return fragments_named(key, name);
    }
    key.iter()
        .enumerate()
        .map(|(i, pk)| fk_simple_column(pk, &format!("{}_{}", name, i + 1)))
        .collect()
}

pub fn foreign_key_props(
    keys: &mut KeyGen,
    source_table_id: &str,
    columns: Vec<SimpleColumn>,
) -> ForeignKeyProps {
    ForeignKeyProps {
        foreign_key_group_id: keys.next_uuid(),
        source_table_id: source_table_id.to_string(),
        columns,
    }
}

/// Edge from the referenced table (`source_id`) to the referencing one
pub fn relational_edge(source_id: &str, target_id: &str, props: &ForeignKeyProps) -> RelationalEdge {
    let group = &props.foreign_key_group_id;
    RelationalEdge {
        id: format!("{}->{}_{}", source_id, target_id, group),
        kind: RelationalEdgeKind::Relational,
        source: source_id.to_string(),
        target: target_id.to_string(),
        target_handle: format!("foreign-key-handle-{}", group),
        marker_start: EdgeMarker::default(),
        data: RelationalEdgeData {
            foreign_key_props: props.clone(),
        },
    }
}

pub fn has_flag(attribute: &AttributeNode, flag: AttributeFlag) -> bool {
    attribute.flags().contains(flag)
}

/// Upward walk over attribute parents, nearest first.
///
/// Stops at the first parent that is not an attribute, and at the first
/// repeated id so a cyclic parent chain terminates.
pub struct AttributeAncestors<'i, 'a> {
    attributes: &'i AttributeIndex<'a>,
    next: Option<&'a str>,
    visited: AHashSet<&'a str>,
}

impl<'i, 'a> AttributeAncestors<'i, 'a> {
    pub fn of(attributes: &'i AttributeIndex<'a>, id: &'a str) -> Self {
        let mut visited = AHashSet::new();
        visited.insert(id);
        let next = attributes.get(id).and_then(|a| a.parent_id());
        Self {
            attributes,
            next,
            visited,
        }
    }
}

impl<'i, 'a> Iterator for AttributeAncestors<'i, 'a> {
    type Item = &'a AttributeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        if !self.visited.insert(id) {
            log::debug!("attribute parent chain loops at {}", id);
            return None;
        }
        let parent = *self.attributes.get(id)?;
        self.next = parent.parent_id();
        Some(parent)
    }
}

pub fn is_any_ancestor_derived(attributes: &AttributeIndex<'_>, id: &str) -> bool {
    any_ancestor_has(attributes, id, AttributeFlag::Derived)
}

pub fn is_any_ancestor_optional(attributes: &AttributeIndex<'_>, id: &str) -> bool {
    any_ancestor_has(attributes, id, AttributeFlag::Optional)
}

fn any_ancestor_has(attributes: &AttributeIndex<'_>, id: &str, flag: AttributeFlag) -> bool {
    let Some((&key, _)) = attributes.get_key_value(id) else {
        return false;
    };
    AttributeAncestors::of(attributes, key).any(|a| has_flag(a, flag))
}

/// Unique-group numbers of every attribute ancestor, ascending
pub fn ancestor_unique_groups(
    attributes: &AttributeIndex<'_>,
    groups: &AHashMap<&str, u32>,
    id: &str,
) -> Vec<u32> {
    let Some((&key, _)) = attributes.get_key_value(id) else {
        return Vec::new();
    };
    let mut numbers: Vec<u32> = AttributeAncestors::of(attributes, key)
        .filter_map(|a| groups.get(a.id()).copied())
        .collect();
    numbers.sort_unstable();
    numbers.dedup();
    numbers
}
