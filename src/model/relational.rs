//! Relational graph: tables, columns and foreign-key edges.

use super::{LabelNode, NodeFrame, SqlType, Viewport};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Node of a relational graph, tagged on `"type"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum RelationalNode {
    Table(TableNode),
    Label(LabelNode),
}

impl RelationalNode {
    pub fn id(&self) -> &str {
        match self {
            RelationalNode::Table(t) => &t.frame.id,
            RelationalNode::Label(l) => &l.frame.id,
        }
    }

    pub fn as_table(&self) -> Option<&TableNode> {
        match self {
            RelationalNode::Table(t) => Some(t),
            RelationalNode::Label(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TableNode {
    #[serde(flatten)]
    pub frame: NodeFrame,
    pub data: TableData,
}

impl TableNode {
    pub fn id(&self) -> &str {
        &self.frame.id
    }

    pub fn label(&self) -> &str {
        &self.data.label
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.data.columns
    }

    /// Append a column at the next free position
    pub fn push_column(&mut self, mut column: TableColumn) {
        column.position = self.data.columns.len();
        self.data.columns.push(column);
    }

    /// Renumber positions densely after columns were removed
    pub fn reindex(&mut self) {
        for (position, column) in self.data.columns.iter_mut().enumerate() {
            column.position = position;
        }
    }

    pub fn primary_keys(&self) -> impl Iterator<Item = &TableColumn> {
        self.data.columns.iter().filter(|c| c.is_primary_key)
    }

    pub fn column(&self, id: &str) -> Option<&TableColumn> {
        self.data.columns.iter().find(|c| c.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableData {
    pub label: String,
    #[serde(default)]
    pub is_connectable: bool,
    #[serde(default)]
    pub is_selected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_fact_table: Option<bool>,
    #[serde(default)]
    pub columns: Vec<TableColumn>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    pub id: String,
    pub name: String,
    /// Dense 0-based index within the owning table
    pub position: usize,
    #[serde(rename = "type")]
    pub sql_type: SqlType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default)]
    pub is_foreign_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key_props: Option<ForeignKeyProps>,
    /// Multi-column uniqueness groups this column belongs to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_numbers: Vec<u32>,
}

impl TableColumn {
    pub fn new(id: impl Into<String>, name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position: 0,
            sql_type,
            size: None,
            is_primary_key: false,
            is_optional: false,
            is_unique: false,
            is_foreign_key: false,
            foreign_key_props: None,
            group_numbers: Vec::new(),
        }
    }

    pub fn primary(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Part of a primary key that references another table
    pub fn is_identifying_key(&self) -> bool {
        self.is_primary_key && self.is_foreign_key
    }
}

/// Name and type of a referenced column, for rendering a foreign key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SimpleColumn {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub sql_type: SqlType,
}

/// One logical foreign key: a group id shared by its columns, the
/// referenced table and the referenced columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyProps {
    pub foreign_key_group_id: String,
    pub source_table_id: String,
    pub columns: Vec<SimpleColumn>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum RelationalEdgeKind {
    #[default]
    Relational,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    #[default]
    Arrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct EdgeMarker {
    #[serde(rename = "type")]
    pub kind: MarkerKind,
}

/// Foreign-key reference from the referenced table (source) to the
/// referencing table (target)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelationalEdge {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RelationalEdgeKind,
    pub source: String,
    pub target: String,
    pub target_handle: String,
    #[serde(default)]
    pub marker_start: EdgeMarker,
    pub data: RelationalEdgeData,
}

impl RelationalEdge {
    pub fn group_id(&self) -> &str {
        &self.data.foreign_key_props.foreign_key_group_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelationalEdgeData {
    pub foreign_key_props: ForeignKeyProps,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct RelationalGraph {
    #[serde(default)]
    pub nodes: Vec<RelationalNode>,
    #[serde(default)]
    pub edges: Vec<RelationalEdge>,
    #[serde(default)]
    pub viewport: Viewport,
}

impl RelationalGraph {
    pub fn tables(&self) -> impl Iterator<Item = &TableNode> {
        self.nodes.iter().filter_map(RelationalNode::as_table)
    }

    pub fn table(&self, id: &str) -> Option<&TableNode> {
        self.tables().find(|t| t.id() == id)
    }

    /// Edges whose foreign key lands on `target`
    pub fn edges_into<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a RelationalEdge> {
        self.edges.iter().filter(move |e| e.target == target)
    }
}
