//! Diagram data model.
//!
//! This module provides:
//! - Shared primitives (positions, viewport, folder metadata, SQL type tags)
//! - The ER graph: entities, attributes, relationships and their edges
//! - The relational graph: tables, columns and foreign-key edges
//! - The diagram envelope wrapping either graph kind

mod er;
mod relational;

pub use er::*;
pub use relational::*;

use schemars::JsonSchema;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Kind of diagram stored in a file, encoded as an integer on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagramType {
    /// Entity-Relationship diagram (`1`)
    Er,
    /// Relational schema diagram (`2`)
    Relational,
}

impl DiagramType {
    pub fn code(self) -> u8 {
        match self {
            DiagramType::Er => 1,
            DiagramType::Relational => 2,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(DiagramType::Er),
            2 => Some(DiagramType::Relational),
            _ => None,
        }
    }
}

impl fmt::Display for DiagramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagramType::Er => write!(f, "er"),
            DiagramType::Relational => write!(f, "relational"),
        }
    }
}

impl Serialize for DiagramType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for DiagramType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u64::deserialize(deserializer)?;
        DiagramType::from_code(code)
            .ok_or_else(|| D::Error::custom(format!("unknown diagramType: {}", code)))
    }
}

impl JsonSchema for DiagramType {
    fn schema_name() -> Cow<'static, str> {
        "DiagramType".into()
    }

    fn json_schema(_generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        schemars::json_schema!({
            "type": "integer",
            "enum": [1, 2]
        })
    }
}

/// Column type tag as understood by the diagram editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub enum SqlType {
    #[serde(rename = "INT")]
    Int,
    /// No type chosen yet (attribute-derived columns)
    #[default]
    None,
    Custom,
    #[serde(rename = "CHAR(n)")]
    Char,
    #[serde(rename = "DATE")]
    Date,
    #[serde(rename = "FLOAT")]
    Float,
    #[serde(rename = "NUMERIC(p s)")]
    Numeric,
    #[serde(rename = "VARCHAR(n)")]
    Varchar,
}

impl SqlType {
    pub fn as_str(self) -> &'static str {
        match self {
            SqlType::Int => "INT",
            SqlType::None => "None",
            SqlType::Custom => "Custom",
            SqlType::Char => "CHAR(n)",
            SqlType::Date => "DATE",
            SqlType::Float => "FLOAT",
            SqlType::Numeric => "NUMERIC(p s)",
            SqlType::Varchar => "VARCHAR(n)",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SqlType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        let base = upper.split('(').next().unwrap_or(&upper).trim();

        match base {
            "INT" | "INTEGER" => Ok(SqlType::Int),
            "NONE" => Ok(SqlType::None),
            "CUSTOM" => Ok(SqlType::Custom),
            "CHAR" => Ok(SqlType::Char),
            "DATE" => Ok(SqlType::Date),
            "FLOAT" => Ok(SqlType::Float),
            "NUMERIC" => Ok(SqlType::Numeric),
            "VARCHAR" => Ok(SqlType::Varchar),
            _ => Err(format!(
                "Unknown column type: {}. Valid options: INT, None, Custom, CHAR(n), DATE, FLOAT, NUMERIC(p s), VARCHAR(n)",
                s
            )),
        }
    }
}

/// Lower bound of a relationship side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum MinCardinality {
    Mandatory,
    Optional,
}

/// Upper bound of a relationship side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum MaxCardinality {
    One,
    Many,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Measured {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// Folder the diagram lives in, with an optional chain of parent folders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub name: String,
    /// Stored as a string; numeric ids from older files are accepted
    #[serde(deserialize_with = "string_or_number")]
    #[schemars(with = "String")]
    pub id: String,
    pub folder_type: i64,
    pub depth: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_folder: Option<Box<Folder>>,
}

/// Geometry and editor state common to every node kind
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct NodeFrame {
    pub id: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub measured: Measured,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dragging: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

impl NodeFrame {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// Free-floating text label, shared by both graph kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LabelNode {
    #[serde(flatten)]
    pub frame: NodeFrame,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<LabelData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabelData {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_connectable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_selected: Option<bool>,
}

/// Diagram envelope: metadata plus one graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiagramEnvelope<G> {
    pub diagram_type: DiagramType,
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<Folder>,
    /// Unix seconds; string values from older files are accepted
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<i64>")]
    pub updated_at_timestamp: Option<i64>,
    pub data: G,
}

pub type ErDiagram = DiagramEnvelope<ErGraph>;
pub type RelationalDiagram = DiagramEnvelope<RelationalGraph>;

/// A diagram of either kind, dispatched on `diagramType`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Diagram {
    Er(ErDiagram),
    Relational(RelationalDiagram),
}

impl Diagram {
    pub fn diagram_type(&self) -> DiagramType {
        match self {
            Diagram::Er(_) => DiagramType::Er,
            Diagram::Relational(_) => DiagramType::Relational,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Diagram::Er(d) => &d.name,
            Diagram::Relational(d) => &d.name,
        }
    }

    pub fn as_relational(&self) -> Option<&RelationalDiagram> {
        match self {
            Diagram::Relational(d) => Some(d),
            Diagram::Er(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for Diagram {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let code = value
            .get("diagramType")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| D::Error::missing_field("diagramType"))?;

        match DiagramType::from_code(code) {
            Some(DiagramType::Er) => serde_json::from_value(value)
                .map(Diagram::Er)
                .map_err(D::Error::custom),
            Some(DiagramType::Relational) => serde_json::from_value(value)
                .map(Diagram::Relational)
                .map_err(D::Error::custom),
            None => Err(D::Error::custom(format!("unknown diagramType: {}", code))),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Int(i64),
    Float(f64),
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Int(i) => i.to_string(),
        StringOrNumber::Float(f) => f.to_string(),
    })
}

fn optional_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    match Option::<StringOrNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StringOrNumber::Int(i)) => Ok(Some(i)),
        Some(StringOrNumber::Float(f)) => Ok(Some(f.trunc() as i64)),
        Some(StringOrNumber::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid updatedAtTimestamp: {}", s))),
    }
}
