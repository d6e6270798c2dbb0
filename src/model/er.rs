//! ER graph: entities, attributes, relationships and the edges between them.

use super::{LabelNode, MaxCardinality, MinCardinality, NodeFrame, Viewport};
use schemars::JsonSchema;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Node of an ER graph, tagged on `"type"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum ErNode {
    Label(LabelNode),
    Entity(EntityNode),
    Attribute(AttributeNode),
    Relationship(RelationshipNode),
}

impl ErNode {
    pub fn id(&self) -> &str {
        match self {
            ErNode::Label(n) => &n.frame.id,
            ErNode::Entity(n) => &n.frame.id,
            ErNode::Attribute(n) => &n.frame.id,
            ErNode::Relationship(n) => &n.frame.id,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            ErNode::Label(n) => n.data.as_ref().map(|d| d.label.as_str()),
            ErNode::Entity(n) => Some(&n.data.label),
            ErNode::Attribute(n) => Some(&n.data.label),
            ErNode::Relationship(n) => Some(&n.data.label),
        }
    }

    /// Kind name as written in the `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            ErNode::Label(_) => "Label",
            ErNode::Entity(_) => "Entity",
            ErNode::Attribute(_) => "Attribute",
            ErNode::Relationship(_) => "Relationship",
        }
    }
}

/// Entity subtype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub enum EntityKind {
    #[default]
    Regular,
    Weak,
    Associative,
    Supertype,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum SupertypeDefinition {
    Disjointed,
    Overlapping,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityNode {
    #[serde(flatten)]
    pub frame: NodeFrame,
    pub data: EntityData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supertype_definition: Option<SupertypeDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_specialization: Option<bool>,
}

impl EntityNode {
    pub fn id(&self) -> &str {
        &self.frame.id
    }

    pub fn label(&self) -> &str {
        &self.data.label
    }

    pub fn kind(&self) -> EntityKind {
        self.data.kind
    }

    pub fn is_weak(&self) -> bool {
        self.data.kind == EntityKind::Weak
    }

    /// Supertype reference, if this entity is a subtype
    pub fn parent_id(&self) -> Option<&str> {
        self.data.parent_id.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityData {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_connectable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_selected: Option<bool>,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// One attribute flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeFlag {
    Unique,
    Multivalued,
    Optional,
    Composite,
    Derived,
}

/// Set of attribute flags.
///
/// Serialized as an object of booleans. An empty JSON array is also accepted
/// on input and means "no flags".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct AttributeFlags {
    #[serde(rename = "Unique", default, skip_serializing_if = "is_false")]
    pub unique: bool,
    #[serde(rename = "Multivalued", default, skip_serializing_if = "is_false")]
    pub multivalued: bool,
    #[serde(rename = "Optional", default, skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(rename = "Composite", default, skip_serializing_if = "is_false")]
    pub composite: bool,
    #[serde(rename = "Derived", default, skip_serializing_if = "is_false")]
    pub derived: bool,
}

impl AttributeFlags {
    pub fn contains(&self, flag: AttributeFlag) -> bool {
        match flag {
            AttributeFlag::Unique => self.unique,
            AttributeFlag::Multivalued => self.multivalued,
            AttributeFlag::Optional => self.optional,
            AttributeFlag::Composite => self.composite,
            AttributeFlag::Derived => self.derived,
        }
    }

    pub fn with(mut self, flag: AttributeFlag) -> Self {
        match flag {
            AttributeFlag::Unique => self.unique = true,
            AttributeFlag::Multivalued => self.multivalued = true,
            AttributeFlag::Optional => self.optional = true,
            AttributeFlag::Composite => self.composite = true,
            AttributeFlag::Derived => self.derived = true,
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        !(self.unique || self.multivalued || self.optional || self.composite || self.derived)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagsOrList {
    Flags(AttributeFlags),
    List(Vec<serde_json::Value>),
}

fn flags_or_empty_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AttributeFlags, D::Error> {
    match FlagsOrList::deserialize(deserializer)? {
        FlagsOrList::Flags(flags) => Ok(flags),
        FlagsOrList::List(list) if list.is_empty() => Ok(AttributeFlags::default()),
        FlagsOrList::List(_) => Err(D::Error::custom(
            "attribute types must be an object of flags or an empty list",
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttributeNode {
    #[serde(flatten)]
    pub frame: NodeFrame,
    /// Owning entity, relationship or composite attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub data: AttributeData,
}

impl AttributeNode {
    pub fn id(&self) -> &str {
        &self.frame.id
    }

    pub fn label(&self) -> &str {
        &self.data.label
    }

    pub fn flags(&self) -> &AttributeFlags {
        &self.data.types
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttributeData {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_connectable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_selected: Option<bool>,
    #[serde(default, deserialize_with = "flags_or_empty_list")]
    pub types: AttributeFlags,
}

/// Exact participation constraint written on a relationship side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExactConstraints {
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

/// One side of a relationship: the connected entity and its cardinality
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityDetails {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact_constraints: Option<ExactConstraints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_cardinality: Option<MinCardinality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cardinality: Option<MaxCardinality>,
}

impl EntityDetails {
    pub fn is_many(&self) -> bool {
        self.max_cardinality == Some(MaxCardinality::Many)
    }

    pub fn is_optional(&self) -> bool {
        self.min_cardinality == Some(MinCardinality::Optional)
    }

    /// An exact maximum of zero marks a placeholder side
    pub fn is_disabled(&self) -> bool {
        self.exact_constraints
            .as_ref()
            .and_then(|c| c.max)
            .map(|max| max == 0)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RelationshipNode {
    #[serde(flatten)]
    pub frame: NodeFrame,
    pub data: RelationshipData,
}

impl RelationshipNode {
    pub fn id(&self) -> &str {
        &self.frame.id
    }

    pub fn label(&self) -> &str {
        &self.data.label
    }

    /// Both sides, when the relationship is complete
    pub fn sides(&self) -> Option<(&EntityDetails, &EntityDetails)> {
        match (
            self.data.source_entity_details.as_ref(),
            self.data.target_entity_details.as_ref(),
        ) {
            (Some(source), Some(target)) => Some((source, target)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipData {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_connectable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_selected: Option<bool>,
    #[serde(default)]
    pub is_identifying: bool,
    #[serde(default)]
    pub is_self_referencing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_entity_details: Option<EntityDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_entity_details: Option<EntityDetails>,
}

/// Edge of an ER graph, tagged on `"type"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum ErEdge {
    Attribute(AttributeEdge),
    Supertype(SupertypeEdge),
    Relationship(RelationshipEdge),
    SelfRelationship(SelfRelationshipEdge),
}

impl ErEdge {
    pub fn id(&self) -> &str {
        match self {
            ErEdge::Attribute(e) => &e.id,
            ErEdge::Supertype(e) => &e.id,
            ErEdge::Relationship(e) => &e.id,
            ErEdge::SelfRelationship(e) => &e.id,
        }
    }

    pub fn endpoints(&self) -> (&str, &str) {
        match self {
            ErEdge::Attribute(e) => (&e.source, &e.target),
            ErEdge::Supertype(e) => (&e.source, &e.target),
            ErEdge::Relationship(e) => (&e.source, &e.target),
            ErEdge::SelfRelationship(e) => (&e.source, &e.target),
        }
    }
}

/// Owner (source) to attribute (target)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AttributeEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// Supertype to subtype; `data` carries the editor's copy of the subtype node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SupertypeEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
}

/// Relationship (source) to one connected entity (target).
///
/// The id has the form `<source>-><target>;<first>-><second>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RelationshipEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RelationshipEdgeData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipEdgeData {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact_constraints: Option<ExactConstraints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_cardinality: Option<MinCardinality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cardinality: Option<MaxCardinality>,
}

/// One of the two legs of a self-referencing relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SelfRelationshipEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RelationshipEdgeData>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ErGraph {
    #[serde(default)]
    pub nodes: Vec<ErNode>,
    #[serde(default)]
    pub edges: Vec<ErEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
}
