//! Diagram generator.
//!
//! Produces a `serde_json::Value` in the `.erdplus` ER format so that the
//! generator does not depend on the converter's own model types.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Map, Value};

/// Generation scale presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    /// 6 entities, a handful of relationships
    Small,
    /// 40 entities
    Medium,
    /// 250 entities
    Large,
}

impl Scale {
    pub fn entities(&self) -> usize {
        match self {
            Scale::Small => 6,
            Scale::Medium => 40,
            Scale::Large => 250,
        }
    }

    pub fn attributes_per_entity(&self) -> usize {
        match self {
            Scale::Small => 3,
            Scale::Medium => 5,
            Scale::Large => 8,
        }
    }

    /// Relationships besides the identifying ones generated for weak entities
    pub fn relationships(&self) -> usize {
        match self {
            Scale::Small => 5,
            Scale::Medium => 45,
            Scale::Large => 300,
        }
    }
}

impl std::str::FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "small" | "s" => Ok(Scale::Small),
            "medium" | "m" => Ok(Scale::Medium),
            "large" | "l" => Ok(Scale::Large),
            _ => Err(format!("Unknown scale: {}. Use small, medium or large", s)),
        }
    }
}

const NOUNS: &[&str] = &[
    "Customer", "Order", "Product", "Supplier", "Invoice", "Employee", "Department", "Project",
    "Course", "Student", "Room", "Vehicle", "Account", "Branch", "Shipment",
];

const WORDS: &[&str] = &[
    "name", "code", "date", "amount", "status", "email", "phone", "street", "city", "note",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityKind {
    Regular,
    Weak,
    Supertype,
}

impl EntityKind {
    fn as_str(self) -> &'static str {
        match self {
            EntityKind::Regular => "Regular",
            EntityKind::Weak => "Weak",
            EntityKind::Supertype => "Supertype",
        }
    }
}

struct EntitySpec {
    id: String,
    label: String,
    kind: EntityKind,
    parent: Option<usize>,
}

/// Shapes an attribute can take
#[derive(Debug, Clone, Copy)]
enum AttributeShape {
    Plain,
    Unique,
    Optional,
    Derived,
    Composite,
    Multivalued,
    MultivaluedComposite,
}

impl AttributeShape {
    const ALL: [AttributeShape; 7] = [
        AttributeShape::Plain,
        AttributeShape::Unique,
        AttributeShape::Optional,
        AttributeShape::Derived,
        AttributeShape::Composite,
        AttributeShape::Multivalued,
        AttributeShape::MultivaluedComposite,
    ];

    fn flags(self) -> Value {
        match self {
            // the editor saves attributes without flags as an empty list
            AttributeShape::Plain => json!([]),
            AttributeShape::Unique => json!({"Unique": true}),
            AttributeShape::Optional => json!({"Optional": true}),
            AttributeShape::Derived => json!({"Derived": true}),
            AttributeShape::Composite => json!({"Composite": true}),
            AttributeShape::Multivalued => json!({"Multivalued": true}),
            AttributeShape::MultivaluedComposite => json!({"Multivalued": true, "Composite": true}),
        }
    }

    fn is_composite(self) -> bool {
        matches!(
            self,
            AttributeShape::Composite | AttributeShape::MultivaluedComposite
        )
    }
}

/// Main diagram generator
pub struct Generator {
    rng: ChaCha8Rng,
    seed: u64,
    scale: Scale,
    nodes: Vec<Value>,
    edges: Vec<Value>,
    attribute_count: usize,
}

impl Generator {
    pub fn new(seed: u64, scale: Scale) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            scale,
            nodes: Vec::new(),
            edges: Vec::new(),
            attribute_count: 0,
        }
    }

    /// Generate one ER diagram
    pub fn generate(&mut self) -> Value {
        self.nodes.clear();
        self.edges.clear();
        self.attribute_count = 0;

        let entities = self.plan_entities();
        for (idx, entity) in entities.iter().enumerate() {
            self.push_entity(idx, entity, &entities);
        }
        for entity in &entities {
            for _ in 0..self.scale.attributes_per_entity() {
                let shape = self.pick_shape();
                self.push_attribute(&entity.id, shape);
            }
        }

        let mut relationship_count = 0;
        for (idx, entity) in entities.iter().enumerate() {
            if entity.kind != EntityKind::Weak {
                continue;
            }
            let owner = self.pick_owner(idx, &entities);
            self.push_identifying(relationship_count, &entities[owner], entity);
            relationship_count += 1;
        }
        for _ in 0..self.scale.relationships() {
            let source = self.rng.random_range(0..entities.len());
            let target = if self.rng.random_bool(0.1) {
                source
            } else {
                self.rng.random_range(0..entities.len())
            };
            self.push_relationship(relationship_count, &entities[source], &entities[target]);
            relationship_count += 1;
        }

        json!({
            "diagramType": 1,
            "id": self.seed % 1_000_000,
            "name": format!("fixture-{:?}-{}", self.scale, self.seed).to_lowercase(),
            "folder": {"name": "Fixtures", "id": "1", "folderType": 0, "depth": 0},
            "updatedAtTimestamp": 1_700_000_000,
            "data": {
                "nodes": std::mem::take(&mut self.nodes),
                "edges": std::mem::take(&mut self.edges),
                "viewport": {"x": 0, "y": 0, "zoom": 1},
            }
        })
    }

    fn plan_entities(&mut self) -> Vec<EntitySpec> {
        let count = self.scale.entities();
        let mut entities: Vec<EntitySpec> = Vec::with_capacity(count);

        for i in 0..count {
            let noun = NOUNS[i % NOUNS.len()];
            let label = match i / NOUNS.len() {
                0 => noun.to_string(),
                n => format!("{}{}", noun, n),
            };
            // the first entity stays regular so weak entities always have an owner
            let kind = if i > 0 && self.rng.random_bool(0.15) {
                EntityKind::Weak
            } else {
                EntityKind::Regular
            };
            let parent = if i > 1 && kind == EntityKind::Regular && self.rng.random_bool(0.1) {
                let candidate = self.rng.random_range(0..i);
                (entities[candidate].kind != EntityKind::Weak).then_some(candidate)
            } else {
                None
            };
            if let Some(parent) = parent {
                entities[parent].kind = EntityKind::Supertype;
            }
            entities.push(EntitySpec {
                id: format!("entity-{:04}", i),
                label,
                kind,
                parent,
            });
        }
        entities
    }

    fn pick_owner(&mut self, weak: usize, entities: &[EntitySpec]) -> usize {
        let owners: Vec<usize> = (0..entities.len())
            .filter(|&i| i != weak && entities[i].kind != EntityKind::Weak)
            .collect();
        owners[self.rng.random_range(0..owners.len())]
    }

    fn pick_shape(&mut self) -> AttributeShape {
        AttributeShape::ALL[self.rng.random_range(0..AttributeShape::ALL.len())]
    }

    fn position(&self) -> Value {
        let slot = self.nodes.len();
        json!({"x": (slot % 12) as f64 * 180.0, "y": (slot / 12) as f64 * 120.0})
    }

    fn push_entity(&mut self, idx: usize, entity: &EntitySpec, all: &[EntitySpec]) {
        let mut data = Map::new();
        data.insert("label".into(), json!(entity.label));
        data.insert("isConnectable".into(), json!(true));
        data.insert("isSelected".into(), json!(false));
        data.insert("type".into(), json!(entity.kind.as_str()));
        if let Some(parent) = entity.parent {
            data.insert("parentId".into(), json!(all[parent].id));
        }

        let mut node = json!({
            "id": entity.id,
            "type": "Entity",
            "position": self.position(),
            "measured": {"width": 150, "height": 50},
            "data": Value::Object(data),
        });
        if entity.kind == EntityKind::Supertype {
            node["supertypeDefinition"] = json!(if idx % 2 == 0 {
                "Disjointed"
            } else {
                "Overlapping"
            });
            node["totalSpecialization"] = json!(false);
        }
        self.nodes.push(node);

        if let Some(parent) = entity.parent {
            let parent_id = &all[parent].id;
            self.edges.push(json!({
                "id": format!("{}->{}", parent_id, entity.id),
                "type": "Supertype",
                "source": parent_id,
                "target": entity.id,
            }));
        }
    }

    /// Push an attribute node and its edge; composites get two plain children
    fn push_attribute(&mut self, owner: &str, shape: AttributeShape) -> String {
        self.attribute_count += 1;
        let id = format!("attribute-{:05}", self.attribute_count);
        let word = WORDS[self.rng.random_range(0..WORDS.len())];
        let label = format!("{}_{}", word, self.attribute_count);
        let position = self.position();

        self.nodes.push(json!({
            "id": id,
            "type": "Attribute",
            "position": position,
            "measured": {"width": 100, "height": 40},
            "data": {
                "label": label,
                "isConnectable": true,
                "isSelected": false,
                "types": shape.flags(),
            }
        }));
        self.edges.push(json!({
            "id": format!("{}->{}", owner, id),
            "type": "Attribute",
            "source": owner,
            "target": id,
        }));

        if shape.is_composite() {
            for _ in 0..2 {
                self.push_attribute(&id, AttributeShape::Plain);
            }
        }
        id
    }

    fn push_identifying(&mut self, n: usize, owner: &EntitySpec, weak: &EntitySpec) {
        let weak_many = self.rng.random_bool(0.7);
        self.push_relationship_node(
            n,
            &format!("has_{}", weak.label.to_lowercase()),
            true,
            owner,
            weak,
            ("Mandatory", "One"),
            ("Mandatory", if weak_many { "Many" } else { "One" }),
        );
    }

    fn push_relationship(&mut self, n: usize, source: &EntitySpec, target: &EntitySpec) {
        let source_side = self.pick_side();
        let target_side = self.pick_side();
        let verb = WORDS[self.rng.random_range(0..WORDS.len())];
        self.push_relationship_node(
            n,
            &format!("{}_{}", verb, n),
            false,
            source,
            target,
            source_side,
            target_side,
        );
        if self.rng.random_bool(0.3) {
            let id = format!("relationship-{:04}", n);
            self.push_attribute(&id, AttributeShape::Plain);
        }
    }

    fn pick_side(&mut self) -> (&'static str, &'static str) {
        let min = if self.rng.random_bool(0.5) {
            "Optional"
        } else {
            "Mandatory"
        };
        let max = if self.rng.random_bool(0.5) { "Many" } else { "One" };
        (min, max)
    }

    #[allow(clippy::too_many_arguments)]
    fn push_relationship_node(
        &mut self,
        n: usize,
        label: &str,
        identifying: bool,
        source: &EntitySpec,
        target: &EntitySpec,
        source_side: (&str, &str),
        target_side: (&str, &str),
    ) {
        let id = format!("relationship-{:04}", n);
        let self_referencing = source.id == target.id;
        let position = self.position();

        // sides point at the relationship itself until repaired from the edges
        self.nodes.push(json!({
            "id": id,
            "type": "Relationship",
            "position": position,
            "measured": {"width": 120, "height": 60},
            "data": {
                "label": label,
                "isConnectable": true,
                "isSelected": false,
                "isIdentifying": identifying,
                "isSelfReferencing": self_referencing,
                "sourceEntityDetails": {
                    "id": id,
                    "minCardinality": source_side.0,
                    "maxCardinality": source_side.1,
                },
                "targetEntityDetails": {
                    "id": id,
                    "minCardinality": target_side.0,
                    "maxCardinality": target_side.1,
                },
            }
        }));

        let edge_type = if self_referencing {
            "SelfRelationship"
        } else {
            "Relationship"
        };
        let pair = format!("{}->{}", source.id, target.id);
        for (entity, side) in [(source, source_side), (target, target_side)] {
            self.edges.push(json!({
                "id": format!("{}->{};{}", id, entity.id, pair),
                "type": edge_type,
                "source": id,
                "target": entity.id,
                "data": {
                    "id": format!("{}->{}", id, entity.id),
                    "minCardinality": side.0,
                    "maxCardinality": side.1,
                }
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_diagram() {
        let a = Generator::new(7, Scale::Small).generate();
        let b = Generator::new(7, Scale::Small).generate();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_different_diagram() {
        let a = Generator::new(1, Scale::Medium).generate();
        let b = Generator::new(2, Scale::Medium).generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_entity_count_matches_scale() {
        let diagram = Generator::new(3, Scale::Medium).generate();
        let entities = diagram["data"]["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|n| n["type"] == "Entity")
            .count();
        assert_eq!(entities, Scale::Medium.entities());
    }

    #[test]
    fn test_every_attribute_has_an_edge() {
        let diagram = Generator::new(11, Scale::Small).generate();
        let nodes = diagram["data"]["nodes"].as_array().unwrap();
        let edges = diagram["data"]["edges"].as_array().unwrap();
        for node in nodes.iter().filter(|n| n["type"] == "Attribute") {
            assert!(edges
                .iter()
                .any(|e| e["type"] == "Attribute" && e["target"] == node["id"]));
        }
    }

    #[test]
    fn test_scale_from_str() {
        assert_eq!("small".parse::<Scale>().unwrap(), Scale::Small);
        assert_eq!("M".parse::<Scale>().unwrap(), Scale::Medium);
        assert_eq!("l".parse::<Scale>().unwrap(), Scale::Large);
        assert!("huge".parse::<Scale>().is_err());
    }
}
