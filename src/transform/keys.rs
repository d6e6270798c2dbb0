//! Deterministic id generation for synthetic columns and foreign-key groups.

use uuid::Uuid;

/// Per-transformation UUID source.
///
/// Ids are UUIDv5 values derived from a namespace seeded by the diagram
/// identity and a running counter, so converting the same diagram twice
/// yields the same ids.
#[derive(Debug, Clone)]
pub struct KeyGen {
    namespace: Uuid,
    counter: u64,
}

impl KeyGen {
    pub fn for_diagram(name: &str, id: i64) -> Self {
        let seed = format!("erd-relational:{}:{}", id, name);
        Self {
            namespace: Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes()),
            counter: 0,
        }
    }

    pub fn next_uuid(&mut self) -> String {
        let id = Uuid::new_v5(&self.namespace, &self.counter.to_be_bytes());
        self.counter += 1;
        id.to_string()
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u64 {
        self.counter
    }
}
