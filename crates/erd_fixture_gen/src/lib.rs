//! Synthetic ER diagram generator for erd-relational tests and benchmarks.
//!
//! Generates deterministic `.erdplus` ER diagrams covering every construct
//! the converter handles: weak entities, subtypes, composite, multivalued
//! and derived attributes, self-referencing and identifying relationships.
//!
//! The output looks like a diagram saved by the editor: attribute parents and
//! the entities behind each relationship are recorded only in the edges, so
//! consumers run the repair pass before converting.
//!
//! # Example
//!
//! ```rust
//! use erd_fixture_gen::{Generator, Scale};
//!
//! let mut gen = Generator::new(42, Scale::Small);
//! let diagram = gen.generate();
//!
//! assert_eq!(diagram["diagramType"], 1);
//! println!("{}", serde_json::to_string_pretty(&diagram).unwrap());
//! ```

pub mod generator;

pub use generator::{Generator, Scale};
