//! Conversion of ER diagrams into relational schema diagrams.
//!
//! [`transform`] holds the conversion itself; the other modules read, repair
//! and check diagrams around it.

pub mod config;
pub mod io;
pub mod model;
pub mod repair;
pub mod transform;
pub mod validate;

pub use model::Diagram;
pub use transform::{to_relational, to_relational_with, TransformOptions, TransformStats};
