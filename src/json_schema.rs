//! JSON Schema generation for the diagram formats and CLI output types.
//!
//! Schemas are generated using the schemars crate and can be exported via the
//! `schema` subcommand.

use schemars::{schema_for, Schema};
use std::collections::BTreeMap;

/// Returns all JSON schemas: both diagram kinds plus every `--json` output.
/// Uses BTreeMap for deterministic ordering (important for diffable output).
pub fn all_schemas() -> BTreeMap<&'static str, Schema> {
    let mut schemas = BTreeMap::new();

    // diagram files
    schemas.insert("er", schema_for!(erd_relational::model::ErDiagram));
    schemas.insert(
        "relational",
        schema_for!(erd_relational::model::RelationalDiagram),
    );

    // convert command
    schemas.insert(
        "convert",
        schema_for!(crate::cmd::convert::ConvertJsonOutput),
    );

    // validate command (uses ValidationSummary from validate module)
    schemas.insert(
        "validate",
        schema_for!(erd_relational::validate::ValidationSummary),
    );

    schemas
}

/// Generate a single schema by name.
pub fn get_schema(name: &str) -> Option<Schema> {
    all_schemas().remove(name)
}

/// List all available schema names.
pub fn schema_names() -> Vec<&'static str> {
    all_schemas().keys().copied().collect()
}
