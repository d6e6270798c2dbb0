//! Schema command CLI handler.

use crate::json_schema::{all_schemas, get_schema, schema_names};
use anyhow::Context;
use std::fs;
use std::path::PathBuf;

pub fn run(name: Option<String>, output: Option<PathBuf>, list: bool) -> anyhow::Result<()> {
    if list {
        for name in schema_names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let schemas = match name {
        Some(name) => {
            let schema = get_schema(&name).ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown schema: {}. Valid options: {}",
                    name,
                    schema_names().join(", ")
                )
            })?;
            vec![(name, schema)]
        }
        None => all_schemas()
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect(),
    };

    match output {
        Some(dir) => {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Cannot create directory: {}", dir.display()))?;
            for (name, schema) in &schemas {
                let path = dir.join(format!("{}.schema.json", name));
                let json = serde_json::to_string_pretty(schema)?;
                fs::write(&path, json)
                    .with_context(|| format!("Cannot write file: {}", path.display()))?;
                eprintln!("  → {}", path.display());
            }
        }
        None if schemas.len() == 1 => {
            println!("{}", serde_json::to_string_pretty(&schemas[0].1)?);
        }
        None => {
            let combined: serde_json::Map<String, serde_json::Value> = schemas
                .into_iter()
                .map(|(name, schema)| Ok::<_, anyhow::Error>((name, serde_json::to_value(schema)?)))
                .collect::<anyhow::Result<_>>()?;
            println!("{}", serde_json::to_string_pretty(&combined)?);
        }
    }

    Ok(())
}
