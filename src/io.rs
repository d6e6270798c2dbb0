//! Reading and writing diagram files.

use crate::model::Diagram;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

/// Parse diagram JSON; the typed model is the structural check
pub fn parse_diagram(content: &str) -> anyhow::Result<Diagram> {
    let diagram: Diagram = serde_json::from_str(content)?;
    Ok(diagram)
}

pub fn read_diagram(path: &Path) -> anyhow::Result<Diagram> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Cannot read file: {}", path.display()))?;
    parse_diagram(&content).with_context(|| format!("Invalid diagram file: {}", path.display()))
}

pub fn to_json_string(diagram: &Diagram, pretty: bool) -> anyhow::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(diagram)?
    } else {
        serde_json::to_string(diagram)?
    };
    Ok(json)
}

/// Write `diagram` to `path`, creating parent directories as needed
pub fn write_diagram(path: &Path, diagram: &Diagram, pretty: bool) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create directory: {}", parent.display()))?;
        }
    }
    let json = to_json_string(diagram, pretty)?;
    fs::write(path, json).with_context(|| format!("Cannot write file: {}", path.display()))?;
    Ok(())
}

/// `<output_dir>/<stem><suffix>.<ext>`, next to the input when no directory is given
pub fn output_path_for(input: &Path, output_dir: Option<&Path>, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "diagram".to_string());
    let file_name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(file_name)
}
