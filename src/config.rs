//! YAML configuration for the convert command.
//!
//! Every key is optional; command-line flags override what the file says.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete YAML configuration for convert command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertYamlConfig {
    /// File extension picked up when the input is a directory
    pub extension: String,
    /// Appended to the input file stem to name the output
    pub output_suffix: String,
    /// Pretty-print output JSON
    pub pretty: bool,
    /// Convert the diagram as saved, without the repair pass
    pub skip_repair: bool,
    /// Stop at the first file that fails
    pub fail_fast: bool,
    /// Treat validation warnings as failures
    pub strict: bool,
}

impl Default for ConvertYamlConfig {
    fn default() -> Self {
        Self {
            extension: "erdplus".to_string(),
            output_suffix: "-relational".to_string(),
            pretty: true,
            skip_repair: false,
            fail_fast: false,
            strict: false,
        }
    }
}

impl ConvertYamlConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: ConvertYamlConfig = serde_yaml_ng::from_str(content)?;
        Ok(config)
    }

    /// Extension without a leading dot
    pub fn extension(&self) -> &str {
        self.extension.trim_start_matches('.')
    }
}
