use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::types::RowShape;

/// TOML-backed job configuration loaded from disk.
/// Secrets (service account key, API keys) stay as env vars.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub spreadsheet_id: String,
    /// Worksheet the keyword columns are read from.
    pub keyword_sheet: String,
    #[serde(default)]
    pub row_shape: RowShape,
    #[serde(default)]
    pub search: SearchConfig,
    /// Host substrings to drop from search results.
    #[serde(default)]
    pub blacklist: Vec<String>,
    pub flows: Vec<FlowConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    #[serde(default = "default_desired_count")]
    pub desired_count: usize,
    #[serde(default = "default_over_fetch")]
    pub over_fetch: usize,
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            desired_count: default_desired_count(),
            over_fetch: default_over_fetch(),
            pacing_ms: default_pacing_ms(),
        }
    }
}

fn default_desired_count() -> usize {
    10
}

fn default_over_fetch() -> usize {
    3
}

fn default_pacing_ms() -> u64 {
    500
}

/// One keyword column → sink worksheet pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowConfig {
    pub label: String,
    /// 1-based column in the keyword sheet. Row 1 is a header.
    pub keyword_column: usize,
    pub sink_sheet: String,
    /// Overrides the top-level `row_shape` for this flow.
    #[serde(default)]
    pub row_shape: Option<RowShape>,
}

impl FileConfig {
    pub fn validate(&self) -> Result<()> {
        if self.spreadsheet_id.trim().is_empty() {
            bail!("spreadsheet_id must not be empty");
        }
        if self.flows.is_empty() {
            bail!("at least one [[flows]] entry is required");
        }
        for flow in &self.flows {
            if flow.keyword_column == 0 {
                bail!("flow '{}': keyword_column is 1-based", flow.label);
            }
            if flow.sink_sheet.trim().is_empty() {
                bail!("flow '{}': sink_sheet must not be empty", flow.label);
            }
        }
        if self.search.desired_count == 0 {
            bail!("search.desired_count must be at least 1");
        }
        if self.search.over_fetch == 0 {
            bail!("search.over_fetch must be at least 1");
        }
        Ok(())
    }

    /// Blacklist entries trimmed and lowercased, blanks dropped, order kept.
    pub fn normalized_blacklist(&self) -> Vec<String> {
        self.blacklist
            .iter()
            .map(|d| d.trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .collect()
    }

    pub fn row_shape_for(&self, flow: &FlowConfig) -> RowShape {
        flow.row_shape.unwrap_or(self.row_shape)
    }
}

/// Load, parse, and validate a TOML config file.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: FileConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    Ok(config)
}
