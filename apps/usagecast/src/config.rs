//! # Configuration
//!
//! Loads `usagecast.toml`. Every section is optional; command line flags
//! override whatever the file sets.
//!
//! ```toml
//! [projection]
//! dedup_users = false
//!
//! [output]
//! models = ["graph", "relational", "catalog"]
//! dir = "out"
//!
//! [input]
//! format = "json"
//! ```

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use usagecast_core::{Model, ProjectionOptions};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "usagecast.toml";

/// Top-level usagecast configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Options handed to the engine.
    #[serde(default)]
    pub projection: ProjectionOptions,

    /// Which models to write, and where.
    #[serde(default)]
    pub output: OutputConfig,

    /// How to read fact files.
    #[serde(default)]
    pub input: InputConfig,
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Models to project, in the order they are written.
    #[serde(default = "default_models")]
    pub models: Vec<Model>,

    /// Directory for per-sequence JSON Lines files. Stdout when absent.
    pub dir: Option<PathBuf>,
}

fn default_models() -> Vec<Model> {
    Model::ALL.to_vec()
}

/// Drop repeated models, keeping the first occurrence of each.
#[must_use]
pub fn unique_models(models: impl IntoIterator<Item = Model>) -> Vec<Model> {
    let mut unique = Vec::new();
    for model in models {
        if !unique.contains(&model) {
            unique.push(model);
        }
    }
    unique
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            models: default_models(),
            dir: None,
        }
    }
}

/// Input settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    /// Fact file format.
    #[serde(default)]
    pub format: InputFormat,
}

/// Supported fact file formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// A single JSON array of facts.
    #[default]
    Json,
    /// One JSON fact per line.
    Jsonl,
}

impl FromStr for InputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "jsonl" | "ndjson" => Ok(Self::Jsonl),
            other => Err(AppError::Config(format!("Unknown input format: {}", other))),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Jsonl => f.write_str("jsonl"),
        }
    }
}

impl AppConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, AppError> {
        let mut config: Self =
            toml::from_str(contents).map_err(|e| AppError::Config(e.to_string()))?;
        config.output.models = unique_models(config.output.models);
        if config.output.models.is_empty() {
            return Err(AppError::Config(
                "output.models must name at least one model".to_string(),
            ));
        }
        Ok(config)
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `usagecast.toml` in the
    /// working directory is used if present, and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                default
            }
        };

        let contents = std::fs::read_to_string(&path).map_err(|e| {
            AppError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&contents)?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

// =============================================================================
// TESTS
// =============================================================================
