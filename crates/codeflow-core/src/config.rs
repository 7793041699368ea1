//! Runtime configuration: `codeflow.toml` plus environment overrides

use crate::model::FidelityMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Config file looked up in the project root when no path is given.
pub const CONFIG_FILE: &str = "codeflow.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {value}")]
    Env { key: &'static str, value: String },
}

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeflowConfig {
    /// Settling delay before an edit triggers recomputation.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Fidelity used when none is requested explicitly.
    #[serde(default)]
    pub default_mode: FidelityMode,
    /// Files above this size are not loaded.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    /// Entry names skipped entirely when loading a project.
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
    /// File extensions skipped when loading a project.
    #[serde(default = "default_skip_extensions")]
    pub skip_extensions: Vec<String>,
    /// External parser commands keyed by language name, e.g.
    /// `javascript = ["node", "tools/babel-dump.mjs"]`. Each reads source on
    /// stdin and writes the tree as JSON on stdout.
    #[serde(default)]
    pub parsers: BTreeMap<String, Vec<String>>,
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_max_file_bytes() -> u64 {
    1_000_000
}

fn default_ignore() -> Vec<String> {
    [
        "node_modules",
        ".git",
        ".DS_Store",
        "dist",
        "build",
        ".env",
        "package-lock.json",
        "yarn.lock",
        "__pycache__",
        ".vscode",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_skip_extensions() -> Vec<String> {
    vec!["lock".to_string(), "png".to_string(), "jpg".to_string()]
}

impl Default for CodeflowConfig {
    fn default() -> Self {
        CodeflowConfig {
            debounce_ms: default_debounce_ms(),
            default_mode: FidelityMode::default(),
            max_file_bytes: default_max_file_bytes(),
            ignore: default_ignore(),
            skip_extensions: default_skip_extensions(),
            parsers: BTreeMap::new(),
        }
    }
}

impl CodeflowConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Command line configured for `language`, if any.
    pub fn parser_command(&self, language: &str) -> Option<&[String]> {
        self.parsers
            .get(language)
            .map(Vec::as_slice)
            .filter(|argv| !argv.is_empty())
    }

    /// Parse a TOML document.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load `path`, or defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(CodeflowConfig::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Load the config file, then apply `.env` and process environment
    /// overrides (`CODEFLOW_DEBOUNCE_MS`, `CODEFLOW_MODE`).
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        if let Ok(env_file) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", env_file.display());
        }
        let mut config = Self::load(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from any key lookup (the process environment in
    /// production, a map in tests).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("CODEFLOW_DEBOUNCE_MS") {
            self.debounce_ms = value.trim().parse().map_err(|_| ConfigError::Env {
                key: "CODEFLOW_DEBOUNCE_MS",
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup("CODEFLOW_MODE") {
            self.default_mode = value.parse().map_err(|_| ConfigError::Env {
                key: "CODEFLOW_MODE",
                value: value.clone(),
            })?;
        }
        Ok(())
    }
}
