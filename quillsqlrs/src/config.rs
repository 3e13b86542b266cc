//! Configuration for quillsql.
//!
//! TOML-based: builder rendering defaults plus executor tuning.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dialect::DialectKind;
use crate::error::{QueryError, Result};
use crate::grammar::QualifyColumns;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct QuillConfig {
    pub builder: BuilderConfig,
    pub executor: ExecutorConfig,
}

/// Rendering defaults applied by [`crate::Query::from_config`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Identifier quoting and literal spelling (default: plain).
    pub dialect: DialectKind,
    /// When column references carry their table alias (default: auto).
    pub qualify_columns: QualifyColumns,
}

/// Executor tuning.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Maximum statements in flight per executor (default: 16).
    pub max_concurrency: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 16,
        }
    }
}

impl QuillConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| QueryError::Config(format!("failed to parse config: {e}")))
    }

    /// Load from default locations (env var, cwd, user config dir, or defaults).
    ///
    /// Search order:
    /// 1. `QUILLSQL_CONFIG` environment variable
    /// 2. `./quillsql.toml` (current directory)
    /// 3. `~/.config/quillsql/config.toml` (user config dir)
    /// 4. Built-in defaults
    pub fn load_default() -> Self {
        if let Ok(path) = std::env::var("QUILLSQL_CONFIG") {
            match Self::from_file(&path) {
                Ok(cfg) => {
                    tracing::info!(path = %path, "loaded config from QUILLSQL_CONFIG");
                    return cfg;
                }
                Err(e) => tracing::warn!(path = %path, error = %e, "ignoring QUILLSQL_CONFIG"),
            }
        }

        if let Ok(cfg) = Self::from_file("quillsql.toml") {
            tracing::info!("loaded config from ./quillsql.toml");
            return cfg;
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("quillsql").join("config.toml");
            if let Ok(cfg) = Self::from_file(&user_config) {
                tracing::info!(path = %user_config.display(), "loaded config from user config dir");
                return cfg;
            }
        }

        tracing::debug!("no config file found, using defaults");
        Self::default()
    }
}
