//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/domtree/domtree.toml`
//! 3. Local config file passed by the caller
//! 4. Environment variables: `DOMTREE__*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::errors::{DomError, DomResult};

/// Parser conventions of the pseudo-markup format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParserSettings {
    /// Leading characters of a text line stripped beyond the enclosing tag's indent
    pub content_indent: usize,
    /// Extra indentation a line may carry and still count as a sibling
    pub indent_tolerance: usize,
    /// Root attribute receiving the source name
    pub source_attribute: String,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            content_indent: 4,
            indent_tolerance: 1,
            source_attribute: "source".into(),
        }
    }
}

/// Raw parser settings; `None` means "not specified, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawParserSettings {
    pub content_indent: Option<usize>,
    pub indent_tolerance: Option<usize>,
    pub source_attribute: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub parser: RawParserSettings,
}

impl ParserSettings {
    fn merge(&self, overlay: &RawParserSettings) -> Self {
        Self {
            content_indent: overlay.content_indent.unwrap_or(self.content_indent),
            indent_tolerance: overlay.indent_tolerance.unwrap_or(self.indent_tolerance),
            source_attribute: overlay
                .source_attribute
                .clone()
                .unwrap_or_else(|| self.source_attribute.clone()),
        }
    }
}

/// Unified configuration for domtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub parser: ParserSettings,
}

/// Get the XDG config directory for domtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "domtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("domtree.toml"))
}

fn load_raw_settings(path: &Path) -> DomResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| DomError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| DomError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> DomError {
    DomError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            parser: self.parser.merge(&overlay.parser),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// A missing `local` file is skipped like a missing global one.
    pub fn load(local: Option<&Path>) -> DomResult<Self> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(local_path) = local {
            if local_path.exists() {
                current = current.merge_with(&load_raw_settings(local_path)?);
            }
        }

        Self::apply_env_overrides(current)
    }

    /// Load only compiled defaults and the given file, ignoring global config
    /// and environment.
    pub fn from_file(path: &Path) -> DomResult<Self> {
        Ok(Self::default().merge_with(&load_raw_settings(path)?))
    }

    /// Apply DOMTREE__* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> DomResult<Self> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("DOMTREE").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get::<usize>("parser.content_indent") {
            settings.parser.content_indent = val;
        }
        if let Ok(val) = config.get::<usize>("parser.indent_tolerance") {
            settings.parser.indent_tolerance = val;
        }
        if let Ok(val) = config.get_string("parser.source_attribute") {
            settings.parser.source_attribute = val;
        }

        Ok(settings)
    }
}
