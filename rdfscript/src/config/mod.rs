//! Evaluator configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! default_namespace = "http://example.org/"
//! default_prefix = "lab"
//!
//! [prefixes]
//! lab = "http://lab.example.org/"
//!
//! [import]
//! scope = "namespace"
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Namespace bare names resolve under when no prefix is active.
pub const DEFAULT_NAMESPACE: &str = "http://example.org/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("default prefix '{0}' is not declared in [prefixes]")]
    UnknownDefaultPrefix(String),
}

/// Which symbols an `Include` extension aliases into the active namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportScope {
    /// Only symbols bound under the imported namespace.
    #[default]
    Namespace,
    /// Every symbol of every namespace.
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub scope: ImportScope,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    pub default_namespace: String,
    pub default_prefix: Option<String>,
    pub prefixes: IndexMap<String, String>,
    pub import: ImportConfig,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        EvaluatorConfig {
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            default_prefix: None,
            prefixes: IndexMap::new(),
            import: ImportConfig::default(),
        }
    }
}

impl EvaluatorConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Create a configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
