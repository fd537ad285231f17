use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONTAINER_TYPES: [&str; 2] = ["java.util.Collection", "java.util.Map"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Classes whose subtypes make a member "plural" (in addition to arrays).
    pub container_types: Vec<String>,
    /// Fall back to the bundled minimal JDK index for classes the primary builder doesn't know.
    pub minimal_jdk: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            container_types: DEFAULT_CONTAINER_TYPES.map(str::to_string).to_vec(),
            minimal_jdk: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err.message().to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigWarning {
    EmptyContainerType { index: usize },
    DuplicateContainerType { name: String },
    ArrayContainerType { name: String },
}

impl RegistryConfig {
    /// Load a config file from TOML.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Semantic checks that don't prevent the registry from starting.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for (index, name) in self.container_types.iter().enumerate() {
            let name = name.trim();
            if name.is_empty() {
                out.push(ConfigWarning::EmptyContainerType { index });
                continue;
            }
            if name.starts_with('[') {
                out.push(ConfigWarning::ArrayContainerType {
                    name: name.to_string(),
                });
            }
            if !seen.insert(name) {
                out.push(ConfigWarning::DuplicateContainerType {
                    name: name.to_string(),
                });
            }
        }
        out
    }

    /// Container names with blanks dropped and surrounding whitespace trimmed.
    pub(crate) fn normalized_container_types(&self) -> impl Iterator<Item = &str> {
        self.container_types
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
    }
}
