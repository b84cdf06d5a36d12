//! TOML configuration loader for entity hierarchies.
//!
//! Alternative to the `entity_hierarchy!` macro for hierarchies that live
//! outside the compiled binary:
//!
//! ```toml
//! [[class]]
//! name = "Animal"
//!
//! [[class]]
//! name = "Dog"
//! parent = "Animal"
//! discr = "dog"
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// One class declaration from the config file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassEntry {
    pub name: String,
    pub parent: Option<String>,
    pub discr: Option<String>,
}

/// Raw TOML structure.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default, rename = "class")]
    classes: Vec<RawClass>,
}

#[derive(Debug, Deserialize)]
struct RawClass {
    name: String,
    parent: Option<String>,
    discr: Option<String>,
}

/// Errors during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid hierarchy config: {0}")]
    Validation(String),
}

/// Parsed hierarchy declaration.
///
/// Validates names and tags at the syntax level; structural checks
/// (duplicates, unknown parents, cycles) belong to
/// [`ClassGraph::from_config`](crate::ClassGraph::from_config).
#[derive(Clone, Debug)]
pub struct HierarchyConfig {
    classes: Vec<ClassEntry>,
}

impl HierarchyConfig {
    /// Parse from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parse from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;

        let mut classes = Vec::with_capacity(raw.classes.len());
        for class in raw.classes {
            Self::validate_identifier(&class.name)?;
            if let Some(discr) = &class.discr
                && discr.is_empty()
            {
                return Err(ConfigError::Validation(format!(
                    "class '{}' declares an empty discriminator tag",
                    class.name
                )));
            }
            classes.push(ClassEntry {
                name: class.name,
                parent: class.parent,
                discr: class.discr,
            });
        }

        Ok(Self { classes })
    }

    /// All declared classes, in file order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassEntry> {
        self.classes.iter()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Class names are Rust-identifier-like: letter or underscore first,
    /// alphanumeric or underscore after.
    fn validate_identifier(name: &str) -> Result<(), ConfigError> {
        let mut chars = name.chars();
        match chars.next() {
            None => {
                return Err(ConfigError::Validation("empty class name".into()));
            }
            Some(first) if !first.is_alphabetic() && first != '_' => {
                return Err(ConfigError::Validation(format!(
                    "class name '{}' must start with a letter or underscore",
                    name
                )));
            }
            Some(_) => {}
        }
        for c in chars {
            if !c.is_alphanumeric() && c != '_' {
                return Err(ConfigError::Validation(format!(
                    "class name '{}' contains invalid character '{}'",
                    name, c
                )));
            }
        }
        Ok(())
    }
}
