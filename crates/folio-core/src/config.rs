//! Collection configuration.
//!
//! Each orderable collection is described once by a [`CollectionConfig`]:
//! which field partitions it, which field carries the ordinal, and where
//! ordinals start. A [`CollectionRegistry`] holds the built-in presets for
//! the portfolio content types plus any overrides loaded from JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;
use crate::error::{Error, InvalidInputError};
use crate::types::CollectionName;

fn default_partition_field() -> String {
    "type".to_string()
}

fn default_order_field() -> String {
    "order".to_string()
}

fn default_created_at_field() -> String {
    "createdAt".to_string()
}

/// How one collection is partitioned and ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionConfig {
    /// Collection name in the document store.
    pub name: CollectionName,

    /// Field whose value scopes ordering.
    #[serde(default = "default_partition_field")]
    pub partition_field: String,

    /// Field holding the ordinal.
    #[serde(default = "default_order_field")]
    pub order_field: String,

    /// Field holding the creation timestamp, used to break order ties.
    #[serde(default = "default_created_at_field")]
    pub created_at_field: String,

    /// Smallest valid ordinal.
    #[serde(default)]
    pub base: i64,
}

impl CollectionConfig {
    /// Create a config with default field names and base 0.
    pub fn new(name: CollectionName) -> Self {
        Self {
            name,
            partition_field: default_partition_field(),
            order_field: default_order_field(),
            created_at_field: default_created_at_field(),
            base: 0,
        }
    }

    /// Set the partition field.
    pub fn with_partition_field(mut self, field: impl Into<String>) -> Self {
        self.partition_field = field.into();
        self
    }

    /// Set the order field.
    pub fn with_order_field(mut self, field: impl Into<String>) -> Self {
        self.order_field = field.into();
        self
    }

    /// Set the creation timestamp field.
    pub fn with_created_at_field(mut self, field: impl Into<String>) -> Self {
        self.created_at_field = field.into();
        self
    }

    /// Set the base ordinal.
    pub fn with_base(mut self, base: i64) -> Self {
        self.base = base;
        self
    }

    /// Check the config for contradictions.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| -> Error {
            InvalidInputError::Config {
                name: self.name.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if self.base < 0 {
            return Err(invalid("base cannot be negative"));
        }

        let fields = [
            &self.partition_field,
            &self.order_field,
            &self.created_at_field,
        ];
        if fields.iter().any(|f| f.is_empty()) {
            return Err(invalid("field names cannot be empty"));
        }
        if self.partition_field == self.order_field
            || self.partition_field == self.created_at_field
            || self.order_field == self.created_at_field
        {
            return Err(invalid("partition, order and timestamp fields must differ"));
        }

        Ok(())
    }

    /// Look up a built-in preset by collection name.
    pub fn preset(name: &str) -> Option<Self> {
        Self::presets().into_iter().find(|c| c.name.as_str() == name)
    }

    /// The built-in presets for portfolio content.
    pub fn presets() -> Vec<Self> {
        // (collection, partition field, base)
        const PRESETS: [(&str, &str, i64); 7] = [
            ("awards", "type", 0),
            ("portraits", "category", 1),
            ("tearsheets", "type", 1),
            ("photos", "category", 0),
            ("documentaries", "type", 1),
            ("videoReports", "type", 1),
            ("projects", "type", 0),
        ];

        PRESETS
            .iter()
            .filter_map(|(name, field, base)| {
                CollectionName::new(*name).ok().map(|name| {
                    CollectionConfig::new(name)
                        .with_partition_field(*field)
                        .with_base(*base)
                })
            })
            .collect()
    }
}

/// On-disk shape of a collections file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CollectionsFile {
    #[serde(default)]
    collections: Vec<CollectionConfig>,
}

/// Known collections, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct CollectionRegistry {
    collections: BTreeMap<String, CollectionConfig>,
}

impl CollectionRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding the built-in presets.
    pub fn with_presets() -> Self {
        let mut registry = Self::empty();
        for config in CollectionConfig::presets() {
            registry
                .collections
                .insert(config.name.to_string(), config);
        }
        registry
    }

    /// Parse a collections file and merge it over the presets.
    ///
    /// The expected shape is `{"collections": [CollectionConfig, ...]}`.
    /// Entries replace presets with the same name.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: CollectionsFile =
            serde_json::from_str(json).map_err(|e| InvalidInputError::Other {
                message: format!("invalid collections file: {}", e),
            })?;

        let mut registry = Self::with_presets();
        for config in file.collections {
            registry.insert(config)?;
        }
        Ok(registry)
    }

    /// Load a collections file, falling back to the presets if it does not
    /// exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No collections file, using presets");
            return Ok(Self::with_presets());
        }

        let content = fs::read_to_string(path)?;
        let registry = Self::from_json_str(&content)?;
        debug!(
            path = %path.display(),
            collections = registry.len(),
            "Loaded collections file"
        );
        Ok(registry)
    }

    /// Add or replace a collection after validating it.
    pub fn insert(&mut self, config: CollectionConfig) -> Result<()> {
        config.validate()?;
        self.collections.insert(config.name.to_string(), config);
        Ok(())
    }

    /// Look up a collection.
    pub fn get(&self, name: &str) -> Result<&CollectionConfig> {
        self.collections.get(name).ok_or_else(|| {
            InvalidInputError::Config {
                name: name.to_string(),
                reason: "unknown collection".to_string(),
            }
            .into()
        })
    }

    /// Iterate over the collections in name order.
    pub fn iter(&self) -> impl Iterator<Item = &CollectionConfig> {
        self.collections.values()
    }

    /// Number of collections.
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Returns true if no collections are registered.
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}
