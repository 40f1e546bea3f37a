// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Engine configuration.
//!
//! Supports both programmatic and file-based configuration.
//!
//! ```toml
//! [registry]
//! cache_capacity = 256
//! freeze_after_setup = true
//!
//! [engine]
//! verify_accessor = true
//!
//! [[types]]
//! name = "Named"
//! kind = "contract"
//!
//! [[types]]
//! name = "Person"
//! parent = "record"
//! contracts = ["Named"]
//! ```

use crate::convert::{standard_comparators, standard_handlers};
use crate::engine::GraphEngine;
use crate::error::{HierarchyError, RegistryError};
use crate::handler::{Comparator, Handler};
use crate::registry::{HandlerRegistry, DEFAULT_CACHE_CAPACITY};
use crate::types::{TypeDecl, TypeHierarchy};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid type hierarchy: {0}")]
    Hierarchy(#[from] HierarchyError),

    #[error("Registration failed: {0}")]
    Registry(#[from] RegistryError),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    /// User types declared on top of the built-in hierarchy.
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

/// Handler registry settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Maximum number of memoised hierarchy resolutions.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Freeze registries once the standard handlers are installed.
    #[serde(default)]
    pub freeze_after_setup: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
            freeze_after_setup: false,
        }
    }
}

/// Traversal settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Enumerate every structural node twice and fail if the results differ.
    #[serde(default)]
    pub verify_accessor: bool,

    /// Log the first mismatch found by compare mode.
    #[serde(default = "default_true")]
    pub log_mismatches: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            verify_accessor: false,
            log_mismatches: true,
        }
    }
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_true() -> bool {
    true
}

impl GraphConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registry.cache_capacity == 0 {
            return Err(ConfigError::Invalid(
                "registry.cache_capacity must be greater than zero".into(),
            ));
        }
        for (i, decl) in self.types.iter().enumerate() {
            if decl.name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("Type {} has an empty name", i)));
            }
        }
        Ok(())
    }

    /// Built-in hierarchy extended with `[[types]]`.
    pub fn build_hierarchy(&self) -> Result<TypeHierarchy, ConfigError> {
        Ok(TypeHierarchy::builder()
            .declare_all(self.types.iter().cloned())
            .build()?)
    }

    /// Empty registry over `hierarchy` sized per `[registry]`.
    pub fn build_registry<H: Clone>(
        &self,
        hierarchy: Arc<TypeHierarchy>,
    ) -> Result<HandlerRegistry<H>, ConfigError> {
        let capacity = NonZeroUsize::new(self.registry.cache_capacity).ok_or_else(|| {
            ConfigError::Invalid("registry.cache_capacity must be greater than zero".into())
        })?;
        Ok(HandlerRegistry::with_capacity(hierarchy, capacity))
    }

    /// Engine with the standard handlers and comparators installed.
    ///
    /// With `freeze_after_setup` the registries are frozen before returning.
    pub fn build_engine(&self) -> Result<GraphEngine, ConfigError> {
        self.validate()?;
        let hierarchy = Arc::new(self.build_hierarchy()?);

        let handlers: HandlerRegistry<Handler> = self.build_registry(Arc::clone(&hierarchy))?;
        standard_handlers(&handlers)?;
        let comparators: HandlerRegistry<Comparator> = self.build_registry(hierarchy)?;
        standard_comparators(&comparators)?;

        if self.registry.freeze_after_setup {
            handlers.freeze();
            comparators.freeze();
        }

        Ok(GraphEngine::new(Arc::new(handlers))
            .with_comparators(Arc::new(comparators))
            .with_config(self.engine.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TypeKind, TypeTag};

    #[test]
    fn test_defaults() {
        let config = GraphConfig::from_toml_str("").expect("empty config");
        assert_eq!(config.registry.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert!(!config.registry.freeze_after_setup);
        assert!(!config.engine.verify_accessor);
        assert!(config.engine.log_mismatches);
        assert!(config.types.is_empty());
    }

    #[test]
    fn test_parse_types() {
        let config = GraphConfig::from_toml_str(
            r#"
            [[types]]
            name = "Named"
            kind = "contract"

            [[types]]
            name = "Person"
            parent = "record"
            contracts = ["Named"]
            "#,
        )
        .expect("valid config");

        assert_eq!(config.types.len(), 2);
        assert_eq!(config.types[0].kind, TypeKind::Contract);
        assert_eq!(config.types[1].kind, TypeKind::Class);

        let hierarchy = config.build_hierarchy().expect("valid hierarchy");
        assert!(hierarchy.is_subtype(&TypeTag::new("Person"), &TypeTag::new("Named")));
    }

    #[test]
    fn test_validation() {
        let zero = GraphConfig::from_toml_str("[registry]\ncache_capacity = 0\n");
        assert!(matches!(zero, Err(ConfigError::Invalid(_))));

        let bad_toml = GraphConfig::from_toml_str("[registry\n");
        assert!(matches!(bad_toml, Err(ConfigError::Toml(_))));

        let bad_parent = GraphConfig::from_toml_str(
            r#"
            [[types]]
            name = "Orphan"
            parent = "Missing"
            "#,
        )
        .expect("parses");
        assert!(matches!(
            bad_parent.build_hierarchy(),
            Err(ConfigError::Hierarchy(HierarchyError::UnknownType { .. }))
        ));
    }

    #[test]
    fn test_build_engine_freezes_when_asked() {
        let mut config = GraphConfig::default();
        config.registry.freeze_after_setup = true;
        let engine = config.build_engine().expect("engine");
        assert!(engine.handlers().is_frozen());
        assert!(!engine.handlers().is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = GraphConfig::default();
        config.types.push(TypeDecl::class("Person", "record"));
        let text = toml::to_string_pretty(&config).expect("serialize");
        assert!(text.contains("cache_capacity = 1024"));
        assert!(text.contains("name = \"Person\""));

        let back: GraphConfig = toml::from_str(&text).expect("deserialize");
        assert_eq!(back, config);
    }
}
