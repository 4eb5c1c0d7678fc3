//! Layered Configuration
//!
//! Resolves base, user-override, and environment-sourced configuration layers
//! into a single effective configuration validated against the schema. The
//! resolved configuration is process-wide read-mostly state owned by
//! [`ConfigResolver`].

pub mod merge;
pub mod paths;
pub mod resolver;
pub mod schema;

pub use paths::ConfigPaths;
pub use resolver::ConfigResolver;
pub use schema::{AgentMemoryConfig, MemoryBackend, UiServerConfig};

use serde_yaml::{Mapping, Value};
use std::collections::HashSet;

/// Fully merged configuration document.
///
/// Stores the raw mapping so extra keys survive export verbatim and so the
/// unvalidated `import` path can carry whatever the operator supplied.
/// Accessors degrade to empty defaults for absent or mistyped sections.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    doc: Mapping,
}

impl EffectiveConfig {
    pub(crate) fn from_mapping(doc: Mapping) -> Self {
        Self { doc }
    }

    /// Raw top-level section lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.doc.get(&Value::String(key.to_string()))
    }

    /// Service names the configuration declares as available.
    pub fn services(&self) -> HashSet<String> {
        self.string_list(schema::SERVICES_KEY).into_iter().collect()
    }

    /// Agent names the configuration activates by default.
    pub fn agents(&self) -> Vec<String> {
        self.string_list(schema::AGENTS_KEY)
    }

    /// Typed view of the `ui_server` section, if well-formed.
    pub fn ui_server(&self) -> Option<UiServerConfig> {
        self.section(schema::UI_SERVER_KEY)
    }

    /// Typed view of the `agent_memory` section, if well-formed.
    pub fn agent_memory(&self) -> Option<AgentMemoryConfig> {
        self.section(schema::AGENT_MEMORY_KEY)
    }

    /// The document as a YAML value, for serialization.
    pub fn to_value(&self) -> Value {
        Value::Mapping(self.doc.clone())
    }

    fn section<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .and_then(|v| serde_yaml::from_value(v.clone()).ok())
    }

    fn string_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Sequence(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}
