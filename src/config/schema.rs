//! Configuration schema: required sections and post-merge validation.
//!
//! Validation runs after layer merge and after environment overrides are
//! applied; failure is a hard error. Unknown extra keys are tolerated.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

pub const UI_SERVER_KEY: &str = "ui_server";
pub const AGENT_MEMORY_KEY: &str = "agent_memory";
pub const AGENTS_KEY: &str = "agents";
pub const SERVICES_KEY: &str = "services";

/// Recognized top-level sections, each overridable by an environment
/// variable named by upper-casing the key.
pub const SCHEMA_KEYS: [&str; 4] = [UI_SERVER_KEY, AGENT_MEMORY_KEY, AGENTS_KEY, SERVICES_KEY];

/// UI server address section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiServerConfig {
    pub host: String,
    pub port: u16,
}

/// Memory backend selector section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMemoryConfig {
    pub backend: MemoryBackend,
}

/// Closed set of supported agent memory backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryBackend {
    Chroma,
    Weaviate,
    Postgres,
}

/// The full schema contract. Deserialization doubles as validation; extra
/// keys land in the flattened map and pass through untouched.
#[derive(Debug, Deserialize)]
struct SchemaDoc {
    #[allow(dead_code)]
    ui_server: UiServerConfig,
    #[allow(dead_code)]
    agent_memory: AgentMemoryConfig,
    #[allow(dead_code)]
    agents: Vec<String>,
    #[allow(dead_code)]
    services: Vec<String>,
    #[serde(flatten)]
    #[allow(dead_code)]
    extra: BTreeMap<String, Value>,
}

/// Validate a merged document against the schema.
pub fn validate(doc: &Mapping) -> Result<(), ConfigError> {
    serde_yaml::from_value::<SchemaDoc>(Value::Mapping(doc.clone()))
        .map(|_| ())
        .map_err(|e| ConfigError::Invalid(e.to_string()))
}
