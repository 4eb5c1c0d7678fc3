//! kOS: Config-Driven Agent Activation Runtime
//!
//! Resolves layered configuration into a single effective configuration,
//! gates agent activation on declared service dependencies, and instantiates
//! agent implementations through a statically-registered factory table keyed
//! by sanitized manifest entry paths.

pub mod activator;
pub mod config;
pub mod error;
pub mod gate;
pub mod logging;
pub mod manifest;
pub mod tooling;

pub use activator::{Agent, AgentActivator, AgentHandle, ModuleRegistry, PreflightReport};
pub use config::{ConfigPaths, ConfigResolver, EffectiveConfig};
pub use error::{ActivateError, ConfigError, ManifestError};
pub use manifest::{ManifestStore, PluginEntry, PluginManifest};
