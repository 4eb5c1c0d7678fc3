//! Error taxonomy for configuration resolution and agent activation.
//!
//! Each activation stage fails with its own kind so callers can react
//! differently: retry after service startup on `DependencyUnmet`, alert on
//! `UnsafeEntryPath` as a potential attack signal.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration resolution failures. Fatal to the resolving call, never to
/// the process; the caller decides.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The base configuration source does not exist.
    #[error("config source not found: {0}")]
    Missing(PathBuf),

    /// A configuration source exists but could not be read or parsed.
    #[error("malformed config {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The merged configuration failed schema validation.
    #[error("config validation failed: {0}")]
    Invalid(String),
}

/// Manifest declaration errors. Load degradation (missing or unparsable
/// source) is logged and fails open to an empty manifest instead; only a
/// structurally invalid manifest surfaces here.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Two plugin entries declare the same name.
    #[error("duplicate plugin name in manifest: '{name}'")]
    DuplicateName { name: String },
}

/// Agent activation failures, one per activation stage.
#[derive(Debug, Error)]
pub enum ActivateError {
    /// The agent name has no entry in the plugin manifest.
    #[error("agent '{0}' not declared in plugin manifest")]
    NotDeclared(String),

    /// One or more required services are absent from the effective
    /// configuration's service list.
    #[error("dependencies not met for agent '{agent}': missing {missing:?}")]
    DependencyUnmet {
        agent: String,
        missing: Vec<String>,
    },

    /// The manifest entry descriptor contained characters outside the
    /// module-path allow-list.
    #[error("unsafe entry path for agent '{agent}': '{entry}'")]
    UnsafeEntryPath { agent: String, entry: String },

    /// No module is registered at the sanitized entry path.
    #[error("no module registered at '{module}' for agent '{agent}'")]
    ModuleLoad { agent: String, module: String },

    /// The module exists but exports no matching implementation.
    #[error("implementation '{implementation}' not found in module '{module}'")]
    ImplementationNotFound {
        module: String,
        implementation: String,
    },

    /// The factory ran but construction failed.
    #[error("failed to construct agent '{agent}'")]
    Activation {
        agent: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
