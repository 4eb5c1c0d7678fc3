//! Plugin manifest: the declarative list of installable agents.
//!
//! Load is fail-open by design: a missing or unparsable source degrades to
//! an empty manifest so listing surfaces stay functional. A present manifest
//! with duplicate names is a declaration bug and fails loudly instead.

use crate::error::ManifestError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One installable agent declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginEntry {
    /// Unique identifier; also derives the expected implementation name.
    pub name: String,
    /// Relative path-like descriptor of where the implementation lives.
    pub entry: String,
    /// Service names that must be available before activation.
    #[serde(default)]
    pub requires: Vec<String>,
}

/// Ordered collection of plugin declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    #[serde(default)]
    pub plugins: Vec<PluginEntry>,
}

impl PluginManifest {
    /// Exact-name lookup.
    pub fn find(&self, name: &str) -> Option<&PluginEntry> {
        self.plugins.iter().find(|plugin| plugin.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    fn check_unique_names(&self) -> Result<(), ManifestError> {
        let mut seen = HashSet::new();
        for plugin in &self.plugins {
            if !seen.insert(plugin.name.as_str()) {
                return Err(ManifestError::DuplicateName {
                    name: plugin.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Reads plugin declarations from a JSON document with a `plugins` list.
/// Stateless; `load` may be called concurrently and freely.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Manifest at the default location under a deployment root.
    pub fn discover(root: &Path) -> Self {
        Self::new(crate::config::paths::manifest_path(root))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the manifest. Missing or unparsable sources degrade to an empty
    /// manifest with a warning; duplicate plugin names are a hard error.
    pub fn load(&self) -> Result<PluginManifest, ManifestError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "plugin manifest not found; treating as empty");
                return Ok(PluginManifest::default());
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read plugin manifest; treating as empty");
                return Ok(PluginManifest::default());
            }
        };

        let manifest = match serde_json::from_str::<PluginManifest>(&text) {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to decode plugin manifest; treating as empty");
                return Ok(PluginManifest::default());
            }
        };

        manifest.check_unique_names()?;
        Ok(manifest)
    }
}
