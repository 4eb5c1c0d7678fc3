//! Process-wide configuration resolution.
//!
//! `ConfigResolver` owns the cached effective configuration behind a
//! read-write lock: resolve-if-absent is a single critical section, and
//! `import`/`export` are atomic with respect to concurrent readers.

use crate::config::merge::{self, key, PRESETS_KEY};
use crate::config::paths::ConfigPaths;
use crate::config::schema::{self, SCHEMA_KEYS};
use crate::config::EffectiveConfig;
use crate::error::ConfigError;
use anyhow::anyhow;
use parking_lot::RwLock;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

/// Environment variable naming the preset to resolve when no explicit
/// profile is given.
pub const PROFILE_ENV: &str = "KOS_PROFILE";

/// Preset used when neither an explicit profile nor the environment names one.
pub const DEFAULT_PROFILE: &str = "basic";

/// Lazily-initialized owner of the effective configuration.
pub struct ConfigResolver {
    paths: ConfigPaths,
    state: RwLock<Option<EffectiveConfig>>,
}

impl ConfigResolver {
    pub fn new(paths: ConfigPaths) -> Self {
        Self {
            paths,
            state: RwLock::new(None),
        }
    }

    /// Resolve with standard source discovery.
    pub fn discover() -> Self {
        Self::new(ConfigPaths::discover())
    }

    /// Merge all layers, select a preset, apply environment overrides,
    /// validate, and cache the result as the process-wide configuration.
    pub fn resolve(&self, profile: Option<&str>) -> Result<EffectiveConfig, ConfigError> {
        let mut guard = self.state.write();
        let resolved = self.compute(profile)?;
        *guard = Some(resolved.clone());
        info!(path = %self.paths.base.display(), "configuration resolved");
        Ok(resolved)
    }

    /// Cached configuration, resolving the default profile on first access.
    /// Never re-resolves after a successful resolution.
    pub fn get(&self) -> Result<EffectiveConfig, ConfigError> {
        if let Some(cfg) = self.state.read().as_ref() {
            return Ok(cfg.clone());
        }

        let mut guard = self.state.write();
        // Another caller may have resolved while we waited for the lock.
        if let Some(cfg) = guard.as_ref() {
            return Ok(cfg.clone());
        }
        let resolved = self.compute(None)?;
        *guard = Some(resolved.clone());
        Ok(resolved)
    }

    /// Serialize the cached configuration verbatim. Returns false (with a
    /// warning) when nothing has been resolved or the write fails; never an
    /// error, by design an operator convenience path.
    pub fn export(&self, dest: &Path) -> bool {
        let guard = self.state.read();
        let Some(cfg) = guard.as_ref() else {
            warn!("no configuration resolved; nothing to export");
            return false;
        };

        let text = match serde_yaml::to_string(&cfg.to_value()) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "failed to serialize configuration for export");
                return false;
            }
        };

        match fs::write(dest, text) {
            Ok(()) => {
                info!(path = %dest.display(), "configuration exported");
                true
            }
            Err(e) => {
                warn!(path = %dest.display(), error = %e, "failed to export configuration");
                false
            }
        }
    }

    /// Replace the cached configuration with the parsed contents of `src`,
    /// skipping schema validation. Returns false and leaves prior state
    /// untouched on any read or parse failure.
    pub fn import(&self, src: &Path) -> bool {
        let text = match fs::read_to_string(src) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %src.display(), error = %e, "failed to read config for import");
                return false;
            }
        };

        let doc = match serde_yaml::from_str::<Value>(&text) {
            Ok(Value::Mapping(doc)) => doc,
            Ok(_) => {
                warn!(path = %src.display(), "imported config is not a mapping; keeping previous state");
                return false;
            }
            Err(e) => {
                warn!(path = %src.display(), error = %e, "failed to parse config for import");
                return false;
            }
        };

        *self.state.write() = Some(EffectiveConfig::from_mapping(doc));
        info!(path = %src.display(), "configuration imported");
        true
    }

    /// The full merge pipeline. Pure with respect to `self.state`; callers
    /// hold the lock appropriate for how the result is published.
    fn compute(&self, profile: Option<&str>) -> Result<EffectiveConfig, ConfigError> {
        let mut merged = read_document(&self.paths.base)?;

        if let Some(user_path) = &self.paths.user {
            match read_document(user_path) {
                Ok(user) => merge::merge_layers(&mut merged, user),
                // Absence of the user override layer is not an error.
                Err(ConfigError::Missing(_)) => {}
                Err(e) => return Err(e),
            }
        }

        let profile_name = profile
            .map(str::to_string)
            .or_else(|| std::env::var(PROFILE_ENV).ok())
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        let presets = match merged.remove(&key(PRESETS_KEY)) {
            Some(Value::Mapping(presets)) => presets,
            _ => Mapping::new(),
        };
        match presets.get(&key(&profile_name)) {
            Some(Value::Mapping(preset)) => merge::overlay_preset(&mut merged, preset),
            _ => warn!(profile = %profile_name, "preset not declared; using base sections only"),
        }

        // One override per schema key, read from the upper-cased key name.
        // The raw string replaces the whole section; validation below is the
        // backstop for overrides that break the schema.
        for section in SCHEMA_KEYS {
            if let Ok(raw) = std::env::var(section.to_ascii_uppercase()) {
                merged.insert(key(section), Value::String(raw));
            }
        }

        schema::validate(&merged)?;
        Ok(EffectiveConfig::from_mapping(merged))
    }
}

fn read_document(path: &Path) -> Result<Mapping, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            ConfigError::Missing(path.to_path_buf())
        } else {
            ConfigError::Malformed {
                path: path.to_path_buf(),
                source: e.into(),
            }
        }
    })?;

    match serde_yaml::from_str::<Value>(&text) {
        Ok(Value::Mapping(doc)) => Ok(doc),
        // An empty document contributes an empty layer.
        Ok(Value::Null) => Ok(Mapping::new()),
        Ok(_) => Err(ConfigError::Malformed {
            path: path.to_path_buf(),
            source: anyhow!("document root must be a mapping"),
        }),
        Err(e) => Err(ConfigError::Malformed {
            path: path.to_path_buf(),
            source: e.into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryBackend;
    use crate::test_support::ENV_LOCK;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const BASE: &str = "\
ui_server:
  host: 127.0.0.1
  port: 8000
agent_memory:
  backend: chroma
agents: [agent_dev]
services: [ollama]
presets:
  basic:
    agents: [agent_dev]
  dev:
    agents: [agent_dev, agent_ui]
    services: [ollama, a1111]
";

    fn write_base(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("defaults.yaml");
        fs::write(&path, BASE).unwrap();
        path
    }

    fn resolver(dir: &TempDir) -> ConfigResolver {
        ConfigResolver::new(ConfigPaths::new(write_base(dir), None))
    }

    #[test]
    fn resolve_missing_base_is_config_missing() {
        let _guard = ENV_LOCK.lock();
        let dir = TempDir::new().unwrap();
        let resolver = ConfigResolver::new(ConfigPaths::new(dir.path().join("absent.yaml"), None));
        assert!(matches!(
            resolver.resolve(Some("basic")),
            Err(ConfigError::Missing(_))
        ));
    }

    #[test]
    fn resolve_unparsable_base_is_config_malformed() {
        let _guard = ENV_LOCK.lock();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("defaults.yaml");
        fs::write(&path, "ui_server: [unclosed\n").unwrap();
        let resolver = ConfigResolver::new(ConfigPaths::new(path, None));
        assert!(matches!(
            resolver.resolve(Some("basic")),
            Err(ConfigError::Malformed { .. })
        ));
    }

    #[test]
    fn resolve_selects_named_preset_over_base_sections() {
        let _guard = ENV_LOCK.lock();
        let dir = TempDir::new().unwrap();
        let cfg = resolver(&dir).resolve(Some("dev")).unwrap();
        assert_eq!(cfg.agents(), vec!["agent_dev", "agent_ui"]);
        assert!(cfg.services().contains("a1111"));
    }

    #[test]
    fn resolve_missing_user_layer_is_not_an_error() {
        let _guard = ENV_LOCK.lock();
        let dir = TempDir::new().unwrap();
        let paths = ConfigPaths::new(write_base(&dir), Some(dir.path().join("no-user.yaml")));
        let cfg = ConfigResolver::new(paths).resolve(Some("basic")).unwrap();
        assert_eq!(cfg.agents(), vec!["agent_dev"]);
    }

    #[test]
    fn resolve_applies_user_preset_update() {
        let _guard = ENV_LOCK.lock();
        let dir = TempDir::new().unwrap();
        let user = dir.path().join("user.yaml");
        fs::write(&user, "presets:\n  dev:\n    services: [ollama, a1111, comfy]\n").unwrap();
        let paths = ConfigPaths::new(write_base(&dir), Some(user));
        let cfg = ConfigResolver::new(paths).resolve(Some("dev")).unwrap();
        // agents from the base preset, services from the user update
        assert_eq!(cfg.agents(), vec!["agent_dev", "agent_ui"]);
        assert!(cfg.services().contains("comfy"));
    }

    #[test]
    fn resolve_validates_after_merge() {
        let _guard = ENV_LOCK.lock();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("defaults.yaml");
        fs::write(&path, "agents: []\nservices: []\n").unwrap();
        let resolver = ConfigResolver::new(ConfigPaths::new(path, None));
        assert!(matches!(
            resolver.resolve(Some("basic")),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn environment_override_replaces_section_and_fails_validation_when_structural() {
        let _guard = ENV_LOCK.lock();
        let dir = TempDir::new().unwrap();
        std::env::set_var("SERVICES", "just-a-string");
        let outcome = resolver(&dir).resolve(Some("basic"));
        std::env::remove_var("SERVICES");
        assert!(matches!(outcome, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn profile_env_selects_preset_when_no_explicit_profile() {
        let _guard = ENV_LOCK.lock();
        let dir = TempDir::new().unwrap();
        std::env::set_var(PROFILE_ENV, "dev");
        let outcome = resolver(&dir).resolve(None);
        std::env::remove_var(PROFILE_ENV);
        assert_eq!(outcome.unwrap().agents(), vec!["agent_dev", "agent_ui"]);
    }

    #[test]
    fn get_resolves_once_and_caches() {
        let _guard = ENV_LOCK.lock();
        let dir = TempDir::new().unwrap();
        let base = write_base(&dir);
        let resolver = ConfigResolver::new(ConfigPaths::new(base.clone(), None));

        let first = resolver.get().unwrap();
        assert_eq!(first.agent_memory().unwrap().backend, MemoryBackend::Chroma);

        // Source changes after first resolution are not observed.
        fs::write(&base, BASE.replace("chroma", "postgres")).unwrap();
        let second = resolver.get().unwrap();
        assert_eq!(second.agent_memory().unwrap().backend, MemoryBackend::Chroma);
    }

    #[test]
    fn export_before_resolve_is_a_noop() {
        let _guard = ENV_LOCK.lock();
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir);
        let dest = dir.path().join("backup.yaml");
        assert!(!resolver.export(&dest));
        assert!(!dest.exists());
    }

    #[test]
    fn export_then_import_round_trips_verbatim() {
        let _guard = ENV_LOCK.lock();
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir);
        let resolved = resolver.resolve(Some("dev")).unwrap();

        let dest = dir.path().join("backup.yaml");
        assert!(resolver.export(&dest));
        assert!(resolver.import(&dest));
        assert_eq!(resolver.get().unwrap(), resolved);
    }

    #[test]
    fn import_failure_leaves_prior_state_untouched() {
        let _guard = ENV_LOCK.lock();
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir);
        let resolved = resolver.resolve(Some("basic")).unwrap();

        assert!(!resolver.import(&dir.path().join("absent.yaml")));

        let garbled = dir.path().join("garbled.yaml");
        fs::write(&garbled, "{unclosed\n").unwrap();
        assert!(!resolver.import(&garbled));

        assert_eq!(resolver.get().unwrap(), resolved);
    }

    #[test]
    fn import_skips_schema_validation() {
        let _guard = ENV_LOCK.lock();
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir);
        resolver.resolve(Some("basic")).unwrap();

        let partial = dir.path().join("partial.yaml");
        fs::write(&partial, "services: [only-services]\n").unwrap();
        assert!(resolver.import(&partial));
        assert!(resolver.get().unwrap().services().contains("only-services"));
    }
}
