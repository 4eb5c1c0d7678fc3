//! Configuration source discovery.
//!
//! Base document lives with the deployment (`configs/defaults.yaml` relative
//! to the working directory); the optional user override follows the XDG
//! Base Directory layout (`$XDG_CONFIG_HOME/kos/config.yaml`).

use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_PATH: &str = "configs/defaults.yaml";
pub const USER_CONFIG_FILE: &str = "config.yaml";
const APP_DIR: &str = "kos";

/// Locations the resolver reads from.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Required base document.
    pub base: PathBuf,
    /// Optional user override document; `None` disables the user layer.
    pub user: Option<PathBuf>,
}

impl ConfigPaths {
    pub fn new(base: impl Into<PathBuf>, user: Option<PathBuf>) -> Self {
        Self {
            base: base.into(),
            user,
        }
    }

    /// Standard discovery: deployment base plus XDG user override.
    pub fn discover() -> Self {
        Self {
            base: PathBuf::from(DEFAULT_BASE_PATH),
            user: user_config_path(),
        }
    }

    /// Replace the base document path, keeping the user layer.
    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = base.into();
        self
    }
}

/// Get XDG config home directory.
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise the platform config
/// directory (`$HOME/.config` on Linux).
pub fn config_home() -> Option<PathBuf> {
    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg_config_home.is_empty() {
            return Some(PathBuf::from(xdg_config_home));
        }
    }

    directories::BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf())
}

/// User override document path: `$XDG_CONFIG_HOME/kos/config.yaml`.
pub fn user_config_path() -> Option<PathBuf> {
    config_home().map(|home| home.join(APP_DIR).join(USER_CONFIG_FILE))
}

/// Default manifest location relative to a deployment root.
pub fn manifest_path(root: &Path) -> PathBuf {
    root.join("plugin_manifest.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discover_uses_deployment_base() {
        let paths = ConfigPaths::discover();
        assert_eq!(paths.base, PathBuf::from(DEFAULT_BASE_PATH));
    }

    #[test]
    fn with_base_replaces_only_the_base_layer() {
        let paths = ConfigPaths::new("a.yaml", Some(PathBuf::from("u.yaml"))).with_base("b.yaml");
        assert_eq!(paths.base, PathBuf::from("b.yaml"));
        assert_eq!(paths.user, Some(PathBuf::from("u.yaml")));
    }

    #[test]
    fn user_config_path_lands_under_app_dir() {
        if let Some(path) = user_config_path() {
            assert!(path.ends_with(Path::new(APP_DIR).join(USER_CONFIG_FILE)));
        }
    }
}
