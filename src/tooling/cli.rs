//! CLI Tooling
//!
//! Command-line interface over configuration resolution, manifest listing,
//! and activation preflight. Commands return their output as a string;
//! the binary prints it or reports the error and exits non-zero.

use crate::activator::{AgentActivator, ModuleRegistry, PreflightReport};
use crate::config::{ConfigPaths, ConfigResolver};
use crate::manifest::ManifestStore;
use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

/// kOS CLI - config-driven agent activation runtime
#[derive(Parser)]
#[command(name = "kos")]
#[command(about = "Config-driven agent activation runtime")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// User override configuration file path
    #[arg(long)]
    pub user_config: Option<PathBuf>,

    /// Plugin manifest path
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configuration commands (resolve, show, export, import)
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// List declared plugins; a degraded manifest lists as empty
    Plugins {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Activation preflight for one agent, without instantiating it
    Check {
        /// Agent name as declared in the manifest
        name: String,
    },
    /// Preflight every agent in a profile's agent list
    Init {
        /// Preset to resolve (default: KOS_PROFILE or "basic")
        #[arg(long)]
        profile: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Resolve and print the effective configuration
    Resolve {
        /// Preset to resolve (default: KOS_PROFILE or "basic")
        #[arg(long)]
        profile: Option<String>,
    },
    /// Print the cached configuration, resolving the default profile if needed
    Show,
    /// Export the cached configuration to a file
    Export { path: PathBuf },
    /// Import a configuration snapshot (skips schema validation)
    Import { path: PathBuf },
}

/// Wires the resolver, manifest store, and registry for command execution.
pub struct CliContext {
    resolver: Arc<ConfigResolver>,
    store: ManifestStore,
    activator: AgentActivator,
}

impl CliContext {
    /// Standard discovery with per-flag overrides. The registry is supplied
    /// by the embedding host; the bare binary runs with an empty one.
    pub fn new(
        config: Option<PathBuf>,
        user_config: Option<PathBuf>,
        manifest: Option<PathBuf>,
        registry: ModuleRegistry,
    ) -> Self {
        let mut paths = ConfigPaths::discover();
        if let Some(base) = config {
            paths.base = base;
        }
        if let Some(user) = user_config {
            paths.user = Some(user);
        }

        let resolver = Arc::new(ConfigResolver::new(paths));
        let store = match manifest {
            Some(path) => ManifestStore::new(path),
            None => ManifestStore::discover(std::path::Path::new(".")),
        };
        let activator = AgentActivator::new(resolver.clone(), store.clone(), registry);

        Self {
            resolver,
            store,
            activator,
        }
    }

    pub fn execute(&self, command: &Commands) -> Result<String> {
        match command {
            Commands::Config { command } => self.execute_config(command),
            Commands::Plugins { format } => self.list_plugins(format),
            Commands::Check { name } => {
                let report = self.activator.preflight(name)?;
                Ok(format_report(&report))
            }
            Commands::Init { profile } => self.init_profile(profile.as_deref()),
        }
    }

    fn execute_config(&self, command: &ConfigCommands) -> Result<String> {
        match command {
            ConfigCommands::Resolve { profile } => {
                let cfg = self.resolver.resolve(profile.as_deref())?;
                Ok(serde_yaml::to_string(&cfg.to_value())?)
            }
            ConfigCommands::Show => {
                let cfg = self.resolver.get()?;
                Ok(serde_yaml::to_string(&cfg.to_value())?)
            }
            ConfigCommands::Export { path } => {
                if self.resolver.export(path) {
                    Ok(format!("configuration exported to {}", path.display()))
                } else {
                    Ok("nothing exported (no configuration resolved or write failed)".to_string())
                }
            }
            ConfigCommands::Import { path } => {
                if self.resolver.import(path) {
                    Ok(format!("configuration imported from {}", path.display()))
                } else {
                    Ok("import failed; previous configuration kept".to_string())
                }
            }
        }
    }

    fn list_plugins(&self, format: &str) -> Result<String> {
        let manifest = self.store.load()?;

        if format == "json" {
            let entries: Vec<_> = manifest
                .plugins
                .iter()
                .map(|p| {
                    json!({
                        "name": p.name,
                        "entry": p.entry,
                        "requires": p.requires,
                    })
                })
                .collect();
            return Ok(serde_json::to_string_pretty(&json!({ "plugins": entries }))?);
        }

        if manifest.is_empty() {
            return Ok("no plugins declared".to_string());
        }

        let mut out = String::new();
        for plugin in &manifest.plugins {
            if plugin.requires.is_empty() {
                writeln!(out, "{}  ({})", plugin.name, plugin.entry)?;
            } else {
                writeln!(
                    out,
                    "{}  ({})  requires: {}",
                    plugin.name,
                    plugin.entry,
                    plugin.requires.join(", ")
                )?;
            }
        }
        Ok(out)
    }

    fn init_profile(&self, profile: Option<&str>) -> Result<String> {
        let cfg = self.resolver.resolve(profile)?;
        let agents = cfg.agents();
        if agents.is_empty() {
            return Ok("profile declares no agents".to_string());
        }

        let mut out = String::new();
        let mut ready = 0usize;
        for agent in &agents {
            let report = self.activator.preflight(agent)?;
            if report.is_ready() {
                ready += 1;
                writeln!(out, "{}: ready", agent)?;
            } else {
                writeln!(out, "{}: {}", agent, report.errors.join("; "))?;
            }
        }
        writeln!(out, "{}/{} agents ready", ready, agents.len())?;
        Ok(out)
    }
}

fn format_report(report: &PreflightReport) -> String {
    let mut out = format!("agent '{}'\n", report.agent);
    for (description, passed) in &report.checks {
        let mark = if *passed { "ok" } else { "failed" };
        let _ = writeln!(out, "  {}: {}", description, mark);
    }
    for error in &report.errors {
        let _ = writeln!(out, "  error: {}", error);
    }
    let verdict = if report.is_ready() { "ready" } else { "not ready" };
    let _ = writeln!(out, "  {}", verdict);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activator::Agent;
    use crate::test_support::ENV_LOCK;
    use std::fs;
    use tempfile::TempDir;

    struct AgentDev;

    impl Agent for AgentDev {
        fn kind(&self) -> &str {
            "AgentDev"
        }
    }

    fn context(dir: &TempDir, registry: ModuleRegistry) -> CliContext {
        let base = dir.path().join("defaults.yaml");
        fs::write(
            &base,
            "ui_server:\n  host: 127.0.0.1\n  port: 8000\nagent_memory:\n  backend: chroma\nagents: [agent_dev]\nservices: [ollama]\n",
        )
        .unwrap();

        let manifest = dir.path().join("plugin_manifest.json");
        fs::write(
            &manifest,
            r#"{"plugins": [{"name": "agent_dev", "entry": "agents/agent_dev.rs", "requires": []}]}"#,
        )
        .unwrap();

        CliContext::new(Some(base), None, Some(manifest), registry)
    }

    #[test]
    fn config_resolve_prints_yaml() {
        let _guard = ENV_LOCK.lock();
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, ModuleRegistry::new());
        let output = ctx
            .execute(&Commands::Config {
                command: ConfigCommands::Resolve {
                    profile: Some("basic".to_string()),
                },
            })
            .unwrap();
        assert!(output.contains("ui_server"));
        assert!(output.contains("agent_dev"));
    }

    #[test]
    fn plugins_json_lists_declared_entries() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, ModuleRegistry::new());
        let output = ctx
            .execute(&Commands::Plugins {
                format: "json".to_string(),
            })
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        let plugins = parsed.get("plugins").and_then(|v| v.as_array()).unwrap();
        assert_eq!(plugins.len(), 1);
        assert_eq!(
            plugins[0].get("name").and_then(|v| v.as_str()),
            Some("agent_dev")
        );
    }

    #[test]
    fn check_reports_ready_when_registered() {
        let _guard = ENV_LOCK.lock();
        let dir = TempDir::new().unwrap();
        let mut registry = ModuleRegistry::new();
        registry.register("agents.agent_dev", "AgentDev", || Ok(Box::new(AgentDev)));
        let ctx = context(&dir, registry);

        let output = ctx
            .execute(&Commands::Check {
                name: "agent_dev".to_string(),
            })
            .unwrap();
        assert!(output.contains("ready"));
        assert!(!output.contains("not ready"));
    }

    #[test]
    fn check_reports_unregistered_module() {
        let _guard = ENV_LOCK.lock();
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, ModuleRegistry::new());
        let output = ctx
            .execute(&Commands::Check {
                name: "agent_dev".to_string(),
            })
            .unwrap();
        assert!(output.contains("no module registered"));
        assert!(output.contains("not ready"));
    }

    #[test]
    fn init_summarizes_profile_agents() {
        let _guard = ENV_LOCK.lock();
        let dir = TempDir::new().unwrap();
        let mut registry = ModuleRegistry::new();
        registry.register("agents.agent_dev", "AgentDev", || Ok(Box::new(AgentDev)));
        let ctx = context(&dir, registry);

        let output = ctx
            .execute(&Commands::Init {
                profile: Some("basic".to_string()),
            })
            .unwrap();
        assert!(output.contains("agent_dev: ready"));
        assert!(output.contains("1/1 agents ready"));
    }
}
