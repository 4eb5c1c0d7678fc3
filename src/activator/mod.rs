//! Agent activation.
//!
//! Drives the full gated sequence: manifest lookup, dependency check against
//! the resolved configuration, entry-path sanitization, registry resolution,
//! and instantiation. Every stage fails with its own error kind; there is no
//! retry loop and no registry of live handles.

pub mod entry_path;
pub mod naming;
pub mod registry;

pub use registry::{AgentFactory, ModuleRegistry};

use crate::config::ConfigResolver;
use crate::error::ActivateError;
use crate::gate;
use crate::manifest::ManifestStore;
use std::sync::Arc;
use tracing::info;

/// A live, caller-owned agent instance. Lifecycle beyond construction is the
/// caller's concern.
pub type AgentHandle = Box<dyn Agent>;

/// Minimal contract an activatable implementation satisfies.
pub trait Agent: Send {
    /// Implementation identifier, e.g. `AgentDev` for the agent `agent_dev`.
    fn kind(&self) -> &str;
}

/// Activates agents declared in the plugin manifest.
pub struct AgentActivator {
    resolver: Arc<ConfigResolver>,
    store: ManifestStore,
    registry: ModuleRegistry,
}

impl AgentActivator {
    pub fn new(resolver: Arc<ConfigResolver>, store: ManifestStore, registry: ModuleRegistry) -> Self {
        Self {
            resolver,
            store,
            registry,
        }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Activate `agent_name`, yielding an independent instance per call.
    ///
    /// Stages: declared -> dependencies checked -> path sanitized -> module
    /// resolved -> implementation resolved -> instantiated. A manifest that
    /// fails to load degrades to empty, so an undeclared agent surfaces as
    /// [`ActivateError::NotDeclared`] either way.
    pub fn activate(&self, agent_name: &str) -> Result<AgentHandle, ActivateError> {
        let manifest = self.store.load()?;
        let declared = manifest
            .find(agent_name)
            .ok_or_else(|| ActivateError::NotDeclared(agent_name.to_string()))?;

        let available = self.resolver.get()?.services();
        if !gate::is_satisfied(&declared.requires, &available) {
            return Err(ActivateError::DependencyUnmet {
                agent: agent_name.to_string(),
                missing: gate::unmet(&declared.requires, &available),
            });
        }

        let module_path = entry_path::safe_module_path(&declared.entry).ok_or_else(|| {
            ActivateError::UnsafeEntryPath {
                agent: agent_name.to_string(),
                entry: declared.entry.clone(),
            }
        })?;

        let exports = self
            .registry
            .module(&module_path)
            .ok_or_else(|| ActivateError::ModuleLoad {
                agent: agent_name.to_string(),
                module: module_path.clone(),
            })?;

        let implementation = naming::implementation_name(agent_name);
        let factory =
            exports
                .get(&implementation)
                .ok_or_else(|| ActivateError::ImplementationNotFound {
                    module: module_path.clone(),
                    implementation: implementation.clone(),
                })?;

        let handle = factory().map_err(|source| ActivateError::Activation {
            agent: agent_name.to_string(),
            source,
        })?;

        info!(agent = agent_name, module = %module_path, "agent activated");
        Ok(handle)
    }

    /// Stage-by-stage dry run of the activation sequence. Nothing is
    /// instantiated; stage outcomes land in the report. Only infrastructure
    /// failures (invalid manifest, config resolution) surface as errors.
    pub fn preflight(&self, agent_name: &str) -> Result<PreflightReport, ActivateError> {
        let mut report = PreflightReport::new(agent_name.to_string());

        let manifest = self.store.load()?;
        let Some(declared) = manifest.find(agent_name) else {
            report.add_error("not declared in plugin manifest".to_string());
            return Ok(report);
        };
        report.add_check("declared in manifest", true);

        let available = self.resolver.get()?.services();
        let missing = gate::unmet(&declared.requires, &available);
        if missing.is_empty() {
            report.add_check("dependencies satisfied", true);
        } else {
            report.add_error(format!("missing services: {}", missing.join(", ")));
        }

        let Some(module_path) = entry_path::safe_module_path(&declared.entry) else {
            report.add_error(format!("unsafe entry path: '{}'", declared.entry));
            return Ok(report);
        };
        report.add_check("entry path safe", true);

        let implementation = naming::implementation_name(agent_name);
        if !self.registry.contains_module(&module_path) {
            report.add_error(format!("no module registered at '{}'", module_path));
        } else if self.registry.factory(&module_path, &implementation).is_none() {
            report.add_error(format!(
                "implementation '{}' not registered in '{}'",
                implementation, module_path
            ));
        } else {
            report.add_check("implementation registered", true);
        }

        Ok(report)
    }
}

/// Outcome of an activation preflight.
#[derive(Debug, Clone)]
pub struct PreflightReport {
    pub agent: String,
    pub checks: Vec<(String, bool)>,
    pub errors: Vec<String>,
}

impl PreflightReport {
    pub fn new(agent: String) -> Self {
        Self {
            agent,
            checks: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn add_check(&mut self, description: &str, passed: bool) {
        self.checks.push((description.to_string(), passed));
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }

    /// True when every stage would pass a real activation.
    pub fn is_ready(&self) -> bool {
        self.errors.is_empty() && self.checks.iter().all(|(_, passed)| *passed)
    }
}
