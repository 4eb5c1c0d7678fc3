//! Static factory registry.
//!
//! The redesign of dynamic import: a mapping from canonical dotted module
//! path to the implementations that module exports, each backed by a factory
//! registered explicitly at process start. The manifest still drives
//! selection; nothing here resolves symbols from strings at runtime.

use super::AgentHandle;
use std::collections::HashMap;
use std::sync::Arc;

/// Zero-argument constructor for an agent implementation.
pub type AgentFactory = Arc<dyn Fn() -> anyhow::Result<AgentHandle> + Send + Sync>;

/// Implementations exported by one module, keyed by implementation name.
pub type ModuleExports = HashMap<String, AgentFactory>;

/// Registry of activatable implementations, read-only after startup.
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, ModuleExports>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `module_path` (canonical dotted form) and
    /// `implementation` (the derived type name, e.g. `AgentDev`).
    pub fn register<F>(&mut self, module_path: &str, implementation: &str, factory: F)
    where
        F: Fn() -> anyhow::Result<AgentHandle> + Send + Sync + 'static,
    {
        self.modules
            .entry(module_path.to_string())
            .or_default()
            .insert(implementation.to_string(), Arc::new(factory));
    }

    /// Exports of the module at `module_path`, if registered.
    pub fn module(&self, module_path: &str) -> Option<&ModuleExports> {
        self.modules.get(module_path)
    }

    pub fn contains_module(&self, module_path: &str) -> bool {
        self.modules.contains_key(module_path)
    }

    /// Factory lookup across both levels.
    pub fn factory(&self, module_path: &str, implementation: &str) -> Option<&AgentFactory> {
        self.module(module_path)
            .and_then(|exports| exports.get(implementation))
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
