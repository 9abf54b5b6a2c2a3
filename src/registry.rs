//! Module discovery.

use serde::{Deserialize, Serialize};

use crate::models::{ModuleVersionInfo, Version};

/// Installed modules and their per-module settings, as known to the host.
pub trait ModuleRegistry {
    /// Candidate modules: the host product, installed plugins and the
    /// auxiliary module, in display order.
    fn modules(&self) -> Vec<ModuleVersionInfo>;

    /// Whether the module is installed and usable right now.
    fn is_available(&self, module: &str) -> bool;

    /// Per-module "first version to show" setting.
    fn first_version_to_show(&self, module: &str) -> Option<Version>;
}

/// Available modules with their configured floors applied.
pub fn modules_of_interest(registry: &dyn ModuleRegistry) -> Vec<ModuleVersionInfo> {
    registry
        .modules()
        .into_iter()
        .filter(|m| registry.is_available(&m.name))
        .map(|mut m| {
            if let Some(floor) = registry.first_version_to_show(&m.name) {
                m.first_version_to_show = Some(floor);
            }
            m
        })
        .collect()
}

/// A module entry from configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModuleEntry {
    #[serde(flatten)]
    pub info: ModuleVersionInfo,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

/// Registry backed by a fixed list of configured modules.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    entries: Vec<ModuleEntry>,
}

impl StaticRegistry {
    pub fn new(entries: Vec<ModuleEntry>) -> Self {
        Self { entries }
    }

    fn entry(&self, module: &str) -> Option<&ModuleEntry> {
        self.entries.iter().find(|e| e.info.name == module)
    }
}

impl ModuleRegistry for StaticRegistry {
    fn modules(&self) -> Vec<ModuleVersionInfo> {
        self.entries.iter().map(|e| e.info.clone()).collect()
    }

    fn is_available(&self, module: &str) -> bool {
        self.entry(module).is_some_and(|e| e.enabled)
    }

    fn first_version_to_show(&self, module: &str) -> Option<Version> {
        self.entry(module).and_then(|e| e.info.first_version_to_show)
    }
}
