use serde::{Deserialize, Serialize};

use super::Version;

/// A module of interest and the version currently installed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModuleVersionInfo {
    /// Module identity, e.g. `virtual-server` or `virtualmin-nginx`.
    pub name: String,
    /// Human-readable name used in version headings. Falls back to `name`.
    #[serde(default)]
    pub title: Option<String>,
    pub version: Version,
    /// Releases older than this are never announced for the module.
    #[serde(default)]
    pub first_version_to_show: Option<Version>,
}

impl ModuleVersionInfo {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            title: None,
            version,
            first_version_to_show: None,
        }
    }

    pub fn with_floor(mut self, floor: Version) -> Self {
        self.first_version_to_show = Some(floor);
        self
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}

/// One (module, version) release whose features the user has not yet seen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingRelease {
    pub module: String,
    pub version: Version,
}
