//! Version ladder: steps a module version back one publishable release.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WhatsNewError};
use crate::models::{Version, UNITS_PER_VERSION};

/// Release granularity of a module.
///
/// - `Fine`: releases are numbered in hundredths (`7.20`, `7.19`, ...)
/// - `Coarse`: releases are numbered in tenths (`3.4`, `3.3`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stepping {
    Fine,
    Coarse,
}

impl Stepping {
    fn step_units(self) -> i64 {
        match self {
            Self::Fine => UNITS_PER_VERSION / 100,
            Self::Coarse => UNITS_PER_VERSION / 10,
        }
    }

    /// `floor(version * resolution - 1) / resolution`.
    pub fn previous(self, version: Version) -> Version {
        let step = self.step_units();
        Version::from_units((version.units().div_euclid(step) - 1) * step)
    }
}

/// Maps module identities to their stepping convention.
///
/// The host product steps in hundredths, except for its legacy variants.
/// Plugins (recognised by name prefix), legacy variants and the auxiliary
/// modules step in tenths. Anything else has no ladder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Ladder {
    pub host_module: String,
    pub legacy_host_modules: Vec<String>,
    pub plugin_prefix: String,
    pub auxiliary_modules: Vec<String>,
}

impl Default for Ladder {
    fn default() -> Self {
        Self {
            host_module: "virtual-server".to_string(),
            legacy_host_modules: vec!["virtual-server-classic".to_string()],
            plugin_prefix: "virtualmin-".to_string(),
            auxiliary_modules: vec!["security-updates".to_string()],
        }
    }
}

impl Ladder {
    pub fn stepping(&self, module: &str) -> Result<Stepping> {
        if module == self.host_module {
            return Ok(Stepping::Fine);
        }
        let coarse = self.legacy_host_modules.iter().any(|m| m == module)
            || self.auxiliary_modules.iter().any(|m| m == module)
            || (!self.plugin_prefix.is_empty() && module.starts_with(&self.plugin_prefix));
        if coarse {
            Ok(Stepping::Coarse)
        } else {
            Err(WhatsNewError::UnknownModule(module.to_string()))
        }
    }

    pub fn previous_version(&self, version: Version, module: &str) -> Result<Version> {
        Ok(self.stepping(module)?.previous(version))
    }
}
