//! Application configuration.
//!
//! Loaded from `<config dir>/whatsnew/config.json`; a missing or unreadable
//! file falls back to defaults. These environment variables override the
//! file:
//! - `WHATSNEW_FEATURES_DIR` - root of the feature store
//! - `WHATSNEW_LEDGER_DIR` - where acknowledgement records live
//! - `WHATSNEW_LEDGER` - `file` or `sqlite`
//! - `WHATSNEW_ALLOWED_ROLES` - comma-separated roles allowed to see notices
//! - `WHATSNEW_HOST_VERSION` - running host platform version

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::host::{HostedDomain, ManagedServer};
use crate::ladder::Ladder;
use crate::ledger::{AckStore, FileAckStore, Ledger, SqliteAckStore};
use crate::models::{Role, Version};
use crate::notices::Notifier;
use crate::registry::{ModuleEntry, StaticRegistry};
use crate::resolver::Resolver;
use crate::store::FeatureStore;

const APP_NAME: &str = "whatsnew";
const CONFIG_FILE: &str = "config.json";

/// Ledger implementations selectable from configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LedgerBackend {
    #[default]
    File,
    Sqlite,
}

impl LedgerBackend {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "file" => Some(Self::File),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }
}

/// Which host application the notices are embedded in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HostFlavor {
    #[default]
    Domains,
    Servers,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhatsNewConfig {
    /// Root of the `<module>/<version>/<id>` feature store.
    pub features_dir: PathBuf,
    /// Extra locations searched for host product features.
    pub host_search_dirs: Vec<PathBuf>,
    pub ledger: LedgerBackend,
    /// Defaults to the platform data directory.
    pub ledger_dir: Option<PathBuf>,
    /// Comma-separated roles allowed to see notices.
    pub allowed_roles: String,
    pub host_version: Version,
    pub ladder: Ladder,
    pub modules: Vec<ModuleEntry>,
    pub flavor: HostFlavor,
    /// Domains per viewer, for the domain-hosting flavour.
    pub domains: BTreeMap<String, Vec<HostedDomain>>,
    /// Multi-server directory, for the server-manager flavour.
    pub servers: Vec<ManagedServer>,
}

impl Default for WhatsNewConfig {
    fn default() -> Self {
        Self {
            features_dir: PathBuf::from("/usr/share/whatsnew/features"),
            host_search_dirs: Vec::new(),
            ledger: LedgerBackend::File,
            ledger_dir: None,
            allowed_roles: "master,reseller,owner".to_string(),
            host_version: Version::ZERO,
            ladder: Ladder::default(),
            modules: Vec::new(),
            flavor: HostFlavor::Domains,
            domains: BTreeMap::new(),
            servers: Vec::new(),
        }
    }
}

impl WhatsNewConfig {
    /// Load configuration from the user's config directory, then apply
    /// environment overrides. Returns defaults if the file doesn't exist or
    /// fails to parse.
    pub fn load() -> Self {
        let config = match get_config_path().and_then(|p| Self::load_from(&p)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.with_env_overrides()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var("WHATSNEW_FEATURES_DIR") {
            self.features_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("WHATSNEW_LEDGER_DIR") {
            self.ledger_dir = Some(PathBuf::from(dir));
        }
        if let Ok(backend) = std::env::var("WHATSNEW_LEDGER") {
            match LedgerBackend::from_str(&backend) {
                Some(b) => self.ledger = b,
                None => tracing::warn!("Ignoring unknown WHATSNEW_LEDGER={}", backend),
            }
        }
        if let Ok(roles) = std::env::var("WHATSNEW_ALLOWED_ROLES") {
            self.allowed_roles = roles;
        }
        if let Ok(version) = std::env::var("WHATSNEW_HOST_VERSION") {
            match version.parse() {
                Ok(v) => self.host_version = v,
                Err(e) => tracing::warn!("Ignoring WHATSNEW_HOST_VERSION: {}", e),
            }
        }
        self
    }

    pub fn allowed_roles(&self) -> Vec<Role> {
        Role::parse_list(&self.allowed_roles)
    }

    pub fn ledger_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.ledger_dir {
            return Ok(dir.clone());
        }
        let dirs = directories::ProjectDirs::from("", "", APP_NAME)
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(dirs.data_dir().join("acknowledgements"))
    }

    pub fn registry(&self) -> StaticRegistry {
        StaticRegistry::new(self.modules.clone())
    }

    pub fn feature_store(&self) -> FeatureStore {
        FeatureStore::new(&self.features_dir, self.ladder.host_module.clone())
            .with_host_search_dirs(self.host_search_dirs.clone())
    }

    pub fn ack_store(&self) -> Result<Box<dyn AckStore + Send + Sync>> {
        let dir = self.ledger_dir()?;
        Ok(match self.ledger {
            LedgerBackend::File => Box::new(FileAckStore::new(dir)),
            LedgerBackend::Sqlite => {
                let store = SqliteAckStore::open(dir.join("ledger.db"))?;
                store.migrate()?;
                Box::new(store)
            }
        })
    }

    pub fn notifier(&self) -> Result<Notifier<FeatureStore, Box<dyn AckStore + Send + Sync>>> {
        let ledger = Ledger::new(self.ack_store()?, self.ladder.clone());
        let resolver = Resolver::new(self.feature_store(), ledger);
        Ok(Notifier::new(
            resolver,
            self.allowed_roles(),
            self.host_version,
        ))
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = WhatsNewConfig::load_from(&tmp.path().join("nope.json")).unwrap();
        assert_eq!(config.ledger, LedgerBackend::File);
        assert_eq!(config.allowed_roles(), Role::ALL.to_vec());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "allowed_roles": "master",
                "host_version": "2.105",
                "ledger": "sqlite",
                "modules": [{"name": "virtual-server", "version": "7.2"}],
                "servers": [{"id": "s1", "host": "a.example.net", "kind": "kvm", "status": "virt"}]
            }"#,
        )
        .unwrap();

        let config = WhatsNewConfig::load_from(&path).unwrap();
        assert_eq!(config.allowed_roles(), vec![Role::Master]);
        assert_eq!(config.host_version, "2.105".parse().unwrap());
        assert_eq!(config.ledger, LedgerBackend::Sqlite);
        assert_eq!(config.modules.len(), 1);
        assert_eq!(config.servers.len(), 1);
        assert_eq!(config.ladder, Ladder::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(WhatsNewConfig::load_from(&path).is_err());
    }
}
