//! Directory-per-version feature store.
//!
//! Layout: `<root>/<module>/<version>/<id>`, one JSON entry per feature. The
//! host product may also publish features under any number of extra search
//! directories laid out as `<dir>/<version>/<id>`.
//!
//! ```json
//! {
//!   "short": "Let's Encrypt DNS validation",
//!   "long": "<p>Certificates can now be requested ...</p>",
//!   "roles": ["master", "reseller"],
//!   "min_host_version": "2.105",
//!   "link": "edit_newssl.cgi?dom=$ID",
//!   "manager": "kvm"
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;
use crate::models::*;

/// Source of feature descriptors for a single module release.
pub trait FeatureSource {
    /// All descriptors for exactly this (module, version), newest first.
    /// An empty list means no features were published for it.
    fn list_features(&self, module: &str, version: Version) -> Result<Vec<FeatureDescriptor>>;
}

/// On-disk shape of a feature entry.
#[derive(Debug, Deserialize)]
struct FeatureEntry {
    #[serde(alias = "desc")]
    short: String,
    #[serde(default, alias = "html")]
    long: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
    #[serde(default)]
    min_host_version: Option<Version>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    manager: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FeatureStore {
    root: PathBuf,
    host_module: String,
    host_search_dirs: Vec<PathBuf>,
}

impl FeatureStore {
    pub fn new(root: impl Into<PathBuf>, host_module: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            host_module: host_module.into(),
            host_search_dirs: Vec::new(),
        }
    }

    pub fn with_host_search_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.host_search_dirs = dirs;
        self
    }

    /// Directories that may hold entries for this release, in search order.
    fn locations(&self, module: &str, version: Version) -> Vec<PathBuf> {
        let version_dir = version.to_string();
        let mut dirs = vec![self.root.join(module).join(&version_dir)];
        if module == self.host_module {
            dirs.extend(self.host_search_dirs.iter().map(|d| d.join(&version_dir)));
        }
        dirs
    }
}

impl FeatureSource for FeatureStore {
    fn list_features(&self, module: &str, version: Version) -> Result<Vec<FeatureDescriptor>> {
        let mut seen = HashSet::new();
        let mut features = Vec::new();

        for dir in self.locations(module, version) {
            for (id, path) in list_entries(&dir)? {
                if !seen.insert(id.clone()) {
                    tracing::debug!("Skipping duplicate feature {} in {}", id, dir.display());
                    continue;
                }
                match read_entry(&path) {
                    Ok(entry) => features.push(descriptor(id, module, version, entry)),
                    Err(e) => {
                        tracing::warn!("Skipping malformed feature entry {}: {}", path.display(), e)
                    }
                }
            }
        }

        // Stable sort keeps discovery order for equal keys.
        features.sort_by(|a, b| b.sort_key().total_cmp(&a.sort_key()));
        tracing::debug!(
            "Found {} features for {} {}",
            features.len(),
            module,
            version
        );
        Ok(features)
    }
}

/// Visible entries of a directory as `(id, path)`, sorted by file name.
/// A missing directory has no entries.
fn list_entries(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let read = match fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut entries = Vec::new();
    for entry in read {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || !entry.path().is_file() {
            continue;
        }
        let id = name.strip_suffix(".json").unwrap_or(&name).to_string();
        entries.push((id, entry.path()));
    }
    entries.sort_by(|a, b| a.1.file_name().cmp(&b.1.file_name()));
    Ok(entries)
}

fn read_entry(path: &Path) -> Result<FeatureEntry> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn descriptor(id: String, module: &str, version: Version, entry: FeatureEntry) -> FeatureDescriptor {
    FeatureDescriptor {
        id,
        module: module.to_string(),
        version,
        short_description: entry.short,
        long_description: entry.long,
        visibility: entry.roles.iter().filter_map(|r| Role::from_str(r)).collect(),
        min_host_version: entry.min_host_version,
        link_template: entry.link.filter(|l| !l.is_empty()),
        manager_scope: entry.manager.filter(|m| !m.is_empty()),
    }
}
