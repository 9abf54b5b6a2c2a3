//! Per-user acknowledgement ledger.
//!
//! Each user has one record mapping module identity to the newest version
//! whose features they have acknowledged. Modules missing from the record
//! count as never acknowledged (version 0). Records are created lazily on
//! first write and always rewritten whole; two concurrent writers for the
//! same user race and the last one wins.

mod file;
mod sqlite;

pub use file::FileAckStore;
pub use sqlite::SqliteAckStore;

use std::collections::BTreeMap;

use crate::error::{Result, WhatsNewError};
use crate::ladder::Ladder;
use crate::models::{ModuleVersionInfo, Version};

/// Module identity → last acknowledged version.
pub type AckRecord = BTreeMap<String, Version>;

/// Durable storage for per-user acknowledgement records.
pub trait AckStore {
    /// The user's record, empty if none has been written yet.
    fn load(&self, user: &str) -> Result<AckRecord>;

    /// Replace the user's record.
    fn save(&self, user: &str, record: &AckRecord) -> Result<()>;
}

impl<S: AckStore + ?Sized> AckStore for Box<S> {
    fn load(&self, user: &str) -> Result<AckRecord> {
        (**self).load(user)
    }

    fn save(&self, user: &str, record: &AckRecord) -> Result<()> {
        (**self).save(user, record)
    }
}

/// User names double as record keys (and file names), so they must be
/// plain, non-empty tokens.
pub fn validate_user(user: &str) -> Result<()> {
    let bad = user.is_empty()
        || user.starts_with('.')
        || user.contains(['/', '\\', '\0']);
    if bad {
        Err(WhatsNewError::InvalidUser(user.to_string()))
    } else {
        Ok(())
    }
}

pub struct Ledger<S> {
    store: S,
    ladder: Ladder,
}

impl<S: AckStore> Ledger<S> {
    pub fn new(store: S, ladder: Ladder) -> Self {
        Self { store, ladder }
    }

    pub fn ladder(&self) -> &Ladder {
        &self.ladder
    }

    pub fn get_acknowledged(&self, user: &str) -> Result<AckRecord> {
        validate_user(user)?;
        self.store.load(user)
    }

    pub fn acknowledged_version(&self, user: &str, module: &str) -> Result<Version> {
        Ok(self
            .get_acknowledged(user)?
            .get(module)
            .copied()
            .unwrap_or(Version::ZERO))
    }

    /// Record that `user` has seen `module`'s features up to `version`.
    pub fn acknowledge(&self, user: &str, module: &str, version: Version) -> Result<()> {
        let mut record = self.get_acknowledged(user)?;
        record.insert(module.to_string(), version);
        self.store.save(user, &record)?;
        tracing::info!("User {} acknowledged {} {}", user, module, version);
        Ok(())
    }

    /// Acknowledge every module at its current version ("mark all as seen").
    pub fn acknowledge_all(&self, user: &str, modules: &[ModuleVersionInfo]) -> Result<()> {
        let mut record = self.get_acknowledged(user)?;
        for module in modules {
            record.insert(module.name.clone(), module.version);
        }
        self.store.save(user, &record)?;
        tracing::info!("User {} acknowledged {} modules", user, modules.len());
        Ok(())
    }

    /// Step the acknowledged version of `module` back one release so its
    /// newest features show again. Returns the new acknowledged version.
    /// A module that was never acknowledged is left untouched.
    pub fn unacknowledge(&self, user: &str, module: &str) -> Result<Version> {
        let mut record = self.get_acknowledged(user)?;
        let current = record.get(module).copied().unwrap_or(Version::ZERO);
        if !current.is_positive() {
            return Ok(Version::ZERO);
        }

        let previous = self.ladder.previous_version(current, module)?.max(Version::ZERO);
        record.insert(module.to_string(), previous);
        self.store.save(user, &record)?;
        tracing::info!(
            "User {} rolled {} back from {} to {}",
            user,
            module,
            current,
            previous
        );
        Ok(previous)
    }
}
