use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use rusqlite::Connection;

use super::{AckRecord, AckStore};
use crate::error::{Result, WhatsNewError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS acknowledgements (
    user TEXT NOT NULL,
    module TEXT NOT NULL,
    version TEXT NOT NULL,
    PRIMARY KEY (user, module)
);
";

/// Acknowledgement records kept as rows of a SQLite table, one row per
/// (user, module).
#[derive(Clone)]
pub struct SqliteAckStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAckStore {
    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Ledger path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create the ledger table if it does not exist yet.
    pub fn migrate(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute_batch(SCHEMA)
            .context("Failed to create acknowledgements table")
    }
}

impl AckStore for SqliteAckStore {
    fn load(&self, user: &str) -> Result<AckRecord> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT module, version FROM acknowledgements WHERE user = ? ORDER BY module",
        )?;

        let rows = stmt
            .query_map([user], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut record = AckRecord::new();
        for (module, version) in rows {
            match version.parse() {
                Ok(version) => {
                    record.insert(module, version);
                }
                Err(WhatsNewError::InvalidVersion(v)) => {
                    tracing::warn!("Ignoring unparsable version {:?} for {} / {}", v, user, module)
                }
                Err(e) => return Err(e),
            }
        }
        Ok(record)
    }

    fn save(&self, user: &str, record: &AckRecord) -> Result<()> {
        let mut conn = self.conn.lock().expect("database lock poisoned");

        let tx = conn.transaction()?;
        tx.execute("DELETE FROM acknowledgements WHERE user = ?", [user])?;
        for (module, version) in record {
            tx.execute(
                "INSERT INTO acknowledgements (user, module, version) VALUES (?, ?, ?)",
                (user, module, version.to_string()),
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
