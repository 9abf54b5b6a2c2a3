use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use tempfile::NamedTempFile;

use super::{AckRecord, AckStore};
use crate::error::Result;

/// One JSON file per user under a private directory.
///
/// The directory is created (mode 0700) on the first write, never on read.
/// Each write goes to its own temporary sibling which is then renamed into
/// place, so concurrent writers for one user leave one complete record.
#[derive(Debug, Clone)]
pub struct FileAckStore {
    dir: PathBuf,
}

impl FileAckStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, user: &str) -> PathBuf {
        self.dir.join(user)
    }

    fn create_dir(&self) -> Result<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }
        builder.create(&self.dir)?;
        Ok(())
    }
}

impl AckStore for FileAckStore {
    /// An unreadable record counts as empty so the next acknowledgement
    /// rewrites it.
    fn load(&self, user: &str) -> Result<AckRecord> {
        let path = self.record_path(user);
        match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(record) => Ok(record),
                Err(e) => {
                    tracing::warn!("Ignoring corrupt acknowledgement record {}: {}", path.display(), e);
                    Ok(AckRecord::new())
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(AckRecord::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, user: &str, record: &AckRecord) -> Result<()> {
        if !self.dir.exists() {
            self.create_dir()?;
            tracing::debug!("Created acknowledgement directory {}", self.dir.display());
        }

        let content = serde_json::to_string_pretty(record)?;

        // Temp names start with a dot, which no valid user name does
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;

        tmp.persist(self.record_path(user)).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Version;
    use tempfile::TempDir;

    #[test]
    fn test_load_does_not_create_directory() {
        let tmp = TempDir::new().unwrap();
        let store = FileAckStore::new(tmp.path().join("acks"));
        assert!(store.load("admin").unwrap().is_empty());
        assert!(!tmp.path().join("acks").exists());
    }

    #[test]
    fn test_corrupt_record_loads_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("admin"), "{\"virtual-server\": \"7.2\"}\n}").unwrap();
        let store = FileAckStore::new(tmp.path());
        assert!(store.load("admin").unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_save_creates_private_directory() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("acks");
        let store = FileAckStore::new(&dir);

        let mut record = AckRecord::new();
        record.insert("virtual-server".to_string(), "7.2".parse::<Version>().unwrap());
        store.save("admin", &record).unwrap();

        let dir_mode = fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode, 0o700);
        let file_mode = fs::metadata(dir.join("admin")).unwrap().permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600);
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 1);
        assert_eq!(store.load("admin").unwrap(), record);
    }
}
