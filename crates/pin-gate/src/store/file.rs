//! File-backed secret store
//!
//! Keeps the PIN record as JSON in a single file readable only by the
//! owner. Writes go to a temp file first and are renamed into place.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{SecretKey, SecretStore, StoreError, StoreResult};
use crate::pin::Pin;

/// Current on-disk record version
const RECORD_VERSION: u32 = 1;

/// Record format (persisted to disk)
#[derive(Serialize, Deserialize)]
struct SecretRecord {
    /// Version for future migrations
    version: u32,
    service: String,
    account: String,
    secret: Zeroizing<String>,
}

/// Secret store persisting the PIN to a file
pub struct FileSecretStore {
    path: PathBuf,
    key: SecretKey,
}

impl FileSecretStore {
    /// Create a store at `path` for the given secret identity
    pub fn new(path: impl Into<PathBuf>, key: SecretKey) -> Self {
        Self {
            path: path.into(),
            key,
        }
    }

    /// Default record location under the platform data directory
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pin-gate")
            .join("secret.json")
    }

    /// Path of the record file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_record(&self) -> StoreResult<Option<SecretRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = Zeroizing::new(fs::read_to_string(&self.path)?);
        let record: SecretRecord = serde_json::from_str(&contents)?;
        Ok(Some(record))
    }

    fn is_own(&self, record: &SecretRecord) -> bool {
        record.service == self.key.service && record.account == self.key.account
    }
}

impl SecretStore for FileSecretStore {
    fn save(&self, secret: &Pin) -> StoreResult<()> {
        // An unreadable record may be replaced; another key's record may not
        if let Ok(Some(existing)) = self.read_record() {
            if !self.is_own(&existing) {
                tracing::warn!("Refusing to overwrite another key's record at {:?}", self.path);
                return Err(StoreError::ForeignRecord {
                    service: existing.service,
                    account: existing.account,
                });
            }
        }

        let record = SecretRecord {
            version: RECORD_VERSION,
            service: self.key.service.clone(),
            account: self.key.account.clone(),
            secret: Zeroizing::new(secret.expose().to_string()),
        };
        let contents = Zeroizing::new(serde_json::to_string_pretty(&record)?);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, contents.as_bytes())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&temp_path, &self.path)?;
        tracing::debug!("Saved secret record to {:?}", self.path);
        Ok(())
    }

    fn load(&self) -> Option<Pin> {
        match self.read_record() {
            Ok(Some(record)) if self.is_own(&record) => Some(Pin::new(record.secret.as_str())),
            Ok(Some(_)) => {
                tracing::warn!("Secret record at {:?} belongs to another key", self.path);
                None
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read secret record: {}", e);
                None
            }
        }
    }

    fn delete(&self) -> StoreResult<()> {
        if let Ok(Some(record)) = self.read_record() {
            if !self.is_own(&record) {
                tracing::debug!("Nothing stored for this key at {:?}", self.path);
                return Ok(());
            }
        }

        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn contains(&self) -> bool {
        match self.read_record() {
            Ok(Some(record)) => self.is_own(&record),
            Ok(None) => false,
            // Present but unreadable still counts
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_load_delete() {
        let temp_dir = tempdir().unwrap();
        let store = FileSecretStore::new(temp_dir.path().join("secret.json"), SecretKey::default());

        assert!(store.load().is_none());

        store.save(&Pin::from("2468")).unwrap();
        assert_eq!(store.load(), Some(Pin::from("2468")));

        store.save(&Pin::from("1357")).unwrap();
        assert_eq!(store.load(), Some(Pin::from("1357")));

        store.delete().unwrap();
        assert!(store.load().is_none());
        assert!(!store.path().exists());

        // Deleting again is not an error
        store.delete().unwrap();
    }

    #[test]
    fn test_creates_parent_directory() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("secret.json");
        let store = FileSecretStore::new(&path, SecretKey::default());

        store.save(&Pin::from("9")).unwrap();
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempdir().unwrap();
        let store = FileSecretStore::new(temp_dir.path().join("secret.json"), SecretKey::default());
        store.save(&Pin::from("1234")).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_corrupt_record_reads_as_absent() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("secret.json");
        fs::write(&path, "not json").unwrap();

        let store = FileSecretStore::new(&path, SecretKey::default());
        assert!(store.load().is_none());
        assert!(store.contains());

        // Deleting clears the damaged record
        store.delete().unwrap();
        assert!(!store.contains());
    }

    #[test]
    fn test_truncated_record_still_counts_as_stored() {
        let temp_dir = tempdir().unwrap();
        let store = FileSecretStore::new(temp_dir.path().join("secret.json"), SecretKey::default());
        store.save(&Pin::from("1234")).unwrap();

        let mut contents = fs::read(store.path()).unwrap();
        contents.truncate(contents.len() - 1);
        fs::write(store.path(), contents).unwrap();

        assert!(store.load().is_none());
        assert!(store.contains());
    }

    #[test]
    fn test_other_key_reads_as_absent() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("secret.json");

        FileSecretStore::new(&path, SecretKey::default())
            .save(&Pin::from("1234"))
            .unwrap();

        let other = SecretKey {
            service: "pin-gate".to_string(),
            account: "someone-else".to_string(),
        };
        assert!(FileSecretStore::new(&path, other).load().is_none());
    }

    #[test]
    fn test_other_key_cannot_delete_or_overwrite() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("secret.json");
        let owner = FileSecretStore::new(&path, SecretKey::default());
        owner.save(&Pin::from("1234")).unwrap();

        let other = FileSecretStore::new(
            &path,
            SecretKey {
                service: "pin-gate".to_string(),
                account: "other".to_string(),
            },
        );
        assert!(!other.contains());

        // Nothing of its own to delete
        other.delete().unwrap();
        assert_eq!(owner.load(), Some(Pin::from("1234")));

        let err = other.save(&Pin::from("0000")).unwrap_err();
        assert!(matches!(
            err,
            StoreError::ForeignRecord { ref account, .. } if account == "pin"
        ));
        assert_eq!(owner.load(), Some(Pin::from("1234")));
    }
}
