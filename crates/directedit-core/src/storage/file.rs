//! File-based preferences storage for native platforms.

use super::{PrefsStorage, StorageError, StorageResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Stores each key as a file in a directory.
pub struct FilePrefs {
    base_path: PathBuf,
}

impl FilePrefs {
    /// Create storage rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Storage in the platform config directory.
    ///
    /// On Unix: `~/.config/direct-edit/`
    /// On Windows: `%APPDATA%\direct-edit\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("direct-edit"))
    }

    fn key_path(&self, key: &str) -> PathBuf {
        let safe_key: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_key))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl PrefsStorage for FilePrefs {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.key_path(key);
        fs::write(&path, value)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_prefs_roundtrip() {
        let dir = TempDir::new().unwrap();
        let storage = FilePrefs::new(dir.path().to_path_buf()).unwrap();

        storage.set("direct-edit-sections", r#"{"spacing":false}"#).unwrap();
        assert_eq!(
            storage.get("direct-edit-sections").unwrap().as_deref(),
            Some(r#"{"spacing":false}"#)
        );

        storage.remove("direct-edit-sections").unwrap();
        assert_eq!(storage.get("direct-edit-sections").unwrap(), None);
        // Removing again is fine.
        storage.remove("direct-edit-sections").unwrap();
    }

    #[test]
    fn test_key_sanitizing() {
        let dir = TempDir::new().unwrap();
        let storage = FilePrefs::new(dir.path().join("nested")).unwrap();
        storage.set("../escape/attempt", "1").unwrap();

        assert!(dir.path().join("nested").join("___escape_attempt.json").exists());
        assert_eq!(storage.get("../escape/attempt").unwrap().as_deref(), Some("1"));
    }
}
