//! Key/value persistence for panel preferences.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod localstorage;

pub use memory::MemoryPrefs;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FilePrefs;

#[cfg(target_arch = "wasm32")]
pub use localstorage::LocalStoragePrefs;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Key not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// String key/value store, modelled on browser `localStorage`.
///
/// Operations are synchronous. On native platforms implementations must be
/// Send + Sync; on WASM these bounds are relaxed.
#[cfg(not(target_arch = "wasm32"))]
pub trait PrefsStorage: Send + Sync {
    /// Read a value. A missing key is `Ok(None)`.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// String key/value store (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait PrefsStorage {
    /// Read a value. A missing key is `Ok(None)`.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Read and deserialize a JSON value.
pub fn load_json<T, S>(storage: &S, key: &str) -> StorageResult<T>
where
    T: DeserializeOwned,
    S: PrefsStorage + ?Sized,
{
    let raw = storage
        .get(key)?
        .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
    serde_json::from_str(&raw)
        .map_err(|e| StorageError::Serialization(format!("Failed to parse {}: {}", key, e)))
}

/// Serialize and write a JSON value.
pub fn save_json<T, S>(storage: &S, key: &str, value: &T) -> StorageResult<()>
where
    T: Serialize,
    S: PrefsStorage + ?Sized,
{
    let json = serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
    storage.set(key, &json)
}
