//! Key/value persistence
//!
//! The game only stores a handful of string values. Backends:
//! - `MemoryStore`: in-process map (native builds, tests)
//! - `LocalStore`: browser LocalStorage (wasm32)

use std::collections::HashMap;

use thiserror::Error;

#[cfg(target_arch = "wasm32")]
mod local;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStore;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage backend unavailable")]
    Unavailable,
    #[error("Storage rejected write to '{key}': {reason}")]
    WriteFailed { key: String, reason: String },
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// String-keyed string storage
pub trait KeyValueStore {
    /// `None` when the key is absent or the backend cannot be read
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Storage kept in memory for the lifetime of the process
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Store that reads fine but refuses every write
    #[derive(Debug, Default)]
    pub struct ReadOnlyStore {
        pub inner: MemoryStore,
    }

    impl KeyValueStore for ReadOnlyStore {
        fn get_item(&self, key: &str) -> Option<String> {
            self.inner.get_item(key)
        }

        fn set_item(&mut self, key: &str, _value: &str) -> Result<()> {
            Err(StorageError::WriteFailed {
                key: key.to_string(),
                reason: "read-only".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert!(store.get_item("missing").is_none());
        store.set_item("INSQ-highScore", "120").unwrap();
        assert_eq!(store.get_item("INSQ-highScore").as_deref(), Some("120"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_storage_error_messages() {
        let err = StorageError::WriteFailed {
            key: "k".to_string(),
            reason: "quota".to_string(),
        };
        assert_eq!(err.to_string(), "Storage rejected write to 'k': quota");
    }
}
