//! Browser-storage-shaped persistence layer for the training desktop.
//!
//! Progress state lives in two key/value scopes with different lifetimes: a
//! profile store that survives reloads (the localStorage analog) and a
//! session store that does not (the sessionStorage analog). Both are fronted
//! by the same synchronous [`KeyValueStore`] trait; the runtime is strictly
//! single-threaded and every write completes before control returns to the
//! event loop.
//!
//! # Example
//!
//! ```rust
//! use platform_storage::{load_typed, save_typed, MemoryStore};
//!
//! let store = MemoryStore::default();
//! save_typed(&store, "counter", &3_u32).expect("serialize");
//! assert_eq!(load_typed::<u32>(&store, "counter"), Some(3));
//! ```

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Errors surfaced by storage writes.
///
/// A failed write is fatal to that operation only; callers log it and keep
/// their in-memory state intact.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The value could not be serialized to JSON.
    #[error("failed to serialize value for key `{key}`: {source}")]
    Serialize {
        /// Key the write targeted.
        key: String,
        /// Underlying serializer error.
        #[source]
        source: serde_json::Error,
    },
    /// The backing store rejected the write.
    #[error("storage backend rejected write for key `{key}`: {reason}")]
    Backend {
        /// Key the write targeted.
        key: String,
        /// Backend-reported reason.
        reason: String,
    },
}

/// Synchronous key/value store holding raw JSON strings per key.
pub trait KeyValueStore {
    /// Reads the raw JSON string for `key`, if present.
    fn get_raw(&self, key: &str) -> Option<String>;

    /// Writes the raw JSON string for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] when the backing store rejects the
    /// write.
    fn set_raw(&self, key: &str, raw_json: &str) -> Result<(), StorageError>;

    /// Removes `key` if present.
    fn remove(&self, key: &str);

    /// Erases every key in this store.
    fn clear(&self);
}

/// In-memory store keyed by string.
///
/// Clones share the same backing map, matching how every collaborator in a
/// single-threaded session sees one localStorage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Returns `true` when no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.inner.borrow().get(key).cloned()
    }

    fn set_raw(&self, key: &str, raw_json: &str) -> Result<(), StorageError> {
        self.inner
            .borrow_mut()
            .insert(key.to_string(), raw_json.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.inner.borrow_mut().remove(key);
    }

    fn clear(&self) {
        self.inner.borrow_mut().clear();
    }
}

/// No-op store for unsupported targets and baseline tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

impl KeyValueStore for NoopStore {
    fn get_raw(&self, _key: &str) -> Option<String> {
        None
    }

    fn set_raw(&self, _key: &str, _raw_json: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn remove(&self, _key: &str) {}

    fn clear(&self) {}
}

/// Loads and deserializes a typed value.
///
/// Returns `None` when the key is absent or the stored value fails to
/// parse; malformed persisted data must never escalate past this boundary.
pub fn load_typed<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get_raw(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("discarding malformed persisted value for `{key}`: {err}");
            None
        }
    }
}

/// Serializes and saves a typed value.
///
/// # Errors
///
/// Returns [`StorageError::Serialize`] when the value cannot be serialized
/// and [`StorageError::Backend`] when the store rejects the write.
pub fn save_typed<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.set_raw(key, &raw)
}

/// The profile/session store pair a workstation session runs against.
#[derive(Clone)]
pub struct StorageScopes {
    /// Cross-reload profile store.
    pub profile: Rc<dyn KeyValueStore>,
    /// Per-session volatile store.
    pub session: Rc<dyn KeyValueStore>,
}

impl StorageScopes {
    /// Builds a scope pair over explicit stores.
    pub fn new(profile: Rc<dyn KeyValueStore>, session: Rc<dyn KeyValueStore>) -> Self {
        Self { profile, session }
    }

    /// Builds an in-memory scope pair (tests and headless sessions).
    pub fn in_memory() -> Self {
        Self {
            profile: Rc::new(MemoryStore::default()),
            session: Rc::new(MemoryStore::default()),
        }
    }

    /// Erases both scopes entirely. Sole mechanism behind the system-wide
    /// reset feature.
    pub fn clear_all(&self) {
        self.profile.clear();
        self.session.clear();
    }
}

impl std::fmt::Debug for StorageScopes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageScopes").finish_non_exhaustive()
    }
}
