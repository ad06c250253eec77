//! Persistence of a session's locale choice.
//!
//! The engine stores a single opaque string (the canonical locale) under a
//! fixed key. How it travels (cookie, local storage, a file) is up to the
//! adapter. Adapter failures are never fatal: callers log them and carry on
//! with the in-memory state.

mod file;

pub use file::FileStore;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::Result;

/// Key under which the locale choice is stored unless configured otherwise.
pub const DEFAULT_PERSISTENCE_KEY: &str = "Lingua_I18nConfig_Culture";

/// Reads and writes a persisted string value.
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    /// Read the value stored under `key`.
    async fn read(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`.
    async fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process store, one per session or shared between sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `key = value`.
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        store.insert(key.into(), value.into());
        store
    }

    fn insert(&self, key: String, value: String) {
        self.values.lock().unwrap_or_else(PoisonError::into_inner).insert(key, value);
    }

    /// Synchronous read, for inspection.
    pub fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }
}

#[async_trait]
impl PersistenceAdapter for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        self.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
