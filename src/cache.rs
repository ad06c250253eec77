//! Process-wide registry of translation dictionaries.
//!
//! Readers take a cheap clone of an immutable snapshot; writers build a new
//! snapshot and swap it in. A writer mutex serializes registrations so two
//! concurrent writers never lose each other's entries, and readers never see
//! an identifier without its dictionary.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

use crate::dictionary::TranslationDictionary;
use crate::error::{Error, Result};
use crate::locale::LocaleId;

/// Global cache instance, created on first use.
static GLOBAL: OnceLock<Arc<LocaleCache>> = OnceLock::new();

/// One registered locale.
#[derive(Debug, Clone)]
pub struct LocaleCacheEntry {
    /// Canonical identifier.
    pub id: LocaleId,
    /// The locale's strings.
    pub dictionary: Arc<TranslationDictionary>,
    /// Whether this is the default locale.
    pub is_default: bool,
}

#[derive(Debug, Default)]
struct Snapshot {
    entries: Vec<LocaleCacheEntry>,
    index: HashMap<LocaleId, usize>,
}

impl Snapshot {
    fn get(&self, id: &LocaleId) -> Option<&LocaleCacheEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    fn default_entry(&self) -> Option<&LocaleCacheEntry> {
        self.entries.iter().find(|entry| entry.is_default)
    }

    /// A copy of this snapshot with `id` inserted or replaced.
    fn with_entry(&self, id: LocaleId, dictionary: Arc<TranslationDictionary>, is_default: bool) -> Self {
        let mut entries = self.entries.clone();
        let mut index = self.index.clone();
        // The very first registration becomes the default.
        let is_default = is_default || entries.iter().all(|entry| !entry.is_default);

        if is_default {
            for entry in &mut entries {
                entry.is_default = false;
            }
        }

        match index.get(&id) {
            Some(&i) => {
                // A replaced entry keeps its default flag unless another took it.
                let keep_default = entries[i].is_default;
                entries[i] = LocaleCacheEntry { id, dictionary, is_default: is_default || keep_default };
            }
            None => {
                index.insert(id.clone(), entries.len());
                entries.push(LocaleCacheEntry { id, dictionary, is_default });
            }
        }

        Self { entries, index }
    }
}

/// Registry mapping locale identifiers to dictionaries.
#[derive(Debug, Default)]
pub struct LocaleCache {
    snapshot: RwLock<Arc<Snapshot>>,
    writer: Mutex<()>,
}

impl LocaleCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache shared by engines that are not given their own.
    pub fn global() -> Arc<Self> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::new())))
    }

    fn load(&self) -> Arc<Snapshot> {
        // Snapshots are swapped whole, so a poisoned lock still guards a
        // complete value.
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn store(&self, snapshot: Snapshot) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
    }

    /// Insert or replace the dictionary for `id`.
    ///
    /// When `is_default` is set the previous default is unmarked. The first
    /// registration becomes the default regardless of the flag.
    pub fn register(&self, id: LocaleId, dictionary: TranslationDictionary, is_default: bool) {
        self.register_shared(id, Arc::new(dictionary), is_default);
    }

    /// Like [`register`](Self::register) for an already shared dictionary.
    pub fn register_shared(&self, id: LocaleId, dictionary: Arc<TranslationDictionary>, is_default: bool) {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.load();
        tracing::debug!(locale = %id, keys = dictionary.len(), is_default, "Registering locale");
        self.store(current.with_entry(id, dictionary, is_default));
    }

    /// Return the dictionary for `id`, registering the one produced by
    /// `make` if `id` is not present yet.
    ///
    /// The check and the insert happen under the writer lock, so concurrent
    /// callers for the same locale register it once.
    pub fn get_or_register<F>(&self, id: &LocaleId, make: F) -> Arc<TranslationDictionary>
    where
        F: FnOnce() -> TranslationDictionary,
    {
        if let Some(dictionary) = self.get(id) {
            return dictionary;
        }

        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.load();
        if let Some(entry) = current.get(id) {
            return Arc::clone(&entry.dictionary);
        }

        let dictionary = Arc::new(make());
        tracing::debug!(locale = %id, keys = dictionary.len(), "Lazily registering locale");
        self.store(current.with_entry(id.clone(), Arc::clone(&dictionary), false));
        dictionary
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &LocaleId) -> bool {
        self.load().index.contains_key(id)
    }

    /// The dictionary registered for `id`.
    pub fn get(&self, id: &LocaleId) -> Option<Arc<TranslationDictionary>> {
        self.load().get(id).map(|entry| Arc::clone(&entry.dictionary))
    }

    /// The full entry registered for `id`.
    pub fn entry(&self, id: &LocaleId) -> Option<LocaleCacheEntry> {
        self.load().get(id).cloned()
    }

    /// Registered identifiers in registration order.
    pub fn list_supported(&self) -> Vec<LocaleId> {
        self.load().entries.iter().map(|entry| entry.id.clone()).collect()
    }

    /// The default locale.
    ///
    /// Fails with [`Error::NoDefaultLocale`] only when nothing was ever
    /// registered, which is a setup error.
    pub fn default_identifier(&self) -> Result<LocaleId> {
        self.load().default_entry().map(|entry| entry.id.clone()).ok_or(Error::NoDefaultLocale)
    }

    /// The dictionary of the default locale, if any locale is registered.
    pub fn default_dictionary(&self) -> Option<Arc<TranslationDictionary>> {
        self.load().default_entry().map(|entry| Arc::clone(&entry.dictionary))
    }

    /// Number of registered locales.
    pub fn len(&self) -> usize {
        self.load().entries.len()
    }

    /// Whether no locale has been registered.
    pub fn is_empty(&self) -> bool {
        self.load().entries.is_empty()
    }
}
