//! Per-visitor localization state.
//!
//! A [`Session`] holds the active locale and its dictionary behind a single
//! pointer, so a lookup always sees the identifier and the table it belongs
//! to. Switching locale swaps that pointer once the new table is ready.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;

use crate::dictionary::TranslationDictionary;
use crate::engine::LocaleEngine;
use crate::error::Result;
use crate::format::FormatArg;
use crate::locale::LocaleId;
use crate::negotiate::LocaleSource;
use crate::persistence::PersistenceAdapter;
use crate::resolve::{Lookup, resolve};

/// The active locale together with its dictionary.
#[derive(Debug, Clone)]
pub struct ActiveLocale {
    /// Canonical identifier.
    pub id: LocaleId,
    /// Dictionary lookups for `id` go to.
    pub dictionary: Arc<TranslationDictionary>,
}

/// Localization state for one visitor.
pub struct Session {
    engine: LocaleEngine,
    persistence: Arc<dyn PersistenceAdapter>,
    state: RwLock<Arc<ActiveLocale>>,
    // Orders concurrent locale switches on this session.
    switching: Mutex<()>,
    source: LocaleSource,
}

impl Session {
    pub(crate) fn new(
        engine: LocaleEngine,
        persistence: Arc<dyn PersistenceAdapter>,
        active: ActiveLocale,
        source: LocaleSource,
    ) -> Self {
        tracing::debug!(locale = %active.id, source = %source, "Session started");
        Self { engine, persistence, state: RwLock::new(Arc::new(active)), switching: Mutex::new(()), source }
    }

    fn snapshot(&self) -> Arc<ActiveLocale> {
        Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// The active locale.
    pub fn active_locale(&self) -> LocaleId {
        self.snapshot().id.clone()
    }

    /// The active locale and its dictionary, read together.
    pub fn active(&self) -> Arc<ActiveLocale> {
        self.snapshot()
    }

    /// The active dictionary.
    pub fn dictionary(&self) -> Arc<TranslationDictionary> {
        Arc::clone(&self.snapshot().dictionary)
    }

    /// Where the initial locale came from.
    pub const fn negotiated_from(&self) -> LocaleSource {
        self.source
    }

    /// Registered locales in registration order.
    pub fn supported_locales(&self) -> Vec<LocaleId> {
        self.engine.supported_locales()
    }

    /// The engine this session belongs to.
    pub const fn engine(&self) -> &LocaleEngine {
        &self.engine
    }

    /// Resolve a lookup against the active dictionary.
    pub fn resolve(&self, lookup: &Lookup<'_>) -> Option<String> {
        let active = self.snapshot();
        resolve(active.dictionary.as_ref(), lookup)
    }

    /// Translate `key`, or return its label if the key is missing.
    ///
    /// These helpers always ask for a label on a miss, so the resolver never
    /// comes back empty for them.
    pub fn t(&self, key: &str) -> String {
        self.resolve(&Lookup::key(key)).unwrap_or_default()
    }

    /// Translate `key` and fill its placeholders from `args`.
    pub fn t_with(&self, key: &str, args: &[FormatArg]) -> String {
        let lookup = Lookup::builder().key(key).args(args.to_vec()).build();
        self.resolve(&lookup).unwrap_or_default()
    }

    /// Translate `key` within `scope`.
    pub fn t_scoped(&self, scope: &str, key: &str) -> String {
        let lookup = Lookup::builder().key(key).scope(scope).build();
        self.resolve(&lookup).unwrap_or_default()
    }

    /// Switch the active locale.
    ///
    /// `raw` is normalized with the usual fallbacks, the choice is persisted
    /// (a failed write is logged and otherwise ignored), and the locale's
    /// table is looked up, registering an embedded one on first use. A locale
    /// with no table of its own borrows one without being registered.
    /// Lookups running meanwhile keep seeing the previous locale until the
    /// swap.
    pub async fn set_locale(&self, raw: &str) -> Result<LocaleId> {
        let _guard = self.switching.lock().await;

        let id = self.engine.normalize(raw)?;

        if let Err(err) = self.persistence.write(self.engine.persistence_key(), id.as_str()).await {
            tracing::warn!(locale = %id, error = %err, "Failed to persist locale choice");
        }

        let dictionary = self.engine.dictionary_for(&id);
        let next = Arc::new(ActiveLocale { id: id.clone(), dictionary });
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next;

        tracing::info!(locale = %id, "Locale changed");
        Ok(id)
    }

    /// Register a translation table with the engine.
    pub fn add_locale(&self, id: LocaleId, dictionary: TranslationDictionary, is_default: bool) {
        self.engine.add_locale(id, dictionary, is_default);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("active", &self.snapshot().id)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
