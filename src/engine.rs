//! The engine: shared state behind every session.
//!
//! A [`LocaleEngine`] ties together the locale cache, the embedded tables,
//! the system locale accessor and the configuration. It is cheap to clone and
//! hands out one [`Session`] per visitor.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use bon::bon;

use crate::cache::LocaleCache;
use crate::config::Config;
use crate::dictionary::TranslationDictionary;
use crate::embedded::{BuiltinLocales, EmbeddedLocaleProvider};
use crate::error::{Error, Result};
use crate::locale::{HostLocale, LocaleId, Normalizer, SystemLocale};
use crate::negotiate::{NegotiationContext, Negotiator, RequestContext};
use crate::persistence::PersistenceAdapter;
use crate::session::{ActiveLocale, Session};

/// Shared localization state.
#[derive(Clone)]
pub struct LocaleEngine {
    cache: Arc<LocaleCache>,
    embedded: Arc<dyn EmbeddedLocaleProvider>,
    system: Arc<dyn SystemLocale>,
    normalizer: Arc<Normalizer>,
    persistence_key: Arc<str>,
}

#[bon]
impl LocaleEngine {
    /// Build an engine.
    ///
    /// Defaults: the process-wide [`LocaleCache::global`], the crate's
    /// [`BuiltinLocales`], the [`HostLocale`] and [`Config::default`].
    ///
    /// Tables from `config.locales_dir` are registered first. If the
    /// configured default locale is still unregistered afterwards, its
    /// embedded table is registered as the default.
    #[builder]
    pub fn new(
        cache: Option<Arc<LocaleCache>>,
        embedded: Option<Arc<dyn EmbeddedLocaleProvider>>,
        system: Option<Arc<dyn SystemLocale>>,
        #[builder(default)] config: Config,
    ) -> Result<Self> {
        config.validate()?;

        let cache = cache.unwrap_or_else(LocaleCache::global);
        let embedded: Arc<dyn EmbeddedLocaleProvider> = match embedded {
            Some(embedded) => embedded,
            None => Arc::new(BuiltinLocales::new()?),
        };
        let system: Arc<dyn SystemLocale> = match system {
            Some(system) => system,
            None => Arc::new(HostLocale),
        };

        let engine = Self {
            cache,
            embedded,
            system,
            normalizer: Arc::new(config.normalizer()),
            persistence_key: Arc::from(config.persistence_key.as_str()),
        };

        let default = config.default_locale_id()?;
        if let Some(dir) = &config.locales_dir {
            engine.register_dir(dir, &default)?;
        }
        engine.seed_default(&default);

        Ok(engine)
    }
}

impl LocaleEngine {
    /// Register every `<locale>.json` table in `dir`, in file name order.
    fn register_dir(&self, dir: &Path, default: &LocaleId) -> Result<()> {
        let mut paths = std::fs::read_dir(dir)
            .map_err(|e| Error::config(format!("Failed to read locales dir {}: {}", dir.display(), e)))?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect::<Vec<_>>();
        paths.sort();

        for path in paths {
            let Some(id) = path.file_stem().and_then(|stem| stem.to_str()).and_then(|stem| self.normalizer.parse(stem))
            else {
                tracing::warn!(path = %path.display(), "Skipping translation file with no locale name");
                continue;
            };

            let dictionary = TranslationDictionary::from_json_file(&path)?;
            let is_default = &id == default;
            tracing::info!(locale = %id, path = %path.display(), "Loaded translation table");
            self.cache.register(id, dictionary, is_default);
        }

        Ok(())
    }

    fn seed_default(&self, default: &LocaleId) {
        if self.cache.contains(default) {
            return;
        }
        match self.embedded.dictionary(default) {
            Some(dictionary) => self.cache.register(default.clone(), dictionary, true),
            None => tracing::debug!(locale = %default, "No embedded table for default locale"),
        }
    }

    /// The locale cache.
    pub fn cache(&self) -> &Arc<LocaleCache> {
        &self.cache
    }

    /// The normalizer used for every raw locale string.
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Key the locale choice is persisted under.
    pub fn persistence_key(&self) -> &str {
        &self.persistence_key
    }

    /// Register a translation table.
    pub fn add_locale(&self, id: LocaleId, dictionary: TranslationDictionary, is_default: bool) {
        self.cache.register(id, dictionary, is_default);
    }

    /// Registered locales in registration order.
    pub fn supported_locales(&self) -> Vec<LocaleId> {
        self.cache.list_supported()
    }

    /// Normalize `raw`, falling back to the system locale and the default.
    pub fn normalize(&self, raw: &str) -> Result<LocaleId> {
        let system = self.system.system_locale();
        self.normalizer.normalize(raw, system.as_deref(), || self.cache.default_identifier())
    }

    /// The dictionary for `id`.
    ///
    /// A registered locale uses its own table. A locale the embedded provider
    /// holds is registered on first use. Anything else borrows a registered
    /// table without being registered: one of the same language if there is
    /// one, else the default's.
    pub(crate) fn dictionary_for(&self, id: &LocaleId) -> Arc<TranslationDictionary> {
        if let Some(dictionary) = self.cache.get(id) {
            return dictionary;
        }

        if self.embedded.has_locale(id) {
            return self.cache.get_or_register(id, || self.embedded.dictionary(id).unwrap_or_default());
        }

        if let Some(sibling) = self.same_language(id) {
            tracing::debug!(locale = %id, using = %sibling, "No table for locale, using same language");
            return self.dictionary_for(&sibling);
        }

        tracing::debug!(locale = %id, "No table for locale, using default table");
        self.cache.default_dictionary().unwrap_or_else(|| Arc::new(TranslationDictionary::new()))
    }

    /// A registered or embedded locale sharing `id`'s language.
    fn same_language(&self, id: &LocaleId) -> Option<LocaleId> {
        self.cache
            .list_supported()
            .into_iter()
            .chain(self.embedded.locales().into_iter().filter(|locale| self.embedded.has_locale(locale)))
            .find(|locale| locale != id && locale.language().eq_ignore_ascii_case(id.language()))
    }

    /// Negotiate a locale and open a session.
    ///
    /// With a `request`, its persisted value and `Accept-Language` header are
    /// the inputs. Without one, the persisted value is read through
    /// `persistence`; a failed read counts as no value.
    pub async fn session(
        &self,
        request: Option<&RequestContext>,
        persistence: Arc<dyn PersistenceAdapter>,
    ) -> Result<Session> {
        let persisted = match request {
            Some(request) => request.persisted_value.clone(),
            None => match persistence.read(&self.persistence_key).await {
                Ok(value) => value,
                Err(err) => {
                    tracing::warn!(error = %err, "Failed to read persisted locale");
                    None
                }
            },
        };
        let system = self.system.system_locale();

        let context = NegotiationContext {
            persisted: persisted.as_deref(),
            accept_language: request.and_then(|request| request.accept_language.as_deref()),
            system_locale: system.as_deref(),
        };
        let negotiated = Negotiator::new(&self.cache, &self.normalizer).negotiate(&context)?;

        let dictionary = self.dictionary_for(&negotiated.locale);
        let active = ActiveLocale { id: negotiated.locale, dictionary };
        Ok(Session::new(self.clone(), persistence, active, negotiated.source))
    }
}

impl fmt::Debug for LocaleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocaleEngine")
            .field("supported", &self.cache.list_supported())
            .field("persistence_key", &self.persistence_key)
            .finish_non_exhaustive()
    }
}
