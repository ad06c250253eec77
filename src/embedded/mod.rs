//! Built-in translation tables for the component library.
//!
//! The tables are compiled into the binary and handed to the cache the first
//! time a session asks for a locale nobody registered.

use crate::dictionary::TranslationDictionary;
use crate::error::{Error, Result};
use crate::locale::LocaleId;

/// Locale whose table backs every locale without a closer match.
pub const BASE_LOCALE: &str = "en-US";

/// Embedded locale files.
const EMBEDDED: &[(&str, &str)] = &[
    ("en-US", include_str!("locales/en-US.json")),
    ("zh-CN", include_str!("locales/zh-CN.json")),
    ("fr-FR", include_str!("locales/fr-FR.json")),
];

/// Supplies translation tables on first demand for unregistered locales.
///
/// Only locales for which [`has_locale`](Self::has_locale) holds are ever
/// registered from a provider at runtime, which keeps the cache bounded by
/// the provider's own set.
pub trait EmbeddedLocaleProvider: Send + Sync {
    /// Whether a table exists for exactly `id`.
    fn has_locale(&self, id: &LocaleId) -> bool;

    /// The table to register for `id`, if the provider has anything suitable.
    fn dictionary(&self, id: &LocaleId) -> Option<TranslationDictionary>;

    /// Identifiers the provider holds tables for.
    fn locales(&self) -> Vec<LocaleId>;
}

/// The tables shipped with the crate.
#[derive(Debug, Clone)]
pub struct BuiltinLocales {
    tables: Vec<(LocaleId, TranslationDictionary)>,
}

impl BuiltinLocales {
    /// Parse the embedded tables.
    pub fn new() -> Result<Self> {
        let tables = EMBEDDED
            .iter()
            .map(|(tag, json)| {
                let id = LocaleId::parse(tag)
                    .ok_or_else(|| Error::dictionary(format!("invalid embedded locale '{tag}'")))?;
                let dictionary = TranslationDictionary::from_json_str(json).map_err(|e| {
                    Error::dictionary(format!("embedded locale {tag} is invalid: {e}"))
                })?;
                Ok((id, dictionary))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { tables })
    }

    fn exact(&self, id: &LocaleId) -> Option<&TranslationDictionary> {
        self.tables.iter().find(|(table, _)| table == id).map(|(_, dictionary)| dictionary)
    }

    fn same_language(&self, id: &LocaleId) -> Option<&TranslationDictionary> {
        self.tables
            .iter()
            .find(|(table, _)| table.language().eq_ignore_ascii_case(id.language()))
            .map(|(_, dictionary)| dictionary)
    }

    fn base(&self) -> Option<&TranslationDictionary> {
        LocaleId::parse(BASE_LOCALE).and_then(|base| self.exact(&base))
    }
}

impl EmbeddedLocaleProvider for BuiltinLocales {
    fn has_locale(&self, id: &LocaleId) -> bool {
        self.exact(id).is_some()
    }

    /// The exact table, else one for the same language, else the base table.
    fn dictionary(&self, id: &LocaleId) -> Option<TranslationDictionary> {
        self.exact(id).or_else(|| self.same_language(id)).or_else(|| self.base()).cloned()
    }

    fn locales(&self) -> Vec<LocaleId> {
        self.tables.iter().map(|(id, _)| id.clone()).collect()
    }
}

/// A provider with no tables, for hosts that register everything themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEmbeddedLocales;

impl EmbeddedLocaleProvider for NoEmbeddedLocales {
    fn has_locale(&self, _id: &LocaleId) -> bool {
        false
    }

    fn dictionary(&self, _id: &LocaleId) -> Option<TranslationDictionary> {
        None
    }

    fn locales(&self) -> Vec<LocaleId> {
        Vec::new()
    }
}
