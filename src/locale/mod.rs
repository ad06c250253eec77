//! Locale identifiers and their normalization.
//!
//! Raw locale strings arrive from cookies, `Accept-Language` headers, config
//! files and the host environment in many shapes (`en_US.UTF-8`, `EN-us`,
//! `zh-Hans-CN`). Everything is funnelled through [`Normalizer`] into a
//! [`LocaleId`], the only form the cache and sessions deal in.
//!
//! ```rust
//! use lingua_runtime::locale::{LocaleId, Normalizer};
//!
//! let normalizer = Normalizer::default();
//! assert_eq!(normalizer.parse("en_US.UTF-8").unwrap().as_str(), "en-US");
//! assert_eq!(normalizer.parse("zh-Hans-CN").unwrap().as_str(), "zh-CN");
//! assert!(normalizer.parse("not a locale").is_none());
//! ```

mod alias;
mod system;

pub use alias::{AliasTable, BUILTIN_ALIASES};
pub use system::{FixedLocale, HostLocale, SystemLocale};

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

use crate::error::{Error, Result};

/// A canonical locale identifier.
///
/// Only produced by [`Normalizer`], so it is never empty and always in
/// canonical casing with aliases applied. Equality ignores ASCII case.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocaleId(String);

impl LocaleId {
    /// Parse `raw` with the built-in alias table.
    pub fn parse(raw: &str) -> Option<Self> {
        Normalizer::default().parse(raw)
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The primary language subtag (`fr` for `fr-CA`).
    pub fn language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl PartialEq for LocaleId {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for LocaleId {}

impl Hash for LocaleId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocaleId({})", self.0)
    }
}

impl AsRef<str> for LocaleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for LocaleId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| Error::config(format!("invalid locale identifier '{s}'")))
    }
}

impl TryFrom<String> for LocaleId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<LocaleId> for String {
    fn from(id: LocaleId) -> Self {
        id.0
    }
}

/// Turns raw locale strings into [`LocaleId`]s.
///
/// Canonicalization is done by parsing with `unic-langid` and applying the
/// alias table; the host's locale API is never consulted for it.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    aliases: AliasTable,
}

impl Normalizer {
    /// A normalizer using `aliases` instead of the built-in table.
    pub const fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    /// The alias table in use.
    pub const fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Strictly parse `raw`, returning `None` when it names no locale.
    ///
    /// Accepts POSIX forms: the encoding (`.UTF-8`) and modifier (`@euro`)
    /// suffixes are dropped and `_` separators become `-`.
    pub fn parse(&self, raw: &str) -> Option<LocaleId> {
        if system::is_unset(raw) {
            return None;
        }

        let stripped = raw.trim().split(['.', '@']).next().unwrap_or_default().trim();
        if stripped.is_empty() {
            return None;
        }

        // Extension and private-use sequences start at the first singleton
        // subtag (`-u-`, `-t-`, `-x-`) and carry nothing the tables are keyed by.
        let tag = stripped
            .replace('_', "-")
            .split('-')
            .take_while(|subtag| subtag.len() != 1)
            .collect::<Vec<_>>()
            .join("-");
        let langid: LanguageIdentifier = tag.parse().ok()?;
        if langid.language.as_str() == "und" {
            return None;
        }

        let canonical = langid.to_string();
        let canonical = match self.aliases.lookup(&canonical) {
            Some(target) => target.to_string(),
            None => canonical,
        };
        Some(LocaleId(canonical))
    }

    /// Normalize `raw`, falling back to the system locale and then to
    /// `default` when `raw` is empty or unparsable.
    ///
    /// `default` is only invoked when both `raw` and `system_locale` fail to
    /// parse; its error (no locale ever registered) is the only failure.
    pub fn normalize<F>(&self, raw: &str, system_locale: Option<&str>, default: F) -> Result<LocaleId>
    where
        F: FnOnce() -> Result<LocaleId>,
    {
        if let Some(id) = self.parse(raw) {
            return Ok(id);
        }

        if let Some(id) = system_locale.and_then(|locale| self.parse(locale)) {
            tracing::debug!(raw = raw, locale = %id, "Unusable locale, using system locale");
            return Ok(id);
        }

        let id = default()?;
        tracing::debug!(raw = raw, locale = %id, "Unusable locale, using default locale");
        Ok(id)
    }
}
