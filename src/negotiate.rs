//! Locale negotiation.
//!
//! Picks a session's locale from, in order:
//! 1. a persisted explicit choice
//! 2. the weighted `Accept-Language` list, first supported candidate
//! 3. the system locale
//! 4. the cache's default locale
//!
//! Negotiation itself does no I/O. Reading the persisted value happens before
//! it, and committing the result is up to the session.

use std::fmt;

use crate::cache::LocaleCache;
use crate::error::Result;
use crate::locale::{LocaleId, Normalizer};

/// Weight given to candidates with no `q` parameter, or a malformed one.
pub const DEFAULT_WEIGHT: f32 = 1.0;

/// Inputs that arrive with an incoming request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// The persisted locale choice sent with the request (e.g. a cookie).
    pub persisted_value: Option<String>,
    /// Raw `Accept-Language` header.
    pub accept_language: Option<String>,
}

impl RequestContext {
    /// A request carrying only an `Accept-Language` header.
    pub fn with_accept_language(header: impl Into<String>) -> Self {
        Self { persisted_value: None, accept_language: Some(header.into()) }
    }

    /// A request carrying only a persisted choice.
    pub fn with_persisted(value: impl Into<String>) -> Self {
        Self { persisted_value: Some(value.into()), accept_language: None }
    }
}

/// Everything negotiation looks at, already read from its sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct NegotiationContext<'a> {
    /// Persisted explicit choice.
    pub persisted: Option<&'a str>,
    /// Raw weighted language list.
    pub accept_language: Option<&'a str>,
    /// Raw system locale.
    pub system_locale: Option<&'a str>,
}

/// A requested locale with its preference weight.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateLocale {
    /// The tag as it appeared in the list, trimmed.
    pub tag: String,
    /// Preference weight, nominally `0.0..=1.0`.
    pub weight: f32,
    /// Position in the original list.
    pub position: usize,
}

/// Parse a weighted language list (`tag[;q=weight], ...`).
///
/// Entries are returned sorted by descending weight, ties kept in request
/// order. A missing or malformed weight counts as [`DEFAULT_WEIGHT`]; finite
/// weights are taken as given without range checks. Empty entries are
/// dropped; tags are not validated here.
pub fn parse_accept_language(header: &str) -> Vec<CandidateLocale> {
    let mut candidates: Vec<CandidateLocale> = header
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .enumerate()
        .filter_map(|(position, entry)| {
            let mut parts = entry.split(';');
            let tag = parts.next().unwrap_or_default().trim();
            if tag.is_empty() {
                return None;
            }

            let weight = parts
                .filter_map(|param| {
                    let (name, value) = param.split_once('=')?;
                    name.trim().eq_ignore_ascii_case("q").then_some(value)
                })
                .next()
                .map_or(DEFAULT_WEIGHT, parse_weight);

            Some(CandidateLocale { tag: tag.to_string(), weight, position })
        })
        .collect();

    // `sort_by` is stable, so equal weights keep their request order.
    candidates.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    candidates
}

fn parse_weight(raw: &str) -> f32 {
    match raw.trim().parse::<f32>() {
        Ok(weight) if weight.is_finite() => weight,
        _ => DEFAULT_WEIGHT,
    }
}

/// Where a negotiated locale came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleSource {
    /// A persisted explicit choice.
    Persisted,
    /// The weighted language list.
    AcceptLanguage,
    /// The system locale.
    System,
    /// The cache's default locale.
    Default,
}

impl fmt::Display for LocaleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Persisted => "persisted",
            Self::AcceptLanguage => "accept-language",
            Self::System => "system",
            Self::Default => "default",
        })
    }
}

/// Result of negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiated {
    /// The chosen locale.
    pub locale: LocaleId,
    /// The input that decided it.
    pub source: LocaleSource,
}

/// Chooses a session locale against a [`LocaleCache`].
#[derive(Debug, Clone, Copy)]
pub struct Negotiator<'a> {
    cache: &'a LocaleCache,
    normalizer: &'a Normalizer,
}

impl<'a> Negotiator<'a> {
    /// A negotiator checking support against `cache`.
    pub const fn new(cache: &'a LocaleCache, normalizer: &'a Normalizer) -> Self {
        Self { cache, normalizer }
    }

    /// Pick the locale for `context`.
    ///
    /// Fails only with [`Error::NoDefaultLocale`](crate::Error::NoDefaultLocale)
    /// when every source is empty and nothing was ever registered.
    pub fn negotiate(&self, context: &NegotiationContext<'_>) -> Result<Negotiated> {
        let negotiated = self.pick(context)?;
        tracing::debug!(locale = %negotiated.locale, source = %negotiated.source, "Negotiated locale");
        Ok(negotiated)
    }

    fn pick(&self, context: &NegotiationContext<'_>) -> Result<Negotiated> {
        if let Some(persisted) = context.persisted.filter(|value| !value.trim().is_empty()) {
            let locale = self.normalizer.normalize(persisted, context.system_locale, || {
                self.cache.default_identifier()
            })?;
            return Ok(Negotiated { locale, source: LocaleSource::Persisted });
        }

        if let Some(header) = context.accept_language
            && let Some(locale) = self.first_supported(header)
        {
            return Ok(Negotiated { locale, source: LocaleSource::AcceptLanguage });
        }

        if let Some(locale) = context.system_locale.and_then(|raw| self.normalizer.parse(raw)) {
            return Ok(Negotiated { locale, source: LocaleSource::System });
        }

        let locale = self.cache.default_identifier()?;
        Ok(Negotiated { locale, source: LocaleSource::Default })
    }

    fn first_supported(&self, header: &str) -> Option<LocaleId> {
        parse_accept_language(header)
            .into_iter()
            .filter_map(|candidate| self.normalizer.parse(&candidate.tag))
            .find(|locale| self.cache.contains(locale))
    }
}
