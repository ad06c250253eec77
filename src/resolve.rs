//! Key resolution with scoping, fallback labels and interpolation.

use bon::Builder;

use crate::dictionary::TemplateSource;
use crate::format::{FormatArg, Interpolated, interpolate};

/// Separator between scope and key segments.
pub const KEY_SEPARATOR: char = '.';

/// A translation request.
///
/// ```rust
/// use lingua_runtime::Lookup;
///
/// let lookup = Lookup::builder()
///     .key("pagination.ariaLabel.page")
///     .args(vec![3.into()])
///     .build();
/// # let _ = lookup;
/// ```
#[derive(Debug, Clone, Builder)]
pub struct Lookup<'a> {
    /// Key to look up; `None` resolves straight to `fallback`.
    key: Option<&'a str>,

    /// Optional scope, joined to the key as `scope.key`.
    scope: Option<&'a str>,

    /// On a miss, return a label derived from the key instead of `fallback`.
    #[builder(default = true)]
    return_key_if_missing: bool,

    /// Result when the key is absent and no label is wanted.
    fallback: Option<&'a str>,

    /// Positional arguments for the template.
    #[builder(default)]
    args: Vec<FormatArg>,
}

impl<'a> Lookup<'a> {
    /// A plain lookup of `key` with default options.
    pub fn key(key: &'a str) -> Self {
        Self::builder().key(key).build()
    }

    /// The key as the caller gave it, before scoping.
    pub const fn raw_key(&self) -> Option<&'a str> {
        self.key
    }

    /// The key actually looked up in the dictionary.
    pub fn effective_key(&self) -> Option<String> {
        self.key.map(|key| scoped_key(self.scope, key))
    }
}

fn scoped_key(scope: Option<&str>, key: &str) -> String {
    match scope {
        Some(scope) => format!("{scope}{KEY_SEPARATOR}{key}"),
        None => key.to_string(),
    }
}

/// Resolve `lookup` against `source`.
///
/// - A `None` key yields the fallback without touching `source`.
/// - A hit with no arguments returns the template verbatim.
/// - A hit with arguments is interpolated; on failure the template is
///   returned unformatted.
/// - A miss yields [`missing_key_label`] of the raw key, or the fallback when
///   `return_key_if_missing` is off.
pub fn resolve<S>(source: &S, lookup: &Lookup<'_>) -> Option<String>
where
    S: TemplateSource + ?Sized,
{
    let Some(key) = lookup.key else {
        return lookup.fallback.map(str::to_string);
    };
    let effective = scoped_key(lookup.scope, key);

    let Some(template) = source.template(&effective) else {
        tracing::debug!(key = %effective, "Missing translation key");
        if !lookup.return_key_if_missing {
            return lookup.fallback.map(str::to_string);
        }
        return Some(missing_key_label(key).to_string());
    };

    if lookup.args.is_empty() {
        return Some(template.to_string());
    }

    let interpolated = interpolate(template, &lookup.args);
    if let Interpolated::Unformatted { error, .. } = &interpolated {
        tracing::warn!(key = %effective, error = %error, "Translation formatting failed");
    }
    Some(interpolated.into_string())
}

/// Readable label for a key with no translation.
///
/// Keys starting or ending with the separator are returned as they are;
/// otherwise the last dot-delimited segment is used, so
/// `components.dataTable.noData` degrades to `noData`.
pub fn missing_key_label(key: &str) -> &str {
    if key.starts_with(KEY_SEPARATOR) || key.ends_with(KEY_SEPARATOR) {
        return key;
    }
    key.rsplit(KEY_SEPARATOR).next().unwrap_or(key)
}
