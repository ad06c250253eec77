//! Alias table for locale forms that hosts disagree on.
//!
//! Some platforms expand a Chinese tag into a script-qualified form
//! (`zh-Hans-CN`) while others keep the region-only form (`zh-CN`). Both mean
//! the same translation table, so the script-qualified forms are rewritten to
//! the region-only form the translation tables are keyed by.

use std::collections::HashMap;

use unic_langid::LanguageIdentifier;

/// Built-in rewrites, applied after canonical casing.
pub const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("zh-Hans-CN", "zh-CN"),
    ("zh-Hant-CN", "zh-TW"),
    ("zh-Hant-TW", "zh-TW"),
    ("zh-Hant-HK", "zh-HK"),
    ("zh-Hant-MO", "zh-MO"),
    ("zh-Hans-SG", "zh-SG"),
    ("zh-Hans", "zh-CN"),
    ("zh-Hant", "zh-TW"),
];

/// Alias lookup keyed case-insensitively.
#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AliasTable {
    /// The built-in table only.
    pub fn builtin() -> Self {
        let entries = BUILTIN_ALIASES
            .iter()
            .map(|(from, to)| (from.to_ascii_lowercase(), (*to).to_string()))
            .collect();
        Self { entries }
    }

    /// The built-in table with `extra` entries layered on top.
    ///
    /// Extra entries win over built-in ones with the same source form.
    /// Targets are stored in canonical casing; a target that does not parse
    /// is kept as written and left for config validation to reject.
    pub fn with_extra<'a>(extra: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut table = Self::builtin();
        for (from, to) in extra {
            table.entries.insert(from.to_ascii_lowercase(), canonical_target(to));
        }
        table
    }

    /// Returns the rewrite target for `tag`, if any.
    pub fn lookup(&self, tag: &str) -> Option<&str> {
        self.entries.get(&tag.to_ascii_lowercase()).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn canonical_target(target: &str) -> String {
    let target = target.trim();
    target
        .replace('_', "-")
        .parse::<LanguageIdentifier>()
        .map_or_else(|_| target.to_string(), |langid| langid.to_string())
}
