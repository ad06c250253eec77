//! Access to the ambient system locale.
//!
//! The normalizer and negotiator never read process state themselves; they are
//! handed a [`SystemLocale`] so tests and embedded hosts can pin the value.

/// Supplies the host's current locale string, unnormalized.
pub trait SystemLocale: Send + Sync {
    /// Return the raw system locale when one is available.
    fn system_locale(&self) -> Option<String>;
}

/// System locale read from the environment, then from the OS.
///
/// Checks in order:
/// 1. `LC_ALL` - POSIX locale override
/// 2. `LANG` - default POSIX locale
/// 3. the OS user locale via `sys-locale`
///
/// `C` and `POSIX` are skipped since they name no language.
#[derive(Debug, Default, Copy, Clone)]
pub struct HostLocale;

impl SystemLocale for HostLocale {
    fn system_locale(&self) -> Option<String> {
        for var in ["LC_ALL", "LANG"] {
            if let Ok(locale) = std::env::var(var)
                && !is_unset(&locale)
            {
                return Some(locale);
            }
        }

        sys_locale::get_locale().filter(|locale| !is_unset(locale))
    }
}

/// A fixed system locale, or none at all.
#[derive(Debug, Default, Clone)]
pub struct FixedLocale(Option<String>);

impl FixedLocale {
    /// Always report `locale`.
    pub fn new(locale: impl Into<String>) -> Self {
        Self(Some(locale.into()))
    }

    /// Report no system locale.
    pub const fn none() -> Self {
        Self(None)
    }
}

impl SystemLocale for FixedLocale {
    fn system_locale(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Whether a raw locale value carries no language at all.
pub(crate) fn is_unset(locale: &str) -> bool {
    let locale = locale.trim();
    locale.is_empty() || locale == "C" || locale == "POSIX" || locale.starts_with("C.")
}
