//! Lingua Runtime
//!
//! Locale negotiation and translation lookup for a UI component library.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use lingua_runtime::{LocaleEngine, MemoryStore, RequestContext, t};
//!
//! # async fn demo() -> lingua_runtime::Result<()> {
//! let engine = LocaleEngine::builder().build()?;
//!
//! let request = RequestContext::with_accept_language("fr-CH, fr;q=0.9, en;q=0.8");
//! let session = engine.session(Some(&request), Arc::new(MemoryStore::new())).await?;
//!
//! let close = t!(session, "components.close");
//! let page = t!(session, "components.dataFooter.pageText", 1, 10, 42);
//!
//! session.set_locale("zh-Hans-CN").await?;
//! # let _ = (close, page);
//! # Ok(())
//! # }
//! ```
//!
//! ## Negotiation
//!
//! A session's initial locale is the first available of: the persisted
//! choice, the best registered `Accept-Language` entry, the system locale and
//! the registered default.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod config;
pub mod dictionary;
pub mod embedded;
pub mod engine;
pub mod error;
pub mod format;
pub mod locale;
pub mod negotiate;
pub mod persistence;
pub mod resolve;
pub mod session;

pub use cache::{LocaleCache, LocaleCacheEntry};
pub use config::Config;
pub use dictionary::{TemplateSource, TranslationDictionary};
pub use embedded::{BuiltinLocales, EmbeddedLocaleProvider, NoEmbeddedLocales};
pub use engine::LocaleEngine;
pub use error::{Error, Result};
pub use format::{FormatArg, FormatError, format_template, interpolate};
pub use locale::{FixedLocale, HostLocale, LocaleId, Normalizer, SystemLocale};
pub use negotiate::{LocaleSource, RequestContext, parse_accept_language};
pub use persistence::{FileStore, MemoryStore, PersistenceAdapter};
pub use resolve::{Lookup, resolve};
pub use session::{ActiveLocale, Session};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Translate a key through a [`Session`].
///
/// ```rust,ignore
/// let close = t!(session, "components.close");
/// let page = t!(session, "components.dataFooter.pageText", 1, 10, 42);
/// ```
#[macro_export]
macro_rules! t {
    ($session:expr, $key:expr) => {
        $session.t($key)
    };
    ($session:expr, $key:expr, $($arg:expr),+ $(,)?) => {
        $session.t_with($key, &[$($crate::FormatArg::from($arg)),+])
    };
}
