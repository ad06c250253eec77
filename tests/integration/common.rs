//! Common test utilities.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

use lingua_runtime::{FixedLocale, LocaleCache, LocaleEngine, LocaleId, TranslationDictionary};
use tempfile::TempDir;

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per process.
///
/// Set `RUST_LOG=lingua_runtime=debug` to see engine logs in test output.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
    });
}

/// Parse a locale tag that is known to be valid.
pub fn id(tag: &str) -> LocaleId {
    LocaleId::parse(tag).expect("valid locale tag")
}

/// An engine with a private cache and the given system locale.
pub fn engine_with_system(system: Option<&str>) -> LocaleEngine {
    init_tracing();
    let system = match system {
        Some(tag) => FixedLocale::new(tag),
        None => FixedLocale::none(),
    };
    LocaleEngine::builder()
        .cache(Arc::new(LocaleCache::new()))
        .system(Arc::new(system))
        .build()
        .expect("engine builds")
}

/// An engine with a private cache and no system locale.
pub fn engine() -> LocaleEngine {
    engine_with_system(None)
}

/// A dictionary from literal pairs.
pub fn dictionary(entries: &[(&str, &str)]) -> TranslationDictionary {
    entries.iter().copied().collect()
}

/// Create a temporary directory for test files.
pub fn temp_dir() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().to_path_buf();
    (dir, path)
}

/// Write a `<locale>.json` table into `dir`.
pub fn write_table(dir: &Path, locale: &str, json: &str) -> PathBuf {
    std::fs::create_dir_all(dir).expect("Failed to create locales dir");
    let path = dir.join(format!("{locale}.json"));
    std::fs::write(&path, json).expect("Failed to write table");
    path
}
