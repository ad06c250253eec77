//! Integration tests for the localization runtime.

#![allow(clippy::unwrap_used)] // Tests can use unwrap for cleaner assertions

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::{dictionary, engine, engine_with_system, id, temp_dir, write_table};
use futures::future::join_all;
use lingua_runtime::{
    Config, Error, FileStore, LocaleCache, LocaleEngine, LocaleSource, Lookup, MemoryStore, NoEmbeddedLocales,
    RequestContext, t,
};

fn memory() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// Canonical identifiers of registered locales normalize to themselves.
#[test]
fn test_normalize_is_identity_for_supported_locales() {
    let engine = engine();
    engine.add_locale(id("zh-CN"), dictionary(&[]), false);
    engine.add_locale(id("fr-FR"), dictionary(&[]), false);
    engine.add_locale(id("sr-Latn-RS"), dictionary(&[]), false);

    for locale in engine.supported_locales() {
        assert_eq!(engine.normalize(locale.as_str()).unwrap(), locale);
    }
}

#[test]
fn test_chinese_script_aliases() {
    let engine = engine();
    assert_eq!(engine.normalize("zh-Hans-CN").unwrap().as_str(), "zh-CN");
    assert_eq!(engine.normalize("zh-Hant-CN").unwrap().as_str(), "zh-TW");
    assert_eq!(engine.normalize("zh_Hant_CN").unwrap().as_str(), "zh-TW");
}

/// A stored template comes back byte for byte after switching to its locale.
#[tokio::test]
async fn test_resolve_after_set_locale_returns_stored_template() {
    let engine = engine();
    let template = "Page {0} of {1} ({2:P0}) {{raw}}";
    engine.add_locale(id("de-DE"), dictionary(&[("pagination.summary", template)]), false);

    let session = engine.session(None, memory()).await.unwrap();
    session.set_locale("de-DE").await.unwrap();

    assert_eq!(session.resolve(&Lookup::key("pagination.summary")).as_deref(), Some(template));
}

#[tokio::test]
async fn test_persisted_value_beats_header_and_system() {
    let engine = engine_with_system(Some("ja_JP.UTF-8"));
    engine.add_locale(id("de-DE"), dictionary(&[]), false);

    let request = RequestContext {
        persisted_value: Some("fr-FR".to_string()),
        accept_language: Some("de-DE, en-US;q=0.8".to_string()),
    };
    let session = engine.session(Some(&request), memory()).await.unwrap();

    assert_eq!(session.active_locale(), id("fr-FR"));
    assert_eq!(session.negotiated_from(), LocaleSource::Persisted);
    assert_eq!(t!(session, "components.close"), "Fermer");
}

#[tokio::test]
async fn test_header_weights_pick_highest_supported() {
    let engine = engine();
    engine.add_locale(id("en"), dictionary(&[("greeting", "Hello")]), false);
    engine.add_locale(id("fr"), dictionary(&[("greeting", "Bonjour")]), false);

    let request = RequestContext::with_accept_language("en;q=0.5, fr;q=0.9");
    let session = engine.session(Some(&request), memory()).await.unwrap();

    assert_eq!(session.active_locale(), id("fr"));
    assert_eq!(t!(session, "greeting"), "Bonjour");
}

#[tokio::test]
async fn test_header_skips_unsupported_and_malformed_entries() {
    let engine = engine();
    engine.add_locale(id("fr-FR"), dictionary(&[]), false);

    let request = RequestContext::with_accept_language("*, x-klingon;q=1, fr-FR;q=abc, en-US;q=0.9");
    let session = engine.session(Some(&request), memory()).await.unwrap();

    // The malformed weight counts as 1.0, ahead of en-US.
    assert_eq!(session.active_locale(), id("fr-FR"));
    assert_eq!(session.negotiated_from(), LocaleSource::AcceptLanguage);
}

#[tokio::test]
async fn test_system_locale_then_default() {
    let engine = engine_with_system(Some("fr_FR.UTF-8"));
    let request = RequestContext::with_accept_language("ko-KR");
    let session = engine.session(Some(&request), memory()).await.unwrap();
    assert_eq!(session.active_locale(), id("fr-FR"));
    assert_eq!(session.negotiated_from(), LocaleSource::System);

    let session = common::engine().session(Some(&RequestContext::default()), memory()).await.unwrap();
    assert_eq!(session.active_locale(), id("en-US"));
    assert_eq!(session.negotiated_from(), LocaleSource::Default);
}

#[tokio::test]
async fn test_unknown_persisted_locale_borrows_default_table() {
    let engine = engine();
    let request = RequestContext::with_persisted("de_DE@euro");
    let session = engine.session(Some(&request), memory()).await.unwrap();

    assert_eq!(session.active_locale(), id("de-DE"));
    assert!(!engine.supported_locales().contains(&id("de-DE")));
    // No German table ships with the crate, so the default table backs it.
    assert_eq!(t!(session, "components.close"), "Close");
}

#[tokio::test]
async fn test_embedded_persisted_locale_is_registered_lazily() {
    let engine = engine();
    let session = engine.session(Some(&RequestContext::with_persisted("zh-Hans-CN")), memory()).await.unwrap();

    assert_eq!(session.active_locale(), id("zh-CN"));
    assert!(engine.supported_locales().contains(&id("zh-CN")));
    assert_eq!(t!(session, "components.close"), "关闭");
}

/// Arbitrary client-supplied tags never grow the shared cache.
#[tokio::test]
async fn test_client_tags_do_not_grow_cache() {
    let engine = engine();
    let before = engine.supported_locales();

    for i in 0u8..200 {
        // Private-use languages `qaa`..`qhr`, all syntactically valid.
        let tag = format!("q{}{}", char::from(b'a' + i / 26), char::from(b'a' + i % 26));
        let session = engine.session(Some(&RequestContext::with_persisted(tag.as_str())), memory()).await.unwrap();
        assert_eq!(session.active_locale(), id(&tag));
        session.set_locale(&format!("{tag}-QM")).await.unwrap();
    }

    assert_eq!(engine.supported_locales(), before);
}

#[tokio::test]
async fn test_resolve_without_key_uses_fallback() {
    let session = engine().session(None, memory()).await.unwrap();

    assert_eq!(session.resolve(&Lookup::builder().fallback("n/a").build()).as_deref(), Some("n/a"));
    assert_eq!(session.resolve(&Lookup::builder().build()), None);
}

#[tokio::test]
async fn test_missing_key_degrades_to_last_segment() {
    let session = engine().session(None, memory()).await.unwrap();

    assert_eq!(session.resolve(&Lookup::key("a.b.missing")).as_deref(), Some("missing"));
    assert_eq!(session.resolve(&Lookup::key("trailing.")).as_deref(), Some("trailing."));

    let quiet = Lookup::builder().key("a.b.missing").return_key_if_missing(false).fallback("-").build();
    assert_eq!(session.resolve(&quiet).as_deref(), Some("-"));
}

#[tokio::test]
async fn test_scoped_lookup() {
    let session = engine().session(None, memory()).await.unwrap();

    let lookup = Lookup::builder().scope("components.dataTable").key("sortBy").build();
    assert_eq!(lookup.effective_key().as_deref(), Some("components.dataTable.sortBy"));
    assert_eq!(session.resolve(&lookup), session.resolve(&Lookup::key("components.dataTable.sortBy")));
}

#[tokio::test]
async fn test_badly_typed_argument_returns_template() {
    let engine = engine();
    let table = dictionary(&[("count", "{0:D} selected"), ("money", "{0:F2}"), ("page", "{0}-{1} of {2}")]);
    engine.add_locale(id("en-GB"), table, false);
    let session = engine.session(None, memory()).await.unwrap();
    session.set_locale("en-GB").await.unwrap();

    assert_eq!(t!(session, "count", "three"), "{0:D} selected");
    assert_eq!(t!(session, "count", 3), "3 selected");
    assert_eq!(t!(session, "money", 2.5), "2.50");
    // Too few arguments also falls back to the template.
    assert_eq!(t!(session, "page", 1), "{0}-{1} of {2}");
}

/// N threads registering N distinct locales leave exactly those N.
#[test]
fn test_concurrent_registration_of_distinct_locales() {
    let cache = Arc::new(LocaleCache::new());
    let tags = ["en-US", "fr-FR", "de-DE", "es-ES", "it-IT", "ja-JP", "ko-KR", "pt-BR", "ru-RU", "zh-CN"];

    std::thread::scope(|scope| {
        for tag in tags {
            let cache = Arc::clone(&cache);
            scope.spawn(move || cache.register(id(tag), dictionary(&[("name", tag)]), false));
        }
    });

    let supported: HashSet<_> = cache.list_supported().into_iter().collect();
    let expected: HashSet<_> = tags.iter().map(|tag| id(tag)).collect();
    assert_eq!(supported, expected);
    assert_eq!(cache.len(), tags.len());
    assert!(cache.default_identifier().is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_set_locale_across_sessions() {
    let engine = engine();
    let tags = ["fr-FR", "zh-CN", "de-DE", "es-ES", "ja-JP", "ko-KR", "pt-BR", "it-IT"];

    let mut sessions = Vec::new();
    for _ in tags {
        sessions.push(Arc::new(engine.session(None, memory()).await.unwrap()));
    }

    let switches = sessions.iter().zip(tags).map(|(session, tag)| {
        let session = Arc::clone(session);
        tokio::spawn(async move { session.set_locale(tag).await })
    });
    for result in join_all(switches).await {
        result.unwrap().unwrap();
    }

    for (session, tag) in sessions.iter().zip(tags) {
        assert_eq!(session.active_locale(), id(tag));
    }
    // Only locales with a table of their own are registered.
    let supported: HashSet<_> = engine.supported_locales().into_iter().collect();
    assert_eq!(supported, HashSet::from([id("en-US"), id("fr-FR"), id("zh-CN")]));
    assert_eq!(engine.cache().default_identifier().unwrap(), id("en-US"));
}

/// Readers never see one locale's identifier paired with another's table.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_resolve_during_set_locale_is_consistent() {
    let engine = engine();
    let session = Arc::new(engine.session(None, memory()).await.unwrap());

    let writer = {
        let session = Arc::clone(&session);
        tokio::spawn(async move {
            for round in 0..200 {
                let tag = if round % 2 == 0 { "fr-FR" } else { "en-US" };
                session.set_locale(tag).await.unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    let reader = {
        let session = Arc::clone(&session);
        tokio::spawn(async move {
            for _ in 0..2_000 {
                let active = session.active();
                let expected = if active.id == id("fr-FR") { "Fermer" } else { "Close" };
                assert_eq!(active.dictionary.get("components.close"), Some(expected));
                tokio::task::yield_now().await;
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();
}

#[tokio::test]
async fn test_last_set_locale_wins_on_one_session() {
    let engine = engine();
    let store = memory();
    let session = engine.session(None, store.clone()).await.unwrap();

    let (first, second) = tokio::join!(session.set_locale("fr-FR"), session.set_locale("zh-CN"));
    first.unwrap();
    second.unwrap();

    let active = session.active_locale();
    assert_eq!(store.get(engine.persistence_key()).as_deref(), Some(active.as_str()));
}

#[tokio::test]
async fn test_file_store_carries_choice_between_sessions() {
    let (_dir, path) = temp_dir();
    let state = path.join("state").join("locale.json");
    let engine = engine();

    let session = engine.session(None, Arc::new(FileStore::new(&state))).await.unwrap();
    assert_eq!(session.active_locale(), id("en-US"));
    session.set_locale("fr_FR.UTF-8").await.unwrap();

    let reopened = engine.session(None, Arc::new(FileStore::new(&state))).await.unwrap();
    assert_eq!(reopened.active_locale(), id("fr-FR"));
    assert_eq!(reopened.negotiated_from(), LocaleSource::Persisted);
}

#[tokio::test]
async fn test_no_default_locale_is_a_setup_error() {
    common::init_tracing();
    let engine = LocaleEngine::builder()
        .cache(Arc::new(LocaleCache::new()))
        .embedded(Arc::new(NoEmbeddedLocales))
        .system(Arc::new(lingua_runtime::FixedLocale::none()))
        .build()
        .unwrap();

    let err = engine.session(None, memory()).await.unwrap_err();
    assert!(matches!(err, Error::NoDefaultLocale));
    assert!(err.is_setup_error());
}

#[tokio::test]
async fn test_engine_from_config_file() {
    let (_dir, path) = temp_dir();
    let locales = path.join("locales");
    write_table(&locales, "fr-FR", r#"{ "components": { "close": "Fermer la fenêtre" } }"#);
    write_table(&locales, "en-US", r#"{ "components": { "close": "Dismiss" } }"#);

    let config_path = path.join("i18n.yaml");
    let yaml = format!(
        "default_locale: fr_FR\npersistence_key: app_locale\nlocales_dir: {}\naliases:\n  fr-BE: fr-FR\n",
        locales.display()
    );
    std::fs::write(&config_path, yaml).unwrap();

    let config = Config::load_from_file(&config_path).unwrap();
    let engine = LocaleEngine::builder()
        .cache(Arc::new(LocaleCache::new()))
        .system(Arc::new(lingua_runtime::FixedLocale::none()))
        .config(config)
        .build()
        .unwrap();
    assert_eq!(engine.persistence_key(), "app_locale");
    assert_eq!(engine.cache().default_identifier().unwrap(), id("fr-FR"));

    let store = memory();
    let session = engine.session(None, store.clone()).await.unwrap();
    assert_eq!(t!(session, "components.close"), "Fermer la fenêtre");

    session.set_locale("fr-BE").await.unwrap();
    assert_eq!(session.active_locale(), id("fr-FR"));
    assert_eq!(store.get("app_locale").as_deref(), Some("fr-FR"));
}
