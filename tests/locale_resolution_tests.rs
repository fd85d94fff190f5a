//! Tests for server-side locale resolution.

use anyhow::{Context, Result, bail, ensure};
use http::HeaderMap;
use http::header::COOKIE;
use paddock::bundle::{BundleError, BundleStore, MessageBundle};
use paddock::cookie::{CookieJar, LEGACY_LOCALE_COOKIE, PREFERRED_LOCALE_COOKIE};
use paddock::locale::Locale;
use paddock::resolver::{LocaleResolver, LocaleSource, ResolverSettings};
use rstest::{fixture, rstest};
use serde_json::json;
use std::collections::HashMap;

#[fixture]
fn store() -> BundleStore {
    BundleStore::embedded().unwrap_or_else(|err| panic!("embedded bundles must load: {err}"))
}

fn cookies(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
        .collect()
}

fn bundle(value: serde_json::Value) -> MessageBundle {
    MessageBundle::try_from(value).unwrap_or_default()
}

#[rstest]
#[case::spanish("es", Locale::Es, LocaleSource::PreferredCookie)]
#[case::english("en", Locale::En, LocaleSource::PreferredCookie)]
#[case::german("de", Locale::De, LocaleSource::PreferredCookie)]
#[case::french("fr", Locale::Es, LocaleSource::Default)]
#[case::region_tag("en-US", Locale::Es, LocaleSource::Default)]
#[case::upper_case("DE", Locale::Es, LocaleSource::Default)]
#[case::empty("", Locale::Es, LocaleSource::Default)]
fn preferred_cookie_value_selects_locale(
    store: BundleStore,
    #[case] value: &str,
    #[case] expected: Locale,
    #[case] source: LocaleSource,
) -> Result<()> {
    let resolver = LocaleResolver::with_defaults(store)?;
    let resolution = resolver.resolve(&cookies(&[(PREFERRED_LOCALE_COOKIE, value)]));
    ensure!(
        resolution.locale == expected,
        "cookie {value:?} should resolve to {expected}, got {}",
        resolution.locale
    );
    ensure!(resolution.source == source, "unexpected source {:?}", resolution.source);
    ensure!(
        resolution.messages == *resolver.catalog().get(expected),
        "messages must be the {expected} bundle"
    );
    Ok(())
}

#[rstest]
fn no_cookies_resolve_to_spanish(store: BundleStore) -> Result<()> {
    let resolver = LocaleResolver::with_defaults(store)?;
    let resolution = resolver.resolve(&CookieJar::default());
    ensure!(resolution.locale == Locale::Es, "expected es, got {}", resolution.locale);
    ensure!(resolution.source == LocaleSource::Default, "expected default source");
    ensure!(
        resolution.messages == *resolver.catalog().get(Locale::Es),
        "expected the Spanish bundle"
    );
    Ok(())
}

#[rstest]
fn legacy_cookie_is_used_only_when_preferred_is_absent(store: BundleStore) -> Result<()> {
    let resolver = LocaleResolver::with_defaults(store)?;

    let legacy_only = resolver.resolve(&cookies(&[(LEGACY_LOCALE_COOKIE, "de")]));
    ensure!(legacy_only.locale == Locale::De, "legacy cookie should apply");
    ensure!(legacy_only.source == LocaleSource::LegacyCookie, "expected legacy source");

    let both = resolver.resolve(&cookies(&[
        (PREFERRED_LOCALE_COOKIE, "en"),
        (LEGACY_LOCALE_COOKIE, "de"),
    ]));
    ensure!(both.locale == Locale::En, "preferred cookie must win, got {}", both.locale);

    let invalid_preferred = resolver.resolve(&cookies(&[
        (PREFERRED_LOCALE_COOKIE, "fr"),
        (LEGACY_LOCALE_COOKIE, "de"),
    ]));
    ensure!(
        invalid_preferred.locale == Locale::Es,
        "an unsupported preferred value maps to the default, got {}",
        invalid_preferred.locale
    );
    Ok(())
}

#[rstest]
fn legacy_cookie_can_be_disabled(store: BundleStore) -> Result<()> {
    let settings = ResolverSettings {
        legacy_cookie_name: None,
        ..ResolverSettings::default()
    };
    let resolver = LocaleResolver::new(store, settings)?;
    let resolution = resolver.resolve(&cookies(&[(LEGACY_LOCALE_COOKIE, "de")]));
    ensure!(resolution.locale == Locale::Es, "legacy cookie must be ignored");
    Ok(())
}

#[rstest]
fn resolution_is_idempotent(store: BundleStore) -> Result<()> {
    let resolver = LocaleResolver::with_defaults(store)?;
    let jar = CookieJar::parse("theme=dark; preferred-locale=de");
    let first = resolver.resolve(&jar);
    let second = resolver.resolve(&jar);
    ensure!(first == second, "repeated resolution must match");
    Ok(())
}

#[rstest]
fn every_supported_locale_has_a_non_empty_bundle(store: BundleStore) -> Result<()> {
    let resolver = LocaleResolver::with_defaults(store)?;
    for locale in Locale::ALL {
        let resolution = resolver.resolve(&cookies(&[(PREFERRED_LOCALE_COOKIE, locale.as_str())]));
        ensure!(resolution.locale == locale, "expected {locale}");
        ensure!(!resolution.messages.is_empty(), "{locale} bundle is empty");
    }
    Ok(())
}

#[rstest]
#[case::missing(None)]
#[case::empty(Some(MessageBundle::default()))]
fn unusable_bundle_reports_the_default_locale(#[case] german: Option<MessageBundle>) -> Result<()> {
    let spanish = bundle(json!({"common": {"save": "Guardar"}}));
    let mut catalog = HashMap::from([(Locale::Es, spanish.clone())]);
    if let Some(german_bundle) = german {
        catalog.insert(Locale::De, german_bundle);
    }
    let resolver = LocaleResolver::with_defaults(catalog)?;
    let resolution = resolver.resolve(&cookies(&[(PREFERRED_LOCALE_COOKIE, "de")]));
    ensure!(
        resolution.locale == Locale::Es,
        "locale without messages must not be reported, got {}",
        resolution.locale
    );
    ensure!(resolution.messages == spanish, "expected the default bundle");
    ensure!(resolution.source == LocaleSource::Default, "expected default source");
    Ok(())
}

#[rstest]
fn configured_default_locale_is_honoured(store: BundleStore) -> Result<()> {
    let settings = ResolverSettings {
        default_locale: Locale::En,
        ..ResolverSettings::default()
    };
    let resolver = LocaleResolver::new(store, settings)?;
    let resolution = resolver.resolve(&cookies(&[(PREFERRED_LOCALE_COOKIE, "it")]));
    ensure!(resolution.locale == Locale::En, "expected configured default");
    Ok(())
}

#[rstest]
fn headers_are_merged_before_resolution(store: BundleStore) -> Result<()> {
    let resolver = LocaleResolver::with_defaults(store)?;
    let mut headers = HeaderMap::new();
    headers.append(COOKIE, "theme=dark".parse().context("cookie header")?);
    headers.append(COOKIE, "preferred-locale=en".parse().context("cookie header")?);
    let resolution = resolver.resolve_headers(&headers);
    ensure!(resolution.locale == Locale::En, "expected en from second header");
    Ok(())
}

#[rstest]
#[case::missing(HashMap::from([(Locale::En, bundle(json!({"common": {"save": "Save"}})))]))]
#[case::empty(HashMap::from([
    (Locale::Es, MessageBundle::default()),
    (Locale::En, bundle(json!({"common": {"save": "Save"}}))),
]))]
fn default_locale_without_messages_is_rejected(
    #[case] catalog: HashMap<Locale, MessageBundle>,
) -> Result<()> {
    match LocaleResolver::with_defaults(catalog) {
        Err(BundleError::MissingLocale { locale } | BundleError::Empty { locale }) => {
            ensure!(locale == Locale::Es, "error should name the default locale, got {locale}");
            Ok(())
        }
        Err(other) => bail!("unexpected error {other}"),
        Ok(_) => bail!("a catalogue without Spanish messages must be rejected"),
    }
}

#[rstest]
fn configured_default_needs_only_its_own_bundle() -> Result<()> {
    let german = bundle(json!({"common": {"save": "Speichern"}}));
    let settings = ResolverSettings {
        default_locale: Locale::De,
        ..ResolverSettings::default()
    };
    let catalog = HashMap::from([(Locale::De, german.clone())]);
    let resolver = LocaleResolver::new(catalog, settings)?;
    ensure!(
        resolver.settings().default_locale == Locale::De,
        "settings should be kept as supplied"
    );
    let resolution = resolver.resolve(&cookies(&[(PREFERRED_LOCALE_COOKIE, "en")]));
    ensure!(resolution.locale == Locale::De, "missing English falls back to German");
    ensure!(resolution.messages == german, "German bundle expected");
    Ok(())
}
