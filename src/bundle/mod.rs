//! Message bundle store.
//!
//! Owns one immutable, nested message bundle per supported locale. Bundles
//! are validated once when the store is built; a store that constructs
//! successfully can hand out a non-empty bundle for every [`Locale`].
//!
//! The embedded bundles are compiled in from `messages/*.json`, and the build
//! script audits them so a missing section or key drift between locales fails
//! the build rather than the first request.

mod error;

pub use error::BundleError;

use crate::fs;
use crate::locale::Locale;
use camino::Utf8Path;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::sync::Arc;

/// Sections every bundle must define.
pub const REQUIRED_SECTIONS: [&str; 4] = ["common", "navigation", "dashboard", "auth"];

const EMBEDDED_ES: &str = include_str!("../../messages/es.json");
const EMBEDDED_EN: &str = include_str!("../../messages/en.json");
const EMBEDDED_DE: &str = include_str!("../../messages/de.json");

/// Nested translation data for one locale.
///
/// Cloning is cheap: the underlying JSON object is shared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageBundle {
    root: Arc<Map<String, Value>>,
}

impl MessageBundle {
    /// Return `true` when the bundle has no sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Number of top-level sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Return `true` when `name` is a top-level section object.
    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        self.root.get(name).is_some_and(Value::is_object)
    }

    /// Iterate over the top-level section names.
    #[must_use]
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }

    /// Look up a dotted key such as `navigation.horses`.
    ///
    /// Returns `None` when any segment is missing or the final value is not
    /// a string.
    ///
    /// # Examples
    ///
    /// ```
    /// use paddock::bundle::MessageBundle;
    /// use serde_json::json;
    ///
    /// let bundle = MessageBundle::try_from(json!({"auth": {"login": "Log in"}}))
    ///     .unwrap_or_default();
    /// assert_eq!(bundle.lookup("auth.login"), Some("Log in"));
    /// assert_eq!(bundle.lookup("auth"), None);
    /// ```
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut current = self.root.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        current.as_str()
    }

    /// Look up `key` and substitute `{name}` placeholders from `args`.
    ///
    /// Placeholders without a matching argument are left as written.
    #[must_use]
    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> Option<String> {
        self.lookup(key).map(|template| interpolate(template, args))
    }
}

impl From<Map<String, Value>> for MessageBundle {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            root: Arc::new(map),
        }
    }
}

impl TryFrom<Value> for MessageBundle {
    type Error = Value;

    /// Wrap a JSON object; any other value is handed back unchanged.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self::from(map)),
            other => Err(other),
        }
    }
}

pub(crate) fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let (head, tail) = rest.split_at(start);
        out.push_str(head);
        let after_brace = tail.strip_prefix('{').unwrap_or(tail);
        let Some((name, remainder)) = after_brace.split_once('}') else {
            out.push_str(tail);
            rest = "";
            break;
        };
        match args.iter().find(|(arg, _)| *arg == name.trim()) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = remainder;
    }
    out.push_str(rest);
    out
}

/// Source of per-locale bundles consumed by the resolver.
pub trait MessageCatalog {
    /// Return the bundle for `locale`, if one exists.
    fn bundle(&self, locale: Locale) -> Option<&MessageBundle>;
}

impl<T: MessageCatalog + ?Sized> MessageCatalog for Arc<T> {
    fn bundle(&self, locale: Locale) -> Option<&MessageBundle> {
        (**self).bundle(locale)
    }
}

impl<S: BuildHasher> MessageCatalog for HashMap<Locale, MessageBundle, S> {
    fn bundle(&self, locale: Locale) -> Option<&MessageBundle> {
        self.get(&locale)
    }
}

/// Validated bundles for every supported locale.
#[derive(Debug, Clone)]
pub struct BundleStore {
    es: MessageBundle,
    en: MessageBundle,
    de: MessageBundle,
}

impl BundleStore {
    /// Build the store from the bundles compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns a [`BundleError`] if an embedded bundle fails validation. The
    /// build script audits the same files, so this only fails when the audit
    /// was bypassed.
    pub fn embedded() -> Result<Self, BundleError> {
        Self::from_sources([
            (Locale::Es, EMBEDDED_ES),
            (Locale::En, EMBEDDED_EN),
            (Locale::De, EMBEDDED_DE),
        ])
    }

    /// Build the store from raw JSON documents keyed by locale.
    ///
    /// Later entries for the same locale replace earlier ones.
    ///
    /// # Errors
    ///
    /// Returns a [`BundleError`] when a document does not parse, is not an
    /// object, is empty, lacks a required section, or when a supported locale
    /// has no document.
    pub fn from_sources<'a>(
        sources: impl IntoIterator<Item = (Locale, &'a str)>,
    ) -> Result<Self, BundleError> {
        let mut parsed = BTreeMap::new();
        for (locale, raw) in sources {
            parsed.insert(locale, parse_bundle(locale, raw)?);
        }
        let store = Self {
            es: take(&mut parsed, Locale::Es)?,
            en: take(&mut parsed, Locale::En)?,
            de: take(&mut parsed, Locale::De)?,
        };
        tracing::debug!(
            sections = store.es.len(),
            "message bundles loaded for es, en, de"
        );
        Ok(store)
    }

    /// Load `<code>.json` for every supported locale from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Read`] when a file cannot be read, otherwise
    /// the same validation errors as [`BundleStore::from_sources`].
    pub fn load_dir(dir: &Utf8Path) -> Result<Self, BundleError> {
        let handle = fs::open_dir(dir).map_err(|source| BundleError::Read {
            locale: Locale::Es,
            path: dir.to_owned(),
            source,
        })?;
        let mut documents = Vec::with_capacity(Locale::ALL.len());
        for locale in Locale::ALL {
            let file_name = format!("{locale}.json");
            let raw = handle
                .read_to_string(&file_name)
                .map_err(|source| BundleError::Read {
                    locale,
                    path: dir.join(&file_name),
                    source,
                })?;
            documents.push((locale, raw));
        }
        Self::from_sources(
            documents
                .iter()
                .map(|(locale, raw)| (*locale, raw.as_str())),
        )
    }

    /// Return the bundle for `locale`.
    #[must_use]
    pub const fn get(&self, locale: Locale) -> &MessageBundle {
        match locale {
            Locale::Es => &self.es,
            Locale::En => &self.en,
            Locale::De => &self.de,
        }
    }
}

impl MessageCatalog for BundleStore {
    fn bundle(&self, locale: Locale) -> Option<&MessageBundle> {
        Some(self.get(locale))
    }
}

fn take(
    parsed: &mut BTreeMap<Locale, MessageBundle>,
    locale: Locale,
) -> Result<MessageBundle, BundleError> {
    parsed
        .remove(&locale)
        .ok_or(BundleError::MissingLocale { locale })
}

fn parse_bundle(locale: Locale, raw: &str) -> Result<MessageBundle, BundleError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|source| BundleError::Parse { locale, source })?;
    let bundle =
        MessageBundle::try_from(value).map_err(|_| BundleError::NotAnObject { locale })?;
    if bundle.is_empty() {
        return Err(BundleError::Empty { locale });
    }
    if let Some(section) = REQUIRED_SECTIONS
        .into_iter()
        .find(|section| !bundle.has_section(section))
    {
        return Err(BundleError::MissingSection { locale, section });
    }
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Hola {name}", &[("name", "Luna")], "Hola Luna")]
    #[case("{count} tareas para {name}", &[("name", "Ana"), ("count", "3")], "3 tareas para Ana")]
    #[case("Sin {missing}", &[], "Sin {missing}")]
    #[case("Abierto {", &[], "Abierto {")]
    #[case("{ name }!", &[("name", "Trueno")], "Trueno!")]
    fn interpolate_substitutes_known_placeholders(
        #[case] template: &str,
        #[case] args: &[(&str, &str)],
        #[case] expected: &str,
    ) {
        assert_eq!(interpolate(template, args), expected);
    }

    #[test]
    fn embedded_store_covers_every_locale() {
        let store = BundleStore::embedded();
        assert!(store.is_ok(), "embedded bundles must validate: {store:?}");
        if let Ok(store) = store {
            for locale in Locale::ALL {
                assert!(!store.get(locale).is_empty());
            }
        }
    }

    #[test]
    fn missing_locale_is_reported() {
        let minimal = r#"{"common":{},"navigation":{},"dashboard":{},"auth":{}}"#;
        let result = BundleStore::from_sources([(Locale::Es, minimal), (Locale::En, minimal)]);
        assert!(matches!(
            result,
            Err(BundleError::MissingLocale { locale: Locale::De })
        ));
    }
}
