//! Server-side locale resolution.
//!
//! [`LocaleResolver`] maps the cookies of an incoming request to the locale
//! a page is rendered in and the bundle it is rendered with. Resolution is
//! read-only and never fails: every unusable input degrades to the
//! configured default locale. Construction checks that the default locale
//! itself has a usable bundle, so a degraded request still renders text.

use crate::bundle::{BundleError, MessageBundle, MessageCatalog};
use crate::cookie::{CookieJar, CookieSource, LEGACY_LOCALE_COOKIE, PREFERRED_LOCALE_COOKIE};
use crate::locale::{DEFAULT_LOCALE, Locale};
use http::HeaderMap;

/// Where a resolved locale came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleSource {
    /// The preferred-locale cookie held a supported value.
    PreferredCookie,
    /// The legacy cookie held a supported value.
    LegacyCookie,
    /// No usable preference was found, or its bundle was unusable.
    Default,
}

impl LocaleSource {
    /// Short label used in logs and CLI output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreferredCookie => "preferred-cookie",
            Self::LegacyCookie => "legacy-cookie",
            Self::Default => "default",
        }
    }
}

/// Locale and bundle chosen for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Locale the page is rendered in.
    pub locale: Locale,
    /// Bundle for [`Resolution::locale`].
    pub messages: MessageBundle,
    /// How the locale was chosen.
    pub source: LocaleSource,
}

/// Cookie names and default consulted by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Primary cookie name.
    pub cookie_name: String,
    /// Cookie consulted when the primary cookie is absent.
    pub legacy_cookie_name: Option<String>,
    /// Locale used when no usable preference exists.
    pub default_locale: Locale,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            cookie_name: PREFERRED_LOCALE_COOKIE.to_owned(),
            legacy_cookie_name: Some(LEGACY_LOCALE_COOKIE.to_owned()),
            default_locale: DEFAULT_LOCALE,
        }
    }
}

/// Resolves request cookies to a locale and message bundle.
///
/// # Examples
///
/// ```
/// use paddock::bundle::BundleStore;
/// use paddock::cookie::CookieJar;
/// use paddock::locale::Locale;
/// use paddock::resolver::LocaleResolver;
///
/// # fn main() -> Result<(), paddock::bundle::BundleError> {
/// let resolver = LocaleResolver::with_defaults(BundleStore::embedded()?)?;
/// let resolution = resolver.resolve(&CookieJar::parse("preferred-locale=en"));
/// assert_eq!(resolution.locale, Locale::En);
/// assert!(!resolution.messages.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocaleResolver<C> {
    catalog: C,
    settings: ResolverSettings,
    default_messages: MessageBundle,
}

impl<C: MessageCatalog> LocaleResolver<C> {
    /// Create a resolver over `catalog`.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::MissingLocale`] or [`BundleError::Empty`] when
    /// `catalog` has no usable bundle for the configured default locale.
    pub fn new(catalog: C, settings: ResolverSettings) -> Result<Self, BundleError> {
        let locale = settings.default_locale;
        let default_messages = match catalog.bundle(locale) {
            None => return Err(BundleError::MissingLocale { locale }),
            Some(bundle) if bundle.is_empty() => return Err(BundleError::Empty { locale }),
            Some(bundle) => bundle.clone(),
        };
        Ok(Self {
            catalog,
            settings,
            default_messages,
        })
    }

    /// Create a resolver using the standard cookie names and default locale.
    ///
    /// # Errors
    ///
    /// Fails like [`LocaleResolver::new`].
    pub fn with_defaults(catalog: C) -> Result<Self, BundleError> {
        Self::new(catalog, ResolverSettings::default())
    }

    /// Borrow the underlying catalogue.
    #[must_use]
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Borrow the resolver settings.
    #[must_use]
    pub const fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Resolve the locale and bundle for a request's cookies.
    ///
    /// A requested locale whose bundle is missing or empty is reported as
    /// the default locale so the reported locale always matches the
    /// rendered messages.
    #[must_use]
    pub fn resolve(&self, cookies: &impl CookieSource) -> Resolution {
        let (locale, source) = self.requested_locale(cookies);
        if let Some(messages) = self.usable_bundle(locale) {
            tracing::debug!(%locale, ?source, "resolved request locale");
            return Resolution {
                locale,
                messages: messages.clone(),
                source,
            };
        }
        tracing::warn!(
            %locale,
            default = %self.settings.default_locale,
            "message bundle missing or empty; rendering with the default locale"
        );
        self.default_resolution()
    }

    /// Resolve using every `Cookie` header of an HTTP request.
    #[must_use]
    pub fn resolve_headers(&self, headers: &HeaderMap) -> Resolution {
        self.resolve(&CookieJar::from_headers(headers))
    }

    fn requested_locale(&self, cookies: &impl CookieSource) -> (Locale, LocaleSource) {
        let default = (self.settings.default_locale, LocaleSource::Default);
        if let Some(raw) = cookies.cookie(&self.settings.cookie_name) {
            return Locale::parse_supported(raw).map_or_else(
                || {
                    tracing::debug!(value = raw, "ignoring unsupported locale cookie");
                    default
                },
                |locale| (locale, LocaleSource::PreferredCookie),
            );
        }
        self.settings
            .legacy_cookie_name
            .as_deref()
            .and_then(|name| cookies.cookie(name))
            .and_then(Locale::parse_supported)
            .map_or(default, |locale| (locale, LocaleSource::LegacyCookie))
    }

    fn usable_bundle(&self, locale: Locale) -> Option<&MessageBundle> {
        self.catalog
            .bundle(locale)
            .filter(|bundle| !bundle.is_empty())
    }

    fn default_resolution(&self) -> Resolution {
        Resolution {
            locale: self.settings.default_locale,
            messages: self.default_messages.clone(),
            source: LocaleSource::Default,
        }
    }
}
