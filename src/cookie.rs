//! Cookie parsing and `Set-Cookie` rendering for the locale preference.
//!
//! The locale preference is the only state that survives between requests.
//! The server reads it from the `Cookie` request header and the client writes
//! it using the attributes rendered by [`LocaleCookie`].

use crate::locale::Locale;
use http::header::{COOKIE, InvalidHeaderValue};
use http::{HeaderMap, HeaderValue, Uri};
use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;
use std::time::Duration;

/// Name of the cookie holding the preferred locale.
pub const PREFERRED_LOCALE_COOKIE: &str = "preferred-locale";

/// Older cookie name still honoured when the preferred cookie is absent.
pub const LEGACY_LOCALE_COOKIE: &str = "locale";

/// Lifetime of the locale cookie: one year.
pub const LOCALE_COOKIE_MAX_AGE: Duration = Duration::from_secs(31_536_000);

/// Key used for the browser-local fallback copy of the preference.
pub const LOCAL_STORAGE_KEY: &str = "preferred-locale";

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Read-only access to the cookies sent with a request.
pub trait CookieSource {
    /// Return the value of the cookie called `name`, if present.
    fn cookie(&self, name: &str) -> Option<&str>;
}

impl<S: BuildHasher> CookieSource for HashMap<String, String, S> {
    fn cookie(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl<T: CookieSource + ?Sized> CookieSource for &T {
    fn cookie(&self, name: &str) -> Option<&str> {
        (**self).cookie(name)
    }
}

/// Cookies parsed from one or more `Cookie` request headers.
///
/// Pairs keep their header order. When a name repeats, the first occurrence
/// wins, matching the order in which browsers send the most specific match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    pairs: Vec<(String, String)>,
}

impl CookieJar {
    /// Parse a single `Cookie` header value such as `a=b; c=d`.
    ///
    /// Malformed pairs (no `=` or an empty name) are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use paddock::cookie::{CookieJar, CookieSource};
    ///
    /// let jar = CookieJar::parse("theme=dark; preferred-locale=en");
    /// assert_eq!(jar.cookie("preferred-locale"), Some("en"));
    /// assert_eq!(jar.cookie("missing"), None);
    /// ```
    #[must_use]
    pub fn parse(header: &str) -> Self {
        let mut jar = Self::default();
        jar.extend_from_header(header);
        jar
    }

    /// Collect every `Cookie` header in `headers`.
    ///
    /// Header values that are not valid UTF-8 are ignored.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut jar = Self::default();
        for value in headers.get_all(COOKIE) {
            match value.to_str() {
                Ok(text) => jar.extend_from_header(text),
                Err(err) => tracing::debug!(%err, "skipping non UTF-8 cookie header"),
            }
        }
        jar
    }

    /// Number of parsed cookie pairs, duplicates included.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Return `true` when no cookies were parsed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn extend_from_header(&mut self, header: &str) {
        for pair in header.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            self.pairs
                .push((name.to_owned(), unquote(value.trim()).to_owned()));
        }
    }
}

impl CookieSource for CookieJar {
    fn cookie(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, value)| value.as_str())
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}

/// `SameSite` attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    /// Sent on top-level navigations and same-site requests.
    Lax,
    /// Sent on same-site requests only.
    Strict,
}

impl SameSite {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Lax => "Lax",
            Self::Strict => "Strict",
        }
    }
}

/// A locale preference cookie ready to be written.
///
/// The [`fmt::Display`] implementation renders the `Set-Cookie` wire form:
///
/// ```
/// use paddock::cookie::LocaleCookie;
/// use paddock::locale::Locale;
///
/// let cookie = LocaleCookie::new(Locale::De).secure(true);
/// assert_eq!(
///     cookie.to_string(),
///     "preferred-locale=de; Path=/; Max-Age=31536000; SameSite=Lax; Secure",
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleCookie {
    name: String,
    locale: Locale,
    path: String,
    max_age: Duration,
    same_site: SameSite,
    secure: bool,
}

impl LocaleCookie {
    /// Build the default `preferred-locale` cookie for `locale`.
    #[must_use]
    pub fn new(locale: Locale) -> Self {
        Self {
            name: PREFERRED_LOCALE_COOKIE.to_owned(),
            locale,
            path: String::from("/"),
            max_age: LOCALE_COOKIE_MAX_AGE,
            same_site: SameSite::Lax,
            secure: false,
        }
    }

    /// Override the cookie name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Override the cookie lifetime.
    #[must_use]
    pub const fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Override the `SameSite` attribute.
    #[must_use]
    pub const fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    /// Set whether the `Secure` attribute is emitted.
    #[must_use]
    pub const fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Cookie name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Locale carried by the cookie.
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Whether the `Secure` attribute is set.
    #[must_use]
    pub const fn is_secure(&self) -> bool {
        self.secure
    }

    /// Render the cookie as a `Set-Cookie` header value.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHeaderValue`] when the configured cookie name holds
    /// characters that are not allowed in a header.
    pub fn to_header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&self.to_string())
    }
}

impl fmt::Display for LocaleCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}; Path={}; Max-Age={}; SameSite={}",
            self.name,
            self.locale,
            self.path,
            self.max_age.as_secs(),
            self.same_site.as_str()
        )?;
        if self.secure {
            f.write_str("; Secure")?;
        }
        Ok(())
    }
}

/// Decide whether a request arrived over HTTPS.
///
/// The URI scheme is authoritative when present; otherwise the
/// `X-Forwarded-Proto` header set by a terminating proxy is consulted.
#[must_use]
pub fn is_secure_request(uri: &Uri, headers: &HeaderMap) -> bool {
    if let Some(scheme) = uri.scheme_str() {
        return scheme.eq_ignore_ascii_case("https");
    }
    headers
        .get(FORWARDED_PROTO)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("preferred-locale=en", Some("en"))]
    #[case("  preferred-locale = de ;theme=dark", Some("de"))]
    #[case("preferred-locale=\"es\"", Some("es"))]
    #[case("theme=dark", None)]
    #[case("", None)]
    #[case("preferred-locale", None)]
    fn parse_reads_preferred_cookie(#[case] header: &str, #[case] expected: Option<&str>) {
        let jar = CookieJar::parse(header);
        assert_eq!(jar.cookie(PREFERRED_LOCALE_COOKIE), expected);
    }

    #[test]
    fn first_duplicate_wins() {
        let jar = CookieJar::parse("preferred-locale=en; preferred-locale=de");
        assert_eq!(jar.cookie(PREFERRED_LOCALE_COOKIE), Some("en"));
        assert_eq!(jar.len(), 2);
    }

    #[test]
    fn malformed_pairs_are_skipped() {
        let jar = CookieJar::parse("=orphan; ; novalue; locale=de");
        assert_eq!(jar.len(), 1);
        assert_eq!(jar.cookie(LEGACY_LOCALE_COOKIE), Some("de"));
    }

    #[test]
    fn insecure_cookie_omits_secure_attribute() {
        let rendered = LocaleCookie::new(Locale::En).to_string();
        assert_eq!(
            rendered,
            "preferred-locale=en; Path=/; Max-Age=31536000; SameSite=Lax"
        );
    }

    #[test]
    fn secure_cookie_renders_as_header_value() {
        let value = LocaleCookie::new(Locale::De)
            .secure(true)
            .to_header_value()
            .unwrap_or_else(|err| panic!("cookie should be a valid header: {err}"));
        assert_eq!(
            value.to_str().ok(),
            Some("preferred-locale=de; Path=/; Max-Age=31536000; SameSite=Lax; Secure")
        );
    }

    #[test]
    fn strict_same_site_is_rendered() {
        let rendered = LocaleCookie::new(Locale::Es)
            .same_site(SameSite::Strict)
            .secure(true)
            .to_string();
        assert_eq!(
            rendered,
            "preferred-locale=es; Path=/; Max-Age=31536000; SameSite=Strict; Secure"
        );
    }

    #[test]
    fn invalid_cookie_name_is_not_a_header_value() {
        let cookie = LocaleCookie::new(Locale::Es).named("bad\nname");
        assert!(cookie.to_header_value().is_err());
    }

    #[test]
    fn forwarded_proto_marks_request_secure() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_PROTO, HeaderValue::from_static("https, http"));
        assert!(is_secure_request(&Uri::from_static("/dashboard"), &headers));
        assert!(!is_secure_request(
            &Uri::from_static("http://stable.local/"),
            &headers
        ));
    }
}
