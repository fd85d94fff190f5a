//! Supported UI locales.
//!
//! The application renders Spanish, English, and German copy. Any other
//! value arriving from a cookie or configuration is treated as absent and
//! callers fall back to [`DEFAULT_LOCALE`].

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A locale the application ships a message bundle for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Spanish.
    Es,
    /// English.
    En,
    /// German.
    De,
}

/// Locale used whenever no valid preference is available.
pub const DEFAULT_LOCALE: Locale = Locale::Es;

impl Locale {
    /// Every supported locale, in switcher order.
    pub const ALL: [Self; 3] = [Self::Es, Self::En, Self::De];

    /// Return the lowercase locale code written to cookies.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
            Self::De => "de",
        }
    }

    /// Name of the language in its own locale, for the language switcher.
    #[must_use]
    pub const fn native_name(self) -> &'static str {
        match self {
            Self::Es => "Español",
            Self::En => "English",
            Self::De => "Deutsch",
        }
    }

    /// Value for the `lang` attribute of the rendered document.
    #[must_use]
    pub const fn html_lang(self) -> &'static str {
        self.as_str()
    }

    /// Match `raw` against the supported codes.
    ///
    /// Matching is exact and case-sensitive; only surrounding whitespace is
    /// ignored. Region tags such as `en-US` are not supported values.
    ///
    /// # Examples
    ///
    /// ```
    /// use paddock::locale::Locale;
    ///
    /// assert_eq!(Locale::parse_supported("de"), Some(Locale::De));
    /// assert_eq!(Locale::parse_supported(" en "), Some(Locale::En));
    /// assert_eq!(Locale::parse_supported("fr"), None);
    /// assert_eq!(Locale::parse_supported("EN"), None);
    /// ```
    #[must_use]
    pub fn parse_supported(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|locale| locale.as_str() == trimmed)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a string names a locale outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("unsupported locale '{value}'")]
#[diagnostic(
    code(paddock::locale::unsupported),
    help("supported locales are: es, en, de")
)]
pub struct UnsupportedLocale {
    /// The rejected input.
    pub value: String,
}

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_supported(s).ok_or_else(|| UnsupportedLocale {
            value: s.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Locale::Es, "es", "Español")]
    #[case(Locale::En, "en", "English")]
    #[case(Locale::De, "de", "Deutsch")]
    fn codes_and_names_are_stable(
        #[case] locale: Locale,
        #[case] code: &str,
        #[case] name: &str,
    ) {
        assert_eq!(locale.as_str(), code);
        assert_eq!(locale.to_string(), code);
        assert_eq!(locale.native_name(), name);
        assert_eq!(locale.html_lang(), code);
        assert_eq!(code.parse::<Locale>(), Ok(locale));
    }

    #[rstest]
    #[case("fr")]
    #[case("")]
    #[case("es-ES")]
    #[case("Es")]
    fn unsupported_values_are_rejected(#[case] raw: &str) {
        assert_eq!(Locale::parse_supported(raw), None);
        assert!(raw.parse::<Locale>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_codes() {
        let encoded = serde_json::to_string(&Locale::De).unwrap_or_default();
        assert_eq!(encoded, "\"de\"");
        let decoded: Result<Locale, _> = serde_json::from_str("\"en\"");
        assert_eq!(decoded.ok(), Some(Locale::En));
    }

    #[test]
    fn default_is_spanish() {
        assert_eq!(DEFAULT_LOCALE, Locale::Es);
    }
}
