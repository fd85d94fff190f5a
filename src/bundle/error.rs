//! Error types raised while constructing the message bundle store.

use crate::locale::Locale;
use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Integrity failures detected when loading message bundles.
///
/// Every variant is raised at construction time so a broken bundle never
/// reaches request handling.
#[derive(Debug, Error, Diagnostic)]
pub enum BundleError {
    /// Bundle data could not be read from disk.
    #[error("failed to read the {locale} message bundle from {path}")]
    #[diagnostic(code(paddock::bundle::read))]
    Read {
        /// Locale whose bundle was being read.
        locale: Locale,
        /// Path that was attempted.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Bundle data is not valid JSON.
    #[error("the {locale} message bundle is not valid JSON")]
    #[diagnostic(code(paddock::bundle::parse))]
    Parse {
        /// Locale whose bundle failed to parse.
        locale: Locale,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The top-level JSON value is not an object.
    #[error("the {locale} message bundle must be a JSON object of sections")]
    #[diagnostic(code(paddock::bundle::not_an_object))]
    NotAnObject {
        /// Offending locale.
        locale: Locale,
    },

    /// The bundle holds no sections at all.
    #[error("the {locale} message bundle is empty")]
    #[diagnostic(code(paddock::bundle::empty))]
    Empty {
        /// Offending locale.
        locale: Locale,
    },

    /// A required top-level section is missing or is not an object.
    #[error("the {locale} message bundle lacks the required '{section}' section")]
    #[diagnostic(
        code(paddock::bundle::missing_section),
        help("every bundle must define common, navigation, dashboard and auth")
    )]
    MissingSection {
        /// Offending locale.
        locale: Locale,
        /// Name of the missing section.
        section: &'static str,
    },

    /// No bundle was supplied for a supported locale.
    #[error("no message bundle was supplied for {locale}")]
    #[diagnostic(code(paddock::bundle::missing_locale))]
    MissingLocale {
        /// Locale without a bundle.
        locale: Locale,
    },
}
