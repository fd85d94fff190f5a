//! Layered configuration for locale handling.
//!
//! Settings are merged with `OrthoConfig` from four layers, lowest first:
//! built-in defaults, a TOML file, `PADDOCK_*` environment variables, and
//! command-line overrides. The file is the one passed with `--config`, or
//! else the one discovered through `PADDOCK_CONFIG_PATH` and the standard
//! configuration locations. The merged result is validated before use.

use crate::cookie::{
    LEGACY_LOCALE_COOKIE, LOCALE_COOKIE_MAX_AGE, LocaleCookie, PREFERRED_LOCALE_COOKIE,
};
use crate::fs;
use crate::locale::{DEFAULT_LOCALE, Locale};
use crate::resolver::ResolverSettings;
use camino::{Utf8Path, Utf8PathBuf};
use miette::Diagnostic;
use ortho_config::declarative::LayerComposition;
use ortho_config::figment::{Figment, providers::Env};
use ortho_config::uncased::Uncased;
use ortho_config::{
    ConfigDiscovery, MergeComposer, OrthoConfig, OrthoError, OrthoMergeExt, OrthoResult,
    sanitize_value,
};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming a TOML settings file.
pub const CONFIG_PATH_ENV: &str = "PADDOCK_CONFIG_PATH";
/// Environment variable overriding the default locale.
pub const DEFAULT_LOCALE_ENV: &str = "PADDOCK_DEFAULT_LOCALE";
/// Environment variable overriding the pre-reload delay in milliseconds.
pub const RELOAD_DELAY_ENV: &str = "PADDOCK_RELOAD_DELAY_MS";

const ENV_PREFIX: &str = "PADDOCK_";
const CONFIG_PATH_KEY: &str = "config_path";

/// Accepted pre-reload delays, in milliseconds.
pub const RELOAD_DELAY_RANGE_MS: RangeInclusive<u64> = 50..=1000;

const DEFAULT_RELOAD_DELAY_MS: u64 = 150;

/// How the client makes rendered content follow a locale change.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshStrategy {
    /// Persist the preference, then reload so the server renders again.
    #[default]
    Reload,
    /// Re-render from the client-side bundle without reloading.
    InPlace,
}

/// Errors raised while loading or validating settings.
#[derive(Debug, Error, Diagnostic)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings file {path}")]
    #[diagnostic(code(paddock::settings::read))]
    Read {
        /// Path that was attempted.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML.
    #[error("settings file {path} is not valid TOML")]
    #[diagnostic(code(paddock::settings::parse))]
    Parse {
        /// Path of the document.
        path: Utf8PathBuf,
        /// Parser error.
        #[source]
        source: toml::de::Error,
    },

    /// The configuration layers could not be merged into settings.
    #[error("failed to merge locale settings")]
    #[diagnostic(
        code(paddock::settings::merge),
        help("check the settings file and the PADDOCK_* environment variables")
    )]
    Merge {
        /// Merge failure reported by the layering engine.
        #[source]
        source: Arc<OrthoError>,
    },

    /// A cookie name is not an HTTP token.
    #[error("'{name}' is not a valid cookie name")]
    #[diagnostic(
        code(paddock::settings::cookie_name),
        help("cookie names must be non-empty and contain no separators or whitespace")
    )]
    InvalidCookieName {
        /// Rejected name.
        name: String,
    },

    /// The cookie lifetime is zero.
    #[error("cookie max-age must be greater than zero")]
    #[diagnostic(code(paddock::settings::max_age))]
    ZeroMaxAge,

    /// The reload delay is outside [`RELOAD_DELAY_RANGE_MS`].
    #[error("reload delay {value}ms is outside the accepted 50..=1000ms window")]
    #[diagnostic(code(paddock::settings::reload_delay))]
    ReloadDelayOutOfRange {
        /// Rejected delay in milliseconds.
        value: u64,
    },
}

/// Locale handling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, OrthoConfig)]
#[serde(default, deny_unknown_fields)]
#[ortho_config(prefix = "PADDOCK")]
pub struct LocaleSettings {
    /// Locale used when a request carries no usable preference.
    #[ortho_config(default = DEFAULT_LOCALE)]
    pub default_locale: Locale,
    /// Name of the preference cookie.
    #[ortho_config(default = default_cookie_name())]
    pub cookie_name: String,
    /// Older cookie consulted when the preference cookie is absent.
    #[ortho_config(default = default_legacy_cookie_name())]
    pub legacy_cookie_name: String,
    /// Whether the legacy cookie is consulted at all.
    #[ortho_config(default = true)]
    pub consult_legacy_cookie: bool,
    /// Lifetime of the preference cookie in seconds.
    #[ortho_config(default = LOCALE_COOKIE_MAX_AGE.as_secs())]
    pub cookie_max_age_secs: u64,
    /// Delay between persisting a change and reloading, in milliseconds.
    #[ortho_config(default = DEFAULT_RELOAD_DELAY_MS)]
    pub reload_delay_ms: u64,
    /// How the client refreshes after a change.
    #[ortho_config(default = RefreshStrategy::Reload)]
    pub refresh: RefreshStrategy,
}

fn default_cookie_name() -> String {
    PREFERRED_LOCALE_COOKIE.to_owned()
}

fn default_legacy_cookie_name() -> String {
    LEGACY_LOCALE_COOKIE.to_owned()
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE,
            cookie_name: default_cookie_name(),
            legacy_cookie_name: default_legacy_cookie_name(),
            consult_legacy_cookie: true,
            cookie_max_age_secs: LOCALE_COOKIE_MAX_AGE.as_secs(),
            reload_delay_ms: DEFAULT_RELOAD_DELAY_MS,
            refresh: RefreshStrategy::Reload,
        }
    }
}

/// Values supplied on the command line, applied over every other layer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettingsOverrides {
    /// Default locale from `--default-locale`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_locale: Option<Locale>,
}

impl LocaleSettings {
    /// Merge defaults, the settings file, the environment, and `overrides`.
    ///
    /// `config` takes precedence over file discovery through
    /// [`CONFIG_PATH_ENV`]. The merged result is validated.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] when the explicit file cannot be read or
    /// parsed, a layer fails to merge, or the merged settings are invalid.
    pub fn assemble(
        config: Option<&Utf8Path>,
        overrides: &SettingsOverrides,
    ) -> Result<Self, SettingsError> {
        let mut errors = Vec::new();
        let mut composer = MergeComposer::with_capacity(4);

        match sanitize_value(&Self::default()) {
            Ok(value) => composer.push_defaults(value),
            Err(err) => errors.push(err),
        }

        if let Some(path) = config {
            composer.push_file(read_file_layer(path)?, None);
        } else {
            let mut file_layers = config_discovery().compose_layers();
            errors.append(&mut file_layers.required_errors);
            if file_layers.value.is_empty() {
                errors.append(&mut file_layers.optional_errors);
            }
            for layer in file_layers.value {
                composer.push_layer(layer);
            }
        }

        match environment_layer() {
            Ok(value) => composer.push_environment(value),
            Err(err) => errors.push(err),
        }

        match sanitize_value(overrides) {
            Ok(value) if !is_empty_value(&value) => composer.push_cli(value),
            Ok(_) => {}
            Err(err) => errors.push(err),
        }

        let composition = LayerComposition::new(composer.layers(), errors);
        let settings = composition
            .into_merge_result(Self::merge_from_layers)
            .map_err(|source| SettingsError::Merge { source })?;
        tracing::debug!(?settings, "merged locale settings");
        settings.validate()?;
        Ok(settings)
    }

    /// Merge layers that were composed by the caller, then validate.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Merge`] when the layers do not describe
    /// valid settings, or the validation error of the merged result.
    pub fn from_composer(composer: MergeComposer) -> Result<Self, SettingsError> {
        let settings = Self::merge_from_layers(composer.layers())
            .map_err(|source| SettingsError::Merge { source })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the settings for values that would produce broken cookies or
    /// an unusable reload timer.
    ///
    /// # Errors
    ///
    /// Returns the first [`SettingsError`] found.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let legacy = self
            .consult_legacy_cookie
            .then_some(&self.legacy_cookie_name);
        for name in std::iter::once(&self.cookie_name).chain(legacy) {
            if !is_cookie_token(name) {
                return Err(SettingsError::InvalidCookieName { name: name.clone() });
            }
        }
        if self.cookie_max_age_secs == 0 {
            return Err(SettingsError::ZeroMaxAge);
        }
        if !RELOAD_DELAY_RANGE_MS.contains(&self.reload_delay_ms) {
            return Err(SettingsError::ReloadDelayOutOfRange {
                value: self.reload_delay_ms,
            });
        }
        Ok(())
    }

    /// Settings consumed by the server-side resolver.
    #[must_use]
    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            cookie_name: self.cookie_name.clone(),
            legacy_cookie_name: self
                .consult_legacy_cookie
                .then(|| self.legacy_cookie_name.clone()),
            default_locale: self.default_locale,
        }
    }

    /// Delay between persisting a change and reloading.
    #[must_use]
    pub const fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.reload_delay_ms)
    }

    /// Lifetime of the preference cookie.
    #[must_use]
    pub const fn cookie_max_age(&self) -> Duration {
        Duration::from_secs(self.cookie_max_age_secs)
    }

    /// Build the preference cookie for `locale` with these settings.
    #[must_use]
    pub fn cookie_for(&self, locale: Locale, secure: bool) -> LocaleCookie {
        LocaleCookie::new(locale)
            .named(self.cookie_name.clone())
            .max_age(self.cookie_max_age())
            .secure(secure)
    }
}

fn read_file_layer(path: &Utf8Path) -> Result<serde_json::Value, SettingsError> {
    let raw = fs::read_file(path).map_err(|source| SettingsError::Read {
        path: path.to_owned(),
        source,
    })?;
    tracing::debug!(%path, "loaded settings file");
    toml::from_str(&raw).map_err(|source| SettingsError::Parse {
        path: path.to_owned(),
        source,
    })
}

fn config_discovery() -> ConfigDiscovery {
    ConfigDiscovery::builder("paddock")
        .env_var(CONFIG_PATH_ENV)
        .build()
}

/// Read `PADDOCK_*` variables, leaving out the settings file path.
fn environment_layer() -> OrthoResult<serde_json::Value> {
    let provider = Env::prefixed(ENV_PREFIX)
        .map(|key| Uncased::new(key.as_str().to_ascii_uppercase()))
        .split("__");
    let mut value = Figment::from(provider)
        .extract::<serde_json::Value>()
        .into_ortho_merge()?;
    if let serde_json::Value::Object(map) = &mut value {
        map.retain(|key, _| !key.eq_ignore_ascii_case(CONFIG_PATH_KEY));
    }
    Ok(value)
}

/// The merge pipeline treats an empty object as "no overrides".
fn is_empty_value(value: &serde_json::Value) -> bool {
    matches!(value, serde_json::Value::Object(map) if map.is_empty())
}

fn is_cookie_token(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || matches!(
                    c,
                    '!' | '#'
                        | '$'
                        | '%'
                        | '&'
                        | '\''
                        | '*'
                        | '+'
                        | '-'
                        | '.'
                        | '^'
                        | '_'
                        | '`'
                        | '|'
                        | '~'
                )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("preferred-locale", true)]
    #[case("locale", true)]
    #[case("", false)]
    #[case("bad name", false)]
    #[case("semi;colon", false)]
    #[case("quote\"d", false)]
    fn cookie_token_rules(#[case] name: &str, #[case] valid: bool) {
        assert_eq!(is_cookie_token(name), valid);
    }

    #[test]
    fn defaults_validate() {
        assert!(LocaleSettings::default().validate().is_ok());
    }

    #[test]
    fn empty_overrides_are_skipped() {
        let value = sanitize_value(&SettingsOverrides::default())
            .unwrap_or_else(|err| panic!("overrides should serialise: {err}"));
        assert!(is_empty_value(&value));
        assert!(!is_empty_value(&json!({"default_locale": "de"})));
    }

    #[test]
    fn disabled_legacy_cookie_is_not_validated_or_resolved() {
        let settings = LocaleSettings {
            legacy_cookie_name: String::new(),
            consult_legacy_cookie: false,
            ..LocaleSettings::default()
        };
        assert!(settings.validate().is_ok());
        assert_eq!(settings.resolver_settings().legacy_cookie_name, None);
    }
}
