//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! loads settings and executes the parsed command. Output goes to any
//! [`Write`] sink so tests can capture it.

use crate::bundle::BundleStore;
use crate::cli::{Cli, CookieArgs, Commands};
use crate::cookie::CookieJar;
use crate::locale::Locale;
use crate::resolver::LocaleResolver;
use crate::settings::{LocaleSettings, SettingsOverrides};
use crate::translate::Translator;
use anyhow::{Context, Result};
use camino::Utf8Path;
use std::io::{self, Write};

/// Execute the parsed [`Cli`] against the process environment and stdout.
///
/// # Errors
///
/// Returns an error if settings fail to load, bundles fail validation, or
/// output cannot be written.
pub fn run(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&cli.command, &settings, &mut out)
}

/// Merge defaults, the settings file and the environment with the CLI
/// overrides.
///
/// # Errors
///
/// Returns an error when a configuration layer is invalid.
pub fn load_settings(cli: &Cli) -> Result<LocaleSettings> {
    LocaleSettings::assemble(cli.config.as_deref(), &settings_overrides(cli))
        .context("load locale settings")
}

/// Collect the settings supplied as command-line flags.
#[must_use]
pub const fn settings_overrides(cli: &Cli) -> SettingsOverrides {
    SettingsOverrides {
        default_locale: cli.default_locale,
    }
}

/// Execute `command`, writing its report to `out`.
///
/// # Errors
///
/// Returns an error if bundles fail validation or `out` rejects a write.
pub fn execute(
    command: &Commands,
    settings: &LocaleSettings,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Commands::Resolve(cookies) => handle_resolve(cookies, settings, out),
        Commands::Translate { key, cookies, args } => {
            handle_translate(key, cookies, args, settings, out)
        }
        Commands::SetCookie { locale, secure } => {
            writeln!(out, "{}", settings.cookie_for(*locale, *secure))
                .context("write Set-Cookie value")
        }
        Commands::Check { dir } => handle_check(dir.as_deref(), out),
    }
}

fn build_resolver(settings: &LocaleSettings) -> Result<LocaleResolver<BundleStore>> {
    let store = BundleStore::embedded().context("load embedded message bundles")?;
    LocaleResolver::new(store, settings.resolver_settings())
        .context("check the default locale bundle")
}

fn cookie_jar(cookies: &CookieArgs) -> CookieJar {
    cookies
        .cookie
        .as_deref()
        .map(CookieJar::parse)
        .unwrap_or_default()
}

fn handle_resolve(
    cookies: &CookieArgs,
    settings: &LocaleSettings,
    out: &mut impl Write,
) -> Result<()> {
    let resolver = build_resolver(settings)?;
    let resolution = resolver.resolve(&cookie_jar(cookies));
    writeln!(
        out,
        "{}\t{}\t{}",
        resolution.locale,
        resolution.locale.native_name(),
        resolution.source.as_str()
    )
    .context("write resolution")
}

fn handle_translate(
    key: &str,
    cookies: &CookieArgs,
    args: &[(String, String)],
    settings: &LocaleSettings,
    out: &mut impl Write,
) -> Result<()> {
    let resolver = build_resolver(settings)?;
    let resolution = resolver.resolve(&cookie_jar(cookies));
    let translator =
        Translator::for_resolution(&resolution, resolver.catalog(), settings.default_locale);
    let borrowed: Vec<(&str, &str)> = args
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();
    tracing::debug!(key, locale = %translator.locale(), "rendering message");
    writeln!(out, "{}", translator.message(key, &borrowed)).context("write message")
}

fn handle_check(dir: Option<&Utf8Path>, out: &mut impl Write) -> Result<()> {
    let store = match dir {
        Some(path) => {
            BundleStore::load_dir(path).with_context(|| format!("load message bundles from {path}"))?
        }
        None => BundleStore::embedded().context("load embedded message bundles")?,
    };
    for locale in Locale::ALL {
        let bundle = store.get(locale);
        writeln!(out, "{locale}\tok\t{} sections", bundle.len())
            .context("write bundle report")?;
    }
    Ok(())
}
