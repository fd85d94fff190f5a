//! Command line interface definition using clap.
//!
//! The binary exposes the locale core for operators: resolving a cookie
//! header the way the server would, rendering a message, printing the
//! `Set-Cookie` value the client writes, and checking bundle integrity.

use crate::locale::Locale;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

mod parsing;

use parsing::parse_message_arg;

/// Locale resolution and bundle tooling for the stable management app.
#[derive(Debug, Parser)]
#[command(name = "paddock", author, version, about, long_about = None)]
pub struct Cli {
    /// TOML settings file; takes precedence over `PADDOCK_CONFIG_PATH`.
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Default locale used when no usable preference exists.
    #[arg(long, value_name = "LOCALE", global = true)]
    pub default_locale: Option<Locale>,

    /// Enable verbose diagnostic logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Cookie input shared by commands that resolve a request.
#[derive(Debug, Args, Clone, Default, PartialEq, Eq)]
pub struct CookieArgs {
    /// Raw `Cookie` request header, for example `preferred-locale=en`.
    #[arg(long, value_name = "HEADER")]
    pub cookie: Option<String>,
}

/// Available top-level commands.
#[derive(Debug, Subcommand, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the locale a request with these cookies renders in.
    Resolve(CookieArgs),

    /// Render a message key in the locale a request resolves to.
    Translate {
        /// Dotted message key, for example `navigation.horses`.
        #[arg(value_name = "KEY")]
        key: String,

        /// Cookie input.
        #[command(flatten)]
        cookies: CookieArgs,

        /// Placeholder value in the form `NAME=VALUE`; may be repeated.
        #[arg(long = "arg", value_name = "NAME=VALUE", value_parser = parse_message_arg)]
        args: Vec<(String, String)>,
    },

    /// Print the `Set-Cookie` value that stores a locale preference.
    SetCookie {
        /// Locale to store: es, en or de.
        #[arg(value_name = "LOCALE")]
        locale: Locale,

        /// Add the `Secure` attribute, as for pages served over HTTPS.
        #[arg(long)]
        secure: bool,
    },

    /// Validate message bundles and report their sections.
    Check {
        /// Directory holding `es.json`, `en.json` and `de.json`; the
        /// embedded bundles are checked when omitted.
        #[arg(long, value_name = "DIR")]
        dir: Option<Utf8PathBuf>,
    },
}
