//! Paddock locale core.
//!
//! This library resolves the UI locale of the stable management app from
//! request cookies, owns the Spanish, English and German message bundles, and
//! models the client-side synchroniser that persists a new preference and
//! refreshes the page.

pub mod bundle;
pub mod cli;
pub mod cookie;
mod fs;
pub mod locale;
pub mod resolver;
pub mod runner;
pub mod settings;
pub mod sync;
pub mod translate;
