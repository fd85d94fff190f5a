//! Test utilities for the locale core.
//!
//! Provides in-memory stand-ins for the browser-side collaborators of the
//! synchroniser, guards for `PADDOCK_*` environment changes, and helpers for
//! writing bundle and settings fixtures to disk.

pub mod browser;
pub mod bundles;
pub mod env;
pub mod error;
pub mod scheduler;

pub use browser::{CookieWrite, MemoryBrowser};
pub use env::{EnvLock, ScopedVar};
pub use scheduler::RecordingScheduler;
