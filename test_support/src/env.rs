//! Process environment helpers for settings tests.
//!
//! Settings read `PADDOCK_*` variables straight from the process
//! environment, so tests that set them hold [`EnvLock`] for their whole
//! body and change variables only through [`ScopedVar`], which puts the
//! previous value back when dropped.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::sync::{Mutex, MutexGuard};

static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Holds the process-wide lock for environment changes.
pub struct EnvLock {
    _held: MutexGuard<'static, ()>,
}

impl fmt::Debug for EnvLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EnvLock")
    }
}

impl EnvLock {
    /// Block until no other test is changing the environment.
    ///
    /// A panic in another test does not poison the lock for the rest.
    pub fn acquire() -> Self {
        let held = ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Self { _held: held }
    }
}

/// Sets or clears one variable until dropped.
#[derive(Debug)]
pub struct ScopedVar {
    key: String,
    saved: Option<OsString>,
}

impl ScopedVar {
    /// Set `key` to `value` while the guard lives.
    ///
    /// Callers must hold an [`EnvLock`].
    #[must_use]
    pub fn set(_lock: &EnvLock, key: &str, value: impl AsRef<OsStr>) -> Self {
        let saved = std::env::var_os(key);
        // SAFETY: the borrowed `EnvLock` keeps other tests from touching the
        // environment concurrently.
        unsafe { std::env::set_var(key, value) };
        Self {
            key: key.to_owned(),
            saved,
        }
    }

    /// Remove `key` while the guard lives.
    ///
    /// Callers must hold an [`EnvLock`].
    #[must_use]
    pub fn unset(_lock: &EnvLock, key: &str) -> Self {
        let saved = std::env::var_os(key);
        // SAFETY: see `ScopedVar::set`.
        unsafe { std::env::remove_var(key) };
        Self {
            key: key.to_owned(),
            saved,
        }
    }
}

impl Drop for ScopedVar {
    fn drop(&mut self) {
        // SAFETY: the guard is dropped inside the test that holds the lock.
        unsafe {
            match self.saved.take() {
                Some(value) => std::env::set_var(&self.key, value),
                None => std::env::remove_var(&self.key),
            }
        }
    }
}
