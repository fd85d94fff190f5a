//! Client-side persistence seam for the locale preference.

use crate::cookie::LocaleCookie;
use miette::Diagnostic;
use thiserror::Error;

/// Failures reported by a [`PreferenceStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum PersistError {
    /// The cookie write was refused by the host.
    #[error("cookie write rejected: {reason}")]
    #[diagnostic(code(paddock::sync::cookie_rejected))]
    CookieRejected {
        /// Host-supplied reason.
        reason: String,
    },

    /// Browser-local storage is unavailable (private mode, disabled, ...).
    #[error("local storage unavailable: {reason}")]
    #[diagnostic(code(paddock::sync::storage_unavailable))]
    StorageUnavailable {
        /// Host-supplied reason.
        reason: String,
    },

    /// Browser-local storage has no room for the value.
    #[error("local storage quota exceeded")]
    #[diagnostic(code(paddock::sync::quota_exceeded))]
    QuotaExceeded,
}

/// Where the client keeps the locale preference.
///
/// The cookie is authoritative: it is what the server reads on the next
/// request. The local store only holds a resilience copy and is never
/// consulted for resolution.
pub trait PreferenceStore {
    /// Write `cookie` through the host's regular cookie mechanism.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] when the host rejects the write.
    fn write_cookie(&mut self, cookie: &LocaleCookie) -> Result<(), PersistError>;

    /// Write a raw `Set-Cookie` style string directly, bypassing the regular
    /// mechanism. Used only after [`PreferenceStore::write_cookie`] or the
    /// local store failed.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] when the host rejects the write.
    fn write_cookie_direct(&mut self, raw: &str) -> Result<(), PersistError>;

    /// Store `value` under `key` in browser-local storage.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] when storage is unavailable or full.
    fn store_local(&mut self, key: &str, value: &str) -> Result<(), PersistError>;

    /// Whether the page was served over HTTPS, which adds `Secure` to the
    /// cookie.
    fn is_secure_context(&self) -> bool;
}
