//! In-memory browser used to exercise the client synchroniser.
//!
//! `MemoryBrowser` keeps a cookie store and a local store in memory, records
//! every cookie write, and can be told to reject writes so both persistence
//! paths can be driven from tests. It also acts as a [`CookieSource`], which
//! lets a test feed the cookies a tab would send on its next request straight
//! into the resolver.

use paddock::cookie::{CookieSource, LocaleCookie};
use paddock::sync::{PersistError, PreferenceStore};
use std::collections::HashMap;

/// A cookie write observed by [`MemoryBrowser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieWrite {
    /// Write through the regular cookie mechanism.
    Regular(LocaleCookie),
    /// Direct write of a raw cookie string.
    Direct(String),
}

/// In-memory cookie and local storage for one browser profile.
#[derive(Debug, Default, Clone)]
pub struct MemoryBrowser {
    cookies: Vec<(String, String)>,
    local: HashMap<String, String>,
    writes: Vec<CookieWrite>,
    secure: bool,
    reject_cookie_writes: bool,
    reject_direct_writes: bool,
    local_error: Option<PersistError>,
}

impl MemoryBrowser {
    /// Create an empty insecure browser profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the page as served over HTTPS.
    #[must_use]
    pub const fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Seed a cookie.
    #[must_use]
    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        self.set_cookie(name, value);
        self
    }

    /// Reject writes through the regular cookie mechanism.
    #[must_use]
    pub const fn rejecting_cookie_writes(mut self) -> Self {
        self.reject_cookie_writes = true;
        self
    }

    /// Reject direct cookie writes.
    #[must_use]
    pub const fn rejecting_direct_writes(mut self) -> Self {
        self.reject_direct_writes = true;
        self
    }

    /// Fail every local-store write with `error`.
    #[must_use]
    pub fn failing_local_store(mut self, error: PersistError) -> Self {
        self.local_error = Some(error);
        self
    }

    /// Render the stored cookies as a `Cookie` request header.
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Value stored in the local store under `key`.
    pub fn local_item(&self, key: &str) -> Option<&str> {
        self.local.get(key).map(String::as_str)
    }

    /// Every cookie write attempted and accepted, in order.
    pub fn writes(&self) -> &[CookieWrite] {
        &self.writes
    }

    fn set_cookie(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.cookies.iter_mut().find(|(existing, _)| existing == name) {
            entry.1 = value.to_owned();
        } else {
            self.cookies.push((name.to_owned(), value.to_owned()));
        }
    }
}

impl CookieSource for MemoryBrowser {
    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }
}

impl PreferenceStore for MemoryBrowser {
    fn write_cookie(&mut self, cookie: &LocaleCookie) -> Result<(), PersistError> {
        if self.reject_cookie_writes {
            return Err(PersistError::CookieRejected {
                reason: String::from("cookie writes disabled"),
            });
        }
        self.writes.push(CookieWrite::Regular(cookie.clone()));
        self.set_cookie(cookie.name(), cookie.locale().as_str());
        Ok(())
    }

    fn write_cookie_direct(&mut self, raw: &str) -> Result<(), PersistError> {
        if self.reject_direct_writes {
            return Err(PersistError::CookieRejected {
                reason: String::from("direct cookie writes disabled"),
            });
        }
        let pair = raw.split(';').next().unwrap_or_default();
        let Some((name, value)) = pair.split_once('=') else {
            return Err(PersistError::CookieRejected {
                reason: format!("malformed cookie string '{raw}'"),
            });
        };
        self.writes.push(CookieWrite::Direct(raw.to_owned()));
        self.set_cookie(name.trim(), value.trim());
        Ok(())
    }

    fn store_local(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        if let Some(error) = &self.local_error {
            return Err(error.clone());
        }
        self.local.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn is_secure_context(&self) -> bool {
        self.secure
    }
}
