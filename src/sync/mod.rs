//! Client locale synchroniser.
//!
//! Holds the tab-local mirror of the server-resolved locale and handles
//! user-initiated changes. A change persists the preference cookie (plus a
//! browser-local copy), updates the in-memory locale, and then either arms a
//! reload so the server renders the page again or, with
//! [`RefreshStrategy::InPlace`], swaps to the client-side bundle at once.
//!
//! No failure crosses into the UI layer: [`LocaleSynchronizer::request_change`]
//! always returns a [`ChangeOutcome`] and leaves the synchroniser usable.
//!
//! Other tabs sharing the cookie are not notified; they pick the new locale
//! up on their next navigation.

mod store;
mod timer;

pub use store::{PersistError, PreferenceStore};
pub use timer::{ReloadHook, ReloadScheduler, TokioReloadScheduler};

use crate::bundle::{BundleStore, MessageBundle};
use crate::cookie::{LOCAL_STORAGE_KEY, LocaleCookie};
use crate::locale::Locale;
use crate::settings::{LocaleSettings, RefreshStrategy};
use std::sync::Arc;
use std::time::Duration;

/// Synchroniser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No change in flight.
    Idle(Locale),
    /// A change was persisted and a reload is pending.
    Changing {
        /// Locale the tab was rendered in.
        from: Locale,
        /// Locale requested by the user.
        to: Locale,
    },
}

/// Which persistence path stored the preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistPath {
    /// Regular cookie write followed by the local-store copy.
    Primary,
    /// Direct cookie write after the primary path failed.
    Fallback,
}

/// Result of [`LocaleSynchronizer::request_change`].
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeOutcome {
    /// The requested locale is already active; nothing was written.
    Unchanged,
    /// The preference was persisted and a reload is armed.
    ReloadScheduled {
        /// Locale the reload will render.
        locale: Locale,
        /// Delay before the reload fires.
        delay: Duration,
        /// Persistence path that succeeded.
        path: PersistPath,
    },
    /// The preference was persisted and the client re-rendered in place.
    Rerendered {
        /// Newly active locale.
        locale: Locale,
        /// Bundle to render with.
        messages: MessageBundle,
        /// Persistence path that succeeded.
        path: PersistPath,
    },
    /// Both persistence paths failed; the previous locale stays active.
    Abandoned {
        /// Locale that could not be persisted.
        requested: Locale,
        /// Failure from the fallback path.
        error: PersistError,
    },
}

/// Tab-scoped locale state and change handling.
#[derive(Debug)]
pub struct LocaleSynchronizer<S, R> {
    store: S,
    scheduler: R,
    bundles: Arc<BundleStore>,
    settings: LocaleSettings,
    state: SyncState,
    locale: Locale,
    loading: bool,
}

impl<S: PreferenceStore, R: ReloadScheduler> LocaleSynchronizer<S, R> {
    /// Hydrate with the locale the server rendered the current page in.
    #[must_use]
    pub fn new(
        server_locale: Locale,
        store: S,
        scheduler: R,
        bundles: Arc<BundleStore>,
        settings: LocaleSettings,
    ) -> Self {
        Self {
            store,
            scheduler,
            bundles,
            settings,
            state: SyncState::Idle(server_locale),
            locale: server_locale,
            loading: false,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SyncState {
        self.state
    }

    /// Locale client-side rendering should use right now.
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Whether a change is persisting or awaiting its reload.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Bundle for [`LocaleSynchronizer::locale`].
    #[must_use]
    pub fn messages(&self) -> &MessageBundle {
        self.bundles.get(self.locale)
    }

    /// Borrow the preference store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Borrow the reload scheduler.
    #[must_use]
    pub const fn scheduler(&self) -> &R {
        &self.scheduler
    }

    /// Switch the tab to `requested`.
    ///
    /// Requesting the locale the tab already shows, or the one a pending
    /// reload will show, is a no-op. Otherwise the preference is
    /// persisted through the primary path, falling back to a direct cookie
    /// write when any primary step fails. A repeated request for a different
    /// locale while a reload is pending writes again and arms another
    /// reload.
    pub fn request_change(&mut self, requested: Locale) -> ChangeOutcome {
        if requested == self.target_locale() {
            tracing::debug!(locale = %requested, "locale already active or pending");
            return ChangeOutcome::Unchanged;
        }
        let previous = self.state;
        let from = self.locale;
        self.state = SyncState::Changing {
            from,
            to: requested,
        };
        self.loading = true;
        let cookie = self
            .settings
            .cookie_for(requested, self.store.is_secure_context());

        if let Err(err) = self.persist_primary(&cookie) {
            tracing::warn!(
                %err,
                locale = %requested,
                "persisting locale failed; writing cookie directly"
            );
            self.loading = false;
            if let Err(fallback_err) = self.persist_fallback(&cookie) {
                tracing::error!(
                    err = %fallback_err,
                    locale = %requested,
                    "direct cookie write failed; keeping the current locale"
                );
                self.state = previous;
                return ChangeOutcome::Abandoned {
                    requested,
                    error: fallback_err,
                };
            }
            return self.refresh(requested, PersistPath::Fallback);
        }

        self.locale = requested;
        self.refresh(requested, PersistPath::Primary)
    }

    /// Locale the tab will render after any pending reload.
    const fn target_locale(&self) -> Locale {
        match self.state {
            SyncState::Idle(locale) | SyncState::Changing { to: locale, .. } => locale,
        }
    }

    fn persist_primary(&mut self, cookie: &LocaleCookie) -> Result<(), PersistError> {
        self.store.write_cookie(cookie)?;
        self.store
            .store_local(LOCAL_STORAGE_KEY, cookie.locale().as_str())
    }

    fn persist_fallback(&mut self, cookie: &LocaleCookie) -> Result<(), PersistError> {
        self.store.write_cookie_direct(&cookie.to_string())?;
        if let Err(err) = self
            .store
            .store_local(LOCAL_STORAGE_KEY, cookie.locale().as_str())
        {
            tracing::warn!(%err, "local copy of the locale preference not stored");
        }
        Ok(())
    }

    fn refresh(&mut self, locale: Locale, path: PersistPath) -> ChangeOutcome {
        match self.settings.refresh {
            RefreshStrategy::Reload => {
                let delay = self.settings.reload_delay();
                self.scheduler.schedule_reload(delay);
                tracing::debug!(%locale, ?path, ?delay, "reload scheduled");
                ChangeOutcome::ReloadScheduled {
                    locale,
                    delay,
                    path,
                }
            }
            RefreshStrategy::InPlace => {
                self.locale = locale;
                self.state = SyncState::Idle(locale);
                self.loading = false;
                tracing::debug!(%locale, ?path, "re-rendered in place");
                ChangeOutcome::Rerendered {
                    locale,
                    messages: self.bundles.get(locale).clone(),
                    path,
                }
            }
        }
    }
}
