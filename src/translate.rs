//! Message rendering with a default-locale fallback.
//!
//! Mirrors how pages consume a resolution: every key is looked up in the
//! resolved bundle first, then in the default locale's bundle, and finally
//! rendered as the key itself so a gap never blanks out the UI.

use crate::bundle::{BundleStore, MessageBundle};
use crate::locale::Locale;
use crate::resolver::Resolution;

/// Renders keys from a primary bundle layered over a fallback bundle.
#[derive(Debug, Clone)]
pub struct Translator {
    locale: Locale,
    primary: MessageBundle,
    fallback: MessageBundle,
}

impl Translator {
    /// Layer `primary` (for `locale`) over `fallback`.
    #[must_use]
    pub const fn new(locale: Locale, primary: MessageBundle, fallback: MessageBundle) -> Self {
        Self {
            locale,
            primary,
            fallback,
        }
    }

    /// Build a translator for a resolution, falling back to `default_locale`.
    #[must_use]
    pub fn for_resolution(
        resolution: &Resolution,
        store: &BundleStore,
        default_locale: Locale,
    ) -> Self {
        Self::new(
            resolution.locale,
            resolution.messages.clone(),
            store.get(default_locale).clone(),
        )
    }

    /// Locale of the primary bundle.
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Render `key` without arguments.
    #[must_use]
    pub fn text(&self, key: &str) -> String {
        self.message(key, &[])
    }

    /// Render `key`, substituting `{name}` placeholders from `args`.
    #[must_use]
    pub fn message(&self, key: &str, args: &[(&str, &str)]) -> String {
        if let Some(rendered) = self.primary.format(key, args) {
            return rendered;
        }
        if let Some(rendered) = self.fallback.format(key, args) {
            tracing::debug!(key, locale = %self.locale, "message served from fallback bundle");
            return rendered;
        }
        tracing::debug!(key, locale = %self.locale, "message key missing from every bundle");
        key.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bundle(value: serde_json::Value) -> MessageBundle {
        MessageBundle::try_from(value).unwrap_or_default()
    }

    #[test]
    fn primary_wins_then_fallback_then_key() {
        let translator = Translator::new(
            Locale::De,
            bundle(json!({"common": {"save": "Speichern"}})),
            bundle(json!({"common": {"save": "Guardar", "back": "Volver"}})),
        );
        assert_eq!(translator.text("common.save"), "Speichern");
        assert_eq!(translator.text("common.back"), "Volver");
        assert_eq!(translator.text("common.nope"), "common.nope");
    }

    #[test]
    fn arguments_flow_into_fallback_messages() {
        let translator = Translator::new(
            Locale::En,
            MessageBundle::default(),
            bundle(json!({"tasks": {"assignedTo": "Asignada a {name}"}})),
        );
        assert_eq!(
            translator.message("tasks.assignedTo", &[("name", "Marta")]),
            "Asignada a Marta"
        );
    }
}
