//! Message bundle audit for the build script.
//!
//! Parses `messages/*.json` and checks that every bundle defines the required
//! sections and that all locales carry exactly the same dotted keys, so a
//! missing translation fails the build instead of a page render.

use std::collections::BTreeSet;
use std::error::Error;
use std::fs;
use std::path::Path;

use serde_json::Value;

pub(super) const LOCALES: [&str; 3] = ["es", "en", "de"];
const REQUIRED_SECTIONS: [&str; 4] = ["common", "navigation", "dashboard", "auth"];

/// Keys found in one locale's bundle.
struct BundleKeys {
    locale: &'static str,
    keys: BTreeSet<String>,
}

/// Keys missing from one locale relative to the union of all locales.
struct AuditDifferences {
    missing: Vec<(&'static str, Vec<String>)>,
}

impl AuditDifferences {
    fn new(bundles: &[BundleKeys]) -> Self {
        let union: BTreeSet<String> = bundles
            .iter()
            .flat_map(|bundle| bundle.keys.iter().cloned())
            .collect();
        let missing = bundles
            .iter()
            .map(|bundle| {
                let absent: Vec<String> = union.difference(&bundle.keys).cloned().collect();
                (bundle.locale, absent)
            })
            .filter(|(_, absent)| !absent.is_empty())
            .collect();
        Self { missing }
    }

    fn has_issues(&self) -> bool {
        !self.missing.is_empty()
    }

    fn format_error_message(&self) -> String {
        let mut message = String::from("message bundle audit failed:");
        for (locale, absent) in &self.missing {
            message.push_str("\n- missing in ");
            message.push_str(locale);
            message.push_str(": ");
            message.push_str(&absent.join(", "));
        }
        message
    }
}

pub(super) fn audit_message_bundles(dir: &Path) -> Result<(), Box<dyn Error>> {
    let mut bundles = Vec::with_capacity(LOCALES.len());
    for locale in LOCALES {
        let path = dir.join(format!("{locale}.json"));
        bundles.push(BundleKeys {
            locale,
            keys: extract_bundle_keys(locale, &path)?,
        });
    }
    let results = AuditDifferences::new(&bundles);
    if results.has_issues() {
        Err(results.format_error_message().into())
    } else {
        Ok(())
    }
}

/// Parse one bundle and return its dotted leaf keys.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, is not an object,
/// lacks a required section, or holds a leaf that is not a string.
fn extract_bundle_keys(locale: &str, path: &Path) -> Result<BTreeSet<String>, Box<dyn Error>> {
    let source = fs::read_to_string(path)?;
    let root: Value = serde_json::from_str(&source)
        .map_err(|err| format!("{locale} bundle {} is not valid JSON: {err}", path.display()))?;
    let Value::Object(sections) = &root else {
        return Err(format!("{locale} bundle must be a JSON object").into());
    };
    for section in REQUIRED_SECTIONS {
        if !sections.get(section).is_some_and(Value::is_object) {
            return Err(format!("{locale} bundle lacks the required '{section}' section").into());
        }
    }
    let mut keys = BTreeSet::new();
    collect_leaf_keys(locale, "", &root, &mut keys)?;
    if keys.is_empty() {
        return Err(format!("{locale} bundle has no messages").into());
    }
    Ok(keys)
}

fn collect_leaf_keys(
    locale: &str,
    prefix: &str,
    value: &Value,
    keys: &mut BTreeSet<String>,
) -> Result<(), Box<dyn Error>> {
    match value {
        Value::Object(map) => {
            for (name, child) in map {
                let path = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{prefix}.{name}")
                };
                collect_leaf_keys(locale, &path, child, keys)?;
            }
            Ok(())
        }
        Value::String(_) => {
            keys.insert(prefix.to_owned());
            Ok(())
        }
        _ => Err(format!("{locale} bundle key '{prefix}' must hold a string").into()),
    }
}
