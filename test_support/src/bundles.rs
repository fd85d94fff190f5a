//! Bundle fixtures written to temporary directories.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::fs;
use tempfile::TempDir;

/// Smallest document that satisfies the required-section checks.
pub const MINIMAL_BUNDLE: &str =
    r#"{"common":{"save":"Save"},"navigation":{"horses":"Horses"},"dashboard":{"title":"Dashboard"},"auth":{"login":"Log in"}}"#;

/// Write `documents` as `<code>.json` files into a fresh temporary directory.
///
/// Returns the directory guard and its UTF-8 path.
///
/// # Errors
///
/// Returns an error if the directory or a file cannot be created.
pub fn write_bundle_dir(documents: &[(&str, &str)]) -> Result<(TempDir, Utf8PathBuf)> {
    let dir = TempDir::new().context("create bundle temp dir")?;
    let path = Utf8PathBuf::try_from(dir.path().to_path_buf())
        .context("bundle temp dir is not UTF-8")?;
    for (code, body) in documents {
        let file = path.join(format!("{code}.json"));
        fs::write(&file, body).with_context(|| format!("write {file}"))?;
    }
    Ok((dir, path))
}
