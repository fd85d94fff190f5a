//! Capability-scoped file reads for bundles and settings.

use camino::Utf8Path;
use cap_std::{ambient_authority, fs::Dir};
use std::io;

/// Open `path` as a capability directory handle.
pub(crate) fn open_dir(path: &Utf8Path) -> io::Result<Dir> {
    let target = if path.as_str().is_empty() {
        Utf8Path::new(".")
    } else {
        path
    };
    Dir::open_ambient_dir(target, ambient_authority())
}

/// Read the UTF-8 file at `path` through a handle on its parent directory.
pub(crate) fn read_file(path: &Utf8Path) -> io::Result<String> {
    let Some(name) = path.file_name() else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{path} does not name a file"),
        ));
    };
    let parent = path.parent().unwrap_or_else(|| Utf8Path::new("."));
    open_dir(parent)?.read_to_string(name)
}
