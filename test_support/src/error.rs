//! Flattening of error chains for assertions.

use std::error::Error;

/// Render `err` followed by each of its sources, separated by `": "`.
///
/// Lets a test check for text that only appears in a nested cause, such as
/// the path inside a settings error wrapped by `anyhow` context.
///
/// ```
/// use std::io;
/// use test_support::error::display_error_chain;
///
/// let err = io::Error::new(io::ErrorKind::NotFound, "es.json missing");
/// assert_eq!(display_error_chain(&err), "es.json missing");
/// ```
pub fn display_error_chain(err: &(dyn Error + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut cause = err.source();
    while let Some(inner) = cause {
        parts.push(inner.to_string());
        cause = inner.source();
    }
    parts.join(": ")
}
