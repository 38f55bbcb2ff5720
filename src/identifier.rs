//! Zone name to upstream zone identifier conversion.
//!
//! The authoritative server addresses zones by an escaped form of their
//! name (see `apiZoneNameToId()` in its web API). The escaping below has to
//! match it byte for byte, including escaping `_` even though it is a valid
//! name character. The result is only ever used as a URL path segment.
//!
//! Encoding is not idempotent: feed it raw domain names only.

use crate::error::{Result, SyncError};
use tracing::warn;

/// Whether `name` consists only of `[a-zA-Z0-9_.-]` and is non-empty
fn is_path_safe(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-'))
}

/// Convert a zone name into the identifier used in `/zones/{id}` paths.
///
/// Fails with [`SyncError::InvalidIdentifier`] for anything outside the
/// path-safe character class, which keeps callers from injecting path
/// segments into upstream URLs.
pub fn encode(name: &str) -> Result<String> {
    if !is_path_safe(name) {
        warn!(name = %name.escape_debug(), "Rejecting unsafe zone name");
        return Err(SyncError::InvalidIdentifier(name.to_string()));
    }

    let escaped = name.replace('/', "=2F").replace('_', "=5F");
    Ok(format!("{}.", escaped.trim_end_matches('.')))
}
