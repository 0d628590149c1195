//! Utility functions and helpers.

#[cfg(feature = "cli")]
pub mod http;
pub mod uri;

pub use uri::{BaseDomainResolver, StripMode, UriView, leaf, resolve_url, unescape_url_chars};

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
