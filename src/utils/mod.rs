//! Utility functions and helpers.

pub mod http;
pub mod url;

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn clean_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
