//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the workflow.

pub mod error;
pub mod retry;

/// Collapse runs of whitespace into single spaces and trim both ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate text to a maximum number of characters
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Kiganjo,   Thika  "), "Kiganjo, Thika");
        assert_eq!(normalize_whitespace("Kiganjo\n\nThika"), "Kiganjo Thika");
        assert_eq!(normalize_whitespace(" \t "), "");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("Thika", 10), "Thika");
        assert_eq!(truncate_text("Kiganjo Road, Thika", 10), "Kiganjo...");
    }
}
