//! Content pipeline for author-submitted Markdown.
//!
//! Turns untrusted abstract text into sanitized Markdown, rendered HTML,
//! plain text and a word count, and provides validation reports and bounded
//! previews. Everything here is pure and safe to call concurrently.

pub mod preview;
pub mod renderer;
pub mod sanitizer;
pub mod validation;

use serde::{Deserialize, Serialize};

pub use preview::{DEFAULT_PREVIEW_LENGTH, generate_preview};
pub use renderer::{extract_plain_text, render_html};
pub use sanitizer::sanitize;
pub use validation::{AbstractValidationReport, validate_abstract};

/// Storage-ready forms of one abstract. `html` and `plain_text` are always
/// derived from `sanitized_markdown`, never from the raw input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizationResult {
    pub sanitized_markdown: String,
    pub html: String,
    pub plain_text: String,
    pub word_count: usize,
}

/// Number of whitespace-delimited tokens in `plain_text`.
pub fn word_count(plain_text: &str) -> usize {
    plain_text.split_whitespace().count()
}

/// The only way user-supplied abstracts should reach storage or rendering.
pub fn process_for_storage(raw_markdown: &str) -> SanitizationResult {
    let sanitized_markdown = sanitize(raw_markdown);
    let html = render_html(&sanitized_markdown);
    let plain_text = extract_plain_text(&sanitized_markdown);
    let word_count = word_count(&plain_text);

    SanitizationResult {
        sanitized_markdown,
        html,
        plain_text,
        word_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_empty_input() {
        assert_eq!(
            process_for_storage(""),
            SanitizationResult {
                sanitized_markdown: String::new(),
                html: String::new(),
                plain_text: String::new(),
                word_count: 0,
            }
        );
    }

    #[test]
    fn test_process_strips_script_everywhere() {
        let result = process_for_storage("Intro <script>alert('x')</script>**bold** end");

        assert!(!result.sanitized_markdown.contains("<script"));
        assert!(!result.html.contains("<script"));
        assert!(!result.plain_text.contains("alert"));
        assert!(result.html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_process_javascript_link_keeps_text() {
        let result = process_for_storage("See [the paper](javascript:alert(1)) now.");

        assert!(!result.html.to_lowercase().contains("javascript:"));
        assert_eq!(result.plain_text, "See the paper now.");
        assert_eq!(result.word_count, 4);
    }

    #[test]
    fn test_word_count_matches_plain_text_tokens() {
        let result = process_for_storage(
            "# Background\n\nWe *measured* the `latency` of\n\n- three\n- systems",
        );
        assert_eq!(
            result.word_count,
            result.plain_text.split_whitespace().filter(|t| !t.is_empty()).count()
        );
        assert_eq!(result.word_count, 8);
    }

    #[test]
    fn test_word_count_of_blank_text() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count(" \n\t "), 0);
        assert_eq!(word_count("one  two\nthree"), 3);
    }
}
