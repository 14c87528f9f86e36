//! Bounded plain-text excerpts for listings.

use super::renderer::extract_plain_text;

pub const DEFAULT_PREVIEW_LENGTH: usize = 200;

const ELLIPSIS: &str = "...";

/// Builds an excerpt of at most `max_length` characters (plus an ellipsis
/// when cut at a word boundary).
///
/// A cut at the last sentence end is preferred when that period sits beyond
/// 70% of `max_length`; otherwise the text is cut at the last whitespace and
/// `...` is appended.
pub fn generate_preview(markdown: &str, max_length: usize) -> String {
    let plain_text = extract_plain_text(markdown);

    if plain_text.chars().count() <= max_length {
        return plain_text;
    }

    let truncated: String = plain_text.chars().take(max_length).collect();

    if let Some(period) = truncated.rfind('.') {
        let period_chars = truncated[..period].chars().count();
        if period_chars as f64 > max_length as f64 * 0.7 {
            return truncated[..=period].to_string();
        }
    }

    match truncated.rfind(char::is_whitespace) {
        Some(space) => format!("{}{}", truncated[..space].trim_end(), ELLIPSIS),
        None => format!("{}{}", truncated, ELLIPSIS),
    }
}
