//! Pattern-based removal of unsafe constructs from author Markdown.
//!
//! This is a blocklist: it strips the constructs below and nothing else. It
//! does not parse HTML and is not a guarantee against every injection vector.

use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid regex"));

static IFRAME_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<iframe\b[^>]*>.*?</iframe\s*>").expect("valid regex"));

// Unterminated openers left behind once the closed blocks are gone.
static DANGLING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?(?:script|iframe)\b[^>]*>?").expect("valid regex"));

static JAVASCRIPT_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript\s*:").expect("valid regex"));

static EVENT_HANDLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s*\bon[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]*)"#).expect("valid regex")
});

/// Removes script/iframe blocks, `javascript:` schemes and inline `on*=`
/// handlers from `raw`.
///
/// Passes repeat until the text stops changing so a construct split around
/// another one (`<scr<script></script>ipt>`) cannot re-form after removal.
pub fn sanitize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut current = raw.to_string();
    loop {
        let next = sanitize_pass(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn sanitize_pass(input: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(input, "");
    let text = IFRAME_BLOCK.replace_all(&text, "");
    let text = DANGLING_TAG.replace_all(&text, "");
    let text = JAVASCRIPT_SCHEME.replace_all(&text, "");
    EVENT_HANDLER.replace_all(&text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::sanitize;

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_plain_markdown_untouched() {
        let md = "# Title\n\nSome **bold** text with a [link](https://example.org).";
        assert_eq!(sanitize(md), md);
    }

    #[test]
    fn test_script_blocks_removed() {
        let cleaned = sanitize("Before<script>alert('x')</script>After");
        assert_eq!(cleaned, "BeforeAfter");

        let cleaned = sanitize("a <SCRIPT type=\"text/javascript\">\nsteal()\n</Script > b");
        assert!(!cleaned.to_lowercase().contains("<script"));
        assert!(!cleaned.contains("steal"));
    }

    #[test]
    fn test_split_script_tag_cannot_reform() {
        let cleaned = sanitize("<scr<script></script>ipt>alert(1)</script>");
        assert!(!cleaned.to_lowercase().contains("<script"));
    }

    #[test]
    fn test_unclosed_script_opener_removed() {
        let cleaned = sanitize("text <script src=//evil.example/x.js>");
        assert!(!cleaned.to_lowercase().contains("<script"));
    }

    #[test]
    fn test_iframe_blocks_removed() {
        let cleaned = sanitize("x<iframe src=\"https://evil.example\"></iframe>y");
        assert_eq!(cleaned, "xy");
    }

    #[test]
    fn test_javascript_scheme_removed_link_text_kept() {
        let cleaned = sanitize("[click me](javascript:alert(1))");
        assert_eq!(cleaned, "[click me](alert(1))");

        let cleaned = sanitize("[x](JavaScript:void(0))");
        assert!(!cleaned.to_lowercase().contains("javascript:"));
        assert!(cleaned.starts_with("[x]("));
    }

    #[test]
    fn test_event_handlers_removed() {
        let cleaned = sanitize("<img src=\"a.png\" onerror=\"alert(1)\">");
        assert_eq!(cleaned, "<img src=\"a.png\">");

        let cleaned = sanitize("<div onClick='go()' onmouseover=go()>hi</div>");
        assert_eq!(cleaned, "<div>hi</div>");
    }

    #[test]
    fn test_words_containing_on_survive() {
        let md = "Based upon prior work, one result = 42.";
        assert_eq!(sanitize(md), md);
    }
}
