//! Markdown rendering and plain-text extraction.
//!
//! Rendering follows GitHub-flavoured conventions (tables, strikethrough,
//! task lists, fenced code) and turns every single newline into a line break.
//! Plain text is produced by an ordered list of extraction strategies; the
//! first one that succeeds wins.

use pulldown_cmark::{Event, Options, Parser, html};
use regex::Regex;
use scraper::{Html, Node};
use std::sync::LazyLock;

use crate::errors::ContentError;

/// Markdown to HTML conversion.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> Result<String, ContentError>;
}

/// `pulldown-cmark` backed renderer. Heading anchors are never generated.
#[derive(Debug, Clone, Copy, Default)]
pub struct CmarkRenderer;

impl MarkdownRenderer for CmarkRenderer {
    fn render(&self, markdown: &str) -> Result<String, ContentError> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let parser = Parser::new_ext(markdown, options).map(|event| match event {
            Event::SoftBreak => Event::HardBreak,
            other => other,
        });

        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, parser);
        Ok(output)
    }
}

/// Renders already-sanitized Markdown to HTML with the default renderer.
pub fn render_html(sanitized_markdown: &str) -> String {
    render_html_with(&CmarkRenderer, sanitized_markdown)
}

/// Renders with `renderer`, returning the input unchanged if it fails.
pub fn render_html_with(renderer: &dyn MarkdownRenderer, sanitized_markdown: &str) -> String {
    if sanitized_markdown.is_empty() {
        return String::new();
    }

    match renderer.render(sanitized_markdown) {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("Falling back to unrendered markdown: {}", e);
            sanitized_markdown.to_string()
        }
    }
}

/// One way of turning Markdown into human-readable text.
pub trait TextExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn extract(&self, markdown: &str) -> Result<String, ContentError>;
}

/// Renders to HTML and keeps only the visible text nodes.
pub struct RenderedHtmlText<R = CmarkRenderer> {
    renderer: R,
}

impl<R: MarkdownRenderer> RenderedHtmlText<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }
}

impl<R: MarkdownRenderer> TextExtractionStrategy for RenderedHtmlText<R> {
    fn name(&self) -> &'static str {
        "rendered_html"
    }

    fn extract(&self, markdown: &str) -> Result<String, ContentError> {
        let rendered = self.renderer.render(markdown)?;
        Ok(html_to_text(&rendered))
    }
}

/// Visible text content of an HTML fragment, whitespace collapsed.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut text = String::with_capacity(html.len());

    for node in fragment.tree.root().descendants() {
        let Node::Text(content) = node.value() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|e| e.name()))
            .is_some_and(|name| matches!(name, "script" | "style" | "template"));
        if !hidden {
            text.push_str(content);
        }
    }

    collapse_whitespace(&text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

static HEADER_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s+").expect("valid regex"));
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*|__([^_]+)__").expect("valid regex"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*]+)\*|_([^_]+)_").expect("valid regex"));
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").expect("valid regex"));
static NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").expect("valid regex"));

/// Strips Markdown syntax directly. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownSyntaxStripping;

impl TextExtractionStrategy for MarkdownSyntaxStripping {
    fn name(&self) -> &'static str {
        "markdown_stripping"
    }

    fn extract(&self, markdown: &str) -> Result<String, ContentError> {
        let text = HEADER_MARKER.replace_all(markdown, "");
        let text = BOLD.replace_all(&text, "$1$2");
        let text = ITALIC.replace_all(&text, "$1$2");
        let text = INLINE_CODE.replace_all(&text, "$1");
        let text = LINK.replace_all(&text, "$1");
        let text = NEWLINES.replace_all(&text, " ");
        Ok(text.trim().to_string())
    }
}

/// Plain text of `markdown` using the default strategy chain.
pub fn extract_plain_text(markdown: &str) -> String {
    let strategies: [&dyn TextExtractionStrategy; 2] =
        [&RenderedHtmlText::new(CmarkRenderer), &MarkdownSyntaxStripping];
    extract_plain_text_with(&strategies, markdown)
}

/// Tries each strategy in order; the first success wins. If every strategy
/// fails the trimmed input is returned.
pub fn extract_plain_text_with(
    strategies: &[&dyn TextExtractionStrategy],
    markdown: &str,
) -> String {
    if markdown.is_empty() {
        return String::new();
    }

    for strategy in strategies {
        match strategy.extract(markdown) {
            Ok(text) => return text,
            Err(e) => {
                tracing::warn!(strategy = strategy.name(), "Text extraction failed: {}", e);
            }
        }
    }

    markdown.trim().to_string()
}
