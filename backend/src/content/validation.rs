//! Quality checks run on an abstract before it is accepted for storage.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::{renderer::extract_plain_text, word_count};

static METHODOLOGY_TERMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:method|approach|technique|procedure|analysis|experiment)")
        .expect("valid regex")
});

static RESULTS_TERMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:result|finding|outcome|conclusion|demonstrate|show)")
        .expect("valid regex")
});

static HEADING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#+\s").expect("valid regex"));

/// Word-count and structure thresholds for abstracts.
#[derive(Debug, Clone, Copy)]
pub struct AbstractRules {
    pub min_words: usize,
    pub long_words: usize,
    pub max_words: usize,
    pub max_headings: usize,
}

impl Default for AbstractRules {
    fn default() -> Self {
        Self {
            min_words: 50,
            long_words: 350,
            max_words: 500,
            max_headings: 5,
        }
    }
}

/// Outcome of validating an abstract. `is_valid` is true iff `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbstractValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl AbstractValidationReport {
    fn from_findings(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Validates an abstract against the default rules.
pub fn validate_abstract(raw_markdown: &str) -> AbstractValidationReport {
    validate_abstract_with(&AbstractRules::default(), raw_markdown)
}

pub fn validate_abstract_with(
    rules: &AbstractRules,
    raw_markdown: &str,
) -> AbstractValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if raw_markdown.trim().is_empty() {
        errors.push("Abstract content is required".to_string());
        return AbstractValidationReport::from_findings(errors, warnings);
    }

    let plain_text = extract_plain_text(raw_markdown);
    let words = word_count(&plain_text);

    if words < rules.min_words {
        warnings.push(format!(
            "Abstract is quite short ({} words). Consider expanding to at least {} words.",
            words, rules.min_words
        ));
    }

    if words > rules.max_words {
        errors.push(format!(
            "Abstract is too long ({} words). Maximum allowed is {} words.",
            words, rules.max_words
        ));
    } else if words > rules.long_words {
        warnings.push(format!(
            "Abstract is getting long ({} words). Consider keeping it under {} words.",
            words, rules.long_words
        ));
    }

    if !METHODOLOGY_TERMS.is_match(&plain_text) {
        warnings.push(
            "Consider describing your methodology or approach.".to_string(),
        );
    }

    if !RESULTS_TERMS.is_match(&plain_text) {
        warnings.push("Consider summarizing your results or findings.".to_string());
    }

    let headings = HEADING_LINE.find_iter(raw_markdown).count();
    if headings > rules.max_headings {
        warnings.push(format!(
            "Abstract has too many headers ({}). Consider simplifying the structure.",
            headings
        ));
    }

    AbstractValidationReport::from_findings(errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(count: usize, word: &str) -> String {
        vec![word; count].join(" ")
    }

    #[test]
    fn test_empty_abstract_is_required() {
        for input in ["", "   \n\t "] {
            let report = validate_abstract(input);
            assert!(!report.is_valid);
            assert_eq!(report.errors.len(), 1);
            assert!(report.errors[0].contains("required"));
            assert!(report.warnings.is_empty());
        }
    }

    #[test]
    fn test_too_long_abstract_is_invalid() {
        let report = validate_abstract(&words(501, "word"));
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("too long")));
        assert!(!report.warnings.iter().any(|w| w.contains("getting long")));
    }

    #[test]
    fn test_exactly_max_words_is_valid_but_long() {
        let report = validate_abstract(&words(500, "word"));
        assert!(report.is_valid);
        assert!(report.warnings.iter().any(|w| w.contains("getting long")));
    }

    #[test]
    fn test_short_abstract_only_warns() {
        let report = validate_abstract("Our method shows a clear result.");
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("quite short"));
    }

    #[test]
    fn test_missing_vocabulary_warnings_in_order() {
        let report = validate_abstract(&words(60, "conference"));
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings[0].contains("methodology"));
        assert!(report.warnings[1].contains("results"));
    }

    #[test]
    fn test_vocabulary_is_case_insensitive() {
        let text = format!("{} APPROACH and Findings", words(60, "data"));
        let report = validate_abstract(&text);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_vocabulary_needs_word_start() {
        // terms must start a word: "foreshown" is not "show"
        let text = format!("{} foreshown reapproached", words(60, "data"));
        let report = validate_abstract(&text);
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_vocabulary_accepts_inflected_forms() {
        // only the start of a word is anchored, so plurals and past tenses count
        for suffix in ["methods findings", "procedures showed", "experiments outcomes"] {
            let text = format!("{} {}", words(60, "data"), suffix);
            let report = validate_abstract(&text);
            assert!(report.warnings.is_empty(), "{} should satisfy both checks", suffix);
        }
    }

    #[test]
    fn test_excessive_headers_warning() {
        let mut text = String::new();
        for i in 0..6 {
            text.push_str(&format!("# Section {}\n\n", i));
        }
        text.push_str(&words(60, "method result"));

        let report = validate_abstract(&text);
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("too many headers (6)"));
    }

    #[test]
    fn test_five_headers_is_fine() {
        let mut text = String::new();
        for i in 0..5 {
            text.push_str(&format!("## Part {}\n", i));
        }
        text.push_str(&words(60, "method result"));

        let report = validate_abstract(&text);
        assert!(report.warnings.is_empty());
    }
}
