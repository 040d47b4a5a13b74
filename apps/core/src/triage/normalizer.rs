//! Text normalization and tokenization.
//!
//! Cleans raw customer text before any matching happens: compatibility
//! decomposition, URL/e-mail/mention stripping, whitespace folding and
//! lowercasing. Normalization is idempotent.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

// NOTE: expect() is acceptable for these statics: the patterns are constants and
// a failure here is a programming error caught by the first test run.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://(?:[a-z0-9$-_@.&+!*\\(),]|%[0-9a-f]{2})+")
        .expect("Invalid regex: url pattern")
});

static WWW_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)www\.(?:[a-z0-9$-_@.&+!*\\(),]|%[0-9a-f]{2})+")
        .expect("Invalid regex: www pattern")
});

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+").expect("Invalid regex: email pattern"));

static MENTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\w+").expect("Invalid regex: mention pattern"));

static HASHTAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\w+").expect("Invalid regex: hashtag pattern"));

static WHITESPACE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex: whitespace pattern"));

/// Tokenization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerKind {
    /// Unicode word-boundary segmentation (punctuation becomes its own token)
    #[default]
    WordBoundary,
    /// Plain whitespace split
    Whitespace,
}

/// Normalization switches. Defaults strip everything except hashtags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerOptions {
    pub normalize_unicode: bool,
    pub strip_urls: bool,
    pub strip_emails: bool,
    pub strip_mentions: bool,
    /// Hashtags carry classification signal, so they are kept by default
    pub strip_hashtags: bool,
    pub lowercase: bool,
    pub tokenizer: TokenizerKind,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            strip_urls: true,
            strip_emails: true,
            strip_mentions: true,
            strip_hashtags: false,
            lowercase: true,
            tokenizer: TokenizerKind::WordBoundary,
        }
    }
}

/// Deterministic text cleaner.
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    options: NormalizerOptions,
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: NormalizerOptions) -> Self {
        Self { options }
    }

    /// Clean raw text. Never fails; blank input yields an empty string.
    ///
    /// URL and e-mail stripping run before whitespace folding so removed spans
    /// never leave doubled spaces behind.
    pub fn normalize(&self, raw: &str) -> String {
        if raw.trim().is_empty() {
            return String::new();
        }

        let mut text: String = if self.options.normalize_unicode {
            raw.nfkd().collect()
        } else {
            raw.to_string()
        };

        if self.options.strip_urls {
            text = URL_PATTERN.replace_all(&text, "").into_owned();
            text = WWW_PATTERN.replace_all(&text, "").into_owned();
        }
        if self.options.strip_emails {
            text = EMAIL_PATTERN.replace_all(&text, "").into_owned();
        }
        let text = fold_whitespace(&self.strip_tags(&text));
        if !self.options.lowercase {
            return text;
        }

        // Lowercasing can turn a non-word character into a word character
        // (U+A7D2 -> U+A7D3), exposing a mention the first strip could not see.
        fold_whitespace(&self.strip_tags(&text.to_lowercase()))
    }

    fn strip_tags(&self, text: &str) -> String {
        let mut text = text.to_string();
        if self.options.strip_mentions {
            text = MENTION_PATTERN.replace_all(&text, "").into_owned();
        }
        if self.options.strip_hashtags {
            text = HASHTAG_PATTERN.replace_all(&text, "").into_owned();
        }
        text
    }

    /// Split text into tokens using the configured strategy.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        match self.options.tokenizer {
            TokenizerKind::WordBoundary => text
                .split_word_bounds()
                .filter(|t| !t.trim().is_empty())
                .map(str::to_string)
                .collect(),
            TokenizerKind::Whitespace => text.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Whitespace word count, as used by the length signal.
    pub fn word_count(text: &str) -> usize {
        text.split_whitespace().count()
    }
}

fn fold_whitespace(text: &str) -> String {
    WHITESPACE_PATTERN.replace_all(text, " ").trim().to_string()
}
