//! Frequency-ranked keyword extraction.
//!
//! Tokens are filtered against an English stopword list, then ranked by raw
//! frequency. Ties keep first-occurrence order.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::normalizer::TextNormalizer;

/// Default number of keywords returned per message.
pub const DEFAULT_MAX_KEYWORDS: usize = 10;

/// Keywords must be strictly longer than this (in characters).
const MIN_KEYWORD_CHARS: usize = 3;

/// Stopwords for English language
const STOPWORDS_EN: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// Result of keyword extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordResult {
    /// The keyword
    pub keyword: String,
    /// Raw frequency in the text
    pub frequency: usize,
}

/// Keyword extractor using stopword filtering and frequency ranking
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    normalizer: TextNormalizer,
    stopwords: HashSet<&'static str>,
    max_keywords: usize,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(TextNormalizer::new(), DEFAULT_MAX_KEYWORDS)
    }
}

impl KeywordExtractor {
    pub fn new(normalizer: TextNormalizer, max_keywords: usize) -> Self {
        Self {
            normalizer,
            stopwords: STOPWORDS_EN.iter().copied().collect(),
            max_keywords,
        }
    }

    fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    fn is_punctuation(token: &str) -> bool {
        token.chars().all(|c| c.is_ascii_punctuation())
    }

    /// Normalize, tokenize and drop stopwords, single characters and punctuation.
    fn content_tokens(&self, text: &str) -> Vec<String> {
        let cleaned = self.normalizer.normalize(text);
        self.normalizer
            .tokenize(&cleaned)
            .into_iter()
            .filter(|t| !self.is_stopword(t))
            .filter(|t| t.chars().count() > 1 && !Self::is_punctuation(t))
            .collect()
    }

    /// Extract the top N keywords with their frequencies.
    pub fn extract(&self, text: &str, top_k: Option<usize>) -> Vec<KeywordResult> {
        let max_results = top_k.unwrap_or(self.max_keywords);
        if max_results == 0 {
            return vec![];
        }

        let candidates = self
            .content_tokens(text)
            .into_iter()
            .filter(|t| t.chars().count() > MIN_KEYWORD_CHARS)
            .filter(|t| t.chars().all(char::is_alphanumeric));

        // Insertion order doubles as the tie-break for equal frequencies.
        let mut order: Vec<String> = Vec::new();
        let mut freq: HashMap<String, usize> = HashMap::new();
        for token in candidates {
            let count = freq.entry(token.clone()).or_insert(0);
            if *count == 0 {
                order.push(token);
            }
            *count += 1;
        }

        let mut ranked: Vec<KeywordResult> = order
            .into_iter()
            .map(|keyword| {
                let frequency = freq.get(&keyword).copied().unwrap_or(0);
                KeywordResult { keyword, frequency }
            })
            .collect();

        // Stable sort keeps first-occurrence order among equal counts.
        ranked.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        ranked.truncate(max_results);
        ranked
    }

    /// Extract keywords and return just the strings
    pub fn extract_keywords(&self, text: &str, top_k: Option<usize>) -> Vec<String> {
        self.extract(text, top_k)
            .into_iter()
            .map(|k| k.keyword)
            .collect()
    }
}
