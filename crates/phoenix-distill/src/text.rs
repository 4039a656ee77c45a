//! Text sample preparation and counting helpers

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SENTENCE_TERMINATOR: Regex = Regex::new(r"[.!?]+").unwrap();
    static ref WORD: Regex = Regex::new(r"\b\w+\b").unwrap();
    static ref LONG_ALPHA_WORD: Regex = Regex::new(r"\b[A-Za-z]{4,}\b").unwrap();
}

/// A piece of agent output with its lowercase form precomputed
#[derive(Debug, Clone)]
pub struct TextSample<'a> {
    raw: &'a str,
    lower: String,
}

impl<'a> TextSample<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            lower: raw.to_lowercase(),
        }
    }

    #[inline]
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    #[inline]
    pub fn lower(&self) -> &str {
        &self.lower
    }

    pub fn is_blank(&self) -> bool {
        self.raw.trim().is_empty()
    }

    pub fn word_count(&self) -> usize {
        word_count(self.raw)
    }

    pub fn char_count(&self) -> usize {
        self.raw.chars().count()
    }

    pub fn sentence_count(&self) -> usize {
        sentence_count(self.raw)
    }
}

/// Whitespace-separated word count
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Number of non-empty segments between sentence terminators
pub fn sentence_count(text: &str) -> usize {
    SENTENCE_TERMINATOR
        .split(text)
        .filter(|segment| !segment.trim().is_empty())
        .count()
}

/// Number of sentence terminator runs
pub fn terminator_count(text: &str) -> usize {
    SENTENCE_TERMINATOR.find_iter(text).count()
}

/// Lowercased `\w+` tokens
pub fn word_tokens(text: &str) -> Vec<String> {
    WORD.find_iter(text).map(|m| m.as_str().to_lowercase()).collect()
}

/// Lowercased alphabetic tokens of at least four letters
pub fn long_words(text: &str) -> Vec<String> {
    LONG_ALPHA_WORD
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Mean words per sentence, treating a text without terminators as one sentence
pub fn average_sentence_length(text: &str) -> f64 {
    word_count(text) as f64 / sentence_count(text).max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let text = "First we analyze. Then we build!  Done?";
        assert_eq!(word_count(text), 7);
        assert_eq!(sentence_count(text), 3);
        assert_eq!(terminator_count(text), 3);
        assert!((average_sentence_length(text) - 7.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_lowercases_once() {
        let sample = TextSample::new("Strategic PLAN");
        assert_eq!(sample.lower(), "strategic plan");
        assert_eq!(sample.raw(), "Strategic PLAN");
        assert!(!sample.is_blank());
        assert!(TextSample::new("   \n").is_blank());
    }

    #[test]
    fn test_tokens() {
        assert_eq!(word_tokens("Data-driven Plans"), vec!["data", "driven", "plans"]);
        assert_eq!(long_words("a big Strategy map"), vec!["strategy"]);
    }
}
