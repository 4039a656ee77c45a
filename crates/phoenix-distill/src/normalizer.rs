//! Text length normalization
//!
//! Outputs of very different lengths bias every hit-rate based score. The
//! normalizer brings a text towards a target word count, either by appending
//! neutral context phrases or by keeping only its most important words.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use ordered_float::OrderedFloat;
use phoenix_common::UnknownVariant;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::scoring::{PatternCategory, Scaling};
use crate::text::{sentence_count, TextSample};

pub const TARGET_WORDS: usize = 150;
pub const MIN_WORDS: usize = 20;
pub const MAX_WORDS: usize = 500;
pub const LENGTH_TOLERANCE: f64 = 0.2;
pub const QUALITY_PRESERVATION_THRESHOLD: f64 = 0.8;

const DENSITY_THRESHOLD: f64 = 0.1;
const STATISTICAL_UPPER: f64 = 1.2;
const STATISTICAL_LOWER: f64 = 0.8;

const TECHNICAL_TERMS: [&str; 10] = [
    "algorithm",
    "data",
    "analysis",
    "system",
    "process",
    "method",
    "implementation",
    "optimization",
    "performance",
    "efficiency",
];

const ANALYTICAL_TERMS: [&str; 10] = [
    "analyze",
    "evaluate",
    "assess",
    "examine",
    "investigate",
    "consider",
    "review",
    "compare",
    "contrast",
    "determine",
];

const STOP_WORDS: [&str; 32] = [
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "is", "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "it", "as",
];

struct ContextTemplate {
    phrases: [&'static str; 8],
    fillers: [&'static str; 9],
    padding: [&'static str; 3],
}

const TECHNICAL_CONTEXT: ContextTemplate = ContextTemplate {
    phrases: [
        "This approach demonstrates technical expertise in",
        "The implementation shows proficiency in",
        "Technical considerations include",
        "From a technical perspective,",
        "The methodology involves",
        "Technical aspects encompass",
        "Implementation details reveal",
        "Technical analysis indicates",
    ],
    fillers: [
        "systematic analysis",
        "methodical approach",
        "structured methodology",
        "comprehensive evaluation",
        "detailed assessment",
        "thorough examination",
        "rigorous implementation",
        "precise execution",
        "efficient optimization",
    ],
    padding: ["technical", "analysis", "implementation"],
};

const ANALYTICAL_CONTEXT: ContextTemplate = ContextTemplate {
    phrases: [
        "This analysis demonstrates",
        "The evaluation reveals",
        "Assessment indicates that",
        "Examination shows",
        "Investigation demonstrates",
        "Analysis suggests that",
        "Evaluation points to",
        "Assessment reveals",
    ],
    fillers: [
        "comprehensive analysis",
        "detailed evaluation",
        "thorough assessment",
        "systematic examination",
        "rigorous investigation",
        "methodical review",
        "in-depth analysis",
        "careful consideration",
        "thoughtful evaluation",
    ],
    padding: ["analysis", "evaluation", "assessment"],
};

const GENERAL_CONTEXT: ContextTemplate = ContextTemplate {
    phrases: [
        "This demonstrates",
        "The approach shows",
        "Analysis indicates",
        "Evaluation reveals",
        "Assessment demonstrates",
        "Examination shows",
        "Investigation indicates",
        "Review reveals",
    ],
    fillers: [
        "comprehensive approach",
        "effective methodology",
        "systematic process",
        "thorough analysis",
        "detailed evaluation",
        "rigorous assessment",
        "methodical examination",
        "careful investigation",
        "thoughtful review",
    ],
    padding: ["approach", "methodology", "process"],
};

lazy_static! {
    static ref TECHNICAL_DENSITY: PatternCategory = density_category("technical", &TECHNICAL_TERMS);
    static ref ANALYTICAL_DENSITY: PatternCategory = density_category("analytical", &ANALYTICAL_TERMS);
}

fn density_category(name: &str, terms: &[&str]) -> PatternCategory {
    let pattern = format!(r"\b({})\b", terms.join("|"));
    PatternCategory::new(name, 1.0, Scaling::Linear)
        .with_regexes(&[pattern.as_str()])
        .unwrap()
}

/// Requested normalization strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationStrategy {
    #[default]
    Adaptive,
    Truncate,
    Expand,
    Statistical,
}

impl NormalizationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizationStrategy::Adaptive => "adaptive",
            NormalizationStrategy::Truncate => "truncate",
            NormalizationStrategy::Expand => "expand",
            NormalizationStrategy::Statistical => "statistical",
        }
    }
}

impl fmt::Display for NormalizationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NormalizationStrategy {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "adaptive" => Ok(NormalizationStrategy::Adaptive),
            "truncate" => Ok(NormalizationStrategy::Truncate),
            "expand" => Ok(NormalizationStrategy::Expand),
            "statistical" => Ok(NormalizationStrategy::Statistical),
            _ => Err(UnknownVariant::new("normalization strategy", s)),
        }
    }
}

/// What the normalizer actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppliedNormalization {
    None,
    Expansion,
    Truncation,
    StatisticalNone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizationResult {
    pub normalized_text: String,
    pub original_length: usize,
    pub normalized_length: usize,
    /// normalized / original word count
    pub normalization_factor: f64,
    pub strategy_used: AppliedNormalization,
    pub quality_preserved: bool,
}

impl NormalizationResult {
    fn unchanged(text: &str, words: usize, strategy_used: AppliedNormalization) -> Self {
        Self {
            normalized_text: text.to_string(),
            original_length: words,
            normalized_length: words,
            normalization_factor: 1.0,
            strategy_used,
            quality_preserved: true,
        }
    }
}

/// Technical and analytical density of a text
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TextCharacteristics {
    pub technical_density: f64,
    pub analytical_density: f64,
    /// average word length / 10 + average sentence length / 20
    pub complexity: f64,
}

impl TextCharacteristics {
    pub fn analyze(text: &str) -> Self {
        let sample = TextSample::new(text);
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Self::default();
        }
        let n = words.len() as f64;
        let avg_word_len = words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / n;
        let avg_sentence_len = n / sentence_count(text).max(1) as f64;

        Self {
            technical_density: TECHNICAL_DENSITY.occurrences(&sample) as f64 / n,
            analytical_density: ANALYTICAL_DENSITY.occurrences(&sample) as f64 / n,
            complexity: avg_word_len / 10.0 + avg_sentence_len / 20.0,
        }
    }

    pub fn is_technical(&self) -> bool {
        self.technical_density > DENSITY_THRESHOLD
    }

    pub fn is_analytical(&self) -> bool {
        self.analytical_density > DENSITY_THRESHOLD
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextLengthNormalizer;

impl TextLengthNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, text: &str, strategy: NormalizationStrategy) -> NormalizationResult {
        let words = text.split_whitespace().count();
        let result = match strategy {
            NormalizationStrategy::Adaptive => self.adaptive(text, words),
            NormalizationStrategy::Truncate => truncate(text, TARGET_WORDS),
            NormalizationStrategy::Expand => expand(text, TARGET_WORDS),
            NormalizationStrategy::Statistical => self.statistical(text, words),
        };
        debug!(
            strategy = %strategy,
            original = result.original_length,
            normalized = result.normalized_length,
            "Normalized text length"
        );
        result
    }

    fn adaptive(&self, text: &str, words: usize) -> NormalizationResult {
        if words < MIN_WORDS {
            return expand(text, TARGET_WORDS);
        }
        if words > MAX_WORDS {
            return truncate(text, TARGET_WORDS);
        }
        let deviation = (words as f64 - TARGET_WORDS as f64).abs() / TARGET_WORDS as f64;
        if deviation > LENGTH_TOLERANCE {
            if words < TARGET_WORDS {
                expand(text, TARGET_WORDS)
            } else {
                truncate(text, TARGET_WORDS)
            }
        } else {
            NormalizationResult::unchanged(text, words, AppliedNormalization::None)
        }
    }

    fn statistical(&self, text: &str, words: usize) -> NormalizationResult {
        let ratio = words as f64 / TARGET_WORDS as f64;
        let corrected = ratio * (1.0 + TextCharacteristics::analyze(text).complexity * 0.1);
        if corrected > STATISTICAL_UPPER {
            truncate(text, TARGET_WORDS)
        } else if corrected < STATISTICAL_LOWER {
            expand(text, TARGET_WORDS)
        } else {
            NormalizationResult::unchanged(text, words, AppliedNormalization::StatisticalNone)
        }
    }

    /// 1 ± ln(words / target) × 0.1, clamped to [0.5, 2.0]
    pub fn length_bias_factor(&self, text: &str) -> f64 {
        let words = text.split_whitespace().count();
        if words == 0 {
            return 0.5;
        }
        let ratio = words as f64 / TARGET_WORDS as f64;
        (1.0 + ratio.ln() * 0.1).clamp(0.5, 2.0)
    }

    /// Original metrics plus a `{name}_length_normalized` entry for each
    pub fn normalize_metrics_by_length(
        &self,
        metrics: &BTreeMap<String, f64>,
        text: &str,
    ) -> BTreeMap<String, f64> {
        let factor = self.length_bias_factor(text);
        let mut normalized = metrics.clone();
        for (name, value) in metrics {
            normalized.insert(format!("{name}_length_normalized"), value / factor);
        }
        normalized
    }
}

fn expand(text: &str, target: usize) -> NormalizationResult {
    let original_length = text.split_whitespace().count();
    if original_length >= target {
        return NormalizationResult::unchanged(text, original_length, AppliedNormalization::None);
    }
    let needed = target - original_length;

    let characteristics = TextCharacteristics::analyze(text);
    let template = if characteristics.is_technical() {
        &TECHNICAL_CONTEXT
    } else if characteristics.is_analytical() {
        &ANALYTICAL_CONTEXT
    } else {
        &GENERAL_CONTEXT
    };

    let phrase = template.phrases[text.chars().count() % template.phrases.len()];
    let filler_count = (needed / 2).min(template.fillers.len());

    let mut parts: Vec<&str> = Vec::new();
    if !text.trim().is_empty() {
        parts.push(text.trim());
    }
    parts.push(phrase);
    parts.extend(template.fillers.iter().take(filler_count));

    let remaining = needed - filler_count * 2;
    let padding_words = remaining / 3 * 3;
    parts.extend(template.padding.iter().cycle().take(padding_words));

    let expanded = parts.join(" ");
    let normalized_length = expanded.split_whitespace().count();
    NormalizationResult {
        quality_preserved: quality_preserved(text, &expanded),
        normalization_factor: normalized_length as f64 / original_length.max(1) as f64,
        normalized_text: expanded,
        original_length,
        normalized_length,
        strategy_used: AppliedNormalization::Expansion,
    }
}

/// Keep the `target` most important word positions in their original order
fn truncate(text: &str, target: usize) -> NormalizationResult {
    let words: Vec<&str> = text.split_whitespace().collect();
    let original_length = words.len();
    if original_length <= target {
        return NormalizationResult::unchanged(text, original_length, AppliedNormalization::None);
    }

    let importance = word_importance(&words);
    let mut ranked: Vec<(usize, f64)> = words
        .iter()
        .enumerate()
        .filter_map(|(i, w)| importance.get(&w.to_lowercase()).map(|s| (i, *s)))
        .collect();
    ranked.sort_by(|a, b| OrderedFloat(b.1).cmp(&OrderedFloat(a.1)).then(a.0.cmp(&b.0)));

    let mut keep: Vec<usize> = ranked.into_iter().take(target).map(|(i, _)| i).collect();
    keep.sort_unstable();

    let truncated = keep.iter().map(|&i| words[i]).collect::<Vec<_>>().join(" ");
    let normalized_length = keep.len();
    NormalizationResult {
        quality_preserved: quality_preserved(text, &truncated),
        normalization_factor: normalized_length as f64 / original_length as f64,
        normalized_text: truncated,
        original_length,
        normalized_length,
        strategy_used: AppliedNormalization::Truncation,
    }
}

fn word_importance(words: &[&str]) -> HashMap<String, f64> {
    let total = words.len() as f64;
    let mut frequency: HashMap<String, usize> = HashMap::new();
    for w in words {
        *frequency.entry(w.to_lowercase()).or_insert(0) += 1;
    }

    frequency
        .into_iter()
        .filter(|(w, _)| !STOP_WORDS.contains(&w.as_str()) && w.chars().count() > 2)
        .map(|(w, count)| {
            let length_bonus = ((w.chars().count() as f64 - 3.0) * 0.05).min(0.2);
            let technical_bonus = if TECHNICAL_TERMS.contains(&w.as_str()) {
                0.1
            } else {
                0.0
            };
            let score = count as f64 / total + length_bonus + technical_bonus;
            (w, score)
        })
        .collect()
}

fn quality_preserved(original: &str, normalized: &str) -> bool {
    let original_words: BTreeSet<String> =
        original.split_whitespace().map(|w| w.to_lowercase()).collect();
    if original_words.is_empty() {
        return false;
    }
    let normalized_words: BTreeSet<String> =
        normalized.split_whitespace().map(|w| w.to_lowercase()).collect();
    let overlap = original_words.intersection(&normalized_words).count();
    overlap as f64 / original_words.len() as f64 >= QUALITY_PRESERVATION_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adaptive_expands_short_text() {
        let normalizer = TextLengthNormalizer::new();
        let result = normalizer.normalize("A short note about the plan.", NormalizationStrategy::Adaptive);

        assert_eq!(result.strategy_used, AppliedNormalization::Expansion);
        assert_eq!(result.original_length, 6);
        assert!(result.normalized_length > result.original_length);
        assert!(result.normalized_text.starts_with("A short note about the plan."));
        assert!(result.quality_preserved);
    }

    #[test]
    fn test_adaptive_keeps_text_near_target() {
        let text = "word ".repeat(140);
        let result = TextLengthNormalizer::new().normalize(&text, NormalizationStrategy::Adaptive);
        assert_eq!(result.strategy_used, AppliedNormalization::None);
        assert_eq!(result.normalization_factor, 1.0);
        assert_eq!(result.normalized_text, text);
    }

    #[test]
    fn test_truncation_preserves_order_and_target() {
        let mut text = String::new();
        for i in 0..600 {
            text.push_str(&format!("token{i} "));
        }
        text.push_str("optimization optimization");
        let result = TextLengthNormalizer::new().normalize(&text, NormalizationStrategy::Adaptive);

        assert_eq!(result.strategy_used, AppliedNormalization::Truncation);
        assert_eq!(result.normalized_length, TARGET_WORDS);
        assert!(result.normalized_text.ends_with("optimization optimization"));

        let positions: Vec<usize> = result
            .normalized_text
            .split_whitespace()
            .filter_map(|w| w.strip_prefix("token"))
            .filter_map(|n| n.parse().ok())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_technical_text_uses_technical_context() {
        let text = "The algorithm improves system performance and data efficiency.";
        assert!(TextCharacteristics::analyze(text).is_technical());
        let result = TextLengthNormalizer::new().normalize(text, NormalizationStrategy::Expand);
        assert!(result.normalized_text.contains("systematic analysis"));
    }

    #[test]
    fn test_statistical_none_within_band() {
        let text = "plain words here. ".repeat(50);
        let result = TextLengthNormalizer::new().normalize(&text, NormalizationStrategy::Statistical);
        assert_eq!(result.strategy_used, AppliedNormalization::StatisticalNone);
    }

    #[test]
    fn test_length_bias_factor() {
        let normalizer = TextLengthNormalizer::new();
        let at_target = "w ".repeat(TARGET_WORDS);
        assert!((normalizer.length_bias_factor(&at_target) - 1.0).abs() < 1e-12);
        assert_eq!(normalizer.length_bias_factor(""), 0.5);

        let mut metrics = BTreeMap::new();
        metrics.insert("accuracy".to_string(), 0.5);
        let normalized = normalizer.normalize_metrics_by_length(&metrics, &at_target);
        assert_eq!(normalized["accuracy"], 0.5);
        assert!((normalized["accuracy_length_normalized"] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("Statistical".parse::<NormalizationStrategy>().unwrap(), NormalizationStrategy::Statistical);
        assert!("shrink".parse::<NormalizationStrategy>().is_err());
    }
}
