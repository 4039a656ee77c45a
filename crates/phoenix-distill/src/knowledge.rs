//! Structured knowledge and output quality measures

use std::collections::{BTreeMap, BTreeSet, HashMap};

use lazy_static::lazy_static;
use phoenix_common::{KnowledgeItem, StructuredKnowledge};
use regex::Regex;

use crate::domain::DOMAIN_SPECS;
use crate::text::{
    average_sentence_length, long_words, terminator_count, word_count, word_tokens, TextSample,
};

const MAX_FREQUENT_CONCEPTS: usize = 10;
const DOMAIN_CONCEPT_CONFIDENCE: f64 = 0.8;

lazy_static! {
    static ref CONDITIONAL: Regex = Regex::new(r"(?i)if.*then").unwrap();
    static ref CAUSAL: Regex = Regex::new(r"(?i)because|since|therefore|thus").unwrap();
    static ref SEQUENTIAL: Regex = Regex::new(r"(?i)first|second|third|then|next|finally").unwrap();
    static ref STEP_BY_STEP: Regex = Regex::new(r"(?i)let me.*step.*step").unwrap();
    static ref ALTERNATIVES: Regex = Regex::new(r"(?i)alternative|option|choice|either.*or").unwrap();
    static ref EXAMPLES: Regex = Regex::new(r"(?i)example|instance|case.*study").unwrap();
    static ref COMPLEX_STRUCTURE: Regex =
        Regex::new(r"(?i)\b(if|when|because|although|while|since)\b").unwrap();
    static ref SENTENCE_MARK: Regex = Regex::new(r"[.!?]+").unwrap();
    static ref STRUCTURE_MARK: Regex = Regex::new(r"\n|\. |, ").unwrap();
}

/// (category, trigger words)
const GENERAL_CATEGORIES: [(&str, [&str; 4]); 4] = [
    ("problem_solving", ["problem", "solution", "issue", "challenge"]),
    ("explanation", ["explain", "describe", "define", "clarify"]),
    ("creation", ["create", "build", "develop", "design"]),
    ("analysis", ["analyze", "evaluate", "assess", "review"]),
];

const STOP_WORDS: [&str; 46] = [
    "this", "that", "with", "from", "they", "have", "been", "were", "said", "each", "which",
    "their", "time", "will", "about", "there", "could", "other", "after", "first", "well", "also",
    "where", "much", "some", "very", "when", "here", "just", "into", "over", "think", "back",
    "right", "before", "good", "work", "life", "only", "still", "should", "through", "being",
    "made", "these", "would",
];

struct PatternRule {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    confidence: f64,
    regex: &'static Regex,
}

fn reasoning_rules() -> [PatternRule; 3] {
    [
        PatternRule {
            id: "conditional_reasoning",
            name: "Conditional Reasoning",
            description: "Uses if-then logical structures",
            confidence: 0.8,
            regex: &CONDITIONAL,
        },
        PatternRule {
            id: "causal_reasoning",
            name: "Causal Reasoning",
            description: "Uses cause-effect relationships",
            confidence: 0.7,
            regex: &CAUSAL,
        },
        PatternRule {
            id: "sequential_reasoning",
            name: "Sequential Reasoning",
            description: "Uses step-by-step logical progression",
            confidence: 0.9,
            regex: &SEQUENTIAL,
        },
    ]
}

fn strategy_rules() -> [PatternRule; 3] {
    [
        PatternRule {
            id: "step_by_step",
            name: "Step-by-Step Approach",
            description: "Breaks down problems into sequential steps",
            confidence: 0.8,
            regex: &STEP_BY_STEP,
        },
        PatternRule {
            id: "alternative_analysis",
            name: "Alternative Analysis",
            description: "Considers multiple options or approaches",
            confidence: 0.7,
            regex: &ALTERNATIVES,
        },
        PatternRule {
            id: "example_based",
            name: "Example-Based Reasoning",
            description: "Uses examples to illustrate or solve problems",
            confidence: 0.6,
            regex: &EXAMPLES,
        },
    ]
}

fn apply_rules(text: &str, rules: &[PatternRule], category: &str) -> Vec<KnowledgeItem> {
    rules
        .iter()
        .filter(|rule| rule.regex.is_match(text))
        .map(|rule| KnowledgeItem {
            id: rule.id.to_string(),
            name: rule.name.to_string(),
            description: rule.description.to_string(),
            confidence: rule.confidence,
            category: category.to_string(),
        })
        .collect()
}

/// Knowledge categories present in the text, domain and general
pub fn extract_categories(text: &TextSample<'_>) -> BTreeSet<String> {
    let lower = text.lower();
    let mut categories: BTreeSet<String> = DOMAIN_SPECS
        .iter()
        .filter(|spec| spec.context.iter().any(|kw| lower.contains(kw)))
        .map(|spec| spec.name.to_string())
        .collect();
    for (category, words) in GENERAL_CATEGORIES {
        if words.iter().any(|w| lower.contains(w)) {
            categories.insert(category.to_string());
        }
    }
    categories
}

/// Domain concept keywords followed by up to ten frequent long words
pub fn extract_concepts(text: &TextSample<'_>) -> Vec<KnowledgeItem> {
    let lower = text.lower();
    let mut concepts: Vec<KnowledgeItem> = DOMAIN_SPECS
        .iter()
        .flat_map(|spec| {
            spec.concept_keywords
                .iter()
                .filter(|c| lower.contains(*c))
                .map(move |c| KnowledgeItem {
                    id: format!("{}_{}", spec.name, c.replace(' ', "_")),
                    name: c.to_string(),
                    description: format!("Concept from {} domain", spec.name),
                    confidence: DOMAIN_CONCEPT_CONFIDENCE,
                    category: spec.name.to_string(),
                })
        })
        .collect();

    let words = long_words(text.raw());
    let total = words.len();
    let mut frequency: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();
    for word in &words {
        let count = frequency.entry(word.as_str()).or_insert(0);
        if *count == 0 {
            first_seen.push(word.as_str());
        }
        *count += 1;
    }

    let frequent = first_seen
        .into_iter()
        .filter(|w| frequency[w] > 1 && w.len() > 4 && !STOP_WORDS.contains(w))
        .take(MAX_FREQUENT_CONCEPTS);
    for word in frequent {
        concepts.push(KnowledgeItem {
            id: format!("concept_{word}"),
            name: word.to_string(),
            description: format!("Key concept: {word}"),
            confidence: frequency[word] as f64 / total as f64,
            category: "general".to_string(),
        });
    }
    concepts
}

pub fn extract_reasoning_patterns(text: &str) -> Vec<KnowledgeItem> {
    apply_rules(text, &reasoning_rules(), "reasoning")
}

pub fn extract_strategies(text: &str) -> Vec<KnowledgeItem> {
    apply_rules(text, &strategy_rules(), "strategy")
}

/// Text-derived confidences: overall, concepts, reasoning and language quality
pub fn text_confidence_scores(
    text: &str,
    concepts: usize,
    reasoning_patterns: usize,
) -> BTreeMap<String, f64> {
    let mut scores = BTreeMap::new();
    scores.insert("overall".to_string(), (text.chars().count() as f64 / 1000.0).min(1.0));
    scores.insert(
        "concepts".to_string(),
        if concepts > 0 {
            (concepts as f64 / 10.0).min(1.0)
        } else {
            0.1
        },
    );
    scores.insert(
        "reasoning".to_string(),
        if reasoning_patterns > 0 {
            (reasoning_patterns as f64 / 5.0).min(1.0)
        } else {
            0.1
        },
    );
    let avg_sentence = word_count(text) as f64 / terminator_count(text).max(1) as f64;
    scores.insert("language_quality".to_string(), (avg_sentence / 20.0).min(1.0));
    scores
}

/// Categories, concepts, reasoning patterns, strategies and text confidences.
/// Domain knowledge and analyzer confidences are filled in by the engine.
pub fn structure_text(text: &TextSample<'_>) -> StructuredKnowledge {
    let concepts = extract_concepts(text);
    let reasoning_patterns = extract_reasoning_patterns(text.raw());
    let confidence_scores =
        text_confidence_scores(text.raw(), concepts.len(), reasoning_patterns.len());

    StructuredKnowledge {
        categories: extract_categories(text),
        strategies: extract_strategies(text.raw()),
        concepts,
        reasoning_patterns,
        domain_knowledge: BTreeMap::new(),
        confidence_scores,
    }
}

/// Sentence length, vocabulary diversity and subordinate clause density
pub fn complexity_score(text: &str) -> f64 {
    let tokens = word_tokens(text);
    let diversity = if tokens.is_empty() {
        0.0
    } else {
        tokens.iter().collect::<BTreeSet<_>>().len() as f64 / tokens.len() as f64
    };
    let syntactic = (COMPLEX_STRUCTURE.find_iter(text).count() as f64 / 5.0).min(1.0);

    (average_sentence_length(text) / 20.0 * 0.4 + diversity * 0.3 + syntactic * 0.3).min(1.0)
}

/// Length, structure and vocabulary richness of an output
pub fn output_quality(text: &str) -> f64 {
    let length = text.chars().count();
    let mut quality = if (500..=2000).contains(&length) {
        0.3
    } else if length > 2000 {
        0.2
    } else {
        length as f64 / 500.0 * 0.3
    };

    if SENTENCE_MARK.is_match(text) {
        quality += 0.2;
    }
    if STRUCTURE_MARK.is_match(text) {
        quality += 0.2;
    }

    let unique = word_tokens(text).into_iter().collect::<BTreeSet<_>>().len();
    quality += if unique > 20 {
        0.3
    } else {
        unique as f64 / 20.0 * 0.3
    };

    quality.min(1.0)
}
