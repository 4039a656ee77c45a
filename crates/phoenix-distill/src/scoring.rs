//! Table-driven pattern scoring
//!
//! Every analyzer in this crate is a configuration of the same engine: a
//! [`PatternTable`] made of weighted [`PatternCategory`] entries, each holding
//! case-insensitive regexes or lowercase keywords.
//!
//! ```text
//! category score = scaling(hits, total)
//! table score    = clamp(Σ weight × category score, 0, 1)
//! ```
//!
//! A matcher counts once per text for hit-rates; occurrence counts and
//! excerpt extraction are available separately for depth measurements.

use phoenix_common::AnalysisError;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::text::TextSample;

/// How raw hit counts are turned into a [0, 1] category score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scaling {
    /// ln(m + 1) / ln(n + 1)
    Logarithmic,
    /// √m / √n
    SquareRoot,
    /// m / n
    Linear,
}

impl Scaling {
    pub fn apply(&self, hits: usize, total: usize) -> f64 {
        if total == 0 || hits == 0 {
            return 0.0;
        }
        let m = hits as f64;
        let n = total as f64;
        let score = match self {
            Scaling::Logarithmic => (m + 1.0).ln() / (n + 1.0).ln(),
            Scaling::SquareRoot => m.sqrt() / n.sqrt(),
            Scaling::Linear => m / n,
        };
        score.min(1.0)
    }
}

/// A single case-insensitive regex or lowercase keyword
#[derive(Debug, Clone)]
pub enum Matcher {
    Regex(Regex),
    Keyword(String),
}

impl Matcher {
    /// Compile a case-insensitive regex matcher
    pub fn regex(pattern: &str) -> Result<Self, AnalysisError> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(Matcher::Regex)
            .map_err(|e| AnalysisError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    /// Substring keyword matcher, compared against lowercased text
    pub fn keyword(keyword: &str) -> Self {
        Matcher::Keyword(keyword.to_lowercase())
    }

    pub fn is_match(&self, text: &TextSample<'_>) -> bool {
        match self {
            Matcher::Regex(re) => re.is_match(text.raw()),
            Matcher::Keyword(kw) => !kw.is_empty() && text.lower().contains(kw.as_str()),
        }
    }

    /// Number of non-overlapping occurrences
    pub fn occurrences(&self, text: &TextSample<'_>) -> usize {
        match self {
            Matcher::Regex(re) => re.find_iter(text.raw()).count(),
            Matcher::Keyword(kw) if kw.is_empty() => 0,
            Matcher::Keyword(kw) => text.lower().matches(kw.as_str()).count(),
        }
    }

    /// Up to `limit` matched excerpts in order of appearance
    pub fn excerpts(&self, text: &TextSample<'_>, limit: usize) -> Vec<String> {
        match self {
            Matcher::Regex(re) => re
                .find_iter(text.raw())
                .take(limit)
                .map(|m| m.as_str().to_string())
                .collect(),
            Matcher::Keyword(kw) => {
                if limit > 0 && self.is_match(text) {
                    vec![kw.clone()]
                } else {
                    Vec::new()
                }
            }
        }
    }

    pub fn pattern(&self) -> &str {
        match self {
            Matcher::Regex(re) => re.as_str(),
            Matcher::Keyword(kw) => kw,
        }
    }
}

/// A named, weighted group of matchers
#[derive(Debug, Clone)]
pub struct PatternCategory {
    pub name: String,
    pub weight: f64,
    pub scaling: Scaling,
    matchers: Vec<Matcher>,
}

impl PatternCategory {
    pub fn new(name: impl Into<String>, weight: f64, scaling: Scaling) -> Self {
        Self {
            name: name.into(),
            weight,
            scaling,
            matchers: Vec::new(),
        }
    }

    /// Add case-insensitive regex matchers
    pub fn with_regexes(mut self, patterns: &[&str]) -> Result<Self, AnalysisError> {
        for pattern in patterns {
            self.matchers.push(Matcher::regex(pattern)?);
        }
        Ok(self)
    }

    /// Add keyword matchers
    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.matchers
            .extend(keywords.iter().map(|kw| Matcher::keyword(kw)));
        self
    }

    pub fn matchers(&self) -> &[Matcher] {
        &self.matchers
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Number of matchers that match at least once
    pub fn hits(&self, text: &TextSample<'_>) -> usize {
        self.matchers.iter().filter(|m| m.is_match(text)).count()
    }

    /// Total occurrences over all matchers
    pub fn occurrences(&self, text: &TextSample<'_>) -> usize {
        self.matchers.iter().map(|m| m.occurrences(text)).sum()
    }

    pub fn score(&self, text: &TextSample<'_>) -> f64 {
        self.scaling.apply(self.hits(text), self.matchers.len())
    }

    /// Up to `per_matcher` excerpts from each matcher, concatenated
    pub fn excerpts(&self, text: &TextSample<'_>, per_matcher: usize) -> Vec<String> {
        self.matchers
            .iter()
            .flat_map(|m| m.excerpts(text, per_matcher))
            .collect()
    }

    /// Keywords (or patterns) of the matchers that hit
    pub fn matched_patterns(&self, text: &TextSample<'_>) -> Vec<String> {
        self.matchers
            .iter()
            .filter(|m| m.is_match(text))
            .map(|m| m.pattern().to_string())
            .collect()
    }
}

/// Score of one category within a breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    pub name: String,
    pub hits: usize,
    pub total: usize,
    pub score: f64,
    pub weight: f64,
}

/// Per-category scores plus the weighted aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub categories: Vec<CategoryScore>,
    pub aggregate: f64,
}

impl ScoreBreakdown {
    pub fn get(&self, name: &str) -> Option<&CategoryScore> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Score of a category, 0.0 if absent
    pub fn score_of(&self, name: &str) -> f64 {
        self.get(name).map(|c| c.score).unwrap_or(0.0)
    }

    pub fn hits_of(&self, name: &str) -> usize {
        self.get(name).map(|c| c.hits).unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.categories.iter().map(|c| c.hits).sum()
    }

    /// Number of categories with at least one hit
    pub fn matched_categories(&self) -> usize {
        self.categories.iter().filter(|c| c.hits > 0).count()
    }
}

/// An ordered set of weighted categories
#[derive(Debug, Clone)]
pub struct PatternTable {
    pub name: String,
    categories: Vec<PatternCategory>,
}

impl PatternTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            categories: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: PatternCategory) -> Self {
        self.categories.push(category);
        self
    }

    pub fn push(&mut self, category: PatternCategory) {
        self.categories.push(category);
    }

    pub fn category(&self, name: &str) -> Option<&PatternCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn categories(&self) -> &[PatternCategory] {
        &self.categories
    }

    pub fn total_weight(&self) -> f64 {
        self.categories.iter().map(|c| c.weight).sum()
    }

    /// Score text against every category
    pub fn score(&self, text: &TextSample<'_>) -> ScoreBreakdown {
        let categories: Vec<CategoryScore> = self
            .categories
            .iter()
            .map(|category| {
                let hits = category.hits(text);
                let total = category.len();
                CategoryScore {
                    name: category.name.clone(),
                    hits,
                    total,
                    score: category.scaling.apply(hits, total),
                    weight: category.weight,
                }
            })
            .collect();

        let aggregate = categories
            .iter()
            .map(|c| c.score * c.weight)
            .sum::<f64>()
            .clamp(0.0, 1.0);

        ScoreBreakdown {
            categories,
            aggregate,
        }
    }
}
