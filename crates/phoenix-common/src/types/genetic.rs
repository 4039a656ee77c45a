//! Genetic material - knowledge distilled from one agent output
//!
//! ```text
//! agent output ──► traits ──────────┐
//!              ├─► domains ─────────┤
//!              ├─► specialization ──┼──► AgentGeneticMaterial ──► pool (append-only)
//!              └─► structured ──────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::spirit::{NamingStyle, SpiritType, TraitCategory};

/// Number of characters of the task input kept in a generation context
pub const INPUT_EXCERPT_CHARS: usize = 500;

/// A latent behavioral trait detected in text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubliminalTrait {
    pub id: String,
    pub name: String,
    /// Strength in [0, 1]
    pub strength: f64,
    pub category: TraitCategory,
    /// Text excerpts evidencing the trait
    pub manifestation: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

impl SubliminalTrait {
    /// Ranking key used when capping the number of retained traits
    #[inline]
    pub fn rank_score(&self) -> f64 {
        self.strength * self.confidence
    }
}

/// A concept, reasoning pattern or strategy found in text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub confidence: f64,
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpertiseLevel {
    #[default]
    Unknown,
    Beginner,
    Intermediate,
    Expert,
}

impl ExpertiseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpertiseLevel::Unknown => "unknown",
            ExpertiseLevel::Beginner => "beginner",
            ExpertiseLevel::Intermediate => "intermediate",
            ExpertiseLevel::Expert => "expert",
        }
    }

    /// Ordinal rank used for level similarity (unknown = 0 .. expert = 3)
    pub fn rank(&self) -> u8 {
        match self {
            ExpertiseLevel::Unknown => 0,
            ExpertiseLevel::Beginner => 1,
            ExpertiseLevel::Intermediate => 2,
            ExpertiseLevel::Expert => 3,
        }
    }
}

impl std::fmt::Display for ExpertiseLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expertise evidence for one domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainKnowledge {
    pub expertise_score: f64,
    pub level: ExpertiseLevel,
    pub confidence: f64,
    pub indicators: Vec<String>,
}

/// Knowledge extracted from an output, grouped by kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredKnowledge {
    pub categories: BTreeSet<String>,
    pub concepts: Vec<KnowledgeItem>,
    pub reasoning_patterns: Vec<KnowledgeItem>,
    pub strategies: Vec<KnowledgeItem>,
    pub domain_knowledge: BTreeMap<String, DomainKnowledge>,
    pub confidence_scores: BTreeMap<String, f64>,
}

impl StructuredKnowledge {
    pub fn item_count(&self) -> usize {
        self.concepts.len() + self.reasoning_patterns.len() + self.strategies.len()
    }
}

/// How well an output matches its spirit's expected specialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecializationSummary {
    pub spirit: SpiritType,
    pub overall_accuracy: f64,
    pub role_alignment: f64,
    pub expertise_depth: f64,
    pub behavioral_consistency: f64,
    pub knowledge_application: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    pub generation: u32,
    pub agent_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub spirit: SpiritType,
    pub style: NamingStyle,
    pub generation: u32,
    pub fitness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub output_length: usize,
    pub complexity_score: f64,
    pub domain_coverage: usize,
}

/// The circumstances under which material was produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationContext {
    pub task: String,
    /// First [`INPUT_EXCERPT_CHARS`] characters of the task input
    pub input_excerpt: String,
    pub environment: EnvironmentSnapshot,
    pub agent: AgentSnapshot,
    pub performance: PerformanceSnapshot,
}

impl GenerationContext {
    /// Truncate an input to the excerpt length on a char boundary
    pub fn excerpt(input: &str) -> String {
        input.chars().take(INPUT_EXCERPT_CHARS).collect()
    }
}

/// Distilled knowledge from one agent output. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentGeneticMaterial {
    pub id: String,
    pub agent_id: String,
    pub generation: u32,
    pub content: String,
    pub structured_knowledge: StructuredKnowledge,
    /// domain -> relevance score
    pub relevance_scores: BTreeMap<String, f64>,
    pub subliminal_traits: Vec<SubliminalTrait>,
    pub specialization: Option<SpecializationSummary>,
    pub fitness_score: f64,
    pub generation_context: GenerationContext,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        let input = "é".repeat(600);
        let excerpt = GenerationContext::excerpt(&input);
        assert_eq!(excerpt.chars().count(), INPUT_EXCERPT_CHARS);
        assert_eq!(GenerationContext::excerpt("short"), "short");
    }

    #[test]
    fn test_expertise_level_ordering() {
        assert!(ExpertiseLevel::Expert > ExpertiseLevel::Intermediate);
        assert_eq!(ExpertiseLevel::default(), ExpertiseLevel::Unknown);
        assert_eq!(ExpertiseLevel::Beginner.rank(), 1);
    }

    #[test]
    fn test_rank_score() {
        let t = SubliminalTrait {
            id: "t".into(),
            name: "leadership".into(),
            strength: 0.5,
            category: TraitCategory::Personality,
            manifestation: String::new(),
            confidence: 0.8,
        };
        assert!((t.rank_score() - 0.4).abs() < 1e-12);
    }
}
