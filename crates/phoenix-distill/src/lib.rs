//! # Phoenix Distill
//!
//! Deterministic text analysis of agent output: performance scoring and
//! knowledge distillation into genetic material.
//!
//! ## Pipeline
//!
//! ```text
//!                    ┌──────────────────────┐
//!  agent output ───► │ PerformanceAnalyzer  │ ───► PerformanceMetrics
//!        │           └──────────────────────┘
//!        │           ┌──────────────────────┐
//!        └─────────► │ KnowledgeDistillation│
//!                    │  ├─ TraitExtractor   │
//!                    │  ├─ DomainExpertise  │ ───► AgentGeneticMaterial
//!                    │  ├─ Specialization   │
//!                    │  └─ structure_text   │
//!                    └──────────────────────┘
//! ```
//!
//! Every analyzer is a set of [`scoring::PatternTable`]s compiled once at
//! construction. Detection is lexical: there is no language model behind it.

pub mod analyzer;
pub mod domain;
pub mod engine;
pub mod knowledge;
pub mod normalizer;
pub mod performance;
pub mod scoring;
pub mod specialization;
pub mod text;
pub mod traits;

pub use analyzer::{run_analyzer, TextAnalyzer};
pub use domain::{DomainExpertise, DomainExpertiseAnalyzer};
pub use engine::{DistillationResult, ExtractionOptions, KnowledgeDistillationEngine, TaskInput};
pub use normalizer::{NormalizationResult, NormalizationStrategy, TextLengthNormalizer};
pub use performance::PerformanceAnalyzer;
pub use scoring::{PatternCategory, PatternTable, Scaling, ScoreBreakdown};
pub use specialization::{SpecializationAnalysis, SpecializationAnalyzer};
pub use text::TextSample;
pub use traits::TraitExtractor;
