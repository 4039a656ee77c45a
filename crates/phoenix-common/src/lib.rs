//! # Phoenix Common
//!
//! Shared data model, run configuration and errors for the PHOENIX
//! evolutionary knowledge-distillation engine.
//!
//! ## Core Types
//!
//! - [`AgentState`]: an agent with personality, physical and ability traits in [0, 1]
//! - [`PerformanceMetrics`]: one evaluation of an agent's output
//! - [`AgentGeneticMaterial`]: knowledge distilled from one output
//! - [`EvolutionStatistics`]: per-generation population snapshot
//! - [`PhoenixEvolutionState`]: the value threaded through a run
//! - [`PhoenixConfig`]: validated run parameters
//!
//! ```text
//! ┌────────────┐   evaluate    ┌──────────────────┐
//! │ population │ ────────────► │ PerformanceMetrics│
//! └─────┬──────┘               └──────────────────┘
//!       │ distill top agents
//!       ▼
//! ┌──────────────────────┐   select/breed/mutate   ┌────────────────┐
//! │ AgentGeneticMaterial │                         │ next population│
//! └──────────────────────┘                         └────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use config::{FitnessSource, PhoenixConfig, SelectionMethod};
pub use error::{
    AgentError, AnalysisError, ConfigError, HookError, PersistenceError, PhoenixError, Result,
    StatisticsError,
};
pub use types::{
    agent::{AgentRecord, AgentState, AgentStateBuilder, KnowledgeBase, TraitMap},
    evolution::{
        ConvergenceKind, ConvergenceStatus, DiversityMetrics, EvolutionStatistics,
        PhoenixEvolutionState,
    },
    genetic::{
        AgentGeneticMaterial, AgentSnapshot, DomainKnowledge, EnvironmentSnapshot,
        ExpertiseLevel, GenerationContext, KnowledgeItem, PerformanceSnapshot,
        SpecializationSummary, StructuredKnowledge, SubliminalTrait,
    },
    metrics::{clamp_unit, MetricScores, PerformanceMetrics, StatisticalSignificance},
    spirit::{NamingStyle, SpiritType, TraitCategory, TraitGroup, UnknownVariant},
};

/// PHOENIX version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of most recent generations inspected for convergence
pub const CONVERGENCE_WINDOW: usize = 5;

/// Value assumed for a trait one agent lacks when comparing two agents
pub const MISSING_TRAIT_VALUE: f64 = 0.5;

/// Target statistical power used by the validator
pub const TARGET_POWER: f64 = 0.8;

/// Minimum effect size considered meaningful
pub const MIN_EFFECT_SIZE: f64 = 0.2;

/// Maximum attempts to draw two distinct parents
pub const MAX_SELECTION_RETRIES: usize = 100;
