//! Error types for PHOENIX
//!
//! Provides a unified error type and the component-level error variants.
//! Per-agent failures ([`AgentError`]) are recoverable inside a generation;
//! configuration and statistics failures are fatal to a run.

use thiserror::Error;

/// Result type alias using PhoenixError
pub type Result<T> = std::result::Result<T, PhoenixError>;

/// Unified error type for PHOENIX operations
#[derive(Debug, Error)]
pub enum PhoenixError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // Per-agent errors
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    // Text analysis errors
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    // Statistics errors
    #[error("Statistics error: {0}")]
    Statistics(#[from] StatisticsError),

    // Persistence errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    // Hook errors
    #[error("Hook error: {0}")]
    Hook(#[from] HookError),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Run configuration violations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("population_size must be at least 1, got {0}")]
    PopulationTooSmall(usize),

    #[error("max_generations must be at least 1, got {0}")]
    NoGenerations(u32),

    #[error("{name} must be within [0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },

    #[error("selection_pressure must be positive and finite, got {0}")]
    InvalidSelectionPressure(f64),

    #[error("significance_threshold must be within (0, 1), got {0}")]
    InvalidSignificance(f64),

    #[error("convergence_threshold must be non-negative and finite, got {0}")]
    InvalidConvergenceThreshold(f64),

    #[error("tournament_size must be at least 1")]
    EmptyTournament,

    #[error("Invalid configuration value: {0}")]
    Invalid(String),
}

/// Failures scoped to a single agent
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Output generation failed for agent {agent_id}: {reason}")]
    Generation { agent_id: String, reason: String },

    #[error("Breeding failed for {parent1} x {parent2}: {reason}")]
    Breeding {
        parent1: String,
        parent2: String,
        reason: String,
    },

    #[error("Distillation failed for agent {agent_id}: {source}")]
    Distillation {
        agent_id: String,
        #[source]
        source: AnalysisError,
    },

    #[error("Invalid agent record: {0}")]
    InvalidRecord(String),
}

/// Text analysis errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("Agent output is empty")]
    EmptyOutput,

    #[error("Invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("No specialization profile for spirit {0}")]
    UnknownSpirit(String),
}

/// Statistics computation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatisticsError {
    #[error("Cannot compute statistics for an empty population")]
    EmptyPopulation,

    #[error("Non-finite fitness value for agent {agent_id}: {value}")]
    NonFiniteFitness { agent_id: String, value: f64 },

    #[error("Distribution error: {0}")]
    Distribution(String),
}

/// Agent state persistence errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Agent not found: {0}")]
    NotFound(String),

    #[error("Invalid agent id for storage: {0}")]
    InvalidId(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Integration hook failures
#[derive(Debug, Error)]
#[error("Hook `{hook}` failed: {reason}")]
pub struct HookError {
    pub hook: String,
    pub reason: String,
}

impl HookError {
    pub fn new(hook: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            hook: hook.into(),
            reason: reason.into(),
        }
    }
}

// Implement From for common external error types
impl From<serde_json::Error> for PhoenixError {
    fn from(err: serde_json::Error) -> Self {
        PhoenixError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for PhoenixError {
    fn from(err: std::io::Error) -> Self {
        PhoenixError::Storage(err.to_string())
    }
}

impl From<anyhow::Error> for PhoenixError {
    fn from(err: anyhow::Error) -> Self {
        PhoenixError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Serialization(err.to_string())
    }
}
