//! Run state and per-generation statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::agent::AgentState;
use super::genetic::AgentGeneticMaterial;
use super::metrics::StatisticalSignificance;

/// Snapshot of one generation's population statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionStatistics {
    pub generation: u32,
    pub population_size: usize,
    pub average_fitness: f64,
    pub best_fitness: f64,
    pub fitness_variance: f64,
    pub population_diversity: f64,
    pub convergence_rate: f64,
    pub significance: StatisticalSignificance,
    /// Per-agent fitness values of this generation
    #[serde(default)]
    pub fitness_samples: Vec<f64>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConvergenceKind {
    #[default]
    None,
    Fitness,
    Diversity,
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConvergenceStatus {
    pub converged: bool,
    pub convergence_generation: Option<u32>,
    pub confidence: f64,
    pub kind: ConvergenceKind,
    pub fitness_variance: f64,
    pub diversity_variance: f64,
}

/// Population diversity broken down by source
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiversityMetrics {
    pub trait_diversity: f64,
    pub spirit_diversity: f64,
    pub style_diversity: f64,
    pub unique_spirits: usize,
    pub unique_styles: usize,
}

/// Everything a run carries from one generation to the next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoenixEvolutionState {
    pub run_id: Uuid,
    pub current_generation: u32,
    pub population: Vec<AgentState>,
    pub genetic_material_pool: Vec<AgentGeneticMaterial>,
    pub statistics: Option<EvolutionStatistics>,
    pub history: Vec<EvolutionStatistics>,
    pub convergence: ConvergenceStatus,
    /// Ids of the elite subset of `population`
    pub elite: Vec<String>,
    pub diversity_metrics: DiversityMetrics,
    pub started_at: DateTime<Utc>,
}

impl PhoenixEvolutionState {
    /// Fresh state around an initial population
    pub fn new(population: Vec<AgentState>) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            current_generation: 0,
            population,
            genetic_material_pool: Vec::new(),
            statistics: None,
            history: Vec::new(),
            convergence: ConvergenceStatus::default(),
            elite: Vec::new(),
            diversity_metrics: DiversityMetrics::default(),
            started_at: Utc::now(),
        }
    }

    /// Elite agents in population order
    pub fn elite_agents(&self) -> Vec<&AgentState> {
        self.population
            .iter()
            .filter(|agent| self.elite.iter().any(|id| id == &agent.id))
            .collect()
    }

    pub fn agent(&self, id: &str) -> Option<&AgentState> {
        self.population.iter().find(|agent| agent.id == id)
    }

    pub fn is_converged(&self) -> bool {
        self.convergence.converged
    }
}
