//! Generation reports and run summaries

use chrono::{DateTime, Utc};
use phoenix_common::{
    AgentState, EvolutionStatistics, NamingStyle, PhoenixConfig, PhoenixEvolutionState, SpiritType,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub id: String,
    pub name: String,
    pub spirit: SpiritType,
    pub style: NamingStyle,
    pub generation: u32,
    pub fitness: f64,
    pub parents: Vec<String>,
}

impl From<&AgentState> for AgentSummary {
    fn from(agent: &AgentState) -> Self {
        Self {
            id: agent.id.clone(),
            name: agent.name.clone(),
            spirit: agent.spirit,
            style: agent.style,
            generation: agent.generation,
            fitness: agent.fitness(),
            parents: agent.parents().to_vec(),
        }
    }
}

/// What a generation looked like once it completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub generation: u32,
    pub timestamp: DateTime<Utc>,
    pub statistics: EvolutionStatistics,
    pub population_summary: Vec<AgentSummary>,
    pub genetic_material_count: usize,
    /// performance_weight × average fitness + diversity_weight × diversity
    pub composite_score: f64,
}

impl GenerationReport {
    /// Report of the latest completed generation, `None` before the first one
    pub fn from_state(state: &PhoenixEvolutionState, config: &PhoenixConfig) -> Option<Self> {
        let statistics = state.statistics.clone()?;
        let composite_score = config.performance_weight * statistics.average_fitness
            + config.diversity_weight * statistics.population_diversity;

        Some(Self {
            generation: statistics.generation,
            timestamp: Utc::now(),
            population_summary: state.population.iter().map(AgentSummary::from).collect(),
            genetic_material_count: state.genetic_material_pool.len(),
            composite_score,
            statistics,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub population_size: usize,
    pub max_generations: u32,
    pub selection_pressure: f64,
    pub mutation_rate: f64,
    pub elite_rate: f64,
}

/// Overview of a run at any point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionSummary {
    pub run_id: Uuid,
    pub current_generation: u32,
    pub total_generations: usize,
    pub population_size: usize,
    pub converged: bool,
    pub convergence_generation: Option<u32>,
    pub best_fitness: f64,
    pub average_fitness: f64,
    pub population_diversity: f64,
    pub genetic_material_pool_size: usize,
    pub elite_count: usize,
    pub config: ConfigSummary,
}

pub fn summarize(state: &PhoenixEvolutionState, config: &PhoenixConfig) -> EvolutionSummary {
    let (best_fitness, average_fitness, population_diversity) = state
        .statistics
        .as_ref()
        .map(|s| (s.best_fitness, s.average_fitness, s.population_diversity))
        .unwrap_or_default();

    EvolutionSummary {
        run_id: state.run_id,
        current_generation: state.current_generation,
        total_generations: state.history.len(),
        population_size: state.population.len(),
        converged: state.convergence.converged,
        convergence_generation: state.convergence.convergence_generation,
        best_fitness,
        average_fitness,
        population_diversity,
        genetic_material_pool_size: state.genetic_material_pool.len(),
        elite_count: state.elite.len(),
        config: ConfigSummary {
            population_size: config.population_size,
            max_generations: config.max_generations,
            selection_pressure: config.selection_pressure,
            mutation_rate: config.mutation_rate,
            elite_rate: config.elite_rate,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phoenix_common::StatisticalSignificance;

    #[test]
    fn test_no_report_before_first_generation() {
        let state = PhoenixEvolutionState::new(Vec::new());
        assert!(GenerationReport::from_state(&state, &PhoenixConfig::default()).is_none());

        let summary = summarize(&state, &PhoenixConfig::default());
        assert_eq!(summary.total_generations, 0);
        assert_eq!(summary.best_fitness, 0.0);
    }

    #[test]
    fn test_composite_score() {
        let mut state = PhoenixEvolutionState::new(Vec::new());
        state.statistics = Some(EvolutionStatistics {
            generation: 3,
            population_size: 0,
            average_fitness: 0.5,
            best_fitness: 0.8,
            fitness_variance: 0.0,
            population_diversity: 0.2,
            convergence_rate: 0.0,
            significance: StatisticalSignificance::default(),
            fitness_samples: Vec::new(),
            timestamp: Utc::now(),
        });
        let config = PhoenixConfig::default();
        let report = GenerationReport::from_state(&state, &config).unwrap();
        assert_eq!(report.generation, 3);
        assert!((report.composite_score - (0.7 * 0.5 + 0.3 * 0.2)).abs() < 1e-12);
    }
}
