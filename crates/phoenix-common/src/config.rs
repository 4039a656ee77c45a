//! PhoenixConfig - Parameters of an evolution run
//!
//! The core only ever sees a validated `PhoenixConfig` value. Loading it from
//! files or the environment is the runner's job.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Parent selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMethod {
    #[default]
    Tournament,
    Roulette,
    Rank,
    ElitePreservation,
}

impl std::str::FromStr for SelectionMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "tournament" => Ok(SelectionMethod::Tournament),
            "roulette" => Ok(SelectionMethod::Roulette),
            "rank" => Ok(SelectionMethod::Rank),
            "elite_preservation" | "elite" => Ok(SelectionMethod::ElitePreservation),
            other => Err(ConfigError::Invalid(format!("unknown selection method `{other}`"))),
        }
    }
}

/// Where an agent's fitness comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessSource {
    /// Analyzer scores of the agent's generated text
    #[default]
    TextAnalysis,
    /// Mean of all trait values
    TraitAverage,
}

impl std::str::FromStr for FitnessSource {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "text_analysis" | "text" => Ok(FitnessSource::TextAnalysis),
            "trait_average" | "traits" => Ok(FitnessSource::TraitAverage),
            other => Err(ConfigError::Invalid(format!("unknown fitness source `{other}`"))),
        }
    }
}

/// Evolution run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoenixConfig {
    pub population_size: usize,
    pub max_generations: u32,
    /// Exponent applied to roulette and rank weights
    pub selection_pressure: f64,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    pub elite_rate: f64,
    pub diversity_weight: f64,
    pub performance_weight: f64,
    pub convergence_threshold: f64,
    pub significance_threshold: f64,
    pub enable_knowledge_distillation: bool,
    pub enable_subliminal_learning: bool,
    pub enable_document_conditioning: bool,
    pub selection_method: SelectionMethod,
    pub tournament_size: usize,
    pub fitness_source: FitnessSource,
    /// Minimum pairwise distance kept by diversity maintenance
    pub diversity_threshold: f64,
    pub seed: u64,
}

impl Default for PhoenixConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            max_generations: 10,
            selection_pressure: 1.0,
            mutation_rate: 0.1,
            crossover_rate: 0.7,
            elite_rate: 0.2,
            diversity_weight: 0.3,
            performance_weight: 0.7,
            convergence_threshold: 0.01,
            significance_threshold: 0.05,
            enable_knowledge_distillation: true,
            enable_subliminal_learning: true,
            enable_document_conditioning: true,
            selection_method: SelectionMethod::Tournament,
            tournament_size: 3,
            fitness_source: FitnessSource::TextAnalysis,
            diversity_threshold: 0.1,
            seed: 42,
        }
    }
}

impl PhoenixConfig {
    /// Check every parameter, returning the first violation
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size < 1 {
            return Err(ConfigError::PopulationTooSmall(self.population_size));
        }
        if self.max_generations < 1 {
            return Err(ConfigError::NoGenerations(self.max_generations));
        }

        let rates = [
            ("mutation_rate", self.mutation_rate),
            ("crossover_rate", self.crossover_rate),
            ("elite_rate", self.elite_rate),
            ("diversity_weight", self.diversity_weight),
            ("performance_weight", self.performance_weight),
            ("diversity_threshold", self.diversity_threshold),
        ];
        for (name, value) in rates {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RateOutOfRange { name, value });
            }
        }

        if !(self.selection_pressure.is_finite() && self.selection_pressure > 0.0) {
            return Err(ConfigError::InvalidSelectionPressure(self.selection_pressure));
        }
        if !(self.significance_threshold > 0.0 && self.significance_threshold < 1.0) {
            return Err(ConfigError::InvalidSignificance(self.significance_threshold));
        }
        if !(self.convergence_threshold.is_finite() && self.convergence_threshold >= 0.0) {
            return Err(ConfigError::InvalidConvergenceThreshold(self.convergence_threshold));
        }
        if self.tournament_size < 1 {
            return Err(ConfigError::EmptyTournament);
        }
        Ok(())
    }

    /// Number of agents carried unchanged into the next generation
    pub fn elite_count(&self) -> usize {
        let raw = (self.population_size as f64 * self.elite_rate).round() as usize;
        raw.max(1).min(self.population_size.max(1))
    }

    /// Number of agents whose output is distilled each generation
    pub fn distillation_count(&self) -> usize {
        self.population_size.div_ceil(5)
    }
}
