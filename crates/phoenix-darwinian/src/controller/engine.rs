//! Evolution engine
//!
//! Drives a run generation by generation. Each generation evaluates every
//! agent, distills knowledge from the top performers, then hands the
//! evaluated state to the pure [`evolve`](super::step::evolve) step and
//! notifies the registered hooks.

use std::sync::Arc;

use phoenix_common::{AgentState, PhoenixConfig, PhoenixError, PhoenixEvolutionState};
use phoenix_distill::{ExtractionOptions, KnowledgeDistillationEngine, PerformanceAnalyzer, TaskInput};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use super::generator::{OutputGenerator, DISTILLATION_TASK, EVALUATION_TASK};
use super::hooks::{EvolutionHook, HookRegistry};
use super::report::{summarize, EvolutionSummary, GenerationReport};
use super::step::{evolve, generation_seed};
use crate::diversity::maintain_diversity;
use crate::population::{fit_to_size, initial_population};
use crate::selection::ranked_by_fitness;

pub struct PhoenixEngine {
    config: PhoenixConfig,
    analyzer: PerformanceAnalyzer,
    distiller: KnowledgeDistillationEngine,
    generator: Arc<dyn OutputGenerator>,
    hooks: HookRegistry,
}

impl PhoenixEngine {
    /// Fails on an invalid configuration
    pub fn new(config: PhoenixConfig, generator: Arc<dyn OutputGenerator>) -> Result<Self, PhoenixError> {
        config.validate()?;
        let analyzer = PerformanceAnalyzer::new(config.significance_threshold)?;
        let distiller = KnowledgeDistillationEngine::new()?;

        info!(
            population_size = config.population_size,
            max_generations = config.max_generations,
            selection = ?config.selection_method,
            "Evolution engine ready"
        );

        Ok(Self {
            config,
            analyzer,
            distiller,
            generator,
            hooks: HookRegistry::new(),
        })
    }

    pub fn config(&self) -> &PhoenixConfig {
        &self.config
    }

    pub fn distiller(&self) -> &KnowledgeDistillationEngine {
        &self.distiller
    }

    pub fn register_hook(&self, hook: Arc<dyn EvolutionHook>) {
        self.hooks.register(hook);
    }

    /// Build generation 0 from optional seed agents
    pub async fn initialize_population(
        &self,
        seeds: Option<Vec<AgentState>>,
    ) -> Result<PhoenixEvolutionState, PhoenixError> {
        let population = initial_population(seeds, self.config.population_size)?;
        info!(agents = population.len(), "Population initialized");

        self.hooks.population_initialized(&population).await;
        Ok(PhoenixEvolutionState::new(population))
    }

    /// Evaluate, distill and evolve one generation
    pub async fn run_generation(
        &self,
        mut state: PhoenixEvolutionState,
    ) -> Result<PhoenixEvolutionState, PhoenixError> {
        let generation = state.current_generation + 1;
        info!(generation, "Running generation");

        self.evaluate(&mut state.population).await;
        if self.config.enable_knowledge_distillation {
            self.distill(&mut state, generation).await;
        }

        let mut rng = StdRng::seed_from_u64(generation_seed(self.config.seed, generation));
        let state = evolve(state, &self.config, &mut rng)?;

        let failures = self.hooks.generation_completed(generation, &state).await;
        if failures > 0 {
            debug!(generation, failures, "Some hooks failed");
        }
        Ok(state)
    }

    /// Run until `max_generations` or convergence
    pub async fn run_evolution(
        &self,
        mut state: PhoenixEvolutionState,
    ) -> Result<PhoenixEvolutionState, PhoenixError> {
        while state.current_generation < self.config.max_generations {
            state = self.run_generation(state).await?;
            if state.is_converged() {
                info!(generation = state.current_generation, "Population converged");
                break;
            }
        }

        let summary = self.summary(&state);
        info!(
            generations = summary.total_generations,
            best_fitness = summary.best_fitness,
            converged = summary.converged,
            "Evolution finished"
        );
        Ok(state)
    }

    pub fn summary(&self, state: &PhoenixEvolutionState) -> EvolutionSummary {
        summarize(state, &self.config)
    }

    pub fn report(&self, state: &PhoenixEvolutionState) -> Option<GenerationReport> {
        GenerationReport::from_state(state, &self.config)
    }

    /// Replace agents too close to a fitter one with fresh founders.
    /// Returns how many agents were replaced.
    pub fn prune_for_diversity(&self, state: &mut PhoenixEvolutionState) -> Result<usize, PhoenixError> {
        let keep = maintain_diversity(&state.population, self.config.diversity_threshold);
        let removed = state.population.len() - keep.len();
        if removed == 0 {
            return Ok(0);
        }

        let kept: Vec<AgentState> = keep.into_iter().map(|i| state.population[i].clone()).collect();
        state.population = fit_to_size(kept, self.config.population_size, state.current_generation)?;
        info!(removed, "Pruned near-duplicate agents");
        Ok(removed)
    }

    async fn evaluate(&self, population: &mut [AgentState]) {
        for agent in population.iter_mut() {
            match self.generator.generate(agent, EVALUATION_TASK).await {
                Ok(output) => {
                    let metrics = self.analyzer.analyze(agent, &output, self.config.fitness_source);
                    debug!(agent = %agent.id, fitness = metrics.fitness(), "Evaluated agent");
                    agent.record_performance(metrics);
                }
                Err(e) => warn!(agent = %agent.id, error = %e, "Evaluation failed, skipping agent"),
            }
        }
    }

    async fn distill(&self, state: &mut PhoenixEvolutionState, generation: u32) {
        let top: Vec<usize> = ranked_by_fitness(&state.population)
            .into_iter()
            .take(self.config.distillation_count())
            .collect();
        let options = ExtractionOptions::from(&self.config);

        for index in top {
            let agent = &state.population[index];
            let output = match self.generator.generate(agent, DISTILLATION_TASK).await {
                Ok(output) => output,
                Err(e) => {
                    warn!(agent = %agent.id, error = %e, "Generation for distillation failed");
                    continue;
                }
            };

            let task = TaskInput {
                task: DISTILLATION_TASK,
                input: EVALUATION_TASK,
            };
            let material = match self
                .distiller
                .extract_genetic_material(agent, &output, generation, task, options)
            {
                Ok(material) => material,
                Err(e) => {
                    warn!(agent = %agent.id, error = %e, "Distillation failed");
                    continue;
                }
            };

            if self.config.enable_document_conditioning {
                let agent = &mut state.population[index];
                if let Err(e) = self.distiller.condition_agent(agent, &material) {
                    warn!(agent = %agent.id, error = %e, "Conditioning failed");
                }
            }
            state.genetic_material_pool.push(material);
        }

        debug!(
            generation,
            pool = state.genetic_material_pool.len(),
            "Distillation complete"
        );
    }
}
