//! The pure generation step
//!
//! ```text
//! evaluated population ──► elite (top max(1, round(n·elite_rate)))
//!                     └──► select pairs ──► breed ──► mutate ──► offspring
//! next population = elite ∪ offspring, truncated/padded to n
//! ```
//!
//! A selected pair breeds with probability `crossover_rate`; otherwise
//! parent1 is cloned into the offspring slot.
//!
//! Statistics describe the evaluated population the step started from; the
//! returned state carries the next population.

use phoenix_common::{
    AgentState, PhoenixConfig, PhoenixError, PhoenixEvolutionState, StatisticsError,
};
use rand::Rng;
use tracing::{debug, warn};

use crate::breeding::{breed, clone_parent, BreedingParams, OffspringSlot};
use crate::diversity::diversity_metrics;
use crate::mutation::mutate_all;
use crate::population::fit_to_size;
use crate::selection::{ranked_by_fitness, ParentSelector};
use crate::statistics::{check_convergence, generation_statistics};

/// Seed of the generator used for `generation`
pub fn generation_seed(seed: u64, generation: u32) -> u64 {
    seed ^ (generation as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Build the next generation from an evaluated population
pub fn evolve<R: Rng + ?Sized>(
    mut state: PhoenixEvolutionState,
    config: &PhoenixConfig,
    rng: &mut R,
) -> Result<PhoenixEvolutionState, PhoenixError> {
    if state.population.is_empty() {
        return Err(StatisticsError::EmptyPopulation.into());
    }
    let generation = state.current_generation + 1;
    let size = config.population_size;

    let elite_count = config.elite_count().min(state.population.len());
    let elite: Vec<AgentState> = ranked_by_fitness(&state.population)
        .into_iter()
        .take(elite_count)
        .map(|i| state.population[i].clone())
        .collect();

    let selector = ParentSelector::from_config(config);
    let pairs = selector.select_pairs(&state.population, size.saturating_sub(elite_count), rng);
    let params = BreedingParams {
        mutation_rate: config.mutation_rate,
    };

    let mut offspring = Vec::with_capacity(pairs.len());
    for (index, (p1, p2)) in pairs.into_iter().enumerate() {
        let slot = OffspringSlot { generation, index };
        let (parent1, parent2) = (&state.population[p1], &state.population[p2]);
        if !rng.gen_bool(config.crossover_rate) {
            match clone_parent(parent1, slot) {
                Ok(child) => offspring.push(child),
                Err(e) => warn!(error = %e, "Cloning failed, skipping pair"),
            }
            continue;
        }
        match breed(parent1, parent2, slot, params, rng) {
            Ok(result) => {
                debug!(
                    offspring = %result.offspring.id,
                    compatibility = result.compatibility,
                    "Bred offspring"
                );
                offspring.push(result.offspring);
            }
            Err(e) => warn!(error = %e, "Breeding failed, skipping pair"),
        }
    }
    let mutated = mutate_all(&mut offspring, config.mutation_rate, rng);
    debug!(generation, offspring = offspring.len(), mutated, "Mutated offspring");

    let elite_ids: Vec<String> = elite.iter().map(|a| a.id.clone()).collect();
    let mut next = elite;
    next.extend(offspring);
    let next = fit_to_size(next, size, generation)?;

    let stats = generation_statistics(
        &state.population,
        generation,
        state.history.last(),
        config.significance_threshold,
    )?;
    state.history.push(stats.clone());
    state.statistics = Some(stats);
    state.convergence = check_convergence(&state.history, config.convergence_threshold, generation);

    state.diversity_metrics = diversity_metrics(&next);
    state.population = next;
    state.elite = elite_ids;
    state.current_generation = generation;

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::synthesize_population;
    use phoenix_common::{MetricScores, PerformanceMetrics, StatisticalSignificance};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn evaluated(size: usize) -> PhoenixEvolutionState {
        let mut population = synthesize_population(size).unwrap();
        for (i, agent) in population.iter_mut().enumerate() {
            agent.record_performance(PerformanceMetrics::new(
                MetricScores {
                    fitness: i as f64 / size as f64,
                    ..MetricScores::default()
                },
                StatisticalSignificance::default(),
            ));
        }
        PhoenixEvolutionState::new(population)
    }

    fn config(size: usize) -> PhoenixConfig {
        PhoenixConfig {
            population_size: size,
            elite_rate: 0.2,
            ..PhoenixConfig::default()
        }
    }

    #[test]
    fn test_population_size_and_elite_are_kept() {
        let state = evaluated(10);
        let before = state.population.clone();
        let mut rng = StdRng::seed_from_u64(1);
        let next = evolve(state, &config(10), &mut rng).unwrap();

        assert_eq!(next.population.len(), 10);
        assert_eq!(next.elite, vec!["agent_009".to_string(), "agent_008".to_string()]);
        for id in &next.elite {
            let old = before.iter().find(|a| &a.id == id).unwrap();
            let new = next.agent(id).unwrap();
            assert_eq!(old.all_traits(), new.all_traits());
        }
        assert_eq!(next.current_generation, 1);
        assert_eq!(next.history.len(), 1);
        assert_eq!(next.history[0].population_size, 10);
    }

    #[test]
    fn test_offspring_lineage() {
        let mut rng = StdRng::seed_from_u64(2);
        let next = evolve(evaluated(6), &config(6), &mut rng).unwrap();
        let offspring: Vec<_> = next.population.iter().filter(|a| !a.is_founder()).collect();
        assert!(!offspring.is_empty());
        for child in offspring {
            assert_eq!(child.generation, 1);
            assert!((1..=2).contains(&child.parents().len()));
            assert!(child.id.starts_with("agent_g001_"));
        }
    }

    #[test]
    fn test_crossover_rate_decides_per_pair() {
        let bred = PhoenixConfig {
            crossover_rate: 1.0,
            ..config(6)
        };
        let next = evolve(evaluated(6), &bred, &mut StdRng::seed_from_u64(3)).unwrap();
        let offspring: Vec<_> = next.population.iter().filter(|a| !a.is_founder()).collect();
        assert_eq!(offspring.len(), 5);
        assert!(offspring.iter().all(|a| a.parents().len() == 2));

        let cloned = PhoenixConfig {
            crossover_rate: 0.0,
            mutation_rate: 0.0,
            ..config(6)
        };
        let state = evaluated(6);
        let before = state.population.clone();
        let next = evolve(state, &cloned, &mut StdRng::seed_from_u64(3)).unwrap();
        for child in next.population.iter().filter(|a| !a.is_founder()) {
            assert_eq!(child.parents().len(), 1);
            let parent = before.iter().find(|a| a.id == child.parents()[0]).unwrap();
            assert_eq!(child.all_traits(), parent.all_traits());
        }
    }

    #[test]
    fn test_evolve_is_reproducible() {
        let state = evaluated(8);
        let a = evolve(state.clone(), &config(8), &mut StdRng::seed_from_u64(5)).unwrap();
        let b = evolve(state, &config(8), &mut StdRng::seed_from_u64(5)).unwrap();
        let traits = |s: &PhoenixEvolutionState| s.population.iter().map(|a| a.all_traits()).collect::<Vec<_>>();
        assert_eq!(traits(&a), traits(&b));
    }

    #[test]
    fn test_empty_population_aborts() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = evolve(PhoenixEvolutionState::new(Vec::new()), &config(4), &mut rng).unwrap_err();
        assert!(matches!(err, PhoenixError::Statistics(StatisticsError::EmptyPopulation)));
    }

    #[test]
    fn test_generation_seed_varies() {
        assert_ne!(generation_seed(42, 1), generation_seed(42, 2));
        assert_eq!(generation_seed(42, 0), 42);
    }
}
