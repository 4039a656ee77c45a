//! Parent selection
//!
//! | method              | pick                                                  |
//! |---------------------|-------------------------------------------------------|
//! | tournament          | fittest of `k` uniform draws                          |
//! | roulette            | weight = (fitness − min⁻)^pressure                    |
//! | rank                | weight = rank^pressure, rank 1 = least fit            |
//! | elite preservation  | uniform over the top fifth                            |

use ordered_float::OrderedFloat;
use phoenix_common::{AgentState, PhoenixConfig, SelectionMethod, MAX_SELECTION_RETRIES};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::trace;

/// Picks parents from a population according to the configured method
#[derive(Debug, Clone)]
pub struct ParentSelector {
    method: SelectionMethod,
    pressure: f64,
    tournament_size: usize,
}

impl ParentSelector {
    pub fn new(method: SelectionMethod, pressure: f64, tournament_size: usize) -> Self {
        Self {
            method,
            pressure,
            tournament_size: tournament_size.max(1),
        }
    }

    pub fn from_config(config: &PhoenixConfig) -> Self {
        Self::new(
            config.selection_method,
            config.selection_pressure,
            config.tournament_size,
        )
    }

    pub fn method(&self) -> SelectionMethod {
        self.method
    }

    /// Index of one selected agent, `None` for an empty population
    pub fn select<R: Rng + ?Sized>(&self, population: &[AgentState], rng: &mut R) -> Option<usize> {
        if population.is_empty() {
            return None;
        }
        let index = match self.method {
            SelectionMethod::Tournament => self.tournament(population, rng),
            SelectionMethod::Roulette => self.roulette(population, rng),
            SelectionMethod::Rank => self.rank(population, rng),
            SelectionMethod::ElitePreservation => elite_pick(population, rng),
        };
        Some(index)
    }

    /// Two parents, distinct whenever the population has more than one agent
    pub fn select_pair<R: Rng + ?Sized>(
        &self,
        population: &[AgentState],
        rng: &mut R,
    ) -> Option<(usize, usize)> {
        let first = self.select(population, rng)?;
        if population.len() == 1 {
            return Some((first, first));
        }

        for _ in 0..MAX_SELECTION_RETRIES {
            let second = self.select(population, rng)?;
            if second != first {
                return Some((first, second));
            }
        }

        let neighbor = (first + 1) % population.len();
        trace!(first, neighbor, "Selection retries exhausted, using neighbor");
        Some((first, neighbor))
    }

    /// `count` parent pairs
    pub fn select_pairs<R: Rng + ?Sized>(
        &self,
        population: &[AgentState],
        count: usize,
        rng: &mut R,
    ) -> Vec<(usize, usize)> {
        (0..count)
            .filter_map(|_| self.select_pair(population, rng))
            .collect()
    }

    fn tournament<R: Rng + ?Sized>(&self, population: &[AgentState], rng: &mut R) -> usize {
        (0..self.tournament_size)
            .map(|_| rng.gen_range(0..population.len()))
            .max_by_key(|&i| OrderedFloat(population[i].fitness()))
            .unwrap_or(0)
    }

    fn roulette<R: Rng + ?Sized>(&self, population: &[AgentState], rng: &mut R) -> usize {
        let min = population
            .iter()
            .map(|a| OrderedFloat(a.fitness()))
            .min()
            .map(|f| f.0)
            .unwrap_or(0.0);
        let shift = if min < 0.0 { -min } else { 0.0 };

        let weights: Vec<f64> = population
            .iter()
            .map(|a| (a.fitness() + shift).powf(self.pressure))
            .collect();
        weighted_pick(&weights, rng)
    }

    fn rank<R: Rng + ?Sized>(&self, population: &[AgentState], rng: &mut R) -> usize {
        let mut ascending: Vec<usize> = (0..population.len()).collect();
        ascending.sort_by_key(|&i| OrderedFloat(population[i].fitness()));

        let weights: Vec<f64> = (1..=ascending.len())
            .map(|rank| (rank as f64).powf(self.pressure))
            .collect();
        ascending[weighted_pick(&weights, rng)]
    }
}

/// Weighted draw, uniform when every weight is zero
fn weighted_pick<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> usize {
    match WeightedIndex::new(weights) {
        Ok(dist) => dist.sample(rng),
        Err(_) => rng.gen_range(0..weights.len()),
    }
}

fn elite_pick<R: Rng + ?Sized>(population: &[AgentState], rng: &mut R) -> usize {
    let ranked = ranked_by_fitness(population);
    let top = population.len().div_ceil(5).max(1);
    ranked[rng.gen_range(0..top)]
}

/// Indices ordered from fittest to least fit; ties keep population order
pub fn ranked_by_fitness(population: &[AgentState]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..population.len()).collect();
    indices.sort_by_key(|&i| std::cmp::Reverse(OrderedFloat(population[i].fitness())));
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use phoenix_common::{
        MetricScores, NamingStyle, PerformanceMetrics, SpiritType, StatisticalSignificance,
    };
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn agent(i: usize, fitness: f64) -> AgentState {
        let mut agent = AgentState::builder(format!("agent_{i:03}"), SpiritType::Fox, NamingStyle::Exo)
            .build()
            .unwrap();
        agent.record_performance(PerformanceMetrics::new(
            MetricScores {
                fitness,
                ..MetricScores::default()
            },
            StatisticalSignificance::default(),
        ));
        agent
    }

    fn population(fitness: &[f64]) -> Vec<AgentState> {
        fitness.iter().enumerate().map(|(i, f)| agent(i, *f)).collect()
    }

    const METHODS: [SelectionMethod; 4] = [
        SelectionMethod::Tournament,
        SelectionMethod::Roulette,
        SelectionMethod::Rank,
        SelectionMethod::ElitePreservation,
    ];

    #[test]
    fn test_parents_are_distinct() {
        let pop = population(&[0.1, 0.2, 0.9, 0.4, 0.5]);
        let mut rng = StdRng::seed_from_u64(7);
        for method in METHODS {
            let selector = ParentSelector::new(method, 1.0, 3);
            for _ in 0..1000 {
                let (a, b) = selector.select_pair(&pop, &mut rng).unwrap();
                assert_ne!(a, b, "{method:?}");
            }
        }
    }

    #[test]
    fn test_single_agent_and_empty_population() {
        let mut rng = StdRng::seed_from_u64(1);
        let selector = ParentSelector::new(SelectionMethod::Tournament, 1.0, 3);
        assert_eq!(selector.select_pair(&population(&[0.5]), &mut rng), Some((0, 0)));
        assert_eq!(selector.select(&[], &mut rng), None);
    }

    #[test]
    fn test_elite_preservation_picks_from_top_fifth() {
        let pop = population(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0]);
        let selector = ParentSelector::new(SelectionMethod::ElitePreservation, 1.0, 3);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let i = selector.select(&pop, &mut rng).unwrap();
            assert!(i == 8 || i == 9);
        }
    }

    #[test]
    fn test_pressure_favors_fitter_agents() {
        let pop = population(&[0.1, 0.9]);
        let selector = ParentSelector::new(SelectionMethod::Roulette, 3.0, 3);
        let mut rng = StdRng::seed_from_u64(11);
        let fit = (0..1000)
            .filter(|_| selector.select(&pop, &mut rng) == Some(1))
            .count();
        assert!(fit > 900);
    }

    #[test]
    fn test_roulette_with_zero_fitness_is_uniform() {
        let pop = population(&[0.0, 0.0, 0.0]);
        let selector = ParentSelector::new(SelectionMethod::Roulette, 1.0, 3);
        let mut rng = StdRng::seed_from_u64(5);
        let mut seen = [false; 3];
        for _ in 0..100 {
            seen[selector.select(&pop, &mut rng).unwrap()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_ranked_by_fitness() {
        let pop = population(&[0.3, 0.9, 0.3, 0.1]);
        assert_eq!(ranked_by_fitness(&pop), vec![1, 0, 2, 3]);
    }

    proptest! {
        #[test]
        fn prop_selected_index_in_bounds(
            fitness in prop::collection::vec(0.0f64..=1.0, 1..20),
            seed in any::<u64>(),
            method in 0usize..4,
        ) {
            let pop = population(&fitness);
            let selector = ParentSelector::new(METHODS[method], 2.0, 3);
            let mut rng = StdRng::seed_from_u64(seed);
            let (a, b) = selector.select_pair(&pop, &mut rng).unwrap();
            prop_assert!(a < pop.len() && b < pop.len());
            if pop.len() > 1 {
                prop_assert_ne!(a, b);
            }
        }
    }
}
