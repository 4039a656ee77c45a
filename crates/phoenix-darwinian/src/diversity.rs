//! Population diversity
//!
//! Distance between two agents is the RMS difference over the union of their
//! trait names; a trait one agent lacks counts as [`MISSING_TRAIT_VALUE`].

use std::collections::{BTreeMap, BTreeSet};

use phoenix_common::{AgentState, DiversityMetrics, NamingStyle, SpiritType, MISSING_TRAIT_VALUE};

use crate::selection::ranked_by_fitness;

/// RMS trait difference between two agents
pub fn trait_distance(a: &AgentState, b: &AgentState) -> f64 {
    let a_traits = a.all_traits();
    let b_traits = b.all_traits();
    let names: BTreeSet<&String> = a_traits.keys().chain(b_traits.keys()).collect();
    if names.is_empty() {
        return 0.0;
    }

    let sum_sq: f64 = names
        .iter()
        .map(|name| {
            let va = a_traits.get(*name).copied().unwrap_or(MISSING_TRAIT_VALUE);
            let vb = b_traits.get(*name).copied().unwrap_or(MISSING_TRAIT_VALUE);
            (va - vb).powi(2)
        })
        .sum();
    (sum_sq / names.len() as f64).sqrt()
}

/// Mean pairwise trait distance, 0.0 for fewer than two agents
pub fn diversity_score(population: &[AgentState]) -> f64 {
    if population.len() < 2 {
        return 0.0;
    }
    let mut total = 0.0;
    let mut pairs = 0usize;
    for (i, a) in population.iter().enumerate() {
        for b in &population[i + 1..] {
            total += trait_distance(a, b);
            pairs += 1;
        }
    }
    total / pairs as f64
}

/// Greedy diverse subset starting from the fittest agent
///
/// An agent joins the subset only if its distance to every agent already
/// chosen is at least `threshold`. Returns indices into `population`.
pub fn maintain_diversity(population: &[AgentState], threshold: f64) -> Vec<usize> {
    let mut chosen: Vec<usize> = Vec::new();
    for candidate in ranked_by_fitness(population) {
        let far_enough = chosen
            .iter()
            .all(|&c| trait_distance(&population[candidate], &population[c]) >= threshold);
        if far_enough {
            chosen.push(candidate);
        }
    }
    chosen
}

/// Trait, spirit and style diversity of a population
pub fn diversity_metrics(population: &[AgentState]) -> DiversityMetrics {
    let spirits = counts(population.iter().map(|a| a.spirit));
    let styles = counts(population.iter().map(|a| a.style));

    DiversityMetrics {
        trait_diversity: diversity_score(population),
        spirit_diversity: normalized_entropy(&spirits, SpiritType::ALL.len()),
        style_diversity: normalized_entropy(&styles, NamingStyle::ALL.len()),
        unique_spirits: spirits.len(),
        unique_styles: styles.len(),
    }
}

fn counts<T: Ord>(items: impl Iterator<Item = T>) -> BTreeMap<T, usize> {
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    counts
}

/// Shannon entropy divided by ln(categories)
fn normalized_entropy<T>(counts: &BTreeMap<T, usize>, categories: usize) -> f64 {
    let total: usize = counts.values().sum();
    if total == 0 || categories < 2 {
        return 0.0;
    }
    let entropy: f64 = counts
        .values()
        .map(|&c| {
            let p = c as f64 / total as f64;
            -p * p.ln()
        })
        .sum();
    entropy / (categories as f64).ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use phoenix_common::{MetricScores, PerformanceMetrics, StatisticalSignificance, TraitGroup};

    fn agent(id: &str, spirit: SpiritType, traits: &[(&str, f64)], fitness: f64) -> AgentState {
        let mut builder = AgentState::builder(id, spirit, NamingStyle::Foundation);
        for (name, value) in traits {
            builder = builder.trait_value(TraitGroup::Personality, *name, *value);
        }
        let mut agent = builder.build().unwrap();
        agent.record_performance(PerformanceMetrics::new(
            MetricScores {
                fitness,
                ..MetricScores::default()
            },
            StatisticalSignificance::default(),
        ));
        agent
    }

    #[test]
    fn test_diversity_of_small_and_identical_populations() {
        let a = agent("a", SpiritType::Fox, &[("x", 0.3)], 0.5);
        assert_eq!(diversity_score(&[]), 0.0);
        assert_eq!(diversity_score(&[a.clone()]), 0.0);
        assert_eq!(diversity_score(&[a.clone(), a.clone(), a]), 0.0);
    }

    #[test]
    fn test_maximally_different_agents() {
        let a = agent("a", SpiritType::Fox, &[("x", 0.0), ("y", 1.0)], 0.5);
        let b = agent("b", SpiritType::Fox, &[("x", 1.0), ("y", 0.0)], 0.5);
        assert!((diversity_score(&[a, b]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_traits_count_as_midpoint() {
        let a = agent("a", SpiritType::Fox, &[("x", 1.0)], 0.5);
        let b = agent("b", SpiritType::Fox, &[], 0.5);
        assert!((trait_distance(&a, &b) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_maintain_diversity_starts_from_fittest() {
        let population = vec![
            agent("low", SpiritType::Fox, &[("x", 0.10)], 0.1),
            agent("best", SpiritType::Fox, &[("x", 0.12)], 0.9),
            agent("far", SpiritType::Fox, &[("x", 0.90)], 0.5),
        ];
        let subset = maintain_diversity(&population, 0.1);
        assert_eq!(subset, vec![1, 2]);
        assert_eq!(population.len(), 3);
    }

    #[test]
    fn test_diversity_metrics_entropy() {
        let population: Vec<AgentState> = SpiritType::ALL
            .iter()
            .enumerate()
            .map(|(i, s)| agent(&format!("a{i}"), *s, &[("x", 0.5)], 0.5))
            .collect();
        let metrics = diversity_metrics(&population);
        assert_eq!(metrics.unique_spirits, 10);
        assert!((metrics.spirit_diversity - 1.0).abs() < 1e-12);
        assert_eq!(metrics.unique_styles, 1);
        assert_eq!(metrics.style_diversity, 0.0);
    }
}
