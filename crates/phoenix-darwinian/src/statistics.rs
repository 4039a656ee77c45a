//! Per-generation statistics and convergence detection

use phoenix_common::{
    AgentState, ConvergenceKind, ConvergenceStatus, EvolutionStatistics, StatisticalSignificance,
    StatisticsError, CONVERGENCE_WINDOW,
};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::info;

use crate::diversity::diversity_score;

/// Confidence reported when both fitness and diversity have settled
pub const CONVERGENCE_CONFIDENCE: f64 = 0.95;

/// Population variance (divides by n)
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

/// Snapshot of an evaluated population
///
/// The significance compares this generation's mean fitness with the
/// previous one: effect = Δmean / sd, z = effect·√n.
pub fn generation_statistics(
    population: &[AgentState],
    generation: u32,
    previous: Option<&EvolutionStatistics>,
    alpha: f64,
) -> Result<EvolutionStatistics, StatisticsError> {
    if population.is_empty() {
        return Err(StatisticsError::EmptyPopulation);
    }

    let mut samples = Vec::with_capacity(population.len());
    for agent in population {
        let fitness = agent.fitness();
        if !fitness.is_finite() {
            return Err(StatisticsError::NonFiniteFitness {
                agent_id: agent.id.clone(),
                value: fitness,
            });
        }
        samples.push(fitness);
    }

    let n = samples.len() as f64;
    let average_fitness = samples.iter().sum::<f64>() / n;
    let best_fitness = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let fitness_variance = population_variance(&samples);

    let convergence_rate = match previous {
        Some(prev) if prev.average_fitness > 0.0 => {
            (average_fitness - prev.average_fitness).abs() / prev.average_fitness
        }
        _ => 0.0,
    };

    let significance = mean_shift_significance(
        average_fitness,
        fitness_variance.sqrt(),
        samples.len(),
        previous.map(|p| p.average_fitness),
        alpha,
    )?;

    let stats = EvolutionStatistics {
        generation,
        population_size: population.len(),
        average_fitness,
        best_fitness,
        fitness_variance,
        population_diversity: diversity_score(population),
        convergence_rate,
        significance,
        fitness_samples: samples,
        timestamp: chrono::Utc::now(),
    };

    info!(
        generation,
        avg_fitness = stats.average_fitness,
        best_fitness = stats.best_fitness,
        diversity = stats.population_diversity,
        "Generation statistics"
    );

    Ok(stats)
}

fn mean_shift_significance(
    mean: f64,
    sd: f64,
    n: usize,
    previous_mean: Option<f64>,
    alpha: f64,
) -> Result<StatisticalSignificance, StatisticsError> {
    let normal = Normal::new(0.0, 1.0).map_err(|e| StatisticsError::Distribution(e.to_string()))?;
    let z_crit = normal.inverse_cdf(1.0 - alpha / 2.0);
    let sqrt_n = (n as f64).sqrt();
    let margin = z_crit * sd / sqrt_n;
    let confidence_interval = ((mean - margin).max(0.0), (mean + margin).min(1.0));

    let (p_value, effect_size, power) = match previous_mean {
        Some(prev) if sd > 0.0 => {
            let effect = (mean - prev) / sd;
            let z = effect * sqrt_n;
            let p = (2.0 * (1.0 - normal.cdf(z.abs()))).clamp(0.0, 1.0);
            (p, effect, normal.cdf(z.abs() - z_crit))
        }
        _ => (1.0, 0.0, 0.0),
    };

    Ok(StatisticalSignificance {
        p_value,
        confidence_interval,
        effect_size,
        power,
        sample_size: n,
    })
}

/// Converged when the variance of the last [`CONVERGENCE_WINDOW`] average
/// fitness values and of the last diversity values are both below `threshold`
pub fn check_convergence(
    history: &[EvolutionStatistics],
    threshold: f64,
    generation: u32,
) -> ConvergenceStatus {
    if history.len() < CONVERGENCE_WINDOW {
        return ConvergenceStatus::default();
    }

    let window = &history[history.len() - CONVERGENCE_WINDOW..];
    let fitness: Vec<f64> = window.iter().map(|s| s.average_fitness).collect();
    let diversity: Vec<f64> = window.iter().map(|s| s.population_diversity).collect();
    let fitness_variance = population_variance(&fitness);
    let diversity_variance = population_variance(&diversity);

    if fitness_variance < threshold && diversity_variance < threshold {
        ConvergenceStatus {
            converged: true,
            convergence_generation: Some(generation),
            confidence: CONVERGENCE_CONFIDENCE,
            kind: ConvergenceKind::Mixed,
            fitness_variance,
            diversity_variance,
        }
    } else {
        ConvergenceStatus {
            fitness_variance,
            diversity_variance,
            ..ConvergenceStatus::default()
        }
    }
}
