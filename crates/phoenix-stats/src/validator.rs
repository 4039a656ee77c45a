//! Hypothesis tests over a run's statistics history

use phoenix_common::{
    ConfigError, EvolutionStatistics, PhoenixConfig, StatisticsError, CONVERGENCE_WINDOW,
    MIN_EFFECT_SIZE, TARGET_POWER,
};
use tracing::{debug, info};

use crate::analysis::StatisticalAnalysis;
use crate::descriptive::{mean, t_critical, t_p_value, variance};
use crate::effect::cohens_d;
use crate::regression::{linear_regression, LinearFit};

/// Generations needed before a trend can be fitted
pub const MIN_TREND_GENERATIONS: usize = 2;

/// Generations needed before diversity is analyzed
pub const MIN_DIVERSITY_GENERATIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticalValidator {
    alpha: f64,
    target_power: f64,
    min_effect_size: f64,
}

impl StatisticalValidator {
    pub fn new(alpha: f64) -> Result<Self, ConfigError> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(ConfigError::InvalidSignificance(alpha));
        }
        Ok(Self {
            alpha,
            target_power: TARGET_POWER,
            min_effect_size: MIN_EFFECT_SIZE,
        })
    }

    pub fn from_config(config: &PhoenixConfig) -> Result<Self, ConfigError> {
        Self::new(config.significance_threshold)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn target_power(&self) -> f64 {
        self.target_power
    }

    pub fn min_effect_size(&self) -> f64 {
        self.min_effect_size
    }

    /// OLS of average fitness on generation
    pub fn analyze_trend(
        &self,
        history: &[EvolutionStatistics],
    ) -> Result<StatisticalAnalysis, StatisticsError> {
        if history.len() < MIN_TREND_GENERATIONS {
            return Ok(StatisticalAnalysis::insufficient_data("trend", MIN_TREND_GENERATIONS));
        }
        let x: Vec<f64> = history.iter().map(|s| s.generation as f64).collect();
        let y: Vec<f64> = history.iter().map(|s| s.average_fitness).collect();
        let fit = linear_regression(&x, &y, self.alpha)?;

        let significant = fit.is_significant(self.alpha);
        let direction = if fit.slope > 0.0 { "increasing" } else { "decreasing" };
        let interpretation = if significant {
            format!(
                "Fitness shows {direction} trend over generations (p={:.4}, r={:.3})",
                fit.p_value, fit.r_value
            )
        } else {
            format!(
                "Fitness shows {direction} trend over generations (not significant, p={:.4})",
                fit.p_value
            )
        };

        let mut recommendations = Vec::new();
        if significant && fit.slope > 0.0 {
            recommendations.push("Evolution is showing significant improvement".to_string());
        } else if !significant {
            recommendations
                .push("Consider running more generations or adjusting parameters".to_string());
        }

        Ok(self.fit_analysis("linear_trend_analysis", &fit, significant, interpretation, recommendations))
    }

    /// Welch t-test between the first and last generation's fitness samples
    pub fn analyze_improvement(
        &self,
        history: &[EvolutionStatistics],
    ) -> Result<StatisticalAnalysis, StatisticsError> {
        let (first, last) = match (history.first(), history.last()) {
            (Some(first), Some(last)) if history.len() >= MIN_TREND_GENERATIONS => (first, last),
            _ => {
                return Ok(StatisticalAnalysis::insufficient_data(
                    "improvement",
                    MIN_TREND_GENERATIONS,
                ))
            }
        };
        let (before, after) = (&first.fitness_samples, &last.fitness_samples);
        let diff = last.average_fitness - first.average_fitness;

        if before.len() < 2 || after.len() < 2 {
            return Ok(indeterminate(diff, "fitness samples are missing"));
        }
        let (v1, v2) = (variance(before, 1), variance(after, 1));
        if v1 <= f64::EPSILON && v2 <= f64::EPSILON {
            return Ok(indeterminate(diff, "fitness has zero variance in both generations"));
        }

        let (n1, n2) = (before.len() as f64, after.len() as f64);
        let (se1, se2) = (v1 / n1, v2 / n2);
        let se = (se1 + se2).sqrt();
        let df = (se1 + se2).powi(2) / (se1.powi(2) / (n1 - 1.0) + se2.powi(2) / (n2 - 1.0));
        let diff = mean(after) - mean(before);

        let p_value = t_p_value(diff / se, df)?;
        let margin = t_critical(df, 1.0 - self.alpha)? * se;
        let effect = cohens_d(before, after);
        let significant = p_value < self.alpha;
        debug!(t = diff / se, df, p_value, effect, "Welch improvement test");

        let interpretation = if significant {
            format!("Fitness improvement: {diff:.3} (significant, p={p_value:.4}, d={effect:.3})")
        } else {
            format!("Fitness improvement: {diff:.3} (not significant, p={p_value:.4})")
        };
        let mut recommendations = Vec::new();
        if significant && diff > 0.0 {
            recommendations.push("Significant improvement detected - evolution is working".to_string());
        } else if !significant {
            recommendations
                .push("No significant improvement - consider parameter adjustment".to_string());
        }

        Ok(StatisticalAnalysis {
            test_name: "generation_improvement_test".to_string(),
            p_value,
            effect_size: effect.abs(),
            confidence_interval: (diff - margin, diff + margin),
            is_significant: significant,
            low_confidence: false,
            interpretation,
            recommendations,
        })
    }

    /// Trend and improvement combined: the larger p-value and the larger
    /// effect; significant only when p < α and the effect exceeds the minimum
    pub fn analyze_performance(
        &self,
        history: &[EvolutionStatistics],
    ) -> Result<StatisticalAnalysis, StatisticsError> {
        info!(generations = history.len(), "Analyzing performance");
        if history.len() < MIN_TREND_GENERATIONS {
            return Ok(StatisticalAnalysis::insufficient_data(
                "performance",
                MIN_TREND_GENERATIONS,
            ));
        }

        let trend = self.analyze_trend(history)?;
        let improvement = self.analyze_improvement(history)?;

        let p_value = trend.p_value.max(improvement.p_value);
        let effect_size = trend.effect_size.max(improvement.effect_size);
        let mut recommendations = trend.recommendations.clone();
        for r in &improvement.recommendations {
            if !recommendations.contains(r) {
                recommendations.push(r.clone());
            }
        }

        let combined = StatisticalAnalysis {
            test_name: "combined_analysis".to_string(),
            p_value,
            effect_size,
            confidence_interval: improvement.confidence_interval,
            is_significant: p_value < self.alpha && effect_size > self.min_effect_size,
            low_confidence: trend.low_confidence || improvement.low_confidence,
            interpretation: format!(
                "Combined analysis: {}. {}",
                trend.interpretation, improvement.interpretation
            ),
            recommendations,
        };
        info!(
            p_value = combined.p_value,
            effect_size = combined.effect_size,
            significant = combined.is_significant,
            "Performance analysis complete"
        );
        Ok(combined)
    }

    /// Fitness variance and diversity over the last generations must both
    /// fall with a significant slope
    pub fn analyze_convergence(
        &self,
        history: &[EvolutionStatistics],
    ) -> Result<StatisticalAnalysis, StatisticsError> {
        if history.len() < CONVERGENCE_WINDOW {
            return Ok(StatisticalAnalysis::insufficient_data("convergence", CONVERGENCE_WINDOW));
        }
        let window = &history[history.len() - CONVERGENCE_WINDOW..];
        let x: Vec<f64> = (0..window.len()).map(|i| i as f64).collect();
        let variances: Vec<f64> = window.iter().map(|s| s.fitness_variance).collect();
        let diversity: Vec<f64> = window.iter().map(|s| s.population_diversity).collect();

        let variance_fit = linear_regression(&x, &variances, self.alpha)?;
        let diversity_fit = linear_regression(&x, &diversity, self.alpha)?;

        let converging = variance_fit.slope < 0.0
            && diversity_fit.slope < 0.0
            && variance_fit.is_significant(self.alpha)
            && diversity_fit.is_significant(self.alpha);

        let trend = |fit: &LinearFit| if fit.slope < 0.0 { "decreasing" } else { "not decreasing" };
        let interpretation = format!(
            "Fitness variance {} (p={:.4}), diversity {} (p={:.4}): {}",
            trend(&variance_fit),
            variance_fit.p_value,
            trend(&diversity_fit),
            diversity_fit.p_value,
            if converging { "converging" } else { "not converging" }
        );
        let recommendation = if converging {
            "Population is converging - consider stopping evolution"
        } else {
            "Population not converging - continue evolution or adjust parameters"
        };

        Ok(StatisticalAnalysis {
            test_name: "convergence_analysis".to_string(),
            p_value: variance_fit.p_value.max(diversity_fit.p_value),
            effect_size: variance_fit.r_value.abs().min(diversity_fit.r_value.abs()),
            confidence_interval: variance_fit.slope_ci,
            is_significant: converging,
            low_confidence: variance_fit.degenerate || diversity_fit.degenerate,
            interpretation,
            recommendations: vec![recommendation.to_string()],
        })
    }

    /// Regression of population diversity on generation
    pub fn analyze_diversity(
        &self,
        history: &[EvolutionStatistics],
    ) -> Result<StatisticalAnalysis, StatisticsError> {
        if history.len() < MIN_DIVERSITY_GENERATIONS {
            return Ok(StatisticalAnalysis::insufficient_data(
                "diversity",
                MIN_DIVERSITY_GENERATIONS,
            ));
        }
        let x: Vec<f64> = history.iter().map(|s| s.generation as f64).collect();
        let y: Vec<f64> = history.iter().map(|s| s.population_diversity).collect();
        let fit = linear_regression(&x, &y, self.alpha)?;

        let significant = fit.is_significant(self.alpha);
        let direction = if fit.slope > 0.0 { "increasing" } else { "decreasing" };
        let interpretation = if significant {
            format!(
                "Population diversity is {direction} (significant, p={:.4}, r={:.3})",
                fit.p_value, fit.r_value
            )
        } else {
            format!("Population diversity is {direction} (not significant, p={:.4})", fit.p_value)
        };
        let recommendation = match (significant, fit.slope < 0.0) {
            (true, true) => "Diversity is decreasing - consider increasing mutation rate",
            (true, false) => "Diversity is increasing - good for exploration",
            _ => "Diversity trend not significant - monitor closely",
        };

        Ok(self.fit_analysis(
            "diversity_analysis",
            &fit,
            significant,
            interpretation,
            vec![recommendation.to_string()],
        ))
    }

    fn fit_analysis(
        &self,
        test_name: &str,
        fit: &LinearFit,
        is_significant: bool,
        interpretation: String,
        recommendations: Vec<String>,
    ) -> StatisticalAnalysis {
        StatisticalAnalysis {
            test_name: test_name.to_string(),
            p_value: fit.p_value,
            effect_size: fit.r_value.abs(),
            confidence_interval: fit.slope_ci,
            is_significant,
            low_confidence: fit.degenerate,
            interpretation,
            recommendations,
        }
    }
}

fn indeterminate(diff: f64, reason: &str) -> StatisticalAnalysis {
    StatisticalAnalysis {
        test_name: "generation_improvement_test".to_string(),
        p_value: 1.0,
        effect_size: 0.0,
        confidence_interval: (diff, diff),
        is_significant: false,
        low_confidence: true,
        interpretation: format!("Fitness improvement: {diff:.3} (indeterminate, {reason})"),
        recommendations: vec!["Record per-agent fitness with non-zero spread".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phoenix_common::StatisticalSignificance;

    fn snapshot(
        generation: u32,
        samples: Vec<f64>,
        fitness_variance: f64,
        diversity: f64,
    ) -> EvolutionStatistics {
        let average_fitness = mean(&samples);
        EvolutionStatistics {
            generation,
            population_size: samples.len(),
            average_fitness,
            best_fitness: samples.iter().copied().fold(0.0, f64::max),
            fitness_variance,
            population_diversity: diversity,
            convergence_rate: 0.0,
            significance: StatisticalSignificance::default(),
            fitness_samples: samples,
            timestamp: chrono::Utc::now(),
        }
    }

    fn validator() -> StatisticalValidator {
        StatisticalValidator::new(0.05).unwrap()
    }

    fn improving_history() -> Vec<EvolutionStatistics> {
        (1..=6)
            .map(|g| {
                let base = 0.2 + 0.1 * g as f64;
                let samples = vec![base - 0.02, base, base + 0.02, base + 0.01, base - 0.01];
                snapshot(g, samples, 0.05 / g as f64, 0.5 - 0.05 * g as f64 + 0.001 * (g % 2) as f64)
            })
            .collect()
    }

    #[test]
    fn test_invalid_alpha() {
        assert_eq!(
            StatisticalValidator::new(1.5).unwrap_err(),
            ConfigError::InvalidSignificance(1.5)
        );
    }

    #[test]
    fn test_short_histories_are_insufficient() {
        let v = validator();
        let one = vec![snapshot(1, vec![0.4, 0.5], 0.0, 0.3)];
        let trend = v.analyze_trend(&one).unwrap();
        assert!(!trend.is_significant);
        assert!(trend.interpretation.contains("insufficient"));

        let four: Vec<_> = (1..=4).map(|g| snapshot(g, vec![0.4, 0.5], 0.0, 0.3)).collect();
        let convergence = v.analyze_convergence(&four).unwrap();
        assert!(!convergence.is_significant);
        assert!(convergence.interpretation.contains("insufficient"));

        let diversity = v.analyze_diversity(&four[..2]).unwrap();
        assert!(!diversity.is_significant);
        assert!(diversity.interpretation.contains("insufficient"));
    }

    #[test]
    fn test_improving_run_is_significant() {
        let v = validator();
        let history = improving_history();

        let trend = v.analyze_trend(&history).unwrap();
        assert!(trend.is_significant);
        assert!(trend.effect_size > 0.99);

        let improvement = v.analyze_improvement(&history).unwrap();
        assert!(improvement.is_significant);
        assert!(improvement.confidence_interval.0 > 0.0);
        assert!(!improvement.low_confidence);

        let performance = v.analyze_performance(&history).unwrap();
        assert_eq!(performance.test_name, "combined_analysis");
        assert!(performance.is_significant);
        assert_eq!(performance.p_value, trend.p_value.max(improvement.p_value));
    }

    #[test]
    fn test_constant_fitness_is_indeterminate() {
        let history = vec![
            snapshot(1, vec![0.5; 4], 0.0, 0.2),
            snapshot(2, vec![0.5; 4], 0.0, 0.2),
        ];
        let improvement = validator().analyze_improvement(&history).unwrap();
        assert_eq!(improvement.p_value, 1.0);
        assert!(improvement.low_confidence);
        assert!(!improvement.is_significant);
        assert!(improvement.interpretation.contains("indeterminate"));
    }

    #[test]
    fn test_missing_samples_are_indeterminate() {
        let mut history = improving_history();
        history[0].fitness_samples.clear();
        let improvement = validator().analyze_improvement(&history).unwrap();
        assert_eq!(improvement.p_value, 1.0);
        assert!(improvement.low_confidence);
    }

    #[test]
    fn test_convergence_needs_both_slopes_falling() {
        let v = validator();
        let history = improving_history();
        let result = v.analyze_convergence(&history).unwrap();
        assert_eq!(result.test_name, "convergence_analysis");
        assert!(result.is_significant);

        let flat_diversity: Vec<_> = history
            .iter()
            .map(|s| EvolutionStatistics {
                population_diversity: 0.3,
                ..s.clone()
            })
            .collect();
        assert!(!v.analyze_convergence(&flat_diversity).unwrap().is_significant);
    }

    #[test]
    fn test_diversity_decline_recommendation() {
        let result = validator().analyze_diversity(&improving_history()).unwrap();
        assert!(result.is_significant);
        assert!(result.recommendations[0].contains("increasing mutation rate"));
    }
}
