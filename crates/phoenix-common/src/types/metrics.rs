//! PerformanceMetrics - Per-evaluation quality scores of an agent
//!
//! Every evaluation of an agent's output produces one immutable
//! `PerformanceMetrics` record which is appended to the agent's
//! performance history. All scores are normalized to [0, 1]:
//! - accuracy, efficiency, creativity, consistency: pattern hit-rates
//! - response_time: modeled from output size (higher = slower)
//! - generalization: breadth of domain coverage
//! - fitness: weighted combination used by selection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Clamp a score into [0, 1], mapping NaN to 0
#[inline]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Statistical support for a single performance measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalSignificance {
    /// Two-sided p-value
    pub p_value: f64,

    /// Confidence interval (low, high) around the measured fitness
    pub confidence_interval: (f64, f64),

    /// Estimated effect size
    pub effect_size: f64,

    /// Achieved statistical power
    pub power: f64,

    /// Number of observations behind the estimate
    pub sample_size: usize,
}

impl Default for StatisticalSignificance {
    fn default() -> Self {
        Self {
            p_value: 1.0,
            confidence_interval: (0.0, 0.0),
            effect_size: 0.0,
            power: 0.0,
            sample_size: 0,
        }
    }
}

impl StatisticalSignificance {
    /// Whether the measurement is significant at `alpha`
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Quality scores of one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    accuracy: f64,
    response_time: f64,
    efficiency: f64,
    generalization: f64,
    creativity: f64,
    consistency: f64,
    fitness: f64,
    significance: StatisticalSignificance,
    timestamp: DateTime<Utc>,
}

/// Raw scores handed to [`PerformanceMetrics::new`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricScores {
    pub accuracy: f64,
    pub response_time: f64,
    pub efficiency: f64,
    pub generalization: f64,
    pub creativity: f64,
    pub consistency: f64,
    pub fitness: f64,
}

impl PerformanceMetrics {
    /// Create a metrics record; every score is clamped to [0, 1]
    pub fn new(scores: MetricScores, significance: StatisticalSignificance) -> Self {
        Self::with_timestamp(scores, significance, Utc::now())
    }

    pub fn with_timestamp(
        scores: MetricScores,
        significance: StatisticalSignificance,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            accuracy: clamp_unit(scores.accuracy),
            response_time: clamp_unit(scores.response_time),
            efficiency: clamp_unit(scores.efficiency),
            generalization: clamp_unit(scores.generalization),
            creativity: clamp_unit(scores.creativity),
            consistency: clamp_unit(scores.consistency),
            fitness: clamp_unit(scores.fitness),
            significance,
            timestamp,
        }
    }

    #[inline]
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    #[inline]
    pub fn response_time(&self) -> f64 {
        self.response_time
    }

    #[inline]
    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    #[inline]
    pub fn generalization(&self) -> f64 {
        self.generalization
    }

    #[inline]
    pub fn creativity(&self) -> f64 {
        self.creativity
    }

    #[inline]
    pub fn consistency(&self) -> f64 {
        self.consistency
    }

    #[inline]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn significance(&self) -> &StatisticalSignificance {
        &self.significance
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Copy of the raw scores
    pub fn scores(&self) -> MetricScores {
        MetricScores {
            accuracy: self.accuracy,
            response_time: self.response_time,
            efficiency: self.efficiency,
            generalization: self.generalization,
            creativity: self.creativity,
            consistency: self.consistency,
            fitness: self.fitness,
        }
    }
}

impl std::fmt::Display for PerformanceMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Performance(fitness={:.3}, acc={:.3}, eff={:.3}, gen={:.3}, p={:.4})",
            self.fitness, self.accuracy, self.efficiency, self.generalization, self.significance.p_value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_clamps_scores() {
        let metrics = PerformanceMetrics::new(
            MetricScores {
                accuracy: 1.7,
                response_time: -0.2,
                efficiency: f64::NAN,
                fitness: 0.42,
                ..Default::default()
            },
            StatisticalSignificance::default(),
        );
        assert_eq!(metrics.accuracy(), 1.0);
        assert_eq!(metrics.response_time(), 0.0);
        assert_eq!(metrics.efficiency(), 0.0);
        assert_eq!(metrics.fitness(), 0.42);
    }

    #[test]
    fn test_default_significance_is_not_significant() {
        let sig = StatisticalSignificance::default();
        assert!(!sig.is_significant(0.05));
        assert_eq!(sig.p_value, 1.0);
    }

    #[test]
    fn test_serde_preserves_values() {
        let metrics = PerformanceMetrics::new(
            MetricScores {
                accuracy: 0.1 + 0.2,
                fitness: 1.0 / 3.0,
                ..Default::default()
            },
            StatisticalSignificance {
                p_value: 0.012,
                confidence_interval: (0.2, 0.45),
                effect_size: 0.61,
                power: 0.83,
                sample_size: 12,
            },
        );
        let json = serde_json::to_string(&metrics).unwrap();
        let back: PerformanceMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(back, metrics);
    }

    proptest! {
        #[test]
        fn prop_scores_always_in_unit_interval(a in -10.0f64..10.0, f in -10.0f64..10.0) {
            let m = PerformanceMetrics::new(
                MetricScores { accuracy: a, fitness: f, creativity: a * f, ..Default::default() },
                StatisticalSignificance::default(),
            );
            prop_assert!((0.0..=1.0).contains(&m.accuracy()));
            prop_assert!((0.0..=1.0).contains(&m.fitness()));
            prop_assert!((0.0..=1.0).contains(&m.creativity()));
        }
    }
}
