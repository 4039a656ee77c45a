//! Power analysis under the normal approximation

use phoenix_common::StatisticsError;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerAnalysis {
    pub achieved_power: f64,
    /// `None` without samples
    pub min_detectable_effect: Option<f64>,
    /// `None` when the effect is zero
    pub required_sample_size: Option<usize>,
    pub effect_size: f64,
    pub sample_size: usize,
    pub alpha: f64,
    pub target_power: f64,
}

/// power = Φ(|d|·√n − z₁₋α/₂), MDE = (z₁₋α/₂ + z_power)/√n,
/// n_required = ⌈((z₁₋α/₂ + z_power)/d)²⌉
pub fn power_analysis(
    effect_size: f64,
    sample_size: usize,
    alpha: f64,
    target_power: f64,
) -> Result<PowerAnalysis, StatisticsError> {
    let normal = Normal::new(0.0, 1.0).map_err(|e| StatisticsError::Distribution(e.to_string()))?;
    let z_alpha = normal.inverse_cdf(1.0 - alpha / 2.0);
    let z_power = normal.inverse_cdf(target_power);
    let sqrt_n = (sample_size as f64).sqrt();

    let achieved_power = if sample_size == 0 {
        0.0
    } else {
        normal.cdf(effect_size.abs() * sqrt_n - z_alpha)
    };
    let min_detectable_effect = (sample_size > 0).then(|| (z_alpha + z_power) / sqrt_n);
    let required_sample_size = if effect_size.abs() > f64::EPSILON {
        Some(((z_alpha + z_power) / effect_size.abs()).powi(2).ceil() as usize)
    } else {
        None
    };

    Ok(PowerAnalysis {
        achieved_power,
        min_detectable_effect,
        required_sample_size,
        effect_size,
        sample_size,
        alpha,
        target_power,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_grows_with_sample_size() {
        let small = power_analysis(0.5, 10, 0.05, 0.8).unwrap();
        let large = power_analysis(0.5, 100, 0.05, 0.8).unwrap();
        assert!(large.achieved_power > small.achieved_power);
        assert!(large.min_detectable_effect.unwrap() < small.min_detectable_effect.unwrap());
    }

    #[test]
    fn test_required_sample_size() {
        // (1.96 + 0.8416)² / 0.25 ≈ 31.4
        let analysis = power_analysis(0.5, 10, 0.05, 0.8).unwrap();
        assert_eq!(analysis.required_sample_size, Some(32));
    }

    #[test]
    fn test_zero_effect() {
        let analysis = power_analysis(0.0, 50, 0.05, 0.8).unwrap();
        assert_eq!(analysis.required_sample_size, None);
        assert!(analysis.achieved_power < 0.05);
    }
}
