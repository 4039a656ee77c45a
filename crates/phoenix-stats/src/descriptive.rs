//! Descriptive statistics and t-based confidence intervals

use phoenix_common::StatisticsError;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Variance with `ddof` delta degrees of freedom (0 = population, 1 = sample)
pub fn variance(data: &[f64], ddof: usize) -> f64 {
    if data.len() <= ddof {
        return 0.0;
    }
    let m = mean(data);
    data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (data.len() - ddof) as f64
}

pub fn std_dev(data: &[f64], ddof: usize) -> f64 {
    variance(data, ddof).sqrt()
}

/// Standard error of the mean
pub fn sem(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    std_dev(data, 1) / (data.len() as f64).sqrt()
}

/// Two-sided quantile of a Student t with `df` degrees of freedom
pub(crate) fn t_critical(df: f64, confidence: f64) -> Result<f64, StatisticsError> {
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| StatisticsError::Distribution(e.to_string()))?;
    Ok(dist.inverse_cdf((1.0 + confidence) / 2.0))
}

/// Two-sided p-value of a t statistic
pub(crate) fn t_p_value(t: f64, df: f64) -> Result<f64, StatisticsError> {
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| StatisticsError::Distribution(e.to_string()))?;
    Ok((2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0))
}

/// mean ± t · SEM; `(0, 0)` for fewer than two values
pub fn confidence_interval(data: &[f64], confidence: f64) -> Result<(f64, f64), StatisticsError> {
    if data.len() < 2 {
        return Ok((0.0, 0.0));
    }
    let m = mean(data);
    let margin = t_critical((data.len() - 1) as f64, confidence)? * sem(data);
    Ok((m - margin, m + margin))
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub confidence_interval: (f64, f64),
}

impl Summary {
    pub fn of(data: &[f64], confidence: f64) -> Result<Self, StatisticsError> {
        if data.is_empty() {
            return Ok(Self::default());
        }
        Ok(Self {
            mean: mean(data),
            std: std_dev(data, 0),
            min: data.iter().copied().fold(f64::INFINITY, f64::min),
            max: data.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            confidence_interval: confidence_interval(data, confidence)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_variance_ddof() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert!((variance(&data, 0) - 1.25).abs() < 1e-12);
        assert!((variance(&data, 1) - 5.0 / 3.0).abs() < 1e-12);
        assert_eq!(variance(&[1.0], 1), 0.0);
    }

    #[test]
    fn test_confidence_interval_known_value() {
        // mean 3, sem = sqrt(2.5)/sqrt(5), t(0.975, 4) ≈ 2.776
        let (lo, hi) = confidence_interval(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.95).unwrap();
        assert!((lo - 1.0367).abs() < 1e-3);
        assert!((hi - 4.9633).abs() < 1e-3);
    }

    #[test]
    fn test_short_data_interval() {
        assert_eq!(confidence_interval(&[0.4], 0.95).unwrap(), (0.0, 0.0));
    }

    #[test]
    fn test_summary() {
        let s = Summary::of(&[0.2, 0.4, 0.6], 0.95).unwrap();
        assert!((s.mean - 0.4).abs() < 1e-12);
        assert_eq!(s.min, 0.2);
        assert_eq!(s.max, 0.6);
        assert_eq!(Summary::of(&[], 0.95).unwrap(), Summary::default());
    }

    proptest! {
        #[test]
        fn test_interval_contains_mean(data in prop::collection::vec(0.0f64..1.0, 2..40)) {
            let (lo, hi) = confidence_interval(&data, 0.95).unwrap();
            let m = mean(&data);
            prop_assert!(lo <= m + 1e-12 && m <= hi + 1e-12);
        }
    }
}
