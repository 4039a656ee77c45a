//! Ordinary least squares of one variable on another

use phoenix_common::StatisticsError;
use serde::{Deserialize, Serialize};

use crate::descriptive::{mean, t_critical, t_p_value};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_value: f64,
    pub p_value: f64,
    pub std_err: f64,
    /// Two-sided confidence interval of the slope
    pub slope_ci: (f64, f64),
    /// No residual degrees of freedom or no variance in x or y
    pub degenerate: bool,
}

impl LinearFit {
    pub fn is_significant(&self, alpha: f64) -> bool {
        !self.degenerate && self.p_value < alpha
    }
}

/// Regress `y` on `x`. Needs at least two points.
///
/// Degenerate fits report p = 1 and a collapsed slope interval.
pub fn linear_regression(x: &[f64], y: &[f64], alpha: f64) -> Result<LinearFit, StatisticsError> {
    let n = x.len().min(y.len());
    if n < 2 {
        return Err(StatisticsError::Distribution(format!(
            "regression needs at least 2 points, got {n}"
        )));
    }
    let (x, y) = (&x[..n], &y[..n]);
    let (mx, my) = (mean(x), mean(y));

    let sxx: f64 = x.iter().map(|v| (v - mx).powi(2)).sum();
    let syy: f64 = y.iter().map(|v| (v - my).powi(2)).sum();
    let sxy: f64 = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum();

    if sxx <= f64::EPSILON || syy <= f64::EPSILON {
        let slope = if sxx > f64::EPSILON { sxy / sxx } else { 0.0 };
        return Ok(LinearFit {
            slope,
            intercept: my - slope * mx,
            r_value: 0.0,
            p_value: 1.0,
            std_err: 0.0,
            slope_ci: (slope, slope),
            degenerate: true,
        });
    }

    let slope = sxy / sxx;
    let intercept = my - slope * mx;
    let r_value = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);

    let df = n - 2;
    if df == 0 {
        return Ok(LinearFit {
            slope,
            intercept,
            r_value,
            p_value: 1.0,
            std_err: 0.0,
            slope_ci: (slope, slope),
            degenerate: true,
        });
    }

    let residual = (syy - slope * sxy).max(0.0);
    let std_err = (residual / df as f64 / sxx).sqrt();
    let p_value = if std_err > 0.0 {
        t_p_value(slope / std_err, df as f64)?
    } else {
        0.0
    };
    let margin = t_critical(df as f64, 1.0 - alpha)? * std_err;

    Ok(LinearFit {
        slope,
        intercept,
        r_value,
        p_value,
        std_err,
        slope_ci: (slope - margin, slope + margin),
        degenerate: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_line() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.1, 0.3, 0.5, 0.7];
        let fit = linear_regression(&x, &y, 0.05).unwrap();
        assert!((fit.slope - 0.2).abs() < 1e-12);
        assert!((fit.intercept - 0.1).abs() < 1e-12);
        assert!((fit.r_value - 1.0).abs() < 1e-12);
        assert!(fit.p_value < 1e-6);
        assert!(fit.is_significant(0.05));
    }

    #[test]
    fn test_noisy_trend() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [0.30, 0.34, 0.33, 0.40, 0.41];
        let fit = linear_regression(&x, &y, 0.05).unwrap();
        assert!(fit.slope > 0.0);
        assert!(fit.slope_ci.0 < fit.slope && fit.slope < fit.slope_ci.1);
        assert!(fit.p_value > 0.0 && fit.p_value < 0.05);
    }

    #[test]
    fn test_two_points_have_no_residual_df() {
        let fit = linear_regression(&[1.0, 2.0], &[0.2, 0.4], 0.05).unwrap();
        assert!(fit.degenerate);
        assert_eq!(fit.p_value, 1.0);
        assert!((fit.slope - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_constant_response() {
        let fit = linear_regression(&[1.0, 2.0, 3.0], &[0.5, 0.5, 0.5], 0.05).unwrap();
        assert!(fit.degenerate);
        assert_eq!(fit.p_value, 1.0);
        assert!(!fit.is_significant(0.05));
    }

    #[test]
    fn test_single_point_is_an_error() {
        assert!(linear_regression(&[1.0], &[0.5], 0.05).is_err());
    }
}
