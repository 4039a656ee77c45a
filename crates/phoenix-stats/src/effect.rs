//! Standardized effect sizes between two groups

use serde::{Deserialize, Serialize};

use crate::descriptive::{mean, std_dev, variance};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectMagnitude {
    Negligible,
    Small,
    Medium,
    Large,
}

impl EffectMagnitude {
    /// Cohen's conventional bins on |d|
    pub fn of(effect: f64) -> Self {
        let effect = effect.abs();
        if effect < 0.2 {
            EffectMagnitude::Negligible
        } else if effect < 0.5 {
            EffectMagnitude::Small
        } else if effect < 0.8 {
            EffectMagnitude::Medium
        } else {
            EffectMagnitude::Large
        }
    }
}

impl std::fmt::Display for EffectMagnitude {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EffectMagnitude::Negligible => "negligible",
            EffectMagnitude::Small => "small",
            EffectMagnitude::Medium => "medium",
            EffectMagnitude::Large => "large",
        };
        write!(f, "{s} effect")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectSizes {
    pub cohens_d: f64,
    pub hedges_g: f64,
    pub glass_delta: f64,
    pub magnitude: EffectMagnitude,
}

/// Cohen's d of `after` against `before`, pooled sd √((s1² + s2²) / 2)
pub fn cohens_d(before: &[f64], after: &[f64]) -> f64 {
    let pooled = ((variance(before, 1) + variance(after, 1)) / 2.0).sqrt();
    if pooled > 0.0 {
        (mean(after) - mean(before)) / pooled
    } else {
        0.0
    }
}

/// Effect sizes of `after` against `before`; `None` unless both groups
/// have at least two values
pub fn effect_sizes(before: &[f64], after: &[f64]) -> Option<EffectSizes> {
    if before.len() < 2 || after.len() < 2 {
        return None;
    }

    let d = cohens_d(before, after);
    let df = (before.len() + after.len() - 2) as f64;
    let hedges_g = d * (1.0 - 3.0 / (4.0 * df - 1.0));

    let control_sd = std_dev(before, 1);
    let glass_delta = if control_sd > 0.0 {
        (mean(after) - mean(before)) / control_sd
    } else {
        0.0
    };

    Some(EffectSizes {
        cohens_d: d,
        hedges_g,
        glass_delta,
        magnitude: EffectMagnitude::of(d),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitude_bins() {
        assert_eq!(EffectMagnitude::of(0.1), EffectMagnitude::Negligible);
        assert_eq!(EffectMagnitude::of(-0.3), EffectMagnitude::Small);
        assert_eq!(EffectMagnitude::of(0.5), EffectMagnitude::Medium);
        assert_eq!(EffectMagnitude::of(1.2), EffectMagnitude::Large);
        assert_eq!(EffectMagnitude::Large.to_string(), "large effect");
    }

    #[test]
    fn test_effect_sizes() {
        let before = [0.2, 0.3, 0.4];
        let after = [0.5, 0.6, 0.7];
        let sizes = effect_sizes(&before, &after).unwrap();
        // both sample sds are 0.1
        assert!((sizes.cohens_d - 3.0).abs() < 1e-9);
        assert!((sizes.hedges_g - 3.0 * (1.0 - 3.0 / 15.0)).abs() < 1e-9);
        assert!((sizes.glass_delta - 3.0).abs() < 1e-9);
        assert_eq!(sizes.magnitude, EffectMagnitude::Large);
    }

    #[test]
    fn test_effect_sizes_need_two_values() {
        assert!(effect_sizes(&[0.2], &[0.4, 0.5]).is_none());
    }

    #[test]
    fn test_zero_variance_gives_zero_effect() {
        assert_eq!(cohens_d(&[0.5, 0.5], &[0.5, 0.5]), 0.0);
    }
}
