//! Result of a single statistical test

use serde::{Deserialize, Serialize};

/// Test name used whenever a history is too short to analyze
pub const INSUFFICIENT_DATA: &str = "insufficient_data";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalAnalysis {
    pub test_name: String,
    pub p_value: f64,
    pub effect_size: f64,
    pub confidence_interval: (f64, f64),
    pub is_significant: bool,
    /// Set when the test degenerated (zero variance, no residual degrees
    /// of freedom, missing samples) and the p-value carries no evidence
    pub low_confidence: bool,
    pub interpretation: String,
    pub recommendations: Vec<String>,
}

impl StatisticalAnalysis {
    /// Sentinel for a history shorter than `required` generations
    pub fn insufficient_data(analysis: &str, required: usize) -> Self {
        Self {
            test_name: INSUFFICIENT_DATA.to_string(),
            p_value: 1.0,
            effect_size: 0.0,
            confidence_interval: (0.0, 0.0),
            is_significant: false,
            low_confidence: true,
            interpretation: format!(
                "insufficient data for {analysis} analysis (need at least {required} generations)"
            ),
            recommendations: vec!["Collect more generations of data".to_string()],
        }
    }

    pub fn is_insufficient(&self) -> bool {
        self.test_name == INSUFFICIENT_DATA
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_sentinel() {
        let result = StatisticalAnalysis::insufficient_data("trend", 2);
        assert!(result.is_insufficient());
        assert!(!result.is_significant);
        assert_eq!(result.p_value, 1.0);
        assert_eq!(result.confidence_interval, (0.0, 0.0));
        assert!(result.interpretation.starts_with("insufficient data"));
    }
}
