//! Full statistical report of a run

use chrono::{DateTime, Utc};
use phoenix_common::{EvolutionStatistics, StatisticsError};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::StatisticalAnalysis;
use crate::descriptive::Summary;
use crate::effect::{effect_sizes, EffectSizes};
use crate::power::{power_analysis, PowerAnalysis};
use crate::validator::StatisticalValidator;

/// Confidence level of the summary intervals
pub const SUMMARY_CONFIDENCE: f64 = 0.95;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generation_count: usize,
    pub analysis_timestamp: DateTime<Utc>,
    pub significance_threshold: f64,
    pub target_power: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub fitness: Summary,
    pub diversity: Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Excellent,
    Good,
    NeedsImprovement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallAssessment {
    pub status: AssessmentStatus,
    pub assessment: String,
    pub significant_tests: usize,
    pub total_tests: usize,
    pub recommendations: Vec<String>,
}

impl OverallAssessment {
    fn from_analyses(
        performance: &StatisticalAnalysis,
        convergence: &StatisticalAnalysis,
        diversity: &StatisticalAnalysis,
    ) -> Self {
        let tests = [performance, convergence, diversity];
        let significant_tests = tests.iter().filter(|t| t.is_significant).count();

        let (status, assessment) = match significant_tests {
            n if n >= 2 => (
                AssessmentStatus::Excellent,
                "Evolution is showing strong statistical evidence of improvement",
            ),
            1 => (
                AssessmentStatus::Good,
                "Evolution is showing some statistical evidence of improvement",
            ),
            _ => (
                AssessmentStatus::NeedsImprovement,
                "Evolution is not showing strong statistical evidence of improvement",
            ),
        };

        let mut recommendations = Vec::new();
        if !performance.is_significant {
            recommendations
                .push("Consider running more generations or adjusting selection pressure".to_string());
        }
        if !convergence.is_significant {
            recommendations
                .push("Population may not be converging - check diversity maintenance".to_string());
        }
        if !diversity.is_significant {
            recommendations
                .push("Monitor population diversity - may need parameter adjustment".to_string());
        }

        Self {
            status,
            assessment: assessment.to_string(),
            significant_tests,
            total_tests: tests.len(),
            recommendations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalReport {
    pub metadata: ReportMetadata,
    pub performance: StatisticalAnalysis,
    pub convergence: StatisticalAnalysis,
    pub diversity: StatisticalAnalysis,
    pub summary: SummaryStatistics,
    /// First against last generation, when both carry at least two samples
    pub effect_sizes: Option<EffectSizes>,
    pub power: Option<PowerAnalysis>,
    pub assessment: OverallAssessment,
}

impl StatisticalValidator {
    pub fn report(&self, history: &[EvolutionStatistics]) -> Result<StatisticalReport, StatisticsError> {
        let performance = self.analyze_performance(history)?;
        let convergence = self.analyze_convergence(history)?;
        let diversity = self.analyze_diversity(history)?;

        let fitness: Vec<f64> = history.iter().map(|s| s.average_fitness).collect();
        let diversity_scores: Vec<f64> = history.iter().map(|s| s.population_diversity).collect();
        let summary = SummaryStatistics {
            fitness: Summary::of(&fitness, SUMMARY_CONFIDENCE)?,
            diversity: Summary::of(&diversity_scores, SUMMARY_CONFIDENCE)?,
        };

        let effect_sizes = match (history.first(), history.last()) {
            (Some(first), Some(last)) if history.len() >= 2 => {
                effect_sizes(&first.fitness_samples, &last.fitness_samples)
            }
            _ => None,
        };
        let power = match (effect_sizes, history.first(), history.last()) {
            (Some(sizes), Some(first), Some(last)) => Some(power_analysis(
                sizes.cohens_d,
                first.fitness_samples.len() + last.fitness_samples.len(),
                self.alpha(),
                self.target_power(),
            )?),
            _ => None,
        };

        let assessment = OverallAssessment::from_analyses(&performance, &convergence, &diversity);
        info!(
            generations = history.len(),
            significant_tests = assessment.significant_tests,
            status = ?assessment.status,
            "Statistical report generated"
        );

        Ok(StatisticalReport {
            metadata: ReportMetadata {
                generation_count: history.len(),
                analysis_timestamp: Utc::now(),
                significance_threshold: self.alpha(),
                target_power: self.target_power(),
            },
            performance,
            convergence,
            diversity,
            summary,
            effect_sizes,
            power,
            assessment,
        })
    }
}
