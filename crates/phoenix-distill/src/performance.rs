//! Performance analysis of agent output
//!
//! ```text
//! fitness = 0.30 accuracy + 0.20 efficiency + 0.15 creativity
//!         + 0.15 consistency + 0.20 generalization
//! ```
//!
//! With [`FitnessSource::TraitAverage`] the fitness is the agent's mean trait
//! value instead; the other scores are still computed from the text.

use phoenix_common::{
    AgentState, ConfigError, FitnessSource, MetricScores, PerformanceMetrics, PhoenixError,
    StatisticalSignificance, StatisticsError, TraitGroup,
};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

use crate::domain::DOMAIN_SPECS;
use crate::scoring::{PatternCategory, PatternTable, Scaling};
use crate::text::TextSample;

const ACCURACY_WEIGHT: f64 = 0.3;
const EFFICIENCY_WEIGHT: f64 = 0.2;
const CREATIVITY_WEIGHT: f64 = 0.15;
const CONSISTENCY_WEIGHT: f64 = 0.15;
const GENERALIZATION_WEIGHT: f64 = 0.2;

const GENERIC_TERMS: [&str; 7] = [
    "generally",
    "broadly",
    "across",
    "universal",
    "reusable",
    "transferable",
    "applicable",
];

type CatalogueEntry = (&'static str, f64, &'static [&'static str]);

const ACCURACY: [CatalogueEntry; 2] = [
    (
        "problem_solving",
        0.6,
        &[
            r"\b(solve|solution|resolve|fix)\b",
            r"\b(step|approach|method|process)\b",
            r"\b(result|outcome|answer|conclusion)\b",
            r"\b(because|therefore|thus|hence)\b",
        ],
    ),
    (
        "technical_accuracy",
        0.4,
        &[
            r"\b(specifically|precisely|exactly|correct)\b",
            r"\b\d+(\.\d+)?\b",
            r"\b(verify|validate|test|measure)\b",
            r"\b(according to|based on|evidence|data)\b",
        ],
    ),
];

const EFFICIENCY: [CatalogueEntry; 3] = [
    (
        "conciseness",
        0.3,
        &[
            r"\b(in short|briefly|in summary|to summarize)\b",
            r"\b(key|main|core|essential)\b",
            r"\b(simply|directly|clearly)\b",
        ],
    ),
    (
        "clarity",
        0.4,
        &[
            r"\b(first|second|then|finally)\b",
            r"\b(for example|such as|e\.g\.|i\.e\.)",
            r"\b(means|defined as|refers to|in other words)\b",
        ],
    ),
    (
        "actionability",
        0.3,
        &[
            r"\b(should|must|recommend|suggest)\b",
            r"\b(next step|action|implement|apply)\b",
            r"\b(start|begin|use|try)\b",
        ],
    ),
];

const CREATIVITY: [CatalogueEntry; 3] = [
    (
        "innovation",
        0.4,
        &[
            r"\b(novel|innovative|new|original|creative)\b",
            r"\b(imagine|invent|design|reimagine)\b",
            r"\b(unique|unconventional|fresh)\b",
        ],
    ),
    (
        "adaptation",
        0.3,
        &[
            r"\b(adapt|adjust|modify|tailor)\b",
            r"\b(alternatively|instead|otherwise)\b",
            r"\b(flexible|versatile|customize)\b",
        ],
    ),
    (
        "exploration",
        0.3,
        &[
            r"\b(explore|experiment|discover|investigate)\b",
            r"\b(what if|suppose|consider)\b",
            r"\b(possibility|opportunity|potential)\b",
        ],
    ),
];

const CONSISTENCY: [CatalogueEntry; 2] = [
    (
        "coherence",
        0.5,
        &[
            r"\b(therefore|thus|consequently|as a result)\b",
            r"\b(however|although|while|whereas)\b",
            r"\b(furthermore|moreover|additionally|also)\b",
        ],
    ),
    (
        "reliability",
        0.5,
        &[
            r"\b(consistently|reliably|always|every)\b",
            r"\b(ensure|guarantee|maintain|confirm)\b",
            r"\b(standard|proven|established|robust)\b",
        ],
    ),
];

fn compile_catalogue(name: &str, entries: &[CatalogueEntry]) -> Result<PatternTable, PhoenixError> {
    let mut table = PatternTable::new(name);
    for (category, weight, patterns) in entries {
        table.push(PatternCategory::new(*category, *weight, Scaling::Linear).with_regexes(patterns)?);
    }
    Ok(table)
}

/// Scores agent output and estimates the significance of the result
pub struct PerformanceAnalyzer {
    significance_level: f64,
    accuracy: PatternTable,
    efficiency: PatternTable,
    creativity: PatternTable,
    consistency: PatternTable,
    domain_contexts: Vec<PatternCategory>,
    generic: PatternCategory,
    normal: Normal,
}

impl PerformanceAnalyzer {
    pub fn new(significance_level: f64) -> Result<Self, PhoenixError> {
        if !(significance_level > 0.0 && significance_level < 1.0) {
            return Err(ConfigError::InvalidSignificance(significance_level).into());
        }
        let normal =
            Normal::new(0.0, 1.0).map_err(|e| StatisticsError::Distribution(e.to_string()))?;

        Ok(Self {
            significance_level,
            accuracy: compile_catalogue("accuracy", &ACCURACY)?,
            efficiency: compile_catalogue("efficiency", &EFFICIENCY)?,
            creativity: compile_catalogue("creativity", &CREATIVITY)?,
            consistency: compile_catalogue("consistency", &CONSISTENCY)?,
            domain_contexts: DOMAIN_SPECS
                .iter()
                .map(|spec| {
                    PatternCategory::new(spec.name, 1.0, Scaling::Linear).with_keywords(spec.context)
                })
                .collect(),
            generic: PatternCategory::new("generic", 1.0, Scaling::Linear).with_keywords(&GENERIC_TERMS),
            normal,
        })
    }

    pub fn significance_level(&self) -> f64 {
        self.significance_level
    }

    /// Score one output of `agent`
    pub fn analyze(&self, agent: &AgentState, output: &str, source: FitnessSource) -> PerformanceMetrics {
        let text = TextSample::new(output);

        let accuracy = self.accuracy.score(&text).aggregate;
        let efficiency = self.efficiency.score(&text).aggregate;
        let creativity = self.creativity.score(&text).aggregate;
        let consistency = self.consistency.score(&text).aggregate;
        let generalization = self.generalization(&text);
        let response_time = response_time(&text);

        let fitness = match source {
            FitnessSource::TextAnalysis => {
                accuracy * ACCURACY_WEIGHT
                    + efficiency * EFFICIENCY_WEIGHT
                    + creativity * CREATIVITY_WEIGHT
                    + consistency * CONSISTENCY_WEIGHT
                    + generalization * GENERALIZATION_WEIGHT
            }
            FitnessSource::TraitAverage => agent.trait_average(),
        };

        let significance = self.significance(agent, &text, fitness);

        debug!(
            agent_id = %agent.id,
            fitness = fitness,
            p_value = significance.p_value,
            "Analyzed performance"
        );

        PerformanceMetrics::new(
            MetricScores {
                accuracy,
                response_time,
                efficiency,
                generalization,
                creativity,
                consistency,
                fitness,
            },
            significance,
        )
    }

    /// Domain breadth plus generic applicability language
    pub fn generalization(&self, text: &TextSample<'_>) -> f64 {
        if self.domain_contexts.is_empty() {
            return 0.0;
        }
        let covered = self
            .domain_contexts
            .iter()
            .filter(|c| c.hits(text) > 0)
            .count();
        let breadth = covered as f64 / self.domain_contexts.len() as f64;
        let generic = (self.generic.hits(text) as f64 * 0.05).min(0.2);
        (breadth * 0.8 + generic).min(1.0)
    }

    fn significance(&self, agent: &AgentState, text: &TextSample<'_>, fitness: f64) -> StatisticalSignificance {
        let effect_size = agent.group_average(TraitGroup::Ability) * 0.5
            + agent.group_average(TraitGroup::Personality) * 0.3
            + (text.word_count() as f64 / 200.0).min(1.0) * 0.2;
        let sample_size = text.sentence_count();

        if sample_size == 0 {
            return StatisticalSignificance {
                effect_size,
                ..StatisticalSignificance::default()
            };
        }

        let n = sample_size as f64;
        let z = effect_size * n.sqrt();
        let p_value = (2.0 * (1.0 - self.normal.cdf(z.abs()))).clamp(0.0, 1.0);
        let z_crit = self.normal.inverse_cdf(1.0 - self.significance_level / 2.0);
        let power = self.normal.cdf(z - z_crit);

        let f = fitness.clamp(0.0, 1.0);
        let margin = z_crit * (f * (1.0 - f) / n).sqrt();

        StatisticalSignificance {
            p_value,
            confidence_interval: ((f - margin).max(0.0), (f + margin).min(1.0)),
            effect_size,
            power,
            sample_size,
        }
    }
}

/// Modeled response time from output size, in [0, 1]
pub fn response_time(text: &TextSample<'_>) -> f64 {
    let words = text.word_count() as f64 / 500.0 * 0.5;
    let chars = text.char_count() as f64 / 3000.0 * 0.3;
    let sentences = text.sentence_count() as f64 / 30.0 * 0.2;
    (words + chars + sentences).min(1.0)
}
