//! Output generation boundary
//!
//! The orchestrator never talks to a model directly. It asks an
//! [`OutputGenerator`] for the text an agent produces for a task; the
//! default [`SimulatedOutputGenerator`] composes it deterministically from
//! the agent's spirit and strongest traits.

use async_trait::async_trait;
use phoenix_common::{AgentError, AgentState, SpiritType, TraitGroup};

/// Task used when scoring every agent of a generation
pub const EVALUATION_TASK: &str =
    "Analyze and provide a strategic solution for optimizing system performance";

/// Task used when distilling knowledge from top performers
pub const DISTILLATION_TASK: &str = "Provide a comprehensive analysis and strategic recommendations";

/// Traits at or above this value contribute a sentence
pub const EXPRESSED_TRAIT_THRESHOLD: f64 = 0.6;

const MAX_TRAIT_SENTENCES: usize = 5;

/// Produces the text an agent writes for a task
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OutputGenerator: Send + Sync {
    async fn generate(&self, agent: &AgentState, task: &str) -> Result<String, AgentError>;
}

fn spirit_keywords(spirit: SpiritType) -> [&'static str; 3] {
    match spirit {
        SpiritType::Fox => ["strategy", "adaptation", "clever analysis"],
        SpiritType::Wolf => ["teamwork", "coordination", "loyal collaboration"],
        SpiritType::Otter => ["creativity", "exploration", "playful experimentation"],
        SpiritType::Eagle => ["vision", "precision", "independent research"],
        SpiritType::Lion => ["leadership", "courage", "decisive management"],
        SpiritType::Tiger => ["focus", "execution", "relentless optimization"],
        SpiritType::Dragon => ["mastery", "architecture", "deep expertise"],
        SpiritType::Phoenix => ["renewal", "resilience", "transformative recovery"],
        SpiritType::Alien => ["invention", "novel design", "unconventional insight"],
        SpiritType::Yeti => ["patience", "endurance", "methodical documentation"],
    }
}

fn trait_sentence(name: &str) -> Option<&'static str> {
    let sentence = match name {
        "dominance" => "We should take the lead and direct the team toward the main objective.",
        "independence" => "I will investigate the problem independently and verify every assumption.",
        "patience" => "A careful, step by step process ensures we measure each result before moving on.",
        "aggression" => "We must tackle the core bottleneck directly and fix it first.",
        "charisma" => "Clear communication keeps the stakeholders aligned and the team engaged.",
        "creativity" => "Imagine a novel design: an innovative cache layer that adapts to usage patterns.",
        "perfectionism" => "Specifically, we validate the data precisely and test every edge case.",
        "adaptability" => "If the load changes then we adjust the configuration and modify the plan.",
        "strength" => "The system must be robust and maintain throughput under heavy load.",
        "agility" => "Alternatively, we can iterate quickly and pivot when the metrics shift.",
        "endurance" => "We consistently monitor the service to ensure reliable long-term operation.",
        "strategist" => "Our strategy sets long-term goals and milestones, based on evidence from the data.",
        "hunter" => "First, we track down the slowest queries and resolve them one by one.",
        "teacher" => "For example, the documentation explains the approach so every developer can apply it.",
        "artist" => "A clean visual interface improves the user experience of the dashboard.",
        "healer" => "We diagnose failing components and restore the health of the service.",
        "inventor" => "We could build a new algorithm and experiment with an original prototype.",
        _ => return None,
    };
    Some(sentence)
}

/// Deterministic generator driven by spirit and trait values
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedOutputGenerator;

impl SimulatedOutputGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Compose the output without going through the async boundary
    pub fn compose(&self, agent: &AgentState, task: &str) -> String {
        let [primary, secondary, signature] = spirit_keywords(agent.spirit);

        let mut ranked: Vec<(&String, f64)> = TraitGroup::ALL
            .iter()
            .flat_map(|group| agent.traits(*group).iter().map(|(name, value)| (name, *value)))
            .filter(|(_, value)| *value >= EXPRESSED_TRAIT_THRESHOLD)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let mut sentences = vec![format!(
            "As a {} agent, I approach the task \"{}\" with {} and {}.",
            agent.spirit, task, primary, secondary
        )];
        sentences.extend(
            ranked
                .iter()
                .filter_map(|(name, _)| trait_sentence(name))
                .take(MAX_TRAIT_SENTENCES)
                .map(str::to_string),
        );
        sentences.push(format!(
            "Therefore, the recommended next step is to implement the solution with {signature} and verify the result."
        ));
        sentences.join(" ")
    }
}

#[async_trait]
impl OutputGenerator for SimulatedOutputGenerator {
    async fn generate(&self, agent: &AgentState, task: &str) -> Result<String, AgentError> {
        Ok(self.compose(agent, task))
    }
}
