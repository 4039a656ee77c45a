//! Mutation of offspring traits

use phoenix_common::{AgentState, NamingStyle, SpiritType, TraitGroup};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::StandardNormal;

/// Standard deviation of the noise added to a mutated trait
pub const MUTATION_STD_DEV: f64 = 0.1;

/// Spirit and style are re-rolled at this fraction of the mutation rate
pub const IDENTITY_MUTATION_FACTOR: f64 = 0.1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationReport {
    pub mutated_traits: usize,
    pub spirit_changed: bool,
    pub style_changed: bool,
}

impl MutationReport {
    pub fn is_unchanged(&self) -> bool {
        self.mutated_traits == 0 && !self.spirit_changed && !self.style_changed
    }
}

/// Mutate every trait of `agent` with probability `rate`
pub fn mutate<R: Rng + ?Sized>(agent: &mut AgentState, rate: f64, rng: &mut R) -> MutationReport {
    let mut report = MutationReport::default();
    if rate <= 0.0 {
        return report;
    }
    let rate = rate.min(1.0);

    for group in TraitGroup::ALL {
        let current: Vec<(String, f64)> = agent
            .traits(group)
            .iter()
            .map(|(name, value)| (name.clone(), *value))
            .collect();
        for (name, value) in current {
            if rng.gen_bool(rate) {
                let noise: f64 = rng.sample::<f64, _>(StandardNormal) * MUTATION_STD_DEV;
                agent.set_trait(group, name, value + noise);
                report.mutated_traits += 1;
            }
        }
    }

    let identity_rate = rate * IDENTITY_MUTATION_FACTOR;
    if rng.gen_bool(identity_rate) {
        if let Some(spirit) = SpiritType::ALL.choose(rng) {
            report.spirit_changed = *spirit != agent.spirit;
            agent.spirit = *spirit;
        }
    }
    if rng.gen_bool(identity_rate) {
        if let Some(style) = NamingStyle::ALL.choose(rng) {
            report.style_changed = *style != agent.style;
            agent.style = *style;
        }
    }

    report
}

/// Mutate every agent, returning the total number of mutated traits
pub fn mutate_all<R: Rng + ?Sized>(agents: &mut [AgentState], rate: f64, rng: &mut R) -> usize {
    agents
        .iter_mut()
        .map(|agent| mutate(agent, rate, rng).mutated_traits)
        .sum()
}
