//! Breeding: trait crossover between two parents
//!
//! For every trait of parent1:
//!
//! ```text
//! base  = (p1 + p2) / 2   when p2 has the trait
//!       = p1              otherwise
//! child = clamp(base + N(0, mutation_rate), 0, 1)
//! ```
//!
//! Spirit and style are inherited from parent1 with probability 0.7, from
//! parent2 otherwise. Compatibility is reported and never gates breeding.
//!
//! Whether a selected pair breeds at all is decided per pair by the caller;
//! a pair that does not breed yields [`clone_parent`] of parent1.

use phoenix_common::{AgentError, AgentState, NamingStyle, SpiritType, TraitGroup, TraitMap};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::Serialize;

/// Probability that spirit and style come from parent1
pub const PRIMARY_PARENT_INHERITANCE: f64 = 0.7;

/// Where an offspring lands in a generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffspringSlot {
    /// Generation being produced by the run
    pub generation: u32,
    pub index: usize,
}

impl OffspringSlot {
    /// `agent_g{generation:03}_{index:03}`
    pub fn agent_id(&self) -> String {
        format!("agent_g{:03}_{:03}", self.generation, self.index)
    }
}

/// Parameters of one breeding
#[derive(Debug, Clone, Copy)]
pub struct BreedingParams {
    pub mutation_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreedingResult {
    pub offspring: AgentState,
    /// 1 − mean distance over common traits
    pub compatibility: f64,
    pub parent_ids: [String; 2],
}

/// Breed one offspring from two parents
pub fn breed<R: Rng + ?Sized>(
    parent1: &AgentState,
    parent2: &AgentState,
    slot: OffspringSlot,
    params: BreedingParams,
    rng: &mut R,
) -> Result<BreedingResult, AgentError> {
    let spirit = if rng.gen_bool(PRIMARY_PARENT_INHERITANCE) {
        parent1.spirit
    } else {
        parent2.spirit
    };
    let style = if rng.gen_bool(PRIMARY_PARENT_INHERITANCE) {
        parent1.style
    } else {
        parent2.style
    };
    let generation = parent1.generation.max(parent2.generation) + 1;

    let mut builder = AgentState::builder(slot.agent_id(), spirit, style)
        .name(offspring_name(spirit, style, slot))
        .generation(generation)
        .parents(vec![parent1.id.clone(), parent2.id.clone()]);
    for group in TraitGroup::ALL {
        builder = builder.traits(group, cross_traits(parent1, parent2, group, params, rng));
    }

    let offspring = builder.build().map_err(|e| AgentError::Breeding {
        parent1: parent1.id.clone(),
        parent2: parent2.id.clone(),
        reason: e.to_string(),
    })?;

    Ok(BreedingResult {
        offspring,
        compatibility: genetic_compatibility(parent1, parent2),
        parent_ids: [parent1.id.clone(), parent2.id.clone()],
    })
}

/// Carry parent1 into the next generation unchanged, under a new identity
/// with parent1 as its only parent
pub fn clone_parent(parent: &AgentState, slot: OffspringSlot) -> Result<AgentState, AgentError> {
    let mut builder = AgentState::builder(slot.agent_id(), parent.spirit, parent.style)
        .name(offspring_name(parent.spirit, parent.style, slot))
        .generation(parent.generation + 1)
        .parents(vec![parent.id.clone()]);
    for group in TraitGroup::ALL {
        builder = builder.traits(group, parent.traits(group).clone());
    }
    builder.build().map_err(|e| AgentError::Breeding {
        parent1: parent.id.clone(),
        parent2: parent.id.clone(),
        reason: e.to_string(),
    })
}

fn offspring_name(spirit: SpiritType, style: NamingStyle, slot: OffspringSlot) -> String {
    format!(
        "{}-{}-G{}-{:02}",
        spirit.title(),
        style.title(),
        slot.generation,
        slot.index
    )
}

fn cross_traits<R: Rng + ?Sized>(
    parent1: &AgentState,
    parent2: &AgentState,
    group: TraitGroup,
    params: BreedingParams,
    rng: &mut R,
) -> TraitMap {
    parent1
        .traits(group)
        .iter()
        .map(|(name, &v1)| {
            let base = match parent2.trait_value(group, name) {
                Some(v2) => (v1 + v2) / 2.0,
                None => v1,
            };
            let noise = if params.mutation_rate > 0.0 {
                rng.sample::<f64, _>(StandardNormal) * params.mutation_rate
            } else {
                0.0
            };
            (name.clone(), (base + noise).clamp(0.0, 1.0))
        })
        .collect()
}

/// 1 − mean absolute difference over the traits both agents carry, 0.0 when
/// they share none
pub fn genetic_compatibility(a: &AgentState, b: &AgentState) -> f64 {
    let a_traits = a.all_traits();
    let b_traits = b.all_traits();
    let distances: Vec<f64> = a_traits
        .iter()
        .filter_map(|(name, va)| b_traits.get(name).map(|vb| (va - vb).abs()))
        .collect();
    if distances.is_empty() {
        return 0.0;
    }
    1.0 - distances.iter().sum::<f64>() / distances.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn parent(id: &str, spirit: SpiritType, generation: u32, a: f64) -> AgentState {
        AgentState::builder(id, spirit, NamingStyle::Foundation)
            .generation(generation)
            .trait_value(TraitGroup::Personality, "a", a)
            .trait_value(TraitGroup::Ability, "strategist", a)
            .build()
            .unwrap()
    }

    const SLOT: OffspringSlot = OffspringSlot {
        generation: 4,
        index: 7,
    };

    #[test]
    fn test_zero_mutation_keeps_mean() {
        let p1 = parent("p1", SpiritType::Fox, 0, 0.5);
        let p2 = parent("p2", SpiritType::Wolf, 0, 0.5);
        let mut rng = StdRng::seed_from_u64(1);
        let params = BreedingParams { mutation_rate: 0.0 };
        let result = breed(&p1, &p2, SLOT, params, &mut rng).unwrap();
        assert_eq!(result.offspring.trait_value(TraitGroup::Personality, "a"), Some(0.5));
    }

    #[test]
    fn test_offspring_identity_and_lineage() {
        let p1 = parent("p1", SpiritType::Fox, 1, 0.2);
        let p2 = parent("p2", SpiritType::Wolf, 3, 0.8);
        let mut rng = StdRng::seed_from_u64(2);
        let params = BreedingParams { mutation_rate: 0.0 };
        let result = breed(&p1, &p2, SLOT, params, &mut rng).unwrap();
        let child = &result.offspring;

        assert_eq!(child.id, "agent_g004_007");
        assert!(child.name.ends_with("-G4-07"));
        assert_eq!(child.generation, 4);
        assert_eq!(child.parents(), ["p1".to_string(), "p2".to_string()]);
        assert_eq!(child.trait_value(TraitGroup::Personality, "a"), Some(0.5));
        assert!((result.compatibility - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_shared_traits_are_always_averaged() {
        let p1 = parent("p1", SpiritType::Fox, 0, 0.2);
        let p2 = parent("p2", SpiritType::Wolf, 0, 0.8);
        let mut rng = StdRng::seed_from_u64(3);
        let params = BreedingParams { mutation_rate: 0.0 };

        for _ in 0..1000 {
            let result = breed(&p1, &p2, SLOT, params, &mut rng).unwrap();
            let a = result.offspring.trait_value(TraitGroup::Personality, "a").unwrap();
            assert!((a - 0.5).abs() < 1e-12, "a={a}");
        }
    }

    #[test]
    fn test_trait_missing_in_parent2_comes_from_parent1() {
        let p1 = AgentState::builder("p1", SpiritType::Fox, NamingStyle::Foundation)
            .trait_value(TraitGroup::Physical, "speed", 0.3)
            .build()
            .unwrap();
        let p2 = parent("p2", SpiritType::Wolf, 0, 0.9);
        let mut rng = StdRng::seed_from_u64(4);
        let result = breed(&p1, &p2, SLOT, BreedingParams { mutation_rate: 0.0 }, &mut rng).unwrap();
        assert_eq!(result.offspring.trait_value(TraitGroup::Physical, "speed"), Some(0.3));
    }

    #[test]
    fn test_clone_parent_keeps_traits_and_records_lineage() {
        let p1 = parent("p1", SpiritType::Fox, 2, 0.35);
        let child = clone_parent(&p1, SLOT).unwrap();

        assert_eq!(child.id, "agent_g004_007");
        assert_eq!(child.generation, 3);
        assert_eq!(child.parents(), ["p1".to_string()]);
        assert_eq!(child.spirit, SpiritType::Fox);
        assert_eq!(child.all_traits(), p1.all_traits());
    }

    #[test]
    fn test_compatibility_without_common_traits() {
        let a = AgentState::builder("a", SpiritType::Fox, NamingStyle::Exo).build().unwrap();
        let b = parent("b", SpiritType::Fox, 0, 0.3);
        assert_eq!(genetic_compatibility(&a, &b), 0.0);
    }

    proptest! {
        #[test]
        fn prop_offspring_traits_stay_in_unit_range(
            a in 0.0f64..=1.0,
            b in 0.0f64..=1.0,
            mutation_rate in 0.0f64..=1.0,
            seed in any::<u64>(),
        ) {
            let p1 = parent("p1", SpiritType::Fox, 0, a);
            let p2 = parent("p2", SpiritType::Eagle, 0, b);
            let mut rng = StdRng::seed_from_u64(seed);
            let params = BreedingParams { mutation_rate };
            let result = breed(&p1, &p2, SLOT, params, &mut rng).unwrap();
            for value in result.offspring.all_traits().values() {
                prop_assert!((0.0..=1.0).contains(value));
            }
        }
    }
}
