//! Founder synthesis and population sizing
//!
//! Founders get archetype trait preferences for their spirit, 0.5 for every
//! other trait, plus a deterministic variation of at most ±0.05 derived from
//! a BLAKE3 hash of (spirit, trait, index). Padding founders key the hash by
//! their id instead.

use std::collections::HashSet;

use phoenix_common::{AgentError, AgentState, NamingStyle, SpiritType, TraitGroup, TraitMap};

/// Value of a trait the spirit has no preference for
pub const NEUTRAL_TRAIT_VALUE: f64 = 0.5;

/// Largest deterministic offset applied to a founder trait
pub const FOUNDER_VARIATION: f64 = 0.05;

pub const PERSONALITY_TRAITS: [&str; 8] = [
    "dominance",
    "independence",
    "patience",
    "aggression",
    "charisma",
    "creativity",
    "perfectionism",
    "adaptability",
];

pub const PHYSICAL_TRAITS: [&str; 6] = ["size", "strength", "agility", "endurance", "appearance", "grace"];

pub const ABILITY_TRAITS: [&str; 6] = ["strategist", "hunter", "teacher", "artist", "healer", "inventor"];

/// Trait names of one group
pub fn trait_names(group: TraitGroup) -> &'static [&'static str] {
    match group {
        TraitGroup::Personality => &PERSONALITY_TRAITS,
        TraitGroup::Physical => &PHYSICAL_TRAITS,
        TraitGroup::Ability => &ABILITY_TRAITS,
    }
}

/// Archetype preferences of a spirit
pub fn spirit_preferences(spirit: SpiritType) -> &'static [(&'static str, f64)] {
    match spirit {
        SpiritType::Fox => &[("adaptability", 0.9), ("strategist", 0.9), ("inventor", 0.7)],
        SpiritType::Wolf => &[("hunter", 0.8), ("endurance", 0.8), ("charisma", 0.7)],
        SpiritType::Otter => &[("creativity", 0.8), ("artist", 0.8), ("agility", 0.7)],
        SpiritType::Eagle => &[("independence", 0.9), ("patience", 0.8), ("strategist", 0.8)],
        SpiritType::Lion => &[("dominance", 0.8), ("charisma", 0.8), ("strength", 0.8)],
        SpiritType::Tiger => &[("aggression", 0.7), ("agility", 0.8), ("hunter", 0.9)],
        SpiritType::Dragon => &[("perfectionism", 0.8), ("strength", 0.9), ("inventor", 0.8)],
        SpiritType::Phoenix => &[("adaptability", 0.8), ("endurance", 0.9), ("healer", 0.9)],
        SpiritType::Alien => &[("independence", 0.8), ("creativity", 0.9), ("inventor", 0.9)],
        SpiritType::Yeti => &[("patience", 0.9), ("endurance", 0.9), ("teacher", 0.8)],
    }
}

/// Offset in [-FOUNDER_VARIATION, FOUNDER_VARIATION] keyed by `salt`
fn variation(spirit: SpiritType, name: &str, salt: &[u8]) -> f64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(spirit.as_str().as_bytes());
    hasher.update(name.as_bytes());
    hasher.update(salt);
    let hash = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    let unit = u64::from_le_bytes(bytes) as f64 / u64::MAX as f64;
    (unit * 2.0 - 1.0) * FOUNDER_VARIATION
}

fn founder_traits(spirit: SpiritType, group: TraitGroup, salt: &[u8]) -> TraitMap {
    let preferences = spirit_preferences(spirit);
    trait_names(group)
        .iter()
        .map(|name| {
            let base = preferences
                .iter()
                .find(|(trait_name, _)| trait_name == name)
                .map(|(_, value)| *value)
                .unwrap_or(NEUTRAL_TRAIT_VALUE);
            let value = (base + variation(spirit, name, salt)).clamp(0.0, 1.0);
            (name.to_string(), value)
        })
        .collect()
}

fn build_founder(
    id: String,
    name: String,
    spirit: SpiritType,
    style: NamingStyle,
    salt: &[u8],
) -> Result<AgentState, AgentError> {
    let mut builder = AgentState::builder(id, spirit, style).name(name).generation(0);
    for group in TraitGroup::ALL {
        builder = builder.traits(group, founder_traits(spirit, group, salt));
    }
    builder.build()
}

/// One founder with an explicit id and name
pub fn synthesize_founder(
    id: impl Into<String>,
    name: impl Into<String>,
    spirit: SpiritType,
    style: NamingStyle,
    index: usize,
) -> Result<AgentState, AgentError> {
    build_founder(
        id.into(),
        name.into(),
        spirit,
        style,
        &(index as u64).to_le_bytes(),
    )
}

/// `count` founders `agent_{i:03}` named `{Spirit}-{Style}-{i:02}`, spirit
/// and style assigned round-robin
pub fn synthesize_population(count: usize) -> Result<Vec<AgentState>, AgentError> {
    (0..count)
        .map(|i| {
            let spirit = SpiritType::ALL[i % SpiritType::ALL.len()];
            let style = NamingStyle::ALL[i % NamingStyle::ALL.len()];
            synthesize_founder(
                format!("agent_{i:03}"),
                format!("{}-{}-{:02}", spirit.title(), style.title(), i),
                spirit,
                style,
                i,
            )
        })
        .collect()
}

/// Truncate or pad `population` to `size`.
///
/// Padding founders are `agent_g{generation}_pad{n}` with the lowest `n` not
/// already taken. Their spirit and style continue the round-robin after the
/// kept agents and their trait variation is keyed by their id, so a pad never
/// duplicates a synthesized founder.
pub fn fit_to_size(
    mut population: Vec<AgentState>,
    size: usize,
    generation: u32,
) -> Result<Vec<AgentState>, AgentError> {
    population.truncate(size);
    let mut taken: HashSet<String> = population.iter().map(|a| a.id.clone()).collect();
    let mut n = 0usize;

    while population.len() < size {
        let id = loop {
            let candidate = format!("agent_g{generation}_pad{n}");
            n += 1;
            if !taken.contains(&candidate) {
                break candidate;
            }
        };
        let slot = population.len();
        let spirit = SpiritType::ALL[slot % SpiritType::ALL.len()];
        let style = NamingStyle::ALL[slot % NamingStyle::ALL.len()];
        let name = format!("{}-{}-G{}-P{:02}", spirit.title(), style.title(), generation, slot);

        let pad = build_founder(id.clone(), name, spirit, style, id.as_bytes())?;
        taken.insert(id);
        population.push(pad);
    }
    Ok(population)
}

/// Seeds truncated or padded to `size`, or a freshly synthesized population
pub fn initial_population(
    seeds: Option<Vec<AgentState>>,
    size: usize,
) -> Result<Vec<AgentState>, AgentError> {
    match seeds {
        Some(seeds) if !seeds.is_empty() => fit_to_size(seeds, size, 0),
        _ => synthesize_population(size),
    }
}
