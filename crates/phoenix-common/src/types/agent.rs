//! AgentState - An evolving agent and its trait vectors
//!
//! An agent carries three trait maps (personality, physical, ability) whose
//! values are always within [0, 1]. Offspring record their parents and are
//! one generation past the older parent; founders are generation 0.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::metrics::{clamp_unit, PerformanceMetrics};
use super::spirit::{NamingStyle, SpiritType, TraitGroup};
use crate::error::AgentError;

/// Ordered trait name to value map
pub type TraitMap = BTreeMap<String, f64>;

/// Maximum number of parents an agent can have
pub const MAX_PARENTS: usize = 2;

/// Explicit schema for what an agent has learned
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct KnowledgeBase {
    /// domain -> skill -> proficiency in [0, 1]
    domain_proficiency: BTreeMap<String, BTreeMap<String, f64>>,
    specializations: BTreeSet<String>,
    achievements: Vec<String>,
    preferences: BTreeMap<String, bool>,
    /// trait -> strength in [0, 1]
    distilled_traits: BTreeMap<String, f64>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_proficiency(
        &mut self,
        domain: impl Into<String>,
        skill: impl Into<String>,
        value: f64,
    ) -> Result<(), AgentError> {
        let value = unit_value("proficiency", value)?;
        self.domain_proficiency
            .entry(domain.into())
            .or_default()
            .insert(skill.into(), value);
        Ok(())
    }

    pub fn proficiency(&self, domain: &str, skill: &str) -> Option<f64> {
        self.domain_proficiency.get(domain)?.get(skill).copied()
    }

    pub fn domain_proficiency(&self) -> &BTreeMap<String, BTreeMap<String, f64>> {
        &self.domain_proficiency
    }

    pub fn add_specialization(&mut self, name: impl Into<String>) -> bool {
        self.specializations.insert(name.into())
    }

    pub fn specializations(&self) -> &BTreeSet<String> {
        &self.specializations
    }

    pub fn add_achievement(&mut self, achievement: impl Into<String>) {
        self.achievements.push(achievement.into());
    }

    pub fn achievements(&self) -> &[String] {
        &self.achievements
    }

    pub fn set_preference(&mut self, name: impl Into<String>, enabled: bool) {
        self.preferences.insert(name.into(), enabled);
    }

    pub fn preference(&self, name: &str) -> Option<bool> {
        self.preferences.get(name).copied()
    }

    pub fn set_distilled_trait(&mut self, name: impl Into<String>, strength: f64) -> Result<(), AgentError> {
        let strength = unit_value("distilled trait strength", strength)?;
        self.distilled_traits.insert(name.into(), strength);
        Ok(())
    }

    pub fn distilled_traits(&self) -> &BTreeMap<String, f64> {
        &self.distilled_traits
    }

    pub fn is_empty(&self) -> bool {
        self.domain_proficiency.is_empty()
            && self.specializations.is_empty()
            && self.achievements.is_empty()
            && self.preferences.is_empty()
            && self.distilled_traits.is_empty()
    }
}

fn unit_value(what: &str, value: f64) -> Result<f64, AgentError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(AgentError::InvalidRecord(format!(
            "{what} must be within [0, 1], got {value}"
        )))
    }
}

/// A member of the evolving population
///
/// Deserialization goes through [`AgentRecord`] and the builder's checks, so
/// a stored record with an out-of-range trait or too many parents is
/// rejected instead of entering a population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AgentRecord")]
pub struct AgentState {
    pub id: String,
    pub name: String,
    pub spirit: SpiritType,
    pub style: NamingStyle,
    pub generation: u32,
    parents: Vec<String>,
    personality_traits: TraitMap,
    physical_traits: TraitMap,
    ability_traits: TraitMap,
    performance_history: Vec<PerformanceMetrics>,
    pub knowledge_base: KnowledgeBase,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// Unvalidated on-disk shape of an [`AgentState`]
#[derive(Debug, Deserialize)]
pub struct AgentRecord {
    id: String,
    name: String,
    spirit: SpiritType,
    style: NamingStyle,
    generation: u32,
    #[serde(default)]
    parents: Vec<String>,
    #[serde(default)]
    personality_traits: TraitMap,
    #[serde(default)]
    physical_traits: TraitMap,
    #[serde(default)]
    ability_traits: TraitMap,
    #[serde(default)]
    performance_history: Vec<PerformanceMetrics>,
    #[serde(default)]
    knowledge_base: KnowledgeBase,
    created_at: DateTime<Utc>,
    last_updated: DateTime<Utc>,
}

impl TryFrom<AgentRecord> for AgentState {
    type Error = AgentError;

    fn try_from(record: AgentRecord) -> Result<Self, Self::Error> {
        let mut builder = AgentState::builder(record.id, record.spirit, record.style)
            .name(record.name)
            .generation(record.generation)
            .parents(record.parents)
            .performance_history(record.performance_history)
            .knowledge_base(record.knowledge_base)
            .created_at(record.created_at);
        for (group, traits) in [
            (TraitGroup::Personality, record.personality_traits),
            (TraitGroup::Physical, record.physical_traits),
            (TraitGroup::Ability, record.ability_traits),
        ] {
            for (name, value) in traits {
                let value = unit_value(&format!("trait {name}"), value)?;
                builder = builder.trait_value(group, name, value);
            }
        }

        let mut agent = builder.build()?;
        agent.last_updated = record.last_updated;
        Ok(agent)
    }
}

impl AgentState {
    /// Start building an agent
    pub fn builder(id: impl Into<String>, spirit: SpiritType, style: NamingStyle) -> AgentStateBuilder {
        AgentStateBuilder::new(id, spirit, style)
    }

    /// Fitness of the most recent evaluation, 0.0 if never evaluated
    pub fn fitness(&self) -> f64 {
        self.performance_history
            .last()
            .map(PerformanceMetrics::fitness)
            .unwrap_or(0.0)
    }

    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    pub fn is_founder(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn traits(&self, group: TraitGroup) -> &TraitMap {
        match group {
            TraitGroup::Personality => &self.personality_traits,
            TraitGroup::Physical => &self.physical_traits,
            TraitGroup::Ability => &self.ability_traits,
        }
    }

    fn traits_mut(&mut self, group: TraitGroup) -> &mut TraitMap {
        match group {
            TraitGroup::Personality => &mut self.personality_traits,
            TraitGroup::Physical => &mut self.physical_traits,
            TraitGroup::Ability => &mut self.ability_traits,
        }
    }

    pub fn personality_traits(&self) -> &TraitMap {
        &self.personality_traits
    }

    pub fn physical_traits(&self) -> &TraitMap {
        &self.physical_traits
    }

    pub fn ability_traits(&self) -> &TraitMap {
        &self.ability_traits
    }

    /// Set a trait value, clamped to [0, 1]
    pub fn set_trait(&mut self, group: TraitGroup, name: impl Into<String>, value: f64) {
        self.traits_mut(group).insert(name.into(), clamp_unit(value));
        self.last_updated = Utc::now();
    }

    pub fn trait_value(&self, group: TraitGroup, name: &str) -> Option<f64> {
        self.traits(group).get(name).copied()
    }

    /// All traits keyed as `group:name`
    pub fn all_traits(&self) -> TraitMap {
        TraitGroup::ALL
            .iter()
            .flat_map(|group| {
                self.traits(*group)
                    .iter()
                    .map(move |(name, value)| (format!("{}:{}", group.as_str(), name), *value))
            })
            .collect()
    }

    /// Mean over every trait value, 0.0 when the agent has none
    pub fn trait_average(&self) -> f64 {
        let (sum, count) = TraitGroup::ALL
            .iter()
            .flat_map(|group| self.traits(*group).values())
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    /// Mean of one trait group, 0.0 when the group is empty
    pub fn group_average(&self, group: TraitGroup) -> f64 {
        let traits = self.traits(group);
        if traits.is_empty() {
            0.0
        } else {
            traits.values().sum::<f64>() / traits.len() as f64
        }
    }

    pub fn trait_count(&self) -> usize {
        TraitGroup::ALL.iter().map(|g| self.traits(*g).len()).sum()
    }

    /// Append an evaluation to the history
    pub fn record_performance(&mut self, metrics: PerformanceMetrics) {
        self.performance_history.push(metrics);
        self.last_updated = Utc::now();
    }

    pub fn performance_history(&self) -> &[PerformanceMetrics] {
        &self.performance_history
    }

    pub fn latest_performance(&self) -> Option<&PerformanceMetrics> {
        self.performance_history.last()
    }
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Agent({}, {}, {}/{}, gen={}, fitness={:.3})",
            self.id,
            self.name,
            self.spirit,
            self.style,
            self.generation,
            self.fitness()
        )
    }
}

/// Builder for [`AgentState`]
#[derive(Debug, Clone)]
pub struct AgentStateBuilder {
    id: String,
    name: Option<String>,
    spirit: SpiritType,
    style: NamingStyle,
    generation: u32,
    parents: Vec<String>,
    personality_traits: TraitMap,
    physical_traits: TraitMap,
    ability_traits: TraitMap,
    performance_history: Vec<PerformanceMetrics>,
    knowledge_base: KnowledgeBase,
    created_at: Option<DateTime<Utc>>,
}

impl AgentStateBuilder {
    pub fn new(id: impl Into<String>, spirit: SpiritType, style: NamingStyle) -> Self {
        Self {
            id: id.into(),
            name: None,
            spirit,
            style,
            generation: 0,
            parents: Vec::new(),
            personality_traits: TraitMap::new(),
            physical_traits: TraitMap::new(),
            ability_traits: TraitMap::new(),
            performance_history: Vec::new(),
            knowledge_base: KnowledgeBase::default(),
            created_at: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn generation(mut self, generation: u32) -> Self {
        self.generation = generation;
        self
    }

    pub fn parents(mut self, parents: Vec<String>) -> Self {
        self.parents = parents;
        self
    }

    pub fn trait_value(mut self, group: TraitGroup, name: impl Into<String>, value: f64) -> Self {
        let map = match group {
            TraitGroup::Personality => &mut self.personality_traits,
            TraitGroup::Physical => &mut self.physical_traits,
            TraitGroup::Ability => &mut self.ability_traits,
        };
        map.insert(name.into(), clamp_unit(value));
        self
    }

    pub fn traits(mut self, group: TraitGroup, traits: TraitMap) -> Self {
        for (name, value) in traits {
            self = self.trait_value(group, name, value);
        }
        self
    }

    pub fn performance_history(mut self, history: Vec<PerformanceMetrics>) -> Self {
        self.performance_history = history;
        self
    }

    pub fn knowledge_base(mut self, knowledge_base: KnowledgeBase) -> Self {
        self.knowledge_base = knowledge_base;
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Validate and build the agent
    pub fn build(self) -> Result<AgentState, AgentError> {
        if self.id.trim().is_empty() {
            return Err(AgentError::InvalidRecord("agent id must not be empty".into()));
        }
        if self.parents.len() > MAX_PARENTS {
            return Err(AgentError::InvalidRecord(format!(
                "agent {} has {} parents, at most {} allowed",
                self.id,
                self.parents.len(),
                MAX_PARENTS
            )));
        }

        let created_at = self.created_at.unwrap_or_else(Utc::now);
        let name = self.name.unwrap_or_else(|| self.id.clone());

        Ok(AgentState {
            id: self.id,
            name,
            spirit: self.spirit,
            style: self.style,
            generation: self.generation,
            parents: self.parents,
            personality_traits: self.personality_traits,
            physical_traits: self.physical_traits,
            ability_traits: self.ability_traits,
            performance_history: self.performance_history,
            knowledge_base: self.knowledge_base,
            created_at,
            last_updated: created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::metrics::{MetricScores, StatisticalSignificance};

    fn sample_agent() -> AgentState {
        AgentState::builder("agent_000", SpiritType::Fox, NamingStyle::Foundation)
            .name("Fox-Foundation-00")
            .trait_value(TraitGroup::Personality, "creativity", 0.8)
            .trait_value(TraitGroup::Ability, "strategist", 1.4)
            .trait_value(TraitGroup::Physical, "agility", -0.3)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_clamps_traits() {
        let agent = sample_agent();
        assert_eq!(agent.trait_value(TraitGroup::Ability, "strategist"), Some(1.0));
        assert_eq!(agent.trait_value(TraitGroup::Physical, "agility"), Some(0.0));
        assert!(agent.is_founder());
    }

    #[test]
    fn test_deserialization_validates_records() {
        let agent = sample_agent();
        let json = serde_json::to_value(&agent).unwrap();
        let back: AgentState = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, agent);

        let mut out_of_range = json.clone();
        out_of_range["personality_traits"]["creativity"] = serde_json::json!(1.7);
        let err = serde_json::from_value::<AgentState>(out_of_range).unwrap_err();
        assert!(err.to_string().contains("creativity"));

        let mut crowded = json;
        crowded["parents"] = serde_json::json!(["p1", "p2", "p3"]);
        assert!(serde_json::from_value::<AgentState>(crowded).is_err());
    }

    #[test]
    fn test_builder_rejects_invalid_records() {
        let empty_id = AgentState::builder("  ", SpiritType::Wolf, NamingStyle::Exo).build();
        assert!(empty_id.is_err());

        let too_many_parents = AgentState::builder("a", SpiritType::Wolf, NamingStyle::Exo)
            .parents(vec!["p1".into(), "p2".into(), "p3".into()])
            .build();
        assert!(matches!(too_many_parents, Err(AgentError::InvalidRecord(_))));
    }

    #[test]
    fn test_fitness_uses_latest_metrics() {
        let mut agent = sample_agent();
        assert_eq!(agent.fitness(), 0.0);

        for fitness in [0.3, 0.7] {
            agent.record_performance(PerformanceMetrics::new(
                MetricScores {
                    fitness,
                    ..Default::default()
                },
                StatisticalSignificance::default(),
            ));
        }
        assert_eq!(agent.fitness(), 0.7);
        assert_eq!(agent.performance_history().len(), 2);
    }

    #[test]
    fn test_all_traits_prefixes_group() {
        let agent = sample_agent();
        let all = agent.all_traits();
        assert_eq!(all.len(), 3);
        assert_eq!(all.get("personality:creativity"), Some(&0.8));
        assert!(all.contains_key("ability:strategist"));
        assert!((agent.trait_average() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_set_trait_clamps() {
        let mut agent = sample_agent();
        agent.set_trait(TraitGroup::Personality, "patience", 2.0);
        assert_eq!(agent.trait_value(TraitGroup::Personality, "patience"), Some(1.0));
    }

    #[test]
    fn test_knowledge_base_rejects_out_of_range() {
        let mut kb = KnowledgeBase::new();
        assert!(kb.set_proficiency("finance", "valuation", 0.7).is_ok());
        assert!(kb.set_proficiency("finance", "valuation", 1.2).is_err());
        assert!(kb.set_distilled_trait("leadership", f64::NAN).is_err());
        assert_eq!(kb.proficiency("finance", "valuation"), Some(0.7));
    }

    #[test]
    fn test_knowledge_base_rejects_unknown_keys() {
        let json = r#"{"specializations": ["strategy"], "mood": "happy"}"#;
        assert!(serde_json::from_str::<KnowledgeBase>(json).is_err());

        let json = r#"{"specializations": ["strategy"]}"#;
        let kb: KnowledgeBase = serde_json::from_str(json).unwrap();
        assert!(kb.specializations().contains("strategy"));
    }

    #[test]
    fn test_agent_serde_round_trip() {
        let mut agent = sample_agent();
        agent.knowledge_base.add_achievement("first generation");
        agent.record_performance(PerformanceMetrics::new(
            MetricScores {
                fitness: 0.55,
                ..Default::default()
            },
            StatisticalSignificance::default(),
        ));
        let json = serde_json::to_string_pretty(&agent).unwrap();
        let back: AgentState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, agent);
    }
}
