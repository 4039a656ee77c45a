//! Knowledge distillation engine
//!
//! Runs every analyzer over one agent output and assembles the results into
//! [`AgentGeneticMaterial`]. A pool of materials can then be combined into a
//! single [`DistillationResult`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use phoenix_common::{
    AgentGeneticMaterial, AgentSnapshot, AgentState, AnalysisError, DomainKnowledge,
    EnvironmentSnapshot, GenerationContext, KnowledgeItem, PerformanceSnapshot, PhoenixConfig,
    PhoenixError, StructuredKnowledge, SubliminalTrait,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzer::run_analyzer;
use crate::domain::{DomainExpertise, DomainExpertiseAnalyzer};
use crate::knowledge::{complexity_score, output_quality, structure_text};
use crate::normalizer::TextLengthNormalizer;
use crate::specialization::SpecializationAnalyzer;
use crate::text::TextSample;
use crate::traits::{trait_quality_score, TraitExtractor};

/// Weight of the agent's fitness in the material fitness estimate
pub const AGENT_FITNESS_WEIGHT: f64 = 0.7;

/// Weight of the output quality in the material fitness estimate
pub const OUTPUT_QUALITY_WEIGHT: f64 = 0.3;

/// Number of manifestation excerpts kept when aggregating a trait
const AGGREGATED_MANIFESTATIONS: usize = 3;

/// Skill name under which domain expertise is written to a knowledge base
pub const EXPERTISE_SKILL: &str = "expertise";

/// Analyzer switches taken from the run configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionOptions {
    pub subliminal_learning: bool,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            subliminal_learning: true,
        }
    }
}

impl From<&PhoenixConfig> for ExtractionOptions {
    fn from(config: &PhoenixConfig) -> Self {
        Self {
            subliminal_learning: config.enable_subliminal_learning,
        }
    }
}

/// The task an output was produced for
#[derive(Debug, Clone, Copy)]
pub struct TaskInput<'a> {
    pub task: &'a str,
    pub input: &'a str,
}

/// Knowledge combined from a pool of genetic material
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistillationResult {
    pub material_count: usize,
    pub unique_agents: usize,
    pub knowledge: StructuredKnowledge,
    /// One aggregated trait per trait name
    pub traits: Vec<SubliminalTrait>,
    pub relevance_scores: BTreeMap<String, f64>,
    pub average_fitness: f64,
    pub distillation_quality: f64,
    pub created_at: DateTime<Utc>,
}

impl DistillationResult {
    fn empty() -> Self {
        Self {
            material_count: 0,
            unique_agents: 0,
            knowledge: StructuredKnowledge::default(),
            traits: Vec::new(),
            relevance_scores: BTreeMap::new(),
            average_fitness: 0.0,
            distillation_quality: 0.0,
            created_at: Utc::now(),
        }
    }
}

/// Runs the trait, domain, specialization and structure analyzers
pub struct KnowledgeDistillationEngine {
    traits: TraitExtractor,
    domains: DomainExpertiseAnalyzer,
    specialization: SpecializationAnalyzer,
    normalizer: TextLengthNormalizer,
}

impl KnowledgeDistillationEngine {
    pub fn new() -> Result<Self, AnalysisError> {
        Ok(Self {
            traits: TraitExtractor::new()?,
            domains: DomainExpertiseAnalyzer::new()?,
            specialization: SpecializationAnalyzer::new()?,
            normalizer: TextLengthNormalizer::new(),
        })
    }

    pub fn trait_extractor(&self) -> &TraitExtractor {
        &self.traits
    }

    pub fn domain_analyzer(&self) -> &DomainExpertiseAnalyzer {
        &self.domains
    }

    pub fn specialization_analyzer(&self) -> &SpecializationAnalyzer {
        &self.specialization
    }

    pub fn normalizer(&self) -> &TextLengthNormalizer {
        &self.normalizer
    }

    /// Distill one output of `agent` into genetic material
    pub fn extract_genetic_material(
        &self,
        agent: &AgentState,
        output: &str,
        generation: u32,
        task: TaskInput<'_>,
        options: ExtractionOptions,
    ) -> Result<AgentGeneticMaterial, AnalysisError> {
        let text = TextSample::new(output);
        if text.is_blank() {
            return Err(AnalysisError::EmptyOutput);
        }

        let subliminal_traits = if options.subliminal_learning {
            run_analyzer(&self.traits, &text, agent)
        } else {
            Vec::new()
        };

        let expertise = run_analyzer(&self.domains, &text, agent);
        let specialization = run_analyzer(&self.specialization, &text, agent)?;

        let mut structured_knowledge = structure_text(&text);
        structured_knowledge.domain_knowledge = expertise
            .iter()
            .map(|(domain, e)| (domain.clone(), e.to_knowledge()))
            .collect();

        let mut scores = std::mem::take(&mut structured_knowledge.confidence_scores);
        scores.insert("traits".to_string(), trait_quality_score(&subliminal_traits));
        scores.insert("domains".to_string(), mean_expertise(&expertise));
        scores.insert("specialization".to_string(), specialization.overall_accuracy);
        structured_knowledge.confidence_scores =
            self.normalizer.normalize_metrics_by_length(&scores, output);

        let relevance_scores: BTreeMap<String, f64> = expertise
            .iter()
            .map(|(domain, e)| (domain.clone(), e.expertise_score))
            .collect();

        let quality = output_quality(output);
        let fitness_score =
            (agent.fitness() * AGENT_FITNESS_WEIGHT + quality * OUTPUT_QUALITY_WEIGHT).clamp(0.0, 1.0);

        let generation_context = GenerationContext {
            task: task.task.to_string(),
            input_excerpt: GenerationContext::excerpt(task.input),
            environment: EnvironmentSnapshot {
                generation,
                agent_id: agent.id.clone(),
            },
            agent: AgentSnapshot {
                spirit: agent.spirit,
                style: agent.style,
                generation: agent.generation,
                fitness: agent.fitness(),
            },
            performance: PerformanceSnapshot {
                output_length: text.char_count(),
                complexity_score: complexity_score(output),
                domain_coverage: expertise.len(),
            },
        };

        let material = AgentGeneticMaterial {
            id: material_id(&agent.id, output, generation),
            agent_id: agent.id.clone(),
            generation,
            content: output.to_string(),
            structured_knowledge,
            relevance_scores,
            subliminal_traits,
            specialization: Some(specialization.summary()),
            fitness_score,
            generation_context,
            created_at: Utc::now(),
        };

        debug!(
            material_id = %material.id,
            traits = material.subliminal_traits.len(),
            domains = material.relevance_scores.len(),
            fitness = material.fitness_score,
            "Extracted genetic material"
        );

        Ok(material)
    }

    /// Write distilled traits, domain proficiency and the top specialization
    /// of `material` into the agent's knowledge base
    pub fn condition_agent(
        &self,
        agent: &mut AgentState,
        material: &AgentGeneticMaterial,
    ) -> Result<(), PhoenixError> {
        for t in &material.subliminal_traits {
            agent.knowledge_base.set_distilled_trait(t.name.clone(), t.strength)?;
        }
        for (domain, score) in &material.relevance_scores {
            agent
                .knowledge_base
                .set_proficiency(domain.clone(), EXPERTISE_SKILL, score.clamp(0.0, 1.0))?;
        }

        let text = TextSample::new(&material.content);
        let analysis = run_analyzer(&self.specialization, &text, agent)?;
        if let Some((name, score)) = analysis.top_specialization() {
            if score > 0.0 {
                agent.knowledge_base.add_specialization(name);
            }
        }
        Ok(())
    }

    /// Combine a pool of materials into deduplicated, averaged knowledge
    pub fn distill_knowledge(&self, materials: &[AgentGeneticMaterial]) -> DistillationResult {
        if materials.is_empty() {
            return DistillationResult::empty();
        }
        let n = materials.len() as f64;

        let unique_agents = materials
            .iter()
            .map(|m| m.agent_id.as_str())
            .collect::<BTreeSet<_>>()
            .len();
        let average_fitness = materials.iter().map(|m| m.fitness_score).sum::<f64>() / n;
        let trait_total: usize = materials.iter().map(|m| m.subliminal_traits.len()).sum();

        let knowledge = StructuredKnowledge {
            categories: materials
                .iter()
                .flat_map(|m| m.structured_knowledge.categories.iter().cloned())
                .collect(),
            concepts: merge_items(materials.iter().map(|m| &m.structured_knowledge.concepts)),
            reasoning_patterns: merge_items(
                materials.iter().map(|m| &m.structured_knowledge.reasoning_patterns),
            ),
            strategies: merge_items(materials.iter().map(|m| &m.structured_knowledge.strategies)),
            domain_knowledge: merge_domains(materials),
            confidence_scores: average_maps(
                materials.iter().map(|m| &m.structured_knowledge.confidence_scores),
            ),
        };

        let distillation_quality = (unique_agents as f64 / n * 0.3
            + average_fitness * 0.4
            + (trait_total as f64 / n).min(1.0) * 0.3)
            .clamp(0.0, 1.0);

        let result = DistillationResult {
            material_count: materials.len(),
            unique_agents,
            knowledge,
            traits: aggregate_traits(materials),
            relevance_scores: average_maps(materials.iter().map(|m| &m.relevance_scores)),
            average_fitness,
            distillation_quality,
            created_at: Utc::now(),
        };

        info!(
            materials = result.material_count,
            agents = result.unique_agents,
            quality = result.distillation_quality,
            "Distilled knowledge pool"
        );

        result
    }
}

/// `genetic_{agent}_{8 hex}_g{generation}`
pub fn material_id(agent_id: &str, content: &str, generation: u32) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(agent_id.as_bytes());
    hasher.update(&generation.to_le_bytes());
    hasher.update(content.as_bytes());
    let hex = hasher.finalize().to_hex();
    format!("genetic_{}_{}_g{}", agent_id, &hex[..8], generation)
}

fn mean_expertise(expertise: &BTreeMap<String, DomainExpertise>) -> f64 {
    if expertise.is_empty() {
        return 0.0;
    }
    expertise.values().map(|e| e.expertise_score).sum::<f64>() / expertise.len() as f64
}

/// Deduplicate by id in first-seen order, averaging confidence
fn merge_items<'a>(groups: impl Iterator<Item = &'a Vec<KnowledgeItem>>) -> Vec<KnowledgeItem> {
    let mut merged: Vec<KnowledgeItem> = Vec::new();
    let mut seen: HashMap<String, (usize, usize)> = HashMap::new();

    for item in groups.flatten() {
        match seen.get_mut(&item.id) {
            Some((index, count)) => {
                merged[*index].confidence += item.confidence;
                *count += 1;
            }
            None => {
                seen.insert(item.id.clone(), (merged.len(), 1));
                merged.push(item.clone());
            }
        }
    }
    for (index, count) in seen.values() {
        merged[*index].confidence /= *count as f64;
    }
    merged
}

fn average_maps<'a>(maps: impl Iterator<Item = &'a BTreeMap<String, f64>>) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for (key, value) in maps.flatten() {
        let entry = sums.entry(key.clone()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(key, (sum, count))| (key, sum / count as f64))
        .collect()
}

fn merge_domains(materials: &[AgentGeneticMaterial]) -> BTreeMap<String, DomainKnowledge> {
    let mut grouped: BTreeMap<&str, Vec<&DomainKnowledge>> = BTreeMap::new();
    for m in materials {
        for (domain, knowledge) in &m.structured_knowledge.domain_knowledge {
            grouped.entry(domain.as_str()).or_default().push(knowledge);
        }
    }

    grouped
        .into_iter()
        .map(|(domain, entries)| {
            let n = entries.len() as f64;
            let mut indicators: Vec<String> = Vec::new();
            for indicator in entries.iter().flat_map(|k| k.indicators.iter()) {
                if !indicators.contains(indicator) {
                    indicators.push(indicator.clone());
                }
            }
            indicators.truncate(8);

            let knowledge = DomainKnowledge {
                expertise_score: entries.iter().map(|k| k.expertise_score).sum::<f64>() / n,
                level: entries.iter().map(|k| k.level).max().unwrap_or_default(),
                confidence: entries.iter().map(|k| k.confidence).sum::<f64>() / n,
                indicators,
            };
            (domain.to_string(), knowledge)
        })
        .collect()
}

/// One trait per name: mean strength and confidence, first manifestations
fn aggregate_traits(materials: &[AgentGeneticMaterial]) -> Vec<SubliminalTrait> {
    let mut grouped: BTreeMap<&str, Vec<&SubliminalTrait>> = BTreeMap::new();
    for t in materials.iter().flat_map(|m| m.subliminal_traits.iter()) {
        grouped.entry(t.name.as_str()).or_default().push(t);
    }

    grouped
        .into_iter()
        .map(|(name, traits)| {
            let n = traits.len() as f64;
            let manifestation = traits
                .iter()
                .filter(|t| !t.manifestation.is_empty())
                .take(AGGREGATED_MANIFESTATIONS)
                .map(|t| t.manifestation.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            SubliminalTrait {
                id: format!("aggregated_{name}"),
                name: name.to_string(),
                strength: traits.iter().map(|t| t.strength).sum::<f64>() / n,
                category: traits[0].category,
                manifestation,
                confidence: traits.iter().map(|t| t.confidence).sum::<f64>() / n,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use phoenix_common::{
        MetricScores, NamingStyle, PerformanceMetrics, SpiritType, StatisticalSignificance,
        TraitCategory,
    };

    const OUTPUT: &str = "Let me analyze this step by step. First, we evaluate the software \
        architecture and its algorithm complexity. If the system is slow then we refactor the \
        code, because performance matters. Based on systematic analysis of the data, the \
        strategy is to optimize the core module and test it thoroughly. For example, a cache \
        layer reduces latency. Alternatively, we could scale the database.";

    fn agent(id: &str, fitness: f64) -> AgentState {
        let mut agent = AgentState::builder(id, SpiritType::Fox, NamingStyle::Foundation)
            .build()
            .unwrap();
        agent.record_performance(PerformanceMetrics::new(
            MetricScores {
                fitness,
                ..MetricScores::default()
            },
            StatisticalSignificance::default(),
        ));
        agent
    }

    fn task() -> TaskInput<'static> {
        TaskInput {
            task: "architecture review",
            input: "Review the service design",
        }
    }

    #[test]
    fn test_extract_genetic_material() {
        let engine = KnowledgeDistillationEngine::new().unwrap();
        let a = agent("agent_001", 0.6);
        let material = engine
            .extract_genetic_material(&a, OUTPUT, 2, task(), ExtractionOptions::default())
            .unwrap();

        assert!(material.id.starts_with("genetic_agent_001_"));
        assert!(material.id.ends_with("_g2"));
        assert_eq!(material.agent_id, "agent_001");
        assert_eq!(material.generation, 2);
        assert!(material.relevance_scores.contains_key("software_engineering"));
        assert!(!material.subliminal_traits.is_empty());
        assert!(material.specialization.is_some());

        let scores = &material.structured_knowledge.confidence_scores;
        for key in ["overall", "concepts", "reasoning", "language_quality", "traits", "domains", "specialization"] {
            assert!(scores.contains_key(key), "missing {key}");
            assert!(scores.contains_key(&format!("{key}_length_normalized")));
        }

        let expected = 0.6 * AGENT_FITNESS_WEIGHT + output_quality(OUTPUT) * OUTPUT_QUALITY_WEIGHT;
        assert!((material.fitness_score - expected).abs() < 1e-12);
        assert_eq!(material.generation_context.environment.agent_id, "agent_001");
        assert_eq!(material.generation_context.performance.output_length, OUTPUT.chars().count());
    }

    #[test]
    fn test_material_id_is_stable() {
        assert_eq!(material_id("a", "text", 1), material_id("a", "text", 1));
        assert_ne!(material_id("a", "text", 1), material_id("a", "text", 2));
    }

    #[test]
    fn test_empty_output_is_rejected() {
        let engine = KnowledgeDistillationEngine::new().unwrap();
        let err = engine
            .extract_genetic_material(&agent("a", 0.5), "   ", 0, task(), ExtractionOptions::default())
            .unwrap_err();
        assert_eq!(err, AnalysisError::EmptyOutput);
    }

    #[test]
    fn test_subliminal_learning_disabled() {
        let engine = KnowledgeDistillationEngine::new().unwrap();
        let options = ExtractionOptions {
            subliminal_learning: false,
        };
        let material = engine
            .extract_genetic_material(&agent("a", 0.5), OUTPUT, 0, task(), options)
            .unwrap();
        assert!(material.subliminal_traits.is_empty());
        assert_eq!(material.structured_knowledge.confidence_scores["traits"], 0.0);
    }

    #[test]
    fn test_condition_agent_writes_knowledge_base() {
        let engine = KnowledgeDistillationEngine::new().unwrap();
        let mut a = agent("agent_001", 0.6);
        let material = engine
            .extract_genetic_material(&a, OUTPUT, 1, task(), ExtractionOptions::default())
            .unwrap();
        engine.condition_agent(&mut a, &material).unwrap();

        let kb = &a.knowledge_base;
        assert_eq!(kb.distilled_traits().len(), material.subliminal_traits.len());
        assert!(kb.proficiency("software_engineering", EXPERTISE_SKILL).is_some());
        assert!(!kb.specializations().is_empty());
    }

    fn knowledge_item(id: &str, confidence: f64) -> KnowledgeItem {
        KnowledgeItem {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            confidence,
            category: "general".to_string(),
        }
    }

    #[test]
    fn test_distill_knowledge_merges_pool() {
        let engine = KnowledgeDistillationEngine::new().unwrap();
        let first = engine
            .extract_genetic_material(&agent("a", 0.4), OUTPUT, 1, task(), ExtractionOptions::default())
            .unwrap();
        let mut second = engine
            .extract_genetic_material(&agent("b", 0.8), OUTPUT, 1, task(), ExtractionOptions::default())
            .unwrap();
        second.structured_knowledge.concepts = vec![knowledge_item("concept_cache", 0.2)];
        let mut first = first;
        first.structured_knowledge.concepts = vec![knowledge_item("concept_cache", 0.6)];
        second.subliminal_traits = vec![SubliminalTrait {
            id: "b_leadership".into(),
            name: "leadership".into(),
            strength: 0.5,
            category: TraitCategory::Social,
            manifestation: "we lead".into(),
            confidence: 0.5,
        }];

        let result = engine.distill_knowledge(&[first.clone(), second.clone()]);

        assert_eq!(result.material_count, 2);
        assert_eq!(result.unique_agents, 2);
        assert_eq!(result.knowledge.concepts.len(), 1);
        assert!((result.knowledge.concepts[0].confidence - 0.4).abs() < 1e-12);
        assert!(result.traits.iter().all(|t| t.id.starts_with("aggregated_")));
        assert!(result.traits.iter().any(|t| t.name == "leadership"));

        let avg = (first.fitness_score + second.fitness_score) / 2.0;
        assert!((result.average_fitness - avg).abs() < 1e-12);
        assert!(result.distillation_quality > 0.0 && result.distillation_quality <= 1.0);
    }

    #[test]
    fn test_distill_empty_pool() {
        let engine = KnowledgeDistillationEngine::new().unwrap();
        let result = engine.distill_knowledge(&[]);
        assert_eq!(result.material_count, 0);
        assert_eq!(result.distillation_quality, 0.0);
    }
}
