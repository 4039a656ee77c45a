//! Subliminal trait extraction
//!
//! Nine behavioral traits are scored over five dimensions:
//!
//! | dimension  | matcher | weight | scaling     |
//! |------------|---------|--------|-------------|
//! | lexical    | regex   | 0.25   | logarithmic |
//! | syntactic  | regex   | 0.25   | square root |
//! | semantic   | keyword | 0.25   | square root |
//! | contextual | keyword | 0.15   | square root |
//! | quality    | keyword | 0.10   | linear      |
//!
//! The weighted sum is multiplied by a booster uplift (at most +40%) and by
//! 1.2 for high-priority traits. Candidates are then filtered by strength and
//! confidence, capped per category and in total, and contradictory pairs are
//! resolved in favor of the higher strength × confidence member.

use std::collections::{BTreeMap, BTreeSet};

use ordered_float::OrderedFloat;
use phoenix_common::{AgentState, AnalysisError, SubliminalTrait, TraitCategory};
use serde::Serialize;
use tracing::debug;

use crate::analyzer::TextAnalyzer;
use crate::scoring::{PatternCategory, PatternTable, Scaling};
use crate::text::TextSample;

/// Minimum strength for a trait to be retained
pub const MIN_TRAIT_STRENGTH: f64 = 0.2;

/// Minimum confidence for a trait to be retained
pub const MIN_TRAIT_CONFIDENCE: f64 = 0.3;

/// Maximum retained traits per category
pub const MAX_TRAITS_PER_CATEGORY: usize = 3;

/// Maximum retained traits overall
pub const MAX_TRAITS_TOTAL: usize = 8;

/// Strength above which a contradictory pair conflicts
pub const CONTRADICTION_STRENGTH: f64 = 0.6;

const HIGH_PRIORITY_MULTIPLIER: f64 = 1.2;
const MAX_BOOST: f64 = 0.4;
const BOOST_PER_HIT: f64 = 0.08;
const MAX_MANIFESTATIONS: usize = 4;

/// Pairs of traits that cannot both be strongly expressed
pub const CONTRADICTORY_PAIRS: [(&str, &str); 4] = [
    ("analytical_thinking", "creative_thinking"),
    ("leadership", "collaboration"),
    ("problem_solving", "adaptability"),
    ("technical_expertise", "emotional_intelligence"),
];

struct TraitSpec {
    name: &'static str,
    category: TraitCategory,
    high_priority: bool,
    lexical: &'static [&'static str],
    syntactic: &'static [&'static str],
    semantic: &'static [&'static str],
    contextual: &'static [&'static str],
    boosters: &'static [&'static str],
    quality: &'static [&'static str],
}

const TRAIT_SPECS: &[TraitSpec] = &[
    TraitSpec {
        name: "analytical_thinking",
        category: TraitCategory::Cognitive,
        high_priority: true,
        lexical: &[
            r"\b(analyze|examine|evaluate|assess|scrutinize|investigate|dissect)\b",
            r"\b(logical|systematic|methodical|rational|structured|organized)\b",
            r"\b(consider|review|assess|evaluate|compare|contrast)\b",
            r"\b(deduce|infer|conclude|reason|rationalize)\b",
        ],
        syntactic: &[
            r"let me \w+ (analyze|examine|evaluate|assess)",
            r"considering \w+ factors?",
            r"based on \w+ analysis",
            r"systematic \w+ approach",
            r"logical \w+ reasoning",
            r"methodical \w+ process",
        ],
        semantic: &["analysis", "evaluation", "assessment", "reasoning", "logic", "systematic"],
        contextual: &["data", "evidence", "facts", "metrics", "statistics", "patterns"],
        boosters: &["thoroughly", "carefully", "systematically", "methodically", "rigorously"],
        quality: &["detailed", "comprehensive", "thorough", "rigorous", "precise"],
    },
    TraitSpec {
        name: "creative_thinking",
        category: TraitCategory::Creative,
        high_priority: true,
        lexical: &[
            r"\b(innovative|creative|novel|original|unique|imaginative)\b",
            r"\b(imagine|design|craft|invent|create|develop|conceive)\b",
            r"\b(artistic|aesthetic|beautiful|elegant|inspiring|visionary)\b",
            r"\b(brainstorm|ideate|explore|experiment|innovate)\b",
        ],
        syntactic: &[
            r"what if \w+",
            r"imagine \w+",
            r"creative \w+ solution",
            r"innovative \w+ approach",
            r"let's explore \w+",
            r"novel \w+ perspective",
        ],
        semantic: &["creativity", "innovation", "design", "artistry", "imagination", "originality"],
        contextual: &["ideas", "concepts", "solutions", "approaches", "possibilities", "alternatives"],
        boosters: &["brilliant", "inspired", "original", "groundbreaking", "revolutionary"],
        quality: &["breakthrough", "cutting-edge", "pioneering", "transformative", "disruptive"],
    },
    TraitSpec {
        name: "leadership",
        category: TraitCategory::Personality,
        high_priority: true,
        lexical: &[
            r"\b(lead|guide|direct|manage|coordinate|oversee|supervise)\b",
            r"\b(command|authority|influence|inspire|motivate|empower)\b",
            r"\b(mentor|coach|teach|guide|develop|nurture)\b",
            r"\b(initiate|champion|advocate|promote|drive)\b",
        ],
        syntactic: &[
            r"let me \w+ (lead|guide|direct|manage)",
            r"we should \w+",
            r"i recommend \w+",
            r"take charge \w+",
            r"lead the \w+",
            r"guide the \w+",
        ],
        semantic: &["leadership", "management", "guidance", "direction", "authority", "influence"],
        contextual: &["team", "group", "project", "initiative", "organization", "community"],
        boosters: &["confidently", "authoritatively", "decisively", "strategically", "visionarily"],
        quality: &["transformational", "inspirational", "strategic", "visionary", "charismatic"],
    },
    TraitSpec {
        name: "collaboration",
        category: TraitCategory::Social,
        high_priority: false,
        lexical: &[
            r"\b(collaborate|cooperate|work together|team up|partner|ally)\b",
            r"\b(partner|ally|colleague|teammate|collaborator|co-worker)\b",
            r"\b(share|contribute|support|help|assist|facilitate)\b",
            r"\b(engage|involve|include|participate|contribute)\b",
        ],
        syntactic: &[
            r"let's \w+ together",
            r"we can \w+",
            r"working with \w+",
            r"team effort \w+",
            r"collaborative \w+",
            r"joint \w+ approach",
        ],
        semantic: &["collaboration", "cooperation", "teamwork", "partnership", "synergy", "unity"],
        contextual: &["team", "group", "together", "collective", "shared", "mutual"],
        boosters: &["enthusiastically", "willingly", "actively", "positively", "constructively"],
        quality: &["seamless", "effective", "productive", "harmonious", "synergistic"],
    },
    TraitSpec {
        name: "problem_solving",
        category: TraitCategory::Cognitive,
        high_priority: true,
        lexical: &[
            r"\b(solve|resolve|fix|address|tackle|handle|overcome)\b",
            r"\b(solution|approach|strategy|method|technique|process)\b",
            r"\b(debug|troubleshoot|diagnose|identify|analyze)\b",
            r"\b(optimize|improve|enhance|refine|perfect)\b",
        ],
        syntactic: &[
            r"let me \w+ (solve|fix|address|tackle)",
            r"the solution \w+",
            r"approach to \w+",
            r"strategy for \w+",
            r"method to \w+",
            r"way to \w+",
        ],
        semantic: &["problem-solving", "troubleshooting", "debugging", "resolution", "optimization"],
        contextual: &["issue", "problem", "challenge", "obstacle", "difficulty", "complexity"],
        boosters: &["effectively", "efficiently", "successfully", "systematically", "creatively"],
        quality: &["elegant", "robust", "scalable", "comprehensive", "innovative"],
    },
    TraitSpec {
        name: "adaptability",
        category: TraitCategory::Behavioral,
        high_priority: false,
        lexical: &[
            r"\b(adapt|adjust|modify|change|flexible|versatile)\b",
            r"\b(versatile|dynamic|responsive|agile|resilient|robust)\b",
            r"\b(evolve|transform|shift|pivot|transition|adjust)\b",
            r"\b(accommodate|integrate|incorporate|embrace)\b",
        ],
        syntactic: &[
            r"adapt to \w+",
            r"adjust \w+ approach",
            r"flexible \w+",
            r"responsive to \w+",
            r"evolve with \w+",
            r"pivot to \w+",
        ],
        semantic: &["adaptability", "flexibility", "versatility", "responsiveness", "resilience"],
        contextual: &["change", "environment", "circumstances", "requirements", "conditions"],
        boosters: &["quickly", "easily", "seamlessly", "naturally", "effortlessly"],
        quality: &["seamless", "effortless", "natural", "intuitive", "smooth"],
    },
    TraitSpec {
        name: "communication",
        category: TraitCategory::Social,
        high_priority: false,
        lexical: &[
            r"\b(communicate|explain|clarify|articulate|express|convey)\b",
            r"\b(present|demonstrate|illustrate|show|describe|narrate)\b",
            r"\b(listen|understand|comprehend|grasp|follow|interpret)\b",
            r"\b(dialogue|conversation|discussion|exchange|interaction)\b",
        ],
        syntactic: &[
            r"let me \w+ (explain|clarify|demonstrate)",
            r"to communicate \w+",
            r"clear \w+",
            r"effective \w+",
            r"understand \w+",
            r"explain \w+",
        ],
        semantic: &["communication", "explanation", "clarity", "understanding", "dialogue"],
        contextual: &["message", "information", "ideas", "concepts", "feedback", "response"],
        boosters: &["clearly", "effectively", "precisely", "concisely", "persuasively"],
        quality: &["crystal-clear", "compelling", "persuasive", "engaging", "inspiring"],
    },
    TraitSpec {
        name: "technical_expertise",
        category: TraitCategory::Cognitive,
        high_priority: true,
        lexical: &[
            r"\b(technical|technological|engineering|scientific|systematic)\b",
            r"\b(implement|develop|build|construct|engineer|architect)\b",
            r"\b(optimize|enhance|improve|refine|perfect|tune)\b",
            r"\b(integrate|configure|deploy|maintain|support|troubleshoot)\b",
        ],
        syntactic: &[
            r"technical \w+",
            r"implement \w+",
            r"build \w+",
            r"engineer \w+",
            r"optimize \w+",
            r"integrate \w+",
        ],
        semantic: &["technical", "engineering", "implementation", "optimization", "architecture"],
        contextual: &["system", "technology", "solution", "implementation", "architecture"],
        boosters: &["expertly", "professionally", "systematically", "efficiently", "reliably"],
        quality: &["enterprise-grade", "production-ready", "scalable", "robust", "efficient"],
    },
    TraitSpec {
        name: "emotional_intelligence",
        category: TraitCategory::Social,
        high_priority: false,
        lexical: &[
            r"\b(empathy|compassion|understanding|sensitivity|awareness)\b",
            r"\b(emotional|feelings|mood|atmosphere|vibe|energy)\b",
            r"\b(support|comfort|encourage|motivate|inspire|uplift)\b",
            r"\b(recognize|perceive|sense|detect|identify)\b",
        ],
        syntactic: &[
            r"understand \w+ feelings?",
            r"sense \w+ emotions?",
            r"empathize with \w+",
            r"support \w+",
            r"comfort \w+",
            r"encourage \w+",
        ],
        semantic: &["empathy", "emotional intelligence", "compassion", "understanding", "support"],
        contextual: &["emotions", "feelings", "mood", "atmosphere", "relationships", "well-being"],
        boosters: &["genuinely", "deeply", "sincerely", "warmly", "compassionately"],
        quality: &["profound", "genuine", "authentic", "deep", "meaningful"],
    },
];

struct CompiledTrait {
    name: &'static str,
    category: TraitCategory,
    high_priority: bool,
    table: PatternTable,
    boosters: PatternCategory,
}

impl CompiledTrait {
    fn compile(spec: &TraitSpec) -> Result<Self, AnalysisError> {
        let table = PatternTable::new(spec.name)
            .with_category(
                PatternCategory::new("lexical", 0.25, Scaling::Logarithmic).with_regexes(spec.lexical)?,
            )
            .with_category(
                PatternCategory::new("syntactic", 0.25, Scaling::SquareRoot)
                    .with_regexes(spec.syntactic)?,
            )
            .with_category(
                PatternCategory::new("semantic", 0.25, Scaling::SquareRoot).with_keywords(spec.semantic),
            )
            .with_category(
                PatternCategory::new("contextual", 0.15, Scaling::SquareRoot)
                    .with_keywords(spec.contextual),
            )
            .with_category(
                PatternCategory::new("quality", 0.10, Scaling::Linear).with_keywords(spec.quality),
            );

        Ok(Self {
            name: spec.name,
            category: spec.category,
            high_priority: spec.high_priority,
            table,
            boosters: PatternCategory::new("boosters", 0.0, Scaling::Linear).with_keywords(spec.boosters),
        })
    }
}

/// Raw score of one catalogue trait before filtering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraitCandidate {
    pub name: String,
    pub category: TraitCategory,
    pub strength: f64,
    pub confidence: f64,
    pub manifestation: String,
}

/// Extracts behavioral traits from agent output
pub struct TraitExtractor {
    traits: Vec<CompiledTrait>,
}

impl TraitExtractor {
    pub fn new() -> Result<Self, AnalysisError> {
        let traits = TRAIT_SPECS
            .iter()
            .map(CompiledTrait::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { traits })
    }

    /// Names of every catalogue trait
    pub fn trait_names(&self) -> Vec<&'static str> {
        self.traits.iter().map(|t| t.name).collect()
    }

    /// Score every catalogue trait without filtering
    pub fn candidates(&self, text: &TextSample<'_>) -> Vec<TraitCandidate> {
        self.traits
            .iter()
            .map(|compiled| {
                let breakdown = compiled.table.score(text);

                let boost = (compiled.boosters.hits(text) as f64 * BOOST_PER_HIT).min(MAX_BOOST);
                let priority = if compiled.high_priority {
                    HIGH_PRIORITY_MULTIPLIER
                } else {
                    1.0
                };
                let strength = (breakdown.aggregate * (1.0 + boost) * priority).min(1.0);

                let regex_hits = breakdown.hits_of("lexical") + breakdown.hits_of("syntactic");
                let confidence = (strength
                    + regex_hits as f64 * 0.04
                    + breakdown.hits_of("contextual") as f64 * 0.08
                    + breakdown.hits_of("quality") as f64 * 0.06)
                    .min(1.0);

                TraitCandidate {
                    name: compiled.name.to_string(),
                    category: compiled.category,
                    strength,
                    confidence,
                    manifestation: manifestation(compiled, text),
                }
            })
            .collect()
    }

    /// Extract the retained traits for an agent's output
    pub fn extract(&self, text: &TextSample<'_>, agent_id: &str) -> Vec<SubliminalTrait> {
        let candidates: Vec<SubliminalTrait> = self
            .candidates(text)
            .into_iter()
            .filter(|c| c.strength >= MIN_TRAIT_STRENGTH && c.confidence >= MIN_TRAIT_CONFIDENCE)
            .map(|c| SubliminalTrait {
                id: format!("{}_{}", agent_id, c.name),
                name: c.name,
                strength: c.strength,
                category: c.category,
                manifestation: c.manifestation,
                confidence: c.confidence,
            })
            .collect();

        let total = candidates.len();
        let capped = cap_by_category(candidates);
        let resolved = resolve_contradictions(capped);

        debug!(
            agent_id = %agent_id,
            candidates = total,
            retained = resolved.len(),
            "Extracted traits"
        );
        resolved
    }
}

impl TextAnalyzer for TraitExtractor {
    type Output = Vec<SubliminalTrait>;

    fn name(&self) -> &'static str {
        "traits"
    }

    fn analyze(&self, text: &TextSample<'_>, agent: &AgentState) -> Self::Output {
        self.extract(text, &agent.id)
    }
}

fn manifestation(compiled: &CompiledTrait, text: &TextSample<'_>) -> String {
    let mut excerpts = compiled
        .table
        .category("lexical")
        .map(|c| c.excerpts(text, 2))
        .unwrap_or_default();
    if let Some(quality) = compiled.table.category("quality") {
        excerpts.extend(quality.matched_patterns(text));
    }
    excerpts.truncate(MAX_MANIFESTATIONS);
    excerpts.join("; ")
}

/// Rank by strength × confidence, keep at most three per category and eight overall
fn cap_by_category(mut traits: Vec<SubliminalTrait>) -> Vec<SubliminalTrait> {
    traits.sort_by(|a, b| {
        OrderedFloat(b.rank_score())
            .cmp(&OrderedFloat(a.rank_score()))
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut per_category: BTreeMap<TraitCategory, usize> = BTreeMap::new();
    let mut kept = Vec::with_capacity(MAX_TRAITS_TOTAL);
    for t in traits {
        let count = per_category.entry(t.category).or_insert(0);
        if *count < MAX_TRAITS_PER_CATEGORY {
            *count += 1;
            kept.push(t);
        }
        if kept.len() == MAX_TRAITS_TOTAL {
            break;
        }
    }
    kept
}

/// Whether two traits form a contradictory pair and are both strongly expressed
pub fn are_contradictory(a: &SubliminalTrait, b: &SubliminalTrait) -> bool {
    let paired = CONTRADICTORY_PAIRS.iter().any(|(x, y)| {
        (a.name == *x && b.name == *y) || (a.name == *y && b.name == *x)
    });
    paired && a.strength > CONTRADICTION_STRENGTH && b.strength > CONTRADICTION_STRENGTH
}

fn resolve_contradictions(traits: Vec<SubliminalTrait>) -> Vec<SubliminalTrait> {
    let mut consistent: Vec<SubliminalTrait> = Vec::with_capacity(traits.len());
    'next: for candidate in traits {
        let mut i = 0;
        while i < consistent.len() {
            if are_contradictory(&candidate, &consistent[i]) {
                if candidate.rank_score() > consistent[i].rank_score() {
                    consistent.remove(i);
                    continue;
                }
                continue 'next;
            }
            i += 1;
        }
        consistent.push(candidate);
    }
    consistent
}

/// Pairwise correlation between retained traits, keyed `a_b`
pub fn trait_correlations(traits: &[SubliminalTrait]) -> BTreeMap<String, f64> {
    let mut correlations = BTreeMap::new();
    for (i, a) in traits.iter().enumerate() {
        for b in &traits[i + 1..] {
            let strength = 1.0 - (a.strength - b.strength).abs();
            let category = if a.category == b.category { 1.0 } else { 0.5 };
            let confidence = 1.0 - (a.confidence - b.confidence).abs();
            correlations.insert(
                format!("{}_{}", a.name, b.name),
                strength * 0.4 + category * 0.3 + confidence * 0.3,
            );
        }
    }
    correlations
}

/// Overall quality of an extracted trait set
pub fn trait_quality_score(traits: &[SubliminalTrait]) -> f64 {
    if traits.is_empty() {
        return 0.0;
    }
    let n = traits.len() as f64;
    let mean_strength = traits.iter().map(|t| t.strength).sum::<f64>() / n;
    let mean_confidence = traits.iter().map(|t| t.confidence).sum::<f64>() / n;
    let categories: BTreeSet<TraitCategory> = traits.iter().map(|t| t.category).collect();
    let coverage = categories.len() as f64 / TraitCategory::ALL.len() as f64;
    (mean_strength * 0.4 + mean_confidence * 0.4 + coverage * 0.2).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANALYTICAL: &str = "Let me carefully analyze the data. Based on rigorous analysis of the \
        evidence and metrics, a systematic review of patterns helps us deduce a logical conclusion. \
        I will evaluate and compare the facts thoroughly for a detailed, comprehensive assessment.";

    fn make(name: &str, category: TraitCategory, strength: f64, confidence: f64) -> SubliminalTrait {
        SubliminalTrait {
            id: name.to_string(),
            name: name.to_string(),
            strength,
            category,
            manifestation: String::new(),
            confidence,
        }
    }

    #[test]
    fn test_analytical_text_yields_analytical_trait() {
        let extractor = TraitExtractor::new().unwrap();
        let traits = extractor.extract(&TextSample::new(ANALYTICAL), "agent_000");

        let analytical = traits
            .iter()
            .find(|t| t.name == "analytical_thinking")
            .expect("analytical trait retained");
        assert!(analytical.strength >= MIN_TRAIT_STRENGTH);
        assert!(analytical.confidence >= analytical.strength);
        assert_eq!(analytical.category, TraitCategory::Cognitive);
        assert!(!analytical.manifestation.is_empty());
        assert!(analytical.manifestation.split("; ").count() <= MAX_MANIFESTATIONS);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        let extractor = TraitExtractor::new().unwrap();
        assert!(extractor.extract(&TextSample::new(""), "a").is_empty());
        for candidate in extractor.candidates(&TextSample::new("")) {
            assert_eq!(candidate.strength, 0.0);
        }
    }

    #[test]
    fn test_all_values_bounded() {
        let extractor = TraitExtractor::new().unwrap();
        let repeated = ANALYTICAL.repeat(5);
        let text = TextSample::new(&repeated);
        for candidate in extractor.candidates(&text) {
            assert!((0.0..=1.0).contains(&candidate.strength));
            assert!((0.0..=1.0).contains(&candidate.confidence));
        }
    }

    #[test]
    fn test_category_cap_and_total_cap() {
        let traits = vec![
            make("a", TraitCategory::Cognitive, 0.9, 0.9),
            make("b", TraitCategory::Cognitive, 0.8, 0.9),
            make("c", TraitCategory::Cognitive, 0.7, 0.9),
            make("d", TraitCategory::Cognitive, 0.95, 0.95),
            make("e", TraitCategory::Social, 0.5, 0.5),
        ];
        let kept = cap_by_category(traits);
        let names: Vec<&str> = kept.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["d", "a", "b", "e"]);
    }

    #[test]
    fn test_contradiction_keeps_higher_quality() {
        let traits = vec![
            make("creative_thinking", TraitCategory::Creative, 0.7, 0.8),
            make("analytical_thinking", TraitCategory::Cognitive, 0.9, 0.9),
            make("leadership", TraitCategory::Personality, 0.65, 0.9),
        ];
        let resolved = resolve_contradictions(traits);
        let names: Vec<&str> = resolved.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["analytical_thinking", "leadership"]);
    }

    #[test]
    fn test_weak_pairs_do_not_conflict() {
        let a = make("leadership", TraitCategory::Personality, 0.5, 0.9);
        let b = make("collaboration", TraitCategory::Social, 0.9, 0.9);
        assert!(!are_contradictory(&a, &b));
    }

    #[test]
    fn test_correlations_and_quality() {
        let traits = vec![
            make("a", TraitCategory::Cognitive, 0.5, 0.5),
            make("b", TraitCategory::Cognitive, 0.5, 0.5),
        ];
        let correlations = trait_correlations(&traits);
        assert_eq!(correlations.get("a_b"), Some(&1.0));

        let quality = trait_quality_score(&traits);
        let expected = 0.5 * 0.4 + 0.5 * 0.4 + (1.0 / 6.0) * 0.2;
        assert!((quality - expected).abs() < 1e-12);
        assert_eq!(trait_quality_score(&[]), 0.0);
    }
}
