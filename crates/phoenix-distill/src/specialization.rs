//! Spirit specialization accuracy
//!
//! Each spirit has three primary specializations (three regexes each), three
//! behavioral indicator regexes and four knowledge-domain keywords.
//!
//! ```text
//! overall = 0.30 role alignment
//!         + 0.25 expertise depth
//!         + 0.25 behavioral consistency
//!         + 0.20 knowledge application
//! ```

use std::collections::BTreeMap;

use phoenix_common::{AgentState, AnalysisError, SpecializationSummary, SpiritType};
use serde::Serialize;
use tracing::trace;

use crate::analyzer::TextAnalyzer;
use crate::scoring::{PatternCategory, Scaling};
use crate::text::TextSample;

const ROLE_ALIGNMENT_WEIGHT: f64 = 0.3;
const EXPERTISE_DEPTH_WEIGHT: f64 = 0.25;
const BEHAVIORAL_WEIGHT: f64 = 0.25;
const KNOWLEDGE_WEIGHT: f64 = 0.2;
const MAX_BEHAVIORAL_INDICATORS: usize = 5;

const COMPLEMENTARY_SPIRITS: [(SpiritType, SpiritType); 10] = [
    (SpiritType::Fox, SpiritType::Wolf),
    (SpiritType::Fox, SpiritType::Eagle),
    (SpiritType::Wolf, SpiritType::Lion),
    (SpiritType::Otter, SpiritType::Fox),
    (SpiritType::Eagle, SpiritType::Lion),
    (SpiritType::Tiger, SpiritType::Fox),
    (SpiritType::Dragon, SpiritType::Eagle),
    (SpiritType::Phoenix, SpiritType::Otter),
    (SpiritType::Alien, SpiritType::Otter),
    (SpiritType::Yeti, SpiritType::Wolf),
];

struct SpiritSpec {
    spirit: SpiritType,
    specializations: [(&'static str, [&'static str; 3]); 3],
    behavioral: [&'static str; 3],
    knowledge_domains: [&'static str; 4],
}

const SPIRIT_SPECS: [SpiritSpec; 10] = [
    SpiritSpec {
        spirit: SpiritType::Fox,
        specializations: [
            (
                "strategic_planning",
                [
                    r"\b(strategy|strategic|planning|roadmap|vision)\b",
                    r"\b(long-term|future|goals|objectives|milestones)\b",
                    r"\b(analyze|evaluate|assess|consider|weigh)\b",
                ],
            ),
            (
                "problem_solving",
                [
                    r"\b(solve|resolve|fix|address|tackle)\b",
                    r"\b(solution|approach|method|strategy)\b",
                    r"\b(debug|troubleshoot|diagnose|investigate)\b",
                ],
            ),
            (
                "adaptability",
                [
                    r"\b(adapt|adjust|modify|change|flexible)\b",
                    r"\b(versatile|dynamic|responsive|agile)\b",
                    r"\b(evolve|transform|shift|pivot)\b",
                ],
            ),
        ],
        behavioral: [
            r"\b(cunning|clever|strategic|tactical)\b",
            r"\b(analyze|evaluate|consider|weigh)\b",
            r"\b(approach|method|strategy|tactic)\b",
        ],
        knowledge_domains: ["strategy", "analysis", "planning", "optimization"],
    },
    SpiritSpec {
        spirit: SpiritType::Wolf,
        specializations: [
            (
                "leadership",
                [
                    r"\b(lead|guide|direct|manage|coordinate)\b",
                    r"\b(command|authority|influence|inspire|motivate)\b",
                    r"\b(mentor|coach|teach|guide|develop)\b",
                ],
            ),
            (
                "team_coordination",
                [
                    r"\b(team|group|collaborate|coordinate|organize)\b",
                    r"\b(work together|cooperation|partnership|alliance)\b",
                    r"\b(delegate|assign|distribute|allocate)\b",
                ],
            ),
            (
                "protection",
                [
                    r"\b(protect|guard|defend|secure|safeguard)\b",
                    r"\b(security|safety|reliability|stability)\b",
                    r"\b(monitor|watch|oversee|supervise)\b",
                ],
            ),
        ],
        behavioral: [
            r"\b(pack|team|group|collective)\b",
            r"\b(protect|guard|defend|secure)\b",
            r"\b(lead|guide|direct|command)\b",
        ],
        knowledge_domains: ["leadership", "teamwork", "security", "management"],
    },
    SpiritSpec {
        spirit: SpiritType::Otter,
        specializations: [
            (
                "testing",
                [
                    r"\b(test|testing|validate|verify|check)\b",
                    r"\b(quality|assurance|QA|validation)\b",
                    r"\b(debug|troubleshoot|fix|resolve)\b",
                ],
            ),
            (
                "quality_assurance",
                [
                    r"\b(quality|standards|best practices|excellence)\b",
                    r"\b(review|inspect|audit|evaluate)\b",
                    r"\b(improve|enhance|optimize|refine)\b",
                ],
            ),
            (
                "playful_innovation",
                [
                    r"\b(creative|innovative|fun|playful|experimental)\b",
                    r"\b(explore|discover|experiment|try)\b",
                    r"\b(imagine|design|create|invent)\b",
                ],
            ),
        ],
        behavioral: [
            r"\b(playful|fun|creative|experimental)\b",
            r"\b(test|validate|check|verify)\b",
            r"\b(explore|discover|experiment)\b",
        ],
        knowledge_domains: ["testing", "quality", "innovation", "creativity"],
    },
    SpiritSpec {
        spirit: SpiritType::Eagle,
        specializations: [
            (
                "vision",
                [
                    r"\b(vision|overview|perspective|insight)\b",
                    r"\b(see|observe|monitor|watch)\b",
                    r"\b(analyze|examine|study|investigate)\b",
                ],
            ),
            (
                "analysis",
                [
                    r"\b(analyze|examine|evaluate|assess)\b",
                    r"\b(insight|understanding|comprehension)\b",
                    r"\b(pattern|trend|correlation|relationship)\b",
                ],
            ),
            (
                "strategic_oversight",
                [
                    r"\b(oversee|supervise|monitor|watch)\b",
                    r"\b(strategic|high-level|executive|management)\b",
                    r"\b(guidance|direction|leadership|vision)\b",
                ],
            ),
        ],
        behavioral: [
            r"\b(soar|fly|high|elevated)\b",
            r"\b(see|observe|monitor|watch)\b",
            r"\b(analyze|examine|study|investigate)\b",
        ],
        knowledge_domains: ["analysis", "strategy", "oversight", "vision"],
    },
    SpiritSpec {
        spirit: SpiritType::Lion,
        specializations: [
            (
                "leadership",
                [
                    r"\b(lead|command|direct|govern|rule)\b",
                    r"\b(authority|power|influence|dominance)\b",
                    r"\b(inspire|motivate|guide|mentor)\b",
                ],
            ),
            (
                "authority",
                [
                    r"\b(authority|power|control|command|dominance)\b",
                    r"\b(responsibility|accountability|oversight)\b",
                    r"\b(decision|choice|judgment|determination)\b",
                ],
            ),
            (
                "strategic_vision",
                [
                    r"\b(vision|mission|purpose|direction)\b",
                    r"\b(strategic|long-term|future|goals)\b",
                    r"\b(inspire|motivate|guide|lead)\b",
                ],
            ),
        ],
        behavioral: [
            r"\b(confident|bold|decisive|authoritative)\b",
            r"\b(lead|command|direct|govern)\b",
            r"\b(inspire|motivate|guide|mentor)\b",
        ],
        knowledge_domains: ["leadership", "strategy", "management", "vision"],
    },
    SpiritSpec {
        spirit: SpiritType::Tiger,
        specializations: [
            (
                "focused_execution",
                [
                    r"\b(execute|deliver|implement|complete|ship)\b",
                    r"\b(focus|focused|precise|precision|target)\b",
                    r"\b(deadline|priority|urgent|immediately)\b",
                ],
            ),
            (
                "decisive_action",
                [
                    r"\b(decide|decisive|commit|act|strike)\b",
                    r"\b(swift|fast|rapid|quick|quickly)\b",
                    r"\b(bold|direct|confident|determined)\b",
                ],
            ),
            (
                "performance_optimization",
                [
                    r"\b(optimize|performance|speed|throughput|latency)\b",
                    r"\b(benchmark|measure|profile|tune)\b",
                    r"\b(efficient|efficiency|lean|streamline)\b",
                ],
            ),
        ],
        behavioral: [
            r"\b(fierce|intense|relentless|powerful)\b",
            r"\b(focus|target|precise|strike)\b",
            r"\b(swift|decisive|bold|direct)\b",
        ],
        knowledge_domains: ["execution", "performance", "optimization", "delivery"],
    },
    SpiritSpec {
        spirit: SpiritType::Dragon,
        specializations: [
            (
                "system_architecture",
                [
                    r"\b(architecture|architect|system|infrastructure|platform)\b",
                    r"\b(scalable|scalability|distributed|resilient)\b",
                    r"\b(component|layer|module|interface)\b",
                ],
            ),
            (
                "knowledge_mastery",
                [
                    r"\b(master|mastery|expertise|deep|profound)\b",
                    r"\b(knowledge|wisdom|understanding|insight)\b",
                    r"\b(ancient|foundational|fundamental|principle)\b",
                ],
            ),
            (
                "guardianship",
                [
                    r"\b(guard|protect|preserve|safeguard|defend)\b",
                    r"\b(integrity|stability|consistency|durability)\b",
                    r"\b(risk|threat|vulnerability|failure)\b",
                ],
            ),
        ],
        behavioral: [
            r"\b(powerful|mighty|commanding|formidable)\b",
            r"\b(wisdom|knowledge|mastery|ancient)\b",
            r"\b(guard|protect|preserve|defend)\b",
        ],
        knowledge_domains: ["architecture", "systems", "knowledge", "security"],
    },
    SpiritSpec {
        spirit: SpiritType::Phoenix,
        specializations: [
            (
                "transformation",
                [
                    r"\b(transform|transformation|reinvent|rebuild|renew)\b",
                    r"\b(migrate|migration|modernize|overhaul)\b",
                    r"\b(evolve|evolution|change|rebirth)\b",
                ],
            ),
            (
                "recovery",
                [
                    r"\b(recover|recovery|restore|rollback|revive)\b",
                    r"\b(resilient|resilience|fallback|redundancy)\b",
                    r"\b(incident|outage|failure|postmortem)\b",
                ],
            ),
            (
                "continuous_improvement",
                [
                    r"\b(improve|improvement|iterate|iteration|refine)\b",
                    r"\b(learn|lesson|feedback|reflect)\b",
                    r"\b(cycle|loop|generation|progress)\b",
                ],
            ),
        ],
        behavioral: [
            r"\b(rise|renew|rebirth|reborn)\b",
            r"\b(transform|evolve|adapt|change)\b",
            r"\b(resilient|persistent|enduring|recover)\b",
        ],
        knowledge_domains: ["transformation", "recovery", "resilience", "improvement"],
    },
    SpiritSpec {
        spirit: SpiritType::Alien,
        specializations: [
            (
                "unconventional_thinking",
                [
                    r"\b(unconventional|unusual|unorthodox|radical|novel)\b",
                    r"\b(paradigm|reframe|rethink|perspective)\b",
                    r"\b(what if|alternative|contrary|different)\b",
                ],
            ),
            (
                "research_exploration",
                [
                    r"\b(research|explore|investigate|experiment|probe)\b",
                    r"\b(hypothesis|theory|discovery|unknown)\b",
                    r"\b(observe|measure|sample|signal)\b",
                ],
            ),
            (
                "cross_domain_synthesis",
                [
                    r"\b(combine|synthesize|integrate|merge|fuse)\b",
                    r"\b(interdisciplinary|cross-domain|hybrid|blend)\b",
                    r"\b(analogy|connection|bridge|link)\b",
                ],
            ),
        ],
        behavioral: [
            r"\b(curious|strange|alien|foreign)\b",
            r"\b(explore|discover|probe|investigate)\b",
            r"\b(novel|radical|unconventional|unusual)\b",
        ],
        knowledge_domains: ["research", "exploration", "synthesis", "innovation"],
    },
    SpiritSpec {
        spirit: SpiritType::Yeti,
        specializations: [
            (
                "endurance",
                [
                    r"\b(endure|endurance|persist|persistent|sustain)\b",
                    r"\b(long-running|marathon|steady|stamina)\b",
                    r"\b(patience|patient|persevere|durable)\b",
                ],
            ),
            (
                "reliability_engineering",
                [
                    r"\b(reliable|reliability|uptime|availability)\b",
                    r"\b(monitor|alert|observability|logging)\b",
                    r"\b(redundant|redundancy|backup|failover)\b",
                ],
            ),
            (
                "resource_stewardship",
                [
                    r"\b(conserve|budget|resource|capacity)\b",
                    r"\b(efficient|sustainable|frugal|economical)\b",
                    r"\b(maintain|maintenance|upkeep|steward)\b",
                ],
            ),
        ],
        behavioral: [
            r"\b(calm|steady|patient|quiet)\b",
            r"\b(endure|persist|sustain|withstand)\b",
            r"\b(protect|shelter|maintain|preserve)\b",
        ],
        knowledge_domains: ["reliability", "maintenance", "resources", "operations"],
    },
];

struct CompiledSpirit {
    spirit: SpiritType,
    specializations: Vec<PatternCategory>,
    behavioral: PatternCategory,
    knowledge: PatternCategory,
}

impl CompiledSpirit {
    fn compile(spec: &SpiritSpec) -> Result<Self, AnalysisError> {
        let specializations = spec
            .specializations
            .iter()
            .map(|(name, patterns)| {
                PatternCategory::new(*name, 1.0, Scaling::Linear).with_regexes(patterns)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            spirit: spec.spirit,
            specializations,
            behavioral: PatternCategory::new("behavioral", BEHAVIORAL_WEIGHT, Scaling::Linear)
                .with_regexes(&spec.behavioral)?,
            knowledge: PatternCategory::new("knowledge", KNOWLEDGE_WEIGHT, Scaling::Linear)
                .with_keywords(&spec.knowledge_domains),
        })
    }
}

/// Full specialization analysis of one output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecializationAnalysis {
    pub spirit: SpiritType,
    pub overall_accuracy: f64,
    pub role_alignment: f64,
    pub expertise_depth: f64,
    pub behavioral_consistency: f64,
    pub knowledge_application: f64,
    /// specialization -> linear hit-rate
    pub specialization_scores: BTreeMap<String, f64>,
    pub behavioral_indicators: Vec<String>,
    /// knowledge domain -> 1.0 if mentioned
    pub domain_coverage: BTreeMap<String, f64>,
}

impl SpecializationAnalysis {
    pub fn summary(&self) -> SpecializationSummary {
        SpecializationSummary {
            spirit: self.spirit,
            overall_accuracy: self.overall_accuracy,
            role_alignment: self.role_alignment,
            expertise_depth: self.expertise_depth,
            behavioral_consistency: self.behavioral_consistency,
            knowledge_application: self.knowledge_application,
        }
    }

    /// The specialization with the highest hit-rate, if any matched
    pub fn top_specialization(&self) -> Option<(&str, f64)> {
        self.specialization_scores
            .iter()
            .filter(|(_, score)| **score > 0.0)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(name, score)| (name.as_str(), *score))
    }
}

pub struct SpecializationAnalyzer {
    spirits: Vec<CompiledSpirit>,
}

impl SpecializationAnalyzer {
    pub fn new() -> Result<Self, AnalysisError> {
        let spirits = SPIRIT_SPECS
            .iter()
            .map(CompiledSpirit::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { spirits })
    }

    /// Primary specialization names of a spirit
    pub fn specializations_of(&self, spirit: SpiritType) -> Vec<&str> {
        self.spirits
            .iter()
            .find(|s| s.spirit == spirit)
            .map(|s| s.specializations.iter().map(|c| c.name.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn analyze_text(
        &self,
        text: &TextSample<'_>,
        spirit: SpiritType,
    ) -> Result<SpecializationAnalysis, AnalysisError> {
        let compiled = self
            .spirits
            .iter()
            .find(|s| s.spirit == spirit)
            .ok_or_else(|| AnalysisError::UnknownSpirit(spirit.to_string()))?;

        let specialization_scores: BTreeMap<String, f64> = compiled
            .specializations
            .iter()
            .map(|c| (c.name.clone(), c.score(text)))
            .collect();
        let n = compiled.specializations.len().max(1) as f64;
        let role_alignment = specialization_scores.values().sum::<f64>() / n;

        let expertise_depth = (compiled
            .specializations
            .iter()
            .map(|c| c.occurrences(text) as f64 / c.len().max(1) as f64)
            .sum::<f64>()
            / n)
            .min(1.0);

        let behavioral_consistency = compiled.behavioral.score(text);
        let knowledge_application = compiled.knowledge.score(text);

        let overall_accuracy = (role_alignment * ROLE_ALIGNMENT_WEIGHT
            + expertise_depth * EXPERTISE_DEPTH_WEIGHT
            + behavioral_consistency * BEHAVIORAL_WEIGHT
            + knowledge_application * KNOWLEDGE_WEIGHT)
            .min(1.0);

        let mut behavioral_indicators = compiled.behavioral.excerpts(text, 2);
        behavioral_indicators.truncate(MAX_BEHAVIORAL_INDICATORS);

        let domain_coverage = compiled
            .knowledge
            .matchers()
            .iter()
            .map(|m| {
                let covered = if m.is_match(text) { 1.0 } else { 0.0 };
                (m.pattern().to_string(), covered)
            })
            .collect();

        trace!(spirit = %spirit, accuracy = overall_accuracy, "Scored specialization");

        Ok(SpecializationAnalysis {
            spirit,
            overall_accuracy,
            role_alignment,
            expertise_depth,
            behavioral_consistency,
            knowledge_application,
            specialization_scores,
            behavioral_indicators,
            domain_coverage,
        })
    }
}

impl TextAnalyzer for SpecializationAnalyzer {
    type Output = Result<SpecializationAnalysis, AnalysisError>;

    fn name(&self) -> &'static str {
        "specialization"
    }

    fn analyze(&self, text: &TextSample<'_>, agent: &AgentState) -> Self::Output {
        self.analyze_text(text, agent.spirit)
    }
}

pub fn are_complementary_spirits(a: SpiritType, b: SpiritType) -> bool {
    COMPLEMENTARY_SPIRITS
        .iter()
        .any(|(x, y)| (a == *x && b == *y) || (a == *y && b == *x))
}

/// Transfer potential between every pair of analyses, keyed `a_to_b`
pub fn cross_specialization_transfer(analyses: &[SpecializationAnalysis]) -> BTreeMap<String, f64> {
    let mut transfer = BTreeMap::new();
    for (i, a) in analyses.iter().enumerate() {
        for b in &analyses[i + 1..] {
            let mut score = a.overall_accuracy * b.overall_accuracy * 0.8;
            if are_complementary_spirits(a.spirit, b.spirit) {
                score *= 1.3;
            }
            transfer.insert(format!("{}_to_{}", a.spirit, b.spirit), score.min(1.0));
        }
    }
    transfer
}

/// 1 − population variance of the accuracies, floored at 0
pub fn specialization_consistency(analyses: &[SpecializationAnalysis]) -> f64 {
    if analyses.len() < 2 {
        return 1.0;
    }
    let n = analyses.len() as f64;
    let mean = analyses.iter().map(|a| a.overall_accuracy).sum::<f64>() / n;
    let variance = analyses
        .iter()
        .map(|a| (a.overall_accuracy - mean).powi(2))
        .sum::<f64>()
        / n;
    (1.0 - variance).max(0.0)
}
