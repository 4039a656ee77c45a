//! Domain expertise detection over ten knowledge domains

use std::collections::{BTreeMap, BTreeSet};

use phoenix_common::{AgentState, AnalysisError, DomainKnowledge, ExpertiseLevel};
use serde::Serialize;
use tracing::debug;

use crate::analyzer::TextAnalyzer;
use crate::scoring::{PatternCategory, PatternTable, Scaling};
use crate::text::{word_count, TextSample};

/// Minimum corrected score for a domain to be reported
pub const DOMAIN_REPORT_THRESHOLD: f64 = 0.1;

const DEPTH_WEIGHT: f64 = 0.10;
const MIN_NORMALIZED_WORDS: usize = 20;
const PADDING_WORD: &str = "padding";
const MAX_NORMALIZED_WORDS: usize = 1000;
const OPTIMAL_MIN_WORDS: usize = 50;
const OPTIMAL_MAX_WORDS: usize = 200;
const MAX_INDICATORS: usize = 8;
const COMPLEX_CONCEPT_WEIGHT: f64 = 0.15;

const COMPLEX_CONCEPTS: [&str; 12] = [
    "neural network",
    "deep learning",
    "reinforcement learning",
    "transformer",
    "attention mechanism",
    "backpropagation",
    "design thinking",
    "lean startup",
    "blue ocean strategy",
    "statistical significance",
    "meta-analysis",
    "systematic review",
];

const COMPLEMENTARY_DOMAINS: [(&str, &str); 9] = [
    ("software_engineering", "machine_learning"),
    ("data_science", "machine_learning"),
    ("research_methodology", "data_science"),
    ("software_engineering", "data_science"),
    ("business_strategy", "project_management"),
    ("design_thinking", "technical_writing"),
    ("healthcare", "research_methodology"),
    ("finance", "data_science"),
    ("project_management", "technical_writing"),
];

pub(crate) struct DomainSpec {
    pub name: &'static str,
    pub bias: f64,
    terminology: &'static [&'static str],
    concepts: &'static [&'static str],
    methodology: &'static [&'static str],
    pub context: &'static [&'static str],
    beginner: &'static [&'static str],
    intermediate: &'static [&'static str],
    expert: &'static [&'static str],
    /// Lowercase concept names reported as structured knowledge
    pub concept_keywords: &'static [&'static str],
}

pub(crate) const DOMAIN_SPECS: &[DomainSpec] = &[
    DomainSpec {
        name: "software_engineering",
        bias: 0.9,
        terminology: &[
            r"\b(algorithm|data structure|complexity|optimization|refactoring)\b",
            r"\b(design pattern|architecture|framework|library|API|SDK)\b",
            r"\b(debugging|testing|deployment|CI/CD|DevOps|containerization)\b",
            r"\b(microservices|scalability|performance|security|maintainability)\b",
        ],
        concepts: &[
            r"\b(OOP|functional programming|SOLID principles|DRY|KISS)\b",
            r"\b(agile|scrum|kanban|TDD|BDD|continuous integration)\b",
            r"\b(version control|git|repository|branch|merge|pull request)\b",
            r"\b(clean code|code review|pair programming|technical debt)\b",
        ],
        methodology: &[
            r"\b(test-driven development|behavior-driven development)\b",
            r"\b(continuous integration|continuous deployment|blue-green)\b",
            r"\b(code review|pair programming|mob programming)\b",
            r"\b(iterative development|sprint planning|retrospective)\b",
        ],
        context: &["code", "programming", "development", "software", "application", "system"],
        beginner: &["basic", "simple", "fundamental", "introductory"],
        intermediate: &["advanced", "complex", "sophisticated", "professional"],
        expert: &["expert", "master", "specialist", "architect", "senior"],
        concept_keywords: &[
            "data structures",
            "algorithms",
            "design patterns",
            "functional programming",
            "version control",
            "technical debt",
        ],
    },
    DomainSpec {
        name: "machine_learning",
        bias: 0.95,
        terminology: &[
            r"\b(neural network|deep learning|reinforcement learning|supervised|unsupervised)\b",
            r"\b(feature engineering|model training|hyperparameter|overfitting|underfitting)\b",
            r"\b(cross-validation|regularization|ensemble|gradient descent|backpropagation)\b",
            r"\b(CNN|RNN|LSTM|transformer|attention|BERT|GPT)\b",
        ],
        concepts: &[
            r"\b(classification|regression|clustering|dimensionality reduction)\b",
            r"\b(bias-variance tradeoff|overfitting|underfitting|generalization)\b",
            r"\b(ROC|AUC|precision|recall|F1-score|confusion matrix)\b",
            r"\b(transfer learning|fine-tuning|data augmentation|feature selection)\b",
        ],
        methodology: &[
            r"\b(train|validation|test split|k-fold cross-validation)\b",
            r"\b(feature selection|model selection|hyperparameter tuning)\b",
            r"\b(grid search|random search|Bayesian optimization)\b",
            r"\b(model evaluation|metrics|A/B testing|statistical significance)\b",
        ],
        context: &["model", "training", "prediction", "algorithm", "data", "learning"],
        beginner: &["basic", "simple", "linear", "introductory"],
        intermediate: &["advanced", "complex", "deep", "sophisticated"],
        expert: &["state-of-the-art", "cutting-edge", "research", "novel", "breakthrough"],
        concept_keywords: &[
            "neural network",
            "gradient descent",
            "overfitting",
            "transfer learning",
            "classification",
            "clustering",
        ],
    },
    DomainSpec {
        name: "data_science",
        bias: 0.9,
        terminology: &[
            r"\b(statistical analysis|hypothesis testing|correlation|regression)\b",
            r"\b(data visualization|EDA|exploratory data analysis|dashboard)\b",
            r"\b(data cleaning|preprocessing|feature engineering|ETL)\b",
            r"\b(anomaly detection|outlier|distribution|sampling)\b",
        ],
        concepts: &[
            r"\b(central limit theorem|p-value|confidence interval|statistical power)\b",
            r"\b(overfitting|bias|variance|cross-validation|bootstrap)\b",
            r"\b(feature selection|dimensionality reduction|PCA|t-SNE)\b",
            r"\b(ensemble methods|boosting|bagging|random forest)\b",
        ],
        methodology: &[
            r"\b(CRISP-DM|data mining process|KDD|SEMMA)\b",
            r"\b(statistical significance|A/B testing|experimental design)\b",
            r"\b(data pipeline|ETL|data warehousing|data lake)\b",
            r"\b(randomized controlled trial|quasi-experimental|observational)\b",
        ],
        context: &["data", "analysis", "statistics", "insights", "patterns", "trends"],
        beginner: &["basic", "simple", "descriptive", "introductory"],
        intermediate: &["advanced", "predictive", "diagnostic", "sophisticated"],
        expert: &["prescriptive", "causal", "experimental", "research", "cutting-edge"],
        concept_keywords: &[
            "hypothesis testing",
            "data visualization",
            "confidence interval",
            "random forest",
            "data pipeline",
            "correlation",
        ],
    },
    DomainSpec {
        name: "business_strategy",
        bias: 1.1,
        terminology: &[
            r"\b(strategic planning|competitive advantage|market analysis|SWOT)\b",
            r"\b(business model|value proposition|revenue stream|cost structure)\b",
            r"\b(market segmentation|target market|customer persona|value chain)\b",
            r"\b(competitive analysis|market positioning|brand strategy|pricing strategy)\b",
        ],
        concepts: &[
            r"\b(Porter's five forces|blue ocean strategy|disruptive innovation)\b",
            r"\b(lean startup|agile methodology|design thinking|customer development)\b",
            r"\b(digital transformation|innovation management|change management)\b",
            r"\b(stakeholder management|risk management|project management)\b",
        ],
        methodology: &[
            r"\b(strategic planning process|business case development)\b",
            r"\b(market research|competitive intelligence|customer research)\b",
            r"\b(financial modeling|scenario planning|sensitivity analysis)\b",
            r"\b(performance measurement|KPI|balanced scorecard)\b",
        ],
        context: &["strategy", "business", "market", "competitive", "growth", "innovation"],
        beginner: &["basic", "introductory", "foundational"],
        intermediate: &["advanced", "sophisticated", "professional"],
        expert: &["strategic", "executive", "visionary", "transformational"],
        concept_keywords: &[
            "competitive advantage",
            "value proposition",
            "business model",
            "market segmentation",
            "disruptive innovation",
            "scenario planning",
        ],
    },
    DomainSpec {
        name: "project_management",
        bias: 1.05,
        terminology: &[
            r"\b(project scope|timeline|milestone|deliverable|stakeholder)\b",
            r"\b(risk management|quality assurance|change management|communication)\b",
            r"\b(resource allocation|budget management|cost control|schedule)\b",
            r"\b(project charter|work breakdown structure|critical path|Gantt chart)\b",
        ],
        concepts: &[
            r"\b(PMBOK|PRINCE2|Agile|Scrum|Kanban|Lean)\b",
            r"\b(waterfall|iterative|incremental|adaptive|hybrid)\b",
            r"\b(project lifecycle|initiation|planning|execution|monitoring|closure)\b",
            r"\b(team dynamics|leadership|motivation|conflict resolution)\b",
        ],
        methodology: &[
            r"\b(project planning|risk assessment|stakeholder analysis)\b",
            r"\b(quality planning|communication planning|procurement planning)\b",
            r"\b(performance monitoring|variance analysis|corrective action)\b",
            r"\b(lessons learned|post-mortem|continuous improvement)\b",
        ],
        context: &["project", "management", "planning", "execution", "delivery", "team"],
        beginner: &["basic", "introductory", "assistant"],
        intermediate: &["coordinator", "manager", "professional"],
        expert: &["director", "executive", "consultant", "expert"],
        concept_keywords: &[
            "milestone",
            "critical path",
            "resource allocation",
            "risk assessment",
            "stakeholder analysis",
            "lessons learned",
        ],
    },
    DomainSpec {
        name: "design_thinking",
        bias: 1.1,
        terminology: &[
            r"\b(user experience|UX|user interface|UI|usability|accessibility)\b",
            r"\b(design system|component library|wireframe|prototype|mockup)\b",
            r"\b(user research|persona|journey map|empathy map|user story)\b",
            r"\b(visual design|typography|color theory|layout|composition)\b",
        ],
        concepts: &[
            r"\b(design thinking process|empathize|define|ideate|prototype|test)\b",
            r"\b(human-centered design|user-centered design|service design)\b",
            r"\b(design patterns|affordances|constraints|feedback loops)\b",
            r"\b(design principles|consistency|hierarchy|contrast|alignment)\b",
        ],
        methodology: &[
            r"\b(design research|ethnographic research|usability testing)\b",
            r"\b(rapid prototyping|iterative design|A/B testing)\b",
            r"\b(design critique|design review|design sprint)\b",
            r"\b(accessibility audit|usability audit|heuristic evaluation)\b",
        ],
        context: &["design", "user", "experience", "interface", "creative", "visual"],
        beginner: &["basic", "introductory", "junior"],
        intermediate: &["mid-level", "senior", "specialist"],
        expert: &["lead", "principal", "director", "expert"],
        concept_keywords: &[
            "user experience",
            "wireframe",
            "prototype",
            "journey map",
            "usability testing",
            "human-centered design",
        ],
    },
    DomainSpec {
        name: "research_methodology",
        bias: 1.0,
        terminology: &[
            r"\b(hypothesis|research question|methodology|literature review)\b",
            r"\b(peer review|meta-analysis|systematic review|evidence synthesis)\b",
            r"\b(statistical significance|effect size|power analysis|confidence interval)\b",
            r"\b(validity|reliability|generalizability|replicability)\b",
        ],
        concepts: &[
            r"\b(experimental design|quasi-experimental|observational|longitudinal)\b",
            r"\b(randomized controlled trial|RCT|cohort study|case-control)\b",
            r"\b(qualitative|quantitative|mixed methods|triangulation)\b",
            r"\b(grounded theory|phenomenology|ethnography|case study)\b",
        ],
        methodology: &[
            r"\b(research protocol|IRB|ethics approval|informed consent)\b",
            r"\b(data collection|sampling|recruitment|randomization)\b",
            r"\b(statistical analysis|data analysis|interpretation|synthesis)\b",
            r"\b(publication|dissemination|knowledge translation|impact)\b",
        ],
        context: &["research", "study", "investigation", "analysis", "evidence", "academic"],
        beginner: &["basic", "introductory", "foundational"],
        intermediate: &["advanced", "sophisticated", "rigorous"],
        expert: &["cutting-edge", "pioneering", "groundbreaking", "novel"],
        concept_keywords: &[
            "hypothesis",
            "literature review",
            "effect size",
            "mixed methods",
            "case study",
            "data collection",
        ],
    },
    DomainSpec {
        name: "technical_writing",
        bias: 1.05,
        terminology: &[
            r"\b(documentation|technical writing|user manual|API documentation)\b",
            r"\b(style guide|writing standards|clarity|conciseness|precision)\b",
            r"\b(procedural writing|explanatory writing|persuasive writing)\b",
            r"\b(editing|proofreading|revision|peer review|feedback)\b",
        ],
        concepts: &[
            r"\b(audience analysis|purpose|context|tone|voice)\b",
            r"\b(information architecture|content strategy|content design)\b",
            r"\b(plain language|readability|accessibility|inclusivity)\b",
            r"\b(version control|content management|localization|translation)\b",
        ],
        methodology: &[
            r"\b(writing process|planning|drafting|revising|editing)\b",
            r"\b(content audit|gap analysis|user research|usability testing)\b",
            r"\b(collaborative writing|review process|approval workflow)\b",
            r"\b(quality assurance|consistency check|style compliance)\b",
        ],
        context: &["writing", "documentation", "communication", "content", "text", "language"],
        beginner: &["basic", "introductory", "junior"],
        intermediate: &["professional", "senior", "specialist"],
        expert: &["expert", "principal", "director", "master"],
        concept_keywords: &[
            "style guide",
            "user manual",
            "plain language",
            "readability",
            "content strategy",
            "audience analysis",
        ],
    },
    DomainSpec {
        name: "healthcare",
        bias: 1.1,
        terminology: &[
            r"\b(patient care|clinical practice|medical diagnosis|treatment)\b",
            r"\b(evidence-based medicine|clinical guidelines|best practices)\b",
            r"\b(healthcare delivery|patient safety|quality improvement)\b",
            r"\b(medical ethics|informed consent|patient privacy|HIPAA)\b",
        ],
        concepts: &[
            r"\b(clinical decision support|diagnostic accuracy|treatment efficacy)\b",
            r"\b(health outcomes|patient satisfaction|care coordination)\b",
            r"\b(health disparities|social determinants|population health)\b",
            r"\b(healthcare innovation|digital health|telemedicine)\b",
        ],
        methodology: &[
            r"\b(clinical trials|observational studies|systematic reviews)\b",
            r"\b(quality improvement|patient safety|risk management)\b",
            r"\b(healthcare analytics|outcomes research|health services research)\b",
            r"\b(implementation science|knowledge translation|evidence implementation)\b",
        ],
        context: &["healthcare", "medical", "clinical", "patient", "health", "treatment"],
        beginner: &["basic", "introductory", "student"],
        intermediate: &["practitioner", "professional", "specialist"],
        expert: &["expert", "consultant", "researcher", "leader"],
        concept_keywords: &[
            "patient care",
            "diagnosis",
            "clinical trials",
            "patient safety",
            "population health",
            "telemedicine",
        ],
    },
    DomainSpec {
        name: "finance",
        bias: 1.0,
        terminology: &[
            r"\b(financial analysis|investment|portfolio|risk management)\b",
            r"\b(capital markets|equity|debt|derivatives|options|futures)\b",
            r"\b(financial modeling|valuation|DCF|NPV|IRR|ROI)\b",
            r"\b(regulatory compliance|Basel|SOX|IFRS|GAAP)\b",
        ],
        concepts: &[
            r"\b(efficient market hypothesis|portfolio theory|CAPM|beta)\b",
            r"\b(risk-return tradeoff|diversification|correlation|volatility)\b",
            r"\b(financial engineering|quantitative finance|algorithmic trading)\b",
            r"\b(behavioral finance|market psychology|herd behavior)\b",
        ],
        methodology: &[
            r"\b(financial statement analysis|ratio analysis|trend analysis)\b",
            r"\b(credit analysis|risk assessment|stress testing)\b",
            r"\b(portfolio optimization|asset allocation|rebalancing)\b",
            r"\b(regulatory reporting|compliance monitoring|audit)\b",
        ],
        context: &["finance", "financial", "investment", "market", "risk", "capital"],
        beginner: &["basic", "introductory", "analyst"],
        intermediate: &["associate", "manager", "specialist"],
        expert: &["director", "executive", "expert", "consultant"],
        concept_keywords: &[
            "portfolio",
            "valuation",
            "diversification",
            "volatility",
            "asset allocation",
            "cash flow",
        ],
    },
];

/// Terminology usage within one domain
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TerminologyUsage {
    pub total_terms: usize,
    pub unique_terms: BTreeSet<String>,
    /// unique / total
    pub sophistication: f64,
    /// terms per word
    pub density: f64,
}

/// How deeply a domain's concepts are used
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConceptDepth {
    pub concept_count: usize,
    pub complexity: f64,
    pub integration: f64,
    pub sophistication: f64,
}

/// Detected expertise in one domain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainExpertise {
    pub domain: String,
    pub expertise_score: f64,
    pub level: ExpertiseLevel,
    pub confidence: f64,
    pub indicators: Vec<String>,
    pub terminology: TerminologyUsage,
    pub concept_depth: ConceptDepth,
    pub length_factor: f64,
}

impl DomainExpertise {
    pub fn to_knowledge(&self) -> DomainKnowledge {
        DomainKnowledge {
            expertise_score: self.expertise_score,
            level: self.level,
            confidence: self.confidence,
            indicators: self.indicators.clone(),
        }
    }
}

struct CompiledDomain {
    spec: &'static DomainSpec,
    table: PatternTable,
    levels: [(ExpertiseLevel, PatternCategory, f64, f64); 3],
}

impl CompiledDomain {
    fn compile(spec: &'static DomainSpec) -> Result<Self, AnalysisError> {
        let table = PatternTable::new(spec.name)
            .with_category(
                PatternCategory::new("terminology", 0.25, Scaling::Logarithmic)
                    .with_regexes(spec.terminology)?,
            )
            .with_category(
                PatternCategory::new("concepts", 0.25, Scaling::Logarithmic).with_regexes(spec.concepts)?,
            )
            .with_category(
                PatternCategory::new("methodology", 0.25, Scaling::Logarithmic)
                    .with_regexes(spec.methodology)?,
            )
            .with_category(
                PatternCategory::new("context", 0.15, Scaling::SquareRoot).with_keywords(spec.context),
            );

        // (level, indicators, depth weight, level weight)
        let levels = [
            (
                ExpertiseLevel::Beginner,
                PatternCategory::new("beginner", 0.0, Scaling::Linear).with_keywords(spec.beginner),
                0.2,
                1.0,
            ),
            (
                ExpertiseLevel::Intermediate,
                PatternCategory::new("intermediate", 0.0, Scaling::Linear)
                    .with_keywords(spec.intermediate),
                0.4,
                1.5,
            ),
            (
                ExpertiseLevel::Expert,
                PatternCategory::new("expert", 0.0, Scaling::Linear).with_keywords(spec.expert),
                0.6,
                2.0,
            ),
        ];

        Ok(Self { spec, table, levels })
    }

    fn depth(&self, text: &TextSample<'_>) -> f64 {
        let total: usize = self.levels.iter().map(|(_, c, _, _)| c.len()).sum();
        if total == 0 {
            return 0.0;
        }
        let weighted: f64 = self
            .levels
            .iter()
            .map(|(_, c, w, _)| c.hits(text) as f64 * w)
            .sum();
        (weighted / total as f64).min(1.0)
    }

    fn level(&self, text: &TextSample<'_>) -> ExpertiseLevel {
        let mut best = (ExpertiseLevel::Unknown, 0.0);
        for (level, indicators, _, weight) in &self.levels {
            let score = indicators.hits(text) as f64 * weight;
            if score > best.1 {
                best = (*level, score);
            }
        }
        best.0
    }

    fn indicators(&self, text: &TextSample<'_>) -> Vec<String> {
        let mut indicators = Vec::new();
        for (category, per_pattern) in [("terminology", 2), ("concepts", 2), ("methodology", 1)] {
            if let Some(c) = self.table.category(category) {
                indicators.extend(c.excerpts(text, per_pattern));
            }
        }
        indicators.truncate(MAX_INDICATORS);
        indicators
    }

    fn terminology(&self, text: &TextSample<'_>) -> TerminologyUsage {
        let terms = self
            .table
            .category("terminology")
            .map(|c| c.excerpts(text, usize::MAX))
            .unwrap_or_default();
        let total_terms = terms.len();
        let unique_terms: BTreeSet<String> = terms.iter().map(|t| t.to_lowercase()).collect();
        let words = text.word_count();

        TerminologyUsage {
            total_terms,
            sophistication: if total_terms > 0 {
                unique_terms.len() as f64 / total_terms as f64
            } else {
                0.0
            },
            density: if words > 0 {
                total_terms as f64 / words as f64
            } else {
                0.0
            },
            unique_terms,
        }
    }

    fn concept_depth(&self, text: &TextSample<'_>) -> ConceptDepth {
        let concept_count = self
            .table
            .category("concepts")
            .map(|c| c.occurrences(text))
            .unwrap_or(0);
        let complexity = (COMPLEX_CONCEPTS
            .iter()
            .filter(|c| text.lower().contains(*c))
            .count() as f64
            * COMPLEX_CONCEPT_WEIGHT)
            .min(1.0);
        let integration = if concept_count > 1 {
            (concept_count as f64 * 0.08).min(1.0)
        } else {
            0.0
        };
        ConceptDepth {
            concept_count,
            complexity,
            integration,
            sophistication: complexity * 0.4 + integration * 0.6,
        }
    }
}

/// Detects expertise across the ten knowledge domains
pub struct DomainExpertiseAnalyzer {
    domains: Vec<CompiledDomain>,
}

impl DomainExpertiseAnalyzer {
    pub fn new() -> Result<Self, AnalysisError> {
        let domains = DOMAIN_SPECS
            .iter()
            .map(CompiledDomain::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { domains })
    }

    pub fn domain_names(&self) -> Vec<&'static str> {
        self.domains.iter().map(|d| d.spec.name).collect()
    }

    /// Domains whose corrected score exceeds [`DOMAIN_REPORT_THRESHOLD`]
    pub fn analyze_text(&self, text: &str) -> BTreeMap<String, DomainExpertise> {
        let normalized = normalize_for_domains(text);
        let sample = TextSample::new(&normalized);
        let length_factor = length_factor(word_count(text));

        let mut detected = BTreeMap::new();
        for domain in &self.domains {
            let breakdown = domain.table.score(&sample);
            let depth = domain.depth(&sample);
            let base = (breakdown.aggregate + depth * DEPTH_WEIGHT).min(1.0);
            let score = (base * length_factor * domain.spec.bias).min(1.0);

            if score <= DOMAIN_REPORT_THRESHOLD {
                continue;
            }

            let pattern_types = ["terminology", "concepts", "methodology"]
                .iter()
                .filter(|c| breakdown.hits_of(c) > 0)
                .count();
            let confidence = (score
                + pattern_types as f64 * 0.1
                + breakdown.score_of("context") * 0.15
                + depth * 0.1)
                .min(1.0);

            detected.insert(
                domain.spec.name.to_string(),
                DomainExpertise {
                    domain: domain.spec.name.to_string(),
                    expertise_score: score,
                    level: domain.level(&sample),
                    confidence,
                    indicators: domain.indicators(&sample),
                    terminology: domain.terminology(&sample),
                    concept_depth: domain.concept_depth(&sample),
                    length_factor,
                },
            );
        }

        debug!(domains = detected.len(), "Detected domain expertise");
        detected
    }
}

impl TextAnalyzer for DomainExpertiseAnalyzer {
    type Output = BTreeMap<String, DomainExpertise>;

    fn name(&self) -> &'static str {
        "domains"
    }

    fn analyze(&self, text: &TextSample<'_>, _agent: &AgentState) -> Self::Output {
        self.analyze_text(text.raw())
    }
}

/// Pad short texts with neutral words and keep the head and tail of long ones
pub fn normalize_for_domains(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < MIN_NORMALIZED_WORDS {
        let mut padded = words;
        padded.resize(MIN_NORMALIZED_WORDS, PADDING_WORD);
        return padded.join(" ");
    }
    if words.len() > MAX_NORMALIZED_WORDS {
        let keep = MAX_NORMALIZED_WORDS / 2;
        let mut kept = words[..keep].to_vec();
        kept.extend_from_slice(&words[words.len() - keep..]);
        return kept.join(" ");
    }
    text.to_string()
}

/// Penalty for outputs outside the 50–200 word range
pub fn length_factor(words: usize) -> f64 {
    if words < OPTIMAL_MIN_WORDS {
        0.5 + (words as f64 / OPTIMAL_MIN_WORDS as f64) * 0.5
    } else if words > OPTIMAL_MAX_WORDS {
        1.0 - ((words - OPTIMAL_MAX_WORDS) as f64 / OPTIMAL_MAX_WORDS as f64 * 0.2).min(0.2)
    } else {
        1.0
    }
}

pub fn are_complementary_domains(a: &str, b: &str) -> bool {
    COMPLEMENTARY_DOMAINS
        .iter()
        .any(|(x, y)| (a == *x && b == *y) || (a == *y && b == *x))
}

/// Transfer potential between every pair of detected domains, keyed `a_to_b`
pub fn cross_domain_transfer(expertise: &BTreeMap<String, DomainExpertise>) -> BTreeMap<String, f64> {
    let mut transfer = BTreeMap::new();
    let domains: Vec<&DomainExpertise> = expertise.values().collect();
    for (i, a) in domains.iter().enumerate() {
        for b in &domains[i + 1..] {
            let base = a.expertise_score * b.expertise_score * 0.7;
            let complementary = if are_complementary_domains(&a.domain, &b.domain) {
                1.3
            } else {
                1.0
            };
            let similarity = 1.0 + (1.0 - (a.expertise_score - b.expertise_score).abs()) * 0.2;
            let confidence = (a.confidence + b.confidence) * 0.15;
            transfer.insert(
                format!("{}_to_{}", a.domain, b.domain),
                (base * complementary * similarity + confidence).min(1.0),
            );
        }
    }
    transfer
}
