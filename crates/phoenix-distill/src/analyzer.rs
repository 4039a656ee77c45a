//! Common seam for analyzers that read agent output

use phoenix_common::AgentState;
use tracing::trace;

use crate::text::TextSample;

/// An analyzer turning one agent output into a typed result
///
/// Implementations are configuration over [`crate::scoring::PatternTable`]
/// and never fail once constructed; pattern compilation errors surface from
/// their constructors.
pub trait TextAnalyzer: Send + Sync {
    type Output;

    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    fn analyze(&self, text: &TextSample<'_>, agent: &AgentState) -> Self::Output;
}

/// Run `analyzer` over one output
pub fn run_analyzer<A: TextAnalyzer + ?Sized>(
    analyzer: &A,
    text: &TextSample<'_>,
    agent: &AgentState,
) -> A::Output {
    trace!(analyzer = analyzer.name(), agent = %agent.id, "Analyzing output");
    analyzer.analyze(text, agent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainExpertiseAnalyzer;
    use crate::specialization::SpecializationAnalyzer;
    use crate::traits::TraitExtractor;
    use phoenix_common::{NamingStyle, SpiritType};

    const OUTPUT: &str = "We analyze the data systematically because the evidence shows a clear \
        pattern. The software architecture uses an API and a database, and we deploy with \
        continuous integration. Let me lead the team step by step toward a creative solution.";

    #[test]
    fn test_dispatch_matches_inherent_methods() {
        let agent = AgentState::builder("agent_000", SpiritType::Fox, NamingStyle::Foundation)
            .build()
            .unwrap();
        let text = TextSample::new(OUTPUT);

        let traits = TraitExtractor::new().unwrap();
        assert_eq!(traits.name(), "traits");
        assert_eq!(run_analyzer(&traits, &text, &agent), traits.extract(&text, &agent.id));

        let domains = DomainExpertiseAnalyzer::new().unwrap();
        let by_trait = run_analyzer(&domains, &text, &agent);
        assert_eq!(
            by_trait.keys().collect::<Vec<_>>(),
            domains.analyze_text(OUTPUT).keys().collect::<Vec<_>>()
        );

        let specialization = SpecializationAnalyzer::new().unwrap();
        let analysis = run_analyzer(&specialization, &text, &agent).unwrap();
        let direct = specialization.analyze_text(&text, SpiritType::Fox).unwrap();
        assert_eq!(analysis.overall_accuracy, direct.overall_accuracy);
    }
}
