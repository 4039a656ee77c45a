//! # PHOENIX
//!
//! Runner for the PHOENIX evolutionary knowledge-distillation engine.
//!
//! ```text
//! RunnerConfig ──► PhoenixEngine ──► run_evolution ──► StatisticalValidator
//!                      │  hooks: logging, reports, persistence
//!                      ▼
//!                  AgentStore (JSON files or memory)
//! ```

pub mod config;
pub mod hooks;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use phoenix_common::{AgentState, PhoenixEvolutionState};
use phoenix_darwinian::{EvolutionSummary, PhoenixEngine, SimulatedOutputGenerator};
use phoenix_stats::{StatisticalReport, StatisticalValidator};
use phoenix_store::{
    load_all, AgentStore, InMemoryAgentStore, JsonFileStore, PopulationRoster, ROSTER_FILE,
};
use tracing::info;

pub use config::RunnerConfig;
pub use hooks::{LoggingHook, PersistenceHook, ReportWriterHook};

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub state: PhoenixEvolutionState,
    pub summary: EvolutionSummary,
    pub report: StatisticalReport,
}

async fn open_store(config: &RunnerConfig) -> Result<Arc<dyn AgentStore>> {
    Ok(match &config.data_dir {
        Some(dir) => Arc::new(
            JsonFileStore::open(dir)
                .await
                .with_context(|| format!("failed to open agent store at {}", dir.display()))?,
        ),
        None => Arc::new(InMemoryAgentStore::new()),
    })
}

/// Seeds for a new run: the roster's population when one was recorded,
/// otherwise every stored agent
pub async fn load_seeds(store: &dyn AgentStore, roster: Option<&Path>) -> Result<Vec<AgentState>> {
    if let Some(path) = roster {
        if let Some(roster) = PopulationRoster::read(path).await? {
            info!(generation = roster.generation, "Resuming from population roster");
            return Ok(roster.load(store).await?);
        }
    }
    Ok(load_all(store).await?)
}

/// Run a full evolution with the simulated output generator
///
/// The latest population recorded in the data directory seeds the initial
/// population.
pub async fn run(config: RunnerConfig) -> Result<RunOutcome> {
    let store = open_store(&config).await?;
    let roster = config.data_dir.as_ref().map(|dir| dir.join(ROSTER_FILE));
    let seeds = load_seeds(store.as_ref(), roster.as_deref()).await?;
    info!(seeds = seeds.len(), "Loaded seed agents");

    let engine = PhoenixEngine::new(
        config.evolution.clone(),
        Arc::new(SimulatedOutputGenerator::new()),
    )?;
    engine.register_hook(Arc::new(LoggingHook));
    let persistence = PersistenceHook::new(store);
    engine.register_hook(Arc::new(match roster {
        Some(path) => persistence.with_roster(path),
        None => persistence,
    }));
    if let Some(dir) = &config.report_dir {
        engine.register_hook(Arc::new(ReportWriterHook::new(dir, config.evolution.clone())));
    }

    let seeds = (!seeds.is_empty()).then_some(seeds);
    let state = engine.initialize_population(seeds).await?;
    let state = engine.run_evolution(state).await?;

    let validator = StatisticalValidator::from_config(&config.evolution)?;
    let report = validator.report(&state.history)?;
    let summary = engine.summary(&state);

    if let Some(dir) = &config.report_dir {
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(dir.join("summary.json"), serde_json::to_vec_pretty(&summary)?).await?;
        tokio::fs::write(
            dir.join("statistical_report.json"),
            serde_json::to_vec_pretty(&report)?,
        )
        .await?;
    }

    info!(
        generations = summary.total_generations,
        best_fitness = summary.best_fitness,
        assessment = ?report.assessment.status,
        "Run complete"
    );
    Ok(RunOutcome {
        state,
        summary,
        report,
    })
}
