//! Hooks the runner registers on the evolution engine

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use phoenix_common::{AgentState, HookError, PhoenixConfig, PhoenixEvolutionState};
use phoenix_darwinian::{EvolutionHook, GenerationReport};
use phoenix_store::{save_population, AgentStore, PopulationRoster};
use tracing::info;

/// Logs one line per completed generation
pub struct LoggingHook;

#[async_trait]
impl EvolutionHook for LoggingHook {
    fn name(&self) -> &str {
        "logging"
    }

    async fn on_population_initialized(&self, population: &[AgentState]) -> Result<(), HookError> {
        info!(agents = population.len(), "Population ready");
        Ok(())
    }

    async fn on_generation_completed(
        &self,
        generation: u32,
        state: &PhoenixEvolutionState,
    ) -> Result<(), HookError> {
        if let Some(stats) = &state.statistics {
            info!(
                generation,
                avg_fitness = stats.average_fitness,
                best_fitness = stats.best_fitness,
                diversity = stats.population_diversity,
                pool = state.genetic_material_pool.len(),
                converged = state.convergence.converged,
                "Generation completed"
            );
        }
        Ok(())
    }
}

/// Writes `generation_{gen:03}.json` reports into a directory
pub struct ReportWriterHook {
    dir: PathBuf,
    config: PhoenixConfig,
}

impl ReportWriterHook {
    pub fn new(dir: impl Into<PathBuf>, config: PhoenixConfig) -> Self {
        Self {
            dir: dir.into(),
            config,
        }
    }

    pub fn report_path(&self, generation: u32) -> PathBuf {
        self.dir.join(format!("generation_{generation:03}.json"))
    }
}

#[async_trait]
impl EvolutionHook for ReportWriterHook {
    fn name(&self) -> &str {
        "report-writer"
    }

    async fn on_generation_completed(
        &self,
        generation: u32,
        state: &PhoenixEvolutionState,
    ) -> Result<(), HookError> {
        let Some(report) = GenerationReport::from_state(state, &self.config) else {
            return Ok(());
        };
        let json = serde_json::to_vec_pretty(&report)
            .map_err(|e| HookError::new(self.name(), e.to_string()))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| HookError::new(self.name(), e.to_string()))?;
        tokio::fs::write(self.report_path(generation), json)
            .await
            .map_err(|e| HookError::new(self.name(), e.to_string()))
    }
}

/// Saves the population to an agent store after initialization and after
/// every generation, optionally recording a [`PopulationRoster`]
pub struct PersistenceHook {
    store: Arc<dyn AgentStore>,
    roster: Option<PathBuf>,
}

impl PersistenceHook {
    pub fn new(store: Arc<dyn AgentStore>) -> Self {
        Self { store, roster: None }
    }

    /// Also write the roster of each saved population to `path`
    pub fn with_roster(mut self, path: impl Into<PathBuf>) -> Self {
        self.roster = Some(path.into());
        self
    }

    async fn persist(&self, generation: u32, population: &[AgentState]) -> Result<(), HookError> {
        save_population(self.store.as_ref(), population)
            .await
            .map_err(|e| HookError::new(self.name(), e.to_string()))?;
        if let Some(path) = &self.roster {
            PopulationRoster::of(generation, population)
                .write(path)
                .await
                .map_err(|e| HookError::new(self.name(), e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl EvolutionHook for PersistenceHook {
    fn name(&self) -> &str {
        "persistence"
    }

    async fn on_population_initialized(&self, population: &[AgentState]) -> Result<(), HookError> {
        self.persist(0, population).await
    }

    async fn on_generation_completed(
        &self,
        generation: u32,
        state: &PhoenixEvolutionState,
    ) -> Result<(), HookError> {
        self.persist(generation, &state.population).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phoenix_darwinian::synthesize_population;
    use phoenix_store::InMemoryAgentStore;

    #[tokio::test]
    async fn test_persistence_hook_saves_population() {
        let store = Arc::new(InMemoryAgentStore::new());
        let hook = PersistenceHook::new(store.clone());
        let population = synthesize_population(4).unwrap();

        hook.on_population_initialized(&population).await.unwrap();
        assert_eq!(store.len(), 4);
    }

    #[tokio::test]
    async fn test_persistence_hook_writes_latest_roster() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(phoenix_store::ROSTER_FILE);
        let store = Arc::new(InMemoryAgentStore::new());
        let hook = PersistenceHook::new(store.clone()).with_roster(&path);

        hook.on_population_initialized(&synthesize_population(3).unwrap())
            .await
            .unwrap();
        let mut state = PhoenixEvolutionState::new(synthesize_population(5).unwrap()[2..].to_vec());
        state.current_generation = 1;
        hook.on_generation_completed(1, &state).await.unwrap();

        let roster = PopulationRoster::read(&path).await.unwrap().unwrap();
        assert_eq!(roster.generation, 1);
        assert_eq!(roster.agents, ["agent_002", "agent_003", "agent_004"]);
        assert_eq!(store.len(), 5);
    }

    #[tokio::test]
    async fn test_report_writer_skips_before_first_generation() {
        let dir = tempfile::tempdir().unwrap();
        let hook = ReportWriterHook::new(dir.path(), PhoenixConfig::default());
        let state = PhoenixEvolutionState::new(Vec::new());

        hook.on_generation_completed(0, &state).await.unwrap();
        assert!(!hook.report_path(0).exists());
    }
}
