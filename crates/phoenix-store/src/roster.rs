//! Population roster
//!
//! A store keeps every agent it was ever handed, across generations. The
//! roster records which of them formed the most recent population so a later
//! run can resume from it.

use std::io::ErrorKind;
use std::path::Path;

use phoenix_common::{AgentState, PersistenceError};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use crate::store::AgentStore;

/// File name of the roster inside a data directory. Not a `.json` file, so
/// it never shows up as an agent in a JSON store.
pub const ROSTER_FILE: &str = "population.roster";

/// Ids of the latest population, in population order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationRoster {
    pub generation: u32,
    pub agents: Vec<String>,
}

impl PopulationRoster {
    pub fn of(generation: u32, population: &[AgentState]) -> Self {
        Self {
            generation,
            agents: population.iter().map(|a| a.id.clone()).collect(),
        }
    }

    /// Read a roster, `None` when the file does not exist
    pub async fn read(path: &Path) -> Result<Option<Self>, PersistenceError> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Write through a temporary file and rename
    pub async fn write(&self, path: &Path) -> Result<(), PersistenceError> {
        let bytes = serde_json::to_vec_pretty(self)?;
        let temp = path.with_extension("roster.tmp");
        fs::write(&temp, &bytes).await?;
        if let Err(e) = fs::rename(&temp, path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }
        debug!(generation = self.generation, agents = self.agents.len(), "Wrote roster");
        Ok(())
    }

    /// Load the listed agents in roster order, skipping ids the store no
    /// longer has
    pub async fn load(&self, store: &dyn AgentStore) -> Result<Vec<AgentState>, PersistenceError> {
        let mut agents = Vec::with_capacity(self.agents.len());
        for id in &self.agents {
            match store.load(id).await? {
                Some(agent) => agents.push(agent),
                None => warn!(agent = %id, "Roster agent missing from store"),
            }
        }
        Ok(agents)
    }
}
