//! In-memory agent store

use async_trait::async_trait;
use dashmap::DashMap;
use phoenix_common::{AgentState, PersistenceError};

use crate::store::{validate_id, AgentStore};

/// In-memory storage implementation
///
/// Uses DashMap for concurrent access. Nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemoryAgentStore {
    agents: DashMap<String, AgentState>,
}

impl InMemoryAgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[async_trait]
impl AgentStore for InMemoryAgentStore {
    async fn save(&self, agent: &AgentState) -> Result<(), PersistenceError> {
        validate_id(&agent.id)?;
        self.agents.insert(agent.id.clone(), agent.clone());
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<AgentState>, PersistenceError> {
        Ok(self.agents.get(id).map(|a| a.clone()))
    }

    async fn list(&self) -> Result<Vec<String>, PersistenceError> {
        let mut ids: Vec<String> = self.agents.iter().map(|a| a.key().clone()).collect();
        ids.sort();
        Ok(ids)
    }

    async fn delete(&self, id: &str) -> Result<(), PersistenceError> {
        self.agents
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))
    }
}
