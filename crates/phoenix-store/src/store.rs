//! Agent store boundary

use async_trait::async_trait;
use phoenix_common::{AgentState, PersistenceError};
use tracing::debug;

/// Trait for agent state storage backends
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AgentStore: Send + Sync {
    /// Insert or replace an agent
    async fn save(&self, agent: &AgentState) -> Result<(), PersistenceError>;

    /// Load an agent by id
    async fn load(&self, id: &str) -> Result<Option<AgentState>, PersistenceError>;

    /// Ids of every stored agent, sorted
    async fn list(&self) -> Result<Vec<String>, PersistenceError>;

    /// Delete an agent
    async fn delete(&self, id: &str) -> Result<(), PersistenceError>;
}

/// Ids double as file names: non-empty, ASCII alphanumerics, `_`, `-` and
/// `.`, not starting with a dot
pub fn validate_id(id: &str) -> Result<(), PersistenceError> {
    let valid = !id.is_empty()
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(PersistenceError::InvalidId(id.to_string()))
    }
}

/// Save every agent, stopping at the first failure. Returns the number saved.
pub async fn save_population(
    store: &dyn AgentStore,
    agents: &[AgentState],
) -> Result<usize, PersistenceError> {
    for agent in agents {
        store.save(agent).await?;
    }
    debug!(agents = agents.len(), "Saved population");
    Ok(agents.len())
}

/// Load every stored agent in id order
pub async fn load_all(store: &dyn AgentStore) -> Result<Vec<AgentState>, PersistenceError> {
    let mut agents = Vec::new();
    for id in store.list().await? {
        if let Some(agent) = store.load(&id).await? {
            agents.push(agent);
        }
    }
    Ok(agents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use phoenix_common::{NamingStyle, SpiritType};

    fn agent(id: &str) -> AgentState {
        AgentState::builder(id, SpiritType::Otter, NamingStyle::Hybrid)
            .build()
            .unwrap()
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("agent_g001_003").is_ok());
        assert!(validate_id("agent-7.v2").is_ok());
        for bad in ["", ".hidden", "../etc", "a/b", "a b"] {
            assert!(matches!(validate_id(bad), Err(PersistenceError::InvalidId(_))), "{bad}");
        }
    }

    #[tokio::test]
    async fn test_save_population_stops_on_error() {
        let mut store = MockAgentStore::new();
        store
            .expect_save()
            .times(2)
            .returning(|a| {
                if a.id == "b" {
                    Err(PersistenceError::InvalidId(a.id.clone()))
                } else {
                    Ok(())
                }
            });

        let agents = vec![agent("a"), agent("b"), agent("c")];
        let result = save_population(&store, &agents).await;
        assert!(matches!(result, Err(PersistenceError::InvalidId(id)) if id == "b"));
    }

    #[tokio::test]
    async fn test_load_all_skips_vanished_agents() {
        let mut store = MockAgentStore::new();
        store
            .expect_list()
            .returning(|| Ok(vec!["a".to_string(), "gone".to_string()]));
        store.expect_load().returning(|id| {
            Ok((id == "a").then(|| agent("a")))
        });

        let agents = load_all(&store).await.unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].id, "a");
    }
}
