//! JSON file agent store
//!
//! One `{id}.json` per agent under a root directory. Writes go to a
//! temporary file that is then renamed over the target, and the in-memory
//! cache only sees an agent once its file is in place.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use phoenix_common::{AgentState, PersistenceError};
use tokio::fs;
use tracing::{debug, info};

use crate::store::{validate_id, AgentStore};

const EXTENSION: &str = "json";
const TEMP_SUFFIX: &str = ".tmp";

pub struct JsonFileStore {
    root: PathBuf,
    cache: DashMap<String, AgentState>,
}

impl JsonFileStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        info!(root = %root.display(), "Opened JSON agent store");
        Ok(Self {
            root,
            cache: DashMap::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.{EXTENSION}"))
    }

    fn temp_path_of(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.{EXTENSION}{TEMP_SUFFIX}"))
    }
}

fn serialization(e: serde_json::Error) -> PersistenceError {
    PersistenceError::Serialization(e.to_string())
}

#[async_trait]
impl AgentStore for JsonFileStore {
    async fn save(&self, agent: &AgentState) -> Result<(), PersistenceError> {
        validate_id(&agent.id)?;
        let bytes = serde_json::to_vec_pretty(agent).map_err(serialization)?;

        let temp = self.temp_path_of(&agent.id);
        fs::write(&temp, &bytes).await?;
        if let Err(e) = fs::rename(&temp, self.path_of(&agent.id)).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        self.cache.insert(agent.id.clone(), agent.clone());
        debug!(agent = %agent.id, bytes = bytes.len(), "Saved agent");
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<AgentState>, PersistenceError> {
        validate_id(id)?;
        if let Some(agent) = self.cache.get(id) {
            return Ok(Some(agent.clone()));
        }

        let bytes = match fs::read(self.path_of(id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let agent: AgentState = serde_json::from_slice(&bytes).map_err(serialization)?;
        self.cache.insert(id.to_string(), agent.clone());
        Ok(Some(agent))
    }

    async fn list(&self) -> Result<Vec<String>, PersistenceError> {
        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    async fn delete(&self, id: &str) -> Result<(), PersistenceError> {
        validate_id(id)?;
        match fs::remove_file(self.path_of(id)).await {
            Ok(()) => {
                self.cache.remove(id);
                debug!(agent = %id, "Deleted agent");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.cache.remove(id);
                Err(PersistenceError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phoenix_common::{
        KnowledgeBase, MetricScores, NamingStyle, PerformanceMetrics, SpiritType,
        StatisticalSignificance, TraitGroup,
    };
    use proptest::prelude::*;

    fn rich_agent(id: &str) -> AgentState {
        let mut kb = KnowledgeBase::new();
        kb.set_proficiency("software_engineering", "expertise", 0.62).unwrap();
        kb.add_specialization("analysis");
        kb.set_distilled_trait("analytical_thinking", 0.1 + 0.2).unwrap();

        let metrics = PerformanceMetrics::new(
            MetricScores {
                accuracy: 0.7,
                efficiency: 0.45,
                fitness: 0.5833333333333334,
                ..MetricScores::default()
            },
            StatisticalSignificance {
                p_value: 0.0123,
                confidence_interval: (0.41, 0.77),
                effect_size: 0.64,
                power: 0.83,
                sample_size: 7,
            },
        );

        AgentState::builder(id, SpiritType::Dragon, NamingStyle::Mythological)
            .name("Dragon-Mythological-G2-01")
            .generation(2)
            .parents(vec!["agent_001".to_string(), "agent_004".to_string()])
            .trait_value(TraitGroup::Personality, "patience", 1.0 / 3.0)
            .trait_value(TraitGroup::Ability, "strategist", 0.9)
            .knowledge_base(kb)
            .performance_history(vec![metrics])
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let agent = rich_agent("agent_g002_001");
        {
            let store = JsonFileStore::open(dir.path()).await.unwrap();
            store.save(&agent).await.unwrap();
        }

        // A fresh store has an empty cache and must read the file
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        let loaded = store.load("agent_g002_001").await.unwrap().unwrap();
        assert_eq!(loaded, agent);
        assert_eq!(loaded.performance_history()[0].significance().sample_size, 7);
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        store.save(&rich_agent("a")).await.unwrap();
        store.save(&rich_agent("b")).await.unwrap();

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.json", "b.json"]);
        assert_eq!(store.list().await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_missing_and_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        assert!(store.load("nobody").await.unwrap().is_none());

        store.save(&rich_agent("a")).await.unwrap();
        store.delete("a").await.unwrap();
        assert!(store.load("a").await.unwrap().is_none());
        assert!(matches!(store.delete("a").await, Err(PersistenceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), b"{ not json").unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        assert!(matches!(
            store.load("broken").await,
            Err(PersistenceError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_out_of_range_record_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut record = serde_json::to_value(rich_agent("tampered")).unwrap();
        record["personality_traits"]["patience"] = serde_json::json!(1.7);
        std::fs::write(
            dir.path().join("tampered.json"),
            serde_json::to_vec(&record).unwrap(),
        )
        .unwrap();

        let store = JsonFileStore::open(dir.path()).await.unwrap();
        assert!(matches!(
            store.load("tampered").await,
            Err(PersistenceError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_id_never_touches_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        assert!(matches!(
            store.load("../outside").await,
            Err(PersistenceError::InvalidId(_))
        ));
        assert!(store.list().await.unwrap().is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn test_trait_values_survive_disk(values in prop::collection::vec(0.0f64..=1.0, 1..8)) {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            let dir = tempfile::tempdir().unwrap();
            let mut agent = rich_agent("agent_p");
            for (i, v) in values.iter().enumerate() {
                agent.set_trait(TraitGroup::Physical, format!("t{i}"), *v);
            }

            let loaded = runtime.block_on(async {
                let store = JsonFileStore::open(dir.path()).await.unwrap();
                store.save(&agent).await.unwrap();
                JsonFileStore::open(dir.path()).await.unwrap().load("agent_p").await.unwrap()
            });
            prop_assert_eq!(loaded, Some(agent));
        }
    }
}
