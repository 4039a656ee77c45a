//! Runner configuration
//!
//! Layers, lowest priority first: built-in defaults, an optional
//! `phoenix.toml` (or the file named by `PHOENIX_CONFIG`), then `PHOENIX_*`
//! environment variables. A `.env` file is read into the environment first.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use phoenix_common::PhoenixConfig;
use serde::{Deserialize, Serialize};

/// Config file looked up in the working directory when `PHOENIX_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "phoenix.toml";

/// Runner configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Parameters handed to the evolution engine
    pub evolution: PhoenixConfig,
    /// Directory of the JSON agent store; in-memory when unset
    pub data_dir: Option<PathBuf>,
    /// Directory receiving per-generation and final reports
    pub report_dir: Option<PathBuf>,
}

impl RunnerConfig {
    /// Load configuration from `.env`, the config file and the environment
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let file = std::env::var("PHOENIX_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::from_sources(Some(&file), |key| std::env::var(key).ok())
    }

    /// Build from an optional file and an environment lookup
    pub fn from_sources<F>(file: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match file {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => Self::default(),
        };
        cfg.apply_env(env)?;
        cfg.evolution
            .validate()
            .context("invalid evolution configuration")?;
        Ok(cfg)
    }

    fn from_file(path: &Path) -> Result<Self> {
        config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .with_context(|| format!("failed to read {}", path.display()))
    }

    fn apply_env<F>(&mut self, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let evo = &mut self.evolution;
        override_from(&env, "PHOENIX_POPULATION_SIZE", &mut evo.population_size)?;
        override_from(&env, "PHOENIX_MAX_GENERATIONS", &mut evo.max_generations)?;
        override_from(&env, "PHOENIX_SELECTION_PRESSURE", &mut evo.selection_pressure)?;
        override_from(&env, "PHOENIX_MUTATION_RATE", &mut evo.mutation_rate)?;
        override_from(&env, "PHOENIX_CROSSOVER_RATE", &mut evo.crossover_rate)?;
        override_from(&env, "PHOENIX_ELITE_RATE", &mut evo.elite_rate)?;
        override_from(&env, "PHOENIX_CONVERGENCE_THRESHOLD", &mut evo.convergence_threshold)?;
        override_from(&env, "PHOENIX_SIGNIFICANCE_THRESHOLD", &mut evo.significance_threshold)?;
        override_from(&env, "PHOENIX_SELECTION_METHOD", &mut evo.selection_method)?;
        override_from(&env, "PHOENIX_TOURNAMENT_SIZE", &mut evo.tournament_size)?;
        override_from(&env, "PHOENIX_FITNESS_SOURCE", &mut evo.fitness_source)?;
        override_from(&env, "PHOENIX_DIVERSITY_THRESHOLD", &mut evo.diversity_threshold)?;
        override_from(&env, "PHOENIX_SEED", &mut evo.seed)?;
        override_from(
            &env,
            "PHOENIX_ENABLE_KNOWLEDGE_DISTILLATION",
            &mut evo.enable_knowledge_distillation,
        )?;

        if let Some(dir) = env("PHOENIX_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = env("PHOENIX_REPORT_DIR") {
            self.report_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }
}

fn override_from<F, T>(env: &F, key: &str, target: &mut T) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = env(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{key}={raw}: {e}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use phoenix_common::{FitnessSource, SelectionMethod};
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_sources() {
        let cfg = RunnerConfig::from_sources(None, env(&[])).unwrap();
        assert_eq!(cfg, RunnerConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let cfg = RunnerConfig::from_sources(
            None,
            env(&[
                ("PHOENIX_POPULATION_SIZE", "12"),
                ("PHOENIX_MUTATION_RATE", "0.25"),
                ("PHOENIX_SELECTION_METHOD", "rank"),
                ("PHOENIX_FITNESS_SOURCE", "trait_average"),
                ("PHOENIX_SEED", "7"),
                ("PHOENIX_DATA_DIR", "/tmp/phoenix-agents"),
            ]),
        )
        .unwrap();

        assert_eq!(cfg.evolution.population_size, 12);
        assert_eq!(cfg.evolution.mutation_rate, 0.25);
        assert_eq!(cfg.evolution.selection_method, SelectionMethod::Rank);
        assert_eq!(cfg.evolution.fitness_source, FitnessSource::TraitAverage);
        assert_eq!(cfg.evolution.seed, 7);
        assert_eq!(cfg.data_dir, Some(PathBuf::from("/tmp/phoenix-agents")));
    }

    #[test]
    fn test_unparsable_value_is_an_error() {
        let err = RunnerConfig::from_sources(None, env(&[("PHOENIX_MAX_GENERATIONS", "many")]))
            .unwrap_err();
        assert!(err.to_string().contains("PHOENIX_MAX_GENERATIONS"));
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let result = RunnerConfig::from_sources(None, env(&[("PHOENIX_ELITE_RATE", "1.5")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phoenix.toml");
        std::fs::write(
            &path,
            "report_dir = \"reports\"\n\n[evolution]\npopulation_size = 30\nmax_generations = 4\n",
        )
        .unwrap();

        let cfg = RunnerConfig::from_sources(Some(&path), env(&[("PHOENIX_MAX_GENERATIONS", "6")]))
            .unwrap();
        assert_eq!(cfg.evolution.population_size, 30);
        assert_eq!(cfg.evolution.max_generations, 6);
        assert_eq!(cfg.evolution.mutation_rate, 0.1);
        assert_eq!(cfg.report_dir, Some(PathBuf::from("reports")));
    }
}
