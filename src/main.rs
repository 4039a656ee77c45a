//! PHOENIX runner binary

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use phoenix::RunnerConfig;
use phoenix_common::VERSION;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting PHOENIX v{}", VERSION);

    let config = RunnerConfig::load()?;
    info!(
        population_size = config.evolution.population_size,
        max_generations = config.evolution.max_generations,
        seed = config.evolution.seed,
        "Loaded configuration"
    );

    let outcome = phoenix::run(config).await?;
    println!("{}", serde_json::to_string_pretty(&outcome.summary)?);
    for recommendation in &outcome.report.assessment.recommendations {
        info!(%recommendation, "Recommendation");
    }
    Ok(())
}
