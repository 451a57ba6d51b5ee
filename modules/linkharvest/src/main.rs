use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use linkharvest::Job;
use linkharvest_common::{load_config, AppConfig, HarvestError};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("linkharvest=info".parse()?)
                .add_directive("linkharvest_common=info".parse()?)
                .add_directive("sheets_client=info".parse()?),
        )
        .init();

    info!("Link harvest starting...");

    // Secrets from env, layout from the TOML file
    let app = AppConfig::from_env()?;
    let file = load_config(&app.config_path).map_err(|e| HarvestError::setup(format!("{e:#}")))?;

    // Open every worksheet up front; a missing one aborts before any search
    let job = Job::from_config(&app, &file).await?;

    let report = job.run().await;
    info!("{report}");

    report.ensure_success()
}
