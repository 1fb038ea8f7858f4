use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use dog_blob::{S3CompatibleStore, S3Config};
use dog_notify::SnsNotifier;
use sales_sync::{run_every, Driver, RunLogger, SyncConfig};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = SyncConfig::from_env().context("loading sales-sync configuration")?;

    let mut s3 = S3Config::from_env().context("loading S3 configuration")?;
    if let Some(endpoint) = &config.s3_endpoint {
        s3 = s3.with_endpoint(endpoint.clone());
    }
    let region = s3.region.clone();

    let store = S3CompatibleStore::connect(s3).await;
    let placement = store.placement();
    let notifier = SnsNotifier::connect(region).await;

    let interval = config.interval;
    let driver = Driver::new(config, Arc::new(store), Arc::new(notifier), placement);

    let Some(period) = interval else {
        let report = driver.run().await?;
        return Ok(if report.succeeded() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    };

    // Each run logs into its own file; this logger covers the loop around them
    let console = RunLogger::console();
    let driver = &driver;
    console
        .scope(async {
            info!(hours = period.as_secs() / 3600, "sales-sync scheduled");
            run_every(period, move || async move {
                match driver.run().await {
                    Ok(report) if report.succeeded() => info!("run completed"),
                    Ok(report) => warn!(stage = ?report.failed_stage, "run failed"),
                    Err(err) => error!("run could not start: {}", err),
                }
            })
            .await;
        })
        .await;

    Ok(ExitCode::SUCCESS)
}
