use anyhow::{Context, Result, bail};
use chrono::Utc;
use dotenv::dotenv;
use tracing::info;

use buergerbuero_backend::calendar::exporter;
use buergerbuero_backend::calendar::synthesizer::Synthesizer;
use buergerbuero_backend::collecting::aggregator::collect_all;
use buergerbuero_backend::collecting::client::{BackendClient, DateWindow};
use buergerbuero_backend::config::AppConfig;
use buergerbuero_backend::models::catalog::Catalog;
use buergerbuero_backend::models::dataset::Dataset;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv().ok();

    let config = AppConfig::from_env()?;
    let catalog = Catalog::standard();

    let mode = std::env::args().nth(1).unwrap_or_else(|| "all".to_string());
    match mode.as_str() {
        "collect" => collect(&config, catalog).await?,
        "generate" => generate(&config, catalog)?,
        "export-catalog" => export_catalog(&config, catalog)?,
        "all" => {
            collect(&config, catalog).await?;
            generate(&config, catalog)?;
        }
        other => bail!("unknown mode '{other}', expected collect|generate|export-catalog|all"),
    }

    Ok(())
}

/// Gathers the full availability dataset and persists it in one pass.
async fn collect(config: &AppConfig, catalog: &Catalog) -> Result<()> {
    let client = BackendClient::new(&config.base_url)?;
    let window = DateWindow::from_today(config.window_weeks);
    info!("collecting window {} to {}", window.start, window.end);

    let dataset = collect_all(
        &client,
        catalog,
        &window,
        config.retry,
        config.failure_policy,
    )
    .await?;
    dataset.save(&config.dataset_path)?;
    info!("dataset written to {}", config.dataset_path.display());
    Ok(())
}

/// Turns the persisted dataset into one .ics file per service.
fn generate(config: &AppConfig, catalog: &Catalog) -> Result<()> {
    let dataset = Dataset::load(&config.dataset_path)?;
    let synthesizer = Synthesizer::new(config.timezone, config.slot_minutes, Utc::now());

    for (service_name, offices) in dataset.iter() {
        let service = catalog
            .service(service_name)
            .with_context(|| format!("unknown service '{service_name}' in dataset"))?;
        let calendar = synthesizer.synthesize(service, offices, catalog)?;
        let path = exporter::export(&config.output_dir, service.name, &calendar)?;
        info!("calendar for {service_name} written to {}", path.display());
    }
    Ok(())
}

/// Dumps the reference tables to JSON for the static results viewer.
fn export_catalog(config: &AppConfig, catalog: &Catalog) -> Result<()> {
    let json = serde_json::to_string_pretty(&catalog.to_json())?;
    std::fs::write(&config.catalog_path, json)
        .with_context(|| format!("writing catalog {}", config.catalog_path.display()))?;
    info!("catalog written to {}", config.catalog_path.display());
    Ok(())
}
