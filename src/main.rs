use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::io;
use std::sync::Arc;
use tracing::info;

use pcpart_tracker::browser::PartBrowser;
use pcpart_tracker::cli::{Cli, Commands};
use pcpart_tracker::models::{PartCategory, SearchScope, lowest_price};
use pcpart_tracker::scraper::HttpFetcher;
use pcpart_tracker::{AppConfig, PartRepository, Updater, logging};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let _log_guard = logging::init_tracing(&config.logging)?;

    info!("Starting pcpart-tracker...");
    let repository = PartRepository::connect(&config.database)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.url))?;

    match cli.command {
        Commands::Update => update(&config, repository).await,
        Commands::Browse => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            PartBrowser::new(&repository)
                .run(&mut stdin.lock(), &mut stdout.lock())
                .await?;
            Ok(())
        }
        Commands::Search {
            category,
            name,
            latest,
            json,
        } => search(&repository, category, name.as_deref(), latest, json).await,
        Commands::History { category, part_id } => history(&repository, category, part_id).await,
        Commands::Stats => stats(&repository).await,
    }
}

async fn update(config: &AppConfig, repository: PartRepository) -> Result<()> {
    let fetcher = Arc::new(HttpFetcher::new(&config.scraper)?);
    let updater = Updater::from_config(config, fetcher, repository)?;

    let report = updater
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    println!("{}", report);
    if report.failed_categories().count() == report.categories.len() {
        bail!("No category could be updated");
    }
    Ok(())
}

async fn search(
    repository: &PartRepository,
    category: PartCategory,
    name: Option<&str>,
    latest: bool,
    json: bool,
) -> Result<()> {
    let scope = if latest {
        SearchScope::LatestOnly
    } else {
        SearchScope::AllObservations
    };
    let records = repository.search(category, name, scope).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if records.is_empty() {
        println!("No matching {}.", category.plural());
    } else {
        for record in &records {
            println!("[{}] {}", record.part_id, record);
        }
    }
    Ok(())
}

async fn history(repository: &PartRepository, category: PartCategory, part_id: i64) -> Result<()> {
    let part = repository
        .part(category, part_id)
        .await?
        .ok_or_else(|| anyhow!("No {} with id {}", category, part_id))?;
    let observations = repository.price_history(category, part_id).await?;

    println!("{} ({})", part.name, part.brand);
    for observation in &observations {
        println!(
            "  {}  {:>10}  {}  {}",
            observation.observed_on,
            observation.price.to_string(),
            observation.website,
            observation.link
        );
    }

    match lowest_price(&observations) {
        Some(lowest) => println!("Lowest listed price: {} on {}", lowest.price, lowest.observed_on),
        None => println!("No listed price recorded"),
    }
    Ok(())
}

async fn stats(repository: &PartRepository) -> Result<()> {
    for summary in repository.summary().await? {
        println!(
            "{:<13} {:>6} part(s)  {:>8} observation(s)",
            summary.category.plural(),
            summary.parts,
            summary.observations
        );
    }
    Ok(())
}
