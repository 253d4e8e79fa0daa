//! Main application entry point (CLI binary).
//!
//! A thin wrapper around the `car_crawler` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use car_crawler::config::{Cli, Commands, DiscoverArgs, ExportArgs};
use car_crawler::initialization::{init_client, init_logger_with};
use car_crawler::taxonomy::{discover, write_seed_table};
use car_crawler::{export_db_to_csv, run_crawl, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // CAR_CRAWLER_ENRICHMENT_AUTH may live in .env, here or next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();

    let log_level = cli.log_level.clone();
    let log_format = cli.log_format.clone();
    init_logger_with(log_level.clone().into(), log_format.clone())
        .context("Failed to initialize logger")?;

    let outcome = match cli.command {
        Commands::Crawl(args) => match args.into_config(log_level, log_format) {
            Ok(config) => crawl(config).await,
            Err(e) => Err(e.into()),
        },
        Commands::DiscoverModels(args) => discover_models(args).await,
        Commands::Export(args) => export(args).await,
    };

    if let Err(e) = outcome {
        eprintln!("car_crawler error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn crawl(config: Config) -> Result<()> {
    let db_path = config.db_path.clone();
    let csv_output = config.csv_output.clone();

    let report = run_crawl(config).await?;
    println!(
        "✅ Stored {} record{} from {} listing page{} in {:.1}s",
        report.records_accepted,
        if report.records_accepted == 1 { "" } else { "s" },
        report.listing_pages_fetched,
        if report.listing_pages_fetched == 1 { "" } else { "s" },
        report.elapsed_seconds
    );
    if let Some(path) = db_path {
        println!("Records saved in {}", path.display());
    }
    if let Some(path) = csv_output {
        println!("Records saved in {}", path.display());
    }
    Ok(())
}

async fn discover_models(args: DiscoverArgs) -> Result<()> {
    let config = Config {
        base_url: args.base_url.clone(),
        timeout_seconds: args.timeout_seconds,
        user_agent: args.user_agent.clone(),
        ..Default::default()
    };
    let client = init_client(&config).context("Failed to initialize HTTP client")?;

    let rows = discover(client, &args.base_url).await?;
    write_seed_table(&args.output, &rows)?;
    println!(
        "✅ Wrote {} make/model rows to {}",
        rows.len(),
        args.output.display()
    );
    Ok(())
}

async fn export(args: ExportArgs) -> Result<()> {
    let count = export_db_to_csv(&args.db_path, args.output.as_deref()).await?;
    // stdout may carry the CSV itself
    match &args.output {
        Some(path) => println!("✅ Exported {} records to {}", count, path.display()),
        None => log::info!("Exported {} records", count),
    }
    Ok(())
}
