//! Harvest CLI
//!
//! Runs one country's search harvest: builds queries for the given cities,
//! collects and deduplicates results, and writes them to per-city JSON files.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use domain_harvest::{
    redact_url, Aggregator, CountryCatalog, DuplicateFilter, FileSeenStore, HttpTransport,
    JsonFileSink, QueryBuilder, QueryPlan, ResultSink, RunReport, SearchClient, SeenDomainStore,
    TransportExt,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "harvest")]
#[command(about = "Paginated, deduplicated search harvesting per country and city")]
#[command(version)]
struct Cli {
    /// Country settings file (overrides HARVEST_COUNTRIES)
    #[arg(long, global = true)]
    countries: Option<PathBuf>,

    /// Directory holding seen-domain state (overrides HARVEST_STATE_DIR)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search, deduplicate and write results for a country's cities
    Run {
        /// Country as named in the settings file
        #[arg(short, long)]
        country: String,

        /// Cities to search
        #[arg(required = true)]
        cities: Vec<String>,

        /// Label recorded on every result (overrides HARVEST_SEARCHER)
        #[arg(short, long)]
        searcher: Option<String>,

        /// Output directory for result files (overrides HARVEST_RESULTS_DIR)
        #[arg(long)]
        results_dir: Option<PathBuf>,

        /// Cities searched concurrently
        #[arg(long)]
        concurrency: Option<usize>,

        /// Also write the run report as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Print the query URLs a run would issue (API key redacted)
    Plan {
        #[arg(short, long)]
        country: String,

        #[arg(required = true)]
        cities: Vec<String>,
    },

    /// Show how many domains a country has already collected
    Seen {
        #[arg(short, long)]
        country: String,
    },
}

fn main() -> ExitCode {
    // Load environment variables
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,domain_harvest=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            return ExitCode::from(1);
        }
    };

    match runtime.block_on(run()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".bright_red().bold(), e);
            ExitCode::from(1)
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    if let Some(path) = cli.countries {
        config.harvest.countries_path = path;
    }
    if let Some(dir) = cli.state_dir {
        config.harvest.state_dir = dir;
    }

    match cli.command {
        Commands::Run {
            country,
            cities,
            searcher,
            results_dir,
            concurrency,
            report,
        } => {
            if let Some(searcher) = searcher {
                config.searcher = searcher;
            }
            if let Some(dir) = results_dir {
                config.harvest.results_dir = dir;
            }
            if let Some(concurrency) = concurrency {
                config.harvest.city_concurrency = concurrency;
            }
            cmd_run(&config, &country, &cities, report).await
        }
        Commands::Plan { country, cities } => {
            cmd_plan(&config, &country, &cities)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Seen { country } => {
            cmd_seen(&config, &country).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_plan(config: &Config, country: &str, cities: &[String]) -> Result<QueryPlan> {
    let catalog = CountryCatalog::from_path(&config.harvest.countries_path)?;
    let settings = catalog.settings(country)?.clone();

    let plan = QueryBuilder::new(settings, config.require_api_key()?)
        .with_endpoint(config.harvest.endpoint.clone())
        .with_page_size(config.harvest.page_size)
        .build_queries(cities)?;
    Ok(plan)
}

async fn cmd_run(
    config: &Config,
    country: &str,
    cities: &[String],
    report_path: Option<PathBuf>,
) -> Result<ExitCode> {
    config.harvest.validate()?;
    let plan = build_plan(config, country, cities)?;
    tracing::info!(
        country,
        cities = plan.len(),
        searcher = %config.searcher,
        "Starting harvest"
    );

    let store: Arc<dyn SeenDomainStore> = Arc::new(FileSeenStore::new(&config.harvest.state_dir));
    let filter = DuplicateFilter::load(store, country)
        .await
        .context("Cannot load seen domains; refusing to run without dedup state")?;

    let transport = HttpTransport::new(config.harvest.request_timeout())?
        .rate_limited(config.harvest.requests_per_second);
    let client = SearchClient::new(transport, config.searcher.clone()).with_config(&config.harvest);
    let aggregator = Aggregator::new(client, Arc::new(filter))
        .with_city_concurrency(config.harvest.city_concurrency);

    let report = aggregator.run(&plan).await;

    let sink = JsonFileSink::new(&config.harvest.results_dir);
    let sink_result = sink.write(country, &report.bundle).await;

    if let Some(path) = report_path {
        let json = serde_json::to_vec_pretty(&report)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    print_summary(&report);

    match sink_result {
        Ok(written) => {
            println!(
                "{} {} written, {} already recorded, in {}",
                "✓".bright_green(),
                written.written,
                written.skipped,
                sink.root().display()
            );
        }
        Err(e) => {
            eprintln!("{} failed to write results: {}", "✗".bright_red(), e);
            return Ok(ExitCode::from(1));
        }
    }

    if report.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(2))
    }
}

fn print_summary(report: &RunReport) {
    println!();
    println!("{}", format!("Harvest: {}", report.country).bright_cyan().bold());
    for city in &report.bundle.cities {
        println!("  {:<24} {:>5} new domains", city.city_name, city.len());
    }
    println!(
        "  {} pages, {} raw results, {} kept",
        report.stats.pages, report.stats.raw_items, report.stats.kept
    );

    for failure in &report.failures {
        println!(
            "{} {} {}: {}",
            "!".bright_yellow(),
            failure.city,
            failure.query_url,
            failure.error
        );
    }
    if let Some(warning) = &report.flush_warning {
        println!(
            "{} seen domains not saved, the next run may repeat results: {}",
            "!".bright_yellow(),
            warning
        );
    }
}

fn cmd_plan(config: &Config, country: &str, cities: &[String]) -> Result<()> {
    let plan = build_plan(config, country, cities)?;
    for (city, urls) in &plan {
        println!("{}", city.bright_cyan().bold());
        for url in urls {
            println!("  {}", redact_url(url));
        }
    }
    Ok(())
}

async fn cmd_seen(config: &Config, country: &str) -> Result<()> {
    let store = FileSeenStore::new(&config.harvest.state_dir);
    match store.load(country).await? {
        Some(domains) => println!(
            "{} domains collected for {} ({})",
            domains.len(),
            country,
            store.path_for(country).display()
        ),
        None => println!("No domains collected for {} yet", country),
    }
    Ok(())
}
