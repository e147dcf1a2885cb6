use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use peergeo::aggregate::Aggregate;
use peergeo::config::{Config, DatabaseBackend};
use peergeo::enrich::Enricher;
use peergeo::geo::GeoResolver;
use peergeo::models::PeerId;
use peergeo::pipeline::Pipeline;
use peergeo::storage::{PeerStore, PostgresPeerStore, SqlitePeerStore};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "peergeo")]
#[command(about = "Country distribution of crawled network peers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Count peers per country (default)
    Countries {
        /// Enrichment workers, overrides PIPELINE_WORKERS
        #[arg(long)]
        workers: Option<usize>,
        /// Group countries with fewer peers into "other", overrides REPORT_OTHER_THRESHOLD
        #[arg(long)]
        threshold: Option<u64>,
        /// Print the full aggregate as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the country of specific peers
    Locate {
        /// Peer ids
        #[arg(required = true)]
        ids: Vec<PeerId>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    // The database must be usable before any peer is touched
    let resolver = GeoResolver::open(&config.geoip.country_db_path)?;
    let enricher = Enricher::new(Arc::new(resolver));

    let store: Arc<dyn PeerStore> = match config.database.backend {
        DatabaseBackend::Sqlite => {
            info!("Using SQLite peer store: {}", config.database.url);
            Arc::new(
                SqlitePeerStore::new(&config.database.url, config.database.max_connections)
                    .await
                    .context("failed to open SQLite peer store")?,
            )
        }
        DatabaseBackend::Postgres => {
            info!("Using PostgreSQL peer store: {}", config.database.url);
            Arc::new(
                PostgresPeerStore::new(&config.database.url, config.database.max_connections)
                    .await
                    .context("failed to connect to PostgreSQL peer store")?,
            )
        }
    };

    let pipeline = Pipeline::new(store, enricher);

    match cli.command.unwrap_or(Commands::Countries {
        workers: None,
        threshold: None,
        json: false,
    }) {
        Commands::Countries {
            workers,
            threshold,
            json,
        } => {
            let workers = workers.unwrap_or(config.pipeline.workers);
            let threshold = threshold.unwrap_or(config.pipeline.other_threshold);
            let aggregate = pipeline.run_parallel(workers).await?;

            if json {
                let report = serde_json::json!({
                    "generated_at": chrono::Utc::now().to_rfc3339(),
                    "total_peers": aggregate.total_peers(),
                    "summary": aggregate.summarize(threshold),
                    "aggregate": aggregate,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_table(&aggregate, threshold);
            }
        }
        Commands::Locate { ids } => {
            let located = pipeline.locate(&ids).await?;
            for id in &ids {
                match located.get(id) {
                    Some(country) => println!("{:<12} {}", id, country),
                    None => println!("{:<12} (not in store)", id),
                }
            }
        }
    }

    Ok(())
}

fn print_table(aggregate: &Aggregate, threshold: u64) {
    println!("{:<10} {:>10} {:>8}", "Country", "Peers", "Share");
    println!("{}", "-".repeat(30));
    for share in aggregate.summarize(threshold) {
        println!(
            "{:<10} {:>10} {:>7.1}%",
            share.label,
            share.count,
            aggregate.share_of_resolved(share.count)
        );
    }
    println!("{}", "-".repeat(30));
    println!(
        "{} peers, {} without a resolvable address (shares are of located peers)",
        aggregate.total_peers(),
        aggregate.unresolved().len()
    );
}
