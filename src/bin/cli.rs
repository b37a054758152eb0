//! tripkit CLI
//!
//! Local entry point for scraping listings, serving the HTTP endpoints and
//! printing dashboard numbers from the local document store.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tripkit::{
    error::Result,
    models::{Config, ListingKind},
    services::{ActivityScraper, AdminService, ScrapeReport},
    storage::LocalStore,
    utils::console,
};

/// tripkit - trip planner backend
#[derive(Parser, Debug)]
#[command(
    name = "tripkit",
    version,
    about = "Trip planner backend: records, analytics and activity listings"
)]
struct Cli {
    /// Path to storage directory containing config.toml
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape activities, hotels and transport for a city
    Scrape {
        #[arg(long)]
        city: String,

        /// Print the raw JSON report
        #[arg(long)]
        json: bool,
    },

    /// Serve the HTTP endpoints
    #[cfg(feature = "server")]
    Serve {
        /// Listen address (default: server.listen_addr from config)
        #[arg(long)]
        listen: Option<String>,
    },

    /// Print admin dashboard numbers from the local store
    Stats,

    /// Validate configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let mut config = Config::load_or_default(&config_path);
    config.apply_env();
    log::debug!("Loaded configuration from {}", config_path.display());

    let config = Arc::new(config);

    match cli.command {
        Command::Scrape { city, json } => {
            let scraper = ActivityScraper::new(Arc::clone(&config))?;
            let report = scraper.scrape_city(&city).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }

        #[cfg(feature = "server")]
        Command::Serve { listen } => {
            use tripkit::server::{self, AppState};
            use tripkit::storage::DocumentStore;

            config.validate()?;
            let addr: std::net::SocketAddr = listen
                .as_deref()
                .unwrap_or(&config.server.listen_addr)
                .parse()
                .map_err(|e| {
                    tripkit::error::AppError::config(format!("invalid listen address: {e}"))
                })?;

            let store: Arc<dyn DocumentStore> = Arc::new(LocalStore::from_config(&config.backend));
            let scraper = ActivityScraper::new(Arc::clone(&config))?;
            server::serve(AppState::new(Arc::clone(&config), scraper, store), addr).await?;
        }

        Command::Stats => {
            let store = LocalStore::from_config(&config.backend);
            log::info!("Reading records from {}", store.root_dir().display());

            let admin = AdminService::new(Arc::new(store));
            let dashboard = admin.dashboard(Utc::now().date_naive()).await?;
            let stats = &dashboard.stats;

            console::header("Dashboard");
            console::summary(
                "Totals",
                &[
                    ("Users", stats.total_users.to_string()),
                    ("Active users", stats.active_users.to_string()),
                    ("Trips", stats.total_trips.to_string()),
                    ("Active trips", stats.active_trips.to_string()),
                    ("Completed trips", stats.completed_trips.to_string()),
                    ("Trips this month", stats.trips_this_month.to_string()),
                    ("Trip growth", format!("{:.1}%", stats.trip_growth_rate)),
                    ("Total budget", console::money(stats.total_budget)),
                    ("Average budget", console::money(stats.average_budget)),
                ],
            );

            if !dashboard.top_destinations.is_empty() {
                println!();
                console::success("Top destinations");
                for destination in &dashboard.top_destinations {
                    console::sub_item(&format!(
                        "{} ({} trips, {:.1}%)",
                        destination.destination, destination.trips, destination.percentage
                    ));
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            console::success(&format!(
                "Config OK ({} sources, store at {})",
                config.sources.len(),
                config.backend.database_dir().display()
            ));
        }
    }

    Ok(())
}

fn print_report(report: &ScrapeReport) {
    console::header(&format!("Listings for {}", report.city));

    for (step, kind) in ListingKind::ALL.iter().enumerate() {
        let listings = report.listings(*kind);
        console::step(
            step + 1,
            ListingKind::ALL.len(),
            &format!(
                "{} {} listing(s) via {:?}",
                listings.len(),
                kind.as_str(),
                report.path(*kind)
            ),
        );
        for listing in listings {
            let price = listing
                .price
                .map(|p| format!("{} {}", console::money(p), listing.currency))
                .unwrap_or_else(|| "n/a".to_string());
            console::sub_item(&format!("{} [{}] ({})", listing.name, price, listing.source));
        }
    }

    let summary = &report.summary;
    console::summary(
        "Scrape",
        &[
            ("Activities", summary.total_activities.to_string()),
            ("Hotels", summary.total_hotels.to_string()),
            ("Transport", summary.total_transport.to_string()),
            ("Average price", console::money(summary.average_price)),
            ("Attempts", summary.attempts.to_string()),
            ("Failures", summary.failures.to_string()),
            ("Elapsed", format!("{} ms", summary.elapsed_ms)),
        ],
    );
}
