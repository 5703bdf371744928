use crate::config::Config;
use crate::db::connection::{init_db, Database};
use crate::domain::PageId;
use crate::runner::{run_scrape, ScrapeOptions};
use crate::scraper::{ListingExtractor, ListingLayout, MissingPricePolicy, PageFetcher};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod domain;
mod errors;
mod runner;
mod scraper;
mod spreadsheets;

#[cfg(test)]
mod tests;

/// Collects rental listings from classified search pages into SQLite.
#[derive(Debug, Parser)]
#[command(name = "rent_scraper", version)]
struct Cli {
    /// Database path (overrides RENT_SCRAPER_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create tables from the schema file
    Init,
    /// Register a search page URL to scrape
    AddPage { url: String },
    /// List registered pages
    Pages {
        #[arg(long)]
        json: bool,
    },
    /// Fetch and store listings for registered pages
    Scrape {
        #[arg(long)]
        page_id: Option<i64>,
        /// `abort` skips the whole page on a bad price, `sentinel` stores -1
        #[arg(long)]
        missing_price: Option<MissingPricePolicy>,
        #[arg(long)]
        no_delay: bool,
    },
    /// Extract listings from a saved HTML file and print them as JSON
    Extract {
        file: PathBuf,
        #[arg(long, default_value_t = 0)]
        page_id: i64,
        #[arg(long)]
        missing_price: Option<MissingPricePolicy>,
    },
    /// Export stored listings to an .xlsx workbook
    Export {
        out: PathBuf,
        #[arg(long)]
        page_id: Option<i64>,
    },
    /// Show recent scrape runs
    Runs {
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rent_scraper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("invalid configuration")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    let db = Database::new(config.db_path.clone());

    match cli.command {
        Command::Init => {
            init_db(&db, &config.schema_path)?;
            println!("Initialized {}", config.db_path.display());
        }
        Command::AddPage { url } => {
            let id = db::pages::add_page(&db, &url)?;
            println!("{id}\t{url}");
        }
        Command::Pages { json } => {
            let pages = db::pages::list_pages(&db)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&pages)?);
            } else {
                for page in pages {
                    println!("{}\t{}\t{}", page.id, page.url, page.added_at);
                }
            }
        }
        Command::Scrape {
            page_id,
            missing_price,
            no_delay,
        } => {
            let fetcher = PageFetcher::new(&config.user_agent, config.timeout)?;
            let options = ScrapeOptions {
                page_id: page_id.map(PageId),
                page_delay: if no_delay { Duration::ZERO } else { config.page_delay },
                missing_price: missing_price.unwrap_or(config.missing_price),
                layout: ListingLayout::default(),
            };

            let summary = run_scrape(&db, &fetcher, &options)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            println!("{} listings stored in total", db::listings::count_listings(&db)?);
        }
        Command::Extract {
            file,
            page_id,
            missing_price,
        } => {
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let extractor = ListingExtractor::new(
                &ListingLayout::default(),
                missing_price.unwrap_or(config.missing_price),
            )?;
            let batch = extractor.extract_html(&html, PageId(page_id))?;
            println!("{}", serde_json::to_string_pretty(&batch)?);
        }
        Command::Export { out, page_id } => {
            let listings = match page_id {
                Some(id) => db::listings::listings_for_page(&db, PageId(id))?,
                None => db::listings::all_listings(&db)?,
            };
            let n = spreadsheets::export_listings_xlsx(&listings, &out)?;
            println!("Exported {n} listings to {}", out.display());
        }
        Command::Runs { limit, json } => {
            let runs = db.with_conn(|conn| db::scrapes::recent_scrape_runs(conn, limit))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&runs)?);
                return Ok(());
            }
            for run in runs {
                let status = if run.success { "ok" } else { "failed" };
                println!(
                    "{}\tpage {}\t{}\t{}\t{} listings\t{}",
                    run.id,
                    run.page_id,
                    run.started_at,
                    status,
                    run.listings_seen.unwrap_or(0),
                    run.error_message.unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}
