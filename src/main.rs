mod catalog;
mod db;
mod extract;
mod fetch;
mod pipeline;
mod settings;
mod source;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "imdb_catalog",
    about = "Import a personal movie list from IMDB and render an HTML catalog"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import new movies from the source list, then regenerate the catalog
    Run {
        /// Override the source list path from settings
        #[arg(short, long)]
        source: Option<PathBuf>,
    },
    /// Regenerate the HTML catalog from the store only
    Render,
    /// Show collection statistics
    Stats,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let settings = settings::Settings::load()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { source } => {
            println!("IMDB Collection Import");
            println!("======================\n");

            let source_path = source.unwrap_or_else(|| settings.source_path.clone());
            let entries = source::read_entries(&source_path, &settings)?;
            info!(
                entries = entries.len(),
                source = %source_path.display(),
                "loaded collection list"
            );

            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            std::fs::create_dir_all(&settings.covers_dir).with_context(|| {
                format!("failed to create {}", settings.covers_dir.display())
            })?;

            let fetcher = fetch::HttpFetcher::new(&settings)?;
            let report = pipeline::run(&conn, &fetcher, &settings, &entries)?;
            let rendered = catalog::write(&conn, &settings.catalog_path)?;

            println!("{} movies have been added", report.added);
            if report.failed > 0 {
                println!(
                    "{} entries failed and will be retried on the next run",
                    report.failed
                );
            }
            println!(
                "Catalog written to {} ({} movies)",
                settings.catalog_path.display(),
                rendered
            );
            Ok(())
        }
        Commands::Render => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let rendered = catalog::write(&conn, &settings.catalog_path)?;
            println!(
                "Catalog written to {} ({} movies)",
                settings.catalog_path.display(),
                rendered
            );
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let covers = std::fs::read_dir(&settings.covers_dir)
                .map(|d| d.filter_map(|e| e.ok()).count())
                .unwrap_or(0);
            println!("Movies: {}", db::count(&conn)?);
            println!("Covers: {}", covers);
            Ok(())
        }
    }
}
