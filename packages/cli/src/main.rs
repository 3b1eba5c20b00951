#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI for running event map queries against a pre-built events database.
//!
//! ```text
//! event_map_cli query --db events.sqlite --bbox -1,51,1,52 --zoom 8 \
//!     [--years 1990:2010] [--text bomb] [--seed 42]
//! event_map_cli show --db events.sqlite 197001020001
//! event_map_cli range --db events.sqlite
//! ```
//!
//! Results print as JSON on stdout; run with `RUST_LOG=debug` for query
//! diagnostics.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use event_map_database::EventStore;
use event_map_database_models::{BoundingBox, Filter, Viewport, YearRange};
use event_map_query::{MapConfig, QueryEngine};

#[derive(Parser)]
#[command(name = "event_map_cli", about = "Query the event map engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a viewport query and print the render set
    Query {
        /// Path to the events SQLite database
        #[arg(long)]
        db: PathBuf,
        /// Bounding box as "west,south,east,north"
        #[arg(long)]
        bbox: String,
        /// Map zoom level
        #[arg(long)]
        zoom: f64,
        /// Inclusive year range as "start:end"
        #[arg(long)]
        years: Option<String>,
        /// Free-text substring filter
        #[arg(long)]
        text: Option<String>,
        /// Fixed fan-out seed for reproducible layout
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print one event's full record
    Show {
        /// Path to the events SQLite database
        #[arg(long)]
        db: PathBuf,
        /// Event identifier
        id: String,
    },
    /// Print the dataset's year range
    Range {
        /// Path to the events SQLite database
        #[arg(long)]
        db: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Query {
            db,
            bbox,
            zoom,
            years,
            text,
            seed,
        } => {
            let Some(bbox) = parse_bbox(&bbox) else {
                eprintln!("Invalid bbox: expected \"west,south,east,north\"");
                std::process::exit(1);
            };

            let mut filter = Filter::all();
            if let Some(years) = years {
                let Some(range) = parse_years(&years) else {
                    eprintln!("Invalid years: expected \"start:end\"");
                    std::process::exit(1);
                };
                filter.years = Some(range);
            }
            if let Some(text) = text {
                filter = filter.with_text(&text);
            }

            let store = EventStore::open(&db).await?;
            let engine = QueryEngine::new(store, MapConfig::default());

            let viewport = Viewport::new(bbox, zoom);
            let result = match seed {
                Some(seed) => engine.run_seeded(&viewport, &filter, seed).await?,
                None => engine.run(&viewport, &filter).await?,
            };

            log::info!("{} result with {} items", result.mode(), result.len());
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Show { db, id } => {
            let store = EventStore::open(&db).await?;
            let engine = QueryEngine::new(store, MapConfig::default());

            if let Some(event) = engine.lookup(&id).await? {
                println!("{}", serde_json::to_string_pretty(&event)?);
            } else {
                eprintln!("Event not found: {id}");
                std::process::exit(1);
            }
        }
        Commands::Range { db } => {
            let store = EventStore::open(&db).await?;

            match store.year_range().await? {
                Some((min, max)) => println!("{min}:{max}"),
                None => println!("empty dataset"),
            }
        }
    }

    Ok(())
}

/// Parses a bounding box string `"west,south,east,north"`.
fn parse_bbox(s: &str) -> Option<BoundingBox> {
    let parts: Vec<f64> = s.split(',').filter_map(|p| p.trim().parse().ok()).collect();
    if parts.len() == 4 {
        Some(BoundingBox::new(parts[0], parts[1], parts[2], parts[3]))
    } else {
        None
    }
}

/// Parses an inclusive year range string `"start:end"`.
fn parse_years(s: &str) -> Option<YearRange> {
    let (start, end) = s.split_once(':')?;
    Some(YearRange::new(
        start.trim().parse().ok()?,
        end.trim().parse().ok()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bbox_accepts_four_floats() {
        let bbox = parse_bbox("-1.0, 51.0, 1.0, 52.0").unwrap();
        assert!((bbox.west - -1.0).abs() < f64::EPSILON);
        assert!((bbox.north - 52.0).abs() < f64::EPSILON);

        assert!(parse_bbox("-1.0,51.0,1.0").is_none());
        assert!(parse_bbox("west,south,east,north").is_none());
    }

    #[test]
    fn parse_years_accepts_colon_range() {
        assert_eq!(parse_years("1990:2010"), Some(YearRange::new(1990, 2010)));
        assert_eq!(parse_years(" 1990 : 2010 "), Some(YearRange::new(1990, 2010)));
        assert!(parse_years("1990").is_none());
        assert!(parse_years("a:b").is_none());
    }
}
