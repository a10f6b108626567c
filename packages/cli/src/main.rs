#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for cafe scout.
//!
//! Runs a one-off search and prints the same JSON the API returns,
//! prints the Overpass QL for a search, or starts the API server.

use cafe_scout_overpass::{OverpassClient, OverpassConfig, query};
use cafe_scout_place_models::Coordinate;
use cafe_scout_search::distance::distance_m;
use cafe_scout_search::{SearchConfig, expand_search};
use cafe_scout_server_models::{ApiCafe, CafesResponse};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cafe_scout", about = "Find open cafes near a coordinate")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for open cafes and print the result as JSON
    Search {
        /// Latitude of the search center
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude of the search center
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Starting radius in meters (defaults to the configured radius)
        #[arg(long)]
        radius: Option<u32>,
    },
    /// Print the Overpass QL query for a single search radius
    Query {
        /// Latitude of the search center
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude of the search center
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Radius in meters
        #[arg(long, default_value = "4000")]
        radius: u32,
    },
    /// Start the API server (`BIND_ADDR`, `PORT`)
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();

    match cli.command {
        Commands::Search { lat, lon, radius } => {
            let center = Coordinate::new(lat, lon)?;
            let config = SearchConfig::from_env()?;
            let client = OverpassClient::from_env()?;
            let radius_m = radius.unwrap_or(config.default_radius_m);

            let outcome = expand_search(&client, center, radius_m, &config.policy()).await?;
            log::info!(
                "Found {} open cafes after {} queries",
                outcome.places.len(),
                outcome.queries
            );

            let cafes = outcome
                .places
                .into_iter()
                .map(|place| {
                    let distance = distance_m(center, place.coordinate);
                    ApiCafe::from_place(place, distance)
                })
                .collect();
            let response = CafesResponse::new(cafes, outcome.radius_m);

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Query { lat, lon, radius } => {
            let center = Coordinate::new(lat, lon)?;
            let timeout_secs = OverpassConfig::from_env().timeout_secs;

            print!("{}", query::build_query(center, radius, timeout_secs));
        }
        Commands::Serve => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(cafe_scout_server::run_server())
            })
            .await??;
        }
    }

    Ok(())
}
