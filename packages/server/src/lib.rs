#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the cafe scout application.
//!
//! Exposes `GET /api/cafes`, which runs an expanding Overpass search
//! around the requested coordinate and returns the open cafes found,
//! and `GET /api/health`. Each request is handled independently; the
//! only shared state is the immutable [`AppState`].

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, error, middleware, web};
use cafe_scout_overpass::{OverpassClient, PlaceSource};
use cafe_scout_search::SearchConfig;
use cafe_scout_server_models::ApiError;

/// Shared application state.
pub struct AppState {
    /// Where cafes are fetched from.
    pub source: Arc<dyn PlaceSource>,
    /// Radius expansion settings.
    pub config: SearchConfig,
}

/// Registers the API routes.
///
/// Malformed query strings (e.g. `lat=abc`) are answered with a JSON
/// 400 instead of the default plain-text extractor error.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let query_config = web::QueryConfig::default().error_handler(|err, _req| {
        let body = ApiError::with_details("Invalid query parameters", err.to_string());
        error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    });

    cfg.app_data(query_config).service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/cafes", web::get().to(handlers::cafes)),
    );
}

/// Starts the cafe scout API server.
///
/// Loads the search config (see `CAFE_SCOUT_SEARCH_CONFIG`), builds the
/// Overpass client from the environment, and binds to `BIND_ADDR:PORT`
/// (default `127.0.0.1:8080`). The caller is responsible for providing
/// the async runtime (e.g. via `#[actix_web::main]`) and for initializing
/// logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the config or client cannot be
/// built, or the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    log::info!("Loading search config...");
    let config = SearchConfig::from_env().map_err(std::io::Error::other)?;

    log::info!("Building Overpass client...");
    let client = OverpassClient::from_env().map_err(std::io::Error::other)?;
    log::info!("Using Overpass endpoint {}", client.config().url);

    let state = web::Data::new(AppState {
        source: Arc::new(client),
        config,
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
