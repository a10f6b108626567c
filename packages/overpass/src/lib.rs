#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Overpass API client for cafe discovery.
//!
//! Builds an Overpass QL query for `amenity=cafe` / `amenity=coffee_shop`
//! elements around a coordinate, posts it to the configured interpreter
//! endpoint, and parses the returned elements into [`RawPlace`] values.
//!
//! The client never widens the search on its own. It only retries the
//! same request once on rate limiting, gateway timeouts and transport
//! failures (see [`retry`]). Radius expansion lives in
//! `cafe_scout_search`.
//!
//! See <https://wiki.openstreetmap.org/wiki/Overpass_API/Overpass_QL>

pub mod parse;
pub mod query;
pub mod retry;

use std::time::Duration;

use async_trait::async_trait;
use cafe_scout_place_models::{Coordinate, RawPlace};
use thiserror::Error;

pub use retry::RetryPolicy;

/// Public Overpass interpreter endpoint.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// User agent sent with every request. The public instance asks clients
/// to identify themselves.
pub const DEFAULT_USER_AGENT: &str = "CafeScout/1.0";

/// Per-request timeout in seconds, also sent as the QL `[timeout:]`.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Errors from Overpass operations.
#[derive(Debug, Error)]
pub enum OverpassError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The interpreter answered with a non-success status.
    #[error("Overpass returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

impl OverpassError {
    /// Returns `true` for failures caused by the request running out of
    /// time, either locally or at the Overpass gateway.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout(),
            Self::Status { status } => *status == 504,
            Self::Parse { .. } => false,
        }
    }
}

/// A source of raw places around a coordinate.
///
/// [`OverpassClient`] is the production implementation. The search
/// layer only depends on this trait.
#[async_trait]
pub trait PlaceSource: Send + Sync {
    /// Returns every cafe-like element within `radius_m` meters of
    /// `center`, unfiltered.
    ///
    /// # Errors
    ///
    /// Returns [`OverpassError`] if the request fails or the response
    /// cannot be decoded.
    async fn fetch_places(
        &self,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<RawPlace>, OverpassError>;
}

/// Connection settings for [`OverpassClient`].
#[derive(Debug, Clone)]
pub struct OverpassConfig {
    /// Interpreter endpoint URL.
    pub url: String,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Retry behaviour for a single query.
    pub retry: RetryPolicy,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OVERPASS_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
        }
    }
}

impl OverpassConfig {
    /// Builds a config from `OVERPASS_URL`, `OVERPASS_USER_AGENT` and
    /// `OVERPASS_TIMEOUT_SECS`, using defaults for anything unset.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            url: std::env::var("OVERPASS_URL").unwrap_or(defaults.url),
            user_agent: std::env::var("OVERPASS_USER_AGENT").unwrap_or(defaults.user_agent),
            timeout_secs: std::env::var("OVERPASS_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            retry: defaults.retry,
        }
    }
}

/// HTTP client for the Overpass interpreter.
pub struct OverpassClient {
    client: reqwest::Client,
    config: OverpassConfig,
}

impl OverpassClient {
    /// Creates a client with the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`OverpassError::Http`] if the underlying HTTP client
    /// cannot be built.
    pub fn new(config: OverpassConfig) -> Result<Self, OverpassError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Creates a client configured from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`OverpassError::Http`] if the underlying HTTP client
    /// cannot be built.
    pub fn from_env() -> Result<Self, OverpassError> {
        Self::new(OverpassConfig::from_env())
    }

    /// The settings this client was built with.
    #[must_use]
    pub const fn config(&self) -> &OverpassConfig {
        &self.config
    }
}

#[async_trait]
impl PlaceSource for OverpassClient {
    async fn fetch_places(
        &self,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<RawPlace>, OverpassError> {
        let ql = query::build_query(center, radius_m, self.config.timeout_secs);
        log::debug!("Overpass query:\n{ql}");

        let payload = retry::send_json(
            || self.client.post(&self.config.url).body(ql.clone()),
            &self.config.retry,
        )
        .await?;

        Ok(parse::parse_elements(&payload))
    }
}
