#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the cafe scout server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the place types to allow independent evolution of the API
//! contract.

use cafe_scout_place_models::{ElementType, FilteredPlace};
use serde::{Deserialize, Serialize};

/// Message attached to an empty result set.
pub const NO_RESULTS_MESSAGE: &str = "No open cafes found. Try expanding the search area.";

/// Query parameters for `GET /api/cafes`.
///
/// Every field is optional at the parsing stage so that missing values
/// produce a validation message instead of a generic extractor error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CafeQueryParams {
    /// Latitude of the search center.
    pub lat: Option<f64>,
    /// Longitude of the search center.
    pub lon: Option<f64>,
    /// Starting search radius in meters.
    pub radius: Option<f64>,
}

/// A cafe as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCafe {
    /// Stable identifier (`node/123`), if the source reported one.
    pub id: Option<String>,
    /// Display name.
    pub name: String,
    /// Formatted street address.
    pub address: Option<String>,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Great-circle distance from the search center, in meters.
    pub distance_m: f64,
    /// OSM element type.
    pub osm_type: Option<ElementType>,
    /// OSM element id.
    pub osm_id: Option<i64>,
    /// Data source (always `"osm"`).
    pub source: String,
}

impl ApiCafe {
    /// Converts a filtered place, attaching its distance from the search
    /// center.
    #[must_use]
    pub fn from_place(place: FilteredPlace, distance_m: f64) -> Self {
        Self {
            id: place.id.map(|id| id.to_string()),
            name: place.name,
            address: place.address,
            lat: place.coordinate.latitude(),
            lon: place.coordinate.longitude(),
            distance_m,
            osm_type: place.id.map(|id| id.element_type),
            osm_id: place.id.map(|id| id.osm_id),
            source: "osm".to_string(),
        }
    }
}

/// Response body of `GET /api/cafes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CafesResponse {
    /// Open cafes, in the order the source returned them.
    pub cafes: Vec<ApiCafe>,
    /// Number of cafes.
    pub count: usize,
    /// Radius of the last query, in meters.
    pub radius: u32,
    /// Hint shown when no cafes were found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CafesResponse {
    /// Builds a response, attaching [`NO_RESULTS_MESSAGE`] when empty.
    #[must_use]
    pub fn new(cafes: Vec<ApiCafe>, radius: u32) -> Self {
        let message = cafes.is_empty().then(|| NO_RESULTS_MESSAGE.to_string());

        Self {
            count: cafes.len(),
            cafes,
            radius,
            message,
        }
    }
}

/// Error body returned for failed requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Short description.
    pub error: String,
    /// Underlying cause, when there is one worth showing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// An error without details.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    /// An error with details.
    #[must_use]
    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}
