#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate and place types for cafe discovery.
//!
//! [`RawPlace`] is what the Overpass client hands back: an element
//! identity, an optional coordinate, and the raw OSM tag map.
//! [`FilteredPlace`] is what survives lifecycle and completeness checks
//! in `cafe_scout_search`. Both derive their display name and address
//! from the same tag rules so that a filtered place can be run through
//! the filter again unchanged.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Name shown for places that carry neither a `name` nor a `brand` tag.
pub const UNNAMED_PLACE: &str = "Unnamed Cafe";

/// Tags joined (in order) to build a human-readable address.
const ADDRESS_TAGS: &[&str] = &[
    "addr:housenumber",
    "addr:street",
    "addr:city",
    "addr:postcode",
];

/// A WGS84 coordinate.
///
/// Can only be built through [`Coordinate::new`], so every value in
/// circulation is finite and in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

/// Error returned when a latitude/longitude pair is out of range.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("Invalid coordinate ({latitude}, {longitude}): latitude must be within [-90, 90] and longitude within [-180, 180]")]
pub struct InvalidCoordinateError {
    /// The rejected latitude.
    pub latitude: f64,
    /// The rejected longitude.
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate, validating both components.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinateError`] if either component is not
    /// finite or falls outside its valid range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinateError> {
        if !latitude.is_finite()
            || !longitude.is_finite()
            || !(-90.0..=90.0).contains(&latitude)
            || !(-180.0..=180.0).contains(&longitude)
        {
            return Err(InvalidCoordinateError {
                latitude,
                longitude,
            });
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// `OpenStreetMap` element kind.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ElementType {
    /// A single point.
    Node,
    /// An ordered list of nodes (building outlines, areas).
    Way,
    /// A grouping of other elements.
    Relation,
}

/// Stable identity of a place in the source data.
///
/// OSM ids are only unique per element type, so the type is part of
/// the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceId {
    /// Element kind.
    pub element_type: ElementType,
    /// Numeric OSM id.
    pub osm_id: i64,
}

impl PlaceId {
    /// Creates a new identity.
    #[must_use]
    pub const fn new(element_type: ElementType, osm_id: i64) -> Self {
        Self {
            element_type,
            osm_id,
        }
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.element_type, self.osm_id)
    }
}

/// A place exactly as reported by the geodata service.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RawPlace {
    /// Identity, if the service reported both type and id.
    pub id: Option<PlaceId>,
    /// Position. Ways and relations queried without `center` have none.
    pub coordinate: Option<Coordinate>,
    /// Raw OSM tags.
    pub tags: BTreeMap<String, String>,
}

impl RawPlace {
    /// Returns the value of `key`, if present.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// The `name` tag, falling back to `brand`.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        display_name(&self.tags)
    }

    /// Street address assembled from the `addr:*` tags.
    #[must_use]
    pub fn address(&self) -> Option<String> {
        format_address(&self.tags)
    }
}

/// A place that passed lifecycle and completeness checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredPlace {
    /// Identity, if known. Unique within a result set.
    pub id: Option<PlaceId>,
    /// Display name ([`UNNAMED_PLACE`] when untagged).
    pub name: String,
    /// Formatted address, if any `addr:*` tag is present.
    pub address: Option<String>,
    /// Position.
    pub coordinate: Coordinate,
    /// Raw OSM tags, retained so the place can be re-checked.
    pub tags: BTreeMap<String, String>,
}

impl FilteredPlace {
    /// Builds a filtered place from a raw one that has a coordinate.
    ///
    /// Returns `None` when the coordinate is missing.
    #[must_use]
    pub fn from_raw(raw: RawPlace) -> Option<Self> {
        let coordinate = raw.coordinate?;
        let name = raw.name().unwrap_or(UNNAMED_PLACE).to_string();
        let address = raw.address();

        Some(Self {
            id: raw.id,
            name,
            address,
            coordinate,
            tags: raw.tags,
        })
    }
}

impl From<FilteredPlace> for RawPlace {
    fn from(place: FilteredPlace) -> Self {
        Self {
            id: place.id,
            coordinate: Some(place.coordinate),
            tags: place.tags,
        }
    }
}

fn display_name(tags: &BTreeMap<String, String>) -> Option<&str> {
    ["name", "brand"]
        .iter()
        .filter_map(|key| tags.get(*key))
        .map(String::as_str)
        .find(|value| !value.is_empty())
}

fn format_address(tags: &BTreeMap<String, String>) -> Option<String> {
    let parts: Vec<&str> = ADDRESS_TAGS
        .iter()
        .filter_map(|key| tags.get(*key))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}
