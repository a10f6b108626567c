#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Cafe search: lifecycle filtering and radius expansion.
//!
//! The geodata feed is noisy. Closed venues linger under lifecycle
//! tags, the same venue can come back more than once, and ways may lack
//! a position. [`filter`] turns raw places into a clean result set and
//! [`expander`] keeps widening the query until that set is big enough or
//! the radius ceiling is hit.

pub mod config;
pub mod distance;
pub mod expander;
pub mod filter;

use cafe_scout_overpass::OverpassError;

pub use config::{ConfigError, SearchConfig};
pub use expander::{ExpansionPolicy, SearchOutcome, expand_search};
pub use filter::{filter_places, is_open};

/// Errors from a cafe search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The geodata query failed.
    #[error("Overpass request failed: {0}")]
    Overpass(#[from] OverpassError),

    /// The starting radius is not positive.
    #[error("Invalid search radius: {radius_m}")]
    InvalidRadius {
        /// The rejected radius, in meters.
        radius_m: u32,
    },

    /// The expansion policy would not terminate.
    #[error("Invalid expansion policy: {message}")]
    InvalidPolicy {
        /// Description of the problem.
        message: String,
    },
}
