//! Radius expansion.
//!
//! Queries a [`PlaceSource`] at a starting radius and, while too few
//! open cafes come back, widens the radius and queries again. The radius
//! strictly increases and is clamped to a ceiling, so the loop always
//! terminates. Queries run one after another, never concurrently.

use std::time::Duration;

use cafe_scout_overpass::PlaceSource;
use cafe_scout_place_models::{Coordinate, FilteredPlace};

use crate::SearchError;
use crate::filter::filter_places;

/// Controls how far and how fast a search widens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpansionPolicy {
    /// Stop once at least this many open cafes are found.
    pub min_results: usize,
    /// Multiplier applied to the radius on each expansion. Must be > 1.
    pub growth_factor: f64,
    /// Minimum growth per expansion, in meters.
    pub min_step_m: u32,
    /// Radius ceiling, in meters. The last query runs at exactly this
    /// radius if the search gets that far.
    pub max_radius_m: u32,
    /// Optional cap on expansions after the first query.
    pub max_expansions: Option<u32>,
    /// Pause between consecutive queries.
    pub expansion_delay: Duration,
}

impl ExpansionPolicy {
    /// Checks that the policy describes a terminating search.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidPolicy`] if the growth factor is not
    /// a finite number greater than 1 or the radius ceiling is zero.
    pub fn validate(&self) -> Result<(), SearchError> {
        if !self.growth_factor.is_finite() || self.growth_factor <= 1.0 {
            return Err(SearchError::InvalidPolicy {
                message: format!(
                    "growth factor must be greater than 1, got {}",
                    self.growth_factor
                ),
            });
        }

        if self.max_radius_m == 0 {
            return Err(SearchError::InvalidPolicy {
                message: "maximum radius must be positive".to_string(),
            });
        }

        Ok(())
    }

    /// Returns the radius to try after `radius_m`.
    ///
    /// Grows by `growth_factor`, by at least `min_step_m` and by at least
    /// one meter, then clamps to `max_radius_m`.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn next_radius(&self, radius_m: u32) -> u32 {
        let grown = (f64::from(radius_m) * self.growth_factor)
            .ceil()
            .min(f64::from(u32::MAX)) as u32;

        grown
            .max(radius_m.saturating_add(self.min_step_m))
            .max(radius_m.saturating_add(1))
            .min(self.max_radius_m)
    }
}

/// Result of an expanding search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Open, deduplicated places from the last query.
    pub places: Vec<FilteredPlace>,
    /// Radius of the last query, in meters.
    pub radius_m: u32,
    /// Number of queries issued.
    pub queries: u32,
}

/// Searches around `center`, widening the radius until enough open
/// places are found.
///
/// Stops as soon as one of these holds after a query:
///
/// * at least `min_results` places survived filtering,
/// * the radius has reached `max_radius_m`,
/// * `max_expansions` expansions have been made.
///
/// The places from the last query are returned, possibly empty. A
/// starting radius above the ceiling is clamped to it.
///
/// # Errors
///
/// Returns [`SearchError::InvalidRadius`] for a zero starting radius,
/// [`SearchError::InvalidPolicy`] for a policy that fails
/// [`ExpansionPolicy::validate`], and [`SearchError::Overpass`] if any
/// query fails. No query is issued when validation fails.
pub async fn expand_search(
    source: &dyn PlaceSource,
    center: Coordinate,
    start_radius_m: u32,
    policy: &ExpansionPolicy,
) -> Result<SearchOutcome, SearchError> {
    policy.validate()?;

    if start_radius_m == 0 {
        return Err(SearchError::InvalidRadius {
            radius_m: start_radius_m,
        });
    }

    let mut radius_m = start_radius_m.min(policy.max_radius_m);
    let mut expansions = 0u32;

    loop {
        log::info!(
            "Requesting cafes radius={radius_m} lat={} lon={} expansion={expansions}",
            center.latitude(),
            center.longitude(),
        );

        let raw = source.fetch_places(center, radius_m).await?;
        let raw_count = raw.len();
        let places = filter_places(raw);

        log::info!(
            "Overpass returned {raw_count} results ({} open after filtering) for radius={radius_m}",
            places.len(),
        );

        let capped = policy.max_expansions.is_some_and(|cap| expansions >= cap);
        if places.len() >= policy.min_results || radius_m >= policy.max_radius_m || capped {
            return Ok(SearchOutcome {
                places,
                radius_m,
                queries: expansions + 1,
            });
        }

        radius_m = policy.next_radius(radius_m);
        expansions += 1;

        if !policy.expansion_delay.is_zero() {
            tokio::time::sleep(policy.expansion_delay).await;
        }
    }
}
