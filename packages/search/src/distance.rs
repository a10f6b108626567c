//! Great-circle distance between coordinates.

use cafe_scout_place_models::Coordinate;
use geo::{Distance, Haversine, Point};

/// Haversine distance in meters between two coordinates.
#[must_use]
pub fn distance_m(from: Coordinate, to: Coordinate) -> f64 {
    Haversine.distance(to_point(from), to_point(to))
}

fn to_point(coordinate: Coordinate) -> Point<f64> {
    Point::new(coordinate.longitude(), coordinate.latitude())
}
