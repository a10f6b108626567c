//! Overpass JSON response parsing.
//!
//! The interpreter answers `[out:json]` queries with
//! `{"elements": [...]}`. Nodes carry `lat`/`lon` directly; ways and
//! relations carry a computed `center` when queried with `out center`.

use std::collections::BTreeMap;

use cafe_scout_place_models::{Coordinate, ElementType, PlaceId, RawPlace};
use serde_json::Value;

/// Converts the `elements` array of an Overpass response into raw places.
///
/// A payload that is not an object, or has no `elements` array, yields
/// no places. Elements of unknown type (e.g. `area`) are skipped.
#[must_use]
pub fn parse_elements(payload: &Value) -> Vec<RawPlace> {
    let Some(elements) = payload.get("elements").and_then(Value::as_array) else {
        log::warn!("Overpass payload has no elements array");
        return Vec::new();
    };

    elements.iter().filter_map(parse_element).collect()
}

fn parse_element(element: &Value) -> Option<RawPlace> {
    let element_type = match element.get("type").and_then(Value::as_str) {
        Some(s) => match s.parse::<ElementType>() {
            Ok(t) => Some(t),
            Err(_) => {
                log::debug!("Skipping Overpass element of type {s}");
                return None;
            }
        },
        None => None,
    };

    let osm_id = element.get("id").and_then(Value::as_i64);
    let id = element_type
        .zip(osm_id)
        .map(|(element_type, osm_id)| PlaceId::new(element_type, osm_id));

    Some(RawPlace {
        id,
        coordinate: parse_coordinate(element),
        tags: parse_tags(element),
    })
}

fn parse_coordinate(element: &Value) -> Option<Coordinate> {
    let direct = element
        .get("lat")
        .and_then(Value::as_f64)
        .zip(element.get("lon").and_then(Value::as_f64));

    let (lat, lon) = direct.or_else(|| {
        let center = element.get("center")?;
        center
            .get("lat")
            .and_then(Value::as_f64)
            .zip(center.get("lon").and_then(Value::as_f64))
    })?;

    Coordinate::new(lat, lon)
        .map_err(|e| log::debug!("Dropping coordinate: {e}"))
        .ok()
}

fn parse_tags(element: &Value) -> BTreeMap<String, String> {
    element
        .get("tags")
        .and_then(Value::as_object)
        .map(|tags| {
            tags.iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_node_coordinates_and_tags() {
        let payload = serde_json::json!({
            "elements": [{
                "type": "node",
                "id": 101,
                "lat": 37.7609,
                "lon": -122.4215,
                "tags": {"amenity": "cafe", "name": "Ritual Coffee Roasters"}
            }]
        });

        let places = parse_elements(&payload);
        assert_eq!(places.len(), 1);
        let place = &places[0];
        assert_eq!(place.id, Some(PlaceId::new(ElementType::Node, 101)));
        assert!((place.coordinate.unwrap().latitude() - 37.7609).abs() < 1e-9);
        assert_eq!(place.name(), Some("Ritual Coffee Roasters"));
    }

    #[test]
    fn ways_fall_back_to_center() {
        let payload = serde_json::json!({
            "elements": [{
                "type": "way",
                "id": 7,
                "center": {"lat": 51.5, "lon": -0.12},
                "tags": {"amenity": "cafe"}
            }]
        });

        let places = parse_elements(&payload);
        let coordinate = places[0].coordinate.unwrap();
        assert!((coordinate.longitude() - -0.12).abs() < 1e-9);
        assert_eq!(places[0].id.unwrap().element_type, ElementType::Way);
    }

    #[test]
    fn keeps_elements_without_coordinates_or_identity() {
        let payload = serde_json::json!({
            "elements": [
                {"type": "relation", "id": 3, "tags": {"amenity": "cafe"}},
                {"lat": 10.0, "lon": 10.0}
            ]
        });

        let places = parse_elements(&payload);
        assert_eq!(places.len(), 2);
        assert!(places[0].coordinate.is_none());
        assert!(places[1].id.is_none());
        assert!(places[1].tags.is_empty());
    }

    #[test]
    fn skips_unknown_element_types() {
        let payload = serde_json::json!({
            "elements": [{"type": "area", "id": 1, "lat": 0.0, "lon": 0.0}]
        });
        assert!(parse_elements(&payload).is_empty());
    }

    #[test]
    fn out_of_range_coordinates_are_dropped() {
        let payload = serde_json::json!({
            "elements": [{"type": "node", "id": 1, "lat": 123.0, "lon": 0.0}]
        });
        let places = parse_elements(&payload);
        assert!(places[0].coordinate.is_none());
    }

    #[test]
    fn non_object_payload_yields_nothing() {
        assert!(parse_elements(&serde_json::json!([1, 2, 3])).is_empty());
        assert!(parse_elements(&serde_json::json!({"remark": "timeout"})).is_empty());
    }
}
