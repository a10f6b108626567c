//! Lifecycle and completeness filtering of raw places.
//!
//! OSM has no single "closed" flag. Mappers use lifecycle prefixes
//! (`disused:amenity=cafe`), plain flags (`abandoned=yes`), an
//! `end_date`, or just rename the venue to "Closed ...". All of those
//! are treated as closed here.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use cafe_scout_place_models::{FilteredPlace, RawPlace};
use regex::Regex;

/// Key prefixes marking a feature that no longer operates.
const LIFECYCLE_PREFIXES: &[&str] = &["disused:", "abandoned:", "was:"];

/// Flags that close a venue when set to `yes`.
const LIFECYCLE_FLAGS: &[&str] = &["disused", "abandoned", "closed"];

static CLOSED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bclosed\b").unwrap_or_else(|_| unreachable!()));

/// Returns `true` if the tags describe an operating venue.
///
/// An empty tag map carries no evidence of closure and counts as open.
#[must_use]
pub fn is_open(tags: &BTreeMap<String, String>) -> bool {
    if tags.is_empty() {
        return true;
    }

    let has_lifecycle_prefix = tags.keys().any(|key| {
        let key = key.to_lowercase();
        LIFECYCLE_PREFIXES
            .iter()
            .any(|prefix| key.starts_with(prefix))
    });
    if has_lifecycle_prefix {
        return false;
    }

    if LIFECYCLE_FLAGS
        .iter()
        .any(|flag| tags.get(*flag).is_some_and(|v| v == "yes"))
    {
        return false;
    }

    if tags.get("end_date").is_some_and(|v| !v.is_empty()) {
        return false;
    }

    let name = ["name", "brand"]
        .iter()
        .filter_map(|key| tags.get(*key))
        .find(|v| !v.is_empty());

    !name.is_some_and(|name| CLOSED_NAME.is_match(name))
}

/// Filters raw places down to open, complete, unique ones.
///
/// Closed venues and entries without a coordinate are dropped. Among
/// the rest, the first occurrence of each identity wins; places without
/// an identity are always kept. Survivors keep their input order.
#[must_use]
pub fn filter_places<I>(raw: I) -> Vec<FilteredPlace>
where
    I: IntoIterator<Item = RawPlace>,
{
    let mut seen = BTreeSet::new();

    raw.into_iter()
        .filter(|place| is_open(&place.tags))
        .filter_map(FilteredPlace::from_raw)
        .filter(|place| place.id.is_none_or(|id| seen.insert(id)))
        .collect()
}

/// Runs already-filtered places through [`filter_places`] again.
///
/// Filtering is idempotent, so this returns `places` unchanged.
#[must_use]
pub fn refilter(places: Vec<FilteredPlace>) -> Vec<FilteredPlace> {
    filter_places(places.into_iter().map(RawPlace::from))
}

#[cfg(test)]
mod tests {
    use cafe_scout_place_models::{Coordinate, ElementType, PlaceId};

    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn place(id: Option<i64>, pairs: &[(&str, &str)]) -> RawPlace {
        RawPlace {
            id: id.map(|id| PlaceId::new(ElementType::Node, id)),
            coordinate: Some(Coordinate::new(48.8566, 2.3522).unwrap()),
            tags: tags(pairs),
        }
    }

    #[test]
    fn open_cafe_is_open() {
        assert!(is_open(&tags(&[("amenity", "cafe"), ("name", "Open Cafe")])));
        assert!(is_open(&BTreeMap::new()));
    }

    #[test]
    fn lifecycle_prefix_closes() {
        assert!(!is_open(&tags(&[
            ("amenity", "cafe"),
            ("disused:amenity", "cafe")
        ])));
        assert!(!is_open(&tags(&[("Was:Amenity", "cafe")])));
    }

    #[test]
    fn lifecycle_flag_closes() {
        assert!(!is_open(&tags(&[("amenity", "cafe"), ("abandoned", "yes")])));
        assert!(!is_open(&tags(&[("closed", "yes")])));
        assert!(is_open(&tags(&[("closed", "no")])));
    }

    #[test]
    fn end_date_closes() {
        assert!(!is_open(&tags(&[("amenity", "cafe"), ("end_date", "2025")])));
        assert!(is_open(&tags(&[("amenity", "cafe"), ("end_date", "")])));
    }

    #[test]
    fn closed_in_name_closes() {
        assert!(!is_open(&tags(&[
            ("amenity", "cafe"),
            ("name", "Cafe Closed for Winter")
        ])));
        assert!(!is_open(&tags(&[("brand", "CLOSED")])));
        assert!(is_open(&tags(&[("name", "Enclosed Garden Cafe")])));
    }

    #[test]
    fn drops_closed_and_incomplete_places() {
        let mut missing_coordinate = place(Some(3), &[("name", "Nowhere")]);
        missing_coordinate.coordinate = None;

        let filtered = filter_places(vec![
            place(Some(1), &[("name", "Kept")]),
            place(Some(2), &[("name", "Gone"), ("disused", "yes")]),
            missing_coordinate,
        ]);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Kept");
        assert!(filtered.iter().all(|p| is_open(&p.tags)));
    }

    #[test]
    fn dedups_by_identity_keeping_first() {
        let filtered = filter_places(vec![
            place(Some(1), &[("name", "First")]),
            place(Some(2), &[("name", "Other")]),
            place(Some(1), &[("name", "Second")]),
            place(None, &[("name", "Anon A")]),
            place(None, &[("name", "Anon B")]),
        ]);

        let names: Vec<&str> = filtered.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["First", "Other", "Anon A", "Anon B"]);
    }

    #[test]
    fn same_osm_id_different_type_is_distinct() {
        let mut way = place(Some(1), &[("name", "Way")]);
        way.id = Some(PlaceId::new(ElementType::Way, 1));

        let filtered = filter_places(vec![place(Some(1), &[("name", "Node")]), way]);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn closed_first_occurrence_does_not_shadow_open_duplicate() {
        let filtered = filter_places(vec![
            place(Some(1), &[("name", "Old"), ("closed", "yes")]),
            place(Some(1), &[("name", "Reopened")]),
        ]);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Reopened");
    }

    #[test]
    fn filtering_is_idempotent() {
        let once = filter_places(vec![
            place(Some(1), &[("name", "A")]),
            place(Some(1), &[("name", "A again")]),
            place(Some(2), &[("end_date", "2019-04")]),
            place(None, &[]),
            place(Some(3), &[("brand", "B"), ("addr:street", "Rue de Rivoli")]),
        ]);
        let twice = refilter(once.clone());

        assert_eq!(once, twice);
    }
}
