//! Overpass QL query construction.

use cafe_scout_place_models::Coordinate;

/// `amenity` values treated as cafes.
const AMENITIES: &[&str] = &["cafe", "coffee_shop"];

/// Element kinds searched for each amenity.
const ELEMENT_KINDS: &[&str] = &["node", "way", "relation"];

/// Server-side lifecycle filters applied to the union.
///
/// These drop the bulk of closed venues before they cross the wire. The
/// same rules are re-applied client side since the tagging is too
/// irregular to trust a single pass.
const LIFECYCLE_FILTERS: &[&str] = &[
    r#"["disused:amenity" !~ "."]"#,
    r#"["abandoned:amenity" !~ "."]"#,
    r#"["was:amenity" !~ "."]"#,
    r#"["end_date" !~ "."]"#,
    r#"["disused" != "yes"]"#,
    r#"["abandoned" != "yes"]"#,
    r#"["closed" != "yes"]"#,
    r#"["name" !~ "(?i)closed"]"#,
];

/// Builds the Overpass QL query for cafes within `radius_m` meters of
/// `center`.
///
/// Ways and relations are returned with a computed `center` so every
/// element kind can be placed on the map.
#[must_use]
pub fn build_query(center: Coordinate, radius_m: u32, timeout_secs: u64) -> String {
    let around = format!(
        "(around:{radius_m},{},{})",
        center.latitude(),
        center.longitude()
    );

    let mut ql = format!("[out:json][timeout:{timeout_secs}];\n(\n");

    for amenity in AMENITIES {
        for kind in ELEMENT_KINDS {
            ql.push_str(&format!("  {kind}[\"amenity\"=\"{amenity}\"]{around};\n"));
        }
    }

    ql.push_str(")\n");
    for filter in LIFECYCLE_FILTERS {
        ql.push_str(filter);
        ql.push('\n');
    }
    ql.push_str("-> .results;\n(.results;);\nout center tags;\n");

    ql
}
