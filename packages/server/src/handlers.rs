//! HTTP handler functions for the cafe scout API.

use actix_web::{HttpResponse, web};
use cafe_scout_place_models::Coordinate;
use cafe_scout_search::distance::distance_m;
use cafe_scout_search::{SearchError, expand_search};
use cafe_scout_server_models::{ApiCafe, ApiError, ApiHealth, CafeQueryParams, CafesResponse};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/cafes`
///
/// Searches for open cafes around `lat`/`lon`, starting at `radius`
/// meters (or the configured default) and widening as needed.
pub async fn cafes(
    state: web::Data<AppState>,
    params: web::Query<CafeQueryParams>,
) -> HttpResponse {
    let (center, radius_m) = match validate_params(&params, state.config.default_radius_m) {
        Ok(v) => v,
        Err(message) => return HttpResponse::BadRequest().json(ApiError::new(message)),
    };

    let policy = state.config.policy();

    match expand_search(state.source.as_ref(), center, radius_m, &policy).await {
        Ok(outcome) => {
            let cafes: Vec<ApiCafe> = outcome
                .places
                .into_iter()
                .map(|place| {
                    let distance = distance_m(center, place.coordinate);
                    ApiCafe::from_place(place, distance)
                })
                .collect();

            HttpResponse::Ok().json(CafesResponse::new(cafes, outcome.radius_m))
        }
        Err(SearchError::Overpass(e)) => {
            log::error!("Overpass lookup failed: {e}");
            let body = ApiError::with_details("Overpass request failed", e.to_string());
            if e.is_timeout() {
                HttpResponse::GatewayTimeout().json(body)
            } else {
                HttpResponse::BadGateway().json(body)
            }
        }
        Err(e @ SearchError::InvalidRadius { .. }) => {
            HttpResponse::BadRequest().json(ApiError::new(e.to_string()))
        }
        Err(e @ SearchError::InvalidPolicy { .. }) => {
            log::error!("Failed to fetch cafes: {e}");
            HttpResponse::InternalServerError()
                .json(ApiError::with_details("Failed to fetch cafes", e.to_string()))
        }
    }
}

/// Checks the query parameters and resolves the starting radius.
///
/// A missing radius falls back to `default_radius_m`. A radius that is
/// not finite, or that rounds to less than one meter, is rejected.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn validate_params(
    params: &CafeQueryParams,
    default_radius_m: u32,
) -> Result<(Coordinate, u32), String> {
    let (Some(lat), Some(lon)) = (params.lat, params.lon) else {
        return Err("lat and lon query parameters are required".to_string());
    };

    let center = Coordinate::new(lat, lon).map_err(|e| e.to_string())?;

    let radius_m = match params.radius {
        None => default_radius_m,
        Some(radius) => {
            let rounded = radius.round();
            if !rounded.is_finite() || rounded < 1.0 {
                return Err(format!(
                    "radius must be a positive number of meters, got {radius}"
                ));
            }
            rounded.min(f64::from(u32::MAX)) as u32
        }
    };

    Ok((center, radius_m))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use async_trait::async_trait;
    use cafe_scout_overpass::{OverpassError, PlaceSource};
    use cafe_scout_place_models::{ElementType, PlaceId, RawPlace};
    use cafe_scout_search::SearchConfig;

    use super::*;
    use crate::configure;

    enum Reply {
        Places(Vec<RawPlace>),
        Status(u16),
    }

    struct FakeSource {
        reply: Reply,
        queried: Mutex<Vec<u32>>,
    }

    #[async_trait]
    impl PlaceSource for FakeSource {
        async fn fetch_places(
            &self,
            _center: Coordinate,
            radius_m: u32,
        ) -> Result<Vec<RawPlace>, OverpassError> {
            self.queried.lock().unwrap().push(radius_m);
            match &self.reply {
                Reply::Places(places) => Ok(places.clone()),
                Reply::Status(status) => Err(OverpassError::Status { status: *status }),
            }
        }
    }

    fn cafe(id: i64, name: &str, lat: f64, lon: f64) -> RawPlace {
        RawPlace {
            id: Some(PlaceId::new(ElementType::Node, id)),
            coordinate: Some(Coordinate::new(lat, lon).unwrap()),
            tags: BTreeMap::from([
                ("amenity".to_string(), "cafe".to_string()),
                ("name".to_string(), name.to_string()),
            ]),
        }
    }

    fn state(reply: Reply) -> (web::Data<AppState>, Arc<FakeSource>) {
        let source = Arc::new(FakeSource {
            reply,
            queried: Mutex::new(Vec::new()),
        });
        let config = SearchConfig {
            min_results: 1,
            expansion_delay_ms: 0,
            ..SearchConfig::default()
        };
        let data = web::Data::new(AppState {
            source: source.clone(),
            config,
        });
        (data, source)
    }

    #[actix_web::test]
    async fn returns_filtered_cafes() {
        let (data, source) = state(Reply::Places(vec![
            cafe(1, "Open", 59.3293, 18.0686),
            cafe(1, "Open duplicate", 59.3293, 18.0686),
            cafe(2, "Closed until spring", 59.33, 18.07),
        ]));
        let app = actix_test::init_service(App::new().app_data(data).configure(configure)).await;

        let req = actix_test::TestRequest::get()
            .uri("/api/cafes?lat=59.3293&lon=18.0686&radius=1500")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: CafesResponse = actix_test::read_body_json(resp).await;
        assert_eq!(body.count, 1);
        assert_eq!(body.radius, 1500);
        assert_eq!(body.cafes[0].id.as_deref(), Some("node/1"));
        assert_eq!(body.cafes[0].name, "Open");
        assert!(body.cafes[0].distance_m < 1.0);
        assert!(body.message.is_none());
        assert_eq!(*source.queried.lock().unwrap(), [1500]);
    }

    #[actix_web::test]
    async fn missing_radius_uses_default_and_empty_result_is_ok() {
        let (data, source) = state(Reply::Places(Vec::new()));
        let app = actix_test::init_service(App::new().app_data(data).configure(configure)).await;

        let req = actix_test::TestRequest::get()
            .uri("/api/cafes?lat=10&lon=10")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: CafesResponse = actix_test::read_body_json(resp).await;
        assert_eq!(body.count, 0);
        assert!(body.message.is_some());
        // 4000 -> 8000 -> 15000 (capped at two expansions)
        assert_eq!(*source.queried.lock().unwrap(), [4000, 8000, 15_000]);
        assert_eq!(body.radius, 15_000);
    }

    #[actix_web::test]
    async fn rejects_invalid_input_without_querying() {
        let (data, source) = state(Reply::Places(Vec::new()));
        let app = actix_test::init_service(App::new().app_data(data).configure(configure)).await;

        for uri in [
            "/api/cafes?lat=10",
            "/api/cafes?lat=91&lon=0",
            "/api/cafes?lat=0&lon=-181",
            "/api/cafes?lat=0&lon=0&radius=0",
            "/api/cafes?lat=0&lon=0&radius=-50",
            "/api/cafes?lat=abc&lon=0",
        ] {
            let req = actix_test::TestRequest::get().uri(uri).to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");

            let body: ApiError = actix_test::read_body_json(resp).await;
            assert!(!body.error.is_empty());
        }

        assert!(source.queried.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn maps_upstream_failures() {
        for (status, expected) in [
            (502, StatusCode::BAD_GATEWAY),
            (429, StatusCode::BAD_GATEWAY),
            (504, StatusCode::GATEWAY_TIMEOUT),
        ] {
            let (data, _) = state(Reply::Status(status));
            let app = actix_test::init_service(App::new().app_data(data).configure(configure)).await;

            let req = actix_test::TestRequest::get()
                .uri("/api/cafes?lat=0&lon=0")
                .to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), expected);

            let body: ApiError = actix_test::read_body_json(resp).await;
            assert_eq!(body.error, "Overpass request failed");
            assert!(body.details.is_some());
        }
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let app = actix_test::init_service(App::new().configure(configure)).await;
        let req = actix_test::TestRequest::get().uri("/api/health").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: ApiHealth = actix_test::read_body_json(resp).await;
        assert!(body.healthy);
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn rounds_fractional_radius() {
        let params = CafeQueryParams {
            lat: Some(0.0),
            lon: Some(0.0),
            radius: Some(1499.6),
        };
        assert_eq!(validate_params(&params, 4000).unwrap().1, 1500);

        let params = CafeQueryParams {
            radius: Some(0.4),
            ..params
        };
        assert!(validate_params(&params, 4000).is_err());
    }
}
