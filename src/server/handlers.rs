use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::location::{
    extract, AddressComponent, CityMatchResult, GeoError, GeocodeResult, PlaceQuery, Position,
    PositionInput,
};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

#[derive(Debug)]
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

impl From<GeoError> for ApiError {
    fn from(e: GeoError) -> Self {
        let status = match e {
            GeoError::NotFound { .. } => StatusCode::NOT_FOUND,
            GeoError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            GeoError::CapabilityUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GeoError::Network(_) | GeoError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
        };
        ApiError(status, e.to_string())
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── Query parameters ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PlaceParams {
    pub place_id: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl PlaceParams {
    fn position(&self) -> Result<Option<Position>, ApiError> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => {
                let pos = Position::new(lat, lon);
                if !pos.is_valid() {
                    return Err(api_error(
                        StatusCode::BAD_REQUEST,
                        "Invalid coordinates. Lat: -90..90, Lon: -180..180",
                    ));
                }
                Ok(Some(pos))
            }
            (None, None) => Ok(None),
            _ => Err(api_error(StatusCode::BAD_REQUEST, "Provide both 'lat' and 'lon'")),
        }
    }

    fn place_id(&self) -> Option<&str> {
        self.place_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    /// Coordinates win over a place identifier when both are given.
    fn query(&self) -> Result<PlaceQuery, ApiError> {
        if let Some(pos) = self.position()? {
            return Ok(PlaceQuery::ByLocation(pos));
        }
        self.place_id()
            .map(|id| PlaceQuery::ByPlaceId(id.to_string()))
            .ok_or_else(|| {
                api_error(StatusCode::BAD_REQUEST, "Provide 'place_id' or 'lat'+'lon' parameters")
            })
    }
}

// ─── GET /api/position ───────────────────────────────────────────

pub async fn position(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PlaceParams>,
) -> Result<Json<Position>, ApiError> {
    let start = Instant::now();

    let input = match params.position()? {
        Some(pos) => Some(PositionInput::Position(pos)),
        None => params.place_id().map(PositionInput::from),
    };
    let resolved = state.resolver.resolve(input).await?;

    log::info!(
        "GET /api/position -> {} ({:.1}ms)",
        resolved,
        start.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(Json(resolved))
}

// ─── GET /api/geocode ────────────────────────────────────────────

pub async fn geocode(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PlaceParams>,
) -> Result<Json<Vec<GeocodeResult>>, ApiError> {
    let start = Instant::now();
    let query = params.query()?;
    let label = query.to_string();

    let results = state.geocoder.geocode(query).await?;

    log::info!(
        "GET /api/geocode {} -> {} results ({:.1}ms)",
        label,
        results.len(),
        start.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(Json(results))
}

// ─── GET /api/component ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct ComponentParams {
    #[serde(rename = "type")]
    pub type_tag: String,
    pub place_id: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

pub async fn component(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ComponentParams>,
) -> Result<Json<Option<AddressComponent>>, ApiError> {
    let place = PlaceParams {
        place_id: params.place_id,
        lat: params.lat,
        lon: params.lon,
    };
    let query = place.query()?;
    let results = state.geocoder.geocode(query).await?;
    Ok(Json(extract(&results, &params.type_tag).cloned()))
}

// ─── GET /api/same-city ──────────────────────────────────────────

pub async fn same_city(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PlaceParams>,
) -> Result<Json<CityMatchResult>, ApiError> {
    let start = Instant::now();
    let current = params
        .position()?
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Missing 'lat'+'lon' parameters"))?;
    let place_id = params
        .place_id()
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Missing 'place_id' parameter"))?;

    let result = state.matcher.same_city(place_id, current).await;

    log::info!(
        "GET /api/same-city place_id={} at {} -> same={} ({:.1}ms)",
        place_id,
        current,
        result.same,
        start.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::test_support::{result_with_locality, ScriptedProvider};
    use crate::location::types::GeocodeResponse;
    use crate::location::{Geocoder, PositionResolver};

    fn state(provider: &Arc<ScriptedProvider>) -> State<Arc<AppState>> {
        let geocoder = Geocoder::new(provider.clone());
        let resolver = PositionResolver::new(geocoder.clone());
        State(Arc::new(AppState::new(geocoder, resolver)))
    }

    fn params(place_id: Option<&str>, lat: Option<f64>, lon: Option<f64>) -> Query<PlaceParams> {
        Query(PlaceParams {
            place_id: place_id.map(str::to_string),
            lat,
            lon,
        })
    }

    fn cairo_provider() -> Arc<ScriptedProvider> {
        let provider = Arc::new(ScriptedProvider::new());
        provider.respond(
            PlaceQuery::ByPlaceId("place-42".into()),
            GeocodeResponse::ok(vec![result_with_locality(Position::new(30.0, 31.2), "Cairo")]),
        );
        provider.respond(
            PlaceQuery::ByLocation(Position::new(30.05, 31.25)),
            GeocodeResponse::ok(vec![result_with_locality(Position::new(30.05, 31.25), "Cairo")]),
        );
        provider
    }

    #[tokio::test]
    async fn test_position_from_place_id() {
        let provider = cairo_provider();
        let Json(pos) = position(state(&provider), params(Some("place-42"), None, None))
            .await
            .unwrap();
        assert_eq!(pos, Position::new(30.0, 31.2));
    }

    #[tokio::test]
    async fn test_position_without_input_is_fallback() {
        let provider = cairo_provider();
        let Json(pos) = position(state(&provider), params(None, None, None)).await.unwrap();
        assert_eq!(pos, Position::new(35.0, 33.0));
    }

    #[tokio::test]
    async fn test_position_rejects_bad_coordinates() {
        let provider = cairo_provider();
        let err = position(state(&provider), params(None, Some(120.0), Some(0.0)))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_geocode_not_found_is_404() {
        let provider = cairo_provider();
        let err = geocode(state(&provider), params(Some("unknown"), None, None))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_geocode_requires_a_query() {
        let provider = cairo_provider();
        let err = geocode(state(&provider), params(Some("  "), None, None))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_component_lookup() {
        let provider = cairo_provider();
        let Json(found) = component(
            state(&provider),
            Query(ComponentParams {
                type_tag: "locality".into(),
                place_id: Some("place-42".into()),
                lat: None,
                lon: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(found.unwrap().long_name, "Cairo");
    }

    #[tokio::test]
    async fn test_same_city_endpoint() {
        let provider = cairo_provider();
        let Json(result) = same_city(state(&provider), params(Some("place-42"), Some(30.05), Some(31.25)))
            .await
            .unwrap();
        assert!(result.same);

        let err = same_city(state(&provider), params(Some("place-42"), None, None))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_geo_error_status_mapping() {
        let not_found: ApiError = GeoError::NotFound {
            query: "place_id=x".into(),
            status: "ZERO_RESULTS".into(),
        }
        .into();
        assert_eq!(not_found.0, StatusCode::NOT_FOUND);
        let upstream: ApiError = GeoError::Network("reset".into()).into();
        assert_eq!(upstream.0, StatusCode::BAD_GATEWAY);
    }
}
