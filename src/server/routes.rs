//! HTTP routes
//!
//! Defines the map pages and JSON location endpoints.

use crate::client::ClientIdentity;
use crate::coord::Coordinates;
use crate::error::{Error, ProviderError};
use crate::format::html::{render_nearby_fragment, render_page, render_rejection};
use crate::format::json::{ErrorBody, LocationResponse};
use crate::server::state::AppState;

use axum::{
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(map_handler))
        .route("/mapa", get(map_handler))
        .route("/mapa_moteis", get(nearby_handler))
        .route("/my-location", get(my_location_handler))
        .route("/get_location", get(get_location_handler))
        .route("/api/status", get(status_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API error response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, code) = match &err {
            Error::Provider(e) => {
                let status = match e {
                    ProviderError::MissingKey(_) => StatusCode::INTERNAL_SERVER_ERROR,
                    _ => StatusCode::BAD_GATEWAY,
                };
                return ApiError {
                    status,
                    body: ErrorBody::from(e),
                };
            }
            Error::UnresolvableIdentity(_) => (StatusCode::BAD_REQUEST, "unresolvable_identity"),
            Error::InvalidCoordinates(_) => (StatusCode::BAD_REQUEST, "invalid_coordinates"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        ApiError {
            status,
            body: ErrorBody::new(err.to_string(), code),
        }
    }
}

/// Optional `lat`/`lng` query parameters
///
/// Kept as strings so a malformed value is ignored instead of rejected.
#[derive(Debug, Default, Deserialize)]
pub struct CoordsQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

impl CoordsQuery {
    /// Both values present and numeric, not range-checked
    pub fn parsed(&self) -> Option<Coordinates> {
        Some(Coordinates::new(parse_number(&self.lat)?, parse_number(&self.lng)?))
    }

    /// Both values present, numeric and in range
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_pair(parse_number(&self.lat), parse_number(&self.lng))
    }
}

fn parse_number(value: &Option<String>) -> Option<f64> {
    value.as_deref().and_then(|s| s.trim().parse().ok())
}

/// Optional `ip` query parameter
#[derive(Debug, Default, Deserialize)]
pub struct IpQuery {
    pub ip: Option<String>,
}

fn identity(
    headers: &HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> ClientIdentity {
    ClientIdentity::from_request(headers, connect_info.map(|ConnectInfo(addr)| addr))
}

/// Error response for the HTML endpoints
///
/// A rejected address gets a page; configuration problems stay JSON.
fn page_error(err: Error, identity: &ClientIdentity) -> Response {
    match err {
        Error::UnresolvableIdentity(_) => {
            (StatusCode::BAD_REQUEST, Html(render_rejection(identity))).into_response()
        }
        other => ApiError::from(other).into_response(),
    }
}

/// Map page for the requesting client
///
/// GET / and GET /mapa
async fn map_handler(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Query(query): Query<CoordsQuery>,
) -> Response {
    let identity = identity(&headers, connect_info);

    match state
        .pipeline
        .map_page(identity.clone(), query.coordinates())
        .await
    {
        Ok(report) => Html(render_page(&report, state.config())).into_response(),
        Err(e) => page_error(e, &identity),
    }
}

/// Nearby-lodging fragment
///
/// GET /mapa_moteis?lat=&lng=
async fn nearby_handler(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Query(query): Query<CoordsQuery>,
) -> Response {
    let identity = identity(&headers, connect_info);

    match state.pipeline.nearby(identity.clone(), query.parsed()).await {
        Ok(report) => Html(render_nearby_fragment(&report, state.config())).into_response(),
        Err(e) => page_error(e, &identity),
    }
}

/// Location of the requesting client
///
/// GET /my-location
async fn my_location_handler(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Result<Json<LocationResponse>, ApiError> {
    let identity = identity(&headers, connect_info);
    Ok(Json(state.pipeline.location(&identity).await?))
}

/// Location of `ip`, or of the requesting client when absent
///
/// GET /get_location?ip=
async fn get_location_handler(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Query(query): Query<IpQuery>,
) -> Result<Json<LocationResponse>, ApiError> {
    let identity = match query.ip.as_deref().map(str::trim).filter(|ip| !ip.is_empty()) {
        Some(ip) => ClientIdentity::new(ip),
        None => identity(&headers, connect_info),
    };
    Ok(Json(state.pipeline.location(&identity).await?))
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Primary geolocation provider
    pub geolocation: String,
    /// Secondary geolocation provider, if any
    pub fallback: Option<String>,
    /// Places provider
    pub places: String,
    /// Map renderer
    pub renderer: String,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let config = state.config();
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        geolocation: config.geolocation.provider.to_string(),
        fallback: config.geolocation.fallback.map(|kind| kind.to_string()),
        places: config.places.provider.to_string(),
        renderer: config.map.renderer.to_string(),
        uptime_secs: state.uptime_secs(),
    })
}
