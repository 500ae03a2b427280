//! ipapi.co backend
//!
//! `GET {base}/{ip}/json/`, no key required.

use crate::error::ProviderError;
use crate::geo::{checked_coordinates, coordinate_value, non_empty, GeoBackend, GeoPosition};
use crate::http::fetch_json;
use serde::Deserialize;
use serde_json::Value;

/// ipapi.co backend
#[derive(Debug, Clone)]
pub struct IpApiBackend {
    client: reqwest::Client,
    base_url: String,
}

/// ipapi.co response
///
/// Errors come back as `{"error": true, "reason": "..."}`, sometimes with a
/// 200 status.
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    error: bool,
    reason: Option<String>,
    latitude: Option<Value>,
    longitude: Option<Value>,
    city: Option<String>,
    region: Option<String>,
    country_name: Option<String>,
}

impl IpApiBackend {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, ip: &str) -> String {
        format!(
            "{}/{}/json/",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(ip)
        )
    }

    fn parse(data: IpApiResponse) -> Result<GeoPosition, ProviderError> {
        if data.error {
            return Err(ProviderError::Upstream(
                data.reason.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        let coords = checked_coordinates(
            coordinate_value(data.latitude.as_ref()),
            coordinate_value(data.longitude.as_ref()),
        )?;

        Ok(GeoPosition {
            coords,
            city: non_empty(data.city),
            region: non_empty(data.region),
            country: non_empty(data.country_name),
            source: "ipapi".to_string(),
        })
    }
}

impl GeoBackend for IpApiBackend {
    fn name(&self) -> &'static str {
        "ipapi"
    }

    async fn lookup(&self, ip: &str) -> Result<GeoPosition, ProviderError> {
        let data: IpApiResponse = fetch_json(self.client.get(self.url(ip))).await?;
        Self::parse(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{client, spawn_upstream};
    use axum::{extract::Path, routing::get, Json, Router};
    use serde_json::json;

    fn parse(value: Value) -> Result<GeoPosition, ProviderError> {
        IpApiBackend::parse(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn test_parse_success() {
        let position = parse(json!({
            "ip": "203.0.113.5",
            "latitude": -23.5,
            "longitude": -46.6,
            "city": "São Paulo",
            "region": "São Paulo",
            "country_name": "Brazil"
        }))
        .unwrap();

        assert_eq!(position.coords.lat, -23.5);
        assert_eq!(position.coords.lng, -46.6);
        assert_eq!(position.city.as_deref(), Some("São Paulo"));
        assert_eq!(position.country.as_deref(), Some("Brazil"));
        assert_eq!(position.source, "ipapi");
    }

    #[test]
    fn test_parse_null_latitude() {
        let result = parse(json!({"latitude": null, "longitude": -46.6, "city": "X"}));
        assert_eq!(result, Err(ProviderError::MissingCoordinates));
    }

    #[test]
    fn test_parse_reported_error() {
        let result = parse(json!({
            "ip": "127.0.0.1",
            "error": true,
            "reason": "Reserved IP Address",
            "reserved": true
        }));
        assert_eq!(
            result,
            Err(ProviderError::Upstream("Reserved IP Address".to_string()))
        );
    }

    #[test]
    fn test_url() {
        let backend = IpApiBackend::new(client(), "https://ipapi.co/");
        assert_eq!(backend.url("8.8.8.8"), "https://ipapi.co/8.8.8.8/json/");
    }

    #[tokio::test]
    async fn test_lookup_against_double() {
        let router = Router::new().route(
            "/:ip/json/",
            get(|Path(ip): Path<String>| async move {
                Json(json!({
                    "ip": ip,
                    "latitude": 48.8566,
                    "longitude": 2.3522,
                    "city": "Paris",
                    "country_name": "France"
                }))
            }),
        );
        let base = spawn_upstream(router).await;

        let backend = IpApiBackend::new(client(), base);
        let position = backend.lookup("198.51.100.1").await.unwrap();
        assert_eq!(position.city.as_deref(), Some("Paris"));
        assert_eq!(position.coords.lat, 48.8566);
    }

    #[tokio::test]
    async fn test_lookup_rate_limited() {
        let router = Router::new().route(
            "/:ip/json/",
            get(|| async {
                (
                    axum::http::StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({"error": true, "reason": "RateLimited"})),
                )
            }),
        );
        let base = spawn_upstream(router).await;

        let backend = IpApiBackend::new(client(), base);
        assert_eq!(
            backend.lookup("198.51.100.1").await,
            Err(ProviderError::Status(429))
        );
    }
}
