//! ipinfo.io backend
//!
//! `GET {base}/{ip}/json`, token optional. Coordinates arrive combined as
//! `"loc": "lat,lng"`.

use crate::error::ProviderError;
use crate::geo::{checked_coordinates, non_empty, GeoBackend, GeoPosition};
use crate::http::fetch_json;
use serde::Deserialize;
use serde_json::Value;

/// ipinfo.io backend
#[derive(Debug, Clone)]
pub struct IpInfoBackend {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

/// ipinfo.io response
#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    loc: Option<String>,
    city: Option<String>,
    region: Option<String>,
    country: Option<String>,
    /// Set for private and reserved ranges
    #[serde(default)]
    bogon: bool,
    error: Option<Value>,
}

impl IpInfoBackend {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, token: &str) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            token: Some(token.to_string()).filter(|t| !t.is_empty()),
        }
    }

    /// Split a `"lat,lng"` string
    fn parse_loc(loc: &str) -> (Option<f64>, Option<f64>) {
        let mut parts = loc.split(',').map(|p| p.trim().parse::<f64>().ok());
        let lat = parts.next().flatten();
        let lng = parts.next().flatten();
        (lat, lng)
    }

    fn parse(data: IpInfoResponse) -> Result<GeoPosition, ProviderError> {
        if let Some(error) = data.error {
            let message = error
                .get("message")
                .or_else(|| error.get("title"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(ProviderError::Upstream(message));
        }
        if data.bogon {
            return Err(ProviderError::Upstream("bogon address".to_string()));
        }

        let (lat, lng) = data
            .loc
            .as_deref()
            .map(Self::parse_loc)
            .unwrap_or((None, None));
        let coords = checked_coordinates(lat, lng)?;

        Ok(GeoPosition {
            coords,
            city: non_empty(data.city),
            region: non_empty(data.region),
            country: non_empty(data.country),
            source: "ipinfo".to_string(),
        })
    }
}

impl GeoBackend for IpInfoBackend {
    fn name(&self) -> &'static str {
        "ipinfo"
    }

    async fn lookup(&self, ip: &str) -> Result<GeoPosition, ProviderError> {
        let url = format!(
            "{}/{}/json",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(ip)
        );

        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.query(&[("token", token)]);
        }

        let data: IpInfoResponse = fetch_json(request).await?;
        Self::parse(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{client, spawn_upstream};
    use axum::{extract::Query, routing::get, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    fn parse(value: Value) -> Result<GeoPosition, ProviderError> {
        IpInfoBackend::parse(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn test_parse_loc() {
        assert_eq!(
            IpInfoBackend::parse_loc("-23.5475,-46.6361"),
            (Some(-23.5475), Some(-46.6361))
        );
        assert_eq!(IpInfoBackend::parse_loc("garbage"), (None, None));
        assert_eq!(IpInfoBackend::parse_loc("12.5"), (Some(12.5), None));
    }

    #[test]
    fn test_parse_success() {
        let position = parse(json!({
            "ip": "8.8.8.8",
            "city": "Mountain View",
            "region": "California",
            "country": "US",
            "loc": "37.4056,-122.0775"
        }))
        .unwrap();

        assert_eq!(position.coords.lat, 37.4056);
        assert_eq!(position.coords.lng, -122.0775);
        assert_eq!(position.region.as_deref(), Some("California"));
        assert_eq!(position.country.as_deref(), Some("US"));
    }

    #[test]
    fn test_parse_missing_loc() {
        let result = parse(json!({"ip": "8.8.8.8", "city": "Nowhere"}));
        assert_eq!(result, Err(ProviderError::MissingCoordinates));
    }

    #[test]
    fn test_parse_bogon() {
        let result = parse(json!({"ip": "10.0.0.1", "bogon": true}));
        assert!(matches!(result, Err(ProviderError::Upstream(_))));
    }

    #[test]
    fn test_parse_error_object() {
        let result = parse(json!({
            "status": 404,
            "error": {"title": "Wrong ip", "message": "Please provide a valid IP address"}
        }));
        assert_eq!(
            result,
            Err(ProviderError::Upstream("Please provide a valid IP address".to_string()))
        );
    }

    #[tokio::test]
    async fn test_lookup_sends_token() {
        let router = Router::new().route(
            "/:ip/json",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let city = if params.get("token").map(String::as_str) == Some("tok") {
                    "Authorized"
                } else {
                    "Anonymous"
                };
                Json(json!({"loc": "1.5,2.5", "city": city, "country": "XX"}))
            }),
        );
        let base = spawn_upstream(router).await;

        let backend = IpInfoBackend::new(client(), base.clone(), "tok");
        let position = backend.lookup("198.51.100.1").await.unwrap();
        assert_eq!(position.city.as_deref(), Some("Authorized"));

        let backend = IpInfoBackend::new(client(), base, "");
        let position = backend.lookup("198.51.100.1").await.unwrap();
        assert_eq!(position.city.as_deref(), Some("Anonymous"));
    }
}
