//! ipgeolocation.io backend
//!
//! `GET {base}?apiKey=...&ip=...`. Requires a key; coordinates arrive as
//! strings.

use crate::error::ProviderError;
use crate::geo::{checked_coordinates, coordinate_value, non_empty, GeoBackend, GeoPosition};
use crate::http::fetch_json;
use serde::Deserialize;
use serde_json::Value;

/// ipgeolocation.io backend
#[derive(Debug, Clone)]
pub struct IpGeolocationBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct IpGeolocationResponse {
    latitude: Option<Value>,
    longitude: Option<Value>,
    city: Option<String>,
    state_prov: Option<String>,
    country_name: Option<String>,
    /// Present on error responses
    message: Option<String>,
}

impl IpGeolocationBackend {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.to_string(),
        }
    }

    fn parse(data: IpGeolocationResponse) -> Result<GeoPosition, ProviderError> {
        let lat = coordinate_value(data.latitude.as_ref());
        let lng = coordinate_value(data.longitude.as_ref());

        if lat.is_none() {
            if let Some(message) = data.message {
                return Err(ProviderError::Upstream(message));
            }
        }

        Ok(GeoPosition {
            coords: checked_coordinates(lat, lng)?,
            city: non_empty(data.city),
            region: non_empty(data.state_prov),
            country: non_empty(data.country_name),
            source: "ipgeolocation".to_string(),
        })
    }
}

impl GeoBackend for IpGeolocationBackend {
    fn name(&self) -> &'static str {
        "ipgeolocation"
    }

    async fn lookup(&self, ip: &str) -> Result<GeoPosition, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingKey("ipgeolocation"));
        }

        let request = self
            .client
            .get(&self.base_url)
            .query(&[("apiKey", self.api_key.as_str()), ("ip", ip)]);

        let data: IpGeolocationResponse = fetch_json(request).await?;
        Self::parse(data)
    }
}
