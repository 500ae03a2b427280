//! Google Places Nearby Search backend
//!
//! Results come back ordered by prominence/proximity; the finder keeps that
//! order.

use crate::coord::Coordinates;
use crate::error::ProviderError;
use crate::http::fetch_json;
use crate::places::{PlaceCandidate, PlaceQuery, PlacesBackend};
use serde::Deserialize;

/// Google Places backend
#[derive(Debug, Clone)]
pub struct GooglePlacesBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<NearbyResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NearbyResult {
    name: Option<String>,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl GooglePlacesBackend {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.to_string(),
        }
    }

    fn parse(data: NearbySearchResponse) -> Result<Vec<PlaceCandidate>, ProviderError> {
        match data.status.as_str() {
            "OK" => Ok(data
                .results
                .into_iter()
                .filter_map(|r| {
                    let location = r.geometry?.location;
                    Some(PlaceCandidate::new(
                        r.name,
                        Coordinates::new(location.lat, location.lng),
                    ))
                })
                .collect()),
            "ZERO_RESULTS" => Ok(Vec::new()),
            other => Err(ProviderError::Upstream(match data.error_message {
                Some(message) => format!("{}: {}", other, message),
                None => other.to_string(),
            })),
        }
    }
}

impl PlacesBackend for GooglePlacesBackend {
    fn name(&self) -> &'static str {
        "google"
    }

    fn preserves_proximity_order(&self) -> bool {
        true
    }

    async fn search(&self, query: &PlaceQuery) -> Result<Vec<PlaceCandidate>, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingKey("google_places"));
        }

        let location = format!("{},{}", query.center.lat, query.center.lng);
        let radius = query.radius_m.to_string();
        let request = self.client.get(&self.base_url).query(&[
            ("location", location.as_str()),
            ("radius", radius.as_str()),
            ("keyword", query.keyword.as_str()),
            ("type", "lodging"),
            ("key", self.api_key.as_str()),
        ]);

        let data: NearbySearchResponse = fetch_json(request).await?;
        Self::parse(data)
    }
}
