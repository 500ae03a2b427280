//! Nearby-place finder
//!
//! Runs the configured backend, annotates distances, orders by proximity
//! when the backend does not, and applies the selection policy. Failures are
//! absorbed into an empty result.

use crate::config::Config;
use crate::coord::distance::is_within;
use crate::coord::{haversine_km, Coordinates};
use crate::error::ProviderError;
use crate::places::google::GooglePlacesBackend;
use crate::places::overpass::OverpassBackend;
use crate::places::{PlaceCandidate, PlaceQuery, PlacesBackend, PlacesProviderKind, Selection};
use serde::Serialize;
use tracing::{debug, warn};

/// A configured places provider
#[derive(Debug, Clone)]
pub enum PlacesProvider {
    Google(GooglePlacesBackend),
    Overpass(OverpassBackend),
}

impl PlacesProvider {
    pub fn new(kind: PlacesProviderKind, client: &reqwest::Client, config: &Config) -> Self {
        match kind {
            PlacesProviderKind::Google => Self::Google(GooglePlacesBackend::new(
                client.clone(),
                &config.endpoints.google_places,
                &config.api_keys.google_places,
            )),
            PlacesProviderKind::Overpass => {
                Self::Overpass(OverpassBackend::new(client.clone(), &config.endpoints.overpass))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Google(b) => b.name(),
            Self::Overpass(b) => b.name(),
        }
    }

    pub fn preserves_proximity_order(&self) -> bool {
        match self {
            Self::Google(b) => b.preserves_proximity_order(),
            Self::Overpass(b) => b.preserves_proximity_order(),
        }
    }

    pub async fn search(&self, query: &PlaceQuery) -> Result<Vec<PlaceCandidate>, ProviderError> {
        match self {
            Self::Google(b) => b.search(query).await,
            Self::Overpass(b) => b.search(query).await,
        }
    }
}

/// Outcome of the finder stage
#[derive(Debug, Clone, Serialize)]
pub struct PlaceSearch {
    pub candidates: Vec<PlaceCandidate>,
    /// Human-readable summary for the rendered page
    pub status: String,
    #[serde(skip)]
    pub error: Option<ProviderError>,
}

/// Finds lodging near a coordinate
#[derive(Debug, Clone)]
pub struct PlaceFinder {
    provider: PlacesProvider,
    radius_m: u32,
    keyword: String,
    osm_tag: String,
    max_results: usize,
}

impl PlaceFinder {
    /// Create the configured finder
    pub fn from_config(config: &Config, client: &reqwest::Client) -> Self {
        Self {
            provider: PlacesProvider::new(config.places.provider, client, config),
            radius_m: config.places.radius_m,
            keyword: config.places.keyword.clone(),
            osm_tag: config.places.osm_tag.clone(),
            max_results: config.places.max_results,
        }
    }

    /// Fail early when the provider cannot run at all
    pub fn check_configured(config: &Config) -> Result<(), ProviderError> {
        if config.places.provider == PlacesProviderKind::Google
            && config.api_keys.google_places.is_empty()
        {
            return Err(ProviderError::MissingKey("google_places"));
        }
        Ok(())
    }

    pub fn radius_m(&self) -> u32 {
        self.radius_m
    }

    /// Query the provider and return every candidate, nearest first
    pub async fn search(&self, center: Coordinates) -> Result<Vec<PlaceCandidate>, ProviderError> {
        let query = PlaceQuery {
            center,
            radius_m: self.radius_m,
            keyword: self.keyword.clone(),
            osm_tag: self.osm_tag.clone(),
        };

        let mut candidates = self.provider.search(&query).await?;
        for candidate in &mut candidates {
            candidate.distance_km = Some(haversine_km(center, candidate.coords));
        }

        if !self.provider.preserves_proximity_order() {
            // Way and relation centers can sit outside the searched circle
            let radius_km = f64::from(self.radius_m) / 1000.0;
            candidates.retain(|c| is_within(c.coords, center, radius_km));
            candidates.sort_by(|a, b| {
                a.distance_km
                    .unwrap_or(f64::INFINITY)
                    .total_cmp(&b.distance_km.unwrap_or(f64::INFINITY))
            });
        }

        debug!(
            provider = self.provider.name(),
            count = candidates.len(),
            "Places search finished"
        );
        Ok(candidates)
    }

    /// Search and apply `selection`, absorbing failures
    pub async fn find(&self, center: Coordinates, selection: Selection) -> PlaceSearch {
        match self.search(center).await {
            Ok(all) => {
                let found = all.len();
                let candidates = selection.apply(all, self.max_results);
                let status = self.describe(selection, found, &candidates);
                PlaceSearch {
                    candidates,
                    status,
                    error: None,
                }
            }
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    kind = e.kind(),
                    "Places search failed: {}",
                    e
                );
                PlaceSearch {
                    candidates: Vec::new(),
                    status: format!("No {} found nearby", self.keyword),
                    error: Some(e),
                }
            }
        }
    }

    fn describe(&self, selection: Selection, found: usize, selected: &[PlaceCandidate]) -> String {
        let keyword = &self.keyword;
        match (selection, selected.first()) {
            (_, None) if found == 0 => format!("No {} found nearby", keyword),
            (Selection::Second, None) => {
                format!("Could not find the second closest {}", keyword)
            }
            (_, None) => format!("No {} found nearby", keyword),
            (Selection::First, Some(c)) => format!("Closest {}: {}", keyword, c.name),
            (Selection::Second, Some(c)) => format!("Second closest {}: {}", keyword, c.name),
            (Selection::All, Some(_)) => format!("{} {} found nearby", selected.len(), keyword),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{client, offline_config, spawn_upstream};
    use axum::{routing::post, Json, Router};
    use serde_json::json;

    async fn overpass_finder(elements: serde_json::Value) -> PlaceFinder {
        let router = Router::new().route(
            "/",
            post(move || {
                let elements = elements.clone();
                async move { Json(json!({ "elements": elements })) }
            }),
        );
        let mut config = offline_config();
        config.endpoints.overpass = spawn_upstream(router).await;
        PlaceFinder::from_config(&config, &client())
    }

    #[tokio::test]
    async fn test_search_sorts_by_distance() {
        let finder = overpass_finder(json!([
            {"lat": -23.60, "lon": -46.6333, "tags": {"name": "Far"}},
            {"lat": -23.5510, "lon": -46.6333, "tags": {"name": "Near"}},
            {"center": {"lat": -23.56, "lon": -46.6333}, "tags": {"name": "Middle"}}
        ]))
        .await;

        let center = Coordinates::new(-23.5505, -46.6333);
        let places = finder.search(center).await.unwrap();
        let names: Vec<_> = places.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Near", "Middle", "Far"]);

        let distances: Vec<f64> = places.iter().map(|p| p.distance_km.unwrap()).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
        assert!(distances.iter().all(|d| *d >= 0.0));
    }

    #[tokio::test]
    async fn test_search_drops_centers_outside_radius() {
        let finder = overpass_finder(json!([
            {"lat": -23.5510, "lon": -46.6333, "tags": {"name": "Inside"}},
            {"center": {"lat": -25.0, "lon": -46.6333}, "tags": {"name": "Outside"}}
        ]))
        .await;

        let places = finder.search(Coordinates::new(-23.5505, -46.6333)).await.unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Inside");
    }

    #[tokio::test]
    async fn test_find_second() {
        let finder = overpass_finder(json!([
            {"lat": -23.5510, "lon": -46.6333, "tags": {"name": "Nearest"}},
            {"lat": -23.56, "lon": -46.6333, "tags": {"name": "Runner-up"}}
        ]))
        .await;

        let search = finder
            .find(Coordinates::new(-23.5505, -46.6333), Selection::Second)
            .await;
        assert_eq!(search.candidates.len(), 1);
        assert_eq!(search.candidates[0].name, "Runner-up");
        assert_eq!(search.status, "Second closest motel: Runner-up");
    }

    #[tokio::test]
    async fn test_find_second_with_single_result() {
        let finder = overpass_finder(json!([
            {"lat": -23.5510, "lon": -46.6333, "tags": {"name": "Only"}}
        ]))
        .await;

        let search = finder
            .find(Coordinates::new(-23.5505, -46.6333), Selection::Second)
            .await;
        assert!(search.candidates.is_empty());
        assert!(search.error.is_none());
        assert_eq!(search.status, "Could not find the second closest motel");
    }

    #[tokio::test]
    async fn test_find_zero_results() {
        let finder = overpass_finder(json!([])).await;
        let search = finder
            .find(Coordinates::new(-23.5505, -46.6333), Selection::All)
            .await;
        assert!(search.candidates.is_empty());
        assert_eq!(search.status, "No motel found nearby");
    }

    #[tokio::test]
    async fn test_find_absorbs_failure() {
        let finder = PlaceFinder::from_config(&offline_config(), &client());
        let search = finder
            .find(Coordinates::new(-23.5505, -46.6333), Selection::First)
            .await;
        assert!(search.candidates.is_empty());
        assert!(search.error.is_some());
        assert_eq!(search.status, "No motel found nearby");
    }

    #[tokio::test]
    async fn test_find_absorbs_timeout() {
        let router = Router::new().route(
            "/",
            post(|| async {
                tokio::time::sleep(std::time::Duration::from_secs(4)).await;
                Json(json!({"elements": []}))
            }),
        );
        let mut config = offline_config();
        config.http.timeout_secs = 1;
        config.endpoints.overpass = spawn_upstream(router).await;

        let client = crate::http::build_client(&config.http).unwrap();
        let finder = PlaceFinder::from_config(&config, &client);
        let search = finder
            .find(Coordinates::new(-23.5505, -46.6333), Selection::Second)
            .await;

        assert!(search.candidates.is_empty());
        assert_eq!(search.error, Some(ProviderError::Timeout));
        assert_eq!(search.status, "No motel found nearby");
    }

    #[test]
    fn test_check_configured() {
        let mut config = offline_config();
        assert!(PlaceFinder::check_configured(&config).is_ok());

        config.places.provider = PlacesProviderKind::Google;
        assert_eq!(
            PlaceFinder::check_configured(&config),
            Err(ProviderError::MissingKey("google_places"))
        );
    }
}
