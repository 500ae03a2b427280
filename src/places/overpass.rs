//! OpenStreetMap Overpass backend
//!
//! Queries nodes, ways and relations carrying the configured tag within the
//! search radius. Results are unordered.

use crate::coord::Coordinates;
use crate::error::ProviderError;
use crate::http::fetch_json;
use crate::places::{PlaceCandidate, PlaceQuery, PlacesBackend};
use serde::Deserialize;
use std::collections::HashMap;

/// Overpass backend
#[derive(Debug, Clone)]
pub struct OverpassBackend {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OsmElement>,
}

/// Nodes carry `lat`/`lon`; ways and relations carry `center` with `out center`
#[derive(Debug, Deserialize)]
struct OsmElement {
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<OsmCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OsmCenter {
    lat: f64,
    lon: f64,
}

impl OverpassBackend {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Turn `key=value` (or a bare `key`) into an Overpass tag filter
    fn tag_filter(tag: &str) -> String {
        let quote = |s: &str| s.trim().replace('\\', "\\\\").replace('"', "\\\"");
        match tag.split_once('=') {
            Some((key, value)) => format!("[\"{}\"=\"{}\"]", quote(key), quote(value)),
            None => format!("[\"{}\"]", quote(tag)),
        }
    }

    /// Build the Overpass QL query text
    pub fn build_query(query: &PlaceQuery) -> String {
        let filter = Self::tag_filter(&query.osm_tag);
        let around = format!(
            "(around:{},{},{})",
            query.radius_m, query.center.lat, query.center.lng
        );
        format!(
            "[out:json][timeout:25];(node{f}{a};way{f}{a};relation{f}{a};);out center;",
            f = filter,
            a = around
        )
    }

    fn parse(data: OverpassResponse) -> Vec<PlaceCandidate> {
        data.elements
            .into_iter()
            .filter_map(|mut element| {
                let coords = match (element.lat, element.lon, element.center) {
                    (Some(lat), Some(lon), _) => Coordinates::new(lat, lon),
                    (_, _, Some(center)) => Coordinates::new(center.lat, center.lon),
                    _ => return None,
                };
                Some(PlaceCandidate::new(element.tags.remove("name"), coords))
            })
            .collect()
    }
}

impl PlacesBackend for OverpassBackend {
    fn name(&self) -> &'static str {
        "overpass"
    }

    fn preserves_proximity_order(&self) -> bool {
        false
    }

    async fn search(&self, query: &PlaceQuery) -> Result<Vec<PlaceCandidate>, ProviderError> {
        let request = self
            .client
            .post(&self.base_url)
            .form(&[("data", Self::build_query(query))]);

        let data: OverpassResponse = fetch_json(request).await?;
        Ok(Self::parse(data))
    }
}
