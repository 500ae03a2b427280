//! Output formatters
//!
//! Turns a finished `MapReport` into a response body: an HTML map page, a
//! JSON document, plain text, or an external map link.

pub mod escape;
pub mod html;
pub mod json;
pub mod text;
pub mod url;

use crate::client::ClientIdentity;
use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::Result;
use crate::geo::LocationOutcome;
use crate::places::{PlaceSearch, Selection};
use serde::{Deserialize, Serialize};

/// Everything a formatter needs about one request
#[derive(Debug, Clone, Serialize)]
pub struct MapReport {
    pub identity: ClientIdentity,
    pub location: LocationOutcome,
    /// None when the places stage was not part of this request
    pub places: Option<PlaceSearch>,
    pub selection: Selection,
    /// What the map is centered on
    pub center: Coordinates,
    pub zoom: u8,
    /// Radius overlay drawn around the user position, in meters
    pub radius_m: Option<u32>,
}

/// Client-side map library
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapRenderer {
    /// Leaflet with OpenStreetMap tiles
    #[default]
    Leaflet,
    /// Google Maps JavaScript API
    Google,
}

impl std::fmt::Display for MapRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Leaflet => write!(f, "leaflet"),
            Self::Google => write!(f, "google"),
        }
    }
}

impl std::str::FromStr for MapRenderer {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "leaflet" | "osm" => Ok(Self::Leaflet),
            "google" | "google_maps" | "google-maps" => Ok(Self::Google),
            _ => Err(format!("Unknown map renderer: {}", s)),
        }
    }
}

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Format a report
    ///
    /// # Arguments
    /// * `report` - The finished request report
    /// * `config` - Application config (renderer, link providers, keys)
    fn format(&self, report: &MapReport, config: &Config) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "html" => Some(Box::new(html::HtmlFormatter)),
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        "url" => Some(Box::new(url::UrlFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    [
        Box::new(html::HtmlFormatter) as Box<dyn OutputFormatter>,
        Box::new(json::JsonFormatter),
        Box::new(text::TextFormatter),
        Box::new(url::UrlFormatter),
    ]
    .iter()
    .map(|f| FormatInfo {
        name: f.name().to_string(),
        description: f.description().to_string(),
    })
    .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_formatter() {
        assert!(get_formatter("html").is_some());
        assert!(get_formatter("json").is_some());
        assert!(get_formatter("text").is_some());
        assert!(get_formatter("url").is_some());
        assert!(get_formatter("gpx").is_none());
    }

    #[test]
    fn test_get_formatter_case_insensitive() {
        assert!(get_formatter("JSON").is_some());
        assert!(get_formatter("Html").is_some());
    }

    #[test]
    fn test_available_formats() {
        let formats = available_formats();
        assert_eq!(formats.len(), 4);
        assert!(formats.iter().any(|f| f.name == "html"));
        assert!(formats.iter().all(|f| !f.description.is_empty()));
    }

    #[test]
    fn test_renderer_parsing() {
        assert_eq!("leaflet".parse::<MapRenderer>(), Ok(MapRenderer::Leaflet));
        assert_eq!("Google".parse::<MapRenderer>(), Ok(MapRenderer::Google));
        assert!("bing".parse::<MapRenderer>().is_err());
    }
}
