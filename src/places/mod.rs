//! Nearby place search
//!
//! Finds lodging around a coordinate through Google Places or the
//! OpenStreetMap Overpass API, annotates each result with its distance from
//! the search center and applies a selection policy.

pub mod finder;
pub mod google;
pub mod overpass;

use crate::coord::Coordinates;
use crate::error::ProviderError;
use serde::{Deserialize, Serialize};

pub use finder::{PlaceFinder, PlaceSearch};

/// Name used when a provider result has none
pub const UNNAMED_PLACE: &str = "Unnamed lodging";

/// A place returned by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub name: String,
    pub coords: Coordinates,
    /// Great-circle distance from the search center
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl PlaceCandidate {
    /// Create a candidate, substituting a placeholder for a blank name
    pub fn new(name: Option<String>, coords: Coordinates) -> Self {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNNAMED_PLACE.to_string());
        Self {
            name,
            coords,
            distance_km: None,
        }
    }
}

/// Parameters of a nearby search
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceQuery {
    pub center: Coordinates,
    pub radius_m: u32,
    /// Free-text keyword for keyword-search providers
    pub keyword: String,
    /// `key=value` tag for OSM providers
    pub osm_tag: String,
}

/// Supported places providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacesProviderKind {
    /// Google Places Nearby Search
    Google,
    /// OpenStreetMap Overpass
    #[default]
    Overpass,
}

impl std::fmt::Display for PlacesProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Google => write!(f, "google"),
            Self::Overpass => write!(f, "overpass"),
        }
    }
}

impl std::str::FromStr for PlacesProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" | "google_places" | "google-places" => Ok(Self::Google),
            "overpass" | "osm" => Ok(Self::Overpass),
            _ => Err(format!("Unknown places provider: {}", s)),
        }
    }
}

/// Which candidates are kept from the (proximity-ordered) result list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// The nearest result
    First,
    /// The second-nearest result, skipping the nearest
    #[default]
    Second,
    /// Every result, up to a maximum count
    All,
}

impl Selection {
    /// Apply the policy to an ordered list
    ///
    /// Too few results for the policy yields an empty list.
    pub fn apply(
        self,
        mut candidates: Vec<PlaceCandidate>,
        max_results: usize,
    ) -> Vec<PlaceCandidate> {
        match self {
            Self::First => candidates.into_iter().take(1).collect(),
            Self::Second => {
                if candidates.len() < 2 {
                    Vec::new()
                } else {
                    vec![candidates.swap_remove(1)]
                }
            }
            Self::All => {
                candidates.truncate(max_results);
                candidates
            }
        }
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => write!(f, "first"),
            Self::Second => write!(f, "second"),
            Self::All => write!(f, "all"),
        }
    }
}

impl std::str::FromStr for Selection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" | "nearest" => Ok(Self::First),
            "second" => Ok(Self::Second),
            "all" => Ok(Self::All),
            _ => Err(format!("Unknown selection policy: {}", s)),
        }
    }
}

/// Trait for places backends
pub trait PlacesBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether results already come back nearest-first
    fn preserves_proximity_order(&self) -> bool;

    /// Search around `query.center`
    fn search(
        &self,
        query: &PlaceQuery,
    ) -> impl std::future::Future<Output = Result<Vec<PlaceCandidate>, ProviderError>> + Send;
}
