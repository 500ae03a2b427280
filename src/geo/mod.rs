//! IP geolocation
//!
//! Turns a client address into an approximate position through one of three
//! third-party providers, with an optional single fallback provider.

pub mod ip_location;
pub mod ipapi;
pub mod ipgeolocation;
pub mod ipinfo;

use crate::coord::Coordinates;
use crate::error::ProviderError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use ip_location::{IpLocator, LocationOutcome};

/// A geolocated position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub coords: Coordinates,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    /// Which provider produced this position ("fallback" for the default)
    pub source: String,
}

impl GeoPosition {
    /// The fixed default position
    pub fn fallback() -> Self {
        Self::at(Coordinates::fallback(), "fallback")
    }

    /// A bare position with no place names
    pub fn at(coords: Coordinates, source: impl Into<String>) -> Self {
        Self {
            coords,
            city: None,
            region: None,
            country: None,
            source: source.into(),
        }
    }

    /// "City, Country" with placeholders for missing parts
    pub fn describe(&self) -> String {
        format!(
            "{}, {}",
            self.city.as_deref().unwrap_or("Unknown city"),
            self.country.as_deref().unwrap_or("Unknown country")
        )
    }
}

/// Supported geolocation providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoProviderKind {
    /// ipapi.co
    #[default]
    IpApi,
    /// ipinfo.io
    IpInfo,
    /// ipgeolocation.io
    IpGeolocation,
}

impl std::fmt::Display for GeoProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IpApi => write!(f, "ipapi"),
            Self::IpInfo => write!(f, "ipinfo"),
            Self::IpGeolocation => write!(f, "ipgeolocation"),
        }
    }
}

impl std::str::FromStr for GeoProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ipapi" | "ipapi.co" => Ok(Self::IpApi),
            "ipinfo" | "ipinfo.io" => Ok(Self::IpInfo),
            "ipgeolocation" | "ipgeolocation.io" => Ok(Self::IpGeolocation),
            _ => Err(format!("Unknown geolocation provider: {}", s)),
        }
    }
}

/// Trait for geolocation backends
pub trait GeoBackend: Send + Sync {
    /// Provider name, recorded as the position's source
    fn name(&self) -> &'static str;

    /// Look up the position of an IP address
    fn lookup(
        &self,
        ip: &str,
    ) -> impl std::future::Future<Output = Result<GeoPosition, ProviderError>> + Send;
}

/// Read a coordinate that may arrive as a JSON number or a numeric string
///
/// `null`, absent and non-numeric values are all None.
pub(crate) fn coordinate_value(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Turn a parsed latitude/longitude pair into validated coordinates
pub(crate) fn checked_coordinates(
    lat: Option<f64>,
    lng: Option<f64>,
) -> Result<Coordinates, ProviderError> {
    let (Some(lat), Some(lng)) = (lat, lng) else {
        return Err(ProviderError::MissingCoordinates);
    };

    let coords = Coordinates::new(lat, lng);
    coords
        .validate()
        .map_err(|e| ProviderError::InvalidCoordinates(e.to_string()))?;
    Ok(coords)
}

/// Drop empty place names
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
