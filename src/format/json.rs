//! JSON output
//!
//! Wire shapes for the JSON endpoints and the `json` formatter.

use crate::config::Config;
use crate::error::{ProviderError, Result};
use crate::format::{MapReport, OutputFormatter};
use crate::geo::GeoPosition;
use crate::places::PlaceCandidate;
use serde::{Deserialize, Serialize};

/// Location block of a successful response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationBody {
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&GeoPosition> for LocationBody {
    fn from(position: &GeoPosition) -> Self {
        Self {
            city: position.city.clone(),
            region: position.region.clone(),
            country: position.country.clone(),
            latitude: position.coords.lat,
            longitude: position.coords.lng,
        }
    }
}

/// Successful location response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationResponse {
    pub your_ip: String,
    pub location: LocationBody,
    /// Provider that produced the position
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub places: Option<Vec<PlaceCandidate>>,
}

impl LocationResponse {
    pub fn new(ip: &str, position: &GeoPosition) -> Self {
        Self {
            your_ip: ip.to_string(),
            location: LocationBody::from(position),
            source: position.source.clone(),
            places: None,
        }
    }

    /// Build from a finished report, including any selected places
    pub fn from_report(report: &MapReport) -> Self {
        let mut response = Self::new(&report.identity.ip_address, &report.location.position);
        response.places = report.places.as_ref().map(|p| p.candidates.clone());
        response
    }
}

/// Failure response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

impl From<&ProviderError> for ErrorBody {
    fn from(err: &ProviderError) -> Self {
        Self::new(err.to_string(), err.kind())
    }
}

/// JSON formatter - outputs the location and places as pretty-printed JSON
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Location and places as JSON"
    }

    fn format(&self, report: &MapReport, _config: &Config) -> Result<String> {
        Ok(serde_json::to_string_pretty(&LocationResponse::from_report(report))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::fixtures::{place, report};
    use crate::places::Selection;
    use serde_json::json;

    #[test]
    fn test_location_response_shape() {
        let report = report(Vec::new(), Selection::Second);
        let mut response = LocationResponse::from_report(&report);
        response.places = None;

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "your_ip": "203.0.113.5",
                "location": {
                    "city": "São Paulo",
                    "region": "São Paulo",
                    "country": "Brazil",
                    "latitude": -23.5,
                    "longitude": -46.6
                },
                "source": "ipapi"
            })
        );
    }

    #[test]
    fn test_region_omitted_when_unknown() {
        let mut report = report(Vec::new(), Selection::Second);
        report.location.position.region = None;
        let value = serde_json::to_value(LocationResponse::from_report(&report)).unwrap();
        assert!(value["location"].get("region").is_none());
        assert_eq!(value["location"]["city"], "São Paulo");
    }

    #[test]
    fn test_json_format_includes_places() {
        let report = report(vec![place("Motel Alpha", -23.51, -46.61)], Selection::First);
        let output = JsonFormatter.format(&report, &Config::default()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["your_ip"], "203.0.113.5");
        assert_eq!(parsed["places"][0]["name"], "Motel Alpha");
        assert_eq!(parsed["places"][0]["distance_km"], 1.25);
    }

    #[test]
    fn test_error_body_from_provider_error() {
        let body = ErrorBody::from(&ProviderError::MissingKey("ipgeolocation"));
        assert_eq!(body.code, "missing_key");
        assert_eq!(body.error, "missing API key for ipgeolocation");
    }

    #[test]
    fn test_json_formatter_info() {
        assert_eq!(JsonFormatter.name(), "json");
        assert!(!JsonFormatter.description().is_empty());
    }
}
