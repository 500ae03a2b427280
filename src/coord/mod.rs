//! Geographic coordinates
//!
//! This module handles:
//! - The WGS84 coordinate pair shared by every stage
//! - Range validation
//! - Great-circle distance between two coordinates

pub mod distance;

use serde::{Deserialize, Serialize};

pub use distance::haversine_km;

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// The fixed coordinate used whenever no real position is known
    pub fn fallback() -> Self {
        Self::new(
            crate::constants::geo::FALLBACK_LAT,
            crate::constants::geo::FALLBACK_LNG,
        )
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }

    /// Build validated coordinates from an optional pair
    ///
    /// Returns None unless both parts are present and in range.
    pub fn from_pair(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        let coords = Self::new(lat?, lng?);
        coords.validate().ok().map(|_| coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(Coordinates::new(-23.5505, -46.6333).validate().is_ok());
        assert!(Coordinates::new(90.0, 180.0).validate().is_ok());
        assert!(Coordinates::new(91.0, 0.0).validate().is_err());
        assert!(Coordinates::new(0.0, -180.5).validate().is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn test_from_pair() {
        assert_eq!(
            Coordinates::from_pair(Some(-23.5), Some(-46.6)),
            Some(Coordinates::new(-23.5, -46.6))
        );
        assert_eq!(Coordinates::from_pair(Some(-23.5), None), None);
        assert_eq!(Coordinates::from_pair(Some(123.0), Some(0.0)), None);
    }

    #[test]
    fn test_fallback_is_copacabana() {
        let fallback = Coordinates::fallback();
        assert_eq!(fallback.lat, -22.970722);
        assert_eq!(fallback.lng, -43.182365);
        assert!(fallback.validate().is_ok());
    }
}
