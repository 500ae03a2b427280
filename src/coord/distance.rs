//! Great-circle distance
//!
//! Haversine formula on a sphere with the Earth's mean radius.

use crate::constants::geo::EARTH_RADIUS_KM;
use crate::coord::Coordinates;

/// Calculate the distance between two points in kilometers (Haversine formula)
///
/// # Arguments
/// * `p1` - First point
/// * `p2` - Second point
///
/// # Returns
/// Distance in kilometers
pub fn haversine_km(p1: Coordinates, p2: Coordinates) -> f64 {
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let delta_lat = (p2.lat - p1.lat).to_radians();
    let delta_lng = (p2.lng - p1.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Check if a point is within a circle
///
/// # Arguments
/// * `point` - Point to check
/// * `center` - Center of the circle
/// * `radius_km` - Radius in kilometers
pub fn is_within(point: Coordinates, center: Coordinates, radius_km: f64) -> bool {
    haversine_km(point, center) <= radius_km
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_one_degree_of_latitude() {
        let a = Coordinates::new(-23.5505, -46.6333);
        let b = Coordinates::new(-22.5505, -46.6333);

        assert_relative_eq!(haversine_km(a, b), 111.2, max_relative = 0.01);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let sao_paulo = Coordinates::new(-23.5505, -46.6333);
        let rio = Coordinates::new(-22.970722, -43.182365);

        assert_relative_eq!(haversine_km(sao_paulo, rio), haversine_km(rio, sao_paulo));
        // Roughly 360 km apart
        assert!((haversine_km(sao_paulo, rio) - 360.0).abs() < 10.0);
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = Coordinates::new(40.7128, -74.0060);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn test_is_within() {
        let center = Coordinates::new(40.7128, -74.0060);

        assert!(is_within(center, center, 1.0));
        // ~440m north
        assert!(is_within(Coordinates::new(40.7168, -74.0060), center, 1.0));
        // ~2.2km north
        assert!(!is_within(Coordinates::new(40.7328, -74.0060), center, 1.0));
    }
}
