use serde::{Deserialize, Serialize};

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.7613;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusCheck {
    pub distance_miles: f64,
    pub allowed: bool,
}

/// Great-circle distance between two points (haversine).
pub fn haversine_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.clamp(0.0, 1.0).sqrt().asin()
}

/// Admits `point` when it lies within `radius_miles` of `center`, boundary inclusive.
pub fn within_radius(point: GeoPoint, center: GeoPoint, radius_miles: f64) -> RadiusCheck {
    let distance_miles = haversine_miles(point, center);
    RadiusCheck {
        distance_miles,
        allowed: distance_miles <= radius_miles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: GeoPoint = GeoPoint::new(34.14352, -84.29926);

    #[test]
    fn test_distance_to_self_is_zero() {
        assert_eq!(haversine_miles(CENTER, CENTER), 0.0);
        let check = within_radius(CENTER, CENTER, 20.0);
        assert!(check.allowed);
        assert_eq!(check.distance_miles, 0.0);
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let d = haversine_miles(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0));
        assert!((d - 69.0934).abs() < 0.001, "got {d}");
    }

    #[test]
    fn test_distance_is_symmetric() {
        let other = GeoPoint::new(33.749, -84.388);
        let d1 = haversine_miles(CENTER, other);
        let d2 = haversine_miles(other, CENTER);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let point = GeoPoint::new(34.0, -84.0);
        let exact = haversine_miles(point, CENTER);
        assert!(within_radius(point, CENTER, exact).allowed);
        assert!(!within_radius(point, CENTER, exact - 1e-9).allowed);
    }

    #[test]
    fn test_nearby_point_inside_twenty_miles() {
        let check = within_radius(GeoPoint::new(34.0, -84.0), CENTER, 20.0);
        assert!((check.distance_miles - 19.79).abs() < 0.01, "got {}", check.distance_miles);
        assert!(check.allowed);
    }

    #[test]
    fn test_atlanta_outside_twenty_miles() {
        let check = within_radius(GeoPoint::new(33.749, -84.388), CENTER, 20.0);
        assert!((check.distance_miles - 27.73).abs() < 0.01, "got {}", check.distance_miles);
        assert!(!check.allowed);
    }
}
