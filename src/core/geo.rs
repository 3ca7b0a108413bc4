use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Spherical Earth radius in meters, matches the common haversine convention.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84-style latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinate {
    #[schema(example = 12.9716)]
    pub latitude: f64,
    #[schema(example = 77.5946)]
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Standard range check: latitude in [-90, 90], longitude in [-180, 180],
    /// both finite. Callers validate before handing coordinates to the
    /// distance math below.
    pub fn in_valid_range(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Great-circle distance in meters between two coordinates (haversine).
/// Inputs are not re-validated here.
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bangalore() -> Coordinate {
        Coordinate::new(12.9716, 77.5946)
    }

    #[test]
    fn distance_is_symmetric() {
        let a = bangalore();
        let b = Coordinate::new(12.9352, 77.6245);
        assert!((distance_meters(a, b) - distance_meters(b, a)).abs() < 1e-9);
    }

    #[test]
    fn distance_to_self_is_zero() {
        let a = bangalore();
        assert!(distance_meters(a, a).abs() < 1e-9);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let a = Coordinate::new(12.0, 77.0);
        let b = Coordinate::new(13.0, 77.0);
        let d = distance_meters(a, b);
        assert!((d - 111_194.9).abs() < 1.0, "got {d}");
    }

    #[test]
    fn range_check_rejects_out_of_bounds() {
        assert!(bangalore().in_valid_range());
        assert!(!Coordinate::new(91.0, 0.0).in_valid_range());
        assert!(!Coordinate::new(-91.0, 0.0).in_valid_range());
        assert!(!Coordinate::new(0.0, 180.5).in_valid_range());
        assert!(!Coordinate::new(f64::NAN, 0.0).in_valid_range());
    }
}
