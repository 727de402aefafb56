//! Great-circle math on WGS84 coordinates.
//!
//! Nothing here validates ranges; callers build coordinates through
//! `Coordinate::new` when input comes from the user.

use crate::model::Coordinate;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Approximate length of one degree of latitude.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Haversine distance between two points.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lon1) = (a.latitude.to_radians(), a.longitude.to_radians());
    let (lat2, lon2) = (b.latitude.to_radians(), b.longitude.to_radians());

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    // Rounding can push h marginally past 1 for antipodal points.
    2.0 * h.sqrt().min(1.0).asin() * EARTH_RADIUS_KM
}

/// Degree deltas `(lat_delta, lon_delta)` covering `radius_km` around `center`.
///
/// The longitude delta is widened by `1 / cos(latitude)` for meridian
/// convergence and capped at 180 degrees near the poles.
pub fn bounding_box(center: Coordinate, radius_km: f64) -> (f64, f64) {
    let lat_delta = radius_km / KM_PER_DEGREE;
    let cos_lat = center.latitude.to_radians().cos();
    let lon_delta = if cos_lat <= f64::EPSILON {
        180.0
    } else {
        (radius_km / (KM_PER_DEGREE * cos_lat)).min(180.0)
    };
    (lat_delta, lon_delta)
}

/// Rectangle used by providers that only support bbox queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn around(center: Coordinate, radius_km: f64) -> Self {
        let (lat_delta, lon_delta) = bounding_box(center, radius_km);
        Self {
            min_lat: center.latitude - lat_delta,
            min_lon: center.longitude - lon_delta,
            max_lat: center.latitude + lat_delta,
            max_lon: center.longitude + lon_delta,
        }
    }

    /// `minlat,minlon,maxlat,maxlon`, the order bbox query parameters expect.
    pub fn to_query(&self) -> String {
        format!("{},{},{},{}", self.min_lat, self.min_lon, self.max_lat, self.max_lon)
    }
}
