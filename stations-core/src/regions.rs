//! Coarse geographic envelopes used to skip providers that cannot cover a
//! target before any request is made.

use crate::model::Coordinate;

/// A named rectangle, bbox ordered `[min_lon, min_lat, max_lon, max_lat]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub id: &'static str,
    pub name: &'static str,
    pub bbox: [f64; 4],
    pub description: &'static str,
}

impl Region {
    /// Inclusive containment. A box with `min_lon > max_lon` wraps across
    /// the antimeridian.
    pub fn contains(&self, point: Coordinate) -> bool {
        let [min_lon, min_lat, max_lon, max_lat] = self.bbox;
        if !(min_lat..=max_lat).contains(&point.latitude) {
            return false;
        }
        if min_lon <= max_lon {
            (min_lon..=max_lon).contains(&point.longitude)
        } else {
            point.longitude >= min_lon || point.longitude <= max_lon
        }
    }
}

/// True if any of `regions` contains `point`.
pub fn covers(regions: &[Region], point: Coordinate) -> bool {
    regions.iter().any(|region| region.contains(point))
}

/// Where api.weather.gov can resolve a grid point.
pub const NWS_ENVELOPES: &[Region] = &[
    Region {
        id: "CONUS",
        name: "Continental United States",
        bbox: [-125.0, 24.0, -67.0, 50.0],
        description: "Lower 48 states plus DC",
    },
    Region {
        id: "Alaska",
        name: "Alaska",
        bbox: [-180.0, 51.0, -130.0, 72.0],
        description: "Mainland and Aleutians west to the antimeridian",
    },
    Region {
        id: "Hawaii",
        name: "Hawaii",
        bbox: [-178.0, 18.0, -154.0, 29.0],
        description: "Main and Northwestern Hawaiian Islands",
    },
];

pub const BOM_ENVELOPES: &[Region] = &[Region {
    id: "Australia",
    name: "Australia",
    bbox: [113.0, -44.0, 154.0, -10.0],
    description: "Mainland Australia and Tasmania",
}];

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn at(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate { latitude, longitude }
    }

    #[rstest]
    #[case::denver(39.74, -104.99, true)]
    #[case::anchorage(61.22, -149.9, true)]
    #[case::honolulu(21.31, -157.86, true)]
    #[case::conus_corner(24.0, -125.0, true)]
    #[case::paris(48.0, 2.0, false)]
    #[case::vancouver_inside_coarse_box(49.28, -123.12, true)]
    #[case::mexico_city(19.43, -99.13, false)]
    fn nws_envelopes(#[case] lat: f64, #[case] lon: f64, #[case] expected: bool) {
        assert_eq!(covers(NWS_ENVELOPES, at(lat, lon)), expected);
    }

    #[rstest]
    #[case::sydney(-33.87, 151.21, true)]
    #[case::hobart(-42.88, 147.33, true)]
    #[case::auckland(-36.85, 174.76, false)]
    fn bom_envelope(#[case] lat: f64, #[case] lon: f64, #[case] expected: bool) {
        assert_eq!(covers(BOM_ENVELOPES, at(lat, lon)), expected);
    }

    #[test]
    fn wrapping_box_spans_the_antimeridian() {
        let aleutians = Region {
            id: "Aleutians",
            name: "Aleutians",
            bbox: [172.0, 51.0, -165.0, 55.0],
            description: "",
        };
        assert!(aleutians.contains(at(52.0, 178.0)));
        assert!(aleutians.contains(at(52.0, -170.0)));
        assert!(!aleutians.contains(at(52.0, 0.0)));
        assert!(!aleutians.contains(at(60.0, 178.0)));
    }
}
