//! Geographic positions and great-circle distances between them.

use haversine::{distance, Location as HaversineLocation, Units};
use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
/// Both values are decimal degrees (WGS84 assumed).
///
/// # Examples
///
/// ```
/// use rail_weather::LatLon;
///
/// let helsinki = LatLon(60.1721, 24.9412);
/// assert_eq!(helsinki.latitude(), 60.1721);
/// assert_eq!(helsinki.longitude(), 24.9412);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon(pub f64, pub f64);

impl LatLon {
    pub fn latitude(self) -> f64 {
        self.0
    }

    pub fn longitude(self) -> f64 {
        self.1
    }

    /// Both coordinates are finite numbers.
    pub fn is_finite(self) -> bool {
        self.0.is_finite() && self.1.is_finite()
    }

    /// Great-circle distance in kilometers, using the haversine formula on a
    /// sphere of radius [`EARTH_RADIUS_KM`].
    ///
    /// # Examples
    ///
    /// ```
    /// use rail_weather::LatLon;
    ///
    /// let d = LatLon(60.1, 24.1).distance_km(LatLon(60.0, 24.0));
    /// assert!((d - 12.428).abs() < 0.01);
    /// ```
    pub fn distance_km(self, other: LatLon) -> f64 {
        distance(
            HaversineLocation {
                latitude: self.0,
                longitude: self.1,
            },
            HaversineLocation {
                latitude: other.0,
                longitude: other.1,
            },
            Units::Kilometers,
        )
    }

    /// Projects the position onto the unit sphere.
    ///
    /// Euclidean (chord) distance between projected points grows monotonically
    /// with great-circle distance, so it can order candidates in a spatial index.
    pub(crate) fn unit_vector(self) -> [f64; 3] {
        let lat = self.0.to_radians();
        let lon = self.1.to_radians();
        [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
    }
}

/// Squared chord length on the unit sphere spanning `distance_km` of arc.
pub(crate) fn chord_2_for_distance(distance_km: f64) -> f64 {
    let angle = (distance_km / EARTH_RADIUS_KM).min(std::f64::consts::PI);
    let chord = 2.0 * (angle / 2.0).sin();
    chord * chord
}
