//! Geographic primitives: coordinates, great-circle distance, geohash
//! bucketing, and privacy jitter.
//!
//! Everything here is pure and synchronous. Proximity decisions elsewhere in
//! the engine are always made with [`haversine_distance_km`]; geohashes are a
//! stored attribute and a coarse pre-filter, never the final word.

use std::fmt;

use serde::{Deserialize, Serialize};

mod geohash;
mod index;
mod jitter;

pub use geohash::{GeohashCell, geohash_decode_bounds, geohash_encode, geohash_neighbours};
pub use index::{FANOUT_CELL_PRECISION, covering_cells};
pub use jitter::{LocationJitter, NoJitter, RandomJitter, obfuscate};

/// Mean Earth radius used for all distance computations.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default geohash precision stored on tagged places.
pub const DEFAULT_GEOHASH_PRECISION: usize = 9;

/// Validation failures for geographic inputs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoValidationError {
    /// Latitude was outside `[-90, 90]` or not finite.
    #[error("latitude must be a finite value within [-90, 90], got {0}")]
    Latitude(f64),
    /// Longitude was outside `[-180, 180]` or not finite.
    #[error("longitude must be a finite value within [-180, 180], got {0}")]
    Longitude(f64),
    /// Geohash contained a character outside the base-32 alphabet.
    #[error("geohash contains invalid character {0:?}")]
    GeohashCharacter(char),
    /// Geohash was empty.
    #[error("geohash must not be empty")]
    EmptyGeohash,
}

/// WGS84 coordinate in decimal degrees.
///
/// Validated coordinates have one representation per point: the poles carry
/// longitude 0 and the antimeridian is always +180, so equality and a zero
/// distance agree.
///
/// # Examples
/// ```
/// use pawmate::domain::geo::Coordinate;
///
/// let fix = Coordinate::new(51.5007, -0.1246).expect("valid coordinate");
/// assert_eq!(fix.latitude(), 51.5007);
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "CoordinateDto", into = "CoordinateDto")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Validated constructor enforcing WGS84 ranges.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoValidationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoValidationError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoValidationError::Longitude(longitude));
        }
        let longitude = if latitude.abs() == 90.0 {
            0.0
        } else if longitude == -180.0 {
            180.0
        } else {
            longitude
        };
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Construct without validation.
    ///
    /// Intended for math-only callers; NaN and out-of-range values flow
    /// through the distance functions unchanged.
    pub const fn unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude in decimal degrees.
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoordinateDto {
    latitude: f64,
    longitude: f64,
}

impl From<Coordinate> for CoordinateDto {
    fn from(value: Coordinate) -> Self {
        Self {
            latitude: value.latitude,
            longitude: value.longitude,
        }
    }
}

impl TryFrom<CoordinateDto> for Coordinate {
    type Error = GeoValidationError;

    fn try_from(value: CoordinateDto) -> Result<Self, Self::Error> {
        Self::new(value.latitude, value.longitude)
    }
}

/// Great-circle distance between two coordinates in kilometres.
///
/// Symmetric in its arguments and zero for identical inputs, which for
/// validated coordinates means zero exactly when they compare equal. NaN
/// inputs produce NaN.
///
/// # Examples
/// ```
/// use pawmate::domain::geo::{Coordinate, haversine_distance_km};
///
/// let london = Coordinate::new(51.5074, -0.1278).expect("valid");
/// let paris = Coordinate::new(48.8566, 2.3522).expect("valid");
/// let km = haversine_distance_km(london, paris);
/// assert!((km - 343.5).abs() < 1.0);
/// ```
pub fn haversine_distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let half_chord = (delta_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (delta_lon / 2.0).sin().powi(2);
    let root = half_chord.sqrt();
    // Rounding can push antipodal inputs fractionally above 1; NaN must pass
    // through untouched, so no `min` here.
    let root = if root > 1.0 { 1.0 } else { root };
    2.0 * EARTH_RADIUS_KM * root.asin()
}

/// Round a distance to two decimal places for display payloads.
pub fn round_km(distance_km: f64) -> f64 {
    (distance_km * 100.0).round() / 100.0
}

/// Move `origin` by `distance_km` along a compass `bearing_degrees`.
///
/// Used by jitter and by tests that need points at known distances.
pub fn destination_point(origin: Coordinate, distance_km: f64, bearing_degrees: f64) -> Coordinate {
    let angular = distance_km / EARTH_RADIUS_KM;
    let bearing = bearing_degrees.to_radians();
    let lat = origin.latitude.to_radians();
    let lon = origin.longitude.to_radians();

    let dest_lat = (lat.sin() * angular.cos() + lat.cos() * angular.sin() * bearing.cos()).asin();
    let dest_lon = lon
        + (bearing.sin() * angular.sin() * lat.cos())
            .atan2(angular.cos() - lat.sin() * dest_lat.sin());

    Coordinate::unchecked(dest_lat.to_degrees(), normalise_longitude(dest_lon.to_degrees()))
}

pub(crate) fn normalise_longitude(longitude: f64) -> f64 {
    let wrapped = (longitude + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && longitude > 0.0 {
        180.0
    } else {
        wrapped
    }
}
