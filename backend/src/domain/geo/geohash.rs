//! Base-32 geohash encoding and cell arithmetic.

use super::{Coordinate, GeoValidationError, normalise_longitude};

const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Bounding box of one geohash cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeohashCell {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeohashCell {
    /// Centre point of the cell.
    pub fn centre(&self) -> Coordinate {
        Coordinate::unchecked(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    /// Height of the cell in degrees of latitude.
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Width of the cell in degrees of longitude.
    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }
}

/// Encode a coordinate as a geohash of `precision` characters.
///
/// Hashes sharing a prefix share the enclosing cell, so prefix comparison
/// gives coarse spatial bucketing.
///
/// # Examples
/// ```
/// use pawmate::domain::geo::{Coordinate, geohash_encode};
///
/// let point = Coordinate::new(57.64911, 10.40744).expect("valid");
/// assert_eq!(geohash_encode(point, 11), "u4pruydqqvj");
/// ```
pub fn geohash_encode(coord: Coordinate, precision: usize) -> String {
    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut hash = String::with_capacity(precision);
    let mut even_bit = true;
    let mut bit = 0_u8;
    let mut index = 0_usize;

    while hash.len() < precision {
        if even_bit {
            let mid = (lon_range.0 + lon_range.1) / 2.0;
            if coord.longitude() >= mid {
                index = index * 2 + 1;
                lon_range.0 = mid;
            } else {
                index *= 2;
                lon_range.1 = mid;
            }
        } else {
            let mid = (lat_range.0 + lat_range.1) / 2.0;
            if coord.latitude() >= mid {
                index = index * 2 + 1;
                lat_range.0 = mid;
            } else {
                index *= 2;
                lat_range.1 = mid;
            }
        }
        even_bit = !even_bit;

        bit += 1;
        if bit == 5 {
            hash.push(char::from(BASE32[index]));
            bit = 0;
            index = 0;
        }
    }

    hash
}

/// Decode a geohash into the bounds of its cell.
pub fn geohash_decode_bounds(hash: &str) -> Result<GeohashCell, GeoValidationError> {
    if hash.is_empty() {
        return Err(GeoValidationError::EmptyGeohash);
    }

    let mut cell = GeohashCell {
        min_lat: -90.0,
        max_lat: 90.0,
        min_lon: -180.0,
        max_lon: 180.0,
    };
    let mut even_bit = true;

    for ch in hash.chars() {
        let value = BASE32
            .iter()
            .position(|candidate| char::from(*candidate) == ch)
            .ok_or(GeoValidationError::GeohashCharacter(ch))?;
        for shift in (0..5).rev() {
            let set = (value >> shift) & 1 == 1;
            if even_bit {
                let mid = (cell.min_lon + cell.max_lon) / 2.0;
                if set {
                    cell.min_lon = mid;
                } else {
                    cell.max_lon = mid;
                }
            } else {
                let mid = (cell.min_lat + cell.max_lat) / 2.0;
                if set {
                    cell.min_lat = mid;
                } else {
                    cell.max_lat = mid;
                }
            }
            even_bit = !even_bit;
        }
    }

    Ok(cell)
}

/// The up-to-eight cells adjacent to `hash` at the same precision.
///
/// Longitude wraps across the antimeridian; rows beyond a pole are omitted.
pub fn geohash_neighbours(hash: &str) -> Result<Vec<String>, GeoValidationError> {
    let cell = geohash_decode_bounds(hash)?;
    let centre = cell.centre();
    let precision = hash.chars().count();
    let mut neighbours = Vec::with_capacity(8);

    for lat_step in [-1.0, 0.0, 1.0] {
        let latitude = centre.latitude() + lat_step * cell.lat_span();
        if !(-90.0..=90.0).contains(&latitude) {
            continue;
        }
        for lon_step in [-1.0, 0.0, 1.0] {
            if lat_step == 0.0 && lon_step == 0.0 {
                continue;
            }
            let longitude = normalise_longitude(centre.longitude() + lon_step * cell.lon_span());
            let neighbour = geohash_encode(Coordinate::unchecked(latitude, longitude), precision);
            if neighbour != hash && !neighbours.contains(&neighbour) {
                neighbours.push(neighbour);
            }
        }
    }

    Ok(neighbours)
}
