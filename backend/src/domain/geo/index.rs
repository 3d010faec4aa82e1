//! Geohash cell cover for radius queries.
//!
//! A radius query is answered by loading every point bucketed in the centre
//! cell and its eight neighbours, then filtering with exact haversine
//! distance. The cover is only valid when the 3x3 block is guaranteed to
//! contain the whole circle; callers fall back to a full scan otherwise.

use super::{Coordinate, EARTH_RADIUS_KM, geohash_decode_bounds, geohash_encode, geohash_neighbours};

/// Cell precision used to bucket user locations for fan-out.
///
/// Precision 5 cells are roughly 4.9 km by 4.9 km at the equator, comfortably
/// wider than the 1 km fan-out radius at all but polar latitudes.
pub const FANOUT_CELL_PRECISION: usize = 5;

/// Cells whose union contains every point within `radius_km` of `centre`.
///
/// Returns `None` when the 3x3 block around the centre cell cannot be proven
/// to contain the circle (near the poles, or for radii larger than a cell).
///
/// # Examples
/// ```
/// use pawmate::domain::geo::{Coordinate, FANOUT_CELL_PRECISION, covering_cells};
///
/// let centre = Coordinate::new(51.5, -0.12).expect("valid");
/// let cells = covering_cells(centre, 1.0, FANOUT_CELL_PRECISION).expect("cover exists");
/// assert_eq!(cells.len(), 9);
/// assert!(covering_cells(centre, 50.0, FANOUT_CELL_PRECISION).is_none());
/// ```
pub fn covering_cells(centre: Coordinate, radius_km: f64, precision: usize) -> Option<Vec<String>> {
    if !radius_km.is_finite() || radius_km < 0.0 || precision == 0 {
        return None;
    }

    let hash = geohash_encode(centre, precision);
    let cell = geohash_decode_bounds(&hash).ok()?;

    let angular = radius_km / EARTH_RADIUS_KM;
    let max_lat_offset = angular.to_degrees();
    if cell.lat_span() < max_lat_offset {
        return None;
    }
    if cell.max_lat + cell.lat_span() >= 90.0 || cell.min_lat - cell.lat_span() <= -90.0 {
        return None;
    }

    let lat_cos = centre.latitude().to_radians().cos();
    let reach = angular.sin();
    if reach >= lat_cos {
        return None;
    }
    let max_lon_offset = (reach / lat_cos).asin().to_degrees();
    if cell.lon_span() < max_lon_offset {
        return None;
    }

    let mut cells = geohash_neighbours(&hash).ok()?;
    cells.insert(0, hash);
    Some(cells)
}
