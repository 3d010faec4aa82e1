//! Coarse location privacy.
//!
//! A pet's true location is never handed to other clients. Reads go through
//! [`obfuscate`], which moves the point by a random offset of at most the
//! configured magnitude. The projection is lossy and non-reproducible: two
//! reads of the same pet yield different coordinates, so distances computed
//! from them are approximate and unstable across requests.

use std::f64::consts::TAU;

use rand::Rng;

use super::{Coordinate, destination_point};

/// Displace `true_location` by a uniformly distributed offset within a disc
/// of radius `jitter_magnitude_km`.
///
/// # Examples
/// ```
/// use pawmate::domain::geo::{Coordinate, haversine_distance_km, obfuscate};
///
/// let home = Coordinate::new(40.0, -74.0).expect("valid");
/// let shown = obfuscate(home, 0.5, &mut rand::thread_rng());
/// assert!(haversine_distance_km(home, shown) <= 0.5 + 1e-9);
/// ```
pub fn obfuscate<R: Rng + ?Sized>(
    true_location: Coordinate,
    jitter_magnitude_km: f64,
    rng: &mut R,
) -> Coordinate {
    if !(jitter_magnitude_km > 0.0) {
        return true_location;
    }
    // sqrt keeps the density uniform over the disc rather than bunched at
    // the centre.
    let distance = jitter_magnitude_km * rng.gen_range(0.0_f64..=1.0).sqrt();
    let bearing = rng.gen_range(0.0..TAU).to_degrees();
    destination_point(true_location, distance, bearing)
}

/// Read-time location projection applied to entities shown to other users.
pub trait LocationJitter: Send + Sync {
    /// Return the coordinate that may be exposed for `true_location`.
    fn jitter(&self, true_location: Coordinate) -> Coordinate;
}

/// Production jitter backed by the thread-local RNG.
#[derive(Debug, Clone, Copy)]
pub struct RandomJitter {
    magnitude_km: f64,
}

impl RandomJitter {
    /// Jitter by at most `magnitude_km`.
    pub fn new(magnitude_km: f64) -> Self {
        Self {
            magnitude_km: magnitude_km.max(0.0),
        }
    }

    /// Configured maximum displacement.
    pub fn magnitude_km(&self) -> f64 {
        self.magnitude_km
    }
}

impl LocationJitter for RandomJitter {
    fn jitter(&self, true_location: Coordinate) -> Coordinate {
        obfuscate(true_location, self.magnitude_km, &mut rand::thread_rng())
    }
}

/// Identity projection for tests and trusted internal callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl LocationJitter for NoJitter {
    fn jitter(&self, true_location: Coordinate) -> Coordinate {
        true_location
    }
}
