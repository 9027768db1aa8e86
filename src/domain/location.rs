//! Geographic coordinates and great-circle distance

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// A point on the globe in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// Statute miles per nautical-mile minute of arc.
const MILES_PER_ARC_MINUTE: f64 = 1.1515;
const KM_PER_MILE: f64 = 1.60934;

/// Great-circle distance in kilometers (spherical law of cosines).
pub fn distance(a: Location, b: Location) -> f64 {
    let lat1 = a.latitude * PI / 180.0;
    let lat2 = b.latitude * PI / 180.0;
    let theta = (a.longitude - b.longitude) * PI / 180.0;

    // Rounding on identical or antipodal points can leave the argument
    // just outside acos's domain.
    let cos_arg = (lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * theta.cos()).clamp(-1.0, 1.0);

    let degrees = cos_arg.acos() * 180.0 / PI;
    degrees * 60.0 * MILES_PER_ARC_MINUTE * KM_PER_MILE
}
