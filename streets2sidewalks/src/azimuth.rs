//! Compass bearings: 0 degrees is north (+y), increasing clockwise. Note this is NOT the
//! mathematical convention `geom::Angle` uses; keep the two worlds separate.

use serde::{Deserialize, Serialize};

use geom::Pt2D;

/// The bearing from `p1` to `p2` on a flat plane, in degrees in `[0, 360)`. Only correct for
/// projections where x and y use identical units.
pub fn azimuth_cartesian(p1: Pt2D, p2: Pt2D) -> f64 {
    // Arguments swapped relative to the usual atan2 convention, to make 0 north and clockwise
    // positive
    let angle = (p2.x() - p1.x()).atan2(p2.y() - p1.y());
    (angle.to_degrees() + 360.0) % 360.0
}

/// The great-circle initial bearing from `p1` to `p2`, both (lng, lat) in degrees. Returned in
/// degrees in `[0, 360)`.
pub fn azimuth_lnglat(p1: Pt2D, p2: Pt2D) -> f64 {
    let lat1 = p1.y().to_radians();
    let lat2 = p2.y().to_radians();
    let dlon = (p2.x() - p1.x()).to_radians();

    let x = dlon.sin() * lat2.cos();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    (x.atan2(y).to_degrees() + 360.0) % 360.0
}

/// The angle swept going clockwise from `az1` to `az2`, in degrees in `[0, 360)`.
pub fn cw_distance(az1: f64, az2: f64) -> f64 {
    (az2 - az1).rem_euclid(360.0)
}

/// Which bearing formula to use for edge azimuths.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum AzimuthMode {
    /// For data in a projected coordinate system. The default.
    Cartesian,
    /// For data still in (lng, lat) degrees.
    LngLat,
}

impl AzimuthMode {
    pub fn azimuth(self, p1: Pt2D, p2: Pt2D) -> f64 {
        match self {
            AzimuthMode::Cartesian => azimuth_cartesian(p1, p2),
            AzimuthMode::LngLat => azimuth_lnglat(p1, p2),
        }
    }
}
