use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An angle in radians, following the mathematical convention: 0 is +x, counter-clockwise is
/// positive. Not automatically normalized.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Angle(f64);

impl Angle {
    pub const ZERO: Angle = Angle(0.0);

    pub fn new_rads(rads: f64) -> Angle {
        Angle(rads)
    }

    pub fn degrees(degs: f64) -> Angle {
        Angle(degs.to_radians())
    }

    /// The angle pointing the other way.
    pub fn opposite(self) -> Angle {
        Angle(self.0 + PI)
    }

    pub fn rotate_degs(self, degrees: f64) -> Angle {
        Angle(self.0 + degrees.to_radians())
    }

    /// Radians in `[0, 2pi)`.
    pub fn normalized_radians(self) -> f64 {
        self.0.rem_euclid(2.0 * PI)
    }

    /// Degrees in `[0, 360)`.
    pub fn normalized_degrees(self) -> f64 {
        self.normalized_radians().to_degrees()
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Angle({} degrees)", self.normalized_degrees())
    }
}
