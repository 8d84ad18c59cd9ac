//! 2D geometry for flat, projected map data. Distances and coordinates are in the linear units
//! of the source projection; the API calls them meters, following convention, and everything
//! works as long as x and y use the same unit.

#[macro_use]
extern crate anyhow;

pub use crate::angle::Angle;
pub use crate::distance::Distance;
pub use crate::line::Line;
pub use crate::polyline::{JoinStyle, PolyLine};
pub use crate::pt::{HashablePt2D, Pt2D};

mod angle;
mod distance;
mod line;
mod polyline;
mod pt;

/// Two points closer than this are considered the same place.
pub const EPSILON_DIST: Distance = Distance::const_meters(0.01);

/// Reduce the precision of an f64. This helps ensure serialization is idempotent and makes exact
/// equality on derived points meaningful.
pub fn trim_f64(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}
