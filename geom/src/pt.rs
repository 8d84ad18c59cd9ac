use std::fmt;

use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use crate::{trim_f64, Angle, Distance, EPSILON_DIST};

/// A point in flat, projected space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pt2D {
    inner_x: f64,
    inner_y: f64,
}

impl Pt2D {
    pub fn new(x: f64, y: f64) -> Pt2D {
        if !x.is_finite() || !y.is_finite() {
            panic!("Bad Pt2D {}, {}", x, y);
        }

        Pt2D {
            inner_x: trim_f64(x),
            inner_y: trim_f64(y),
        }
    }

    pub fn x(self) -> f64 {
        self.inner_x
    }

    pub fn y(self) -> f64 {
        self.inner_y
    }

    pub fn approx_eq(self, other: Pt2D, threshold: Distance) -> bool {
        self.dist_to(other) <= threshold
    }

    pub fn dist_to(self, to: Pt2D) -> Distance {
        Distance::meters(((self.x() - to.x()).powi(2) + (self.y() - to.y()).powi(2)).sqrt())
    }

    pub fn angle_to(self, to: Pt2D) -> Angle {
        Angle::new_rads((to.y() - self.y()).atan2(to.x() - self.x()))
    }

    /// The point at `dist` away in the direction `theta`.
    pub fn project_away(self, dist: Distance, theta: Angle) -> Pt2D {
        // If negative, caller should use theta.opposite()
        assert!(dist >= Distance::ZERO);

        let (sin, cos) = theta.normalized_radians().sin_cos();
        Pt2D::new(
            self.x() + dist.inner_meters() * cos,
            self.y() + dist.inner_meters() * sin,
        )
    }

    pub fn center(pts: &[Pt2D]) -> Pt2D {
        if pts.is_empty() {
            panic!("Can't find center of 0 points");
        }
        let mut x = 0.0;
        let mut y = 0.0;
        for pt in pts {
            x += pt.x();
            y += pt.y();
        }
        let len = pts.len() as f64;
        Pt2D::new(x / len, y / len)
    }

    /// Removes runs of adjacent points closer than `threshold`, keeping the first of each run.
    pub fn approx_dedupe(pts: Vec<Pt2D>, threshold: Distance) -> Vec<Pt2D> {
        let mut result: Vec<Pt2D> = Vec::new();
        for pt in pts {
            if result.is_empty() || !result.last().unwrap().approx_eq(pt, threshold) {
                result.push(pt);
            }
        }
        result
    }

    pub fn epsilon_eq(self, other: Pt2D) -> bool {
        self.approx_eq(other, EPSILON_DIST)
    }

    pub fn to_hashable(self) -> HashablePt2D {
        HashablePt2D::new(self.x(), self.y())
    }
}

impl fmt::Display for Pt2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pt2D({0}, {1})", self.x(), self.y())
    }
}

/// An exact-equality, hashable form of a point. Suitable as a map key.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct HashablePt2D {
    x_nan: NotNan<f64>,
    y_nan: NotNan<f64>,
}

impl HashablePt2D {
    pub fn new(x: f64, y: f64) -> HashablePt2D {
        HashablePt2D {
            x_nan: NotNan::new(x).unwrap(),
            y_nan: NotNan::new(y).unwrap(),
        }
    }

    pub fn x(&self) -> f64 {
        self.x_nan.into_inner()
    }

    pub fn y(&self) -> f64 {
        self.y_nan.into_inner()
    }
}

impl From<HashablePt2D> for Pt2D {
    fn from(pt: HashablePt2D) -> Self {
        Pt2D::new(pt.x(), pt.y())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angles_match_compass_quadrants() {
        let origin = Pt2D::new(0.0, 0.0);
        assert_eq!(
            origin.angle_to(Pt2D::new(1.0, 0.0)).normalized_degrees(),
            0.0
        );
        assert_eq!(
            origin.angle_to(Pt2D::new(0.0, 1.0)).normalized_degrees(),
            90.0
        );
        assert_eq!(
            origin.angle_to(Pt2D::new(-1.0, 0.0)).normalized_degrees(),
            180.0
        );
    }

    #[test]
    fn project_away_round_trips() {
        let pt = Pt2D::new(3.0, 4.0);
        let there = pt.project_away(Distance::meters(5.0), Angle::degrees(90.0));
        assert_eq!(there, Pt2D::new(3.0, 9.0));
        assert_eq!(pt.dist_to(there), Distance::meters(5.0));
    }

    #[test]
    fn dedupe_collapses_jitter() {
        let pts = vec![
            Pt2D::new(0.0, 0.0),
            Pt2D::new(0.0, 0.001),
            Pt2D::new(5.0, 0.0),
        ];
        assert_eq!(
            Pt2D::approx_dedupe(pts, EPSILON_DIST),
            vec![Pt2D::new(0.0, 0.0), Pt2D::new(5.0, 0.0)]
        );
    }
}
