use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{Angle, Distance, Pt2D};

/// A line segment with two distinct endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line(Pt2D, Pt2D);

impl Line {
    /// Fails if the points are the same.
    pub fn new(pt1: Pt2D, pt2: Pt2D) -> Result<Line> {
        if pt1 == pt2 {
            bail!("Line from {} to itself", pt1);
        }
        Ok(Line(pt1, pt2))
    }

    pub fn must_new(pt1: Pt2D, pt2: Pt2D) -> Line {
        Line::new(pt1, pt2).unwrap()
    }

    pub fn pt1(&self) -> Pt2D {
        self.0
    }

    pub fn pt2(&self) -> Pt2D {
        self.1
    }

    pub fn length(&self) -> Distance {
        self.0.dist_to(self.1)
    }

    pub fn angle(&self) -> Angle {
        self.0.angle_to(self.1)
    }

    /// Where the two segments cross, if anywhere. If the segments are collinear and overlap,
    /// returns the start of the overlap.
    pub fn intersection(&self, other: &Line) -> Option<Pt2D> {
        use geo::algorithm::line_intersection::{line_intersection, LineIntersection};

        match line_intersection(self.to_geo(), other.to_geo())? {
            LineIntersection::SinglePoint { intersection, .. } => {
                Some(Pt2D::new(intersection.x, intersection.y))
            }
            LineIntersection::Collinear { intersection } => {
                Some(Pt2D::new(intersection.start.x, intersection.start.y))
            }
        }
    }

    /// Where the infinite lines through the two segments cross. `None` if they're parallel.
    pub fn unbounded_intersection(&self, other: &Line) -> Option<Pt2D> {
        let (x1, y1) = (self.0.x(), self.0.y());
        let (x2, y2) = (self.1.x(), self.1.y());
        let (x3, y3) = (other.0.x(), other.0.y());
        let (x4, y4) = (other.1.x(), other.1.y());

        let denominator = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
        if denominator.abs() < 1e-9 {
            return None;
        }
        let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denominator;
        Some(Pt2D::new(x1 + t * (x2 - x1), y1 + t * (y2 - y1)))
    }

    /// The closest point on this segment to `pt`.
    pub fn project_pt(&self, pt: Pt2D) -> Pt2D {
        let dx = self.1.x() - self.0.x();
        let dy = self.1.y() - self.0.y();
        let t = (((pt.x() - self.0.x()) * dx + (pt.y() - self.0.y()) * dy)
            / (dx * dx + dy * dy))
            .clamp(0.0, 1.0);
        Pt2D::new(self.0.x() + t * dx, self.0.y() + t * dy)
    }

    fn to_geo(self) -> geo::Line {
        geo::Line::new((self.0.x(), self.0.y()), (self.1.x(), self.1.y()))
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({}, {})", self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_segments() {
        let l1 = Line::must_new(Pt2D::new(0.0, 0.0), Pt2D::new(10.0, 0.0));
        let l2 = Line::must_new(Pt2D::new(5.0, -5.0), Pt2D::new(5.0, 5.0));
        assert_eq!(l1.intersection(&l2), Some(Pt2D::new(5.0, 0.0)));

        let l3 = Line::must_new(Pt2D::new(0.0, 1.0), Pt2D::new(10.0, 1.0));
        assert_eq!(l1.intersection(&l3), None);
        // The infinite lines through two non-touching perpendicular segments still cross
        let l4 = Line::must_new(Pt2D::new(20.0, 5.0), Pt2D::new(20.0, 10.0));
        assert_eq!(l1.unbounded_intersection(&l4), Some(Pt2D::new(20.0, 0.0)));
        assert_eq!(l1.unbounded_intersection(&l3), None);
    }

    #[test]
    fn collinear_overlap_starts_at_the_overlap() {
        let l1 = Line::must_new(Pt2D::new(0.0, 0.0), Pt2D::new(10.0, 0.0));
        let l2 = Line::must_new(Pt2D::new(5.0, 0.0), Pt2D::new(15.0, 0.0));
        assert_eq!(l1.intersection(&l2), Some(Pt2D::new(5.0, 0.0)));
    }

    #[test]
    fn projection_clamps_to_the_segment() {
        let l = Line::must_new(Pt2D::new(0.0, 0.0), Pt2D::new(10.0, 0.0));
        assert_eq!(l.project_pt(Pt2D::new(3.0, 4.0)), Pt2D::new(3.0, 0.0));
        assert_eq!(l.project_pt(Pt2D::new(-2.0, 1.0)), Pt2D::new(0.0, 0.0));
        assert_eq!(l.project_pt(Pt2D::new(12.0, 1.0)), Pt2D::new(10.0, 0.0));
    }
}
