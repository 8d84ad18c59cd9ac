use std::f64::consts::FRAC_PI_2;
use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{Angle, Distance, Line, Pt2D, EPSILON_DIST};

/// Offset corners that bend away from the shifted side get extended to their intersection, but
/// no further than this multiple of the shift width. Past it, the join degrades to a bevel.
const MITER_LIMIT: f64 = 5.0;

/// How the corner between two adjacent offset segments gets joined, on the side the corner
/// opens towards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum JoinStyle {
    /// Extend both segments to their intersection.
    Miter,
    /// Connect the two segment endpoints directly.
    Bevel,
    /// Approximate a circular arc around the corner, with this many segments per quarter turn.
    Round(usize),
}

/// An ordered sequence of at least two distinct points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolyLine {
    pts: Vec<Pt2D>,
    length: Distance,
}

impl PolyLine {
    pub fn new(mut pts: Vec<Pt2D>) -> Result<PolyLine> {
        pts.dedup();
        if pts.len() < 2 {
            bail!("Need at least two distinct points for a PolyLine");
        }
        let length: Distance = pts.windows(2).map(|pair| pair[0].dist_to(pair[1])).sum();
        Ok(PolyLine { pts, length })
    }

    pub fn must_new(pts: Vec<Pt2D>) -> PolyLine {
        PolyLine::new(pts).unwrap()
    }

    /// Like `new`, but also dropping adjacent points closer than `EPSILON_DIST`.
    pub fn deduping_new(pts: Vec<Pt2D>) -> Result<PolyLine> {
        PolyLine::new(Pt2D::approx_dedupe(pts, EPSILON_DIST))
    }

    pub fn points(&self) -> &Vec<Pt2D> {
        &self.pts
    }

    pub fn into_points(self) -> Vec<Pt2D> {
        self.pts
    }

    pub fn first_pt(&self) -> Pt2D {
        self.pts[0]
    }

    pub fn last_pt(&self) -> Pt2D {
        *self.pts.last().unwrap()
    }

    pub fn length(&self) -> Distance {
        self.length
    }

    pub fn lines(&self) -> impl Iterator<Item = Line> + '_ {
        self.pts
            .windows(2)
            .map(|pair| Line::must_new(pair[0], pair[1]))
    }

    pub fn reversed(&self) -> PolyLine {
        let mut pts = self.pts.clone();
        pts.reverse();
        PolyLine::must_new(pts)
    }

    /// Simplifies with Douglas-Peucker, always keeping both endpoints. Useful to scrub out tiny
    /// jittery segments near the ends of survey data.
    pub fn simplify(&self, epsilon: f64) -> PolyLine {
        use geo::Simplify;

        let line_string: geo::LineString = self.pts.iter().map(|pt| (pt.x(), pt.y())).collect();
        let simplified = line_string.simplify(&epsilon);
        PolyLine::new(
            simplified
                .0
                .into_iter()
                .map(|c| Pt2D::new(c.x, c.y))
                .collect(),
        )
        .unwrap_or_else(|_| self.clone())
    }

    /// The point at `dist` along the polyline, and the heading there.
    pub fn dist_along(&self, dist: Distance) -> Result<(Pt2D, Angle)> {
        if dist < Distance::ZERO || dist > self.length {
            bail!("dist_along({}) of {}, which is {} long", dist, self, self.length);
        }
        let mut so_far = Distance::ZERO;
        for line in self.lines() {
            let len = line.length();
            if so_far + len >= dist {
                let pt = line
                    .pt1()
                    .project_away((dist - so_far).abs(), line.angle());
                return Ok((pt, line.angle()));
            }
            so_far += len;
        }
        // Floating point noise just before the last point
        let last = self.lines().last().unwrap();
        Ok((last.pt2(), last.angle()))
    }

    pub fn must_dist_along(&self, dist: Distance) -> (Pt2D, Angle) {
        self.dist_along(dist).unwrap()
    }

    /// The sub-polyline between two arc lengths. Fails if the slice would be degenerate.
    pub fn maybe_exact_slice(&self, start: Distance, end: Distance) -> Result<PolyLine> {
        let start = start.max(Distance::ZERO);
        let end = end.min(self.length);
        if start >= end {
            bail!("exact_slice({}, {}) of {} would be empty", start, end, self);
        }

        let mut pts = vec![self.dist_along(start)?.0];
        let mut so_far = Distance::ZERO;
        for (idx, pt) in self.pts.iter().enumerate() {
            if idx > 0 {
                so_far += self.pts[idx - 1].dist_to(*pt);
            }
            if so_far > start && so_far < end {
                pts.push(*pt);
            }
        }
        pts.push(self.dist_along(end)?.0);
        PolyLine::deduping_new(pts)
            .with_context(|| format!("exact_slice({}, {}) of {}", start, end, self))
    }

    pub fn exact_slice(&self, start: Distance, end: Distance) -> PolyLine {
        self.maybe_exact_slice(start, end).unwrap()
    }

    /// The arc length of the point on the polyline closest to `pt`. Takes the first of several
    /// equally close candidates.
    pub fn dist_along_of_point(&self, pt: Pt2D) -> Distance {
        let mut closest: Option<(Distance, Distance)> = None;
        let mut so_far = Distance::ZERO;
        for line in self.lines() {
            let projected = line.project_pt(pt);
            let dist_away = projected.dist_to(pt);
            if closest.map(|(d, _)| dist_away < d).unwrap_or(true) {
                closest = Some((dist_away, so_far + line.pt1().dist_to(projected)));
            }
            so_far += line.length();
        }
        closest.unwrap().1
    }

    /// The point on the polyline closest to `pt`.
    pub fn project_pt(&self, pt: Pt2D) -> Pt2D {
        self.must_dist_along(self.dist_along_of_point(pt)).0
    }

    /// The first place this crosses `other`, walking along `self` in order. Collinear overlaps
    /// count, yielding the start of the overlap.
    pub fn intersection(&self, other: &PolyLine) -> Option<Pt2D> {
        for line1 in self.lines() {
            let mut hits: Vec<Pt2D> = Vec::new();
            for line2 in other.lines() {
                if let Some(pt) = line1.intersection(&line2) {
                    hits.push(pt);
                }
            }
            if let Some(earliest) = hits.into_iter().min_by_key(|pt| line1.pt1().dist_to(*pt)) {
                return Some(earliest);
            }
        }
        None
    }

    /// True if any two non-adjacent segments cross. The shared endpoint of a closed polyline
    /// doesn't count.
    pub fn intersects_itself(&self) -> bool {
        let lines: Vec<Line> = self.lines().collect();
        for (idx1, l1) in lines.iter().enumerate() {
            for (idx2, l2) in lines.iter().enumerate().skip(idx1 + 2) {
                if let Some(pt) = l1.intersection(l2) {
                    if idx1 == 0
                        && idx2 == lines.len() - 1
                        && self.first_pt() == self.last_pt()
                        && pt == self.first_pt()
                    {
                        continue;
                    }
                    return true;
                }
            }
        }
        false
    }

    /// The polyline shifted `width` perpendicularly to the left of its direction of travel,
    /// keeping that direction.
    pub fn shift_left(&self, width: Distance, style: JoinStyle) -> Result<PolyLine> {
        self.shift_with_style(width, true, style)
    }

    /// The mirror of `shift_left`.
    pub fn shift_right(&self, width: Distance, style: JoinStyle) -> Result<PolyLine> {
        self.shift_with_style(width, false, style)
    }

    fn shift_with_style(&self, width: Distance, left: bool, style: JoinStyle) -> Result<PolyLine> {
        if width <= Distance::ZERO {
            bail!("Can't shift {} by {}", self, width);
        }

        let perpendicular = if left { 90.0 } else { -90.0 };
        let shifted: Vec<Line> = self
            .lines()
            .map(|l| {
                let normal = l.angle().rotate_degs(perpendicular);
                Line::must_new(
                    l.pt1().project_away(width, normal),
                    l.pt2().project_away(width, normal),
                )
            })
            .collect();

        let mut pts = vec![shifted[0].pt1()];
        for idx in 0..shifted.len() - 1 {
            let (l1, l2) = (&shifted[idx], &shifted[idx + 1]);
            let corner = self.pts[idx + 1];

            // Which way does the polyline bend here?
            let a1 = self.pts[idx].angle_to(corner);
            let a2 = corner.angle_to(self.pts[idx + 2]);
            let cross = a1.normalized_radians().cos() * a2.normalized_radians().sin()
                - a1.normalized_radians().sin() * a2.normalized_radians().cos();
            let bends_away = if left { cross < 0.0 } else { cross > 0.0 };

            if !bends_away {
                // The shifted segments overlap; pull the corner back to where they cross.
                match l1
                    .intersection(l2)
                    .or_else(|| self.capped_miter(l1, l2, corner, width))
                {
                    Some(pt) => pts.push(pt),
                    None => {
                        pts.push(l1.pt2());
                        pts.push(l2.pt1());
                    }
                }
                continue;
            }

            match style {
                JoinStyle::Miter => match self.capped_miter(l1, l2, corner, width) {
                    Some(pt) => pts.push(pt),
                    None => {
                        pts.push(l1.pt2());
                        pts.push(l2.pt1());
                    }
                },
                JoinStyle::Bevel => {
                    pts.push(l1.pt2());
                    pts.push(l2.pt1());
                }
                JoinStyle::Round(resolution) => {
                    pts.push(l1.pt2());
                    pts.extend(arc_points(corner, l1.pt2(), l2.pt1(), width, resolution));
                    pts.push(l2.pt1());
                }
            }
        }
        pts.push(shifted.last().unwrap().pt2());

        PolyLine::deduping_new(pts)
    }

    /// Where the infinite lines through two shifted segments cross, unless that's further than
    /// the miter limit allows.
    fn capped_miter(&self, l1: &Line, l2: &Line, corner: Pt2D, width: Distance) -> Option<Pt2D> {
        let pt = l1.unbounded_intersection(l2)?;
        if pt.dist_to(corner) <= MITER_LIMIT * width {
            Some(pt)
        } else {
            None
        }
    }
}

/// Intermediate points approximating the arc of radius `width` around `center` from `from` to
/// `to`, exclusive of both, stepping `resolution` times per quarter turn.
fn arc_points(center: Pt2D, from: Pt2D, to: Pt2D, width: Distance, resolution: usize) -> Vec<Pt2D> {
    let theta1 = center.angle_to(from).normalized_radians();
    let theta2 = center.angle_to(to).normalized_radians();
    // Sweep the short way around; corner joins never span a half turn.
    let mut sweep = theta2 - theta1;
    if sweep > std::f64::consts::PI {
        sweep -= 2.0 * std::f64::consts::PI;
    } else if sweep < -std::f64::consts::PI {
        sweep += 2.0 * std::f64::consts::PI;
    }

    let steps = ((sweep.abs() / (FRAC_PI_2 / (resolution.max(1) as f64))).ceil() as usize).max(1);
    let mut pts = Vec::new();
    for i in 1..steps {
        let theta = theta1 + sweep * (i as f64) / (steps as f64);
        pts.push(center.project_away(width, Angle::new_rads(theta)));
    }
    pts
}

impl fmt::Display for PolyLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PolyLine(")?;
        for (idx, pt) in self.pts.iter().enumerate() {
            if idx > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "({}, {})", pt.x(), pt.y())?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pl(pts: Vec<(f64, f64)>) -> PolyLine {
        PolyLine::must_new(pts.into_iter().map(|(x, y)| Pt2D::new(x, y)).collect())
    }

    #[test]
    fn length_and_interpolation() {
        let line = pl(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        assert_eq!(line.length(), Distance::meters(20.0));
        assert_eq!(line.must_dist_along(Distance::meters(5.0)).0, Pt2D::new(5.0, 0.0));
        assert_eq!(
            line.must_dist_along(Distance::meters(15.0)).0,
            Pt2D::new(10.0, 5.0)
        );
        assert_eq!(line.must_dist_along(line.length()).0, Pt2D::new(10.0, 10.0));
        assert!(line.dist_along(Distance::meters(25.0)).is_err());
    }

    #[test]
    fn slicing_inserts_vertices() {
        let line = pl(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        let middle = line.exact_slice(Distance::meters(5.0), Distance::meters(15.0));
        assert_eq!(
            middle.points(),
            &vec![Pt2D::new(5.0, 0.0), Pt2D::new(10.0, 0.0), Pt2D::new(10.0, 5.0)]
        );
        assert!(line
            .maybe_exact_slice(Distance::meters(5.0), Distance::meters(5.0))
            .is_err());
    }

    #[test]
    fn projection_returns_arc_length() {
        let line = pl(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        assert_eq!(
            line.dist_along_of_point(Pt2D::new(3.0, 4.0)),
            Distance::meters(3.0)
        );
        assert_eq!(
            line.dist_along_of_point(Pt2D::new(12.0, 7.0)),
            Distance::meters(17.0)
        );
    }

    #[test]
    fn first_crossing_wins() {
        let line = pl(vec![(0.0, 0.0), (20.0, 0.0)]);
        let zigzag = pl(vec![(15.0, -5.0), (15.0, 5.0), (5.0, 5.0), (5.0, -5.0)]);
        // Walking along `line`, the crossing at x=5 comes first, even though the other polyline
        // reaches it last.
        assert_eq!(line.intersection(&zigzag), Some(Pt2D::new(5.0, 0.0)));
        assert_eq!(zigzag.intersection(&line), Some(Pt2D::new(15.0, 0.0)));
    }

    #[test]
    fn simplify_scrubs_micro_segments() {
        let line = pl(vec![(0.0, 0.0), (5.0, 0.01), (10.0, 0.0), (10.01, 0.001)]);
        let simplified = line.simplify(0.05);
        assert_eq!(
            simplified.points(),
            &vec![Pt2D::new(0.0, 0.0), Pt2D::new(10.01, 0.001)]
        );
    }

    #[test]
    fn shift_straight_line() {
        let line = pl(vec![(0.0, 0.0), (10.0, 0.0)]);
        assert_eq!(
            line.shift_left(Distance::meters(2.0), JoinStyle::Round(1))
                .unwrap(),
            pl(vec![(0.0, 2.0), (10.0, 2.0)])
        );
        assert_eq!(
            line.shift_right(Distance::meters(3.0), JoinStyle::Round(1))
                .unwrap(),
            pl(vec![(0.0, -3.0), (10.0, -3.0)])
        );
    }

    #[test]
    fn shift_inside_corner_trims() {
        // Bends left, so the left shift pinches inwards to the crossing
        let line = pl(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        assert_eq!(
            line.shift_left(Distance::meters(1.0), JoinStyle::Miter)
                .unwrap(),
            pl(vec![(0.0, 1.0), (9.0, 1.0), (9.0, 10.0)])
        );
    }

    #[test]
    fn shift_outside_corner_miters() {
        let line = pl(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        assert_eq!(
            line.shift_right(Distance::meters(1.0), JoinStyle::Miter)
                .unwrap(),
            pl(vec![(0.0, -1.0), (11.0, -1.0), (11.0, 10.0)])
        );
    }

    #[test]
    fn shift_outside_corner_rounds() {
        let line = pl(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        let shifted = line
            .shift_right(Distance::meters(1.0), JoinStyle::Round(4))
            .unwrap();
        // Two endpoints, the two arc ends, and 3 interior arc points for the quarter turn
        assert_eq!(shifted.points().len(), 7);
        let corner = Pt2D::new(10.0, 0.0);
        for pt in &shifted.points()[1..6] {
            assert!((pt.dist_to(corner) - Distance::meters(1.0)).abs() <= EPSILON_DIST);
        }
    }

    #[test]
    fn doubling_back_gets_a_cap() {
        let line = pl(vec![(0.0, 0.0), (10.0, 0.0), (0.0, 0.0)]);
        let shifted = line
            .shift_left(Distance::meters(1.0), JoinStyle::Bevel)
            .unwrap();
        assert_eq!(shifted.first_pt(), Pt2D::new(0.0, 1.0));
        assert_eq!(shifted.last_pt(), Pt2D::new(0.0, -1.0));
        assert!(shifted.points().contains(&Pt2D::new(10.0, 1.0)));
        assert!(shifted.points().contains(&Pt2D::new(10.0, -1.0)));
    }

    #[test]
    fn self_intersection() {
        assert!(pl(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 5.0), (5.0, -5.0)]).intersects_itself());
        assert!(!pl(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 5.0)]).intersects_itself());
        // A closed ring touches itself only at the seam
        assert!(!pl(vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0)
        ])
        .intersects_itself());
    }
}
