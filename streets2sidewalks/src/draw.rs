use itertools::Itertools;
use serde::Serialize;

use geom::{Distance, JoinStyle, PolyLine, Pt2D};

use crate::graph::{StreetEdge, StreetGraph};
use crate::paths::Path;
use crate::Config;

/// When one side of a corner has no sidewalk, its street centerline offset by this fixed
/// distance stands in as the trim target, so the neighboring sidewalk ends near the street
/// edge instead of floating past it.
const VIRTUAL_TRIM_OFFSET: Distance = Distance::const_meters(7.0);

/// One rendered sidewalk segment.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sidewalk {
    pub geometry: PolyLine,
    /// The id of the street this sidewalk runs along.
    pub street_id: String,
    /// True if this sidewalk lies to the left of the street's stored coordinate direction.
    pub forward: bool,
}

/// Renders every path: offset each edge's centerline to its left, stitch neighboring sidewalks
/// together at corners, and emit whatever survives with clean geometry.
pub fn draw_sidewalks(streets: &StreetGraph, paths: &[Path], cfg: &Config) -> Vec<Sidewalk> {
    let mut output = Vec::new();
    for path in paths {
        // Step 1: the natural offset of every edge
        let mut drawn: Vec<Option<PolyLine>> = path
            .edges
            .iter()
            .map(|e| offset_sidewalk(streets.edge(*e), cfg.resolution))
            .collect();

        // Step 2: mutually trim consecutive sidewalks, wrapping around if the path closed
        let mut pairs: Vec<(usize, usize)> = (1..path.edges.len()).map(|i| (i - 1, i)).collect();
        if path.cyclic && path.edges.len() > 1 {
            pairs.push((path.edges.len() - 1, 0));
        }
        for (i, j) in pairs {
            let (g1, g2) = trim(
                streets.edge(path.edges[i]),
                drawn[i].take(),
                streets.edge(path.edges[j]),
                drawn[j].take(),
            );
            drawn[i] = g1;
            drawn[j] = g2;
        }

        // Step 3: emit
        for (e, sidewalk) in path.edges.iter().zip_eq(drawn) {
            let Some(geometry) = sidewalk else {
                continue;
            };
            let edge = streets.edge(*e);
            if geometry.intersects_itself() {
                warn!(
                    "Dropping a self-intersecting sidewalk along street {}",
                    edge.id
                );
                continue;
            }
            output.push(Sidewalk {
                geometry,
                street_id: edge.id.clone(),
                forward: edge.forward,
            });
        }
    }
    output
}

fn offset_sidewalk(edge: &StreetEdge, resolution: usize) -> Option<PolyLine> {
    if edge.offset <= Distance::ZERO {
        return None;
    }
    match edge
        .geometry
        .shift_left(edge.offset, JoinStyle::Round(resolution))
    {
        Ok(sidewalk) => Some(sidewalk),
        Err(err) => {
            warn!("Couldn't offset street {}: {}", edge.id, err);
            None
        }
    }
}

/// Stitches the sidewalks of two consecutive edges together at their shared corner, mutually
/// cutting them back to their crossing.
fn trim(
    e1: &StreetEdge,
    g1: Option<PolyLine>,
    e2: &StreetEdge,
    g2: Option<PolyLine>,
) -> (Option<PolyLine>, Option<PolyLine>) {
    // Matching ids mean the path doubled back along the same street; the sidewalk just runs
    // around the dead end untouched.
    if e1.id == e2.id {
        return (g1, g2);
    }
    match (g1, g2) {
        (None, None) => (None, None),
        (None, Some(g2)) => (None, trim_against_street(g2, e1, false)),
        (Some(g1), None) => (trim_against_street(g1, e2, true), None),
        (Some(g1), Some(g2)) => trim_pair(g1, g2),
    }
}

/// Trims one sidewalk against the virtual offset of a street with no sidewalk of its own.
/// `keep_first` cuts away the sidewalk's end (the corner is ahead); otherwise its start.
fn trim_against_street(
    sidewalk: PolyLine,
    street: &StreetEdge,
    keep_first: bool,
) -> Option<PolyLine> {
    let target = match street
        .geometry
        .shift_left(VIRTUAL_TRIM_OFFSET, JoinStyle::Miter)
    {
        Ok(pl) => pl,
        Err(err) => {
            warn!("No virtual trim target for street {}: {}", street.id, err);
            return Some(sidewalk);
        }
    };

    let ixn = if keep_first {
        sidewalk.intersection(&target)
    } else {
        target.intersection(&sidewalk)
    };
    let Some(ixn) = ixn else {
        // The sidewalk never reaches the other street; leave it alone
        return Some(sidewalk);
    };

    let dist = sidewalk.dist_along_of_point(ixn);
    let result = if keep_first {
        sidewalk.maybe_exact_slice(Distance::ZERO, dist)
    } else {
        sidewalk.maybe_exact_slice(dist, sidewalk.length())
    };
    match result {
        Ok(trimmed) => Some(trimmed),
        Err(err) => {
            debug!(
                "Sidewalk along street {} degenerated while trimming: {}",
                street.id, err
            );
            None
        }
    }
}

/// Both sidewalks exist. Cut each back to their crossing, or failing that, bend their adjacent
/// endpoints together.
fn trim_pair(g1: PolyLine, g2: PolyLine) -> (Option<PolyLine>, Option<PolyLine>) {
    if let Some(ixn) = g1.intersection(&g2) {
        let trimmed1 = g1
            .maybe_exact_slice(Distance::ZERO, g1.dist_along_of_point(ixn))
            .ok();
        let trimmed2 = g2
            .maybe_exact_slice(g2.dist_along_of_point(ixn), g2.length())
            .ok();
        return (trimmed1, trimmed2);
    }

    // Near-parallel offsets that never crossed; force them to meet end-to-end halfway across
    // the gap.
    let meet = Pt2D::center(&[g1.last_pt(), g2.first_pt()]);
    let mut pts1 = g1.into_points();
    *pts1.last_mut().unwrap() = meet;
    let mut pts2 = g2.into_points();
    pts2[0] = meet;
    (PolyLine::new(pts1).ok(), PolyLine::new(pts2).ok())
}
