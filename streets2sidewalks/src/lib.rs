//! Turns a network of street centerlines, each annotated with a sidewalk offset per side, into
//! the implied network of sidewalk lines. Streets become pairs of directed edges; walking
//! tightest-clockwise turns decomposes the network into block outlines; each edge's sidewalk is
//! drawn to its left and trimmed against its neighbors at corners.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

use serde::Serialize;

use geom::{Distance, PolyLine};

pub use crate::azimuth::{azimuth_cartesian, azimuth_lnglat, cw_distance, AzimuthMode};
pub use crate::draw::{draw_sidewalks, Sidewalk};
pub use crate::graph::{create_graph, StreetEdge, StreetGraph};
pub use crate::paths::{find_paths, Path};

mod azimuth;
mod draw;
mod graph;
pub mod io;
mod paths;

/// One input street centerline. The sidewalk offsets are perpendicular distances from the
/// centerline, relative to the direction of the stored coordinates; zero means no sidewalk on
/// that side.
#[derive(Clone, Debug, Serialize)]
pub struct Street {
    pub id: String,
    pub geometry: PolyLine,
    pub sw_left: Distance,
    pub sw_right: Distance,
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Decimal places used to round street endpoints when merging them into shared graph
    /// nodes. Higher values merge less.
    pub precision: i32,
    /// Douglas-Peucker tolerance applied to every input geometry, to scrub out tiny trailing
    /// segments that would skew the endpoint azimuths.
    pub simplify: f64,
    pub azimuth_mode: AzimuthMode,
    /// Arc resolution (segments per quarter turn) for the round corner joins of drawn
    /// sidewalks.
    pub resolution: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            precision: 1,
            simplify: 0.05,
            azimuth_mode: AzimuthMode::Cartesian,
            resolution: 1,
        }
    }
}

/// Runs the full pipeline: build the directed street graph, trace block outlines, draw and trim
/// sidewalks.
pub fn streets_to_sidewalks(streets: Vec<Street>, cfg: &Config) -> Vec<Sidewalk> {
    let graph = create_graph(streets, cfg);
    let paths = find_paths(&graph);
    info!(
        "Traced {} paths over {} directed edges",
        paths.len(),
        graph.num_edges()
    );
    draw_sidewalks(&graph, &paths, cfg)
}
