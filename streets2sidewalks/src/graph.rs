use std::collections::HashMap;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;

use geom::{Distance, HashablePt2D, PolyLine, Pt2D};

use crate::{AzimuthMode, Config, Street};

/// A directed multigraph over quantized street endpoints. Every input street contributes two
/// opposing edges; parallel edges between the same pair of nodes are all kept.
pub struct StreetGraph {
    graph: DiGraph<Pt2D, StreetEdge>,
    nodes: HashMap<HashablePt2D, NodeIndex>,
}

/// One direction of travel along one input street. The sidewalk for this edge gets drawn to the
/// left of `geometry`.
#[derive(Clone, Debug, Serialize)]
pub struct StreetEdge {
    /// The id of the originating street; both edges of a pair share it.
    pub id: String,
    /// True for the edge following the street's stored coordinate order.
    pub forward: bool,
    /// Oriented from this edge's source node to its target node.
    pub geometry: PolyLine,
    /// How far to the left of `geometry` the sidewalk runs. Zero means no sidewalk.
    pub offset: Distance,
    /// Compass azimuth of the first segment, pointing into the geometry. In `[0, 360)`.
    pub az1: f64,
    /// Compass azimuth of the last segment, pointing out of the geometry. In `[0, 360)`.
    pub az2: f64,
}

impl StreetEdge {
    fn new(
        id: String,
        forward: bool,
        geometry: PolyLine,
        offset: Distance,
        mode: AzimuthMode,
    ) -> StreetEdge {
        let pts = geometry.points();
        let az1 = mode.azimuth(pts[0], pts[1]);
        let az2 = mode.azimuth(pts[pts.len() - 2], pts[pts.len() - 1]);
        StreetEdge {
            id,
            forward,
            geometry,
            offset,
            az1,
            az2,
        }
    }
}

/// Builds the directed street graph. Every street is simplified, then inserted as a forward
/// edge (offset `sw_left`) and a reverse edge (offset `sw_right`), between nodes found by
/// rounding its endpoints to `cfg.precision` decimal places.
pub fn create_graph(streets: Vec<Street>, cfg: &Config) -> StreetGraph {
    let mut graph = StreetGraph {
        graph: DiGraph::new(),
        nodes: HashMap::new(),
    };
    for street in streets {
        graph.add_street(street, cfg);
    }
    info!(
        "Built a graph with {} nodes and {} directed edges",
        graph.num_nodes(),
        graph.num_edges()
    );
    graph
}

impl StreetGraph {
    fn add_street(&mut self, street: Street, cfg: &Config) {
        // Input geometry sometimes has tiny jittery segments near the ends, which would skew
        // az1/az2; scrub them out first.
        let geometry = street.geometry.simplify(cfg.simplify);
        let reversed = geometry.reversed();

        let src = self.node(geometry.first_pt(), cfg.precision);
        let dst = self.node(geometry.last_pt(), cfg.precision);

        let fwd = StreetEdge::new(
            street.id.clone(),
            true,
            geometry,
            street.sw_left,
            cfg.azimuth_mode,
        );
        let back = StreetEdge::new(street.id, false, reversed, street.sw_right, cfg.azimuth_mode);
        self.graph.add_edge(src, dst, fwd);
        self.graph.add_edge(dst, src, back);
    }

    fn node(&mut self, pt: Pt2D, precision: i32) -> NodeIndex {
        let quantized = quantize(pt, precision);
        if let Some(n) = self.nodes.get(&quantized) {
            return *n;
        }
        let n = self.graph.add_node(quantized.into());
        self.nodes.insert(quantized, n);
        n
    }

    pub fn num_nodes(&self) -> usize {
        self.graph.node_count()
    }

    pub fn num_edges(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn edge(&self, e: EdgeIndex) -> &StreetEdge {
        &self.graph[e]
    }

    /// The quantized point this node represents.
    pub fn node_pt(&self, n: NodeIndex) -> Pt2D {
        self.graph[n]
    }

    /// All directed edges, in insertion order.
    pub fn edge_indices(&self) -> Vec<EdgeIndex> {
        self.graph.edge_indices().collect()
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeIndex, &StreetEdge)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.id(), e.weight()))
    }

    pub fn endpoints(&self, e: EdgeIndex) -> (NodeIndex, NodeIndex) {
        self.graph.edge_endpoints(e).unwrap()
    }

    /// Outgoing edges of `n`, as (edge, target node) pairs. The order is deterministic for a
    /// fixed insertion order.
    pub fn outgoing(&self, n: NodeIndex) -> impl Iterator<Item = (EdgeIndex, NodeIndex)> + '_ {
        self.graph.edges(n).map(|e| (e.id(), e.target()))
    }
}

fn quantize(pt: Pt2D, precision: i32) -> HashablePt2D {
    let scale = 10f64.powi(precision);
    HashablePt2D::new(
        (pt.x() * scale).round() / scale,
        (pt.y() * scale).round() / scale,
    )
}
