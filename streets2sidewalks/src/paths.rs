use std::collections::HashSet;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::azimuth::cw_distance;
use crate::graph::StreetGraph;

/// Returning along the edge just traveled costs this much, so it sorts after every genuine
/// turn and only gets chosen when nothing else exists.
const DOUBLE_BACK_COST: f64 = 1e6;

/// One walk through the graph, tracing the outline of a block: an ordered sequence of directed
/// edges, and the nodes between them.
#[derive(Clone, Debug)]
pub struct Path {
    pub edges: Vec<EdgeIndex>,
    /// Always one longer than `edges`; consecutive entries are the endpoints of the edge
    /// between them.
    pub nodes: Vec<NodeIndex>,
    /// True iff the walk ended back at its starting node.
    pub cyclic: bool,
}

/// Decomposes the graph into paths. Every directed edge appears in exactly one of the returned
/// paths.
pub fn find_paths(streets: &StreetGraph) -> Vec<Path> {
    let mut visited: HashSet<EdgeIndex> = HashSet::new();
    let mut paths = Vec::new();
    // There's no strategy to picking the next start; insertion order keeps it deterministic.
    for e in streets.edge_indices() {
        if !visited.contains(&e) {
            paths.push(find_path(streets, e, &mut visited));
        }
    }
    paths
}

/// Walks from `start`, always taking the tightest clockwise turn at each node, until the walk
/// dead-ends or reaches an edge already claimed by some path. Applied everywhere, this rule
/// traces the boundary of the planar face to the right of each edge.
fn find_path(streets: &StreetGraph, start: EdgeIndex, visited: &mut HashSet<EdgeIndex>) -> Path {
    let (src, dst) = streets.endpoints(start);
    visited.insert(start);
    let mut path = Path {
        edges: vec![start],
        nodes: vec![src, dst],
        cyclic: false,
    };

    let mut prev_node = src;
    let mut current = dst;
    let mut arrived_on = start;

    loop {
        // Stand at `current`, facing away from the edge that got us here
        let arrival_az = (streets.edge(arrived_on).az2 + 180.0) % 360.0;
        let best = streets.outgoing(current).min_by(|a, b| {
            turn_cost(streets, arrival_az, prev_node, *a)
                .partial_cmp(&turn_cost(streets, arrival_az, prev_node, *b))
                .unwrap()
        });

        let Some((next_edge, next_node)) = best else {
            // Dead end
            path.cyclic = current == path.nodes[0];
            break;
        };
        if visited.contains(&next_edge) {
            path.cyclic = current == path.nodes[0];
            break;
        }

        visited.insert(next_edge);
        path.edges.push(next_edge);
        path.nodes.push(next_node);
        prev_node = current;
        current = next_node;
        arrived_on = next_edge;
    }

    path
}

/// How far clockwise the walk has to rotate from its arrival heading to leave along the
/// candidate edge.
fn turn_cost(
    streets: &StreetGraph,
    arrival_az: f64,
    prev_node: NodeIndex,
    candidate: (EdgeIndex, NodeIndex),
) -> f64 {
    let (e, target) = candidate;
    if target == prev_node {
        DOUBLE_BACK_COST
    } else {
        cw_distance(arrival_az, streets.edge(e).az1)
    }
}
