//! Shortest-path queries over the transport network.
//!
//! # Cost units
//!
//! Edge lengths are metres (`f64`) externally.  Dijkstra accumulates costs in
//! integer **millimetres** (`u64`) internally so heap ordering is exact and
//! deterministic; the conversion error (< 0.5 mm per edge) is irrelevant at
//! plant scale.
//!
//! # Failure contract
//!
//! A query against an unbound location name or a disconnected pair returns an
//! error rather than panicking.  Callers are expected to degrade to a
//! straight-line distance estimate — a missing aisle in the layout must never
//! stall a transfer.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use flow_core::{EdgeId, NodeId, Point};

use crate::network::PathNetwork;
use crate::{PathError, PathResult};

// ── PathRoute ─────────────────────────────────────────────────────────────────

/// The result of a shortest-path query: an ordered point list with the
/// matching per-segment distances.
///
/// Invariant: `points.len() == segment_lengths_m.len() + 1` for non-trivial
/// routes; a trivial route (`from == to`) has one point and no segments.
#[derive(Debug, Clone, PartialEq)]
pub struct PathRoute {
    /// Way-points to traverse in order, from source to destination.
    pub points: Vec<Point>,
    /// Length of each hop between consecutive `points`, in metres.
    pub segment_lengths_m: Vec<f64>,
    /// Sum of all segment lengths, in metres.
    pub total_m: f64,
}

impl PathRoute {
    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.segment_lengths_m.is_empty()
    }
}

impl PathNetwork {
    /// Compute the shortest path between two *bound location names*.
    ///
    /// Standard Dijkstra over the CSR graph: binary min-heap, stale-entry
    /// skip, early exit when the target node is popped, route reconstruction
    /// by walking predecessor edges.  Ties are broken by `NodeId` for
    /// deterministic results.
    pub fn shortest_path(&self, from: &str, to: &str) -> PathResult<PathRoute> {
        let from_node = self
            .node_for(from)
            .ok_or_else(|| PathError::UnknownLocation(from.to_string()))?;
        let to_node = self
            .node_for(to)
            .ok_or_else(|| PathError::UnknownLocation(to.to_string()))?;
        self.shortest_path_nodes(from_node, to_node)
    }

    /// As [`shortest_path`](Self::shortest_path), addressed by node.
    pub fn shortest_path_nodes(&self, from: NodeId, to: NodeId) -> PathResult<PathRoute> {
        if from == to {
            return Ok(PathRoute {
                points:            vec![self.node_pos[from.index()]],
                segment_lengths_m: vec![],
                total_m:           0.0,
            });
        }

        let n = self.node_count();
        if from.index() >= n || to.index() >= n {
            return Err(PathError::NoRoute { from, to });
        }

        // dist[v] = best known cost (mm) to reach v.
        let mut dist      = vec![u64::MAX; n];
        // prev_edge[v] = EdgeId that reached v; EdgeId::INVALID for unreached nodes.
        let mut prev_edge = vec![EdgeId::INVALID; n];

        dist[from.index()] = 0;

        // Min-heap: (cost, node). Reverse makes BinaryHeap (max) behave as min-heap.
        // Secondary key NodeId ensures deterministic tie-breaking.
        let mut heap: BinaryHeap<Reverse<(u64, NodeId)>> = BinaryHeap::new();
        heap.push(Reverse((0, from)));

        while let Some(Reverse((cost, node))) = heap.pop() {
            if node == to {
                return Ok(self.reconstruct(&prev_edge, from, to));
            }

            // Skip stale heap entries.
            if cost > dist[node.index()] {
                continue;
            }

            for edge in self.out_edges(node) {
                let neighbor = self.edge_to[edge.index()];
                let new_cost = cost.saturating_add(edge_cost_mm(self, edge));

                if new_cost < dist[neighbor.index()] {
                    dist[neighbor.index()] = new_cost;
                    prev_edge[neighbor.index()] = edge;
                    heap.push(Reverse((new_cost, neighbor)));
                }
            }
        }

        Err(PathError::NoRoute { from, to })
    }

    fn reconstruct(&self, prev_edge: &[EdgeId], from: NodeId, to: NodeId) -> PathRoute {
        let mut edges = Vec::new();
        let mut cur = to;
        loop {
            let e = prev_edge[cur.index()];
            if e == EdgeId::INVALID {
                break;
            }
            edges.push(e);
            cur = self.edge_from[e.index()];
        }
        edges.reverse();
        debug_assert_eq!(cur, from, "reconstruction must terminate at the source");

        let mut points = Vec::with_capacity(edges.len() + 1);
        let mut segment_lengths_m = Vec::with_capacity(edges.len());
        points.push(self.node_pos[from.index()]);
        let mut total_m = 0.0;
        for e in edges {
            points.push(self.node_pos[self.edge_to[e.index()].index()]);
            let len = self.edge_length_m[e.index()];
            segment_lengths_m.push(len);
            total_m += len;
        }

        PathRoute { points, segment_lengths_m, total_m }
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Edge cost in millimetres.
#[inline]
fn edge_cost_mm(network: &PathNetwork, edge: EdgeId) -> u64 {
    (network.edge_length_m[edge.index()] * 1_000.0).round() as u64
}
