//! Transport network representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_from[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays (`edge_from`, `edge_to`, `edge_length_m`) are sorted by
//! source node and indexed by `EdgeId`.  Iteration over a node's outgoing
//! edges is therefore a contiguous memory scan — ideal for Dijkstra's inner
//! loop.
//!
//! # Undirected links
//!
//! Plant aisles carry traffic both ways, so [`PathNetworkBuilder::add_link`]
//! stores two directed edges.  Duplicate links between the same node pair are
//! discarded by a normalized `(min, max)` key.
//!
//! # Location bindings
//!
//! Locations are addressed by name throughout the framework.  The network
//! keeps a `name → NodeId` map; it is the only part of the structure that may
//! change after [`build`](PathNetworkBuilder::build) — new bindings can be
//! registered on a live network, the node/edge arrays cannot.

use rustc_hash::{FxHashMap, FxHashSet};

use flow_core::{EdgeId, NodeId, Point};

// ── PathNetwork ───────────────────────────────────────────────────────────────

/// Undirected transport graph in CSR format plus a location-name index.
///
/// All CSR fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`PathNetworkBuilder`].
pub struct PathNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Plant-floor position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<Point>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Outgoing edges of node `n` are at EdgeIds
    /// `node_out_start[n] .. node_out_start[n+1]`.
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    /// Source node of each edge.  Redundant with CSR but required for
    /// efficient route reconstruction (trace `prev_edge` back to source).
    pub edge_from: Vec<NodeId>,

    /// Destination node of each edge.
    pub edge_to: Vec<NodeId>,

    /// Length of each edge in metres.  Used as Dijkstra edge cost.
    pub edge_length_m: Vec<f64>,

    // ── Location index ────────────────────────────────────────────────────
    locations: FxHashMap<String, NodeId>,
}

impl PathNetwork {
    /// Construct an empty network with no nodes, edges, or bindings.
    ///
    /// Useful when no transport routing is needed (operator-less scenarios);
    /// every path query against an empty network fails and the engine falls
    /// back to straight-line estimates.
    pub fn empty() -> Self {
        PathNetworkBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    ///
    /// This is a contiguous index range — no heap allocation.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Out-degree of `node` (number of outgoing edges).
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    // ── Location queries ──────────────────────────────────────────────────

    /// The node a location name is bound to, if any.
    pub fn node_for(&self, location: &str) -> Option<NodeId> {
        self.locations.get(location).copied()
    }

    /// The plant-floor position of a bound location, if any.
    pub fn position_of(&self, location: &str) -> Option<Point> {
        self.node_for(location).map(|n| self.node_pos[n.index()])
    }

    /// Register (or re-register) a location-name binding on a live network.
    ///
    /// This is the only mutation allowed after construction; the node and
    /// edge arrays are immutable.  Out-of-range nodes are rejected.
    pub fn bind_location(&mut self, name: impl Into<String>, node: NodeId) -> bool {
        if node.index() >= self.node_count() {
            return false;
        }
        self.locations.insert(name.into(), node);
        true
    }

    /// All location bindings, for snapshot/report consumers.
    pub fn locations(&self) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.locations.iter().map(|(k, &v)| (k.as_str(), v))
    }
}

// ── PathNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`PathNetwork`] incrementally, then call [`build`](Self::build).
///
/// The builder accepts nodes, undirected links, and location bindings in any
/// order.  `build()` sorts edges by source node and constructs the CSR arrays.
///
/// # Example
///
/// ```
/// use flow_core::Point;
/// use flow_path::PathNetworkBuilder;
///
/// let mut b = PathNetworkBuilder::new();
/// let a = b.add_node(Point::new(0.0, 0.0));
/// let c = b.add_node(Point::new(12.0, 0.0));
/// b.add_link(a, c, 12.0);
/// b.bind_location("LAGAR", a);
/// b.bind_location("MOLINO", c);
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // bidirectional
/// ```
pub struct PathNetworkBuilder {
    nodes:     Vec<Point>,
    raw_edges: Vec<RawEdge>,
    seen:      FxHashSet<(u32, u32)>,
    locations: FxHashMap<String, NodeId>,
}

struct RawEdge {
    from:     NodeId,
    to:       NodeId,
    length_m: f64,
}

impl PathNetworkBuilder {
    pub fn new() -> Self {
        Self {
            nodes:     Vec::new(),
            raw_edges: Vec::new(),
            seen:      FxHashSet::default(),
            locations: FxHashMap::default(),
        }
    }

    /// Add a network node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: Point) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Add an **undirected** link of `length_m` metres between `a` and `b`.
    ///
    /// A second link between the same pair (in either order) is discarded;
    /// returns `false` in that case.  Self-links are discarded too.
    pub fn add_link(&mut self, a: NodeId, b: NodeId, length_m: f64) -> bool {
        if a == b {
            return false;
        }
        let key = (a.0.min(b.0), a.0.max(b.0));
        if !self.seen.insert(key) {
            return false;
        }
        self.raw_edges.push(RawEdge { from: a, to: b, length_m });
        self.raw_edges.push(RawEdge { from: b, to: a, length_m });
        true
    }

    /// Bind a location name to a node.
    pub fn bind_location(&mut self, name: impl Into<String>, node: NodeId) {
        self.locations.insert(name.into(), node);
    }

    /// Look up the position of a node added earlier.
    pub fn node_pos(&self, id: NodeId) -> Point {
        self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`PathNetwork`].
    ///
    /// Time complexity: O(E log E) for the edge sort, where E = edges.
    pub fn build(self) -> PathNetwork {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        // Sort edges by source node for CSR construction.
        let mut raw = self.raw_edges;
        raw.sort_unstable_by_key(|e| e.from.0);

        // Build edge arrays from sorted raw edges.
        let edge_from:     Vec<NodeId> = raw.iter().map(|e| e.from).collect();
        let edge_to:       Vec<NodeId> = raw.iter().map(|e| e.to).collect();
        let edge_length_m: Vec<f64>    = raw.iter().map(|e| e.length_m).collect();

        // Build CSR row pointer (node_out_start).
        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        PathNetwork {
            node_pos: self.nodes,
            node_out_start,
            edge_from,
            edge_to,
            edge_length_m,
            locations: self.locations,
        }
    }
}

impl Default for PathNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
