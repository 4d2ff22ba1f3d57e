//! `flow-path` — transport network graph and shortest-path routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                             |
//! |-------------|------------------------------------------------------|
//! | [`network`] | `PathNetwork` (CSR graph), `PathNetworkBuilder`      |
//! | [`router`]  | `PathRoute`, `PathNetwork::shortest_path` (Dijkstra) |
//! | [`error`]   | `PathError`, `PathResult<T>`                         |
//!
//! The network maps plant locations (by name) onto graph nodes and answers
//! shortest-path queries with ordered way-points plus per-segment distances,
//! which is exactly what a transport operator needs to compute travel time.

pub mod error;
pub mod network;
pub mod router;


pub use error::{PathError, PathResult};
pub use network::{PathNetwork, PathNetworkBuilder};
pub use router::PathRoute;
