//! `flow-core` — foundational types for the `flowsim` production-flow
//! simulation framework.
//!
//! This crate is a dependency of every other `flow-*` crate.  It intentionally
//! has no `flow-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                      |
//! |-----------|-----------------------------------------------|
//! | [`ids`]   | `EntityId`, `NodeId`, `EdgeId`                |
//! | [`point`] | `Point` (plant-floor metres)                  |
//! | [`time`]  | `SimTime`, `SimClock`, `SimConfig`            |
//! | [`rng`]   | `SimRng` (deterministic, seed-driven)         |
//! | [`error`] | `FlowError`, `FlowResult`                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod error;
pub mod ids;
pub mod point;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{FlowError, FlowResult};
pub use ids::{EdgeId, EntityId, NodeId};
pub use point::Point;
pub use rng::SimRng;
pub use time::{
    HOURS_PER_WEEK, MINUTES_PER_DAY, MINUTES_PER_HOUR, MINUTES_PER_WEEK, SimClock, SimConfig,
    SimTime,
};
