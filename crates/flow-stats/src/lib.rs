//! `flow-stats` — statistics aggregation and reporting.
//!
//! # Crate layout
//!
//! | Module        | Contents                                             |
//! |---------------|------------------------------------------------------|
//! | [`collector`] | `StatisticsCollector`, `TypeStats`, `ContentSeries`  |
//! | [`report`]    | `format_report` — the plain-text plant summary       |
//! | [`csv`]       | `SampleWriter` — content-series CSV export           |
//! | [`error`]     | `StatsError`, `StatsResult<T>`                       |
//!
//! The collector is fed exclusively by the engine's event handlers and the
//! periodic sampler; reporting collaborators read it between steps.  It
//! holds its own aggregates only — live `Location`/`Operator` totals are
//! passed into [`report::format_report`] by reference at render time.

pub mod collector;
pub mod csv;
pub mod error;
pub mod report;


pub use collector::{ContentSeries, StatisticsCollector, TypeStats};
pub use csv::SampleWriter;
pub use error::{StatsError, StatsResult};
pub use report::format_report;
