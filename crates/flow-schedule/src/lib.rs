//! `flow-schedule` — routes, arrivals, working hours, and the event queue.
//!
//! # Crate layout
//!
//! | Module       | Contents                                             |
//! |--------------|------------------------------------------------------|
//! | [`route`]    | `RouteStep`, `Route`, `RoutePlan`, `PASS_THROUGH`    |
//! | [`arrival`]  | `ArrivalSchedule` (expanded into timed events)       |
//! | [`calendar`] | `ShiftCalendar` — 168-slot weekly working-hours grid |
//! | [`event`]    | `Event`, `EventKind` (kind order = tie priority)     |
//! | [`queue`]    | `EventQueue` (min-heap on `(time, kind, seq)`)       |
//! | [`loader`]   | `load_routes_csv`, `load_routes_reader`              |
//! | [`error`]    | `ScheduleError`, `ScheduleResult<T>`                 |
//!
//! Everything here is *timetable data* plus the structure that orders it;
//! the dispatch semantics live in `flow-engine`.

pub mod arrival;
pub mod calendar;
pub mod error;
pub mod event;
pub mod loader;
pub mod queue;
pub mod route;

#[cfg(test)]
mod tests;

pub use arrival::ArrivalSchedule;
pub use calendar::ShiftCalendar;
pub use error::{ScheduleError, ScheduleResult};
pub use event::{Event, EventKind};
pub use loader::{load_routes_csv, load_routes_reader};
pub use queue::EventQueue;
pub use route::{PASS_THROUGH, Route, RoutePlan, RouteStep};
