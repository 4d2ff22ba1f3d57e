//! `flow-model` — the physical objects of the simulated plant.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                |
//! |--------------|---------------------------------------------------------|
//! | [`entity`]   | `Entity`, `EntityState`, `Retirement`, `TimeTotals`     |
//! | [`arena`]    | `EntityArena` — id-indexed storage, completed list      |
//! | [`location`] | `Location`, `StationBehavior`                           |
//! | [`operator`] | `Operator` — single-unit transport resource             |
//! | [`transfer`] | `TransferRequest`                                       |
//! | [`join`]     | `JoinOperation` — multi-input recipe barrier            |
//! | [`error`]    | `ModelError`, `ModelResult<T>`                          |
//!
//! # Ownership model
//!
//! The arena owns every `Entity`; locations, operators, and joins hold
//! `EntityId`s only.  Moving an entity between containers is therefore two
//! id edits, never a struct move — and a transiently "in two places" entity
//! during a handoff cannot alias anything.
//!
//! All mutation goes through the engine's dispatch handlers (single-writer
//! discipline); nothing here is internally synchronized and nothing needs
//! to be.

pub mod arena;
pub mod entity;
pub mod error;
pub mod join;
pub mod location;
pub mod operator;
pub mod transfer;


pub use arena::EntityArena;
pub use entity::{Entity, EntityState, Retirement, TimeTotals};
pub use error::{ModelError, ModelResult};
pub use join::JoinOperation;
pub use location::{Location, StationBehavior};
pub use operator::Operator;
pub use transfer::TransferRequest;
