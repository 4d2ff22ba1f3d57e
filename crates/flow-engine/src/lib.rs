//! `flow-engine` — the dispatch loop orchestrator of the flowsim framework.
//!
//! # Event loop
//!
//! ```text
//! while next event time < horizon:
//!   ① pop lowest-(time, kind, seq) event; clock jumps to its time
//!   ② dispatch by kind — the handlers are the only writers of entity,
//!      location, operator, and join state
//!   ③ handlers schedule follow-up events (never block, never sleep)
//! one final statistics pass at max(last sample, last meaningful event)
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use flow_engine::{EngineBuilder, NoopObserver};
//!
//! let mut engine = EngineBuilder::new(config)
//!     .location(Location::new("M1", 10, 1))
//!     .routes(routes)
//!     .arrival(arrivals)
//!     .build()?;
//! engine.run(&mut NoopObserver);
//! println!("{}", engine.report());
//! ```

pub mod builder;
pub mod engine;
pub mod error;
pub mod observer;

#[cfg(test)]
mod tests;

pub use builder::EngineBuilder;
pub use engine::SimulationEngine;
pub use error::{EngineError, EngineResult};
pub use observer::{EngineObserver, NoopObserver};
