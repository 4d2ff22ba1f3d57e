//! Run observer trait for progress reporting and data collection.

use flow_core::SimTime;
use flow_schedule::Event;

/// Callbacks invoked by [`SimulationEngine::run`][crate::SimulationEngine::run]
/// at key points of the dispatch loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — event printer
///
/// ```rust,ignore
/// struct EventPrinter;
///
/// impl EngineObserver for EventPrinter {
///     fn on_event(&mut self, event: &Event) {
///         println!("{event}");
///     }
/// }
/// ```
pub trait EngineObserver {
    /// Called after each event is dispatched.
    fn on_event(&mut self, _event: &Event) {}

    /// Called after each periodic statistics sample.
    fn on_sample(&mut self, _time: SimTime) {}

    /// Called once when the run finishes (horizon reached or queue drained).
    fn on_end(&mut self, _final_time: SimTime) {}
}

/// An [`EngineObserver`] that does nothing.  Use when you need to call `run`
/// but don't want progress callbacks.
pub struct NoopObserver;

impl EngineObserver for NoopObserver {}
