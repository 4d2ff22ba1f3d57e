//! Arrival schedules.
//!
//! An `ArrivalSchedule` describes a recurring batch of entity arrivals.  The
//! engine builder expands each schedule into pre-scheduled `Arrival` events
//! across the run horizon; nothing re-reads the schedule at dispatch time.

use flow_core::SimTime;

/// A recurring arrival pattern for one entity type.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArrivalSchedule {
    /// Entity type to create.  Must have a registered route, otherwise the
    /// arrival is logged and skipped at dispatch time.
    pub entity_type: String,

    /// Entities created per arrival event.
    pub quantity: u32,

    /// Minute of the first arrival.
    pub first_at: f64,

    /// Minutes between consecutive arrivals.  Ignored when `batches == 1`.
    pub interval_minutes: f64,

    /// Number of arrival events.  `0` means "repeat until the horizon".
    pub batches: u32,
}

impl ArrivalSchedule {
    /// Expand into concrete arrival timestamps, bounded by `horizon`
    /// (exclusive — an arrival at the horizon would be cut off anyway).
    pub fn arrival_times(&self, horizon: SimTime) -> Vec<SimTime> {
        let mut times = Vec::new();
        let mut t = SimTime(self.first_at);
        let mut produced = 0u32;
        while t < horizon {
            if self.batches != 0 && produced >= self.batches {
                break;
            }
            times.push(t);
            produced += 1;
            if self.interval_minutes <= 0.0 {
                break; // non-repeating schedule
            }
            t = t.plus(self.interval_minutes);
        }
        times
    }
}
