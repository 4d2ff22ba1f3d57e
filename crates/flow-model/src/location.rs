//! Capacity-bounded locations (buffers + machines).
//!
//! # Capacity model
//!
//! A location holds a FIFO waiting `queue` and a bounded `processing` set.
//! The binding invariant is `processing.len() <= units`; the queue itself may
//! exceed `capacity` transiently (e.g. a JOIN output materializing in a full
//! buffer) — what `capacity` gates is *admission*: [`Location::can_accept`]
//! answers whether a new entity may be sent here, and the engine checks it
//! before every transfer.
//!
//! # Time-weighted totals
//!
//! `update_statistics` folds the span since the previous update into the
//! running busy/blocked/observed totals.  Callers invoke it *before* mutating
//! the queue or processing set at an event, so each span is weighted by the
//! occupancy that actually held during it.  A repeated call at the same
//! timestamp adds a zero-length span — the operation is idempotent.

use std::collections::VecDeque;

use flow_core::{EntityId, SimTime};

// ── StationBehavior ───────────────────────────────────────────────────────────

/// What happens when an entity finishes processing at this location.
#[derive(Clone, Debug, PartialEq)]
pub enum StationBehavior {
    /// Advance along the route.
    Normal,
    /// Feed a `JoinOperation` registered for this location.
    Join,
    /// Fixed-probability inspection: pass and continue, or scrap.
    Inspect {
        /// Probability the entity continues (e.g. `0.9`).
        pass_probability: f64,
    },
    /// One input entity becomes `count` entities of `output_type`.
    FanOut { output_type: String, count: u32 },
    /// Accumulate `size` entities, then release a single carrier downstream.
    Batch { size: u32 },
}

impl Default for StationBehavior {
    fn default() -> Self {
        StationBehavior::Normal
    }
}

// ── Location ──────────────────────────────────────────────────────────────────

/// A named, capacity-bounded buffer with parallel processing slots.
///
/// The location *logically owns* the entities listed in `queue` and
/// `processing` while they reside here; ownership transfers to the operator
/// (and then the next location) through the engine's handlers.
#[derive(Clone, Debug)]
pub struct Location {
    pub name: String,

    /// Admission bound on total contents.
    pub capacity: usize,
    /// Parallel processing slots ("machines").
    pub units: usize,
    /// Minimum dwell time after arrival before the entity may move onward.
    pub hold_minutes: f64,
    /// Per-machine speed multiplier applied to route base minutes.
    pub time_factor: f64,
    /// Whether processing here is gated by the shift calendar.
    pub uses_calendar: bool,
    /// End-of-processing semantics.
    pub behavior: StationBehavior,
    /// Operator responsible for moves *out of* this location, if transport
    /// is required.  `None` means outbound moves are immediate handoffs.
    pub operator: Option<String>,

    queue:      VecDeque<EntityId>,
    processing: Vec<EntityId>,

    // ── Running totals ────────────────────────────────────────────────────
    pub entries: u64,
    pub exits:   u64,
    busy_minutes:     f64,
    blocked_minutes:  f64,
    observed_minutes: f64,
    last_update:      SimTime,
    pub peak_contents: usize,
}

impl Location {
    pub fn new(name: impl Into<String>, capacity: usize, units: usize) -> Self {
        Self {
            name:          name.into(),
            capacity,
            units,
            hold_minutes:  0.0,
            time_factor:   1.0,
            uses_calendar: true,
            behavior:      StationBehavior::Normal,
            operator:      None,
            queue:         VecDeque::new(),
            processing:    Vec::new(),
            entries:       0,
            exits:         0,
            busy_minutes:     0.0,
            blocked_minutes:  0.0,
            observed_minutes: 0.0,
            last_update:      SimTime::ZERO,
            peak_contents:    0,
        }
    }

    // ── Fluent configuration ──────────────────────────────────────────────

    pub fn with_hold(mut self, minutes: f64) -> Self {
        self.hold_minutes = minutes;
        self
    }

    pub fn with_time_factor(mut self, factor: f64) -> Self {
        self.time_factor = factor;
        self
    }

    pub fn with_behavior(mut self, behavior: StationBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    pub fn with_calendar(mut self, uses_calendar: bool) -> Self {
        self.uses_calendar = uses_calendar;
        self
    }

    // ── Contents ──────────────────────────────────────────────────────────

    #[inline]
    pub fn contents(&self) -> usize {
        self.queue.len() + self.processing.len()
    }

    /// May a new entity be admitted here right now?
    #[inline]
    pub fn can_accept(&self) -> bool {
        self.contents() < self.capacity
    }

    #[inline]
    pub fn has_free_unit(&self) -> bool {
        self.processing.len() < self.units
    }

    pub fn queued(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.queue.iter().copied()
    }

    pub fn processing(&self) -> &[EntityId] {
        &self.processing
    }

    /// Head of the waiting queue.
    pub fn next_queued(&self) -> Option<EntityId> {
        self.queue.front().copied()
    }

    pub fn holds(&self, id: EntityId) -> bool {
        self.queue.contains(&id) || self.processing.contains(&id)
    }

    // ── Mutation (engine handlers only — single-writer discipline) ────────

    /// Append `id` to the waiting queue and count the entry.
    pub fn add_to_queue(&mut self, id: EntityId) {
        self.queue.push_back(id);
        self.entries += 1;
        self.peak_contents = self.peak_contents.max(self.contents());
    }

    /// Move `id` from the queue into a processing slot.
    ///
    /// Fails (returns `false`) when no slot is free or `id` is not queued.
    /// The binding invariant `processing.len() <= units` holds afterwards.
    pub fn move_to_processing(&mut self, id: EntityId) -> bool {
        if !self.has_free_unit() {
            return false;
        }
        let Some(pos) = self.queue.iter().position(|&q| q == id) else {
            return false;
        };
        self.queue.remove(pos);
        self.processing.push(id);
        debug_assert!(self.processing.len() <= self.units);
        true
    }

    /// Move `id` from a processing slot back to the waiting queue without
    /// counting an exit/entry — the entity never left this location.  Used
    /// when consecutive route steps share a station.
    pub fn return_to_queue(&mut self, id: EntityId) -> bool {
        let Some(pos) = self.processing.iter().position(|&p| p == id) else {
            return false;
        };
        self.processing.remove(pos);
        self.queue.push_back(id);
        true
    }

    /// Remove `id` from whichever sub-collection holds it and count the
    /// exit.  Returns `false` if the entity was not here.
    pub fn remove(&mut self, id: EntityId) -> bool {
        if let Some(pos) = self.queue.iter().position(|&q| q == id) {
            self.queue.remove(pos);
        } else if let Some(pos) = self.processing.iter().position(|&p| p == id) {
            self.processing.remove(pos);
        } else {
            return false;
        }
        self.exits += 1;
        true
    }

    /// Drop every entity without counting exits (used by `reset`).
    pub fn clear(&mut self) {
        self.queue.clear();
        self.processing.clear();
    }

    // ── Statistics ────────────────────────────────────────────────────────

    /// Fold the span since the last update into the running totals.
    ///
    /// * `counts_toward_schedule` — `false` outside working hours for
    ///   calendar-gated locations; the span is then not observed at all, so
    ///   off-shift idleness cannot dilute utilization.
    /// * `blocked_units` — processing-slot occupants that are finished and
    ///   waiting to leave (the engine derives this from entity states).
    ///
    /// Idempotent at equal timestamps: the second call sees a zero delta.
    pub fn update_statistics(
        &mut self,
        now: SimTime,
        counts_toward_schedule: bool,
        blocked_units: usize,
    ) {
        let delta = now.since(self.last_update);
        self.last_update = self.last_update.max(now);
        if delta <= 0.0 || !counts_toward_schedule {
            return;
        }
        self.observed_minutes += delta;
        self.busy_minutes += delta * self.processing.len().min(self.units) as f64;
        self.blocked_minutes += delta * blocked_units as f64;
    }

    pub fn busy_minutes(&self) -> f64 {
        self.busy_minutes
    }

    pub fn blocked_minutes(&self) -> f64 {
        self.blocked_minutes
    }

    pub fn observed_minutes(&self) -> f64 {
        self.observed_minutes
    }

    pub fn last_update(&self) -> SimTime {
        self.last_update
    }

    /// Busy time over observed unit-time, as a percentage clamped to 100.
    pub fn utilization(&self) -> f64 {
        if self.units == 0 || self.observed_minutes <= 0.0 {
            return 0.0;
        }
        (self.busy_minutes / (self.observed_minutes * self.units as f64) * 100.0).min(100.0)
    }

    /// Reset running totals and contents to their initial state.
    pub fn reset(&mut self) {
        self.clear();
        self.entries = 0;
        self.exits = 0;
        self.busy_minutes = 0.0;
        self.blocked_minutes = 0.0;
        self.observed_minutes = 0.0;
        self.last_update = SimTime::ZERO;
        self.peak_contents = 0;
    }
}
