//! Transport operators.
//!
//! An operator is a single-unit, mutually-exclusive mover: at most one
//! in-flight transfer at a time, gated by the `busy` flag.  The engine is
//! the only caller of the mutating methods (single-writer discipline), so
//! `assign` on a busy operator is a logic error — it fails loudly in debug
//! builds and returns an error in release builds.
//!
//! # Visual channel
//!
//! Renderers interpolate the operator's drawn position from [`path`]
//! way-points and [`progress`]; the kernel itself never consumes either —
//! all scheduling decisions use only `busy` and the arrival timestamp.
//!
//! [`path`]: Operator::path
//! [`progress`]: Operator::progress

use flow_core::{EntityId, Point, SimTime};

use crate::{ModelError, ModelResult};

/// A named transport resource that carries one entity between locations.
#[derive(Clone, Debug)]
pub struct Operator {
    pub name: String,

    /// Travel speed in metres per minute.
    pub speed_m_per_min: f64,

    /// Park position when idle.
    pub home: Point,

    busy:     bool,
    carrying: Option<EntityId>,

    path:              Vec<Point>,
    segment_lengths_m: Vec<f64>,
    departed_at:       SimTime,
    arrives_at:        SimTime,

    // ── Running totals ────────────────────────────────────────────────────
    pub trips: u64,
    busy_minutes:     f64,
    travel_minutes:   f64,
    observed_minutes: f64,
    last_update:      SimTime,
}

impl Operator {
    pub fn new(name: impl Into<String>, speed_m_per_min: f64, home: Point) -> Self {
        Self {
            name:              name.into(),
            speed_m_per_min,
            home,
            busy:              false,
            carrying:          None,
            path:              Vec::new(),
            segment_lengths_m: Vec::new(),
            departed_at:       SimTime::ZERO,
            arrives_at:        SimTime::ZERO,
            trips:             0,
            busy_minutes:      0.0,
            travel_minutes:    0.0,
            observed_minutes:  0.0,
            last_update:       SimTime::ZERO,
        }
    }

    // ── State queries ─────────────────────────────────────────────────────

    #[inline]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn carrying(&self) -> Option<EntityId> {
        self.carrying
    }

    /// Way-points of the current trip (empty when idle).
    pub fn path(&self) -> &[Point] {
        &self.path
    }

    pub fn segment_lengths_m(&self) -> &[f64] {
        &self.segment_lengths_m
    }

    /// Fraction of the current trip completed at `now`, in `[0.0, 1.0]`.
    ///
    /// Returns `1.0` when idle — the operator is "at" its destination.
    pub fn progress(&self, now: SimTime) -> f64 {
        if !self.busy || self.arrives_at <= self.departed_at {
            return 1.0;
        }
        let elapsed = now.since(self.departed_at);
        let total   = self.arrives_at - self.departed_at;
        (elapsed / total).min(1.0)
    }

    // ── Transport protocol ────────────────────────────────────────────────

    /// Minutes needed to cover `distance_m`.  `loaded` is carried for
    /// call-site symmetry; this operator moves at one speed either way.
    pub fn calculate_travel_time(&self, distance_m: f64, _loaded: bool) -> f64 {
        if self.speed_m_per_min <= 0.0 {
            return 0.0;
        }
        distance_m / self.speed_m_per_min
    }

    /// Acquire the operator for `entity`.
    ///
    /// The caller must have checked [`is_busy`](Self::is_busy); acquiring a
    /// busy operator is unreachable under the dispatch-loop discipline and
    /// asserts in debug builds.
    pub fn assign(&mut self, entity: EntityId) -> ModelResult<()> {
        if self.busy {
            debug_assert!(false, "operator {} double-assigned", self.name);
            return Err(ModelError::OperatorBusy(self.name.clone()));
        }
        self.busy = true;
        self.carrying = Some(entity);
        Ok(())
    }

    /// Record the trip geometry and timing.  Rejects paths with fewer than
    /// two way-points — there is no trip to make.
    pub fn start_move(
        &mut self,
        points: Vec<Point>,
        segment_lengths_m: Vec<f64>,
        now: SimTime,
        arrives_at: SimTime,
    ) -> ModelResult<()> {
        if points.len() < 2 {
            return Err(ModelError::PathTooShort(points.len()));
        }
        self.path = points;
        self.segment_lengths_m = segment_lengths_m;
        self.departed_at = now;
        self.arrives_at = arrives_at;
        Ok(())
    }

    /// Finish the current trip: count it, release the carried entity, clear
    /// the path state, and free the busy flag.
    pub fn complete_trip(&mut self, now: SimTime) -> Option<EntityId> {
        self.trips += 1;
        let carried = self.carrying.take();
        self.path.clear();
        self.segment_lengths_m.clear();
        self.departed_at = now;
        self.arrives_at = now;
        self.busy = false;
        carried
    }

    // ── Statistics ────────────────────────────────────────────────────────

    /// Fold the span since the last update into the running totals.
    /// Idempotent at equal timestamps.
    pub fn update_statistics(&mut self, now: SimTime, counts_toward_schedule: bool) {
        let delta = now.since(self.last_update);
        let span_start = self.last_update;
        self.last_update = self.last_update.max(now);
        if delta <= 0.0 || !counts_toward_schedule {
            return;
        }
        self.observed_minutes += delta;
        if self.busy {
            self.busy_minutes += delta;
            // Portion of the span spent in actual motion.
            let overlap_start = span_start.minutes().max(self.departed_at.minutes());
            let overlap_end   = now.minutes().min(self.arrives_at.minutes());
            if overlap_end > overlap_start {
                self.travel_minutes += overlap_end - overlap_start;
            }
        }
    }

    pub fn busy_minutes(&self) -> f64 {
        self.busy_minutes
    }

    pub fn travel_minutes(&self) -> f64 {
        self.travel_minutes
    }

    /// Idle (parked) minutes within the observed span.
    pub fn park_minutes(&self) -> f64 {
        (self.observed_minutes - self.busy_minutes).max(0.0)
    }

    pub fn observed_minutes(&self) -> f64 {
        self.observed_minutes
    }

    /// Busy time over observed time, as a percentage clamped to 100.
    pub fn utilization(&self) -> f64 {
        if self.observed_minutes <= 0.0 {
            return 0.0;
        }
        (self.busy_minutes / self.observed_minutes * 100.0).min(100.0)
    }

    /// Reset totals and trip state to initial (used by `reset`).
    pub fn reset(&mut self) {
        self.busy = false;
        self.carrying = None;
        self.path.clear();
        self.segment_lengths_m.clear();
        self.departed_at = SimTime::ZERO;
        self.arrives_at = SimTime::ZERO;
        self.trips = 0;
        self.busy_minutes = 0.0;
        self.travel_minutes = 0.0;
        self.observed_minutes = 0.0;
        self.last_update = SimTime::ZERO;
    }
}
