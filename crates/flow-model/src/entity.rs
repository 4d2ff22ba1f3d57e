//! Routed work items.
//!
//! # State machine
//!
//! ```text
//! Created → Queued → Processing ─→ WaitingForTransport → InTransit ─→ Queued …
//!                        │                  ↑ ↓
//!                        │               Blocked  (destination full)
//!                        └────────────→ Completed (route done / consumed)
//! ```
//!
//! Every state change goes through [`Entity::set_state`], which folds the
//! elapsed span into the per-category time totals — that is what makes the
//! per-entity waiting/processing/movement/blocked averages in the final
//! report add up to the system time without a second bookkeeping pass.

use std::fmt;

use flow_core::{EntityId, SimTime};

// ── EntityState ───────────────────────────────────────────────────────────────

/// Lifecycle state of an entity.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum EntityState {
    /// Allocated but not yet admitted anywhere.
    Created,
    /// In a location's waiting queue.
    Queued,
    /// Occupying a processing slot.
    Processing,
    /// Finished its step; a transfer request is pending.
    WaitingForTransport,
    /// Carried by an operator between locations.
    InTransit,
    /// Wants to move but the destination lacks capacity.
    Blocked,
    /// Retired — route complete or consumed.  Terminal.
    Completed,
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityState::Created             => "created",
            EntityState::Queued              => "queued",
            EntityState::Processing          => "processing",
            EntityState::WaitingForTransport => "waiting-for-transport",
            EntityState::InTransit           => "in-transit",
            EntityState::Blocked             => "blocked",
            EntityState::Completed           => "completed",
        };
        f.write_str(s)
    }
}

// ── Retirement ────────────────────────────────────────────────────────────────

/// Why an entity reached `Completed`.
///
/// Batch members are marked `Completed` *and* `BatchConsumed` — the source
/// system's ambiguous "completed" flag is preserved, but reports can still
/// separate real throughput from consumption.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Retirement {
    /// Walked off the end of its route (terminal sink).
    Finished,
    /// Failed an inspect-station draw.
    Scrapped,
    /// Drained as a JOIN recipe input.
    JoinConsumed,
    /// Absorbed into a batch; the carrier advanced in its place.
    BatchConsumed,
    /// Converted at a fan-out station into entities of another type.
    SplitConsumed,
}

// ── TimeTotals ────────────────────────────────────────────────────────────────

/// Per-category accumulated minutes for one entity.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TimeTotals {
    pub processing: f64,
    pub movement:   f64,
    pub waiting:    f64,
    pub blocked:    f64,
}

impl TimeTotals {
    /// Sum of all categories — equals system time for a retired entity.
    pub fn total(&self) -> f64 {
        self.processing + self.movement + self.waiting + self.blocked
    }
}

// ── Entity ────────────────────────────────────────────────────────────────────

/// A routed work item.
///
/// The entity does not own its location — it carries the location *name*
/// (the arena and the locations hold ids, never the other way around), which
/// sidesteps the aliasing problem of an entity being "in two places" during
/// a move.
#[derive(Clone, Debug)]
pub struct Entity {
    pub id:   EntityId,
    /// Entity type name; immutable, selects the route.
    pub kind: String,

    /// Current route step index.
    pub step: usize,
    pub state: EntityState,
    state_since: SimTime,

    /// Name of the location currently holding this entity, if any.
    pub location: Option<String>,

    /// Hold-time gate: the entity may not move onward before this time.
    pub ready_at: SimTime,

    pub created_at:   SimTime,
    pub completed_at: Option<SimTime>,
    pub retirement:   Option<Retirement>,

    pub totals: TimeTotals,
}

impl Entity {
    pub(crate) fn new(id: EntityId, kind: impl Into<String>, now: SimTime) -> Self {
        Self {
            id,
            kind:         kind.into(),
            step:         0,
            state:        EntityState::Created,
            state_since:  now,
            location:     None,
            ready_at:     now,
            created_at:   now,
            completed_at: None,
            retirement:   None,
            totals:       TimeTotals::default(),
        }
    }

    /// Transition to `state` at `now`, folding the elapsed span into the
    /// bucket of the *old* state.
    pub fn set_state(&mut self, now: SimTime, state: EntityState) {
        let span = now.since(self.state_since);
        match self.state {
            EntityState::Created
            | EntityState::Queued
            | EntityState::WaitingForTransport => self.totals.waiting += span,
            EntityState::Processing            => self.totals.processing += span,
            EntityState::InTransit             => self.totals.movement += span,
            EntityState::Blocked               => self.totals.blocked += span,
            EntityState::Completed             => {} // terminal; nothing accrues
        }
        self.state = state;
        self.state_since = now;
    }

    /// When the current state was entered.
    #[inline]
    pub fn state_since(&self) -> SimTime {
        self.state_since
    }

    /// Has the hold-time gate elapsed?
    #[inline]
    pub fn is_ready(&self, now: SimTime) -> bool {
        self.ready_at <= now
    }

    pub fn is_completed(&self) -> bool {
        self.state == EntityState::Completed
    }

    /// Total minutes in the system, for retired entities.
    pub fn system_minutes(&self) -> Option<f64> {
        self.completed_at.map(|done| done.since(self.created_at))
    }
}
