//! The simulation event type.
//!
//! Events are immutable once created: the engine builds one, schedules it,
//! and reads it back at dispatch time.  Nothing mutates an event in flight.

use std::fmt;

use flow_core::{EntityId, SimTime};

// ── EventKind ─────────────────────────────────────────────────────────────────

/// Discriminates dispatch behavior.
///
/// **Declaration order is the tie-break priority**: among events stamped at
/// the same time, the lexically earlier variant dispatches first (derived
/// `Ord`).  This gives deterministic, reproducible ordering — e.g. an
/// arrival at `t` is admitted before the sampler at `t` observes the
/// location.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum EventKind {
    /// New entities of a type enter the system (payload = type name).
    Arrival,
    /// An entity finishes its processing step at its current location.
    EndProcessing,
    /// An operator begins a transfer trip (payload = operator name).
    StartTransportMove,
    /// An operator delivers its carried entity (payload = operator name).
    EndTransportMove,
    /// An entity's hold-time gate elapses; it may move onward.
    HoldRelease,
    /// Working hours resumed — re-check a station's queue (payload = station
    /// name, absent for the global transfer backlog) after off-hours backlog.
    ShiftStart,
    /// Periodic statistics snapshot.
    Sample,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::Arrival            => "arrival",
            EventKind::EndProcessing      => "end-processing",
            EventKind::StartTransportMove => "start-transport",
            EventKind::EndTransportMove   => "end-transport",
            EventKind::HoldRelease        => "hold-release",
            EventKind::ShiftStart         => "shift-start",
            EventKind::Sample             => "sample",
        };
        f.write_str(s)
    }
}

// ── Event ─────────────────────────────────────────────────────────────────────

/// A timed unit of work for the dispatch loop.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Event {
    pub time:    SimTime,
    pub kind:    EventKind,
    /// The entity this event concerns, when there is one.
    pub entity:  Option<EntityId>,
    /// Opaque payload — an entity type, station, or operator name depending
    /// on `kind`.
    pub payload: Option<String>,
}

impl Event {
    pub fn new(time: SimTime, kind: EventKind) -> Self {
        Self { time, kind, entity: None, payload: None }
    }

    pub fn with_entity(mut self, entity: EntityId) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.kind, self.time)?;
        if let Some(e) = self.entity {
            write!(f, " [{e}]")?;
        }
        if let Some(p) = &self.payload {
            write!(f, " ({p})")?;
        }
        Ok(())
    }
}
