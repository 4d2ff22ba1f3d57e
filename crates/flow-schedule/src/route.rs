//! Per-type production routes.
//!
//! A route is a fixed ordered list of (station, base processing minutes)
//! steps.  The step list is *data*, not a process language: branching,
//! joining, and batching are properties of the stations themselves, the
//! route only says where an entity of a given type goes next.
//!
//! # Pass-through steps
//!
//! A step whose station is the [`PASS_THROUGH`] sentinel means "no
//! processing here, advance immediately".  Route authors use it to keep step
//! indices aligned across related types; the kernel skips such steps without
//! visiting any location.

use std::collections::BTreeMap;

// ── RouteStep ─────────────────────────────────────────────────────────────────

/// Station name meaning "skip this step, no processing".
pub const PASS_THROUGH: &str = "none";

/// One entry in a production route.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteStep {
    /// Location/machine name where this step is processed.
    pub station: String,

    /// Base processing time in minutes, before the station's speed factor
    /// is applied.
    pub base_minutes: f64,
}

impl RouteStep {
    pub fn new(station: impl Into<String>, base_minutes: f64) -> Self {
        Self { station: station.into(), base_minutes }
    }

    /// `true` if this step is the no-op sentinel.
    #[inline]
    pub fn is_pass_through(&self) -> bool {
        self.station == PASS_THROUGH
    }
}

// ── Route ─────────────────────────────────────────────────────────────────────

/// A fixed ordered route for one entity type.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    steps: Vec<RouteStep>,
}

impl Route {
    pub fn new(steps: Vec<RouteStep>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Read-only slice of all steps.
    pub fn steps(&self) -> &[RouteStep] {
        &self.steps
    }

    /// The step at `idx`, or `None` past the end of the route.
    pub fn step(&self, idx: usize) -> Option<&RouteStep> {
        self.steps.get(idx)
    }

    /// Index of the first *real* (non-pass-through) step at or after `from`.
    ///
    /// `None` means the route is exhausted — the entity has reached its
    /// terminal sink and completes.
    pub fn next_stop(&self, from: usize) -> Option<usize> {
        (from..self.steps.len()).find(|&i| !self.steps[i].is_pass_through())
    }

    /// Index of the first real step of the route, if any.
    pub fn first_stop(&self) -> Option<usize> {
        self.next_stop(0)
    }
}

// ── RoutePlan ─────────────────────────────────────────────────────────────────

/// All routes, keyed by entity type name.
///
/// `BTreeMap` keeps iteration deterministic for reports and tests.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutePlan {
    routes: BTreeMap<String, Route>,
}

impl RoutePlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the route for `entity_type`.
    pub fn register(&mut self, entity_type: impl Into<String>, route: Route) {
        self.routes.insert(entity_type.into(), route);
    }

    /// The route for `entity_type`, if one is registered.
    pub fn get(&self, entity_type: &str) -> Option<&Route> {
        self.routes.get(entity_type)
    }

    /// All registered entity type names, in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> + '_ {
        self.routes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
