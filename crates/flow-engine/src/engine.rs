//! The `SimulationEngine` and its dispatch loop.
//!
//! # Single-writer discipline
//!
//! Exactly one event is dispatched at a time and every mutation of entity,
//! location, operator, or join state happens inside the handlers below.
//! Collaborators (UI, report generators) read through snapshot accessors
//! between steps; nothing in here blocks or sleeps — all waiting is a
//! scheduled future event.
//!
//! # Dispatch cycle
//!
//! ```text
//! pop lowest-(time, kind, seq) event
//!   → stop before processing if time >= horizon (strict cutoff)
//!   → advance clock (regression is rejected, never applied)
//!   → handler by kind:
//!       Arrival            create entity, admit at first route station
//!       EndProcessing      join / inspect / fan-out / batch / advance
//!       StartTransportMove trip departure marker
//!       EndTransportMove   deliver, apply hold, drain transfer backlog
//!       HoldRelease        retry transfer scheduling
//!       ShiftStart         working hours resumed — re-check backlog
//!       Sample             periodic statistics snapshot
//! ```

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, trace, warn};

use flow_core::{EntityId, SimClock, SimConfig, SimRng, SimTime};
use flow_model::{
    Entity, EntityArena, EntityState, JoinOperation, Location, Operator, Retirement,
    StationBehavior, TransferRequest,
};
use flow_path::PathNetwork;
use flow_schedule::{ArrivalSchedule, Event, EventKind, EventQueue, RoutePlan, ShiftCalendar};
use flow_stats::{StatisticsCollector, format_report};

use crate::EngineObserver;

// ── SimulationEngine ──────────────────────────────────────────────────────────

/// The orchestrator: owns every component and drives the event loop.
///
/// Create via [`EngineBuilder`][crate::EngineBuilder].
pub struct SimulationEngine {
    pub(crate) config: SimConfig,
    pub(crate) clock: SimClock,
    pub(crate) queue: EventQueue,
    pub(crate) arena: EntityArena,

    /// Locations by name.  `BTreeMap` keeps iteration deterministic.
    pub(crate) locations: BTreeMap<String, Location>,
    pub(crate) operators: BTreeMap<String, Operator>,
    /// Join barriers, keyed by the location they are attached to.
    pub(crate) joins: BTreeMap<String, JoinOperation>,

    pub(crate) routes: RoutePlan,
    pub(crate) arrivals: Vec<ArrivalSchedule>,
    pub(crate) network: PathNetwork,
    pub(crate) calendar: ShiftCalendar,
    pub(crate) stats: StatisticsCollector,
    pub(crate) rng: SimRng,

    /// Pending transfer requests, in insertion order.
    pub(crate) transfers: Vec<TransferRequest>,
    /// In-flight entities per destination — counted against capacity so two
    /// simultaneous assignments cannot overfill one buffer.
    pub(crate) inbound: BTreeMap<String, usize>,
    /// Batch-accumulate counters, keyed by `(location, entity type)`.
    pub(crate) batch_counts: BTreeMap<(String, String), u32>,
    /// Shift wakeups already scheduled (`None` = global transfer backlog).
    pub(crate) pending_wakeups: BTreeSet<Option<String>>,

    pub(crate) last_sample: SimTime,
    pub(crate) last_activity: SimTime,
    pub(crate) paused: bool,
    pub(crate) finished: bool,
}

impl SimulationEngine {
    // ── Run control ───────────────────────────────────────────────────────

    /// Dispatch the next event.
    ///
    /// Returns the processed event, or `None` when the run is over (horizon
    /// reached or queue drained) — the final statistics pass has then
    /// already been taken.
    pub fn step(&mut self) -> Option<Event> {
        if self.finished {
            return None;
        }
        let next_time = match self.queue.next_time() {
            Some(t) => t,
            None => {
                self.finish();
                return None;
            }
        };
        // Strict horizon cutoff: an event at or beyond the horizon ends the
        // run *before* being processed.
        if next_time >= self.config.end_time() {
            self.finish();
            return None;
        }

        let event = self.queue.pop_next().expect("next_time saw an event");
        if !self.clock.advance_to(event.time) {
            warn!(%event, now = %self.clock.now(), "event stamped before current time — rejected");
            return Some(event);
        }
        if event.kind != EventKind::Sample {
            self.last_activity = event.time;
        }
        trace!(%event, "dispatch");
        self.dispatch(&event);
        Some(event)
    }

    /// Run until the horizon, queue exhaustion, or [`pause`](Self::pause).
    pub fn run<O: EngineObserver>(&mut self, observer: &mut O) {
        info!(horizon_minutes = self.config.horizon_minutes, "starting run");
        while !self.paused {
            match self.step() {
                Some(event) => {
                    if event.kind == EventKind::Sample {
                        observer.on_sample(event.time);
                    }
                    observer.on_event(&event);
                }
                None => break,
            }
        }
        if self.finished {
            observer.on_end(self.clock.now());
            info!(now = %self.clock.now(), entities = self.arena.len(), "run finished");
        }
    }

    /// Stop `run` at the next event boundary.  `step` stays usable.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Discard all queued events and reinitialize every component from the
    /// retained scenario.  Coarse by design — there is no mid-event cancel.
    pub fn reset(&mut self) {
        info!("resetting simulation");
        self.queue.clear();
        self.arena = EntityArena::new();
        for loc in self.locations.values_mut() {
            loc.reset();
        }
        for op in self.operators.values_mut() {
            op.reset();
        }
        for join in self.joins.values_mut() {
            join.clear();
        }
        self.transfers.clear();
        self.inbound.clear();
        self.batch_counts.clear();
        self.pending_wakeups.clear();
        self.stats.reset();
        self.clock = SimClock::new();
        self.rng = SimRng::new(self.config.seed);
        self.last_sample = SimTime::ZERO;
        self.last_activity = SimTime::ZERO;
        self.paused = false;
        self.finished = false;
        self.initialize();
    }

    /// Pre-schedule arrivals and the first sample.  Called once by the
    /// builder and again on every [`reset`](Self::reset).
    pub(crate) fn initialize(&mut self) {
        let horizon = self.config.end_time();
        for sched in self.arrivals.clone() {
            for t in sched.arrival_times(horizon) {
                for _ in 0..sched.quantity.max(1) {
                    self.queue.schedule(
                        Event::new(t, EventKind::Arrival).with_payload(sched.entity_type.clone()),
                    );
                }
            }
        }
        let interval = self.config.sample_interval_minutes;
        if interval > 0.0 {
            let first = SimTime(interval);
            if first < horizon {
                self.queue.schedule(Event::new(first, EventKind::Sample));
            }
        }
    }

    /// Seal the run and take the closing statistics pass at the later of the
    /// last sample and the last operationally-meaningful event, so averages
    /// are not biased by a truncated final period.
    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        let t_final = self.last_sample.max(self.last_activity);
        let _ = self.clock.advance_to(t_final);
        self.take_sample(t_final);
        self.last_sample = t_final;
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    fn dispatch(&mut self, event: &Event) {
        match event.kind {
            EventKind::Arrival            => self.handle_arrival(event),
            EventKind::EndProcessing      => self.handle_end_processing(event),
            EventKind::StartTransportMove => self.handle_start_transport(event),
            EventKind::EndTransportMove   => self.handle_end_transport(event),
            EventKind::HoldRelease        => self.handle_hold_release(event),
            EventKind::ShiftStart         => self.handle_shift_start(event),
            EventKind::Sample             => self.handle_sample(),
        }
    }

    fn handle_arrival(&mut self, event: &Event) {
        let Some(kind) = event.payload.clone() else {
            warn!("arrival event without an entity type — skipped");
            return;
        };
        // The payload carries the type directly; nothing scans the queue.
        let station = {
            let Some(route) = self.routes.get(&kind) else {
                warn!(%kind, "arrival for unknown entity type — skipped");
                return;
            };
            let Some(first) = route.first_stop() else {
                warn!(%kind, "arrival for route with no processing steps — skipped");
                return;
            };
            route.step(first).expect("first_stop is in range").station.clone()
        };
        if !self.locations.contains_key(&station) {
            warn!(%kind, %station, "arrival routed to unknown location — skipped");
            return;
        }
        self.spawn_entity(&kind, &station);
    }

    fn handle_end_processing(&mut self, event: &Event) {
        let Some(id) = event.entity else { return };
        let (kind, station) = {
            let Some(e) = self.arena.get(id) else { return };
            if e.state != EntityState::Processing {
                debug!(entity = %id, state = %e.state, "stale end-processing — ignored");
                return;
            }
            let Some(loc) = e.location.clone() else {
                warn!(entity = %id, "processing entity with no location");
                return;
            };
            (e.kind.clone(), loc)
        };
        self.update_location_stats(&station);

        let behavior = self.locations[&station].behavior.clone();
        match behavior {
            StationBehavior::Normal => self.advance_route(id, &station),

            StationBehavior::Inspect { pass_probability } => {
                if self.rng.gen_bool(pass_probability) {
                    self.advance_route(id, &station);
                } else {
                    debug!(entity = %id, %station, "failed inspection — scrapped");
                    self.remove_and_retire(id, &station, Retirement::Scrapped);
                    self.after_capacity_freed(&station);
                }
            }

            StationBehavior::Join => self.feed_join(id, &kind, &station),

            StationBehavior::FanOut { output_type, count } => {
                debug!(entity = %id, %station, %output_type, count, "fan-out");
                self.remove_and_retire(id, &station, Retirement::SplitConsumed);
                for _ in 0..count {
                    self.spawn_entity(&output_type, &station);
                }
                self.after_capacity_freed(&station);
            }

            StationBehavior::Batch { size } => {
                let counter = self
                    .batch_counts
                    .entry((station.clone(), kind.clone()))
                    .or_insert(0);
                *counter += 1;
                if *counter >= size {
                    // The triggering entity is the carrier for the whole batch.
                    *counter = 0;
                    self.advance_route(id, &station);
                } else {
                    self.remove_and_retire(id, &station, Retirement::BatchConsumed);
                    self.after_capacity_freed(&station);
                }
            }
        }
    }

    /// JOIN handling: recipe inputs move into the barrier; anything else
    /// passes through the station as if it were normal.
    fn feed_join(&mut self, id: EntityId, kind: &str, station: &str) {
        let is_input = self
            .joins
            .get(station)
            .is_some_and(|j| j.recipe().contains_key(kind));
        if !is_input {
            // Feeding a non-recipe type is a no-op on the barrier.
            self.advance_route(id, station);
            return;
        }

        let now = self.clock.now();
        if let Some(loc) = self.locations.get_mut(station) {
            loc.remove(id);
        }
        if let Some(e) = self.arena.get_mut(id) {
            e.location = None;
            e.set_state(now, EntityState::Queued);
        }

        let fired = {
            let join = self.joins.get_mut(station).expect("is_input checked the key");
            join.add_entity(kind, id);
            join.can_execute()
        };
        self.after_capacity_freed(station);

        if fired {
            let join = self.joins.get_mut(station).expect("checked above");
            let consumed = join.execute().expect("can_execute was true");
            let output_type = join.output_type.clone();
            debug!(station, %output_type, inputs = consumed.len(), "join fired");
            for input in consumed {
                self.arena.retire(input, now, Retirement::JoinConsumed);
                if let Some(e) = self.arena.get(input) {
                    self.stats.record_retirement(e, now);
                }
            }
            // The output re-enters routing from this point.
            self.spawn_entity(&output_type, station);
        }
    }

    /// Advance past any pass-through steps and either re-queue here, request
    /// a transfer, or retire at the terminal sink.
    fn advance_route(&mut self, id: EntityId, station: &str) {
        let next = {
            let e = self.arena.get(id).expect("caller validated the entity");
            self.routes.get(&e.kind).and_then(|route| {
                route
                    .next_stop(e.step + 1)
                    .and_then(|idx| route.step(idx).map(|s| (idx, s.station.clone())))
            })
        };

        match next {
            None => {
                // Route exhausted — terminal sink.
                self.remove_and_retire(id, station, Retirement::Finished);
                self.after_capacity_freed(station);
            }
            Some((idx, dest)) => {
                self.arena.get_mut(id).expect("validated").step = idx;
                if dest == station {
                    // Consecutive steps at the same station: back to the queue.
                    let now = self.clock.now();
                    self.locations
                        .get_mut(station)
                        .expect("entity resides here")
                        .return_to_queue(id);
                    self.arena.get_mut(id).expect("validated").set_state(now, EntityState::Queued);
                    self.try_start_processing(station);
                } else {
                    self.request_transfer(id, station, &dest);
                }
            }
        }
    }

    fn handle_start_transport(&mut self, event: &Event) {
        // Departure marker: the trip state was recorded at assignment time
        // (assignment and departure share a timestamp); this event exists so
        // observers see the paired bracket of every trip.
        trace!(%event, "transport departure");
    }

    fn handle_end_transport(&mut self, event: &Event) {
        let Some(id) = event.entity else { return };
        let now = self.clock.now();

        if let Some(op_name) = &event.payload {
            let working = self.calendar.is_working_time(now);
            if let Some(op) = self.operators.get_mut(op_name) {
                op.update_statistics(now, working);
                op.complete_trip(now);
            }
        }

        let Some(dest) = self.step_station(id) else {
            warn!(entity = %id, "delivered entity has no current station");
            return;
        };
        if let Some(n) = self.inbound.get_mut(&dest) {
            *n = n.saturating_sub(1);
        }
        if !self.locations.contains_key(&dest) {
            warn!(entity = %id, %dest, "delivery to unknown location — entity dropped");
            return;
        }
        self.admit(id, &dest);
        // The operator is free again — drain the backlog.
        self.try_schedule_transfer();
    }

    fn handle_hold_release(&mut self, _event: &Event) {
        // The entity's ready_at has elapsed by construction of the event
        // time; all that is needed is a scheduling retry.
        self.try_schedule_transfer();
    }

    fn handle_shift_start(&mut self, event: &Event) {
        let target = event.payload.clone();
        self.pending_wakeups.remove(&target);
        if let Some(station) = &target {
            self.try_start_processing(station);
        }
        self.try_schedule_transfer();
    }

    fn handle_sample(&mut self) {
        let now = self.clock.now();
        self.last_sample = now;
        self.take_sample(now);

        let interval = self.config.sample_interval_minutes;
        if interval > 0.0 {
            let next = now.plus(interval);
            if next < self.config.end_time() {
                self.queue.schedule(Event::new(next, EventKind::Sample));
            }
        }
    }

    // ── Entity admission and processing ───────────────────────────────────

    /// Create an entity of `kind` at `station` and admit it.  Returns `None`
    /// (with a warning) when the type has no usable route.
    fn spawn_entity(&mut self, kind: &str, station: &str) -> Option<EntityId> {
        let now = self.clock.now();
        let Some(first) = self.routes.get(kind).and_then(|r| r.first_stop()) else {
            warn!(kind, "no route for produced entity type — skipped");
            return None;
        };
        let id = self.arena.alloc(kind, now);
        self.arena.get_mut(id).expect("just allocated").step = first;
        self.stats.record_arrival(kind, now);

        if !self.locations.contains_key(station) {
            warn!(kind, station, "spawn location unknown — entity retired unprocessed");
            self.arena.retire(id, now, Retirement::Finished);
            if let Some(e) = self.arena.get(id) {
                self.stats.record_retirement(e, now);
            }
            return None;
        }
        self.admit(id, station);
        Some(id)
    }

    /// Physically place `id` at `station`: enqueue, apply the hold gate, and
    /// either start processing here or request a transfer toward the
    /// entity's current step station.
    fn admit(&mut self, id: EntityId, station: &str) {
        let now = self.clock.now();
        let hold = self.locations[station].hold_minutes;

        self.update_location_stats(station);
        self.locations
            .get_mut(station)
            .expect("caller checked existence")
            .add_to_queue(id);

        {
            let e = self.arena.get_mut(id).expect("caller validated");
            e.location = Some(station.to_string());
            e.set_state(now, EntityState::Queued);
            e.ready_at = now.plus(hold.max(0.0));
        }
        if hold > 0.0 {
            self.queue
                .schedule(Event::new(now.plus(hold), EventKind::HoldRelease).with_entity(id));
        }

        match self.step_station(id) {
            Some(dest) if dest == station => self.try_start_processing(station),
            Some(dest) => self.request_transfer(id, station, &dest),
            None => {
                // Admitted past its last step — treat as a terminal sink.
                self.remove_and_retire(id, station, Retirement::Finished);
                self.after_capacity_freed(station);
            }
        }
    }

    /// Start processing queued entities at `station` while free units last.
    /// Calendar-gated stations accumulate backlog off-hours and are woken by
    /// a `ShiftStart` event instead.
    fn try_start_processing(&mut self, station: &str) {
        let now = self.clock.now();
        {
            let Some(loc) = self.locations.get(station) else { return };
            if loc.uses_calendar && !self.calendar.is_working_time(now) {
                let backlog = loc.queued().any(|qid| {
                    self.arena.get(qid).is_some_and(|e| e.state == EntityState::Queued)
                });
                if backlog {
                    self.schedule_shift_wakeup(Some(station.to_string()));
                }
                return;
            }
        }

        loop {
            let candidate = {
                let loc = self.locations.get(station).expect("checked above");
                if !loc.has_free_unit() {
                    break;
                }
                loc.queued().find(|&qid| {
                    self.arena.get(qid).is_some_and(|e| e.state == EntityState::Queued)
                })
            };
            let Some(id) = candidate else { break };

            let minutes = {
                let e = self.arena.get(id).expect("queued entity exists");
                let base = self
                    .routes
                    .get(&e.kind)
                    .and_then(|r| r.step(e.step))
                    .map_or(0.0, |s| s.base_minutes);
                base * self.locations[station].time_factor
            };

            self.update_location_stats(station);
            let moved = self
                .locations
                .get_mut(station)
                .expect("checked above")
                .move_to_processing(id);
            debug_assert!(moved, "free unit and queued entity were just verified");
            if !moved {
                break;
            }
            self.arena.get_mut(id).expect("validated").set_state(now, EntityState::Processing);
            self.queue.schedule(
                Event::new(now.plus(minutes), EventKind::EndProcessing).with_entity(id),
            );
            trace!(entity = %id, station, minutes, "processing started");
        }
    }

    // ── Transport ─────────────────────────────────────────────────────────

    /// Queue a move of `id` from `from` toward `to` and mark the entity
    /// waiting or blocked depending on destination room.
    fn request_transfer(&mut self, id: EntityId, from: &str, to: &str) {
        if !self.locations.contains_key(to) {
            warn!(entity = %id, to, "transfer to unknown location — skipped");
            return;
        }
        let now = self.clock.now();
        let operator = self.locations[from].operator.clone();
        self.transfers.push(TransferRequest {
            entity: id,
            from: from.to_string(),
            to: to.to_string(),
            operator,
            queued_at: now,
        });

        let state = if self.has_room(to) {
            EntityState::WaitingForTransport
        } else {
            EntityState::Blocked
        };
        self.arena.get_mut(id).expect("caller validated").set_state(now, state);
        self.try_schedule_transfer();
    }

    /// Greedy, non-preemptive, FIFO-within-readiness assignment: scan the
    /// pending requests in insertion order and dispatch the first whose
    /// entity is ready, whose destination has room, and whose operator (if
    /// any) is free.  Honors the shift calendar — no transport off-hours.
    fn try_schedule_transfer(&mut self) {
        let now = self.clock.now();
        if !self.calendar.is_working_time(now) {
            if !self.transfers.is_empty() {
                self.schedule_shift_wakeup(None);
            }
            return;
        }

        let mut i = 0;
        while i < self.transfers.len() {
            let eligible = {
                let req = &self.transfers[i];
                let ready = self.arena.get(req.entity).is_some_and(|e| e.is_ready(now));
                ready
                    && self.has_room(&req.to)
                    && req
                        .operator
                        .as_ref()
                        .is_none_or(|name| self.operators.get(name).is_none_or(|op| !op.is_busy()))
            };
            if eligible {
                let request = self.transfers.remove(i);
                self.begin_transfer(request);
                // Capacity and operator states changed — rescan for earlier
                // requests that may have become eligible.
                i = 0;
            } else {
                i += 1;
            }
        }
    }

    /// Take the entity out of its origin, put it in the operator's hands (or
    /// hand it off immediately), and schedule the paired transport events.
    fn begin_transfer(&mut self, request: TransferRequest) {
        let now = self.clock.now();
        debug!(entity = %request.entity, from = %request.from, to = %request.to, "transfer assigned");

        self.update_location_stats(&request.from);
        if let Some(loc) = self.locations.get_mut(&request.from) {
            loc.remove(request.entity);
        }
        {
            let e = self.arena.get_mut(request.entity).expect("request holds a live entity");
            e.location = None;
            e.set_state(now, EntityState::InTransit);
        }
        *self.inbound.entry(request.to.clone()).or_insert(0) += 1;

        let assigned_operator = request
            .operator
            .as_ref()
            .filter(|name| self.operators.contains_key(*name))
            .cloned();

        match assigned_operator {
            None => {
                // Direct handoff: no transport resource, zero travel time.
                self.queue.schedule(
                    Event::new(now, EventKind::EndTransportMove).with_entity(request.entity),
                );
            }
            Some(op_name) => {
                let (points, segments, distance_m) =
                    match self.network.shortest_path(&request.from, &request.to) {
                        Ok(route) => (route.points, route.segment_lengths_m, route.total_m),
                        Err(err) => {
                            // Straight-line fallback; a missing aisle must not
                            // stall the plant.
                            debug!(%err, "no network path — straight-line estimate");
                            match (
                                self.network.position_of(&request.from),
                                self.network.position_of(&request.to),
                            ) {
                                (Some(a), Some(b)) => {
                                    let d = a.distance_m(b);
                                    (vec![a, b], vec![d], d)
                                }
                                _ => {
                                    let home = self.operators[&op_name].home;
                                    (vec![home, home], vec![0.0], 0.0)
                                }
                            }
                        }
                    };

                let working = self.calendar.is_working_time(now);
                let op = self.operators.get_mut(&op_name).expect("filtered above");
                op.update_statistics(now, working);
                if op.assign(request.entity).is_err() {
                    // Unreachable under the single-writer discipline; the
                    // eligibility scan checked is_busy.
                    warn!(operator = %op_name, "operator busy at assignment — handoff instead");
                    self.queue.schedule(
                        Event::new(now, EventKind::EndTransportMove).with_entity(request.entity),
                    );
                } else {
                    let travel = op.calculate_travel_time(distance_m, true);
                    let arrives = now.plus(travel);
                    if let Err(err) = op.start_move(points, segments, now, arrives) {
                        debug!(%err, "degenerate trip path");
                    }
                    self.queue.schedule(
                        Event::new(now, EventKind::StartTransportMove)
                            .with_entity(request.entity)
                            .with_payload(op_name.clone()),
                    );
                    self.queue.schedule(
                        Event::new(arrives, EventKind::EndTransportMove)
                            .with_entity(request.entity)
                            .with_payload(op_name),
                    );
                }
            }
        }

        // The origin freed capacity and possibly a processing slot.
        self.blocked_sweep();
        self.try_start_processing(&request.from);
    }

    // ── Shared plumbing ───────────────────────────────────────────────────

    /// Destination room check, counting in-flight deliveries.
    fn has_room(&self, dest: &str) -> bool {
        let inbound = self.inbound.get(dest).copied().unwrap_or(0);
        self.locations
            .get(dest)
            .is_some_and(|loc| loc.contents() + inbound < loc.capacity)
    }

    /// The station of the entity's current route step.
    fn step_station(&self, id: EntityId) -> Option<String> {
        let e = self.arena.get(id)?;
        self.routes
            .get(&e.kind)
            .and_then(|r| r.step(e.step))
            .map(|s| s.station.clone())
    }

    /// Remove `id` from `station` and retire it.
    fn remove_and_retire(&mut self, id: EntityId, station: &str, retirement: Retirement) {
        let now = self.clock.now();
        if let Some(loc) = self.locations.get_mut(station) {
            loc.remove(id);
        }
        self.arena.retire(id, now, retirement);
        if let Some(e) = self.arena.get(id) {
            self.stats.record_retirement(e, now);
        }
    }

    /// Re-evaluate the plant after any location freed capacity: unblock
    /// entities whose destination now has room, drain the transfer backlog,
    /// and feed the freed processing slot.
    fn after_capacity_freed(&mut self, station: &str) {
        self.blocked_sweep();
        self.try_schedule_transfer();
        self.try_start_processing(station);
    }

    /// Flip `Blocked` entities back to `WaitingForTransport` wherever their
    /// destination has room again.
    fn blocked_sweep(&mut self) {
        let now = self.clock.now();
        let unblock: Vec<EntityId> = self
            .transfers
            .iter()
            .filter(|req| {
                self.arena
                    .get(req.entity)
                    .is_some_and(|e| e.state == EntityState::Blocked)
                    && self.has_room(&req.to)
            })
            .map(|req| req.entity)
            .collect();
        for id in unblock {
            self.arena
                .get_mut(id)
                .expect("request holds a live entity")
                .set_state(now, EntityState::WaitingForTransport);
        }
    }

    /// Schedule a `ShiftStart` wakeup at the next working time, once per
    /// target, so off-hours backlog is re-checked when the shift opens.
    fn schedule_shift_wakeup(&mut self, target: Option<String>) {
        if self.pending_wakeups.contains(&target) {
            return;
        }
        let now = self.clock.now();
        let next = self.calendar.next_working_time(now);
        if next <= now {
            warn!("calendar has no upcoming working hours — wakeup not scheduled");
            return;
        }
        self.pending_wakeups.insert(target.clone());
        let mut event = Event::new(next, EventKind::ShiftStart);
        if let Some(station) = target {
            event = event.with_payload(station);
        }
        self.queue.schedule(event);
    }

    /// Fold the current span into one location's totals.  Blocked units are
    /// processing-slot occupants that are no longer `Processing`.
    fn update_location_stats(&mut self, name: &str) {
        let now = self.clock.now();
        let (counts, blocked) = {
            let Some(loc) = self.locations.get(name) else { return };
            let counts = !loc.uses_calendar || self.calendar.is_working_time(now);
            let blocked = loc
                .processing()
                .iter()
                .filter(|&&pid| {
                    self.arena
                        .get(pid)
                        .is_some_and(|e| e.state != EntityState::Processing)
                })
                .count();
            (counts, blocked)
        };
        self.locations
            .get_mut(name)
            .expect("checked above")
            .update_statistics(now, counts, blocked);
    }

    /// One statistics snapshot: every location and operator, plus the
    /// collector's content series.
    fn take_sample(&mut self, t: SimTime) {
        let names: Vec<String> = self.locations.keys().cloned().collect();
        for name in names {
            self.update_location_stats(&name);
            let contents = self.locations[&name].contents();
            self.stats.sample_location(&name, t, contents);
        }
        let working = self.calendar.is_working_time(t);
        for op in self.operators.values_mut() {
            op.update_statistics(t, working);
        }
    }

    // ── Read accessors (snapshot-safe for UI/report collaborators) ────────

    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Cloned snapshot of every entity ever created this run.
    pub fn entities(&self) -> Vec<Entity> {
        self.arena.snapshot()
    }

    /// Cloned snapshot of retired entities, in retirement order.
    pub fn completed(&self) -> Vec<Entity> {
        self.arena.completed_snapshot()
    }

    /// Cloned per-name location map.
    pub fn locations(&self) -> BTreeMap<String, Location> {
        self.locations.clone()
    }

    /// Cloned per-name operator map.
    pub fn operators(&self) -> BTreeMap<String, Operator> {
        self.operators.clone()
    }

    /// Cloned pending transfer backlog, in insertion order.
    pub fn pending_transfers(&self) -> Vec<TransferRequest> {
        self.transfers.clone()
    }

    pub fn statistics(&self) -> &StatisticsCollector {
        &self.stats
    }

    pub fn network(&self) -> &PathNetwork {
        &self.network
    }

    pub fn calendar(&self) -> &ShiftCalendar {
        &self.calendar
    }

    /// Render the full plant report at the current time.
    pub fn report(&self) -> String {
        format_report(
            &self.stats,
            &self.locations,
            &self.operators,
            &self.calendar,
            self.clock.now(),
        )
    }
}
