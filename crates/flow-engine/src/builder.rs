//! Fluent, validating builder for [`SimulationEngine`].

use std::collections::{BTreeMap, BTreeSet};

use flow_core::{SimClock, SimConfig, SimRng, SimTime};
use flow_model::{EntityArena, JoinOperation, Location, Operator, StationBehavior};
use flow_path::PathNetwork;
use flow_schedule::{ArrivalSchedule, EventQueue, RoutePlan, ShiftCalendar, PASS_THROUGH};
use flow_stats::StatisticsCollector;

use crate::{EngineError, EngineResult, SimulationEngine};

/// Assemble a scenario, validate its cross-references, and build a
/// ready-to-run engine.
///
/// # Required inputs
///
/// - [`SimConfig`] — horizon, sample interval, seed.
/// - At least one [`Location`] and a [`RoutePlan`] (an empty plant is
///   rejected).
///
/// # Optional inputs (have defaults)
///
/// | Method           | Default                      |
/// |------------------|------------------------------|
/// | `.operator(op)`  | No transport resources       |
/// | `.join(j)`       | No join barriers             |
/// | `.arrival(a)`    | No pre-scheduled arrivals    |
/// | `.network(n)`    | `PathNetwork::empty()`       |
/// | `.calendar(c)`   | 24/7 working hours           |
///
/// # Example
///
/// ```rust,ignore
/// let mut engine = EngineBuilder::new(config)
///     .location(Location::new("MOLINO", 10, 1))
///     .location(Location::new("COCCION", 5, 1).with_behavior(StationBehavior::Join))
///     .join(JoinOperation::new("COCCION", "MOSTO").require("GRANOS_CEBADA", 1))
///     .routes(routes)
///     .arrival(arrivals)
///     .build()?;
/// engine.run(&mut NoopObserver);
/// ```
pub struct EngineBuilder {
    config:    SimConfig,
    locations: Vec<Location>,
    operators: Vec<Operator>,
    joins:     Vec<JoinOperation>,
    routes:    RoutePlan,
    arrivals:  Vec<ArrivalSchedule>,
    network:   Option<PathNetwork>,
    calendar:  Option<ShiftCalendar>,
    scales:    Vec<(String, f64)>,
}

impl EngineBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            locations: Vec::new(),
            operators: Vec::new(),
            joins:     Vec::new(),
            routes:    RoutePlan::new(),
            arrivals:  Vec::new(),
            network:   None,
            calendar:  None,
            scales:    Vec::new(),
        }
    }

    pub fn location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    pub fn operator(mut self, operator: Operator) -> Self {
        self.operators.push(operator);
        self
    }

    pub fn join(mut self, join: JoinOperation) -> Self {
        self.joins.push(join);
        self
    }

    pub fn routes(mut self, routes: RoutePlan) -> Self {
        self.routes = routes;
        self
    }

    pub fn arrival(mut self, schedule: ArrivalSchedule) -> Self {
        self.arrivals.push(schedule);
        self
    }

    pub fn network(mut self, network: PathNetwork) -> Self {
        self.network = Some(network);
        self
    }

    pub fn calendar(mut self, calendar: ShiftCalendar) -> Self {
        self.calendar = Some(calendar);
        self
    }

    /// Per-type report multiplier (1 entity = `scale` product units).
    pub fn report_scale(mut self, kind: impl Into<String>, scale: f64) -> Self {
        self.scales.push((kind.into(), scale));
        self
    }

    /// Validate the scenario's cross-references and produce an engine with
    /// arrivals and the first sample pre-scheduled.
    ///
    /// Arrival *types* are deliberately not validated here: an arrival for
    /// an unknown type is logged and skipped at dispatch time, per the
    /// framework's error discipline.
    pub fn build(self) -> EngineResult<SimulationEngine> {
        // ── Locations: unique names ───────────────────────────────────────
        if self.locations.is_empty() {
            return Err(EngineError::Config("scenario has no locations".into()));
        }
        let mut locations = BTreeMap::new();
        for loc in self.locations {
            let name = loc.name.clone();
            if locations.insert(name.clone(), loc).is_some() {
                return Err(EngineError::DuplicateLocation(name));
            }
        }

        let operators: BTreeMap<String, Operator> = self
            .operators
            .into_iter()
            .map(|op| (op.name.clone(), op))
            .collect();

        // ── Routes reference known stations ───────────────────────────────
        for kind in self.routes.kinds() {
            let route = self.routes.get(kind).expect("iterating registered kinds");
            for step in route.steps() {
                if step.station != PASS_THROUGH && !locations.contains_key(&step.station) {
                    return Err(EngineError::UnknownStation {
                        route:   kind.to_string(),
                        station: step.station.clone(),
                    });
                }
            }
        }

        // ── Location operator names exist ─────────────────────────────────
        for loc in locations.values() {
            if let Some(op) = &loc.operator {
                if !operators.contains_key(op) {
                    return Err(EngineError::UnknownOperator {
                        location: loc.name.clone(),
                        operator: op.clone(),
                    });
                }
            }
        }

        // ── Joins and Join-tagged locations correspond 1:1 ────────────────
        let mut joins = BTreeMap::new();
        for join in self.joins {
            match locations.get(&join.location) {
                Some(loc) if loc.behavior == StationBehavior::Join => {}
                _ => return Err(EngineError::JoinMismatch(join.location.clone())),
            }
            if self.routes.get(&join.output_type).is_none() {
                return Err(EngineError::MissingRoute {
                    entity_type:   join.output_type.clone(),
                    referenced_by: format!("join at {}", join.location),
                });
            }
            joins.insert(join.location.clone(), join);
        }
        let tagged: BTreeSet<&String> = locations
            .iter()
            .filter(|(_, l)| l.behavior == StationBehavior::Join)
            .map(|(n, _)| n)
            .collect();
        for name in tagged {
            if !joins.contains_key(name) {
                return Err(EngineError::JoinMismatch(name.clone()));
            }
        }

        // ── Fan-out outputs have routes ───────────────────────────────────
        for loc in locations.values() {
            if let StationBehavior::FanOut { output_type, .. } = &loc.behavior {
                if self.routes.get(output_type).is_none() {
                    return Err(EngineError::MissingRoute {
                        entity_type:   output_type.clone(),
                        referenced_by: format!("fan-out at {}", loc.name),
                    });
                }
            }
        }

        // ── Assemble ──────────────────────────────────────────────────────
        let mut stats = StatisticsCollector::new();
        for (kind, scale) in self.scales {
            stats.set_report_scale(kind, scale);
        }

        let seed = self.config.seed;
        let mut engine = SimulationEngine {
            config:          self.config,
            clock:           SimClock::new(),
            queue:           EventQueue::new(),
            arena:           EntityArena::new(),
            locations,
            operators,
            joins,
            routes:          self.routes,
            arrivals:        self.arrivals,
            network:         self.network.unwrap_or_else(PathNetwork::empty),
            calendar:        self.calendar.unwrap_or_default(),
            stats,
            rng:             SimRng::new(seed),
            transfers:       Vec::new(),
            inbound:         BTreeMap::new(),
            batch_counts:    BTreeMap::new(),
            pending_wakeups: BTreeSet::new(),
            last_sample:     SimTime::ZERO,
            last_activity:   SimTime::ZERO,
            paused:          false,
            finished:        false,
        };
        engine.initialize();
        Ok(engine)
    }
}
