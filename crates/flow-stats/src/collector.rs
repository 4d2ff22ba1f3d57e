//! `StatisticsCollector` — consumes simulation events, produces metrics.
//!
//! The collector never touches live simulation objects; the engine feeds it
//! plain values (arrivals, retirements, periodic samples) and it aggregates.
//! Location busy/blocked/observed totals stay inside each `Location` — the
//! collector only records the *content history* the report needs, so there
//! is exactly one owner per number.
//!
//! # Numerical stability
//!
//! Content averages use the incremental running-mean update
//! `mean += (x - mean) / n` rather than a sum that can lose precision over
//! hundreds of thousands of samples.

use std::collections::BTreeMap;

use flow_core::SimTime;
use flow_model::{Entity, Retirement};

// ── TypeStats ─────────────────────────────────────────────────────────────────

/// Counters and duration sums for one entity type.
#[derive(Clone, Debug, Default)]
pub struct TypeStats {
    pub arrivals:       u64,
    pub finished:       u64,
    pub scrapped:       u64,
    pub join_consumed:  u64,
    pub batch_consumed: u64,
    pub split_consumed: u64,

    pub sum_system_minutes:     f64,
    pub sum_processing_minutes: f64,
    pub sum_movement_minutes:   f64,
    pub sum_waiting_minutes:    f64,
    pub sum_blocked_minutes:    f64,

    /// Report multiplier: 1 entity represents `report_scale` product units.
    pub report_scale: f64,
}

impl TypeStats {
    fn new() -> Self {
        Self { report_scale: 1.0, ..Self::default() }
    }

    /// Entities retired for any reason.
    pub fn retired(&self) -> u64 {
        self.finished + self.scrapped + self.join_consumed + self.batch_consumed
            + self.split_consumed
    }

    /// Entities still somewhere in the plant.
    pub fn in_system(&self) -> u64 {
        self.arrivals.saturating_sub(self.retired())
    }

    fn avg(sum: f64, n: u64) -> f64 {
        if n == 0 { 0.0 } else { sum / n as f64 }
    }

    pub fn avg_system_minutes(&self) -> f64 {
        Self::avg(self.sum_system_minutes, self.retired())
    }
    pub fn avg_processing_minutes(&self) -> f64 {
        Self::avg(self.sum_processing_minutes, self.retired())
    }
    pub fn avg_movement_minutes(&self) -> f64 {
        Self::avg(self.sum_movement_minutes, self.retired())
    }
    pub fn avg_waiting_minutes(&self) -> f64 {
        Self::avg(self.sum_waiting_minutes, self.retired())
    }
    pub fn avg_blocked_minutes(&self) -> f64 {
        Self::avg(self.sum_blocked_minutes, self.retired())
    }
}

// ── ContentSeries ─────────────────────────────────────────────────────────────

/// Sampled content history for one location.
#[derive(Clone, Debug, Default)]
pub struct ContentSeries {
    samples: Vec<(SimTime, usize)>,
    mean:    f64,
    count:   u64,
    pub max:     usize,
    pub current: usize,
}

impl ContentSeries {
    /// Record one observation.  Samples arrive at a fixed interval, so the
    /// arithmetic running mean *is* the time-weighted average contents.
    pub fn record(&mut self, t: SimTime, contents: usize) {
        self.count += 1;
        self.mean += (contents as f64 - self.mean) / self.count as f64;
        self.max = self.max.max(contents);
        self.current = contents;
        self.samples.push((t, contents));
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[(SimTime, usize)] {
        &self.samples
    }
}

// ── StatisticsCollector ───────────────────────────────────────────────────────

/// Aggregates per-type, per-location, and weekly flow statistics.
#[derive(Clone, Debug, Default)]
pub struct StatisticsCollector {
    types:     BTreeMap<String, TypeStats>,
    locations: BTreeMap<String, ContentSeries>,

    weekly_arrivals:    Vec<u64>,
    weekly_completions: Vec<u64>,
}

impl StatisticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-type report multiplier (1 entity = `scale` product units).
    pub fn set_report_scale(&mut self, kind: impl Into<String>, scale: f64) {
        self.types.entry(kind.into()).or_insert_with(TypeStats::new).report_scale = scale;
    }

    // ── Event feed (called by the engine's handlers) ──────────────────────

    pub fn record_arrival(&mut self, kind: &str, t: SimTime) {
        self.types.entry(kind.to_string()).or_insert_with(TypeStats::new).arrivals += 1;
        bump(&mut self.weekly_arrivals, t.week_index());
    }

    /// Fold a retired entity into its type's stats.  The entity must carry a
    /// `retirement`; only `Finished` counts toward weekly throughput.
    pub fn record_retirement(&mut self, entity: &Entity, t: SimTime) {
        let stats = self.types.entry(entity.kind.clone()).or_insert_with(TypeStats::new);
        match entity.retirement {
            Some(Retirement::Finished)      => stats.finished += 1,
            Some(Retirement::Scrapped)      => stats.scrapped += 1,
            Some(Retirement::JoinConsumed)  => stats.join_consumed += 1,
            Some(Retirement::BatchConsumed) => stats.batch_consumed += 1,
            Some(Retirement::SplitConsumed) => stats.split_consumed += 1,
            None => return, // not retired — nothing to record
        }
        stats.sum_system_minutes     += entity.system_minutes().unwrap_or(0.0);
        stats.sum_processing_minutes += entity.totals.processing;
        stats.sum_movement_minutes   += entity.totals.movement;
        stats.sum_waiting_minutes    += entity.totals.waiting;
        stats.sum_blocked_minutes    += entity.totals.blocked;

        if entity.retirement == Some(Retirement::Finished) {
            bump(&mut self.weekly_completions, t.week_index());
        }
    }

    pub fn sample_location(&mut self, name: &str, t: SimTime, contents: usize) {
        self.locations.entry(name.to_string()).or_default().record(t, contents);
    }

    // ── Read side ─────────────────────────────────────────────────────────

    pub fn type_stats(&self, kind: &str) -> Option<&TypeStats> {
        self.types.get(kind)
    }

    pub fn types(&self) -> impl Iterator<Item = (&str, &TypeStats)> + '_ {
        self.types.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn location_series(&self, name: &str) -> Option<&ContentSeries> {
        self.locations.get(name)
    }

    pub fn locations(&self) -> impl Iterator<Item = (&str, &ContentSeries)> + '_ {
        self.locations.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Weekly `(arrivals, completions)` rows, padded to the same length.
    pub fn weekly_flow(&self) -> Vec<(u64, u64)> {
        let weeks = self.weekly_arrivals.len().max(self.weekly_completions.len());
        (0..weeks)
            .map(|w| {
                (
                    self.weekly_arrivals.get(w).copied().unwrap_or(0),
                    self.weekly_completions.get(w).copied().unwrap_or(0),
                )
            })
            .collect()
    }

    /// Conservation check: for every type,
    /// `arrivals == retired + in_system` by construction; this verifies the
    /// bookkeeping never went negative.
    pub fn is_conserved(&self) -> bool {
        self.types.values().all(|s| s.retired() <= s.arrivals)
    }

    /// Discard everything (used by `reset`).  Report scales survive — they
    /// are configuration, not run state.
    pub fn reset(&mut self) {
        for stats in self.types.values_mut() {
            let scale = stats.report_scale;
            *stats = TypeStats { report_scale: scale, ..TypeStats::default() };
        }
        self.locations.clear();
        self.weekly_arrivals.clear();
        self.weekly_completions.clear();
    }
}

fn bump(buckets: &mut Vec<u64>, index: usize) {
    if buckets.len() <= index {
        buckets.resize(index + 1, 0);
    }
    buckets[index] += 1;
}
