//! CSV route loader.
//!
//! # CSV format
//!
//! One row per route step.  Steps of the same entity type are ordered by the
//! `step` column (rows may appear in any order).
//!
//! ```csv
//! entity_type,step,station,minutes
//! LUPULO,0,LAGAR,10
//! LUPULO,1,none,0
//! LUPULO,2,COCCION,45
//! GRANOS_CEBADA,0,MOLINO,15
//! GRANOS_CEBADA,1,COCCION,45
//! ```
//!
//! A `station` of `none` is the pass-through sentinel — no processing, the
//! entity's step index advances straight past it.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::route::{Route, RoutePlan, RouteStep};
use crate::ScheduleError;

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RouteRecord {
    entity_type: String,
    step:        u32,
    station:     String,
    minutes:     f64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a [`RoutePlan`] from a CSV file.
pub fn load_routes_csv(path: &Path) -> Result<RoutePlan, ScheduleError> {
    let file = std::fs::File::open(path).map_err(ScheduleError::Io)?;
    load_routes_reader(file)
}

/// Like [`load_routes_csv`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`) or embedding route tables
/// in binaries.
pub fn load_routes_reader<R: Read>(reader: R) -> Result<RoutePlan, ScheduleError> {
    // ── Parse CSV rows ────────────────────────────────────────────────────
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut by_type: BTreeMap<String, Vec<(u32, RouteStep)>> = BTreeMap::new();

    for result in csv_reader.deserialize::<RouteRecord>() {
        let row = result.map_err(|e| ScheduleError::Parse(e.to_string()))?;
        if row.minutes < 0.0 {
            return Err(ScheduleError::Parse(format!(
                "negative processing time for {} step {}",
                row.entity_type, row.step
            )));
        }
        by_type
            .entry(row.entity_type)
            .or_default()
            .push((row.step, RouteStep::new(row.station, row.minutes)));
    }

    // ── Build one Route per entity type ───────────────────────────────────
    let mut plan = RoutePlan::new();
    for (entity_type, mut steps) in by_type {
        steps.sort_by_key(|(idx, _)| *idx);
        let route = Route::new(steps.into_iter().map(|(_, s)| s).collect());
        plan.register(entity_type, route);
    }

    Ok(plan)
}
