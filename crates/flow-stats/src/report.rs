//! Plain-text summary report.
//!
//! One formatted pass over the collector plus read-only views of the
//! locations and operators.  Counts are scaled by each type's
//! `report_scale`; durations are always per-entity minutes.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use flow_core::{MINUTES_PER_HOUR, SimTime};
use flow_model::{Location, Operator};
use flow_schedule::ShiftCalendar;

use crate::collector::StatisticsCollector;

/// Render the full report.
///
/// `end` is the timestamp the run finished at (scheduled-hours columns are
/// computed against it).
pub fn format_report(
    collector: &StatisticsCollector,
    locations: &BTreeMap<String, Location>,
    operators: &BTreeMap<String, Operator>,
    calendar: &ShiftCalendar,
    end: SimTime,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Production flow report — {end} ===");

    // ── Entity types ──────────────────────────────────────────────────────
    let _ = writeln!(out, "\n-- Entity types --");
    let _ = writeln!(
        out,
        "{:<16} {:>9} {:>9} {:>8} {:>9} {:>7} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "type", "arrivals", "finished", "scrap", "consumed", "in-sys",
        "avg-sys", "avg-prc", "avg-mov", "avg-wait", "avg-blk",
    );
    for (kind, s) in collector.types() {
        let consumed = s.join_consumed + s.batch_consumed + s.split_consumed;
        let _ = writeln!(
            out,
            "{:<16} {:>9.0} {:>9.0} {:>8.0} {:>9.0} {:>7.0} {:>8.1} {:>8.1} {:>8.1} {:>8.1} {:>8.1}",
            kind,
            s.arrivals as f64 * s.report_scale,
            s.finished as f64 * s.report_scale,
            s.scrapped as f64 * s.report_scale,
            consumed as f64 * s.report_scale,
            s.in_system() as f64 * s.report_scale,
            s.avg_system_minutes(),
            s.avg_processing_minutes(),
            s.avg_movement_minutes(),
            s.avg_waiting_minutes(),
            s.avg_blocked_minutes(),
        );
    }

    // ── Locations ─────────────────────────────────────────────────────────
    let _ = writeln!(out, "\n-- Locations --");
    let _ = writeln!(
        out,
        "{:<16} {:>8} {:>5} {:>5} {:>8} {:>7} {:>5} {:>5} {:>6}",
        "location", "sched-h", "cap", "units", "entries", "avg", "max", "now", "util%",
    );
    for (name, loc) in locations {
        let scheduled_minutes = if loc.uses_calendar {
            calendar.scheduled_minutes_between(SimTime::ZERO, end)
        } else {
            end.minutes()
        };
        let series = collector.location_series(name);
        let _ = writeln!(
            out,
            "{:<16} {:>8.1} {:>5} {:>5} {:>8} {:>7.2} {:>5} {:>5} {:>6.1}",
            name,
            scheduled_minutes / MINUTES_PER_HOUR,
            loc.capacity,
            loc.units,
            loc.entries,
            series.map_or(0.0, |s| s.mean()),
            series.map_or(0, |s| s.max),
            series.map_or(0, |s| s.current),
            loc.utilization(),
        );
    }

    // ── Operators ─────────────────────────────────────────────────────────
    let _ = writeln!(out, "\n-- Operators --");
    let _ = writeln!(
        out,
        "{:<16} {:>6} {:>10} {:>10} {:>10} {:>6}",
        "operator", "trips", "avg-handle", "avg-travel", "avg-park", "util%",
    );
    for (name, op) in operators {
        let per_trip = |total: f64| if op.trips == 0 { 0.0 } else { total / op.trips as f64 };
        let _ = writeln!(
            out,
            "{:<16} {:>6} {:>10.2} {:>10.2} {:>10.2} {:>6.1}",
            name,
            op.trips,
            per_trip((op.busy_minutes() - op.travel_minutes()).max(0.0)),
            per_trip(op.travel_minutes()),
            per_trip(op.park_minutes()),
            op.utilization(),
        );
    }

    // ── Weekly flow ───────────────────────────────────────────────────────
    let weekly = collector.weekly_flow();
    if !weekly.is_empty() {
        let _ = writeln!(out, "\n-- Weekly flow --");
        let _ = writeln!(out, "{:<6} {:>9} {:>12}", "week", "arrivals", "completions");
        for (week, (arrivals, completions)) in weekly.iter().enumerate() {
            let _ = writeln!(out, "{:<6} {:>9} {:>12}", week + 1, arrivals, completions);
        }
    }

    // ── Bottleneck ────────────────────────────────────────────────────────
    let bottleneck = locations
        .values()
        .max_by(|a, b| a.utilization().total_cmp(&b.utilization()));
    if let Some(loc) = bottleneck {
        let _ = writeln!(
            out,
            "\nBottleneck: {} at {:.1}% utilization",
            loc.name,
            loc.utilization()
        );
    }

    out
}
