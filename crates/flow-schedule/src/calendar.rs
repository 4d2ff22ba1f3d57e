//! Weekly working-hours calendar.
//!
//! # Design
//!
//! One boolean per hour of the week — 168 slots, hour 0 = Monday 00:00.
//! The grid is immutable after construction; the engine queries it on every
//! transport assignment and processing start, so lookups must be O(1).
//!
//! Shift boundaries are hour-aligned (the source configuration speaks in
//! whole hours).  `next_working_time` therefore returns either `t` itself
//! (already inside a working block) or the top of the next working hour.

use flow_core::{HOURS_PER_WEEK, MINUTES_PER_HOUR, SimTime};

/// Day indices for [`ShiftCalendar::from_shift`].  Monday = 0 … Sunday = 6.
pub const MONDAY: usize = 0;
pub const TUESDAY: usize = 1;
pub const WEDNESDAY: usize = 2;
pub const THURSDAY: usize = 3;
pub const FRIDAY: usize = 4;
pub const SATURDAY: usize = 5;
pub const SUNDAY: usize = 6;

/// A 168-slot weekly working-hours bitmap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShiftCalendar {
    week: [bool; HOURS_PER_WEEK],
}

impl ShiftCalendar {
    /// A calendar with every hour of the week marked working (24/7 plant).
    pub fn always_working() -> Self {
        Self { week: [true; HOURS_PER_WEEK] }
    }

    /// Build from an explicit week grid.
    pub fn from_week(week: [bool; HOURS_PER_WEEK]) -> Self {
        Self { week }
    }

    /// Build from a daily shift block repeated on `working_days`.
    ///
    /// `start_hour..end_hour` marks the working hours of each listed day.
    /// An `end_hour <= start_hour` block wraps past midnight (the overnight
    /// hours land on the *next* calendar day).  Out-of-range day indices are
    /// ignored.
    pub fn from_shift(start_hour: u32, end_hour: u32, working_days: &[usize]) -> Self {
        let mut week = [false; HOURS_PER_WEEK];
        for &day in working_days {
            if day >= 7 {
                continue;
            }
            let base = day * 24;
            if end_hour > start_hour {
                for h in start_hour..end_hour.min(24) {
                    week[base + h as usize] = true;
                }
            } else {
                // Overnight shift: start..24 today, 0..end tomorrow.
                for h in start_hour..24 {
                    week[base + h as usize] = true;
                }
                for h in 0..end_hour.min(24) {
                    week[(base + 24 + h as usize) % HOURS_PER_WEEK] = true;
                }
            }
        }
        Self { week }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Is week-hour slot `hour` (0..168) a working hour?
    #[inline]
    pub fn is_working_hour(&self, hour: usize) -> bool {
        self.week[hour % HOURS_PER_WEEK]
    }

    /// Is `t` inside a working block?
    #[inline]
    pub fn is_working_time(&self, t: SimTime) -> bool {
        self.week[t.hour_of_week()]
    }

    /// The earliest working time `>= t`.
    ///
    /// Returns `t` unchanged when `t` is already inside a working block, and
    /// also when the calendar has no working hours at all (a fully-closed
    /// calendar has no "next" — callers must not schedule wakeups from it).
    pub fn next_working_time(&self, t: SimTime) -> SimTime {
        if self.is_working_time(t) {
            return t;
        }
        let current = t.hour_of_week();
        for offset in 1..=HOURS_PER_WEEK {
            if self.week[(current + offset) % HOURS_PER_WEEK] {
                // Top of the found hour: t rounded down to its hour, plus offset hours.
                let hour_start = (t.minutes() / MINUTES_PER_HOUR).floor() * MINUTES_PER_HOUR;
                return SimTime(hour_start + offset as f64 * MINUTES_PER_HOUR);
            }
        }
        t
    }

    /// Number of working hours per week.
    pub fn weekly_working_hours(&self) -> usize {
        self.week.iter().filter(|&&w| w).count()
    }

    /// Scheduled (working) minutes in the half-open span `[start, end)`.
    ///
    /// Walks hour slots, so the cost is proportional to the span length in
    /// hours — fine for report generation, do not call per event.
    pub fn scheduled_minutes_between(&self, start: SimTime, end: SimTime) -> f64 {
        if end <= start {
            return 0.0;
        }
        let mut total = 0.0;
        let mut t = start.minutes();
        while t < end.minutes() {
            let hour_end = (t / MINUTES_PER_HOUR).floor() * MINUTES_PER_HOUR + MINUTES_PER_HOUR;
            let span_end = hour_end.min(end.minutes());
            if self.is_working_time(SimTime(t)) {
                total += span_end - t;
            }
            t = span_end;
        }
        total
    }
}

impl Default for ShiftCalendar {
    /// Default is the 24/7 calendar — gating is opt-in.
    fn default() -> Self {
        Self::always_working()
    }
}
