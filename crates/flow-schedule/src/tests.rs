//! Unit tests for routes, calendar, arrivals, and the event queue.

#[cfg(test)]
mod route_tests {
    use crate::{Route, RoutePlan, RouteStep, PASS_THROUGH};

    fn sample_route() -> Route {
        Route::new(vec![
            RouteStep::new("M1", 10.0),
            RouteStep::new(PASS_THROUGH, 0.0),
            RouteStep::new("M3", 5.0),
        ])
    }

    #[test]
    fn step_lookup() {
        let r = sample_route();
        assert_eq!(r.len(), 3);
        assert_eq!(r.step(0).unwrap().station, "M1");
        assert!(r.step(3).is_none());
    }

    #[test]
    fn next_stop_skips_pass_through() {
        let r = sample_route();
        assert_eq!(r.next_stop(0), Some(0));
        assert_eq!(r.next_stop(1), Some(2), "sentinel at index 1 is skipped");
        assert_eq!(r.next_stop(3), None, "past the end means route complete");
    }

    #[test]
    fn all_pass_through_route_has_no_stops() {
        let r = Route::new(vec![
            RouteStep::new(PASS_THROUGH, 0.0),
            RouteStep::new(PASS_THROUGH, 0.0),
        ]);
        assert_eq!(r.first_stop(), None);
    }

    #[test]
    fn plan_registration() {
        let mut plan = RoutePlan::new();
        plan.register("LUPULO", sample_route());
        assert!(plan.get("LUPULO").is_some());
        assert!(plan.get("MOSTO").is_none());
        assert_eq!(plan.kinds().collect::<Vec<_>>(), vec!["LUPULO"]);
    }
}

#[cfg(test)]
mod arrival_tests {
    use flow_core::SimTime;

    use crate::ArrivalSchedule;

    #[test]
    fn bounded_batches() {
        let sched = ArrivalSchedule {
            entity_type:      "LUPULO".into(),
            quantity:         4,
            first_at:         0.0,
            interval_minutes: 30.0,
            batches:          3,
        };
        let times = sched.arrival_times(SimTime(1_000.0));
        assert_eq!(times, vec![SimTime(0.0), SimTime(30.0), SimTime(60.0)]);
    }

    #[test]
    fn unbounded_fills_horizon() {
        let sched = ArrivalSchedule {
            entity_type:      "GRANOS_CEBADA".into(),
            quantity:         1,
            first_at:         10.0,
            interval_minutes: 60.0,
            batches:          0,
        };
        let times = sched.arrival_times(SimTime(200.0));
        assert_eq!(times, vec![SimTime(10.0), SimTime(70.0), SimTime(130.0), SimTime(190.0)]);
    }

    #[test]
    fn horizon_is_exclusive() {
        let sched = ArrivalSchedule {
            entity_type:      "X".into(),
            quantity:         1,
            first_at:         100.0,
            interval_minutes: 50.0,
            batches:          0,
        };
        assert!(sched.arrival_times(SimTime(100.0)).is_empty());
    }

    #[test]
    fn zero_interval_fires_once() {
        let sched = ArrivalSchedule {
            entity_type:      "X".into(),
            quantity:         6,
            first_at:         5.0,
            interval_minutes: 0.0,
            batches:          0,
        };
        assert_eq!(sched.arrival_times(SimTime(1_000.0)).len(), 1);
    }
}

#[cfg(test)]
mod calendar_tests {
    use flow_core::{MINUTES_PER_DAY, SimTime};

    use crate::calendar::{FRIDAY, MONDAY, SATURDAY};
    use crate::ShiftCalendar;

    #[test]
    fn always_working_covers_week() {
        let cal = ShiftCalendar::always_working();
        assert_eq!(cal.weekly_working_hours(), 168);
        assert!(cal.is_working_time(SimTime(12_345.0)));
    }

    #[test]
    fn day_shift_blocks() {
        // 08:00–16:00, Monday through Friday.
        let cal = ShiftCalendar::from_shift(8, 16, &[0, 1, 2, 3, 4]);
        assert_eq!(cal.weekly_working_hours(), 40);

        // Monday 07:59 is off, 08:00 on, 15:59 on, 16:00 off.
        assert!(!cal.is_working_time(SimTime(7.0 * 60.0 + 59.0)));
        assert!(cal.is_working_time(SimTime(8.0 * 60.0)));
        assert!(cal.is_working_time(SimTime(15.0 * 60.0 + 59.0)));
        assert!(!cal.is_working_time(SimTime(16.0 * 60.0)));

        // Saturday is entirely off.
        let saturday_noon = SimTime(SATURDAY as f64 * MINUTES_PER_DAY + 12.0 * 60.0);
        assert!(!cal.is_working_time(saturday_noon));
    }

    #[test]
    fn overnight_shift_wraps() {
        // 22:00–06:00 starting Monday: Monday 22-24 plus Tuesday 0-6.
        let cal = ShiftCalendar::from_shift(22, 6, &[MONDAY]);
        assert_eq!(cal.weekly_working_hours(), 8);
        assert!(cal.is_working_time(SimTime(23.0 * 60.0)));
        assert!(cal.is_working_time(SimTime(MINUTES_PER_DAY + 3.0 * 60.0)));
        assert!(!cal.is_working_time(SimTime(MINUTES_PER_DAY + 7.0 * 60.0)));
    }

    #[test]
    fn next_working_time_identity_inside_block() {
        let cal = ShiftCalendar::from_shift(8, 16, &[MONDAY]);
        let t = SimTime(9.0 * 60.0 + 30.0);
        assert_eq!(cal.next_working_time(t), t);
    }

    #[test]
    fn next_working_time_jumps_to_shift_start() {
        let cal = ShiftCalendar::from_shift(8, 16, &[MONDAY]);
        // Monday 05:30 → Monday 08:00.
        assert_eq!(
            cal.next_working_time(SimTime(5.0 * 60.0 + 30.0)),
            SimTime(8.0 * 60.0)
        );
        // Monday 16:00 (just closed) → next Monday 08:00.
        let next = cal.next_working_time(SimTime(16.0 * 60.0));
        assert_eq!(next, SimTime(7.0 * MINUTES_PER_DAY + 8.0 * 60.0));
    }

    #[test]
    fn closed_calendar_returns_input() {
        let cal = ShiftCalendar::from_shift(8, 16, &[]);
        let t = SimTime(100.0);
        assert_eq!(cal.next_working_time(t), t);
    }

    #[test]
    fn scheduled_minutes_spans_shift_edges() {
        let cal = ShiftCalendar::from_shift(8, 16, &[MONDAY, FRIDAY]);
        // Monday 07:30 to 09:30 → only 08:00–09:30 counts.
        let m = cal.scheduled_minutes_between(
            SimTime(7.0 * 60.0 + 30.0),
            SimTime(9.0 * 60.0 + 30.0),
        );
        assert_eq!(m, 90.0);
        // Full week: 2 days × 8 h.
        let week = cal.scheduled_minutes_between(SimTime::ZERO, SimTime(7.0 * MINUTES_PER_DAY));
        assert_eq!(week, 2.0 * 8.0 * 60.0);
    }
}

#[cfg(test)]
mod queue_tests {
    use flow_core::SimTime;

    use crate::{Event, EventKind, EventQueue};

    #[test]
    fn pops_in_time_order() {
        let mut q = EventQueue::new();
        q.schedule(Event::new(SimTime(30.0), EventKind::Sample));
        q.schedule(Event::new(SimTime(10.0), EventKind::Arrival));
        q.schedule(Event::new(SimTime(20.0), EventKind::EndProcessing));

        assert_eq!(q.pop_next().unwrap().time, SimTime(10.0));
        assert_eq!(q.pop_next().unwrap().time, SimTime(20.0));
        assert_eq!(q.pop_next().unwrap().time, SimTime(30.0));
        assert!(!q.has_events());
    }

    #[test]
    fn equal_times_break_by_kind_priority() {
        let mut q = EventQueue::new();
        // Scheduled in reverse priority order on purpose.
        q.schedule(Event::new(SimTime(5.0), EventKind::Sample));
        q.schedule(Event::new(SimTime(5.0), EventKind::EndTransportMove));
        q.schedule(Event::new(SimTime(5.0), EventKind::Arrival));
        q.schedule(Event::new(SimTime(5.0), EventKind::EndProcessing));

        let kinds: Vec<EventKind> = std::iter::from_fn(|| q.pop_next()).map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Arrival,
                EventKind::EndProcessing,
                EventKind::EndTransportMove,
                EventKind::Sample,
            ]
        );
    }

    #[test]
    fn full_ties_are_fifo() {
        let mut q = EventQueue::new();
        for i in 0..5u32 {
            q.schedule(
                Event::new(SimTime(1.0), EventKind::Arrival).with_payload(format!("t{i}")),
            );
        }
        let payloads: Vec<String> =
            std::iter::from_fn(|| q.pop_next()).map(|e| e.payload.unwrap()).collect();
        assert_eq!(payloads, vec!["t0", "t1", "t2", "t3", "t4"]);
    }

    #[test]
    fn next_time_peeks_without_removal() {
        let mut q = EventQueue::new();
        assert_eq!(q.next_time(), None);
        q.schedule(Event::new(SimTime(9.0), EventKind::HoldRelease));
        assert_eq!(q.next_time(), Some(SimTime(9.0)));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn clear_discards_everything() {
        let mut q = EventQueue::new();
        q.schedule(Event::new(SimTime(1.0), EventKind::Arrival));
        q.schedule(Event::new(SimTime(2.0), EventKind::Sample));
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.pop_next(), None);
    }
}

#[cfg(test)]
mod loader_tests {
    use std::io::Cursor;

    use crate::load_routes_reader;

    const ROUTES_CSV: &str = "\
entity_type,step,station,minutes
LUPULO,0,LAGAR,10
LUPULO,2,COCCION,45
LUPULO,1,none,0
GRANOS_CEBADA,0,MOLINO,15
";

    #[test]
    fn loads_and_orders_steps() {
        let plan = load_routes_reader(Cursor::new(ROUTES_CSV)).unwrap();
        assert_eq!(plan.len(), 2);

        let lupulo = plan.get("LUPULO").unwrap();
        assert_eq!(lupulo.len(), 3);
        assert_eq!(lupulo.step(0).unwrap().station, "LAGAR");
        assert!(lupulo.step(1).unwrap().is_pass_through(), "rows sorted by step column");
        assert_eq!(lupulo.step(2).unwrap().station, "COCCION");

        let granos = plan.get("GRANOS_CEBADA").unwrap();
        assert_eq!(granos.step(0).unwrap().base_minutes, 15.0);
    }

    #[test]
    fn malformed_row_is_parse_error() {
        let bad = "entity_type,step,station,minutes\nLUPULO,zero,LAGAR,10\n";
        assert!(load_routes_reader(Cursor::new(bad)).is_err());
    }

    #[test]
    fn negative_minutes_rejected() {
        let bad = "entity_type,step,station,minutes\nLUPULO,0,LAGAR,-3\n";
        assert!(load_routes_reader(Cursor::new(bad)).is_err());
    }
}
