use std::time::Duration;

use trip_telemetry_core::{Event, LimitState, TripStatus, Waypoint, WaypointKind};
use trip_telemetry_route::WaypointRoute;
use trip_telemetry_session::{apply, SessionConfig, TripSession};
use trip_telemetry_system_speed_sampler::{SamplerTuning, ScriptedSource};

const ONE_SECOND: Duration = Duration::from_secs(1);
const NO_STEP: f64 = 0.5;
const NO_SPIKE: f64 = 0.99;
const SPIKE: f64 = 0.0;
const UP: f64 = 0.9;
const DOWN: f64 = 0.1;

fn route(distances: &[f64]) -> WaypointRoute {
    let waypoints = distances
        .iter()
        .enumerate()
        .map(|(index, distance)| {
            Waypoint::new(
                format!("w{index}"),
                WaypointKind::Stop,
                format!("Stop {index}"),
                *distance,
            )
        })
        .collect();
    WaypointRoute::new(waypoints).expect("valid route")
}

fn config(limit: f64, max: f64, initial: f64, spike_magnitude_kmh: f64) -> SessionConfig {
    SessionConfig {
        speed_limit_kmh: limit,
        initial_speed_kmh: initial,
        sampler: SamplerTuning {
            max_speed_kmh: max,
            max_step_kmh: 2.0,
            spike_probability: 0.05,
            spike_magnitude_kmh,
        },
    }
}

#[test]
fn constant_fifty_reaches_first_waypoint_on_tick_seventy_two() {
    let route = route(&[0.0, 1.0, 2.5]);
    let mut session = TripSession::start(
        &route,
        config(60.0, 80.0, 50.0, 15.0),
        ScriptedSource::constant(NO_STEP),
    )
    .expect("session");

    for _ in 0..71 {
        let outcome = session.tick(ONE_SECOND);
        assert_eq!(outcome.snapshot.current_speed_kmh, 50.0);
        assert!(!outcome.alert_changed);
    }
    assert_eq!(session.snapshot().current_index, 0);

    let snapshot = session.tick(ONE_SECOND).snapshot;

    assert_eq!(snapshot.current_index, 1);
    assert_eq!(snapshot.tick_count, 72);
    assert_eq!(snapshot.current_waypoint.id().as_str(), "w1");
    assert_eq!(snapshot.next_waypoint.map(|w| w.id().as_str()), Some("w2"));
    assert!(
        (snapshot.distance_to_next_km - 1.5).abs() < 1e-9,
        "distance_to_next_km = {}",
        snapshot.distance_to_next_km
    );
    assert!((snapshot.progress_fraction - 0.5).abs() < f64::EPSILON);
    assert_eq!(snapshot.status, TripStatus::Running);
}

#[test]
fn spike_alert_is_edge_triggered() {
    let route = route(&[0.0, 1.0, 2.5]);
    let script = vec![
        NO_STEP, NO_SPIKE, // 55
        NO_STEP, SPIKE, UP, // 55 + 35 = 90, clamped to 80
        NO_STEP, NO_SPIKE, // 80
        NO_STEP, NO_SPIKE, // 80
        NO_STEP, NO_SPIKE, // 80
        NO_STEP, SPIKE, DOWN, // 80 - 35 = 45
        NO_STEP, NO_SPIKE, // 45
    ];
    let mut session = TripSession::start(
        &route,
        config(60.0, 80.0, 55.0, 35.0),
        ScriptedSource::new(script),
    )
    .expect("session");

    let outcomes: Vec<(f64, bool, bool)> = (0..7)
        .map(|_| {
            let outcome = session.tick(ONE_SECOND);
            (
                outcome.snapshot.current_speed_kmh,
                outcome.snapshot.is_over_limit,
                outcome.alert_changed,
            )
        })
        .collect();

    assert_eq!(
        outcomes,
        vec![
            (55.0, false, false),
            (80.0, true, true),
            (80.0, true, false),
            (80.0, true, false),
            (80.0, true, false),
            (45.0, false, true),
            (45.0, false, false),
        ]
    );
}

#[test]
fn spike_alert_events_carry_state_and_limit() {
    let route = route(&[0.0, 1.0, 2.5]);
    let script = vec![NO_STEP, SPIKE, UP, NO_STEP, SPIKE, DOWN];
    let mut session = TripSession::start(
        &route,
        config(60.0, 80.0, 55.0, 35.0),
        ScriptedSource::new(script),
    )
    .expect("session");

    let mut events = Vec::new();
    for _ in 0..2 {
        apply(
            &mut session,
            trip_telemetry_core::Command::Tick { dt: ONE_SECOND },
            &mut events,
        );
    }

    let crossings: Vec<&Event> = events
        .iter()
        .filter(|event| matches!(event, Event::SpeedLimitCrossed { .. }))
        .collect();
    assert_eq!(
        crossings,
        vec![
            &Event::SpeedLimitCrossed {
                state: LimitState::Exceeding,
                speed_kmh: 80.0,
                limit_kmh: 60.0,
            },
            &Event::SpeedLimitCrossed {
                state: LimitState::Normal,
                speed_kmh: 45.0,
                limit_kmh: 60.0,
            },
        ]
    );
}

#[test]
fn single_tick_exactly_meets_final_segment() {
    let route = route(&[0.0, 0.1]);
    let mut session = TripSession::start(
        &route,
        config(60.0, 400.0, 360.0, 15.0),
        ScriptedSource::constant(NO_STEP),
    )
    .expect("session");

    let outcome = session.tick(ONE_SECOND);

    assert_eq!(outcome.snapshot.status, TripStatus::Completed);
    assert_eq!(outcome.snapshot.distance_to_next_km, 0.0);
    assert_eq!(outcome.snapshot.current_index, 1);
    assert_eq!(outcome.snapshot.next_waypoint, None);
    assert_eq!(outcome.snapshot.progress_fraction, 1.0);
    assert_eq!(outcome.snapshot.remaining_km, 0.0);
    assert!(outcome.snapshot.is_over_limit);
    assert!(!outcome.alert_changed, "the trip was already over the limit at start");
}

#[test]
fn snapshot_is_a_pure_read() {
    let route = route(&[0.0, 1.0, 2.5]);
    let mut session = TripSession::start(
        &route,
        config(60.0, 80.0, 40.0, 15.0),
        ScriptedSource::new(vec![0.8, NO_SPIKE, 0.3, NO_SPIKE]),
    )
    .expect("session");

    for _ in 0..5 {
        let _ = session.tick(ONE_SECOND);
    }

    let first = session.snapshot();
    let second = session.snapshot();
    assert_eq!(first, second);
    assert_eq!(first.tick_count, 5);
    assert_eq!(first.elapsed, Duration::from_secs(5));
}

#[test]
fn single_waypoint_route_reports_full_progress() {
    let route = route(&[0.0]);
    let mut session = TripSession::start(
        &route,
        SessionConfig::default(),
        ScriptedSource::constant(NO_STEP),
    )
    .expect("session");

    let snapshot = session.snapshot();
    assert_eq!(snapshot.progress_fraction, 1.0);
    assert_eq!(snapshot.distance_to_next_km, 0.0);
    assert_eq!(snapshot.status, TripStatus::Running);

    assert_eq!(session.tick(ONE_SECOND).snapshot.status, TripStatus::Completed);
}

#[test]
fn next_stop_skips_landmarks_and_turns() {
    let route = WaypointRoute::new(vec![
        Waypoint::new("w1", WaypointKind::Stop, "CMS Terminal", 0.0),
        Waypoint::new("w2", WaypointKind::Landmark, "Muson Centre", 1.2),
        Waypoint::new("w3", WaypointKind::Turn, "Bonny Camp Junction", 2.5),
        Waypoint::new("w4", WaypointKind::Stop, "Victoria Island (1004)", 4.0),
    ])
    .expect("valid route");

    // 3 600 km/h over one second covers 1.0 km.
    let mut session = TripSession::start(
        &route,
        config(60.0, 4_000.0, 3_600.0, 15.0),
        ScriptedSource::constant(NO_STEP),
    )
    .expect("session");

    let before = session.next_stop().expect("a stop lies ahead");
    assert_eq!(before.index, 3);
    assert!((before.distance_km - 4.0).abs() < 1e-9);

    let _ = session.tick(ONE_SECOND);
    let after = session.next_stop().expect("a stop lies ahead");
    assert_eq!(after.waypoint.label(), "Victoria Island (1004)");
    assert!((after.distance_km - 3.0).abs() < 1e-9);
}

#[test]
fn invalid_configuration_is_rejected_at_start() {
    let route = route(&[0.0, 1.0]);
    let result = TripSession::with_limits(&route, -5.0, 80.0, ScriptedSource::constant(NO_STEP));
    assert!(result.is_err());
}
