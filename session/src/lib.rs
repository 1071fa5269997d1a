#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative trip session state for the driver telemetry engine.
//!
//! A [`TripSession`] is bound to one shared [`WaypointRoute`] and owned by the
//! caller that drives its clock. Each tick samples a speed, evaluates it
//! against the configured limit, and advances the vehicle along the route.
//! Callers observe the result through immutable [`TripSnapshot`] values, or
//! route commands through [`apply`] to receive the matching [`Event`] stream.

mod config;

use std::time::Duration;

use tracing::{debug, info, trace, warn};
use trip_telemetry_core::{Command, Event, LimitState, TripStatus, Waypoint, WaypointKind};
use trip_telemetry_route::WaypointRoute;
use trip_telemetry_system_progress::{Progress, ProgressTracker};
use trip_telemetry_system_speed_limit::SpeedLimitMonitor;
use trip_telemetry_system_speed_sampler::{RandomSource, SpeedSampler};

pub use config::{ConfigError, SessionConfig};

/// Mutable trip aggregate driven by a caller-owned clock.
#[derive(Debug)]
pub struct TripSession<'r, R> {
    route: &'r WaypointRoute,
    config: SessionConfig,
    sampler: SpeedSampler<R>,
    monitor: SpeedLimitMonitor,
    tracker: ProgressTracker,
    progress: Progress,
    status: TripStatus,
    tick_count: u64,
    elapsed: Duration,
    crossed: Vec<usize>,
}

impl<'r, R: RandomSource> TripSession<'r, R> {
    /// Starts a running session at the origin of `route`.
    ///
    /// The limit monitor is seeded with the initial speed, so a trip starting
    /// above the limit reports `is_over_limit` before its first tick and the
    /// first tick only flags an alert change when the speed drops back.
    pub fn start(
        route: &'r WaypointRoute,
        config: SessionConfig,
        source: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let sampler = SpeedSampler::new(config.sampler, source, config.initial_speed_kmh);
        let mut monitor = SpeedLimitMonitor::new();
        let _ = monitor.evaluate(sampler.last_speed_kmh(), config.speed_limit_kmh);

        info!(
            route = route.name().unwrap_or("unnamed"),
            waypoints = route.len(),
            length_km = route.total_length_km(),
            speed_limit_kmh = config.speed_limit_kmh,
            over_limit = monitor.state().is_exceeding(),
            "trip started"
        );

        Ok(Self {
            route,
            config,
            sampler,
            monitor,
            tracker: ProgressTracker::new(),
            progress: Progress::at_origin(route),
            status: TripStatus::Running,
            tick_count: 0,
            elapsed: Duration::ZERO,
            crossed: Vec::new(),
        })
    }

    /// Starts a session with default sampler tuning apart from the two limits.
    pub fn with_limits(
        route: &'r WaypointRoute,
        speed_limit_kmh: f64,
        max_speed_kmh: f64,
        source: R,
    ) -> Result<Self, ConfigError> {
        let mut config = SessionConfig {
            speed_limit_kmh,
            ..SessionConfig::default()
        };
        config.sampler.max_speed_kmh = max_speed_kmh;
        Self::start(route, config, source)
    }

    /// Route the session drives along.
    #[must_use]
    pub const fn route(&self) -> &'r WaypointRoute {
        self.route
    }

    /// Configuration the session was started with.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn status(&self) -> TripStatus {
        self.status
    }

    /// Current state of the speed limit monitor.
    #[must_use]
    pub const fn limit_state(&self) -> LimitState {
        self.monitor.state()
    }

    /// Advances the trip by `dt` and reports whether the limit alert flipped.
    ///
    /// Ticks on a completed or terminated trip change nothing and report
    /// `alert_changed = false`.
    pub fn tick(&mut self, dt: Duration) -> TickOutcome<'r> {
        let mut events = Vec::new();
        let alert_changed = if self.status.is_terminal() {
            false
        } else {
            self.run_tick(dt, &mut events)
        };

        TickOutcome {
            snapshot: self.snapshot(),
            alert_changed,
        }
    }

    /// Ends a running trip. Has no effect once the trip is completed or terminated.
    pub fn terminate(&mut self) {
        if self.status != TripStatus::Running {
            return;
        }

        self.status = TripStatus::Terminated;
        info!(
            at_index = self.progress.current_index(),
            ticks = self.tick_count,
            "trip terminated"
        );
    }

    /// Captures the observable state of the trip.
    #[must_use]
    pub fn snapshot(&self) -> TripSnapshot<'r> {
        let current_index = self.progress.current_index();
        let last_index = self.route.last_index();
        let progress_fraction = if last_index == 0 {
            1.0
        } else {
            (current_index as f64 / last_index as f64).clamp(0.0, 1.0)
        };

        TripSnapshot {
            current_index,
            current_waypoint: self
                .route
                .waypoint_at(current_index)
                .unwrap_or(self.route.last()),
            next_waypoint: self.route.waypoint_at(current_index + 1).ok(),
            distance_to_next_km: self.progress.distance_to_next_km(),
            remaining_km: self.progress.remaining_km(self.route),
            current_speed_kmh: self.sampler.last_speed_kmh(),
            speed_limit_kmh: self.config.speed_limit_kmh,
            is_over_limit: self.monitor.state().is_exceeding(),
            progress_fraction,
            status: self.status,
            tick_count: self.tick_count,
            elapsed: self.elapsed,
        }
    }

    /// Next passenger stop ahead of the vehicle and the distance to it.
    #[must_use]
    pub fn next_stop(&self) -> Option<NextStop<'r>> {
        if self.progress.is_complete() {
            return None;
        }

        let (index, waypoint) = self
            .route
            .next_of_kind(self.progress.current_index(), WaypointKind::Stop)?;
        let distance_km =
            (waypoint.distance_from_start_km() - self.progress.travelled_km(self.route)).max(0.0);

        Some(NextStop {
            index,
            waypoint,
            distance_km,
        })
    }

    fn run_tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) -> bool {
        let speed_kmh = self.sampler.sample();
        let limit_kmh = self.config.speed_limit_kmh;
        out_events.push(Event::TimeAdvanced { dt });
        out_events.push(Event::SpeedSampled { speed_kmh });

        let evaluation = self.monitor.evaluate(speed_kmh, limit_kmh);
        if evaluation.changed {
            match evaluation.state {
                LimitState::Exceeding => warn!(speed_kmh, limit_kmh, "speed limit exceeded"),
                LimitState::Normal => info!(speed_kmh, limit_kmh, "speed back within limit"),
            }
            out_events.push(Event::SpeedLimitCrossed {
                state: evaluation.state,
                speed_kmh,
                limit_kmh,
            });
        }

        self.crossed.clear();
        self.tracker.advance(
            &mut self.progress,
            self.route,
            speed_kmh,
            dt.as_secs_f64(),
            &mut self.crossed,
        );

        for &index in &self.crossed {
            if let Ok(waypoint) = self.route.waypoint_at(index) {
                debug!(
                    index,
                    waypoint = %waypoint.id(),
                    label = waypoint.label(),
                    "waypoint reached"
                );
                out_events.push(Event::WaypointReached {
                    index,
                    waypoint: waypoint.id().clone(),
                });
            }
        }

        self.tick_count = self.tick_count.saturating_add(1);
        self.elapsed = self.elapsed.saturating_add(dt);

        if self.progress.is_complete() {
            self.status = TripStatus::Completed;
            info!(
                ticks = self.tick_count,
                elapsed_secs = self.elapsed.as_secs_f64(),
                "trip completed"
            );
            out_events.push(Event::TripCompleted {
                elapsed: self.elapsed,
            });
        }

        trace!(
            tick = self.tick_count,
            speed_kmh,
            index = self.progress.current_index(),
            distance_to_next_km = self.progress.distance_to_next_km(),
            "tick"
        );

        evaluation.changed
    }
}

/// Applies `command` to the session and records the resulting events.
pub fn apply<R: RandomSource>(
    session: &mut TripSession<'_, R>,
    command: Command,
    out_events: &mut Vec<Event>,
) {
    match command {
        Command::Tick { dt } => {
            if session.status.is_terminal() {
                return;
            }
            let _ = session.run_tick(dt, out_events);
        }
        Command::Terminate => {
            if session.status != TripStatus::Running {
                return;
            }
            session.terminate();
            out_events.push(Event::TripTerminated {
                at_index: session.progress.current_index(),
            });
        }
    }
}

/// Result of a single [`TripSession::tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickOutcome<'r> {
    /// State of the trip after the tick.
    pub snapshot: TripSnapshot<'r>,
    /// Whether the speed limit monitor flipped on this tick.
    pub alert_changed: bool,
}

/// Immutable view of a trip session at the moment of observation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TripSnapshot<'r> {
    /// Index of the last waypoint reached.
    pub current_index: usize,
    /// Last waypoint reached.
    pub current_waypoint: &'r Waypoint,
    /// Waypoint the vehicle is heading towards, if any.
    pub next_waypoint: Option<&'r Waypoint>,
    /// Distance left to the next waypoint. Zero once completed.
    pub distance_to_next_km: f64,
    /// Distance left to the final waypoint.
    pub remaining_km: f64,
    /// Most recently sampled speed.
    pub current_speed_kmh: f64,
    /// Limit the speed is compared against.
    pub speed_limit_kmh: f64,
    /// Whether the current speed exceeds the limit.
    pub is_over_limit: bool,
    /// `current_index / (len - 1)`; 1.0 for a single-waypoint route.
    pub progress_fraction: f64,
    /// Lifecycle state.
    pub status: TripStatus,
    /// Number of ticks applied while running.
    pub tick_count: u64,
    /// Simulated running time.
    pub elapsed: Duration,
}

/// Upcoming passenger stop as shown on the driver display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NextStop<'r> {
    /// Index of the stop within the route.
    pub index: usize,
    /// The stop itself.
    pub waypoint: &'r Waypoint,
    /// Distance left until the stop.
    pub distance_km: f64,
}
