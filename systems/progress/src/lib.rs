#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Progress tracking that moves a vehicle along a waypoint route.

use trip_telemetry_route::WaypointRoute;

const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Remaining distance at or below which a waypoint counts as reached.
///
/// Absorbs the rounding left behind by summing many per-tick distances.
pub const ARRIVAL_EPSILON_KM: f64 = 1e-9;

/// Position of a vehicle along its route.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    current_index: usize,
    distance_to_next_km: f64,
    complete: bool,
}

impl Progress {
    /// Creates a position at the origin of `route`.
    #[must_use]
    pub fn at_origin(route: &WaypointRoute) -> Self {
        Self {
            current_index: 0,
            distance_to_next_km: route.segment_length(0).unwrap_or(0.0),
            complete: false,
        }
    }

    /// Index of the last waypoint reached.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    /// Distance left until the following waypoint. Zero once complete.
    #[must_use]
    pub const fn distance_to_next_km(&self) -> f64 {
        self.distance_to_next_km
    }

    /// Whether the vehicle arrived at the final waypoint.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Distance travelled from the route origin.
    #[must_use]
    pub fn travelled_km(&self, route: &WaypointRoute) -> f64 {
        route
            .waypoint_at(self.current_index + 1)
            .map_or(route.total_length_km(), |next| {
                next.distance_from_start_km() - self.distance_to_next_km
            })
    }

    /// Distance left until the final waypoint.
    #[must_use]
    pub fn remaining_km(&self, route: &WaypointRoute) -> f64 {
        (route.total_length_km() - self.travelled_km(route)).max(0.0)
    }
}

/// Pure system that converts speed samples into route progress.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProgressTracker;

impl ProgressTracker {
    /// Creates a new tracker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Moves `progress` by the distance covered at `speed_kmh` over `tick_seconds`.
    ///
    /// Overshoot past a waypoint is carried into the following segment, and the
    /// loop keeps advancing until the remaining distance exceeds
    /// [`ARRIVAL_EPSILON_KM`], so one coarse tick may cross several waypoints.
    /// Every crossed index is pushed to `crossed` in route order. Arriving at
    /// the final waypoint marks the progress complete with zero distance left;
    /// later calls do nothing.
    pub fn advance(
        &self,
        progress: &mut Progress,
        route: &WaypointRoute,
        speed_kmh: f64,
        tick_seconds: f64,
        crossed: &mut Vec<usize>,
    ) {
        if progress.complete {
            return;
        }

        progress.distance_to_next_km -= distance_covered_km(speed_kmh, tick_seconds);

        while progress.distance_to_next_km <= ARRIVAL_EPSILON_KM {
            let next_index = progress.current_index + 1;
            if next_index > route.last_index() {
                progress.distance_to_next_km = 0.0;
                progress.complete = true;
                return;
            }

            let overshoot = (-progress.distance_to_next_km).max(0.0);
            progress.current_index = next_index;
            crossed.push(next_index);

            match route.segment_length(next_index) {
                Ok(segment) => progress.distance_to_next_km = (segment - overshoot).max(0.0),
                Err(_) => {
                    progress.distance_to_next_km = 0.0;
                    progress.complete = true;
                    return;
                }
            }
        }
    }
}

/// Distance covered at `speed_kmh` during `tick_seconds`.
///
/// Negative or non-finite inputs cover no distance.
#[must_use]
pub fn distance_covered_km(speed_kmh: f64, tick_seconds: f64) -> f64 {
    let covered = speed_kmh * tick_seconds / SECONDS_PER_HOUR;
    if covered.is_finite() && covered > 0.0 {
        covered
    } else {
        0.0
    }
}
