#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Immutable, validated waypoint routes.
//!
//! A [`WaypointRoute`] is built once from static waypoint definitions and then
//! shared read-only by every trip session driving along it. Construction is
//! the only place a route can fail; all later lookups are bounds checked and
//! report [`RouteError::IndexOutOfRange`] on caller bugs.

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;
use trip_telemetry_core::{Waypoint, WaypointId, WaypointKind};

/// Errors reported while building or querying a route.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RouteError {
    /// The waypoint sequence violates a route invariant.
    #[error("invalid route: {0}")]
    InvalidRoute(InvalidRouteReason),
    /// A lookup addressed a waypoint the route does not contain.
    #[error("waypoint index {index} is out of range for a route of {len} waypoints")]
    IndexOutOfRange {
        /// Index requested by the caller.
        index: usize,
        /// Number of waypoints in the route.
        len: usize,
    },
}

/// Specific invariant a rejected waypoint sequence violated.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum InvalidRouteReason {
    /// The sequence contained no waypoints.
    #[error("route contains no waypoints")]
    Empty,
    /// The first waypoint does not sit at the route origin.
    #[error("first waypoint `{id}` starts at {distance_km} km instead of 0")]
    OriginNotAtZero {
        /// Identifier of the first waypoint.
        id: WaypointId,
        /// Distance the first waypoint declared.
        distance_km: f64,
    },
    /// A waypoint declared a negative or non-finite distance.
    #[error("waypoint `{id}` has unusable distance {distance_km} km")]
    InvalidDistance {
        /// Identifier of the offending waypoint.
        id: WaypointId,
        /// Distance the waypoint declared.
        distance_km: f64,
    },
    /// A waypoint is not strictly further along than its predecessor.
    #[error("waypoint `{id}` at {distance_km} km does not follow the previous waypoint at {previous_km} km")]
    NotAscending {
        /// Identifier of the offending waypoint.
        id: WaypointId,
        /// Distance the waypoint declared.
        distance_km: f64,
        /// Distance of the preceding waypoint.
        previous_km: f64,
    },
    /// Two waypoints share the same identifier.
    #[error("waypoint id `{id}` appears more than once")]
    DuplicateId {
        /// Identifier that was repeated.
        id: WaypointId,
    },
}

impl From<InvalidRouteReason> for RouteError {
    fn from(reason: InvalidRouteReason) -> Self {
        Self::InvalidRoute(reason)
    }
}

/// Ordered, non-empty sequence of waypoints sorted by cumulative distance.
#[derive(Clone, Debug, PartialEq)]
pub struct WaypointRoute {
    id: Option<String>,
    name: Option<String>,
    waypoints: Vec<Waypoint>,
}

impl WaypointRoute {
    /// Validates the waypoint sequence and builds an anonymous route.
    pub fn new(waypoints: Vec<Waypoint>) -> Result<Self, RouteError> {
        validate(&waypoints)?;
        Ok(Self {
            id: None,
            name: None,
            waypoints,
        })
    }

    /// Catalog identifier of the route, if one was supplied.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Display name of the route, if one was supplied.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of waypoints in the route. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always `false`; routes are rejected at construction when empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Index of the final waypoint.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }

    /// Returns the waypoint at `index`.
    pub fn waypoint_at(&self, index: usize) -> Result<&Waypoint, RouteError> {
        self.waypoints
            .get(index)
            .ok_or(RouteError::IndexOutOfRange {
                index,
                len: self.waypoints.len(),
            })
    }

    /// Distance between waypoint `index` and the waypoint after it.
    ///
    /// The final waypoint has no following segment, so the last index reports
    /// [`RouteError::IndexOutOfRange`] just like any index past the end.
    pub fn segment_length(&self, index: usize) -> Result<f64, RouteError> {
        let next = index.checked_add(1).and_then(|next| self.waypoints.get(next));
        match (self.waypoints.get(index), next) {
            (Some(from), Some(to)) => {
                Ok(to.distance_from_start_km() - from.distance_from_start_km())
            }
            _ => Err(RouteError::IndexOutOfRange {
                index,
                len: self.waypoints.len(),
            }),
        }
    }

    /// Origin waypoint of the route.
    #[must_use]
    pub fn first(&self) -> &Waypoint {
        &self.waypoints[0]
    }

    /// Destination waypoint of the route.
    #[must_use]
    pub fn last(&self) -> &Waypoint {
        &self.waypoints[self.last_index()]
    }

    /// Total length of the route in kilometres.
    #[must_use]
    pub fn total_length_km(&self) -> f64 {
        self.last().distance_from_start_km()
    }

    /// Iterator over the waypoints in route order.
    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter()
    }

    /// Finds the first waypoint of `kind` strictly after `after_index`.
    #[must_use]
    pub fn next_of_kind(
        &self,
        after_index: usize,
        kind: WaypointKind,
    ) -> Option<(usize, &Waypoint)> {
        self.waypoints
            .iter()
            .enumerate()
            .skip(after_index.saturating_add(1))
            .find(|(_, waypoint)| waypoint.kind() == kind)
    }
}

/// Static route description as supplied by the surrounding application.
///
/// Definitions are plain data; call [`RouteDefinition::into_route`] to run
/// validation and obtain a usable [`WaypointRoute`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RouteDefinition {
    /// Catalog identifier of the route.
    #[serde(default)]
    pub id: Option<String>,
    /// Display name such as "CMS - Lekki".
    #[serde(default)]
    pub name: Option<String>,
    /// Waypoints in travel order.
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
}

impl RouteDefinition {
    /// Validates the definition and converts it into a named route.
    pub fn into_route(self) -> Result<WaypointRoute, RouteError> {
        let mut route = WaypointRoute::new(self.waypoints)?;
        route.id = self.id;
        route.name = self.name;
        Ok(route)
    }
}

fn validate(waypoints: &[Waypoint]) -> Result<(), InvalidRouteReason> {
    let Some(origin) = waypoints.first() else {
        return Err(InvalidRouteReason::Empty);
    };

    let mut seen: HashSet<&WaypointId> = HashSet::with_capacity(waypoints.len());
    let mut previous: Option<f64> = None;

    for waypoint in waypoints {
        let distance_km = waypoint.distance_from_start_km();
        if !distance_km.is_finite() || distance_km < 0.0 {
            return Err(InvalidRouteReason::InvalidDistance {
                id: waypoint.id().clone(),
                distance_km,
            });
        }

        if let Some(previous_km) = previous {
            if distance_km <= previous_km {
                return Err(InvalidRouteReason::NotAscending {
                    id: waypoint.id().clone(),
                    distance_km,
                    previous_km,
                });
            }
        }

        if !seen.insert(waypoint.id()) {
            return Err(InvalidRouteReason::DuplicateId {
                id: waypoint.id().clone(),
            });
        }

        previous = Some(distance_km);
    }

    if origin.distance_from_start_km() != 0.0 {
        return Err(InvalidRouteReason::OriginNotAtZero {
            id: origin.id().clone(),
            distance_km: origin.distance_from_start_km(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(id: &str, distance_km: f64) -> Waypoint {
        Waypoint::new(id, WaypointKind::Stop, id.to_uppercase(), distance_km)
    }

    #[test]
    fn origin_must_sit_at_zero() {
        let error = WaypointRoute::new(vec![stop("a", 0.5), stop("b", 1.0)])
            .expect_err("origin away from zero");
        assert!(matches!(
            error,
            RouteError::InvalidRoute(InvalidRouteReason::OriginNotAtZero { .. })
        ));
    }

    #[test]
    fn negative_distances_are_reported_before_ordering() {
        let error = WaypointRoute::new(vec![stop("a", -1.0)]).expect_err("negative distance");
        assert!(matches!(
            error,
            RouteError::InvalidRoute(InvalidRouteReason::InvalidDistance { .. })
        ));
    }

    #[test]
    fn last_index_has_no_segment() {
        let route = WaypointRoute::new(vec![stop("a", 0.0), stop("b", 2.0)]).expect("route");
        assert_eq!(
            route.segment_length(1),
            Err(RouteError::IndexOutOfRange { index: 1, len: 2 })
        );
        assert_eq!(
            route.segment_length(usize::MAX),
            Err(RouteError::IndexOutOfRange {
                index: usize::MAX,
                len: 2
            })
        );
    }
}
