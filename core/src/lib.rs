#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the trip telemetry engine.
//!
//! This crate defines the vocabulary that connects the clock-driving adapters,
//! the authoritative trip session, and the pure per-tick systems. Adapters
//! submit [`Command`] values, the session executes them through its `apply`
//! entry point and broadcasts [`Event`] values describing what changed.
//! Waypoints are plain data supplied by the surrounding application.

use std::{fmt, time::Duration};

use serde::Deserialize;

/// Commands that express every permissible trip mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the trip simulation by one tick of the provided duration.
    Tick {
        /// Simulated time covered by the tick.
        dt: Duration,
    },
    /// Ends the trip early on behalf of the driver.
    Terminate,
}

/// Events broadcast by a trip session after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the trip clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Reports the speed sampled for the tick.
    SpeedSampled {
        /// Sampled vehicle speed in km/h.
        speed_kmh: f64,
    },
    /// Announces that the speed limit monitor changed state.
    SpeedLimitCrossed {
        /// State the monitor entered on this tick.
        state: LimitState,
        /// Speed that triggered the transition.
        speed_kmh: f64,
        /// Limit the speed was compared against.
        limit_kmh: f64,
    },
    /// Confirms that the vehicle passed or arrived at a waypoint.
    WaypointReached {
        /// Position of the waypoint within its route.
        index: usize,
        /// Identifier of the waypoint.
        waypoint: WaypointId,
    },
    /// Announces that the vehicle arrived at the final waypoint.
    TripCompleted {
        /// Simulated running time of the trip.
        elapsed: Duration,
    },
    /// Announces that the trip was ended by its owner before arrival.
    TripTerminated {
        /// Waypoint index the vehicle had reached when the trip ended.
        at_index: usize,
    },
}

/// Lifecycle state of a trip session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TripStatus {
    /// The trip is being driven and accepts ticks.
    Running,
    /// The vehicle reached the final waypoint.
    Completed,
    /// The trip was ended by its owner before arrival.
    Terminated,
}

impl TripStatus {
    /// Reports whether the status no longer accepts ticks.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// State of the speed limit monitor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LimitState {
    /// Speed is at or below the configured limit.
    #[default]
    Normal,
    /// Speed is strictly above the configured limit.
    Exceeding,
}

impl LimitState {
    /// Reports whether the state represents an over-limit condition.
    #[must_use]
    pub const fn is_exceeding(self) -> bool {
        matches!(self, Self::Exceeding)
    }
}

/// Unique identifier assigned to a waypoint within a route.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct WaypointId(String);

impl WaypointId {
    /// Creates a waypoint identifier from the provided text.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Retrieves the textual representation of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WaypointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role a waypoint plays along a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaypointKind {
    /// Passenger stop where the vehicle halts.
    Stop,
    /// Junction where the driver changes road.
    Turn,
    /// Recognisable landmark used for orientation.
    Landmark,
}

impl fmt::Display for WaypointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Stop => "stop",
            Self::Turn => "turn",
            Self::Landmark => "landmark",
        };
        f.write_str(label)
    }
}

/// Labelled point along a route at a fixed cumulative distance from its origin.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Waypoint {
    id: WaypointId,
    kind: WaypointKind,
    label: String,
    #[serde(default)]
    detail: Option<String>,
    distance_from_start_km: f64,
    #[serde(default)]
    image_ref: Option<String>,
}

impl Waypoint {
    /// Creates a waypoint without detail text or image reference.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        kind: WaypointKind,
        label: impl Into<String>,
        distance_from_start_km: f64,
    ) -> Self {
        Self {
            id: WaypointId::new(id),
            kind,
            label: label.into(),
            detail: None,
            distance_from_start_km,
            image_ref: None,
        }
    }

    /// Attaches a short instruction such as "Turn Left onto Ozumba".
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Attaches a reference to an image that depicts the waypoint.
    #[must_use]
    pub fn with_image_ref(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    /// Identifier of the waypoint.
    #[must_use]
    pub fn id(&self) -> &WaypointId {
        &self.id
    }

    /// Role the waypoint plays along the route.
    #[must_use]
    pub const fn kind(&self) -> WaypointKind {
        self.kind
    }

    /// Human readable name of the waypoint.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Optional instruction shown alongside the label.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Cumulative distance from the route origin in kilometres.
    #[must_use]
    pub const fn distance_from_start_km(&self) -> f64 {
        self.distance_from_start_km
    }

    /// Optional image reference supplied by the surrounding application.
    #[must_use]
    pub fn image_ref(&self) -> Option<&str> {
        self.image_ref.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::{LimitState, TripStatus, Waypoint, WaypointKind};

    #[test]
    fn terminal_statuses_reject_ticks() {
        assert!(!TripStatus::Running.is_terminal());
        assert!(TripStatus::Completed.is_terminal());
        assert!(TripStatus::Terminated.is_terminal());
    }

    #[test]
    fn limit_state_defaults_to_normal() {
        assert_eq!(LimitState::default(), LimitState::Normal);
        assert!(LimitState::Exceeding.is_exceeding());
    }

    #[test]
    fn waypoint_builder_keeps_optional_fields() {
        let waypoint = Waypoint::new("w2", WaypointKind::Landmark, "Muson Centre", 1.2)
            .with_detail("Keep Left after this")
            .with_image_ref("muson.jpg");

        assert_eq!(waypoint.id().as_str(), "w2");
        assert_eq!(waypoint.detail(), Some("Keep Left after this"));
        assert_eq!(waypoint.image_ref(), Some("muson.jpg"));
        assert!((waypoint.distance_from_start_km() - 1.2).abs() < f64::EPSILON);
    }

    #[test]
    fn waypoint_parses_from_toml_with_lowercase_kind() {
        let source = r#"
            id = "w3"
            kind = "turn"
            label = "Bonny Camp Junction"
            detail = "Turn Left onto Ozumba"
            distance_from_start_km = 2.5
        "#;

        let waypoint: Waypoint = toml::from_str(source).expect("parse waypoint");

        assert_eq!(waypoint.kind(), WaypointKind::Turn);
        assert_eq!(waypoint.label(), "Bonny Camp Junction");
        assert_eq!(waypoint.image_ref(), None);
    }
}
