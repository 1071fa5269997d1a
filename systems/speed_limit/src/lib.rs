#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Edge-triggered speed limit monitor.

use trip_telemetry_core::LimitState;

/// Result of evaluating one speed sample against the limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Evaluation {
    /// State after the sample was applied.
    pub state: LimitState,
    /// Whether the state flipped on this sample.
    pub changed: bool,
}

/// Two-state monitor comparing each sample against a hard limit.
///
/// There is no hysteresis band: a speed hovering across the limit flips the
/// state on every crossing.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpeedLimitMonitor {
    state: LimitState,
}

impl SpeedLimitMonitor {
    /// Creates a monitor in the [`LimitState::Normal`] state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of the monitor.
    #[must_use]
    pub const fn state(&self) -> LimitState {
        self.state
    }

    /// Applies `speed_kmh` and reports whether the state changed.
    pub fn evaluate(&mut self, speed_kmh: f64, limit_kmh: f64) -> Evaluation {
        let next = if speed_kmh > limit_kmh {
            LimitState::Exceeding
        } else {
            LimitState::Normal
        };
        let changed = next != self.state;
        self.state = next;
        Evaluation {
            state: next,
            changed,
        }
    }
}
