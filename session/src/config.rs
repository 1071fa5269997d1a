//! Session configuration and its validation rules.

use serde::Deserialize;
use thiserror::Error;
use trip_telemetry_system_speed_sampler::SamplerTuning;

const DEFAULT_SPEED_LIMIT_KMH: f64 = 60.0;

/// Settings a trip session is started with.
///
/// Every field has a default, so a configuration file only needs to name the
/// values it changes.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Speed above which the limit alert is raised.
    pub speed_limit_kmh: f64,
    /// Speed the vehicle holds before the first tick.
    pub initial_speed_kmh: f64,
    /// Random-walk tuning for the speed sampler.
    pub sampler: SamplerTuning,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            speed_limit_kmh: DEFAULT_SPEED_LIMIT_KMH,
            initial_speed_kmh: 0.0,
            sampler: SamplerTuning::default(),
        }
    }
}

impl SessionConfig {
    /// Checks that every value is usable by the sampler and monitor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limit = self.speed_limit_kmh;
        if !limit.is_finite() || limit < 0.0 {
            return Err(ConfigError::InvalidSpeedLimit(limit));
        }

        let max = self.sampler.max_speed_kmh;
        if !max.is_finite() || max <= 0.0 {
            return Err(ConfigError::InvalidMaxSpeed(max));
        }

        let step = self.sampler.max_step_kmh;
        if !step.is_finite() || step < 0.0 {
            return Err(ConfigError::InvalidStep(step));
        }

        let probability = self.sampler.spike_probability;
        if !(0.0..=1.0).contains(&probability) {
            return Err(ConfigError::InvalidSpikeProbability(probability));
        }

        let magnitude = self.sampler.spike_magnitude_kmh;
        if !magnitude.is_finite() || magnitude < 0.0 {
            return Err(ConfigError::InvalidSpikeMagnitude(magnitude));
        }

        let initial = self.initial_speed_kmh;
        if !(0.0..=max).contains(&initial) {
            return Err(ConfigError::InvalidInitialSpeed {
                speed_kmh: initial,
                max_speed_kmh: max,
            });
        }

        let can_spike = probability > 0.0 && magnitude > 0.0;
        if initial == 0.0 && step == 0.0 && !can_spike {
            return Err(ConfigError::StationaryWalk);
        }

        Ok(())
    }
}

/// Reasons a session configuration is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The speed limit is negative or not a number.
    #[error("speed limit must be a finite, non-negative km/h value (got {0})")]
    InvalidSpeedLimit(f64),
    /// The maximum speed is not a positive number.
    #[error("maximum speed must be a finite, positive km/h value (got {0})")]
    InvalidMaxSpeed(f64),
    /// The noise step is negative or not a number.
    #[error("speed step must be a finite, non-negative km/h value (got {0})")]
    InvalidStep(f64),
    /// The spike probability lies outside `[0, 1]`.
    #[error("spike probability must lie within [0, 1] (got {0})")]
    InvalidSpikeProbability(f64),
    /// The spike magnitude is negative or not a number.
    #[error("spike magnitude must be a finite, non-negative km/h value (got {0})")]
    InvalidSpikeMagnitude(f64),
    /// The initial speed lies outside `[0, max_speed_kmh]`.
    #[error("initial speed {speed_kmh} km/h lies outside [0, {max_speed_kmh}] km/h")]
    InvalidInitialSpeed {
        /// Requested initial speed.
        speed_kmh: f64,
        /// Configured maximum speed.
        max_speed_kmh: f64,
    },
    /// The vehicle starts at rest and the sampler can never raise its speed.
    #[error("a trip starting at 0 km/h needs a non-zero speed step or spike")]
    StationaryWalk,
}
