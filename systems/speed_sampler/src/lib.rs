#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bounded random-walk speed sampler with injectable randomness.
//!
//! Each sample applies a symmetric noise step to the previous speed, clamps
//! the result into `[0, max_speed_kmh]`, and on a low-probability independent
//! draw adds a positive or negative spike before clamping again. The sampler
//! never owns a global generator: every random value comes from the
//! [`RandomSource`] handed to it, so scripted sources replay exact sequences.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

/// Supplies uniformly distributed values in `[0, 1)`.
pub trait RandomSource {
    /// Returns the next value in `[0, 1)`.
    fn next(&mut self) -> f64;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next(&mut self) -> f64 {
        (**self).next()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next(&mut self) -> f64 {
        (**self).next()
    }
}

/// Reproducible random source backed by a seeded ChaCha8 generator.
#[derive(Clone, Debug)]
pub struct SeededSource {
    rng: ChaCha8Rng,
}

impl SeededSource {
    /// Creates a source whose sequence is fully determined by `seed`.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededSource {
    fn next(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Random source that cycles through a fixed list of values.
///
/// Values are coerced into `[0, 1)`: non-finite or negative entries read as
/// `0.0` and entries at or above one read as the largest value below one. An
/// empty script always yields `0.0`.
#[derive(Clone, Debug)]
pub struct ScriptedSource {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    /// Creates a source that replays `values` in order, wrapping at the end.
    #[must_use]
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// Creates a source that returns `value` forever.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedSource {
    fn next(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }

        let value = self.values[self.cursor % self.values.len()];
        self.cursor = (self.cursor + 1) % self.values.len();

        if !value.is_finite() || value < 0.0 {
            0.0
        } else if value >= 1.0 {
            1.0 - f64::EPSILON
        } else {
            value
        }
    }
}

/// Tuning knobs for the random walk.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SamplerTuning {
    /// Upper clamp applied to every sample.
    pub max_speed_kmh: f64,
    /// Largest magnitude of the per-tick noise step.
    pub max_step_kmh: f64,
    /// Chance per tick that a spike is added on top of the noise step.
    pub spike_probability: f64,
    /// Magnitude of a spike, applied with a random sign.
    pub spike_magnitude_kmh: f64,
}

impl Default for SamplerTuning {
    fn default() -> Self {
        Self {
            max_speed_kmh: 85.0,
            max_step_kmh: 2.0,
            spike_probability: 0.05,
            spike_magnitude_kmh: 15.0,
        }
    }
}

/// Random-walk speed sampler that remembers the last emitted speed.
#[derive(Clone, Debug)]
pub struct SpeedSampler<R> {
    tuning: SamplerTuning,
    source: R,
    last_speed_kmh: f64,
}

impl<R: RandomSource> SpeedSampler<R> {
    /// Creates a sampler starting from `initial_speed_kmh`, clamped into range.
    #[must_use]
    pub fn new(tuning: SamplerTuning, source: R, initial_speed_kmh: f64) -> Self {
        let last_speed_kmh = clamp_speed(initial_speed_kmh, tuning.max_speed_kmh);
        Self {
            tuning,
            source,
            last_speed_kmh,
        }
    }

    /// Tuning the sampler was created with.
    #[must_use]
    pub const fn tuning(&self) -> &SamplerTuning {
        &self.tuning
    }

    /// Most recent speed emitted by [`SpeedSampler::sample`].
    #[must_use]
    pub const fn last_speed_kmh(&self) -> f64 {
        self.last_speed_kmh
    }

    /// Derives the speed following `previous_kmh` without touching the stored speed.
    ///
    /// Consumes two values from the random source, or three when the spike
    /// draw succeeds.
    pub fn next_speed(&mut self, previous_kmh: f64) -> f64 {
        let max = self.tuning.max_speed_kmh;
        let previous = if previous_kmh.is_finite() {
            previous_kmh
        } else {
            0.0
        };

        let step = (self.source.next() * 2.0 - 1.0) * self.tuning.max_step_kmh;
        let mut speed = clamp_speed(previous + step, max);

        if self.source.next() < self.tuning.spike_probability {
            let spike = if self.source.next() < 0.5 {
                -self.tuning.spike_magnitude_kmh
            } else {
                self.tuning.spike_magnitude_kmh
            };
            speed = clamp_speed(speed + spike, max);
        }

        speed
    }

    /// Advances the walk by one tick and records the new speed.
    pub fn sample(&mut self) -> f64 {
        let speed = self.next_speed(self.last_speed_kmh);
        self.last_speed_kmh = speed;
        speed
    }
}

// `f64::clamp` panics on a NaN bound; this form degrades to zero instead.
fn clamp_speed(value: f64, max_kmh: f64) -> f64 {
    let upper = if max_kmh.is_finite() { max_kmh.max(0.0) } else { 0.0 };
    if value.is_nan() {
        return 0.0;
    }
    value.max(0.0).min(upper)
}
