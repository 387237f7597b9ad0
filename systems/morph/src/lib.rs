#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame-rate independent smoothing of the morph progress.
//!
//! Progress chases the target of the requested [`Formation`] with an
//! exponential decay, so equal wall-clock time yields equal progress
//! regardless of how it is split into frames.

use std::time::Duration;

use evergreen_core::{Formation, MotionTuning};

/// Scalar progress between the dispersed (0) and assembled (1) formations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MorphState {
    progress: f32,
    rate: f32,
}

impl MorphState {
    /// Creates a state resting in the dispersed formation.
    ///
    /// A non-finite or negative rate freezes the progress.
    #[must_use]
    pub fn new(rate: f32) -> Self {
        let rate = if rate.is_finite() { rate.max(0.0) } else { 0.0 };
        Self {
            progress: 0.0,
            rate,
        }
    }

    /// Creates a state using the smoothing rate from the tuning table.
    #[must_use]
    pub fn from_tuning(tuning: &MotionTuning) -> Self {
        Self::new(tuning.smoothing_rate)
    }

    /// Current progress in `[0, 1]`.
    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Exponential smoothing rate `k`.
    #[must_use]
    pub const fn rate(&self) -> f32 {
        self.rate
    }

    /// Moves the progress toward `target` by the fraction `1 - e^(-k dt)`.
    ///
    /// The target is clamped to `[0, 1]` and so is the result.
    pub fn advance(&mut self, dt: Duration, target: f32) {
        self.advance_seconds(dt.as_secs_f32(), target);
    }

    /// Same as [`MorphState::advance`] for a raw delta in seconds.
    ///
    /// Non-finite or negative deltas leave the progress untouched.
    pub fn advance_seconds(&mut self, dt: f32, target: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let target = if target.is_finite() {
            target.clamp(0.0, 1.0)
        } else {
            self.progress
        };

        let blend = 1.0 - (-self.rate * dt).exp();
        self.progress = (self.progress + (target - self.progress) * blend).clamp(0.0, 1.0);
    }

    /// Moves the progress toward the target of `formation`.
    pub fn advance_toward(&mut self, dt: Duration, formation: Formation) {
        self.advance(dt, formation.target_progress());
    }
}

impl Default for MorphState {
    fn default() -> Self {
        Self::from_tuning(&MotionTuning::default())
    }
}
