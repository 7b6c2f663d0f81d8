//! Data-driven round pacing
//!
//! Pattern length, display speed and input timer as pure functions of the
//! round number. Round 1 is the calibration round and has fixed values.

use serde::{Deserialize, Serialize};

use crate::consts::{BASE_PATTERN_LENGTH, ROUNDS_PER_LENGTH_STEP};

/// Pacing constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Per-gem display time for round 0 of the speed curve (ms)
    pub initial_display_speed_ms: u32,
    /// Display time removed per round (ms)
    pub speed_decrease_per_round_ms: u32,
    /// Display time floor (ms)
    pub min_display_speed_ms: u32,
    /// Calibration round display time (ms)
    pub calibration_display_speed_ms: u32,

    /// Input timer for round 0 of the timer curve (s)
    pub initial_timer_seconds: f64,
    /// Timer removed per round (s)
    pub timer_decrease_per_round: f64,
    /// Timer floor (s)
    pub min_timer_seconds: f64,
    /// Calibration round input timer (s)
    pub calibration_timer_seconds: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            initial_display_speed_ms: 750,
            speed_decrease_per_round_ms: 25,
            min_display_speed_ms: 300,
            calibration_display_speed_ms: 1000,

            initial_timer_seconds: 8.0,
            timer_decrease_per_round: 0.25,
            min_timer_seconds: 3.0,
            calibration_timer_seconds: 10.0,
        }
    }
}

impl Tuning {
    /// Per-gem display time for a round (ms)
    pub fn display_speed_ms(&self, round: u32) -> u32 {
        if round <= 1 {
            return self.calibration_display_speed_ms;
        }
        let decrease = round.saturating_mul(self.speed_decrease_per_round_ms);
        self.initial_display_speed_ms
            .saturating_sub(decrease)
            .max(self.min_display_speed_ms)
    }

    /// Input timer for a round (s)
    pub fn timer_seconds(&self, round: u32) -> f64 {
        if round <= 1 {
            return self.calibration_timer_seconds;
        }
        let timer = self.initial_timer_seconds - round as f64 * self.timer_decrease_per_round;
        timer.max(self.min_timer_seconds)
    }
}

/// Number of gems in a round's pattern
#[inline]
pub fn pattern_length(round: u32) -> usize {
    if round <= 1 {
        return BASE_PATTERN_LENGTH;
    }
    BASE_PATTERN_LENGTH + ((round - 1) / ROUNDS_PER_LENGTH_STEP) as usize
}
