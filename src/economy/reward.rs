//! Reward formulas
//!
//! `reward = round(min(max_payout, base * round_mult * variation_bonus * difficulty_mult))`
//!
//! Every lookup falls back to 1.00 when its key is missing from the config.

use serde::{Deserialize, Serialize};

use super::config::{EconomyConfig, FeedbackThresholds};
use crate::settings::Difficulty;
use crate::sim::Variation;

/// Multiplier when a lookup key is absent
pub const DEFAULT_MULTIPLIER: f64 = 1.0;

/// Round multiplier: table lookup for tabulated rounds, linear past the end
pub fn round_multiplier(config: &EconomyConfig, round: u32) -> f64 {
    let table = &config.round_multipliers;
    let Some(&anchor) = table.last() else {
        return DEFAULT_MULTIPLIER;
    };
    let round = round.max(1) as usize;
    if round <= table.len() {
        table[round - 1]
    } else {
        anchor + (round - table.len()) as f64 * config.extrapolation_step
    }
}

pub fn variation_bonus(config: &EconomyConfig, variation: Variation) -> f64 {
    config
        .variation_bonuses
        .get(&variation)
        .copied()
        .unwrap_or(DEFAULT_MULTIPLIER)
}

pub fn difficulty_multiplier(config: &EconomyConfig, difficulty: Difficulty) -> f64 {
    config
        .difficulties
        .get(&difficulty)
        .map(|d| d.reward_multiplier)
        .unwrap_or(DEFAULT_MULTIPLIER)
}

/// Significant digits kept before the half-up step
const SNAP_DIGITS: usize = 9;

/// Round half up to `precision` decimal places
///
/// Products like `2.5 * 0.2 * 1.15` land a hair below the decimal half
/// (0.57499999...), so the scaled value is snapped to [`SNAP_DIGITS`]
/// significant digits before rounding.
pub fn round_to_precision(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    let scaled = value * factor;
    let snapped = format!("{:.*e}", SNAP_DIGITS - 1, scaled)
        .parse::<f64>()
        .unwrap_or(scaled);
    snapped.round() / factor
}

/// Reward for completing `round` under `variation` at `difficulty`
pub fn calculate_reward(
    config: &EconomyConfig,
    round: u32,
    variation: Variation,
    difficulty: Difficulty,
) -> f64 {
    let raw = config.base_reward
        * round_multiplier(config, round)
        * variation_bonus(config, variation)
        * difficulty_multiplier(config, difficulty);
    round_to_precision(raw.min(config.limits.max_single_payout), config.precision)
}

/// Qualitative size of a reward, for presentation feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackLevel {
    Small,
    Medium,
    Large,
    Mega,
}

impl FeedbackLevel {
    pub fn classify(amount: f64, thresholds: &FeedbackThresholds) -> Self {
        if amount >= thresholds.mega {
            FeedbackLevel::Mega
        } else if amount >= thresholds.large {
            FeedbackLevel::Large
        } else if amount >= thresholds.medium {
            FeedbackLevel::Medium
        } else {
            FeedbackLevel::Small
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackLevel::Small => "small",
            FeedbackLevel::Medium => "medium",
            FeedbackLevel::Large => "large",
            FeedbackLevel::Mega => "mega",
        }
    }
}
