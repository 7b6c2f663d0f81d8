//! Economy configuration
//!
//! Supplied once at construction and never mutated. Loading it from disk
//! or storage is the driver's job; this module only defines and checks it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::settings::Difficulty;
use crate::sim::Variation;

/// Tabulated round multipliers (rounds 1-20)
pub const ROUND_MULTIPLIER_COUNT: usize = 20;
/// Largest supported rounding precision (decimal places)
pub const MAX_PRECISION: u32 = 6;

/// Per-difficulty economy settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultySettings {
    pub reward_multiplier: f64,
}

/// Reward amounts at which feedback escalates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedbackThresholds {
    pub medium: f64,
    pub large: f64,
    pub mega: f64,
}

impl Default for FeedbackThresholds {
    fn default() -> Self {
        Self {
            medium: 5.0,
            large: 20.0,
            mega: 50.0,
        }
    }
}

/// Balance and payout limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceLimits {
    pub min_balance: f64,
    pub max_balance: f64,
    /// Cap applied to a single round's reward before rounding
    pub max_single_payout: f64,
}

impl Default for BalanceLimits {
    fn default() -> Self {
        Self {
            min_balance: 0.0,
            max_balance: 100_000.0,
            max_single_payout: 500.0,
        }
    }
}

/// Complete economy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub starting_balance: f64,
    pub cost_to_play: f64,
    pub base_reward: f64,
    /// Decimal places rewards are rounded to
    pub precision: u32,
    /// Multiplier per round, index `round - 1`
    pub round_multipliers: Vec<f64>,
    /// Multiplier growth per round past the table
    pub extrapolation_step: f64,
    pub variation_bonuses: BTreeMap<Variation, f64>,
    pub difficulties: BTreeMap<Difficulty, DifficultySettings>,
    pub default_difficulty: Difficulty,
    pub feedback_thresholds: FeedbackThresholds,
    pub limits: BalanceLimits,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        let variation_bonuses = [
            (Variation::None, 1.00),
            (Variation::Reverse, 1.10),
            (Variation::Ghost, 1.15),
            (Variation::SpeedChaos, 1.20),
            (Variation::ColorShuffle, 1.25),
            (Variation::SelectiveAttention, 1.30),
            (Variation::ReverseCombination, 1.50),
        ]
        .into_iter()
        .collect();

        let difficulties = [
            (Difficulty::Easy, 0.75),
            (Difficulty::Normal, 1.00),
            (Difficulty::Hard, 1.50),
        ]
        .into_iter()
        .map(|(d, m)| (d, DifficultySettings { reward_multiplier: m }))
        .collect();

        Self {
            starting_balance: 100.0,
            cost_to_play: 10.0,
            base_reward: 2.50,
            precision: 2,
            round_multipliers: vec![
                0.10, 0.15, 0.20, 0.30, 0.50, 0.70, 0.90, 1.10, 1.35, 1.60, //
                1.90, 2.20, 2.60, 3.00, 3.50, 4.10, 4.80, 5.70, 6.80, 8.00,
            ],
            extrapolation_step: 1.0,
            variation_bonuses,
            difficulties,
            default_difficulty: Difficulty::Normal,
            feedback_thresholds: FeedbackThresholds::default(),
            limits: BalanceLimits::default(),
        }
    }
}

impl EconomyConfig {
    /// Check the invariants the reward formulas rely on
    pub fn validate(&self) -> ConfigResult<()> {
        if self.round_multipliers.len() != ROUND_MULTIPLIER_COUNT {
            return Err(ConfigError::RoundMultiplierCount(self.round_multipliers.len()));
        }
        if self.round_multipliers.iter().any(|m| *m < 0.0) {
            return Err(ConfigError::Negative("round_multipliers"));
        }
        if let Some(i) = (1..self.round_multipliers.len())
            .find(|&i| self.round_multipliers[i] < self.round_multipliers[i - 1])
        {
            return Err(ConfigError::DecreasingRoundMultiplier(i));
        }

        let amounts = [
            ("starting_balance", self.starting_balance),
            ("cost_to_play", self.cost_to_play),
            ("base_reward", self.base_reward),
            ("extrapolation_step", self.extrapolation_step),
            ("max_single_payout", self.limits.max_single_payout),
        ];
        if let Some((name, _)) = amounts.iter().find(|(_, v)| *v < 0.0) {
            return Err(ConfigError::Negative(*name));
        }
        if self.variation_bonuses.values().any(|b| *b < 0.0) {
            return Err(ConfigError::Negative("variation_bonuses"));
        }
        if self.difficulties.values().any(|d| d.reward_multiplier < 0.0) {
            return Err(ConfigError::Negative("reward_multiplier"));
        }

        let limits = &self.limits;
        if limits.min_balance > limits.max_balance {
            return Err(ConfigError::InvertedLimits {
                min: limits.min_balance,
                max: limits.max_balance,
            });
        }
        if !(limits.min_balance..=limits.max_balance).contains(&self.starting_balance) {
            return Err(ConfigError::StartingBalanceOutOfRange(self.starting_balance));
        }

        let t = &self.feedback_thresholds;
        if !(t.medium <= t.large && t.large <= t.mega) {
            return Err(ConfigError::UnorderedThresholds);
        }
        if self.precision > MAX_PRECISION {
            return Err(ConfigError::Precision(self.precision));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EconomyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.round_multipliers[4], 0.50);
        assert_eq!(config.round_multipliers[19], 8.00);
    }

    #[test]
    fn test_rejects_short_table() {
        let mut config = EconomyConfig::default();
        config.round_multipliers.pop();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RoundMultiplierCount(19))
        ));
    }

    #[test]
    fn test_rejects_decreasing_table() {
        let mut config = EconomyConfig::default();
        config.round_multipliers[7] = 0.2;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DecreasingRoundMultiplier(7))
        ));
    }

    #[test]
    fn test_rejects_bad_limits() {
        let mut config = EconomyConfig::default();
        config.limits.min_balance = 10.0;
        config.limits.max_balance = 5.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedLimits { .. })
        ));

        let mut config = EconomyConfig::default();
        config.starting_balance = 1_000_000.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::StartingBalanceOutOfRange(_))
        ));
    }

    #[test]
    fn test_rejects_negative_cost_and_thresholds() {
        let mut config = EconomyConfig::default();
        config.cost_to_play = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative("cost_to_play"))
        ));

        let mut config = EconomyConfig::default();
        config.feedback_thresholds.large = 100.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnorderedThresholds)
        ));

        let mut config = EconomyConfig::default();
        config.precision = 9;
        assert!(matches!(config.validate(), Err(ConfigError::Precision(9))));
    }

    #[test]
    fn test_json_keys_are_snake_case() {
        let json = serde_json::to_value(EconomyConfig::default()).unwrap();
        assert_eq!(json["variation_bonuses"]["speed_chaos"], 1.20);
        assert_eq!(json["difficulties"]["hard"]["reward_multiplier"], 1.50);

        let partial: EconomyConfig =
            serde_json::from_str(r#"{"cost_to_play": 5.0, "variation_bonuses": {"none": 1.0}}"#)
                .unwrap();
        assert_eq!(partial.cost_to_play, 5.0);
        assert_eq!(partial.variation_bonuses.len(), 1);
        assert_eq!(partial.round_multipliers.len(), ROUND_MULTIPLIER_COUNT);
    }
}
