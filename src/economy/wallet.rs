//! Player wallet
//!
//! Balance and lifetime statistics, plus the [`Economy`] interface the
//! round state machine pays through. The wallet outlives session resets.

use serde::{Deserialize, Serialize};

use super::config::EconomyConfig;
use super::reward::{self, FeedbackLevel};
use crate::error::ConfigResult;
use crate::settings::Difficulty;
use crate::sim::Variation;

/// Collaborator the round state machine calls at round boundaries
pub trait Economy {
    fn can_afford_game(&self) -> bool;
    /// Charge for a new game. Returns false (and changes nothing) when the
    /// balance is below the cost.
    fn deduct_game_cost(&mut self) -> bool;
    fn calculate_reward(&self, round: u32, variation: Variation) -> f64;
    fn add_reward(&mut self, amount: f64);
    fn update_highest_round(&mut self, round: u32);
}

/// Persistable wallet counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyState {
    pub balance: f64,
    pub total_earned: f64,
    pub total_spent: f64,
    pub games_played: u32,
    pub highest_round: u32,
    pub difficulty: Difficulty,
}

impl EconomyState {
    fn fresh(config: &EconomyConfig) -> Self {
        Self {
            balance: config.starting_balance,
            total_earned: 0.0,
            total_spent: 0.0,
            games_played: 0,
            highest_round: 0,
            difficulty: config.default_difficulty,
        }
    }

    /// Return to player: earned / spent, 0 before anything was spent
    pub fn rtp(&self) -> f64 {
        if self.total_spent > 0.0 {
            self.total_earned / self.total_spent
        } else {
            0.0
        }
    }
}

/// Summary for HUD and end-of-run screens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletSummary {
    pub balance: f64,
    pub total_earned: f64,
    pub total_spent: f64,
    pub games_played: u32,
    pub highest_round: u32,
    pub rtp: f64,
    pub difficulty: Difficulty,
}

/// Economy backed by an immutable config
#[derive(Debug, Clone)]
pub struct Wallet {
    config: EconomyConfig,
    state: EconomyState,
}

impl Wallet {
    /// Validate `config` and open a wallet at the starting balance
    pub fn new(config: EconomyConfig) -> ConfigResult<Self> {
        config.validate()?;
        let state = EconomyState::fresh(&config);
        Ok(Self { config, state })
    }

    /// Restore previously saved counters; the balance is clamped to the limits
    pub fn from_state(config: EconomyConfig, mut state: EconomyState) -> ConfigResult<Self> {
        config.validate()?;
        state.balance = state
            .balance
            .clamp(config.limits.min_balance, config.limits.max_balance);
        log::info!(
            "Restored wallet: balance {:.2}, {} games",
            state.balance,
            state.games_played
        );
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub fn state(&self) -> &EconomyState {
        &self.state
    }

    pub fn balance(&self) -> f64 {
        self.state.balance
    }

    pub fn difficulty(&self) -> Difficulty {
        self.state.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        log::info!("Difficulty set to {}", difficulty.as_str());
        self.state.difficulty = difficulty;
    }

    pub fn rtp(&self) -> f64 {
        self.state.rtp()
    }

    pub fn feedback_level(&self, amount: f64) -> FeedbackLevel {
        FeedbackLevel::classify(amount, &self.config.feedback_thresholds)
    }

    pub fn stats_summary(&self) -> WalletSummary {
        let s = &self.state;
        WalletSummary {
            balance: s.balance,
            total_earned: s.total_earned,
            total_spent: s.total_spent,
            games_played: s.games_played,
            highest_round: s.highest_round,
            rtp: s.rtp(),
            difficulty: s.difficulty,
        }
    }

    /// Back to the starting balance with all statistics zeroed
    pub fn reset(&mut self) {
        self.state = EconomyState::fresh(&self.config);
        log::info!("Wallet reset to {:.2}", self.state.balance);
    }
}

impl Economy for Wallet {
    fn can_afford_game(&self) -> bool {
        self.state.balance >= self.config.cost_to_play
    }

    fn deduct_game_cost(&mut self) -> bool {
        if !self.can_afford_game() {
            return false;
        }
        let cost = self.config.cost_to_play;
        self.state.balance = (self.state.balance - cost).max(self.config.limits.min_balance);
        self.state.total_spent += cost;
        self.state.games_played += 1;
        true
    }

    fn calculate_reward(&self, round: u32, variation: Variation) -> f64 {
        reward::calculate_reward(&self.config, round, variation, self.state.difficulty)
    }

    fn add_reward(&mut self, amount: f64) {
        self.state.balance = (self.state.balance + amount).min(self.config.limits.max_balance);
        self.state.total_earned += amount;
    }

    fn update_highest_round(&mut self, round: u32) {
        self.state.highest_round = self.state.highest_round.max(round);
    }
}
