//! Game settings
//!
//! Everything a driver needs to build a session: difficulty, pacing and
//! economy tables. Drivers read these from whatever storage they own;
//! the core only ever sees the decoded structs.

use serde::{Deserialize, Serialize};

use crate::economy::{EconomyConfig, Wallet};
use crate::error::ConfigResult;
use crate::sim::GameSession;
use crate::tuning::Tuning;

/// Difficulty levels
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Driver-facing configuration bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Difficulty the wallet starts at
    pub difficulty: Difficulty,
    pub tuning: Tuning,
    pub economy: EconomyConfig,
}

impl Settings {
    /// Decode and validate settings JSON; missing fields take defaults
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.economy.validate()?;
        log::info!(
            "Loaded settings (difficulty {})",
            settings.difficulty.as_str()
        );
        Ok(settings)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Wallet at the starting balance and configured difficulty
    pub fn wallet(&self) -> ConfigResult<Wallet> {
        let mut wallet = Wallet::new(self.economy.clone())?;
        wallet.set_difficulty(self.difficulty);
        Ok(wallet)
    }

    /// Session seeded with `seed`, paying out through a fresh wallet
    pub fn build_session(&self, seed: u64) -> ConfigResult<GameSession<Wallet>> {
        Ok(GameSession::with_economy(
            seed,
            self.tuning.clone(),
            self.wallet()?,
        ))
    }
}
