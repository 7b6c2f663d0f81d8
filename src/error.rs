//! Configuration errors
//!
//! Gameplay never errors; rejected transitions are plain `false` returns.
//! Only a malformed configuration is refused, once, at construction.

use thiserror::Error;

/// Reasons an economy configuration or settings file is rejected
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("expected 20 round multipliers, found {0}")]
    RoundMultiplierCount(usize),

    #[error("round multiplier at index {0} is lower than its predecessor")]
    DecreasingRoundMultiplier(usize),

    #[error("negative value for {0}")]
    Negative(&'static str),

    #[error("balance limits are inverted: min {min} > max {max}")]
    InvertedLimits { min: f64, max: f64 },

    #[error("starting balance {0} is outside the balance limits")]
    StartingBalanceOutOfRange(f64),

    #[error("feedback thresholds must ascend: medium <= large <= mega")]
    UnorderedThresholds,

    #[error("precision {0} exceeds the supported maximum of 6")]
    Precision(u32),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
