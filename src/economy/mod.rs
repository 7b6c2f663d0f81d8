//! Reward calculator and wallet
//!
//! Pure reward formulas over an immutable [`EconomyConfig`], and a
//! [`Wallet`] that tracks balance, spend, earnings and RTP. Lookups with
//! missing keys default to a 1.00 multiplier; nothing here fails at runtime.

pub mod config;
pub mod reward;
pub mod wallet;

pub use config::{BalanceLimits, DifficultySettings, EconomyConfig, FeedbackThresholds};
pub use reward::{FeedbackLevel, calculate_reward, round_to_precision};
pub use wallet::{Economy, EconomyState, Wallet, WalletSummary};
