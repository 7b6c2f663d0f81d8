//! Gem Sequence - rules engine for a round-based memory game
//!
//! Core modules:
//! - `sim`: Deterministic round state machine, variations, pattern effects
//! - `economy`: Reward calculation and balance bookkeeping
//! - `tuning`: Data-driven pacing (pattern length, display speed, timer)
//! - `settings`: Driver-facing configuration bundle
//!
//! Rendering, audio and timing live in the presentation layer; it drives
//! the core through [`sim::GameSession`].

pub mod economy;
pub mod error;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use economy::{Economy, EconomyConfig, EconomyState, FeedbackLevel, Wallet};
pub use error::ConfigError;
pub use settings::{Difficulty, Settings};
pub use sim::{GameSession, Gem, RoundEffects, RoundPhase, Variation};
pub use tuning::Tuning;

/// Game rule constants
pub mod consts {
    /// Number of distinct gem symbols
    pub const GEM_COUNT: usize = 4;
    /// Pattern length of the calibration round and the base of the length formula
    pub const BASE_PATTERN_LENGTH: usize = 4;
    /// Rounds per +1 pattern length step
    pub const ROUNDS_PER_LENGTH_STEP: u32 = 3;

    /// First round that can carry a variation
    pub const FIRST_VARIATION_ROUND: u32 = 2;
    /// Rounds a selected variation stays active
    pub const VARIATION_WINDOW: u32 = 3;
    /// Round at which the terminal combination mode begins
    pub const COMBINATION_START_ROUND: u32 = 17;

    /// Fallback score points per round (no economy attached)
    pub const FALLBACK_POINTS_PER_ROUND: f64 = 100.0;
    /// Fallback score multiplier while any variation is active
    pub const FALLBACK_VARIATION_MULTIPLIER: f64 = 1.15;
    /// Score units per currency unit when an economy is attached
    pub const SCORE_UNITS_PER_CURRENCY: f64 = 100.0;
}
