//! Round session state and core value types
//!
//! Everything the presentation layer needs to redraw a round lives here.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::consts::GEM_COUNT;
use crate::tuning::Tuning;

/// A displayable game piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gem {
    Ruby,
    Sapphire,
    Emerald,
    Topaz,
}

impl Gem {
    /// All gems in canonical order
    pub const ALL: [Gem; GEM_COUNT] = [Gem::Ruby, Gem::Sapphire, Gem::Emerald, Gem::Topaz];

    /// Position in [`Gem::ALL`]
    pub fn index(self) -> usize {
        match self {
            Gem::Ruby => 0,
            Gem::Sapphire => 1,
            Gem::Emerald => 2,
            Gem::Topaz => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gem::Ruby => "Ruby",
            Gem::Sapphire => "Sapphire",
            Gem::Emerald => "Emerald",
            Gem::Topaz => "Topaz",
        }
    }

    /// Uniformly random gem
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Gem::ALL[rng.random_range(0..Gem::ALL.len())]
    }
}

/// Generate a pattern of `len` independently random gems (repeats allowed)
pub fn random_pattern<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Vec<Gem> {
    (0..len).map(|_| Gem::random(rng)).collect()
}

/// The calibration pattern: every gem exactly once, shuffled in place
pub fn calibration_pattern<R: Rng + ?Sized>(rng: &mut R) -> Vec<Gem> {
    let mut pattern = Gem::ALL.to_vec();
    pattern.shuffle(rng);
    pattern
}

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Fresh session, nothing started
    Initialization,
    /// Round 1: full gem set shown once so the player learns the layout
    Calibration,
    /// A newly selected variation is being introduced
    VariationIntro,
    /// Pattern is being played back
    PatternDisplay,
    /// Waiting for the player's reproduction
    PlayerInput,
    /// Pattern reproduced; waiting for the driver to continue
    RoundComplete,
    /// Wrong gem submitted; terminal until reset
    RoundFailed,
}

/// Round session data (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSession {
    /// Current phase
    pub phase: RoundPhase,
    /// Round number (1-based), advances only on completion
    pub round: u32,
    /// Target sequence for the current round
    pub pattern: Vec<Gem>,
    /// Gems accepted so far in the current input phase
    pub player_input: Vec<Gem>,
    /// Input timer for the current round (s)
    pub timer_seconds: f64,
    /// Per-gem display time for the current round (ms)
    pub display_speed_ms: u32,
    /// Accumulated score
    pub score: u64,
    /// Currency paid for the most recent round (0 after a failure)
    pub last_reward: f64,
}

impl RoundSession {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            phase: RoundPhase::Initialization,
            round: 1,
            pattern: Vec::new(),
            player_input: Vec::new(),
            timer_seconds: tuning.timer_seconds(1),
            display_speed_ms: tuning.display_speed_ms(1),
            score: 0,
            last_reward: 0.0,
        }
    }

    /// True once the player has entered as many gems as the pattern holds
    pub fn input_complete(&self) -> bool {
        !self.pattern.is_empty() && self.player_input.len() == self.pattern.len()
    }
}
