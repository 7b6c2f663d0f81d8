//! Deterministic game core
//!
//! All gameplay rules live here. This module must stay pure and deterministic:
//! - Seeded RNG only, injected through the session
//! - No timing; the driver decides when each transition happens
//! - No rendering or platform dependencies

pub mod effects;
pub mod round;
pub mod state;
pub mod variation;

pub use effects::{ColorMap, EffectMode, GhostEffect, RoundEffects};
pub use round::GameSession;
pub use state::{Gem, RoundPhase, RoundSession, calibration_pattern, random_pattern};
pub use variation::{
    Selection, Variation, VariationSelector, VariationState, is_selection_round, unlocked_pool,
};
