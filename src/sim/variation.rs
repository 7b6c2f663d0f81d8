//! Variation selection
//!
//! A variation is a rule that changes how a pattern is shown or entered.
//! Pools unlock by round; one pick is held for a three-round window, and
//! from round 17 on the selector only plays Reverse combined with a
//! secondary variation.

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::effects::RoundEffects;
use crate::consts::{COMBINATION_START_ROUND, FIRST_VARIATION_ROUND, VARIATION_WINDOW};

/// Gameplay-modifying rules
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Variation {
    #[default]
    None,
    /// Enter the pattern back to front
    Reverse,
    /// One gem is shown faded
    Ghost,
    /// Each gem is shown for a random duration
    SpeedChaos,
    /// Gems are displayed with swapped colors
    ColorShuffle,
    /// Only some gems shine during playback
    SelectiveAttention,
    /// Reverse plus one secondary variation (terminal mode)
    ReverseCombination,
}

impl Variation {
    /// Variations that can serve as the secondary of a combination
    pub const COMBINATION_BASES: [Variation; 4] = [
        Variation::Ghost,
        Variation::SpeedChaos,
        Variation::ColorShuffle,
        Variation::SelectiveAttention,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Variation::None => "none",
            Variation::Reverse => "reverse",
            Variation::Ghost => "ghost",
            Variation::SpeedChaos => "speed_chaos",
            Variation::ColorShuffle => "color_shuffle",
            Variation::SelectiveAttention => "selective_attention",
            Variation::ReverseCombination => "reverse_combination",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(Variation::None),
            "reverse" => Some(Variation::Reverse),
            "ghost" => Some(Variation::Ghost),
            "speed_chaos" => Some(Variation::SpeedChaos),
            "color_shuffle" => Some(Variation::ColorShuffle),
            "selective_attention" => Some(Variation::SelectiveAttention),
            "reverse_combination" => Some(Variation::ReverseCombination),
            _ => None,
        }
    }

    /// One-line intro text shown the first time a variation appears
    pub fn description(&self) -> &'static str {
        match self {
            Variation::None => "Repeat the pattern.",
            Variation::Reverse => "Repeat the pattern in reverse order.",
            Variation::Ghost => "One gem fades almost out of sight. It still counts.",
            Variation::SpeedChaos => "Every gem flashes for a different length of time.",
            Variation::ColorShuffle => "Colors are scrambled during playback. Trust the positions.",
            Variation::SelectiveAttention => "Only some gems shine. Watch closely.",
            Variation::ReverseCombination => "Reverse order, plus one more twist each window.",
        }
    }

    /// Whether the expected input runs back to front
    pub fn reverses_input(&self) -> bool {
        matches!(self, Variation::Reverse | Variation::ReverseCombination)
    }
}

/// Variations unlocked at a round (cumulative pools)
pub fn unlocked_pool(round: u32) -> &'static [Variation] {
    use Variation::*;
    match round {
        0..=1 => &[],
        2..=4 => &[Reverse],
        5..=7 => &[Reverse, Ghost],
        8..=10 => &[Reverse, Ghost, SpeedChaos],
        11..=13 => &[Reverse, Ghost, SpeedChaos, ColorShuffle],
        14..=16 => &[Reverse, Ghost, SpeedChaos, ColorShuffle, SelectiveAttention],
        _ => &[ReverseCombination],
    }
}

/// Whether a new pick is drawn at this round (2, 5, 8, 11, ...)
pub fn is_selection_round(round: u32) -> bool {
    round >= FIRST_VARIATION_ROUND && (round - FIRST_VARIATION_ROUND) % VARIATION_WINDOW == 0
}

/// Selector memory between rounds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationState {
    /// Active variation
    pub current: Variation,
    /// Variation of the previous window
    pub previous: Variation,
    /// Secondary variation while in combination mode
    pub combination_base: Option<Variation>,
    /// Variations whose intro has already been shown
    pub tutorials_shown: BTreeSet<Variation>,
    /// Round at which `current` was picked (0 = never picked)
    pub start_round: u32,
}

/// Outcome of [`VariationSelector::select`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub variation: Variation,
    /// Drawn this round rather than carried over from the window
    pub newly_selected: bool,
}

/// Owns [`VariationState`] and decides the active rule per round
#[derive(Debug, Clone, Default)]
pub struct VariationSelector {
    state: VariationState,
}

impl VariationSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &VariationState {
        &self.state
    }

    pub fn current(&self) -> Variation {
        self.state.current
    }

    pub fn combination_base(&self) -> Option<Variation> {
        self.state.combination_base
    }

    /// Pick (or keep) the variation for `round`
    pub fn select<R: Rng + ?Sized>(&mut self, round: u32, rng: &mut R) -> Selection {
        if round < FIRST_VARIATION_ROUND {
            return Selection {
                variation: Variation::None,
                newly_selected: false,
            };
        }

        let never_selected = self.state.start_round == 0;
        if !is_selection_round(round) && !never_selected {
            return Selection {
                variation: self.state.current,
                newly_selected: false,
            };
        }

        let (variation, base) = if round >= COMBINATION_START_ROUND {
            let base = pick_excluding(
                &Variation::COMBINATION_BASES,
                self.state.combination_base,
                rng,
            );
            (Variation::ReverseCombination, base)
        } else {
            let pick = pick_excluding(unlocked_pool(round), Some(self.state.current), rng);
            (pick.unwrap_or_default(), None)
        };

        self.state.previous = self.state.current;
        self.state.current = variation;
        self.state.combination_base = base;
        self.state.start_round = round;

        match base {
            Some(base) => log::info!(
                "Round {}: combination mode, reverse + {}",
                round,
                base.name()
            ),
            None => log::info!("Round {}: variation {}", round, variation.name()),
        }

        Selection {
            variation,
            newly_selected: true,
        }
    }

    /// Whether this variation's intro has not been shown yet
    pub fn needs_intro(&self, variation: Variation) -> bool {
        variation != Variation::None && !self.state.tutorials_shown.contains(&variation)
    }

    /// Record that the intro for `variation` was shown
    pub fn mark_intro_shown(&mut self, variation: Variation) {
        self.state.tutorials_shown.insert(variation);
    }

    /// Forget which intros were shown
    pub fn reset_tutorials(&mut self) {
        self.state.tutorials_shown.clear();
    }

    /// Clear the selection memory; the tutorials-shown set survives
    pub fn reset(&mut self) {
        let tutorials = std::mem::take(&mut self.state.tutorials_shown);
        self.state = VariationState {
            tutorials_shown: tutorials,
            ..VariationState::default()
        };
    }

    /// Build the round's effects for the active variation
    pub fn effects<R: Rng + ?Sized>(
        &self,
        round: u32,
        pattern_len: usize,
        rng: &mut R,
    ) -> RoundEffects {
        RoundEffects::compose(
            self.state.current,
            self.state.combination_base,
            round,
            pattern_len,
            rng,
        )
    }
}

/// Uniform pick from `pool`, skipping `exclude` unless that empties the pool
fn pick_excluding<R: Rng + ?Sized>(
    pool: &[Variation],
    exclude: Option<Variation>,
    rng: &mut R,
) -> Option<Variation> {
    let eligible: Vec<Variation> = pool
        .iter()
        .copied()
        .filter(|v| Some(*v) != exclude)
        .collect();
    let candidates = if eligible.is_empty() { pool } else { &eligible[..] };
    candidates.choose(rng).copied()
}
