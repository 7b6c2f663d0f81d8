//! Per-round variation effects
//!
//! [`RoundEffects`] is the only thing the state machine asks about a
//! variation: the expected input order and the display parameters. A
//! combination applies Reverse first, then the secondary variation's
//! generator in combination mode.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::state::Gem;
use super::variation::Variation;
use crate::consts::GEM_COUNT;

/// Whether parameters use the combination-mode column of the tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectMode {
    Single,
    Combination,
}

/// One gem drawn at reduced opacity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GhostEffect {
    /// Pattern position of the faded gem
    pub index: usize,
    /// Render opacity (0-1)
    pub opacity: f32,
}

/// Display-only color remapping (identity entries allowed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorMap {
    mapping: [Gem; GEM_COUNT],
}

impl ColorMap {
    pub fn identity() -> Self {
        Self { mapping: Gem::ALL }
    }

    /// Uniformly shuffled bijection over the gem set
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut mapping = Gem::ALL;
        mapping.shuffle(rng);
        Self { mapping }
    }

    /// Gem color to draw in place of `gem`
    pub fn display(&self, gem: Gem) -> Gem {
        self.mapping[gem.index()]
    }

    pub fn as_array(&self) -> [Gem; GEM_COUNT] {
        self.mapping
    }
}

/// Ghost opacity by round
pub fn ghost_opacity(round: u32, mode: EffectMode) -> f32 {
    if mode == EffectMode::Combination {
        return 0.2;
    }
    match round {
        3 => 0.35,
        4 => 0.3,
        _ => 0.4,
    }
}

/// Inclusive per-gem display range for Speed Chaos (ms)
pub fn chaos_range_ms(round: u32, mode: EffectMode) -> (u32, u32) {
    if mode == EffectMode::Combination {
        return (150, 1200);
    }
    match round {
        9 => (250, 950),
        10 => (200, 1000),
        _ => (300, 900),
    }
}

/// Share of pattern positions that shine under Selective Attention
pub fn shining_fraction(round: u32, mode: EffectMode) -> f64 {
    if mode == EffectMode::Combination {
        return 0.3;
    }
    match round {
        6 => 0.5,
        7 => 0.4,
        _ => 0.6,
    }
}

pub fn ghost<R: Rng + ?Sized>(
    round: u32,
    pattern_len: usize,
    mode: EffectMode,
    rng: &mut R,
) -> Option<GhostEffect> {
    if pattern_len == 0 {
        return None;
    }
    Some(GhostEffect {
        index: rng.random_range(0..pattern_len),
        opacity: ghost_opacity(round, mode),
    })
}

pub fn chaos_timings<R: Rng + ?Sized>(
    round: u32,
    pattern_len: usize,
    mode: EffectMode,
    rng: &mut R,
) -> Vec<u32> {
    let (min, max) = chaos_range_ms(round, mode);
    (0..pattern_len).map(|_| rng.random_range(min..=max)).collect()
}

/// Sorted, unique shining positions; at least one when the pattern is non-empty
pub fn shining_indices<R: Rng + ?Sized>(
    round: u32,
    pattern_len: usize,
    mode: EffectMode,
    rng: &mut R,
) -> Vec<usize> {
    if pattern_len == 0 {
        return Vec::new();
    }
    let wanted = (pattern_len as f64 * shining_fraction(round, mode)).round() as usize;
    let count = wanted.clamp(1, pattern_len);
    let mut indices = rand::seq::index::sample(rng, pattern_len, count).into_vec();
    indices.sort_unstable();
    indices
}

/// Everything a variation changes about one round
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundEffects {
    /// Input is expected back to front
    pub reversed: bool,
    pub ghost: Option<GhostEffect>,
    /// Per-position display durations (ms)
    pub chaos_timings_ms: Option<Vec<u32>>,
    pub color_map: Option<ColorMap>,
    /// Positions that shine during playback (ascending)
    pub shining: Option<Vec<usize>>,
}

impl RoundEffects {
    /// Effects for `variation`, with `base` as the secondary in combination mode
    pub fn compose<R: Rng + ?Sized>(
        variation: Variation,
        base: Option<Variation>,
        round: u32,
        pattern_len: usize,
        rng: &mut R,
    ) -> Self {
        let mut effects = Self::default();
        match variation {
            Variation::ReverseCombination => {
                effects.apply(Variation::Reverse, round, pattern_len, EffectMode::Combination, rng);
                if let Some(base) = base {
                    effects.apply(base, round, pattern_len, EffectMode::Combination, rng);
                }
            }
            other => effects.apply(other, round, pattern_len, EffectMode::Single, rng),
        }
        log::debug!("Round {} effects: {:?}", round, effects);
        effects
    }

    fn apply<R: Rng + ?Sized>(
        &mut self,
        variation: Variation,
        round: u32,
        pattern_len: usize,
        mode: EffectMode,
        rng: &mut R,
    ) {
        match variation {
            Variation::None => {}
            Variation::Reverse => self.reversed = true,
            Variation::Ghost => self.ghost = ghost(round, pattern_len, mode, rng),
            Variation::SpeedChaos => {
                self.chaos_timings_ms = Some(chaos_timings(round, pattern_len, mode, rng))
            }
            Variation::ColorShuffle => self.color_map = Some(ColorMap::shuffled(rng)),
            Variation::SelectiveAttention => {
                self.shining = Some(shining_indices(round, pattern_len, mode, rng))
            }
            // Only reachable nested inside itself; treat as plain reverse
            Variation::ReverseCombination => self.reversed = true,
        }
    }

    /// Gem expected at input position `position`
    pub fn expected_at(&self, pattern: &[Gem], position: usize) -> Option<Gem> {
        if position >= pattern.len() {
            return None;
        }
        let index = if self.reversed {
            pattern.len() - 1 - position
        } else {
            position
        };
        Some(pattern[index])
    }

    /// Full expected input sequence
    pub fn expected_order(&self, pattern: &[Gem]) -> Vec<Gem> {
        let mut order = pattern.to_vec();
        if self.reversed {
            order.reverse();
        }
        order
    }

    /// Per-position display time, falling back to the round's uniform speed
    pub fn display_time_ms(&self, position: usize, uniform_ms: u32) -> u32 {
        self.chaos_timings_ms
            .as_ref()
            .and_then(|t| t.get(position).copied())
            .unwrap_or(uniform_ms)
    }

    /// Whether `position` shines (every position shines without Selective Attention)
    pub fn is_shining(&self, position: usize) -> bool {
        match &self.shining {
            Some(indices) => indices.binary_search(&position).is_ok(),
            None => true,
        }
    }

    /// Opacity to draw `position` at
    pub fn opacity(&self, position: usize) -> f32 {
        match self.ghost {
            Some(ghost) if ghost.index == position => ghost.opacity,
            _ => 1.0,
        }
    }
}
