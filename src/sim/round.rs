//! Round state machine
//!
//! Drives a session through calibration, variation intros, pattern
//! playback and input validation. Every call is an immediate transition;
//! the presentation layer owns all timing and decides when to call in.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::effects::RoundEffects;
use super::state::{Gem, RoundPhase, RoundSession, calibration_pattern, random_pattern};
use super::variation::{Variation, VariationSelector, VariationState};
use crate::consts::{
    FALLBACK_POINTS_PER_ROUND, FALLBACK_VARIATION_MULTIPLIER, SCORE_UNITS_PER_CURRENCY,
};
use crate::economy::{Economy, Wallet};
use crate::tuning::{Tuning, pattern_length};

/// A game session: round state, variation memory and an optional economy
#[derive(Debug)]
pub struct GameSession<E: Economy = Wallet> {
    /// Seed the RNG was built from
    seed: u64,
    rng: Pcg32,
    tuning: Tuning,
    session: RoundSession,
    variations: VariationSelector,
    /// Effects of the pattern currently on the board
    effects: RoundEffects,
    /// Variation being introduced while in `VariationIntro`
    intro: Option<Variation>,
    economy: Option<E>,
}

impl<E: Economy> GameSession<E> {
    /// Create a session with no economy attached
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self::with_rng(seed, Pcg32::seed_from_u64(seed), tuning)
    }

    /// Create a session around a caller-supplied RNG
    pub fn with_rng(seed: u64, rng: Pcg32, tuning: Tuning) -> Self {
        log::info!("New session (seed {})", seed);
        Self {
            seed,
            rng,
            session: RoundSession::new(&tuning),
            tuning,
            variations: VariationSelector::new(),
            effects: RoundEffects::default(),
            intro: None,
            economy: None,
        }
    }

    /// Create a session that pays out through `economy`
    pub fn with_economy(seed: u64, tuning: Tuning, economy: E) -> Self {
        let mut game = Self::new(seed, tuning);
        game.economy = Some(economy);
        game
    }

    pub fn attach_economy(&mut self, economy: E) {
        self.economy = Some(economy);
    }

    pub fn detach_economy(&mut self) -> Option<E> {
        self.economy.take()
    }

    pub fn economy(&self) -> Option<&E> {
        self.economy.as_ref()
    }

    pub fn economy_mut(&mut self) -> Option<&mut E> {
        self.economy.as_mut()
    }

    /// Start the next round (new game from `Initialization`, or continue
    /// after `RoundComplete`). Returns false if the transition is illegal
    /// or the economy cannot pay for a new game.
    pub fn start_round(&mut self) -> bool {
        match self.session.phase {
            RoundPhase::Initialization | RoundPhase::RoundComplete => {}
            phase => {
                log::debug!("start_round rejected in {:?}", phase);
                return false;
            }
        }

        if self.session.round == 1 {
            if self.session.phase == RoundPhase::Initialization {
                if let Some(economy) = self.economy.as_mut() {
                    if !economy.deduct_game_cost() {
                        log::warn!("Cannot start game: balance below cost to play");
                        return false;
                    }
                }
            }
            self.effects = RoundEffects::default();
            self.session.pattern = calibration_pattern(&mut self.rng);
            self.session.player_input.clear();
            self.session.phase = RoundPhase::Calibration;
            log::debug!("Calibration pattern: {:?}", self.session.pattern);
            return true;
        }

        let round = self.session.round;
        let selection = self.variations.select(round, &mut self.rng);
        self.session.player_input.clear();

        if selection.newly_selected && self.variations.needs_intro(selection.variation) {
            self.variations.mark_intro_shown(selection.variation);
            self.intro = Some(selection.variation);
            self.session.pattern.clear();
            self.effects = RoundEffects::default();
            self.session.phase = RoundPhase::VariationIntro;
            log::info!("Round {}: introducing {}", round, selection.variation.name());
            return true;
        }

        self.generate_pattern();
        self.session.phase = RoundPhase::PatternDisplay;
        true
    }

    /// Begin pattern playback (from `Calibration` or `VariationIntro`, or
    /// replay while already displaying)
    pub fn start_pattern_display(&mut self) -> bool {
        match self.session.phase {
            RoundPhase::VariationIntro => {
                self.intro = None;
                self.generate_pattern();
            }
            RoundPhase::Calibration | RoundPhase::PatternDisplay => {}
            _ => return false,
        }
        self.session.player_input.clear();
        self.session.phase = RoundPhase::PatternDisplay;
        true
    }

    /// Open the input phase and arm the round's timer
    pub fn start_player_input(&mut self) -> bool {
        if self.session.phase != RoundPhase::PatternDisplay {
            return false;
        }
        self.session.player_input.clear();
        self.session.timer_seconds = self.tuning.timer_seconds(self.session.round);
        self.session.phase = RoundPhase::PlayerInput;
        true
    }

    /// Validate one gem. A wrong gem fails the round without being recorded.
    pub fn submit_input(&mut self, gem: Gem) -> bool {
        if self.session.phase != RoundPhase::PlayerInput {
            return false;
        }

        let position = self.session.player_input.len();
        let Some(expected) = self.effects.expected_at(&self.session.pattern, position) else {
            return false;
        };

        if gem != expected {
            self.fail_round();
            return false;
        }

        self.session.player_input.push(gem);
        if self.session.input_complete() {
            self.complete_round();
        }
        true
    }

    /// Return to a fresh session. The economy is left untouched.
    pub fn reset(&mut self) {
        self.session = RoundSession::new(&self.tuning);
        self.variations.reset();
        self.effects = RoundEffects::default();
        self.intro = None;
        log::info!("Session reset");
    }

    fn generate_pattern(&mut self) {
        let round = self.session.round;
        let len = pattern_length(round);
        self.session.pattern = random_pattern(&mut self.rng, len);
        self.effects = self.variations.effects(round, len, &mut self.rng);
        log::debug!("Round {} pattern: {:?}", round, self.session.pattern);
    }

    fn complete_round(&mut self) {
        let round = self.session.round;
        let variation = self.variations.current();
        self.session.phase = RoundPhase::RoundComplete;

        match self.economy.as_mut() {
            Some(economy) => {
                let reward = economy.calculate_reward(round, variation);
                economy.add_reward(reward);
                economy.update_highest_round(round);
                self.session.last_reward = reward;
                self.session.score += (reward * SCORE_UNITS_PER_CURRENCY).round() as u64;
            }
            None => {
                let multiplier = if variation == Variation::None {
                    1.0
                } else {
                    FALLBACK_VARIATION_MULTIPLIER
                };
                let points = FALLBACK_POINTS_PER_ROUND * round as f64 * multiplier;
                self.session.score += points.round() as u64;
                self.session.last_reward = 0.0;
            }
        }

        log::info!(
            "Round {} complete ({}), reward {:.2}, score {}",
            round,
            variation.name(),
            self.session.last_reward,
            self.session.score
        );

        self.session.round += 1;
        self.session.display_speed_ms = self.tuning.display_speed_ms(self.session.round);
    }

    fn fail_round(&mut self) {
        let round = self.session.round;
        self.session.phase = RoundPhase::RoundFailed;
        self.session.last_reward = 0.0;
        if let Some(economy) = self.economy.as_mut() {
            economy.update_highest_round(round);
        }
        log::info!("Round {} failed at position {}", round, self.session.player_input.len());
    }

    /// Reward the current round would pay if completed now
    ///
    /// Uses the active variation, so call it after `start_round`. Between
    /// rounds (in `RoundComplete`) the next window's variation has not been
    /// picked yet and the preview still reflects the previous one.
    pub fn next_reward_preview(&self) -> Option<f64> {
        self.economy
            .as_ref()
            .map(|e| e.calculate_reward(self.session.round, self.variations.current()))
    }

    pub fn phase(&self) -> RoundPhase {
        self.session.phase
    }

    pub fn round(&self) -> u32 {
        self.session.round
    }

    pub fn pattern(&self) -> &[Gem] {
        &self.session.pattern
    }

    pub fn player_input(&self) -> &[Gem] {
        &self.session.player_input
    }

    pub fn current_variation(&self) -> Variation {
        self.variations.current()
    }

    pub fn timer_seconds(&self) -> f64 {
        self.session.timer_seconds
    }

    pub fn display_speed_ms(&self) -> u32 {
        self.session.display_speed_ms
    }

    pub fn score(&self) -> u64 {
        self.session.score
    }

    pub fn last_reward(&self) -> f64 {
        self.session.last_reward
    }

    pub fn effects(&self) -> &RoundEffects {
        &self.effects
    }

    /// Sequence the player must enter this round
    pub fn expected_input(&self) -> Vec<Gem> {
        self.effects.expected_order(&self.session.pattern)
    }

    /// Variation whose intro is on screen, if any
    pub fn intro_variation(&self) -> Option<Variation> {
        self.intro
    }

    pub fn variations(&self) -> &VariationState {
        self.variations.state()
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Copy of the round session for saving or inspection
    pub fn snapshot(&self) -> RoundSession {
        self.session.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::EconomyConfig;
    use proptest::prelude::*;

    fn session(seed: u64) -> GameSession {
        GameSession::new(seed, Tuning::default())
    }

    fn funded_session(seed: u64) -> GameSession {
        let wallet = Wallet::new(EconomyConfig::default()).unwrap();
        GameSession::with_economy(seed, Tuning::default(), wallet)
    }

    /// Play the current round through display and input, entering it correctly
    fn play_round<E: Economy>(game: &mut GameSession<E>) {
        if game.phase() == RoundPhase::VariationIntro || game.phase() == RoundPhase::Calibration {
            assert!(game.start_pattern_display());
        }
        assert!(game.start_player_input());
        for gem in game.expected_input() {
            assert!(game.submit_input(gem));
        }
        assert_eq!(game.phase(), RoundPhase::RoundComplete);
    }

    fn wrong_gem(expected: Gem) -> Gem {
        Gem::ALL[(expected.index() + 1) % Gem::ALL.len()]
    }

    #[test]
    fn test_calibration_round() {
        let mut game = session(12345);
        assert_eq!(game.phase(), RoundPhase::Initialization);
        assert!(game.start_round());
        assert_eq!(game.phase(), RoundPhase::Calibration);

        let mut pattern = game.pattern().to_vec();
        pattern.sort();
        assert_eq!(pattern, Gem::ALL.to_vec());
        assert_eq!(game.display_speed_ms(), 1000);
        assert_eq!(game.current_variation(), Variation::None);
    }

    #[test]
    fn test_illegal_transitions_do_nothing() {
        let mut game = session(1);
        assert!(!game.submit_input(Gem::Ruby));
        assert!(!game.start_player_input());
        assert!(!game.start_pattern_display());
        assert_eq!(game.phase(), RoundPhase::Initialization);

        assert!(game.start_round());
        assert!(!game.start_round());
        assert!(!game.start_player_input());
        assert!(!game.submit_input(Gem::Ruby));
        assert_eq!(game.phase(), RoundPhase::Calibration);
        assert!(game.player_input().is_empty());
    }

    #[test]
    fn test_calibration_timer_and_completion() {
        let mut game = session(99);
        game.start_round();
        game.start_pattern_display();
        assert!(game.start_player_input());
        assert_eq!(game.timer_seconds(), 10.0);

        let expected = game.expected_input();
        assert_eq!(expected, game.pattern().to_vec());
        for (i, gem) in expected.iter().enumerate() {
            assert!(game.submit_input(*gem));
            assert_eq!(game.player_input().len(), i + 1);
        }
        assert_eq!(game.phase(), RoundPhase::RoundComplete);
        assert_eq!(game.round(), 2);
        // Fallback scoring: 100 * 1 * 1.0
        assert_eq!(game.score(), 100);
        assert_eq!(game.display_speed_ms(), 700);
    }

    #[test]
    fn test_wrong_gem_fails_round() {
        let mut game = session(7);
        game.start_round();
        game.start_pattern_display();
        game.start_player_input();

        let expected = game.expected_input();
        assert!(game.submit_input(expected[0]));
        assert!(!game.submit_input(wrong_gem(expected[1])));
        assert_eq!(game.phase(), RoundPhase::RoundFailed);
        assert_eq!(game.player_input(), &expected[..1]);
        assert_eq!(game.round(), 1);

        // Terminal until reset
        assert!(!game.submit_input(expected[1]));
        assert!(!game.start_round());
        game.reset();
        assert_eq!(game.phase(), RoundPhase::Initialization);
        assert_eq!(game.round(), 1);
        assert_eq!(game.score(), 0);
        assert!(game.pattern().is_empty());
        assert!(game.start_round());
    }

    #[test]
    fn test_round_two_introduces_reverse() {
        let mut game = session(2024);
        game.start_round();
        play_round(&mut game);

        assert!(game.start_round());
        assert_eq!(game.phase(), RoundPhase::VariationIntro);
        assert_eq!(game.intro_variation(), Some(Variation::Reverse));
        assert_eq!(game.current_variation(), Variation::Reverse);
        assert!(game.pattern().is_empty());

        assert!(game.start_pattern_display());
        assert_eq!(game.intro_variation(), None);
        assert_eq!(game.pattern().len(), 4);
        assert!(game.effects().reversed);

        let mut reversed = game.pattern().to_vec();
        reversed.reverse();
        assert_eq!(game.expected_input(), reversed);

        game.start_player_input();
        assert!((game.timer_seconds() - 7.5).abs() < 1e-9);
        for gem in reversed {
            assert!(game.submit_input(gem));
        }
        assert_eq!(game.phase(), RoundPhase::RoundComplete);
        assert_eq!(game.round(), 3);
        // 100 + round(100 * 2 * 1.15)
        assert_eq!(game.score(), 330);

        // Round 3 keeps Reverse without a second intro
        assert!(game.start_round());
        assert_eq!(game.phase(), RoundPhase::PatternDisplay);
        assert_eq!(game.current_variation(), Variation::Reverse);
    }

    #[test]
    fn test_original_order_fails_under_reverse() {
        for seed in 0..50 {
            let mut game = session(seed);
            game.start_round();
            play_round(&mut game);
            game.start_round();
            game.start_pattern_display();
            game.start_player_input();

            let pattern = game.pattern().to_vec();
            let mut reversed = pattern.clone();
            reversed.reverse();
            if pattern == reversed {
                continue;
            }
            let accepted = pattern.iter().all(|gem| game.submit_input(*gem));
            assert!(!accepted);
            assert_eq!(game.phase(), RoundPhase::RoundFailed);
        }
    }

    #[test]
    fn test_variation_held_for_window() {
        let mut game = session(555);
        game.start_round();
        play_round(&mut game);

        let mut windows: Vec<(u32, Variation)> = Vec::new();
        while game.round() <= 16 {
            assert!(game.start_round());
            windows.push((game.round(), game.current_variation()));
            play_round(&mut game);
        }

        for chunk in windows.chunks(3) {
            assert!(chunk.iter().all(|(_, v)| *v == chunk[0].1));
        }
        for pair in windows.chunks(3).collect::<Vec<_>>().windows(2) {
            assert_ne!(pair[0][0].1, pair[1][0].1);
        }
    }

    #[test]
    fn test_combination_mode_from_round_17() {
        let mut game = session(31337);
        game.start_round();
        while game.round() < 20 {
            play_round(&mut game);
            assert!(game.start_round());
        }
        assert_eq!(game.current_variation(), Variation::ReverseCombination);
        assert!(game.variations().combination_base.is_some());
        if game.phase() == RoundPhase::VariationIntro {
            game.start_pattern_display();
        }
        assert!(game.effects().reversed);
        assert_eq!(game.pattern().len(), pattern_length(20));
    }

    #[test]
    fn test_intro_shown_once_across_reset() {
        let mut game = session(8);
        game.start_round();
        play_round(&mut game);
        game.start_round();
        assert_eq!(game.phase(), RoundPhase::VariationIntro);

        game.reset();
        game.start_round();
        play_round(&mut game);
        assert!(game.start_round());
        assert_eq!(game.phase(), RoundPhase::PatternDisplay);
        assert_eq!(game.current_variation(), Variation::Reverse);
    }

    #[test]
    fn test_economy_gate_and_reward() {
        let mut game = funded_session(11);
        assert!(game.start_round());
        let wallet = game.economy().unwrap();
        assert_eq!(wallet.state().balance, 90.0);
        assert_eq!(wallet.state().games_played, 1);

        let preview = game.next_reward_preview().unwrap();
        play_round(&mut game);
        // 2.50 * 0.10 * 1.00 * 1.00
        assert_eq!(game.last_reward(), 0.25);
        assert_eq!(preview, 0.25);
        assert_eq!(game.score(), 25);
        let wallet = game.economy().unwrap();
        assert_eq!(wallet.state().balance, 90.25);
        assert_eq!(wallet.state().highest_round, 1);

        // Continuing does not charge again
        assert!(game.start_round());
        assert_eq!(game.economy().unwrap().state().balance, 90.25);
    }

    #[test]
    fn test_preview_follows_new_window_after_start_round() {
        let mut game = funded_session(12);
        game.start_round();
        play_round(&mut game);

        // Round 2 before selection still carries round 1's variation
        // 2.50 * 0.15 * 1.00 = 0.375
        assert_eq!(game.current_variation(), Variation::None);
        assert_eq!(game.next_reward_preview(), Some(0.38));

        // 2.50 * 0.15 * 1.10 = 0.4125
        assert!(game.start_round());
        assert_eq!(game.current_variation(), Variation::Reverse);
        let preview = game.next_reward_preview().unwrap();
        assert_eq!(preview, 0.41);
        play_round(&mut game);
        assert_eq!(game.last_reward(), preview);
    }

    #[test]
    fn test_insufficient_balance_stays_in_initialization() {
        let config = EconomyConfig {
            starting_balance: 5.0,
            ..EconomyConfig::default()
        };
        let mut game: GameSession =
            GameSession::with_economy(3, Tuning::default(), Wallet::new(config).unwrap());
        assert!(!game.start_round());
        assert_eq!(game.phase(), RoundPhase::Initialization);
        assert!(game.pattern().is_empty());
        let wallet = game.economy().unwrap();
        assert_eq!(wallet.state().balance, 5.0);
        assert_eq!(wallet.state().games_played, 0);
    }

    #[test]
    fn test_failure_clears_reward_and_records_round() {
        let mut game = funded_session(21);
        game.start_round();
        play_round(&mut game);
        game.start_round();
        game.start_pattern_display();
        game.start_player_input();
        let expected = game.expected_input();
        assert!(!game.submit_input(wrong_gem(expected[0])));
        assert_eq!(game.last_reward(), 0.0);
        assert_eq!(game.economy().unwrap().state().highest_round, 2);

        // Reset leaves the economy alone
        let balance = game.economy().unwrap().state().balance;
        game.reset();
        assert_eq!(game.economy().unwrap().state().balance, balance);
    }

    #[test]
    fn test_detach_economy_falls_back_to_points() {
        let mut game = funded_session(4);
        assert!(game.detach_economy().is_some());
        assert!(game.next_reward_preview().is_none());
        game.start_round();
        play_round(&mut game);
        assert_eq!(game.score(), 100);
        assert_eq!(game.last_reward(), 0.0);
    }

    #[test]
    fn test_same_seed_same_session() {
        let mut a = session(77);
        let mut b = session(77);
        a.start_round();
        b.start_round();
        for _ in 0..6 {
            assert_eq!(a.pattern(), b.pattern());
            play_round(&mut a);
            play_round(&mut b);
            a.start_round();
            b.start_round();
            assert_eq!(a.current_variation(), b.current_variation());
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_replay_display_clears_input() {
        let mut game = session(6);
        game.start_round();
        game.start_pattern_display();
        assert!(game.start_pattern_display());
        assert_eq!(game.phase(), RoundPhase::PatternDisplay);
    }

    proptest! {
        #[test]
        fn prop_correct_input_grows_by_one(seed in any::<u64>()) {
            let mut game = session(seed);
            game.start_round();
            game.start_pattern_display();
            game.start_player_input();
            let expected = game.expected_input();
            for (i, gem) in expected.iter().enumerate().take(expected.len() - 1) {
                prop_assert!(game.submit_input(*gem));
                prop_assert_eq!(game.player_input().len(), i + 1);
                prop_assert_eq!(game.phase(), RoundPhase::PlayerInput);
            }
        }

        #[test]
        fn prop_completion_advances_one_round(seed in any::<u64>(), rounds in 1u32..12) {
            let mut game = session(seed);
            game.start_round();
            for played in 1..=rounds {
                play_round(&mut game);
                prop_assert_eq!(game.round(), played + 1);
                prop_assert_eq!(game.pattern().len(), pattern_length(played));
                game.start_round();
            }
        }

        #[test]
        fn prop_wrong_gem_never_recorded(seed in any::<u64>(), position in 0usize..4) {
            let mut game = session(seed);
            game.start_round();
            game.start_pattern_display();
            game.start_player_input();
            let expected = game.expected_input();
            for gem in &expected[..position] {
                game.submit_input(*gem);
            }
            prop_assert!(!game.submit_input(wrong_gem(expected[position])));
            prop_assert_eq!(game.player_input().len(), position);
            prop_assert_eq!(game.phase(), RoundPhase::RoundFailed);
        }
    }
}
