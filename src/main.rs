//! Gem Sequence headless driver
//!
//! Plays sessions with a simple bot so the rules engine can be exercised
//! from the command line:
//!
//! ```text
//! gem-sequence [seed] [games] [settings.json]
//! ```
//!
//! Set `RUST_LOG=info` (or `debug`) to follow each transition.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345u64);
    let games = args.next().and_then(|s| s.parse().ok()).unwrap_or(3u32);
    let settings = match args.next() {
        Some(path) => match load_settings(&path) {
            Ok(settings) => settings,
            Err(err) => {
                eprintln!("Could not load {}: {}", path, err);
                std::process::exit(1);
            }
        },
        None => gem_sequence::Settings::default(),
    };

    let mut game = match settings.build_session(seed) {
        Ok(game) => game,
        Err(err) => {
            eprintln!("Invalid settings: {}", err);
            std::process::exit(1);
        }
    };
    log::info!("Gem Sequence (native) starting with seed {}", seed);

    let mut bot = bot::Bot::new(seed);
    for game_index in 1..=games {
        match bot.play(&mut game) {
            Some(reached) => println!(
                "Game {}: failed at round {}, score {}",
                game_index,
                reached,
                game.score()
            ),
            None => {
                println!("Game {}: cannot afford to play", game_index);
                break;
            }
        }
        game.reset();
    }

    if let Some(wallet) = game.economy() {
        match serde_json::to_string_pretty(&wallet.stats_summary()) {
            Ok(json) => println!("{}", json),
            Err(err) => log::warn!("Could not encode summary: {}", err),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web build drives GameSession from JavaScript
}

#[cfg(not(target_arch = "wasm32"))]
fn load_settings(path: &str) -> Result<gem_sequence::Settings, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(gem_sequence::Settings::from_json(&json)?)
}

#[cfg(not(target_arch = "wasm32"))]
mod bot {
    use gem_sequence::sim::{GameSession, Gem, RoundPhase};
    use gem_sequence::{Economy, Wallet};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    /// Chance of a slip per gem, grows with pattern length
    const SLIP_PER_GEM: f64 = 0.004;

    /// Imperfect player: recalls the expected order but slips now and then
    pub struct Bot {
        rng: Pcg32,
    }

    impl Bot {
        pub fn new(seed: u64) -> Self {
            // Separate stream from the session so the bot never perturbs it
            Self {
                rng: Pcg32::new(seed, 0xb0b),
            }
        }

        /// Play one game to failure. Returns the round reached, or None if
        /// the game could not be started.
        pub fn play(&mut self, game: &mut GameSession<Wallet>) -> Option<u32> {
            if !game.start_round() {
                return None;
            }
            loop {
                if let Some(variation) = game.intro_variation() {
                    log::info!("Intro: {}", variation.description());
                }
                game.start_pattern_display();
                game.start_player_input();

                let slip = SLIP_PER_GEM * game.pattern().len() as f64 * game.round() as f64;
                for gem in game.expected_input() {
                    let gem = if self.rng.random_bool(slip.min(1.0)) {
                        other_gem(gem)
                    } else {
                        gem
                    };
                    if !game.submit_input(gem) {
                        break;
                    }
                }

                match game.phase() {
                    RoundPhase::RoundComplete => {
                        if let Some(wallet) = game.economy() {
                            let reward = game.last_reward();
                            log::info!(
                                "Reward {:.2} ({}), balance {:.2}, affordable: {}",
                                reward,
                                wallet.feedback_level(reward).as_str(),
                                wallet.balance(),
                                wallet.can_afford_game()
                            );
                        }
                        game.start_round();
                    }
                    _ => return Some(game.round()),
                }
            }
        }
    }

    fn other_gem(gem: Gem) -> Gem {
        Gem::ALL[(gem.index() + 1) % Gem::ALL.len()]
    }
}
