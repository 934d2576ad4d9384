//! Filler-Rust: a two-player flood-fill territory game with a CPU opponent.
//!
//! Players start in opposite corners of a grid of colored cells. On each turn
//! a player picks a color: their territory takes that color and absorbs every
//! unowned cell of it that touches the territory. The game ends once every
//! cell is owned; the larger territory wins.
//!
//! ## Modules
//!
//! - [`constants`] - Palette limits, board presets and search parameters
//! - [`grid`] - Row-major indexing and 4-neighbor adjacency
//! - [`state`] - Game state, settings, legality and move execution
//! - [`flood`] - Flood fill, territory expansion and scoring
//! - [`generate`] - Random initial boards
//! - [`sim`] - Reusable simulation substrate with make/undo
//! - [`cpu`] - Difficulty tiers and the CPU player
//! - [`beam`] - Beam search (Champion tier)
//! - [`minimax`] - Alpha-beta search (Ultra tier)
//! - [`engine`] - Function facade for front-ends
//! - [`room`] - In-memory multiplayer rooms
//! - [`protocol`] - Line-based text protocol over rooms
//!
//! ## Example
//!
//! ```
//! use filler_rust::cpu::{CpuPlayer, Difficulty};
//! use filler_rust::generate::generate;
//! use filler_rust::state::{GameSettings, Player};
//!
//! let settings = GameSettings::new(25, 20, 7).unwrap();
//! let state = generate(&settings, &mut fastrand::Rng::with_seed(7));
//!
//! // Let the CPU choose player 1's opening color
//! let mut cpu = CpuPlayer::with_seed(7);
//! let color = cpu.pick_move(&state, Player::One, Difficulty::Champion).unwrap();
//! let next = state.apply_move(Player::One, color);
//! assert_eq!(next.current_player, Player::Two);
//! ```

pub mod beam;
pub mod constants;
pub mod cpu;
pub mod engine;
pub mod flood;
pub mod generate;
pub mod grid;
pub mod minimax;
pub mod protocol;
pub mod room;
pub mod sim;
pub mod state;
