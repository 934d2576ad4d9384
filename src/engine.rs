//! Engine facade: the function surface used by front-ends and room layers.
//!
//! These are thin wrappers over [`GameState`] methods, the board generator
//! and a per-thread [`CpuPlayer`]. Callers that need deterministic CPU
//! behavior or their own substrate per session should hold a `CpuPlayer`
//! directly.

use std::cell::RefCell;

use crate::cpu::{CpuPlayer, Difficulty};
use crate::generate::generate;
use crate::state::{GameResult, GameSettings, GameState, Player};

thread_local! {
    static CPU: RefCell<CpuPlayer> = RefCell::new(CpuPlayer::new());
}

/// Random starting position. May be degraded on pathological settings;
/// see [`crate::generate::generate_with_report`] to find out.
pub fn generate_initial_state(settings: &GameSettings) -> GameState {
    generate(settings, &mut fastrand::Rng::new())
}

pub fn get_valid_moves(state: &GameState, player: Player) -> Vec<bool> {
    state.valid_moves(player)
}

/// Apply a move; illegal input returns an unchanged copy of `state`.
pub fn apply_move(state: &GameState, player: Player, color: u8) -> GameState {
    state.apply_move(player, color)
}

pub fn is_game_over(state: &GameState) -> bool {
    state.is_game_over()
}

pub fn get_winner(state: &GameState) -> GameResult {
    state.winner()
}

/// CPU choice for `player`, or `None` when it has no legal color.
pub fn pick_cpu_move(state: &GameState, player: Player, difficulty: Difficulty) -> Option<u8> {
    CPU.with(|cpu| cpu.borrow_mut().pick_move(state, player, difficulty))
}
