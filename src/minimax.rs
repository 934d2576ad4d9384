//! Ultra tier: depth-limited minimax with alpha-beta pruning.
//!
//! The CPU maximizes and its opponent minimizes a differential evaluation:
//!
//! ```text
//! (own cells + w * own potential) - (opponent cells + w * opponent potential)
//! ```
//!
//! Turns strictly alternate inside the tree. Each node only considers the
//! top candidates of the side to move, ranked by immediate gain. A node
//! without candidates, or with a full board, is evaluated in place.

use crate::constants::MINIMAX_DEPTH;
use crate::cpu::top_candidates;
use crate::sim::SimulationContext;
use crate::state::Player;

/// Differential evaluation from `cpu`'s point of view.
fn evaluate(ctx: &mut SimulationContext, cpu: Player) -> f64 {
    ctx.evaluate(cpu) - ctx.evaluate(cpu.opponent())
}

fn alpha_beta(
    ctx: &mut SimulationContext,
    cpu: Player,
    to_move: Player,
    depth: usize,
    mut alpha: f64,
    mut beta: f64,
) -> f64 {
    if depth == 0 || ctx.is_full() {
        return evaluate(ctx, cpu);
    }
    let candidates = top_candidates(ctx, to_move);
    if candidates.is_empty() {
        return evaluate(ctx, cpu);
    }

    if to_move == cpu {
        let mut value = f64::NEG_INFINITY;
        for color in candidates.colors() {
            ctx.simulate(to_move, color);
            let score = alpha_beta(ctx, cpu, to_move.opponent(), depth - 1, alpha, beta);
            ctx.revert();
            value = value.max(score);
            alpha = alpha.max(value);
            if alpha >= beta {
                break;
            }
        }
        value
    } else {
        let mut value = f64::INFINITY;
        for color in candidates.colors() {
            ctx.simulate(to_move, color);
            let score = alpha_beta(ctx, cpu, to_move.opponent(), depth - 1, alpha, beta);
            ctx.revert();
            value = value.min(score);
            beta = beta.min(value);
            if beta <= alpha {
                break;
            }
        }
        value
    }
}

/// Best root color for `cpu` at [`MINIMAX_DEPTH`] plies.
///
/// Root ties keep the first candidate in rank order.
pub fn alpha_beta_search(ctx: &mut SimulationContext, cpu: Player) -> Option<u8> {
    search_to_depth(ctx, cpu, MINIMAX_DEPTH)
}

pub(crate) fn search_to_depth(ctx: &mut SimulationContext, cpu: Player, depth: usize) -> Option<u8> {
    let candidates = top_candidates(ctx, cpu);
    let mut best: Option<(u8, f64)> = None;
    let mut alpha = f64::NEG_INFINITY;

    for color in candidates.colors() {
        ctx.simulate(cpu, color);
        let score = alpha_beta(ctx, cpu, cpu.opponent(), depth.saturating_sub(1), alpha, f64::INFINITY);
        ctx.revert();
        if best.is_none_or(|(_, b)| score > b) {
            best = Some((color, score));
        }
        alpha = alpha.max(score);
    }
    best.map(|(c, _)| c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::generate;
    use crate::sim::SimSnapshot;
    use crate::state::{GameSettings, GameState};

    /// Plain minimax without pruning, for cross-checking values.
    fn minimax(ctx: &mut SimulationContext, cpu: Player, to_move: Player, depth: usize) -> f64 {
        if depth == 0 || ctx.is_full() {
            return evaluate(ctx, cpu);
        }
        let candidates = top_candidates(ctx, to_move);
        if candidates.is_empty() {
            return evaluate(ctx, cpu);
        }
        let scores = candidates.colors().map(|c| {
            ctx.simulate(to_move, c);
            let s = minimax(ctx, cpu, to_move.opponent(), depth - 1);
            ctx.revert();
            s
        });
        let scores: Vec<f64> = scores.collect();
        if to_move == cpu {
            scores.into_iter().fold(f64::NEG_INFINITY, f64::max)
        } else {
            scores.into_iter().fold(f64::INFINITY, f64::min)
        }
    }

    fn loaded(state: &GameState) -> SimulationContext {
        let mut ctx = SimulationContext::new(state.grid());
        ctx.load(state);
        ctx
    }

    #[test]
    fn test_pruning_preserves_root_value() {
        let settings = GameSettings::new(12, 10, 6).unwrap();
        for seed in 0..4 {
            let state = generate(&settings, &mut fastrand::Rng::with_seed(seed));
            let mut ctx = loaded(&state);
            let full = minimax(&mut ctx, Player::One, Player::One, 3);
            let pruned = alpha_beta(
                &mut ctx,
                Player::One,
                Player::One,
                3,
                f64::NEG_INFINITY,
                f64::INFINITY,
            );
            assert_eq!(full, pruned, "seed {seed}");
            assert_eq!(ctx.snapshot(), SimSnapshot::from(&state));
        }
    }

    #[test]
    fn test_full_board_is_evaluated_directly() {
        let state = GameState::from_parts(2, 2, 3, vec![1, 1, 1, 2], vec![0, 0, 0, 1], [0, 0, 1], Player::One);
        let mut ctx = loaded(&state);
        let value = alpha_beta(&mut ctx, Player::One, Player::One, 4, f64::NEG_INFINITY, f64::INFINITY);
        assert_eq!(value, 3.0 - 1.0);
        assert_eq!(ctx.simulated(), 0);
    }

    #[test]
    fn test_takes_winning_capture() {
        // Player 1 can close the game by taking the whole unowned block.
        let state = GameState::from_parts(
            3,
            2,
            3,
            vec![1, 0, 0, 0, 0, 2],
            vec![0, 1, 1, 1, 1, 2],
            [0, 0, 2],
            Player::One,
        );
        let mut ctx = loaded(&state);
        assert_eq!(alpha_beta_search(&mut ctx, Player::One), Some(1));
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_shallow_and_deep_agree_on_forced_move() {
        // Only one legal color for player 2.
        let state = GameState::from_parts(2, 2, 3, vec![1, 1, 0, 2], vec![0, 0, 1, 2], [0, 0, 2], Player::Two);
        let mut ctx = loaded(&state);
        assert_eq!(search_to_depth(&mut ctx, Player::Two, 1), Some(1));
        assert_eq!(search_to_depth(&mut ctx, Player::Two, 4), Some(1));
    }
}
