//! Champion tier: beam search over the CPU's own consecutive moves.
//!
//! Each level expands every surviving sequence by its top candidates,
//! scores the resulting positions with `owned + POTENTIAL_WEIGHT * potential`
//! and keeps the best [`BEAM_WIDTH`] sequences. A sequence whose position
//! offers no candidate is carried to the next level unchanged. The first
//! move of the best sequence after [`BEAM_DEPTH`] levels is played.

use crate::constants::{BEAM_DEPTH, BEAM_WIDTH};
use crate::cpu::top_candidates;
use crate::sim::SimulationContext;
use crate::state::Player;

#[derive(Copy, Clone, Debug)]
struct BeamEntry {
    score: f64,
    path: [u8; BEAM_DEPTH],
    len: usize,
}

impl BeamEntry {
    fn root(score: f64, color: u8) -> Self {
        let mut path = [0; BEAM_DEPTH];
        path[0] = color;
        Self {
            score,
            path,
            len: 1,
        }
    }

    fn extended(&self, score: f64, color: u8) -> Self {
        let mut next = *self;
        next.path[next.len] = color;
        next.len += 1;
        next.score = score;
        next
    }

    #[inline]
    fn moves(&self) -> &[u8] {
        &self.path[..self.len]
    }
}

/// Insert keeping descending score order and at most `BEAM_WIDTH` entries.
///
/// A newcomer only goes ahead of entries it strictly beats, so among equal
/// scores the earliest inserted stays first.
fn insert(beam: &mut Vec<BeamEntry>, entry: BeamEntry) {
    let pos = beam
        .iter()
        .position(|e| entry.score > e.score)
        .unwrap_or(beam.len());
    if pos < BEAM_WIDTH {
        beam.insert(pos, entry);
        beam.truncate(BEAM_WIDTH);
    }
}

/// Score of the position after `player` plays `color`.
fn probe(ctx: &mut SimulationContext, player: Player, color: u8) -> f64 {
    ctx.simulate(player, color);
    let score = ctx.evaluate(player);
    ctx.revert();
    score
}

/// Best first move for `player`, or `None` without legal colors.
pub fn beam_search(ctx: &mut SimulationContext, player: Player) -> Option<u8> {
    let roots = top_candidates(ctx, player);
    if roots.is_empty() {
        return None;
    }

    let mut beam = Vec::with_capacity(BEAM_WIDTH + 1);
    for color in roots.colors() {
        let score = probe(ctx, player, color);
        insert(&mut beam, BeamEntry::root(score, color));
    }

    for _ in 1..BEAM_DEPTH {
        let mut next = Vec::with_capacity(BEAM_WIDTH + 1);
        for entry in &beam {
            for &color in entry.moves() {
                ctx.simulate(player, color);
            }

            let candidates = top_candidates(ctx, player);
            if candidates.is_empty() {
                insert(&mut next, *entry);
            }
            for color in candidates.colors() {
                let score = probe(ctx, player, color);
                insert(&mut next, entry.extended(score, color));
            }

            for _ in 0..entry.len {
                ctx.revert();
            }
        }
        beam = next;
    }

    beam.first().map(|e| e.path[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::generate;
    use crate::sim::SimSnapshot;
    use crate::state::{GameSettings, GameState};

    fn entry(score: f64, color: u8) -> BeamEntry {
        BeamEntry::root(score, color)
    }

    #[test]
    fn test_insert_keeps_first_among_equals() {
        let mut beam = Vec::new();
        insert(&mut beam, entry(5.0, 0));
        insert(&mut beam, entry(5.0, 1));
        insert(&mut beam, entry(7.0, 2));
        insert(&mut beam, entry(5.0, 3));
        insert(&mut beam, entry(5.0, 4));
        let colors: Vec<u8> = beam.iter().map(|e| e.path[0]).collect();
        assert_eq!(colors, vec![2, 0, 1, 3]);
    }

    #[test]
    fn test_insert_drops_worse_when_full() {
        let mut beam = Vec::new();
        for (i, s) in [4.0, 3.0, 2.0, 1.0].into_iter().enumerate() {
            insert(&mut beam, entry(s, i as u8));
        }
        insert(&mut beam, entry(0.5, 9));
        assert_eq!(beam.len(), BEAM_WIDTH);
        assert!(beam.iter().all(|e| e.path[0] != 9));
        insert(&mut beam, entry(2.5, 8));
        let colors: Vec<u8> = beam.iter().map(|e| e.path[0]).collect();
        assert_eq!(colors, vec![0, 1, 8, 2]);
    }

    #[test]
    fn test_extended_path() {
        let e = entry(1.0, 3).extended(2.0, 1).extended(4.0, 0);
        assert_eq!(e.moves(), &[3, 1, 0]);
        assert_eq!(e.score, 4.0);
    }

    #[test]
    fn test_search_leaves_context_untouched() {
        let settings = GameSettings::new(16, 12, 6).unwrap();
        let state = generate(&settings, &mut fastrand::Rng::with_seed(21));
        let mut ctx = SimulationContext::new(state.grid());
        ctx.load(&state);

        let choice = beam_search(&mut ctx, Player::One);
        assert_eq!(ctx.snapshot(), SimSnapshot::from(&state));
        assert_eq!(ctx.depth(), 0);
        let legal = state.valid_moves(Player::One);
        assert!(choice.is_some_and(|c| legal[c as usize]));
    }

    #[test]
    fn test_looks_past_immediate_gain() {
        // Color 1 takes three cells now but leads into a pocket walled by
        // player 2. Color 2 takes one cell and opens 3 then a block of 4.
        const P: u8 = 0;
        #[rustfmt::skip]
        let color = vec![
            0, 2, 3, 3, 4, 4,
            1, P, P, P, 4, 4,
            1, 1, P, P, P, P,
        ];
        #[rustfmt::skip]
        let owner = vec![
            1, 0, 0, 0, 0, 0,
            0, 2, 2, 2, 0, 0,
            0, 0, 2, 2, 2, 2,
        ];
        let state = GameState::from_parts(6, 3, 5, owner, color, [0, 0, 0], Player::One);
        let mut ctx = SimulationContext::new(state.grid());
        ctx.load(&state);
        assert_eq!(beam_search(&mut ctx, Player::One), Some(2));

        // The single-ply greedy goes for the pocket.
        let mut cpu = crate::cpu::CpuPlayer::with_seed(0);
        assert_eq!(cpu.pick_move(&state, Player::One, crate::cpu::Difficulty::Master), Some(1));
    }
}
