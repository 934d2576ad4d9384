//! CPU opponent: difficulty tiers and the shared candidate ranking.
//!
//! Four tiers are available:
//! - [`Difficulty::Standard`]: a random legal color that touches the CPU's
//!   territory, falling back to any legal color;
//! - [`Difficulty::Master`]: single-ply greedy on immediate gain, ties broken
//!   by expansion potential, then by lowest color index;
//! - [`Difficulty::Champion`]: beam search over the CPU's own moves
//!   (see [`crate::beam`]);
//! - [`Difficulty::Ultra`]: minimax with alpha-beta pruning
//!   (see [`crate::minimax`]).
//!
//! Only Standard consumes randomness. Every tier returns `None` when the
//! CPU has no legal color at all; the caller decides how to treat the pass.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::beam::beam_search;
use crate::constants::{CANDIDATE_LIMIT, MAX_PALETTE};
use crate::minimax::alpha_beta_search;
use crate::sim::SimulationContext;
use crate::state::{GameState, Player};

/// CPU strength.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Standard,
    Master,
    Champion,
    Ultra,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Standard,
        Difficulty::Master,
        Difficulty::Champion,
        Difficulty::Ultra,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Standard => "standard",
            Difficulty::Master => "master",
            Difficulty::Champion => "champion",
            Difficulty::Ultra => "ultra",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown difficulty '{0}' (expected standard, master, champion or ultra)")]
pub struct ParseDifficultyError(String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseDifficultyError(s.to_string()))
    }
}

/// Legal colors ranked by immediate gain, best first.
///
/// Equal gains keep ascending color order.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Candidates {
    entries: [(u8, u32); MAX_PALETTE],
    len: usize,
}

impl Candidates {
    #[inline]
    pub(crate) fn as_slice(&self) -> &[(u8, u32)] {
        &self.entries[..self.len]
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Just the colors, in rank order.
    pub(crate) fn colors(&self) -> impl Iterator<Item = u8> + '_ {
        self.as_slice().iter().map(|&(c, _)| c)
    }
}

/// Score every legal color for `player` by immediate gain, keep the top `limit`.
pub(crate) fn rank_candidates(ctx: &mut SimulationContext, player: Player, limit: usize) -> Candidates {
    let contact = ctx.has_contact();
    let legal = ctx.legal_colors(player, contact);
    let mut out = Candidates {
        entries: [(0, 0); MAX_PALETTE],
        len: 0,
    };
    for (c, _) in legal.iter().enumerate().filter(|(_, ok)| **ok) {
        let gain = ctx.immediate_gain(player, c as u8);
        out.entries[out.len] = (c as u8, gain);
        out.len += 1;
    }
    // Stable: equal gains stay in ascending color order.
    out.entries[..out.len].sort_by(|a, b| b.1.cmp(&a.1));
    out.len = out.len.min(limit);
    out
}

/// Top candidates as used by the Champion and Ultra tiers.
#[inline]
pub(crate) fn top_candidates(ctx: &mut SimulationContext, player: Player) -> Candidates {
    rank_candidates(ctx, player, CANDIDATE_LIMIT)
}

/// A CPU opponent with its own simulation substrate and randomness.
///
/// Keep one per game session. The substrate is resized only when a board of
/// different dimensions comes in.
pub struct CpuPlayer {
    ctx: Option<SimulationContext>,
    rng: fastrand::Rng,
}

impl Default for CpuPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuPlayer {
    pub fn new() -> Self {
        Self::with_rng(fastrand::Rng::new())
    }

    /// Deterministic Standard-tier choices for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(fastrand::Rng::with_seed(seed))
    }

    pub fn with_rng(rng: fastrand::Rng) -> Self {
        Self { ctx: None, rng }
    }

    /// Choose a color for `player`, or `None` when no legal color exists.
    pub fn pick_move(&mut self, state: &GameState, player: Player, difficulty: Difficulty) -> Option<u8> {
        let ctx = self
            .ctx
            .get_or_insert_with(|| SimulationContext::new(state.grid()));
        ctx.load(state);
        let before = ctx.simulated();

        let choice = match difficulty {
            Difficulty::Standard => pick_standard(ctx, player, &mut self.rng),
            Difficulty::Master => pick_master(ctx, player),
            Difficulty::Champion => beam_search(ctx, player),
            Difficulty::Ultra => alpha_beta_search(ctx, player),
        };
        debug_assert_eq!(ctx.depth(), 0);

        log::debug!(
            "cpu {} player {} -> {:?} ({} moves simulated)",
            difficulty,
            player,
            choice,
            ctx.simulated() - before
        );
        choice
    }
}

/// Random legal color touching the territory, else any legal color.
fn pick_standard(ctx: &mut SimulationContext, player: Player, rng: &mut fastrand::Rng) -> Option<u8> {
    let legal = ctx.legal_colors(player, ctx.has_contact());
    let border = ctx.border_colors(player);
    let palette = ctx.palette_size();

    let mut pool: Vec<u8> = (0..palette as u8)
        .filter(|&c| legal[c as usize] && border[c as usize])
        .collect();
    if pool.is_empty() {
        pool = (0..palette as u8).filter(|&c| legal[c as usize]).collect();
    }
    if pool.is_empty() {
        return None;
    }
    Some(pool[rng.usize(..pool.len())])
}

/// Greedy on (gain, potential), lowest color index on full ties.
fn pick_master(ctx: &mut SimulationContext, player: Player) -> Option<u8> {
    let ranked = rank_candidates(ctx, player, MAX_PALETTE);
    let mut best: Option<(u8, u32, u32)> = None;

    for &(c, gain) in ranked.as_slice() {
        if let Some((_, best_gain, _)) = best {
            if gain < best_gain {
                // Ranked by gain: nothing further can tie.
                break;
            }
        }
        ctx.simulate(player, c);
        let potential = ctx.expansion_potential(player);
        ctx.revert();

        let better = match best {
            None => true,
            Some((best_c, best_gain, best_potential)) => {
                (gain, potential) > (best_gain, best_potential)
                    || ((gain, potential) == (best_gain, best_potential) && c < best_c)
            }
        };
        if better {
            best = Some((c, gain, potential));
        }
    }
    best.map(|(c, _, _)| c)
}
