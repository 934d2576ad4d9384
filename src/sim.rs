//! Scratch simulation substrate for the CPU search.
//!
//! A [`SimulationContext`] mirrors the mutable parts of a [`GameState`] and
//! lets the search play thousands of hypothetical moves without allocating:
//!
//! - Traversals mark visited cells with a pass stamp instead of clearing a
//!   boolean buffer. A cell is visited in the current pass iff its stamp
//!   equals the current counter. When the counter would overflow, the stamp
//!   buffer is zeroed once and counting restarts; this only happens when a
//!   new pass begins.
//! - Every simulated move appends the prior `(owner, color)` of each cell it
//!   touches to a flat log, delimited by a frame that also remembers the
//!   mover's prior color and the prior scores. [`SimulationContext::revert`]
//!   replays the log backwards, restoring the exact previous contents.
//!
//! Frames nest in depth-first order. The context is not reentrant: one
//! decision at a time per context.

use crate::constants::{MAX_PALETTE, MAX_SIM_FRAMES, POTENTIAL_WEIGHT, UNOWNED};
use crate::flood::has_contact;
use crate::grid::Grid;
use crate::state::{GameState, Player, check_color};

/// Prior contents of one mutated cell.
#[derive(Copy, Clone, Debug)]
struct CellDiff {
    index: u32,
    owner: u8,
    color: u8,
}

/// One simulated move on the undo stack.
#[derive(Copy, Clone, Debug)]
struct Frame {
    log_start: usize,
    player: Player,
    prior_color: u8,
    prior_score: [u32; 3],
}

/// Copy of the substrate's board contents, for comparisons in tests and
/// diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimSnapshot {
    pub owner: Vec<u8>,
    pub color: Vec<u8>,
    pub player_color: [u8; 3],
    pub score: [u32; 3],
}

impl From<&GameState> for SimSnapshot {
    fn from(state: &GameState) -> Self {
        Self {
            owner: state.owner.clone(),
            color: state.color.clone(),
            player_color: state.player_color,
            score: state.score,
        }
    }
}

/// Reusable scratch board for speculative moves.
pub struct SimulationContext {
    grid: Grid,
    palette_size: usize,
    owner: Vec<u8>,
    color: Vec<u8>,
    player_color: [u8; 3],
    score: [u32; 3],
    stamps: Vec<u32>,
    stamp: u32,
    /// Traversal work list, reused by every flood.
    stack: Vec<u32>,
    log: Vec<CellDiff>,
    frames: Vec<Frame>,
    /// Moves simulated since creation.
    simulated: u64,
}

impl SimulationContext {
    /// Allocate buffers for `grid`. Contents stay empty until [`load`](Self::load).
    pub fn new(grid: Grid) -> Self {
        let n = grid.len();
        Self {
            grid,
            palette_size: 0,
            owner: vec![UNOWNED; n],
            color: vec![0; n],
            player_color: [0; 3],
            score: [0; 3],
            stamps: vec![0; n],
            stamp: 0,
            stack: Vec::with_capacity(n),
            log: Vec::with_capacity(n),
            frames: Vec::with_capacity(MAX_SIM_FRAMES),
            simulated: 0,
        }
    }

    #[inline]
    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Copy the authoritative arrays in, discarding any pending frames.
    ///
    /// Buffers are reallocated only when the board dimensions change.
    pub fn load(&mut self, state: &GameState) {
        let grid = state.grid();
        if grid != self.grid {
            *self = Self::new(grid);
        }
        self.palette_size = state.palette_size;
        self.owner.copy_from_slice(&state.owner);
        self.color.copy_from_slice(&state.color);
        self.player_color = state.player_color;
        self.score = state.score;
        self.log.clear();
        self.frames.clear();
    }

    #[inline]
    pub fn palette_size(&self) -> usize {
        self.palette_size
    }

    /// Number of simulated moves currently stacked.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Moves simulated since this context was created.
    #[inline]
    pub fn simulated(&self) -> u64 {
        self.simulated
    }

    #[inline]
    pub fn owned(&self, player: Player) -> u32 {
        self.score[player.index()]
    }

    #[inline]
    pub fn player_color(&self, player: Player) -> u8 {
        self.player_color[player.index()]
    }

    /// Every cell is owned.
    #[inline]
    pub fn is_full(&self) -> bool {
        (self.score[1] + self.score[2]) as usize == self.grid.len()
    }

    pub fn has_contact(&self) -> bool {
        has_contact(&self.grid, &self.owner)
    }

    /// Legal colors for `player` in the simulated position.
    ///
    /// `contact` must be the current value of [`has_contact`](Self::has_contact);
    /// callers compute it once per node.
    pub fn legal_colors(&self, player: Player, contact: bool) -> [bool; MAX_PALETTE] {
        let own = self.player_color(player);
        let enemy = self.player_color(player.opponent());
        let mut legal = [false; MAX_PALETTE];
        for (c, slot) in legal.iter_mut().enumerate().take(self.palette_size) {
            *slot = check_color(c as u8, self.palette_size, own, enemy, || contact).is_ok();
        }
        legal
    }

    /// Colors of every cell bordering `player`'s territory that `player`
    /// does not own, opponent cells included.
    pub fn border_colors(&self, player: Player) -> [bool; MAX_PALETTE] {
        let id = player.id();
        let mut seen = [false; MAX_PALETTE];
        for i in 0..self.owner.len() {
            if self.owner[i] != id {
                continue;
            }
            for n in self.grid.neighbors(i) {
                if self.owner[n] != id {
                    if let Some(slot) = seen.get_mut(self.color[n] as usize) {
                        *slot = true;
                    }
                }
            }
        }
        seen
    }

    /// Start a new visiting pass and return its stamp.
    fn next_stamp(&mut self) -> u32 {
        if self.stamp == u32::MAX {
            self.stamps.fill(0);
            self.stamp = 0;
        }
        self.stamp += 1;
        self.stamp
    }

    /// Cells `player` would capture by picking `color`, without mutating.
    pub fn immediate_gain(&mut self, player: Player, color: u8) -> u32 {
        let stamp = self.next_stamp();
        let id = player.id();
        let Self {
            grid,
            owner,
            color: colors,
            stamps,
            stack,
            ..
        } = self;

        stack.clear();
        stack.extend(
            owner
                .iter()
                .enumerate()
                .filter(|(_, o)| **o == id)
                .map(|(i, _)| i as u32),
        );

        let mut gain = 0;
        while let Some(pt) = stack.pop() {
            for n in grid.neighbors(pt as usize) {
                if owner[n] == UNOWNED && colors[n] == color && stamps[n] != stamp {
                    stamps[n] = stamp;
                    gain += 1;
                    stack.push(n as u32);
                }
            }
        }
        gain
    }

    /// Distinct unowned cells bordering `player`'s territory, any color.
    pub fn expansion_potential(&mut self, player: Player) -> u32 {
        let stamp = self.next_stamp();
        let id = player.id();
        let mut potential = 0;
        for i in 0..self.owner.len() {
            if self.owner[i] != id {
                continue;
            }
            for n in self.grid.neighbors(i) {
                if self.owner[n] == UNOWNED && self.stamps[n] != stamp {
                    self.stamps[n] = stamp;
                    potential += 1;
                }
            }
        }
        potential
    }

    /// Owned cells plus weighted expansion potential.
    pub fn evaluate(&mut self, player: Player) -> f64 {
        let potential = self.expansion_potential(player);
        self.owned(player) as f64 + POTENTIAL_WEIGHT * potential as f64
    }

    /// Play `color` for `player` on the scratch board, pushing an undo frame.
    ///
    /// Legality is the caller's responsibility. Returns the number of cells
    /// captured.
    pub fn simulate(&mut self, player: Player, color: u8) -> u32 {
        let id = player.id();
        self.frames.push(Frame {
            log_start: self.log.len(),
            player,
            prior_color: self.player_color[player.index()],
            prior_score: self.score,
        });
        self.simulated += 1;

        let Self {
            grid,
            owner,
            color: colors,
            stack,
            log,
            ..
        } = self;

        // Repaint the territory and seed the capture flood with it.
        stack.clear();
        for i in 0..owner.len() {
            if owner[i] != id {
                continue;
            }
            if colors[i] != color {
                log.push(CellDiff {
                    index: i as u32,
                    owner: id,
                    color: colors[i],
                });
                colors[i] = color;
            }
            stack.push(i as u32);
        }

        let mut captured = 0;
        while let Some(pt) = stack.pop() {
            for n in grid.neighbors(pt as usize) {
                if owner[n] == UNOWNED && colors[n] == color {
                    log.push(CellDiff {
                        index: n as u32,
                        owner: UNOWNED,
                        color,
                    });
                    owner[n] = id;
                    captured += 1;
                    stack.push(n as u32);
                }
            }
        }

        self.player_color[player.index()] = color;
        self.score[player.index()] += captured;
        captured
    }

    /// Undo the most recent [`simulate`](Self::simulate).
    pub fn revert(&mut self) {
        debug_assert!(!self.frames.is_empty(), "revert without a simulated move");
        let Some(frame) = self.frames.pop() else {
            return;
        };
        for diff in self.log[frame.log_start..].iter().rev() {
            let i = diff.index as usize;
            self.owner[i] = diff.owner;
            self.color[i] = diff.color;
        }
        self.log.truncate(frame.log_start);
        self.player_color[frame.player.index()] = frame.prior_color;
        self.score = frame.prior_score;
    }

    pub fn snapshot(&self) -> SimSnapshot {
        SimSnapshot {
            owner: self.owner.clone(),
            color: self.color.clone(),
            player_color: self.player_color,
            score: self.score,
        }
    }

    #[cfg(test)]
    fn set_stamp(&mut self, stamp: u32) {
        self.stamp = stamp;
    }
}
