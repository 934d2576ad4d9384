//! Game state representation, move legality, and move execution.
//!
//! A [`GameState`] is the authoritative snapshot of a game. It is never
//! mutated in place by the engine: every accepted move produces a new state,
//! and every rejected move leaves the caller with the state it already had.
//!
//! Ownership is stored per cell as `0` (unowned), `1` or `2`. Each owned cell
//! always shows its owner's current color, and `score[p]` always equals the
//! number of cells owned by `p`.

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::constants::{BOARD_PRESETS, MAX_CELLS, MAX_PALETTE, UNOWNED};
use crate::flood::{calculate_score, expand_territory, has_contact, recolor_territory};
use crate::grid::Grid;

/// One of the two players.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    /// Starts at the top-left anchor and moves first.
    One,
    /// Starts at the bottom-right anchor.
    Two,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::One, Player::Two];

    /// Owner value used for this player's cells.
    #[inline]
    pub fn id(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    /// Slot of this player in `player_color` and `score`.
    #[inline]
    pub fn index(self) -> usize {
        self.id() as usize
    }

    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Look up a player by owner value.
    pub fn from_id(id: u8) -> Option<Player> {
        match id {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl Serialize for Player {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.id())
    }
}

/// Reasons a [`GameSettings`] cannot be built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("board dimensions must be positive (got {cols}x{rows})")]
    ZeroDimension { cols: usize, rows: usize },

    /// Both anchors would sit on the same cell.
    #[error("board needs at least two cells (got {cols}x{rows})")]
    TooSmall { cols: usize, rows: usize },

    #[error("board of {cols}x{rows} cells is too large")]
    TooLarge { cols: usize, rows: usize },

    #[error("palette size must be between 1 and {max} (got {0})", max = MAX_PALETTE)]
    PaletteSize(usize),

    #[error("unknown board preset: {0}")]
    UnknownPreset(String),
}

/// Validated board dimensions and palette size.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub cols: usize,
    pub rows: usize,
    pub palette_size: usize,
}

impl GameSettings {
    pub fn new(cols: usize, rows: usize, palette_size: usize) -> Result<Self, SettingsError> {
        if cols == 0 || rows == 0 {
            return Err(SettingsError::ZeroDimension { cols, rows });
        }
        match cols.checked_mul(rows) {
            Some(cells) if cells > MAX_CELLS => return Err(SettingsError::TooLarge { cols, rows }),
            None => return Err(SettingsError::TooLarge { cols, rows }),
            Some(cells) if cells < 2 => return Err(SettingsError::TooSmall { cols, rows }),
            Some(_) => {}
        }
        if palette_size == 0 || palette_size > MAX_PALETTE {
            return Err(SettingsError::PaletteSize(palette_size));
        }
        Ok(Self {
            cols,
            rows,
            palette_size,
        })
    }

    /// Settings for one of the named [`BOARD_PRESETS`], e.g. `"50x40"`.
    pub fn preset(label: &str, palette_size: usize) -> Result<Self, SettingsError> {
        let &(_, cols, rows) = BOARD_PRESETS
            .iter()
            .find(|(name, _, _)| name.eq_ignore_ascii_case(label))
            .ok_or_else(|| SettingsError::UnknownPreset(label.to_string()))?;
        Self::new(cols, rows, palette_size)
    }

    #[inline]
    pub fn grid(&self) -> Grid {
        Grid::new(self.cols, self.rows)
    }
}

/// Why a move was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("not player {got}'s turn (player {expected} to move)")]
    NotYourTurn { expected: Player, got: Player },

    #[error("color {color} is outside the palette of {palette_size}")]
    ColorOutOfRange { color: u8, palette_size: usize },

    #[error("color {0} is already the player's own color")]
    OwnColor(u8),

    #[error("color {0} belongs to the touching opponent")]
    OpponentColorInContact(u8),
}

/// Final (or current) standing of a game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    /// `None` is a draw. Serialized as `0`, `1` or `2`.
    #[serde(serialize_with = "serialize_winner")]
    pub winner: Option<Player>,
    pub score1: u32,
    pub score2: u32,
}

fn serialize_winner<S: Serializer>(winner: &Option<Player>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(winner.map_or(0, Player::id))
}

/// The authoritative snapshot of a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub cols: usize,
    pub rows: usize,
    pub palette_size: usize,
    /// Per-cell owner: 0 = unowned, 1 or 2 = player id.
    pub owner: Vec<u8>,
    /// Per-cell color index in `[0, palette_size)`.
    pub color: Vec<u8>,
    /// Current color of each player; slots 1 and 2 are meaningful.
    pub player_color: [u8; 3],
    pub current_player: Player,
    /// Owned cell count per player; slots 1 and 2 are meaningful.
    pub score: [u32; 3],
}

impl GameState {
    /// Assemble a state from raw arrays, deriving `score` from `owner`.
    ///
    /// No legality checks are made; this is meant for collaborators that
    /// restore a saved board and for tests that set up exact positions.
    pub fn from_parts(
        cols: usize,
        rows: usize,
        palette_size: usize,
        owner: Vec<u8>,
        color: Vec<u8>,
        player_color: [u8; 3],
        current_player: Player,
    ) -> Self {
        debug_assert_eq!(owner.len(), cols * rows);
        debug_assert_eq!(color.len(), cols * rows);
        let score = calculate_score(&owner);
        Self {
            cols,
            rows,
            palette_size,
            owner,
            color,
            player_color,
            current_player,
            score,
        }
    }

    #[inline]
    pub fn grid(&self) -> Grid {
        Grid::new(self.cols, self.rows)
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }

    #[inline]
    pub fn color_of(&self, player: Player) -> u8 {
        self.player_color[player.index()]
    }

    #[inline]
    pub fn score_of(&self, player: Player) -> u32 {
        self.score[player.index()]
    }

    /// Whether the two territories share an orthogonal edge.
    pub fn has_contact(&self) -> bool {
        has_contact(&self.grid(), &self.owner)
    }

    /// Check a single color choice for `player`, ignoring whose turn it is.
    pub fn check_color(&self, player: Player, color: u8) -> Result<(), MoveError> {
        check_color(
            color,
            self.palette_size,
            self.color_of(player),
            self.color_of(player.opponent()),
            || self.has_contact(),
        )
    }

    /// Legal colors for `player`, indexed by color.
    ///
    /// A color is illegal when it is the player's own color, or when it is
    /// the opponent's color and the territories touch.
    pub fn valid_moves(&self, player: Player) -> Vec<bool> {
        let mut moves = vec![true; self.palette_size];
        let own = self.color_of(player) as usize;
        if own < moves.len() {
            moves[own] = false;
        }
        let enemy = self.color_of(player.opponent()) as usize;
        if enemy < moves.len() && self.has_contact() {
            moves[enemy] = false;
        }
        moves
    }

    /// Apply a move, reporting why it was rejected.
    ///
    /// The mover's territory is repainted to `color`, then every unowned cell
    /// of that color reachable from the territory is captured. Opponent cells
    /// are never taken.
    pub fn try_apply_move(&self, player: Player, color: u8) -> Result<GameState, MoveError> {
        if player != self.current_player {
            return Err(MoveError::NotYourTurn {
                expected: self.current_player,
                got: player,
            });
        }
        self.check_color(player, color)?;

        let grid = self.grid();
        let mut next = self.clone();
        recolor_territory(&next.owner, &mut next.color, player.id(), color);
        next.player_color[player.index()] = color;
        expand_territory(&grid, &mut next.owner, &next.color, player.id(), color);
        next.score = calculate_score(&next.owner);
        next.current_player = player.opponent();
        Ok(next)
    }

    /// Apply a move, returning an unchanged copy when it is rejected.
    pub fn apply_move(&self, player: Player, color: u8) -> GameState {
        self.try_apply_move(player, color)
            .unwrap_or_else(|_| self.clone())
    }

    /// True once every cell is owned.
    #[inline]
    pub fn is_game_over(&self) -> bool {
        (self.score[1] + self.score[2]) as usize == self.cell_count()
    }

    /// Compare scores; a tie has no winner.
    pub fn winner(&self) -> GameResult {
        let score1 = self.score[1];
        let score2 = self.score[2];
        let winner = match score1.cmp(&score2) {
            std::cmp::Ordering::Greater => Some(Player::One),
            std::cmp::Ordering::Less => Some(Player::Two),
            std::cmp::Ordering::Equal => None,
        };
        GameResult {
            winner,
            score1,
            score2,
        }
    }
}

/// Shared legality rule, used by both the real engine and the simulation
/// substrate. `contact` is only evaluated when the opponent color matters.
pub(crate) fn check_color(
    color: u8,
    palette_size: usize,
    own: u8,
    enemy: u8,
    contact: impl FnOnce() -> bool,
) -> Result<(), MoveError> {
    if color as usize >= palette_size {
        return Err(MoveError::ColorOutOfRange {
            color,
            palette_size,
        });
    }
    if color == own {
        return Err(MoveError::OwnColor(color));
    }
    if color == enemy && contact() {
        return Err(MoveError::OpponentColorInContact(color));
    }
    Ok(())
}

impl fmt::Display for GameState {
    /// Player 1 cells print as `#`, player 2 cells as `@`, unowned cells as
    /// their color digit.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "P1 (#) color {} : {} cells | P2 (@) color {} : {} cells | to move: {}",
            self.player_color[1], self.score[1], self.player_color[2], self.score[2], self.current_player
        )?;
        for row in 0..self.rows {
            for col in 0..self.cols {
                let i = row * self.cols + col;
                let ch = match self.owner[i] {
                    1 => '#',
                    2 => '@',
                    UNOWNED => char::from_digit(self.color[i] as u32, 36).unwrap_or('?'),
                    _ => '?',
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
