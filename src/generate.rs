//! Initial board generation.
//!
//! A board is valid when the two anchors start with different colors and
//! their same-color regions do not meet. Random fills are retried up to
//! [`MAX_INITIAL_ATTEMPTS`] times; after that the last fill is used anyway
//! and the result is flagged as degraded.

use crate::constants::MAX_INITIAL_ATTEMPTS;
use crate::flood::{calculate_score, color_region, seed_fill};
use crate::grid::Grid;
use crate::state::{GameSettings, GameState, Player};

/// How a board came to be.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GenerationReport {
    /// Random fills drawn, including the accepted one.
    pub attempts: u32,
    /// The anchors' starting regions touch or share a color.
    pub degraded: bool,
}

/// Generate a starting position, reporting whether it had to degrade.
pub fn generate_with_report(settings: &GameSettings, rng: &mut fastrand::Rng) -> (GameState, GenerationReport) {
    let grid = settings.grid();
    let mut color = vec![0u8; grid.len()];
    let mut attempts = 0;
    let mut valid = false;

    while attempts < MAX_INITIAL_ATTEMPTS && !valid {
        fill_random_colors(&mut color, settings.palette_size, rng);
        attempts += 1;
        valid = anchors_are_separate(&grid, &color);
    }

    if !valid {
        log::warn!(
            "no valid {}x{} board with {} colors after {} attempts; using a degraded board",
            settings.cols,
            settings.rows,
            settings.palette_size,
            attempts
        );
    }

    let first = grid.first_anchor();
    let last = grid.last_anchor();
    let mut owner = vec![0u8; grid.len()];
    let mut player_color = [0u8; 3];
    player_color[Player::One.index()] = color[first];
    player_color[Player::Two.index()] = color[last];

    seed_fill(&grid, &color, &mut owner, first, Player::One.id());
    seed_fill(&grid, &color, &mut owner, last, Player::Two.id());
    let score = calculate_score(&owner);

    let state = GameState {
        cols: settings.cols,
        rows: settings.rows,
        palette_size: settings.palette_size,
        owner,
        color,
        player_color,
        current_player: Player::One,
        score,
    };
    let report = GenerationReport {
        attempts,
        degraded: !valid,
    };
    (state, report)
}

/// Generate a starting position from the given randomness source.
pub fn generate(settings: &GameSettings, rng: &mut fastrand::Rng) -> GameState {
    generate_with_report(settings, rng).0
}

fn fill_random_colors(color: &mut [u8], palette_size: usize, rng: &mut fastrand::Rng) {
    for c in color.iter_mut() {
        *c = rng.u8(..palette_size as u8);
    }
}

/// The anchors differ in color and their color regions are disjoint.
fn anchors_are_separate(grid: &Grid, color: &[u8]) -> bool {
    let first = grid.first_anchor();
    let last = grid.last_anchor();
    if color[first] == color[last] {
        return false;
    }
    let a = color_region(grid, color, first);
    let b = color_region(grid, color, last);
    !a.iter().zip(&b).any(|(x, y)| *x && *y)
}
