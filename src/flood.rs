//! Territory flood fill over the authoritative board arrays.
//!
//! Two flavors exist:
//! - seed fill, used at board generation: a pure color flood from an anchor
//!   that claims every reached cell for the anchor's player;
//! - capture expansion, used by moves: grows a player's territory into
//!   unowned cells of the chosen color, never into the opponent.
//!
//! All traversals use an explicit stack. The predicates are static during a
//! traversal, so the visiting order has no effect on the result.

use crate::constants::UNOWNED;
use crate::grid::Grid;

/// Mark every cell connected to `start` through cells of `start`'s color.
pub fn color_region(grid: &Grid, color: &[u8], start: usize) -> Vec<bool> {
    let target = color[start];
    let mut region = vec![false; grid.len()];
    let mut stack = vec![start];
    region[start] = true;

    while let Some(pt) = stack.pop() {
        for n in grid.neighbors(pt) {
            if !region[n] && color[n] == target {
                region[n] = true;
                stack.push(n);
            }
        }
    }
    region
}

/// Claim the color region around `start` for `player`, whatever its owner.
///
/// Returns the number of cells claimed.
pub fn seed_fill(grid: &Grid, color: &[u8], owner: &mut [u8], start: usize, player: u8) -> u32 {
    let region = color_region(grid, color, start);
    let mut claimed = 0;
    for (cell, _) in owner.iter_mut().zip(&region).filter(|(_, inside)| **inside) {
        *cell = player;
        claimed += 1;
    }
    claimed
}

/// Repaint every cell owned by `player` to `color_index`.
pub fn recolor_territory(owner: &[u8], color: &mut [u8], player: u8, color_index: u8) {
    for (c, _) in color.iter_mut().zip(owner).filter(|(_, o)| **o == player) {
        *c = color_index;
    }
}

/// Capture every unowned `color_index` cell reachable from `player`'s territory.
///
/// Newly captured cells keep expanding the frontier. Returns the number of
/// cells captured.
pub fn expand_territory(grid: &Grid, owner: &mut [u8], color: &[u8], player: u8, color_index: u8) -> u32 {
    let mut stack: Vec<usize> = owner
        .iter()
        .enumerate()
        .filter(|(_, o)| **o == player)
        .map(|(i, _)| i)
        .collect();
    let mut captured = 0;

    while let Some(pt) = stack.pop() {
        for n in grid.neighbors(pt) {
            if owner[n] == UNOWNED && color[n] == color_index {
                owner[n] = player;
                captured += 1;
                stack.push(n);
            }
        }
    }
    captured
}

/// Count owned cells per player id (slots 1 and 2).
pub fn calculate_score(owner: &[u8]) -> [u32; 3] {
    let mut score = [0u32; 3];
    for &o in owner {
        if o == 1 || o == 2 {
            score[o as usize] += 1;
        }
    }
    score
}

/// Whether any player-1 cell has an orthogonal neighbor owned by player 2.
pub fn has_contact(grid: &Grid, owner: &[u8]) -> bool {
    owner
        .iter()
        .enumerate()
        .filter(|(_, o)| **o == 1)
        .any(|(i, _)| grid.neighbors(i).any(|n| owner[n] == 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_region_stops_at_other_colors() {
        let grid = Grid::new(3, 3);
        #[rustfmt::skip]
        let color = [
            0, 0, 1,
            1, 0, 1,
            0, 1, 1,
        ];
        let region = color_region(&grid, &color, 0);
        let cells: Vec<usize> = (0..9).filter(|&i| region[i]).collect();
        assert_eq!(cells, vec![0, 1, 4]);

        let region = color_region(&grid, &color, 8);
        let cells: Vec<usize> = (0..9).filter(|&i| region[i]).collect();
        assert_eq!(cells, vec![2, 5, 7, 8]);
    }

    #[test]
    fn test_seed_fill_claims_region() {
        let grid = Grid::new(4, 1);
        let color = [2, 2, 3, 2];
        let mut owner = [0u8; 4];
        assert_eq!(seed_fill(&grid, &color, &mut owner, 0, 1), 2);
        assert_eq!(owner, [1, 1, 0, 0]);
    }

    #[test]
    fn test_expand_through_captured_cells() {
        // A snake of color 1 winding away from the owned corner.
        let grid = Grid::new(3, 3);
        #[rustfmt::skip]
        let color = [
            1, 1, 1,
            0, 0, 1,
            1, 1, 1,
        ];
        let mut owner = [1, 0, 0, 0, 0, 0, 0, 0, 0];
        let captured = expand_territory(&grid, &mut owner, &color, 1, 1);
        assert_eq!(captured, 6);
        assert_eq!(owner, [1, 1, 1, 0, 0, 1, 1, 1, 1]);
    }

    #[test]
    fn test_expand_skips_opponent_cells() {
        let grid = Grid::new(4, 1);
        let color = [1, 1, 1, 1];
        let mut owner = [1, 0, 2, 0];
        let captured = expand_territory(&grid, &mut owner, &color, 1, 1);
        assert_eq!(captured, 1);
        assert_eq!(owner, [1, 1, 2, 0]);
    }

    #[test]
    fn test_recolor_only_touches_own_cells() {
        let owner = [1, 0, 2, 1];
        let mut color = [0, 0, 0, 0];
        recolor_territory(&owner, &mut color, 1, 4);
        assert_eq!(color, [4, 0, 0, 4]);
    }

    #[test]
    fn test_score_and_contact() {
        let grid = Grid::new(3, 2);
        let owner = [1, 1, 0, 0, 2, 2];
        assert_eq!(calculate_score(&owner), [0, 2, 2]);
        assert!(has_contact(&grid, &owner));

        let apart = [1, 0, 0, 0, 0, 2];
        assert!(!has_contact(&grid, &apart));
    }
}
