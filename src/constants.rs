//! Constants for palette limits, board generation, and CPU search parameters.
//!
//! Boards are sized at runtime (see [`crate::state::GameSettings`]), so unlike
//! geometry-fixed engines nothing here depends on the board dimensions. What
//! lives here is every tunable number the engine and the CPU tiers share.

// =============================================================================
// Palette
// =============================================================================

/// Largest palette a game may use. Color indices always fit in a `u8`.
pub const MAX_PALETTE: usize = 10;

/// Palette sizes offered in the settings menu. Any size up to
/// [`MAX_PALETTE`] is accepted.
pub const PALETTE_SIZES: [usize; 3] = [5, 7, 10];

/// Largest board accepted. The search stores cell indices as `u32`.
pub const MAX_CELLS: usize = u32::MAX as usize;

// =============================================================================
// Board Generation
// =============================================================================

/// Number of random fills tried before settling for a degraded board.
pub const MAX_INITIAL_ATTEMPTS: u32 = 50;

/// Named board presets: (label, cols, rows).
pub const BOARD_PRESETS: [(&str, usize, usize); 5] = [
    ("25x20", 25, 20),
    ("50x40", 50, 40),
    ("80x70", 80, 70),
    ("100x85", 100, 85),
    ("220x200", 220, 200),
];

// =============================================================================
// Owner Values
// =============================================================================

/// Owner value of a cell nobody holds yet.
pub const UNOWNED: u8 = 0;

// =============================================================================
// CPU Search Parameters
// =============================================================================

/// Candidate colors kept per node after ranking by immediate gain.
pub const CANDIDATE_LIMIT: usize = 5;

/// Partial move sequences kept per level by the Champion beam search.
pub const BEAM_WIDTH: usize = 4;

/// Plies looked ahead by the Champion beam search.
pub const BEAM_DEPTH: usize = 3;

/// Plies searched by the Ultra minimax.
pub const MINIMAX_DEPTH: usize = 4;

/// Weight of expansion potential in every heuristic evaluation.
pub const POTENTIAL_WEIGHT: f64 = 0.5;

/// Frame capacity reserved by the simulation substrate.
/// Deepest user is the beam search: a replayed path plus one probe move.
pub const MAX_SIM_FRAMES: usize = 8;
