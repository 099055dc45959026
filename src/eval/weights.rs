//! Positional weight table
//!
//! Corners and edges are worth the most; the X and C squares next to each
//! corner are worth nothing because playing there tends to give the corner
//! away.

use crate::board::{Pos, BOARD_SIZE};

/// Weight per playable cell, row-major over the 8x8 area
pub const WEIGHTS: [[i32; BOARD_SIZE]; BOARD_SIZE] = [
    [20, 0, 10, 10, 10, 10, 0, 20],
    [0, 0, 5, 5, 5, 5, 0, 0],
    [10, 5, 3, 1, 1, 3, 5, 10],
    [10, 5, 1, 7, 7, 1, 5, 10],
    [10, 5, 1, 7, 7, 1, 5, 10],
    [10, 5, 3, 1, 1, 3, 5, 10],
    [0, 0, 5, 5, 5, 5, 0, 0],
    [20, 0, 10, 10, 10, 10, 0, 20],
];

/// Weight of a single position
#[inline]
pub fn weight(pos: Pos) -> i32 {
    WEIGHTS[pos.row as usize][pos.col as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_symmetric() {
        for r in 0..BOARD_SIZE {
            for c in 0..BOARD_SIZE {
                let w = WEIGHTS[r][c];
                assert_eq!(w, WEIGHTS[c][r], "transpose at ({r}, {c})");
                assert_eq!(w, WEIGHTS[BOARD_SIZE - 1 - r][c], "vertical mirror at ({r}, {c})");
                assert_eq!(w, WEIGHTS[r][BOARD_SIZE - 1 - c], "horizontal mirror at ({r}, {c})");
            }
        }
    }

    #[test]
    fn test_corners_outweigh_neighbours() {
        assert_eq!(weight(Pos::new(0, 0)), 20);
        assert_eq!(weight(Pos::new(7, 7)), 20);
        assert_eq!(weight(Pos::new(1, 1)), 0);
        assert_eq!(weight(Pos::new(0, 1)), 0);
        assert!(WEIGHTS.iter().flatten().all(|&w| w >= 0));
    }
}
