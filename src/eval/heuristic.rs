//! Weighted-mobility evaluation
//!
//! Scores a board by the positional weight of every cell a side could play
//! on right now, minus the same sum for the opponent. This is much cheaper
//! than a stability or disc-count analysis and is what the search calls at
//! every leaf.

use crate::board::{Board, Pos, Side};

use super::weights::weight;

/// Sum of positional weights over every legal move of `side`.
#[must_use]
pub fn weighted_mobility(board: &Board, side: Side) -> i32 {
    Pos::all()
        .filter(|&pos| board.is_legal(pos, side))
        .map(weight)
        .sum()
}

/// Evaluate the board from the perspective of `side`.
///
/// Positive values favour `side`. The score is antisymmetric:
/// `evaluate(board, Black) == -evaluate(board, White)` for every board.
#[must_use]
pub fn evaluate(board: &Board, side: Side) -> i32 {
    let mut mine = 0;
    let mut theirs = 0;
    let opponent = side.opponent();

    for pos in Pos::all() {
        if !board.is_empty(pos) {
            continue;
        }
        if board.is_legal(pos, side) {
            mine += weight(pos);
        }
        if board.is_legal(pos, opponent) {
            theirs += weight(pos);
        }
    }

    mine - theirs
}
