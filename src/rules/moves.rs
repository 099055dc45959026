//! Legal move enumeration

use crate::board::{Board, Pos, Side};

/// All legal moves for `side`, scanned in row-major order.
///
/// The ordering is stable for a given board and side. Root partitioning
/// hands out index ranges into this list, so every worker must see the
/// same sequence. An empty result means `side` has to pass.
#[must_use]
pub fn legal_moves(board: &Board, side: Side) -> Vec<Pos> {
    Pos::all().filter(|&pos| board.is_legal(pos, side)).collect()
}

/// Whether `side` has at least one legal move
#[must_use]
pub fn has_legal_move(board: &Board, side: Side) -> bool {
    Pos::all().any(|pos| board.is_legal(pos, side))
}

/// Play from the starting position, picking each move by selector value.
/// A side without moves passes. Returns the board and the side to move.
#[cfg(test)]
pub(crate) fn playout(choices: &[usize]) -> (Board, Side) {
    let mut board = Board::initial();
    let mut side = Side::Black;
    for &choice in choices {
        let moves = legal_moves(&board, side);
        if !moves.is_empty() {
            board.apply(moves[choice % moves.len()], side);
        }
        side = side.opponent();
    }
    (board, side)
}
