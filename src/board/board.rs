//! Mailbox board with flip logic

use std::fmt;

use super::{Cell, Pos, Side, BOARD_SIZE, DIRECTIONS, MAILBOX_WIDTH, TOTAL_CELLS};
use crate::error::{EngineError, EngineResult};

/// Othello board stored as a 10x10 mailbox.
///
/// The outer ring holds `Cell::Border` so direction walks stop without
/// explicit bounds checks. Border cells are written once by the
/// constructors and never touched again.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Cell; TOTAL_CELLS],
}

impl Board {
    /// Board with every playable cell empty
    pub fn empty() -> Self {
        let mut cells = [Cell::Border; TOTAL_CELLS];
        for pos in Pos::all() {
            cells[pos.to_square()] = Cell::Empty;
        }
        Self { cells }
    }

    /// Standard starting position: white on the d4/e5 diagonal, black on e4/d5
    pub fn initial() -> Self {
        let mut board = Self::empty();
        board.set(Pos::new(3, 3), Cell::White);
        board.set(Pos::new(3, 4), Cell::Black);
        board.set(Pos::new(4, 3), Cell::Black);
        board.set(Pos::new(4, 4), Cell::White);
        board
    }

    /// Get cell at position. `pos` must be on the board.
    #[inline]
    pub fn get(&self, pos: Pos) -> Cell {
        self.cells[pos.to_square()]
    }

    /// Overwrite a playable cell (no flipping). Use `apply` for game moves.
    /// `pos` must be on the board.
    #[inline]
    pub fn set(&mut self, pos: Pos, cell: Cell) {
        debug_assert!(cell != Cell::Border);
        if cell != Cell::Border {
            self.cells[pos.to_square()] = cell;
        }
    }

    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        self.get(pos) == Cell::Empty
    }

    /// True iff `pos` is empty and brackets at least one opponent run.
    pub fn is_legal(&self, pos: Pos, side: Side) -> bool {
        if !Pos::is_valid(pos.row as i32, pos.col as i32) || !self.is_empty(pos) {
            return false;
        }
        let square = pos.to_square();
        DIRECTIONS
            .iter()
            .any(|&dir| self.bracketing_square(square, dir, side).is_some())
    }

    /// Square of the `side` piece closing a run of opponent pieces that starts
    /// next to `square` in direction `dir`.
    fn bracketing_square(&self, square: usize, dir: isize, side: Side) -> Option<usize> {
        let opponent = side.opponent().to_cell();
        let mut current = step(square, dir);
        if self.cells[current] != opponent {
            return None;
        }
        while self.cells[current] == opponent {
            current = step(current, dir);
        }
        (self.cells[current] == side.to_cell()).then_some(current)
    }

    /// Place a piece for `side` at `pos` and flip every bracketed run.
    ///
    /// Returns the number of flipped pieces. An illegal move leaves the board
    /// untouched and returns 0; callers are expected to check `is_legal`.
    pub fn apply(&mut self, pos: Pos, side: Side) -> u32 {
        if !self.is_legal(pos, side) {
            return 0;
        }
        let square = pos.to_square();
        let own = side.to_cell();
        let mut flipped = 0;

        for &dir in &DIRECTIONS {
            if let Some(end) = self.bracketing_square(square, dir, side) {
                let mut current = step(square, dir);
                while current != end {
                    self.cells[current] = own;
                    flipped += 1;
                    current = step(current, dir);
                }
            }
        }
        self.cells[square] = own;
        flipped
    }

    /// Checked variant of `apply` for moves coming from outside the engine
    pub fn try_apply(&mut self, pos: Pos, side: Side) -> EngineResult<u32> {
        if !self.is_legal(pos, side) {
            return Err(EngineError::InvalidMove { pos, side });
        }
        Ok(self.apply(pos, side))
    }

    /// Number of pieces owned by `side`
    pub fn count_pieces(&self, side: Side) -> u32 {
        let cell = side.to_cell();
        self.cells.iter().filter(|&&c| c == cell).count() as u32
    }

    /// Number of empty playable cells
    pub fn empty_count(&self) -> u32 {
        self.cells.iter().filter(|&&c| c == Cell::Empty).count() as u32
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for col in 0..BOARD_SIZE {
            write!(f, " {col}")?;
        }
        writeln!(
            f,
            " [{}={} {}={}]",
            Cell::Black.symbol(),
            self.count_pieces(Side::Black),
            Cell::White.symbol(),
            self.count_pieces(Side::White)
        )?;
        for row in 0..BOARD_SIZE {
            write!(f, "{row} ")?;
            for col in 0..BOARD_SIZE {
                let cell = self.cells[(row + 1) * MAILBOX_WIDTH + col + 1];
                write!(f, " {}", cell.symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[inline]
fn step(square: usize, dir: isize) -> usize {
    (square as isize + dir) as usize
}
