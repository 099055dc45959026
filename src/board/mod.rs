//! Board representation for Othello

pub mod board;


// Re-exports
pub use board::Board;

/// Playable board size (8x8)
pub const BOARD_SIZE: usize = 8;
/// Mailbox width including the sentinel border ring
pub const MAILBOX_WIDTH: usize = BOARD_SIZE + 2;
pub const TOTAL_CELLS: usize = MAILBOX_WIDTH * MAILBOX_WIDTH; // 100

/// Mailbox offsets for the 8 compass directions
pub const DIRECTIONS: [isize; 8] = [-11, -10, -9, -1, 1, 9, 10, 11];

/// Contents of a single mailbox cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Black,
    White,
    Border,
}

impl Cell {
    /// Single character used when rendering the board
    #[inline]
    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Black => 'b',
            Cell::White => 'w',
            Cell::Border => '?',
        }
    }
}

/// The two contestants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Black,
    White,
}

impl Side {
    /// Get opponent side
    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::Black => Side::White,
            Side::White => Side::Black,
        }
    }

    /// Cell occupied by a piece of this side
    #[inline]
    pub fn to_cell(self) -> Cell {
        match self {
            Side::Black => Cell::Black,
            Side::White => Cell::White,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Black => f.write_str("black"),
            Side::White => f.write_str("white"),
        }
    }
}

/// Position on the playable board, top-left origin.
///
/// Fields are public for pattern matching; both must be below `BOARD_SIZE`.
/// `Board::get` and `Board::set` index the mailbox directly and panic on
/// anything larger, while `Board::is_legal` rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    #[inline]
    pub fn new(row: u8, col: u8) -> Self {
        debug_assert!(row < BOARD_SIZE as u8 && col < BOARD_SIZE as u8);
        Self { row, col }
    }

    /// Mailbox index of this position (11..=88)
    #[inline]
    pub fn to_square(self) -> usize {
        (self.row as usize + 1) * MAILBOX_WIDTH + self.col as usize + 1
    }

    /// Inverse of `to_square`; `None` for border squares
    #[inline]
    pub fn from_square(square: usize) -> Option<Self> {
        let row = square / MAILBOX_WIDTH;
        let col = square % MAILBOX_WIDTH;
        if (1..=BOARD_SIZE).contains(&row) && (1..=BOARD_SIZE).contains(&col) {
            Some(Self {
                row: (row - 1) as u8,
                col: (col - 1) as u8,
            })
        } else {
            None
        }
    }

    /// Row-major index into the 8x8 playable area
    #[inline]
    pub fn to_index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    #[inline]
    pub fn from_index(idx: usize) -> Self {
        Self {
            row: (idx / BOARD_SIZE) as u8,
            col: (idx % BOARD_SIZE) as u8,
        }
    }

    #[inline]
    pub fn is_valid(row: i32, col: i32) -> bool {
        row >= 0 && row < BOARD_SIZE as i32 && col >= 0 && col < BOARD_SIZE as i32
    }

    /// Iterate over every playable position in row-major order
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..BOARD_SIZE * BOARD_SIZE).map(Pos::from_index)
    }
}

impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pos {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_index().cmp(&other.to_index())
    }
}
