//! Parallel Othello move engine
//!
//! An Othello player for tournament referees, built around a fixed pool of
//! worker threads that split the root moves of every turn between them:
//! - Standard 8x8 board, mailbox representation with a sentinel border
//! - Weighted-mobility evaluation
//! - Depth-bounded alpha-beta per root move
//! - Best-effort sharing of root bounds between workers
//!
//! # Architecture
//!
//! The engine is organized into several modules:
//! - [`board`]: Board representation and move application
//! - [`rules`]: Legal move generation
//! - [`eval`]: Position evaluation
//! - [`search`]: Alpha-beta, work partitioning, bound sharing, worker loop
//! - [`engine`]: Coordinator owning the board and the worker pool
//! - [`protocol`]: Line protocol spoken with the referee
//!
//! # Quick Start
//!
//! ```
//! use othello::{Coordinator, EngineConfig, MoveOrPass, Pos, Side};
//!
//! let mut engine = Coordinator::new(EngineConfig::default().with_max_depth(3)).unwrap();
//!
//! // Opponent opens as Black, we answer as White
//! engine
//!     .apply_opponent_move(MoveOrPass::Move(Pos::new(2, 3)), Side::Black)
//!     .unwrap();
//! let turn = engine.generate_move(Side::White).unwrap();
//! println!("AI plays {}", turn.mv);
//! ```
//!
//! # Search
//!
//! Every worker runs the same sequential search over its slice of the root
//! moves. The combined answer is identical to a single-threaded search over
//! all moves: bound sharing only changes how much gets pruned.

pub mod board;
pub mod engine;
pub mod error;
pub mod eval;
pub mod protocol;
pub mod rules;
pub mod search;

// Re-export commonly used types for convenience
pub use board::{Board, Cell, Pos, Side, BOARD_SIZE};
pub use engine::{Coordinator, EngineConfig, TurnResult};
pub use error::{EngineError, EngineResult};
pub use protocol::{Command, MoveOrPass, Session, SessionSummary, PASS_TOKEN};
pub use search::{PassPolicy, SearchConfig, SearchResult, SearchStats};
