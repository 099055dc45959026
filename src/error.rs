//! Error types for the Othello engine
//!
//! Rule violations, protocol errors and worker communication failures.
//! Bound-sharing problems are deliberately absent: a lost bound update only
//! costs pruning and is never reported as an error.

use thiserror::Error;

use crate::board::{Pos, Side};

/// Errors that can occur in the engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// Move is not legal for the side that tried to play it
    #[error("Invalid move: ({}, {}) is not legal for {side}", .pos.row, .pos.col)]
    InvalidMove { pos: Pos, side: Side },

    /// Move text that is neither two digits 0-7 nor the pass token
    #[error("Invalid move text: {text:?}")]
    InvalidMoveText { text: String },

    /// Malformed command or directive
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// A worker could not be reached or hung up mid-round
    #[error("Worker {worker} is unavailable")]
    WorkerUnavailable { worker: usize },

    /// Engine configuration rejected by `EngineConfig::validate`
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Worker thread could not be started
    #[error("Failed to spawn worker {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
