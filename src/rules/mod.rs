//! Game rules for Othello
//!
//! Placement legality and flipping live on [`Board`](crate::board::Board);
//! this module enumerates the moves available to a side.

pub mod moves;

// Re-exports for convenient access
pub use moves::{has_legal_move, legal_moves};
