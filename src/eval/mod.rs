//! Position evaluation for Othello
//!
//! Contains:
//! - Static positional weight table
//! - Weighted-mobility heuristic used at search leaves

pub mod heuristic;
pub mod weights;

pub use heuristic::{evaluate, weighted_mobility};
pub use weights::{weight, WEIGHTS};
