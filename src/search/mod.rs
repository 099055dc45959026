//! Search module for Othello
//!
//! Contains:
//! - Alpha-beta minimax over a single root move
//! - Partitioning of root moves across workers
//! - Best-effort bound sharing between workers
//! - The worker loop that ties them together

pub mod alphabeta;
pub mod bounds;
pub mod partition;
pub mod worker;

pub use alphabeta::{
    order_by_weight, search_best_move, PassPolicy, RootScore, SearchConfig, SearchResult,
    SearchStats, Searcher, INF, SCORE_MIN,
};
pub use bounds::{bound_mesh, BoundEndpoint, BoundShare, BoundStats, BoundWindow, NoSharing};
pub use partition::{partition, WorkAssignment};
pub use worker::{Directive, SearchTask, Worker, WorkerReport};
