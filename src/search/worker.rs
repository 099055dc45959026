//! Persistent search worker
//!
//! A worker sits in a loop waiting for a [`Directive`]. `Compute` carries a
//! snapshot of the board and the worker's slice of the root moves; the
//! worker searches every move in the slice on its own copy of the board and
//! sends back one [`WorkerReport`]. `Stop` (or the coordinator hanging up)
//! ends the loop for good.

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

use crate::board::{Board, Side};
use crate::error::{EngineError, EngineResult};
use crate::rules::legal_moves;

use super::alphabeta::{SearchConfig, SearchResult, SearchStats, Searcher};
use super::bounds::BoundEndpoint;
use super::partition::WorkAssignment;

/// One round of work for one worker
#[derive(Debug, Clone)]
pub struct SearchTask {
    pub round: u64,
    pub board: Board,
    pub side: Side,
    pub assignment: WorkAssignment,
}

/// Coordinator to worker message
#[derive(Debug, Clone)]
pub enum Directive {
    Compute(SearchTask),
    Stop,
}

/// Worker to coordinator message
#[derive(Debug)]
pub struct WorkerReport {
    pub worker: usize,
    pub round: u64,
    /// Best (move, score) of the slice, or why the round failed
    pub outcome: EngineResult<SearchResult>,
    pub stats: SearchStats,
}

pub struct Worker {
    id: usize,
    config: SearchConfig,
    directives: Receiver<Directive>,
    reports: Sender<WorkerReport>,
    bounds: BoundEndpoint,
}

impl Worker {
    pub fn new(
        id: usize,
        config: SearchConfig,
        directives: Receiver<Directive>,
        reports: Sender<WorkerReport>,
        bounds: BoundEndpoint,
    ) -> Self {
        Self {
            id,
            config,
            directives,
            reports,
            bounds,
        }
    }

    /// Block on directives until told to stop.
    pub fn run(mut self) {
        debug!(worker = self.id, "worker waiting for assignments");
        while let Ok(directive) = self.directives.recv() {
            match directive {
                Directive::Compute(task) => {
                    let report = self.compute(task);
                    if self.reports.send(report).is_err() {
                        warn!(worker = self.id, "coordinator gone, dropping report");
                        break;
                    }
                }
                Directive::Stop => break,
            }
        }
        debug!(worker = self.id, "worker stopped");
    }

    /// Search the assigned slice of root moves.
    pub fn compute(&mut self, task: SearchTask) -> WorkerReport {
        self.bounds.begin_round(task.round);

        let moves = legal_moves(&task.board, task.side);
        let SearchTask {
            round,
            board,
            side,
            assignment,
        } = task;

        if assignment.end > moves.len() || assignment.start > assignment.end {
            return self.report(
                round,
                Err(EngineError::Protocol {
                    message: format!(
                        "assignment {}..{} outside {} root moves",
                        assignment.start,
                        assignment.end,
                        moves.len()
                    ),
                }),
                SearchStats::default(),
            );
        }
        if assignment.is_empty() {
            debug!(worker = self.id, round, "empty assignment, passing");
            return self.report(round, Ok(SearchResult::pass()), SearchStats::default());
        }

        let mut searcher = Searcher::new(self.config, side, &mut self.bounds);
        let result = searcher.best_of(&board, &moves[assignment.range()]);
        let mut stats = searcher.stats();

        let bound_stats = self.bounds.stats();
        stats.bounds_published = bound_stats.published;
        stats.bounds_received = bound_stats.received;

        debug!(
            worker = self.id,
            round,
            moves = assignment.len(),
            score = result.score,
            nodes = stats.nodes,
            refuted = stats.refuted,
            "slice searched"
        );
        self.report(round, Ok(result), stats)
    }

    fn report(
        &self,
        round: u64,
        outcome: EngineResult<SearchResult>,
        stats: SearchStats,
    ) -> WorkerReport {
        WorkerReport {
            worker: self.id,
            round,
            outcome,
            stats,
        }
    }
}
