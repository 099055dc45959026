//! Parallel move engine
//!
//! The [`Coordinator`] owns the authoritative board and a fixed pool of
//! worker threads. Each turn it splits the legal moves into contiguous
//! slices, hands every worker its slice together with a snapshot of the
//! board, waits for one report per worker and plays the best move:
//!
//! 1. **Partition**: `partition(moves, workers)` in generator order
//! 2. **Dispatch**: one `Directive::Compute` per worker, tagged with the round
//! 3. **Collect**: one report per worker (optionally bounded by a timeout)
//! 4. **Select**: strictly greatest score, lowest worker index on ties
//! 5. **Apply**: play the move on the authoritative board, or pass
//!
//! Workers talk to each other only through the bound-sharing mesh, which
//! affects how much they prune and never which move is chosen.
//!
//! # Example
//!
//! ```
//! use othello::{Coordinator, EngineConfig, Side};
//!
//! let config = EngineConfig::default().with_workers(2).with_max_depth(3);
//! let mut engine = Coordinator::new(config).unwrap();
//!
//! let turn = engine.generate_move(Side::Black).unwrap();
//! println!("Play {} (score {})", turn.mv, turn.score);
//! engine.shutdown();
//! ```

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, info, warn};

use crate::board::{Board, Side};
use crate::error::{EngineError, EngineResult};
use crate::protocol::MoveOrPass;
use crate::rules::legal_moves;
use crate::search::{
    bound_mesh, partition, Directive, PassPolicy, SearchConfig, SearchResult, SearchStats,
    SearchTask, Worker, WorkerReport,
};

/// How often a blocked collect checks that workers are still alive
const LIVENESS_INTERVAL: Duration = Duration::from_millis(50);

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of worker threads
    pub workers: usize,
    /// Per-worker search settings
    pub search: SearchConfig,
    /// Pending bound updates each worker inbox can hold
    pub bound_capacity: usize,
    /// Give up on missing reports after this long; `None` waits forever.
    ///
    /// The answer after a timeout is best-effort: a worker may have refuted
    /// its own better move against a bound from a peer whose report never
    /// arrived, so the move played can be worse than the best one reported.
    pub collect_timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            search: SearchConfig::default(),
            bound_capacity: 64,
            collect_timeout: None,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u8) -> Self {
        self.search.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_share_plies(mut self, share_plies: u8) -> Self {
        self.search.share_plies = share_plies;
        self
    }

    #[must_use]
    pub fn with_order_moves(mut self, order_moves: bool) -> Self {
        self.search.order_moves = order_moves;
        self
    }

    #[must_use]
    pub fn with_pass_policy(mut self, pass_policy: PassPolicy) -> Self {
        self.search.pass_policy = pass_policy;
        self
    }

    #[must_use]
    pub fn with_bound_capacity(mut self, bound_capacity: usize) -> Self {
        self.bound_capacity = bound_capacity;
        self
    }

    #[must_use]
    pub fn with_collect_timeout(mut self, timeout: Duration) -> Self {
        self.collect_timeout = Some(timeout);
        self
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> EngineResult<()> {
        if self.workers == 0 {
            return Err(EngineError::InvalidConfig {
                message: "at least one worker is required".to_string(),
            });
        }
        if self.search.max_depth == 0 {
            return Err(EngineError::InvalidConfig {
                message: "search depth must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Outcome of one `generate_move` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnResult {
    /// Move played on the authoritative board, or pass
    pub mv: MoveOrPass,
    /// Score of the chosen move from the mover's point of view
    pub score: i32,
    /// Worker whose report was selected
    pub worker: Option<usize>,
    /// Workers that reported in time
    pub reported: usize,
    /// Wall time in milliseconds
    pub time_ms: u64,
    /// Merged statistics of every report
    pub stats: SearchStats,
}

impl TurnResult {
    fn pass(time_ms: u64) -> Self {
        Self {
            mv: MoveOrPass::Pass,
            score: SearchResult::pass().score,
            worker: None,
            reported: 0,
            time_ms,
            stats: SearchStats::default(),
        }
    }
}

struct WorkerHandle {
    id: usize,
    directives: Sender<Directive>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

/// Reports gathered for one round
struct Collected {
    /// Indexed by worker id; `None` for missing or failed reports
    results: Vec<Option<SearchResult>>,
    reported: usize,
    stats: SearchStats,
}

/// Owner of the authoritative board and the worker pool.
pub struct Coordinator {
    config: EngineConfig,
    board: Board,
    workers: Vec<WorkerHandle>,
    reports: Receiver<WorkerReport>,
    round: u64,
}

impl Coordinator {
    /// Validate `config`, then start one named thread per worker.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;

        let (report_tx, reports) = unbounded();
        let endpoints = bound_mesh(config.workers, config.bound_capacity);
        let mut workers = Vec::with_capacity(config.workers);

        for (id, bounds) in endpoints.into_iter().enumerate() {
            let (directive_tx, directive_rx) = unbounded();
            let worker = Worker::new(id, config.search, directive_rx, report_tx.clone(), bounds);
            let thread = thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || worker.run())
                .map_err(|source| EngineError::Spawn { worker: id, source })?;
            workers.push(WorkerHandle {
                id,
                directives: directive_tx,
                thread: Some(thread),
            });
        }
        // Only workers hold report senders from here on, so a closed
        // channel means every worker is gone.
        drop(report_tx);

        info!(
            workers = config.workers,
            depth = config.search.max_depth,
            "engine started"
        );
        Ok(Self {
            config,
            board: Board::initial(),
            workers,
            reports,
            round: 0,
        })
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Replace the authoritative board (setting up positions, tests).
    pub fn set_board(&mut self, board: Board) {
        self.board = board;
    }

    /// Rounds dispatched so far
    #[inline]
    pub fn round(&self) -> u64 {
        self.round
    }

    #[inline]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Pick and play a move for `side`.
    ///
    /// With no legal move the result is a pass and the board is left alone.
    pub fn generate_move(&mut self, side: Side) -> EngineResult<TurnResult> {
        let start = Instant::now();
        let moves = legal_moves(&self.board, side);
        if moves.is_empty() {
            info!(%side, "no legal moves, passing");
            return Ok(TurnResult::pass(start.elapsed().as_millis() as u64));
        }

        self.round += 1;
        let round = self.round;
        let assignments = partition(moves.len(), self.workers.len());
        for (handle, assignment) in self.workers.iter().zip(assignments) {
            let task = SearchTask {
                round,
                board: self.board.clone(),
                side,
                assignment,
            };
            handle
                .directives
                .send(Directive::Compute(task))
                .map_err(|_| EngineError::WorkerUnavailable { worker: handle.id })?;
        }
        debug!(round, %side, moves = moves.len(), "round dispatched");

        let collected = self.collect(round)?;

        let (mv, score, worker) = match select_best(&collected.results) {
            Some((worker, SearchResult {
                best_move: Some(pos),
                score,
            })) => (pos, score, Some(worker)),
            _ => {
                // Only reachable when reports went missing: every exact
                // score is carried by some worker's report.
                warn!(round, "no usable report, playing first legal move");
                (moves[0], SearchResult::pass().score, None)
            }
        };
        self.board.try_apply(mv, side)?;

        let turn = TurnResult {
            mv: MoveOrPass::Move(mv),
            score,
            worker,
            reported: collected.reported,
            time_ms: start.elapsed().as_millis() as u64,
            stats: collected.stats,
        };
        info!(
            round,
            %side,
            mv = %turn.mv,
            score,
            worker = ?worker,
            nodes = turn.stats.nodes,
            time_ms = turn.time_ms,
            "move generated"
        );
        Ok(turn)
    }

    /// Play the opponent's move on the authoritative board.
    ///
    /// A pass always succeeds; an illegal move leaves the board unchanged.
    pub fn apply_opponent_move(&mut self, mv: MoveOrPass, side: Side) -> EngineResult<()> {
        match mv {
            MoveOrPass::Pass => {
                debug!(%side, "opponent passed");
                Ok(())
            }
            MoveOrPass::Move(pos) => {
                let flipped = self.board.try_apply(pos, side)?;
                debug!(%side, mv = %mv, flipped, "opponent moved");
                Ok(())
            }
        }
    }

    /// Stop every worker and wait for it to exit.
    pub fn shutdown(mut self) {
        self.stop_workers();
        info!(rounds = self.round, "engine stopped");
    }

    fn collect(&self, round: u64) -> EngineResult<Collected> {
        let n = self.workers.len();
        let deadline = self.config.collect_timeout.map(|t| Instant::now() + t);
        let mut collected = Collected {
            results: vec![None; n],
            reported: 0,
            stats: SearchStats::default(),
        };
        let mut received = vec![false; n];

        while collected.reported < n {
            let wait = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        warn!(
                            round,
                            missing = n - collected.reported,
                            "collect timed out"
                        );
                        break;
                    }
                    (deadline - now).min(LIVENESS_INTERVAL)
                }
                None => LIVENESS_INTERVAL,
            };

            match self.reports.recv_timeout(wait) {
                Ok(report) => {
                    let worker = report.worker;
                    if report.round != round || worker >= n || received[worker] {
                        debug!(worker, round = report.round, "discarding stale report");
                        continue;
                    }
                    received[worker] = true;
                    collected.reported += 1;
                    collected.stats.merge(&report.stats);
                    match report.outcome {
                        Ok(result) => {
                            debug!(
                                worker,
                                score = result.score,
                                pass = result.is_pass(),
                                "report received"
                            );
                            collected.results[worker] = Some(result);
                        }
                        Err(e) => warn!(worker, error = %e, "worker failed this round"),
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    if let Some(dead) = self
                        .workers
                        .iter()
                        .find(|h| !received[h.id] && h.is_finished())
                    {
                        return Err(EngineError::WorkerUnavailable { worker: dead.id });
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    let worker = received.iter().position(|&r| !r).unwrap_or(0);
                    return Err(EngineError::WorkerUnavailable { worker });
                }
            }
        }
        Ok(collected)
    }

    fn stop_workers(&mut self) {
        for handle in &self.workers {
            // A worker that already exited has dropped its receiver.
            let _ = handle.directives.send(Directive::Stop);
        }
        for handle in &mut self.workers {
            if let Some(thread) = handle.thread.take() {
                if thread.join().is_err() {
                    warn!(worker = handle.id, "worker panicked");
                }
            }
        }
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.stop_workers();
    }
}

/// Pick the report with the strictly greatest score.
///
/// Reports are scanned in worker order so ties go to the lowest worker
/// index. Passes and missing reports never win.
pub fn select_best(results: &[Option<SearchResult>]) -> Option<(usize, SearchResult)> {
    let mut best: Option<(usize, SearchResult)> = None;
    for (worker, result) in results.iter().enumerate() {
        let Some(result) = result else { continue };
        if result.is_pass() {
            continue;
        }
        if best.map_or(true, |(_, b)| result.score > b.score) {
            best = Some((worker, *result));
        }
    }
    best
}
