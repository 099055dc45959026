//! Depth-bounded minimax with alpha-beta pruning
//!
//! This module implements the sequential search every worker runs over its
//! share of the root moves. The root side maximizes, its opponent minimizes,
//! and every leaf is scored from the root side's point of view.
//!
//! # Features
//!
//! - Copy-on-recurse: each child gets its own board clone
//! - Fail-hard alpha-beta in generator order, optional weight pre-sort
//! - Root-level window shared with peer workers through [`BoundShare`]
//!
//! # Example
//!
//! ```
//! use othello::board::{Board, Side};
//! use othello::search::{search_best_move, SearchConfig};
//!
//! let config = SearchConfig::default().with_max_depth(3);
//! let result = search_best_move(&Board::initial(), Side::Black, config);
//! assert!(result.best_move.is_some());
//! ```

use tracing::trace;

use crate::board::{Board, Pos, Side};
use crate::eval::{evaluate, weight};
use crate::rules::{has_legal_move, legal_moves};

use super::bounds::{BoundShare, BoundWindow, NoSharing};

/// Infinity score for alpha-beta bounds. Evaluations stay far inside it.
pub const INF: i32 = 100_000;

/// Score reported alongside the pass sentinel
pub const SCORE_MIN: i32 = -INF;

/// What the search does at a node where the side to move has no legal move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassPolicy {
    /// Stop and evaluate the position
    #[default]
    Evaluate,
    /// Let the side pass and keep searching with the opponent; evaluate only
    /// when neither side can move
    Continue,
}

/// Tunables for the sequential search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Depth ceiling in plies, counting the root move as ply 1
    pub max_depth: u8,
    /// Cutoffs at this ply or shallower offer the root window to peers
    pub share_plies: u8,
    /// Try higher-weight cells first
    pub order_moves: bool,
    pub pass_policy: PassPolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            share_plies: 2,
            order_moves: false,
            pass_policy: PassPolicy::Evaluate,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u8) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_order_moves(mut self, order_moves: bool) -> Self {
        self.order_moves = order_moves;
        self
    }

    #[must_use]
    pub fn with_pass_policy(mut self, pass_policy: PassPolicy) -> Self {
        self.pass_policy = pass_policy;
        self
    }
}

/// Search statistics for diagnostics and tuning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes visited, root moves included
    pub nodes: u64,
    /// Alpha or beta cutoffs
    pub cutoffs: u64,
    /// Root moves proven strictly worse than an already guaranteed score
    pub refuted: u64,
    /// Polls that tightened the window with peer bounds
    pub peer_updates: u64,
    /// Bound updates this worker delivered to peers
    pub bounds_published: u64,
    /// Peer bound updates this worker folded in
    pub bounds_received: u64,
}

impl SearchStats {
    /// Merge another stats into this one (for combining worker stats)
    pub fn merge(&mut self, other: &SearchStats) {
        self.nodes += other.nodes;
        self.cutoffs += other.cutoffs;
        self.refuted += other.refuted;
        self.peer_updates += other.peer_updates;
        self.bounds_published += other.bounds_published;
        self.bounds_received += other.bounds_received;
    }
}

/// Best move of a search and its score. `best_move == None` is a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Option<Pos>,
    pub score: i32,
}

impl SearchResult {
    #[inline]
    pub fn new(mv: Pos, score: i32) -> Self {
        Self {
            best_move: Some(mv),
            score,
        }
    }

    /// Pass sentinel with the minimal score
    #[inline]
    pub fn pass() -> Self {
        Self {
            best_move: None,
            score: SCORE_MIN,
        }
    }

    #[inline]
    pub fn is_pass(&self) -> bool {
        self.best_move.is_none()
    }
}

/// Outcome of scoring one root move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootScore {
    /// Exact minimax value, identical to a search with no outside bounds
    Exact(i32),
    /// Upper bound; the move is strictly worse than a score already
    /// guaranteed locally or by a peer
    Refuted(i32),
}

/// Alpha-beta searcher for one side and one round.
///
/// `window` holds the root-level bounds: `alpha` is the best exact root score
/// known to this worker or its peers. It only ever tightens.
pub struct Searcher<'a, S: BoundShare> {
    config: SearchConfig,
    root_side: Side,
    window: BoundWindow,
    sharing: &'a mut S,
    stats: SearchStats,
}

impl<'a, S: BoundShare> Searcher<'a, S> {
    pub fn new(config: SearchConfig, root_side: Side, sharing: &'a mut S) -> Self {
        Self {
            config,
            root_side,
            window: BoundWindow::full(),
            sharing,
            stats: SearchStats::default(),
        }
    }

    /// Current root-level window
    #[inline]
    pub fn window(&self) -> BoundWindow {
        self.window
    }

    #[inline]
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Highest root score that still counts as "not better". Exact values
    /// must beat this; anything at or below it is strictly worse than alpha.
    #[inline]
    fn threshold(&self) -> i32 {
        if self.window.alpha > -INF {
            self.window.alpha - 1
        } else {
            -INF
        }
    }

    /// Fold in whatever peers published. Never blocks.
    pub fn poll_bounds(&mut self) -> bool {
        let changed = self.sharing.poll(&mut self.window);
        if changed {
            self.stats.peer_updates += 1;
        }
        changed
    }

    fn offer_bounds(&mut self) {
        self.sharing.publish(self.window);
    }

    /// Score a single root move for the root side.
    ///
    /// Moves that cannot beat the current root alpha come back as
    /// [`RootScore::Refuted`]; everything else is exact.
    pub fn search_root_move(&mut self, board: &Board, mv: Pos) -> RootScore {
        let mut child = board.clone();
        child.apply(mv, self.root_side);
        self.stats.nodes += 1;

        let floor = self.threshold();
        let score = self.search(
            &child,
            1,
            self.root_side.opponent(),
            BoundWindow::new(floor, INF),
        );

        // The threshold may have risen while searching; the result is only
        // trustworthy above the final one.
        if score > self.threshold() {
            if score > self.window.alpha {
                self.window.alpha = score;
                self.offer_bounds();
            }
            RootScore::Exact(score)
        } else {
            self.stats.refuted += 1;
            trace!(row = mv.row, col = mv.col, bound = score, "root move refuted");
            RootScore::Refuted(score)
        }
    }

    /// Minimax with alpha-beta pruning below a root move.
    ///
    /// `depth` counts plies from the search root; `side` is to move. Returns
    /// alpha when `side` is the root side (maximizer) and beta otherwise.
    pub fn search(&mut self, board: &Board, depth: u8, side: Side, window: BoundWindow) -> i32 {
        self.stats.nodes += 1;
        let BoundWindow {
            mut alpha,
            mut beta,
        } = window;

        if depth >= self.config.max_depth {
            return evaluate(board, self.root_side);
        }

        let mut moves = legal_moves(board, side);
        if moves.is_empty() {
            return match self.config.pass_policy {
                PassPolicy::Continue if has_legal_move(board, side.opponent()) => {
                    self.search(board, depth + 1, side.opponent(), BoundWindow::new(alpha, beta))
                }
                _ => evaluate(board, self.root_side),
            };
        }
        if self.config.order_moves {
            order_by_weight(&mut moves);
        }

        let maximizing = side == self.root_side;
        for mv in moves {
            let mut child = board.clone();
            child.apply(mv, side);
            let score = self.search(&child, depth + 1, side.opponent(), BoundWindow::new(alpha, beta));

            if maximizing {
                alpha = alpha.max(score);
            } else {
                beta = beta.min(score);
            }

            // Directly below the root move alpha *is* the root alpha, so a
            // peer's tighter bound can be folded in between siblings.
            if !maximizing && depth == 1 && self.poll_bounds() {
                alpha = alpha.max(self.threshold());
            }

            if alpha >= beta {
                self.stats.cutoffs += 1;
                if depth <= self.config.share_plies {
                    self.offer_bounds();
                }
                break;
            }
        }

        if maximizing {
            alpha
        } else {
            beta
        }
    }

    /// Score `moves` in order and keep the first strictly best exact one.
    ///
    /// Peers are polled between moves. Returns the pass sentinel when
    /// `moves` is empty or every move was refuted.
    pub fn best_of(&mut self, board: &Board, moves: &[Pos]) -> SearchResult {
        let mut best = SearchResult::pass();
        for &mv in moves {
            self.poll_bounds();
            if let RootScore::Exact(score) = self.search_root_move(board, mv) {
                if score > best.score {
                    best = SearchResult::new(mv, score);
                }
            }
        }
        best
    }
}

/// Stable sort by positional weight, best cells first.
pub fn order_by_weight(moves: &mut [Pos]) {
    moves.sort_by_key(|&mv| std::cmp::Reverse(weight(mv)));
}

/// Single-threaded search over every legal root move.
///
/// Used as the reference the parallel coordinator must agree with.
#[must_use]
pub fn search_best_move(board: &Board, side: Side, config: SearchConfig) -> SearchResult {
    let moves = legal_moves(board, side);
    let mut sharing = NoSharing;
    let mut searcher = Searcher::new(config, side, &mut sharing);
    searcher.best_of(board, &moves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;
    use crate::rules::moves::playout;
    use proptest::prelude::*;

    /// Plain minimax without pruning, same terminal rules as the searcher.
    fn minimax(board: &Board, depth: u8, side: Side, root: Side, config: &SearchConfig) -> i32 {
        if depth >= config.max_depth {
            return evaluate(board, root);
        }
        let moves = legal_moves(board, side);
        if moves.is_empty() {
            if config.pass_policy == PassPolicy::Continue
                && has_legal_move(board, side.opponent())
            {
                return minimax(board, depth + 1, side.opponent(), root, config);
            }
            return evaluate(board, root);
        }
        let scores = moves.iter().map(|&mv| {
            let mut child = board.clone();
            child.apply(mv, side);
            minimax(&child, depth + 1, side.opponent(), root, config)
        });
        if side == root {
            scores.max().unwrap_or(-INF)
        } else {
            scores.min().unwrap_or(INF)
        }
    }

    fn root_value(board: &Board, mv: Pos, side: Side, config: &SearchConfig) -> i32 {
        let mut child = board.clone();
        child.apply(mv, side);
        minimax(&child, 1, side.opponent(), side, config)
    }

    /// Bound source that hands out a scripted sequence of peer windows,
    /// one per poll, and records what gets published.
    struct ScriptedPeers {
        incoming: Vec<BoundWindow>,
        published: Vec<BoundWindow>,
    }

    impl BoundShare for ScriptedPeers {
        fn publish(&mut self, window: BoundWindow) {
            self.published.push(window);
        }

        fn poll(&mut self, window: &mut BoundWindow) -> bool {
            match self.incoming.pop() {
                Some(peer) => window.fold(peer),
                None => false,
            }
        }
    }

    #[test]
    fn test_initial_position_finds_move() {
        let config = SearchConfig::default().with_max_depth(3);
        let result = search_best_move(&Board::initial(), Side::Black, config);
        assert!(result.best_move.is_some());
        assert!(Board::initial().is_legal(result.best_move.unwrap_or(Pos::new(0, 0)), Side::Black));
    }

    #[test]
    fn test_symmetric_openings_pick_first() {
        // All four openings are equivalent, so the first generated one wins
        for depth in 1..=3 {
            let config = SearchConfig::default().with_max_depth(depth);
            let result = search_best_move(&Board::initial(), Side::Black, config);
            assert_eq!(result.best_move, Some(Pos::new(2, 3)), "depth {depth}");
        }
    }

    #[test]
    fn test_mobility_beats_greedy_corner() {
        // Taking (0,0) leaves both sides one inner move; (3,2) keeps the
        // corner available and only concedes an edge cell
        let mut board = Board::empty();
        board.set(Pos::new(0, 1), Cell::White);
        board.set(Pos::new(0, 2), Cell::Black);
        board.set(Pos::new(3, 3), Cell::White);
        board.set(Pos::new(3, 4), Cell::Black);

        let config = SearchConfig::default().with_max_depth(1);
        let result = search_best_move(&board, Side::Black, config);
        assert_eq!(result, SearchResult::new(Pos::new(3, 2), 10));
    }

    #[test]
    fn test_no_moves_is_pass() {
        let mut board = Board::empty();
        board.set(Pos::new(0, 0), Cell::Black);
        let result = search_best_move(&board, Side::White, SearchConfig::default());
        assert!(result.is_pass());
        assert_eq!(result.score, SCORE_MIN);
    }

    #[test]
    fn test_depth_limit_evaluates_immediately() {
        let board = Board::initial();
        let config = SearchConfig::default().with_max_depth(2);
        let mut sharing = NoSharing;
        let mut searcher = Searcher::new(config, Side::Black, &mut sharing);
        let score = searcher.search(&board, 2, Side::Black, BoundWindow::full());
        assert_eq!(score, evaluate(&board, Side::Black));
        assert_eq!(searcher.stats().nodes, 1);
    }

    #[test]
    fn test_matches_plain_minimax_from_opening() {
        let board = Board::initial();
        let config = SearchConfig::default().with_max_depth(4);
        let mut sharing = NoSharing;
        let mut searcher = Searcher::new(config, Side::Black, &mut sharing);
        for mv in legal_moves(&board, Side::Black) {
            let expected = root_value(&board, mv, Side::Black, &config);
            let mut child = board.clone();
            child.apply(mv, Side::Black);
            let got = searcher.search(&child, 1, Side::White, BoundWindow::full());
            assert_eq!(got, expected, "move {mv:?}");
        }
        assert!(searcher.stats().cutoffs > 0);
    }

    #[test]
    fn test_ordering_does_not_change_result() {
        let (board, side) = playout(&[3, 1, 4, 1, 5, 9, 2, 6]);
        let plain = SearchConfig::default().with_max_depth(4);
        let ordered = plain.with_order_moves(true);
        let a = search_best_move(&board, side, plain);
        let b = search_best_move(&board, side, ordered);
        assert_eq!(a.score, b.score);
    }

    #[test]
    fn test_order_by_weight_is_stable() {
        let mut moves = vec![Pos::new(2, 3), Pos::new(0, 0), Pos::new(3, 2), Pos::new(7, 0)];
        order_by_weight(&mut moves);
        assert_eq!(
            moves,
            vec![Pos::new(0, 0), Pos::new(7, 0), Pos::new(2, 3), Pos::new(3, 2)]
        );
    }

    #[test]
    fn test_pass_continue_searches_past_pass() {
        // White can never move here; Black has (2,3) and (5,3)
        let mut board = Board::empty();
        for row in [2, 5] {
            board.set(Pos::new(row, 0), Cell::Black);
            board.set(Pos::new(row, 1), Cell::White);
            board.set(Pos::new(row, 2), Cell::White);
        }

        let evaluate_cfg = SearchConfig::default().with_max_depth(4);
        let continue_cfg = evaluate_cfg.with_pass_policy(PassPolicy::Continue);

        // Evaluate stops at White's pass and still sees Black's second move
        let stopped = search_best_move(&board, Side::Black, evaluate_cfg);
        assert_eq!(stopped, SearchResult::new(Pos::new(2, 3), 1));

        // Continue plays the second move too, after which nobody can move
        let continued = search_best_move(&board, Side::Black, continue_cfg);
        assert_eq!(continued, SearchResult::new(Pos::new(2, 3), 0));
        assert_eq!(continued.score, root_value(&board, Pos::new(2, 3), Side::Black, &continue_cfg));
    }

    #[test]
    fn test_local_alpha_refutes_worse_moves() {
        let (board, side) = playout(&[0, 0, 0, 0]);
        let config = SearchConfig::default().with_max_depth(3);
        let moves = legal_moves(&board, side);
        let mut peers = ScriptedPeers {
            incoming: Vec::new(),
            published: Vec::new(),
        };
        let mut searcher = Searcher::new(config, side, &mut peers);
        let best = searcher.best_of(&board, &moves);

        let values: Vec<i32> = moves.iter().map(|&m| root_value(&board, m, side, &config)).collect();
        let max = values.iter().copied().max().unwrap_or(SCORE_MIN);
        let first_best = moves[values.iter().position(|&v| v == max).unwrap_or(0)];
        assert_eq!(best, SearchResult::new(first_best, max));
        assert_eq!(searcher.window().alpha, max);
        assert!(!peers.published.is_empty());
    }

    #[test]
    fn test_peer_bound_above_everything_refutes_all() {
        let board = Board::initial();
        let config = SearchConfig::default().with_max_depth(3);
        let mut peers = ScriptedPeers {
            incoming: vec![BoundWindow::new(INF - 1, INF)],
            published: Vec::new(),
        };
        let mut searcher = Searcher::new(config, Side::Black, &mut peers);
        let result = searcher.best_of(&board, &legal_moves(&board, Side::Black));
        assert!(result.is_pass());
        assert_eq!(searcher.stats().refuted, 4);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn alphabeta_equals_minimax(
            choices in prop::collection::vec(any::<usize>(), 0..24),
            depth in 1u8..4,
            order in any::<bool>(),
        ) {
            let (board, side) = playout(&choices);
            let config = SearchConfig::default().with_max_depth(depth).with_order_moves(order);
            let result = search_best_move(&board, side, config);
            let moves = legal_moves(&board, side);
            match result.best_move {
                None => prop_assert!(moves.is_empty()),
                Some(mv) => {
                    let values: Vec<i32> =
                        moves.iter().map(|&m| root_value(&board, m, side, &config)).collect();
                    let max = values.iter().copied().max().unwrap_or(SCORE_MIN);
                    prop_assert_eq!(result.score, max);
                    let first = values.iter().position(|&v| v == max).map(|i| moves[i]);
                    prop_assert_eq!(Some(mv), first);
                }
            }
        }

        #[test]
        fn peer_bounds_never_change_exact_scores(
            choices in prop::collection::vec(any::<usize>(), 0..24),
            peer_alphas in prop::collection::vec(-60i32..60, 0..16),
            depth in 1u8..4,
        ) {
            let (board, side) = playout(&choices);
            let config = SearchConfig::default().with_max_depth(depth);
            let mut peers = ScriptedPeers {
                incoming: peer_alphas.iter().map(|&a| BoundWindow::new(a, INF)).collect(),
                published: Vec::new(),
            };
            let mut searcher = Searcher::new(config, side, &mut peers);

            for mv in legal_moves(&board, side) {
                searcher.poll_bounds();
                let truth = root_value(&board, mv, side, &config);
                match searcher.search_root_move(&board, mv) {
                    RootScore::Exact(score) => prop_assert_eq!(score, truth),
                    RootScore::Refuted(_) => prop_assert!(truth < searcher.window().alpha),
                }
            }
        }
    }
}
