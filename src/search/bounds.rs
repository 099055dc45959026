//! Best-effort alpha/beta sharing between workers
//!
//! Every worker owns a [`BoundEndpoint`] with a small bounded inbox and a
//! sender into every peer's inbox. Publishing never blocks: a full or closed
//! inbox simply drops the update. Polling drains whatever has arrived and
//! folds it with max/min, so delivery order and duplicates do not matter.
//!
//! Windows are always expressed from the root side's point of view. Only the
//! root-level bounds carry over between subtrees searched by different
//! workers; a node-local window from one subtree says nothing about another.
//!
//! # Example
//!
//! ```
//! use othello::search::{bound_mesh, BoundShare, BoundWindow};
//!
//! let mut endpoints = bound_mesh(2, 8);
//! let mut second = endpoints.pop().unwrap();
//! let mut first = endpoints.pop().unwrap();
//! first.begin_round(1);
//! second.begin_round(1);
//!
//! first.publish(BoundWindow::new(12, i32::MAX));
//!
//! let mut window = BoundWindow::full();
//! assert!(second.poll(&mut window));
//! assert_eq!(window.alpha, 12);
//! ```

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use tracing::trace;

use super::alphabeta::INF;

/// Pruning window shared across workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundWindow {
    /// Best score the root side can already guarantee
    pub alpha: i32,
    /// Best score the opponent can already hold the root side to
    pub beta: i32,
}

impl BoundWindow {
    #[inline]
    pub fn new(alpha: i32, beta: i32) -> Self {
        Self { alpha, beta }
    }

    /// Window that prunes nothing
    #[inline]
    pub fn full() -> Self {
        Self::new(-INF, INF)
    }

    /// Tighten this window with another one. Commutative and idempotent.
    /// Returns true if either bound moved.
    #[inline]
    pub fn fold(&mut self, other: BoundWindow) -> bool {
        let before = *self;
        self.alpha = self.alpha.max(other.alpha);
        self.beta = self.beta.min(other.beta);
        *self != before
    }

    /// Whether any bound is tighter than `full()`
    #[inline]
    pub fn is_informative(&self) -> bool {
        self.alpha > -INF || self.beta < INF
    }
}

impl Default for BoundWindow {
    fn default() -> Self {
        Self::full()
    }
}

/// Seam between the search and whatever transports bounds between workers.
pub trait BoundShare {
    /// Offer a window to peers. Must not block.
    fn publish(&mut self, window: BoundWindow);

    /// Fold everything peers published since the last poll into `window`.
    /// Must not block. Returns true if `window` changed.
    fn poll(&mut self, window: &mut BoundWindow) -> bool;
}

/// Sharing disabled: single-threaded search
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSharing;

impl BoundShare for NoSharing {
    fn publish(&mut self, _window: BoundWindow) {}

    fn poll(&mut self, _window: &mut BoundWindow) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy)]
struct BoundMessage {
    round: u64,
    from: usize,
    window: BoundWindow,
}

/// Counters for bound traffic on one endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundStats {
    /// Updates handed to at least one peer inbox
    pub published: u64,
    /// Updates dropped because a peer inbox was full or closed
    pub dropped: u64,
    /// Peer updates folded into the local window
    pub received: u64,
    /// Peer updates discarded because they belonged to another round
    pub stale: u64,
}

/// One worker's view of the bound-sharing mesh.
pub struct BoundEndpoint {
    id: usize,
    round: u64,
    inbox: Receiver<BoundMessage>,
    peers: Vec<(usize, Sender<BoundMessage>)>,
    last_published: Option<BoundWindow>,
    stats: BoundStats,
}

/// Build a fully connected mesh of `workers` endpoints.
///
/// Each inbox holds at most `capacity` pending updates; `capacity` is
/// clamped to at least 1.
#[must_use]
pub fn bound_mesh(workers: usize, capacity: usize) -> Vec<BoundEndpoint> {
    let (senders, receivers): (Vec<_>, Vec<_>) =
        (0..workers).map(|_| bounded(capacity.max(1))).unzip();

    receivers
        .into_iter()
        .enumerate()
        .map(|(id, inbox)| BoundEndpoint {
            id,
            round: 0,
            inbox,
            peers: senders
                .iter()
                .enumerate()
                .filter(|&(peer, _)| peer != id)
                .map(|(peer, tx)| (peer, tx.clone()))
                .collect(),
            last_published: None,
            stats: BoundStats::default(),
        })
        .collect()
}

impl BoundEndpoint {
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn round(&self) -> u64 {
        self.round
    }

    #[inline]
    pub fn stats(&self) -> BoundStats {
        self.stats
    }

    /// Start a new search round. Updates still queued from earlier rounds
    /// are discarded lazily by `poll`.
    pub fn begin_round(&mut self, round: u64) {
        self.round = round;
        self.last_published = None;
        self.stats = BoundStats::default();
    }
}

impl BoundShare for BoundEndpoint {
    fn publish(&mut self, window: BoundWindow) {
        if !window.is_informative() || self.last_published == Some(window) {
            return;
        }
        self.last_published = Some(window);

        let msg = BoundMessage {
            round: self.round,
            from: self.id,
            window,
        };
        let mut delivered = false;
        for (peer, tx) in &self.peers {
            match tx.try_send(msg) {
                Ok(()) => delivered = true,
                Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                    self.stats.dropped += 1;
                    trace!(worker = self.id, peer, "bound update dropped");
                }
            }
        }
        if delivered {
            self.stats.published += 1;
            trace!(
                worker = self.id,
                round = self.round,
                alpha = window.alpha,
                beta = window.beta,
                "published bounds"
            );
        }
    }

    fn poll(&mut self, window: &mut BoundWindow) -> bool {
        let mut changed = false;
        loop {
            match self.inbox.try_recv() {
                Ok(msg) if msg.round == self.round => {
                    self.stats.received += 1;
                    if window.fold(msg.window) {
                        trace!(worker = self.id, from = msg.from, "peer tightened window");
                        changed = true;
                    }
                }
                Ok(_) => self.stats.stale += 1,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if changed {
            trace!(
                worker = self.id,
                alpha = window.alpha,
                beta = window.beta,
                "folded peer bounds"
            );
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mesh_in_round(workers: usize, capacity: usize, round: u64) -> Vec<BoundEndpoint> {
        let mut mesh = bound_mesh(workers, capacity);
        for endpoint in &mut mesh {
            endpoint.begin_round(round);
        }
        mesh
    }

    #[test]
    fn test_fold_tightens() {
        let mut window = BoundWindow::full();
        assert!(window.fold(BoundWindow::new(5, 50)));
        assert!(window.fold(BoundWindow::new(3, 40)));
        assert_eq!(window, BoundWindow::new(5, 40));
        assert!(!window.fold(BoundWindow::new(5, 40)));
    }

    #[test]
    fn test_poll_on_empty_inbox_is_not_an_error() {
        let mut mesh = mesh_in_round(3, 4, 1);
        let mut window = BoundWindow::full();
        assert!(!mesh[0].poll(&mut window));
        assert_eq!(window, BoundWindow::full());
    }

    #[test]
    fn test_publish_reaches_every_peer_but_self() {
        let mut mesh = mesh_in_round(3, 4, 1);
        mesh[1].publish(BoundWindow::new(9, INF));

        let mut own = BoundWindow::full();
        assert!(!mesh[1].poll(&mut own));
        for id in [0, 2] {
            let mut window = BoundWindow::full();
            assert!(mesh[id].poll(&mut window));
            assert_eq!(window.alpha, 9);
        }
        assert_eq!(mesh[1].stats().published, 1);
    }

    #[test]
    fn test_duplicate_publish_is_suppressed() {
        let mut mesh = mesh_in_round(2, 4, 1);
        mesh[0].publish(BoundWindow::new(9, INF));
        mesh[0].publish(BoundWindow::new(9, INF));
        mesh[0].publish(BoundWindow::full());
        assert_eq!(mesh[0].stats().published, 1);
        assert_eq!(mesh[1].inbox.len(), 1);
    }

    #[test]
    fn test_full_inbox_drops_updates() {
        let mut mesh = mesh_in_round(2, 1, 1);
        mesh[0].publish(BoundWindow::new(1, INF));
        mesh[0].publish(BoundWindow::new(2, INF));
        assert_eq!(mesh[0].stats().dropped, 1);

        let mut window = BoundWindow::full();
        mesh[1].poll(&mut window);
        assert_eq!(window.alpha, 1);
    }

    #[test]
    fn test_disconnected_peer_is_tolerated() {
        let mut mesh = mesh_in_round(2, 4, 1);
        let mut survivor = mesh.remove(0);
        drop(mesh);
        survivor.publish(BoundWindow::new(4, INF));
        assert_eq!(survivor.stats().dropped, 1);
        assert_eq!(survivor.stats().published, 0);
    }

    #[test]
    fn test_stale_round_is_ignored() {
        let mut mesh = mesh_in_round(2, 4, 1);
        mesh[0].publish(BoundWindow::new(30, INF));
        mesh[1].begin_round(2);
        mesh[0].begin_round(2);

        let mut window = BoundWindow::full();
        assert!(!mesh[1].poll(&mut window));
        assert_eq!(window, BoundWindow::full());
        assert_eq!(mesh[1].stats().stale, 1);
    }

    proptest! {
        #[test]
        fn fold_order_does_not_matter(
            windows in prop::collection::vec((-100i32..100, -100i32..100), 0..12),
            seed in any::<u64>(),
        ) {
            let windows: Vec<BoundWindow> =
                windows.into_iter().map(|(a, b)| BoundWindow::new(a, b)).collect();
            let mut forward = BoundWindow::full();
            for w in &windows {
                forward.fold(*w);
            }

            let mut shuffled = windows.clone();
            let len = shuffled.len().max(1) as u64;
            shuffled.rotate_left((seed % len) as usize);
            shuffled.reverse();
            let mut backward = BoundWindow::full();
            for w in &shuffled {
                backward.fold(*w);
                backward.fold(*w);
            }

            prop_assert_eq!(forward, backward);
        }
    }
}
