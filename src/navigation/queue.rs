//! FIFO buffer for navigation requests that arrive while a transition is
//! in flight.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::oneshot;

use crate::view::ViewId;

/// Per-call navigation options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigateOptions {
    /// Start immediately even if another transition is running
    #[serde(default)]
    pub force: bool,

    /// Do not record the outgoing view in history
    #[serde(default)]
    pub replace_history: bool,
}

impl NavigateOptions {
    pub fn forced() -> Self {
        Self {
            force: true,
            ..Self::default()
        }
    }

    pub fn replacing_history() -> Self {
        Self {
            replace_history: true,
            ..Self::default()
        }
    }
}

static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub view: ViewId,
    pub options: NavigateOptions,
    /// Creation order, strictly increasing across the process
    pub sequence: u64,
}

impl NavigationRequest {
    pub fn new(view: impl Into<ViewId>, options: NavigateOptions) -> Self {
        Self {
            view: view.into(),
            options,
            sequence: NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed),
        }
    }
}

/// What a queued caller receives when it is its turn: its request plus the
/// permit that keeps the controller busy on its behalf
#[derive(Debug)]
pub struct Turn<P> {
    pub request: NavigationRequest,
    pub permit: P,
}

/// A queued request plus the channel that hands it back to its caller
#[derive(Debug)]
pub struct PendingNavigation<P> {
    pub request: NavigationRequest,
    turn: oneshot::Sender<Turn<P>>,
}

impl<P> PendingNavigation<P> {
    pub fn new(request: NavigationRequest) -> (Self, oneshot::Receiver<Turn<P>>) {
        let (turn, waiter) = oneshot::channel();
        (Self { request, turn }, waiter)
    }

    /// Give the request back to the waiting caller together with `permit`.
    ///
    /// Fails with the undelivered turn when the caller has gone away.
    pub fn hand_off(self, permit: P) -> Result<(), Turn<P>> {
        self.turn.send(Turn {
            request: self.request,
            permit,
        })
    }
}

/// Strict FIFO: no reordering, no deduplication
#[derive(Debug)]
pub struct TransitionQueue<P> {
    pending: VecDeque<PendingNavigation<P>>,
}

impl<P> Default for TransitionQueue<P> {
    fn default() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }
}

impl<P> TransitionQueue<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, pending: PendingNavigation<P>) {
        log::debug!(
            "Queued navigation #{} to '{}' ({} waiting)",
            pending.request.sequence,
            pending.request.view,
            self.pending.len() + 1
        );
        self.pending.push_back(pending);
    }

    pub fn dequeue(&mut self) -> Option<PendingNavigation<P>> {
        self.pending.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Ids of the queued requests, in run order
    pub fn views(&self) -> Vec<ViewId> {
        self.pending.iter().map(|p| p.request.view.clone()).collect()
    }

    /// Drop every waiter; their callers observe a closed channel
    pub fn clear(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }
}
