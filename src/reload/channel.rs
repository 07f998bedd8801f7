//! Reload Rendezvous Channel
//!
//! A capacity-zero hand-off between `/_notify` and pending `/_wait` requests.
//!
//! A waiter *offers* a token on an unbuffered channel and blocks until a
//! notifier takes it. The notifier drains with `try_recv`, which only
//! succeeds when an offer is outstanding, so it never blocks and a notify
//! with nobody waiting leaves nothing behind.

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

/// How a [`ReloadChannel::wait`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// A notifier took this waiter's token.
    Notified,
    /// The channel was closed (server shutting down).
    Cancelled,
}

/// Single-slot rendezvous between reload notifiers and waiters.
pub struct ReloadChannel {
    tx: Sender<()>,
    rx: Receiver<()>,
    /// Dropped by `close()`; disconnecting `cancel_rx` wakes every waiter.
    cancel_tx: Mutex<Option<Sender<()>>>,
    cancel_rx: Receiver<()>,
}

impl Default for ReloadChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ReloadChannel {
    pub fn new() -> Self {
        let (tx, rx) = channel::bounded(0);
        let (cancel_tx, cancel_rx) = channel::bounded(0);
        Self {
            tx,
            rx,
            cancel_tx: Mutex::new(Some(cancel_tx)),
            cancel_rx,
        }
    }

    /// Block until a notifier takes this waiter's token.
    ///
    /// The offer is withdrawn once `close` disconnects the cancel channel.
    /// A waiter whose client went away stays parked until the next notify,
    /// which releases every ready waiter at once.
    pub fn wait(&self) -> WaitOutcome {
        channel::select! {
            send(self.tx, ()) -> res => match res {
                Ok(()) => WaitOutcome::Notified,
                // unreachable while `self.rx` is alive
                Err(_) => WaitOutcome::Cancelled,
            },
            recv(self.cancel_rx) -> _ => WaitOutcome::Cancelled,
        }
    }

    /// Release every waiter blocked in [`wait`](Self::wait) right now.
    ///
    /// Never blocks. Returns the number of waiters released; zero when nobody
    /// was waiting, in which case the signal is dropped.
    pub fn notify(&self) -> usize {
        let mut released = 0;
        while self.rx.try_recv().is_ok() {
            released += 1;
        }
        released
    }

    /// Cancel all current and future waits.
    pub fn close(&self) {
        self.cancel_tx.lock().take();
    }
}

// =============================================================================
// Tests
// =============================================================================
