//! Busy flags gating re-entrant requests.
//!
//! A [`BusyFlag`] is acquired for the duration of one request; the returned
//! [`BusyGuard`] clears it on drop, including when the request future is
//! dropped mid-flight. Whether Upload shares the Run flag is decided by the
//! session's [`ConcurrencyPolicy`].
//!
//! [`OnCancel`] covers the other half of a dropped request: it restores the
//! visible state (run phase, upload status) that the request left mid-way.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// How Upload and Run requests interact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyPolicy {
    /// Run is gated against re-entry only. An upload may be in flight at the
    /// same time as a run, and the two may write the config store in either
    /// order.
    #[default]
    Independent,
    /// Upload and Run share one gate; at most one request is in flight.
    Serialized,
}

/// A shareable "request in flight" flag.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    /// Creates an idle flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag, or returns `None` if it is already set.
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(Arc::clone(&self.0)))
    }

    /// Returns `true` while a guard is held.
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Clears its [`BusyFlag`] when dropped.
#[derive(Debug)]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs a closure on drop unless [`OnCancel::disarm`] was called first.
///
/// Armed while a request future is awaiting the service, so a future dropped
/// by `select!`, a timeout or task abort still leaves an idle state behind.
pub(crate) struct OnCancel<F: FnOnce()>(Option<F>);

impl<F: FnOnce()> OnCancel<F> {
    pub(crate) fn new(on_cancel: F) -> Self {
        Self(Some(on_cancel))
    }

    /// The request resolved; nothing to undo.
    pub(crate) fn disarm(mut self) {
        self.0 = None;
    }
}

impl<F: FnOnce()> Drop for OnCancel<F> {
    fn drop(&mut self) {
        if let Some(on_cancel) = self.0.take() {
            on_cancel();
        }
    }
}
