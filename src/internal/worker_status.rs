use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use crate::WorkerState;

/// Counters shared between publishers, the worker and the bus facade.
#[derive(Debug, Default)]
pub(crate) struct WorkerStatus {
    state: AtomicU8,
    pending: AtomicUsize,
}

impl WorkerStatus {
    #[inline]
    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set_state(&self, state: WorkerState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Envelopes published but not yet fully dispatched (or discarded).
    #[inline]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    #[inline]
    pub fn enqueued(&self) {
        self.pending.fetch_add(1, Ordering::AcqRel);
    }

    #[inline]
    pub fn settled(&self, count: usize) {
        self.pending.fetch_sub(count, Ordering::AcqRel);
    }
}
