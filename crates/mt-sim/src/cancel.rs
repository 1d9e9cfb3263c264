//! Cooperative cancellation of a running tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag polled by the step executor between vehicles and at tick
/// boundaries.
///
/// Clones share the flag, so a token handed to another thread (or to a
/// driving model) can stop the simulation.  A tick interrupted during its
/// decision phase commits nothing; a cancel raised after that point takes
/// effect at the next tick boundary.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clear the flag so the simulation can be resumed.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}
