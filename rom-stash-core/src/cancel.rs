//! Cooperative cancellation.
//!
//! Long iterations (directory walks, archive entry loops, per-game
//! reconciliation) poll the process-wide flag between items and stop
//! cleanly, releasing streams and removing staging files on the way out.
//! The flag is typically raised from a signal handler.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::StashError;

static CANCELLED: AtomicBool = AtomicBool::new(false);

/// Raise the cancellation flag. Safe to call from a signal handler.
pub fn request_cancel() {
    CANCELLED.store(true, Ordering::SeqCst);
}

/// Lower the flag again (a new top-level operation may start).
pub fn reset_cancel() {
    CANCELLED.store(false, Ordering::SeqCst);
}

pub fn cancelled() -> bool {
    CANCELLED.load(Ordering::SeqCst)
}

/// Error out of the current iteration when cancellation was requested.
pub fn check_cancelled() -> Result<(), StashError> {
    if cancelled() {
        Err(StashError::Cancelled)
    } else {
        Ok(())
    }
}
