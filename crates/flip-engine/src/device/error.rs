use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// High-level response after a surface error.
///
/// Every variant means the frame that hit the error is not drawn.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}

/// Counts wgpu validation errors reported to the device's uncaptured-error
/// handler.
///
/// On native backends the handler runs inside the failing call, so comparing
/// a [`checkpoint`](Self::checkpoint) before and after a creation call tells
/// whether that call failed.
#[derive(Debug, Clone, Default)]
pub struct ValidationErrors {
    count: Arc<AtomicU64>,
}

impl ValidationErrors {
    pub(crate) fn record(&self, error: &dyn fmt::Display) {
        self.count.fetch_add(1, Ordering::Relaxed);
        log::error!("wgpu: {error}");
    }

    pub fn checkpoint(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// True if an error was recorded after `checkpoint` was taken.
    pub fn failed_since(&self, checkpoint: u64) -> bool {
        self.checkpoint() != checkpoint
    }
}
