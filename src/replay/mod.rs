//! Trajectory replay
//!
//! Picks a recorded path matching the requested move distance, reorients it
//! toward the goal and walks the pointer through it with the recorded timing.

pub mod engine;
pub mod pacer;
pub mod pointer;
pub mod worker;

pub use engine::{
    direction_between, distance_between, MovePlan, Projection, ReplayEngine, ReplayStep,
    ReplayTiming,
};
pub use pacer::{CancellablePacer, Pacer, RecordingPacer, ThreadPacer};
pub use pointer::{Pointer, PointerError, VirtualPointer};
#[cfg(feature = "desktop")]
pub use pointer::DesktopPointer;
pub use worker::{MoveTicket, MoveWorker};

/// Replay errors
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// Nothing was recorded at this exact distance; retry later or pick
    /// another goal
    #[error("No recorded path for distance {distance}")]
    NoCandidatePath { distance: u32 },
    #[error("Pointer failure: {0}")]
    Pointer(#[from] PointerError),
    #[error("Move cancelled")]
    Cancelled,
    #[error("Move worker is no longer running")]
    WorkerGone,
}

impl ReplayError {
    /// Whether the caller can reasonably try the same move again
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ReplayError::NoCandidatePath { .. } | ReplayError::Cancelled)
    }
}
