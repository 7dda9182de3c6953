//! Suspension points between replayed steps
//!
//! Every delay in a replay goes through a `Pacer`, so a host can decide
//! whether a move blocks, can be cancelled, or only records its timing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::ReplayError;

/// Waits between consecutive pointer moves
pub trait Pacer {
    /// Suspend for `delay_ms` milliseconds
    fn pause(&mut self, delay_ms: u64) -> Result<(), ReplayError>;
}

/// Blocks the calling thread for the full delay
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, delay_ms: u64) -> Result<(), ReplayError> {
        if delay_ms > 0 {
            thread::sleep(Duration::from_millis(delay_ms));
        }
        Ok(())
    }
}

/// Sleeps in short slices and aborts once the shared flag is raised
#[derive(Debug, Clone)]
pub struct CancellablePacer {
    cancelled: Arc<AtomicBool>,
    slice: Duration,
}

impl CancellablePacer {
    /// Create a pacer watching the given flag
    pub fn new(cancelled: Arc<AtomicBool>) -> Self {
        Self {
            cancelled,
            slice: Duration::from_millis(5),
        }
    }

    fn check(&self) -> Result<(), ReplayError> {
        if self.cancelled.load(Ordering::Acquire) {
            Err(ReplayError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Pacer for CancellablePacer {
    fn pause(&mut self, delay_ms: u64) -> Result<(), ReplayError> {
        let mut remaining = Duration::from_millis(delay_ms);

        self.check()?;
        while !remaining.is_zero() {
            let step = remaining.min(self.slice);
            thread::sleep(step);
            remaining -= step;
            self.check()?;
        }

        Ok(())
    }
}

/// Records requested delays without sleeping
#[derive(Debug, Clone, Default)]
pub struct RecordingPacer {
    pauses: Vec<u64>,
}

impl RecordingPacer {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delay requested so far
    pub fn pauses(&self) -> &[u64] {
        &self.pauses
    }

    /// Sum of all requested delays
    pub fn total_ms(&self) -> u64 {
        self.pauses.iter().sum()
    }
}

impl Pacer for RecordingPacer {
    fn pause(&mut self, delay_ms: u64) -> Result<(), ReplayError> {
        self.pauses.push(delay_ms);
        Ok(())
    }
}
