//! Dedicated move thread
//!
//! Runs moves one at a time on its own thread so the host is never blocked
//! by a replay and can cancel or time-bound the move in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::Rng;

use super::engine::{MovePlan, ReplayEngine};
use super::pacer::CancellablePacer;
use super::pointer::Pointer;
use super::ReplayError;

struct MoveJob {
    goal: (i32, i32),
    reply: Sender<Result<MovePlan, ReplayError>>,
}

/// Pending result of a queued move
pub struct MoveTicket {
    receiver: Receiver<Result<MovePlan, ReplayError>>,
}

impl MoveTicket {
    /// Block until the move finishes
    pub fn wait(self) -> Result<MovePlan, ReplayError> {
        self.receiver.recv().map_err(|_| ReplayError::WorkerGone)?
    }

    /// Wait at most `timeout`; `None` means the move is still running
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<MovePlan, ReplayError>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(ReplayError::WorkerGone)),
        }
    }
}

/// Owns a replay engine on a background thread
///
/// Moves are queued and run strictly in order, so two moves never
/// interleave on the same pointer.
pub struct MoveWorker {
    sender: Option<Sender<MoveJob>>,
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MoveWorker {
    /// Move the engine onto a new worker thread
    pub fn spawn<P, R>(mut engine: ReplayEngine<P, R>) -> Self
    where
        P: Pointer + Send + 'static,
        R: Rng + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel::<MoveJob>();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let handle = thread::spawn(move || {
            let mut pacer = CancellablePacer::new(Arc::clone(&flag));

            for job in receiver {
                let result = engine.move_to_with(job.goal, &mut pacer);
                if let Err(e) = &result {
                    log::warn!("Move to ({}, {}) failed: {}", job.goal.0, job.goal.1, e);
                }

                // A cancel only ever applies to the move it interrupted
                flag.store(false, Ordering::Release);
                let _ = job.reply.send(result);
            }

            log::debug!("Move worker stopped");
        });

        Self {
            sender: Some(sender),
            cancelled,
            handle: Some(handle),
        }
    }

    /// Queue a move to `goal`
    pub fn submit(&self, goal: (i32, i32)) -> MoveTicket {
        let (reply, receiver) = mpsc::channel();

        if let Some(sender) = &self.sender {
            // A send failure drops `reply`, which the ticket reports as WorkerGone
            let _ = sender.send(MoveJob { goal, reply });
        }

        MoveTicket { receiver }
    }

    /// Abort the move in flight at its next suspension point
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

impl Drop for MoveWorker {
    fn drop(&mut self) {
        self.cancel();
        self.sender.take();

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Move worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::pointer::VirtualPointer;
    use crate::trajectory::{Sample, TrajectoryIndex, TrajectoryPath};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Instant;

    /// Displacement-100 path that takes `step_ms * 4` to replay
    fn slow_path(step_ms: u64) -> TrajectoryPath {
        TrajectoryPath::from_samples(&[
            Sample::new(0, 0, 0),
            Sample::new(0, 25, step_ms),
            Sample::new(0, 50, step_ms * 2),
            Sample::new(0, 75, step_ms * 3),
            Sample::new(0, 100, step_ms * 4),
        ])
        .unwrap()
    }

    fn worker(step_ms: u64) -> MoveWorker {
        let index = Arc::new(TrajectoryIndex::build(vec![slow_path(step_ms)], 1000));
        let engine = ReplayEngine::new(index, VirtualPointer::at(0, 0), StdRng::seed_from_u64(9));
        MoveWorker::spawn(engine)
    }

    #[test]
    fn test_moves_run_in_order() {
        let worker = worker(5);

        let first = worker.submit((0, 100));
        let second = worker.submit((0, 200));

        let first = first.wait().unwrap();
        let second = second.wait().unwrap();

        assert_eq!(first.start, (0, 0));
        assert_eq!(second.start, (0, 100));
        assert_eq!(second.end(), Some((0, 200)));
    }

    #[test]
    fn test_failed_move_reports_error() {
        let worker = worker(5);

        let result = worker.submit((0, 37)).wait();
        assert!(matches!(result, Err(ReplayError::NoCandidatePath { distance: 37 })));

        // The worker keeps serving moves
        assert!(worker.submit((0, 100)).wait().is_ok());
    }

    #[test]
    fn test_cancel_stops_move_in_flight() {
        let worker = worker(2_000);
        let ticket = worker.submit((0, 100));

        assert!(ticket.wait_timeout(Duration::from_millis(50)).is_none());

        let start = Instant::now();
        worker.cancel();
        let result = ticket.wait();

        assert!(matches!(result, Err(ReplayError::Cancelled)));
        assert!(start.elapsed() < Duration::from_millis(1_500));
    }

    #[test]
    fn test_wait_timeout_returns_result() {
        let worker = worker(5);
        let ticket = worker.submit((0, 100));

        let result = ticket.wait_timeout(Duration::from_secs(5));
        assert!(matches!(result, Some(Ok(_))));
    }
}
