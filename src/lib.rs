//! Ghost Cursor - human cursor movement from recorded trajectories
//!
//! This library moves an on-screen cursor by replaying pre-recorded human
//! pointer paths, reoriented toward the requested goal, so automated input
//! carries the timing and jitter of real hand movement.
//!
//! ## Pipeline
//!
//! A recording of `x,y,elapsed_ms` samples is split into movements at every
//! dwell (`trajectory::PathSegmenter`), filtered for plausibility, and filed
//! by displacement (`trajectory::TrajectoryIndex`). Each move request picks
//! a path recorded at exactly the requested distance and replays it
//! (`replay::ReplayEngine`).

pub mod config;
pub mod replay;
pub mod trajectory;
pub mod vision;

use once_cell::sync::OnceCell;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};

use crate::config::{ConfigError, Settings};
use crate::replay::{MovePlan, Pointer, ReplayEngine, ReplayError};
use crate::trajectory::{PathSegmenter, TrajectoryError, TrajectoryIndex};
use crate::vision::{InventoryLayout, InventorySlot, VisionError};

/// Top-level error type
#[derive(Debug, thiserror::Error)]
pub enum GhostError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),
    #[error(transparent)]
    Replay(#[from] ReplayError),
    #[error(transparent)]
    Vision(#[from] VisionError),
}

/// Settings, path index and replay engine wired together
pub struct GhostCursor<P> {
    pub settings: Settings,
    engine: ReplayEngine<P, StdRng>,
}

impl<P: Pointer> GhostCursor<P> {
    /// Load the configured recording and build the path index
    ///
    /// An unreadable recording is fatal. A recording without usable paths
    /// is not: every move will simply report `NoCandidatePath`.
    pub fn load(settings: Settings, pointer: P) -> Result<Self, GhostError> {
        settings.validate()?;

        let report = PathSegmenter::from_settings(&settings).load(&settings.recording_path)?;
        if report.paths.is_empty() {
            log::warn!("No usable paths in {}", settings.recording_path.display());
        }

        let index = TrajectoryIndex::build(report.paths, settings.max_distance);
        Ok(Self::with_index(settings, Arc::new(index), pointer))
    }

    /// Wire an already built index
    pub fn with_index(settings: Settings, index: Arc<TrajectoryIndex>, pointer: P) -> Self {
        let rng = match settings.replay.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let engine = ReplayEngine::new(index, pointer, rng)
            .with_timing(settings.replay.timing)
            .with_projection(settings.replay.projection);

        Self { settings, engine }
    }

    /// The path index moves are selected from
    pub fn index(&self) -> &TrajectoryIndex {
        self.engine.index()
    }

    /// The underlying replay engine
    pub fn engine_mut(&mut self) -> &mut ReplayEngine<P, StdRng> {
        &mut self.engine
    }

    /// Hand the engine over, e.g. to a `replay::MoveWorker`
    pub fn into_engine(self) -> ReplayEngine<P, StdRng> {
        self.engine
    }

    /// Compute a move without driving the pointer
    pub fn plan(&mut self, start: (i32, i32), goal: (i32, i32)) -> Result<MovePlan, ReplayError> {
        self.engine.plan(start, goal)
    }

    /// Move the cursor to an absolute position
    pub fn move_to(&mut self, x: i32, y: i32) -> Result<MovePlan, ReplayError> {
        self.engine.move_to((x, y))
    }

    /// Move the cursor to the centre of an inventory slot
    pub fn move_to_slot(
        &mut self,
        layout: &InventoryLayout,
        slot: InventorySlot,
    ) -> Result<MovePlan, GhostError> {
        let (x, y) = layout.slot_center(slot)?;
        Ok(self.move_to(x, y)?)
    }
}

/// Cursor type held by the process-wide instance
pub type SharedCursor = GhostCursor<Box<dyn Pointer + Send>>;

/// Global cursor instance; the mutex keeps moves from interleaving
static CURSOR_INSTANCE: OnceCell<Mutex<SharedCursor>> = OnceCell::new();

/// Install the global cursor instance, returning false if one exists
pub fn init_cursor(cursor: SharedCursor) -> bool {
    CURSOR_INSTANCE.set(Mutex::new(cursor)).is_ok()
}

/// Get a reference to the global cursor instance
pub fn get_cursor() -> Option<&'static Mutex<SharedCursor>> {
    CURSOR_INSTANCE.get()
}
