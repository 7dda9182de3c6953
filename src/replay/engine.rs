//! Humanized cursor moves from recorded paths

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::pacer::{Pacer, ThreadPacer};
use super::pointer::Pointer;
use super::ReplayError;
use crate::trajectory::{PathPoint, TrajectoryIndex, TrajectoryPath};

/// Rounded Euclidean distance between two screen positions
pub fn distance_between(from: (i32, i32), to: (i32, i32)) -> u32 {
    let dx = f64::from(to.0) - f64::from(from.0);
    let dy = f64::from(to.1) - f64::from(from.1);
    dx.hypot(dy).round() as u32
}

/// Direction from one screen position to another, in radians
pub fn direction_between(from: (i32, i32), to: (i32, i32)) -> f64 {
    let dx = f64::from(to.0) - f64::from(from.0);
    let dy = f64::from(to.1) - f64::from(from.1);
    dy.atan2(dx)
}

/// How a recorded path is reoriented toward the goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// Scale the X offset by cos(direction) and the Y offset by
    /// sin(direction) independently, truncating to whole pixels.
    ///
    /// This is not a rotation: at cardinal directions one axis of the
    /// recorded path vanishes entirely.
    #[default]
    DirectionalScaling,
    /// Rotate the path by the angle between its own direction and the
    /// move direction, rounding to whole pixels
    Rotation,
}

impl Projection {
    /// Absolute screen position for one point of `path`
    pub fn project(
        self,
        start: (i32, i32),
        direction: f64,
        path: &TrajectoryPath,
        point: &PathPoint,
    ) -> (i32, i32) {
        let (x0, y0) = (f64::from(start.0), f64::from(start.1));
        let (dx, dy) = (f64::from(point.dx), f64::from(point.dy));

        match self {
            Projection::DirectionalScaling => {
                let x = x0 + direction.cos() * dx;
                let y = y0 + direction.sin() * dy;
                (x as i32, y as i32)
            }
            Projection::Rotation => {
                let (sin, cos) = (direction - path.direction()).sin_cos();
                let x = x0 + dx * cos - dy * sin;
                let y = y0 + dx * sin + dy * cos;
                (x.round() as i32, y.round() as i32)
            }
        }
    }
}

/// Where the delay after each replayed point comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum ReplayTiming {
    /// Reproduce each point's recorded post delay
    #[default]
    Recorded,
    /// Wait a fixed interval after every point
    FixedInterval { step_ms: u64 },
}

impl ReplayTiming {
    /// Delay to wait after reaching `point`
    pub fn delay_for(self, point: &PathPoint) -> u64 {
        match self {
            ReplayTiming::Recorded => point.post_delay_ms,
            ReplayTiming::FixedInterval { step_ms } => step_ms,
        }
    }
}

/// One absolute position of a replayed move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStep {
    pub x: i32,
    pub y: i32,
    /// Time to wait after moving here
    pub delay_ms: u64,
}

/// A fully computed move, ready to execute
#[derive(Debug, Clone, PartialEq)]
pub struct MovePlan {
    /// Live cursor position the move starts from
    pub start: (i32, i32),
    /// Requested goal
    pub goal: (i32, i32),
    /// Rounded distance from start to goal
    pub distance: u32,
    /// Direction from start to goal, in radians
    pub direction: f64,
    /// Number of recorded paths the selection was made from
    pub candidates: usize,
    /// Absolute positions in replay order
    pub steps: Vec<ReplayStep>,
}

impl MovePlan {
    /// Sum of all step delays
    pub fn total_delay_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.delay_ms).sum()
    }

    /// Final position of the move
    pub fn end(&self) -> Option<(i32, i32)> {
        self.steps.last().map(|s| (s.x, s.y))
    }

    /// Absolute positions without timing
    pub fn positions(&self) -> Vec<(i32, i32)> {
        self.steps.iter().map(|s| (s.x, s.y)).collect()
    }
}

/// Replays recorded paths through a pointer
///
/// Holds at most one move in flight: every method takes `&mut self`, so
/// sharing an engine between threads requires a lock around it.
pub struct ReplayEngine<P, R = StdRng> {
    index: Arc<TrajectoryIndex>,
    pointer: P,
    rng: R,
    timing: ReplayTiming,
    projection: Projection,
}

impl<P: Pointer, R: Rng> ReplayEngine<P, R> {
    /// Create an engine selecting paths with the given random source
    pub fn new(index: Arc<TrajectoryIndex>, pointer: P, rng: R) -> Self {
        Self {
            index,
            pointer,
            rng,
            timing: ReplayTiming::default(),
            projection: Projection::default(),
        }
    }

    /// Set where step delays come from
    pub fn with_timing(mut self, timing: ReplayTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Set how paths are reoriented
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// The index paths are selected from
    pub fn index(&self) -> &TrajectoryIndex {
        &self.index
    }

    /// The pointer being driven
    pub fn pointer(&self) -> &P {
        &self.pointer
    }

    /// Mutable access to the pointer being driven
    pub fn pointer_mut(&mut self) -> &mut P {
        &mut self.pointer
    }

    /// Select a path for `start -> goal` and compute its absolute positions
    ///
    /// Only an exact distance match is used. An empty bucket yields
    /// `NoCandidatePath` without touching the pointer.
    pub fn plan(&mut self, start: (i32, i32), goal: (i32, i32)) -> Result<MovePlan, ReplayError> {
        let distance = distance_between(start, goal);
        let direction = direction_between(start, goal);
        let (projection, timing) = (self.projection, self.timing);

        let candidates = self.index.lookup(distance);
        let path = candidates
            .choose(&mut self.rng)
            .ok_or(ReplayError::NoCandidatePath { distance })?;

        let steps = path
            .points()
            .iter()
            .map(|point| {
                let (x, y) = projection.project(start, direction, path, point);
                ReplayStep {
                    x,
                    y,
                    delay_ms: timing.delay_for(point),
                }
            })
            .collect();

        Ok(MovePlan {
            start,
            goal,
            distance,
            direction,
            candidates: candidates.len(),
            steps,
        })
    }

    /// Move from the live cursor position to `goal`, blocking for the
    /// path's duration
    pub fn move_to(&mut self, goal: (i32, i32)) -> Result<MovePlan, ReplayError> {
        self.move_to_with(goal, &mut ThreadPacer)
    }

    /// Move from the live cursor position to `goal`, suspending through
    /// `pacer` between steps
    pub fn move_to_with<T>(&mut self, goal: (i32, i32), pacer: &mut T) -> Result<MovePlan, ReplayError>
    where
        T: Pacer + ?Sized,
    {
        let start = self.pointer.position()?;
        let plan = self.plan(start, goal)?;

        log::debug!(
            "Moving from ({}, {}) to ({}, {}) in {:.1} degree direction, {} candidates at distance {}",
            start.0,
            start.1,
            goal.0,
            goal.1,
            plan.direction.to_degrees(),
            plan.candidates,
            plan.distance
        );

        self.execute(&plan, pacer)?;
        Ok(plan)
    }

    /// Drive the pointer through a computed plan
    pub fn execute<T>(&mut self, plan: &MovePlan, pacer: &mut T) -> Result<(), ReplayError>
    where
        T: Pacer + ?Sized,
    {
        for step in &plan.steps {
            self.pointer.move_to(step.x, step.y)?;
            pacer.pause(step.delay_ms)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::pacer::RecordingPacer;
    use crate::replay::pointer::{PointerError, VirtualPointer};
    use crate::trajectory::Sample;
    use rand::SeedableRng;
    use std::f64::consts::FRAC_PI_2;

    /// Five points ending at (60, 80): displacement 100, 50 ms apart
    fn path_of_100() -> TrajectoryPath {
        TrajectoryPath::from_samples(&[
            Sample::new(0, 0, 0),
            Sample::new(10, 0, 50),
            Sample::new(20, 30, 100),
            Sample::new(40, 60, 150),
            Sample::new(60, 80, 200),
        ])
        .unwrap()
    }

    /// A second displacement-100 path heading straight right
    fn straight_100() -> TrajectoryPath {
        TrajectoryPath::from_samples(&[
            Sample::new(0, 0, 0),
            Sample::new(30, 0, 40),
            Sample::new(100, 0, 120),
        ])
        .unwrap()
    }

    fn engine_with(
        paths: Vec<TrajectoryPath>,
        pointer: VirtualPointer,
        seed: u64,
    ) -> ReplayEngine<VirtualPointer> {
        let index = Arc::new(TrajectoryIndex::build(paths, 1000));
        ReplayEngine::new(index, pointer, StdRng::seed_from_u64(seed))
    }

    struct BrokenPointer;

    impl Pointer for BrokenPointer {
        fn position(&mut self) -> Result<(i32, i32), PointerError> {
            Err(PointerError::Position("display closed".into()))
        }

        fn move_to(&mut self, x: i32, y: i32) -> Result<(), PointerError> {
            Err(PointerError::Move {
                x,
                y,
                reason: "display closed".into(),
            })
        }
    }

    #[test]
    fn test_distance_and_direction() {
        assert_eq!(distance_between((100, 100), (100, 200)), 100);
        assert_eq!(distance_between((0, 0), (3, 4)), 5);
        assert_eq!(distance_between((0, 0), (1, 1)), 1);
        assert!((direction_between((100, 100), (100, 200)) - FRAC_PI_2).abs() < 1e-12);
        assert_eq!(direction_between((0, 0), (10, 0)), 0.0);
    }

    #[test]
    fn test_vertical_move_drops_x_offsets() {
        let mut engine = engine_with(vec![path_of_100()], VirtualPointer::at(100, 100), 7);

        let plan = engine.plan((100, 100), (100, 200)).unwrap();

        assert_eq!(plan.distance, 100);
        assert!((plan.direction - FRAC_PI_2).abs() < 1e-12);
        assert_eq!(plan.candidates, 1);
        assert_eq!(
            plan.positions(),
            vec![(100, 100), (100, 100), (100, 130), (100, 160), (100, 180)]
        );
    }

    #[test]
    fn test_horizontal_move_drops_y_offsets() {
        let mut engine = engine_with(vec![path_of_100()], VirtualPointer::default(), 7);

        let plan = engine.plan((100, 100), (200, 100)).unwrap();

        assert_eq!(
            plan.positions(),
            vec![(100, 100), (110, 100), (120, 100), (140, 100), (160, 100)]
        );
    }

    #[test]
    fn test_rotation_ends_on_goal() {
        let mut engine = engine_with(vec![path_of_100()], VirtualPointer::default(), 7)
            .with_projection(Projection::Rotation);

        let plan = engine.plan((100, 100), (200, 100)).unwrap();

        assert_eq!(plan.steps[0], ReplayStep { x: 100, y: 100, delay_ms: 50 });
        assert_eq!(plan.end(), Some((200, 100)));
    }

    #[test]
    fn test_move_drives_pointer_with_recorded_delays() {
        let mut engine = engine_with(vec![path_of_100()], VirtualPointer::at(100, 100), 7);
        let mut pacer = RecordingPacer::new();

        let plan = engine.move_to_with((100, 200), &mut pacer).unwrap();

        assert_eq!(engine.pointer().history(), plan.positions().as_slice());
        assert_eq!(pacer.pauses(), &[50, 50, 50, 50, 0]);
        assert_eq!(plan.total_delay_ms(), 200);
    }

    #[test]
    fn test_fixed_interval_timing() {
        let mut engine = engine_with(vec![path_of_100()], VirtualPointer::at(100, 100), 7)
            .with_timing(ReplayTiming::FixedInterval { step_ms: 50 });
        let mut pacer = RecordingPacer::new();

        engine.move_to_with((100, 200), &mut pacer).unwrap();

        assert_eq!(pacer.pauses(), &[50; 5]);
    }

    #[test]
    fn test_repeated_move_is_deterministic_with_single_candidate() {
        let mut engine = engine_with(vec![path_of_100()], VirtualPointer::at(300, 300), 1);

        let first = engine.move_to_with((360, 380), &mut RecordingPacer::new()).unwrap();
        let first_history = engine.pointer().history().to_vec();

        engine.pointer_mut().move_to(300, 300).unwrap();
        engine.pointer_mut().clear_history();

        let second = engine.move_to_with((360, 380), &mut RecordingPacer::new()).unwrap();

        assert_eq!(first.steps, second.steps);
        assert_eq!(first_history, engine.pointer().history());
    }

    #[test]
    fn test_seeded_selection_is_reproducible() {
        let pick = |seed| {
            let mut engine =
                engine_with(vec![path_of_100(), straight_100()], VirtualPointer::default(), seed);
            (0..10)
                .map(|_| engine.plan((0, 0), (100, 0)).unwrap().steps.len())
                .collect::<Vec<_>>()
        };

        assert_eq!(pick(42), pick(42));
    }

    #[test]
    fn test_selection_uses_every_candidate() {
        let mut engine =
            engine_with(vec![path_of_100(), straight_100()], VirtualPointer::default(), 3);

        let lengths: Vec<usize> = (0..200)
            .map(|_| engine.plan((0, 0), (100, 0)).unwrap().steps.len())
            .collect();

        assert!(lengths.contains(&5));
        assert!(lengths.contains(&3));
    }

    #[test]
    fn test_missing_distance_is_recoverable() {
        let mut engine = engine_with(vec![path_of_100()], VirtualPointer::at(0, 0), 7);

        let err = engine
            .move_to_with((0, 99), &mut RecordingPacer::new())
            .unwrap_err();
        assert!(matches!(err, ReplayError::NoCandidatePath { distance: 99 }));
        assert!(engine.pointer().history().is_empty());

        // The engine stays usable after a failed move
        assert!(engine.move_to_with((0, 100), &mut RecordingPacer::new()).is_ok());
    }

    #[test]
    fn test_distance_past_ceiling_has_no_candidates() {
        let mut engine = engine_with(vec![path_of_100()], VirtualPointer::default(), 7);

        let err = engine.plan((0, 0), (5000, 0)).unwrap_err();
        assert!(matches!(err, ReplayError::NoCandidatePath { distance: 5000 }));
    }

    #[test]
    fn test_pointer_failure_aborts_move() {
        let index = Arc::new(TrajectoryIndex::build(vec![path_of_100()], 1000));
        let mut engine = ReplayEngine::new(index, BrokenPointer, StdRng::seed_from_u64(7));

        let err = engine.move_to((0, 100)).unwrap_err();
        assert!(matches!(err, ReplayError::Pointer(PointerError::Position(_))));
    }
}
