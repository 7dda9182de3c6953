//! Normalized trajectory paths
//!
//! A `TrajectoryPath` is one accepted movement segment re-expressed relative
//! to its first sample, with forward per-step delays.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Sample;

/// One step of a path, relative to the path's first sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathPoint {
    /// X offset from the first sample
    pub dx: i32,
    /// Y offset from the first sample
    pub dy: i32,
    /// Time to wait after reaching this point before the next one
    pub post_delay_ms: u64,
}

/// An immutable, origin-anchored recorded movement
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryPath {
    points: Vec<PathPoint>,
    total_delay_ms: u64,
    displacement: u32,
    direction: f64,
}

impl TrajectoryPath {
    /// Build a path from a closed segment of raw samples
    ///
    /// The first sample becomes the local origin. Each point's delay is the
    /// time until the next sample; the last point waits 0 ms. Returns `None`
    /// for an empty segment.
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        let first = samples.first()?;

        let points: Vec<PathPoint> = samples
            .iter()
            .enumerate()
            .map(|(i, sample)| {
                let post_delay_ms = samples
                    .get(i + 1)
                    .map_or(0, |next| next.elapsed_ms.saturating_sub(sample.elapsed_ms));

                PathPoint {
                    dx: sample.x.saturating_sub(first.x),
                    dy: sample.y.saturating_sub(first.y),
                    post_delay_ms,
                }
            })
            .collect();

        let last = *points.last()?;
        let (dx, dy) = (f64::from(last.dx), f64::from(last.dy));

        Some(Self {
            total_delay_ms: points.iter().map(|p| p.post_delay_ms).sum(),
            displacement: dx.hypot(dy).round() as u32,
            direction: dy.atan2(dx),
            points,
        })
    }

    /// All points in recorded order
    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    /// Number of points in the path
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Sum of every point's post delay
    pub fn total_delay_ms(&self) -> u64 {
        self.total_delay_ms
    }

    /// Rounded straight-line distance from the first to the last point
    pub fn displacement(&self) -> u32 {
        self.displacement
    }

    /// Direction of the last point from the origin, in radians
    pub fn direction(&self) -> f64 {
        self.direction
    }

    /// Final point of the path
    pub fn end(&self) -> PathPoint {
        // Construction guarantees at least one point.
        self.points[self.points.len() - 1]
    }
}

impl fmt::Display for TrajectoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Length: {}, Timespan: {}ms, Distance: {}, Direction: {:.1}°",
            self.point_count(),
            self.total_delay_ms,
            self.displacement,
            self.direction.to_degrees()
        )
    }
}

/// Why a candidate path was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Total delay outside the duration window
    Duration(u64),
    /// Displacement outside the distance window
    Displacement(u32),
    /// Point count outside the density window
    PointCount(usize),
}

/// Plausibility windows a path must fall strictly inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathFilter {
    /// Lower bound on total delay (exclusive)
    pub min_delay_ms: u64,
    /// Upper bound on total delay (exclusive)
    pub max_delay_ms: u64,
    /// Lower bound on displacement (exclusive)
    pub min_displacement: u32,
    /// Upper bound on displacement (exclusive)
    pub max_displacement: u32,
    /// Lower bound on point count (exclusive)
    pub min_points: usize,
    /// Upper bound on point count (exclusive)
    pub max_points: usize,
}

impl Default for PathFilter {
    fn default() -> Self {
        Self {
            min_delay_ms: 100,
            max_delay_ms: 400,
            min_displacement: 5,
            max_displacement: 1000,
            min_points: 5,
            max_points: 50,
        }
    }
}

impl PathFilter {
    /// A filter that lets every non-empty path through
    pub fn permissive() -> Self {
        Self {
            min_delay_ms: 0,
            max_delay_ms: u64::MAX,
            min_displacement: 0,
            max_displacement: u32::MAX,
            min_points: 0,
            max_points: usize::MAX,
        }
    }

    /// Check a path against every window
    pub fn check(&self, path: &TrajectoryPath) -> Result<(), Rejection> {
        let delay = path.total_delay_ms();
        if !(self.min_delay_ms < delay && delay < self.max_delay_ms) {
            return Err(Rejection::Duration(delay));
        }

        let displacement = path.displacement();
        if !(self.min_displacement < displacement && displacement < self.max_displacement) {
            return Err(Rejection::Displacement(displacement));
        }

        let count = path.point_count();
        if !(self.min_points < count && count < self.max_points) {
            return Err(Rejection::PointCount(count));
        }

        Ok(())
    }

    /// Whether a path passes every window
    pub fn accepts(&self, path: &TrajectoryPath) -> bool {
        self.check(path).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(raw: &[(i32, i32, u64)]) -> Vec<Sample> {
        raw.iter().map(|&(x, y, t)| Sample::new(x, y, t)).collect()
    }

    /// Seven points, 60 px right and 80 px down over 180 ms
    fn plausible_path() -> TrajectoryPath {
        TrajectoryPath::from_samples(&samples(&[
            (200, 300, 1000),
            (205, 305, 1030),
            (215, 318, 1060),
            (230, 340, 1090),
            (245, 358, 1120),
            (255, 372, 1150),
            (260, 380, 1180),
        ]))
        .unwrap()
    }

    #[test]
    fn test_empty_segment_has_no_path() {
        assert!(TrajectoryPath::from_samples(&[]).is_none());
    }

    #[test]
    fn test_points_are_origin_relative() {
        let path = plausible_path();

        let first = path.points()[0];
        assert_eq!((first.dx, first.dy), (0, 0));
        assert_eq!((path.end().dx, path.end().dy), (60, 80));
    }

    #[test]
    fn test_delays_are_forward_deltas() {
        let path = TrajectoryPath::from_samples(&samples(&[
            (0, 0, 100),
            (1, 0, 120),
            (2, 0, 170),
        ]))
        .unwrap();

        let delays: Vec<u64> = path.points().iter().map(|p| p.post_delay_ms).collect();
        assert_eq!(delays, vec![20, 50, 0]);
        assert_eq!(path.total_delay_ms(), 70);
    }

    #[test]
    fn test_summary_statistics() {
        let path = plausible_path();

        assert_eq!(path.point_count(), 7);
        assert_eq!(path.displacement(), 100);
        assert_eq!(path.total_delay_ms(), 180);
        assert!((path.direction() - 80f64.atan2(60.0)).abs() < 1e-12);
    }

    #[test]
    fn test_displacement_is_rounded() {
        // hypot(1, 1) = 1.414 rounds down, hypot(2, 3) = 3.606 rounds up
        let down = TrajectoryPath::from_samples(&samples(&[(0, 0, 0), (1, 1, 10)])).unwrap();
        let up = TrajectoryPath::from_samples(&samples(&[(0, 0, 0), (2, 3, 10)])).unwrap();

        assert_eq!(down.displacement(), 1);
        assert_eq!(up.displacement(), 4);
    }

    #[test]
    fn test_non_monotonic_time_clamps_to_zero() {
        let path = TrajectoryPath::from_samples(&samples(&[(0, 0, 50), (3, 4, 20)])).unwrap();

        assert_eq!(path.points()[0].post_delay_ms, 0);
        assert_eq!(path.total_delay_ms(), 0);
    }

    #[test]
    fn test_filter_accepts_plausible_path() {
        assert!(PathFilter::default().accepts(&plausible_path()));
    }

    #[test]
    fn test_filter_windows_are_exclusive() {
        // Exactly 100 ms total is outside the (100, 400) window
        let path = TrajectoryPath::from_samples(&samples(&[
            (0, 0, 0),
            (5, 5, 20),
            (10, 10, 40),
            (15, 15, 60),
            (20, 20, 80),
            (25, 25, 100),
        ]))
        .unwrap();

        assert_eq!(
            PathFilter::default().check(&path),
            Err(Rejection::Duration(100))
        );
    }

    #[test]
    fn test_filter_rejects_sparse_path() {
        // The two-point path from a short hop: 5 px in 30 ms
        let path = TrajectoryPath::from_samples(&samples(&[(0, 0, 0), (3, 4, 30)])).unwrap();
        let filter = PathFilter {
            min_delay_ms: 0,
            min_displacement: 0,
            ..PathFilter::default()
        };

        assert_eq!(filter.check(&path), Err(Rejection::PointCount(2)));
    }

    #[test]
    fn test_display_summary() {
        let text = plausible_path().to_string();
        assert!(text.starts_with("Length: 7, Timespan: 180ms, Distance: 100"));
    }
}
