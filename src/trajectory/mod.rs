//! Recorded trajectory handling
//!
//! Turns a raw cursor recording into normalized, origin-relative paths and
//! files them by displacement so the replay engine can find one quickly.

pub mod index;
pub mod path;
pub mod segmenter;

use std::path::PathBuf;

pub use index::TrajectoryIndex;
pub use path::{PathFilter, PathPoint, Rejection, TrajectoryPath};
pub use segmenter::{parse_sample, PathSegmenter, SegmentReport};

/// One recorded cursor observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Screen X coordinate
    pub x: i32,
    /// Screen Y coordinate
    pub y: i32,
    /// Milliseconds since the recording started
    pub elapsed_ms: u64,
}

impl Sample {
    /// The implicit sample every recording starts from
    pub const ORIGIN: Sample = Sample {
        x: 0,
        y: 0,
        elapsed_ms: 0,
    };

    /// Create a new sample
    pub fn new(x: i32, y: i32, elapsed_ms: u64) -> Self {
        Self { x, y, elapsed_ms }
    }

    /// Whether both samples sit on the same pixel, ignoring time
    pub fn same_position(&self, other: &Sample) -> bool {
        self.x == other.x && self.y == other.y
    }
}

/// Errors raised while loading a recording
#[derive(Debug, thiserror::Error)]
pub enum TrajectoryError {
    #[error("Failed to read recording {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_position_ignores_time() {
        let a = Sample::new(10, 20, 0);
        let b = Sample::new(10, 20, 500);
        let c = Sample::new(11, 20, 0);

        assert!(a.same_position(&b));
        assert!(!a.same_position(&c));
    }

    #[test]
    fn test_unreadable_error_names_path() {
        let err = TrajectoryError::Unreadable {
            path: PathBuf::from("/missing/coordinates.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };

        assert!(err.to_string().contains("/missing/coordinates.txt"));
    }
}
