//! Displacement-keyed path lookup
//!
//! Built once at start-up and read-only afterwards, so it can be shared
//! across threads behind an `Arc` without locking.

use std::collections::HashMap;

use super::TrajectoryPath;

/// Paths bucketed by their integer displacement
#[derive(Debug, Clone, Default)]
pub struct TrajectoryIndex {
    buckets: HashMap<u32, Vec<TrajectoryPath>>,
    max_distance: u32,
    len: usize,
}

impl TrajectoryIndex {
    /// File every path under its displacement
    ///
    /// Paths at or beyond `max_distance` are dropped with a warning; the
    /// plausibility filter is expected to have removed them already.
    pub fn build<I>(paths: I, max_distance: u32) -> Self
    where
        I: IntoIterator<Item = TrajectoryPath>,
    {
        let mut index = Self {
            buckets: HashMap::new(),
            max_distance,
            len: 0,
        };

        for path in paths {
            let displacement = path.displacement();
            if displacement >= max_distance {
                log::warn!(
                    "Dropping path with displacement {} (ceiling is {})",
                    displacement,
                    max_distance
                );
                continue;
            }

            index.buckets.entry(displacement).or_default().push(path);
            index.len += 1;
        }

        log::debug!(
            "Indexed {} paths across {} distances",
            index.len,
            index.buckets.len()
        );

        index
    }

    /// Every path recorded with exactly this displacement
    ///
    /// Empty when nothing was recorded at `distance` or it is past the
    /// configured ceiling.
    pub fn lookup(&self, distance: u32) -> &[TrajectoryPath] {
        if distance >= self.max_distance {
            return &[];
        }

        self.buckets.get(&distance).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Exclusive upper bound on indexed displacements
    pub fn max_distance(&self) -> u32 {
        self.max_distance
    }

    /// Total number of indexed paths
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no path was indexed
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `(distance, path count)` for every populated bucket, by distance
    pub fn histogram(&self) -> Vec<(u32, usize)> {
        let mut counts: Vec<(u32, usize)> = self
            .buckets
            .iter()
            .map(|(&distance, paths)| (distance, paths.len()))
            .collect();
        counts.sort_unstable();
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::Sample;

    /// A straight horizontal path of the given length
    fn path_of_length(length: i32) -> TrajectoryPath {
        TrajectoryPath::from_samples(&[Sample::new(0, 0, 0), Sample::new(length, 0, 150)]).unwrap()
    }

    #[test]
    fn test_lookup_returns_bucket() {
        let index = TrajectoryIndex::build(
            vec![path_of_length(40), path_of_length(40), path_of_length(90)],
            1000,
        );

        assert_eq!(index.len(), 3);
        assert_eq!(index.lookup(40).len(), 2);
        assert_eq!(index.lookup(90).len(), 1);
    }

    #[test]
    fn test_lookup_missing_distance_is_empty() {
        let index = TrajectoryIndex::build(vec![path_of_length(40)], 1000);

        assert!(index.lookup(41).is_empty());
        assert!(index.lookup(0).is_empty());
        assert!(index.lookup(u32::MAX).is_empty());
    }

    #[test]
    fn test_empty_index() {
        let index = TrajectoryIndex::build(Vec::new(), 1000);

        assert!(index.is_empty());
        assert!(index.lookup(5).is_empty());
        assert!(index.histogram().is_empty());
    }

    #[test]
    fn test_paths_past_ceiling_are_dropped() {
        let index = TrajectoryIndex::build(
            vec![path_of_length(999), path_of_length(1000), path_of_length(1500)],
            1000,
        );

        assert_eq!(index.len(), 1);
        assert_eq!(index.lookup(999).len(), 1);
        assert!(index.lookup(1000).is_empty());
    }

    #[test]
    fn test_histogram_is_sorted() {
        let index = TrajectoryIndex::build(
            vec![path_of_length(90), path_of_length(12), path_of_length(90)],
            1000,
        );

        assert_eq!(index.histogram(), vec![(12, 1), (90, 2)]);
    }
}
