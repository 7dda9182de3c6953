//! Recording segmentation
//!
//! Splits a stream of samples into movement segments. A segment closes when
//! the cursor dwells on one pixel for `dwell_threshold` consecutive samples;
//! whatever is still open at the end of the recording is discarded.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::path::{PathFilter, Rejection, TrajectoryPath};
use super::{Sample, TrajectoryError};
use crate::config::Settings;

/// `x,y,elapsed_ms` with optional surrounding whitespace
static SAMPLE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(-?\d+),(-?\d+),(\d+)\s*$").unwrap());

/// Parse one recording line, returning `None` for anything malformed
pub fn parse_sample(line: &str) -> Option<Sample> {
    let caps = SAMPLE_LINE.captures(line)?;

    Some(Sample {
        x: caps[1].parse().ok()?,
        y: caps[2].parse().ok()?,
        elapsed_ms: caps[3].parse().ok()?,
    })
}

/// Outcome of segmenting one recording
#[derive(Debug, Clone, Default)]
pub struct SegmentReport {
    /// Paths that passed the plausibility filter
    pub paths: Vec<TrajectoryPath>,
    /// Lines read from the input
    pub lines_read: usize,
    /// Lines skipped as malformed
    pub lines_skipped: usize,
    /// Segments closed by a dwell
    pub candidates: usize,
    /// Candidates dropped for their total delay
    pub rejected_duration: usize,
    /// Candidates dropped for their displacement
    pub rejected_displacement: usize,
    /// Candidates dropped for their point count
    pub rejected_point_count: usize,
    /// Samples in the unterminated final segment
    pub discarded_tail: usize,
}

impl SegmentReport {
    /// Total number of rejected candidates
    pub fn rejected(&self) -> usize {
        self.rejected_duration + self.rejected_displacement + self.rejected_point_count
    }

    fn record(&mut self, filter: &PathFilter, path: TrajectoryPath) {
        self.candidates += 1;
        match filter.check(&path) {
            Ok(()) => self.paths.push(path),
            Err(rejection) => {
                log::trace!("Rejected path ({:?}): {}", rejection, path);
                match rejection {
                    Rejection::Duration(_) => self.rejected_duration += 1,
                    Rejection::Displacement(_) => self.rejected_displacement += 1,
                    Rejection::PointCount(_) => self.rejected_point_count += 1,
                }
            }
        }
    }
}

/// Tracks the open segment and the current dwell run
struct DwellSplitter {
    threshold: u32,
    last: Sample,
    repeats: u32,
    current: Vec<Sample>,
}

impl DwellSplitter {
    fn new(threshold: u32) -> Self {
        Self {
            threshold,
            last: Sample::ORIGIN,
            repeats: 0,
            current: vec![Sample::ORIGIN],
        }
    }

    /// Feed one sample, returning a closed segment when a dwell completes
    fn push(&mut self, sample: Sample) -> Option<Vec<Sample>> {
        if sample.same_position(&self.last) {
            self.repeats = self.repeats.saturating_add(1);
            if self.repeats == self.threshold && !self.current.is_empty() {
                return Some(std::mem::take(&mut self.current));
            }
            return None;
        }

        self.repeats = 0;
        self.current.push(sample);
        self.last = sample;
        None
    }

    /// Length of the segment that never reached a dwell
    fn unterminated(&self) -> usize {
        self.current.len()
    }
}

/// Converts recordings into filtered trajectory paths
#[derive(Debug, Clone)]
pub struct PathSegmenter {
    dwell_threshold: u32,
    filter: PathFilter,
}

impl Default for PathSegmenter {
    fn default() -> Self {
        Self::new(20, PathFilter::default())
    }
}

impl PathSegmenter {
    /// Create a segmenter with the given dwell threshold and filter
    pub fn new(dwell_threshold: u32, filter: PathFilter) -> Self {
        Self {
            dwell_threshold,
            filter,
        }
    }

    /// Create a segmenter from loaded settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.dwell_threshold, settings.filter)
    }

    /// Split samples into every dwell-terminated segment, unfiltered
    pub fn candidates<I>(&self, samples: I) -> Vec<TrajectoryPath>
    where
        I: IntoIterator<Item = Sample>,
    {
        let mut splitter = DwellSplitter::new(self.dwell_threshold);

        samples
            .into_iter()
            .filter_map(|sample| splitter.push(sample))
            .filter_map(|segment| TrajectoryPath::from_samples(&segment))
            .collect()
    }

    /// Segment and filter a sequence of samples
    pub fn segment<I>(&self, samples: I) -> SegmentReport
    where
        I: IntoIterator<Item = Sample>,
    {
        let mut report = SegmentReport::default();
        let mut splitter = DwellSplitter::new(self.dwell_threshold);

        for sample in samples {
            report.lines_read += 1;
            self.feed(&mut splitter, &mut report, sample);
        }

        report.discarded_tail = splitter.unterminated();
        report
    }

    /// Segment and filter a text recording, one `x,y,elapsed_ms` per line
    ///
    /// Malformed lines, including ones that are not valid UTF-8, are
    /// skipped. Any other read failure aborts the load.
    pub fn read<R: BufRead>(&self, mut reader: R) -> std::io::Result<SegmentReport> {
        let mut report = SegmentReport::default();
        let mut splitter = DwellSplitter::new(self.dwell_threshold);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            report.lines_read += 1;

            let sample = std::str::from_utf8(&buf).ok().and_then(parse_sample);
            match sample {
                Some(sample) => self.feed(&mut splitter, &mut report, sample),
                None => report.lines_skipped += 1,
            }
        }

        report.discarded_tail = splitter.unterminated();
        Ok(report)
    }

    /// Load and segment a recording file
    pub fn load(&self, path: impl AsRef<Path>) -> Result<SegmentReport, TrajectoryError> {
        let path = path.as_ref();
        let unreadable = |source| TrajectoryError::Unreadable {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(unreadable)?;
        let report = self.read(BufReader::new(file)).map_err(unreadable)?;

        log::info!(
            "Parsed {} lines from {}: {} candidates, {} accepted, {} rejected, {} skipped",
            report.lines_read,
            path.display(),
            report.candidates,
            report.paths.len(),
            report.rejected(),
            report.lines_skipped
        );
        log::debug!(
            "Rejections - duration: {}, displacement: {}, point count: {}; {} samples left unterminated",
            report.rejected_duration,
            report.rejected_displacement,
            report.rejected_point_count,
            report.discarded_tail
        );

        Ok(report)
    }

    fn feed(&self, splitter: &mut DwellSplitter, report: &mut SegmentReport, sample: Sample) {
        if let Some(segment) = splitter.push(sample) {
            if let Some(path) = TrajectoryPath::from_samples(&segment) {
                report.record(&self.filter, path);
            }
        }
    }
}
