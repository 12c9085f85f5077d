//! Time-indexed scan paths.

use crate::error::{PathError, PathResult};
use crate::segment::{Segment, SegmentMode};
use bf_core::{Real, SMALL, Vec3};
use tracing::{debug, info};

/// Ordered, immutable sequence of segments with derived absolute times.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    segments: Vec<Segment>,
    end_time: Real,
}

impl Path {
    /// Time-index `segments` and compute the path end time, clipped to
    /// `sim_end_time`.
    ///
    /// Segment 0 is entered at t = 0 from an unpowered origin, so a leading
    /// line scan travels from (0, 0, 0). An empty list becomes a single
    /// zero-power dwell at the origin, which is never active.
    pub fn from_segments(mut segments: Vec<Segment>, sim_end_time: Real) -> PathResult<Self> {
        if !sim_end_time.is_finite() {
            return Err(PathError::InvalidArg {
                what: "simulation end time must be finite",
            });
        }

        if segments.is_empty() {
            segments.push(Segment::point_dwell(Vec3::zeros(), 0.0, 0.0));
        }

        let mut previous: Option<(Real, Vec3)> = None;
        for (i, seg) in segments.iter_mut().enumerate() {
            if !seg.parameter.is_finite() || seg.parameter < 0.0 {
                return Err(PathError::InvalidSegment {
                    segment: i,
                    what: "parameter must be finite and non-negative",
                });
            }
            if !seg.power.is_finite() || seg.power < 0.0 {
                return Err(PathError::InvalidSegment {
                    segment: i,
                    what: "power must be finite and non-negative",
                });
            }

            let (start_time, start_position) = previous.unwrap_or((0.0, Vec3::zeros()));
            let duration = match seg.mode {
                SegmentMode::PointDwell => seg.parameter,
                SegmentMode::LineScan => {
                    if seg.parameter == 0.0 {
                        return Err(PathError::ZeroSpeed { segment: i });
                    }
                    (seg.position - start_position).norm() / seg.parameter
                }
            };

            seg.time = start_time + duration;
            previous = Some((seg.time, seg.position));
        }

        let end_time = segments
            .iter()
            .rev()
            .find(|seg| seg.power > SMALL)
            .map_or(0.0, |seg| seg.time.min(sim_end_time));

        debug!(
            segments = segments.len(),
            end_time, "time-indexed scan path"
        );

        Ok(Self { segments, end_time })
    }

    /// Parse scan path text: one header line, then one row per segment.
    /// Blank lines are ignored.
    pub fn parse_str(text: &str, sim_end_time: Real) -> PathResult<Self> {
        let mut segments = Vec::new();
        for (i, row) in text.lines().enumerate().skip(1) {
            if row.trim().is_empty() {
                continue;
            }
            segments.push(Segment::parse_row(row, i + 1)?);
        }
        Self::from_segments(segments, sim_end_time)
    }

    /// Read a scan path file.
    pub fn read(file: &std::path::Path, sim_end_time: Real) -> PathResult<Self> {
        let text = std::fs::read_to_string(file).map_err(|source| PathError::Io {
            path: file.to_path_buf(),
            source,
        })?;
        info!("Reading scan path from: {}", file.display());
        let path = Self::parse_str(&text, sim_end_time)?;
        info!(
            "Scan path {}: {} segments, end time {} s",
            file.display(),
            path.len(),
            path.end_time()
        );
        Ok(path)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// Number of segments (always at least one).
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Time of the last powered segment, clipped to the simulation end.
    pub fn end_time(&self) -> Real {
        self.end_time
    }

    /// Time, position and power held on entry to segment `index`.
    pub(crate) fn entry(&self, index: usize) -> (Real, Vec3, Real) {
        match index.checked_sub(1).and_then(|i| self.segments.get(i)) {
            Some(prev) => (prev.time, prev.position, prev.power),
            None => (0.0, Vec3::zeros(), 0.0),
        }
    }

    /// Index of the last segment.
    pub(crate) fn last_index(&self) -> usize {
        self.segments.len() - 1
    }
}
