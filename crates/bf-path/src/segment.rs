//! Scan path segments.

use crate::error::{PathError, PathResult};
use bf_core::{Real, Vec3, vec3};

/// How the beam reaches a segment's position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SegmentMode {
    /// Move in a straight line to `position` at `parameter` m/s.
    LineScan,
    /// Sit at `position` for `parameter` seconds.
    PointDwell,
}

impl SegmentMode {
    /// Integer code used in scan path files.
    pub fn code(self) -> i64 {
        match self {
            SegmentMode::LineScan => 0,
            SegmentMode::PointDwell => 1,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(SegmentMode::LineScan),
            1 => Some(SegmentMode::PointDwell),
            _ => None,
        }
    }
}

/// One beam command.
///
/// `time` is the absolute time at which the segment ends; it is derived by
/// [`crate::Path`] and is zero for a freshly constructed segment.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub mode: SegmentMode,
    /// End point of a line scan, or the dwell location.
    pub position: Vec3,
    /// Beam power (W), committed at the start of the segment.
    pub power: Real,
    /// Traverse speed (m/s) for line scans, dwell duration (s) for dwells.
    pub parameter: Real,
    pub(crate) time: Real,
}

impl Segment {
    pub fn new(mode: SegmentMode, position: Vec3, power: Real, parameter: Real) -> Self {
        Self {
            mode,
            position,
            power,
            parameter,
            time: 0.0,
        }
    }

    pub fn line_scan(end: Vec3, power: Real, speed: Real) -> Self {
        Self::new(SegmentMode::LineScan, end, power, speed)
    }

    pub fn point_dwell(position: Vec3, power: Real, duration: Real) -> Self {
        Self::new(SegmentMode::PointDwell, position, power, duration)
    }

    /// Absolute end time of the segment.
    pub fn time(&self) -> Real {
        self.time
    }

    /// Traverse speed, zero for dwells.
    pub fn speed(&self) -> Real {
        match self.mode {
            SegmentMode::LineScan => self.parameter,
            SegmentMode::PointDwell => 0.0,
        }
    }

    /// Zero-duration dwell, used to reposition the beam instantly.
    pub fn is_instant_jump(&self) -> bool {
        self.mode == SegmentMode::PointDwell && self.parameter == 0.0
    }

    /// Parse a `mode x y z power parameter` row. `line` is only used for
    /// diagnostics.
    pub fn parse_row(row: &str, line: usize) -> PathResult<Segment> {
        let cols: Vec<&str> = row.split_whitespace().collect();
        if cols.len() != 6 {
            return Err(PathError::Parse {
                line,
                reason: format!("expected 6 columns, found {}", cols.len()),
            });
        }

        let code: i64 = cols[0].parse().map_err(|_| PathError::Parse {
            line,
            reason: format!("mode '{}' is not an integer", cols[0]),
        })?;
        let mode = SegmentMode::from_code(code).ok_or(PathError::UnknownMode { line, code })?;

        let mut values = [0.0; 5];
        for (slot, col) in values.iter_mut().zip(&cols[1..]) {
            let v: Real = col.parse().map_err(|_| PathError::Parse {
                line,
                reason: format!("'{col}' is not a number"),
            })?;
            if !v.is_finite() {
                return Err(PathError::Parse {
                    line,
                    reason: format!("'{col}' is not finite"),
                });
            }
            *slot = v;
        }

        let [x, y, z, power, parameter] = values;
        if power < 0.0 {
            return Err(PathError::Parse {
                line,
                reason: "power must be non-negative".to_string(),
            });
        }

        Ok(Segment::new(mode, vec3(x, y, z), power, parameter))
    }

    /// Format as a scan path row (tab separated).
    pub fn to_row(&self) -> String {
        format!(
            "{}\t{:.10}\t{:.10}\t{:.10}\t{}\t{}",
            self.mode.code(),
            self.position.x,
            self.position.y,
            self.position.z,
            self.power,
            self.parameter
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_line_scan_row() {
        let seg = Segment::parse_row("0\t1.0e-3 2.0e-3 0.0\t195\t0.8", 2).unwrap();
        assert_eq!(seg.mode, SegmentMode::LineScan);
        assert_eq!(seg.position, vec3(1.0e-3, 2.0e-3, 0.0));
        assert_eq!(seg.power, 195.0);
        assert_eq!(seg.speed(), 0.8);
        assert_eq!(seg.time(), 0.0);
    }

    #[test]
    fn parse_dwell_row() {
        let seg = Segment::parse_row("1 0 0 0 0 0", 3).unwrap();
        assert_eq!(seg.mode, SegmentMode::PointDwell);
        assert!(seg.is_instant_jump());
        assert_eq!(seg.speed(), 0.0);
    }

    #[test]
    fn parse_rejects_wrong_column_count() {
        let err = Segment::parse_row("0 1 2 3 4", 5).unwrap_err();
        assert!(matches!(err, PathError::Parse { line: 5, .. }));
    }

    #[test]
    fn parse_rejects_unknown_mode() {
        let err = Segment::parse_row("2 0 0 0 100 1", 4).unwrap_err();
        assert!(matches!(err, PathError::UnknownMode { line: 4, code: 2 }));
    }

    #[test]
    fn parse_rejects_negative_power() {
        assert!(Segment::parse_row("0 0 0 0 -1 1", 2).is_err());
        assert!(Segment::parse_row("0 0 0 nan 1 1", 2).is_err());
    }

    #[test]
    fn row_round_trips_through_parse() {
        let seg = Segment::line_scan(vec3(0.5, -0.25, 0.0), 150.0, 1.2);
        let back = Segment::parse_row(&seg.to_row(), 1).unwrap();
        assert_eq!(back, seg);
    }
}
