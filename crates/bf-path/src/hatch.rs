//! Rectangular hatch scan-path generator.

use crate::error::{PathError, PathResult};
use crate::segment::Segment;
use bf_core::{Real, Vec3, vec3};
use std::fmt::Write as _;
use std::path::{Path as FsPath, PathBuf};
use tracing::info;

/// Header line written at the top of every scan path file.
pub const SCAN_PATH_HEADER: &str = "Mode\tX(m)\tY(m)\tZ(m)\tPower(W)\ttParam";

const CLIP_TOL: Real = 1e-10;

/// Parallel hatch lines filling a rectangle, optionally rotated per layer.
#[derive(Clone, Debug, PartialEq)]
pub struct HatchPattern {
    pub min: [Real; 2],
    pub max: [Real; 2],
    /// Line spacing (m).
    pub hatch: Real,
    /// Rotation added per pattern (deg).
    pub angle_deg: Real,
    /// Number of patterns to generate, each rotated by `angle_deg` more.
    pub rotations: usize,
    pub power: Real,
    pub speed: Real,
    /// Dwell between lines (s). The first line starts without a dwell.
    pub dwell_time: Real,
    /// Reverse every other line.
    pub bidirectional: bool,
}

impl HatchPattern {
    pub fn validate(&self) -> PathResult<()> {
        if !(self.min[0] < self.max[0] && self.min[1] < self.max[1]) {
            return Err(PathError::InvalidArg {
                what: "hatch rectangle min must be below max",
            });
        }
        if !(self.hatch > 0.0) || !self.hatch.is_finite() {
            return Err(PathError::InvalidArg {
                what: "hatch spacing must be positive",
            });
        }
        if !(self.speed > 0.0) || !self.speed.is_finite() {
            return Err(PathError::InvalidArg {
                what: "hatch speed must be positive",
            });
        }
        if !(self.power >= 0.0) || !(self.dwell_time >= 0.0) {
            return Err(PathError::InvalidArg {
                what: "hatch power and dwell time must be non-negative",
            });
        }
        if !self.angle_deg.is_finite() {
            return Err(PathError::InvalidArg {
                what: "hatch angle must be finite",
            });
        }
        if self.rotations == 0 {
            return Err(PathError::InvalidArg {
                what: "at least one rotation is required",
            });
        }
        Ok(())
    }

    fn mid(&self) -> [Real; 2] {
        [
            0.5 * (self.min[0] + self.max[0]),
            0.5 * (self.min[1] + self.max[1]),
        ]
    }

    /// Offsets of the unrotated lines from the mid-point, ascending.
    fn line_offsets(&self) -> Vec<Real> {
        let count = |lo: Real, hi: Real| ((hi - lo) / self.hatch + CLIP_TOL).floor() as i64 + 1;
        let n = count(self.min[0], self.max[0]).max(count(self.min[1], self.max[1]));
        (1 - n..n).map(|i| i as Real * self.hatch).collect()
    }

    /// Clip the line `origin + s * dir` to the rectangle.
    fn clip(&self, origin: [Real; 2], dir: [Real; 2]) -> Option<([Real; 2], [Real; 2])> {
        let mut s_lo = Real::NEG_INFINITY;
        let mut s_hi = Real::INFINITY;
        for a in 0..2 {
            let lo = self.min[a] - CLIP_TOL;
            let hi = self.max[a] + CLIP_TOL;
            if dir[a].abs() < 1e-12 {
                if origin[a] < lo || origin[a] > hi {
                    return None;
                }
                continue;
            }
            let t0 = (lo - origin[a]) / dir[a];
            let t1 = (hi - origin[a]) / dir[a];
            s_lo = s_lo.max(t0.min(t1));
            s_hi = s_hi.min(t0.max(t1));
        }
        if s_hi - s_lo <= CLIP_TOL {
            return None;
        }
        let point = |s: Real| {
            [
                (origin[0] + s * dir[0]).clamp(self.min[0], self.max[0]),
                (origin[1] + s * dir[1]).clamp(self.min[1], self.max[1]),
            ]
        };
        Some((point(s_lo), point(s_hi)))
    }

    /// Hatch lines (start, end) for the pattern rotated by `angle_deg`.
    pub fn lines(&self, angle_deg: Real) -> Vec<(Vec3, Vec3)> {
        let mid = self.mid();
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let dir = [cos, sin];

        let mut lines = Vec::new();
        for offset in self.line_offsets() {
            // Unrotated line passes through (mid.x, mid.y + offset).
            let origin = [mid[0] - sin * offset, mid[1] + cos * offset];
            if let Some((a, b)) = self.clip(origin, dir) {
                let (a, b) = if self.bidirectional && lines.len() % 2 == 1 {
                    (b, a)
                } else {
                    (a, b)
                };
                lines.push((vec3(a[0], a[1], 0.0), vec3(b[0], b[1], 0.0)));
            }
        }
        lines
    }

    /// Scan path segments for the `rotation`-th pattern.
    pub fn segments(&self, rotation: usize) -> Vec<Segment> {
        let lines = self.lines(rotation as Real * self.angle_deg);
        let mut segments = Vec::with_capacity(2 * lines.len());
        for (i, (start, end)) in lines.into_iter().enumerate() {
            let dwell = if i == 0 { 0.0 } else { self.dwell_time };
            segments.push(Segment::point_dwell(start, 0.0, dwell));
            segments.push(Segment::line_scan(end, self.power, self.speed));
        }
        segments
    }
}

/// Format segments as scan path file text.
pub fn format_scan_path(segments: &[Segment]) -> String {
    let mut text = String::from(SCAN_PATH_HEADER);
    text.push('\n');
    for seg in segments {
        let _ = writeln!(text, "{}", seg.to_row());
    }
    text
}

/// Write one `scanPath_<i>` file per rotation into `dir`.
pub fn write_scan_path(dir: &FsPath, pattern: &HatchPattern) -> PathResult<Vec<PathBuf>> {
    pattern.validate()?;
    let io_err = |path: &FsPath| {
        let path = path.to_path_buf();
        move |source| PathError::Io { path, source }
    };
    std::fs::create_dir_all(dir).map_err(io_err(dir))?;

    let mut written = Vec::with_capacity(pattern.rotations);
    for i in 0..pattern.rotations {
        let file = dir.join(format!("scanPath_{i}"));
        let segments = pattern.segments(i);
        std::fs::write(&file, format_scan_path(&segments)).map_err(io_err(&file))?;
        info!(
            "Wrote {} ({} segments, {} deg)",
            file.display(),
            segments.len(),
            i as Real * pattern.angle_deg
        );
        written.push(file);
    }
    Ok(written)
}
