//! Beam state machine over a scan path.
//!
//! [`Beam`] is immutable and answers queries against a search cursor owned by
//! the caller. [`BeamState`] bundles that cursor with the last evaluated
//! position/power so a sub-cycling loop can thread it through successive
//! [`Beam::move_to`] calls.

use crate::error::{PathError, PathResult};
use crate::path::Path;
use crate::segment::SegmentMode;
use bf_core::{PATH_EPS, Real, Vec3};

/// Per-beam time stepping options.
#[derive(Clone, Debug, PartialEq)]
pub struct BeamSettings {
    /// Largest sub-step the beam may take (s). Infinite means one sub-step per
    /// outer step.
    pub delta_t: Real,
    /// Shrink proposed steps so they land on path segment boundaries.
    pub hit_path_intervals: bool,
    /// Time comparison tolerance (s).
    pub eps: Real,
    /// Relative step dilation allowed before an extra step is inserted.
    pub step_dilation: Real,
}

impl Default for BeamSettings {
    fn default() -> Self {
        Self {
            delta_t: Real::INFINITY,
            hit_path_intervals: true,
            eps: PATH_EPS,
            step_dilation: 0.01,
        }
    }
}

impl BeamSettings {
    pub fn validate(&self) -> PathResult<()> {
        if self.delta_t.is_nan() || self.delta_t <= 0.0 {
            return Err(PathError::InvalidArg {
                what: "beam delta_t must be positive",
            });
        }
        if !self.eps.is_finite() || self.eps < 0.0 {
            return Err(PathError::InvalidArg {
                what: "beam eps must be finite and non-negative",
            });
        }
        if !(0.0..1.0).contains(&self.step_dilation) {
            return Err(PathError::InvalidArg {
                what: "step_dilation must be in [0, 1)",
            });
        }
        Ok(())
    }
}

/// Snapshot of a beam at one instant, plus the cached segment cursor.
#[derive(Clone, Debug, PartialEq)]
pub struct BeamState {
    /// Index of the segment containing `time`.
    pub index: usize,
    pub time: Real,
    /// Beam centre. Frozen at the last segment reached once inactive.
    pub position: Vec3,
    pub power: Real,
    pub active: bool,
}

/// A scan path together with its stepping options.
#[derive(Clone, Debug)]
pub struct Beam {
    path: Path,
    settings: BeamSettings,
}

impl Beam {
    pub fn new(path: Path, settings: BeamSettings) -> PathResult<Self> {
        settings.validate()?;
        Ok(Self { path, settings })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &BeamSettings {
        &self.settings
    }

    pub fn delta_t(&self) -> Real {
        self.settings.delta_t
    }

    pub fn end_time(&self) -> Real {
        self.path.end_time()
    }

    /// The beam is on strictly before the path end time.
    pub fn is_active(&self, t: Real) -> bool {
        self.path.end_time() - t > self.settings.eps
    }

    /// Index of the segment containing `t`, searched from `cursor`.
    ///
    /// Zero-duration dwells are stepped over so the cursor never rests on an
    /// instantaneous jump. The result is non-decreasing when the returned
    /// index is fed back as the cursor for non-decreasing `t`.
    pub fn find_index(&self, cursor: usize, t: Real) -> usize {
        let segs = self.path.segments();
        let last = self.path.last_index();

        let mut i = cursor.min(last);
        while i > 0 && segs[i].time > t {
            i -= 1;
        }
        while i < last && segs[i].time < t {
            i += 1;
        }
        while i < last && segs[i].is_instant_jump() {
            i += 1;
        }
        i
    }

    /// Beam centre at `t`, or `None` once the path has finished.
    pub fn position(&self, cursor: usize, t: Real) -> Option<Vec3> {
        if !self.is_active(t) {
            return None;
        }
        Some(self.position_at(self.find_index(cursor, t), t))
    }

    fn position_at(&self, i: usize, t: Real) -> Vec3 {
        let segs = self.path.segments();
        let seg = &segs[i];
        match seg.mode {
            SegmentMode::PointDwell => seg.position,
            SegmentMode::LineScan => {
                let (start_time, start, _) = self.path.entry(i);
                let dt = seg.time - start_time;
                if dt > self.settings.eps {
                    let frac = ((t - start_time) / dt).clamp(0.0, 1.0);
                    start + (seg.position - start) * frac
                } else {
                    seg.position
                }
            }
        }
    }

    /// Beam power at `t`. Power commits at the start of a segment.
    pub fn power(&self, cursor: usize, t: Real) -> Real {
        if !self.is_active(t) {
            return 0.0;
        }
        self.power_at(self.find_index(cursor, t), t)
    }

    fn power_at(&self, i: usize, t: Real) -> Real {
        let (start_time, _, start_power) = self.path.entry(i);
        if t - start_time > self.settings.eps {
            self.path.segments()[i].power
        } else {
            start_power
        }
    }

    /// Segment mode at `t`. An inactive beam dwells.
    pub fn mode(&self, cursor: usize, t: Real) -> SegmentMode {
        if !self.is_active(t) {
            return SegmentMode::PointDwell;
        }
        self.path.segments()[self.find_index(cursor, t)].mode
    }

    /// Traverse speed at `t`, zero while dwelling or inactive.
    pub fn speed(&self, cursor: usize, t: Real) -> Real {
        if !self.is_active(t) {
            return 0.0;
        }
        self.path.segments()[self.find_index(cursor, t)].speed()
    }

    /// Time until the next segment boundary strictly after `t`.
    pub fn time_to_next_boundary(&self, cursor: usize, t: Real) -> Real {
        if !self.is_active(t) {
            return Real::INFINITY;
        }
        let i = self.find_index(cursor, t);
        self.path.segments()[i..]
            .iter()
            .map(|seg| seg.time - t)
            .find(|&d| d > self.settings.eps)
            .unwrap_or(Real::INFINITY)
    }

    /// Shrink `dt` so that a whole number of steps lands on the next path
    /// boundary, allowing `step_dilation` before an extra step is taken.
    pub fn adjust_step(&self, cursor: usize, t: Real, dt: Real) -> Real {
        if !self.settings.hit_path_intervals || !self.is_active(t) || !(dt > 0.0) {
            return dt;
        }
        let to_next = self.time_to_next_boundary(cursor, t);
        if !to_next.is_finite() {
            return dt;
        }
        let n_steps = ((to_next / dt).max(1.0) + (1.0 - self.settings.step_dilation)).floor();
        (to_next / n_steps).min(dt)
    }

    pub fn initial_state(&self, t: Real) -> BeamState {
        let mut state = BeamState {
            index: 0,
            time: t,
            position: self.path.segments()[0].position,
            power: 0.0,
            active: false,
        };
        self.move_to(&mut state, t);
        state
    }

    /// Advance `state` to `t`, reusing its cursor.
    pub fn move_to(&self, state: &mut BeamState, t: Real) {
        let i = self.find_index(state.index, t);
        state.index = i;
        state.time = t;
        state.active = self.is_active(t);
        state.position = self.position_at(i, t);
        state.power = if state.active { self.power_at(i, t) } else { 0.0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Segment;
    use approx::assert_relative_eq;
    use bf_core::vec3;

    fn beam(segments: Vec<Segment>) -> Beam {
        let path = Path::from_segments(segments, 100.0).unwrap();
        Beam::new(path, BeamSettings::default()).unwrap()
    }

    fn two_line_beam() -> Beam {
        beam(vec![
            Segment::point_dwell(vec3(0.0, 0.0, 0.0), 0.0, 0.0),
            Segment::line_scan(vec3(1.0, 0.0, 0.0), 100.0, 1.0),
            Segment::line_scan(vec3(1.0, 1.0, 0.0), 50.0, 1.0),
        ])
    }

    #[test]
    fn interpolates_along_line_scan() {
        let b = two_line_beam();
        let p = b.position(0, 0.25).unwrap();
        assert_relative_eq!(p.x, 0.25, epsilon = 1e-12);
        let p = b.position(0, 1.5).unwrap();
        assert_relative_eq!(p, vec3(1.0, 0.5, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn power_commits_at_segment_start() {
        let b = two_line_beam();
        assert_eq!(b.power(0, 0.5), 100.0);
        // Exactly on the boundary the ending segment still holds.
        assert_eq!(b.power(0, 1.0), 100.0);
        assert_eq!(b.power(0, 1.0 + 1e-6), 50.0);
    }

    #[test]
    fn find_index_skips_instant_jumps() {
        let b = beam(vec![
            Segment::line_scan(vec3(0.0, 0.0, 0.0), 0.0, 1.0),
            Segment::line_scan(vec3(1.0, 0.0, 0.0), 100.0, 1.0),
            Segment::point_dwell(vec3(0.0, 1.0, 0.0), 0.0, 0.0),
            Segment::line_scan(vec3(1.0, 1.0, 0.0), 100.0, 1.0),
        ]);
        assert_eq!(b.find_index(0, 1.0), 1);
        assert_eq!(b.find_index(2, 1.0), 3);
        assert_eq!(b.find_index(0, 1.2), 3);
        assert_eq!(b.find_index(3, 0.5), 1);
        // Jumped to the new line start; no travel along the diagonal.
        let p = b.position(0, 1.5).unwrap();
        assert_relative_eq!(p, vec3(0.5, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn inactive_after_end_time() {
        let b = two_line_beam();
        assert!(b.is_active(1.9));
        assert!(!b.is_active(2.0));
        assert_eq!(b.power(0, 2.5), 0.0);
        assert!(b.position(0, 2.5).is_none());
        assert_eq!(b.time_to_next_boundary(0, 2.5), Real::INFINITY);
        assert_eq!(b.speed(0, 2.5), 0.0);
    }

    #[test]
    fn inactive_beam_dwells() {
        let b = two_line_beam();
        assert_eq!(b.mode(0, 0.5), SegmentMode::LineScan);
        assert_eq!(b.mode(0, 2.5), SegmentMode::PointDwell);
        assert_eq!(b.mode(2, 2.0), SegmentMode::PointDwell);
    }

    #[test]
    fn leading_line_scan_is_powered_from_origin() {
        let b = beam(vec![Segment::line_scan(vec3(1e-3, 0.0, 0.0), 200.0, 1.0)]);
        assert_relative_eq!(b.end_time(), 1e-3, epsilon = 1e-15);
        let state = b.initial_state(5e-4);
        assert!(state.active);
        assert_eq!(state.index, 0);
        assert_eq!(state.power, 200.0);
        assert_eq!(b.mode(0, 5e-4), SegmentMode::LineScan);
        assert_relative_eq!(state.position, vec3(5e-4, 0.0, 0.0), epsilon = 1e-15);
        assert_eq!(b.power(0, 0.0), 0.0);
    }

    #[test]
    fn time_to_next_boundary_is_strictly_positive() {
        let b = two_line_beam();
        assert_relative_eq!(b.time_to_next_boundary(0, 0.25), 0.75, epsilon = 1e-12);
        assert_relative_eq!(b.time_to_next_boundary(0, 1.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn adjust_step_lands_on_boundary() {
        let b = two_line_beam();
        // 0.75 s to the boundary with 0.2 s steps: four steps of 0.1875 s.
        assert_relative_eq!(b.adjust_step(0, 0.25, 0.2), 0.1875, epsilon = 1e-12);
        // Step already divides the interval.
        assert_relative_eq!(b.adjust_step(0, 0.0, 0.25), 0.25, epsilon = 1e-12);
        // Step larger than the interval is clipped to it.
        assert_relative_eq!(b.adjust_step(0, 0.5, 1.0), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn adjust_step_allows_small_dilation() {
        let b = two_line_beam();
        // 1.0 / 0.3 = 3.33 steps -> 3 steps of 1/3 s would dilate by 11%, so
        // four steps are taken instead.
        assert_relative_eq!(b.adjust_step(0, 0.0, 0.3), 0.25, epsilon = 1e-12);
        // 1.0 / 0.334 = 2.994 steps -> within 1%, three steps are taken.
        assert_relative_eq!(b.adjust_step(0, 0.0, 0.334), 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn adjust_step_disabled() {
        let path = two_line_beam().path().clone();
        let settings = BeamSettings {
            hit_path_intervals: false,
            ..BeamSettings::default()
        };
        let b = Beam::new(path, settings).unwrap();
        assert_eq!(b.adjust_step(0, 0.25, 0.2), 0.2);
    }

    #[test]
    fn move_to_threads_cursor() {
        let b = two_line_beam();
        let mut state = b.initial_state(0.0);
        assert!(state.active);
        b.move_to(&mut state, 0.5);
        assert_eq!(state.index, 1);
        assert_eq!(state.power, 100.0);
        b.move_to(&mut state, 1.5);
        assert_eq!(state.index, 2);
        assert_relative_eq!(state.position, vec3(1.0, 0.5, 0.0), epsilon = 1e-12);
        b.move_to(&mut state, 3.0);
        assert!(!state.active);
        assert_eq!(state.power, 0.0);
    }

    #[test]
    fn settings_are_validated() {
        let path = two_line_beam().path().clone();
        let bad = BeamSettings {
            delta_t: 0.0,
            ..BeamSettings::default()
        };
        assert!(Beam::new(path.clone(), bad).is_err());
        let bad = BeamSettings {
            step_dilation: 1.5,
            ..BeamSettings::default()
        };
        assert!(Beam::new(path, bad).is_err());
    }
}
