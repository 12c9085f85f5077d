//! Refinement markers along upcoming beam paths.
//!
//! The marker field is handed to an adaptive mesh refinement step outside
//! this crate: 1 marks a cell to refine, 0 leaves it alone.

use bf_core::timing::{Timer, deposition_timing};
use bf_core::{BoundBox, Real, SMALL};
use bf_mesh::Mesh;
use bf_path::SegmentMode;
use tracing::{debug, info};

use crate::error::{DepositionError, DepositionResult};
use crate::source::Source;

/// Padding added to cell bounds before overlap tests.
const BOUNDS_PAD: Real = 1e-10;

/// Refine cells swept by every beam during uniform time intervals.
#[derive(Clone, Debug)]
pub struct UniformIntervals {
    intervals: usize,
    n_levels: usize,
    interval_time: Real,
    update_time: Real,
    last_refinement_step: Option<usize>,
    marker: Vec<Real>,
}

impl UniformIntervals {
    /// `intervals` updates spread over the active part of the run, each
    /// followed by `n_levels` refinement passes.
    pub fn new(
        intervals: usize,
        n_levels: usize,
        sources: &[Source],
        end_time: Real,
    ) -> DepositionResult<Self> {
        if intervals == 0 {
            return Err(DepositionError::InvalidArg {
                what: "refinement intervals must be positive",
            });
        }
        if n_levels == 0 {
            return Err(DepositionError::InvalidArg {
                what: "refinement levels must be positive",
            });
        }
        let beam_end = sources
            .iter()
            .map(|s| s.beam().end_time())
            .fold(0.0, Real::max);
        let interval_time = beam_end.min(end_time) / intervals as Real;
        let interval_time = if interval_time > SMALL {
            interval_time
        } else {
            Real::INFINITY
        };
        info!(interval_time, intervals, n_levels, "refinement interval");
        Ok(Self {
            intervals,
            n_levels,
            interval_time,
            update_time: 0.0,
            last_refinement_step: None,
            marker: Vec::new(),
        })
    }

    pub fn intervals(&self) -> usize {
        self.intervals
    }

    pub fn n_levels(&self) -> usize {
        self.n_levels
    }

    pub fn interval_time(&self) -> Real {
        self.interval_time
    }

    pub fn marker(&self) -> &[Real] {
        &self.marker
    }

    fn update(&mut self, mesh: &dyn Mesh, sources: &[Source], t: Real, step: usize) -> bool {
        if t >= self.update_time {
            self.last_refinement_step = Some(step);
            self.update_time = t + self.interval_time;
            self.mark(mesh, sources, t);
            return true;
        }
        self.last_refinement_step
            .is_some_and(|last| step < last + self.n_levels)
    }

    /// Mark cells under each beam from `t` up to the next update time.
    fn mark(&mut self, mesh: &dyn Mesh, sources: &[Source], t: Real) {
        let timer = Timer::start("refinement");
        self.marker.clear();
        self.marker.resize(mesh.n_cells(), 0.0);

        for source in sources {
            let beam = source.beam();
            let dims = *source.heat_source().dimensions();
            let offset = dims * 1.5;
            let footprint = dims.x.max(dims.y);

            let mut time = t;
            let mut cursor = source.state().index;
            while self.update_time - time > SMALL {
                let Some(position) = beam.position(cursor, time) else {
                    break;
                };
                let region = BoundBox::around(&position, &offset).inflate(BOUNDS_PAD);
                for cell in mesh.cells_overlapping(&region) {
                    self.marker[cell] = 1.0;
                }

                cursor = beam.find_index(cursor, time);
                let to_next = beam.time_to_next_boundary(cursor, time);
                let dt = match beam.mode(cursor, time) {
                    SegmentMode::LineScan => to_next.min(footprint / beam.speed(cursor, time)),
                    SegmentMode::PointDwell => to_next.min((self.update_time - time).max(0.0)),
                };
                if !(dt > 0.0) || !dt.is_finite() {
                    break;
                }
                time += dt;
            }
        }
        let marked = self.marker.iter().filter(|&&m| m > 0.0).count();
        debug!(marked, until = self.update_time, "refinement markers updated");
        timer.stop_into(&deposition_timing::REFINEMENT);
    }
}

/// Selects when and where the mesh is refined around the beams.
#[derive(Clone, Debug, Default)]
pub enum RefinementController {
    /// Never refine.
    #[default]
    None,
    UniformIntervals(UniformIntervals),
}

impl RefinementController {
    /// Update markers for outer step number `step` starting at `t`. Returns
    /// true when the mesh should be refined this step.
    pub fn update(&mut self, mesh: &dyn Mesh, sources: &[Source], t: Real, step: usize) -> bool {
        match self {
            RefinementController::None => false,
            RefinementController::UniformIntervals(u) => u.update(mesh, sources, t, step),
        }
    }

    /// Marker per local cell, empty when refinement is off.
    pub fn marker(&self) -> &[Real] {
        match self {
            RefinementController::None => &[],
            RefinementController::UniformIntervals(u) => u.marker(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bf_core::vec3;
    use bf_mesh::CartesianMesh;
    use bf_path::{Beam, BeamSettings, Path, Segment};
    use bf_sources::{AbsorptionModel, HeatSource, ShapeModel, SuperGaussian};

    fn line_source() -> Source {
        // 0 -> 4 along x at 1 m/s.
        let path = Path::from_segments(
            vec![
                Segment::point_dwell(vec3(0.0, 0.5, 0.0), 0.0, 0.0),
                Segment::line_scan(vec3(4.0, 0.5, 0.0), 100.0, 1.0),
            ],
            100.0,
        )
        .unwrap();
        let beam = Beam::new(path, BeamSettings::default()).unwrap();
        let shape: ShapeModel = SuperGaussian::new(2.0).unwrap().into();
        let heat_source = HeatSource::new(shape, vec3(0.1, 0.1, 0.1)).unwrap();
        Source::new("beam", beam, heat_source, AbsorptionModel::constant(1.0).unwrap())
    }

    fn strip() -> CartesianMesh {
        CartesianMesh::uniform(vec3(0.0, 0.0, -1.0), vec3(8.0, 1.0, 0.0), [16, 1, 1]).unwrap()
    }

    fn marked_columns(mesh: &CartesianMesh, marker: &[Real]) -> Vec<usize> {
        (0..mesh.n_cells()).filter(|&c| marker[c] > 0.0).collect()
    }

    #[test]
    fn none_never_refines() {
        let mut controller = RefinementController::None;
        assert!(!controller.update(&strip(), &[line_source()], 0.0, 0));
        assert!(controller.marker().is_empty());
    }

    #[test]
    fn interval_splits_active_time() {
        let sources = [line_source()];
        let uniform = UniformIntervals::new(2, 1, &sources, 100.0).unwrap();
        assert_eq!(uniform.interval_time(), 2.0);
        assert!(UniformIntervals::new(0, 1, &sources, 1.0).is_err());
    }

    #[test]
    fn marks_cells_swept_until_next_update() {
        let mesh = strip();
        let sources = [line_source()];
        let mut controller =
            RefinementController::UniformIntervals(UniformIntervals::new(2, 2, &sources, 100.0).unwrap());

        assert!(controller.update(&mesh, &sources, 0.0, 0));
        // Beam sweeps x in [0, 2] (+0.15 padding): cells of width 0.5 up to x = 2.5.
        assert_eq!(marked_columns(&mesh, controller.marker()), vec![0, 1, 2, 3, 4]);

        // Second level pass, then idle until t = 2.
        assert!(controller.update(&mesh, &sources, 0.5, 1));
        assert!(!controller.update(&mesh, &sources, 1.0, 2));
        assert!(controller.update(&mesh, &sources, 2.0, 3));
        assert_eq!(marked_columns(&mesh, controller.marker()), vec![3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn finished_path_marks_nothing() {
        let mesh = strip();
        let sources = [line_source()];
        let mut uniform = UniformIntervals::new(1, 1, &sources, 100.0).unwrap();
        uniform.update_time = 10.0;
        assert!(uniform.update(&mesh, &sources, 10.0, 7));
        assert!(uniform.marker().iter().all(|&m| m == 0.0));
    }
}
