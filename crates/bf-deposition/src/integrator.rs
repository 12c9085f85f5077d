//! Per-cell power density from one beam.
//!
//! The integrator culls cells to a box around the beam, integrates the shape
//! weight over each surviving cell, scales by absorbed power over the shape's
//! reference volume and finally applies a bounded conservation correction
//! against the globally integrated power.

use bf_core::timing::{Timer, deposition_timing};
use bf_core::{BoundBox, Real, SMALL, Vec3};
use bf_mesh::{Communicator, Mesh};
use bf_path::BeamState;
use bf_sources::{AbsorptionModel, HeatSource};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::DepositionResult;
use crate::settings::DepositionSettings;

/// Power density of one beam at one instant.
#[derive(Clone, Debug, PartialEq)]
pub struct Deposition {
    /// Volumetric power density per local cell (W/m^3).
    pub q_dot: Vec<Real>,
    /// Beam power times absorption efficiency (W).
    pub absorbed_power: Real,
    /// Global integral of `q_dot` over the mesh after any correction (W).
    pub deposited_power: Real,
    /// Whether the conservation correction was applied.
    pub corrected: bool,
}

impl Deposition {
    pub fn zero(n_cells: usize) -> Self {
        Self {
            q_dot: vec![0.0; n_cells],
            absorbed_power: 0.0,
            deposited_power: 0.0,
            corrected: false,
        }
    }
}

/// Conservation correction request.
#[derive(Clone, Copy, Debug)]
pub enum Correction<'a> {
    /// Leave the integrated field as computed.
    Off,
    /// Rescale to the absorbed power unless the beam is within reach of one
    /// of the given scan-patch boundary points.
    Normalize { boundary: &'a [Vec3] },
}

#[derive(Clone, Debug, Default)]
pub struct DepositionIntegrator {
    settings: DepositionSettings,
}

impl DepositionIntegrator {
    pub fn new(settings: DepositionSettings) -> DepositionResult<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &DepositionSettings {
        &self.settings
    }

    /// Sub-samples along each axis of a hex cell with the given span.
    fn samples_per_axis(&self, span: &Vec3, scale: Real) -> [usize; 3] {
        let max = self.settings.max_samples_per_axis;
        if !(scale > 0.0) || !scale.is_finite() {
            return [max; 3];
        }
        let per_scale = self.settings.samples_per_scale as Real;
        let count = |h: Real| ((per_scale * h / scale).ceil() as usize).clamp(1, max);
        [count(span.x), count(span.y), count(span.z)]
    }

    /// Mean shape weight over a cell.
    fn cell_weight(&self, mesh: &dyn Mesh, source: &HeatSource, centre: &Vec3, cell: usize) -> Real {
        if !mesh.is_hex(cell) {
            return source.weight(&(mesh.centre(cell) - centre));
        }
        let bounds = mesh.bounds(cell);
        let span = bounds.span();
        let [nx, ny, nz] = self.samples_per_axis(&span, source.resolution_scale());
        let step = Vec3::new(
            span.x / nx as Real,
            span.y / ny as Real,
            span.z / nz as Real,
        );
        let mut sum = 0.0;
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let offset = Vec3::new(
                        (i as Real + 0.5) * step.x,
                        (j as Real + 0.5) * step.y,
                        (k as Real + 0.5) * step.z,
                    );
                    sum += source.weight(&(bounds.min + offset - centre));
                }
            }
        }
        sum / (nx * ny * nz) as Real
    }

    /// Power density of `source` driven by `beam` on the local cells of
    /// `mesh`.
    ///
    /// Collective: for an active beam with positive power every rank takes
    /// part in one sum reduction, even when it owns no cell near the beam.
    pub fn compute(
        &self,
        mesh: &dyn Mesh,
        comm: &dyn Communicator,
        beam: &BeamState,
        source: &HeatSource,
        absorption: &AbsorptionModel,
        correction: Correction<'_>,
    ) -> DepositionResult<Deposition> {
        let n_cells = mesh.n_cells();
        if !beam.active || !(beam.power > self.settings.eps) {
            return Ok(Deposition::zero(n_cells));
        }

        let absorbed = absorption.eta(source.aspect_ratio()) * beam.power;
        let volume = source.reference_volume();

        let timer = Timer::start("cell integration");
        let mut q_dot = vec![0.0; n_cells];
        let scale = absorbed / volume;
        if volume > 0.0 && scale.is_finite() && absorbed > 0.0 {
            let half = source.support() * self.settings.cull_factor;
            let region = BoundBox::around(&beam.position, &half);
            let densities: Vec<(usize, Real)> = mesh
                .cells_overlapping(&region)
                .into_par_iter()
                .map(|cell| (cell, scale * self.cell_weight(mesh, source, &beam.position, cell)))
                .collect();
            for (cell, q) in densities {
                q_dot[cell] = q;
            }
        }
        let local: Real = q_dot
            .iter()
            .enumerate()
            .filter(|(_, q)| **q != 0.0)
            .map(|(cell, q)| q * mesh.volume(cell))
            .sum();
        timer.stop_into(&deposition_timing::CELL_INTEGRATION);

        let integrated = comm.all_reduce_sum(local);

        let mut deposition = Deposition {
            q_dot,
            absorbed_power: absorbed,
            deposited_power: integrated,
            corrected: false,
        };
        if let Correction::Normalize { boundary } = correction {
            let timer = Timer::start("power correction");
            self.correct(comm, beam, source, boundary, &mut deposition);
            timer.stop_into(&deposition_timing::POWER_CORRECTION);
        }
        Ok(deposition)
    }

    fn correct(
        &self,
        comm: &dyn Communicator,
        beam: &BeamState,
        source: &HeatSource,
        boundary: &[Vec3],
        deposition: &mut Deposition,
    ) {
        let integrated = deposition.deposited_power;
        let absorbed = deposition.absorbed_power;
        if !(integrated > SMALL) {
            return;
        }

        let dims = source.dimensions();
        let reach = dims.x.max(dims.y);
        if boundary.iter().any(|p| (p - beam.position).norm() < reach) {
            debug!(
                time = beam.time,
                absorbed, integrated, "beam near scan patch edge, power left uncorrected"
            );
            return;
        }

        let mismatch = 1.0 - integrated / absorbed;
        if mismatch.abs() < self.settings.correction_tolerance {
            let factor = absorbed / integrated;
            deposition.q_dot.iter_mut().for_each(|q| *q *= factor);
            deposition.deposited_power = absorbed;
            deposition.corrected = true;
        } else if comm.is_master() {
            warn!(
                time = beam.time,
                absorbed,
                integrated,
                mismatch,
                "deposited power outside correction band, left uncorrected"
            );
        }
    }
}
