//! A named beam with its distribution and absorption model.

use bf_core::timing::{Timer, deposition_timing};
use bf_core::{Real, Vec3};
use bf_mesh::{Communicator, Mesh, TemperatureField};
use bf_path::{Beam, BeamState};
use bf_sources::{AbsorptionModel, HeatSource};
use tracing::info;

use crate::error::{DepositionError, DepositionResult};
use crate::integrator::{Correction, Deposition, DepositionIntegrator};

/// One independently moving heat source.
#[derive(Clone, Debug)]
pub struct Source {
    name: String,
    beam: Beam,
    state: BeamState,
    heat_source: HeatSource,
    absorption: AbsorptionModel,
    normalize: bool,
    scan_patch: Option<String>,
    /// Perimeter points of the scan patch gathered from every rank.
    boundary: Vec<Vec3>,
}

impl Source {
    pub fn new(
        name: impl Into<String>,
        beam: Beam,
        heat_source: HeatSource,
        absorption: AbsorptionModel,
    ) -> Self {
        let state = beam.initial_state(0.0);
        Self {
            name: name.into(),
            beam,
            state,
            heat_source,
            absorption,
            normalize: true,
            scan_patch: None,
            boundary: Vec::new(),
        }
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Skip the conservation correction while the beam is near the edge of
    /// `patch`.
    ///
    /// Collective: gathers the patch perimeter from every rank.
    pub fn with_scan_patch(
        mut self,
        mesh: &dyn Mesh,
        comm: &dyn Communicator,
        patch: &str,
    ) -> DepositionResult<Self> {
        let local = mesh.patch_edge_points(patch).unwrap_or(&[]);
        let boundary = comm.all_gather(local);
        if boundary.is_empty() {
            return Err(DepositionError::UnknownPatch {
                name: self.name,
                patch: patch.to_string(),
            });
        }
        info!(
            source = %self.name,
            patch,
            points = boundary.len(),
            "collected scan patch boundary"
        );
        self.scan_patch = Some(patch.to_string());
        self.boundary = boundary;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn beam(&self) -> &Beam {
        &self.beam
    }

    pub fn state(&self) -> &BeamState {
        &self.state
    }

    pub fn heat_source(&self) -> &HeatSource {
        &self.heat_source
    }

    pub fn absorption(&self) -> &AbsorptionModel {
        &self.absorption
    }

    pub fn normalize(&self) -> bool {
        self.normalize
    }

    pub fn scan_patch(&self) -> Option<&str> {
        self.scan_patch.as_deref()
    }

    pub fn boundary_points(&self) -> &[Vec3] {
        &self.boundary
    }

    pub fn is_active(&self, t: Real) -> bool {
        self.beam.is_active(t)
    }

    pub fn move_to(&mut self, t: Real) {
        let timer = Timer::start("beam move");
        self.beam.move_to(&mut self.state, t);
        timer.stop_into(&deposition_timing::BEAM_MOVE);
    }

    /// Track the melt pool depth at the current beam position. Collective
    /// when transient tracking is enabled.
    pub fn update_depth(
        &mut self,
        mesh: &dyn Mesh,
        comm: &dyn Communicator,
        temperature: &TemperatureField,
    ) -> DepositionResult<Real> {
        let timer = Timer::start("depth update");
        let centre = self.state.position;
        let depth = self
            .heat_source
            .update_depth(mesh, comm, temperature, &centre)?;
        timer.stop_into(&deposition_timing::DEPTH_UPDATE);
        Ok(depth)
    }

    /// Power density at the current beam state.
    pub fn deposit(
        &self,
        integrator: &DepositionIntegrator,
        mesh: &dyn Mesh,
        comm: &dyn Communicator,
    ) -> DepositionResult<Deposition> {
        let correction = if self.normalize {
            Correction::Normalize {
                boundary: &self.boundary,
            }
        } else {
            Correction::Off
        };
        integrator.compute(
            mesh,
            comm,
            &self.state,
            &self.heat_source,
            &self.absorption,
            correction,
        )
    }
}
