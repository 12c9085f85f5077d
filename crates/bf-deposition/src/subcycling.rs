//! Time sub-cycling of every source through one outer solver step.

use bf_core::units::{Power, Time};
use bf_core::{Real, SMALL, s, w};
use bf_mesh::{Communicator, Mesh, TemperatureField};
use tracing::{debug, info};
use uom::si::power::watt;

use crate::error::{DepositionError, DepositionResult};
use crate::integrator::DepositionIntegrator;
use crate::source::Source;

/// Step-averaged power of one source.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceReport {
    pub name: String,
    /// Number of beam sub-steps taken, zero when inactive.
    pub substeps: usize,
    pub absorbed_power: Power,
    pub deposited_power: Power,
}

/// Outcome of one outer step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    /// End of the outer step.
    pub time: Time,
    pub sources: Vec<SourceReport>,
}

impl StepReport {
    /// Total deposited power summed over sources.
    pub fn deposited_power(&self) -> Power {
        self.sources
            .iter()
            .fold(w(0.0), |acc, r| acc + r.deposited_power)
    }
}

/// Owns the sources and the combined power density handed to the solver.
pub struct SubcyclingController {
    sources: Vec<Source>,
    integrator: DepositionIntegrator,
    q_dot: Vec<Real>,
}

impl SubcyclingController {
    pub fn new(sources: Vec<Source>, integrator: DepositionIntegrator) -> Self {
        Self {
            sources,
            integrator,
            q_dot: Vec::new(),
        }
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn integrator(&self) -> &DepositionIntegrator {
        &self.integrator
    }

    /// Combined power density from the last update (W/m^3).
    pub fn q_dot(&self) -> &[Real] {
        &self.q_dot
    }

    /// Shrink an outer step so every beam lands on its path boundaries.
    pub fn adjust_step(&self, t: Real, dt: Real) -> Real {
        self.sources.iter().fold(dt, |dt, source| {
            source.beam().adjust_step(source.state().index, t, dt)
        })
    }

    /// Deposit every source over `[t, t + dt]`.
    ///
    /// The combined field is reset, then each active source is stepped at its
    /// own `delta_t` and its time-weighted mean density added in. Collective:
    /// every rank must call this with the same `t` and `dt`.
    pub fn update(
        &mut self,
        mesh: &dyn Mesh,
        comm: &dyn Communicator,
        temperature: &TemperatureField,
        t: Real,
        dt: Real,
    ) -> DepositionResult<StepReport> {
        if !t.is_finite() || !dt.is_finite() || dt < 0.0 {
            return Err(DepositionError::InvalidArg {
                what: "step time and size must be finite with dt >= 0",
            });
        }
        let n_cells = mesh.n_cells();
        self.q_dot.clear();
        self.q_dot.resize(n_cells, 0.0);

        let eps = self.integrator.settings().eps;
        let next_time = t + dt;
        let mut reports = Vec::with_capacity(self.sources.len());

        for source in &mut self.sources {
            if !source.is_active(t) {
                source.move_to(next_time);
                reports.push(SourceReport {
                    name: source.name().to_string(),
                    substeps: 0,
                    absorbed_power: w(0.0),
                    deposited_power: w(0.0),
                });
                continue;
            }

            source.move_to(t);
            source.update_depth(mesh, comm, temperature)?;

            let beam_dt = source.beam().delta_t();
            let mut accumulated = vec![0.0; n_cells];
            let mut path_time = t;
            let mut weight = 0.0;
            let mut absorbed = 0.0;
            let mut deposited = 0.0;
            let mut substeps = 0;

            while next_time - path_time > eps {
                let step = beam_dt.min(next_time - path_time);
                path_time += step;
                source.move_to(path_time);

                let deposition = source.deposit(&self.integrator, mesh, comm)?;
                for (acc, q) in accumulated.iter_mut().zip(&deposition.q_dot) {
                    *acc += step * q;
                }
                absorbed += step * deposition.absorbed_power;
                deposited += step * deposition.deposited_power;
                weight += step;
                substeps += 1;
            }

            if weight > SMALL {
                for (total, acc) in self.q_dot.iter_mut().zip(&accumulated) {
                    *total += acc / weight;
                }
                absorbed /= weight;
                deposited /= weight;
            } else {
                debug!(
                    source = source.name(),
                    time = t,
                    dt,
                    eps,
                    "step shorter than path tolerance, source skipped"
                );
                absorbed = 0.0;
                deposited = 0.0;
            }

            let report = SourceReport {
                name: source.name().to_string(),
                substeps,
                absorbed_power: w(absorbed),
                deposited_power: w(deposited),
            };
            if comm.is_master() {
                info!(
                    source = %report.name,
                    time = next_time,
                    substeps,
                    absorbed_w = report.absorbed_power.get::<watt>(),
                    deposited_w = report.deposited_power.get::<watt>(),
                    "source power"
                );
            }
            reports.push(report);
        }

        Ok(StepReport {
            time: s(next_time),
            sources: reports,
        })
    }
}
