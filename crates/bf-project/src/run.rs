//! Standalone driver: march a case over a static temperature field.
//!
//! Multi-rank cases run one thread per partition of the mesh along x.

use std::path::Path as FsPath;

use bf_core::{Energy, Real, j, s};
use bf_core::timing::{Timer, deposition_timing};
use bf_deposition::SubcyclingController;
use bf_mesh::{CartesianMesh, Communicator, Mesh, SerialComm, TemperatureField, ThreadComm};
use tracing::{debug, info};
use uom::si::power::watt;
use uom::si::time::second;

use crate::build::{build_integrator, build_mesh, build_refinement, build_sources};
use crate::schema::Case;
use crate::validate::ValidationError;
use crate::{ProjectError, ProjectResult};

/// Command line overrides for the case `run` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    pub dt_s: Option<Real>,
    pub t_end_s: Option<Real>,
}

/// Energy a source put into the domain over the run.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEnergy {
    pub name: String,
    pub absorbed: Energy,
    pub deposited: Energy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub steps: usize,
    pub substeps: usize,
    pub end_time_s: Real,
    pub refinement_updates: usize,
    pub sources: Vec<SourceEnergy>,
}

impl RunSummary {
    pub fn deposited(&self) -> Energy {
        self.sources.iter().fold(j(0.0), |acc, s| acc + s.deposited)
    }
}

fn missing(field: &str, reason: &str) -> ProjectError {
    ValidationError::MissingValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// Run `case` from t = 0 to its end time (or `options.t_end_s`).
///
/// Scan path files are resolved against `case_dir`.
pub fn run_case(case: &Case, case_dir: &FsPath, options: &RunOptions) -> ProjectResult<RunSummary> {
    let mesh_def = case
        .mesh
        .as_ref()
        .ok_or_else(|| missing("mesh", "required for a standalone run"))?;
    let run = case.run.as_ref();
    let dt = options
        .dt_s
        .or(run.map(|r| r.dt_s))
        .ok_or_else(|| missing("run.dt_s", "give it in the case or on the command line"))?;
    if !(dt.is_finite() && dt > 0.0) {
        return Err(ValidationError::InvalidValue {
            field: "dt".to_string(),
            value: dt.to_string(),
            reason: "must be positive and finite".to_string(),
        }
        .into());
    }
    let t_end = options.t_end_s.unwrap_or(case.end_time_s);
    let ranks = run.map_or(1, |r| r.ranks);
    let temperature = run.map_or(300.0, |r| r.temperature_k);

    let global = build_mesh(mesh_def)?;
    info!(
        case = %case.name,
        cells = global.n_cells(),
        ranks,
        dt,
        t_end,
        "starting run"
    );
    deposition_timing::reset_all();
    let timer = Timer::start("deposition run");

    let summary = if ranks <= 1 {
        run_rank(case, case_dir, &global, &SerialComm, dt, t_end, temperature)?
    } else {
        let group = ThreadComm::group(ranks);
        let results: Vec<ProjectResult<RunSummary>> = std::thread::scope(|s| {
            let handles: Vec<_> = group
                .iter()
                .map(|comm| {
                    let global = &global;
                    s.spawn(move || {
                        let part = global.partition(comm.rank(), comm.size())?;
                        run_rank(case, case_dir, &part, comm, dt, t_end, temperature)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| {
                    h.join().unwrap_or_else(|_| {
                        Err(ProjectError::Run {
                            what: "a partition thread panicked".to_string(),
                        })
                    })
                })
                .collect()
        });
        // Reported powers are reduced, so every rank holds the same summary.
        let mut first = None;
        for result in results {
            let summary = result?;
            first.get_or_insert(summary);
        }
        first.ok_or_else(|| ProjectError::Run {
            what: "no partitions ran".to_string(),
        })?
    };

    timer.stop_and_log();
    deposition_timing::log_summary();
    Ok(summary)
}

fn run_rank(
    case: &Case,
    case_dir: &FsPath,
    mesh: &CartesianMesh,
    comm: &dyn Communicator,
    dt_max: Real,
    t_end: Real,
    temperature_k: Real,
) -> ProjectResult<RunSummary> {
    let sources = build_sources(case, case_dir, mesh, comm)?;
    let mut refinement = build_refinement(case, &sources)?;
    let integrator = build_integrator(case)?;
    let eps = integrator.settings().eps;
    let mut controller = SubcyclingController::new(sources, integrator);
    let temperature = TemperatureField::uniform(mesh, temperature_k);

    let mut summary = RunSummary {
        steps: 0,
        substeps: 0,
        end_time_s: 0.0,
        refinement_updates: 0,
        sources: controller
            .sources()
            .iter()
            .map(|s| SourceEnergy {
                name: s.name().to_string(),
                absorbed: j(0.0),
                deposited: j(0.0),
            })
            .collect(),
    };

    let mut t = 0.0;
    while t_end - t > eps {
        let dt = controller.adjust_step(t, dt_max.min(t_end - t));
        if refinement.update(mesh, controller.sources(), t, summary.steps) {
            summary.refinement_updates += 1;
        }
        let report = controller.update(mesh, comm, &temperature, t, dt)?;
        for (energy, source) in summary.sources.iter_mut().zip(&report.sources) {
            energy.absorbed += source.absorbed_power * s(dt);
            energy.deposited += source.deposited_power * s(dt);
            summary.substeps += source.substeps;
        }
        if comm.is_master() {
            debug!(
                step = summary.steps,
                time = report.time.get::<second>(),
                dt,
                deposited_w = report.deposited_power().get::<watt>(),
                "step done"
            );
        }
        t += dt;
        summary.steps += 1;
    }
    summary.end_time_s = t;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::single_track;
    use uom::si::energy::joule;

    fn write_track(dir: &FsPath) {
        std::fs::create_dir_all(dir).unwrap();
        let text = "Mode\tX(m)\tY(m)\tZ(m)\tPower(W)\ttParam\n\
                    1\t1e-4\t0\t0\t0\t0\n\
                    0\t9e-4\t0\t0\t200\t0.8\n";
        std::fs::write(dir.join("single_track.scanpath"), text).unwrap();
    }

    #[test]
    fn constant_absorption_energy() {
        let dir = std::env::temp_dir().join("bf_project_run_energy");
        write_track(&dir);
        let case = single_track();
        let options = RunOptions {
            dt_s: None,
            t_end_s: Some(2e-4),
        };
        let summary = run_case(&case, &dir, &options).unwrap();
        assert_eq!(summary.steps, 4);
        assert_eq!(summary.substeps, 20);
        assert!((summary.end_time_s - 2e-4).abs() < 1e-12);
        let source = &summary.sources[0];
        let absorbed = source.absorbed.get::<joule>();
        let deposited = source.deposited.get::<joule>();
        assert!((absorbed - 0.35 * 200.0 * 2e-4).abs() < 1e-9);
        assert!(deposited > 0.0);
        assert!(deposited <= absorbed * 1.05);
    }

    #[test]
    fn partitions_agree_with_serial() {
        let dir = std::env::temp_dir().join("bf_project_run_partitions");
        write_track(&dir);
        let options = RunOptions {
            dt_s: Some(1e-4),
            t_end_s: Some(3e-4),
        };
        let serial = run_case(&single_track(), &dir, &options).unwrap();

        let mut case = single_track();
        if let Some(run) = case.run.as_mut() {
            run.ranks = 3;
        }
        let parallel = run_case(&case, &dir, &options).unwrap();
        assert_eq!(parallel.steps, serial.steps);
        let (a, b) = (
            parallel.deposited().get::<joule>(),
            serial.deposited().get::<joule>(),
        );
        assert!((a - b).abs() <= 1e-9 * b);
    }

    #[test]
    fn mesh_is_required() {
        let mut case = single_track();
        case.mesh = None;
        let err = run_case(&case, FsPath::new("."), &RunOptions::default()).unwrap_err();
        assert!(err.to_string().contains("mesh"));
    }
}
