use std::path::Path;

use bf_deposition::{RefinementController, SubcyclingController};
use bf_mesh::{Mesh, SerialComm, TemperatureField};
use bf_project::{build_integrator, build_mesh, build_refinement, build_sources, load_yaml};
use uom::si::power::watt;

fn demos() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/cases")
}

#[test]
fn demos_load_and_build() {
    let root = demos();
    for name in ["single_track.yaml", "two_beams.yaml"] {
        let path = root.join(name);
        let case = load_yaml(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e));
        let mesh = build_mesh(case.mesh.as_ref().unwrap()).unwrap();
        let sources = build_sources(&case, &root, &mesh, &SerialComm)
            .unwrap_or_else(|e| panic!("Failed to build {}: {}", name, e));
        assert_eq!(sources.len(), case.sources.len());
        build_integrator(&case).unwrap();
    }
}

#[test]
fn single_track_first_step() {
    let root = demos();
    let case = load_yaml(&root.join("single_track.yaml")).unwrap();
    let mesh = build_mesh(case.mesh.as_ref().unwrap()).unwrap();
    let sources = build_sources(&case, &root, &mesh, &SerialComm).unwrap();
    assert_eq!(sources[0].boundary_points().len(), 2 * (40 + 16));

    let mut refinement = build_refinement(&case, &sources).unwrap();
    assert!(matches!(refinement, RefinementController::UniformIntervals(_)));
    assert!(refinement.update(&mesh, &sources, 0.0, 0));
    assert!(refinement.marker().iter().any(|&m| m > 0.0));

    let mut controller = SubcyclingController::new(sources, build_integrator(&case).unwrap());
    let temperature = TemperatureField::uniform(&mesh, 300.0);
    let dt = case.run.as_ref().unwrap().dt_s;
    let report = controller.update(&mesh, &SerialComm, &temperature, 0.0, dt).unwrap();

    let source = &report.sources[0];
    assert_eq!(source.substeps, 5);
    // Cold field: depth stays static, AR 0.6 gives eta_min.
    let absorbed = source.absorbed_power.get::<watt>();
    assert!((absorbed - 0.3 * 200.0).abs() < 1e-9);
    let total: f64 = controller
        .q_dot()
        .iter()
        .enumerate()
        .map(|(c, q)| q * mesh.volume(c))
        .sum();
    assert!((total - source.deposited_power.get::<watt>()).abs() < 1e-6 * absorbed);
}
