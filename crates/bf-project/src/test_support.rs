//! Shared case fixtures for unit tests.

use crate::schema::*;

/// One super-Gaussian beam on a small block, valid as written.
pub(crate) fn single_track() -> Case {
    Case {
        version: 1,
        name: "single track".to_string(),
        end_time_s: 1e-3,
        sources: vec![SourceDef {
            name: "beam0".to_string(),
            path_file: "single_track.scanpath".to_string(),
            absorption: AbsorptionDef {
                model: "constant".to_string(),
                eta: Some(0.35),
                geometry: None,
                eta0: None,
                eta_min: None,
            },
            heat_source: HeatSourceDef {
                model: "super_gaussian".to_string(),
                dimensions_m: [50e-6, 50e-6, 30e-6],
                k: Some(2.0),
                m: None,
                a: None,
                b: None,
                spot_ring: None,
                transient: false,
                iso_value_k: None,
                search_radius_m: None,
            },
            normalize: true,
            scan_patch: None,
            delta_t_s: Some(1e-5),
            hit_path_intervals: true,
        }],
        deposition: DepositionDef::default(),
        refinement: None,
        mesh: Some(MeshDef {
            min_m: [0.0, -2e-4, -2e-4],
            max_m: [1e-3, 2e-4, 0.0],
            cells: [40, 16, 8],
        }),
        run: Some(RunDef {
            dt_s: 5e-5,
            temperature_k: 300.0,
            ranks: 1,
        }),
    }
}
