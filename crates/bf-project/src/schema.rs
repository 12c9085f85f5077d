//! Case file schema definitions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Case {
    pub version: u32,
    pub name: String,
    /// Simulation end time; scan paths are clipped to it.
    pub end_time_s: f64,
    #[serde(default)]
    pub sources: Vec<SourceDef>,
    #[serde(default)]
    pub deposition: DepositionDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refinement: Option<RefinementDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<MeshDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<RunDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceDef {
    pub name: String,
    /// Scan path file, relative to the case file directory.
    pub path_file: String,
    pub absorption: AbsorptionDef,
    pub heat_source: HeatSourceDef,
    #[serde(default = "default_true")]
    pub normalize: bool,
    /// Boundary patch whose edge suppresses the power correction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_patch: Option<String>,
    /// Largest beam sub-step; unbounded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_t_s: Option<f64>,
    #[serde(default = "default_true")]
    pub hit_path_intervals: bool,
}

/// Absorption model selection. `model` is `constant` or `kelly`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AbsorptionDef {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta: Option<f64>,
    /// Kelly cavity geometry: `cone` or `cylinder`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta0: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta_min: Option<f64>,
}

/// Distribution selection. Coefficients needed by `model` are mandatory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeatSourceDef {
    pub model: String,
    /// Half-widths (x, y) and depth (z).
    pub dimensions_m: [f64; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot_ring: Option<SpotRingDef>,
    #[serde(default)]
    pub transient: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso_value_k: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_radius_m: Option<f64>,
}

/// Spot + ring coefficients. With `preset` the power split and widths come
/// from the beam-shaping table and the explicit values are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpotRingDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot_radius_m: Option<f64>,
    pub spot_k: f64,
    pub spot_m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ring_radius_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ring_half_width_m: Option<f64>,
    pub ring_k: f64,
    pub ring_m: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepositionDef {
    #[serde(default = "default_cull_factor")]
    pub cull_factor: f64,
    #[serde(default = "default_samples_per_scale")]
    pub samples_per_scale: usize,
    #[serde(default = "default_max_samples")]
    pub max_samples_per_axis: usize,
    #[serde(default = "default_correction_tolerance")]
    pub correction_tolerance: f64,
    #[serde(default = "default_eps")]
    pub eps: f64,
    #[serde(default = "default_step_dilation")]
    pub step_dilation: f64,
}

impl Default for DepositionDef {
    fn default() -> Self {
        Self {
            cull_factor: default_cull_factor(),
            samples_per_scale: default_samples_per_scale(),
            max_samples_per_axis: default_max_samples(),
            correction_tolerance: default_correction_tolerance(),
            eps: default_eps(),
            step_dilation: default_step_dilation(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RefinementDef {
    None,
    UniformIntervals { intervals: usize, n_levels: usize },
}

/// Rectilinear mesh for standalone runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeshDef {
    pub min_m: [f64; 3],
    pub max_m: [f64; 3],
    pub cells: [usize; 3],
}

/// Standalone driver options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunDef {
    pub dt_s: f64,
    #[serde(default = "default_temperature")]
    pub temperature_k: f64,
    /// In-process partitions, one thread each.
    #[serde(default = "default_ranks")]
    pub ranks: usize,
}

fn default_true() -> bool {
    true
}

fn default_cull_factor() -> f64 {
    2.0
}

fn default_samples_per_scale() -> usize {
    4
}

fn default_max_samples() -> usize {
    8
}

fn default_correction_tolerance() -> f64 {
    0.05
}

fn default_eps() -> f64 {
    1e-10
}

fn default_step_dilation() -> f64 {
    0.01
}

fn default_temperature() -> f64 {
    300.0
}

fn default_ranks() -> usize {
    1
}
