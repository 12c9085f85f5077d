//! Rectilinear hexahedral mesh.

use std::collections::HashMap;
use std::ops::Range;

use bf_core::{BoundBox, Real, Vec3, vec3};
use tracing::debug;

use crate::error::{MeshError, MeshResult};
use crate::mesh::{CoupledFace, Mesh};

/// Boundary patch names, in axis order.
pub const PATCH_NAMES: [&str; 6] = ["x_min", "x_max", "y_min", "y_max", "z_min", "z_max"];

/// Tensor-product hex mesh, optionally one x-slab of a partitioned domain.
///
/// Local cells are numbered x-fastest: `((k * ny) + j) * nx_local + i_local`.
#[derive(Debug, Clone)]
pub struct CartesianMesh {
    nodes: [Vec<Real>; 3],
    /// Global x cell indices owned by this partition.
    x_cells: Range<usize>,
    internal: Vec<(usize, usize)>,
    coupled: Vec<CoupledFace>,
    patches: HashMap<String, Vec<Vec3>>,
}

fn check_nodes(nodes: &[Real], axis: &'static str) -> MeshResult<()> {
    let increasing = nodes.windows(2).all(|w| w[1] > w[0]);
    if nodes.len() < 2 || !increasing || nodes.iter().any(|v| !v.is_finite()) {
        return Err(MeshError::InvalidNodes { axis });
    }
    Ok(())
}

fn mid(nodes: &[Real], i: usize) -> Real {
    0.5 * (nodes[i] + nodes[i + 1])
}

/// Cells along one axis whose closed extent overlaps `[lo, hi]`.
fn overlapping(nodes: &[Real], lo: Real, hi: Real) -> Range<usize> {
    let n = nodes.len() - 1;
    let first = nodes[1..].partition_point(|&v| v < lo);
    let last = nodes[..n].partition_point(|&v| v <= hi);
    first..last.max(first)
}

impl CartesianMesh {
    /// Whole-domain mesh from node coordinates along each axis.
    pub fn new(x: Vec<Real>, y: Vec<Real>, z: Vec<Real>) -> MeshResult<Self> {
        check_nodes(&x, "x")?;
        check_nodes(&y, "y")?;
        check_nodes(&z, "z")?;
        let nx = x.len() - 1;
        Ok(Self::build([x, y, z], 0..nx))
    }

    /// Evenly spaced mesh over `[min, max]`.
    pub fn uniform(min: Vec3, max: Vec3, cells: [usize; 3]) -> MeshResult<Self> {
        let axis = |a: usize| -> Vec<Real> {
            let n = cells[a].max(1);
            (0..=n)
                .map(|i| min[a] + (max[a] - min[a]) * i as Real / n as Real)
                .collect()
        };
        if cells.contains(&0) {
            return Err(MeshError::InvalidArg {
                what: "cell counts must be positive",
            });
        }
        Self::new(axis(0), axis(1), axis(2))
    }

    /// The slab of x cells owned by `rank` out of `size` partitions.
    pub fn partition(&self, rank: usize, size: usize) -> MeshResult<Self> {
        let nx = self.nodes[0].len() - 1;
        if size == 0 || rank >= size {
            return Err(MeshError::InvalidArg {
                what: "rank must be below partition count",
            });
        }
        if nx < size {
            return Err(MeshError::Partition {
                cells: nx,
                ranks: size,
            });
        }
        let base = nx / size;
        let extra = nx % size;
        let start = rank * base + rank.min(extra);
        let len = base + usize::from(rank < extra);
        debug!(rank, size, start, len, "partitioned Cartesian mesh");
        Ok(Self::build(self.nodes.clone(), start..start + len))
    }

    fn build(nodes: [Vec<Real>; 3], x_cells: Range<usize>) -> Self {
        let mut mesh = Self {
            nodes,
            x_cells,
            internal: Vec::new(),
            coupled: Vec::new(),
            patches: HashMap::new(),
        };
        mesh.connect();
        mesh
    }

    fn connect(&mut self) {
        let [nx, ny, nz] = self.local_cells();
        let index = |i: usize, j: usize, k: usize| (k * ny + j) * nx + i;
        let global_nx = self.nodes[0].len() - 1;
        let [x, y, z] = &self.nodes;

        let mut internal = Vec::new();
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let c = index(i, j, k);
                    if i + 1 < nx {
                        internal.push((c, index(i + 1, j, k)));
                    }
                    if j + 1 < ny {
                        internal.push((c, index(i, j + 1, k)));
                    }
                    if k + 1 < nz {
                        internal.push((c, index(i, j, k + 1)));
                    }
                }
            }
        }

        let first = self.x_cells.start;
        let last = self.x_cells.end - 1;
        let mut coupled = Vec::new();
        for k in 0..nz {
            for j in 0..ny {
                let (yc, zc) = (mid(y, j), mid(z, k));
                if first > 0 {
                    coupled.push(CoupledFace {
                        owner: index(0, j, k),
                        neighbour_centre: vec3(mid(x, first - 1), yc, zc),
                    });
                }
                if last + 1 < global_nx {
                    coupled.push(CoupledFace {
                        owner: index(nx - 1, j, k),
                        neighbour_centre: vec3(mid(x, last + 1), yc, zc),
                    });
                }
            }
        }

        self.internal = internal;
        self.coupled = coupled;
        self.patches = self.patch_edges();
    }

    /// Perimeter nodes of each domain face owned by this partition. A node
    /// plane in x belongs to the partition whose first cell starts on it; the
    /// last partition also owns the closing plane.
    fn patch_edges(&self) -> HashMap<String, Vec<Vec3>> {
        let [x, y, z] = &self.nodes;
        let global_nx = x.len() - 1;
        let x_end = if self.x_cells.end == global_nx {
            global_nx + 1
        } else {
            self.x_cells.end
        };
        let local: [&[Real]; 3] = [&x[self.x_cells.start..x_end], y.as_slice(), z.as_slice()];
        let lo = [x[0], y[0], z[0]];
        let hi = [x[global_nx], y[y.len() - 1], z[z.len() - 1]];
        let owns_side = |a: usize, side: Real| a != 0 || local[0].contains(&side);

        let mut patches = HashMap::new();
        for a in 0..3 {
            let (b, c) = ((a + 1) % 3, (a + 2) % 3);
            for (side, name) in [(lo[a], PATCH_NAMES[2 * a]), (hi[a], PATCH_NAMES[2 * a + 1])] {
                let mut points = Vec::new();
                if owns_side(a, side) {
                    for &ub in local[b] {
                        for &uc in local[c] {
                            let on_edge = ub == lo[b] || ub == hi[b] || uc == lo[c] || uc == hi[c];
                            if on_edge {
                                let mut p = Vec3::zeros();
                                p[a] = side;
                                p[b] = ub;
                                p[c] = uc;
                                points.push(p);
                            }
                        }
                    }
                }
                patches.insert(name.to_string(), points);
            }
        }
        patches
    }

    /// Cell counts owned by this partition.
    pub fn local_cells(&self) -> [usize; 3] {
        [
            self.x_cells.len(),
            self.nodes[1].len() - 1,
            self.nodes[2].len() - 1,
        ]
    }

    /// Cell counts of the whole domain.
    pub fn global_cells(&self) -> [usize; 3] {
        [
            self.nodes[0].len() - 1,
            self.nodes[1].len() - 1,
            self.nodes[2].len() - 1,
        ]
    }

    /// Bounds of the whole (unpartitioned) domain.
    pub fn domain(&self) -> BoundBox {
        let first = |a: usize| self.nodes[a][0];
        let last = |a: usize| self.nodes[a][self.nodes[a].len() - 1];
        BoundBox::new(
            vec3(first(0), first(1), first(2)),
            vec3(last(0), last(1), last(2)),
        )
    }

    /// Local cell index of local (i, j, k).
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        let [nx, ny, _] = self.local_cells();
        (k * ny + j) * nx + i
    }

    fn ijk(&self, cell: usize) -> (usize, usize, usize) {
        let [nx, ny, _] = self.local_cells();
        (cell % nx, (cell / nx) % ny, cell / (nx * ny))
    }
}

impl Mesh for CartesianMesh {
    fn n_cells(&self) -> usize {
        let [nx, ny, nz] = self.local_cells();
        nx * ny * nz
    }

    fn centre(&self, cell: usize) -> Vec3 {
        self.bounds(cell).centre()
    }

    fn volume(&self, cell: usize) -> Real {
        self.bounds(cell).volume()
    }

    fn bounds(&self, cell: usize) -> BoundBox {
        let (i, j, k) = self.ijk(cell);
        let gi = self.x_cells.start + i;
        let [x, y, z] = &self.nodes;
        BoundBox::new(
            vec3(x[gi], y[j], z[k]),
            vec3(x[gi + 1], y[j + 1], z[k + 1]),
        )
    }

    fn is_hex(&self, _cell: usize) -> bool {
        true
    }

    fn internal_faces(&self) -> &[(usize, usize)] {
        &self.internal
    }

    fn coupled_faces(&self) -> &[CoupledFace] {
        &self.coupled
    }

    fn patch_edge_points(&self, name: &str) -> Option<&[Vec3]> {
        self.patches.get(name).map(Vec::as_slice)
    }

    fn cells_overlapping(&self, region: &BoundBox) -> Vec<usize> {
        let [x, y, z] = &self.nodes;
        let xs = overlapping(x, region.min.x, region.max.x);
        let xs = xs.start.max(self.x_cells.start)..xs.end.min(self.x_cells.end);
        let ys = overlapping(y, region.min.y, region.max.y);
        let zs = overlapping(z, region.min.z, region.max.z);

        let mut cells = Vec::with_capacity(xs.len() * ys.len() * zs.len());
        for k in zs {
            for j in ys.clone() {
                for gi in xs.clone() {
                    cells.push(self.index(gi - self.x_cells.start, j, k));
                }
            }
        }
        cells
    }
}
