//! Collective operations across mesh partitions.
//!
//! Every partition runs the same deposition code on its own cells. The only
//! cross-partition traffic is a handful of collectives, which every rank must
//! call the same number of times in the same order.

use std::sync::{Arc, Barrier, Mutex, PoisonError};

use bf_core::{Real, Vec3, vec3};

/// Collective reductions over all partitions.
pub trait Communicator: Send + Sync {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    fn all_reduce_max(&self, value: Real) -> Real;

    fn all_reduce_sum(&self, value: Real) -> Real;

    /// Concatenate every rank's points, in rank order.
    fn all_gather(&self, points: &[Vec3]) -> Vec<Vec3>;

    fn is_master(&self) -> bool {
        self.rank() == 0
    }
}

/// Single-partition communicator; every collective is the identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialComm;

impl Communicator for SerialComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_reduce_max(&self, value: Real) -> Real {
        value
    }

    fn all_reduce_sum(&self, value: Real) -> Real {
        value
    }

    fn all_gather(&self, points: &[Vec3]) -> Vec<Vec3> {
        points.to_vec()
    }
}

#[derive(Debug)]
struct Shared {
    barrier: Barrier,
    slots: Mutex<Vec<Vec<Real>>>,
}

/// In-process communicator for a group of threads, one per partition.
///
/// Collectives block until every member of the group has called them.
#[derive(Debug, Clone)]
pub struct ThreadComm {
    rank: usize,
    size: usize,
    shared: Arc<Shared>,
}

impl ThreadComm {
    /// One communicator per rank; hand each to its own thread.
    pub fn group(size: usize) -> Vec<ThreadComm> {
        let size = size.max(1);
        let shared = Arc::new(Shared {
            barrier: Barrier::new(size),
            slots: Mutex::new(vec![Vec::new(); size]),
        });
        (0..size)
            .map(|rank| ThreadComm {
                rank,
                size,
                shared: Arc::clone(&shared),
            })
            .collect()
    }

    /// Publish `local` and return every rank's contribution in rank order.
    fn exchange(&self, local: Vec<Real>) -> Vec<Vec<Real>> {
        {
            let mut slots = self
                .shared
                .slots
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            slots[self.rank] = local;
        }
        self.shared.barrier.wait();
        let all = self
            .shared
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        // Nobody may overwrite a slot until everyone has read it.
        self.shared.barrier.wait();
        all
    }
}

impl Communicator for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn all_reduce_max(&self, value: Real) -> Real {
        self.exchange(vec![value])
            .iter()
            .flatten()
            .copied()
            .fold(Real::NEG_INFINITY, Real::max)
    }

    fn all_reduce_sum(&self, value: Real) -> Real {
        self.exchange(vec![value]).iter().flatten().sum()
    }

    fn all_gather(&self, points: &[Vec3]) -> Vec<Vec3> {
        let flat = points.iter().flat_map(|p| [p.x, p.y, p.z]).collect();
        self.exchange(flat)
            .iter()
            .flat_map(|rank| rank.chunks_exact(3).map(|c| vec3(c[0], c[1], c[2])))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_is_identity() {
        let comm = SerialComm;
        assert_eq!(comm.all_reduce_max(3.0), 3.0);
        assert_eq!(comm.all_reduce_sum(3.0), 3.0);
        assert!(comm.is_master());
    }

    #[test]
    fn thread_group_reduces() {
        let group = ThreadComm::group(4);
        let results: Vec<(Real, Real, usize)> = std::thread::scope(|s| {
            let handles: Vec<_> = group
                .iter()
                .map(|comm| {
                    s.spawn(move || {
                        let r = comm.rank() as Real;
                        let max = comm.all_reduce_max(r);
                        let sum = comm.all_reduce_sum(r + 1.0);
                        let pts = comm.all_gather(&vec![vec3(r, 0.0, 0.0); comm.rank()]);
                        (max, sum, pts.len())
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for (max, sum, n_points) in results {
            assert_eq!(max, 3.0);
            assert_eq!(sum, 10.0);
            assert_eq!(n_points, 6);
        }
    }

    #[test]
    fn gather_keeps_rank_order() {
        let group = ThreadComm::group(2);
        let gathered: Vec<Vec<Vec3>> = std::thread::scope(|s| {
            let handles: Vec<_> = group
                .iter()
                .map(|comm| s.spawn(move || comm.all_gather(&[vec3(comm.rank() as Real, 1.0, 2.0)])))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for points in gathered {
            assert_eq!(points, vec![vec3(0.0, 1.0, 2.0), vec3(1.0, 1.0, 2.0)]);
        }
    }
}
