use super::error::{SphError, SphResult};
use rayon::prelude::*;

pub type ParticleIndex = u32;

/// Fixed capacity neighbor lists for all particles, stored in one flat buffer.
///
/// Particle i owns the slots `[i * capacity, (i + 1) * capacity)`, of which the first `counts[i]` are valid.
/// A particle never lists itself.
pub struct NeighborLists {
    capacity: usize,
    indices: Vec<ParticleIndex>,
    counts: Vec<u32>,
}

impl NeighborLists {
    pub fn new(capacity: usize) -> NeighborLists {
        NeighborLists {
            capacity,
            indices: Vec::new(),
            counts: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of particles lists are allocated for.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Allocates lists for `num_particles` particles. New lists start out empty.
    pub fn resize(&mut self, num_particles: usize) {
        self.indices.resize(num_particles * self.capacity, 0);
        self.counts.resize(num_particles, 0);
    }

    #[inline(always)]
    pub fn neighbors(&self, particle: usize) -> &[ParticleIndex] {
        let start = particle * self.capacity;
        &self.indices[start..start + self.counts[particle] as usize]
    }

    #[inline]
    pub fn num_neighbors(&self, particle: usize) -> usize {
        self.counts[particle] as usize
    }

    /// Replaces the neighbor list of a single particle.
    pub fn set_neighbors(&mut self, particle: usize, neighbors: &[ParticleIndex]) -> SphResult<()> {
        if particle >= self.len() {
            return Err(SphError::ParticleIndexOutOfRange {
                particle,
                num_particles: self.len(),
            });
        }
        if neighbors.len() > self.capacity {
            return Err(SphError::NeighborCapacityExceeded {
                particle,
                count: neighbors.len(),
                capacity: self.capacity,
            });
        }
        let start = particle * self.capacity;
        self.indices[start..start + neighbors.len()].copy_from_slice(neighbors);
        self.counts[particle] = neighbors.len() as u32;
        Ok(())
    }

    /// Rebuilds every list in parallel.
    ///
    /// `f` receives a particle index and the slots of its list. It returns how many slots it filled.
    /// Returns the number of particles whose candidates did not all fit.
    pub(super) fn par_rebuild(&mut self, f: impl Fn(usize, &mut [ParticleIndex]) -> NeighborFill + Sync + Send) -> usize {
        if self.capacity == 0 {
            return 0;
        }
        self.indices
            .par_chunks_mut(self.capacity)
            .zip(self.counts.par_iter_mut())
            .enumerate()
            .map(|(i, (slots, count))| {
                let fill = f(i, slots);
                *count = fill.count as u32;
                fill.truncated as usize
            })
            .sum::<usize>()
    }

    /// Checks that every list respects the capacity and only refers to existing particles.
    pub fn validate(&self, num_particles: usize) -> SphResult<()> {
        if self.len() != num_particles {
            return Err(SphError::ParticleCountMismatch {
                expected: num_particles,
                found: self.len(),
            });
        }
        for particle in 0..num_particles {
            let count = self.counts[particle] as usize;
            if count > self.capacity {
                return Err(SphError::NeighborCapacityExceeded {
                    particle,
                    count,
                    capacity: self.capacity,
                });
            }
            if let Some(&neighbor) = self.neighbors(particle).iter().find(|&&j| j as usize >= num_particles) {
                return Err(SphError::NeighborIndexOutOfRange {
                    particle,
                    neighbor: neighbor as usize,
                    num_particles,
                });
            }
        }
        Ok(())
    }
}

/// Result of filling a single neighbor list.
#[derive(Copy, Clone, Debug, Default)]
pub(super) struct NeighborFill {
    pub count: usize,
    pub truncated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_read_back() {
        let mut lists = NeighborLists::new(4);
        lists.resize(3);
        lists.set_neighbors(1, &[0, 2]).unwrap();
        assert_eq!(lists.neighbors(0), &[] as &[ParticleIndex]);
        assert_eq!(lists.neighbors(1), &[0, 2]);
        assert_eq!(lists.num_neighbors(1), 2);
        lists.validate(3).unwrap();
    }

    #[test]
    fn rejects_overfull_list() {
        let mut lists = NeighborLists::new(2);
        lists.resize(4);
        let err = lists.set_neighbors(0, &[1, 2, 3]).unwrap_err();
        assert!(matches!(
            err,
            SphError::NeighborCapacityExceeded {
                particle: 0,
                count: 3,
                capacity: 2
            }
        ));
        assert_eq!(lists.num_neighbors(0), 0);
    }

    #[test]
    fn rejects_unknown_particle() {
        let mut lists = NeighborLists::new(4);
        lists.resize(2);
        assert!(matches!(
            lists.set_neighbors(5, &[0]),
            Err(SphError::ParticleIndexOutOfRange {
                particle: 5,
                num_particles: 2
            })
        ));
        assert!(matches!(
            lists.set_neighbors(2, &[]),
            Err(SphError::ParticleIndexOutOfRange { particle: 2, .. })
        ));
        lists.validate(2).unwrap();
    }

    #[test]
    fn validate_catches_dangling_indices() {
        let mut lists = NeighborLists::new(3);
        lists.resize(2);
        lists.set_neighbors(1, &[0, 5]).unwrap();
        assert!(matches!(
            lists.validate(2),
            Err(SphError::NeighborIndexOutOfRange { particle: 1, neighbor: 5, .. })
        ));
        assert!(matches!(lists.validate(3), Err(SphError::ParticleCountMismatch { .. })));
    }

    #[test]
    fn parallel_rebuild_reports_truncation() {
        let mut lists = NeighborLists::new(2);
        lists.resize(5);
        let truncated = lists.par_rebuild(|i, slots| {
            let wanted = i; // particle i wants i neighbors
            let count = wanted.min(slots.len());
            for (k, slot) in slots.iter_mut().take(count).enumerate() {
                *slot = k as ParticleIndex;
            }
            NeighborFill {
                count,
                truncated: wanted > count,
            }
        });
        assert_eq!(truncated, 2);
        assert_eq!(lists.neighbors(4), &[0, 1]);
        assert_eq!(lists.neighbors(1), &[0]);
    }
}
