use super::neighbor_list::{NeighborFill, NeighborLists, ParticleIndex};
use crate::units::*;
use cgmath::prelude::*;
use std::marker::PhantomData;

pub type CellIndex = u64;

#[derive(Copy, Clone)]
struct Particle {
    pidx: ParticleIndex,
    cidx: CellIndex,
}

#[derive(Copy, Clone)]
struct Cell {
    first_particle: ParticleIndex,
    cidx: CellIndex,
}

// Cell coordinates are packed into 21 bits per axis.
const CELL_BITS: u32 = 21;
const CELL_COORD_OFFSET: i64 = 1 << (CELL_BITS - 1);
const CELL_COORD_MASK: i64 = (1 << CELL_BITS) - 1;

#[inline]
fn cell_index(cell: CellCoord) -> CellIndex {
    // coordinates outside of +-2^20 cells wrap around, that only costs extra distance checks
    let x = (cell[0] as i64 + CELL_COORD_OFFSET) & CELL_COORD_MASK;
    let y = (cell[1] as i64 + CELL_COORD_OFFSET) & CELL_COORD_MASK;
    let z = (cell[2] as i64 + CELL_COORD_OFFSET) & CELL_COORD_MASK;
    ((z << (2 * CELL_BITS)) | (y << CELL_BITS) | x) as CellIndex
}

/// Uniform grid with cell size equal to the search radius.
///
/// Particles are sorted by the index of the cell they are in, so every cell maps to a contiguous particle range.
pub struct NeighborhoodSearch<D: Dimension> {
    radius: Real,
    cell_size_inv: Real,

    particles: Vec<Particle>,
    cells: Vec<Cell>,

    dimension: PhantomData<D>,
}

impl<D: Dimension> NeighborhoodSearch<D> {
    /// * radius: Radius that determines if a point is a neighbor
    pub fn new(radius: Real) -> NeighborhoodSearch<D> {
        NeighborhoodSearch {
            radius,
            cell_size_inv: 1.0 / radius,
            particles: Vec::new(),
            cells: Vec::new(),
            dimension: PhantomData,
        }
    }

    fn update_cells(&mut self, positions: &[D::Point]) {
        microprofile::scope!("NeighborhoodSearch", "update_cells");

        // Particle count is fixed in practice, only (re)allocate when it changed.
        if self.particles.len() != positions.len() {
            self.particles.clear();
            self.particles.extend((0..positions.len()).map(|pidx| Particle {
                pidx: pidx as ParticleIndex,
                cidx: 0,
            }));
        }

        for p in self.particles.iter_mut() {
            p.cidx = cell_index(D::cell_coord(positions[p.pidx as usize], self.cell_size_inv));
        }

        // Sort by cell index. Sorting the previous order again is cheap since particles move little per step.
        self.particles.sort_by_key(|a| a.cidx);

        self.cells.clear();
        let mut prev_cidx = CellIndex::max_value();
        for (pidx, p) in self.particles.iter().enumerate() {
            if p.cidx != prev_cidx {
                self.cells.push(Cell {
                    first_particle: pidx as ParticleIndex,
                    cidx: p.cidx,
                });
                prev_cidx = p.cidx;
            }
        }
        self.cells.push(Cell {
            first_particle: self.particles.len() as ParticleIndex,
            cidx: CellIndex::max_value(),
        }); // sentinel cell
    }

    // Particle range of a cell, empty if the cell holds no particle.
    #[inline]
    fn cell_particles(&self, cidx: CellIndex) -> &[Particle] {
        let occupied_cells = &self.cells[..self.cells.len().saturating_sub(1)]; // without sentinel
        match occupied_cells.binary_search_by_key(&cidx, |c| c.cidx) {
            Ok(cell_arrayidx) => {
                let first = self.cells[cell_arrayidx].first_particle as usize;
                let last = self.cells[cell_arrayidx + 1].first_particle as usize;
                &self.particles[first..last]
            }
            Err(_) => &[],
        }
    }

    /// Calls `f` with every particle closer than the search radius, excluding `exclude`.
    pub fn foreach_neighbor(&self, positions: &[D::Point], position: D::Point, exclude: Option<usize>, mut f: impl FnMut(ParticleIndex)) {
        let radius_sq = self.radius * self.radius;
        D::foreach_adjacent_cell(D::cell_coord(position, self.cell_size_inv), |cell| {
            for p in self.cell_particles(cell_index(cell)) {
                let j = p.pidx as usize;
                if Some(j) == exclude {
                    continue;
                }
                if (positions[j] - position).magnitude2() < radius_sq {
                    f(p.pidx);
                }
            }
        });
    }

    /// Rebuilds all neighbor lists for the given positions.
    ///
    /// Lists that would overflow are truncated at capacity. Returns the number of truncated lists.
    pub fn update_particle_neighbors(&mut self, positions: &[D::Point], neighbor_lists: &mut NeighborLists) -> usize {
        microprofile::scope!("NeighborhoodSearch", "update_particle_neighbors");

        self.update_cells(positions);
        neighbor_lists.resize(positions.len());

        let searcher = &*self;
        neighbor_lists.par_rebuild(|i, slots| {
            let mut fill = NeighborFill::default();
            searcher.foreach_neighbor(positions, positions[i], Some(i), |j| {
                if fill.count < slots.len() {
                    slots[fill.count] = j;
                    fill.count += 1;
                } else {
                    fill.truncated = true;
                }
            });
            fill
        })
    }
}
