use crate::units::*;
use cgmath::prelude::*;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use super::config::{ParticleSystemConfig, SceneConfig};
use super::error::{SphError, SphResult};
use super::neighbor_list::NeighborLists;
use super::neighborhood_search::NeighborhoodSearch;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Material {
    Fluid,
    /// Static particle. Takes part in density and pressure computation but is never moved.
    Boundary,
}

/// Particle attributes as structure of arrays, all indexed by particle index.
pub struct Particles<D: Dimension> {
    pub positions: Vec<D::Point>,
    pub velocities: Vec<D::Vector>,
    pub densities: Vec<Real>, // Local densities ρ
    pub pressures: Vec<Real>,
    pub materials: Vec<Material>,

    pub neighbors: NeighborLists,
}

impl<D: Dimension> Particles<D> {
    pub fn new(max_neighbors: usize) -> Particles<D> {
        Particles {
            positions: Vec::new(),
            velocities: Vec::new(),
            densities: Vec::new(),
            pressures: Vec::new(),
            materials: Vec::new(),
            neighbors: NeighborLists::new(max_neighbors),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn num_fluid_particles(&self) -> usize {
        self.materials.iter().filter(|&&m| m == Material::Fluid).count()
    }

    pub fn num_boundary_particles(&self) -> usize {
        self.len() - self.num_fluid_particles()
    }

    /// Appends a single particle with zero pressure and an empty neighbor list.
    pub fn push(&mut self, position: D::Point, velocity: D::Vector, density: Real, material: Material) {
        self.positions.push(position);
        self.velocities.push(velocity);
        self.densities.push(density);
        self.pressures.push(0.0);
        self.materials.push(material);
        self.neighbors.resize(self.positions.len());
    }

    /// Checks that all attribute arrays and neighbor lists describe the same particles.
    pub fn validate(&self) -> SphResult<()> {
        let expected = self.positions.len();
        for found in [
            self.velocities.len(),
            self.densities.len(),
            self.pressures.len(),
            self.materials.len(),
            self.neighbors.len(),
        ] {
            if found != expected {
                return Err(SphError::ParticleCountMismatch { expected, found });
            }
        }
        Ok(())
    }
}

/// Properties that stay constant over the lifetime of a fluid world.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FluidProperties {
    particle_radius: Real,
    support_radius: Real,
    particle_volume: Real,
}

impl FluidProperties {
    pub fn new<D: Dimension>(config: &ParticleSystemConfig) -> SphResult<FluidProperties> {
        config.validate()?;
        let particle_diameter = 2.0 * config.particle_radius;
        Ok(FluidProperties {
            particle_radius: config.particle_radius,
            support_radius: config.particle_radius * config.support_radius_factor,
            particle_volume: config.volume_factor * particle_diameter.powi(D::DIM as i32),
        })
    }

    pub fn particle_radius(&self) -> Real {
        self.particle_radius
    }

    /// Spacing of particles in a resting lattice.
    pub fn particle_diameter(&self) -> Real {
        2.0 * self.particle_radius
    }

    /// Radius h beyond which particles do not interact, typically four particle radii.
    pub fn support_radius(&self) -> Real {
        self.support_radius
    }

    pub fn particle_volume(&self) -> Real {
        self.particle_volume
    }

    pub fn particle_mass(&self, rest_density: Real) -> Real {
        rest_density * self.particle_volume
    }
}

/// Copy of the particle state handed to downstream consumers such as renderers.
#[derive(Clone, Debug, Serialize)]
#[serde(bound = "")]
pub struct ParticleSnapshot<D: Dimension> {
    pub positions: Vec<D::Point>,
    pub velocities: Vec<D::Vector>,
    pub densities: Vec<Real>,
    pub pressures: Vec<Real>,
    pub materials: Vec<Material>,
}

pub struct FluidParticleWorld<D: Dimension> {
    pub particles: Particles<D>,
    pub properties: FluidProperties,

    max_particles: usize,
    neighborhood_search: NeighborhoodSearch<D>,
}

impl<D: Dimension> FluidParticleWorld<D> {
    pub fn new(config: &ParticleSystemConfig) -> SphResult<FluidParticleWorld<D>> {
        let properties = FluidProperties::new::<D>(config)?;
        log::info!(
            "{}D fluid world: particle radius {}, support radius {}, particle volume {}",
            D::DIM,
            properties.particle_radius(),
            properties.support_radius(),
            properties.particle_volume()
        );
        Ok(FluidParticleWorld {
            particles: Particles::new(config.max_neighbors),
            properties,
            max_particles: config.max_particles,
            neighborhood_search: NeighborhoodSearch::new(properties.support_radius()),
        })
    }

    pub fn max_particles(&self) -> usize {
        self.max_particles
    }

    fn reserve_particles(&mut self, additional: usize) -> SphResult<()> {
        let requested = self.particles.len().checked_add(additional).unwrap_or(usize::MAX);
        if requested > self.max_particles {
            return Err(SphError::ParticleCapacityExceeded {
                requested,
                capacity: self.max_particles,
            });
        }
        self.particles.positions.reserve(additional);
        Ok(())
    }

    fn num_particles_along(&self, length: Real) -> SphResult<usize> {
        if !(length.is_finite() && length >= 0.0) {
            return Err(SphError::InvalidConfig(format!("extent must be finite and non-negative, got {}", length)));
        }
        let count = (length / self.properties.particle_diameter()).round();
        if count > self.max_particles as Real {
            return Err(SphError::ParticleCapacityExceeded {
                requested: count as usize, // saturating
                capacity: self.max_particles,
            });
        }
        Ok(std::cmp::max(1, count as usize))
    }

    /// Seeds a lattice of fluid particles filling the axis aligned box `[lower_corner, lower_corner + size]`.
    ///
    /// - `jitter`: Amount of jitter. 0 for perfect lattice. >1 and particles are no longer in a strict lattice.
    pub fn add_fluid_block(&mut self, lower_corner: D::Point, size: D::Vector, velocity: D::Vector, density: Real, jitter: Real) -> SphResult<usize> {
        if !(density.is_finite() && density > 0.0) {
            return Err(SphError::InvalidConfig(format!("initial density must be positive, got {}", density)));
        }
        let lower_corner_vec = lower_corner.to_vec();
        let mut counts = Vec::with_capacity(D::DIM);
        for axis in 0..D::DIM {
            if !lower_corner_vec[axis].is_finite() {
                return Err(SphError::InvalidConfig(format!("lower corner must be finite, got {:?}", lower_corner)));
            }
            counts.push(self.num_particles_along(size[axis])?);
        }
        let num_particles = counts
            .iter()
            .try_fold(1usize, |product, &count| product.checked_mul(count))
            .unwrap_or(usize::MAX);
        self.reserve_particles(num_particles)?;

        let step = self.properties.particle_diameter();
        let jitter_factor = step * jitter;
        let mut rng: rand::rngs::SmallRng = rand::SeedableRng::seed_from_u64(self.particles.len() as u64);
        let mut lattice_index = vec![0usize; D::DIM];
        let mut components = vec![0.0 as Real; D::DIM];
        for _ in 0..num_particles {
            for axis in 0..D::DIM {
                let jitter = (rng.gen::<Real>() - 0.5) * jitter_factor;
                components[axis] = lower_corner_vec[axis] + (lattice_index[axis] as Real + 0.5) * step + jitter;
            }
            self.particles.push(D::point_from_slice(&components), velocity, density, Material::Fluid);

            // advance the lattice index like an odometer
            for axis in 0..D::DIM {
                lattice_index[axis] += 1;
                if lattice_index[axis] < counts[axis] {
                    break;
                }
                lattice_index[axis] = 0;
            }
        }
        Ok(num_particles)
    }

    /// Places a line of static boundary particles between `start` and `end` (both inclusive).
    pub fn add_boundary_line(&mut self, start: D::Point, end: D::Point, density: Real) -> SphResult<usize> {
        let num_segments = self.num_particles_along((end - start).magnitude())?;
        let num_particles = num_segments + 1;
        self.reserve_particles(num_particles)?;
        let step = (end - start) / (num_segments as Real);

        let mut pos = start;
        for _ in 0..num_particles {
            self.particles.push(pos, D::Vector::zero(), density, Material::Boundary);
            pos += step;
        }
        Ok(num_particles)
    }

    /// Seeds all fluid blocks and boundary lines of a scene. Boundary particles start out at `rest_density`.
    pub fn add_scene(&mut self, scene: &SceneConfig, rest_density: Real) -> SphResult<()> {
        for block in &scene.fluid_blocks {
            let num_particles = self.add_fluid_block(
                D::point_from_slice(&block.lower_corner),
                D::vector_from_slice(&block.size),
                D::vector_from_slice(&block.velocity),
                block.density,
                block.jitter,
            )?;
            log::debug!("added fluid block with {} particles at {:?}", num_particles, block.lower_corner);
        }
        for line in &scene.boundary_lines {
            self.add_boundary_line(D::point_from_slice(&line.start), D::point_from_slice(&line.end), rest_density)?;
        }
        log::info!(
            "scene has {} fluid and {} boundary particles",
            self.particles.num_fluid_particles(),
            self.particles.num_boundary_particles()
        );
        Ok(())
    }

    pub fn remove_all_particles(&mut self) {
        let max_neighbors = self.particles.neighbors.capacity();
        self.particles = Particles::new(max_neighbors);
    }

    /// Rebuilds all neighbor lists from the current positions.
    pub fn update_neighborhood_datastructure(&mut self) {
        let num_truncated = self
            .neighborhood_search
            .update_particle_neighbors(&self.particles.positions, &mut self.particles.neighbors);
        if num_truncated > 0 {
            log::warn!(
                "{} neighbor lists were truncated at capacity {}",
                num_truncated,
                self.particles.neighbors.capacity()
            );
        }
    }

    pub fn snapshot(&self) -> ParticleSnapshot<D> {
        ParticleSnapshot {
            positions: self.particles.positions.clone(),
            velocities: self.particles.velocities.clone(),
            densities: self.particles.densities.clone(),
            pressures: self.particles.pressures.clone(),
            materials: self.particles.materials.clone(),
        }
    }
}
