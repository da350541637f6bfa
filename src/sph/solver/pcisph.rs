use super::super::config::SolverConfig;
use super::super::error::SphResult;
use super::super::fluidparticleworld::{FluidParticleWorld, FluidProperties, Material, Particles};
use super::super::pressure::pressure_acceleration;
use super::super::smoothing_kernel::{CubicSpline, Kernel};
use super::super::viscositymodel::{LaminarViscosityModel, ViscosityModel};
use super::Solver;
use crate::units::*;
use cgmath::prelude::*;

/// Scalars shared by the phases of a single simulation step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StepState {
    pub time_step: Real,
    pub rest_density: Real,
    /// Acceleration along the last axis.
    pub gravity: Real,
    /// k_pci, recomputed once per step.
    pub stiffness: Real,
    /// Mean absolute deviation from rest density, divided by the total particle count.
    pub density_error: Real,
    pub iterations: usize,
}

impl StepState {
    pub fn new(config: &SolverConfig) -> StepState {
        StepState {
            time_step: config.time_step,
            rest_density: config.rest_density,
            gravity: config.gravity,
            stiffness: 0.0,
            density_error: 0.0,
            iterations: 0,
        }
    }

    pub fn relative_density_error(&self) -> Real {
        self.density_error / self.rest_density
    }
}

/// Summary of a finished simulation step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StepStats {
    pub stiffness: Real,
    pub initial_density_error: Real,
    pub density_error: Real,
    pub iterations: usize,
    pub converged: bool,
}

// PCISPH implementation as described in
// Predictive-Corrective Incompressible SPH, Solenthaler & Pajarola 2009
// https://doi.org/10.1145/1576246.1531346
pub struct PCISPHSolver<D: Dimension, TViscosityModel: ViscosityModel<D>> {
    config: SolverConfig,
    viscosity_model: TViscosityModel,
    kernel: CubicSpline<D>,

    // Recomputed by every phase that fills them, only kept around to avoid reallocation.
    delta_velocities: Vec<D::Vector>,
    predicted_density_deviation: Vec<Real>,
}

impl<D: Dimension> PCISPHSolver<D, LaminarViscosityModel> {
    /// Solver using the laminar viscosity model with the configured viscosity.
    pub fn with_laminar_viscosity(config: SolverConfig, properties: &FluidProperties) -> SphResult<Self> {
        let viscosity_model = LaminarViscosityModel::new(config.viscosity, properties.support_radius());
        PCISPHSolver::new(config, viscosity_model, properties)
    }
}

impl<D: Dimension, TViscosityModel: ViscosityModel<D> + Sync> PCISPHSolver<D, TViscosityModel> {
    pub fn new(config: SolverConfig, viscosity_model: TViscosityModel, properties: &FluidProperties) -> SphResult<Self> {
        config.validate()?;
        Ok(PCISPHSolver {
            config,
            viscosity_model,
            kernel: CubicSpline::new(properties.support_radius()),
            delta_velocities: Vec::new(),
            predicted_density_deviation: Vec::new(),
        })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Changes dt for all following steps. The value is validated on the next step.
    pub fn set_time_step(&mut self, time_step: Real) {
        self.config.time_step = time_step;
    }

    /// Changes ρ0 for all following steps. The value is validated on the next step.
    pub fn set_rest_density(&mut self, rest_density: Real) {
        self.config.rest_density = rest_density;
    }

    /// Acceleration of the current pass for every particle (gravity plus viscosity, later pressure).
    pub fn delta_velocities(&self) -> &[D::Vector] {
        &self.delta_velocities
    }

    fn resize_buffers(&mut self, num_particles: usize) {
        self.delta_velocities.resize(num_particles, D::Vector::zero());
        self.predicted_density_deviation.resize(num_particles, 0.0);
    }

    /// Gravity and viscosity for fluid particles, zero for boundary particles.
    pub fn compute_non_pressure_forces(&mut self, particles: &Particles<D>, properties: &FluidProperties, state: &StepState) {
        microprofile::scope!("PCISPHSolver", "compute_non_pressure_forces");
        self.resize_buffers(particles.len());

        let kernel = &self.kernel;
        let viscosity_model = &self.viscosity_model;
        let gravity = D::up() * state.gravity;
        let particle_mass = properties.particle_mass(state.rest_density);
        self.config.backend.for_each(&mut self.delta_velocities, |i, dv| {
            if particles.materials[i] == Material::Boundary {
                *dv = D::Vector::zero();
                return;
            }
            let mut acceleration = gravity;
            let ri = particles.positions[i];
            let vi = particles.velocities[i];
            for &j in particles.neighbors.neighbors(i) {
                let j = j as usize;
                acceleration += viscosity_model.compute_viscous_acceleration(
                    kernel,
                    ri - particles.positions[j],
                    vi - particles.velocities[j],
                    particle_mass,
                    particles.densities[j],
                );
            }
            *dv = acceleration;
        });
    }

    /// Predictor: `v += dt dv; x += dt v` for fluid particles.
    pub fn advect(&self, particles: &mut Particles<D>, state: &StepState) {
        microprofile::scope!("PCISPHSolver", "advect");
        let dt = state.time_step;
        let materials = &particles.materials;
        let delta_velocities = &self.delta_velocities;
        self.config.backend.for_each(&mut particles.velocities, |i, v| {
            if materials[i] == Material::Fluid {
                *v += delta_velocities[i] * dt;
            }
        });
        let velocities = &particles.velocities;
        self.config.backend.for_each(&mut particles.positions, |i, x| {
            if materials[i] == Material::Fluid {
                *x += velocities[i] * dt;
            }
        });
    }

    /// Stiffness coefficient k_pci from a perfectly sampled particle neighborhood.
    ///
    /// Samples a full lattice with particle radius spacing around a particle at the origin, so that the
    /// coefficient does not depend on the (possibly deficient) actual neighborhood.
    pub fn compute_stiffness(&self, time_step: Real, properties: &FluidProperties) -> Real {
        microprofile::scope!("PCISPHSolver", "compute_stiffness");
        let spacing = properties.particle_radius();
        let num_offsets = (properties.support_radius() / spacing).floor() as i32;

        let mut grad_sum = D::Vector::zero();
        let mut grad_dot_sum = 0.0;
        D::foreach_lattice_offset(num_offsets, spacing, |offset| {
            let grad = self.kernel.gradient(offset);
            grad_sum += grad;
            grad_dot_sum += grad.magnitude2();
        });

        let beta = 2.0 * (time_step * properties.particle_volume()).powi(2);
        -1.0 / (beta * (grad_sum.magnitude2() + grad_dot_sum)).max(self.config.stiffness_epsilon)
    }

    /// Evaluates densities of all particles, clamped to never drop below rest density.
    ///
    /// Returns the mean absolute deviation from rest density.
    pub fn compute_densities(&self, particles: &mut Particles<D>, properties: &FluidProperties, state: &StepState) -> Real {
        microprofile::scope!("PCISPHSolver", "compute_densities");
        let rest_density = state.rest_density;
        let volume = properties.particle_volume();
        let kernel = &self.kernel;
        let positions = &particles.positions;
        let neighbors = &particles.neighbors;
        self.config.backend.for_each(&mut particles.densities, |i, density| {
            let ri = positions[i];
            let mut kernel_sum = 0.0;
            for &j in neighbors.neighbors(i) {
                kernel_sum += kernel.evaluate((ri - positions[j as usize]).magnitude());
            }
            *density = (rest_density * volume * kernel_sum).max(rest_density);
        });

        let num_particles = particles.len();
        if num_particles == 0 {
            return 0.0;
        }
        let densities = &particles.densities;
        self.config
            .backend
            .sum(num_particles, |i| (rest_density - densities[i]).abs())
            / num_particles as Real
    }

    // Overwrites delta velocities with the pressure acceleration. Boundary particles get zero.
    fn compute_pressure_accelerations(&mut self, particles: &Particles<D>, properties: &FluidProperties) {
        microprofile::scope!("PCISPHSolver", "compute_pressure_accelerations");
        let kernel = &self.kernel;
        let volume = properties.particle_volume();
        self.config.backend.for_each(&mut self.delta_velocities, |i, dv| {
            let mut acceleration = D::Vector::zero();
            if particles.materials[i] == Material::Fluid {
                let ri = particles.positions[i];
                let (pressure_i, density_i) = (particles.pressures[i], particles.densities[i]);
                for &j in particles.neighbors.neighbors(i) {
                    let j = j as usize;
                    acceleration += pressure_acceleration::<D, _>(
                        kernel,
                        volume,
                        pressure_i,
                        density_i,
                        particles.pressures[j],
                        particles.densities[j],
                        ri - particles.positions[j],
                    );
                }
            }
            *dv = acceleration;
        });
    }

    /// Initial pressure guess `p = k_pci (ρ0 - ρ)` for all particles and the resulting pressure acceleration.
    pub fn prepare_iteration(&mut self, particles: &mut Particles<D>, properties: &FluidProperties, state: &StepState) {
        microprofile::scope!("PCISPHSolver", "prepare_iteration");
        self.resize_buffers(particles.len());
        let stiffness = state.stiffness;
        let rest_density = state.rest_density;
        let densities = &particles.densities;
        self.config.backend.for_each(&mut particles.pressures, |i, pressure| {
            *pressure = stiffness * (rest_density - densities[i]);
        });
        self.compute_pressure_accelerations(particles, properties);
    }

    /// One pressure correction pass.
    ///
    /// Predicts the density change the current pressure acceleration would cause, accumulates the remaining
    /// deviation into fluid pressures and recomputes the pressure acceleration.
    /// Returns the predicted mean absolute density error.
    pub fn pressure_iteration(&mut self, particles: &mut Particles<D>, properties: &FluidProperties, state: &StepState) -> Real {
        microprofile::scope!("PCISPHSolver", "pressure_iteration");
        let rest_density = state.rest_density;
        let stiffness = state.stiffness;
        {
            let kernel = &self.kernel;
            let delta_velocities = &self.delta_velocities;
            let factor = properties.particle_volume() * rest_density * state.time_step * state.time_step;
            let positions = &particles.positions;
            let neighbors = &particles.neighbors;
            let materials = &particles.materials;
            self.config.backend.for_each(&mut self.predicted_density_deviation, |i, deviation| {
                *deviation = 0.0;
                if materials[i] == Material::Boundary {
                    return;
                }
                let ri = positions[i];
                let dv_i = delta_velocities[i];
                let mut sum = 0.0;
                for &j in neighbors.neighbors(i) {
                    let j = j as usize;
                    sum += (dv_i - delta_velocities[j]).dot(kernel.gradient(ri - positions[j]));
                }
                *deviation = factor * sum;
            });
        }

        let num_particles = particles.len();
        let density_error = if num_particles == 0 {
            0.0
        } else {
            let deviation = &self.predicted_density_deviation;
            let densities = &particles.densities;
            let materials = &particles.materials;
            self.config.backend.sum(num_particles, |i| match materials[i] {
                Material::Fluid => (rest_density - densities[i] - deviation[i]).abs(),
                Material::Boundary => 0.0,
            }) / num_particles as Real
        };

        {
            let deviation = &self.predicted_density_deviation;
            let densities = &particles.densities;
            let materials = &particles.materials;
            self.config.backend.for_each(&mut particles.pressures, |i, pressure| {
                if materials[i] == Material::Fluid {
                    *pressure += stiffness * (rest_density - densities[i] - deviation[i]);
                }
            });
        }
        self.compute_pressure_accelerations(particles, properties);

        density_error
    }

    /// Corrector: `v += dt dv; x += dt² dv` for fluid particles.
    pub fn advect_pressure(&self, particles: &mut Particles<D>, state: &StepState) {
        microprofile::scope!("PCISPHSolver", "advect_pressure");
        let dt = state.time_step;
        let materials = &particles.materials;
        let delta_velocities = &self.delta_velocities;
        self.config.backend.for_each(&mut particles.velocities, |i, v| {
            if materials[i] == Material::Fluid {
                *v += delta_velocities[i] * dt;
            }
        });
        self.config.backend.for_each(&mut particles.positions, |i, x| {
            if materials[i] == Material::Fluid {
                *x += delta_velocities[i] * (dt * dt);
            }
        });
    }

    /// Advances the particles by one time step, using the neighbor lists stored with the particles.
    pub fn step(&mut self, particles: &mut Particles<D>, properties: &FluidProperties) -> SphResult<StepStats> {
        microprofile::scope!("PCISPHSolver", "step");
        self.config.validate()?;
        particles.validate()?;
        if self.config.check_neighbor_lists {
            particles.neighbors.validate(particles.len())?;
        }
        self.resize_buffers(particles.len());

        let mut state = StepState::new(&self.config);
        self.compute_non_pressure_forces(particles, properties, &state);
        self.advect(particles, &state);
        state.stiffness = self.compute_stiffness(state.time_step, properties);
        state.density_error = self.compute_densities(particles, properties, &state);
        let initial_density_error = state.density_error;

        self.prepare_iteration(particles, properties, &state);
        {
            microprofile::scope!("PCISPHSolver", "pressure_correction");
            while state.relative_density_error() > self.config.max_relative_density_error
                && state.iterations < self.config.max_pressure_iterations
            {
                state.density_error = self.pressure_iteration(particles, properties, &state);
                state.iterations += 1;
            }
        }
        self.advect_pressure(particles, &state);

        let converged = state.relative_density_error() <= self.config.max_relative_density_error;
        if !converged {
            log::warn!(
                "Pressure correction stopped after {} iterations without converging. Density error was {}, that is {}% relative error. Target was {}%",
                state.iterations,
                state.density_error,
                state.relative_density_error() * 100.0,
                self.config.max_relative_density_error * 100.0
            );
        }
        log::debug!(
            "PCISPH step: k_pci {}, density error {} -> {} after {} iterations",
            state.stiffness,
            initial_density_error,
            state.density_error,
            state.iterations
        );

        Ok(StepStats {
            stiffness: state.stiffness,
            initial_density_error,
            density_error: state.density_error,
            iterations: state.iterations,
            converged,
        })
    }
}

impl<D: Dimension, TViscosityModel: ViscosityModel<D> + Sync> Solver<D> for PCISPHSolver<D, TViscosityModel> {
    fn clear_cached_data(&mut self) {
        self.delta_velocities.clear();
        self.predicted_density_deviation.clear();
    }

    fn simulation_step(&mut self, fluid_world: &mut FluidParticleWorld<D>) -> SphResult<StepStats> {
        fluid_world.update_neighborhood_datastructure();
        let properties = fluid_world.properties;
        self.step(&mut fluid_world.particles, &properties)
    }
}
