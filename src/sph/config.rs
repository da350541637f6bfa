use super::backend::Backend;
use super::error::{SphError, SphResult};
use crate::units::Real;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters of the PCISPH pressure solver. All values are in SI units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Fixed time step dt in seconds.
    pub time_step: Real,
    /// Rest density ρ0 in kg/m^D.
    pub rest_density: Real,
    /// Gravitational acceleration along the last axis in m/s².
    pub gravity: Real,
    /// Kinematic viscosity ν of the laminar viscosity term.
    pub viscosity: Real,
    /// Hard cap on pressure correction passes per step.
    pub max_pressure_iterations: usize,
    /// The pressure loop stops once mean density error / ρ0 drops to this.
    pub max_relative_density_error: Real,
    /// Floor for the stiffness coefficient denominator.
    pub stiffness_epsilon: Real,
    /// Validate neighbor lists before every step.
    pub check_neighbor_lists: bool,
    pub backend: Backend,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            time_step: 1.0e-4,
            rest_density: 1000.0,
            gravity: -9.81,
            viscosity: 0.05,
            max_pressure_iterations: 1000,
            max_relative_density_error: 1.0e-3,
            stiffness_epsilon: 1.0e-6,
            check_neighbor_lists: true,
            backend: Backend::default(),
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> SphResult<()> {
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(SphError::InvalidTimeStep(self.time_step));
        }
        if !(self.rest_density.is_finite() && self.rest_density > 0.0) {
            return Err(SphError::InvalidRestDensity(self.rest_density));
        }
        if !self.gravity.is_finite() {
            return Err(SphError::InvalidConfig(format!("gravity must be finite, got {}", self.gravity)));
        }
        if !(self.viscosity.is_finite() && self.viscosity >= 0.0) {
            return Err(SphError::InvalidConfig(format!(
                "viscosity must be finite and non-negative, got {}",
                self.viscosity
            )));
        }
        if !(self.max_relative_density_error.is_finite() && self.max_relative_density_error > 0.0) {
            return Err(SphError::InvalidConfig(format!(
                "density error threshold must be positive, got {}",
                self.max_relative_density_error
            )));
        }
        if !(self.stiffness_epsilon.is_finite() && self.stiffness_epsilon > 0.0) {
            return Err(SphError::InvalidConfig(format!(
                "stiffness epsilon must be positive, got {}",
                self.stiffness_epsilon
            )));
        }
        Ok(())
    }
}

/// Describes how particles are sized and stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSystemConfig {
    /// Particle radius r in m. Particles are seeded with a spacing of 2r.
    pub particle_radius: Real,
    /// Support radius h as a multiple of the particle radius.
    pub support_radius_factor: Real,
    /// Particle volume as a fraction of the particle's bounding box (2r)^D.
    pub volume_factor: Real,
    /// Capacity of each neighbor list.
    pub max_neighbors: usize,
    /// Maximum number of particles the world will hold.
    pub max_particles: usize,
}

impl Default for ParticleSystemConfig {
    fn default() -> Self {
        ParticleSystemConfig {
            particle_radius: 0.05,
            support_radius_factor: 4.0,
            volume_factor: 0.8,
            max_neighbors: 100,
            max_particles: 100_000,
        }
    }
}

impl ParticleSystemConfig {
    pub fn validate(&self) -> SphResult<()> {
        if !(self.particle_radius.is_finite() && self.particle_radius > 0.0) {
            return Err(SphError::InvalidConfig(format!(
                "particle radius must be positive, got {}",
                self.particle_radius
            )));
        }
        if !(self.support_radius_factor.is_finite() && self.support_radius_factor > 0.0) {
            return Err(SphError::InvalidConfig(format!(
                "support radius factor must be positive, got {}",
                self.support_radius_factor
            )));
        }
        if !(self.volume_factor.is_finite() && self.volume_factor > 0.0) {
            return Err(SphError::InvalidConfig(format!(
                "volume factor must be positive, got {}",
                self.volume_factor
            )));
        }
        if self.max_neighbors == 0 {
            return Err(SphError::InvalidConfig("neighbor lists need a capacity of at least one".to_owned()));
        }
        if self.max_particles > u32::MAX as usize {
            return Err(SphError::InvalidConfig(format!(
                "at most {} particles can be indexed, got {}",
                u32::MAX,
                self.max_particles
            )));
        }
        Ok(())
    }
}

/// An axis aligned block of fluid particles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FluidBlockConfig {
    pub lower_corner: Vec<Real>,
    pub size: Vec<Real>,
    #[serde(default)]
    pub velocity: Vec<Real>,
    pub density: Real,
    /// Amount of jitter. 0 for perfect lattice. >1 and particles are no longer in a strict lattice.
    #[serde(default)]
    pub jitter: Real,
}

/// A straight line of static boundary particles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundaryLineConfig {
    pub start: Vec<Real>,
    pub end: Vec<Real>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub fluid_blocks: Vec<FluidBlockConfig>,
    pub boundary_lines: Vec<BoundaryLineConfig>,
}

impl SceneConfig {
    /// Three blocks of water dropped into a 10.24m x 10.24m box.
    pub fn dam_drop_2d() -> SceneConfig {
        let block = |lower_corner: [Real; 2], size: Real| FluidBlockConfig {
            lower_corner: lower_corner.to_vec(),
            size: vec![size, size],
            velocity: vec![0.0, -10.0],
            density: 1000.0,
            jitter: 0.0,
        };
        let line = |start: [Real; 2], end: [Real; 2]| BoundaryLineConfig {
            start: start.to_vec(),
            end: end.to_vec(),
        };
        const EXTENT: Real = 10.24;
        SceneConfig {
            fluid_blocks: vec![block([5.5, 1.0], 3.0), block([2.0, 3.0], 3.0), block([5.0, 7.0], 1.0)],
            boundary_lines: vec![
                line([0.0, 0.0], [EXTENT, 0.0]),
                line([0.0, 0.0], [0.0, EXTENT]),
                line([EXTENT, 0.0], [EXTENT, EXTENT]),
                line([0.0, EXTENT], [EXTENT, EXTENT]),
            ],
        }
    }
}

/// Everything the headless driver needs to run a scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub particles: ParticleSystemConfig,
    pub solver: SolverConfig,
    pub scene: SceneConfig,
    pub steps_per_frame: usize,
    pub num_frames: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            particles: ParticleSystemConfig::default(),
            solver: SolverConfig::default(),
            scene: SceneConfig::dam_drop_2d(),
            steps_per_frame: 10,
            num_frames: 100,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> SphResult<()> {
        self.particles.validate()?;
        self.solver.validate()
    }

    /// Save configuration to JSON file
    pub fn save_json(&self, path: &Path) -> SphResult<()> {
        save_json(self, path)
    }

    /// Load configuration from JSON file
    pub fn load_json(path: &Path) -> SphResult<Self> {
        let config: SimulationConfig = load_json(path)?;
        config.validate()?;
        Ok(config)
    }
}

pub fn save_json<T: Serialize>(value: &T, path: &Path) -> SphResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> SphResult<T> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
