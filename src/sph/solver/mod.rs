pub use pcisph::{PCISPHSolver, StepState, StepStats};

mod pcisph;

// ------------------------------------------------------

use super::error::SphResult;
use super::fluidparticleworld::FluidParticleWorld;
use crate::units::Dimension;

pub trait Solver<D: Dimension> {
    // drops per particle buffers, needed when the particle count changed substantially
    fn clear_cached_data(&mut self);

    /// Rebuilds the neighborhood of all particles and performs a single simulation step.
    fn simulation_step(&mut self, fluid_world: &mut FluidParticleWorld<D>) -> SphResult<StepStats>;
}
