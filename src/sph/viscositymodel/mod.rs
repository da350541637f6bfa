pub use laminar::LaminarViscosityModel;

mod laminar;

// ------------------------------------------------------

use super::smoothing_kernel::Kernel;
use crate::units::{Dimension, Real};

pub trait ViscosityModel<D: Dimension> {
    /// Computes the viscous acceleration neighbor j exerts on particle i.
    ///
    /// `xi_minus_xj`:  Vector from neighbor j to particle i.
    /// `vi_minus_vj`:  Relative velocity of particle i with respect to j.
    /// `mass_j`, `density_j`: Mass and current density of the neighbor.
    fn compute_viscous_acceleration(
        &self,
        kernel: &impl Kernel<D>,
        xi_minus_xj: D::Vector,
        vi_minus_vj: D::Vector,
        mass_j: Real,
        density_j: Real,
    ) -> D::Vector;
}
