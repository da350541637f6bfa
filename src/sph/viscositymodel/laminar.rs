use super::ViscosityModel;

use super::super::smoothing_kernel::Kernel;
use crate::units::*;
use cgmath::prelude::*;

// Laminar viscosity term projecting the relative velocity onto the particle distance,
// as used in "SPH Fluids in Computer Graphics", Ihmsen et al. 2014 (eq. 11).
pub struct LaminarViscosityModel {
    pub viscosity: Real, // kinematic viscosity ν
    regularization: Real, // 0.01 h², keeps the term bounded for overlapping particles
}

impl LaminarViscosityModel {
    pub fn new(viscosity: Real, support_radius: Real) -> LaminarViscosityModel {
        LaminarViscosityModel {
            viscosity,
            regularization: 0.01 * support_radius * support_radius,
        }
    }
}

impl<D: Dimension> ViscosityModel<D> for LaminarViscosityModel {
    #[inline]
    fn compute_viscous_acceleration(
        &self,
        kernel: &impl Kernel<D>,
        xi_minus_xj: D::Vector,
        vi_minus_vj: D::Vector,
        mass_j: Real,
        density_j: Real,
    ) -> D::Vector {
        let v_dot_x = vi_minus_vj.dot(xi_minus_xj);
        let factor = 2.0 * (D::DIM as Real + 2.0) * self.viscosity * (mass_j / density_j) * v_dot_x
            / (xi_minus_xj.magnitude2() + self.regularization);
        kernel.gradient(xi_minus_xj) * factor
    }
}
