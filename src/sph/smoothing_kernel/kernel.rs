use crate::units::{Dimension, Real};

/// SPH smoothing kernel
///
/// Only radially symmetric kernels with compact support are supported.
/// For |r| >= support radius both value and gradient are exactly zero.
pub trait Kernel<D: Dimension> {
    /// Distance below which the gradient direction is considered undefined and the gradient is zero.
    const DIVISION_EPSILON: Real = 1.0e-5;

    /// Radius h beyond which the kernel vanishes.
    fn support_radius(&self) -> Real;

    /// Evaluates the kernel function for a distance r.
    fn evaluate(&self, r: Real) -> Real;

    /// Evaluates the gradient of the kernel with respect to the first position.
    /// `xi_minus_xj`: Vector xi - xj between the two particles. Not normalized!
    fn gradient(&self, xi_minus_xj: D::Vector) -> D::Vector;
}

// Properties every kernel needs to fulfill, instantiated per kernel and dimension.
#[cfg(test)]
macro_rules! generate_kernel_tests {
    ($module:ident, $kernel:ident, $dim:ty) => {
        mod $module {
            use super::*;
            use crate::units::*;
            use cgmath::prelude::*;
            use more_asserts::*;

            type D = $dim;
            const SUPPORT_RADIUS: Real = 0.2;

            fn kernel() -> $kernel<D> {
                $kernel::new(SUPPORT_RADIUS)
            }

            fn along_x(r: Real) -> <D as Dimension>::Vector {
                D::vector_from_slice(&[r])
            }

            #[test]
            fn zero_outside_support() {
                let kernel = kernel();
                for &r in &[SUPPORT_RADIUS, SUPPORT_RADIUS * 1.0001, SUPPORT_RADIUS * 2.0, 1.0e6] {
                    assert_eq!(kernel.evaluate(r), 0.0);
                    assert_eq!(kernel.gradient(along_x(r)), <D as Dimension>::Vector::zero());
                }
            }

            #[test]
            fn positive_and_decreasing_inside_support() {
                let kernel = kernel();
                const NUM_SAMPLES: usize = 1000;
                let mut previous = Real::INFINITY;
                for i in 0..NUM_SAMPLES {
                    let r = SUPPORT_RADIUS * i as Real / NUM_SAMPLES as Real;
                    let w = kernel.evaluate(r);
                    assert_gt!(w, 0.0);
                    assert_lt!(w, previous);
                    previous = w;
                }
            }

            #[test]
            fn gradient_vanishes_at_origin() {
                let kernel = kernel();
                assert_eq!(kernel.gradient(<D as Dimension>::Vector::zero()), <D as Dimension>::Vector::zero());
                assert_eq!(kernel.gradient(along_x(1.0e-7)), <D as Dimension>::Vector::zero());
                assert!(kernel.evaluate(0.0).is_finite());
            }

            #[test]
            fn gradient_is_antisymmetric_and_points_inwards() {
                let kernel = kernel();
                let r = D::vector_from_slice(&[0.03, -0.05, 0.01]);
                let grad = kernel.gradient(r);
                assert_eq!(kernel.gradient(-r), -grad);
                // kernel decreases with distance, so the gradient points back towards the neighbor
                assert_lt!(grad.dot(r), 0.0);
            }

            #[test]
            fn gradient_matches_finite_difference() {
                let kernel = kernel();
                const H: Real = 1.0e-4;
                for &r in &[0.02, 0.07, 0.1, 0.13, 0.18] {
                    let numeric = (kernel.evaluate(r + H) - kernel.evaluate(r - H)) / (2.0 * H);
                    let analytic = kernel.gradient(along_x(r)).dot(along_x(1.0));
                    assert_le!((numeric - analytic).abs(), 1.0e-2 * analytic.abs().max(1.0));
                }
            }

            #[test]
            fn integrates_to_one() {
                let kernel = kernel();
                let num_cells = if D::DIM == 2 { 60 } else { 25 };
                let spacing = SUPPORT_RADIUS / num_cells as Real;
                let mut integral = 0.0;
                D::foreach_lattice_offset(num_cells, spacing, |offset| {
                    integral += kernel.evaluate(offset.magnitude()) * spacing.powi(D::DIM as i32);
                });
                assert_lt!((integral - 1.0).abs(), 2.0e-2);
            }
        }
    };
}
