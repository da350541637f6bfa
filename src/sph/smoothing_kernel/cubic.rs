use super::kernel::Kernel;
use crate::units::{Dimension, Real};
use cgmath::prelude::*;
use std::marker::PhantomData;

/// Cubic Spline smoothing kernel.
///
/// Classic cubic spline cernel from "J. Monaghan, Smoothed Particle Hydrodynamics, “Annual Review of Astronomy and Astrophysics”, 30 (1992), pp. 543-574."
/// Formulated with the support radius h (not the smoothing length h/2), so q = r/h lies in [0, 1].
/// Normalization factors from https://pysph.readthedocs.io/en/latest/reference/kernels.html#monaghan1992
#[derive(Copy, Clone, Debug)]
pub struct CubicSpline<D: Dimension> {
    support_radius: Real,
    h_inv: Real,
    normalizer: Real,
    normalizer_grad: Real,
    dimension: PhantomData<D>,
}

impl<D: Dimension> CubicSpline<D> {
    pub fn new(support_radius: Real) -> CubicSpline<D> {
        let normalizer = D::cubic_spline_sigma() / support_radius.powi(D::DIM as i32);
        CubicSpline {
            support_radius,
            h_inv: 1.0 / support_radius,
            normalizer,
            normalizer_grad: 6.0 * normalizer,
            dimension: PhantomData,
        }
    }
}

impl<D: Dimension> Kernel<D> for CubicSpline<D> {
    #[inline]
    fn support_radius(&self) -> Real {
        self.support_radius
    }

    #[inline]
    fn evaluate(&self, r: Real) -> Real {
        let q = r * self.h_inv;
        if q <= 0.5 {
            self.normalizer * (1.0 + (q * q * q - q * q) * 6.0)
        } else if q < 1.0 {
            self.normalizer * (1.0 - q).powi(3) * 2.0
        } else {
            0.0
        }
    }

    #[inline]
    fn gradient(&self, xi_minus_xj: D::Vector) -> D::Vector {
        let r = xi_minus_xj.magnitude();
        let q = r * self.h_inv;
        if r <= <Self as Kernel<D>>::DIVISION_EPSILON || q >= 1.0 {
            return D::Vector::zero();
        }
        let grad_q = xi_minus_xj * (self.h_inv / r);
        if q <= 0.5 {
            grad_q * (self.normalizer_grad * q * (3.0 * q - 2.0))
        } else {
            let one_minus_q = 1.0 - q;
            grad_q * (-self.normalizer_grad * one_minus_q * one_minus_q)
        }
    }
}
