use crate::units::Real;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Execution strategy for per-particle loops.
///
/// Every solver phase is written as a body that is applied to each particle independently.
/// Returning from [`Backend::for_each`] is the barrier between phases: all writes of a phase are
/// visible before the next phase starts reading them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Backend {
    Sequential,
    Rayon,
}

impl Default for Backend {
    fn default() -> Self {
        Backend::Rayon
    }
}

impl Backend {
    /// Applies `f` to every element of `items`, passing its particle index along.
    #[inline]
    pub fn for_each<T, F>(self, items: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync + Send,
    {
        match self {
            Backend::Sequential => items.iter_mut().enumerate().for_each(|(i, item)| f(i, item)),
            Backend::Rayon => items.par_iter_mut().enumerate().for_each(|(i, item)| f(i, item)),
        }
    }

    /// Sums `f(i)` over `0..count`.
    ///
    /// The parallel variant is a tree reduction, so results may differ from the sequential one in the last bits.
    #[inline]
    pub fn sum<F>(self, count: usize, f: F) -> Real
    where
        F: Fn(usize) -> Real + Sync + Send,
    {
        match self {
            Backend::Sequential => (0..count).map(f).sum(),
            Backend::Rayon => (0..count).into_par_iter().map(f).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backends_agree() {
        for backend in [Backend::Sequential, Backend::Rayon] {
            let mut values = vec![0.0 as Real; 1000];
            backend.for_each(&mut values, |i, v| *v = i as Real);
            assert_eq!(values[999], 999.0);
            assert_eq!(backend.sum(values.len(), |i| values[i]), 499500.0);
        }
    }

    #[test]
    fn empty_range_sums_to_zero() {
        assert_eq!(Backend::Rayon.sum(0, |_| 1.0), 0.0);
        let mut empty: Vec<Real> = Vec::new();
        Backend::Sequential.for_each(&mut empty, |_, _| unreachable!());
    }
}
