/// Smoothing Kernels.
pub use self::cubic::CubicSpline;
pub use self::kernel::Kernel;

#[macro_use]
mod kernel;
mod cubic;
