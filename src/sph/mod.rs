pub use self::backend::Backend;
pub use self::config::*;
pub use self::error::{SphError, SphResult};
pub use self::fluidparticleworld::*;
pub use self::neighbor_list::{NeighborLists, ParticleIndex};
pub use self::neighborhood_search::NeighborhoodSearch;
pub use self::pressure::pressure_acceleration;
pub use self::smoothing_kernel::{CubicSpline, Kernel};
pub use self::solver::*;
pub use self::viscositymodel::*;

mod backend;
mod config;
mod error;
mod fluidparticleworld;
mod neighbor_list;
mod neighborhood_search;
mod pressure;
mod smoothing_kernel;
mod solver;
mod viscositymodel;
