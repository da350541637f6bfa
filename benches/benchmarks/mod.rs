pub mod neighborhood_search;
pub mod pcisph_step;
pub mod smoothing_kernel;
