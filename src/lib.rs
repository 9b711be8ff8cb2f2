//! Exact wave structure of relativistic (reactive) and shallow water Riemann problems.
//!
//! Given a known state on one side of a characteristic family and the value of the
//! pressure (or \f$\Phi\f$) in the star region, the library determines the sections
//! (contact, rarefaction, shock, deflagration, detonation) making up the wave, their
//! end states and their propagation speeds.

pub use config::SolverConfig;
pub use errors::{ConfigError, EosError, WaveError};
pub use physical_quantities::{RelativisticState, ShallowWaterState, WaveState, Wavenumber};
pub use relativistic::Relativistic;
pub use shallow_water::ShallowWater;
pub use wave::{solve_batch, SectionKind, Wave, WaveFamily, WaveProblem, WaveSection, Wavespeed};

mod config;
mod errors;
pub mod gas_law;
pub mod numerics;
pub mod physical_quantities;
mod relativistic;
mod shallow_water;
pub mod utils;
mod wave;
