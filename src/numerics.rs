//! Root finding and ODE integration used by the wave section solvers.

mod ode;
mod root_finding;

pub use ode::{DormandPrince, IntegrationError, OdeSystem, Tolerances};
pub use root_finding::{expand_bracket, Bracket, BrentSolver, RootFindingError};
