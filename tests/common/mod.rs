#![allow(dead_code)]

use riemann_waves::{gas_law::EquationOfState, RelativisticState, SolverConfig};
use yaml_rust::YamlLoader;

pub const GAMMA: f64 = 5. / 3.;

pub const EOS_CONFIG: &'static str = r##"
kind: "GammaLaw"
gamma: 1.6666666666666667
"##;

pub const REACTIVE_EOS_CONFIG: &'static str = r##"
kind: "ReactiveGammaLaw"
gamma: 1.6666666666666667
cv: 1.
q_available: 0.1
t_ignition: 0.5
burnt:
  gamma: 1.6666666666666667
"##;

pub const SOLVER_CONFIG: &'static str = r##"
root_tolerance: 1e-12
max_root_iterations: 200
ode_rtol: 1e-12
ode_atol: 1e-10
"##;

pub const NO_EXPANSION_SOLVER_CONFIG: &'static str = r##"
max_bracket_expansions: 0
"##;

pub fn get_eos(config: &str) -> EquationOfState {
    let docs = YamlLoader::load_from_str(config).unwrap();
    EquationOfState::init(&docs[0]).unwrap()
}

pub fn get_solver_config(config: &str) -> SolverConfig {
    let docs = YamlLoader::load_from_str(config).unwrap();
    SolverConfig::init(&docs[0]).unwrap()
}

pub fn get_state(rho: f64, v: f64, eps: f64, eos_config: &str) -> RelativisticState {
    RelativisticState::new(rho, v, 0., eps, get_eos(eos_config)).unwrap()
}
