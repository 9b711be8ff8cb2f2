use yaml_rust::Yaml;

use crate::{
    errors::ConfigError,
    numerics::{BrentSolver, DormandPrince, Tolerances},
    utils::Closeness,
};

/// Numerical parameters of the wave section solvers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    pub root_tolerance: f64,
    pub max_root_iterations: usize,
    /// Factor moving the end of the density bracket on the side of the start state.
    pub bracket_inner_factor: f64,
    /// Factor moving the far end of the density bracket.
    pub bracket_outer_factor: f64,
    pub max_bracket_expansions: usize,
    /// Relative distance of the Chapman-Jouguet bracket from the section's end points.
    pub cj_offset: f64,
    pub precursor_growth: f64,
    pub ode_rtol: f64,
    pub ode_atol: f64,
    pub ode_max_steps: usize,
    pub close_rtol: f64,
    pub close_atol: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            root_tolerance: 1e-12,
            max_root_iterations: 200,
            bracket_inner_factor: 1.1,
            bracket_outer_factor: 10.,
            max_bracket_expansions: 60,
            cj_offset: 1e-9,
            precursor_growth: 2.,
            ode_rtol: 1e-12,
            ode_atol: 1e-10,
            ode_max_steps: 100_000,
            close_rtol: 1e-5,
            close_atol: 1e-8,
        }
    }
}

fn positive_f64(cfg: &Yaml, key: &str, default: f64) -> Result<f64, ConfigError> {
    match &cfg[key] {
        Yaml::BadValue => Ok(default),
        value => match value.as_f64().or_else(|| value.as_i64().map(|i| i as f64)) {
            Some(v) if v > 0. => Ok(v),
            _ => Err(ConfigError::InvalidValue(
                format!("solver:{key}"),
                value.clone(),
            )),
        },
    }
}

fn count(cfg: &Yaml, key: &str, default: usize) -> Result<usize, ConfigError> {
    match &cfg[key] {
        Yaml::BadValue => Ok(default),
        value => value
            .as_i64()
            .and_then(|i| usize::try_from(i).ok())
            .ok_or_else(|| ConfigError::InvalidValue(format!("solver:{key}"), value.clone())),
    }
}

impl SolverConfig {
    /// Read the solver configuration, every absent parameter keeps its default value.
    pub fn init(cfg: &Yaml) -> Result<Self, ConfigError> {
        let default = Self::default();
        let config = Self {
            root_tolerance: positive_f64(cfg, "root_tolerance", default.root_tolerance)?,
            max_root_iterations: count(cfg, "max_root_iterations", default.max_root_iterations)?,
            bracket_inner_factor: positive_f64(
                cfg,
                "bracket_inner_factor",
                default.bracket_inner_factor,
            )?,
            bracket_outer_factor: positive_f64(
                cfg,
                "bracket_outer_factor",
                default.bracket_outer_factor,
            )?,
            max_bracket_expansions: count(
                cfg,
                "max_bracket_expansions",
                default.max_bracket_expansions,
            )?,
            cj_offset: positive_f64(cfg, "cj_offset", default.cj_offset)?,
            precursor_growth: positive_f64(cfg, "precursor_growth", default.precursor_growth)?,
            ode_rtol: positive_f64(cfg, "ode_rtol", default.ode_rtol)?,
            ode_atol: positive_f64(cfg, "ode_atol", default.ode_atol)?,
            ode_max_steps: count(cfg, "ode_max_steps", default.ode_max_steps)?,
            close_rtol: positive_f64(cfg, "close_rtol", default.close_rtol)?,
            close_atol: positive_f64(cfg, "close_atol", default.close_atol)?,
        };

        for (key, factor) in [
            ("bracket_inner_factor", config.bracket_inner_factor),
            ("bracket_outer_factor", config.bracket_outer_factor),
            ("precursor_growth", config.precursor_growth),
        ] {
            if factor <= 1. {
                return Err(ConfigError::InvalidValue(
                    format!("solver:{key}"),
                    cfg[key].clone(),
                ));
            }
        }

        // The deflagration bracket ends at (1 - cj_offset) p_start
        if config.cj_offset >= 1. {
            return Err(ConfigError::InvalidValue(
                "solver:cj_offset".to_string(),
                cfg["cj_offset"].clone(),
            ));
        }

        Ok(config)
    }

    pub fn brent(&self) -> BrentSolver {
        BrentSolver::new(self.root_tolerance, self.max_root_iterations)
    }

    pub fn integrator(&self) -> DormandPrince {
        DormandPrince::new(
            Tolerances {
                rtol: self.ode_rtol,
                atol: self.ode_atol,
            },
            self.ode_max_steps,
        )
    }

    pub fn closeness(&self) -> Closeness {
        Closeness {
            rtol: self.close_rtol,
            atol: self.close_atol,
        }
    }
}

#[cfg(test)]
mod test {
    use yaml_rust::YamlLoader;

    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = &YamlLoader::load_from_str("{}").unwrap()[0];
        assert_eq!(SolverConfig::init(cfg).unwrap(), SolverConfig::default());
    }

    #[test]
    fn test_overrides() {
        let cfg = &YamlLoader::load_from_str(
            r##"
root_tolerance: 1e-10
max_bracket_expansions: 5
bracket_outer_factor: 4
"##,
        )
        .unwrap()[0];
        let config = SolverConfig::init(cfg).unwrap();
        assert_eq!(config.root_tolerance, 1e-10);
        assert_eq!(config.max_bracket_expansions, 5);
        assert_eq!(config.bracket_outer_factor, 4.);
        assert_eq!(config.bracket_inner_factor, 1.1);
    }

    #[test]
    fn test_invalid() {
        let cfg = &YamlLoader::load_from_str("bracket_inner_factor: 0.5").unwrap()[0];
        assert!(matches!(
            SolverConfig::init(cfg),
            Err(ConfigError::InvalidValue(..))
        ));
        let cfg = &YamlLoader::load_from_str("ode_max_steps: -3").unwrap()[0];
        assert!(matches!(
            SolverConfig::init(cfg),
            Err(ConfigError::InvalidValue(..))
        ));
        let cfg = &YamlLoader::load_from_str("cj_offset: 1.5").unwrap()[0];
        assert!(matches!(
            SolverConfig::init(cfg),
            Err(ConfigError::InvalidValue(key, _)) if key == "solver:cj_offset"
        ));
    }
}
