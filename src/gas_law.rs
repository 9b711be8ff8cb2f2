use yaml_rust::Yaml;

use crate::errors::{ConfigError, EosError};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct AdiabaticIndex {
    gamma: f64,
    odgm1: f64,
}

impl From<f64> for AdiabaticIndex {
    fn from(value: f64) -> Self {
        AdiabaticIndex {
            gamma: value,
            odgm1: 1. / (value - 1.),
        }
    }
}

impl From<AdiabaticIndex> for f64 {
    fn from(value: AdiabaticIndex) -> Self {
        value.gamma
    }
}

impl AdiabaticIndex {
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn gm1(&self) -> f64 {
        self.gamma - 1.
    }

    pub fn odgm1(&self) -> f64 {
        self.odgm1
    }

    /// \f$\frac{\gamma}{\gamma - 1}\f$
    pub fn gdgm1(&self) -> f64 {
        self.gamma * self.odgm1
    }
}

/// Relativistic ideal gas: \f$p = (\gamma - 1)\rho\epsilon\f$.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasLaw {
    gamma: AdiabaticIndex,
    cv: f64,
}

impl GasLaw {
    pub fn new(gamma: f64) -> Self {
        Self::with_heat_capacity(gamma, 1.)
    }

    pub fn with_heat_capacity(gamma: f64, cv: f64) -> Self {
        Self {
            gamma: gamma.into(),
            cv,
        }
    }

    pub fn gamma(&self) -> &AdiabaticIndex {
        &self.gamma
    }

    pub fn cv(&self) -> f64 {
        self.cv
    }

    fn init(cfg: &Yaml, section: &str) -> Result<Self, ConfigError> {
        let gamma = cfg["gamma"]
            .as_f64()
            .or_else(|| cfg["gamma"].as_i64().map(|g| g as f64))
            .ok_or(ConfigError::MissingParameter(format!("{section}:gamma")))?;
        if gamma <= 1. {
            return Err(ConfigError::InvalidValue(
                format!("{section}:gamma"),
                cfg["gamma"].clone(),
            ));
        }
        let cv = cfg["cv"]
            .as_f64()
            .or_else(|| cfg["cv"].as_i64().map(|cv| cv as f64))
            .unwrap_or(1.);
        Ok(Self::with_heat_capacity(gamma, cv))
    }
}

/// Unburnt material that releases `q_available` once it has reached
/// `t_ignition`, leaving material described by `burnt`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reaction {
    pub q_available: f64,
    pub t_ignition: f64,
    pub burnt: GasLaw,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EquationOfState {
    Inert(GasLaw),
    Reactive { gas: GasLaw, reaction: Reaction },
}

fn check_density(closure: &'static str, rho: f64) -> Result<(), EosError> {
    if rho > 0. && rho.is_finite() {
        Ok(())
    } else {
        Err(EosError::OutOfDomain {
            closure,
            rho,
            value: rho,
        })
    }
}

impl EquationOfState {
    pub fn gamma_law(gamma: f64) -> Self {
        EquationOfState::Inert(GasLaw::new(gamma))
    }

    pub fn reactive_gamma_law(
        gamma: f64,
        q_available: f64,
        cv: f64,
        t_ignition: f64,
        burnt: GasLaw,
    ) -> Self {
        EquationOfState::Reactive {
            gas: GasLaw::with_heat_capacity(gamma, cv),
            reaction: Reaction {
                q_available,
                t_ignition,
                burnt,
            },
        }
    }

    /// Parse an equation of state from its yaml configuration, e.g.:
    ///
    /// ```yaml
    /// kind: "ReactiveGammaLaw"
    /// gamma: 1.6666666667
    /// cv: 1.
    /// q_available: 0.1
    /// t_ignition: 0.5
    /// burnt:
    ///   gamma: 1.6666666667
    /// ```
    pub fn init(cfg: &Yaml) -> Result<Self, ConfigError> {
        let kind = cfg["kind"].as_str().unwrap_or("GammaLaw");
        match kind {
            "GammaLaw" => Ok(EquationOfState::Inert(GasLaw::init(
                cfg,
                "equation_of_state",
            )?)),
            "ReactiveGammaLaw" => {
                let gas = GasLaw::init(cfg, "equation_of_state")?;
                let q_available = cfg["q_available"].as_f64().ok_or(
                    ConfigError::MissingParameter("equation_of_state:q_available".to_string()),
                )?;
                let t_ignition = cfg["t_ignition"].as_f64().ok_or(
                    ConfigError::MissingParameter("equation_of_state:t_ignition".to_string()),
                )?;
                if cfg["burnt"].is_badvalue() {
                    return Err(ConfigError::MissingParameter(
                        "equation_of_state:burnt".to_string(),
                    ));
                }
                let burnt = GasLaw::init(&cfg["burnt"], "equation_of_state:burnt")?;
                Ok(EquationOfState::Reactive {
                    gas,
                    reaction: Reaction {
                        q_available,
                        t_ignition,
                        burnt,
                    },
                })
            }
            _ => Err(ConfigError::UnknownEos(kind.to_string())),
        }
    }

    fn gas(&self) -> &GasLaw {
        match self {
            EquationOfState::Inert(gas) => gas,
            EquationOfState::Reactive { gas, .. } => gas,
        }
    }

    /// Reaction support, `None` for inert material.
    pub fn reaction(&self) -> Option<&Reaction> {
        match self {
            EquationOfState::Inert(_) => None,
            EquationOfState::Reactive { reaction, .. } => Some(reaction),
        }
    }

    /// Equation of state of the reaction products (`self` when inert).
    pub fn burnt(&self) -> EquationOfState {
        match self {
            EquationOfState::Inert(_) => *self,
            EquationOfState::Reactive { reaction, .. } => EquationOfState::Inert(reaction.burnt),
        }
    }

    /// Chemical energy still available for release.
    pub fn q_available(&self) -> f64 {
        self.reaction().map_or(0., |reaction| reaction.q_available)
    }

    /// Thermal part of the specific internal energy
    fn thermal_energy(&self, closure: &'static str, rho: f64, eps: f64) -> Result<f64, EosError> {
        check_density(closure, rho)?;
        let thermal = eps - self.q_available();
        if thermal >= 0. && thermal.is_finite() {
            Ok(thermal)
        } else {
            Err(EosError::OutOfDomain {
                closure,
                rho,
                value: eps,
            })
        }
    }

    pub fn pressure_from_rho_eps(&self, rho: f64, eps: f64) -> Result<f64, EosError> {
        let thermal = self.thermal_energy("p_from_rho_eps", rho, eps)?;
        Ok(self.gas().gamma.gm1() * rho * thermal)
    }

    pub fn enthalpy_from_rho_eps(&self, rho: f64, eps: f64) -> Result<f64, EosError> {
        self.thermal_energy("h_from_rho_eps", rho, eps)?;
        let gamma = self.gas().gamma.gamma();
        Ok(1. + gamma * eps + (1. - gamma) * self.q_available())
    }

    pub fn sound_speed_from_rho_eps(&self, rho: f64, eps: f64) -> Result<f64, EosError> {
        let thermal = self.thermal_energy("cs_from_rho_eps", rho, eps)?;
        let gamma = self.gas().gamma;
        let h = self.enthalpy_from_rho_eps(rho, eps)?;
        let cs2 = gamma.gamma() * gamma.gm1() * thermal / h;
        if (0. ..1.).contains(&cs2) {
            Ok(cs2.sqrt())
        } else {
            Err(EosError::OutOfDomain {
                closure: "cs_from_rho_eps",
                rho,
                value: eps,
            })
        }
    }

    pub fn enthalpy_from_rho_p(&self, rho: f64, p: f64) -> Result<f64, EosError> {
        check_density("h_from_rho_p", rho)?;
        if !(p >= 0. && p.is_finite()) {
            return Err(EosError::OutOfDomain {
                closure: "h_from_rho_p",
                rho,
                value: p,
            });
        }
        Ok(1. + self.gas().gamma.gdgm1() * p / rho + self.q_available())
    }

    pub fn temperature_from_rho_eps(&self, rho: f64, eps: f64) -> Result<f64, EosError> {
        let thermal = self.thermal_energy("t_from_rho_eps", rho, eps)?;
        let gas = self.gas();
        Ok(gas.gamma.gm1() * thermal / gas.cv)
    }
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;
    use yaml_rust::YamlLoader;

    use super::*;

    const GAMMA: f64 = 5. / 3.;

    #[test]
    fn test_gamma_law() {
        let eos = EquationOfState::gamma_law(GAMMA);
        assert_approx_eq!(f64, eos.pressure_from_rho_eps(1., 1.5).unwrap(), 1., epsilon = 1e-14);
        assert_approx_eq!(f64, eos.enthalpy_from_rho_eps(1., 1.5).unwrap(), 3.5, epsilon = 1e-14);
        assert_approx_eq!(f64, eos.enthalpy_from_rho_p(1., 1.).unwrap(), 3.5, epsilon = 1e-14);
        assert_approx_eq!(
            f64,
            eos.sound_speed_from_rho_eps(1., 1.5).unwrap(),
            (10f64 / 21.).sqrt(),
            epsilon = 1e-14
        );
        assert_approx_eq!(
            f64,
            eos.temperature_from_rho_eps(1., 1.5).unwrap(),
            1.,
            epsilon = 1e-14
        );
        assert!(eos.reaction().is_none());
        assert_eq!(eos.burnt(), eos);
    }

    #[test]
    fn test_reactive_gamma_law() {
        let eos = EquationOfState::reactive_gamma_law(GAMMA, 1., 1., 1., GasLaw::new(GAMMA));
        let p = eos.pressure_from_rho_eps(1., 1.5).unwrap();
        assert_approx_eq!(f64, p, 1. / 3., epsilon = 1e-14);
        let h = eos.enthalpy_from_rho_eps(1., 1.5).unwrap();
        assert_approx_eq!(f64, h, 1. + 1.5 + p, epsilon = 1e-14);
        assert_approx_eq!(f64, eos.enthalpy_from_rho_p(1., p).unwrap(), h, epsilon = 1e-14);
        assert_eq!(eos.q_available(), 1.);
        assert_eq!(eos.burnt(), EquationOfState::gamma_law(GAMMA));
    }

    #[test]
    fn test_domain_errors() {
        let eos = EquationOfState::gamma_law(GAMMA);
        assert!(eos.pressure_from_rho_eps(-1., 1.).is_err());
        assert!(eos.pressure_from_rho_eps(1., -1.).is_err());
        assert!(eos.enthalpy_from_rho_p(0., 1.).is_err());
        assert!(eos.enthalpy_from_rho_p(1., f64::NAN).is_err());

        // Unburnt material cannot have less energy than it can still release.
        let eos = EquationOfState::reactive_gamma_law(GAMMA, 1., 1., 1., GasLaw::new(GAMMA));
        assert!(matches!(
            eos.temperature_from_rho_eps(1., 0.5),
            Err(EosError::OutOfDomain { closure: "t_from_rho_eps", .. })
        ));
    }

    #[test]
    fn test_init() {
        let cfg = &YamlLoader::load_from_str(
            r##"
kind: "ReactiveGammaLaw"
gamma: 1.4
cv: 2.
q_available: 0.1
t_ignition: 0.5
burnt:
  gamma: 1.5
"##,
        )
        .unwrap()[0];
        let eos = EquationOfState::init(cfg).unwrap();
        let reaction = eos.reaction().unwrap();
        assert_eq!(reaction.q_available, 0.1);
        assert_eq!(reaction.t_ignition, 0.5);
        assert_eq!(reaction.burnt.gamma().gamma(), 1.5);
        assert_eq!(reaction.burnt.cv(), 1.);

        let cfg = &YamlLoader::load_from_str("kind: \"Tabulated\"\ngamma: 1.4").unwrap()[0];
        assert!(matches!(
            EquationOfState::init(cfg),
            Err(ConfigError::UnknownEos(_))
        ));

        let cfg = &YamlLoader::load_from_str("kind: \"GammaLaw\"").unwrap()[0];
        assert!(matches!(
            EquationOfState::init(cfg),
            Err(ConfigError::MissingParameter(_))
        ));
    }
}
