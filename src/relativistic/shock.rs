use tracing::trace;

use crate::{
    config::SolverConfig,
    errors::WaveError,
    gas_law::EquationOfState,
    numerics::expand_bracket,
    physical_quantities::{RelativisticState, WaveState, Wavenumber},
    wave::{check_acoustic, SectionKind, WaveSection, Wavespeed},
};

/// Solution of the jump conditions between a start state and a given end pressure.
#[derive(Debug, Clone, Copy)]
pub(super) struct Jump {
    pub mass_flux_squared: f64,
    pub rho: f64,
    pub eps: f64,
    pub p_end: f64,
}

/// Solve the Taub adiabat for the post-jump density at pressure `p_end`, where
/// the material behind the jump is described by `end_eos`.
///
/// See e.g. section 8.3 of Marti & Müller (2015), Living Reviews in Computational Astrophysics 1.
pub(super) fn mass_flux_squared(
    config: &SolverConfig,
    q_start: &RelativisticState,
    p_end: f64,
    end_eos: &EquationOfState,
) -> Result<Jump, WaveError> {
    let rho_s = q_start.rho();
    let h_s = q_start.enthalpy();
    let p_s = q_start.pressure();

    let taub = |rho: f64| -> Result<f64, WaveError> {
        let h = end_eos.enthalpy_from_rho_p(rho, p_end)?;
        Ok((h * h - h_s * h_s) - (h / rho + h_s / rho_s) * (p_end - p_s))
    };

    let inner = config.bracket_inner_factor;
    let outer = config.bracket_outer_factor;
    let rho_guess = (p_end / p_s).sqrt() * rho_s;
    let bracket = if p_end >= p_s {
        // Compression
        expand_bracket(
            &taub,
            rho_s,
            rho_guess,
            config.max_bracket_expansions,
            |lower, upper| (lower / inner, upper * outer),
        )?
    } else {
        // Expansion
        expand_bracket(
            &taub,
            rho_guess,
            rho_s,
            config.max_bracket_expansions,
            |lower, upper| (lower / outer, upper * inner),
        )?
    };
    let bracket = bracket.ok_or(WaveError::BracketExhausted {
        what: "post-jump density",
        expansions: config.max_bracket_expansions,
    })?;
    let rho = config.brent().find_root_bracketed(&taub, bracket)?;
    trace!(p_end, rho, "Solved Taub adiabat");

    let h = end_eos.enthalpy_from_rho_p(rho, p_end)?;
    let dp = p_end - p_s;
    let dh2 = h * h - h_s * h_s;
    let mass_flux_squared = -dp / (dh2 / dp - 2. * h_s / rho_s);
    if !(mass_flux_squared > 0. && mass_flux_squared.is_finite()) {
        return Err(WaveError::UnphysicalJump {
            target: p_end,
            mass_flux_squared,
        });
    }

    Ok(Jump {
        mass_flux_squared,
        rho,
        eps: h - 1. - p_end / rho,
        p_end,
    })
}

impl Jump {
    /// Speed of the front and the state behind it (described by `end_eos`).
    pub(super) fn front(
        &self,
        q_start: &RelativisticState,
        wavenumber: Wavenumber,
        end_eos: &EquationOfState,
    ) -> Result<(f64, RelativisticState), WaveError> {
        let s = wavenumber.lr_sign();
        let j2 = self.mass_flux_squared;
        let j = j2.sqrt();
        let dp = self.p_end - q_start.pressure();
        let v_s = q_start.v();
        let w_s = q_start.lorentz();
        let h_s = q_start.enthalpy();
        let rho_w2 = (q_start.rho() * w_s).powi(2);

        let v_front = (rho_w2 * v_s + s * j2 * (1. + rho_w2 * (1. - v_s * v_s) / j2).sqrt())
            / (rho_w2 + j2);
        let w_front = 1. / (1. - v_front * v_front).sqrt();
        let v = (h_s * w_s * v_s + s * dp * w_front / j)
            / (h_s * w_s + dp * (1. / (q_start.rho() * w_s) + s * v_s * w_front / j));
        let vt = q_start.tangential_velocity_with_eos(self.rho, v, self.eps, end_eos)?;
        let q_end = RelativisticState::new(self.rho, v, vt, self.eps, *end_eos)?
            .relabel(wavenumber.star_label());

        Ok((v_front, q_end))
    }
}

/// Inert shock from `q_start` to pressure `p_end`.
///
/// The direction of the pressure jump is not checked, since the shock
/// solution is also used for the unstable branches of reactive fronts.
pub(super) fn shock(
    config: &SolverConfig,
    q_start: &RelativisticState,
    p_end: f64,
    wavenumber: Wavenumber,
) -> Result<WaveSection<RelativisticState>, WaveError> {
    check_acoustic(SectionKind::Shock, wavenumber)?;

    if config.closeness().is_close(q_start.pressure(), p_end) {
        return Ok(WaveSection::trivial(
            SectionKind::Shock,
            wavenumber,
            q_start.clone(),
            q_start.relabel(wavenumber.star_label()),
        ));
    }

    let jump = mass_flux_squared(config, q_start, p_end, q_start.eos())?;
    let (v_shock, q_end) = jump.front(q_start, wavenumber, q_start.eos())?;
    Ok(WaveSection::new(
        SectionKind::Shock,
        wavenumber,
        q_start.clone(),
        q_end,
        Wavespeed::Single(v_shock),
    ))
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn known(v: f64) -> RelativisticState {
        RelativisticState::new(1., v, 0., 1.5, EquationOfState::gamma_law(5. / 3.)).unwrap()
    }

    #[test]
    fn test_compressive_jump() {
        let config = SolverConfig::default();
        let q = known(0.);
        let jump = mass_flux_squared(&config, &q, 3., q.eos()).unwrap();
        assert!(jump.rho > q.rho());
        let (_, q_end) = jump.front(&q, Wavenumber::Left, q.eos()).unwrap();
        assert_approx_eq!(f64, q_end.pressure(), 3., epsilon = 1e-10);
    }

    #[test]
    fn test_shock_speeds() {
        let config = SolverConfig::default();
        for wavenumber in [Wavenumber::Left, Wavenumber::Right] {
            let q = known(0.2);
            let section = shock(&config, &q, 3., wavenumber).unwrap();
            assert!(!section.is_trivial());
            let Wavespeed::Single(v_shock) = section.wavespeed() else {
                panic!("A shock moves at a single speed");
            };
            let xi_start = q.wavespeed(wavenumber);
            let xi_end = section.q_end().wavespeed(wavenumber);
            // Characteristics run into the shock from both sides
            assert!(v_shock > xi_start.min(xi_end));
            assert!(v_shock < xi_start.max(xi_end));
            assert!(section.q_end().rho() >= q.rho());
            assert_eq!(section.q_end().label(), wavenumber.star_label());
        }
    }

    #[test]
    fn test_trivial_shock() {
        let q = known(0.2);
        let section = shock(&SolverConfig::default(), &q, 1., Wavenumber::Right).unwrap();
        assert!(section.is_trivial());
        assert_eq!(section.q_end().primitives(), q.primitives());
        assert_eq!(
            section.wavespeed(),
            Wavespeed::Single(q.wavespeed(Wavenumber::Right))
        );
    }

    #[test]
    fn test_bracket_exhausted() {
        let config = SolverConfig {
            max_bracket_expansions: 0,
            ..Default::default()
        };
        let q = known(0.);
        assert!(matches!(
            shock(&config, &q, 3., Wavenumber::Left),
            Err(WaveError::BracketExhausted { expansions: 0, .. })
        ));
    }
}
