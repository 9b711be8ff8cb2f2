use crate::{
    config::SolverConfig,
    errors::WaveError,
    numerics::OdeSystem,
    physical_quantities::{RelativisticState, WaveState, Wavenumber},
    wave::{check_acoustic, SectionKind, WaveSection, Wavespeed},
};

/// Self-similar rarefaction fan: the evolution of `(rho, v, eps)` with pressure.
///
/// The tangential velocity of the intermediate states follows from the known
/// state (see Pons, Marti & Müller 2000, J. Fluid Mech. 422).
pub(super) struct RarefactionOde<'a> {
    q_known: &'a RelativisticState,
    wavenumber: Wavenumber,
}

impl<'a> RarefactionOde<'a> {
    pub(super) fn new(q_known: &'a RelativisticState, wavenumber: Wavenumber) -> Self {
        Self {
            q_known,
            wavenumber,
        }
    }

    pub(super) fn initial_value(&self) -> [f64; 3] {
        [self.q_known.rho(), self.q_known.v(), self.q_known.eps()]
    }

    pub(super) fn local_state(&self, w: &[f64; 3]) -> Result<RelativisticState, WaveError> {
        let [rho, v, eps] = *w;
        let vt = self.q_known.tangential_velocity_from_known(rho, v, eps)?;
        Ok(RelativisticState::new(rho, v, vt, eps, *self.q_known.eos())?)
    }
}

impl OdeSystem<3> for RarefactionOde<'_> {
    type Error = WaveError;

    /// The local pressure is used rather than `p`, since the two can drift apart
    /// when the tangential velocity is large.
    fn rhs(&self, _p: f64, w: &[f64; 3]) -> Result<[f64; 3], WaveError> {
        let state = self.local_state(w)?;
        let rho = state.rho();
        let v = state.v();
        let vt = state.vt();
        let h = state.enthalpy();
        let cs = state.sound_speed();
        let lorentz = state.lorentz();
        let xi = state.wavespeed(self.wavenumber);
        // Effect of the tangential velocity on the characteristic relation
        let g = vt * vt * (xi * xi - 1.) / (1. - xi * v).powi(2);

        Ok([
            1. / (h * cs * cs),
            self.wavenumber.lr_sign() / (rho * h * lorentz * lorentz * cs) / (1. + g).sqrt(),
            state.pressure() / (rho * rho * h * cs * cs),
        ])
    }
}

/// Rarefaction from `q_start` to the lower pressure `p_end`.
pub(super) fn rarefaction(
    config: &SolverConfig,
    q_start: &RelativisticState,
    p_end: f64,
    wavenumber: Wavenumber,
) -> Result<WaveSection<RelativisticState>, WaveError> {
    check_acoustic(SectionKind::Rarefaction, wavenumber)?;

    if config.closeness().is_close(q_start.pressure(), p_end) {
        return Ok(WaveSection::trivial(
            SectionKind::Rarefaction,
            wavenumber,
            q_start.clone(),
            q_start.relabel(wavenumber.star_label()),
        ));
    }
    if p_end > q_start.pressure() {
        return Err(WaveError::Precondition(format!(
            "For a rarefaction, p_start >= p_end, but {} < {p_end}",
            q_start.pressure()
        )));
    }

    let ode = RarefactionOde::new(q_start, wavenumber);
    let w_end = config
        .integrator()
        .integrate(&ode, q_start.pressure(), &ode.initial_value(), p_end)?;
    let q_end = ode
        .local_state(&w_end)?
        .relabel(wavenumber.star_label());

    let v_known = q_start.wavespeed(wavenumber);
    let v_unknown = q_end.wavespeed(wavenumber);
    let wavespeed = match wavenumber {
        Wavenumber::Left => Wavespeed::Fan(v_known, v_unknown),
        _ => Wavespeed::Fan(v_unknown, v_known),
    };

    Ok(WaveSection::new(
        SectionKind::Rarefaction,
        wavenumber,
        q_start.clone(),
        q_end,
        wavespeed,
    ))
}

/// States at `n` equidistant pressures through the fan of `section`.
pub(super) fn fan(
    config: &SolverConfig,
    section: &WaveSection<RelativisticState>,
    n: usize,
) -> Result<Vec<RelativisticState>, WaveError> {
    let p_start = section.q_start().pressure();
    let p_end = section.q_end().pressure();
    let pressures: Vec<f64> = match n {
        0 => vec![],
        1 => vec![p_start],
        _ => (0..n)
            .map(|i| p_start + (p_end - p_start) * i as f64 / (n - 1) as f64)
            .collect(),
    };

    let ode = RarefactionOde::new(section.q_start(), section.wavenumber());
    config
        .integrator()
        .integrate_samples(&ode, &pressures, &ode.initial_value())?
        .iter()
        .map(|w| ode.local_state(w))
        .collect()
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use crate::gas_law::EquationOfState;

    use super::*;

    fn known(v: f64, vt: f64) -> RelativisticState {
        RelativisticState::new(1., v, vt, 1.5, EquationOfState::gamma_law(5. / 3.)).unwrap()
    }

    #[test]
    fn test_rarefaction_speeds() {
        let config = SolverConfig::default();
        let q = known(0., 0.);
        let left = rarefaction(&config, &q, 0.3, Wavenumber::Left).unwrap();
        let Wavespeed::Fan(head, tail) = left.wavespeed() else {
            panic!("A rarefaction is a fan");
        };
        assert!(head < tail);
        assert_eq!(head, q.wavespeed(Wavenumber::Left));
        assert!(left.q_end().v() > 0.);
        assert!(left.q_end().rho() < q.rho());
        assert_approx_eq!(f64, left.q_end().pressure(), 0.3, epsilon = 1e-8);

        let right = rarefaction(&config, &q, 0.3, Wavenumber::Right).unwrap();
        let Wavespeed::Fan(tail, head) = right.wavespeed() else {
            panic!("A rarefaction is a fan");
        };
        assert!(tail < head);
        assert_approx_eq!(f64, right.q_end().v(), -left.q_end().v(), epsilon = 1e-10);
    }

    #[test]
    fn test_rarefaction_precondition() {
        let q = known(0., 0.);
        assert!(matches!(
            rarefaction(&SolverConfig::default(), &q, 2., Wavenumber::Left),
            Err(WaveError::Precondition(_))
        ));
        assert!(matches!(
            rarefaction(&SolverConfig::default(), &q, 0.5, Wavenumber::Contact),
            Err(WaveError::Precondition(_))
        ));
    }

    #[test]
    fn test_round_trip() {
        let config = SolverConfig::default();
        let integrator = config.integrator();
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..10 {
            let q = known(rng.gen_range(-0.5..0.5), rng.gen_range(0. ..0.4));
            let wavenumber = if rng.gen_bool(0.5) {
                Wavenumber::Left
            } else {
                Wavenumber::Right
            };
            let p_end = rng.gen_range(0.2..0.9) * q.pressure();
            let ode = RarefactionOde::new(&q, wavenumber);
            let w0 = ode.initial_value();
            let w1 = integrator.integrate(&ode, q.pressure(), &w0, p_end).unwrap();
            let w2 = integrator.integrate(&ode, p_end, &w1, q.pressure()).unwrap();
            for (a, b) in w0.iter().zip(w2.iter()) {
                assert_approx_eq!(f64, *a, *b, epsilon = 1e-7);
            }
        }
    }

    #[test]
    fn test_fan() {
        let config = SolverConfig::default();
        let q = known(0.1, 0.2);
        let section = rarefaction(&config, &q, 0.4, Wavenumber::Left).unwrap();
        let states = fan(&config, &section, 11).unwrap();
        assert_eq!(states.len(), 11);
        for (state, expected) in [(&states[0], &q), (&states[10], section.q_end())] {
            for (a, b) in state.primitives().iter().zip(expected.primitives().iter()) {
                assert_approx_eq!(f64, *a, *b, epsilon = 1e-8);
            }
        }
        // Characteristic speeds increase monotonically through a left fan
        for pair in states.windows(2) {
            assert!(pair[0].wavespeed(Wavenumber::Left) < pair[1].wavespeed(Wavenumber::Left));
        }
    }
}
