//! Waves of the relativistic shallow water equations.
//!
//! See Anile, Miller & Motta (1983), Phys. Fluids 26, for the derivation of the
//! jump conditions and the rarefaction relation.

use crate::{
    config::SolverConfig,
    errors::WaveError,
    numerics::OdeSystem,
    physical_quantities::{ShallowWaterState, WaveState, Wavenumber},
    utils::Closeness,
    wave::{check_acoustic, SectionKind, WaveFamily, WaveSection, Wavespeed},
};

/// Velocity through a rarefaction fan as a function of \f$\Phi\f$.
struct RarefactionOde {
    lr_sign: f64,
}

impl OdeSystem<1> for RarefactionOde {
    type Error = WaveError;

    fn rhs(&self, phi: f64, v: &[f64; 1]) -> Result<[f64; 1], WaveError> {
        let v = v[0];
        Ok([0.5 * (-v.powi(3) + v - self.lr_sign * (v * v - 1.) * (v * v + 4. / phi).sqrt())])
    }
}

/// Shallow water waves, which consist of a single contact, shock or rarefaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShallowWater {
    config: SolverConfig,
}

impl ShallowWater {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    fn rarefaction(
        &self,
        q_start: &ShallowWaterState,
        phi_end: f64,
        wavenumber: Wavenumber,
    ) -> Result<WaveSection<ShallowWaterState>, WaveError> {
        check_acoustic(SectionKind::Rarefaction, wavenumber)?;
        if self.config.closeness().is_close(q_start.phi(), phi_end) {
            return Ok(WaveSection::trivial(
                SectionKind::Rarefaction,
                wavenumber,
                q_start.clone(),
                q_start.relabel(wavenumber.star_label()),
            ));
        }
        if phi_end > q_start.phi() {
            return Err(WaveError::Precondition(format!(
                "For a rarefaction, phi_start >= phi_end, but {} < {phi_end}",
                q_start.phi()
            )));
        }

        let ode = RarefactionOde {
            lr_sign: wavenumber.lr_sign(),
        };
        let [v_end] = self
            .config
            .integrator()
            .integrate(&ode, q_start.phi(), &[q_start.v()], phi_end)?;
        let q_end = ShallowWaterState::new(phi_end, v_end)?.relabel(wavenumber.star_label());

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

    fn shock(
        &self,
        q_start: &ShallowWaterState,
        phi_end: f64,
        wavenumber: Wavenumber,
    ) -> Result<WaveSection<ShallowWaterState>, WaveError> {
        check_acoustic(SectionKind::Shock, wavenumber)?;
        if self.config.closeness().is_close(q_start.phi(), phi_end) {
            return Ok(WaveSection::trivial(
                SectionKind::Shock,
                wavenumber,
                q_start.clone(),
                q_start.relabel(wavenumber.star_label()),
            ));
        }
        if phi_end < q_start.phi() {
            return Err(WaveError::Precondition(format!(
                "For a shock, phi_start <= phi_end, but {} > {phi_end}",
                q_start.phi()
            )));
        }

        let (v_shock, v_end) = analytic_shock(q_start, phi_end, wavenumber.lr_sign());
        let q_end = ShallowWaterState::new(phi_end, v_end)?.relabel(wavenumber.star_label());
        Ok(WaveSection::new(
            SectionKind::Shock,
            wavenumber,
            q_start.clone(),
            q_end,
            Wavespeed::Single(v_shock),
        ))
    }
}

/// Shock speed and velocity behind the shock, computed in the rest frame of
/// the start state and boosted back.
fn analytic_shock(q: &ShallowWaterState, phi_star: f64, lr_sign: f64) -> (f64, f64) {
    let phi = q.phi();
    let v = q.v();
    let w_bar = (1. + phi_star / phi * (phi_star + phi) / 2.).sqrt();
    let v_bar = -lr_sign * (1. - 1. / (w_bar * w_bar)).sqrt();
    let v_shock = (v - v_bar) / (1. - v * v_bar);
    let wv_star_bar = phi * w_bar * v_bar / phi_star;
    let w_star_bar = (1. + wv_star_bar * wv_star_bar).sqrt();
    let v_star_bar = -lr_sign * (1. - 1. / (w_star_bar * w_star_bar)).sqrt();
    let v_star = (v_star_bar + v_shock) / (1. + v_star_bar * v_shock);
    (v_shock, v_star)
}

impl WaveFamily for ShallowWater {
    type State = ShallowWaterState;

    fn build_sections(
        &self,
        q_known: &ShallowWaterState,
        target: f64,
        wavenumber: Wavenumber,
    ) -> Result<Vec<WaveSection<ShallowWaterState>>, WaveError> {
        let section = if q_known.phi() < target {
            self.shock(q_known, target, wavenumber)?
        } else {
            self.rarefaction(q_known, target, wavenumber)?
        };
        Ok(vec![section])
    }

    fn rarefaction_fan(
        &self,
        section: &WaveSection<ShallowWaterState>,
        n: usize,
    ) -> Result<Vec<ShallowWaterState>, WaveError> {
        let phi_start = section.q_start().phi();
        let phi_end = section.q_end().phi();
        let phis: Vec<f64> = match n {
            0 => vec![],
            1 => vec![phi_start],
            _ => (0..n)
                .map(|i| phi_start + (phi_end - phi_start) * i as f64 / (n - 1) as f64)
                .collect(),
        };

        let ode = RarefactionOde {
            lr_sign: section.wavenumber().lr_sign(),
        };
        let velocities =
            self.config
                .integrator()
                .integrate_samples(&ode, &phis, &[section.q_start().v()])?;
        phis.iter()
            .zip(velocities.iter())
            .map(|(&phi, &[v])| ShallowWaterState::new(phi, v).map_err(WaveError::from))
            .collect()
    }

    fn closeness(&self) -> Closeness {
        self.config.closeness()
    }
}
