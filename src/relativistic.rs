//! Waves of a special relativistic (and possibly reactive) perfect fluid.

use tracing::debug;

use crate::{
    config::SolverConfig,
    errors::WaveError,
    gas_law::Reaction,
    physical_quantities::{RelativisticState, Wavenumber},
    utils::Closeness,
    wave::{WaveFamily, WaveSection},
};

mod combustion;
mod rarefaction;
mod shock;

use combustion::{deflagration, detonation, precursor_shock};
use rarefaction::rarefaction;
use shock::shock;

/// Relativistic hydrodynamics. Reactive waves are built whenever the known
/// state's equation of state supports reactions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Relativistic {
    config: SolverConfig,
}

impl Relativistic {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn inert_sections(
        &self,
        q_known: &RelativisticState,
        target: f64,
        wavenumber: Wavenumber,
    ) -> Result<Vec<WaveSection<RelativisticState>>, WaveError> {
        let section = if q_known.pressure() < target {
            shock(&self.config, q_known, target, wavenumber)?
        } else {
            rarefaction(&self.config, q_known, target, wavenumber)?
        };
        Ok(vec![section])
    }

    fn reactive_sections(
        &self,
        q_known: &RelativisticState,
        target: f64,
        wavenumber: Wavenumber,
        reaction: &Reaction,
    ) -> Result<Vec<WaveSection<RelativisticState>>, WaveError> {
        let mut sections = vec![];
        let front = if q_known.pressure() < target {
            detonation(&self.config, q_known, target, wavenumber)?
        } else {
            let q_precursor = if q_known.temperature() < reaction.t_ignition {
                let precursor =
                    precursor_shock(&self.config, q_known, reaction.t_ignition, wavenumber)?;
                let q_precursor = precursor.q_end().clone();
                sections.push(precursor);
                q_precursor
            } else {
                q_known.clone()
            };
            deflagration(&self.config, &q_precursor, target, wavenumber)?
        };

        // A Chapman-Jouguet front overshoots the target, a rarefaction relaxes the rest
        let q_front = front.q_end().clone();
        sections.push(front);
        let p_front = q_front.pressure();
        if p_front > target && !self.config.closeness().is_close(p_front, target) {
            debug!(%wavenumber, p_front, target, "Trailing rarefaction");
            sections.push(rarefaction(&self.config, &q_front, target, wavenumber)?);
        }

        Ok(sections)
    }
}

impl WaveFamily for Relativistic {
    type State = RelativisticState;

    fn build_sections(
        &self,
        q_known: &RelativisticState,
        target: f64,
        wavenumber: Wavenumber,
    ) -> Result<Vec<WaveSection<RelativisticState>>, WaveError> {
        match q_known.eos().reaction() {
            None => self.inert_sections(q_known, target, wavenumber),
            Some(reaction) => self.reactive_sections(q_known, target, wavenumber, reaction),
        }
    }

    fn rarefaction_fan(
        &self,
        section: &WaveSection<RelativisticState>,
        n: usize,
    ) -> Result<Vec<RelativisticState>, WaveError> {
        rarefaction::fan(&self.config, section, n)
    }

    fn closeness(&self) -> Closeness {
        self.config.closeness()
    }
}

#[cfg(test)]
mod test {
    use crate::{
        gas_law::{EquationOfState, GasLaw},
        wave::{SectionKind, Wave, Wavespeed},
    };

    use super::*;

    const GAMMA: f64 = 5. / 3.;

    fn reactive_eos() -> EquationOfState {
        EquationOfState::reactive_gamma_law(GAMMA, 0.1, 1., 0.5, GasLaw::new(GAMMA))
    }

    #[test]
    fn test_inert_strategy() {
        let family = Relativistic::default();
        let q = RelativisticState::new(1., 0., 0., 1.5, EquationOfState::gamma_law(GAMMA)).unwrap();
        let sections = family.build_sections(&q, 3., Wavenumber::Left).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].kind(), SectionKind::Shock);
        let sections = family.build_sections(&q, 0.3, Wavenumber::Left).unwrap();
        assert_eq!(sections[0].kind(), SectionKind::Rarefaction);
    }

    #[test]
    fn test_reactive_contact() {
        let q = RelativisticState::new(1., 0.3, 0., 2., reactive_eos()).unwrap();
        let wave = Wave::new(&Relativistic::default(), &q, 0.1, Wavenumber::Contact).unwrap();
        assert_eq!(wave.sections().len(), 1);
        assert_eq!(wave.sections()[0].kind(), SectionKind::Contact);
        assert!(wave.is_trivial());
        assert_eq!(wave.wavespeed(), None);
        assert_eq!(wave.q_l(), wave.q_r());
    }

    #[test]
    fn test_hot_deflagration_without_precursor() {
        let family = Relativistic::default();
        let q = RelativisticState::new(1., 0., 0., 2., reactive_eos()).unwrap();
        let sections = family
            .build_sections(&q, 0.01, Wavenumber::Right)
            .unwrap();
        assert_eq!(
            sections[0].kind(),
            SectionKind::Deflagration {
                chapman_jouguet: true
            }
        );
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].kind(), SectionKind::Rarefaction);
        assert_eq!(sections[1].q_start(), sections[0].q_end());
        assert!(matches!(sections[1].wavespeed(), Wavespeed::Fan(..)));
    }
}
