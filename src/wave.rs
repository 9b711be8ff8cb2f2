use std::fmt::{self, Display};

use rayon::prelude::*;

use crate::{
    errors::WaveError,
    physical_quantities::{WaveState, Wavenumber},
    utils::Closeness,
};

/// The physical type of a [`WaveSection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Contact,
    Rarefaction,
    Shock,
    Deflagration { chapman_jouguet: bool },
    Detonation { chapman_jouguet: bool },
}

impl SectionKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            SectionKind::Contact => "C",
            SectionKind::Rarefaction => "R",
            SectionKind::Shock => "S",
            SectionKind::Deflagration {
                chapman_jouguet: false,
            } => "WDF",
            SectionKind::Deflagration {
                chapman_jouguet: true,
            } => "CJDF",
            SectionKind::Detonation {
                chapman_jouguet: false,
            } => "SDT",
            SectionKind::Detonation {
                chapman_jouguet: true,
            } => "CJDT",
        }
    }

    pub fn is_chapman_jouguet(&self) -> bool {
        matches!(
            self,
            SectionKind::Deflagration {
                chapman_jouguet: true
            } | SectionKind::Detonation {
                chapman_jouguet: true
            }
        )
    }
}

pub(crate) fn check_acoustic(kind: SectionKind, wavenumber: Wavenumber) -> Result<(), WaveError> {
    match wavenumber {
        Wavenumber::Contact => Err(WaveError::Precondition(format!(
            "wavenumber for a {} section must be 0 or 2",
            kind.symbol()
        ))),
        _ => Ok(()),
    }
}

/// Propagation speed(s) of a wave or wave section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Wavespeed {
    /// A discontinuity moving at a single speed.
    Single(f64),
    /// A fan, spanning the interval between its (left, right) edges.
    Fan(f64, f64),
}

impl Wavespeed {
    pub fn min(&self) -> f64 {
        match *self {
            Wavespeed::Single(speed) => speed,
            Wavespeed::Fan(left, right) => left.min(right),
        }
    }

    pub fn max(&self) -> f64 {
        match *self {
            Wavespeed::Single(speed) => speed,
            Wavespeed::Fan(left, right) => left.max(right),
        }
    }

    pub fn values(&self) -> Vec<f64> {
        match *self {
            Wavespeed::Single(speed) => vec![speed],
            Wavespeed::Fan(left, right) => vec![left, right],
        }
    }
}

impl Display for Wavespeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wavespeed::Single(speed) => write!(f, "= {speed:.4}"),
            Wavespeed::Fan(left, right) => write!(f, "∈ [{left:.4}, {right:.4}]"),
        }
    }
}

/// One physically homogeneous piece of a wave.
#[derive(Debug, Clone)]
pub struct WaveSection<S> {
    kind: SectionKind,
    wavenumber: Wavenumber,
    q_start: S,
    q_end: S,
    wavespeed: Wavespeed,
    trivial: bool,
}

impl<S: WaveState> WaveSection<S> {
    pub(crate) fn new(
        kind: SectionKind,
        wavenumber: Wavenumber,
        q_start: S,
        q_end: S,
        wavespeed: Wavespeed,
    ) -> Self {
        Self {
            kind,
            wavenumber,
            q_start,
            q_end,
            wavespeed,
            trivial: false,
        }
    }

    /// A section without jump: `q_end` equals `q_start` up to its label (and
    /// possibly its equation of state), and it moves with the characteristic
    /// speed of `q_start`.
    pub(crate) fn trivial(kind: SectionKind, wavenumber: Wavenumber, q_start: S, q_end: S) -> Self {
        let speed = q_start.wavespeed(wavenumber);
        Self {
            kind,
            wavenumber,
            q_start,
            q_end,
            wavespeed: Wavespeed::Single(speed),
            trivial: true,
        }
    }

    /// Contact discontinuity between two states with the same velocity and
    /// coupling variable.
    pub fn contact(q_start: S, q_end: S, closeness: &Closeness) -> Result<Self, WaveError> {
        if !closeness.is_close(q_start.velocity(), q_end.velocity()) {
            return Err(WaveError::Precondition(format!(
                "Velocities of states must match for a contact: {} != {}",
                q_start.velocity(),
                q_end.velocity()
            )));
        }
        if !closeness.is_close(q_start.coupling(), q_end.coupling()) {
            return Err(WaveError::Precondition(format!(
                "Coupling variables of states must match for a contact: {} != {}",
                q_start.coupling(),
                q_end.coupling()
            )));
        }
        if !closeness.is_close(
            q_start.wavespeed(Wavenumber::Contact),
            q_end.wavespeed(Wavenumber::Contact),
        ) {
            return Err(WaveError::Precondition(
                "Wavespeeds of states must match for a contact".to_string(),
            ));
        }

        let trivial = q_start.is_close(&q_end, closeness);
        let speed = q_start.velocity();
        Ok(Self {
            kind: SectionKind::Contact,
            wavenumber: Wavenumber::Contact,
            q_start,
            q_end,
            wavespeed: Wavespeed::Single(speed),
            trivial,
        })
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    pub fn wavenumber(&self) -> Wavenumber {
        self.wavenumber
    }

    pub fn q_start(&self) -> &S {
        &self.q_start
    }

    pub fn q_end(&self) -> &S {
        &self.q_end
    }

    pub fn wavespeed(&self) -> Wavespeed {
        self.wavespeed
    }

    pub fn is_trivial(&self) -> bool {
        self.trivial
    }

    /// Short name of the section, e.g. `S←` or `CJDF→`.
    pub fn name(&self) -> String {
        format!("{}{}", self.kind.symbol(), self.wavenumber.arrow())
    }

    /// Samples `(characteristic speed, state)` through the section.
    ///
    /// Rarefaction fans are sampled at `n` equidistant values of the coupling
    /// variable, discontinuities return their edge states at the front speed.
    pub fn profile<F>(&self, family: &F, n: usize) -> Result<Vec<(f64, S)>, WaveError>
    where
        F: WaveFamily<State = S>,
    {
        match self.kind {
            SectionKind::Rarefaction if !self.trivial => Ok(family
                .rarefaction_fan(self, n)?
                .into_iter()
                .map(|state| (state.wavespeed(self.wavenumber), state))
                .collect()),
            _ => {
                let speed = match self.wavespeed {
                    Wavespeed::Single(speed) => speed,
                    Wavespeed::Fan(..) => self.q_start.wavespeed(self.wavenumber),
                };
                Ok(vec![
                    (speed, self.q_start.clone()),
                    (speed, self.q_end.clone()),
                ])
            }
        }
    }
}

impl<S: WaveState> Display for WaveSection<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.trivial {
            return Ok(());
        }
        write!(
            f,
            "{}: λ({}) {}",
            self.name(),
            self.wavenumber,
            self.wavespeed
        )
    }
}

/// A family of physical models, providing the wave sections of the acoustic waves.
pub trait WaveFamily: Sync {
    type State: WaveState;

    /// Ordered wave sections connecting `q_known` to a state with coupling
    /// variable `target`, for a left- or right-going wave.
    fn build_sections(
        &self,
        q_known: &Self::State,
        target: f64,
        wavenumber: Wavenumber,
    ) -> Result<Vec<WaveSection<Self::State>>, WaveError>;

    /// `n` states through a (non trivial) rarefaction section, from its start to its end state.
    fn rarefaction_fan(
        &self,
        section: &WaveSection<Self::State>,
        n: usize,
    ) -> Result<Vec<Self::State>, WaveError>;

    /// Tolerances deciding whether two states are numerically equal.
    fn closeness(&self) -> Closeness;
}

/// The complete wave of one characteristic family.
#[derive(Debug, Clone)]
pub struct Wave<S> {
    wavenumber: Wavenumber,
    sections: Vec<WaveSection<S>>,
    q_l: S,
    q_r: S,
    wavespeed: Option<Wavespeed>,
    trivial: bool,
}

impl<S: WaveState> Wave<S> {
    /// Solve the wave of family `wavenumber` between `q_known` and the star region
    /// with coupling variable `target`.
    pub fn new<F>(
        family: &F,
        q_known: &S,
        target: f64,
        wavenumber: Wavenumber,
    ) -> Result<Self, WaveError>
    where
        F: WaveFamily<State = S>,
    {
        let closeness = family.closeness();
        let sections = match wavenumber {
            Wavenumber::Contact => vec![WaveSection::contact(
                q_known.clone(),
                q_known.relabel(None),
                &closeness,
            )?],
            _ => family.build_sections(q_known, target, wavenumber)?,
        };

        let q_end = sections
            .last()
            .map_or_else(|| q_known.clone(), |section| section.q_end.clone());
        let (q_l, q_r) = match wavenumber {
            Wavenumber::Left => (q_known.clone(), q_end),
            Wavenumber::Contact => (q_known.clone(), q_known.clone()),
            Wavenumber::Right => (q_end, q_known.clone()),
        };

        Ok(Self::from_sections(wavenumber, sections, q_l, q_r, &closeness))
    }

    /// The contact wave between the two star states `q_l` and `q_r`.
    pub fn contact(q_l: S, q_r: S, closeness: &Closeness) -> Result<Self, WaveError> {
        let section = WaveSection::contact(q_l.clone(), q_r.clone(), closeness)?;
        Ok(Self::from_sections(
            Wavenumber::Contact,
            vec![section],
            q_l,
            q_r,
            closeness,
        ))
    }

    fn from_sections(
        wavenumber: Wavenumber,
        sections: Vec<WaveSection<S>>,
        q_l: S,
        q_r: S,
        closeness: &Closeness,
    ) -> Self {
        let trivial = sections.iter().all(|section| section.trivial);
        let wavespeed = if trivial {
            None
        } else {
            let (min, max) = sections
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), section| {
                    (
                        min.min(section.wavespeed.min()),
                        max.max(section.wavespeed.max()),
                    )
                });
            if closeness.is_close(min, max) {
                Some(Wavespeed::Single(min))
            } else {
                Some(Wavespeed::Fan(min, max))
            }
        };

        Self {
            wavenumber,
            sections,
            q_l,
            q_r,
            wavespeed,
            trivial,
        }
    }

    pub fn wavenumber(&self) -> Wavenumber {
        self.wavenumber
    }

    pub fn sections(&self) -> &[WaveSection<S>] {
        &self.sections
    }

    pub fn q_l(&self) -> &S {
        &self.q_l
    }

    pub fn q_r(&self) -> &S {
        &self.q_r
    }

    /// `None` for trivial waves.
    pub fn wavespeed(&self) -> Option<Wavespeed> {
        self.wavespeed
    }

    pub fn is_trivial(&self) -> bool {
        self.trivial
    }

    /// Names of the sections, ordered from left to right.
    pub fn name(&self) -> String {
        let names: Vec<String> = match self.wavenumber {
            Wavenumber::Right => self.sections.iter().rev().map(|s| s.name()).collect(),
            _ => self.sections.iter().map(|s| s.name()).collect(),
        };
        match names.len() {
            0 => String::new(),
            1 => names[0].clone(),
            _ => format!("({})", names.join(" ")),
        }
    }

    /// Samples through all sections, ordered from left to right.
    pub fn profile<F>(&self, family: &F, n: usize) -> Result<Vec<(f64, S)>, WaveError>
    where
        F: WaveFamily<State = S>,
    {
        let mut samples = Vec::new();
        for section in self.sections.iter() {
            samples.extend(section.profile(family, n)?);
        }
        if self.wavenumber == Wavenumber::Right {
            samples.reverse();
        }
        Ok(samples)
    }
}

impl<S: WaveState> Display for Wave<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.wavespeed {
            Some(wavespeed) if !self.trivial => {
                write!(f, "{}: λ({}) {}", self.name(), self.wavenumber, wavespeed)
            }
            _ => Ok(()),
        }
    }
}

/// A single wave to solve: the known state, the coupling variable in the star
/// region and the characteristic family.
#[derive(Debug, Clone)]
pub struct WaveProblem<S> {
    pub state: S,
    pub target: f64,
    pub wavenumber: Wavenumber,
}

/// Solve independent wave problems in parallel.
pub fn solve_batch<F>(family: &F, problems: &[WaveProblem<F::State>]) -> Vec<Result<Wave<F::State>, WaveError>>
where
    F: WaveFamily,
{
    problems
        .par_iter()
        .map(|problem| Wave::new(family, &problem.state, problem.target, problem.wavenumber))
        .collect()
}

#[cfg(test)]
mod test {
    use crate::{gas_law::EquationOfState, physical_quantities::RelativisticState};

    use super::*;

    fn state(rho: f64, eps: f64) -> RelativisticState {
        RelativisticState::new(rho, 0.1, 0., eps, EquationOfState::gamma_law(5. / 3.)).unwrap()
    }

    #[test]
    fn test_section_names() {
        assert_eq!(SectionKind::Rarefaction.symbol(), "R");
        assert_eq!(
            SectionKind::Deflagration {
                chapman_jouguet: true
            }
            .symbol(),
            "CJDF"
        );
        assert!(SectionKind::Detonation {
            chapman_jouguet: true
        }
        .is_chapman_jouguet());
        assert!(!SectionKind::Shock.is_chapman_jouguet());
    }

    #[test]
    fn test_wavespeed() {
        let fan = Wavespeed::Fan(0.3, -0.2);
        assert_eq!(fan.min(), -0.2);
        assert_eq!(fan.max(), 0.3);
        assert_eq!(fan.values(), vec![0.3, -0.2]);
        assert_eq!(Wavespeed::Single(0.25).to_string(), "= 0.2500");
    }

    #[test]
    fn test_contact() {
        let closeness = Closeness::default();
        let q = state(1., 1.5);
        let section = WaveSection::contact(q.clone(), q.relabel(Some("*")), &closeness).unwrap();
        assert!(section.is_trivial());
        assert_eq!(section.wavespeed(), Wavespeed::Single(0.1));
        assert_eq!(section.to_string(), "");

        // Same pressure and velocity, different density
        let section = WaveSection::contact(q.clone(), state(2., 0.75), &closeness).unwrap();
        assert!(!section.is_trivial());
        assert_eq!(section.to_string(), "C: λ(1) = 0.1000");

        let wave = Wave::contact(q.clone(), state(2., 0.75), &closeness).unwrap();
        assert_eq!(wave.wavespeed(), Some(Wavespeed::Single(0.1)));
        assert_eq!(wave.q_r().rho(), 2.);

        assert!(matches!(
            WaveSection::contact(q, state(1., 1.), &closeness),
            Err(WaveError::Precondition(_))
        ));
    }

    #[test]
    fn test_empty_wave() {
        let closeness = Closeness::default();
        let q = state(1., 1.5);
        let wave = Wave::from_sections(Wavenumber::Left, vec![], q.clone(), q, &closeness);
        assert!(wave.is_trivial());
        assert_eq!(wave.name(), "");
        assert_eq!(wave.to_string(), "");
    }
}
