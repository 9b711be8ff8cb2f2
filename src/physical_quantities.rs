use std::fmt::{self, Debug, Display};

use glam::DVec2;

use crate::{errors::EosError, gas_law::EquationOfState, utils::Closeness};

/// Characteristic family of a wave.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, num_enum::IntoPrimitive, num_enum::TryFromPrimitive,
)]
#[repr(usize)]
pub enum Wavenumber {
    /// Left-going acoustic wave
    Left = 0,
    /// Material (contact) wave
    Contact = 1,
    /// Right-going acoustic wave
    Right = 2,
}

impl Wavenumber {
    /// -1 for left-going, 0 for contact and 1 for right-going waves.
    pub fn lr_sign(&self) -> f64 {
        usize::from(*self) as f64 - 1.
    }

    pub fn index(&self) -> usize {
        (*self).into()
    }

    pub(crate) fn arrow(&self) -> &'static str {
        match self {
            Wavenumber::Left => "←",
            Wavenumber::Contact => "",
            Wavenumber::Right => "→",
        }
    }

    /// Label of the star state a wave of this family produces.
    pub(crate) fn star_label(&self) -> Option<&'static str> {
        match self {
            Wavenumber::Left => Some("*L"),
            Wavenumber::Contact => None,
            Wavenumber::Right => Some("*R"),
        }
    }
}

impl Display for Wavenumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Common interface of the states of every wave family.
pub trait WaveState: Clone + Debug + Display + Send + Sync {
    /// The variable held fixed in the star region (pressure or \f$\Phi\f$).
    fn coupling(&self) -> f64;

    /// Velocity normal to the interface.
    fn velocity(&self) -> f64;

    /// Characteristic speed of the given family.
    fn wavespeed(&self, wavenumber: Wavenumber) -> f64;

    fn primitives(&self) -> Vec<f64>;

    fn label(&self) -> Option<&str>;

    /// Same state, with a different label.
    fn relabel(&self, label: Option<&str>) -> Self;

    fn is_close(&self, other: &Self, closeness: &Closeness) -> bool {
        closeness.all_close(&self.primitives(), &other.primitives())
    }
}

fn fmt_column(
    f: &mut fmt::Formatter<'_>,
    names: &[&str],
    label: Option<&str>,
    values: &[f64],
) -> fmt::Result {
    write!(f, "({})", names.join(", "))?;
    if let Some(label) = label {
        write!(f, "_{label}")?;
    }
    let values = values
        .iter()
        .map(|v| format!("{v:.4}"))
        .collect::<Vec<_>>()
        .join(", ");
    write!(f, " = ({values})")
}

/// A state of a (possibly reactive) relativistic perfect fluid.
///
/// The derived quantities are computed once, when the state is constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct RelativisticState {
    rho: f64,
    velocity: DVec2,
    eps: f64,
    eos: EquationOfState,
    label: Option<String>,
    pressure: f64,
    enthalpy: f64,
    lorentz: f64,
    sound_speed: f64,
    temperature: f64,
}

impl RelativisticState {
    /// Create a new state from its density, normal and tangential velocity and
    /// specific internal energy.
    pub fn new(
        rho: f64,
        v: f64,
        vt: f64,
        eps: f64,
        eos: EquationOfState,
    ) -> Result<Self, EosError> {
        let velocity = DVec2::new(v, vt);
        let v2 = velocity.length_squared();
        if !(v2 < 1.) {
            return Err(EosError::Superluminal(v2.sqrt()));
        }
        Ok(Self {
            rho,
            velocity,
            eps,
            eos,
            label: None,
            pressure: eos.pressure_from_rho_eps(rho, eps)?,
            enthalpy: eos.enthalpy_from_rho_eps(rho, eps)?,
            lorentz: 1. / (1. - v2).sqrt(),
            sound_speed: eos.sound_speed_from_rho_eps(rho, eps)?,
            temperature: eos.temperature_from_rho_eps(rho, eps)?,
        })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The same primitive variables, described by another equation of state.
    pub fn with_eos(&self, eos: EquationOfState) -> Result<Self, EosError> {
        let mut state = Self::new(
            self.rho,
            self.velocity.x,
            self.velocity.y,
            self.eps,
            eos,
        )?;
        state.label = self.label.clone();
        Ok(state)
    }

    pub fn rho(&self) -> f64 {
        self.rho
    }

    pub fn v(&self) -> f64 {
        self.velocity.x
    }

    pub fn vt(&self) -> f64 {
        self.velocity.y
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    pub fn eos(&self) -> &EquationOfState {
        &self.eos
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    pub fn enthalpy(&self) -> f64 {
        self.enthalpy
    }

    pub fn lorentz(&self) -> f64 {
        self.lorentz
    }

    pub fn sound_speed(&self) -> f64 {
        self.sound_speed
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Chemical energy this state can still release (0 for inert material).
    pub fn reactive_progress(&self) -> f64 {
        self.eos.q_available()
    }

    /// Tangential velocity of a state with the given `rho`, `v` and `eps`
    /// that has the same \f$h W v_t\f$ as this state.
    pub fn tangential_velocity_from_known(&self, rho: f64, v: f64, eps: f64) -> Result<f64, EosError> {
        self.tangential_velocity_with_eos(rho, v, eps, &self.eos)
    }

    /// Same as [`RelativisticState::tangential_velocity_from_known`], for a
    /// state described by `eos`.
    pub fn tangential_velocity_with_eos(
        &self,
        rho: f64,
        v: f64,
        eps: f64,
        eos: &EquationOfState,
    ) -> Result<f64, EosError> {
        let h = eos.enthalpy_from_rho_eps(rho, eps)?;
        let a = self.enthalpy * self.lorentz * self.vt();
        Ok(a * ((1. - v * v) / (h * h + a * a)).sqrt())
    }
}

impl WaveState for RelativisticState {
    fn coupling(&self) -> f64 {
        self.pressure
    }

    fn velocity(&self) -> f64 {
        self.velocity.x
    }

    fn wavespeed(&self, wavenumber: Wavenumber) -> f64 {
        match wavenumber {
            Wavenumber::Contact => self.v(),
            _ => {
                let s = wavenumber.lr_sign();
                let v = self.v();
                let v2 = self.velocity.length_squared();
                let cs = self.sound_speed;
                let cs2 = cs * cs;
                (v * (1. - cs2) + s * cs * ((1. - v2) * (1. - v * v - self.vt().powi(2) * cs2)).sqrt())
                    / (1. - v2 * cs2)
            }
        }
    }

    fn primitives(&self) -> Vec<f64> {
        vec![self.rho, self.velocity.x, self.velocity.y, self.eps]
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn relabel(&self, label: Option<&str>) -> Self {
        Self {
            label: label.map(str::to_string),
            ..self.clone()
        }
    }
}

impl Display for RelativisticState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.eos.reaction() {
            Some(reaction) => fmt_column(
                f,
                &["rho", "v_x", "v_t", "eps", "q"],
                self.label(),
                &[self.rho, self.v(), self.vt(), self.eps, reaction.q_available],
            ),
            None => fmt_column(
                f,
                &["rho", "v_x", "v_t", "eps"],
                self.label(),
                &[self.rho, self.v(), self.vt(), self.eps],
            ),
        }
    }
}

/// A state of the relativistic shallow water equations.
#[derive(Debug, Clone, PartialEq)]
pub struct ShallowWaterState {
    phi: f64,
    v: f64,
    label: Option<String>,
    lorentz: f64,
    celerity: f64,
}

impl ShallowWaterState {
    pub fn new(phi: f64, v: f64) -> Result<Self, EosError> {
        if !(phi > 0. && phi.is_finite()) {
            return Err(EosError::OutOfDomain {
                closure: "swe_state",
                rho: phi,
                value: v,
            });
        }
        if !(v.abs() < 1.) {
            return Err(EosError::Superluminal(v.abs()));
        }
        Ok(Self {
            phi,
            v,
            label: None,
            lorentz: 1. / (1. - v * v).sqrt(),
            celerity: (phi / (1. + phi)).sqrt(),
        })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }

    pub fn v(&self) -> f64 {
        self.v
    }

    pub fn lorentz(&self) -> f64 {
        self.lorentz
    }

    /// Speed of gravity waves relative to the fluid.
    pub fn celerity(&self) -> f64 {
        self.celerity
    }
}

impl WaveState for ShallowWaterState {
    fn coupling(&self) -> f64 {
        self.phi
    }

    fn velocity(&self) -> f64 {
        self.v
    }

    fn wavespeed(&self, wavenumber: Wavenumber) -> f64 {
        let s = wavenumber.lr_sign();
        (self.v + s * self.celerity) / (1. + s * self.v * self.celerity)
    }

    fn primitives(&self) -> Vec<f64> {
        vec![self.phi, self.v]
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn relabel(&self, label: Option<&str>) -> Self {
        Self {
            label: label.map(str::to_string),
            ..self.clone()
        }
    }
}

impl Display for ShallowWaterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_column(f, &["Phi", "v"], self.label(), &[self.phi, self.v])
    }
}
