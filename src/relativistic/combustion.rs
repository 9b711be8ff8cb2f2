use tracing::debug;

use crate::{
    config::SolverConfig,
    errors::WaveError,
    gas_law::EquationOfState,
    numerics::expand_bracket,
    physical_quantities::{RelativisticState, WaveState, Wavenumber},
    wave::{check_acoustic, SectionKind, WaveSection, Wavespeed},
};

use super::shock::{mass_flux_squared, shock};

/// Reactive fronts, burning the material they pass through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Front {
    /// Pressure decreases across the front
    Deflagration,
    /// Pressure increases across the front
    Detonation,
}

impl Front {
    fn kind(&self, chapman_jouguet: bool) -> SectionKind {
        match self {
            Front::Deflagration => SectionKind::Deflagration { chapman_jouguet },
            Front::Detonation => SectionKind::Detonation { chapman_jouguet },
        }
    }
}

/// Front speed and burnt state for a front from `q_start` to `p_end`.
fn burn(
    config: &SolverConfig,
    q_start: &RelativisticState,
    p_end: f64,
    wavenumber: Wavenumber,
    burnt: &EquationOfState,
) -> Result<(f64, RelativisticState), WaveError> {
    mass_flux_squared(config, q_start, p_end, burnt)?.front(q_start, wavenumber, burnt)
}

/// A pressure above `p_end` reached by a weak detonation.
///
/// Just above the start pressure the burnt Hugoniot curve has no physical
/// states (j² ≤ 0). The pressure is raised until the jump is physical, and
/// bisected back towards the forbidden region if it overshoots into the
/// strong branch.
fn weak_detonation_pressure(
    config: &SolverConfig,
    q_start: &RelativisticState,
    p_end: f64,
    wavenumber: Wavenumber,
    burnt: &EquationOfState,
) -> Result<f64, WaveError> {
    // None in the forbidden region, otherwise whether the detonation is weak
    let is_weak = |p: f64| -> Result<Option<bool>, WaveError> {
        match burn(config, q_start, p, wavenumber, burnt) {
            Ok((v_front, q_end)) => Ok(Some(
                wavenumber.lr_sign() * (q_end.wavespeed(wavenumber) - v_front) < 0.,
            )),
            Err(WaveError::UnphysicalJump { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    };

    let mut p = (1. + config.cj_offset) * p_end;
    let mut forbidden = p_end;
    let mut strong = None;
    for _ in 0..=config.max_bracket_expansions {
        match is_weak(p)? {
            Some(true) => return Ok(p),
            Some(false) => strong = Some(p),
            None => forbidden = p,
        }
        p = match strong {
            Some(strong) => 0.5 * (forbidden + strong),
            None => config.bracket_inner_factor * p,
        };
    }
    Err(WaveError::BracketExhausted {
        what: "weak detonation pressure",
        expansions: config.max_bracket_expansions,
    })
}

/// Pressure of the front for which the burnt state's characteristics move
/// exactly with the front.
fn chapman_jouguet_pressure(
    config: &SolverConfig,
    q_start: &RelativisticState,
    p_end: f64,
    wavenumber: Wavenumber,
    front: Front,
    burnt: &EquationOfState,
) -> Result<f64, WaveError> {
    let residual = |p: f64| -> Result<f64, WaveError> {
        let (v_front, q_end) = burn(config, q_start, p, wavenumber, burnt)?;
        Ok(q_end.wavespeed(wavenumber) - v_front)
    };

    let (bracket, expansions) = match front {
        Front::Deflagration => {
            let lower = (1. + config.cj_offset) * p_end;
            let upper = (1. - config.cj_offset) * q_start.pressure();
            (expand_bracket(&residual, lower, upper, 0, |l, u| (l, u))?, 0)
        }
        Front::Detonation => {
            let lower = weak_detonation_pressure(config, q_start, p_end, wavenumber, burnt)?;
            let growth = config.precursor_growth;
            let bracket = expand_bracket(
                &residual,
                lower,
                growth * lower,
                config.max_bracket_expansions,
                |l, u| (l, growth * u),
            )?;
            (bracket, config.max_bracket_expansions)
        }
    };
    let bracket = bracket.ok_or(WaveError::BracketExhausted {
        what: "Chapman-Jouguet pressure",
        expansions,
    })?;

    config.brent().find_root_bracketed(&residual, bracket)
}

fn combustion(
    config: &SolverConfig,
    q_start: &RelativisticState,
    p_end: f64,
    wavenumber: Wavenumber,
    front: Front,
) -> Result<WaveSection<RelativisticState>, WaveError> {
    check_acoustic(front.kind(false), wavenumber)?;
    let reaction = q_start.eos().reaction().ok_or_else(|| {
        WaveError::Precondition(format!(
            "A {front:?} requires a reactive equation of state"
        ))
    })?;
    let closeness = config.closeness();
    let t_start = q_start.temperature();
    if t_start < reaction.t_ignition && !closeness.is_close(t_start, reaction.t_ignition) {
        return Err(WaveError::Precondition(format!(
            "For a {front:?}, the temperature of the start state ({t_start}) must be at least the ignition temperature ({})",
            reaction.t_ignition
        )));
    }

    let burnt = q_start.eos().burnt();
    let p_start = q_start.pressure();
    if closeness.is_close(p_start, p_end) {
        return Ok(WaveSection::trivial(
            front.kind(false),
            wavenumber,
            q_start.clone(),
            q_start
                .with_eos(burnt)?
                .relabel(wavenumber.star_label()),
        ));
    }
    match front {
        Front::Deflagration if p_end > p_start => {
            return Err(WaveError::Precondition(format!(
                "For a deflagration, p_start >= p_end, but {p_start} < {p_end}"
            )))
        }
        Front::Detonation if p_end < p_start => {
            return Err(WaveError::Precondition(format!(
                "For a detonation, p_start <= p_end, but {p_start} > {p_end}"
            )))
        }
        _ => (),
    }

    // Characteristics leaving the front: unstable strong deflagration or weak detonation.
    // Detonations to just above the start pressure have no physical jump at all.
    let stable = match burn(config, q_start, p_end, wavenumber, &burnt) {
        Ok((v_front, q_end)) => {
            if wavenumber.lr_sign() * (q_end.wavespeed(wavenumber) - v_front) < 0. {
                None
            } else {
                Some((v_front, q_end))
            }
        }
        Err(WaveError::UnphysicalJump { .. }) if front == Front::Detonation => None,
        Err(err) => return Err(err),
    };
    let chapman_jouguet = stable.is_none();
    let (v_front, q_end) = match stable {
        Some(jump) => jump,
        None => {
            let p_cj =
                chapman_jouguet_pressure(config, q_start, p_end, wavenumber, front, &burnt)?;
            debug!(?front, %wavenumber, p_end, p_cj, "Chapman-Jouguet front");
            burn(config, q_start, p_cj, wavenumber, &burnt)?
        }
    };

    Ok(WaveSection::new(
        front.kind(chapman_jouguet),
        wavenumber,
        q_start.clone(),
        q_end,
        Wavespeed::Single(v_front),
    ))
}

pub(super) fn deflagration(
    config: &SolverConfig,
    q_start: &RelativisticState,
    p_end: f64,
    wavenumber: Wavenumber,
) -> Result<WaveSection<RelativisticState>, WaveError> {
    combustion(config, q_start, p_end, wavenumber, Front::Deflagration)
}

pub(super) fn detonation(
    config: &SolverConfig,
    q_start: &RelativisticState,
    p_end: f64,
    wavenumber: Wavenumber,
) -> Result<WaveSection<RelativisticState>, WaveError> {
    combustion(config, q_start, p_end, wavenumber, Front::Detonation)
}

/// Inert shock heating `q_known` to the ignition temperature `t_ignition`.
///
/// The state behind the shock keeps the unburnt equation of state.
pub(super) fn precursor_shock(
    config: &SolverConfig,
    q_known: &RelativisticState,
    t_ignition: f64,
    wavenumber: Wavenumber,
) -> Result<WaveSection<RelativisticState>, WaveError> {
    let residual = |p: f64| -> Result<f64, WaveError> {
        Ok(shock(config, q_known, p, wavenumber)?.q_end().temperature() - t_ignition)
    };

    let p_known = q_known.pressure();
    let growth = config.precursor_growth;
    let bracket = expand_bracket(
        &residual,
        p_known,
        growth * p_known,
        config.max_bracket_expansions,
        |l, u| (l, growth * u),
    )?
    .ok_or(WaveError::BracketExhausted {
        what: "precursor shock pressure",
        expansions: config.max_bracket_expansions,
    })?;
    let p_precursor = config.brent().find_root_bracketed(&residual, bracket)?;
    debug!(%wavenumber, p_known, p_precursor, "Precursor shock");

    shock(config, q_known, p_precursor, wavenumber)
}
