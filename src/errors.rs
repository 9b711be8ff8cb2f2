use thiserror::Error;
use yaml_rust::Yaml;

use crate::numerics::{IntegrationError, RootFindingError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required parameter in configuration: {0}")]
    MissingParameter(String),
    #[error("Unknown type of equation of state configured: {0}")]
    UnknownEos(String),
    #[error("Unknown wave family configured: {0}")]
    UnknownFamily(String),
    #[error("Invalid wavenumber {0}, must be 0, 1 or 2")]
    InvalidWavenumber(i64),
    #[error("Expected array of length {0}, but found {1}")]
    InvalidArrayLength(usize, usize),
    #[error("Invalid value for {0}: {1:?}")]
    InvalidValue(String, Yaml),
}

/// An equation of state closure was evaluated outside of its valid domain.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EosError {
    #[error("{closure} undefined for rho = {rho}, argument = {value}")]
    OutOfDomain {
        closure: &'static str,
        rho: f64,
        value: f64,
    },
    #[error("Velocity magnitude {0} is not subluminal")]
    Superluminal(f64),
}

#[derive(Debug, Error)]
pub enum WaveError {
    /// The requested section is inconsistent with its inputs.
    #[error("Precondition violated: {0}")]
    Precondition(String),
    #[error("No sign change found for the {what} after {expansions} bracket expansions")]
    BracketExhausted {
        what: &'static str,
        expansions: usize,
    },
    #[error("Unphysical jump to {target}: squared mass flux is {mass_flux_squared}")]
    UnphysicalJump {
        target: f64,
        mass_flux_squared: f64,
    },
    #[error(transparent)]
    Eos(#[from] EosError),
    #[error(transparent)]
    RootFinding(#[from] RootFindingError),
    #[error(transparent)]
    Integration(#[from] IntegrationError),
}
