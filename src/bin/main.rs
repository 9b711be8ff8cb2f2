use std::{error::Error, fs, path::PathBuf};

use clap::Parser;
use riemann_waves::{
    gas_law::EquationOfState, solve_batch, ConfigError, Relativistic, RelativisticState,
    ShallowWater, ShallowWaterState, SolverConfig, WaveFamily, WaveProblem, WaveState,
    Wavenumber,
};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use yaml_rust::{Yaml, YamlLoader};

fn parse_f64(yaml: &Yaml, name: &str) -> Result<f64, ConfigError> {
    match yaml {
        Yaml::Real(_) => yaml
            .as_f64()
            .ok_or(ConfigError::InvalidValue(name.to_string(), yaml.clone())),
        Yaml::Integer(i) => Ok(*i as f64),
        Yaml::BadValue => Err(ConfigError::MissingParameter(name.to_string())),
        _ => Err(ConfigError::InvalidValue(name.to_string(), yaml.clone())),
    }
}

fn parse_array(yaml: &Yaml, name: &str, count: usize) -> Result<Vec<f64>, ConfigError> {
    match yaml.as_vec() {
        Some(arr) if arr.len() == count => arr.iter().map(|y| parse_f64(y, name)).collect(),
        Some(arr) => Err(ConfigError::InvalidArrayLength(count, arr.len())),
        None => Err(ConfigError::MissingParameter(name.to_string())),
    }
}

fn parse_wavenumber(yaml: &Yaml) -> Result<Wavenumber, ConfigError> {
    let wavenumber = yaml
        .as_i64()
        .ok_or(ConfigError::MissingParameter("waves:wavenumber".to_string()))?;
    usize::try_from(wavenumber)
        .ok()
        .and_then(|w| Wavenumber::try_from(w).ok())
        .ok_or(ConfigError::InvalidWavenumber(wavenumber))
}

/// Problem file describing the waves to solve, e.g.
///
/// ```yaml
/// family: "Relativistic"
/// equation_of_state:
///   kind: "GammaLaw"
///   gamma: 1.6666666667
/// waves:
///   - state: [1., 0., 0., 1.5]
///     target: 3.
///     wavenumber: 0
/// ```
enum Problems {
    Relativistic {
        solver: SolverConfig,
        problems: Vec<WaveProblem<RelativisticState>>,
    },
    ShallowWater {
        solver: SolverConfig,
        problems: Vec<WaveProblem<ShallowWaterState>>,
    },
}

fn parse_problems<S, F>(
    waves: &Yaml,
    mut parse_state: F,
) -> Result<Vec<WaveProblem<S>>, Box<dyn Error>>
where
    F: FnMut(&Yaml) -> Result<S, Box<dyn Error>>,
{
    let waves = waves
        .as_vec()
        .ok_or(ConfigError::MissingParameter("waves".to_string()))?;
    waves
        .iter()
        .enumerate()
        .map(|(i, wave)| {
            let state = parse_state(&wave["state"])?;
            let target = parse_f64(&wave["target"], "waves:target")?;
            let wavenumber = parse_wavenumber(&wave["wavenumber"])?;
            info!(wave = i, target, %wavenumber, "Read wave problem");
            Ok(WaveProblem {
                state,
                target,
                wavenumber,
            })
        })
        .collect()
}

impl Problems {
    fn parse(file: PathBuf) -> Result<Self, Box<dyn Error>> {
        let docs = YamlLoader::load_from_str(&fs::read_to_string(file)?)?;
        let config_yml = &docs[0];

        let solver = SolverConfig::init(&config_yml["solver"])?;
        let family = config_yml["family"].as_str().unwrap_or("Relativistic");
        match family {
            "Relativistic" => {
                let eos = EquationOfState::init(&config_yml["equation_of_state"])?;
                let problems = parse_problems(&config_yml["waves"], |yaml| {
                    let state = parse_array(yaml, "waves:state", 4)?;
                    Ok(RelativisticState::new(state[0], state[1], state[2], state[3], eos)?)
                })?;
                Ok(Self::Relativistic { solver, problems })
            }
            "ShallowWater" => {
                let problems = parse_problems(&config_yml["waves"], |yaml| {
                    let state = parse_array(yaml, "waves:state", 2)?;
                    Ok(ShallowWaterState::new(state[0], state[1])?)
                })?;
                Ok(Self::ShallowWater { solver, problems })
            }
            _ => Err(ConfigError::UnknownFamily(family.to_string()).into()),
        }
    }
}

fn solve_all<F: WaveFamily>(family: &F, problems: &[WaveProblem<F::State>]) -> usize {
    let waves = solve_batch(family, problems);
    let mut failures = 0;
    for (i, (problem, wave)) in problems.iter().zip(waves).enumerate() {
        match wave {
            Ok(wave) => {
                info!(wave = i, sections = wave.sections().len(), "Solved wave");
                println!("Wave {i}: {}", problem.state);
                if wave.is_trivial() {
                    println!("  trivial");
                } else {
                    println!("  {wave}");
                }
                println!("  q_l: {}", wave.q_l());
                println!("  q_r: {}", wave.q_r());
                println!("  coupling: {} -> {}", wave.q_l().coupling(), wave.q_r().coupling());
            }
            Err(err) => {
                error!(wave = i, %err, "Failed to solve wave");
                failures += 1;
            }
        }
    }
    failures
}

#[derive(Parser)]
pub struct Cli {
    /// The path to the problem file to read
    #[clap(value_parser)]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[clap(short, long, default_value = "info")]
    pub log_level: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    // parse command line parameters
    let args = Cli::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // read configuration
    let failures = match Problems::parse(args.config)? {
        Problems::Relativistic { solver, problems } => {
            solve_all(&Relativistic::new(solver), &problems)
        }
        Problems::ShallowWater { solver, problems } => {
            solve_all(&ShallowWater::new(solver), &problems)
        }
    };

    if failures > 0 {
        return Err(format!("{failures} wave(s) could not be solved").into());
    }
    Ok(())
}
