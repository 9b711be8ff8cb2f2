use common::{get_solver_config, get_state, EOS_CONFIG, NO_EXPANSION_SOLVER_CONFIG, SOLVER_CONFIG};
use float_cmp::assert_approx_eq;
use riemann_waves::{
    solve_batch, Relativistic, SectionKind, Wave, WaveError, WaveProblem, WaveState, Wavenumber,
    Wavespeed,
};

mod common;

fn family() -> Relativistic {
    Relativistic::new(get_solver_config(SOLVER_CONFIG))
}

#[test]
fn test_left_shock() {
    let family = family();
    let q = get_state(1., 0., 1.5, EOS_CONFIG).with_label("L");
    let wave = Wave::new(&family, &q, 3., Wavenumber::Left).unwrap();

    assert_eq!(wave.sections().len(), 1);
    assert_eq!(wave.sections()[0].kind(), SectionKind::Shock);
    assert_eq!(wave.name(), "S←");
    assert_eq!(wave.q_l(), &q);
    assert_approx_eq!(f64, wave.q_r().pressure(), 3., epsilon = 1e-8);
    assert_eq!(wave.q_r().label(), Some("*L"));
    // A left going shock decelerates the fluid
    assert!(wave.q_r().v() < 0.);
    assert!(wave.q_r().rho() > q.rho());

    let Some(Wavespeed::Single(v_shock)) = wave.wavespeed() else {
        panic!("A single shock moves at a single speed");
    };
    assert!(v_shock < q.wavespeed(Wavenumber::Left));
    assert!(v_shock > wave.q_r().wavespeed(Wavenumber::Left));
}

#[test]
fn test_right_rarefaction() {
    let family = family();
    let q = get_state(1., 0.2, 1.5, EOS_CONFIG);
    let wave = Wave::new(&family, &q, 0.3, Wavenumber::Right).unwrap();

    assert_eq!(wave.sections()[0].kind(), SectionKind::Rarefaction);
    assert_eq!(wave.q_r(), &q);
    assert_approx_eq!(f64, wave.q_l().pressure(), 0.3, epsilon = 1e-8);
    assert_eq!(wave.q_l().label(), Some("*R"));
    // A right going rarefaction accelerates the fluid to the left
    assert!(wave.q_l().v() < q.v());

    let Some(Wavespeed::Fan(tail, head)) = wave.wavespeed() else {
        panic!("A rarefaction is a fan");
    };
    assert!(tail < head);
    assert_approx_eq!(f64, head, q.wavespeed(Wavenumber::Right), epsilon = 1e-12);

    let profile = wave.profile(&family, 10).unwrap();
    assert_eq!(profile.len(), 10);
    for pair in profile.windows(2) {
        assert!(pair[0].0 <= pair[1].0);
    }
}

#[test]
fn test_trivial_wave() {
    let family = family();
    let q = get_state(1., 0.1, 1.5, EOS_CONFIG);
    for wavenumber in [Wavenumber::Left, Wavenumber::Right] {
        let wave = Wave::new(&family, &q, q.pressure(), wavenumber).unwrap();
        assert!(wave.is_trivial());
        assert_eq!(wave.wavespeed(), None);
        assert_eq!(wave.to_string(), "");
        assert_eq!(wave.q_l().primitives(), q.primitives());
        assert_eq!(wave.q_r().primitives(), q.primitives());
    }
}

#[test]
fn test_bracket_exhausted() {
    let family = Relativistic::new(get_solver_config(NO_EXPANSION_SOLVER_CONFIG));
    let q = get_state(1., 0., 1.5, EOS_CONFIG);
    assert!(matches!(
        Wave::new(&family, &q, 3., Wavenumber::Left),
        Err(WaveError::BracketExhausted { .. })
    ));
}

#[test]
fn test_batch() {
    let family = family();
    let q = get_state(1., 0., 1.5, EOS_CONFIG);
    let problems: Vec<WaveProblem<_>> = [(3., Wavenumber::Left), (0.3, Wavenumber::Right)]
        .into_iter()
        .map(|(target, wavenumber)| WaveProblem {
            state: q.clone(),
            target,
            wavenumber,
        })
        .collect();
    let waves = solve_batch(&family, &problems);
    assert_eq!(waves.len(), 2);

    for (problem, wave) in problems.iter().zip(waves) {
        let wave = wave.unwrap();
        let single = Wave::new(&family, &problem.state, problem.target, problem.wavenumber).unwrap();
        assert_eq!(wave.wavespeed(), single.wavespeed());
        assert_eq!(wave.q_l(), single.q_l());
        assert_eq!(wave.q_r(), single.q_r());
    }
}
