//! Adaptive Dormand-Prince 5(4) integrator.
//!
//! Reference: Dormand, J.R. & Prince, P.J. (1980). "A family of embedded
//! Runge-Kutta formulae". J. Comp. Appl. Math. 6(1), 19-26.

use thiserror::Error;

const STAGES: usize = 7;

const C: [f64; STAGES] = [0., 1. / 5., 3. / 10., 4. / 5., 8. / 9., 1., 1.];

const A: [[f64; STAGES - 1]; STAGES] = [
    [0., 0., 0., 0., 0., 0.],
    [1. / 5., 0., 0., 0., 0., 0.],
    [3. / 40., 9. / 40., 0., 0., 0., 0.],
    [44. / 45., -56. / 15., 32. / 9., 0., 0., 0.],
    [
        19372. / 6561.,
        -25360. / 2187.,
        64448. / 6561.,
        -212. / 729.,
        0.,
        0.,
    ],
    [
        9017. / 3168.,
        -355. / 33.,
        46732. / 5247.,
        49. / 176.,
        -5103. / 18656.,
        0.,
    ],
    [
        35. / 384.,
        0.,
        500. / 1113.,
        125. / 192.,
        -2187. / 6784.,
        11. / 84.,
    ],
];

/// 5th order weights (first same as last: equal to the last row of `A`).
const B: [f64; STAGES] = [
    35. / 384.,
    0.,
    500. / 1113.,
    125. / 192.,
    -2187. / 6784.,
    11. / 84.,
    0.,
];

/// Difference between the 5th and embedded 4th order weights.
const B_ERR: [f64; STAGES] = [
    71. / 57600.,
    0.,
    -71. / 16695.,
    71. / 1920.,
    -17253. / 339200.,
    22. / 525.,
    -1. / 40.,
];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IntegrationError {
    #[error("Invalid integration input: {0}")]
    InvalidInput(String),
    #[error("Non-finite state encountered at t = {t}")]
    NonFiniteState { t: f64 },
    #[error("Step size {h} became too small at t = {t}")]
    StepSizeTooSmall { t: f64, h: f64 },
    #[error("Maximum number of integration steps ({0}) exceeded")]
    MaxStepsExceeded(usize),
}

/// System of ordinary differential equations: dy/dt = f(t, y).
///
/// Evaluating the right hand side may fail (e.g. when the state leaves the
/// domain of an equation of state), which aborts the integration.
pub trait OdeSystem<const N: usize> {
    type Error: From<IntegrationError>;

    fn rhs(&self, t: f64, y: &[f64; N]) -> Result<[f64; N], Self::Error>;
}

/// Error is measured as: |y5 - y4| / (atol + rtol * |y5|)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub rtol: f64,
    pub atol: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            rtol: 1e-12,
            atol: 1e-10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DormandPrince {
    tol: Tolerances,
    max_steps: usize,
    safety: f64,
    min_factor: f64,
    max_factor: f64,
}

impl DormandPrince {
    pub fn new(tol: Tolerances, max_steps: usize) -> Self {
        Self {
            tol,
            max_steps,
            safety: 0.9,
            min_factor: 0.2,
            max_factor: 5.,
        }
    }

    fn step_factor(&self, error: f64) -> f64 {
        if error == 0. {
            return self.max_factor;
        }
        (self.safety * error.powf(-0.2)).clamp(self.min_factor, self.max_factor)
    }

    /// Single trial step, returns the 5th order solution and the normalized error.
    fn step<S: OdeSystem<N>, const N: usize>(
        &self,
        sys: &S,
        t: f64,
        y: &[f64; N],
        h: f64,
    ) -> Result<([f64; N], f64), S::Error> {
        let mut k = [[0.; N]; STAGES];
        k[0] = sys.rhs(t, y)?;
        for i in 1..STAGES {
            let mut y_stage = *y;
            for (n, y_n) in y_stage.iter_mut().enumerate() {
                *y_n += h * (0..i).map(|j| A[i][j] * k[j][n]).sum::<f64>();
            }
            k[i] = sys.rhs(t + C[i] * h, &y_stage)?;
        }

        let mut y_new = *y;
        let mut error: f64 = 0.;
        for n in 0..N {
            y_new[n] += h * (0..STAGES).map(|i| B[i] * k[i][n]).sum::<f64>();
            let err_n = h * (0..STAGES).map(|i| B_ERR[i] * k[i][n]).sum::<f64>();
            let scale = self.tol.atol + self.tol.rtol * y_new[n].abs();
            error = error.max(err_n.abs() / scale);
        }
        Ok((y_new, error))
    }

    /// Integrate `sys` from `t0` to `tf`, in either direction.
    pub fn integrate<S: OdeSystem<N>, const N: usize>(
        &self,
        sys: &S,
        t0: f64,
        y0: &[f64; N],
        tf: f64,
    ) -> Result<[f64; N], S::Error> {
        if !t0.is_finite() || !tf.is_finite() {
            return Err(IntegrationError::InvalidInput(format!(
                "integration bounds must be finite, got [{t0}, {tf}]"
            ))
            .into());
        }
        if let Some(n) = y0.iter().position(|y| !y.is_finite()) {
            return Err(IntegrationError::InvalidInput(format!("y0[{n}] is not finite")).into());
        }
        if t0 == tf {
            return Ok(*y0);
        }

        let span = tf - t0;
        let direction = span.signum();
        let h_min = 1e-14 * span.abs().max(t0.abs());
        let mut h = 0.01 * span;
        let mut t = t0;
        let mut y = *y0;
        let mut steps = 0;

        while (tf - t) * direction > 0. {
            if steps == self.max_steps {
                return Err(IntegrationError::MaxStepsExceeded(self.max_steps).into());
            }
            steps += 1;

            // Don't overshoot the endpoint
            let last = (t + h - tf) * direction >= 0.;
            if last {
                h = tf - t;
            }

            let (y_new, error) = self.step(sys, t, &y, h)?;
            if error.is_nan() {
                return Err(IntegrationError::NonFiniteState { t }.into());
            }
            let factor = self.step_factor(error);
            if error <= 1. {
                t = if last { tf } else { t + h };
                y = y_new;
                if !y.iter().all(|y| y.is_finite()) {
                    return Err(IntegrationError::NonFiniteState { t }.into());
                }
            } else if h.abs() <= h_min {
                return Err(IntegrationError::StepSizeTooSmall { t, h }.into());
            }
            h = direction * (h.abs() * factor).max(h_min);
        }
        tracing::trace!(t0, tf, steps, "Integrated ODE");

        Ok(y)
    }

    /// Integrate through all `ts` in order, returning the solution at each of them.
    ///
    /// The first element of the result is `y0` at `ts[0]`.
    pub fn integrate_samples<S: OdeSystem<N>, const N: usize>(
        &self,
        sys: &S,
        ts: &[f64],
        y0: &[f64; N],
    ) -> Result<Vec<[f64; N]>, S::Error> {
        let mut samples = Vec::with_capacity(ts.len());
        let mut y = *y0;
        for (i, &t) in ts.iter().enumerate() {
            if i > 0 {
                y = self.integrate(sys, ts[i - 1], &y, t)?;
            }
            samples.push(y);
        }
        Ok(samples)
    }
}

impl Default for DormandPrince {
    fn default() -> Self {
        Self::new(Tolerances::default(), 100_000)
    }
}
