use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RootFindingError {
    #[error("Brent's method was called with equal sign function values: f({a}) = {fa}, f({b}) = {fb}")]
    NotBracketed { a: f64, b: f64, fa: f64, fb: f64 },
    #[error("Brent's method did not converge in {iterations} iterations (last bracket [{a}, {b}])")]
    NotConverged { iterations: usize, a: f64, b: f64 },
}

/// An interval on which a function changes sign, with the function values at its ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub lower: f64,
    pub upper: f64,
    pub f_lower: f64,
    pub f_upper: f64,
}

impl Bracket {
    pub fn has_sign_change(&self) -> bool {
        self.f_lower * self.f_upper <= 0.
    }
}

/// Widen `[lower, upper]` with `widen` until `f` changes sign on it.
///
/// Returns `Ok(None)` when no sign change was found after `max_expansions`
/// widening steps, so that callers can report what they were looking for.
pub fn expand_bracket<F, W, E>(
    mut f: F,
    mut lower: f64,
    mut upper: f64,
    max_expansions: usize,
    mut widen: W,
) -> Result<Option<Bracket>, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    W: FnMut(f64, f64) -> (f64, f64),
{
    let mut bracket = Bracket {
        lower,
        upper,
        f_lower: f(lower)?,
        f_upper: f(upper)?,
    };
    let mut expansions = 0;
    while !bracket.has_sign_change() {
        if expansions == max_expansions {
            return Ok(None);
        }
        (lower, upper) = widen(lower, upper);
        bracket = Bracket {
            lower,
            upper,
            f_lower: f(lower)?,
            f_upper: f(upper)?,
        };
        expansions += 1;
        tracing::trace!(lower, upper, expansions, "Widened bracket");
    }
    Ok(Some(bracket))
}

/// Brent's method: bisection, secant rule and inverse quadratic interpolation.
#[derive(Debug, Clone, Copy)]
pub struct BrentSolver {
    pub tol: f64,
    pub max_iter: usize,
}

impl Default for BrentSolver {
    fn default() -> Self {
        Self {
            tol: 1e-12,
            max_iter: 200,
        }
    }
}

impl BrentSolver {
    pub fn new(tol: f64, max_iter: usize) -> Self {
        Self { tol, max_iter }
    }

    fn converged(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.tol * (1. + 0.5 * (a + b).abs())
    }

    /// Find the zeropoint of `f` in the interval `[lower, upper]`.
    ///
    /// The function must change sign on the interval, this method never searches
    /// for a bracket itself.
    pub fn find_root<F, E>(&self, mut f: F, lower: f64, upper: f64) -> Result<f64, E>
    where
        F: FnMut(f64) -> Result<f64, E>,
        E: From<RootFindingError>,
    {
        let fa = f(lower)?;
        let fb = f(upper)?;
        self.find_root_bracketed(
            f,
            Bracket {
                lower,
                upper,
                f_lower: fa,
                f_upper: fb,
            },
        )
    }

    /// Same as [`BrentSolver::find_root`], reusing the function values stored in `bracket`.
    pub fn find_root_bracketed<F, E>(&self, mut f: F, bracket: Bracket) -> Result<f64, E>
    where
        F: FnMut(f64) -> Result<f64, E>,
        E: From<RootFindingError>,
    {
        let mut a = bracket.lower;
        let mut b = bracket.upper;
        let mut fa = bracket.f_lower;
        let mut fb = bracket.f_upper;

        if fa * fb > 0. {
            return Err(RootFindingError::NotBracketed { a, b, fa, fb }.into());
        }
        if fa == 0. {
            return Ok(a);
        }

        // if |f(a)| < |f(b)| then swap (a,b)
        if fa.abs() < fb.abs() {
            (a, b) = (b, a);
            (fa, fb) = (fb, fa);
        }

        let mut c = a;
        let mut fc = fa;
        let mut d = f64::INFINITY;
        let mut mflag = true;

        for _ in 0..self.max_iter {
            if fb == 0. || self.converged(a, b) {
                return Ok(b);
            }

            let mut s = if fa != fc && fb != fc {
                // Inverse quadratic interpolation
                a * fb * fc / (fa - fb) / (fa - fc)
                    + b * fa * fc / (fb - fa) / (fb - fc)
                    + c * fa * fb / (fc - fa) / (fc - fb)
            } else {
                // Secant rule
                b - fb * (b - a) / (fb - fa)
            };

            let tmp = 0.25 * (3. * a + b);
            if !((s > tmp && s < b) || (s < tmp && s > b))
                || (mflag && (s - b).abs() >= 0.5 * (b - c).abs())
                || (!mflag && (s - b).abs() >= 0.5 * (c - d).abs())
                || (mflag && self.converged(b, c))
                || (!mflag && self.converged(c, d))
            {
                s = 0.5 * (a + b);
                mflag = true;
            } else {
                mflag = false;
            }

            let fs = f(s)?;
            d = c;
            c = b;
            fc = fb;
            if fa * fs < 0. {
                b = s;
                fb = fs;
            } else {
                a = s;
                fa = fs;
            }

            if fa.abs() < fb.abs() {
                (a, b) = (b, a);
                (fa, fb) = (fb, fa);
            }
        }

        Err(RootFindingError::NotConverged {
            iterations: self.max_iter,
            a,
            b,
        }
        .into())
    }
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn ok(x: f64) -> Result<f64, RootFindingError> {
        Ok(x)
    }

    #[test]
    fn test_brent_simple_root() {
        let root = BrentSolver::default()
            .find_root(|x| ok(x * x - 2.), 0., 2.)
            .unwrap();
        assert_approx_eq!(f64, root, 2f64.sqrt(), epsilon = 1e-11);
    }

    #[test]
    fn test_brent_reversed_interval() {
        let root = BrentSolver::default()
            .find_root(|x| ok(x.cos() - x), 1., 0.)
            .unwrap();
        assert_approx_eq!(f64, root, 0.7390851332151607, epsilon = 1e-11);
    }

    #[test]
    fn test_brent_root_at_endpoint() {
        let root = BrentSolver::default()
            .find_root(|x| ok(x - 1.), 1., 3.)
            .unwrap();
        assert_eq!(root, 1.);
    }

    #[test]
    fn test_brent_not_bracketed() {
        let result = BrentSolver::default().find_root(|x| ok(x * x + 1.), -1., 1.);
        assert!(matches!(
            result,
            Err(RootFindingError::NotBracketed { .. })
        ));
    }

    #[test]
    fn test_brent_not_converged() {
        let solver = BrentSolver::new(1e-15, 2);
        let result = solver.find_root(|x| ok(x.powi(3) - 0.3), 0., 10.);
        assert!(matches!(
            result,
            Err(RootFindingError::NotConverged { iterations: 2, .. })
        ));
    }

    #[test]
    fn test_expand_bracket() {
        let bracket = expand_bracket(|x| ok(x - 50.), 1., 2., 10, |a, b| (a, 2. * b))
            .unwrap()
            .unwrap();
        assert_eq!(bracket.upper, 64.);
        assert!(bracket.has_sign_change());

        let bracket = expand_bracket(|x| ok(x - 50.), 1., 2., 3, |a, b| (a, 2. * b)).unwrap();
        assert!(bracket.is_none());
    }
}
