/// Tolerances deciding when two floating point values are numerically equal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Closeness {
    pub rtol: f64,
    pub atol: f64,
}

impl Default for Closeness {
    fn default() -> Self {
        Self {
            rtol: 1e-5,
            atol: 1e-8,
        }
    }
}

impl Closeness {
    /// `|a - b| <= atol + rtol * |b|`
    pub fn is_close(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.atol + self.rtol * b.abs()
    }

    pub fn all_close(&self, a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| self.is_close(*a, *b))
    }
}

pub fn is_close(a: f64, b: f64) -> bool {
    Closeness::default().is_close(a, b)
}
