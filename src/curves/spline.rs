//! Interpolating cubic splines
//!
//! Two boundary conditions are supported:
//!
//! - **natural**: zero second derivative at both ends, solved with the
//!   Thomas algorithm,
//! - **periodic**: value, slope and curvature match across the closing knot,
//!   solved as a cyclic tridiagonal system via the Sherman-Morrison
//!   correction (Numerical Recipes, `cyclic`).
//!
//! Both interpolate their knots exactly. Any breakdown (too few knots,
//! repeated knots, vanishing pivot, non-finite data) is reported as a
//! [`SplineError`]; callers decide how to degrade.

use thiserror::Error;

/// Failure modes of spline construction
#[derive(Debug, Error, PartialEq)]
pub enum SplineError {
    #[error("need at least {needed} knots, got {got}")]
    TooFewKnots { needed: usize, got: usize },

    #[error("knots must be strictly increasing (index {0})")]
    NonIncreasingKnots(usize),

    #[error("knot and value counts differ: {0} vs {1}")]
    LengthMismatch(usize, usize),

    #[error("periodic spline needs matching end values ({0} vs {1})")]
    OpenPeriodicEnds(f64, f64),

    #[error("singular system at row {0}")]
    Singular(usize),

    #[error("non-finite input data")]
    NonFinite,
}

/// Boundary condition of a cubic spline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Natural,
    Periodic,
}

/// Piecewise cubic through `(x_i, y_i)` stored as knot values plus second derivatives
#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    m: Vec<f64>,
}

impl CubicSpline {
    /// Fit an interpolating spline
    ///
    /// Periodic fits expect the last knot to be the closing copy of the first
    /// (`y[0] == y[n-1]`).
    pub fn fit(x: &[f64], y: &[f64], boundary: Boundary) -> Result<Self, SplineError> {
        if x.len() != y.len() {
            return Err(SplineError::LengthMismatch(x.len(), y.len()));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(SplineError::NonFinite);
        }
        let needed = match boundary {
            Boundary::Natural => 3,
            Boundary::Periodic => 4,
        };
        if x.len() < needed {
            return Err(SplineError::TooFewKnots {
                needed,
                got: x.len(),
            });
        }
        if let Some(i) = (1..x.len()).find(|&i| x[i] <= x[i - 1]) {
            return Err(SplineError::NonIncreasingKnots(i));
        }

        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        let slope: Vec<f64> = (0..h.len()).map(|i| (y[i + 1] - y[i]) / h[i]).collect();

        let m = match boundary {
            Boundary::Natural => natural_second_derivatives(&h, &slope)?,
            Boundary::Periodic => {
                let (first, last) = (y[0], y[y.len() - 1]);
                if (first - last).abs() > 1e-9 * (1.0 + first.abs()) {
                    return Err(SplineError::OpenPeriodicEnds(first, last));
                }
                periodic_second_derivatives(&h, &slope)?
            }
        };

        if m.iter().any(|v| !v.is_finite()) {
            return Err(SplineError::NonFinite);
        }

        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            m,
        })
    }

    /// Evaluate at `t`; values outside the knot range extrapolate the end pieces
    pub fn evaluate(&self, t: f64) -> f64 {
        let n = self.x.len();
        // Index of the interval [x_i, x_{i+1}] containing t
        let i = self
            .x
            .partition_point(|&xk| xk <= t)
            .saturating_sub(1)
            .min(n - 2);

        let h = self.x[i + 1] - self.x[i];
        let a = (self.x[i + 1] - t) / h;
        let b = (t - self.x[i]) / h;
        a * self.y[i]
            + b * self.y[i + 1]
            + ((a * a * a - a) * self.m[i] + (b * b * b - b) * self.m[i + 1]) * h * h / 6.0
    }

    pub fn knots(&self) -> &[f64] {
        &self.x
    }
}

/// Second derivatives with m_0 = m_n = 0
fn natural_second_derivatives(h: &[f64], slope: &[f64]) -> Result<Vec<f64>, SplineError> {
    let n = h.len();
    let interior = n - 1;
    let mut sub = vec![0.0; interior];
    let mut diag = vec![0.0; interior];
    let mut sup = vec![0.0; interior];
    let mut rhs = vec![0.0; interior];

    for k in 0..interior {
        let i = k + 1;
        sub[k] = h[i - 1];
        diag[k] = 2.0 * (h[i - 1] + h[i]);
        sup[k] = h[i];
        rhs[k] = 6.0 * (slope[i] - slope[i - 1]);
    }

    let inner = solve_tridiagonal(&sub, &diag, &sup, &rhs)?;
    let mut m = Vec::with_capacity(n + 1);
    m.push(0.0);
    m.extend(inner);
    m.push(0.0);
    Ok(m)
}

/// Second derivatives with m_n = m_0 and cyclic continuity at the seam
fn periodic_second_derivatives(h: &[f64], slope: &[f64]) -> Result<Vec<f64>, SplineError> {
    let n = h.len();
    let mut sub = vec![0.0; n];
    let mut diag = vec![0.0; n];
    let mut sup = vec![0.0; n];
    let mut rhs = vec![0.0; n];

    for i in 0..n {
        let prev = (i + n - 1) % n;
        sub[i] = h[prev];
        diag[i] = 2.0 * (h[prev] + h[i]);
        sup[i] = h[i];
        rhs[i] = 6.0 * (slope[i] - slope[prev]);
    }

    // Corner entries: row 0 couples to m_{n-1}, row n-1 to m_0
    let beta = sub[0];
    let alpha = sup[n - 1];
    let mut m = solve_cyclic(&sub, &diag, &sup, alpha, beta, &rhs)?;
    m.push(m[0]);
    Ok(m)
}

/// Thomas algorithm; `sub[0]` and `sup[n-1]` are ignored
fn solve_tridiagonal(
    sub: &[f64],
    diag: &[f64],
    sup: &[f64],
    rhs: &[f64],
) -> Result<Vec<f64>, SplineError> {
    let n = diag.len();
    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];

    let mut pivot = diag[0];
    if pivot.abs() < f64::MIN_POSITIVE {
        return Err(SplineError::Singular(0));
    }
    c_prime[0] = sup[0] / pivot;
    d_prime[0] = rhs[0] / pivot;

    for i in 1..n {
        pivot = diag[i] - sub[i] * c_prime[i - 1];
        if pivot.abs() < f64::MIN_POSITIVE {
            return Err(SplineError::Singular(i));
        }
        c_prime[i] = sup[i] / pivot;
        d_prime[i] = (rhs[i] - sub[i] * d_prime[i - 1]) / pivot;
    }

    let mut out = vec![0.0; n];
    out[n - 1] = d_prime[n - 1];
    for i in (0..n - 1).rev() {
        out[i] = d_prime[i] - c_prime[i] * out[i + 1];
    }
    Ok(out)
}

/// Cyclic tridiagonal solve with corner terms `alpha` (bottom-left) and `beta` (top-right)
fn solve_cyclic(
    sub: &[f64],
    diag: &[f64],
    sup: &[f64],
    alpha: f64,
    beta: f64,
    rhs: &[f64],
) -> Result<Vec<f64>, SplineError> {
    let n = diag.len();
    if n < 3 {
        return Err(SplineError::TooFewKnots {
            needed: 4,
            got: n + 1,
        });
    }

    let gamma = -diag[0];
    let mut bb = diag.to_vec();
    bb[0] = diag[0] - gamma;
    bb[n - 1] = diag[n - 1] - alpha * beta / gamma;

    let x = solve_tridiagonal(sub, &bb, sup, rhs)?;

    let mut u = vec![0.0; n];
    u[0] = gamma;
    u[n - 1] = alpha;
    let z = solve_tridiagonal(sub, &bb, sup, &u)?;

    let denom = 1.0 + z[0] + beta * z[n - 1] / gamma;
    if denom.abs() < f64::MIN_POSITIVE {
        return Err(SplineError::Singular(n - 1));
    }
    let fact = (x[0] + beta * x[n - 1] / gamma) / denom;

    Ok(x.iter().zip(&z).map(|(xi, zi)| xi - fact * zi).collect())
}

/// Piecewise-linear interpolation over ascending `x`, clamped at the ends
pub fn linear_interpolate(x: &[f64], y: &[f64], t: f64) -> f64 {
    match x.len() {
        0 => f64::NAN,
        1 => y[0],
        n => {
            if t <= x[0] {
                return y[0];
            }
            if t >= x[n - 1] {
                return y[n - 1];
            }
            let i = x.partition_point(|&xk| xk <= t).saturating_sub(1).min(n - 2);
            let h = x[i + 1] - x[i];
            if h <= 0.0 {
                return y[i + 1];
            }
            let w = (t - x[i]) / h;
            y[i] + w * (y[i + 1] - y[i])
        }
    }
}
