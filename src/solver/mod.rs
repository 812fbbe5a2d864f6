//! Robust 1-D root solving with escalating strategies
//!
//! Finding where an angular residual crosses zero over a periodic domain
//! (geographic longitude) is done in three stages, each bounded:
//!
//! 1. bisection on a narrow bracket around a hint (usually the previous
//!    latitude's solution),
//! 2. bisection on the full domain,
//! 3. a coarse grid search for the smallest residual, refined by bisection
//!    when a continuous sign change borders the best cell, and by a
//!    golden-section search for the minimum of |residual| otherwise
//!    (tangent roots).
//!
//! Residual functions return `None` when they cannot be evaluated at a
//! point. Such a failure abandons the current stage and escalates; in the
//! grid stage the point simply does not count.
//!
//! Angular residuals wrap at ±180°, so a sign change can also be a wrap
//! discontinuity. Every candidate is therefore re-checked against
//! `accept_residual_deg` before it is returned, whichever stage found it.

use crate::{CartographyError, Result};
use log::trace;
use serde::{Deserialize, Serialize};

/// Bounds and tolerances of the solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Half-width of the bracket placed around a hint
    pub bracket_half_width: f64,
    /// Lower end of the search domain
    pub domain_min: f64,
    /// Upper end of the search domain
    pub domain_max: f64,
    /// Maximum bisection steps per stage
    pub max_bisections: usize,
    /// Number of samples in the grid stage (both domain ends included)
    pub grid_points: usize,
    /// Bisection stops once the bracket half-width drops below this and the
    /// residual is acceptable
    pub tolerance: f64,
    /// Bisection stops once |residual| drops below this
    pub residual_tolerance: f64,
    /// Largest |residual| accepted as a root
    pub accept_residual_deg: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            bracket_half_width: 10.0,
            domain_min: -180.0,
            domain_max: 180.0,
            max_bisections: 20,
            grid_points: 73,
            tolerance: 0.01,
            residual_tolerance: 1e-3,
            accept_residual_deg: 0.05,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.domain_min < self.domain_max) {
            return Err(CartographyError::Config(format!(
                "solver domain [{}, {}] is empty",
                self.domain_min, self.domain_max
            )));
        }
        if self.grid_points < 2 {
            return Err(CartographyError::Config(
                "solver grid needs at least 2 points".to_string(),
            ));
        }
        if !(self.tolerance > 0.0 && self.accept_residual_deg > 0.0 && self.bracket_half_width > 0.0)
        {
            return Err(CartographyError::Config(
                "solver tolerances must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Which stage produced a root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootStrategy {
    LocalBracket,
    FullBracket,
    GridSearch,
}

/// A located root
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root {
    pub x: f64,
    pub residual: f64,
    pub strategy: RootStrategy,
}

/// Escalating bracket / bisection / grid solver
#[derive(Debug, Clone, Default)]
pub struct RootSolver {
    config: SolverConfig,
}

impl RootSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Find `x` with `f(x) ≈ 0`, trying a bracket around `hint` first
    ///
    /// Returns `None` when every stage fails; that is an expected outcome,
    /// not an error.
    pub fn solve<F>(&self, mut f: F, hint: Option<f64>) -> Option<Root>
    where
        F: FnMut(f64) -> Option<f64>,
    {
        let cfg = &self.config;

        if let Some(h) = hint.filter(|h| h.is_finite()) {
            let lo = h - cfg.bracket_half_width;
            let hi = h + cfg.bracket_half_width;
            if let Some(x) = self.bracketed(&mut f, lo, hi) {
                return Some(Root {
                    x: x.0,
                    residual: x.1,
                    strategy: RootStrategy::LocalBracket,
                });
            }
        }

        if let Some(x) = self.bracketed(&mut f, cfg.domain_min, cfg.domain_max) {
            return Some(Root {
                x: x.0,
                residual: x.1,
                strategy: RootStrategy::FullBracket,
            });
        }

        self.grid_search(&mut f).map(|(x, residual)| Root {
            x,
            residual,
            strategy: RootStrategy::GridSearch,
        })
    }

    /// Bisection on `[lo, hi]` if the ends straddle zero
    fn bracketed<F>(&self, f: &mut F, lo: f64, hi: f64) -> Option<(f64, f64)>
    where
        F: FnMut(f64) -> Option<f64>,
    {
        let f_lo = f(lo)?;
        let f_hi = f(hi)?;
        self.bisect(f, lo, hi, f_lo, f_hi)
    }

    fn bisect<F>(&self, f: &mut F, mut lo: f64, mut hi: f64, mut f_lo: f64, f_hi: f64) -> Option<(f64, f64)>
    where
        F: FnMut(f64) -> Option<f64>,
    {
        let cfg = &self.config;
        if !(f_lo.is_finite() && f_hi.is_finite()) {
            return None;
        }
        if f_lo == 0.0 {
            return Some((lo, 0.0));
        }
        if f_hi == 0.0 {
            return Some((hi, 0.0));
        }
        if f_lo.signum() == f_hi.signum() {
            return None;
        }

        let mut best = (0.5 * (lo + hi), f64::INFINITY);
        for _ in 0..cfg.max_bisections {
            let mid = 0.5 * (lo + hi);
            let f_mid = f(mid)?;
            best = (mid, f_mid);
            let narrow = 0.5 * (hi - lo) < cfg.tolerance;
            if f_mid.abs() < cfg.residual_tolerance
                || (narrow && f_mid.abs() <= cfg.accept_residual_deg)
            {
                break;
            }
            if f_lo * f_mid < 0.0 {
                hi = mid;
            } else {
                lo = mid;
                f_lo = f_mid;
            }
        }

        if best.1.abs() <= cfg.accept_residual_deg {
            Some(best)
        } else {
            trace!("bisection converged on a discontinuity at {:.4}", best.0);
            None
        }
    }

    fn grid_search<F>(&self, f: &mut F) -> Option<(f64, f64)>
    where
        F: FnMut(f64) -> Option<f64>,
    {
        let cfg = &self.config;
        let n = cfg.grid_points;
        let step = (cfg.domain_max - cfg.domain_min) / (n - 1) as f64;
        let samples: Vec<(f64, Option<f64>)> = (0..n)
            .map(|i| {
                let x = cfg.domain_min + i as f64 * step;
                (x, f(x).filter(|v| v.is_finite()))
            })
            .collect();

        let (best_idx, best_val) = samples
            .iter()
            .enumerate()
            .filter_map(|(i, (_, v))| v.map(|v| (i, v)))
            .min_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))?;

        // A continuous sign change next to the best sample can be refined
        let continuity = 90.0;
        for neighbour in [best_idx.checked_sub(1), Some(best_idx + 1)]
            .into_iter()
            .flatten()
        {
            let Some(&(x_n, Some(v_n))) = samples.get(neighbour) else {
                continue;
            };
            if v_n.signum() == best_val.signum() || (v_n - best_val).abs() > continuity {
                continue;
            }
            let x_b = samples[best_idx].0;
            let (lo, hi, f_lo, f_hi) = if x_n < x_b {
                (x_n, x_b, v_n, best_val)
            } else {
                (x_b, x_n, best_val, v_n)
            };
            if let Some(root) = self.bisect(f, lo, hi, f_lo, f_hi) {
                return Some(root);
            }
        }

        let x_b = samples[best_idx].0;
        if best_val.abs() < cfg.residual_tolerance {
            return Some((x_b, best_val));
        }
        let (x, v) = match self.minimize(f, x_b - step, x_b + step) {
            Some((x, v)) if v.abs() < best_val.abs() => (x, v),
            _ => (x_b, best_val),
        };
        if v.abs() <= cfg.accept_residual_deg {
            Some((x, v))
        } else {
            trace!("grid minimum {:.4} at {:.3} not accepted", v, x);
            None
        }
    }

    /// Golden-section search for the smallest |f| on `[lo, hi]`
    fn minimize<F>(&self, f: &mut F, mut lo: f64, mut hi: f64) -> Option<(f64, f64)>
    where
        F: FnMut(f64) -> Option<f64>,
    {
        let cfg = &self.config;
        let ratio = 0.5 * (5f64.sqrt() - 1.0);
        let mut c = hi - ratio * (hi - lo);
        let mut d = lo + ratio * (hi - lo);
        let mut f_c = f(c).filter(|v| v.is_finite())?;
        let mut f_d = f(d).filter(|v| v.is_finite())?;

        for _ in 0..cfg.max_bisections {
            if hi - lo < cfg.tolerance || f_c.abs().min(f_d.abs()) < cfg.residual_tolerance {
                break;
            }
            if f_c.abs() < f_d.abs() {
                hi = d;
                d = c;
                f_d = f_c;
                c = hi - ratio * (hi - lo);
                f_c = f(c).filter(|v| v.is_finite())?;
            } else {
                lo = c;
                c = d;
                f_c = f_d;
                d = lo + ratio * (hi - lo);
                f_d = f(d).filter(|v| v.is_finite())?;
            }
        }

        Some(if f_c.abs() < f_d.abs() { (c, f_c) } else { (d, f_d) })
    }
}
