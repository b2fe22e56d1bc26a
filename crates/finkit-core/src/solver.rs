//! Fixed-budget root finders used by the yield, IRR and goal solvers.
//!
//! Neither routine fails on non-convergence. Bisection always hands back the
//! midpoint of its final bracket; Newton-Raphson reports `None` so the caller
//! can fall back to a bracketing method. Callers assert "close enough", never
//! exact equality.

use serde::{Deserialize, Serialize};

/// Tolerance and iteration ceiling for a single solve.
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Absolute tolerance. Bisection compares it against the residual,
    /// Newton-Raphson against the step size.
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl SolverConfig {
    pub const fn new(tolerance: f64, max_iterations: u32) -> Self {
        SolverConfig {
            tolerance,
            max_iterations,
        }
    }
}

/// Outcome of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverResult {
    pub root: f64,
    pub iterations: u32,
    /// Residual at the last evaluated point.
    pub residual: f64,
    /// False when the iteration budget ran out before the tolerance was met.
    pub converged: bool,
}

/// Bisect `[lo, hi]` on a signed residual.
///
/// `f(x) > 0` means the root lies above `x` (the lower bound moves up);
/// anything else moves the upper bound down. Stops as soon as
/// `|f(mid)| < tolerance`. When the budget is exhausted the midpoint of the
/// final bracket is returned with `converged == false`.
///
/// The bracket is assumed to contain the root; this is not checked.
pub fn bisect<F>(mut f: F, lo: f64, hi: f64, config: &SolverConfig) -> SolverResult
where
    F: FnMut(f64) -> f64,
{
    let mut lo = lo;
    let mut hi = hi;
    let mut residual = f64::NAN;

    for iteration in 0..config.max_iterations {
        let mid = (lo + hi) / 2.0;
        residual = f(mid);
        if residual.abs() < config.tolerance {
            return SolverResult {
                root: mid,
                iterations: iteration + 1,
                residual,
                converged: true,
            };
        }
        if residual > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    SolverResult {
        root: (lo + hi) / 2.0,
        iterations: config.max_iterations,
        residual,
        converged: false,
    }
}

/// Newton-Raphson from `guess` using the analytic derivative `df`.
///
/// Converges when the update step is smaller than the tolerance. Returns
/// `None` if the derivative is ever exactly zero or the budget runs out.
pub fn newton_raphson<F, D>(
    mut f: F,
    mut df: D,
    guess: f64,
    config: &SolverConfig,
) -> Option<SolverResult>
where
    F: FnMut(f64) -> f64,
    D: FnMut(f64) -> f64,
{
    let mut x = guess;

    for iteration in 0..config.max_iterations {
        let fx = f(x);
        let dfx = df(x);
        if dfx == 0.0 {
            return None;
        }

        let next = x - fx / dfx;
        if (next - x).abs() < config.tolerance {
            return Some(SolverResult {
                root: next,
                iterations: iteration + 1,
                residual: fx,
                converged: true,
            });
        }
        x = next;
    }

    None
}
