use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinkitError;
use crate::solver::{bisect, newton_raphson, SolverConfig};
use crate::time_value::{npv_at_rate, npv_derivative};
use crate::types::{with_metadata_f64, ComputationOutput, WarningItem};
use crate::FinkitResult;

const NEWTON: SolverConfig = SolverConfig::new(1e-10, 100);
const FALLBACK: SolverConfig = SolverConfig::new(1e-8, 200);
const FALLBACK_LOW: f64 = -0.99;
const FALLBACK_HIGH: f64 = 10.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrrInput {
    /// Cash flows with the first at t = 0
    pub cash_flows: Vec<f64>,
    /// Newton starting rate as a decimal
    #[serde(default = "default_guess")]
    pub guess: f64,
}

fn default_guess() -> f64 {
    0.1
}

/// Which root finder produced the rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrMethod {
    NewtonRaphson,
    Bisection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrrOutput {
    /// Internal rate of return in percent
    pub irr: f64,
    pub method: IrrMethod,
    pub iterations: u32,
    pub converged: bool,
}

/// Rate at which NPV is zero.
///
/// Newton-Raphson from `guess` first. If the derivative vanishes, the budget
/// runs out, or Newton lands at or below -100%, bisection over [-0.99, 10]
/// takes over. A bisection that exhausts its budget still reports the last
/// bracket midpoint, flagged `converged == false`.
pub fn calculate_irr(input: &IrrInput) -> FinkitResult<ComputationOutput<IrrOutput>> {
    let start = Instant::now();
    validate_irr_input(input)?;

    let flows = &input.cash_flows;
    let newton = newton_raphson(
        |r| npv_at_rate(flows, r),
        |r| npv_derivative(flows, r),
        input.guess,
        &NEWTON,
    )
    .filter(|solved| solved.root.is_finite() && solved.root > -1.0);

    let mut warnings = Vec::new();
    let output = match newton {
        Some(solved) => IrrOutput {
            irr: solved.root * 100.0,
            method: IrrMethod::NewtonRaphson,
            iterations: solved.iterations,
            converged: true,
        },
        None => {
            // positive NPV means the rate is still too low
            let solved = bisect(|r| npv_at_rate(flows, r), FALLBACK_LOW, FALLBACK_HIGH, &FALLBACK);
            if !solved.converged {
                warnings.push(WarningItem::new(
                    "irr.not_converged",
                    format!(
                        "IRR search did not converge; reporting the last bracket midpoint (NPV residual {:.6})",
                        solved.residual
                    ),
                ));
            }
            IrrOutput {
                irr: solved.root * 100.0,
                method: IrrMethod::Bisection,
                iterations: solved.iterations,
                converged: solved.converged,
            }
        }
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "IRR via Newton-Raphson with bisection fallback",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn validate_irr_input(input: &IrrInput) -> FinkitResult<()> {
    if input.cash_flows.len() < 2 {
        return Err(FinkitError::invalid(
            "cash_flows",
            "At least two cash flows are required",
        ));
    }
    if input.cash_flows.iter().any(|cf| !cf.is_finite()) {
        return Err(FinkitError::invalid("cash_flows", "Must be finite"));
    }
    if input.guess.is_nan() || input.guess < FALLBACK_LOW {
        return Err(FinkitError::invalid("guess", "Must be at least -0.99"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_period_irr_is_ten_percent() {
        let input = IrrInput {
            cash_flows: vec![-1000.0, 1100.0],
            guess: 0.1,
        };
        let out = calculate_irr(&input).unwrap().result;
        assert!((out.irr - 10.0).abs() < 1e-6);
        assert_eq!(out.method, IrrMethod::NewtonRaphson);
        assert!(out.converged);
    }

    #[test]
    fn test_multi_period_irr_zeroes_npv() {
        let flows = vec![-1000.0, 300.0, 400.0, 500.0];
        let out = calculate_irr(&IrrInput {
            cash_flows: flows.clone(),
            guess: 0.1,
        })
        .unwrap()
        .result;
        assert!(npv_at_rate(&flows, out.irr / 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_derivative_falls_back_to_bisection() {
        // only t = 0 is non-zero, so the derivative is exactly 0 everywhere
        let out = calculate_irr(&IrrInput {
            cash_flows: vec![-100.0, 0.0],
            guess: 0.1,
        })
        .unwrap();
        assert_eq!(out.result.method, IrrMethod::Bisection);
        assert!(!out.result.converged);
        assert_eq!(out.warnings[0].code, "irr.not_converged");
    }

    #[test]
    fn test_rejects_single_flow() {
        let input = IrrInput {
            cash_flows: vec![-100.0],
            guess: 0.1,
        };
        assert!(calculate_irr(&input).is_err());
    }

    #[test]
    fn test_rejects_guess_below_floor() {
        let input = IrrInput {
            cash_flows: vec![-100.0, 110.0],
            guess: -1.5,
        };
        assert!(calculate_irr(&input).is_err());
    }
}
