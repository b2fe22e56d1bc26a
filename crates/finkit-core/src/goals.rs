//! Goal seeking: invert the investment and loan calculators.
//!
//! The investment goal solves for whichever of the monthly contribution or
//! the annual rate the caller left out. The loan goal finds the extra monthly
//! payment that retires a loan within a shorter term.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinkitError;
use crate::explain::{investment_explanation, loan_explanation};
use crate::guardrails::{invest_warnings, loan_warnings};
use crate::loans::payoff_months;
use crate::solver::{bisect, SolverConfig};
use crate::time_value::{future_value, monthly_payment, required_contribution};
use crate::types::{with_metadata_f64, ComputationOutput};
use crate::FinkitResult;

const RATE_SOLVER: SolverConfig = SolverConfig::new(1e-6, 80);
const RATE_BRACKET: (f64, f64) = (0.0, 100.0);
const EXTRA_SOLVER: SolverConfig = SolverConfig::new(1e-4, 80);
const EXTRA_GROWTH_ATTEMPTS: u32 = 50;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Supply exactly one of `monthly` or `annual_rate`; the other is solved for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentGoalInput {
    pub target_value: f64,
    pub initial: f64,
    pub years: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly: Option<f64>,
    /// Annual return in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_rate: Option<f64>,
}

/// The quantity that was solved for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum GoalSolution {
    /// End-of-month contribution, never negative
    RequiredMonthly(f64),
    /// Annual return in percent
    RequiredAnnualRate(f64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentGoalOutput {
    pub target_value: f64,
    pub years: u32,
    pub solution: GoalSolution,
    /// Future value at the solved parameters
    pub projected_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanPayoffGoalInput {
    pub principal: f64,
    /// Annual rate in percent
    pub annual_rate: f64,
    /// Contractual term the scheduled payment is based on
    pub current_years: u32,
    /// Desired payoff horizon, no longer than `current_years`
    pub target_years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanPayoffGoalOutput {
    pub base_monthly_payment: f64,
    pub required_extra_payment: f64,
    pub target_years: u32,
    /// Payoff time with the required extra payment
    pub achieved_years: f64,
}

// ---------------------------------------------------------------------------
// Investment goal
// ---------------------------------------------------------------------------

pub fn solve_investment_goal(
    input: &InvestmentGoalInput,
) -> FinkitResult<ComputationOutput<InvestmentGoalOutput>> {
    let start = Instant::now();
    validate_investment_goal(input)?;

    let months = input.years * 12;
    let (solution, monthly, rate, methodology) = match (input.monthly, input.annual_rate) {
        (None, Some(rate)) => {
            let monthly =
                required_contribution(input.target_value, input.initial, rate, months).max(0.0);
            (
                GoalSolution::RequiredMonthly(monthly),
                monthly,
                rate,
                "Required monthly contribution from the annuity formula",
            )
        }
        (Some(monthly), None) => {
            // below target means the rate is still too low
            let solved = bisect(
                |rate| input.target_value - future_value(input.initial, monthly, rate, months),
                RATE_BRACKET.0,
                RATE_BRACKET.1,
                &RATE_SOLVER,
            );
            (
                GoalSolution::RequiredAnnualRate(solved.root),
                monthly,
                solved.root,
                "Required annual return by bisection over 0-100%",
            )
        }
        (Some(_), Some(_)) => {
            return Err(FinkitError::invalid(
                "monthly / annual_rate",
                "Provide only one unknown: monthly or annual_rate",
            ))
        }
        (None, None) => {
            return Err(FinkitError::invalid(
                "monthly / annual_rate",
                "Either monthly or annual_rate must be provided",
            ))
        }
    };

    let output = InvestmentGoalOutput {
        target_value: input.target_value,
        years: input.years,
        solution,
        projected_value: future_value(input.initial, monthly, rate, months),
    };
    let warnings = invest_warnings(input.initial, monthly, rate, input.years);
    let explanation = investment_explanation(
        input.initial,
        monthly,
        rate,
        input.years,
        output.projected_value,
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(methodology, input, warnings, elapsed, output).with_explanation(explanation))
}

fn validate_investment_goal(input: &InvestmentGoalInput) -> FinkitResult<()> {
    if !input.target_value.is_finite() || input.target_value <= 0.0 {
        return Err(FinkitError::invalid("target_value", "Must be positive"));
    }
    if input.initial.is_nan() || input.initial < 0.0 {
        return Err(FinkitError::invalid("initial", "Cannot be negative"));
    }
    if input.years == 0 {
        return Err(FinkitError::invalid("years", "Must be at least 1"));
    }
    if input.monthly.is_some_and(|m| m.is_nan() || m < 0.0) {
        return Err(FinkitError::invalid("monthly", "Cannot be negative"));
    }
    if input.annual_rate.is_some_and(|r| r.is_nan() || r < 0.0) {
        return Err(FinkitError::invalid("annual_rate", "Cannot be negative"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Loan payoff goal
// ---------------------------------------------------------------------------

/// Extra monthly payment needed to retire the loan within `target_years`.
///
/// Grows an upper bound by 1.5x until it is sufficient, then bisects on the
/// payoff time. Payoff time moves in whole months, so the result is any
/// extra payment that lands on the target month count.
pub fn solve_loan_payoff_goal(
    input: &LoanPayoffGoalInput,
) -> FinkitResult<ComputationOutput<LoanPayoffGoalOutput>> {
    let start = Instant::now();
    validate_loan_goal(input)?;

    let term_months = input.current_years * 12;
    let base_payment = monthly_payment(input.principal, input.annual_rate, term_months);
    let target = input.target_years as f64;
    let cap = term_months * 2;
    let payoff_years = |extra: f64| {
        payoff_months(input.principal, input.annual_rate, base_payment + extra, cap) as f64 / 12.0
    };

    let mut high = (input.principal / (target * 12.0)).max(1.0);
    for _ in 0..EXTRA_GROWTH_ATTEMPTS {
        if payoff_years(high) <= target {
            break;
        }
        high *= 1.5;
    }

    // still above target means more extra is needed
    let solved = bisect(|extra| payoff_years(extra) - target, 0.0, high, &EXTRA_SOLVER);
    let required_extra = solved.root;

    let output = LoanPayoffGoalOutput {
        base_monthly_payment: base_payment,
        required_extra_payment: required_extra,
        target_years: input.target_years,
        achieved_years: payoff_years(required_extra),
    };
    let warnings = loan_warnings(
        input.principal,
        input.annual_rate,
        input.current_years,
        required_extra,
    );
    let explanation = loan_explanation(
        input.principal,
        input.annual_rate,
        input.current_years,
        base_payment,
    )
    .step(
        "Extra payment",
        "smallest E with payoff months at P + E <= target_years * 12",
        required_extra,
    )
    .step("Achieved years", "payoff months at P + E / 12", output.achieved_years);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "Extra payment by bisection on payoff time",
        input,
        warnings,
        elapsed,
        output,
    )
    .with_explanation(explanation))
}

fn validate_loan_goal(input: &LoanPayoffGoalInput) -> FinkitResult<()> {
    if !input.principal.is_finite() || input.principal <= 0.0 {
        return Err(FinkitError::invalid("principal", "Must be positive"));
    }
    if input.annual_rate.is_nan() || input.annual_rate < 0.0 {
        return Err(FinkitError::invalid("annual_rate", "Cannot be negative"));
    }
    if input.current_years == 0 {
        return Err(FinkitError::invalid("current_years", "Must be at least 1"));
    }
    if input.target_years == 0 {
        return Err(FinkitError::invalid("target_years", "Must be at least 1"));
    }
    if input.target_years > input.current_years {
        return Err(FinkitError::invalid(
            "target_years",
            "target_years must be less than or equal to current_years",
        ));
    }
    Ok(())
}
