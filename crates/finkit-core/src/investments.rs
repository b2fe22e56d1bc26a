use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinkitError;
use crate::explain::investment_explanation;
use crate::guardrails::invest_warnings;
use crate::time_value::future_value;
use crate::types::{with_metadata_f64, ComputationOutput};
use crate::FinkitResult;

/// Recurring-contribution growth scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentInput {
    pub initial: f64,
    /// Contribution at the end of every month
    pub monthly: f64,
    /// Annual return in percent
    pub annual_rate: f64,
    pub years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentOutput {
    pub final_value: f64,
    pub total_contributions: f64,
    /// final_value - total_contributions
    pub total_growth: f64,
    pub years: f64,
}

/// Future value of an initial balance plus monthly contributions.
pub fn calculate_investment(
    input: &InvestmentInput,
) -> FinkitResult<ComputationOutput<InvestmentOutput>> {
    let start = Instant::now();
    let output = investment_growth(input)?;
    let warnings = invest_warnings(input.initial, input.monthly, input.annual_rate, input.years);
    let explanation = investment_explanation(
        input.initial,
        input.monthly,
        input.annual_rate,
        input.years,
        output.final_value,
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "Future value with monthly compounding and end-of-month contributions",
        input,
        warnings,
        elapsed,
        output,
    )
    .with_explanation(explanation))
}

/// Bare growth calculation without the envelope, for solvers and aggregators.
pub fn investment_growth(input: &InvestmentInput) -> FinkitResult<InvestmentOutput> {
    validate_investment_input(input)?;

    let months = input.years * 12;
    let final_value = future_value(input.initial, input.monthly, input.annual_rate, months);
    let total_contributions = input.initial + input.monthly * months as f64;

    Ok(InvestmentOutput {
        final_value,
        total_contributions,
        total_growth: final_value - total_contributions,
        years: input.years as f64,
    })
}

fn validate_investment_input(input: &InvestmentInput) -> FinkitResult<()> {
    if input.initial.is_nan() || input.initial < 0.0 {
        return Err(FinkitError::invalid("initial", "Cannot be negative"));
    }
    if input.monthly.is_nan() || input.monthly < 0.0 {
        return Err(FinkitError::invalid("monthly", "Cannot be negative"));
    }
    if input.annual_rate.is_nan() || input.annual_rate < 0.0 {
        return Err(FinkitError::invalid("annual_rate", "Cannot be negative"));
    }
    if input.years == 0 {
        return Err(FinkitError::invalid("years", "Must be at least 1"));
    }
    Ok(())
}
