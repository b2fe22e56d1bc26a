use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinkitError;
use crate::explain::investment_explanation;
use crate::guardrails::invest_warnings;
use crate::time_value::future_value;
use crate::types::{with_metadata_f64, ComputationOutput, FormulaStep};
use crate::FinkitResult;

/// Forward projection for a single ticker at an assumed return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockProjectionInput {
    pub ticker: String,
    pub initial: f64,
    #[serde(default)]
    pub monthly: f64,
    /// Expected annual return in percent, before fees
    pub annual_return: f64,
    pub years: u32,
    /// Annual expense ratio in percent, deducted from the return
    #[serde(default)]
    pub expense_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockProjectionOutput {
    /// Upper-cased ticker
    pub ticker: String,
    pub final_value: f64,
    pub total_contributions: f64,
    pub total_growth: f64,
    /// max(0, annual_return - expense_ratio)
    pub effective_annual_return: f64,
}

/// Investment growth at the fee-adjusted return, floored at zero.
pub fn stock_projection(
    input: &StockProjectionInput,
) -> FinkitResult<ComputationOutput<StockProjectionOutput>> {
    let start = Instant::now();
    validate(input)?;

    let months = input.years * 12;
    let effective = (input.annual_return - input.expense_ratio).max(0.0);
    let final_value = future_value(input.initial, input.monthly, effective, months);
    let total_contributions = input.initial + input.monthly * months as f64;

    let output = StockProjectionOutput {
        ticker: input.ticker.trim().to_uppercase(),
        final_value,
        total_contributions,
        total_growth: final_value - total_contributions,
        effective_annual_return: effective,
    };
    let warnings = invest_warnings(input.initial, input.monthly, effective, input.years);
    let mut explanation =
        investment_explanation(input.initial, input.monthly, effective, input.years, final_value);
    explanation.steps.insert(
        0,
        FormulaStep {
            name: "Effective return".into(),
            formula: "max(0, annual_return - expense_ratio)".into(),
            value: effective,
        },
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "Monthly-compounded projection at the return net of expense ratio",
        input,
        warnings,
        elapsed,
        output,
    )
    .with_explanation(explanation))
}

fn validate(input: &StockProjectionInput) -> FinkitResult<()> {
    if input.ticker.trim().is_empty() {
        return Err(FinkitError::invalid("ticker", "Cannot be empty"));
    }
    if input.initial.is_nan() || input.initial < 0.0 {
        return Err(FinkitError::invalid("initial", "Cannot be negative"));
    }
    if input.monthly.is_nan() || input.monthly < 0.0 {
        return Err(FinkitError::invalid("monthly", "Cannot be negative"));
    }
    if input.annual_return.is_nan() || input.annual_return < 0.0 {
        return Err(FinkitError::invalid("annual_return", "Cannot be negative"));
    }
    if input.expense_ratio.is_nan() || input.expense_ratio < 0.0 {
        return Err(FinkitError::invalid("expense_ratio", "Cannot be negative"));
    }
    if input.years == 0 {
        return Err(FinkitError::invalid("years", "Must be at least 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::investments::{investment_growth, InvestmentInput};

    #[test]
    fn test_matches_investment_at_net_return() {
        let input = StockProjectionInput {
            ticker: "voo".into(),
            initial: 5_000.0,
            monthly: 300.0,
            annual_return: 8.0,
            years: 20,
            expense_ratio: 0.5,
        };
        let out = stock_projection(&input).unwrap().result;
        let reference = investment_growth(&InvestmentInput {
            initial: 5_000.0,
            monthly: 300.0,
            annual_rate: 7.5,
            years: 20,
        })
        .unwrap();
        assert_eq!(out.ticker, "VOO");
        assert_eq!(out.effective_annual_return, 7.5);
        assert!((out.final_value - reference.final_value).abs() < 1e-9);
    }

    #[test]
    fn test_explanation_starts_from_net_return() {
        let input = StockProjectionInput {
            ticker: "vti".into(),
            initial: 2_000.0,
            monthly: 100.0,
            annual_return: 6.0,
            years: 5,
            expense_ratio: 1.0,
        };
        let out = stock_projection(&input).unwrap();
        let explanation = out.explanation.unwrap();
        assert_eq!(explanation.steps[0].name, "Effective return");
        assert_eq!(explanation.steps[0].value, 5.0);
        assert_eq!(explanation.value_of("Result"), Some(out.result.final_value));
    }

    #[test]
    fn test_fees_above_return_floor_at_zero() {
        let input = StockProjectionInput {
            ticker: "X".into(),
            initial: 1_000.0,
            monthly: 10.0,
            annual_return: 1.0,
            years: 1,
            expense_ratio: 2.0,
        };
        let out = stock_projection(&input).unwrap().result;
        assert_eq!(out.effective_annual_return, 0.0);
        assert_eq!(out.final_value, 1_120.0);
    }

    #[test]
    fn test_empty_ticker_rejected() {
        let input = StockProjectionInput {
            ticker: "  ".into(),
            initial: 1.0,
            monthly: 0.0,
            annual_return: 5.0,
            years: 1,
            expense_ratio: 0.0,
        };
        assert!(stock_projection(&input).is_err());
    }
}
