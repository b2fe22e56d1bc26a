//! Side-by-side comparison of two parameter sets for one calculator.
//!
//! Inputs arrive as loose string-keyed maps (the shape a config file or a
//! form produces), so every key is looked up and coerced here.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::error::FinkitError;
use crate::investments::{investment_growth, InvestmentInput};
use crate::loans::{calculate_loan, LoanInput};
use crate::risk::{run_monte_carlo, MonteCarloInput};
use crate::types::{with_metadata_f64, ComputationOutput};
use crate::FinkitResult;

const DEFAULT_RISK_SEED: u64 = 42;
const ZERO_BASE_REASON: &str = "base_value is zero";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonCase {
    pub label: String,
    pub inputs: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRequest {
    /// `loan`, `invest` or `risk` (case-insensitive)
    pub calculator: String,
    pub base: ComparisonCase,
    pub alt: ComparisonCase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonDelta {
    pub metric: String,
    pub base_value: f64,
    pub alt_value: f64,
    /// alt - base
    pub absolute_delta: f64,
    /// absolute / base * 100, absent when the base is zero
    pub percent_delta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_delta_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonOutput {
    pub calculator: String,
    pub base_label: String,
    pub alt_label: String,
    pub deltas: Vec<ComparisonDelta>,
}

/// Run the named calculator on both cases and report per-metric deltas.
pub fn compare_scenarios(
    request: &ComparisonRequest,
) -> FinkitResult<ComputationOutput<ComparisonOutput>> {
    let start = Instant::now();
    let calculator = request.calculator.trim().to_lowercase();

    let deltas = match calculator.as_str() {
        "loan" => loan_deltas(&request.base.inputs, &request.alt.inputs)?,
        "invest" => invest_deltas(&request.base.inputs, &request.alt.inputs)?,
        "risk" => risk_deltas(&request.base.inputs, &request.alt.inputs)?,
        _ => {
            return Err(FinkitError::invalid(
                "calculator",
                format!("Unsupported comparison calculator: {}", request.calculator),
            ))
        }
    };

    let output = ComparisonOutput {
        calculator,
        base_label: request.base.label.clone(),
        alt_label: request.alt.label.clone(),
        deltas,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "Scenario comparison: alt minus base per metric",
        request,
        Vec::new(),
        elapsed,
        output,
    ))
}

pub fn build_delta(metric: &str, base_value: f64, alt_value: f64) -> ComparisonDelta {
    let absolute_delta = alt_value - base_value;
    let (percent_delta, percent_delta_reason) = if base_value == 0.0 {
        (None, Some(ZERO_BASE_REASON.to_string()))
    } else {
        (Some(absolute_delta / base_value * 100.0), None)
    };
    ComparisonDelta {
        metric: metric.to_string(),
        base_value,
        alt_value,
        absolute_delta,
        percent_delta,
        percent_delta_reason,
    }
}

// ---------------------------------------------------------------------------
// Per-calculator dispatch
// ---------------------------------------------------------------------------

type Inputs = BTreeMap<String, Value>;

fn loan_deltas(base: &Inputs, alt: &Inputs) -> FinkitResult<Vec<ComparisonDelta>> {
    let base = calculate_loan(&loan_input(base)?)?.result;
    let alt = calculate_loan(&loan_input(alt)?)?.result;
    Ok(vec![
        build_delta("monthly_payment", base.monthly_payment, alt.monthly_payment),
        build_delta("total_interest", base.total_interest, alt.total_interest),
        build_delta("total_paid", base.total_paid, alt.total_paid),
        build_delta("years", base.years, alt.years),
    ])
}

fn invest_deltas(base: &Inputs, alt: &Inputs) -> FinkitResult<Vec<ComparisonDelta>> {
    let base = investment_growth(&invest_input(base)?)?;
    let alt = investment_growth(&invest_input(alt)?)?;
    Ok(vec![
        build_delta("final_value", base.final_value, alt.final_value),
        build_delta(
            "total_contributions",
            base.total_contributions,
            alt.total_contributions,
        ),
        build_delta("total_growth", base.total_growth, alt.total_growth),
    ])
}

fn risk_deltas(base: &Inputs, alt: &Inputs) -> FinkitResult<Vec<ComparisonDelta>> {
    let base = run_monte_carlo(&risk_input(base)?)?.result;
    let alt = run_monte_carlo(&risk_input(alt)?)?.result;
    Ok(vec![
        build_delta("mean", base.mean, alt.mean),
        build_delta("median", base.median, alt.median),
        build_delta("p5", base.p5, alt.p5),
        build_delta("p95", base.p95, alt.p95),
    ])
}

fn loan_input(inputs: &Inputs) -> FinkitResult<LoanInput> {
    Ok(LoanInput {
        principal: number(inputs, "amount")?,
        annual_rate: number(inputs, "rate")?,
        years: whole(inputs, "years")? as u32,
        extra_payment: optional_number(inputs, "extra")?.unwrap_or(0.0),
    })
}

fn invest_input(inputs: &Inputs) -> FinkitResult<InvestmentInput> {
    Ok(InvestmentInput {
        initial: number(inputs, "initial")?,
        monthly: number(inputs, "monthly")?,
        annual_rate: number(inputs, "rate")?,
        years: whole(inputs, "years")? as u32,
    })
}

fn risk_input(inputs: &Inputs) -> FinkitResult<MonteCarloInput> {
    let seed = match inputs.get("seed") {
        Some(_) => whole(inputs, "seed")?,
        None => DEFAULT_RISK_SEED,
    };
    Ok(MonteCarloInput {
        initial_value: number(inputs, "initial")?,
        mean_return: number(inputs, "mean")?,
        volatility: number(inputs, "volatility")?,
        years: whole(inputs, "years")? as u32,
        simulations: whole(inputs, "sims")? as u32,
        seed,
    })
}

// ---------------------------------------------------------------------------
// Loose-map coercion
// ---------------------------------------------------------------------------

fn optional_number(inputs: &Inputs, key: &str) -> FinkitResult<Option<f64>> {
    let Some(value) = inputs.get(key) else {
        return Ok(None);
    };
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(x) if x.is_finite() => Ok(Some(x)),
        _ => Err(FinkitError::invalid(key, format!("Expected a number, got {value}"))),
    }
}

fn number(inputs: &Inputs, key: &str) -> FinkitResult<f64> {
    optional_number(inputs, key)?
        .ok_or_else(|| FinkitError::invalid(key, "Missing required comparison input"))
}

/// Non-negative whole number that fits in a `u32`.
fn whole(inputs: &Inputs, key: &str) -> FinkitResult<u64> {
    let x = number(inputs, key)?;
    if x < 0.0 || x.fract() != 0.0 || x > u32::MAX as f64 {
        return Err(FinkitError::invalid(key, "Expected a non-negative whole number"));
    }
    Ok(x as u64)
}
