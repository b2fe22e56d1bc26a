use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinkitError;
use crate::explain::bond_price_explanation;
use crate::guardrails::bonds_warnings;
use crate::solver::{bisect, SolverConfig};
use crate::time_value::bond_price_at_periodic_rate;
use crate::types::{with_metadata_f64, ComputationOutput};
use crate::FinkitResult;

/// Periodic-rate bracket and budget for the yield search.
const YTM_SOLVER: SolverConfig = SolverConfig::new(1e-8, 100);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A level-coupon bullet bond priced at a flat yield.
///
/// Also the input for duration and convexity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondPriceInput {
    /// Par value repaid at maturity (e.g. 1000)
    pub face_value: f64,
    /// Annual coupon rate in percent
    pub coupon_rate: f64,
    /// Annual yield in percent
    pub yield_rate: f64,
    /// Whole years to maturity
    pub years: u32,
    /// Coupon payments per year: 1, 2, 4 or 12
    #[serde(default = "default_payments_per_year")]
    pub payments_per_year: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondPriceOutput {
    pub price: f64,
}

/// Solve for the yield that reproduces a quoted price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondYtmInput {
    pub face_value: f64,
    /// Annual coupon rate in percent
    pub coupon_rate: f64,
    /// Quoted price in the same units as `face_value`
    pub price: f64,
    pub years: u32,
    #[serde(default = "default_payments_per_year")]
    pub payments_per_year: u32,
    /// Starting guess as a decimal. Accepted but ignored by the bisection.
    #[serde(default = "default_guess")]
    pub guess: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondYtmOutput {
    /// Annual yield in percent
    pub yield_rate: f64,
    pub iterations: u32,
    pub converged: bool,
}

pub(crate) fn default_payments_per_year() -> u32 {
    2
}

fn default_guess() -> f64 {
    0.05
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Present value of coupons plus face at the periodic yield.
pub fn bond_price(input: &BondPriceInput) -> FinkitResult<ComputationOutput<BondPriceOutput>> {
    let start = Instant::now();
    validate_price_input(input)?;

    let price = price_from_input(input);
    let warnings = bonds_warnings(Some(input.yield_rate), None, None);
    let explanation = bond_price_explanation(
        input.face_value,
        input.coupon_rate,
        input.yield_rate,
        input.years,
        input.payments_per_year,
        price,
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "Discounted cash flows at a flat periodic yield",
        input,
        warnings,
        elapsed,
        BondPriceOutput { price },
    )
    .with_explanation(explanation))
}

/// Yield to maturity by bisection on the periodic rate over [0, 1].
///
/// Assumes price is decreasing in yield. A price above what a zero yield
/// produces cannot be matched and the solve ends at the lower bracket edge
/// with `converged == false`.
pub fn bond_ytm(input: &BondYtmInput) -> FinkitResult<ComputationOutput<BondYtmOutput>> {
    let start = Instant::now();
    validate_ytm_input(input)?;

    let ppy = input.payments_per_year;
    let periods = input.years * ppy;
    let coupon = input.face_value * input.coupon_rate / 100.0 / ppy as f64;

    // price above target means the yield is still too low
    let solved = bisect(
        |r| bond_price_at_periodic_rate(input.face_value, coupon, r, periods) - input.price,
        0.0,
        1.0,
        &YTM_SOLVER,
    );

    let warnings = bonds_warnings(None, Some(input.coupon_rate), Some(input.years));
    let output = BondYtmOutput {
        yield_rate: solved.root * ppy as f64 * 100.0,
        iterations: solved.iterations,
        converged: solved.converged,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "Yield to maturity via bisection on the periodic rate",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn price_from_input(input: &BondPriceInput) -> f64 {
    let ppy = input.payments_per_year as f64;
    let rate = input.yield_rate / 100.0 / ppy;
    let coupon = input.face_value * input.coupon_rate / 100.0 / ppy;
    bond_price_at_periodic_rate(
        input.face_value,
        coupon,
        rate,
        input.years * input.payments_per_year,
    )
}

pub(crate) fn validate_price_input(input: &BondPriceInput) -> FinkitResult<()> {
    if !input.face_value.is_finite() || input.face_value <= 0.0 {
        return Err(FinkitError::invalid("face_value", "Must be positive"));
    }
    if input.coupon_rate.is_nan() || input.coupon_rate < 0.0 {
        return Err(FinkitError::invalid("coupon_rate", "Cannot be negative"));
    }
    if input.yield_rate.is_nan() || input.yield_rate < 0.0 {
        return Err(FinkitError::invalid("yield_rate", "Cannot be negative"));
    }
    if input.years == 0 {
        return Err(FinkitError::invalid("years", "Must be at least 1"));
    }
    if input.payments_per_year == 0 {
        return Err(FinkitError::invalid("payments_per_year", "Must be at least 1"));
    }
    Ok(())
}

fn validate_ytm_input(input: &BondYtmInput) -> FinkitResult<()> {
    if !input.face_value.is_finite() || input.face_value <= 0.0 {
        return Err(FinkitError::invalid("face_value", "Must be positive"));
    }
    if input.coupon_rate.is_nan() || input.coupon_rate < 0.0 {
        return Err(FinkitError::invalid("coupon_rate", "Cannot be negative"));
    }
    if !input.price.is_finite() || input.price <= 0.0 {
        return Err(FinkitError::invalid("price", "Must be positive"));
    }
    if input.years == 0 {
        return Err(FinkitError::invalid("years", "Must be at least 1"));
    }
    if input.payments_per_year == 0 {
        return Err(FinkitError::invalid("payments_per_year", "Must be at least 1"));
    }
    if input.guess.is_nan() || input.guess < 0.0 {
        return Err(FinkitError::invalid("guess", "Cannot be negative"));
    }
    Ok(())
}
