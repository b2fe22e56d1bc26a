use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::guardrails::bonds_warnings;
use crate::types::{with_metadata_f64, ComputationOutput};
use crate::FinkitResult;

use super::pricing::{validate_price_input, BondPriceInput};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondDurationOutput {
    /// PV-weighted average time to cash flow, in years
    pub macaulay_duration: f64,
    /// Macaulay / (1 + y/freq)
    pub modified_duration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondConvexityOutput {
    /// Annualized convexity (years squared)
    pub convexity: f64,
}

/// Macaulay and modified duration.
pub fn calculate_duration(
    input: &BondPriceInput,
) -> FinkitResult<ComputationOutput<BondDurationOutput>> {
    let start = Instant::now();
    validate_price_input(input)?;

    let ppy = input.payments_per_year as f64;
    let rate = input.yield_rate / 100.0 / ppy;

    let mut pv_total = 0.0;
    let mut weighted_sum = 0.0;
    for (t, cash) in cash_flows(input) {
        let pv = cash / (1.0 + rate).powi(t as i32);
        pv_total += pv;
        weighted_sum += t as f64 * pv;
    }

    let macaulay = weighted_sum / pv_total / ppy;
    let output = BondDurationOutput {
        macaulay_duration: macaulay,
        modified_duration: macaulay / (1.0 + rate),
    };
    let warnings = bonds_warnings(Some(input.yield_rate), None, None);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "Macaulay duration from PV-weighted periods; modified = Macaulay / (1 + y/freq)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Convexity: Σ CF·t(t+1)/(1+r)^t / (P·(1+r)²) / freq²
pub fn calculate_convexity(
    input: &BondPriceInput,
) -> FinkitResult<ComputationOutput<BondConvexityOutput>> {
    let start = Instant::now();
    validate_price_input(input)?;

    let ppy = input.payments_per_year as f64;
    let rate = input.yield_rate / 100.0 / ppy;

    let mut pv_total = 0.0;
    let mut convex_sum = 0.0;
    for (t, cash) in cash_flows(input) {
        let pv = cash / (1.0 + rate).powi(t as i32);
        let t = t as f64;
        pv_total += pv;
        convex_sum += t * (t + 1.0) * pv;
    }

    let convexity = convex_sum / (pv_total * (1.0 + rate).powi(2)) / (ppy * ppy);
    let warnings = bonds_warnings(Some(input.yield_rate), None, None);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "Second derivative of price with respect to annual yield, divided by price",
        input,
        warnings,
        elapsed,
        BondConvexityOutput { convexity },
    ))
}

/// `(period, cash)` pairs, face added to the final coupon.
fn cash_flows(input: &BondPriceInput) -> impl Iterator<Item = (u32, f64)> + '_ {
    let periods = input.years * input.payments_per_year;
    let coupon = input.face_value * input.coupon_rate / 100.0 / input.payments_per_year as f64;
    (1..=periods).map(move |t| {
        let cash = if t == periods {
            coupon + input.face_value
        } else {
            coupon
        };
        (t, cash)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonds::pricing::price_from_input;

    fn bond(yield_rate: f64) -> BondPriceInput {
        BondPriceInput {
            face_value: 1000.0,
            coupon_rate: 6.0,
            yield_rate,
            years: 10,
            payments_per_year: 2,
        }
    }

    #[test]
    fn test_zero_coupon_macaulay_equals_maturity() {
        let input = BondPriceInput {
            coupon_rate: 0.0,
            ..bond(5.0)
        };
        let out = calculate_duration(&input).unwrap().result;
        assert!((out.macaulay_duration - 10.0).abs() < 1e-12);
        assert!(out.modified_duration < out.macaulay_duration);
    }

    #[test]
    fn test_coupon_bond_duration_below_maturity() {
        let out = calculate_duration(&bond(6.0)).unwrap().result;
        assert!(out.macaulay_duration > 0.0 && out.macaulay_duration < 10.0);
        // par bond, 6% semiannual, 10y → Macaulay ≈ 7.66
        assert!((out.macaulay_duration - 7.66).abs() < 0.01, "got {}", out.macaulay_duration);
    }

    #[test]
    fn test_modified_duration_matches_price_slope() {
        // -dP/dy / P with y in decimal annual terms
        let h = 1e-4;
        let p = price_from_input(&bond(6.0));
        let up = price_from_input(&bond(6.0 + h * 100.0));
        let down = price_from_input(&bond(6.0 - h * 100.0));
        let numeric = -(up - down) / (2.0 * h) / p;
        let out = calculate_duration(&bond(6.0)).unwrap().result;
        assert!((out.modified_duration - numeric).abs() < 1e-4);
    }

    #[test]
    fn test_convexity_matches_finite_difference() {
        let h = 1e-4;
        let p = price_from_input(&bond(5.0));
        let up = price_from_input(&bond(5.0 + h * 100.0));
        let down = price_from_input(&bond(5.0 - h * 100.0));
        let numeric = (up + down - 2.0 * p) / (h * h) / p;
        let out = calculate_convexity(&bond(5.0)).unwrap().result;
        assert!(
            (out.convexity - numeric).abs() / numeric < 1e-3,
            "analytic {} vs numeric {}",
            out.convexity,
            numeric
        );
    }

    #[test]
    fn test_annual_zero_coupon_convexity_closed_form() {
        // n(n+1)/(1+y)^2 for a zero-coupon bond with annual compounding
        let input = BondPriceInput {
            face_value: 100.0,
            coupon_rate: 0.0,
            yield_rate: 4.0,
            years: 5,
            payments_per_year: 1,
        };
        let out = calculate_convexity(&input).unwrap().result;
        assert!((out.convexity - 30.0 / 1.04f64.powi(2)).abs() < 1e-10);
    }
}
