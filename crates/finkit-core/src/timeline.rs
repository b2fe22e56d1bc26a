//! Unified monthly cash-flow timeline across loan, investment, bond and
//! stock positions.
//!
//! Signs follow the holder's wallet: payments and contributions are
//! negative, coupons, face repayment and terminal values positive.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::bonds::{bond_price, BondPriceInput};
use crate::error::FinkitError;
use crate::guardrails::bonds_warnings;
use crate::investments::{calculate_investment, InvestmentInput};
use crate::loans::{calculate_loan, LoanInput};
use crate::stocks::{stock_projection, StockProjectionInput};
use crate::types::{with_metadata_f64, ComputationOutput};
use crate::FinkitResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineRequest {
    /// Horizon; every series has exactly this many points
    pub months: u32,
    #[serde(default = "included")]
    pub include_loan: bool,
    #[serde(default = "included")]
    pub include_invest: bool,
    #[serde(default = "included")]
    pub include_bonds: bool,
    #[serde(default = "included")]
    pub include_stocks: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan: Option<LoanInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment: Option<InvestmentInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bond: Option<BondPriceInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<StockProjectionInput>,
}

fn included() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// 1-based
    pub month: u32,
    pub amount: f64,
    /// Sum of amounts from month 1 through this month
    pub running_total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineSeries {
    pub name: String,
    pub points: Vec<TimelinePoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineOutput {
    pub months: u32,
    /// Loan, Investment, Bonds, Stocks/ETF, in that order
    pub series: Vec<TimelineSeries>,
    /// Running total of the month-by-month sum across all series
    pub net: Vec<TimelinePoint>,
}

/// Lay each product's cash flows on a shared monthly grid.
///
/// A product that is switched off or has no input contributes an all-zero
/// series. Warnings from the underlying calculators are concatenated in
/// product order.
pub fn build_timeline(request: &TimelineRequest) -> FinkitResult<ComputationOutput<TimelineOutput>> {
    let start = Instant::now();
    if request.months == 0 {
        return Err(FinkitError::invalid("months", "Must be at least 1"));
    }

    let horizon = request.months as usize;
    let mut loan_flows = vec![0.0; horizon];
    let mut invest_flows = vec![0.0; horizon];
    let mut bond_flows = vec![0.0; horizon];
    let mut stock_flows = vec![0.0; horizon];
    let mut warnings = Vec::new();

    if let Some(loan) = request.loan.as_ref().filter(|_| request.include_loan) {
        let summary = calculate_loan(loan)?;
        let outflow = -(summary.result.monthly_payment + loan.extra_payment);
        let months = active_months(loan.years, horizon);
        loan_flows[..months].fill(outflow);
        warnings.extend(summary.warnings);
    }

    if let Some(invest) = request.investment.as_ref().filter(|_| request.include_invest) {
        let growth = calculate_investment(invest)?;
        let months = active_months(invest.years, horizon);
        invest_flows[..months].fill(-invest.monthly);
        invest_flows[months - 1] += growth.result.final_value;
        warnings.extend(growth.warnings);
    }

    if let Some(bond) = request.bond.as_ref().filter(|_| request.include_bonds) {
        // validates the bond; the price itself is not a cash flow here
        bond_price(bond)?;
        place_bond_flows(bond, &mut bond_flows);
        warnings.extend(bonds_warnings(
            Some(bond.yield_rate),
            Some(bond.coupon_rate),
            Some(bond.years),
        ));
    }

    if let Some(stock) = request.stock.as_ref().filter(|_| request.include_stocks) {
        let projection = stock_projection(stock)?;
        let months = active_months(stock.years, horizon);
        stock_flows[..months].fill(-stock.monthly);
        stock_flows[months - 1] += projection.result.final_value;
        warnings.extend(projection.warnings);
    }

    let net_flows: Vec<f64> = (0..horizon)
        .map(|i| loan_flows[i] + invest_flows[i] + bond_flows[i] + stock_flows[i])
        .collect();

    let output = TimelineOutput {
        months: request.months,
        series: vec![
            series("Loan", &loan_flows),
            series("Investment", &invest_flows),
            series("Bonds", &bond_flows),
            series("Stocks/ETF", &stock_flows),
        ],
        net: flow_points(&net_flows),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "Monthly cash-flow grid across products",
        request,
        warnings,
        elapsed,
        output,
    ))
}

/// Months a product is active within the horizon (at least one: years > 0
/// is validated by the product calculators).
fn active_months(years: u32, horizon: usize) -> usize {
    (years as usize * 12).min(horizon)
}

/// Coupons every `round(12 / ppy)` months through the maturity month; face
/// repaid only if maturity falls inside the horizon.
fn place_bond_flows(bond: &BondPriceInput, flows: &mut [f64]) {
    let ppy = bond.payments_per_year;
    let coupon = bond.face_value * bond.coupon_rate / 100.0 / ppy as f64;
    let step = ((12.0 / ppy as f64).round() as usize).max(1);
    let maturity = bond.years as usize * 12;
    let last = maturity.min(flows.len());

    for month in (step..=last).step_by(step) {
        flows[month - 1] += coupon;
    }
    if maturity <= flows.len() {
        flows[maturity - 1] += bond.face_value;
    }
}

fn series(name: &str, amounts: &[f64]) -> TimelineSeries {
    TimelineSeries {
        name: name.to_string(),
        points: flow_points(amounts),
    }
}

fn flow_points(amounts: &[f64]) -> Vec<TimelinePoint> {
    let mut running = 0.0;
    amounts
        .iter()
        .enumerate()
        .map(|(idx, amount)| {
            running += amount;
            TimelinePoint {
                month: idx as u32 + 1,
                amount: *amount,
                running_total: running,
            }
        })
        .collect()
}
