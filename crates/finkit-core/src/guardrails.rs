//! Advisory checks on input magnitudes.
//!
//! Each rule family returns zero or more [`WarningItem`]s. They never fail and
//! never touch the numeric result they are attached to.

use crate::types::WarningItem;

pub fn loan_warnings(
    principal: f64,
    annual_rate: f64,
    years: u32,
    extra_payment: f64,
) -> Vec<WarningItem> {
    let mut warnings = Vec::new();
    if annual_rate > 20.0 {
        warnings.push(WarningItem::new(
            "loan.high_rate",
            "Annual rate is unusually high (>20%).",
        ));
    }
    if years > 40 {
        warnings.push(WarningItem::new(
            "loan.long_term",
            "Loan term is unusually long (>40 years).",
        ));
    }
    if extra_payment > principal * 0.1 {
        warnings.push(WarningItem::new(
            "loan.large_extra",
            "Extra payment is unusually large relative to principal.",
        ));
    }
    warnings
}

pub fn invest_warnings(initial: f64, monthly: f64, annual_rate: f64, years: u32) -> Vec<WarningItem> {
    let mut warnings = Vec::new();
    if annual_rate > 25.0 {
        warnings.push(WarningItem::new(
            "invest.high_return",
            "Assumed annual return is unusually high (>25%).",
        ));
    }
    if years > 60 {
        warnings.push(WarningItem::new(
            "invest.long_horizon",
            "Investment horizon is unusually long (>60 years).",
        ));
    }
    if monthly == 0.0 && initial == 0.0 {
        warnings.push(WarningItem::new(
            "invest.no_contrib",
            "No starting capital or monthly contribution was provided.",
        ));
    }
    warnings
}

pub fn risk_warnings(
    mean_return: Option<f64>,
    volatility: Option<f64>,
    simulations: Option<u32>,
) -> Vec<WarningItem> {
    let mut warnings = Vec::new();
    if mean_return.is_some_and(|m| m.abs() > 40.0) {
        warnings.push(WarningItem::new(
            "risk.extreme_mean",
            "Mean return assumption is extreme (>|40|%).",
        ));
    }
    if volatility.is_some_and(|v| v > 80.0) {
        warnings.push(WarningItem::new(
            "risk.extreme_vol",
            "Volatility assumption is unusually high (>80%).",
        ));
    }
    if simulations.is_some_and(|s| s < 500) {
        warnings.push(WarningItem::new(
            "risk.low_sims",
            "Low simulation count may produce unstable Monte Carlo percentiles.",
        ));
    }
    warnings
}

pub fn bonds_warnings(
    yield_rate: Option<f64>,
    coupon_rate: Option<f64>,
    years: Option<u32>,
) -> Vec<WarningItem> {
    let mut warnings = Vec::new();
    if yield_rate.is_some_and(|y| y > 20.0) {
        warnings.push(WarningItem::new(
            "bonds.high_yield",
            "Yield input is unusually high (>20%).",
        ));
    }
    if coupon_rate.is_some_and(|c| c > 20.0) {
        warnings.push(WarningItem::new(
            "bonds.high_coupon",
            "Coupon input is unusually high (>20%).",
        ));
    }
    if years.is_some_and(|y| y > 50) {
        warnings.push(WarningItem::new(
            "bonds.long_maturity",
            "Bond maturity is unusually long (>50 years).",
        ));
    }
    warnings
}
