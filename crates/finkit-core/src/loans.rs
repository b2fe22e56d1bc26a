use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinkitError;
use crate::explain::loan_explanation;
use crate::guardrails::loan_warnings;
use crate::time_value::{monthly_payment, monthly_rate};
use crate::types::{with_metadata_f64, ComputationOutput, Explanation};
use crate::FinkitResult;

/// Floor of the payoff tolerance.
const BALANCE_EPSILON: f64 = 1e-8;

/// Residue per unit of principal swept into the final payment. Float error in
/// the level-payment recursion grows with the principal, so the threshold does too.
const RELATIVE_RESIDUE: f64 = 1e-9;

/// A fixed-rate loan to amortize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    pub principal: f64,
    /// Annual rate in percent (6.5 = 6.5%)
    pub annual_rate: f64,
    /// Contractual term in whole years
    pub years: u32,
    /// Paid on top of the scheduled payment every month
    #[serde(default)]
    pub extra_payment: f64,
}

/// One month of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based month index
    pub month: u32,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub balance: f64,
}

/// Summary of a loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanOutput {
    /// Scheduled payment, excluding any extra payment
    pub monthly_payment: f64,
    pub total_interest: f64,
    pub total_paid: f64,
    /// Actual payoff time: schedule length / 12
    pub years: f64,
}

/// Summary plus the full month-by-month schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub summary: LoanOutput,
    pub schedule: Vec<AmortizationRow>,
}

/// Loan summary: scheduled payment, total interest, total paid and payoff time.
pub fn calculate_loan(input: &LoanInput) -> FinkitResult<ComputationOutput<LoanOutput>> {
    let start = Instant::now();
    let schedule = amortization_schedule(input)?;
    let summary = summarize(input, &schedule);
    let warnings = loan_warnings(
        input.principal,
        input.annual_rate,
        input.years,
        input.extra_payment,
    );

    let explanation = explain_loan(input, &summary);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "Level-payment amortization (monthly compounding)",
        input,
        warnings,
        elapsed,
        summary,
    )
    .with_explanation(explanation))
}

/// Loan summary together with the month-by-month schedule.
pub fn calculate_amortization(
    input: &LoanInput,
) -> FinkitResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let schedule = amortization_schedule(input)?;
    let summary = summarize(input, &schedule);
    let warnings = loan_warnings(
        input.principal,
        input.annual_rate,
        input.years,
        input.extra_payment,
    );

    let explanation = explain_loan(input, &summary);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "Level-payment amortization schedule",
        input,
        warnings,
        elapsed,
        AmortizationOutput { summary, schedule },
    )
    .with_explanation(explanation))
}

/// Build the schedule month by month until the balance reaches zero.
///
/// Fails with `FinancialImpossibility` if a payment does not cover the month's
/// interest, and with `SafetyCapExceeded` if the schedule runs past twice the
/// contractual term.
pub fn amortization_schedule(input: &LoanInput) -> FinkitResult<Vec<AmortizationRow>> {
    validate_loan_input(input)?;

    let months = input.years * 12;
    let r = monthly_rate(input.annual_rate);
    let scheduled = monthly_payment(input.principal, input.annual_rate, months) + input.extra_payment;
    let max_months = months * 2;
    let tolerance = payoff_tolerance(input.principal);

    let mut schedule = Vec::with_capacity(months as usize);
    let mut balance = input.principal;
    let mut month = 0u32;

    while balance > tolerance {
        month += 1;
        if month > max_months {
            return Err(FinkitError::SafetyCapExceeded {
                context: "amortization".into(),
                limit: max_months,
            });
        }

        let row = amortize_month(month, balance, r, scheduled, tolerance);
        if row.principal < 0.0 {
            return Err(FinkitError::FinancialImpossibility(format!(
                "payment of {scheduled:.2} does not cover interest of {:.2} in month {month}",
                row.interest
            )));
        }
        balance = row.balance;
        schedule.push(row);
    }

    Ok(schedule)
}

/// Months to retire `principal` at a fixed monthly payment, capped at `cap`.
///
/// A payment that never covers the interest reports the cap.
pub(crate) fn payoff_months(principal: f64, annual_rate: f64, payment: f64, cap: u32) -> u32 {
    let r = monthly_rate(annual_rate);
    let tolerance = payoff_tolerance(principal);
    let mut balance = principal;
    let mut month = 0u32;

    while balance > tolerance {
        month += 1;
        if month > cap {
            return cap;
        }
        let row = amortize_month(month, balance, r, payment, tolerance);
        if row.principal <= 0.0 {
            return cap;
        }
        balance = row.balance;
    }
    month
}

fn payoff_tolerance(principal: f64) -> f64 {
    (principal.abs() * RELATIVE_RESIDUE).max(BALANCE_EPSILON)
}

/// One month of interest and repayment. A payment that would leave no more
/// than `tolerance` outstanding settles the balance in full.
fn amortize_month(
    month: u32,
    balance: f64,
    r: f64,
    scheduled: f64,
    tolerance: f64,
) -> AmortizationRow {
    let interest = balance * r;
    let mut payment = scheduled;
    let mut principal = payment - interest;
    if principal > balance || balance - principal <= tolerance {
        principal = balance;
        payment = interest + principal;
    }
    AmortizationRow {
        month,
        payment,
        principal,
        interest,
        balance: balance - principal,
    }
}

fn explain_loan(input: &LoanInput, summary: &LoanOutput) -> Explanation {
    let explanation = loan_explanation(
        input.principal,
        input.annual_rate,
        input.years,
        summary.monthly_payment,
    );
    if input.extra_payment > 0.0 {
        explanation
            .step("Extra payment", "E = extra_payment", input.extra_payment)
            .step("Payoff months", "months until balance reaches 0 at P + E", summary.years * 12.0)
    } else {
        explanation
    }
}

fn summarize(input: &LoanInput, schedule: &[AmortizationRow]) -> LoanOutput {
    let total_paid = schedule.iter().map(|row| row.payment).sum();
    let total_interest = schedule.iter().map(|row| row.interest).sum();
    LoanOutput {
        monthly_payment: monthly_payment(input.principal, input.annual_rate, input.years * 12),
        total_interest,
        total_paid,
        years: schedule.len() as f64 / 12.0,
    }
}

pub(crate) fn validate_loan_input(input: &LoanInput) -> FinkitResult<()> {
    if !input.principal.is_finite() || input.principal <= 0.0 {
        return Err(FinkitError::invalid("principal", "Must be positive"));
    }
    if input.annual_rate.is_nan() || input.annual_rate < 0.0 {
        return Err(FinkitError::invalid("annual_rate", "Cannot be negative"));
    }
    if input.years == 0 {
        return Err(FinkitError::invalid("years", "Must be at least 1"));
    }
    if input.extra_payment.is_nan() || input.extra_payment < 0.0 {
        return Err(FinkitError::invalid("extra_payment", "Cannot be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mortgage() -> LoanInput {
        LoanInput {
            principal: 200_000.0,
            annual_rate: 6.0,
            years: 30,
            extra_payment: 0.0,
        }
    }

    #[test]
    fn test_schedule_conserves_principal() {
        let input = mortgage();
        let out = calculate_loan(&input).unwrap().result;
        assert!((out.total_paid - (out.total_interest + input.principal)).abs() < 1e-4);
        assert_eq!(out.years, 30.0);

        let schedule = amortization_schedule(&input).unwrap();
        assert_eq!(schedule[0].month, 1);
        assert_eq!(schedule.last().unwrap().balance, 0.0);
        assert!(schedule.windows(2).all(|w| w[1].balance < w[0].balance));
    }

    #[test]
    fn test_level_schedule_runs_exactly_the_term() {
        for principal in [1_000.0, 25_000.0, 200_000.0, 750_000.0, 5_000_000.0] {
            for annual_rate in [0.0, 0.5, 3.25, 6.0, 12.5, 19.9] {
                for years in [1, 5, 15, 30, 40] {
                    let input = LoanInput {
                        principal,
                        annual_rate,
                        years,
                        extra_payment: 0.0,
                    };
                    let schedule = amortization_schedule(&input).unwrap();
                    assert_eq!(
                        schedule.len() as u32,
                        years * 12,
                        "{principal} at {annual_rate}% over {years}y"
                    );
                    let last = schedule.last().unwrap();
                    assert_eq!(last.balance, 0.0);
                    assert!(last.payment > 1.0, "last payment {}", last.payment);
                }
            }
        }
    }

    #[test]
    fn test_explanation_reports_payment_inputs() {
        let out = calculate_loan(&mortgage()).unwrap();
        let explanation = out.explanation.unwrap();
        assert_eq!(explanation.value_of("Periods"), Some(360.0));
        assert!((explanation.value_of("Monthly rate").unwrap() - 0.005).abs() < 1e-15);
        assert_eq!(explanation.value_of("Payment"), Some(out.result.monthly_payment));
        assert!(explanation.value_of("Extra payment").is_none());

        let mut input = mortgage();
        input.extra_payment = 500.0;
        let out = calculate_amortization(&input).unwrap();
        let explanation = out.explanation.unwrap();
        assert_eq!(explanation.value_of("Extra payment"), Some(500.0));
        let payoff = explanation.value_of("Payoff months").unwrap();
        assert!((payoff - out.result.schedule.len() as f64).abs() < 1e-9);
    }

    #[test]
    fn test_zero_rate_payment_exact() {
        let input = LoanInput {
            principal: 12_000.0,
            annual_rate: 0.0,
            years: 1,
            extra_payment: 0.0,
        };
        let out = calculate_loan(&input).unwrap().result;
        assert_eq!(out.monthly_payment, 1000.0);
        assert_eq!(out.total_interest, 0.0);
    }

    #[test]
    fn test_extra_payment_shortens_term() {
        let mut input = mortgage();
        input.extra_payment = 500.0;
        let out = calculate_loan(&input).unwrap().result;
        assert!(out.years < 20.0, "payoff in {} years", out.years);
        // last payment trimmed to remaining balance
        let schedule = amortization_schedule(&input).unwrap();
        let last = schedule.last().unwrap();
        assert!(last.payment <= out.monthly_payment + 500.0);
    }

    #[test]
    fn test_large_extra_warns() {
        let input = LoanInput {
            principal: 10_000.0,
            annual_rate: 5.0,
            years: 5,
            extra_payment: 1_500.0,
        };
        let out = calculate_loan(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.code == "loan.large_extra"));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let mut input = mortgage();
        input.principal = 0.0;
        assert!(matches!(
            calculate_loan(&input),
            Err(FinkitError::InvalidInput { .. })
        ));
        let mut input = mortgage();
        input.years = 0;
        assert!(calculate_loan(&input).is_err());
        let mut input = mortgage();
        input.extra_payment = -1.0;
        assert!(calculate_loan(&input).is_err());
    }

    #[test]
    fn test_payoff_months_matches_schedule() {
        let mut input = mortgage();
        input.extra_payment = 250.0;
        let schedule = amortization_schedule(&input).unwrap();
        let payment = monthly_payment(input.principal, input.annual_rate, 360) + 250.0;
        assert_eq!(
            payoff_months(input.principal, input.annual_rate, payment, 720) as usize,
            schedule.len()
        );
    }

    #[test]
    fn test_payoff_months_caps_when_interest_not_covered() {
        assert_eq!(payoff_months(100_000.0, 12.0, 500.0, 720), 720);
    }
}
