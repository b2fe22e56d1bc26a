//! Worked explanations for the headline results.
//!
//! Each builder restates the closed-form steps with the values the
//! calculators actually used, so a reader can check a figure by hand.

use crate::time_value::monthly_rate;
use crate::types::Explanation;

/// (1+r)^n and the annuity factor ((1+r)^n - 1) / r, with n at a zero rate.
fn growth_factors(r: f64, months: u32) -> (f64, f64) {
    if r == 0.0 {
        return (1.0, months as f64);
    }
    let factor = (1.0 + r).powi(months as i32);
    (factor, (factor - 1.0) / r)
}

/// Level payment on an amortizing loan.
pub fn loan_explanation(principal: f64, annual_rate: f64, years: u32, payment: f64) -> Explanation {
    let r = monthly_rate(annual_rate);
    let months = years * 12;
    let payment_formula = if r == 0.0 {
        "P = L / n"
    } else {
        "P = L*r*(1+r)^n / ((1+r)^n - 1)"
    };
    Explanation::new("Monthly loan payment from principal, annual rate and term.")
        .step("Principal", "L = principal", principal)
        .step("Monthly rate", "r = annual_rate / 100 / 12", r)
        .step("Periods", "n = years * 12", months as f64)
        .step("Payment", payment_formula, payment)
}

/// Compounded initial capital plus an end-of-month contribution annuity.
pub fn investment_explanation(
    initial: f64,
    monthly: f64,
    annual_rate: f64,
    years: u32,
    final_value: f64,
) -> Explanation {
    let r = monthly_rate(annual_rate);
    let months = years * 12;
    let (factor, annuity) = growth_factors(r, months);
    Explanation::new(
        "Future value combines compounded initial capital and the monthly contribution annuity.",
    )
    .step("Monthly rate", "r = annual_rate / 100 / 12", r)
    .step("Periods", "n = years * 12", months as f64)
    .step("Initial growth", "initial * (1+r)^n", initial * factor)
    .step("Contribution growth", "monthly * ((1+r)^n - 1) / r", monthly * annuity)
    .step("Result", "FV = initial growth + contribution growth", final_value)
}

/// Summary statistics over the sorted terminal values.
pub fn monte_carlo_explanation(
    simulations: u32,
    mean: f64,
    median: f64,
    p5: f64,
    p95: f64,
) -> Explanation {
    Explanation::new("Distribution statistics computed from the sorted simulation outcomes.")
        .step("Simulations", "n = simulations", simulations as f64)
        .step("Mean", "sum(values) / n", mean)
        .step("Median", "middle(sorted(values))", median)
        .step("P5", "sorted(values)[floor(0.05*(n-1))]", p5)
        .step("P95", "sorted(values)[floor(0.95*(n-1))]", p95)
}

/// Coupons and face discounted at the periodic yield.
pub fn bond_price_explanation(
    face_value: f64,
    coupon_rate: f64,
    yield_rate: f64,
    years: u32,
    payments_per_year: u32,
    price: f64,
) -> Explanation {
    let ppy = payments_per_year as f64;
    Explanation::new("Price is the present value of every coupon plus the face at maturity.")
        .step("Coupon", "C = face * coupon_rate / 100 / ppy", face_value * coupon_rate / 100.0 / ppy)
        .step("Periodic yield", "y = yield_rate / 100 / ppy", yield_rate / 100.0 / ppy)
        .step("Periods", "n = years * ppy", (years * payments_per_year) as f64)
        .step("Price", "sum(C / (1+y)^t, t=1..n) + face / (1+y)^n", price)
}

/// Debt-to-income at the current and stressed housing cost.
pub fn afford_explanation(
    income: f64,
    debts: f64,
    housing: f64,
    stress_rate: f64,
    current_dti: f64,
    stressed_dti: f64,
    allowed_housing: f64,
) -> Explanation {
    Explanation::new("Debt-to-income compares monthly obligations with gross monthly income.")
        .step("Income", "income", income)
        .step("Obligations", "debts + housing", debts + housing)
        .step("Current DTI", "(debts + housing) / income", current_dti)
        .step(
            "Stressed housing",
            "housing * (1 + stress_rate / 100)",
            housing * (1.0 + stress_rate / 100.0),
        )
        .step("Stressed DTI", "(debts + stressed housing) / income", stressed_dti)
        .step("Allowed housing", "max(0, income * max_dti - debts)", allowed_housing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_investment_steps_add_up() {
        // 10k at 6% for 10y plus 100/month
        let exp = investment_explanation(10_000.0, 100.0, 6.0, 10, 34_581.90);
        let initial = exp.value_of("Initial growth").unwrap();
        let contributions = exp.value_of("Contribution growth").unwrap();
        assert!((initial - 18_193.97).abs() < 0.01);
        assert!((initial + contributions - 34_581.90).abs() < 0.01);
        assert_eq!(exp.value_of("Periods"), Some(120.0));
    }

    #[test]
    fn test_zero_rate_uses_plain_sums() {
        let exp = investment_explanation(1_000.0, 100.0, 0.0, 2, 3_400.0);
        assert_eq!(exp.value_of("Initial growth"), Some(1_000.0));
        assert_eq!(exp.value_of("Contribution growth"), Some(2_400.0));

        let exp = loan_explanation(12_000.0, 0.0, 1, 1_000.0);
        assert_eq!(exp.steps[3].formula, "P = L / n");
    }

    #[test]
    fn test_bond_steps_use_periodic_units() {
        let exp = bond_price_explanation(1_000.0, 6.0, 5.0, 10, 2, 1_077.95);
        assert_eq!(exp.value_of("Coupon"), Some(30.0));
        assert_eq!(exp.value_of("Periods"), Some(20.0));
        assert!((exp.value_of("Periodic yield").unwrap() - 0.025).abs() < 1e-15);
    }
}
