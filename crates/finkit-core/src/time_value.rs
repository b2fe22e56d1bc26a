//! Closed-form time-value formulas shared by the loan, investment, bond and
//! IRR code. All rates are percent per year unless the name says periodic.

/// Monthly rate as a decimal from an annual percent.
pub fn monthly_rate(annual_rate_pct: f64) -> f64 {
    annual_rate_pct / 100.0 / 12.0
}

/// Level payment that amortizes `principal` over `months` periods.
///
/// A zero rate divides the principal evenly across the term.
pub fn monthly_payment(principal: f64, annual_rate_pct: f64, months: u32) -> f64 {
    let r = monthly_rate(annual_rate_pct);
    let n = months as f64;
    if r == 0.0 {
        return principal / n;
    }
    let factor = (1.0 + r).powi(months as i32);
    principal * r * factor / (factor - 1.0)
}

/// Future value of `initial` plus a monthly contribution stream, monthly compounding.
pub fn future_value(initial: f64, monthly: f64, annual_rate_pct: f64, months: u32) -> f64 {
    let r = monthly_rate(annual_rate_pct);
    if r == 0.0 {
        return initial + monthly * months as f64;
    }
    let factor = (1.0 + r).powi(months as i32);
    let annuity_factor = (factor - 1.0) / r;
    initial * factor + monthly * annuity_factor
}

/// Monthly contribution that grows `initial` to `target` over `months`.
///
/// May be negative when the initial capital alone overshoots; callers clamp.
pub fn required_contribution(target: f64, initial: f64, annual_rate_pct: f64, months: u32) -> f64 {
    let r = monthly_rate(annual_rate_pct);
    if r == 0.0 {
        return (target - initial) / months as f64;
    }
    let factor = (1.0 + r).powi(months as i32);
    let annuity_factor = (factor - 1.0) / r;
    (target - initial * factor) / annuity_factor
}

/// Price of a level-coupon bond at a periodic discount rate.
pub fn bond_price_at_periodic_rate(face: f64, coupon: f64, rate: f64, periods: u32) -> f64 {
    let mut price = 0.0;
    let one_plus_r = 1.0 + rate;
    let mut discount = 1.0;
    for _ in 1..=periods {
        discount *= one_plus_r;
        price += coupon / discount;
    }
    price + face / one_plus_r.powi(periods as i32)
}

/// NPV with the first flow at t = 0, rate as a decimal.
pub fn npv_at_rate(cash_flows: &[f64], rate: f64) -> f64 {
    cash_flows
        .iter()
        .enumerate()
        .map(|(t, cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// d(NPV)/d(rate) = -Σ t·cf / (1+r)^(t+1)
pub fn npv_derivative(cash_flows: &[f64], rate: f64) -> f64 {
    cash_flows
        .iter()
        .enumerate()
        .skip(1)
        .map(|(t, cf)| -(t as f64) * cf / (1.0 + rate).powi(t as i32 + 1))
        .sum()
}
