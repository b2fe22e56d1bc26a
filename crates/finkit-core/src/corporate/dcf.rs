use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinkitError;
use crate::types::{with_metadata, ComputationOutput, Money, Multiple, Rate};
use crate::FinkitResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpvInput {
    /// Discount rate in percent
    pub discount_rate: Rate,
    /// Cash flows with the first at t = 0 (undiscounted)
    pub cash_flows: Vec<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpvOutput {
    pub npv: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcfInput {
    /// Discount rate in percent
    pub discount_rate: Rate,
    /// Forecast cash flows with the first at t = 1
    pub cash_flows: Vec<Money>,
    /// Perpetual growth as a fraction (0.02 = 2%). Ignored when a multiple is given.
    #[serde(default)]
    pub terminal_growth: Rate,
    /// Exit multiple applied to the final cash flow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal_multiple: Option<Multiple>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcfOutput {
    /// PV of the explicit forecast
    pub present_value: Money,
    /// Undiscounted terminal value at the final forecast year
    pub terminal_value: Money,
    pub pv_terminal_value: Money,
    /// present_value + pv_terminal_value
    pub total_value: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Net present value, first flow at t = 0.
pub fn calculate_npv(input: &NpvInput) -> FinkitResult<ComputationOutput<NpvOutput>> {
    let start = Instant::now();

    if input.cash_flows.is_empty() {
        return Err(FinkitError::invalid("cash_flows", "At least one cash flow is required"));
    }
    if input.discount_rate < Decimal::ZERO {
        return Err(FinkitError::invalid("discount_rate", "Cannot be negative"));
    }

    let npv = discounted_sum(&input.cash_flows, input.discount_rate / dec!(100), 0)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Net present value (t = 0 undiscounted)",
        input,
        Vec::new(),
        elapsed,
        NpvOutput { npv },
    ))
}

/// Discounted cash flow with a Gordon-growth or exit-multiple terminal value.
pub fn calculate_dcf(input: &DcfInput) -> FinkitResult<ComputationOutput<DcfOutput>> {
    let start = Instant::now();

    let last = match input.cash_flows.last() {
        Some(cf) => *cf,
        None => {
            return Err(FinkitError::invalid(
                "cash_flows",
                "At least one cash flow is required",
            ))
        }
    };
    if input.discount_rate < Decimal::ZERO {
        return Err(FinkitError::invalid("discount_rate", "Cannot be negative"));
    }
    if input.terminal_growth < dec!(-0.99) {
        return Err(FinkitError::invalid("terminal_growth", "Must be at least -0.99"));
    }

    let rate = input.discount_rate / dec!(100);
    let present_value = discounted_sum(&input.cash_flows, rate, 1)?;

    let terminal_value = match input.terminal_multiple {
        Some(multiple) => last.checked_mul(multiple).ok_or_else(out_of_range)?,
        None => {
            if rate <= input.terminal_growth {
                return Err(FinkitError::InvalidInput {
                    field: "terminal_growth".into(),
                    reason: format!(
                        "discount rate ({rate}) must exceed terminal growth ({})",
                        input.terminal_growth
                    ),
                });
            }
            last.checked_mul(Decimal::ONE + input.terminal_growth)
                .and_then(|v| v.checked_div(rate - input.terminal_growth))
                .ok_or_else(out_of_range)?
        }
    };

    let n = input.cash_flows.len() as u32;
    let pv_terminal_value = DiscountFactor::new(rate, n).apply(terminal_value);
    let total_value = present_value
        .checked_add(pv_terminal_value)
        .ok_or_else(out_of_range)?;

    let output = DcfOutput {
        present_value,
        terminal_value,
        pv_terminal_value,
        total_value,
    };

    let methodology = if input.terminal_multiple.is_some() {
        "DCF with exit-multiple terminal value"
    } else {
        "DCF with Gordon growth terminal value"
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, Vec::new(), elapsed, output))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Σ cf_i / (1+r)^(i + offset)
fn discounted_sum(cash_flows: &[Money], rate: Rate, offset: u32) -> FinkitResult<Money> {
    let mut factor = DiscountFactor::new(rate, offset);
    let mut total = Decimal::ZERO;
    for cf in cash_flows {
        total = total
            .checked_add(factor.apply(*cf))
            .ok_or_else(out_of_range)?;
        factor.step();
    }
    Ok(total)
}

/// Discounting by (1+r)^t, advanced one period at a time.
///
/// While the power fits in a `Decimal`, values are divided by it exactly.
/// Past that point the growth stays frozen and the remaining periods are
/// carried as a running product of 1/(1+r), which shrinks toward zero
/// instead of overflowing. Requires r >= 0.
struct DiscountFactor {
    one_plus_r: Decimal,
    growth: Decimal,
    shrink: Option<Decimal>,
}

impl DiscountFactor {
    fn new(rate: Rate, periods: u32) -> Self {
        let mut factor = DiscountFactor {
            one_plus_r: Decimal::ONE + rate,
            growth: Decimal::ONE,
            shrink: None,
        };
        for _ in 0..periods {
            factor.step();
        }
        factor
    }

    fn step(&mut self) {
        self.shrink = match self.shrink {
            Some(s) => Some(s / self.one_plus_r),
            None => match self.growth.checked_mul(self.one_plus_r) {
                Some(g) => {
                    self.growth = g;
                    None
                }
                None => Some(Decimal::ONE / self.one_plus_r),
            },
        };
    }

    fn apply(&self, value: Money) -> Money {
        match self.shrink {
            Some(s) => value / self.growth * s,
            None => value / self.growth,
        }
    }
}

fn out_of_range() -> FinkitError {
    FinkitError::invalid("cash_flows", "Values exceed the representable decimal range")
}
