use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinkitError;
use crate::explain::afford_explanation;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::FinkitResult;

/// Monthly budget for a debt-to-income affordability check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordInput {
    /// Gross monthly income
    pub income_monthly: Money,
    /// Non-housing debt service per month
    pub debts_monthly: Money,
    /// Proposed monthly housing cost
    pub housing_cost: Money,
    /// Debt-to-income ceiling as a fraction in (0, 1]
    pub max_dti: Rate,
    /// Percent increase applied to the housing cost for the stressed case
    pub stress_rate: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordOutput {
    /// Housing budget left under the ceiling, floored at zero
    pub allowed_housing: Money,
    pub current_dti: Rate,
    pub stressed_dti: Rate,
    /// Both ratios at or under the ceiling
    pub affordable: bool,
}

/// Debt-to-income check at the current and a stressed housing cost.
pub fn calculate_affordability(input: &AffordInput) -> FinkitResult<ComputationOutput<AffordOutput>> {
    let start = Instant::now();
    validate(input)?;

    let income = input.income_monthly;
    let current_dti = (input.debts_monthly + input.housing_cost) / income;
    let stressed_housing = input.housing_cost * (Decimal::ONE + input.stress_rate / dec!(100));
    let stressed_dti = (input.debts_monthly + stressed_housing) / income;
    let allowed_housing = (income * input.max_dti - input.debts_monthly).max(Decimal::ZERO);

    let explanation = afford_explanation(
        as_f64(income),
        as_f64(input.debts_monthly),
        as_f64(input.housing_cost),
        as_f64(input.stress_rate),
        as_f64(current_dti),
        as_f64(stressed_dti),
        as_f64(allowed_housing),
    );
    let output = AffordOutput {
        allowed_housing,
        current_dti,
        stressed_dti,
        affordable: current_dti <= input.max_dti && stressed_dti <= input.max_dti,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Debt-to-income ratio at current and stressed housing cost",
        input,
        Vec::new(),
        elapsed,
        output,
    )
    .with_explanation(explanation))
}

fn as_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

fn validate(input: &AffordInput) -> FinkitResult<()> {
    if input.income_monthly <= Decimal::ZERO {
        return Err(FinkitError::invalid("income_monthly", "Must be positive"));
    }
    if input.debts_monthly < Decimal::ZERO {
        return Err(FinkitError::invalid("debts_monthly", "Cannot be negative"));
    }
    if input.housing_cost < Decimal::ZERO {
        return Err(FinkitError::invalid("housing_cost", "Cannot be negative"));
    }
    if input.max_dti <= Decimal::ZERO || input.max_dti > Decimal::ONE {
        return Err(FinkitError::InvalidInput {
            field: "max_dti".into(),
            reason: "Must be in (0, 1]".into(),
        });
    }
    if input.stress_rate < Decimal::ZERO {
        return Err(FinkitError::invalid("stress_rate", "Cannot be negative"));
    }
    Ok(())
}
