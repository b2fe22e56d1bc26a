use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinkitError;
use crate::guardrails::risk_warnings;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::FinkitResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioInput {
    pub base_value: Money,
    /// Percent shocks, one outcome each
    pub shocks: Vec<Rate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutput {
    /// Same order as the input shocks
    pub outcomes: Vec<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityInput {
    pub base_value: Money,
    /// Percent change applied to the base
    pub change: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub new_value: Money,
    /// (new - base) / base as a fraction; zero when the base is zero
    pub percent_change: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressTestInput {
    pub base_value: Money,
    /// Peak-to-trough loss as a fraction in [0, 1]
    pub drawdown: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressTestOutput {
    pub stressed_value: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// outcome_i = base * (1 + shock_i / 100)
pub fn run_scenarios(input: &ScenarioInput) -> FinkitResult<ComputationOutput<ScenarioOutput>> {
    let start = Instant::now();
    validate_base(input.base_value)?;
    if input.shocks.is_empty() {
        return Err(FinkitError::invalid("shocks", "At least one shock is required"));
    }

    let outcomes = input
        .shocks
        .iter()
        .map(|shock| apply_pct(input.base_value, *shock))
        .collect();

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Percentage shocks applied to a base value",
        input,
        Vec::new(),
        elapsed,
        ScenarioOutput { outcomes },
    ))
}

pub fn run_sensitivity(
    input: &SensitivityInput,
) -> FinkitResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    validate_base(input.base_value)?;

    let new_value = apply_pct(input.base_value, input.change);
    let percent_change = if input.base_value.is_zero() {
        Decimal::ZERO
    } else {
        (new_value - input.base_value) / input.base_value
    };
    let warnings = risk_warnings(input.change.to_f64(), None, None);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Single-factor sensitivity",
        input,
        warnings,
        elapsed,
        SensitivityOutput {
            new_value,
            percent_change,
        },
    ))
}

/// stressed = base * (1 - drawdown)
pub fn run_stress_test(
    input: &StressTestInput,
) -> FinkitResult<ComputationOutput<StressTestOutput>> {
    let start = Instant::now();
    validate_base(input.base_value)?;
    if input.drawdown < Decimal::ZERO || input.drawdown > Decimal::ONE {
        return Err(FinkitError::InvalidInput {
            field: "drawdown".into(),
            reason: "Drawdown must be between 0 and 1".into(),
        });
    }

    let stressed_value = input.base_value * (Decimal::ONE - input.drawdown);
    let warnings = risk_warnings(None, (input.drawdown * dec!(100)).to_f64(), None);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fractional drawdown stress",
        input,
        warnings,
        elapsed,
        StressTestOutput { stressed_value },
    ))
}

fn apply_pct(base: Money, pct: Rate) -> Money {
    base * (Decimal::ONE + pct / dec!(100))
}

fn validate_base(base_value: Money) -> FinkitResult<()> {
    if base_value < Decimal::ZERO {
        return Err(FinkitError::invalid("base_value", "Cannot be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scenario_is_linear() {
        let input = ScenarioInput {
            base_value: dec!(100),
            shocks: vec![dec!(-10), dec!(0), dec!(10)],
        };
        let out = run_scenarios(&input).unwrap();
        assert_eq!(out.result.outcomes, vec![dec!(90), dec!(100), dec!(110)]);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_sensitivity_percent_change_is_fraction() {
        let input = SensitivityInput {
            base_value: dec!(200),
            change: dec!(15),
        };
        let out = run_sensitivity(&input).unwrap().result;
        assert_eq!(out.new_value, dec!(230));
        assert_eq!(out.percent_change, dec!(0.15));
    }

    #[test]
    fn test_sensitivity_zero_base() {
        let input = SensitivityInput {
            base_value: Decimal::ZERO,
            change: dec!(50),
        };
        let out = run_sensitivity(&input).unwrap();
        assert_eq!(out.result.percent_change, Decimal::ZERO);
        assert_eq!(out.warnings[0].code, "risk.extreme_mean");
    }

    #[test]
    fn test_stress_test() {
        let input = StressTestInput {
            base_value: dec!(1000),
            drawdown: dec!(0.2),
        };
        let out = run_stress_test(&input).unwrap();
        assert_eq!(out.result.stressed_value, dec!(800));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_severe_drawdown_flags_volatility() {
        let input = StressTestInput {
            base_value: dec!(1000),
            drawdown: dec!(0.9),
        };
        let out = run_stress_test(&input).unwrap();
        assert_eq!(out.warnings[0].code, "risk.extreme_vol");
    }

    #[test]
    fn test_drawdown_out_of_range() {
        let input = StressTestInput {
            base_value: dec!(1000),
            drawdown: dec!(1.5),
        };
        assert!(run_stress_test(&input).is_err());
    }
}
