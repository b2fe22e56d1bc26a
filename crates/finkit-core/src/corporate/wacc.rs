use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinkitError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::FinkitResult;

/// Input parameters for the Weighted Average Cost of Capital.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaccInput {
    /// Cost of equity in percent
    pub cost_of_equity: Rate,
    /// Pre-tax cost of debt in percent
    pub cost_of_debt: Rate,
    /// Marginal tax rate as a fraction (0.25 = 25%)
    pub tax_rate: Rate,
    /// Market value of equity
    pub equity_value: Money,
    /// Market value of debt
    pub debt_value: Money,
}

/// Output of the WACC calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaccOutput {
    /// Weighted average cost of capital in percent
    pub wacc: Rate,
    pub equity_weight: Rate,
    pub debt_weight: Rate,
    /// Cost of debt after the tax shield, in percent
    pub after_tax_cost_of_debt: Rate,
}

/// Input parameters for the Capital Asset Pricing Model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapmInput {
    /// Risk-free rate in percent
    pub risk_free_rate: Rate,
    /// Equity beta (may be negative)
    pub beta: Decimal,
    /// Expected market return in percent
    pub market_return: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapmOutput {
    /// Required return on equity in percent
    pub cost_of_equity: Rate,
    /// market_return - risk_free_rate
    pub market_risk_premium: Rate,
}

/// WACC = We * Ke + Wd * Kd * (1 - t), weights from market values.
pub fn calculate_wacc(input: &WaccInput) -> FinkitResult<ComputationOutput<WaccOutput>> {
    let start = Instant::now();
    validate_wacc_input(input)?;

    let total = input.equity_value + input.debt_value;
    if total.is_zero() {
        return Err(FinkitError::InvalidInput {
            field: "equity_value + debt_value".into(),
            reason: "Capital structure must be positive".into(),
        });
    }

    let equity_weight = input.equity_value / total;
    let debt_weight = input.debt_value / total;
    let after_tax_cost_of_debt = input.cost_of_debt * (Decimal::ONE - input.tax_rate);
    let wacc = equity_weight * input.cost_of_equity + debt_weight * after_tax_cost_of_debt;

    let output = WaccOutput {
        wacc,
        equity_weight,
        debt_weight,
        after_tax_cost_of_debt,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "WACC from market-value weights",
        input,
        Vec::new(),
        elapsed,
        output,
    ))
}

/// Ke = Rf + beta * (Rm - Rf)
pub fn calculate_capm(input: &CapmInput) -> FinkitResult<ComputationOutput<CapmOutput>> {
    let start = Instant::now();

    if input.risk_free_rate < Decimal::ZERO {
        return Err(FinkitError::invalid("risk_free_rate", "Cannot be negative"));
    }
    if input.market_return < Decimal::ZERO {
        return Err(FinkitError::invalid("market_return", "Cannot be negative"));
    }

    let market_risk_premium = input.market_return - input.risk_free_rate;
    let output = CapmOutput {
        cost_of_equity: input.risk_free_rate + input.beta * market_risk_premium,
        market_risk_premium,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Capital Asset Pricing Model",
        input,
        Vec::new(),
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_wacc_input(input: &WaccInput) -> FinkitResult<()> {
    if input.cost_of_equity < Decimal::ZERO {
        return Err(FinkitError::invalid("cost_of_equity", "Cannot be negative"));
    }
    if input.cost_of_debt < Decimal::ZERO {
        return Err(FinkitError::invalid("cost_of_debt", "Cannot be negative"));
    }
    if input.tax_rate < Decimal::ZERO || input.tax_rate > dec!(1) {
        return Err(FinkitError::InvalidInput {
            field: "tax_rate".into(),
            reason: "Tax rate must be between 0 and 1".into(),
        });
    }
    if input.equity_value < Decimal::ZERO || input.debt_value < Decimal::ZERO {
        return Err(FinkitError::InvalidInput {
            field: "equity_value / debt_value".into(),
            reason: "Capital structure values cannot be negative".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_wacc_sixty_forty() {
        let input = WaccInput {
            cost_of_equity: dec!(10),
            cost_of_debt: dec!(5),
            tax_rate: dec!(0.25),
            equity_value: dec!(600),
            debt_value: dec!(400),
        };
        let out = calculate_wacc(&input).unwrap().result;
        assert_eq!(out.equity_weight, dec!(0.6));
        assert_eq!(out.after_tax_cost_of_debt, dec!(3.75));
        // 0.6*10 + 0.4*3.75
        assert_eq!(out.wacc, dec!(7.5));
    }

    #[test]
    fn test_wacc_all_equity() {
        let input = WaccInput {
            cost_of_equity: dec!(9),
            cost_of_debt: dec!(4),
            tax_rate: dec!(0.3),
            equity_value: dec!(1000),
            debt_value: Decimal::ZERO,
        };
        assert_eq!(calculate_wacc(&input).unwrap().result.wacc, dec!(9));
    }

    #[test]
    fn test_wacc_empty_capital_structure_rejected() {
        let input = WaccInput {
            cost_of_equity: dec!(9),
            cost_of_debt: dec!(4),
            tax_rate: dec!(0.3),
            equity_value: Decimal::ZERO,
            debt_value: Decimal::ZERO,
        };
        assert!(calculate_wacc(&input).is_err());
    }

    #[test]
    fn test_wacc_tax_rate_out_of_range() {
        let input = WaccInput {
            cost_of_equity: dec!(9),
            cost_of_debt: dec!(4),
            tax_rate: dec!(25),
            equity_value: dec!(1),
            debt_value: dec!(1),
        };
        assert!(matches!(
            calculate_wacc(&input),
            Err(FinkitError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_capm() {
        let input = CapmInput {
            risk_free_rate: dec!(4),
            beta: dec!(1.2),
            market_return: dec!(9),
        };
        let out = calculate_capm(&input).unwrap();
        assert_eq!(out.result.cost_of_equity, dec!(10));
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }

    #[test]
    fn test_capm_negative_beta() {
        let input = CapmInput {
            risk_free_rate: dec!(3),
            beta: dec!(-0.5),
            market_return: dec!(7),
        };
        assert_eq!(calculate_capm(&input).unwrap().result.cost_of_equity, dec!(1));
    }
}
