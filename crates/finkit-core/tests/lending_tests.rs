use finkit_core::goals::{
    solve_investment_goal, solve_loan_payoff_goal, GoalSolution, InvestmentGoalInput,
    LoanPayoffGoalInput,
};
use finkit_core::investments::{calculate_investment, InvestmentInput};
use finkit_core::loans::{amortization_schedule, calculate_amortization, calculate_loan, LoanInput};
use finkit_core::FinkitError;

// ===========================================================================
// Loans
// ===========================================================================

#[test]
fn test_amortization_conserves_principal_across_terms() {
    for (principal, rate, years, extra) in [
        (350_000.0, 6.875, 30, 0.0),
        (25_000.0, 4.5, 5, 100.0),
        (120_000.0, 0.0, 10, 0.0),
        (80_000.0, 12.0, 15, 2_000.0),
    ] {
        let input = LoanInput {
            principal,
            annual_rate: rate,
            years,
            extra_payment: extra,
        };
        let out = calculate_amortization(&input).unwrap().result;
        let schedule = &out.schedule;
        let principal_paid: f64 = schedule.iter().map(|r| r.principal).sum();
        assert!((principal_paid - principal).abs() < 1e-4);
        assert!(
            (out.summary.total_paid - out.summary.total_interest - principal).abs() < 1e-4,
            "conservation failed for {principal} @ {rate}%"
        );
        assert!(schedule.last().unwrap().balance.abs() < 1e-6);
        assert!(schedule.iter().all(|r| r.balance >= 0.0));
        assert_eq!(out.summary.years, schedule.len() as f64 / 12.0);
    }
}

#[test]
fn test_zero_rate_loan() {
    let out = calculate_loan(&LoanInput {
        principal: 36_000.0,
        annual_rate: 0.0,
        years: 3,
        extra_payment: 0.0,
    })
    .unwrap()
    .result;
    assert_eq!(out.monthly_payment, 1_000.0);
    assert_eq!(out.total_interest, 0.0);
    assert_eq!(out.total_paid, 36_000.0);
}

#[test]
fn test_loan_metadata_and_assumptions() {
    let input = LoanInput {
        principal: 10_000.0,
        annual_rate: 25.0,
        years: 2,
        extra_payment: 0.0,
    };
    let out = calculate_loan(&input).unwrap();
    assert_eq!(out.metadata.precision, "ieee754_f64");
    assert_eq!(out.assumptions["principal"], 10_000.0);
    assert_eq!(out.warnings[0].code, "loan.high_rate");
}

#[test]
fn test_extra_payment_monotonically_shortens_payoff() {
    let mut last = usize::MAX;
    for extra in [0.0, 100.0, 250.0, 500.0, 1_000.0] {
        let months = amortization_schedule(&LoanInput {
            principal: 200_000.0,
            annual_rate: 6.0,
            years: 30,
            extra_payment: extra,
        })
        .unwrap()
        .len();
        assert!(months <= last);
        last = months;
    }
}

#[test]
fn test_negative_principal_rejected_as_invalid_input() {
    let err = calculate_loan(&LoanInput {
        principal: -5.0,
        annual_rate: 5.0,
        years: 1,
        extra_payment: 0.0,
    })
    .unwrap_err();
    assert!(matches!(err, FinkitError::InvalidInput { ref field, .. } if field == "principal"));
}

// ===========================================================================
// Investments
// ===========================================================================

#[test]
fn test_zero_rate_investment() {
    let out = calculate_investment(&InvestmentInput {
        initial: 2_500.0,
        monthly: 250.0,
        annual_rate: 0.0,
        years: 4,
    })
    .unwrap()
    .result;
    assert_eq!(out.final_value, 2_500.0 + 250.0 * 48.0);
    assert_eq!(out.total_growth, 0.0);
}

#[test]
fn test_investment_growth_identity() {
    let out = calculate_investment(&InvestmentInput {
        initial: 10_000.0,
        monthly: 500.0,
        annual_rate: 6.0,
        years: 25,
    })
    .unwrap()
    .result;
    assert!((out.total_growth - (out.final_value - out.total_contributions)).abs() < 1e-9);
    assert_eq!(out.total_contributions, 10_000.0 + 500.0 * 300.0);
}

// ===========================================================================
// Goals
// ===========================================================================

#[test]
fn test_monthly_and_rate_goals_agree() {
    // solve for the monthly amount at 7%, then solve the rate back from it
    let monthly = match solve_investment_goal(&InvestmentGoalInput {
        target_value: 250_000.0,
        initial: 20_000.0,
        years: 15,
        monthly: None,
        annual_rate: Some(7.0),
    })
    .unwrap()
    .result
    .solution
    {
        GoalSolution::RequiredMonthly(m) => m,
        other => panic!("unexpected {other:?}"),
    };

    let rate = match solve_investment_goal(&InvestmentGoalInput {
        target_value: 250_000.0,
        initial: 20_000.0,
        years: 15,
        monthly: Some(monthly),
        annual_rate: None,
    })
    .unwrap()
    .result
    .solution
    {
        GoalSolution::RequiredAnnualRate(r) => r,
        other => panic!("unexpected {other:?}"),
    };
    assert!((rate - 7.0).abs() < 1e-4, "got {rate}");
}

#[test]
fn test_loan_payoff_goal_monotonic_in_target() {
    let mut previous = 0.0;
    for target_years in [25, 20, 15, 10, 5] {
        let out = solve_loan_payoff_goal(&LoanPayoffGoalInput {
            principal: 300_000.0,
            annual_rate: 5.5,
            current_years: 30,
            target_years,
        })
        .unwrap()
        .result;
        assert!(
            out.required_extra_payment > previous,
            "{target_years}y needs {} <= {previous}",
            out.required_extra_payment
        );
        assert!(out.achieved_years <= target_years as f64 + 1e-4);
        previous = out.required_extra_payment;
    }
}

#[test]
fn test_loan_payoff_goal_warns_against_contractual_term() {
    let out = solve_loan_payoff_goal(&LoanPayoffGoalInput {
        principal: 400_000.0,
        annual_rate: 4.0,
        current_years: 45,
        target_years: 30,
    })
    .unwrap();
    assert!(out.result.required_extra_payment > 0.0);
    assert!(out.warnings.iter().any(|w| w.code == "loan.long_term"));
}
