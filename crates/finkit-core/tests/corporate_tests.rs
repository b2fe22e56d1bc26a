use finkit_core::corporate::{
    calculate_capm, calculate_comps, calculate_dcf, calculate_irr, calculate_npv,
    calculate_wacc, CapmInput, CompsInput, DcfInput, IrrInput, NpvInput, WaccInput,
};
use finkit_core::FinkitError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Cost of capital
// ===========================================================================

#[test]
fn test_capm_feeds_wacc() {
    let ke = calculate_capm(&CapmInput {
        risk_free_rate: dec!(4.25),
        beta: dec!(1.1),
        market_return: dec!(9.75),
    })
    .unwrap()
    .result
    .cost_of_equity;
    // 4.25 + 1.1 * 5.5
    assert_eq!(ke, dec!(10.30));

    let out = calculate_wacc(&WaccInput {
        cost_of_equity: ke,
        cost_of_debt: dec!(6),
        tax_rate: dec!(0.21),
        equity_value: dec!(700),
        debt_value: dec!(300),
    })
    .unwrap();
    // 0.7 * 10.30 + 0.3 * 4.74
    assert_eq!(out.result.wacc, dec!(8.632));
    assert_eq!(out.result.equity_weight + out.result.debt_weight, Decimal::ONE);
    assert_eq!(out.metadata.precision, "rust_decimal_128bit");
}

// ===========================================================================
// NPV / IRR
// ===========================================================================

#[test]
fn test_irr_single_period() {
    let out = calculate_irr(&IrrInput {
        cash_flows: vec![-1000.0, 1100.0],
        guess: 0.1,
    })
    .unwrap()
    .result;
    assert!((out.irr - 10.0).abs() < 1e-6);
}

#[test]
fn test_irr_consistent_with_npv() {
    let flows = [-50_000.0, 12_000.0, 15_000.0, 18_000.0, 21_000.0];
    let out = calculate_irr(&IrrInput {
        cash_flows: flows.to_vec(),
        guess: 0.1,
    })
    .unwrap()
    .result;
    assert!(out.converged);

    let npv = calculate_npv(&NpvInput {
        discount_rate: Decimal::try_from(out.irr).unwrap(),
        cash_flows: flows.iter().map(|cf| Decimal::try_from(*cf).unwrap()).collect(),
    })
    .unwrap()
    .result
    .npv;
    assert!(npv.abs() < dec!(0.001), "NPV at IRR was {npv}");
}

#[test]
fn test_irr_far_guess_still_finds_root() {
    // a 5000% guess sends Newton off; the bisection fallback recovers the par rate
    let out = calculate_irr(&IrrInput {
        cash_flows: vec![-100.0, 10.0, 10.0, 110.0],
        guess: 50.0,
    })
    .unwrap()
    .result;
    assert!((out.irr - 10.0).abs() < 1e-5, "got {} via {:?}", out.irr, out.method);
}

// ===========================================================================
// DCF / comps
// ===========================================================================

#[test]
fn test_dcf_total_is_sum_of_parts() {
    let out = calculate_dcf(&DcfInput {
        discount_rate: dec!(9),
        cash_flows: vec![dec!(100), dec!(110), dec!(121)],
        terminal_growth: dec!(0.025),
        terminal_multiple: None,
    })
    .unwrap()
    .result;
    assert_eq!(out.total_value, out.present_value + out.pv_terminal_value);
    assert!(out.terminal_value > out.pv_terminal_value);
}

#[test]
fn test_dcf_growth_exceeding_rate_is_invalid() {
    let err = calculate_dcf(&DcfInput {
        discount_rate: dec!(3),
        cash_flows: vec![dec!(100)],
        terminal_growth: dec!(0.04),
        terminal_multiple: None,
    })
    .unwrap_err();
    assert!(matches!(err, FinkitError::InvalidInput { .. }));
}

#[test]
fn test_comps_ordering() {
    let out = calculate_comps(&CompsInput {
        metric: dec!(10),
        multiples: vec![dec!(7), dec!(9), dec!(5)],
    })
    .unwrap()
    .result;
    assert_eq!((out.low, out.median, out.high), (dec!(50), dec!(70), dec!(90)));
    assert!(out.low <= out.median && out.median <= out.high);
}
