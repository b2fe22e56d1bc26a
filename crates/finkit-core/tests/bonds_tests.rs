use finkit_core::bonds::{
    bond_price, bond_ytm, build_ladder, calculate_convexity, calculate_duration,
    BondLadderInput, BondPriceInput, BondYtmInput,
};

fn bond(face: f64, coupon: f64, yield_rate: f64, years: u32, ppy: u32) -> BondPriceInput {
    BondPriceInput {
        face_value: face,
        coupon_rate: coupon,
        yield_rate,
        years,
        payments_per_year: ppy,
    }
}

// ===========================================================================
// Price / yield
// ===========================================================================

#[test]
fn test_price_ytm_round_trip_reference_bond() {
    let price = bond_price(&bond(1000.0, 5.0, 4.0, 5, 2)).unwrap().result.price;
    assert!(price > 1000.0, "premium bond expected, got {price}");

    let ytm = bond_ytm(&BondYtmInput {
        face_value: 1000.0,
        coupon_rate: 5.0,
        price,
        years: 5,
        payments_per_year: 2,
        guess: 0.05,
    })
    .unwrap()
    .result
    .yield_rate;
    assert!((ytm - 4.0).abs() / 4.0 < 1e-3, "got {ytm}");
}

#[test]
fn test_price_ytm_round_trip_across_frequencies() {
    for (coupon, yield_rate, years, ppy) in [
        (3.0, 7.5, 10, 1),
        (8.0, 2.0, 30, 2),
        (4.25, 4.25, 7, 4),
        (6.0, 11.0, 3, 12),
    ] {
        let price = bond_price(&bond(100.0, coupon, yield_rate, years, ppy))
            .unwrap()
            .result
            .price;
        let ytm = bond_ytm(&BondYtmInput {
            face_value: 100.0,
            coupon_rate: coupon,
            price,
            years,
            payments_per_year: ppy,
            guess: 0.05,
        })
        .unwrap()
        .result
        .yield_rate;
        assert!(
            (ytm - yield_rate).abs() / yield_rate < 1e-3,
            "{coupon}% {years}y x{ppy}: expected {yield_rate}, got {ytm}"
        );
    }
}

#[test]
fn test_price_decreases_with_yield() {
    let prices: Vec<f64> = [2.0, 4.0, 6.0, 8.0]
        .iter()
        .map(|y| bond_price(&bond(1000.0, 5.0, *y, 10, 2)).unwrap().result.price)
        .collect();
    assert!(prices.windows(2).all(|w| w[1] < w[0]));
}

#[test]
fn test_ytm_reports_coupon_warning() {
    let out = bond_ytm(&BondYtmInput {
        face_value: 1000.0,
        coupon_rate: 22.0,
        price: 1200.0,
        years: 60,
        payments_per_year: 2,
        guess: 0.05,
    })
    .unwrap();
    let codes: Vec<&str> = out.warnings.iter().map(|w| w.code.as_str()).collect();
    assert_eq!(codes, vec!["bonds.high_coupon", "bonds.long_maturity"]);
}

// ===========================================================================
// Duration / convexity
// ===========================================================================

#[test]
fn test_duration_rises_with_maturity() {
    let short = calculate_duration(&bond(1000.0, 5.0, 5.0, 2, 2)).unwrap().result;
    let long = calculate_duration(&bond(1000.0, 5.0, 5.0, 20, 2)).unwrap().result;
    assert!(short.macaulay_duration > 0.0);
    assert!(long.macaulay_duration > short.macaulay_duration);
    assert!(long.modified_duration < long.macaulay_duration);
}

#[test]
fn test_convexity_positive_and_rises_with_maturity() {
    let short = calculate_convexity(&bond(1000.0, 5.0, 5.0, 2, 2)).unwrap().result;
    let long = calculate_convexity(&bond(1000.0, 5.0, 5.0, 20, 2)).unwrap().result;
    assert!(short.convexity > 0.0);
    assert!(long.convexity > short.convexity);
}

#[test]
fn test_duration_convexity_price_approximation() {
    // ΔP/P ≈ -D_mod Δy + ½ C Δy²
    let base = bond(1000.0, 4.0, 5.0, 12, 2);
    let p0 = bond_price(&base).unwrap().result.price;
    let p1 = bond_price(&bond(1000.0, 4.0, 6.0, 12, 2)).unwrap().result.price;
    let d = calculate_duration(&base).unwrap().result.modified_duration;
    let c = calculate_convexity(&base).unwrap().result.convexity;
    let dy = 0.01;
    let estimate = -d * dy + 0.5 * c * dy * dy;
    let actual = (p1 - p0) / p0;
    assert!((estimate - actual).abs() < 1e-3, "estimate {estimate} vs actual {actual}");
}

// ===========================================================================
// Ladder
// ===========================================================================

#[test]
fn test_ladder_ordering_and_weighting() {
    let out = build_ladder(&BondLadderInput {
        maturities: vec![10, 2, 6, 4, 8],
        amounts: vec![10_000.0, 10_000.0, 10_000.0, 10_000.0, 10_000.0],
    })
    .unwrap()
    .result;
    assert!(out.schedule.windows(2).all(|w| w[0].maturity <= w[1].maturity));
    assert_eq!(out.total_invested, 50_000.0);
    assert!((out.weighted_maturity - 6.0).abs() < 1e-12);
}
