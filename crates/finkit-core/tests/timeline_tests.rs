use finkit_core::bonds::BondPriceInput;
use finkit_core::investments::InvestmentInput;
use finkit_core::loans::LoanInput;
use finkit_core::stocks::StockProjectionInput;
use finkit_core::timeline::{build_timeline, TimelineRequest};
use pretty_assertions::assert_eq;

fn full_request(months: u32) -> TimelineRequest {
    TimelineRequest {
        months,
        include_loan: true,
        include_invest: true,
        include_bonds: true,
        include_stocks: true,
        loan: Some(LoanInput {
            principal: 20_000.0,
            annual_rate: 25.0,
            years: 3,
            extra_payment: 0.0,
        }),
        investment: Some(InvestmentInput {
            initial: 0.0,
            monthly: 0.0,
            annual_rate: 4.0,
            years: 2,
        }),
        bond: Some(BondPriceInput {
            face_value: 1000.0,
            coupon_rate: 22.0,
            yield_rate: 5.0,
            years: 2,
            payments_per_year: 4,
        }),
        stock: Some(StockProjectionInput {
            ticker: "vti".into(),
            initial: 1000.0,
            monthly: 50.0,
            annual_return: 7.0,
            years: 1,
            expense_ratio: 0.03,
        }),
    }
}

// ===========================================================================
// Grid shape
// ===========================================================================

#[test]
fn test_every_series_spans_the_horizon() {
    for months in [1, 12, 30, 60] {
        let out = build_timeline(&full_request(months)).unwrap().result;
        assert_eq!(out.months, months);
        let names: Vec<&str> = out.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Loan", "Investment", "Bonds", "Stocks/ETF"]);
        for s in &out.series {
            assert_eq!(s.points.len(), months as usize);
            assert_eq!(s.points[0].month, 1);
        }
        assert_eq!(out.net.len(), months as usize);
    }
}

#[test]
fn test_net_is_running_sum_across_series() {
    let out = build_timeline(&full_request(48)).unwrap().result;
    let mut running = 0.0;
    for (i, point) in out.net.iter().enumerate() {
        let month_sum: f64 = out.series.iter().map(|s| s.points[i].amount).sum();
        assert!((point.amount - month_sum).abs() < 1e-9);
        running += month_sum;
        assert!((point.running_total - running).abs() < 1e-6);
    }
}

#[test]
fn test_loan_outflow_stops_at_term() {
    let out = build_timeline(&full_request(48)).unwrap().result;
    let loan = &out.series[0].points;
    assert!(loan[0].amount < 0.0);
    assert!(loan[35].amount < 0.0);
    assert_eq!(loan[36].amount, 0.0);
}

#[test]
fn test_quarterly_coupons() {
    let out = build_timeline(&full_request(24)).unwrap().result;
    let bonds = &out.series[2].points;
    // 1000 * 22% / 4
    assert_eq!(bonds[2].amount, 55.0);
    assert_eq!(bonds[0].amount, 0.0);
    assert_eq!(bonds[23].amount, 1055.0);
}

// ===========================================================================
// Warnings
// ===========================================================================

#[test]
fn test_warnings_follow_product_order() {
    let out = build_timeline(&full_request(24)).unwrap();
    let codes: Vec<&str> = out.warnings.iter().map(|w| w.code.as_str()).collect();
    assert_eq!(
        codes,
        vec!["loan.high_rate", "invest.no_contrib", "bonds.high_coupon"]
    );
}

#[test]
fn test_excluded_products_drop_their_warnings() {
    let mut request = full_request(24);
    request.include_loan = false;
    request.include_bonds = false;
    let out = build_timeline(&request).unwrap();
    let codes: Vec<&str> = out.warnings.iter().map(|w| w.code.as_str()).collect();
    assert_eq!(codes, vec!["invest.no_contrib"]);
}

#[test]
fn test_invalid_product_input_fails_whole_timeline() {
    let mut request = full_request(12);
    if let Some(loan) = request.loan.as_mut() {
        loan.principal = -1.0;
    }
    assert!(build_timeline(&request).is_err());
    assert!(build_timeline(&full_request(0)).is_err());
}
