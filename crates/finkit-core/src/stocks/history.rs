use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::time::Instant;

use crate::error::FinkitError;
use crate::types::{with_metadata_f64, ComputationOutput, WarningItem};
use crate::FinkitResult;

/// Days between the latest price and `as_of` before data counts as stale.
pub const DEFAULT_STALE_AFTER_DAYS: i64 = 5;

const PORTFOLIO: &str = "PORTFOLIO";

// ---------------------------------------------------------------------------
// Data seams
// ---------------------------------------------------------------------------

/// One closing price. Serializes as a `[date, price]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(NaiveDate, f64)", into = "(NaiveDate, f64)")]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl From<(NaiveDate, f64)> for PricePoint {
    fn from((date, price): (NaiveDate, f64)) -> Self {
        PricePoint { date, price }
    }
}

impl From<PricePoint> for (NaiveDate, f64) {
    fn from(point: PricePoint) -> Self {
        (point.date, point.price)
    }
}

/// A previously fetched series and the day it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedHistory {
    pub fetched_at: NaiveDate,
    pub points: Vec<PricePoint>,
}

/// Supplier of daily closing prices.
pub trait HistorySource {
    /// Short identifier reported in outputs, e.g. `csv`.
    fn name(&self) -> &str;

    /// Prices for `ticker` in `[start, end]`, ascending by date, all positive.
    fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> FinkitResult<Vec<PricePoint>>;
}

/// Cache keyed by ticker and requested window.
pub trait HistoryStore {
    fn get(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> FinkitResult<Option<CachedHistory>>;

    fn put(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        history: &CachedHistory,
    ) -> FinkitResult<()>;
}

/// The injected collaborators for a history or backtest run.
pub struct MarketData<'a> {
    pub source: &'a dyn HistorySource,
    pub store: &'a dyn HistoryStore,
    pub stale_after_days: i64,
}

impl<'a> MarketData<'a> {
    pub fn new(source: &'a dyn HistorySource, store: &'a dyn HistoryStore) -> Self {
        MarketData {
            source,
            store,
            stale_after_days: DEFAULT_STALE_AFTER_DAYS,
        }
    }

    pub fn with_stale_after_days(mut self, days: i64) -> Self {
        self.stale_after_days = days;
        self
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockHistoryInput {
    pub tickers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Look-back when `start_date` is omitted
    #[serde(default = "default_period_years")]
    pub period_years: u32,
    /// Portfolio weights, normalized to sum to one. Equal when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<f64>>,
    /// Reference date for the default window and staleness; today when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockHistoryPoint {
    pub date: NaiveDate,
    /// Absent for the synthetic portfolio series
    pub price: Option<f64>,
    /// 100 at the series' first point
    pub normalized: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockHistorySeries {
    pub name: String,
    pub points: Vec<StockHistoryPoint>,
    pub last_updated: NaiveDate,
    pub stale: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockHistoryOutput {
    pub source: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// One series per ticker followed by `PORTFOLIO`
    pub series: Vec<StockHistorySeries>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockBacktestInput {
    pub tickers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_period_years")]
    pub period_years: u32,
    /// Invested on the first common trading date
    #[serde(default)]
    pub lump_sum: f64,
    /// Invested every `periodic_months` months
    #[serde(default)]
    pub periodic_amount: f64,
    #[serde(default = "default_periodic_months")]
    pub periodic_months: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestPoint {
    pub date: NaiveDate,
    /// Cumulative contributions
    pub invested: f64,
    pub value: f64,
    /// value - invested
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockBacktestOutput {
    pub source: String,
    /// First common trading date
    pub start_date: NaiveDate,
    /// Last common trading date
    pub end_date: NaiveDate,
    pub final_invested: f64,
    pub final_value: f64,
    pub final_revenue: f64,
    /// Revenue over invested in percent; zero when nothing was invested
    pub final_return_percent: f64,
    pub timeline: Vec<BacktestPoint>,
    pub last_updated: NaiveDate,
    pub stale: bool,
}

fn default_period_years() -> u32 {
    5
}

fn default_periodic_months() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Per-ticker price history normalized to 100, plus a weighted portfolio
/// series over the dates every ticker has in common.
pub fn stock_history(
    input: &StockHistoryInput,
    market: &MarketData<'_>,
) -> FinkitResult<ComputationOutput<StockHistoryOutput>> {
    let start_time = Instant::now();

    let tickers = normalize_tickers(&input.tickers)?;
    let as_of = input.as_of.unwrap_or_else(today);
    let (start, end) = resolve_window(input.start_date, input.end_date, input.period_years, as_of)?;
    let weights = normalize_weights(tickers.len(), input.weights.as_deref())?;
    let loaded = load_histories(&tickers, start, end, as_of, market)?;
    let frame = PriceFrame::new(&loaded.histories)?;

    let mut series: Vec<StockHistorySeries> = loaded
        .histories
        .iter()
        .map(|(ticker, points)| {
            // loader guarantees a non-empty series
            let base = points[0].price;
            let last = points[points.len() - 1].date;
            StockHistorySeries {
                name: ticker.clone(),
                points: points
                    .iter()
                    .map(|p| StockHistoryPoint {
                        date: p.date,
                        price: Some(p.price),
                        normalized: p.price / base * 100.0,
                    })
                    .collect(),
                last_updated: last,
                stale: is_stale(last, as_of, market.stale_after_days),
            }
        })
        .collect();

    let first = frame.dates[0];
    let portfolio_points = frame
        .dates
        .iter()
        .map(|date| {
            let normalized = frame
                .prices
                .iter()
                .zip(&weights)
                .map(|(prices, w)| w * prices[date] / prices[&first] * 100.0)
                .sum::<f64>();
            StockHistoryPoint {
                date: *date,
                price: None,
                normalized,
            }
        })
        .collect();
    series.push(StockHistorySeries {
        name: PORTFOLIO.to_string(),
        points: portfolio_points,
        last_updated: loaded.last_updated,
        stale: is_stale(loaded.last_updated, as_of, market.stale_after_days),
    });

    let output = StockHistoryOutput {
        source: market.source.name().to_string(),
        start_date: start,
        end_date: end,
        series,
    };

    let elapsed = start_time.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "Prices normalized to 100 at the first observation; portfolio over common dates",
        input,
        loaded.warnings,
        elapsed,
        output,
    ))
}

/// Replay a lump sum and/or periodic contributions over historical prices.
///
/// The lump sum buys on the first common date. A periodic contribution buys
/// on the first common date of every month whose offset from the first
/// month is a multiple of `periodic_months`. Each contribution is split by
/// weight and converted to shares at that day's price.
pub fn stock_backtest(
    input: &StockBacktestInput,
    market: &MarketData<'_>,
) -> FinkitResult<ComputationOutput<StockBacktestOutput>> {
    let start_time = Instant::now();

    validate_backtest(input)?;
    let tickers = normalize_tickers(&input.tickers)?;
    let as_of = input.as_of.unwrap_or_else(today);
    let (start, end) = resolve_window(input.start_date, input.end_date, input.period_years, as_of)?;
    let weights = normalize_weights(tickers.len(), input.weights.as_deref())?;
    let loaded = load_histories(&tickers, start, end, as_of, market)?;
    let frame = PriceFrame::new(&loaded.histories)?;

    let contribution_dates = contribution_dates(&frame.dates, input.periodic_months);
    let mut shares = vec![0.0; tickers.len()];
    let mut invested = 0.0;
    let mut timeline = Vec::with_capacity(frame.dates.len());

    for (idx, date) in frame.dates.iter().enumerate() {
        let mut contribution = 0.0;
        if idx == 0 && input.lump_sum > 0.0 {
            contribution += input.lump_sum;
        }
        if input.periodic_amount > 0.0 && contribution_dates.contains(date) {
            contribution += input.periodic_amount;
        }
        if contribution > 0.0 {
            invested += contribution;
            for ((held, prices), w) in shares.iter_mut().zip(&frame.prices).zip(&weights) {
                *held += contribution * w / prices[date];
            }
        }

        let value: f64 = shares
            .iter()
            .zip(&frame.prices)
            .map(|(held, prices)| held * prices[date])
            .sum();
        timeline.push(BacktestPoint {
            date: *date,
            invested,
            value,
            revenue: value - invested,
        });
    }

    let (first, last) = match (timeline.first(), timeline.last()) {
        (Some(first), Some(last)) => (first.date, last.clone()),
        _ => {
            return Err(FinkitError::InsufficientData(
                "No overlapping dates across requested tickers".into(),
            ))
        }
    };
    let final_return_percent = if last.invested > 0.0 {
        last.revenue / last.invested * 100.0
    } else {
        0.0
    };

    let output = StockBacktestOutput {
        source: market.source.name().to_string(),
        start_date: first,
        end_date: last.date,
        final_invested: last.invested,
        final_value: last.value,
        final_revenue: last.revenue,
        final_return_percent,
        timeline,
        last_updated: loaded.last_updated,
        stale: is_stale(loaded.last_updated, as_of, market.stale_after_days),
    };

    let elapsed = start_time.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "Historical backtest of lump-sum and periodic contributions",
        input,
        loaded.warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

struct LoadedHistories {
    /// In request order
    histories: Vec<(String, Vec<PricePoint>)>,
    last_updated: NaiveDate,
    warnings: Vec<WarningItem>,
}

fn load_histories(
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
    as_of: NaiveDate,
    market: &MarketData<'_>,
) -> FinkitResult<LoadedHistories> {
    let mut histories = Vec::with_capacity(tickers.len());
    let mut warnings = Vec::new();
    let mut last_updated = start;

    for ticker in tickers {
        let points = match fetch_checked(market.source, ticker, start, end) {
            Ok(points) => {
                let cached = CachedHistory {
                    fetched_at: as_of,
                    points: points.clone(),
                };
                if let Err(e) = market.store.put(ticker, start, end, &cached) {
                    tracing::warn!(ticker = %ticker, error = %e, "Failed to cache price history");
                }
                points
            }
            Err(fetch_err) => {
                tracing::warn!(ticker = %ticker, error = %fetch_err, "Price fetch failed, trying cache");
                let cached = market
                    .store
                    .get(ticker, start, end)
                    .and_then(|hit| match hit {
                        Some(cached) => Ok(Some((
                            cached.fetched_at,
                            check_history(ticker, cached.points)?,
                        ))),
                        None => Ok(None),
                    });
                match cached {
                    Ok(Some((fetched_at, points))) => {
                        warnings.push(WarningItem::new(
                            "stocks.cache_fallback",
                            format!(
                                "Using cached data for {ticker} after fetch failure: {fetch_err} (cached on {fetched_at})"
                            ),
                        ));
                        points
                    }
                    Ok(None) => return Err(fetch_err),
                    Err(cache_err) => {
                        tracing::warn!(ticker = %ticker, error = %cache_err, "Cached history unusable");
                        return Err(fetch_err);
                    }
                }
            }
        };

        if let Some(last) = points.last() {
            last_updated = last_updated.max(last.date);
        }
        histories.push((ticker.clone(), points));
    }

    let stale_days = (as_of - last_updated).num_days();
    if stale_days > market.stale_after_days {
        warnings.push(WarningItem::new(
            "stocks.stale_data",
            format!("Latest market data is {stale_days} days old (last date {last_updated})."),
        ));
    }

    tracing::debug!(tickers = tickers.len(), %start, %end, "Loaded price histories");
    Ok(LoadedHistories {
        histories,
        last_updated,
        warnings,
    })
}

/// Fetch and enforce the source contract.
fn fetch_checked(
    source: &dyn HistorySource,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> FinkitResult<Vec<PricePoint>> {
    let points = source.fetch_history(ticker, start, end)?;
    check_history(ticker, points)
}

/// Non-empty, ascending, positive. Applied to fresh and cached points alike.
fn check_history(ticker: &str, points: Vec<PricePoint>) -> FinkitResult<Vec<PricePoint>> {
    if points.is_empty() {
        return Err(FinkitError::DataSource(format!(
            "No usable close prices for {ticker}"
        )));
    }
    if points.iter().any(|p| !p.price.is_finite() || p.price <= 0.0) {
        return Err(FinkitError::DataSource(format!(
            "Non-positive price in history for {ticker}"
        )));
    }
    if points.windows(2).any(|w| w[1].date <= w[0].date) {
        return Err(FinkitError::DataSource(format!(
            "History for {ticker} is not in ascending date order"
        )));
    }
    Ok(points)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Price lookups over the dates every ticker shares.
struct PriceFrame {
    dates: Vec<NaiveDate>,
    /// One map per ticker, request order
    prices: Vec<BTreeMap<NaiveDate, f64>>,
}

impl PriceFrame {
    fn new(histories: &[(String, Vec<PricePoint>)]) -> FinkitResult<Self> {
        let prices: Vec<BTreeMap<NaiveDate, f64>> = histories
            .iter()
            .map(|(_, points)| points.iter().map(|p| (p.date, p.price)).collect())
            .collect();

        let mut common: Option<BTreeSet<NaiveDate>> = None;
        for map in &prices {
            let dates: BTreeSet<NaiveDate> = map.keys().copied().collect();
            common = Some(match common {
                None => dates,
                Some(acc) => acc.intersection(&dates).copied().collect(),
            });
        }

        let dates: Vec<NaiveDate> = common.unwrap_or_default().into_iter().collect();
        if dates.is_empty() {
            return Err(FinkitError::InsufficientData(
                "No overlapping dates across requested tickers".into(),
            ));
        }
        Ok(PriceFrame { dates, prices })
    }
}

fn contribution_dates(dates: &[NaiveDate], periodic_months: u32) -> HashSet<NaiveDate> {
    let Some(base) = dates.first() else {
        return HashSet::new();
    };
    let mut seen_months = HashSet::new();
    let mut out = HashSet::new();
    for date in dates {
        if !seen_months.insert((date.year(), date.month())) {
            continue;
        }
        let offset = (date.year() - base.year()) * 12 + date.month() as i32 - base.month() as i32;
        if offset % periodic_months as i32 == 0 {
            out.insert(*date);
        }
    }
    out
}

fn normalize_tickers(tickers: &[String]) -> FinkitResult<Vec<String>> {
    if tickers.is_empty() {
        return Err(FinkitError::invalid("tickers", "At least one ticker is required"));
    }
    let mut out: Vec<String> = Vec::with_capacity(tickers.len());
    for raw in tickers {
        let ticker = raw.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(FinkitError::invalid("tickers", "Ticker cannot be empty"));
        }
        if out.contains(&ticker) {
            return Err(FinkitError::invalid(
                "tickers",
                format!("Duplicate ticker {ticker}"),
            ));
        }
        out.push(ticker);
    }
    Ok(out)
}

fn resolve_window(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    period_years: u32,
    as_of: NaiveDate,
) -> FinkitResult<(NaiveDate, NaiveDate)> {
    if period_years == 0 {
        return Err(FinkitError::invalid("period_years", "Must be at least 1"));
    }
    let end = end_date.unwrap_or(as_of);
    let start = start_date.unwrap_or_else(|| end - Duration::days(365 * period_years as i64));
    if start >= end {
        return Err(FinkitError::invalid(
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok((start, end))
}

fn normalize_weights(count: usize, weights: Option<&[f64]>) -> FinkitResult<Vec<f64>> {
    let Some(weights) = weights else {
        return Ok(vec![1.0 / count as f64; count]);
    };
    if weights.len() != count {
        return Err(FinkitError::invalid(
            "weights",
            "weights must match number of tickers",
        ));
    }
    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(FinkitError::invalid("weights", "weights sum must be positive"));
    }
    Ok(weights.iter().map(|w| w / total).collect())
}

fn validate_backtest(input: &StockBacktestInput) -> FinkitResult<()> {
    if input.lump_sum.is_nan() || input.lump_sum < 0.0 {
        return Err(FinkitError::invalid("lump_sum", "Cannot be negative"));
    }
    if input.periodic_amount.is_nan() || input.periodic_amount < 0.0 {
        return Err(FinkitError::invalid("periodic_amount", "Cannot be negative"));
    }
    if input.lump_sum <= 0.0 && input.periodic_amount <= 0.0 {
        return Err(FinkitError::invalid(
            "lump_sum / periodic_amount",
            "Provide lump_sum and/or periodic_amount",
        ));
    }
    if input.periodic_months == 0 {
        return Err(FinkitError::invalid("periodic_months", "Must be at least 1"));
    }
    Ok(())
}

fn is_stale(last: NaiveDate, as_of: NaiveDate, stale_after_days: i64) -> bool {
    (as_of - last).num_days() > stale_after_days
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stocks::store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_contribution_dates_first_trading_day_of_period() {
        let dates = vec![
            d(2024, 1, 3),
            d(2024, 1, 4),
            d(2024, 2, 1),
            d(2024, 3, 4),
            d(2024, 3, 5),
            d(2024, 4, 1),
        ];
        let monthly = contribution_dates(&dates, 1);
        assert_eq!(monthly.len(), 4);
        assert!(monthly.contains(&d(2024, 3, 4)));
        assert!(!monthly.contains(&d(2024, 3, 5)));

        let bimonthly = contribution_dates(&dates, 2);
        let mut got: Vec<_> = bimonthly.into_iter().collect();
        got.sort();
        assert_eq!(got, vec![d(2024, 1, 3), d(2024, 3, 4)]);
    }

    #[test]
    fn test_window_defaults_to_period_before_as_of() {
        let (start, end) = resolve_window(None, None, 1, d(2025, 6, 30)).unwrap();
        assert_eq!(end, d(2025, 6, 30));
        assert_eq!(start, d(2024, 6, 30));
        assert!(resolve_window(Some(d(2025, 1, 1)), Some(d(2025, 1, 1)), 5, d(2025, 6, 1)).is_err());
    }

    #[test]
    fn test_weights_normalized() {
        assert_eq!(normalize_weights(2, None).unwrap(), vec![0.5, 0.5]);
        assert_eq!(normalize_weights(2, Some(&[3.0, 1.0])).unwrap(), vec![0.75, 0.25]);
        assert!(normalize_weights(2, Some(&[1.0])).is_err());
        assert!(normalize_weights(2, Some(&[0.0, 0.0])).is_err());
    }

    #[test]
    fn test_tickers_upper_cased_and_unique() {
        let got = normalize_tickers(&["spy".into(), " qqq ".into()]).unwrap();
        assert_eq!(got, vec!["SPY".to_string(), "QQQ".to_string()]);
        assert!(normalize_tickers(&["spy".into(), "SPY".into()]).is_err());
        assert!(normalize_tickers(&[]).is_err());
    }

    struct Broken;

    impl HistorySource for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn fetch_history(
            &self,
            _: &str,
            _: NaiveDate,
            _: NaiveDate,
        ) -> FinkitResult<Vec<PricePoint>> {
            Err(FinkitError::DataSource("offline".into()))
        }
    }

    #[test]
    fn test_fetch_failure_without_cache_propagates() {
        let store = MemoryStore::default();
        let market = MarketData::new(&Broken, &store);
        let input = StockHistoryInput {
            tickers: vec!["SPY".into()],
            start_date: Some(d(2024, 1, 1)),
            end_date: Some(d(2024, 2, 1)),
            period_years: 5,
            weights: None,
            as_of: Some(d(2024, 2, 1)),
        };
        assert!(matches!(
            stock_history(&input, &market),
            Err(FinkitError::DataSource(_))
        ));
    }

    #[test]
    fn test_corrupt_cache_is_a_miss() {
        let store = MemoryStore::default();
        let (start, end) = (d(2024, 1, 1), d(2024, 2, 1));
        let bad = [
            vec![(d(2024, 1, 2), 100.0), (d(2024, 1, 3), 0.0)],
            vec![(d(2024, 1, 3), 100.0), (d(2024, 1, 2), 101.0)],
        ];
        for points in bad {
            store
                .put(
                    "SPY",
                    start,
                    end,
                    &CachedHistory {
                        fetched_at: end,
                        points: points.into_iter().map(PricePoint::from).collect(),
                    },
                )
                .unwrap();
            let market = MarketData::new(&Broken, &store);
            let input = StockHistoryInput {
                tickers: vec!["SPY".into()],
                start_date: Some(start),
                end_date: Some(end),
                period_years: 5,
                weights: None,
                as_of: Some(end),
            };
            match stock_history(&input, &market) {
                Err(FinkitError::DataSource(msg)) => assert_eq!(msg, "offline"),
                other => panic!("expected the fetch error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_price_point_serializes_as_pair() {
        let point = PricePoint {
            date: d(2024, 5, 1),
            price: 12.5,
        };
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, r#"["2024-05-01",12.5]"#);
        let back: PricePoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, point);
    }
}
