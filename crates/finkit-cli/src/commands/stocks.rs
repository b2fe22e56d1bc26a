use chrono::NaiveDate;
use clap::Args;
use serde_json::Value;

use finkit_core::stocks::{
    self, JsonFileStore, MarketData, StockBacktestInput, StockHistoryInput, StockProjectionInput,
};

use super::required;
use crate::config::CliConfig;
use crate::input;
use crate::prices::CsvHistorySource;

/// Arguments for a forward projection of one ticker
#[derive(Args)]
pub struct StockProjectArgs {
    #[arg(long)]
    pub ticker: Option<String>,

    #[arg(long, default_value = "0")]
    pub initial: f64,

    #[arg(long, default_value = "0")]
    pub monthly: f64,

    /// Expected annual return in percent, before fees
    #[arg(long)]
    pub annual_return: Option<f64>,

    #[arg(long)]
    pub years: Option<u32>,

    /// Annual expense ratio in percent
    #[arg(long, default_value = "0")]
    pub expense_ratio: f64,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Ticker set and window shared by history and backtest
#[derive(Args)]
pub struct WindowArgs {
    /// Tickers, comma separated
    #[arg(long, value_delimiter = ',')]
    pub tickers: Option<Vec<String>>,

    /// First date (YYYY-MM-DD); defaults to period-years before the end
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub end: Option<NaiveDate>,

    #[arg(long, default_value = "5")]
    pub period_years: u32,

    /// Portfolio weights, comma separated; normalized to sum to one
    #[arg(long, value_delimiter = ',')]
    pub weights: Option<Vec<f64>>,
}

/// Arguments for normalized price history
#[derive(Args)]
pub struct StockHistoryArgs {
    #[command(flatten)]
    pub window: WindowArgs,

    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a historical contribution backtest
#[derive(Args)]
pub struct StockBacktestArgs {
    #[command(flatten)]
    pub window: WindowArgs,

    /// Invested on the first common trading date
    #[arg(long, default_value = "0")]
    pub lump_sum: f64,

    /// Invested at the start of every contribution period
    #[arg(long, default_value = "0")]
    pub periodic_amount: f64,

    /// Months between periodic contributions
    #[arg(long, default_value = "1")]
    pub periodic_months: u32,

    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_stock_project(args: StockProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let projection: StockProjectionInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => StockProjectionInput {
            ticker: args.ticker.ok_or_else(|| required("ticker"))?,
            initial: args.initial,
            monthly: args.monthly,
            annual_return: args.annual_return.ok_or_else(|| required("annual-return"))?,
            years: args.years.ok_or_else(|| required("years"))?,
            expense_ratio: args.expense_ratio,
        },
    };
    Ok(serde_json::to_value(stocks::stock_projection(&projection)?)?)
}

pub fn run_stock_history(
    args: StockHistoryArgs,
    config: &CliConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let history: StockHistoryInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => {
            let window = args.window;
            StockHistoryInput {
                tickers: window.tickers.ok_or_else(|| required("tickers"))?,
                start_date: window.start,
                end_date: window.end,
                period_years: window.period_years,
                weights: window.weights,
                as_of: None,
            }
        }
    };

    let source = CsvHistorySource::new(&config.price_dir);
    let store = JsonFileStore::new(&config.cache_dir);
    let market = MarketData::new(&source, &store).with_stale_after_days(config.stale_after_days);
    Ok(serde_json::to_value(stocks::stock_history(&history, &market)?)?)
}

pub fn run_stock_backtest(
    args: StockBacktestArgs,
    config: &CliConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let backtest: StockBacktestInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => {
            let window = args.window;
            StockBacktestInput {
                tickers: window.tickers.ok_or_else(|| required("tickers"))?,
                start_date: window.start,
                end_date: window.end,
                period_years: window.period_years,
                lump_sum: args.lump_sum,
                periodic_amount: args.periodic_amount,
                periodic_months: args.periodic_months,
                weights: window.weights,
                as_of: None,
            }
        }
    };

    let source = CsvHistorySource::new(&config.price_dir);
    let store = JsonFileStore::new(&config.cache_dir);
    let market = MarketData::new(&source, &store).with_stale_after_days(config.stale_after_days);
    Ok(serde_json::to_value(stocks::stock_backtest(&backtest, &market)?)?)
}
