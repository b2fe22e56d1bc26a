//! Stock and ETF analytics: forward projection, historical performance and
//! contribution backtests.
//!
//! Price data comes through [`HistorySource`]; fetched series are cached
//! through [`HistoryStore`]. Both are injected, so nothing in here touches
//! the network or a fixed cache location.

pub mod history;
pub mod projection;
pub mod store;

pub use history::{
    stock_backtest, stock_history, BacktestPoint, CachedHistory, HistorySource, HistoryStore,
    MarketData, PricePoint, StockBacktestInput, StockBacktestOutput, StockHistoryInput,
    StockHistoryOutput, StockHistoryPoint, StockHistorySeries, DEFAULT_STALE_AFTER_DAYS,
};
pub use projection::{stock_projection, StockProjectionInput, StockProjectionOutput};
pub use store::{JsonFileStore, MemoryStore};
