use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::FinkitError;
use crate::FinkitResult;

use super::history::{CachedHistory, HistoryStore};

/// One JSON file per ticker and window: `<TICKER>_<YYYYMMDD>_<YYYYMMDD>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        JsonFileStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> PathBuf {
        self.root.join(format!(
            "{}_{}_{}.json",
            ticker.to_uppercase(),
            start.format("%Y%m%d"),
            end.format("%Y%m%d")
        ))
    }
}

impl HistoryStore for JsonFileStore {
    fn get(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> FinkitResult<Option<CachedHistory>> {
        let path = self.path_for(ticker, start, end);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        let history: CachedHistory = serde_json::from_str(&raw)?;
        Ok(Some(history))
    }

    fn put(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        history: &CachedHistory,
    ) -> FinkitResult<()> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(ticker, start, end);
        fs::write(path, serde_json::to_string(history)?)?;
        Ok(())
    }
}

type StoreKey = (String, NaiveDate, NaiveDate);

/// Process-local store, for callers that do not want a cache on disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<StoreKey, CachedHistory>>,
}

impl HistoryStore for MemoryStore {
    fn get(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> FinkitResult<Option<CachedHistory>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| FinkitError::DataSource("history store lock poisoned".into()))?;
        Ok(entries.get(&(ticker.to_uppercase(), start, end)).cloned())
    }

    fn put(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        history: &CachedHistory,
    ) -> FinkitResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| FinkitError::DataSource("history store lock poisoned".into()))?;
        entries.insert((ticker.to_uppercase(), start, end), history.clone());
        Ok(())
    }
}
