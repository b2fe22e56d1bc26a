//! Price histories read from local CSV files.

use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use finkit_core::error::FinkitError;
use finkit_core::stocks::{HistorySource, PricePoint};
use finkit_core::FinkitResult;

/// Reads `<dir>/<TICKER>.csv` with a `date,price` header, ISO dates.
#[derive(Debug, Clone)]
pub struct CsvHistorySource {
    dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    date: String,
    price: f64,
}

impl CsvHistorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CsvHistorySource { dir: dir.into() }
    }

    fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", ticker.to_uppercase()))
    }
}

impl HistorySource for CsvHistorySource {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> FinkitResult<Vec<PricePoint>> {
        let path = self.path_for(ticker);
        let mut points = read_prices(&path)?;
        points.retain(|p| p.date >= start && p.date <= end);
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Ok(points)
    }
}

fn read_prices(path: &Path) -> FinkitResult<Vec<PricePoint>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| FinkitError::DataSource(format!("{}: {}", path.display(), e)))?;

    let mut points = Vec::new();
    for row in reader.deserialize::<PriceRow>() {
        let row = row.map_err(|e| FinkitError::DataSource(format!("{}: {}", path.display(), e)))?;
        let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d")?;
        points.push(PricePoint {
            date,
            price: row.price,
        });
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_reads_window_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("VTI.csv"),
            "date,price\n2024-01-03,101.5\n2024-01-02,100\n2023-12-29,99\n2024-02-01,110\n",
        )
        .unwrap();

        let source = CsvHistorySource::new(dir.path());
        let points = source.fetch_history("vti", d(2024, 1, 1), d(2024, 1, 31)).unwrap();
        assert_eq!(
            points,
            vec![
                PricePoint { date: d(2024, 1, 2), price: 100.0 },
                PricePoint { date: d(2024, 1, 3), price: 101.5 },
            ]
        );
    }

    #[test]
    fn test_missing_file_is_data_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvHistorySource::new(dir.path());
        assert!(matches!(
            source.fetch_history("NONE", d(2024, 1, 1), d(2024, 2, 1)),
            Err(FinkitError::DataSource(_))
        ));
    }

    #[test]
    fn test_bad_date_is_date_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("BAD.csv"), "date,price\n01/02/2024,10\n").unwrap();
        let source = CsvHistorySource::new(dir.path());
        assert!(matches!(
            source.fetch_history("BAD", d(2024, 1, 1), d(2024, 2, 1)),
            Err(FinkitError::DateError(_))
        ));
    }
}
