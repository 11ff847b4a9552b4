//! Offline provider reading Yahoo-style CSV exports.
//!
//! Looks for `<dir>/<SYMBOL>.csv` with a `Date,Open,High,Low,Close,Volume`
//! header. Extra columns (`Adj Close`) are ignored; empty cells become gaps.

use super::provider::{DataError, DataOrigin, DataProvider, FetchResult, RawBar};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open")]
    open: Option<f64>,
    #[serde(rename = "High")]
    high: Option<f64>,
    #[serde(rename = "Low")]
    low: Option<f64>,
    #[serde(rename = "Close")]
    close: Option<f64>,
    #[serde(rename = "Volume")]
    volume: Option<f64>,
}

impl From<CsvRecord> for RawBar {
    fn from(r: CsvRecord) -> Self {
        RawBar {
            date: r.date,
            open: r.open.unwrap_or(f64::NAN),
            high: r.high.unwrap_or(f64::NAN),
            low: r.low.unwrap_or(f64::NAN),
            close: r.close.unwrap_or(f64::NAN),
            volume: r.volume.filter(|v| *v >= 0.0).unwrap_or(f64::NAN),
        }
    }
}

pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    fn read_bars(path: &Path, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawBar>, DataError> {
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| DataError::CsvError(format!("{}: {e}", path.display())))?;

        let mut bars = Vec::new();
        for (line, record) in reader.deserialize::<CsvRecord>().enumerate() {
            let record = record.map_err(|e| {
                DataError::CsvError(format!("{} row {}: {e}", path.display(), line + 1))
            })?;
            if record.date >= start && record.date <= end {
                bars.push(RawBar::from(record));
            }
        }
        Ok(bars)
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn origin(&self) -> DataOrigin {
        DataOrigin::CsvImport
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let path = self.path_for(symbol);
        if !path.is_file() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let bars = Self::read_bars(&path, start, end)?;
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            origin: DataOrigin::CsvImport,
        })
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AAPL_CSV: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2024-01-02,187.15,188.44,183.89,185.64,184.94,82488700
2024-01-03,184.22,185.88,183.43,184.25,183.55,58414500
2024-01-04,182.15,,180.88,181.91,181.22,71983600
";

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn provider_with_aapl() -> (tempfile::TempDir, CsvProvider) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("AAPL.csv"), AAPL_CSV).unwrap();
        let provider = CsvProvider::new(dir.path());
        (dir, provider)
    }

    #[test]
    fn reads_rows_in_range() {
        let (_dir, provider) = provider_with_aapl();
        let result = provider.fetch("AAPL", date(3), date(31)).unwrap();

        assert_eq!(result.origin, DataOrigin::CsvImport);
        assert_eq!(result.bars.len(), 2);
        assert_eq!(result.bars[0].close, 184.25);
        assert_eq!(result.bars[0].volume, 58_414_500.0);
    }

    #[test]
    fn empty_cell_becomes_gap() {
        let (_dir, provider) = provider_with_aapl();
        let result = provider.fetch("AAPL", date(4), date(4)).unwrap();
        assert!(result.bars[0].high.is_nan());
    }

    #[test]
    fn empty_volume_cell_becomes_gap() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("AAPL.csv"),
            "Date,Open,High,Low,Close,Volume\n\
             2024-01-02,187.15,188.44,183.89,185.64,82488700\n\
             2024-01-03,184.22,185.88,183.43,184.25,\n",
        )
        .unwrap();

        let result = CsvProvider::new(dir.path())
            .fetch("AAPL", date(1), date(31))
            .unwrap();
        assert_eq!(result.bars[0].volume, 82_488_700.0);
        assert!(result.bars[1].volume.is_nan());
        assert_eq!(result.bars[1].close, 184.25);
    }

    #[test]
    fn range_outside_file_is_empty() {
        let (_dir, provider) = provider_with_aapl();
        let result = provider
            .fetch(
                "AAPL",
                NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 6, 30).unwrap(),
            )
            .unwrap();
        assert!(result.bars.is_empty());
    }

    #[test]
    fn missing_file_is_symbol_not_found() {
        let (_dir, provider) = provider_with_aapl();
        assert!(matches!(
            provider.fetch("MSFT", date(1), date(31)),
            Err(DataError::SymbolNotFound { .. })
        ));
    }

    #[test]
    fn malformed_row_is_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("AAPL.csv"),
            "Date,Open,High,Low,Close,Volume\nnot-a-date,1,2,0.5,1.5,10\n",
        )
        .unwrap();
        let provider = CsvProvider::new(dir.path());
        assert!(matches!(
            provider.fetch("AAPL", date(1), date(31)),
            Err(DataError::CsvError(_))
        ));
    }
}
