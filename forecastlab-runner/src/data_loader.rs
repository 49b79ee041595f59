//! Bar loading from local files.
//!
//! Three formats are recognized by file extension:
//! - `.json`: an upstream daily-series payload (string numbers, newest first)
//! - `.csv`: `date,open,high,low,close,volume` with a header row
//! - `.parquet`: the same columns, `date` as a Date column
//!
//! Every format goes through the same validation as upstream ingest: finite
//! values, positive close, non-negative volume, dates re-sorted ascending and
//! duplicates rejected. Each loaded dataset carries a BLAKE3 hash over its bars
//! so results can be traced back to the exact data they came from.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::*;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use forecastlab_core::data::{ingest_payload, parse_date, sort_bars, DailySeriesPayload};
use forecastlab_core::domain::PriceBar;
use forecastlab_core::InputError;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("unsupported bar file '{0}' (expected .json, .csv or .parquet)")]
    UnsupportedFormat(String),

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("parquet error: {0}")]
    Parquet(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error(transparent)]
    Input(#[from] InputError),
}

/// Source format of a bar file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarFormat {
    Json,
    Csv,
    Parquet,
}

impl BarFormat {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(BarFormat::Json),
            Some("csv") => Ok(BarFormat::Csv),
            Some("parquet") => Ok(BarFormat::Parquet),
            _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Bars loaded from one file, with provenance.
#[derive(Debug, Clone)]
pub struct LoadedBars {
    /// Symbol from the payload metadata, else the file stem.
    pub symbol: String,
    /// Ascending by date, no duplicates.
    pub bars: Vec<PriceBar>,
    pub format: BarFormat,
    /// BLAKE3 hash over dates and OHLCV values.
    pub dataset_hash: String,
}

/// Load and validate bars from `path`.
pub fn load_bars(path: &Path) -> Result<LoadedBars, LoadError> {
    let format = BarFormat::from_path(path)?;
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string();

    let (symbol, bars) = match format {
        BarFormat::Json => {
            let payload = read_payload(path)?;
            let symbol = payload.symbol().map(str::to_string).unwrap_or(stem);
            (symbol, ingest_payload(&payload)?)
        }
        BarFormat::Csv => (stem, load_csv(path)?),
        BarFormat::Parquet => (stem, load_parquet(path)?),
    };

    let dataset_hash = compute_dataset_hash(&bars);
    info!(
        path = %path.display(),
        symbol = %symbol,
        bars = bars.len(),
        "bars loaded"
    );

    Ok(LoadedBars {
        symbol,
        bars,
        format,
        dataset_hash,
    })
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Parse an upstream payload, surfacing its error message if it carries one.
pub fn read_payload(path: &Path) -> Result<DailySeriesPayload, LoadError> {
    let payload: DailySeriesPayload = serde_json::from_str(&read_file(path)?)?;
    if let Some(message) = &payload.error_message {
        return Err(LoadError::Upstream(message.clone()));
    }
    Ok(payload)
}

#[derive(Debug, Deserialize)]
struct CsvBar {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Load bars from a CSV file with a `date,open,high,low,close,volume` header.
pub fn load_csv(path: &Path) -> Result<Vec<PriceBar>, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut bars = Vec::new();
    for record in reader.deserialize::<CsvBar>() {
        let row = record?;
        let bar = PriceBar {
            date: parse_date(&row.date)?,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        };
        bars.push(validated(bar)?);
    }
    finish(bars)
}

/// Load bars from a Parquet file.
///
/// Numeric columns are cast to `Float64`, so integer volumes are accepted.
pub fn load_parquet(path: &Path) -> Result<Vec<PriceBar>, LoadError> {
    let dtype_err = |column: &str| {
        let column = column.to_string();
        move |e: PolarsError| LoadError::Parquet(format!("{column} column: {e}"))
    };

    let df = LazyFrame::scan_parquet(path, ScanArgsParquet::default())
        .and_then(|lf| {
            lf.select([
                col("date").cast(DataType::Date),
                col("open").cast(DataType::Float64),
                col("high").cast(DataType::Float64),
                col("low").cast(DataType::Float64),
                col("close").cast(DataType::Float64),
                col("volume").cast(DataType::Float64),
            ])
            .collect()
        })
        .map_err(|e| LoadError::Parquet(format!("read {}: {e}", path.display())))?;

    let dates = df
        .column("date")
        .and_then(|c| c.date())
        .map_err(dtype_err("date"))?;
    let f64_column = |name: &str| {
        df.column(name)
            .and_then(|c| c.f64())
            .map_err(dtype_err(name))
    };
    let opens = f64_column("open")?;
    let highs = f64_column("high")?;
    let lows = f64_column("low")?;
    let closes = f64_column("close")?;
    let volumes = f64_column("volume")?;

    let mut bars = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let days = dates
            .get(i)
            .ok_or_else(|| LoadError::Parquet(format!("null date at row {i}")))?;
        let bar = PriceBar {
            date: epoch() + chrono::Duration::days(i64::from(days)),
            open: opens.get(i).unwrap_or(f64::NAN),
            high: highs.get(i).unwrap_or(f64::NAN),
            low: lows.get(i).unwrap_or(f64::NAN),
            close: closes.get(i).unwrap_or(f64::NAN),
            volume: volumes.get(i).unwrap_or(f64::NAN),
        };
        bars.push(validated(bar)?);
    }
    finish(bars)
}

/// Write bars to a Parquet file readable by `load_parquet`.
pub fn write_parquet(bars: &[PriceBar], path: &Path) -> Result<(), LoadError> {
    let days: Vec<i32> = bars
        .iter()
        .map(|b| (b.date - epoch()).num_days() as i32)
        .collect();
    let column = |f: fn(&PriceBar) -> f64| bars.iter().map(f).collect::<Vec<f64>>();

    let mut df = DataFrame::new(vec![
        Column::new("date".into(), days)
            .cast(&DataType::Date)
            .map_err(|e| LoadError::Parquet(format!("date cast: {e}")))?,
        Column::new("open".into(), column(|b| b.open)),
        Column::new("high".into(), column(|b| b.high)),
        Column::new("low".into(), column(|b| b.low)),
        Column::new("close".into(), column(|b| b.close)),
        Column::new("volume".into(), column(|b| b.volume)),
    ])
    .map_err(|e| LoadError::Parquet(format!("dataframe creation: {e}")))?;

    let file = fs::File::create(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .map_err(|e| LoadError::Parquet(format!("write parquet: {e}")))?;
    Ok(())
}

/// Deterministic BLAKE3 hash over dates and OHLCV values, in series order.
pub fn compute_dataset_hash(bars: &[PriceBar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(bar.date.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// 1970-01-01, the day zero of Parquet `Date` columns.
fn epoch() -> NaiveDate {
    NaiveDate::default()
}

fn validated(bar: PriceBar) -> Result<PriceBar, LoadError> {
    if bar.is_sane() {
        Ok(bar)
    } else {
        Err(InputError::InvalidBar(bar.date).into())
    }
}

fn finish(mut bars: Vec<PriceBar>) -> Result<Vec<PriceBar>, LoadError> {
    if bars.is_empty() {
        return Err(InputError::EmptySeries.into());
    }
    sort_bars(&mut bars)?;
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_bars() -> Vec<PriceBar> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        (0..5)
            .map(|i| PriceBar {
                date: base + chrono::Duration::days(i),
                open: 100.0 + i as f64,
                high: 102.0 + i as f64,
                low: 99.0 + i as f64,
                close: 101.0 + i as f64,
                volume: 1_000.0 * (i + 1) as f64,
            })
            .collect()
    }

    fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(BarFormat::from_path(Path::new("a.JSON")).unwrap(), BarFormat::Json);
        assert_eq!(BarFormat::from_path(Path::new("a.csv")).unwrap(), BarFormat::Csv);
        assert_eq!(
            BarFormat::from_path(Path::new("x/y.parquet")).unwrap(),
            BarFormat::Parquet
        );
        assert!(matches!(
            BarFormat::from_path(Path::new("bars.txt")),
            Err(LoadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn json_payload_is_sorted_and_named() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "daily.json",
            r#"{
              "Meta Data": {"2. Symbol": "IBM"},
              "Time Series (Daily)": {
                "2024-01-03": {"1. open": "2", "2. high": "3", "3. low": "1", "4. close": "2.5", "5. volume": "10"},
                "2024-01-02": {"1. open": "1", "2. high": "2", "3. low": "0.5", "4. close": "1.5", "5. volume": "20"}
              }
            }"#,
        );
        let loaded = load_bars(&path).unwrap();
        assert_eq!(loaded.symbol, "IBM");
        assert_eq!(loaded.format, BarFormat::Json);
        assert_eq!(loaded.bars.len(), 2);
        assert!(loaded.bars[0].date < loaded.bars[1].date);
        assert_eq!(loaded.bars[0].close, 1.5);
    }

    #[test]
    fn json_error_message_is_upstream_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "bad.json",
            r#"{"Error Message": "Invalid API call."}"#,
        );
        assert!(matches!(load_bars(&path), Err(LoadError::Upstream(m)) if m == "Invalid API call."));
    }

    #[test]
    fn csv_loads_and_uses_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "SPY.csv",
            "date,open,high,low,close,volume\n\
             2024-01-03,2,3,1,2.5,10\n\
             2024-01-02,1,2,0.5,1.5,20\n",
        );
        let loaded = load_bars(&path).unwrap();
        assert_eq!(loaded.symbol, "SPY");
        assert_eq!(loaded.bars.len(), 2);
        assert_eq!(loaded.bars[1].volume, 10.0);
    }

    #[test]
    fn csv_rejects_duplicates_and_bad_bars() {
        let dir = tempfile::tempdir().unwrap();
        let dup = write_file(
            dir.path(),
            "dup.csv",
            "date,open,high,low,close,volume\n\
             2024-01-02,1,2,0.5,1.5,20\n\
             2024-01-02,1,2,0.5,1.6,20\n",
        );
        assert!(matches!(
            load_bars(&dup),
            Err(LoadError::Input(InputError::DuplicateDate(_)))
        ));

        let zero = write_file(
            dir.path(),
            "zero.csv",
            "date,open,high,low,close,volume\n2024-01-02,1,2,0.5,0,20\n",
        );
        assert!(matches!(
            load_bars(&zero),
            Err(LoadError::Input(InputError::InvalidBar(_)))
        ));

        let empty = write_file(dir.path(), "empty.csv", "date,open,high,low,close,volume\n");
        assert!(matches!(
            load_bars(&empty),
            Err(LoadError::Input(InputError::EmptySeries))
        ));
    }

    #[test]
    fn parquet_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("QQQ.parquet");
        let bars = sample_bars();
        write_parquet(&bars, &path).unwrap();

        let loaded = load_bars(&path).unwrap();
        assert_eq!(loaded.symbol, "QQQ");
        assert_eq!(loaded.bars, bars);
        assert_eq!(loaded.dataset_hash, compute_dataset_hash(&bars));
    }

    #[test]
    fn dataset_hash_is_deterministic() {
        let bars = sample_bars();
        assert_eq!(compute_dataset_hash(&bars), compute_dataset_hash(&bars));

        let mut changed = bars.clone();
        changed[2].close += 0.01;
        assert_ne!(compute_dataset_hash(&bars), compute_dataset_hash(&changed));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_bars(&dir.path().join("nope.json")),
            Err(LoadError::Io { .. })
        ));
    }
}
