//! Artifact export: JSON reports, CSV trade log and prediction series.
//!
//! Persisted reports carry a `schema_version`. Versions newer than this build
//! understands are rejected on load.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use forecastlab_core::backtest::PredictionPoint;
use forecastlab_core::domain::TradeEvent;

use crate::dataset::TrainingSet;
use crate::result::{BacktestReport, SCHEMA_VERSION};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("unsupported schema version {found} (max supported: {max})")]
    SchemaVersion { found: u32, max: u32 },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ExportError + '_ {
    move |source| ExportError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), ExportError> {
    fs::write(path, contents).map_err(io_err(path))
}

// ─── JSON ───────────────────────────────────────────────────────────

pub fn export_json(report: &BacktestReport) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Deserialize a report, rejecting schema versions newer than `SCHEMA_VERSION`.
pub fn import_json(json: &str) -> Result<BacktestReport, ExportError> {
    let report: BacktestReport = serde_json::from_str(json)?;
    if report.schema_version > SCHEMA_VERSION {
        return Err(ExportError::SchemaVersion {
            found: report.schema_version,
            max: SCHEMA_VERSION,
        });
    }
    Ok(report)
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Trade log as CSV: `date,kind,price,cash,label`.
pub fn export_trades_csv(trades: &[TradeEvent]) -> Result<Vec<u8>, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "kind", "price", "cash", "label"])?;
    for t in trades {
        let date = t.timestamp.to_string();
        let price = t.price.to_string();
        let cash = format!("{:.2}", t.cash);
        wtr.write_record([
            date.as_str(),
            t.kind.as_str(),
            price.as_str(),
            cash.as_str(),
            t.label.as_str(),
        ])?;
    }
    wtr.into_inner().map_err(|e| ExportError::Csv(e.into_error().into()))
}

/// Predicted-value series as CSV: `date,prediction`.
pub fn export_predictions_csv(points: &[PredictionPoint]) -> Result<Vec<u8>, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "prediction"])?;
    for p in points {
        wtr.write_record([p.date.to_string(), p.value.to_string()])?;
    }
    wtr.into_inner().map_err(|e| ExportError::Csv(e.into_error().into()))
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set of one report under `<output_dir>/<short run id>/`:
/// - `report.json`: the full report
/// - `trades.csv`: trade log
/// - `predictions.csv`: predicted-value series
///
/// Returns the created directory.
pub fn save_artifacts(report: &BacktestReport, output_dir: &Path) -> Result<PathBuf, ExportError> {
    let run_dir = output_dir.join(report.short_id());
    fs::create_dir_all(&run_dir).map_err(io_err(&run_dir))?;

    write_file(&run_dir.join("report.json"), export_json(report)?.as_bytes())?;
    write_file(&run_dir.join("trades.csv"), &export_trades_csv(&report.trades)?)?;
    write_file(
        &run_dir.join("predictions.csv"),
        &export_predictions_csv(&report.predictions)?,
    )?;

    info!(dir = %run_dir.display(), run_id = %report.run_id, "artifacts saved");
    Ok(run_dir)
}

/// Load the report from an artifact directory.
pub fn load_artifacts(dir: &Path) -> Result<BacktestReport, ExportError> {
    let path = dir.join("report.json");
    let json = fs::read_to_string(&path).map_err(io_err(&path))?;
    import_json(&json)
}

/// Write normalized inputs, labels and stats as JSON for an external trainer.
pub fn write_training_set(set: &TrainingSet, path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    write_file(path, &serde_json::to_vec(set)?)?;
    info!(path = %path.display(), pairs = set.len(), "training set written");
    Ok(())
}
