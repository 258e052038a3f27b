//! CSV export of the trade ledger and the annotated price series.

use crate::domain::error::MacdTraderError;
use crate::domain::ledger::LedgerEntry;
use crate::domain::pipeline::PipelineResult;
use crate::ports::report_port::ReportPort;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Serialize)]
struct LedgerRow {
    date: String,
    action: String,
    price: f64,
    entry_price: f64,
    trade_id: usize,
}

#[derive(Serialize)]
struct AnnotatedRow {
    date: String,
    price: f64,
    macd: Option<f64>,
    signal: Option<f64>,
    histogram: Option<f64>,
    trade_action: Option<String>,
    trade_price: Option<f64>,
    entry_price: Option<f64>,
    trade_id: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct CsvReportAdapter {
    overwrite: bool,
}

impl CsvReportAdapter {
    pub fn new(overwrite: bool) -> Self {
        Self { overwrite }
    }

    fn write_rows<T: Serialize>(
        &self,
        rows: impl IntoIterator<Item = T>,
        output_path: &Path,
    ) -> Result<PathBuf, MacdTraderError> {
        let target = prepare_target(output_path, self.overwrite)?;
        let mut writer = csv::Writer::from_path(&target).map_err(|e| export_error(&target, e))?;
        for row in rows {
            writer.serialize(row).map_err(|e| export_error(&target, e))?;
        }
        writer.flush()?;
        info!(path = %target.display(), "exported");
        Ok(target)
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_ledger(
        &self,
        ledger: &[LedgerEntry],
        output_path: &Path,
    ) -> Result<PathBuf, MacdTraderError> {
        let rows = ledger.iter().map(|e| LedgerRow {
            date: e.date.format(DATE_FORMAT).to_string(),
            action: e.action.to_string(),
            price: e.price,
            entry_price: e.entry_price,
            trade_id: e.trade_id,
        });
        self.write_rows(rows, output_path)
    }

    fn write_annotated(
        &self,
        result: &PipelineResult,
        output_path: &Path,
    ) -> Result<PathBuf, MacdTraderError> {
        let bundle = &result.bundle;
        let rows = result
            .annotated
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| AnnotatedRow {
                date: p.date.format(DATE_FORMAT).to_string(),
                price: p.price,
                macd: bundle.macd.value(i),
                signal: bundle.signal.value(i),
                histogram: bundle.histogram.value(i),
                trade_action: p.annotation.map(|a| a.action.to_string()),
                trade_price: p.annotation.map(|a| a.trade_price),
                entry_price: p.annotation.map(|a| a.entry_price),
                trade_id: p.annotation.map(|a| a.trade_id),
            });
        self.write_rows(rows, output_path)
    }
}

/// Checks the extension, creates missing parent directories and picks a free
/// `name_N.csv` when the file exists and overwriting is off.
fn prepare_target(path: &Path, overwrite: bool) -> Result<PathBuf, MacdTraderError> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(MacdTraderError::Export {
            reason: format!("unsupported export format for {}, use .csv", path.display()),
        });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
            info!(folder = %parent.display(), "created folder");
        }
    }

    Ok(if overwrite {
        path.to_path_buf()
    } else {
        versioned_path(path)
    })
}

pub fn versioned_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    (1..)
        .map(|version| path.with_file_name(format!("{stem}_{version}.{ext}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

fn export_error(path: &Path, err: csv::Error) -> MacdTraderError {
    MacdTraderError::Export {
        reason: format!("failed to write {}: {}", path.display(), err),
    }
}
