//! Trade export port trait.

use crate::domain::error::MacdTraderError;
use crate::domain::ledger::LedgerEntry;
use crate::domain::pipeline::PipelineResult;
use std::path::{Path, PathBuf};

/// Port for writing run results. Implementations return the path actually written.
pub trait ReportPort {
    fn write_ledger(
        &self,
        ledger: &[LedgerEntry],
        output_path: &Path,
    ) -> Result<PathBuf, MacdTraderError>;

    fn write_annotated(
        &self,
        result: &PipelineResult,
        output_path: &Path,
    ) -> Result<PathBuf, MacdTraderError>;
}
