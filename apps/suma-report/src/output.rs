//! # Report Output
//!
//! File I/O for the CSV report. Encoding lives in `suma_core`.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use suma_core::{ReportError, ReportRow, write_csv};

/// Write `rows` to `path`, replacing any existing file.
pub fn write_report(path: &Path, rows: &[ReportRow]) -> Result<(), ReportError> {
    let file = File::create(path)?;
    write_csv(rows, BufWriter::new(file))
}

/// Read a report written by [`write_report`].
pub fn read_report(path: &Path) -> Result<Vec<ReportRow>, ReportError> {
    let file = File::open(path)?;
    suma_core::read_csv(file)
}
