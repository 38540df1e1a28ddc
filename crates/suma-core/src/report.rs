//! # Report Rows
//!
//! The CSV report: one row per successfully processed system, in enumeration
//! order, under a fixed four-column header.
//!
//! Encoding and decoding work on any `Write`/`Read`; opening the target file
//! is the application's job.

use crate::currency::currency;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use thiserror::Error;

// =============================================================================
// HEADER
// =============================================================================

/// The report header, in column order.
///
/// "Packets Installed" and "Currency Percentage" are the established column
/// names consumers of the report key on; the currency column holds a fraction.
pub const REPORT_HEADER: [&str; 4] = [
    "Hostname",
    "Security Patches Available",
    "Packets Installed",
    "Currency Percentage",
];

// =============================================================================
// ERROR TYPE
// =============================================================================

/// Errors while encoding or decoding a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// CSV encoding/decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The underlying writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The header row is not the report header.
    #[error("Unexpected report header: {found:?}")]
    HeaderMismatch { found: Vec<String> },
}

// =============================================================================
// REPORT ROW
// =============================================================================

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(rename = "Hostname")]
    pub hostname: String,
    #[serde(rename = "Security Patches Available")]
    pub security_patches: usize,
    #[serde(rename = "Packets Installed")]
    pub installed_packages: usize,
    #[serde(rename = "Currency Percentage")]
    pub currency: f64,
}

impl ReportRow {
    /// Build a row from the two counts; the ratio is derived here.
    pub fn new(hostname: impl Into<String>, security_patches: usize, installed_packages: usize) -> Self {
        Self {
            hostname: hostname.into(),
            security_patches,
            installed_packages,
            currency: currency(security_patches, installed_packages),
        }
    }
}

// =============================================================================
// ENCODE / DECODE
// =============================================================================

/// Write the header and then every row, in order.
///
/// The header is written even when `rows` is empty.
pub fn write_csv<W: Write>(rows: &[ReportRow], writer: W) -> Result<(), ReportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(REPORT_HEADER)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read a report back into rows.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<ReportRow>, ReportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr.headers()?;
    if headers.iter().ne(REPORT_HEADER) {
        return Err(ReportError::HeaderMismatch {
            found: headers.iter().map(String::from).collect(),
        });
    }

    let mut rows = Vec::new();
    for row in rdr.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}
