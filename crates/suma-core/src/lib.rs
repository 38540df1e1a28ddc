//! # suma-core
//!
//! Pure report logic for suma-report.
//!
//! This crate knows nothing about the network or the filesystem. It holds:
//! - [`SystemRecord`]: one managed host as enumerated by the server
//! - [`currency`]: the patch-currency ratio of a host
//! - [`ReportRow`], [`write_csv`], [`read_csv`]: the CSV report model
//!
//! ```text
//! SystemRecord ──► (patch count, package count) ──► currency() ──► ReportRow ──► CSV
//! ```

mod currency;
mod report;
mod system;

pub use currency::currency;
pub use report::{REPORT_HEADER, ReportError, ReportRow, read_csv, write_csv};
pub use system::{SystemId, SystemRecord};
