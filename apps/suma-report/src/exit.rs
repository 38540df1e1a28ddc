//! Process exit codes.

/// Every system made it into the report.
pub const SUCCESS: u8 = 0;

/// Bad flags, config file or TLS material; nothing was contacted.
pub const CONFIG: u8 = 1;

/// Login was refused or failed; no report.
pub const AUTHENTICATION: u8 = 2;

/// Listing systems failed or returned nothing; no report.
pub const ENUMERATION: u8 = 3;

/// The report file could not be written.
pub const REPORT: u8 = 4;

/// The report was written but at least one system was skipped.
pub const PARTIAL: u8 = 5;
