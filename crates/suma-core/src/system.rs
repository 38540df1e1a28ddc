//! # System Identity
//!
//! Managed hosts as returned by the server's system enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned identifier of a managed system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemId(pub u64);

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A managed host.
///
/// The server sends more fields (last check-in, ...); only the id and the
/// name are kept. Records are never modified after enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemRecord {
    pub id: SystemId,
    #[serde(rename = "name")]
    pub hostname: String,
}

impl SystemRecord {
    /// Create a new system record.
    pub fn new(id: u64, hostname: impl Into<String>) -> Self {
        Self {
            id: SystemId(id),
            hostname: hostname.into(),
        }
    }
}
