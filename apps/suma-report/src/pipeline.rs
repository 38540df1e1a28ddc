//! # Report Pipeline
//!
//! One run, strictly in order:
//!
//! ```text
//! login ──► listSystems ──► for each system: errata, packages ──► write CSV ──► logout
//!   │            │                        │                           │
//!   ▼            ▼                        ▼                           ▼
//! Authentication Enumeration /        skip system,              Report error
//! error          NoSystems            keep going                (after logout)
//! ```
//!
//! Once a session exists, logout is attempted on every path. A failed logout
//! is logged and otherwise ignored.

use crate::config::Config;
use crate::exit;
use crate::output::write_report;
use std::fmt;
use std::path::PathBuf;
use suma_client::{Error as ApiError, RemoteApiClient, Session, SystemRecord, Transport};
use suma_core::{ReportError, ReportRow};
use thiserror::Error;
use tracing::{debug, info, warn};

// =============================================================================
// OUTCOME TYPES
// =============================================================================

/// Why a system has no row in the report.
#[derive(Debug)]
pub enum SkipReason {
    /// The errata call failed.
    PatchesFailed(ApiError),
    /// The errata call returned an empty list.
    NoPatches,
    /// The package call failed.
    PackagesFailed(ApiError),
    /// The package call returned an empty list.
    NoPackages,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::PatchesFailed(e) => write!(f, "failed to fetch security patches: {}", e),
            SkipReason::NoPatches => f.write_str("no security patches returned"),
            SkipReason::PackagesFailed(e) => write!(f, "failed to fetch installed packages: {}", e),
            SkipReason::NoPackages => f.write_str("no installed packages returned"),
        }
    }
}

impl SkipReason {
    /// The remote error behind a failed fetch.
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            SkipReason::PatchesFailed(e) | SkipReason::PackagesFailed(e) => Some(e),
            SkipReason::NoPatches | SkipReason::NoPackages => None,
        }
    }

    /// True when the fetch never reached the server.
    pub fn is_transport(&self) -> bool {
        self.error().is_some_and(ApiError::is_transport)
    }
}

/// A system left out of the report.
#[derive(Debug)]
pub struct SkippedSystem {
    pub system: SystemRecord,
    pub reason: SkipReason,
}

/// Rows and skips from the per-system pass, both in enumeration order.
#[derive(Debug, Default)]
pub struct Collection {
    pub rows: Vec<ReportRow>,
    pub skipped: Vec<SkippedSystem>,
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunSummary {
    /// Number of systems the server listed.
    pub systems: usize,
    pub rows: Vec<ReportRow>,
    pub skipped: Vec<SkippedSystem>,
    pub output_path: PathBuf,
}

impl RunSummary {
    pub fn exit_code(&self) -> u8 {
        if self.skipped.is_empty() {
            exit::SUCCESS
        } else {
            exit::PARTIAL
        }
    }
}

/// Run-ending failures. No report file exists after any of them except
/// possibly a partial one after [`RunError::Report`].
#[derive(Debug, Error)]
pub enum RunError {
    #[error("login failed: {0}")]
    Authentication(#[source] ApiError),

    #[error("listing systems failed: {0}")]
    Enumeration(#[source] ApiError),

    #[error("the server returned no systems")]
    NoSystems,

    #[error("writing report to {path} failed: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: ReportError,
    },
}

impl RunError {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Authentication(_) => exit::AUTHENTICATION,
            RunError::Enumeration(_) | RunError::NoSystems => exit::ENUMERATION,
            RunError::Report { .. } => exit::REPORT,
        }
    }

    /// What the operator should look at first, when the cause is clear.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            RunError::Authentication(e) | RunError::Enumeration(e) if e.is_transport() => {
                Some("the server could not be reached; check the url, network and TLS settings")
            }
            RunError::Authentication(e) if e.is_rejection() => {
                Some("the server refused the login; check the username and password")
            }
            _ => None,
        }
    }
}

// =============================================================================
// GENERATOR
// =============================================================================

/// Drives one report run against a remote API.
pub struct ReportGenerator<T> {
    api: RemoteApiClient<T>,
    username: String,
    password: String,
    errata_type: String,
    include_empty: bool,
    output_path: PathBuf,
}

impl<T: Transport> ReportGenerator<T> {
    pub fn new(api: RemoteApiClient<T>, config: &Config) -> Self {
        Self {
            api,
            username: config.username.clone(),
            password: config.password.clone(),
            errata_type: config.errata_type.clone(),
            include_empty: config.include_empty,
            output_path: config.output_path.clone(),
        }
    }

    pub fn api(&self) -> &RemoteApiClient<T> {
        &self.api
    }

    /// Run the whole pipeline.
    pub async fn run(&self) -> Result<RunSummary, RunError> {
        info!(user = %self.username, "logging in");
        let session = self
            .api
            .login(&self.username, &self.password)
            .await
            .map_err(RunError::Authentication)?;

        let outcome = self.run_session(&session).await;

        match self.api.logout(session).await {
            Ok(()) => debug!("logged out"),
            Err(e) => warn!(error = %e, "logout failed"),
        }

        outcome
    }

    async fn run_session(&self, session: &Session) -> Result<RunSummary, RunError> {
        let systems = self
            .api
            .list_systems(session)
            .await
            .map_err(RunError::Enumeration)?;
        if systems.is_empty() {
            return Err(RunError::NoSystems);
        }
        info!(count = systems.len(), "systems listed");

        let Collection { rows, skipped } = self.collect(session, &systems).await;

        write_report(&self.output_path, &rows).map_err(|source| RunError::Report {
            path: self.output_path.clone(),
            source,
        })?;
        info!(
            rows = rows.len(),
            skipped = skipped.len(),
            path = %self.output_path.display(),
            "report written"
        );

        Ok(RunSummary {
            systems: systems.len(),
            rows,
            skipped,
            output_path: self.output_path.clone(),
        })
    }

    /// Fetch both datasets for every system, in order.
    pub async fn collect(&self, session: &Session, systems: &[SystemRecord]) -> Collection {
        let mut collection = Collection::default();

        for system in systems {
            match self.collect_one(session, system).await {
                Ok(row) => collection.rows.push(row),
                Err(reason) => {
                    warn!(
                        hostname = %system.hostname,
                        system_id = %system.id,
                        unreachable = reason.is_transport(),
                        "skipping system: {}",
                        reason
                    );
                    collection.skipped.push(SkippedSystem {
                        system: system.clone(),
                        reason,
                    });
                }
            }
        }

        collection
    }

    async fn collect_one(&self, session: &Session, system: &SystemRecord) -> Result<ReportRow, SkipReason> {
        let patches = self
            .api
            .relevant_errata(session, system.id, &self.errata_type)
            .await
            .map_err(SkipReason::PatchesFailed)?;
        if patches.is_empty() && !self.include_empty {
            return Err(SkipReason::NoPatches);
        }

        let packages = self
            .api
            .list_packages(session, system.id)
            .await
            .map_err(SkipReason::PackagesFailed)?;
        if packages.is_empty() && !self.include_empty {
            return Err(SkipReason::NoPackages);
        }

        debug!(
            hostname = %system.hostname,
            patches = patches.len(),
            packages = packages.len(),
            "system collected"
        );
        Ok(ReportRow::new(system.hostname.clone(), patches.len(), packages.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_reason_display() {
        assert_eq!(SkipReason::NoPatches.to_string(), "no security patches returned");
        let failed = SkipReason::PackagesFailed(ApiError::Server("Could not find server".to_string()));
        assert_eq!(
            failed.to_string(),
            "failed to fetch installed packages: Server error: Could not find server"
        );
    }

    #[test]
    fn run_error_exit_codes() {
        assert_eq!(RunError::NoSystems.exit_code(), exit::ENUMERATION);
        assert_eq!(
            RunError::Authentication(ApiError::Protocol("x".to_string())).exit_code(),
            exit::AUTHENTICATION
        );
        assert_eq!(
            RunError::Enumeration(ApiError::Server("x".to_string())).exit_code(),
            exit::ENUMERATION
        );
    }

    #[test]
    fn run_error_hints() {
        let refused = RunError::Authentication(ApiError::Fault {
            code: 2950,
            message: "Either the password or username is incorrect.".to_string(),
        });
        assert!(refused.hint().is_some_and(|h| h.contains("username and password")));

        let rejected = RunError::Authentication(ApiError::Status {
            status: 401,
            body: String::new(),
        });
        assert!(rejected.hint().is_some());

        assert_eq!(RunError::Authentication(ApiError::Protocol("x".to_string())).hint(), None);
        assert_eq!(RunError::Enumeration(ApiError::Server("x".to_string())).hint(), None);
        assert_eq!(RunError::NoSystems.hint(), None);
    }

    #[test]
    fn skip_reason_error() {
        let failed = SkipReason::PatchesFailed(ApiError::Server("x".to_string()));
        assert!(matches!(failed.error(), Some(ApiError::Server(_))));
        assert!(!failed.is_transport());
        assert!(SkipReason::NoPackages.error().is_none());
        assert!(!SkipReason::NoPackages.is_transport());
    }

    #[test]
    fn summary_exit_code_reflects_skips() {
        let mut summary = RunSummary {
            systems: 1,
            rows: vec![ReportRow::new("h1", 1, 1)],
            skipped: Vec::new(),
            output_path: PathBuf::from("r.csv"),
        };
        assert_eq!(summary.exit_code(), exit::SUCCESS);

        summary.skipped.push(SkippedSystem {
            system: SystemRecord::new(2, "h2"),
            reason: SkipReason::NoPackages,
        });
        assert_eq!(summary.exit_code(), exit::PARTIAL);
    }
}
