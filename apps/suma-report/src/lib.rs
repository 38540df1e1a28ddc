//! # suma-report Library
//!
//! This library exposes the report modules for testing and integration.
//!
//! The binary wires them together in `main.rs`: parse flags, resolve the
//! config, build the transport, run the [`pipeline::ReportGenerator`].

pub mod cli;
pub mod config;
pub mod exit;
pub mod logging;
pub mod output;
pub mod pipeline;

// Re-export the member crates for convenience
pub use suma_client;
pub use suma_core;
