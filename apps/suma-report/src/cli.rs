//! # CLI Module
//!
//! Command-line flags. Every connection option can also come from the
//! environment or the TOML config file; see [`crate::config`] for precedence.

use clap::Parser;
use clap::builder::BoolishValueParser;
use std::path::PathBuf;
use suma_client::TransportKind;

/// Security patch currency report for managed systems.
#[derive(Debug, Clone, Parser)]
#[command(name = "suma-report", version, about)]
pub struct Cli {
    /// TOML config file.
    #[arg(short, long, env = "SUMA_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Remote API endpoint, e.g. https://suma.example.com/rpc/api
    #[arg(long, env = "SUMA_URL")]
    pub url: Option<String>,

    #[arg(short, long, env = "SUMA_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "SUMA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Verify the server's TLS certificate (true/false).
    #[arg(long, env = "SUMA_VERIFY_TLS", value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub verify_tls: Option<bool>,

    /// Skip TLS certificate verification. Overrides --verify-tls.
    #[arg(long)]
    pub insecure: bool,

    /// Extra PEM CA certificate to trust.
    #[arg(long, env = "SUMA_CA_CERT", value_name = "FILE")]
    pub ca_cert: Option<PathBuf>,

    /// Report file (default: suma_report.csv).
    #[arg(short, long, env = "SUMA_OUTPUT", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Wire binding: json or xml.
    #[arg(long, env = "SUMA_TRANSPORT")]
    pub transport: Option<TransportKind>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "SUMA_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Advisory type counted as outstanding patches.
    #[arg(long, env = "SUMA_ERRATA_TYPE")]
    pub errata_type: Option<String>,

    /// Report systems whose patch or package list is empty instead of skipping them.
    #[arg(long)]
    pub include_empty: bool,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, env = "SUMA_LOG", default_value = "info")]
    pub log_level: String,
}
