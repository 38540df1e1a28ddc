//! # Transport
//!
//! The seam between typed API methods and the wire.

use crate::error::Error;
use crate::json::JsonRpcTransport;
use crate::xmlrpc::XmlRpcTransport;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// TRANSPORT TRAIT
// =============================================================================

/// One remote method call: a method name and positional parameters in, a
/// decoded value out.
///
/// Parameters and results are [`serde_json::Value`]s regardless of the wire
/// format, so callers never see which binding is in use.
pub trait Transport {
    fn call(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> impl Future<Output = Result<Value, Error>> + Send;
}

// =============================================================================
// TRANSPORT SELECTION
// =============================================================================

/// Wire binding selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// `{"methodName": ..., "params": [...]}` posted as JSON.
    #[default]
    Json,
    /// Standard XML-RPC `<methodCall>`.
    Xml,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Json => f.write_str("json"),
            TransportKind::Xml => f.write_str("xml"),
        }
    }
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(TransportKind::Json),
            "xml" | "xmlrpc" | "xml-rpc" => Ok(TransportKind::Xml),
            other => Err(format!("unknown transport '{}' (expected json or xml)", other)),
        }
    }
}

/// A transport chosen at runtime.
#[derive(Debug, Clone)]
pub enum AnyTransport {
    Json(JsonRpcTransport),
    Xml(XmlRpcTransport),
}

impl AnyTransport {
    /// Build the transport of the given kind for `url`.
    pub fn connect(
        kind: TransportKind,
        url: impl Into<String>,
        settings: &HttpSettings,
    ) -> Result<Self, Error> {
        Ok(match kind {
            TransportKind::Json => AnyTransport::Json(JsonRpcTransport::with_settings(url, settings)?),
            TransportKind::Xml => AnyTransport::Xml(XmlRpcTransport::with_settings(url, settings)?),
        })
    }

    pub fn kind(&self) -> TransportKind {
        match self {
            AnyTransport::Json(_) => TransportKind::Json,
            AnyTransport::Xml(_) => TransportKind::Xml,
        }
    }
}

impl Transport for AnyTransport {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, Error> {
        match self {
            AnyTransport::Json(t) => t.call(method, params).await,
            AnyTransport::Xml(t) => t.call(method, params).await,
        }
    }
}

// =============================================================================
// HTTP SETTINGS
// =============================================================================

/// HTTP client settings shared by both bindings.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Verify the server certificate. Off only on explicit request.
    pub verify_tls: bool,
    /// Extra PEM trust anchor, for servers signed by a private CA.
    pub ca_cert: Option<PathBuf>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            verify_tls: true,
            ca_cert: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl HttpSettings {
    /// Build the underlying `reqwest` client.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);

        if let Some(path) = &self.ca_cert {
            let pem = std::fs::read(path)
                .map_err(|e| Error::Tls(format!("cannot read {}: {}", path.display(), e)))?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| Error::Tls(format!("invalid certificate {}: {}", path.display(), e)))?;
            builder = builder.add_root_certificate(cert);
        }

        if !self.verify_tls {
            warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(builder.build()?)
    }
}
