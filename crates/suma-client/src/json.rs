//! # JSON Binding
//!
//! Method calls posted as `{"methodName": ..., "params": [...]}`.
//!
//! Servers answer either with the bare result or with a
//! `{"success": bool, "result": ..., "message": ...}` envelope; both are
//! accepted.

use crate::error::Error;
use crate::transport::{HttpSettings, Transport};
use serde_json::{Value, json};
use tracing::debug;

/// JSON-over-HTTP binding.
#[derive(Debug, Clone)]
pub struct JsonRpcTransport {
    url: String,
    client: reqwest::Client,
}

impl JsonRpcTransport {
    /// Create a transport with default settings (TLS verified, 30 s timeout).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>) -> Result<Self, Error> {
        Self::with_settings(url, &HttpSettings::default())
    }

    /// Create a transport with explicit HTTP settings.
    pub fn with_settings(url: impl Into<String>, settings: &HttpSettings) -> Result<Self, Error> {
        Ok(Self {
            url: url.into(),
            client: settings.build_client()?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for JsonRpcTransport {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, Error> {
        debug!(method, binding = "json", "remote call");

        let body = json!({
            "methodName": method,
            "params": params,
        });
        let resp = self.client.post(&self.url).json(&body).send().await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let value: Value = serde_json::from_str(&text)?;
        unwrap_envelope(value)
    }
}

/// Strip a `{"success": ..., "result": ...}` envelope if there is one.
fn unwrap_envelope(value: Value) -> Result<Value, Error> {
    let Value::Object(mut map) = value else {
        return Ok(value);
    };

    match map.get("success").and_then(Value::as_bool) {
        Some(true) => Ok(map.remove("result").unwrap_or(Value::Null)),
        Some(false) => {
            let message = map
                .get("message")
                .or_else(|| map.get("error"))
                .and_then(Value::as_str)
                .unwrap_or("request failed")
                .to_string();
            Err(Error::Server(message))
        }
        None => Ok(Value::Object(map)),
    }
}
