use thiserror::Error;

/// Errors from the remote API client.
#[derive(Debug, Error)]
pub enum Error {
    /// The request never got a response (connection refused, timeout, TLS handshake...).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success HTTP status.
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body is not valid JSON, or a value has the wrong shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response body is not valid XML-RPC.
    #[error("XML error: {0}")]
    Xml(String),

    /// The response decoded but is not what the method promises.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// XML-RPC fault response.
    #[error("Fault {code}: {message}")]
    Fault { code: i64, message: String },

    /// JSON envelope with `success: false`.
    #[error("Server error: {0}")]
    Server(String),

    /// The configured trust anchor could not be loaded.
    #[error("TLS error: {0}")]
    Tls(String),
}

impl Error {
    /// True when the call failed before any response arrived.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// True when the server answered and refused the call.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Error::Status { .. } | Error::Fault { .. } | Error::Server(_)
        )
    }
}
