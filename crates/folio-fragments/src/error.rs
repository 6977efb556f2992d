//! Transport error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("DNS resolution failed: {0}")]
    Dns(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("TLS handshake failed: {0}")]
    Tls(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Invalid fragment root: {0}")]
    InvalidRoot(String),
}

impl TransportError {
    /// Short machine-readable kind, used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Timeout(_) => "timeout",
            TransportError::Dns(_) => "dns",
            TransportError::Connect(_) => "connect",
            TransportError::Tls(_) => "tls",
            TransportError::Request(_) => "request",
            TransportError::Io(_) => "io",
            TransportError::InvalidRoot(_) => "invalid_root",
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let msg = e.to_string();

        if e.is_timeout() {
            return TransportError::Timeout(msg);
        }

        if e.is_connect() {
            let lowered = msg.to_lowercase();
            if lowered.contains("dns") || lowered.contains("resolve") || lowered.contains("name")
            {
                return TransportError::Dns(msg);
            }
            if lowered.contains("tls")
                || lowered.contains("certificate")
                || lowered.contains("handshake")
            {
                return TransportError::Tls(msg);
            }
            return TransportError::Connect(msg);
        }

        TransportError::Request(msg)
    }
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::TimedOut {
            TransportError::Timeout(e.to_string())
        } else {
            TransportError::Io(e.to_string())
        }
    }
}
