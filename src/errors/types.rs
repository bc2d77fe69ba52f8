//! Error types for the APNs push client
//!
//! Every failure a push can end in is one variant of [`PushError`]. A gateway
//! rejection is not among them: it arrives as a regular
//! [`Response`](crate::response::Response) carrying a `reason`.

use std::path::PathBuf;
use thiserror::Error;

/// Main library error type
///
/// Variants are grouped by the stage of a push that produced them, so callers
/// can tell "never left the process" from "lost on the wire" from "reply
/// could not be understood".
#[derive(Error, Debug)]
pub enum PushError {
    // Before any network I/O
    #[error("Failed to encode notification payload: {context}")]
    Encoding {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Invalid value for header '{header}': {value}")]
    InvalidHeader { header: String, value: String },

    // Network, TLS and connection failures
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Request timed out: {message}")]
    Timeout { message: String },

    #[error("Request cancelled by the caller's lifetime scope")]
    Cancelled,

    // Response received but unreadable
    #[error("Failed to decode gateway response (status {status_code}): {context}")]
    Decode {
        status_code: u16,
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Identity and setup
    #[error("Certificate error: {message}")]
    Certificate {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("File I/O error for '{path}': {operation}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Convenience type alias for Results using PushError
pub type PushResult<T> = Result<T, PushError>;

impl PushError {
    /// Create a new Encoding error with source
    pub fn encoding(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Encoding {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new Decode error with source
    pub fn decode(
        status_code: u16,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Decode {
            status_code,
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new Certificate error
    pub fn certificate(message: impl Into<String>) -> Self {
        Self::Certificate {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new Certificate error with source
    pub fn certificate_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Certificate {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new Config error with source
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new I/O error with source
    pub fn io_with_source(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Io {
            path: path.into(),
            operation: operation.into(),
            source: Some(Box::new(source)),
        }
    }

    /// True when the gateway may or may not have accepted the notification.
    ///
    /// Only a decode failure qualifies: the request reached the gateway and a
    /// status came back, but the body could not be read.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Encoding { .. } | Self::InvalidHeader { .. } => "encoding",
            Self::Transport { .. } | Self::Timeout { .. } | Self::Cancelled => "transport",
            Self::Decode { .. } => "decode",
            Self::Certificate { .. } => "certificate",
            Self::Config { .. } => "config",
            Self::Io { .. } => "io",
            Self::Internal { .. } => "internal",
        }
    }
}

impl From<std::io::Error> for PushError {
    fn from(err: std::io::Error) -> Self {
        let operation = match err.kind() {
            std::io::ErrorKind::NotFound => "file not found",
            std::io::ErrorKind::PermissionDenied => "permission denied",
            _ => "I/O operation",
        }
        .to_string();

        Self::Io {
            path: PathBuf::from("unknown"),
            operation,
            source: Some(Box::new(err)),
        }
    }
}

impl From<toml::de::Error> for PushError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config {
            message: format!("invalid TOML: {}", err.message()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<reqwest::Error> for PushError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                message: err
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| "unknown url".to_string()),
            }
        } else if err.is_builder() {
            Self::Config {
                message: "failed to build HTTP client or request".to_string(),
                source: Some(Box::new(err)),
            }
        } else {
            let message = if err.is_connect() {
                "connection failed"
            } else if err.is_request() {
                "request failed"
            } else if err.is_body() {
                "failed reading response body"
            } else {
                "HTTP transport failure"
            };
            Self::Transport {
                message: message.to_string(),
                source: Some(Box::new(err)),
            }
        }
    }
}
