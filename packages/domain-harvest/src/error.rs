//! Typed errors for the harvesting library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell a
//! retryable transport failure from a bad payload or a broken state file.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while harvesting search results.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Network or HTTP failure while fetching a page.
    ///
    /// `status` is `None` when no HTTP response was received at all.
    #[error("transport error for {url}: {message}")]
    Transport {
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// The search API answered with a payload we do not understand.
    #[error("parse error for {url}: {message}")]
    Parse { url: String, message: String },

    /// Seen-domain state could not be read or written.
    #[error("storage error at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Invalid configuration (unknown country, bad settings file, ...).
    #[error("config error: {0}")]
    Config(String),

    /// Result sink rejected the bundle.
    #[error("sink error: {0}")]
    Sink(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl HarvestError {
    /// Build a transport error from a status-less failure message.
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            status: None,
            message: message.into(),
        }
    }

    /// Build a transport error carrying an HTTP status.
    pub fn http_status(url: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn parse(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn storage(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Storage {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Whether retrying the same request might succeed.
    ///
    /// Connection failures, rate limiting (429) and server errors (5xx) are
    /// retryable. Everything else, including API-level refusals delivered
    /// with a 2xx status, is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { status: None, .. } => true,
            Self::Transport {
                status: Some(code), ..
            } => *code == 429 || (500..600).contains(code),
            _ => false,
        }
    }
}

/// Result type alias for harvesting operations.
pub type Result<T> = std::result::Result<T, HarvestError>;
