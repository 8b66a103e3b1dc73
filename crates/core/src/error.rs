//! Unified error types for subdex.
//!
//! Network, timeout and parse failures never reach this type from the
//! pipeline: they degrade to absent metadata or a "not live" host. What is
//! left are input, template and filesystem errors, plus the uniform
//! [`Error::Pipeline`] returned at the pipeline boundary.

use std::path::PathBuf;

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Status code attached to unexpected pipeline failures.
pub const INTERNAL_STATUS: u16 = 500;

/// Unified error types for subdex.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty domain).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// A host name failed validation.
    #[error("INVALID_HOST: {0}")]
    InvalidHost(String),

    /// A template file could not be read.
    #[error("TEMPLATE_ERROR: {path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the rendered page failed.
    #[error("CACHE_ERROR: {path}: {source}")]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP error response or transport failure.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Fatal failure surfaced at the pipeline boundary.
    ///
    /// Carries only a fixed message naming the failing stage; the
    /// underlying cause is logged where it is replaced.
    #[error("PIPELINE_FAILED: {message}")]
    Pipeline { message: String, status: u16 },
}

impl Error {
    /// Replace this error with the uniform boundary error for `stage`.
    ///
    /// The original error is logged at `error` level and then dropped; only
    /// its status survives. Boundary errors pass through unchanged.
    pub fn at_boundary(self, stage: &str) -> Self {
        if let Error::Pipeline { .. } = self {
            return self;
        }
        tracing::error!(stage, error = %self, "pipeline stage failed");
        Error::Pipeline { message: stage.to_string(), status: self.status() }
    }

    /// HTTP-like status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            Error::InvalidInput(_) | Error::InvalidHost(_) => 400,
            Error::HttpError(_) => 502,
            Error::FetchTimeout(_) => 504,
            Error::Pipeline { status, .. } => *status,
            Error::Template { .. } | Error::CacheWrite { .. } | Error::FetchTooLarge(_) => INTERNAL_STATUS,
        }
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::InvalidHost(msg) => (-32602, msg.clone()),
            Error::Template { path, .. } => (-32000, format!("template unavailable: {}", path.display())),
            Error::CacheWrite { path, .. } => (-32002, format!("cache write failed: {}", path.display())),
            Error::HttpError(msg) => (-32008, msg.clone()),
            Error::FetchTimeout(msg) => (-32006, msg.clone()),
            Error::FetchTooLarge(msg) => (-32007, msg.clone()),
            Error::Pipeline { message, .. } => (-32603, message.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
