//! Typed error taxonomy for the ingestion pipeline.
//!
//! Source and store failures are values that flow into the load report;
//! only structural misconfiguration (a duplicate slug in the bindings, a
//! store that cannot be opened) propagates out of a run as an error.

use thiserror::Error;

/// A failure talking to one upstream source.
///
/// `Timeout`, `Network`, and a retryable `HttpStatus` are transient and
/// retried up to the attempt ceiling; `Malformed` and non-retryable
/// statuses fail immediately.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request timed out")]
    Timeout,

    #[error("upstream returned HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response body: {0}")]
    Malformed(String),
}

impl SourceError {
    /// Whether this failure is worth another attempt.
    pub fn is_transient(&self, retry_statuses: &[u16]) -> bool {
        match self {
            SourceError::Timeout | SourceError::Network(_) => true,
            SourceError::HttpStatus { status } => retry_statuses.contains(status),
            SourceError::Malformed(_) => false,
        }
    }

    /// Classify a reqwest error into the taxonomy.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_decode() {
            SourceError::Malformed(err.to_string())
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

/// A failure against the durable store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database schema missing; run `qh init` first")]
    SchemaMissing,

    #[error("category slug '{0}' already belongs to another category")]
    SlugTaken(String),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Two distinct category names in the bindings fall back to the same slug.
///
/// This is a run-level configuration conflict; it aborts the run rather
/// than being silently merged.
#[derive(Debug, Error)]
#[error("duplicate category slug '{slug}' shared by '{first}' and '{second}'")]
pub struct DuplicateSlug {
    pub slug: String,
    pub first: String,
    pub second: String,
}
