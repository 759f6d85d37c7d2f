use crate::fetch::{FailureKind, FetchError};
use thiserror::Error;

/// Why a page (or a one-shot API call) could not produce data.
///
/// Schema mismatches are deliberately absent: a payload of the wrong shape
/// degrades to an empty result instead of failing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    /// A required input was missing; nothing was sent and nothing is retried.
    #[error("{0}")]
    PreconditionMissing(String),

    /// Form input rejected before any network call.
    #[error("{0}")]
    Validation(String),

    /// The request could not be built, e.g. a malformed base URL.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The server answered with an error status and said why.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The retry budget was exhausted, or the failure was not worth retrying.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl LoadError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, LoadError::Fetch(_))
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            LoadError::Fetch(err) => Some(err.kind),
            LoadError::Rejected { .. } => Some(FailureKind::HttpError),
            _ => None,
        }
    }
}
