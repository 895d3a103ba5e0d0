use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors raised while querying a bibliographic source.
///
/// Adapters never surface these to the verifier; they are logged and the adapter
/// reports "no result".
pub enum SourceError {
    /// The source answered HTTP 429.
    #[error("rate limited")]
    RateLimited,

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Any other non-success HTTP status.
    #[error("unexpected HTTP status {code}")]
    Status {
        /// HTTP status code.
        code: u16,
    },

    /// The body could not be decoded into the expected shape.
    #[error("malformed response: {reason}")]
    Malformed {
        /// Decoder error message.
        reason: String,
    },

    /// Connection, DNS, TLS or body-read failure.
    #[error("transport error: {message}")]
    Transport {
        /// Underlying error message.
        message: String,
    },
}

impl SourceError {
    /// Only rate limiting is retried; every other failure ends the lookup.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SourceError::RateLimited)
    }

    pub(crate) fn malformed(err: impl std::fmt::Display) -> Self {
        SourceError::Malformed {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::malformed(format!("JSON: {err}"))
    }
}

impl From<quick_xml::DeError> for SourceError {
    fn from(err: quick_xml::DeError) -> Self {
        SourceError::malformed(format!("XML: {err}"))
    }
}

/// Convenience result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;
