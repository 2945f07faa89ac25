//! Error types for the fleet API client.
//!
//! # Design
//! Three layers of failure are kept apart:
//! - `ApiError` covers what the library itself does: building URLs, encoding
//!   request bodies, decoding response bodies, and host transport failures.
//! - `LogicError` is raised only by `Response::dto_or_fail` when the response
//!   is classified as failed.
//! - Errors produced by a request's mapping function are never wrapped into
//!   `ApiError`; they reach the caller verbatim through `DtoError::Mapping`.

use thiserror::Error;

/// Errors returned by connector, transport and body decoding operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The base URL joined with the endpoint and query is not a valid URL.
    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The host failed to execute the request. Non-2xx statuses are not
    /// transport failures.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be decoded into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

/// Refusal to build a DTO out of a response classified as failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unable to create a data transfer object from a failed response (status {status})")]
pub struct LogicError {
    pub status: u16,
}

/// Errors from `Response::dto_or_fail`.
#[derive(Debug, Error)]
pub enum DtoError<E> {
    #[error(transparent)]
    FailedResponse(#[from] LogicError),

    /// The mapping function's own error, untouched.
    #[error(transparent)]
    Mapping(E),
}

impl<E> DtoError<E> {
    pub fn is_failed_response(&self) -> bool {
        matches!(self, DtoError::FailedResponse(_))
    }

    /// The mapping error, if that is what this is.
    pub fn into_mapping(self) -> Option<E> {
        match self {
            DtoError::Mapping(err) => Some(err),
            DtoError::FailedResponse(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logic_error_mentions_status() {
        let err = LogicError { status: 500 };
        assert!(err.to_string().contains("failed response"));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn dto_error_is_transparent_over_mapping_error() {
        let err: DtoError<ApiError> =
            DtoError::Mapping(ApiError::DeserializationError("missing field `id`".to_string()));
        assert_eq!(err.to_string(), "deserialization failed: missing field `id`");
        assert!(!err.is_failed_response());
        assert_eq!(
            err.into_mapping(),
            Some(ApiError::DeserializationError("missing field `id`".to_string()))
        );
    }

    #[test]
    fn failed_response_converts_from_logic_error() {
        let err: DtoError<ApiError> = LogicError { status: 404 }.into();
        assert!(err.is_failed_response());
        assert!(err.into_mapping().is_none());
    }
}
