//! Error types for request/response matching.

use envelope::MessageType;
use thiserror::Error;

/// Result type alias for the correlation crate.
pub type Result<T> = std::result::Result<T, CorrelationError>;

/// Errors raised while pairing responses with requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrelationError {
    #[error("message of kind {0} is not a request")]
    NotARequest(MessageType),
    #[error("message of kind {0} is not a response")]
    NotAResponse(MessageType),
    /// Id matching needs the response to carry the request's id.
    #[error("response carries no correlation id")]
    MissingId,
    /// No request with this id is waiting, or it was already answered.
    #[error("no pending request with id {0}")]
    UnknownId(i64),
    #[error("no pending request to pair with")]
    NothingPending,
    #[error("{response} does not answer a {request}")]
    KindMismatch {
        request: MessageType,
        response: MessageType,
    },
}
