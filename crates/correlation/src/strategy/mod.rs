//! Matching strategy abstractions.
//!
//! A matching strategy pairs each response with the request it answers.
//! Transports pick the one that fits their delivery guarantees:
//!
//! - **IdMatching**: stamps every request with a fresh correlation id and
//!   pairs responses by that id
//! - **OrderedMatching**: relies on the transport delivering responses in
//!   request order and leaves ids alone

pub mod id;
pub mod ordered;

pub use id::IdMatching;
pub use ordered::OrderedMatching;

use envelope::{Message, MessageType};

use crate::error::{CorrelationError, Result};

/// Record of a request waiting for its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    /// Correlation id the request was sent with.
    pub id: i64,
    /// Kind of the pending request.
    pub request_kind: MessageType,
    /// Registration order within the strategy, starting at 0.
    pub sequence: u64,
}

impl Ticket {
    /// Check that `response` is the kind that answers this ticket's request.
    pub fn check_answer(&self, response: MessageType) -> Result<()> {
        if self.request_kind.response_type() == Some(response) {
            Ok(())
        } else {
            Err(CorrelationError::KindMismatch {
                request: self.request_kind,
                response,
            })
        }
    }
}

/// Trait for request/response matching strategies.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (Send + Sync): requests are usually
/// registered by callers while a separate receive loop resolves responses.
pub trait MatchingStrategy: Send + Sync + 'static {
    /// Record an outgoing request, stamping its id if the strategy uses ids.
    ///
    /// Fails with `NotARequest` for any other kind.
    fn register(&self, request: &mut Message) -> Result<Ticket>;

    /// Pair an incoming response with its pending request and retire it.
    ///
    /// A response that fails to match leaves the pending set untouched.
    fn resolve(&self, response: &Message) -> Result<Ticket>;

    /// Number of requests still waiting for a response.
    fn pending(&self) -> usize;

    /// Strategy name (for logging/debugging).
    fn name(&self) -> &'static str;
}

pub(crate) fn ensure_request(message: &Message) -> Result<()> {
    if message.is_request() {
        Ok(())
    } else {
        Err(CorrelationError::NotARequest(message.kind()))
    }
}

pub(crate) fn ensure_response(message: &Message) -> Result<()> {
    if message.is_response() {
        Ok(())
    } else {
        Err(CorrelationError::NotAResponse(message.kind()))
    }
}
