//! Building responses.

use envelope::{Message, Tensor};

use crate::error::{CorrelationError, Result};

/// Build the response to `request`.
///
/// The response gets the kind that answers the request's kind and is
/// stamped with the request's correlation id (which may be the unmatched
/// sentinel when the transport pairs messages itself).
pub fn reply_to(request: &Message, metadata: Vec<u8>, payloads: Vec<Tensor>) -> Result<Message> {
    let kind = request
        .kind()
        .response_type()
        .ok_or(CorrelationError::NotARequest(request.kind()))?;

    let mut response = Message::new(metadata, payloads, kind);
    response.set_id(request.id());
    Ok(response)
}
