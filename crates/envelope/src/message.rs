//! The message envelope.
//!
//! A `Message` bundles four fields:
//! - `metadata`: opaque bytes whose meaning belongs to the call layer and its codec
//! - `payloads`: tensors kept out of the metadata so a transport can stream
//!   them one by one instead of building a single huge buffer
//! - `kind`: the `MessageType` of the message
//! - `id`: correlation id pairing a response with its request
//!
//! The call layer only turns requests and responses into messages. How a
//! message is put on the wire is up to the transport.

use std::fmt;
use std::mem;

use serde::{Deserialize, Serialize};

use crate::kind::MessageType;
use crate::tensor::Tensor;

/// Correlation id of a message that has not been paired with anything.
pub const UNMATCHED_ID: i64 = -1;

/// One unit of RPC traffic.
///
/// A plain value: equality covers every field, `clone()` copies the
/// metadata and every payload, and moving a message transfers its buffers
/// without copying them. Nothing here validates `kind`; keeping `Unknown`
/// messages off the wire is the caller's job.
///
/// Payload elements compare by value, so a message whose float payload holds
/// NaN is not equal to itself or to its clone, even though every byte matches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    metadata: Vec<u8>,
    payloads: Vec<Tensor>,
    kind: MessageType,
    id: i64,
}

/// Owned fields of a message, for callers that need to take it apart.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageParts {
    pub metadata: Vec<u8>,
    pub payloads: Vec<Tensor>,
    pub kind: MessageType,
    pub id: i64,
}

impl Message {
    /// Build a message from owned buffers. The id starts unmatched.
    pub fn new(metadata: Vec<u8>, payloads: Vec<Tensor>, kind: MessageType) -> Self {
        Self::with_id(metadata, payloads, kind, UNMATCHED_ID)
    }

    /// Build a message whose id is already known, e.g. a response echoing
    /// its request's id.
    pub fn with_id(metadata: Vec<u8>, payloads: Vec<Tensor>, kind: MessageType, id: i64) -> Self {
        Self {
            metadata,
            payloads,
            kind,
            id,
        }
    }

    #[inline]
    pub fn metadata(&self) -> &[u8] {
        &self.metadata
    }

    #[inline]
    pub fn payloads(&self) -> &[Tensor] {
        &self.payloads
    }

    #[inline]
    pub fn kind(&self) -> MessageType {
        self.kind
    }

    #[inline]
    pub fn is_request(&self) -> bool {
        self.kind.is_request()
    }

    #[inline]
    pub fn is_response(&self) -> bool {
        self.kind.is_response()
    }

    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.kind.is_shutdown()
    }

    /// Correlation id, `UNMATCHED_ID` when unset.
    #[inline]
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Stamp the correlation id. Must not change once the message is sent.
    #[inline]
    pub fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    /// Reset the id to `UNMATCHED_ID`.
    #[inline]
    pub fn clear_id(&mut self) {
        self.id = UNMATCHED_ID;
    }

    /// Correlation id as an option; the sentinel maps to `None`.
    pub fn correlation(&self) -> Option<i64> {
        self.has_id().then_some(self.id)
    }

    #[inline]
    pub fn has_id(&self) -> bool {
        self.id != UNMATCHED_ID
    }

    /// Exchange the full contents of two messages.
    #[inline]
    pub fn swap(&mut self, other: &mut Message) {
        mem::swap(self, other);
    }

    /// Move the contents out, leaving `self` as `Message::default()`.
    #[inline]
    pub fn take(&mut self) -> Message {
        mem::take(self)
    }

    /// Consume the message, returning its owned fields.
    pub fn into_parts(self) -> MessageParts {
        MessageParts {
            metadata: self.metadata,
            payloads: self.payloads,
            kind: self.kind,
            id: self.id,
        }
    }

    /// Total bytes held by metadata and payload storage.
    pub fn byte_len(&self) -> usize {
        self.metadata.len() + self.payloads.iter().map(Tensor::byte_len).sum::<usize>()
    }
}

impl Default for Message {
    /// Placeholder: no metadata, no payloads, `Unknown` kind, unmatched id.
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new(), MessageType::Unknown)
    }
}

impl From<MessageParts> for Message {
    fn from(parts: MessageParts) -> Self {
        Self::with_id(parts.metadata, parts.payloads, parts.kind, parts.id)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Message(kind={}, id={}, meta={}B, payloads={})",
            self.kind,
            self.id,
            self.metadata.len(),
            self.payloads.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_message() {
        let message = Message::default();
        assert_eq!(message.kind(), MessageType::Unknown);
        assert_eq!(message.id(), UNMATCHED_ID);
        assert!(message.metadata().is_empty());
        assert!(message.payloads().is_empty());
        assert!(!message.is_request());
        assert!(!message.is_response());
        assert!(!message.is_shutdown());
        assert_eq!(message.correlation(), None);
    }

    #[test]
    fn test_new_leaves_id_unmatched() {
        let message = Message::new(vec![1], vec![], MessageType::Shutdown);
        assert_eq!(message.id(), -1);
        assert!(!message.has_id());
        assert!(message.is_shutdown());
    }

    #[test]
    fn test_set_and_clear_id() {
        let mut message = Message::new(vec![], vec![], MessageType::OperationRequest);
        message.set_id(7);
        assert_eq!(message.id(), 7);
        assert_eq!(message.correlation(), Some(7));

        message.clear_id();
        assert_eq!(message.id(), UNMATCHED_ID);
        assert_eq!(message.correlation(), None);
    }

    #[test]
    fn test_negative_ids_other_than_sentinel_are_ids() {
        let message = Message::with_id(vec![], vec![], MessageType::OperationRequest, -2);
        assert_eq!(message.correlation(), Some(-2));
    }

    #[test]
    fn test_take_leaves_default() {
        let mut source = Message::with_id(vec![9, 9], vec![], MessageType::OperationResponse, 3);
        let moved = source.take();
        assert_eq!(moved.metadata(), &[9, 9]);
        assert_eq!(moved.id(), 3);
        assert_eq!(source, Message::default());
    }

    #[test]
    fn test_parts_round_trip() {
        let message = Message::with_id(
            vec![4, 5],
            vec![Tensor::vector(vec![1.5f64])],
            MessageType::UserFunctionRequest,
            11,
        );
        let rebuilt = Message::from(message.clone().into_parts());
        assert_eq!(rebuilt, message);
    }

    #[test]
    fn test_nan_payload_compares_unequal() {
        let message = Message::new(
            vec![],
            vec![Tensor::vector(vec![f32::NAN])],
            MessageType::OperationResponse,
        );
        let copy = message.clone();
        assert_ne!(copy, message);
        assert_eq!(copy.metadata(), message.metadata());
        assert_eq!(copy.kind(), message.kind());
        assert_eq!(copy.id(), message.id());
    }

    #[test]
    fn test_byte_len_and_display() {
        let message = Message::with_id(
            vec![0; 10],
            vec![Tensor::vector(vec![0f32; 4]), Tensor::vector(vec![0u8; 3])],
            MessageType::OperationRequest,
            1,
        );
        assert_eq!(message.byte_len(), 10 + 16 + 3);
        assert_eq!(
            message.to_string(),
            "Message(kind=operation_request, id=1, meta=10B, payloads=2)"
        );
    }
}
