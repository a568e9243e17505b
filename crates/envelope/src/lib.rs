//! Message envelope for the RPC transport layer.
//!
//! This crate provides the value types every transport backend and call layer
//! agree on:
//! - `Message`: metadata bytes, tensor payloads, kind tag and correlation id
//! - `MessageType`: the closed set of message kinds and their classification
//! - `Tensor`: the numeric payload carried beside the metadata
//!
//! Nothing here performs I/O or encodes its own fields. Transports own the
//! wire format; see the `streaming` crate for a reference codec.

pub mod error;
pub mod kind;
pub mod message;
pub mod tensor;

pub use error::{ParseMessageTypeError, Result, TensorError, UnknownMessageType};
pub use kind::MessageType;
pub use message::{Message, MessageParts, UNMATCHED_ID};
pub use tensor::{DType, Tensor, TensorData};
