//! Error types for the envelope crate.
//!
//! `Message` operations never fail. The errors below come from building
//! tensor payloads and from converting raw kind tags.

use thiserror::Error;

/// Result type alias for payload construction.
pub type Result<T> = std::result::Result<T, TensorError>;

/// Errors that can occur while building a tensor payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TensorError {
    /// Shape does not describe the number of supplied elements.
    #[error("shape {shape:?} describes {expected} elements but {actual} were supplied")]
    ShapeMismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },
    /// Product of the dimensions does not fit in `usize`.
    #[error("shape {0:?} overflows the addressable element count")]
    ShapeOverflow(Vec<usize>),
}

/// Raw tag that names no message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown message type tag {0}")]
pub struct UnknownMessageType(pub u8);

/// Name that names no message kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised message type `{0}`")]
pub struct ParseMessageTypeError(pub String);
