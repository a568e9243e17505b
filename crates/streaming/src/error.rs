//! Error types for the streaming crate.

use envelope::{DType, TensorError, UnknownMessageType};
use thiserror::Error;

/// Result type alias for the streaming crate.
pub type Result<T> = std::result::Result<T, StreamingError>;

/// Errors raised while framing, transmitting or receiving envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamingError {
    /// `Unknown` is a placeholder kind and never valid on the wire.
    #[error("message kind `unknown` is not valid on the wire")]
    UnknownKind,
    /// Kind byte names no message type
    #[error(transparent)]
    InvalidKind(#[from] UnknownMessageType),
    #[error("bad frame magic {0:02x?}")]
    BadMagic([u8; 4]),
    #[error("unsupported frame version {0}")]
    UnsupportedVersion(u8),
    #[error("unsupported frame flags {0:#010b}")]
    UnsupportedFlags(u8),
    /// Frame ended before a field was complete.
    #[error("frame truncated at offset {offset}: {need} more bytes needed")]
    Truncated { offset: usize, need: usize },
    #[error("{0} trailing bytes after frame")]
    TrailingBytes(usize),
    #[error("frame of {len} bytes exceeds limit of {limit}")]
    FrameTooLarge { len: usize, limit: usize },
    #[error("metadata of {len} bytes exceeds limit of {limit}")]
    MetadataTooLarge { len: usize, limit: usize },
    #[error("unknown tensor dtype tag {0}")]
    UnknownDType(u8),
    #[error("tensor dimension {0} does not fit in memory")]
    DimensionTooLarge(u64),
    #[error("{len} bytes is not a whole number of {dtype} elements")]
    MisalignedTensorData { dtype: DType, len: u64 },
    #[error("invalid bool element {0:#04x}")]
    InvalidBool(u8),
    /// Payload shape disagrees with its element count.
    #[error("payload {index} is invalid: {source}")]
    InvalidTensor { index: usize, source: TensorError },
    /// The other end of the channel is gone.
    #[error("stream channel closed")]
    ChannelClosed,
}
