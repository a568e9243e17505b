//! Frame layout.
//!
//! ```text
//! ┌───────┬─────────┬──────┬───────┬──────────┬──────────┬──────────┬───────────┬──────────────┐
//! │ magic │ version │ kind │ flags │ [id i64] │ meta_len │ metadata │ n_payload │ payloads ... │
//! │  4 B  │   1 B   │ 1 B  │  1 B  │   8 B    │  u32 BE  │          │  u32 BE   │              │
//! └───────┴─────────┴──────┴───────┴──────────┴──────────┴──────────┴───────────┴──────────────┘
//!
//! payload: dtype u8 │ ndim u32 BE │ dims u64 BE * ndim │ byte_len u64 BE │ elements (little-endian)
//! ```
//!
//! The id is present only when `FLAG_HAS_ID` is set; a frame without it
//! decodes to an unmatched message. Kind and dtype bytes are the
//! discriminants of `MessageType` and `DType`.

pub use envelope::{DType, Message, MessageType};

/// Frame magic.
pub const MAGIC: [u8; 4] = *b"RPCE";

/// Current frame version.
pub const VERSION: u8 = 1;

/// Set when the frame carries a correlation id.
pub const FLAG_HAS_ID: u8 = 0b0000_0001;

/// Every flag bit this version understands.
pub const KNOWN_FLAGS: u8 = FLAG_HAS_ID;

/// Magic, version, kind and flags.
pub const HEADER_LEN: usize = MAGIC.len() + 3;

/// Smallest possible encoded payload: dtype, ndim and byte_len.
pub const MIN_PAYLOAD_LEN: usize = 1 + 4 + 8;
