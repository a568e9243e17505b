//! Reference transport boundary for message envelopes.
//!
//! This crate provides what a transport backend owes the envelope:
//! - A binary frame codec that round-trips kind, id, metadata and payloads
//! - Independent encoding of each tensor payload, in order
//! - An in-memory sender/receiver pair over tokio channels
//!
//! `Unknown` messages are refused on both the sending and receiving side.

pub mod codec;
pub mod config;
pub mod error;
pub mod protocol;
pub mod receiver;
pub mod sender;

pub use codec::MessageCodec;
pub use config::{CodecConfig, IdPolicy};
pub use error::{Result, StreamingError};
pub use protocol::{Message, MessageType};
pub use receiver::StreamReceiver;
pub use sender::{channel, StreamSender};
