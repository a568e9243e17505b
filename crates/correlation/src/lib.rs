//! Request/response matching for message envelopes.
//!
//! This crate provides pluggable matching strategies that decide:
//! - Which correlation id a request goes out with
//! - Which pending request an incoming response answers
//! - Whether the response kind fits the request kind

pub mod error;
pub mod reply;
pub mod strategy;

pub use error::{CorrelationError, Result};
pub use reply::reply_to;
pub use strategy::{IdMatching, MatchingStrategy, OrderedMatching, Ticket};
