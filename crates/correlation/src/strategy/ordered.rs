//! Ordered (FIFO) matching.
//!
//! For transports that deliver responses in the order the requests went
//! out, e.g. one request in flight per connection. Ids are not touched:
//! requests keep whatever id they carry, usually the unmatched sentinel,
//! and responses are paired with the oldest pending request.
//!
//! # Limitations
//!
//! - A lost or reordered response shifts every later pairing
//! - Only the kind family is checked; ids are not compared

use std::collections::VecDeque;

use envelope::Message;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{CorrelationError, Result};
use crate::strategy::{ensure_request, ensure_response, MatchingStrategy, Ticket};

/// Pairs responses with requests in arrival order.
#[derive(Debug, Default)]
pub struct OrderedMatching {
    state: Mutex<OrderedState>,
}

#[derive(Debug, Default)]
struct OrderedState {
    next: u64,
    queue: VecDeque<Ticket>,
}

impl OrderedMatching {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MatchingStrategy for OrderedMatching {
    fn register(&self, request: &mut Message) -> Result<Ticket> {
        ensure_request(request)?;

        let mut state = self.state.lock();
        let ticket = Ticket {
            id: request.id(),
            request_kind: request.kind(),
            sequence: state.next,
        };
        state.next += 1;
        state.queue.push_back(ticket);
        debug!(sequence = ticket.sequence, kind = %request.kind(), "queued request");
        Ok(ticket)
    }

    fn resolve(&self, response: &Message) -> Result<Ticket> {
        ensure_response(response)?;

        let mut state = self.state.lock();
        let oldest = state.queue.front().ok_or(CorrelationError::NothingPending)?;
        if let Err(err) = oldest.check_answer(response.kind()) {
            warn!(sequence = oldest.sequence, error = %err, "unmatched response");
            metrics::counter!("envelope_responses_unmatched_total").increment(1);
            return Err(err);
        }

        let ticket = state.queue.pop_front().ok_or(CorrelationError::NothingPending)?;
        debug!(sequence = ticket.sequence, kind = %response.kind(), "matched response");
        metrics::counter!("envelope_responses_matched_total").increment(1);
        Ok(ticket)
    }

    fn pending(&self) -> usize {
        self.state.lock().queue.len()
    }

    fn name(&self) -> &'static str {
        "OrderedMatching"
    }
}
