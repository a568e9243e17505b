//! Id-based matching.
//!
//! Every registered request gets a fresh, non-negative correlation id. The
//! peer echoes that id into its response, and the response is paired by
//! looking the id up among pending requests. Responses may arrive in any
//! order.
//!
//! # Algorithm
//!
//! 1. `register`: allocate the next id that is not pending, `set_id` it on
//!    the request, record a ticket
//! 2. `resolve`: require a response kind and an id, then remove the ticket
//!    for that id if the response kind answers the request kind
//!
//! # Performance
//!
//! - **Time**: O(1) expected for both operations (sharded hash map)
//! - **Space**: O(p) where p = pending requests

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use envelope::Message;
use tracing::{debug, warn};

use crate::error::{CorrelationError, Result};
use crate::strategy::{ensure_request, ensure_response, MatchingStrategy, Ticket};

/// Pairs responses with requests by correlation id.
///
/// Any id a caller put on the request before `register` is overwritten.
#[derive(Debug, Default)]
pub struct IdMatching {
    next: AtomicU64,
    pending: DashMap<i64, Ticket>,
}

impl IdMatching {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a request with `id` is still waiting.
    pub fn is_pending(&self, id: i64) -> bool {
        self.pending.contains_key(&id)
    }

    /// Forget a pending request, e.g. after the caller gave up on it.
    pub fn cancel(&self, id: i64) -> Option<Ticket> {
        self.pending.remove(&id).map(|(_, ticket)| ticket)
    }
}

impl MatchingStrategy for IdMatching {
    fn register(&self, request: &mut Message) -> Result<Ticket> {
        ensure_request(request)?;

        let ticket = loop {
            let sequence = self.next.fetch_add(1, Ordering::Relaxed);
            // Masking keeps ids non-negative, so the unmatched sentinel is never handed out.
            let id = (sequence & i64::MAX as u64) as i64;
            // After wrapping, an id can still belong to a request nobody answered.
            match self.pending.entry(id) {
                Entry::Occupied(_) => {
                    warn!(id, "correlation id still pending, skipping");
                }
                Entry::Vacant(slot) => {
                    break *slot.insert(Ticket {
                        id,
                        request_kind: request.kind(),
                        sequence,
                    });
                }
            }
        };
        let id = ticket.id;

        request.set_id(id);
        debug!(id, kind = %request.kind(), "registered request");
        Ok(ticket)
    }

    fn resolve(&self, response: &Message) -> Result<Ticket> {
        ensure_response(response)?;
        let id = response.correlation().ok_or(CorrelationError::MissingId)?;

        let removed = self
            .pending
            .remove_if(&id, |_, ticket| ticket.check_answer(response.kind()).is_ok());

        match removed {
            Some((_, ticket)) => {
                debug!(id, kind = %response.kind(), "matched response");
                metrics::counter!("envelope_responses_matched_total").increment(1);
                Ok(ticket)
            }
            None => {
                metrics::counter!("envelope_responses_unmatched_total").increment(1);
                let err = match self.pending.get(&id) {
                    Some(ticket) => ticket
                        .check_answer(response.kind())
                        .err()
                        .unwrap_or(CorrelationError::UnknownId(id)),
                    None => CorrelationError::UnknownId(id),
                };
                warn!(id, error = %err, "unmatched response");
                Err(err)
            }
        }
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }

    fn name(&self) -> &'static str {
        "IdMatching"
    }
}
