//! Receiving half of an in-memory envelope stream.

use bytes::Bytes;
use envelope::Message;
use tokio::sync::mpsc;
use tracing::debug;

use crate::codec::MessageCodec;
use crate::error::Result;

/// Pulls frames from a channel and decodes them back into envelopes.
#[derive(Debug)]
pub struct StreamReceiver {
    rx: mpsc::Receiver<Bytes>,
    codec: MessageCodec,
    shut_down: bool,
}

impl StreamReceiver {
    pub fn new(rx: mpsc::Receiver<Bytes>, codec: MessageCodec) -> Self {
        Self {
            rx,
            codec,
            shut_down: false,
        }
    }

    /// Wait for the next message.
    ///
    /// Returns `Ok(None)` once every sender is gone. A frame that fails to
    /// decode is reported and dropped; the stream stays usable.
    pub async fn recv(&mut self) -> Result<Option<Message>> {
        let Some(frame) = self.rx.recv().await else {
            debug!("stream closed");
            return Ok(None);
        };

        let message = self.codec.decode(&frame)?;
        if message.is_shutdown() {
            debug!("received shutdown signal");
            self.shut_down = true;
        } else {
            debug!(kind = %message.kind(), id = message.id(), len = frame.len(), "received message");
        }
        Ok(Some(message))
    }

    /// Whether a shutdown message has been received.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}
