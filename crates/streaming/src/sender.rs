//! Sending half of an in-memory envelope stream.

use bytes::Bytes;
use envelope::{Message, MessageType};
use tokio::sync::mpsc;
use tracing::debug;

use crate::codec::MessageCodec;
use crate::config::CodecConfig;
use crate::error::{Result, StreamingError};
use crate::receiver::StreamReceiver;

/// Create a connected sender/receiver pair buffering up to `capacity` frames.
///
/// Both halves share `config`, so an `IdPolicy::Omit` stream delivers
/// unmatched messages.
pub fn channel(capacity: usize, config: CodecConfig) -> (StreamSender, StreamReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    let codec = MessageCodec::new(config);
    (
        StreamSender::new(tx, codec.clone()),
        StreamReceiver::new(rx, codec),
    )
}

/// Encodes envelopes and pushes the frames into a channel.
#[derive(Clone, Debug)]
pub struct StreamSender {
    tx: mpsc::Sender<Bytes>,
    codec: MessageCodec,
}

impl StreamSender {
    pub fn new(tx: mpsc::Sender<Bytes>, codec: MessageCodec) -> Self {
        Self { tx, codec }
    }

    /// Encode and send one message, waiting for channel capacity.
    ///
    /// The message is consumed; it is encoded before anything is queued, so
    /// an `Unknown` or oversized message never reaches the receiver.
    pub async fn send(&self, message: Message) -> Result<()> {
        let frame = self.codec.encode(&message)?;
        let len = frame.len();
        self.tx
            .send(frame)
            .await
            .map_err(|_| StreamingError::ChannelClosed)?;
        debug!(kind = %message.kind(), id = message.id(), len, "sent message");
        Ok(())
    }

    /// Send a shutdown signal and close this half.
    pub async fn shutdown(self) -> Result<()> {
        self.send(Message::new(Vec::new(), Vec::new(), MessageType::Shutdown))
            .await
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
