//! Codec configuration.

use serde::{Deserialize, Serialize};

/// Whether the correlation id goes on the wire.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicy {
    /// Write the id whenever the message has one.
    #[default]
    Transmit,
    /// Never write the id. For transports that pair requests and responses
    /// on their own; received messages stay unmatched.
    Omit,
}

/// Limits and options for `MessageCodec`.
///
/// Missing fields take their default when deserialized, so a config file
/// only needs to name what it changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub id_policy: IdPolicy,
    /// Largest frame, in bytes, the codec will produce or accept.
    pub max_frame_len: usize,
    /// Largest metadata section, in bytes. Capped at `u32::MAX` by the frame format.
    pub max_metadata_len: usize,
}

impl CodecConfig {
    pub const DEFAULT_MAX_FRAME_LEN: usize = 256 * 1024 * 1024;
    pub const DEFAULT_MAX_METADATA_LEN: usize = 16 * 1024 * 1024;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id_policy(mut self, id_policy: IdPolicy) -> Self {
        self.id_policy = id_policy;
        self
    }

    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    pub fn with_max_metadata_len(mut self, max_metadata_len: usize) -> Self {
        self.max_metadata_len = max_metadata_len;
        self
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            id_policy: IdPolicy::Transmit,
            max_frame_len: Self::DEFAULT_MAX_FRAME_LEN,
            max_metadata_len: Self::DEFAULT_MAX_METADATA_LEN,
        }
    }
}
