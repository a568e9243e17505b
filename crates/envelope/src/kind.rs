//! Message kind tags.
//!
//! Every envelope carries exactly one `MessageType`. The classification
//! predicates are derived from it, so a message is a request, a response,
//! a shutdown signal, or still `Unknown`, never more than one of these.

use std::fmt;
use std::str::FromStr;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

use crate::error::{ParseMessageTypeError, UnknownMessageType};

/// Role of a message in RPC traffic.
///
/// Discriminants are stable and are what byte-oriented transports put on
/// the wire. `5` decodes to `Unknown`, so a placeholder kind can be told
/// apart from a byte that is not a kind at all.
#[repr(u8)]
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, IntoPrimitive, TryFromPrimitive,
)]
#[num_enum(error_type(name = UnknownMessageType, constructor = UnknownMessageType))]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Invocation of a built-in operator.
    OperationRequest = 0,
    /// Result of a built-in operator.
    OperationResponse = 1,
    /// Invocation of a user-supplied function.
    UserFunctionRequest = 2,
    /// Result of a user-supplied function.
    UserFunctionResponse = 3,
    /// Tells the peer to stop serving.
    Shutdown = 4,
    /// Placeholder for an envelope with no purpose yet. Never valid on the wire.
    Unknown = 5,
}

impl Default for MessageType {
    fn default() -> Self {
        MessageType::Unknown
    }
}

impl MessageType {
    /// All kinds, in discriminant order.
    pub const ALL: [MessageType; 6] = [
        MessageType::OperationRequest,
        MessageType::OperationResponse,
        MessageType::UserFunctionRequest,
        MessageType::UserFunctionResponse,
        MessageType::Shutdown,
        MessageType::Unknown,
    ];

    #[inline]
    pub fn is_request(self) -> bool {
        matches!(
            self,
            MessageType::OperationRequest | MessageType::UserFunctionRequest
        )
    }

    #[inline]
    pub fn is_response(self) -> bool {
        matches!(
            self,
            MessageType::OperationResponse | MessageType::UserFunctionResponse
        )
    }

    #[inline]
    pub fn is_shutdown(self) -> bool {
        self == MessageType::Shutdown
    }

    /// Kind of the response that answers this request kind.
    ///
    /// Returns `None` for anything that is not a request.
    pub fn response_type(self) -> Option<MessageType> {
        match self {
            MessageType::OperationRequest => Some(MessageType::OperationResponse),
            MessageType::UserFunctionRequest => Some(MessageType::UserFunctionResponse),
            _ => None,
        }
    }

    /// Wire tag of this kind.
    #[inline]
    pub fn as_u8(self) -> u8 {
        self.into()
    }

    /// Stable snake-case name, as used by `Display` and `FromStr`.
    pub fn name(self) -> &'static str {
        match self {
            MessageType::OperationRequest => "operation_request",
            MessageType::OperationResponse => "operation_response",
            MessageType::UserFunctionRequest => "user_function_request",
            MessageType::UserFunctionResponse => "user_function_response",
            MessageType::Shutdown => "shutdown",
            MessageType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MessageType {
    type Err = ParseMessageTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageType::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ParseMessageTypeError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unknown() {
        assert_eq!(MessageType::default(), MessageType::Unknown);
    }

    #[test]
    fn test_classification_is_exclusive() {
        for kind in MessageType::ALL {
            let hits = [kind.is_request(), kind.is_response(), kind.is_shutdown()]
                .iter()
                .filter(|hit| **hit)
                .count();
            if kind == MessageType::Unknown {
                assert_eq!(hits, 0, "unknown must not classify");
            } else {
                assert_eq!(hits, 1, "{kind} must classify exactly once");
            }
        }
    }

    #[test]
    fn test_response_type_pairs_requests() {
        assert_eq!(
            MessageType::OperationRequest.response_type(),
            Some(MessageType::OperationResponse)
        );
        assert_eq!(
            MessageType::UserFunctionRequest.response_type(),
            Some(MessageType::UserFunctionResponse)
        );
        assert_eq!(MessageType::OperationResponse.response_type(), None);
        assert_eq!(MessageType::Shutdown.response_type(), None);
        assert_eq!(MessageType::Unknown.response_type(), None);
    }

    #[test]
    fn test_tag_conversion() {
        for kind in MessageType::ALL {
            assert_eq!(MessageType::try_from(kind.as_u8()), Ok(kind));
        }
        assert_eq!(MessageType::try_from(6), Err(UnknownMessageType(6)));
        assert_eq!(MessageType::try_from(u8::MAX), Err(UnknownMessageType(u8::MAX)));
        assert_eq!(u8::from(MessageType::Shutdown), 4);
        assert_eq!(MessageType::try_from(5), Ok(MessageType::Unknown));
    }

    #[test]
    fn test_name_parsing() {
        for kind in MessageType::ALL {
            assert_eq!(kind.to_string().parse::<MessageType>(), Ok(kind));
        }
        assert!("builtin_op".parse::<MessageType>().is_err());
    }
}
