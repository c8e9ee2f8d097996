//! Signaling events delivered by the external client
//!
//! The signaling client notifies the application through seven delegate
//! callbacks (see [`crate::signaling::SignalingDelegate`]). This module
//! collapses those callbacks into a single [`SignalingEvent`] enum so that
//! session-state transitions are an ordinary fold over an event sequence,
//! which is how the controller applies them and how the tests check them.
//!
//! Events are authoritative: the controller never advances its flags from
//! its own requests, only from events. A `connect()` request that succeeds
//! at the transport layer still leaves the state untouched until
//! [`SignalingEvent::ServerConnected`] arrives.

use std::fmt;

use uuid::Uuid;

/// An asynchronous notification from the signaling client
///
/// Ordering relative to method-call completion is not guaranteed by the
/// external contract; consumers must treat these as the only source of
/// truth for session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalingEvent {
    /// Transport to the signaling server is up
    ServerConnected,
    /// Transport was lost or torn down, with an optional error detail
    ServerDisconnected(Option<String>),
    /// SIP registration was accepted
    Registered,
    /// SIP registration was removed or expired
    Unregistered,
    /// An inbound call is ringing and awaiting `answer()`
    CallReceived {
        /// Identifier the backend assigned to the inbound call
        call_id: Uuid,
        /// Address of the calling party, when the backend knows it
        caller: Option<String>,
    },
    /// A call (inbound or outbound) was answered and is now active
    CallAnswered,
    /// The active or pending call ended
    CallHangup,
}

impl fmt::Display for SignalingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServerConnected => write!(f, "server connected"),
            Self::ServerDisconnected(None) => write!(f, "server disconnected"),
            Self::ServerDisconnected(Some(detail)) => {
                write!(f, "server disconnected: {detail}")
            }
            Self::Registered => write!(f, "registered"),
            Self::Unregistered => write!(f, "unregistered"),
            Self::CallReceived { caller: Some(c), .. } => write!(f, "incoming call from {c}"),
            Self::CallReceived { caller: None, .. } => write!(f, "incoming call"),
            Self::CallAnswered => write!(f, "call answered"),
            Self::CallHangup => write!(f, "call ended"),
        }
    }
}
