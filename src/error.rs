//! Error types for controller actions
//!
//! Every operator action has its own failure variant carrying the detail
//! reported by the signaling client. None of these errors escape the
//! controller's public action methods: each action catches its own failure
//! and converts it into an error-severity log entry, so a failed request is
//! observable only in the log panel while the state flags simply do not
//! advance.

use thiserror::Error;

use crate::signaling::SignalingError;

/// Result type for controller-internal operations
pub type ControllerResult<T> = Result<T, ControllerError>;

/// Failures surfaced by session-controller actions
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Building or connecting the signaling client failed
    #[error("connect failed: {source}")]
    Connect {
        /// Failure reported by the signaling client
        #[source]
        source: SignalingError,
    },

    /// Tearing down the signaling client failed
    #[error("disconnect failed: {source}")]
    Disconnect {
        #[source]
        source: SignalingError,
    },

    /// The registration request was refused
    #[error("register failed: {source}")]
    Register {
        #[source]
        source: SignalingError,
    },

    /// An outbound call request was refused
    #[error("call to {target} failed: {source}")]
    Call {
        /// The address the call was attempted to
        target: String,
        #[source]
        source: SignalingError,
    },

    /// Answering the pending inbound call failed
    #[error("answer failed: {source}")]
    Answer {
        #[source]
        source: SignalingError,
    },

    /// Hanging up failed
    #[error("hangup failed: {source}")]
    Hangup {
        #[source]
        source: SignalingError,
    },

    /// The configured endpoint URL is unusable
    #[error("invalid endpoint `{url}`: {reason}")]
    InvalidEndpoint {
        /// The offending URL text
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// An action that needs a live client was requested without one
    #[error("not connected: no signaling client for `{operation}`")]
    NotConnected {
        /// The action that was attempted
        operation: &'static str,
    },

    /// A connection setting was edited while connected
    #[error("`{field}` cannot be changed while connected")]
    ConfigLocked {
        /// The setting the operator tried to edit
        field: &'static str,
    },
}

impl ControllerError {
    /// Create an [`ControllerError::InvalidEndpoint`]
    pub fn invalid_endpoint(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a [`ControllerError::NotConnected`]
    pub fn not_connected(operation: &'static str) -> Self {
        Self::NotConnected { operation }
    }
}
