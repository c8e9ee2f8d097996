//! Connection configuration for the signaling endpoint
//!
//! Holds everything the operator can edit before connecting: the WebSocket
//! URL of the signaling server, the SIP user and its credential secret, and
//! the default call target. The first three are frozen while a connection
//! is up (the controller snapshots the config at `connect()` and refuses
//! edits until `disconnect()`); the call target stays editable at any time.
//!
//! # Examples
//!
//! ```rust
//! use softphone_console::config::ConnectionConfig;
//!
//! let config = ConnectionConfig::new(
//!     "wss://pbx.example.com:8089/ws",
//!     "operator",
//!     "secret123",
//! )
//! .with_call_target("sip:200@pbx.example.com");
//!
//! assert_eq!(config.local_uri().unwrap(), "sip:operator@pbx.example.com");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ControllerError;

/// Operator-editable connection settings
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// WebSocket URL of the signaling server (`ws://` or `wss://`)
    pub endpoint_url: String,
    /// SIP user part of the local identity, also the auth username
    pub user: String,
    /// Credential secret presented on authentication challenges
    pub secret: String,
    /// Default target address for outbound calls
    pub call_target: String,
}

impl ConnectionConfig {
    /// Create a config with the given endpoint and credentials
    pub fn new(
        endpoint_url: impl Into<String>,
        user: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            user: user.into(),
            secret: secret.into(),
            call_target: String::new(),
        }
    }

    /// Set the default outbound call target
    pub fn with_call_target(mut self, target: impl Into<String>) -> Self {
        self.call_target = target.into();
        self
    }

    /// Parse and validate the endpoint URL
    ///
    /// The URL must parse, use a `ws` or `wss` scheme, and carry a host.
    pub fn endpoint(&self) -> Result<Url, ControllerError> {
        let url = Url::parse(&self.endpoint_url)
            .map_err(|e| ControllerError::invalid_endpoint(&self.endpoint_url, e.to_string()))?;
        match url.scheme() {
            "ws" | "wss" => {}
            other => {
                return Err(ControllerError::invalid_endpoint(
                    &self.endpoint_url,
                    format!("unsupported scheme `{other}`, expected ws or wss"),
                ));
            }
        }
        if url.host_str().is_none() {
            return Err(ControllerError::invalid_endpoint(
                &self.endpoint_url,
                "missing host",
            ));
        }
        Ok(url)
    }

    /// Local SIP identity derived from the user and the endpoint host
    pub fn local_uri(&self) -> Result<String, ControllerError> {
        let url = self.endpoint()?;
        // endpoint() guarantees a host is present
        let host = url.host_str().unwrap_or_default();
        Ok(format!("sip:{}@{}", self.user, host))
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new("wss://127.0.0.1:8089/ws", "webrtc_client", "webrtc_client")
            .with_call_target("sip:200@127.0.0.1")
    }
}

// The secret never appears in Debug output or tracing fields.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("endpoint_url", &self.endpoint_url)
            .field("user", &self.user)
            .field("secret", &"<redacted>")
            .field("call_target", &self.call_target)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_accepts_ws_and_wss() {
        let config = ConnectionConfig::new("ws://10.0.0.5:8088/ws", "alice", "pw");
        assert!(config.endpoint().is_ok());

        let config = ConnectionConfig::new("wss://pbx.example.com:8089/ws", "alice", "pw");
        assert!(config.endpoint().is_ok());
    }

    #[test]
    fn endpoint_rejects_other_schemes_and_garbage() {
        let config = ConnectionConfig::new("https://pbx.example.com/ws", "alice", "pw");
        assert!(matches!(
            config.endpoint(),
            Err(ControllerError::InvalidEndpoint { .. })
        ));

        let config = ConnectionConfig::new("not a url", "alice", "pw");
        assert!(config.endpoint().is_err());
    }

    #[test]
    fn local_uri_uses_endpoint_host() {
        let config = ConnectionConfig::new("wss://pbx.example.com:8089/ws", "alice", "pw");
        assert_eq!(config.local_uri().unwrap(), "sip:alice@pbx.example.com");
    }

    #[test]
    fn debug_redacts_secret() {
        let config = ConnectionConfig::new("wss://pbx.example.com/ws", "alice", "hunter2");
        let rendered = format!("{config:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn loads_from_json() {
        let json = r#"{
            "endpoint_url": "wss://pbx.example.com:8089/ws",
            "user": "operator",
            "secret": "pw",
            "call_target": "sip:200@pbx.example.com"
        }"#;
        let config: ConnectionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.user, "operator");
        assert_eq!(config.call_target, "sip:200@pbx.example.com");
    }
}
