//! Consumed contract of the external signaling client
//!
//! All SIP protocol behavior — REGISTER transactions, INVITE/ACK/BYE
//! dialogs, SDP offer/answer, retransmission, authentication — lives behind
//! this boundary. The traits here describe only what this application
//! consumes: construction against an endpoint plus [`SignalingOptions`],
//! six fire-and-forget request methods, and seven asynchronous delegate
//! callbacks.
//!
//! The contract guarantees that delegate callbacks are serialized (at most
//! one runs at a time) but makes no promise about their ordering relative
//! to method-call completion. A `connect()` may resolve before or after
//! [`SignalingDelegate::on_server_connect`] fires.
//!
//! [`loopback`] provides the one in-process implementation shipped with
//! this repository, used by the demo binary and the test suite.

pub mod loopback;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// Failures reported by a signaling client
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignalingError {
    /// The transport to the signaling server failed
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server or far end refused the request
    #[error("rejected: {0}")]
    Rejected(String),

    /// `answer()` or `hangup()` with no call to act on
    #[error("no active or pending call")]
    NoActiveCall,

    /// The request needs an active registration
    #[error("not registered")]
    NotRegistered,
}

/// Media requested from the signaling client
///
/// The console is an audio-only endpoint; video is never requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    /// Request a microphone capture track
    pub audio: bool,
    /// Request a camera capture track
    pub video: bool,
}

impl MediaConstraints {
    /// Audio capture only, no video
    pub fn audio_only() -> Self {
        Self {
            audio: true,
            video: false,
        }
    }
}

/// Identity and authorization material for the local endpoint
#[derive(Debug, Clone)]
pub struct Identity {
    /// Local SIP URI, e.g. `sip:operator@pbx.example.com`
    pub local_uri: String,
    /// Username presented on authentication challenges
    pub auth_username: String,
    /// Secret presented on authentication challenges
    pub auth_password: String,
}

/// Everything a signaling client needs besides the endpoint URL
#[derive(Clone)]
pub struct SignalingOptions {
    /// Receiver of the asynchronous event callbacks
    pub delegate: Arc<dyn SignalingDelegate>,
    /// Media to request when calls are set up
    pub media: MediaConstraints,
    /// Local identity and credentials
    pub identity: Identity,
}

/// Asynchronous event callbacks fired by the signaling client
///
/// All methods default to no-ops so implementors only override what they
/// observe. The client invokes at most one callback at a time.
#[async_trait]
pub trait SignalingDelegate: Send + Sync + 'static {
    /// Transport to the signaling server came up
    async fn on_server_connect(&self) {}

    /// Transport was lost or torn down
    async fn on_server_disconnect(&self, _error: Option<String>) {}

    /// SIP registration was accepted
    async fn on_registered(&self) {}

    /// SIP registration was removed or expired
    async fn on_unregistered(&self) {}

    /// An inbound call is ringing
    async fn on_call_received(&self, _call_id: uuid::Uuid, _caller: Option<String>) {}

    /// A call was answered and is now active
    async fn on_call_answered(&self) {}

    /// The active or pending call ended
    async fn on_call_hangup(&self) {}
}

/// Request surface of the signaling client
///
/// Each method issues a request and resolves when the client has accepted
/// or refused it; the corresponding state change is signaled later through
/// the delegate, independently of the method's own outcome.
#[async_trait]
pub trait SignalingClient: Send + Sync + 'static {
    /// Establish the transport to the signaling server
    async fn connect(&self) -> Result<(), SignalingError>;

    /// Tear down the transport
    async fn disconnect(&self) -> Result<(), SignalingError>;

    /// Send a SIP registration for the configured identity
    async fn register(&self) -> Result<(), SignalingError>;

    /// Place an outbound call to `target`
    async fn call(&self, target: &str) -> Result<(), SignalingError>;

    /// Accept the pending inbound call
    async fn answer(&self) -> Result<(), SignalingError>;

    /// End the active call or decline the pending inbound call
    async fn hangup(&self) -> Result<(), SignalingError>;
}

/// Constructor for signaling clients
///
/// The session controller builds one client per connection through this
/// trait, which keeps the external library swappable and lets tests supply
/// capturing fakes.
#[async_trait]
pub trait SignalingFactory: Send + Sync + 'static {
    /// Build a client bound to `endpoint` with the given options
    async fn create(
        &self,
        endpoint: &Url,
        options: SignalingOptions,
    ) -> Result<Arc<dyn SignalingClient>, SignalingError>;
}
