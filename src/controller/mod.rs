//! Session controller: operator actions over the signaling client
//!
//! The controller owns the connection config, the session flags, the
//! rolling event log, and at most one live signaling-client handle. Its
//! public actions (`connect`, `disconnect`, `register`, `call`, `answer`,
//! `hangup`) are fire-and-forget requests: each one forwards to the
//! current client, converts its own failure into an error log entry, and
//! returns without touching the state flags. The flags advance only when
//! the client delivers delegate events — the controller itself is the
//! registered [`SignalingDelegate`].
//!
//! # Architecture
//!
//! ```text
//! operator ──actions──> SessionController ──requests──> SignalingClient
//!                            ▲     │                        (external)
//!                            │     └─ log entries                │
//!                            └────────── delegate events ────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use softphone_console::config::ConnectionConfig;
//! use softphone_console::controller::SessionController;
//! use softphone_console::signaling::loopback::LoopbackSignalingFactory;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ConnectionConfig::new("wss://pbx.example.com:8089/ws", "operator", "pw")
//!         .with_call_target("sip:200@pbx.example.com");
//!     let controller = SessionController::new(LoopbackSignalingFactory::new(), config);
//!
//!     let mut states = controller.subscribe();
//!     controller.connect().await;
//!     // flags advance when the server-connected event arrives
//!     let state = states.recv().await.unwrap();
//!     assert!(state.connected);
//! }
//! ```

pub mod state;

pub use state::SessionState;

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ConnectionConfig;
use crate::error::{ControllerError, ControllerResult};
use crate::events::SignalingEvent;
use crate::log::EventLog;
use crate::signaling::{
    Identity, MediaConstraints, SignalingClient, SignalingDelegate, SignalingError,
    SignalingFactory, SignalingOptions,
};

/// Coordinates session state, the event log, and the signaling client
///
/// Constructed with [`SessionController::new`], which returns an
/// `Arc` because the controller registers itself as the client's delegate.
pub struct SessionController<F: SignalingFactory> {
    factory: F,
    config: RwLock<ConnectionConfig>,
    client: RwLock<Option<Arc<dyn SignalingClient>>>,
    state: RwLock<SessionState>,
    log: EventLog,
    state_tx: broadcast::Sender<SessionState>,
    // Handle to the owning Arc, passed to clients as their delegate
    weak: Weak<Self>,
}

impl<F: SignalingFactory> SessionController<F> {
    /// Create a controller with the given factory and initial config
    pub fn new(factory: F, config: ConnectionConfig) -> Arc<Self> {
        let (state_tx, _) = broadcast::channel(64);
        Arc::new_cyclic(|weak| Self {
            factory,
            config: RwLock::new(config),
            client: RwLock::new(None),
            state: RwLock::new(SessionState::default()),
            log: EventLog::new(),
            state_tx,
            weak: weak.clone(),
        })
    }

    /// Snapshot of the current session flags
    pub async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    /// Snapshot of the current connection config
    pub async fn config(&self) -> ConnectionConfig {
        self.config.read().await.clone()
    }

    /// Handle to the shared rolling event log
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Subscribe to state snapshots published after every transition
    pub fn subscribe(&self) -> broadcast::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    // ===== operator actions =====

    /// Build a signaling client for the current config and bring up its
    /// transport. On failure nothing is retained and the state is
    /// unchanged; the failure is visible only in the log.
    pub async fn connect(&self) {
        if let Err(e) = self.try_connect().await {
            warn!(error = %e, "connect action failed");
            self.log.error(e.to_string());
        }
    }

    async fn try_connect(&self) -> ControllerResult<()> {
        if self.client.read().await.is_some() {
            return Err(ControllerError::Connect {
                source: SignalingError::Rejected("a signaling client already exists".into()),
            });
        }

        // Snapshot the config as of this request; later edits to the
        // target do not affect the client being built.
        let config = self.config.read().await.clone();
        let endpoint = config.endpoint()?;
        let local_uri = config.local_uri()?;

        // Upgrading cannot fail while a method runs on the owning Arc
        let delegate: Arc<dyn SignalingDelegate> =
            self.weak.upgrade().ok_or(ControllerError::Connect {
                source: SignalingError::Transport("controller was dropped".into()),
            })?;

        let options = SignalingOptions {
            delegate,
            media: MediaConstraints::audio_only(),
            identity: Identity {
                local_uri,
                auth_username: config.user.clone(),
                auth_password: config.secret.clone(),
            },
        };

        self.log.info(format!("connecting to {endpoint}"));
        debug!(endpoint = %endpoint, user = %config.user, "requesting transport");

        let client = self
            .factory
            .create(&endpoint, options)
            .await
            .map_err(|source| ControllerError::Connect { source })?;

        client
            .connect()
            .await
            .map_err(|source| ControllerError::Connect { source })?;

        *self.client.write().await = Some(client);
        Ok(())
    }

    /// Tear down the transport and release the client handle. The handle
    /// is dropped even when teardown fails; the terminal state change
    /// arrives later as a server-disconnected event.
    pub async fn disconnect(&self) {
        let client = self.client.write().await.take();
        let Some(client) = client else {
            self.log
                .error(ControllerError::not_connected("disconnect").to_string());
            return;
        };
        self.log.info("disconnecting");
        if let Err(source) = client.disconnect().await {
            let e = ControllerError::Disconnect { source };
            warn!(error = %e, "disconnect action failed");
            self.log.error(e.to_string());
        }
    }

    /// Request SIP registration for the configured identity
    pub async fn register(&self) {
        let result = async {
            let client = self.current_client("register").await?;
            self.log.info("sending REGISTER");
            client
                .register()
                .await
                .map_err(|source| ControllerError::Register { source })
        }
        .await;
        if let Err(e) = result {
            warn!(error = %e, "register action failed");
            self.log.error(e.to_string());
        }
    }

    /// Place an outbound call to `target`
    pub async fn call(&self, target: &str) {
        let result = async {
            let client = self.current_client("call").await?;
            self.log.info(format!("calling {target}"));
            client
                .call(target)
                .await
                .map_err(|source| ControllerError::Call {
                    target: target.to_string(),
                    source,
                })
        }
        .await;
        if let Err(e) = result {
            warn!(error = %e, "call action failed");
            self.log.error(e.to_string());
        }
    }

    /// Accept the pending inbound call
    pub async fn answer(&self) {
        let result = async {
            let client = self.current_client("answer").await?;
            self.log.info("answering");
            client
                .answer()
                .await
                .map_err(|source| ControllerError::Answer { source })
        }
        .await;
        if let Err(e) = result {
            warn!(error = %e, "answer action failed");
            self.log.error(e.to_string());
        }
    }

    /// End the active call or decline the pending inbound call
    pub async fn hangup(&self) {
        let result = async {
            let client = self.current_client("hangup").await?;
            self.log.info("hanging up");
            client
                .hangup()
                .await
                .map_err(|source| ControllerError::Hangup { source })
        }
        .await;
        if let Err(e) = result {
            warn!(error = %e, "hangup action failed");
            self.log.error(e.to_string());
        }
    }

    async fn current_client(
        &self,
        operation: &'static str,
    ) -> ControllerResult<Arc<dyn SignalingClient>> {
        self.client
            .read()
            .await
            .clone()
            .ok_or(ControllerError::not_connected(operation))
    }

    // ===== config edits =====

    /// Change the signaling endpoint URL; refused while connected
    pub async fn set_endpoint_url(&self, url: impl Into<String>) -> ControllerResult<()> {
        self.edit_locked_field("endpoint url", |c, v| c.endpoint_url = v, url.into())
            .await
    }

    /// Change the SIP user; refused while connected
    pub async fn set_user(&self, user: impl Into<String>) -> ControllerResult<()> {
        self.edit_locked_field("user", |c, v| c.user = v, user.into())
            .await
    }

    /// Change the credential secret; refused while connected
    pub async fn set_secret(&self, secret: impl Into<String>) -> ControllerResult<()> {
        self.edit_locked_field("secret", |c, v| c.secret = v, secret.into())
            .await
    }

    /// Change the default call target; allowed at any time
    pub async fn set_call_target(&self, target: impl Into<String>) {
        self.config.write().await.call_target = target.into();
    }

    async fn edit_locked_field(
        &self,
        field: &'static str,
        apply: impl FnOnce(&mut ConnectionConfig, String),
        value: String,
    ) -> ControllerResult<()> {
        if self.client.read().await.is_some() {
            return Err(ControllerError::ConfigLocked { field });
        }
        apply(&mut *self.config.write().await, value);
        Ok(())
    }

    // ===== event intake =====

    async fn handle_event(&self, event: SignalingEvent) {
        debug!(%event, "signaling event");
        let snapshot = {
            let mut state = self.state.write().await;
            state.apply(&event);
            *state
        };
        match &event {
            SignalingEvent::ServerConnected => self.log.success("connected to SIP server"),
            SignalingEvent::ServerDisconnected(detail) => {
                let message = match detail {
                    Some(d) => format!("disconnected from SIP server: {d}"),
                    None => "disconnected from SIP server".to_string(),
                };
                self.log.error(message);
            }
            SignalingEvent::Registered => self.log.success("REGISTER accepted"),
            SignalingEvent::Unregistered => self.log.info("registration removed"),
            SignalingEvent::CallReceived { .. } => self.log.info(event.to_string()),
            SignalingEvent::CallAnswered => self.log.success("call established"),
            SignalingEvent::CallHangup => self.log.info("call ended"),
        }
        let _ = self.state_tx.send(snapshot);
    }
}

#[async_trait]
impl<F: SignalingFactory> SignalingDelegate for SessionController<F> {
    async fn on_server_connect(&self) {
        self.handle_event(SignalingEvent::ServerConnected).await;
    }

    async fn on_server_disconnect(&self, error: Option<String>) {
        self.handle_event(SignalingEvent::ServerDisconnected(error))
            .await;
    }

    async fn on_registered(&self) {
        self.handle_event(SignalingEvent::Registered).await;
    }

    async fn on_unregistered(&self) {
        self.handle_event(SignalingEvent::Unregistered).await;
    }

    async fn on_call_received(&self, call_id: Uuid, caller: Option<String>) {
        self.handle_event(SignalingEvent::CallReceived { call_id, caller })
            .await;
    }

    async fn on_call_answered(&self) {
        self.handle_event(SignalingEvent::CallAnswered).await;
    }

    async fn on_call_hangup(&self) {
        self.handle_event(SignalingEvent::CallHangup).await;
    }
}
