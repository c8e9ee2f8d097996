//! In-process loopback implementation of the signaling contract
//!
//! Stands in for the external SIP library so the demo binary and the test
//! suite can exercise the full controller surface without a signaling
//! server. The far end always "answers" outbound calls after a short ring,
//! and inbound calls can be injected with [`LoopbackSignalingClient::ring`].
//!
//! Delegate callbacks are serialized through a single dispatch task per
//! client, mirroring the external contract's at-most-one-callback rule.
//! Delays carry a little random jitter by default; tests construct the
//! factory with [`LoopbackSignalingFactory::immediate`] to remove them.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use tokio::sync::mpsc;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::events::SignalingEvent;
use crate::signaling::{
    SignalingClient, SignalingDelegate, SignalingError, SignalingFactory, SignalingOptions,
};

/// Operations the loopback backend can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopbackOp {
    /// Fail client construction itself
    Create,
    /// Fail the transport bring-up request
    Connect,
    /// Fail the transport teardown request
    Disconnect,
    /// Fail the registration request
    Register,
    /// Fail outbound call setup
    Call,
    /// Fail answering the pending inbound call
    Answer,
    /// Fail call termination
    Hangup,
}

#[derive(Debug, Clone, Default)]
struct Behavior {
    immediate: bool,
    fail: HashSet<LoopbackOp>,
}

impl Behavior {
    fn short_delay(&self) -> Duration {
        if self.immediate {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(40..=120))
        }
    }

    fn ring_delay(&self) -> Duration {
        if self.immediate {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(300..=700))
        }
    }

    fn check(&self, op: LoopbackOp) -> Result<(), SignalingError> {
        if self.fail.contains(&op) {
            Err(SignalingError::Rejected(format!(
                "loopback configured to fail {op:?}"
            )))
        } else {
            Ok(())
        }
    }
}

/// Factory producing [`LoopbackSignalingClient`] instances
///
/// Keeps a handle to the most recently created client so the demo console
/// can inject inbound calls.
#[derive(Clone, Default)]
pub struct LoopbackSignalingFactory {
    behavior: Behavior,
    last: Arc<Mutex<Option<Arc<LoopbackSignalingClient>>>>,
}

impl LoopbackSignalingFactory {
    /// Factory with realistic (jittered) event delays
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory that fires every event without delay, for tests
    pub fn immediate() -> Self {
        Self {
            behavior: Behavior {
                immediate: true,
                ..Behavior::default()
            },
            last: Arc::default(),
        }
    }

    /// Configure the named operation to fail
    pub fn fail_on(mut self, op: LoopbackOp) -> Self {
        self.behavior.fail.insert(op);
        self
    }

    /// The most recently created client, if any
    pub fn last_client(&self) -> Option<Arc<LoopbackSignalingClient>> {
        self.last.lock().clone()
    }
}

#[async_trait]
impl SignalingFactory for LoopbackSignalingFactory {
    async fn create(
        &self,
        endpoint: &Url,
        options: SignalingOptions,
    ) -> Result<Arc<dyn SignalingClient>, SignalingError> {
        self.behavior.check(LoopbackOp::Create)?;
        debug!(endpoint = %endpoint, identity = %options.identity.local_uri, "creating loopback client");
        let client = Arc::new(LoopbackSignalingClient::start(
            self.behavior.clone(),
            options,
        ));
        *self.last.lock() = Some(client.clone());
        Ok(client)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallPhase {
    Idle,
    Ringing,
    Active,
}

struct Emission {
    delay: Duration,
    event: SignalingEvent,
}

/// A signaling client whose far end is simulated in-process
pub struct LoopbackSignalingClient {
    tx: mpsc::UnboundedSender<Emission>,
    behavior: Behavior,
    call: Mutex<CallPhase>,
}

impl LoopbackSignalingClient {
    fn start(behavior: Behavior, options: SignalingOptions) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(dispatch(rx, options.delegate));
        Self {
            tx,
            behavior,
            call: Mutex::new(CallPhase::Idle),
        }
    }

    fn emit(&self, delay: Duration, event: SignalingEvent) {
        // Receiver only goes away when the dispatch task is torn down
        let _ = self.tx.send(Emission { delay, event });
    }

    /// Inject an inbound call (demo and test hook)
    pub fn ring(&self, caller: Option<String>) {
        *self.call.lock() = CallPhase::Ringing;
        self.emit(
            self.behavior.short_delay(),
            SignalingEvent::CallReceived {
                call_id: Uuid::new_v4(),
                caller,
            },
        );
    }
}

/// Per-client dispatch loop: delivers events one at a time, in order.
async fn dispatch(
    mut rx: mpsc::UnboundedReceiver<Emission>,
    delegate: Arc<dyn SignalingDelegate>,
) {
    while let Some(Emission { delay, event }) = rx.recv().await {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        debug!(%event, "loopback delivering event");
        match event {
            SignalingEvent::ServerConnected => delegate.on_server_connect().await,
            SignalingEvent::ServerDisconnected(error) => {
                delegate.on_server_disconnect(error).await
            }
            SignalingEvent::Registered => delegate.on_registered().await,
            SignalingEvent::Unregistered => delegate.on_unregistered().await,
            SignalingEvent::CallReceived { call_id, caller } => {
                delegate.on_call_received(call_id, caller).await
            }
            SignalingEvent::CallAnswered => delegate.on_call_answered().await,
            SignalingEvent::CallHangup => delegate.on_call_hangup().await,
        }
    }
}

#[async_trait]
impl SignalingClient for LoopbackSignalingClient {
    async fn connect(&self) -> Result<(), SignalingError> {
        self.behavior.check(LoopbackOp::Connect)?;
        self.emit(self.behavior.short_delay(), SignalingEvent::ServerConnected);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), SignalingError> {
        self.behavior.check(LoopbackOp::Disconnect)?;
        *self.call.lock() = CallPhase::Idle;
        self.emit(
            self.behavior.short_delay(),
            SignalingEvent::ServerDisconnected(None),
        );
        Ok(())
    }

    async fn register(&self) -> Result<(), SignalingError> {
        self.behavior.check(LoopbackOp::Register)?;
        self.emit(self.behavior.short_delay(), SignalingEvent::Registered);
        Ok(())
    }

    async fn call(&self, target: &str) -> Result<(), SignalingError> {
        self.behavior.check(LoopbackOp::Call)?;
        debug!(target, "loopback outbound call, far end will auto-answer");
        *self.call.lock() = CallPhase::Active;
        self.emit(self.behavior.ring_delay(), SignalingEvent::CallAnswered);
        Ok(())
    }

    async fn answer(&self) -> Result<(), SignalingError> {
        self.behavior.check(LoopbackOp::Answer)?;
        {
            let mut call = self.call.lock();
            if *call != CallPhase::Ringing {
                return Err(SignalingError::NoActiveCall);
            }
            *call = CallPhase::Active;
        }
        self.emit(self.behavior.short_delay(), SignalingEvent::CallAnswered);
        Ok(())
    }

    async fn hangup(&self) -> Result<(), SignalingError> {
        self.behavior.check(LoopbackOp::Hangup)?;
        {
            let mut call = self.call.lock();
            if *call == CallPhase::Idle {
                return Err(SignalingError::NoActiveCall);
            }
            *call = CallPhase::Idle;
        }
        self.emit(self.behavior.short_delay(), SignalingEvent::CallHangup);
        Ok(())
    }
}
