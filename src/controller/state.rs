//! Session state flags and their event-driven transitions
//!
//! The session is described by four independent booleans rather than one
//! enum because the flags combine: a connected endpoint can be registered
//! or not, and an inbound call can be pending in either case. State only
//! changes by folding [`SignalingEvent`]s over [`SessionState::apply`];
//! no request path mutates these flags directly.

use serde::{Deserialize, Serialize};

use crate::events::SignalingEvent;

/// The four session flags, all `false` at rest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Transport to the signaling server is up
    pub connected: bool,
    /// SIP registration is active
    pub registered: bool,
    /// A call is established
    pub in_call: bool,
    /// An inbound call is ringing and awaiting an answer
    pub incoming_call: bool,
}

impl SessionState {
    /// Apply one signaling event
    ///
    /// A server disconnect invalidates everything that depended on the
    /// transport, whether or not explicit unregister/hangup events were
    /// ever delivered.
    pub fn apply(&mut self, event: &SignalingEvent) {
        match event {
            SignalingEvent::ServerConnected => {
                self.connected = true;
            }
            SignalingEvent::ServerDisconnected(_) => {
                self.connected = false;
                self.registered = false;
                self.in_call = false;
                self.incoming_call = false;
            }
            SignalingEvent::Registered => {
                self.registered = true;
            }
            SignalingEvent::Unregistered => {
                self.registered = false;
            }
            SignalingEvent::CallReceived { .. } => {
                self.incoming_call = true;
            }
            SignalingEvent::CallAnswered => {
                self.in_call = true;
                self.incoming_call = false;
            }
            SignalingEvent::CallHangup => {
                self.in_call = false;
                self.incoming_call = false;
            }
        }
    }

    /// Fold a whole event sequence from the all-false state
    pub fn fold<'a>(events: impl IntoIterator<Item = &'a SignalingEvent>) -> Self {
        let mut state = Self::default();
        for event in events {
            state.apply(event);
        }
        state
    }

    /// Composite call indicator for display: in-call, ringing, or idle
    pub fn call_display(&self) -> &'static str {
        if self.in_call {
            "in call"
        } else if self.incoming_call {
            "ringing"
        } else {
            "idle"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn received() -> SignalingEvent {
        SignalingEvent::CallReceived {
            call_id: Uuid::new_v4(),
            caller: None,
        }
    }

    #[test]
    fn starts_all_false() {
        let state = SessionState::default();
        assert!(!state.connected && !state.registered && !state.in_call && !state.incoming_call);
    }

    #[test]
    fn fold_matches_transition_table() {
        let events = [
            SignalingEvent::ServerConnected,
            SignalingEvent::Registered,
            received(),
            SignalingEvent::CallAnswered,
        ];
        let state = SessionState::fold(&events);
        assert!(state.connected);
        assert!(state.registered);
        assert!(state.in_call);
        assert!(!state.incoming_call);
    }

    #[test]
    fn answered_clears_incoming() {
        let state = SessionState::fold(&[
            SignalingEvent::ServerConnected,
            received(),
            SignalingEvent::CallAnswered,
        ]);
        assert!(state.in_call);
        assert!(!state.incoming_call);
    }

    #[test]
    fn hangup_clears_both_call_flags() {
        let mut state = SessionState::fold(&[SignalingEvent::ServerConnected, received()]);
        state.apply(&SignalingEvent::CallAnswered);
        state.apply(&SignalingEvent::CallHangup);
        assert!(!state.in_call);
        assert!(!state.incoming_call);
        // Connection-level flags are untouched by call teardown
        assert!(state.connected);
    }

    #[test]
    fn disconnect_resets_everything_from_any_state() {
        // Exercise the reset from every combination of dependent flags
        for registered in [false, true] {
            for in_call in [false, true] {
                for incoming in [false, true] {
                    let mut state = SessionState {
                        connected: true,
                        registered,
                        in_call,
                        incoming_call: incoming,
                    };
                    state.apply(&SignalingEvent::ServerDisconnected(Some(
                        "transport lost".into(),
                    )));
                    assert_eq!(state, SessionState::default());
                }
            }
        }
    }

    #[test]
    fn unregister_only_clears_registration() {
        let mut state = SessionState::fold(&[
            SignalingEvent::ServerConnected,
            SignalingEvent::Registered,
            received(),
        ]);
        state.apply(&SignalingEvent::Unregistered);
        assert!(state.connected);
        assert!(!state.registered);
        assert!(state.incoming_call);
    }

    #[test]
    fn events_out_of_order_still_fold_deterministically() {
        // A hangup with no preceding answer is harmless
        let state = SessionState::fold(&[
            SignalingEvent::ServerConnected,
            SignalingEvent::CallHangup,
        ]);
        assert!(state.connected && !state.in_call && !state.incoming_call);

        // An answer with no preceding ring still establishes the call
        let state = SessionState::fold(&[
            SignalingEvent::ServerConnected,
            SignalingEvent::CallAnswered,
        ]);
        assert!(state.in_call);
    }

    #[test]
    fn call_display_reflects_priority() {
        let mut state = SessionState::default();
        assert_eq!(state.call_display(), "idle");
        state.incoming_call = true;
        assert_eq!(state.call_display(), "ringing");
        state.in_call = true;
        assert_eq!(state.call_display(), "in call");
    }
}
