//! # Softphone Console
//!
//! An operator console for exercising a WebRTC-to-SIP signaling client:
//! configure an endpoint, connect, register, place/answer/end calls, and
//! watch a rolling event log. All SIP protocol behavior lives behind the
//! [`signaling`] trait boundary in an external client; this crate holds
//! only the session controller, the log, and the terminal front end.
//!
//! ## Layers
//!
//! - [`controller`]: the [`controller::SessionController`] — five thin
//!   request wrappers plus the delegate that folds signaling events into
//!   four session flags
//! - [`signaling`]: the consumed contract of the external client, and an
//!   in-process loopback implementation for demos and tests
//! - [`log`]: the bounded, append-only event log
//! - [`console`]: command parsing, state-driven gating, and rendering for
//!   the `softphone` binary
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use softphone_console::config::ConnectionConfig;
//! use softphone_console::controller::SessionController;
//! use softphone_console::signaling::loopback::LoopbackSignalingFactory;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ConnectionConfig::new("wss://pbx.example.com:8089/ws", "operator", "pw");
//!     let controller = SessionController::new(LoopbackSignalingFactory::new(), config);
//!     controller.connect().await;
//! }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod console;
pub mod controller;
pub mod error;
pub mod events;
pub mod log;
pub mod signaling;

pub use config::ConnectionConfig;
pub use controller::{SessionController, SessionState};
pub use error::{ControllerError, ControllerResult};
pub use events::SignalingEvent;
pub use log::{EventLog, LogEntry, Severity};
